//! Gateway configuration

use url::Url;

/// Configuration for the gateway transport and the approval redirect
/// listener.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Gateway API base URL, e.g. `https://api.example.com/`.
    pub base_url: Url,

    /// Client authorization key sent with every request.
    pub client_key: String,

    /// Local port the approval redirect listener binds. The return and
    /// cancel URLs baked into the create-mandate payload point here.
    pub callback_port: u16,
}

impl GatewayConfig {
    pub fn new(base_url: Url, client_key: impl Into<String>, callback_port: u16) -> Self {
        Self {
            base_url,
            client_key: client_key.into(),
            callback_port,
        }
    }

    /// The URL the approval page redirects to once the user approves the
    /// mandate. Query parameters are appended by the approval page.
    pub fn return_url(&self) -> Url {
        self.listener_url("/sepa/success")
    }

    /// The URL the approval page redirects to when the user declines.
    pub fn cancel_url(&self) -> Url {
        self.listener_url("/sepa/cancel")
    }

    fn listener_url(&self, path: &str) -> Url {
        // Port and path are fixed at configuration time; the parse cannot fail.
        Url::parse(&format!("http://127.0.0.1:{}{}", self.callback_port, path))
            .expect("loopback listener URL is always valid")
    }
}
