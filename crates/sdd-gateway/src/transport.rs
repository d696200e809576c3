//! JSON POST transport against the payment gateway

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use sdd_types::TransportError;

use crate::config::GatewayConfig;

/// Header carrying the client authorization key.
const CLIENT_KEY_HEADER: &str = "client-key";

/// Request timeout. Generous because the gateway fronts bank-side
/// mandate checks that can be slow.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// The API transport collaborator.
///
/// One logical operation: POST a JSON body to a gateway path and hand back
/// the raw JSON response. The flow's adapter owns all interpretation of the
/// returned structure; this layer owns authentication, status checking, and
/// decoding. No retries are performed here.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn post(&self, path: &str, body: Value) -> Result<Value, TransportError>;
}

/// reqwest-backed gateway transport.
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    client_key: String,
}

impl HttpGateway {
    /// Create a transport from gateway configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| TransportError::Network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            client_key: config.client_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::Network(format!("invalid gateway path {path:?}: {e}")))
    }
}

#[async_trait]
impl ApiTransport for HttpGateway {
    async fn post(&self, path: &str, body: Value) -> Result<Value, TransportError> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .header(CLIENT_KEY_HEADER, &self.client_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Network(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Http {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Network(format!("failed to decode response body: {e}")))
    }
}
