//! Loopback redirect listener
//!
//! Hosts the return and cancel URLs that the mandate approval page
//! redirects to. One listener serves exactly one session run: the first
//! redirect that arrives resolves the session, later hits get a courtesy
//! page and are otherwise ignored.

use std::sync::Arc;

use axum::extract::State;
use axum::http::Uri;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::types::SessionId;

const SUCCESS_PAGE: &str = r#"
<html>
    <head><title>Mandate Approved</title></head>
    <body style="font-family: sans-serif; text-align: center; padding: 50px;">
        <h1>Mandate approved</h1>
        <p>You can close this window and return to the application.</p>
    </body>
</html>
"#;

const CANCEL_PAGE: &str = r#"
<html>
    <head><title>Mandate Approval Canceled</title></head>
    <body style="font-family: sans-serif; text-align: center; padding: 50px;">
        <h1>Approval canceled</h1>
        <p>No mandate was created. You can close this window.</p>
    </body>
</html>
"#;

/// What the approval page's redirect told us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RedirectEvent {
    /// The approval page redirected to the return URL. Carries the full
    /// redirect URL, query string included, uninterpreted.
    Completed(String),

    /// The approval page redirected to the cancel URL.
    Canceled,
}

#[derive(Clone)]
struct ListenerState {
    session_id: SessionId,
    port: u16,
    event_tx: Arc<Mutex<Option<oneshot::Sender<RedirectEvent>>>>,
}

impl ListenerState {
    fn resolve(&self, event: RedirectEvent) {
        match self.event_tx.lock().take() {
            Some(tx) => {
                if tx.send(event).is_err() {
                    warn!(
                        "approval session {} was dropped before its redirect arrived",
                        self.session_id
                    );
                }
            }
            None => {
                // First redirect wins; the approval page occasionally
                // re-fires the redirect on browser refresh.
                debug!(
                    "ignoring duplicate redirect for approval session {}",
                    self.session_id
                );
            }
        }
    }
}

/// Single-use redirect listener bound to a loopback port.
pub(crate) struct RedirectListener {
    port: u16,
    event_rx: oneshot::Receiver<RedirectEvent>,
    shutdown_tx: oneshot::Sender<()>,
}

impl RedirectListener {
    /// Bind the listener and start serving the redirect routes.
    ///
    /// Pass port `0` to bind an ephemeral port; [`RedirectListener::port`]
    /// reports the port actually bound.
    pub(crate) async fn bind(session_id: SessionId, port: u16) -> std::io::Result<Self> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let port = listener.local_addr()?.port();

        let (event_tx, event_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let state = ListenerState {
            session_id,
            port,
            event_tx: Arc::new(Mutex::new(Some(event_tx))),
        };

        let app = Router::new()
            .route("/sepa/success", get(handle_success))
            .route("/sepa/cancel", get(handle_cancel))
            .with_state(state);

        tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                shutdown_rx.await.ok();
            });
            if let Err(e) = serve.await {
                error!("redirect listener for session {session_id} failed: {e}");
            }
        });

        info!("redirect listener for session {session_id} bound on 127.0.0.1:{port}");

        Ok(Self {
            port,
            event_rx,
            shutdown_tx,
        })
    }

    pub(crate) fn port(&self) -> u16 {
        self.port
    }

    /// Wait for the redirect. Returns `None` if the listener went away
    /// without ever producing an event.
    pub(crate) async fn wait(self) -> Option<RedirectEvent> {
        let event = self.event_rx.await.ok();
        // The listener has served its purpose either way.
        let _ = self.shutdown_tx.send(());
        event
    }
}

async fn handle_success(State(state): State<ListenerState>, uri: Uri) -> Html<&'static str> {
    // Reconstruct the full redirect URL; the orchestrator inspects its
    // query parameters, not this handler.
    let callback_url = format!("http://127.0.0.1:{}{}", state.port, uri);
    info!(
        "approval session {} received success redirect",
        state.session_id
    );
    state.resolve(RedirectEvent::Completed(callback_url));
    Html(SUCCESS_PAGE)
}

async fn handle_cancel(State(state): State<ListenerState>) -> Html<&'static str> {
    info!(
        "approval session {} received cancel redirect",
        state.session_id
    );
    state.resolve(RedirectEvent::Canceled);
    Html(CANCEL_PAGE)
}
