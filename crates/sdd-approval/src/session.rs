//! Approval session runner

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};
use url::Url;

use crate::listener::{RedirectEvent, RedirectListener};
use crate::types::{ApprovalError, SessionId, SystemUrlOpener, UrlOpener};

/// Runs one interactive approval session and resolves exactly once.
///
/// On success the raw redirect URL is returned uninterpreted; the
/// orchestrator — not this component — parses it and inspects its query
/// parameters.
#[async_trait]
pub trait ApprovalSession: Send + Sync {
    async fn run(
        &self,
        approval_url: &Url,
        fallback_url: Option<&Url>,
    ) -> Result<String, ApprovalError>;
}

/// Production session runner: hosts the redirect listener, opens the
/// approval URL in the user's browser, and suspends until the approval
/// page redirects back.
///
/// The session carries no timeout of its own; it resolves only on a
/// redirect, a cancel, or the listener going away.
pub struct BrowserApprovalSession {
    opener: Arc<dyn UrlOpener>,
    callback_port: u16,
}

impl BrowserApprovalSession {
    /// Create a session runner using the platform's default URL handler.
    ///
    /// `callback_port` must match the port the mandate's return and cancel
    /// URLs were built with.
    pub fn new(callback_port: u16) -> Self {
        Self::with_opener(Arc::new(SystemUrlOpener), callback_port)
    }

    /// Create a session runner with a specific launch-layer collaborator.
    pub fn with_opener(opener: Arc<dyn UrlOpener>, callback_port: u16) -> Self {
        Self {
            opener,
            callback_port,
        }
    }

    /// Open the approval URL, falling back to the secondary URL only if
    /// the primary cannot be opened at the launch layer.
    fn launch(
        &self,
        session_id: SessionId,
        approval_url: &Url,
        fallback_url: Option<&Url>,
    ) -> Result<(), ApprovalError> {
        match self.opener.open(approval_url) {
            Ok(()) => return Ok(()),
            Err(e) => {
                warn!("session {session_id}: failed to open approval URL: {e}");
            }
        }

        let Some(fallback) = fallback_url else {
            error!("session {session_id}: approval URL could not be opened and no fallback given");
            return Err(ApprovalError::PresentationContextInvalid);
        };

        match self.opener.open(fallback) {
            Ok(()) => {
                info!("session {session_id}: opened fallback URL");
                Ok(())
            }
            Err(e) => {
                error!("session {session_id}: fallback URL could not be opened either: {e}");
                Err(ApprovalError::PresentationContextInvalid)
            }
        }
    }
}

#[async_trait]
impl ApprovalSession for BrowserApprovalSession {
    async fn run(
        &self,
        approval_url: &Url,
        fallback_url: Option<&Url>,
    ) -> Result<String, ApprovalError> {
        let session_id = SessionId::new();
        info!("starting approval session {session_id} for {approval_url}");

        let listener = RedirectListener::bind(session_id, self.callback_port)
            .await
            .map_err(|e| {
                error!("session {session_id}: redirect listener failed to bind: {e}");
                ApprovalError::PresentationContextInvalid
            })?;

        self.launch(session_id, approval_url, fallback_url)?;

        match listener.wait().await {
            Some(RedirectEvent::Completed(callback_url)) => {
                info!("approval session {session_id} completed");
                Ok(callback_url)
            }
            Some(RedirectEvent::Canceled) => {
                info!("approval session {session_id} canceled by the user");
                Err(ApprovalError::Canceled)
            }
            None => {
                warn!("approval session {session_id} ended without a result");
                Err(ApprovalError::ResultNil)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Opener that simulates the user completing the approval page by
    /// hitting the given redirect path on the session's listener port.
    struct RedirectingOpener {
        port: u16,
        path_and_query: &'static str,
    }

    impl UrlOpener for RedirectingOpener {
        fn open(&self, _url: &Url) -> io::Result<()> {
            let target = format!("http://127.0.0.1:{}{}", self.port, self.path_and_query);
            tokio::spawn(async move {
                let _ = reqwest::get(target).await;
            });
            Ok(())
        }
    }

    struct FailingOpener {
        attempts: AtomicUsize,
    }

    impl UrlOpener for FailingOpener {
        fn open(&self, _url: &Url) -> io::Result<()> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(io::Error::new(io::ErrorKind::NotFound, "no handler"))
        }
    }

    fn approval_url() -> Url {
        Url::parse("https://gateway.example.com/mandates/approve?id=abc").unwrap()
    }

    #[tokio::test]
    async fn test_run_resolves_with_raw_callback_url() {
        let port = 8461;
        let session = BrowserApprovalSession::with_opener(
            Arc::new(RedirectingOpener {
                port,
                path_and_query: "/sepa/success?success=true",
            }),
            port,
        );

        let callback = session.run(&approval_url(), None).await.unwrap();
        assert_eq!(
            callback,
            format!("http://127.0.0.1:{port}/sepa/success?success=true")
        );
    }

    #[tokio::test]
    async fn test_run_maps_cancel_redirect_to_canceled() {
        let port = 8462;
        let session = BrowserApprovalSession::with_opener(
            Arc::new(RedirectingOpener {
                port,
                path_and_query: "/sepa/cancel",
            }),
            port,
        );

        let err = session.run(&approval_url(), None).await.unwrap_err();
        assert_eq!(err, ApprovalError::Canceled);
    }

    #[tokio::test]
    async fn test_run_without_openable_url_is_invalid_context() {
        let opener = Arc::new(FailingOpener {
            attempts: AtomicUsize::new(0),
        });
        let session = BrowserApprovalSession::with_opener(opener.clone(), 8463);

        let fallback = Url::parse("https://gateway.example.com/mandates/approve-lite").unwrap();
        let err = session
            .run(&approval_url(), Some(&fallback))
            .await
            .unwrap_err();

        assert_eq!(err, ApprovalError::PresentationContextInvalid);
        // Primary then fallback, nothing more.
        assert_eq!(opener.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_run_fails_fast_when_port_is_taken() {
        // Occupy the port so the listener cannot bind.
        let blocker = tokio::net::TcpListener::bind(("127.0.0.1", 8464))
            .await
            .unwrap();

        let session = BrowserApprovalSession::new(8464);
        let err = session.run(&approval_url(), None).await.unwrap_err();
        assert_eq!(err, ApprovalError::PresentationContextInvalid);

        drop(blocker);
    }
}
