//! Core types for approval sessions

use std::io;
use std::process::Command;

use thiserror::Error;
use tracing::debug;
use url::Url;
use uuid::Uuid;

/// Unique identifier for one approval session run, used to correlate log
/// lines across the listener and the launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Typed failure of an approval session.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalError {
    /// The user dismissed or canceled the session.
    #[error("approval session was canceled by the user")]
    Canceled,

    /// The session could not be presented: the redirect listener failed to
    /// start, or neither the approval URL nor the fallback could be opened.
    #[error("approval session could not be presented")]
    PresentationContextInvalid,

    /// The session completed with neither a redirect URL nor an error.
    #[error("approval session completed without a result")]
    ResultNil,
}

/// Launch-layer collaborator: hands a URL to the host environment.
///
/// Launch failure is reported, not fatal — the session falls back to the
/// secondary URL before giving up.
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &Url) -> io::Result<()>;
}

/// Opens URLs with the platform's default handler.
pub struct SystemUrlOpener;

impl UrlOpener for SystemUrlOpener {
    fn open(&self, url: &Url) -> io::Result<()> {
        debug!("opening {url} with system handler");

        #[cfg(target_os = "macos")]
        let mut command = {
            let mut c = Command::new("open");
            c.arg(url.as_str());
            c
        };

        #[cfg(target_os = "windows")]
        let mut command = {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", "", url.as_str()]);
            c
        };

        #[cfg(all(unix, not(target_os = "macos")))]
        let mut command = {
            let mut c = Command::new("xdg-open");
            c.arg(url.as_str());
            c
        };

        command.spawn().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_uniqueness() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn test_approval_error_messages_are_distinct() {
        assert_ne!(
            ApprovalError::Canceled.to_string(),
            ApprovalError::PresentationContextInvalid.to_string()
        );
        assert_ne!(
            ApprovalError::Canceled.to_string(),
            ApprovalError::ResultNil.to_string()
        );
    }
}
