//! Browser-based mandate approval session
//!
//! A mandate that is not yet approved needs an out-of-band, user-facing
//! approval step: the approval URL is opened in the user's browser, the
//! approval page walks the user through the bank's consent flow, and the
//! page finally redirects to a loopback listener this crate hosts. The
//! session resolves with the raw redirect URL — interpreting its query
//! parameters is the orchestrator's job, not this crate's.
//!
//! The [`ApprovalSession`] trait is the seam the orchestrator is written
//! against, so flows are testable without a real interactive session.

mod listener;
mod session;
mod types;

pub use session::{ApprovalSession, BrowserApprovalSession};
pub use types::{ApprovalError, SessionId, SystemUrlOpener, UrlOpener};
