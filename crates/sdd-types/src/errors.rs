//! Error types and conversions

use thiserror::Error;

/// Failure reported by the API transport collaborator.
///
/// Transport errors keep the backend's identity (status code and message)
/// so callers can tell backend-reported failures apart from flow-level
/// failures. Nothing at this layer retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Network(String),

    #[error("gateway returned {status}: {message}")]
    Http { status: u16, message: String },
}

/// Errors surfaced by the tokenize flow.
///
/// Every invocation of the flow resolves with either a nonce or exactly one
/// of these; partial state is never returned.
#[derive(Error, Debug)]
pub enum SepaError {
    /// Transport-level failure, passed through with its original identity.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A required field was missing or unparseable in a gateway response.
    #[error("malformed gateway response: {0}")]
    MalformedResponse(String),

    /// The user dismissed or canceled the approval web flow.
    #[error("SEPA approval web flow was canceled by the user")]
    WebFlowCanceled,

    /// The approval session could not be presented to the user.
    #[error("SEPA approval session could not be presented: presentation context invalid")]
    PresentationContextInvalid,

    /// The approval session completed with neither a callback URL nor an error.
    #[error("SEPA approval session returned a nil authentication result")]
    AuthenticationResultNil,

    /// The approval session's callback URL was unparseable or did not carry
    /// the success marker.
    #[error("SEPA approval session returned an invalid result URL")]
    ResultUrlInvalid,

    /// The mandate request failed structural validation before submission.
    #[error("invalid mandate request: {0}")]
    InvalidRequest(String),
}

pub type SepaResult<T> = Result<T, SepaError>;
