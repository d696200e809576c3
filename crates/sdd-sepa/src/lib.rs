//! SEPA Direct Debit mandate creation and tokenization
//!
//! The flow this crate sequences:
//!
//! 1. Submit a mandate-creation request to the gateway.
//! 2. If the gateway returns an approval URL, run a browser approval
//!    session and wait for its redirect; if it returns the already-approved
//!    sentinel, skip straight ahead.
//! 3. Exchange the approved mandate's bank reference token for an opaque
//!    payment-method nonce.
//!
//! Every terminal path emits one analytics signal and resolves the caller's
//! future exactly once with a [`SepaNonce`] or a typed [`SepaError`].
//!
//! ```no_run
//! use sdd_sepa::{GatewayConfig, MandateRequest, MandateType, SepaClient};
//! use url::Url;
//!
//! # async fn example() -> sdd_sepa::SepaResult<()> {
//! let config = GatewayConfig::new(
//!     Url::parse("https://api.example.com/").unwrap(),
//!     "development_tokenization_key",
//!     8447,
//! );
//! let client = SepaClient::new(&config)?;
//!
//! let request = MandateRequest {
//!     account_holder_name: "John Doe".into(),
//!     iban: "FR891751244434203564412313".into(),
//!     customer_id: "A0E243A0A200491D929D".into(),
//!     mandate_type: MandateType::OneOff,
//!     billing_address: None,
//!     merchant_account_id: "eur_merchant_account".into(),
//! };
//!
//! let nonce = client.tokenize(&request).await?;
//! println!("nonce: {}", nonce.nonce);
//! # Ok(())
//! # }
//! ```

pub mod analytics;
mod api;
mod client;

pub use analytics::SepaAnalytics;
pub use api::{CreateMandateResult, SepaApi, SepaNonce};
pub use client::SepaClient;

// Re-export the collaborator seams and shared types so most callers only
// need this crate.
pub use sdd_approval::{
    ApprovalError, ApprovalSession, BrowserApprovalSession, SystemUrlOpener, UrlOpener,
};
pub use sdd_gateway::{AnalyticsSink, ApiTransport, GatewayConfig, HttpAnalytics, HttpGateway};
pub use sdd_types::{
    BankReferenceToken, BillingAddress, MandateRequest, MandateType, SepaError, SepaResult,
    TransportError,
};
