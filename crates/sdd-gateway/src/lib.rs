//! Gateway transport and analytics emission for the SEPA Direct Debit client
//!
//! This crate is the flow's boundary to the payment gateway: a thin JSON
//! POST transport with client-key authentication, and a fire-and-forget
//! analytics sink. Retry policy, if any, belongs here or below — never in
//! the flow itself.

pub mod analytics;
pub mod config;
pub mod transport;

pub use analytics::{AnalyticsSink, HttpAnalytics};
pub use config::GatewayConfig;
pub use transport::{ApiTransport, HttpGateway};
