//! Tokenize flow orchestration

use std::sync::Arc;

use tracing::{error, info};
use url::Url;

use sdd_approval::{ApprovalError, ApprovalSession, BrowserApprovalSession};
use sdd_gateway::{AnalyticsSink, GatewayConfig, HttpAnalytics, HttpGateway};
use sdd_types::{MandateRequest, SepaError, SepaResult};

use crate::analytics::SepaAnalytics;
use crate::api::{CreateMandateResult, SepaApi, SepaNonce};

/// Client for tokenizing SEPA Direct Debit mandates.
///
/// Sequences the whole flow: create the mandate, run the browser approval
/// session if the gateway asks for one, then exchange the approved
/// mandate's bank reference token for a payment-method nonce.
///
/// Each [`SepaClient::tokenize`] call owns its request/response lifecycle
/// end to end and resolves exactly once, with either a fully populated
/// nonce or one typed error. The client keeps no state between calls.
pub struct SepaClient {
    api: SepaApi,
    session: Arc<dyn ApprovalSession>,
    analytics: Arc<dyn AnalyticsSink>,
}

impl SepaClient {
    /// Create a client with the production collaborators: a reqwest-backed
    /// gateway transport, the browser approval session, and HTTP analytics.
    pub fn new(config: &GatewayConfig) -> SepaResult<Self> {
        let transport = Arc::new(HttpGateway::new(config)?);

        Ok(Self {
            api: SepaApi::new(transport, config.return_url(), config.cancel_url()),
            session: Arc::new(BrowserApprovalSession::new(config.callback_port)),
            analytics: Arc::new(HttpAnalytics::new(config)),
        })
    }

    /// Create a client with explicit collaborators.
    ///
    /// This is the seam tests use to script gateway responses and approval
    /// outcomes without any network or interactive session.
    pub fn with_collaborators(
        api: SepaApi,
        session: Arc<dyn ApprovalSession>,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        Self {
            api,
            session,
            analytics,
        }
    }

    /// Tokenize a SEPA Direct Debit mandate.
    ///
    /// The sole public entry point of the flow. Suspends for as long as the
    /// approval session does; no timeout is imposed here.
    pub async fn tokenize(&self, request: &MandateRequest) -> SepaResult<SepaNonce> {
        request.validate()?;

        let mandate = match self.api.create_mandate(request).await {
            Ok(result) => result,
            Err(e) => {
                error!("create mandate failed: {e}");
                self.emit(SepaAnalytics::CreateMandateFailed).await;
                return Err(e);
            }
        };

        match &mandate.approval_url {
            Some(approval_url) => self.await_approval(approval_url).await?,
            None => info!("mandate already approved, skipping approval session"),
        }

        self.exchange(&mandate, request).await
    }

    /// Run the approval session and interpret its outcome.
    async fn await_approval(&self, approval_url: &Url) -> SepaResult<()> {
        let callback = match self.session.run(approval_url, None).await {
            Ok(raw) => raw,
            Err(ApprovalError::Canceled) => {
                info!("approval web flow canceled");
                self.emit(SepaAnalytics::ChallengeCanceled).await;
                return Err(SepaError::WebFlowCanceled);
            }
            Err(ApprovalError::PresentationContextInvalid) => {
                // No analytics event fires on this branch.
                error!("approval session could not be presented");
                return Err(SepaError::PresentationContextInvalid);
            }
            Err(ApprovalError::ResultNil) => {
                error!("approval session returned no result");
                self.emit(SepaAnalytics::ChallengeFailed).await;
                return Err(SepaError::AuthenticationResultNil);
            }
        };

        // Well-formedness first, query parameters second.
        let Ok(callback_url) = Url::parse(&callback) else {
            error!("approval session returned an unparseable callback URL");
            self.emit(SepaAnalytics::ChallengeFailed).await;
            return Err(SepaError::ResultUrlInvalid);
        };

        if !callback_indicates_success(&callback_url) {
            error!("approval callback URL is missing the success marker");
            self.emit(SepaAnalytics::ChallengeFailed).await;
            return Err(SepaError::ResultUrlInvalid);
        }

        Ok(())
    }

    /// Exchange the approved mandate for a nonce.
    async fn exchange(
        &self,
        mandate: &CreateMandateResult,
        request: &MandateRequest,
    ) -> SepaResult<SepaNonce> {
        match self
            .api
            .tokenize(&mandate.bank_reference_token, &request.merchant_account_id)
            .await
        {
            Ok(nonce) => {
                info!("tokenized SEPA mandate for customer {}", nonce.customer_id);
                self.emit(SepaAnalytics::TokenizeSucceeded).await;
                Ok(nonce)
            }
            Err(e) => {
                error!("tokenize failed: {e}");
                // Attributed to the mandate flow as a whole, not a distinct
                // tokenize-failure tag.
                self.emit(SepaAnalytics::CreateMandateFailed).await;
                Err(e)
            }
        }
    }

    async fn emit(&self, event: SepaAnalytics) {
        self.analytics.send_event(event.tag()).await;
    }
}

/// The approval page marks a completed approval with `success=true` on its
/// redirect.
fn callback_indicates_success(url: &Url) -> bool {
    url.query_pairs()
        .any(|(key, value)| key == "success" && value.contains("true"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_success_marker() {
        let url = Url::parse("http://127.0.0.1:8447/sepa/success?success=true").unwrap();
        assert!(callback_indicates_success(&url));

        let url = Url::parse("http://127.0.0.1:8447/sepa/success?success=false").unwrap();
        assert!(!callback_indicates_success(&url));

        let url = Url::parse("http://127.0.0.1:8447/sepa/success").unwrap();
        assert!(!callback_indicates_success(&url));

        // Other query parameters do not count as the marker.
        let url = Url::parse("http://127.0.0.1:8447/sepa/success?done=true").unwrap();
        assert!(!callback_indicates_success(&url));
    }
}
