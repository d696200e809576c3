//! Mandate API adapter
//!
//! Maps between the domain types and the gateway's wire format: builds the
//! create-mandate and tokenize payloads, and parses the raw JSON responses
//! handed back by the transport into typed results. All knowledge of the
//! provider's response quirks lives here; nothing downstream ever sees the
//! raw wire shape.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use url::Url;

use sdd_gateway::ApiTransport;
use sdd_types::{BankReferenceToken, MandateRequest, MandateType, SepaError, SepaResult};

const CREATE_MANDATE_PATH: &str = "v1/sepa_debit";
const TOKENIZE_PATH: &str = "v1/payment_methods/sepa_debit_accounts";

/// Sentinel the gateway sends in `approvalUrl` when the mandate is already
/// approved and no web flow is required. A provider-format quirk: the
/// literal string `"null"`, not JSON null.
const NO_APPROVAL_URL: &str = "null";

/// Typed result of a create-mandate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMandateResult {
    /// Where the user must approve the mandate. `None` means the mandate
    /// is already approved out-of-band and the approval session is skipped.
    pub approval_url: Option<Url>,
    pub iban_last_four: String,
    pub customer_id: String,
    pub bank_reference_token: BankReferenceToken,
    pub mandate_type: MandateType,
}

/// Terminal success value of the tokenize flow: an opaque payment-method
/// nonce plus the display details that came with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SepaNonce {
    pub nonce: String,
    pub iban_last_four: String,
    pub customer_id: String,
    pub mandate_type: MandateType,
}

#[derive(Deserialize)]
struct CreateMandateBody {
    #[serde(rename = "sepaDebitAccount")]
    sepa_debit_account: SepaDebitAccountBody,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SepaDebitAccountBody {
    approval_url: String,
    iban_last_four: String,
    merchant_or_partner_customer_id: String,
    bank_reference_token: String,
    mandate_type: MandateType,
}

#[derive(Deserialize)]
struct TokenizeBody {
    nonce: String,
    details: TokenizeDetailsBody,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenizeDetailsBody {
    iban_last_chars: String,
    merchant_or_partner_customer_id: String,
    mandate_type: MandateType,
}

/// Adapter for the gateway's SEPA mandate endpoints.
pub struct SepaApi {
    transport: Arc<dyn ApiTransport>,
    return_url: Url,
    cancel_url: Url,
}

impl SepaApi {
    /// `return_url` and `cancel_url` are baked into the create-mandate
    /// payload; the approval page redirects to one of them.
    pub fn new(transport: Arc<dyn ApiTransport>, return_url: Url, cancel_url: Url) -> Self {
        Self {
            transport,
            return_url,
            cancel_url,
        }
    }

    /// Submit a mandate-creation request and parse the typed result.
    ///
    /// Transport failures pass through with their original identity; a
    /// response the adapter cannot extract the required fields from is a
    /// [`SepaError::MalformedResponse`].
    pub async fn create_mandate(&self, request: &MandateRequest) -> SepaResult<CreateMandateResult> {
        debug!(
            "creating {} mandate for customer {}",
            request.mandate_type, request.customer_id
        );

        let body = self
            .transport
            .post(CREATE_MANDATE_PATH, self.create_mandate_payload(request))
            .await?;

        parse_create_mandate_response(body)
    }

    /// Exchange an approved mandate's bank reference token for a nonce.
    pub async fn tokenize(
        &self,
        reference: &BankReferenceToken,
        merchant_account_id: &str,
    ) -> SepaResult<SepaNonce> {
        debug!("exchanging bank reference token for a payment method nonce");

        let payload = json!({
            "sepa_debit_account": {
                "bank_reference_token": reference.as_str(),
            },
            "merchant_account_id": merchant_account_id,
        });

        let body = self.transport.post(TOKENIZE_PATH, payload).await?;
        parse_tokenize_response(body)
    }

    fn create_mandate_payload(&self, request: &MandateRequest) -> Value {
        let mut sepa_debit = json!({
            "account_holder_name": request.account_holder_name,
            "merchant_or_partner_customer_id": request.customer_id,
            "iban": request.iban,
            "mandate_type": request.mandate_type.as_str(),
        });

        if let Some(address) = &request.billing_address {
            sepa_debit["billing_address"] = json!({
                "address_line_1": address.street_address,
                "address_line_2": address.extended_address,
                "admin_area_1": address.locality,
                "admin_area_2": address.region,
                "postal_code": address.postal_code,
                "country_code": address.country_code,
            });
        }

        json!({
            "sepa_debit": sepa_debit,
            "merchant_account_id": request.merchant_account_id,
            "return_url": self.return_url.as_str(),
            "cancel_url": self.cancel_url.as_str(),
        })
    }
}

fn parse_create_mandate_response(body: Value) -> SepaResult<CreateMandateResult> {
    let body: CreateMandateBody = serde_json::from_value(body)
        .map_err(|e| SepaError::MalformedResponse(format!("create mandate response: {e}")))?;
    let account = body.sepa_debit_account;

    Ok(CreateMandateResult {
        approval_url: parse_approval_url(&account.approval_url)?,
        iban_last_four: account.iban_last_four,
        customer_id: account.merchant_or_partner_customer_id,
        bank_reference_token: BankReferenceToken::new(account.bank_reference_token),
        mandate_type: account.mandate_type,
    })
}

/// Map the gateway's approval-URL field to an explicit absent-URL case.
///
/// The literal string `"null"` and all-whitespace values both mean "no
/// approval URL" (mandate already approved), not a parse failure. Anything
/// else must be a well-formed URL.
fn parse_approval_url(raw: &str) -> SepaResult<Option<Url>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NO_APPROVAL_URL {
        return Ok(None);
    }

    Url::parse(trimmed).map(Some).map_err(|e| {
        SepaError::MalformedResponse(format!("approval URL {raw:?} is not a valid URL: {e}"))
    })
}

fn parse_tokenize_response(body: Value) -> SepaResult<SepaNonce> {
    let body: TokenizeBody = serde_json::from_value(body)
        .map_err(|e| SepaError::MalformedResponse(format!("tokenize response: {e}")))?;

    Ok(SepaNonce {
        nonce: body.nonce,
        iban_last_four: body.details.iban_last_chars,
        customer_id: body.details.merchant_or_partner_customer_id,
        mandate_type: body.details.mandate_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creation_body(approval_url: &str) -> Value {
        json!({
            "sepaDebitAccount": {
                "approvalUrl": approval_url,
                "ibanLastFour": "1234",
                "merchantOrPartnerCustomerId": "a-customer-id",
                "bankReferenceToken": "a-bank-reference-token",
                "mandateType": "ONE_OFF",
            }
        })
    }

    #[test]
    fn test_parse_creation_response_with_approval_url() {
        let result =
            parse_create_mandate_response(creation_body("https://example.com/approve")).unwrap();

        assert_eq!(
            result.approval_url.as_ref().map(Url::as_str),
            Some("https://example.com/approve")
        );
        assert_eq!(result.iban_last_four, "1234");
        assert_eq!(result.customer_id, "a-customer-id");
        assert_eq!(result.bank_reference_token.as_str(), "a-bank-reference-token");
        assert_eq!(result.mandate_type, MandateType::OneOff);
    }

    #[test]
    fn test_parse_creation_response_null_sentinel_means_already_approved() {
        let result = parse_create_mandate_response(creation_body("null")).unwrap();
        assert_eq!(result.approval_url, None);
    }

    #[test]
    fn test_parse_creation_response_whitespace_means_already_approved() {
        let result = parse_create_mandate_response(creation_body("   ")).unwrap();
        assert_eq!(result.approval_url, None);
    }

    #[test]
    fn test_parse_creation_response_rejects_unparseable_approval_url() {
        let err = parse_create_mandate_response(creation_body("not a url")).unwrap_err();
        assert!(matches!(err, SepaError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_creation_response_rejects_missing_reference_token() {
        let body = json!({
            "sepaDebitAccount": {
                "approvalUrl": "https://example.com/approve",
                "ibanLastFour": "1234",
                "merchantOrPartnerCustomerId": "a-customer-id",
                "mandateType": "ONE_OFF",
            }
        });

        let err = parse_create_mandate_response(body).unwrap_err();
        assert!(matches!(err, SepaError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_creation_response_rejects_unknown_mandate_type() {
        let body = json!({
            "sepaDebitAccount": {
                "approvalUrl": "null",
                "ibanLastFour": "1234",
                "merchantOrPartnerCustomerId": "a-customer-id",
                "bankReferenceToken": "a-bank-reference-token",
                "mandateType": "WEEKLY",
            }
        });

        let err = parse_create_mandate_response(body).unwrap_err();
        assert!(matches!(err, SepaError::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_tokenize_response() {
        let body = json!({
            "nonce": "a-fake-payment-method-nonce",
            "details": {
                "ibanLastChars": "1234",
                "merchantOrPartnerCustomerId": "a-customer-id",
                "mandateType": "RECURRENT",
            }
        });

        let nonce = parse_tokenize_response(body).unwrap();
        assert_eq!(nonce.nonce, "a-fake-payment-method-nonce");
        assert_eq!(nonce.iban_last_four, "1234");
        assert_eq!(nonce.customer_id, "a-customer-id");
        assert_eq!(nonce.mandate_type, MandateType::Recurrent);
    }

    #[test]
    fn test_parse_tokenize_response_rejects_missing_nonce() {
        let body = json!({
            "details": {
                "ibanLastChars": "1234",
                "merchantOrPartnerCustomerId": "a-customer-id",
                "mandateType": "RECURRENT",
            }
        });

        assert!(matches!(
            parse_tokenize_response(body).unwrap_err(),
            SepaError::MalformedResponse(_)
        ));
    }
}
