//! Mandate request input types
//!
//! These are pure value containers supplied by the caller. They are
//! validated structurally (required fields present) before the flow submits
//! anything to the gateway.

use serde::{Deserialize, Serialize};

use crate::errors::{SepaError, SepaResult};

/// How often the mandate authorizes the merchant to debit the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MandateType {
    OneOff,
    Recurrent,
}

impl MandateType {
    /// The gateway wire value (`ONE_OFF` / `RECURRENT`).
    pub fn as_str(&self) -> &'static str {
        match self {
            MandateType::OneOff => "ONE_OFF",
            MandateType::Recurrent => "RECURRENT",
        }
    }
}

impl std::fmt::Display for MandateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier returned by mandate creation, used to complete tokenization
/// once the mandate is approved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BankReferenceToken(String);

impl BankReferenceToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BankReferenceToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Billing address attached to a mandate request. All fields optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingAddress {
    pub street_address: Option<String>,
    pub extended_address: Option<String>,
    pub locality: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    /// ISO 3166-1 alpha-2 country code.
    pub country_code: Option<String>,
}

/// Caller-supplied input for the tokenize flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandateRequest {
    pub account_holder_name: String,
    pub iban: String,
    /// The merchant's (or partner's) identifier for the customer.
    pub customer_id: String,
    pub mandate_type: MandateType,
    pub billing_address: Option<BillingAddress>,
    pub merchant_account_id: String,
}

impl MandateRequest {
    /// Check that every required field is present and non-blank.
    ///
    /// Runs before anything is submitted to the gateway; a failure here
    /// means no collaborator was invoked and no analytics event is emitted.
    pub fn validate(&self) -> SepaResult<()> {
        let mut missing = Vec::new();

        if self.account_holder_name.trim().is_empty() {
            missing.push("account_holder_name");
        }
        if self.iban.trim().is_empty() {
            missing.push("iban");
        }
        if self.customer_id.trim().is_empty() {
            missing.push("customer_id");
        }
        if self.merchant_account_id.trim().is_empty() {
            missing.push("merchant_account_id");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(SepaError::InvalidRequest(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_request() -> MandateRequest {
        MandateRequest {
            account_holder_name: "John Doe".to_string(),
            iban: "FR891751244434203564412313".to_string(),
            customer_id: "A0E243A0A200491D929D".to_string(),
            mandate_type: MandateType::OneOff,
            billing_address: Some(BillingAddress {
                street_address: Some("Kantstraße 70".to_string()),
                extended_address: Some("#170".to_string()),
                locality: Some("Freistaat Sachsen".to_string()),
                region: Some("Annaberg-buchholz".to_string()),
                postal_code: Some("09456".to_string()),
                country_code: Some("FR".to_string()),
            }),
            merchant_account_id: "eur_pwpp_multi_account_merchant_account".to_string(),
        }
    }

    #[test]
    fn test_validate_complete_request() {
        assert!(complete_request().validate().is_ok());
    }

    #[test]
    fn test_validate_without_billing_address() {
        let mut request = complete_request();
        request.billing_address = None;
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_iban() {
        let mut request = complete_request();
        request.iban = "   ".to_string();

        let err = request.validate().unwrap_err();
        assert!(matches!(err, SepaError::InvalidRequest(_)));
        assert!(err.to_string().contains("iban"));
    }

    #[test]
    fn test_validate_lists_every_missing_field() {
        let request = MandateRequest {
            account_holder_name: String::new(),
            iban: String::new(),
            customer_id: String::new(),
            mandate_type: MandateType::Recurrent,
            billing_address: None,
            merchant_account_id: String::new(),
        };

        let message = request.validate().unwrap_err().to_string();
        for field in [
            "account_holder_name",
            "iban",
            "customer_id",
            "merchant_account_id",
        ] {
            assert!(message.contains(field), "missing {field} in: {message}");
        }
    }

    #[test]
    fn test_mandate_type_wire_values() {
        assert_eq!(MandateType::OneOff.as_str(), "ONE_OFF");
        assert_eq!(MandateType::Recurrent.as_str(), "RECURRENT");

        let parsed: MandateType = serde_json::from_str("\"RECURRENT\"").unwrap();
        assert_eq!(parsed, MandateType::Recurrent);
        assert!(serde_json::from_str::<MandateType>("\"WEEKLY\"").is_err());
    }
}
