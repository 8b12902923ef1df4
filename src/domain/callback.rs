use crate::domain::payment::{FailureReason, PaymentOutcome};
use crate::error::{PaymentError, Result};
use serde::{Deserialize, Serialize};

/// Return code the gateway uses for a settled payment. Compared as text.
pub const RETURN_CODE_OK: &str = "0";

/// Body of a gateway notification, as posted to the return or cancel address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackPayload {
    #[serde(rename = "ORDER_NUMBER")]
    pub order_number: String,
    #[serde(rename = "RETURN_CODE")]
    pub return_code: String,
    #[serde(rename = "AUTHCODE")]
    pub authcode: String,
    #[serde(rename = "SETTLED", default)]
    pub settled: Option<String>,
    #[serde(rename = "INCIDENT_ID", default)]
    pub incident_id: Option<String>,
}

impl CallbackPayload {
    /// Builds a payload from the raw key-value pairs of a form post.
    ///
    /// Unknown keys are ignored. Blank optional fields count as absent.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut order_number = None;
        let mut return_code = None;
        let mut authcode = None;
        let mut settled = None;
        let mut incident_id = None;

        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "ORDER_NUMBER" => &mut order_number,
                "RETURN_CODE" => &mut return_code,
                "AUTHCODE" => &mut authcode,
                "SETTLED" => &mut settled,
                "INCIDENT_ID" => &mut incident_id,
                _ => continue,
            };
            *slot = Some(value.into());
        }

        let required = |value: Option<String>, name: &str| {
            value.ok_or_else(|| PaymentError::ValidationError(format!("Missing field {name}")))
        };

        Ok(Self {
            order_number: required(order_number, "ORDER_NUMBER")?,
            return_code: required(return_code, "RETURN_CODE")?,
            authcode: required(authcode, "AUTHCODE")?,
            settled: settled.filter(|s| !s.is_empty()),
            incident_id: incident_id.filter(|s| !s.is_empty()),
        })
    }
}

/// Which gateway address delivered the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackEndpoint {
    /// The return address: the payer completed the payment flow.
    Success,
    /// The cancel address: the gateway reports a failed or cancelled payment.
    Failure,
}

impl CallbackEndpoint {
    /// Maps a verification result onto the outcome delivered to the merchant.
    pub fn outcome(&self, code_matches: bool, return_code: &str) -> PaymentOutcome {
        if !code_matches {
            return PaymentOutcome::Failed(FailureReason::Tampered);
        }
        match self {
            Self::Success if return_code == RETURN_CODE_OK => PaymentOutcome::Paid,
            Self::Success => {
                PaymentOutcome::Failed(FailureReason::UnexpectedReturnCode(return_code.to_string()))
            }
            Self::Failure => PaymentOutcome::Failed(FailureReason::Declined),
        }
    }
}
