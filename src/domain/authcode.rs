//! Authcode computation for the gateway's redirect protocol.
//!
//! An authcode is the uppercase hex MD5 digest of `|`-joined fields. MD5 is
//! mandated by the gateway for wire compatibility and must not be used as a
//! general-purpose signature anywhere else.

use crate::domain::callback::{CallbackPayload, RETURN_CODE_OK};
use md5::{Digest, Md5};
use std::fmt;

const SEPARATOR: &str = "|";

/// An uppercase hex authcode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthCode(String);

impl AuthCode {
    fn digest(fields: &[&str]) -> Self {
        let input = fields.join(SEPARATOR);
        Self(hex::encode_upper(Md5::digest(input.as_bytes())))
    }

    /// Case-sensitive comparison against the code supplied by the gateway.
    pub fn matches(&self, supplied: &str) -> bool {
        self.0 == supplied
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AuthCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields signed when a payment is sent to the gateway, in wire order after
/// the secret.
#[derive(Debug, Clone, Copy)]
pub struct OutboundFields<'a> {
    pub merchant_id: &'a str,
    pub amount_minor_units: i64,
    pub currency: &'a str,
    pub order_number: &'a str,
    pub language: &'a str,
    pub return_address: &'a str,
    pub cancel_address: &'a str,
}

/// Authcode for the payment creation form.
pub fn outbound(secret: &str, fields: &OutboundFields<'_>) -> AuthCode {
    let amount = fields.amount_minor_units.to_string();
    AuthCode::digest(&[
        secret,
        fields.merchant_id,
        &amount,
        fields.currency,
        fields.order_number,
        fields.language,
        fields.return_address,
        fields.cancel_address,
    ])
}

/// Authcode of a gateway callback.
///
/// The fourth field depends on the return code: `"0"` signs the settlement
/// field, anything else signs the incident id when the gateway sent one.
pub fn inbound(
    secret: &str,
    return_code: &str,
    order_number: &str,
    settled: Option<&str>,
    incident_id: Option<&str>,
) -> AuthCode {
    let mut fields = vec![secret, return_code, order_number];
    if return_code == RETURN_CODE_OK {
        // A missing SETTLED is signed as an empty field, never as "undefined".
        fields.push(settled.unwrap_or_default());
    } else if let Some(incident) = incident_id
        && !incident.is_empty()
    {
        fields.push(incident);
    }
    AuthCode::digest(&fields)
}

/// Recomputes the callback's authcode and checks it against the supplied one.
pub fn verify(secret: &str, payload: &CallbackPayload) -> bool {
    inbound(
        secret,
        &payload.return_code,
        &payload.order_number,
        payload.settled.as_deref(),
        payload.incident_id.as_deref(),
    )
    .matches(&payload.authcode)
}
