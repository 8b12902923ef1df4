use crate::error::{PaymentError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Currency sent with every payment. The gateway integration is EUR only.
pub const CURRENCY: &str = "EUR";
/// Language of the gateway's payment pages.
pub const LANGUAGE: &str = "FI";

/// Identifier correlating a created payment with the gateway's callbacks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Builds the `B<unix-millis>_<counter>` identifier handed to the gateway.
    pub fn generate(unix_millis: u128, counter: u64) -> Self {
        Self(format!("B{unix_millis}_{counter}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for OrderId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Selects the URL set a payment is routed through. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Real,
    Demo,
}

impl Environment {
    pub fn from_real_flag(is_real: bool) -> Self {
        if is_real { Self::Real } else { Self::Demo }
    }
}

/// A positive payment amount in euros.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Converts to cents, rounding half away from zero. The gateway expects an
    /// integer with no decimal point.
    pub fn to_minor_units(&self) -> Result<i64> {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|cents| cents.to_i64())
            .ok_or_else(|| {
                PaymentError::ValidationError(format!("Amount {} is out of range", self.0))
            })
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

/// Per-merchant key used for authcodes. It is only ever hashed, never sent.
pub struct SharedSecret(SecretString);

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(PaymentError::ValidationError(
                "Shared secret must not be empty".to_string(),
            ));
        }
        Ok(Self(SecretString::new(secret)))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}

/// Why a payment did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The callback's authcode did not match the recomputed one.
    Tampered,
    /// A verified success callback carried a non-zero return code.
    UnexpectedReturnCode(String),
    /// A verified callback arrived on the failure endpoint.
    Declined,
    /// The payment outlived the registry's pending TTL.
    Expired,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tampered => f.write_str("tampered"),
            Self::UnexpectedReturnCode(_) => f.write_str("weird RETURN_CODE"),
            Self::Declined => f.write_str("payment failed"),
            Self::Expired => f.write_str("expired"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Paid,
    Failed(FailureReason),
}

impl PaymentOutcome {
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::Paid)
    }

    /// The failure reason, `None` for a successful payment.
    pub fn error(&self) -> Option<&FailureReason> {
        match self {
            Self::Paid => None,
            Self::Failed(reason) => Some(reason),
        }
    }
}

impl fmt::Display for PaymentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paid => f.write_str("paid"),
            Self::Failed(reason) => reason.fmt(f),
        }
    }
}

/// What the completion callback receives, exactly once per payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub order_id: OrderId,
    pub outcome: PaymentOutcome,
}

pub type OnResolved = Box<dyn FnOnce(Resolution) + Send + 'static>;

/// A payment waiting for the gateway to call back.
///
/// Owned by the pending store. It is never mutated, only removed, and its
/// callback can be consumed once through [`PendingPayment::resolve`].
pub struct PendingPayment {
    pub order_id: OrderId,
    pub environment: Environment,
    pub amount: Amount,
    pub merchant_id: String,
    pub secret: SharedSecret,
    pub created_at: Instant,
    on_resolved: OnResolved,
}

impl PendingPayment {
    pub fn new(
        order_id: OrderId,
        environment: Environment,
        amount: Amount,
        merchant_id: String,
        secret: SharedSecret,
        on_resolved: OnResolved,
    ) -> Self {
        Self {
            order_id,
            environment,
            amount,
            merchant_id,
            secret,
            created_at: Instant::now(),
            on_resolved,
        }
    }

    /// Consumes the record and fires its completion callback.
    pub fn resolve(self, outcome: PaymentOutcome) {
        let resolution = Resolution {
            order_id: self.order_id,
            outcome,
        };
        (self.on_resolved)(resolution);
    }
}

impl fmt::Debug for PendingPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingPayment")
            .field("order_id", &self.order_id)
            .field("environment", &self.environment)
            .field("amount", &self.amount)
            .field("merchant_id", &self.merchant_id)
            .field("secret", &self.secret)
            .finish_non_exhaustive()
    }
}
