use crate::domain::authcode::{self, OutboundFields};
use crate::domain::callback::{CallbackEndpoint, CallbackPayload};
use crate::domain::config::GatewayConfig;
use crate::domain::form::PaymentForm;
use crate::domain::payment::{
    Amount, CURRENCY, Environment, FailureReason, LANGUAGE, OrderId, PaymentOutcome,
    PendingPayment, Resolution, SharedSecret,
};
use crate::domain::ports::{ConfigSource, PendingStoreBox};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Owns the payments awaiting a gateway callback and dispatches their outcomes.
///
/// Each created payment gets a unique order id and resolves exactly once:
/// the first callback that names its order id (verified or not) removes the
/// record and fires the completion callback. Later callbacks for the same
/// order are ignored.
pub struct PaymentRegistry {
    config: GatewayConfig,
    store: PendingStoreBox,
    counter: AtomicU64,
    pending_ttl: Option<Duration>,
}

impl PaymentRegistry {
    /// Creates a new `PaymentRegistry` instance.
    ///
    /// # Arguments
    ///
    /// * `config` - The real and demo gateway URL sets.
    /// * `store` - The store holding pending payments.
    pub fn new(config: GatewayConfig, store: PendingStoreBox) -> Self {
        Self {
            config,
            store,
            counter: AtomicU64::new(1),
            pending_ttl: None,
        }
    }

    /// Builds a registry from the `payment_*` keys of a configuration source.
    pub fn from_source(source: &dyn ConfigSource, store: PendingStoreBox) -> Result<Self> {
        Ok(Self::new(GatewayConfig::from_source(source)?, store))
    }

    /// Enables [`PaymentRegistry::evict_expired`] for payments older than `ttl`.
    pub fn with_pending_ttl(mut self, ttl: Duration) -> Self {
        self.pending_ttl = Some(ttl);
        self
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn next_order_id(&self) -> OrderId {
        let counter = self.counter.fetch_add(1, Ordering::Relaxed);
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        OrderId::generate(millis, counter)
    }

    /// Registers a new payment and returns the fields of the gateway form.
    ///
    /// `on_resolved` is called exactly once, when the gateway reports back
    /// for this payment (or when it expires, if a TTL is set).
    pub async fn create_payment<F>(
        &self,
        environment: Environment,
        amount: Decimal,
        merchant_id: &str,
        secret: &str,
        on_resolved: F,
    ) -> Result<PaymentForm>
    where
        F: FnOnce(Resolution) + Send + 'static,
    {
        if merchant_id.is_empty() {
            return Err(PaymentError::ValidationError(
                "Merchant id must not be empty".to_string(),
            ));
        }
        let amount = Amount::new(amount)?;
        let amount_minor_units = amount.to_minor_units()?;
        let secret = SharedSecret::new(secret)?;

        let order_id = self.next_order_id();
        let endpoints = self.config.endpoints(environment);
        let authcode = authcode::outbound(
            secret.expose(),
            &OutboundFields {
                merchant_id,
                amount_minor_units,
                currency: CURRENCY,
                order_number: order_id.as_str(),
                language: LANGUAGE,
                return_address: &endpoints.return_url,
                cancel_address: &endpoints.cancel_url,
            },
        );

        let form = PaymentForm {
            merchant_id: merchant_id.to_string(),
            amount: amount_minor_units.to_string(),
            currency: CURRENCY.to_string(),
            order_number: order_id.to_string(),
            language: LANGUAGE.to_string(),
            return_address: endpoints.return_url.clone(),
            cancel_address: endpoints.cancel_url.clone(),
            authcode: authcode.into_string(),
        };

        self.store
            .insert(PendingPayment::new(
                order_id.clone(),
                environment,
                amount,
                merchant_id.to_string(),
                secret,
                Box::new(on_resolved),
            ))
            .await?;

        info!(order_id = %order_id, ?environment, amount = %amount.value(), "payment created");
        Ok(form)
    }

    /// The gateway address the payer's form must be posted to.
    pub async fn payment_url(&self, order_id: &OrderId) -> Result<&str> {
        let environment = self
            .store
            .environment(order_id)
            .await?
            .ok_or_else(|| PaymentError::UnknownOrder(order_id.to_string()))?;
        Ok(&self.config.endpoints(environment).pay_url)
    }

    /// Handles a callback posted to the return address.
    ///
    /// Returns the delivered outcome, or `None` when no pending payment
    /// matches the payload's order number.
    pub async fn handle_success(&self, payload: &CallbackPayload) -> Result<Option<PaymentOutcome>> {
        self.handle(CallbackEndpoint::Success, payload).await
    }

    /// Handles a callback posted to the cancel address.
    pub async fn handle_failure(&self, payload: &CallbackPayload) -> Result<Option<PaymentOutcome>> {
        self.handle(CallbackEndpoint::Failure, payload).await
    }

    async fn handle(
        &self,
        endpoint: CallbackEndpoint,
        payload: &CallbackPayload,
    ) -> Result<Option<PaymentOutcome>> {
        let order_id = OrderId::from(payload.order_number.as_str());

        // Removing before verifying guarantees a single delivery when the
        // gateway posts the same order twice concurrently.
        let Some(payment) = self.store.take(&order_id).await? else {
            debug!(order_id = %order_id, ?endpoint, "ignoring callback for unknown order");
            return Ok(None);
        };

        let code_matches = authcode::verify(payment.secret.expose(), payload);
        let outcome = endpoint.outcome(code_matches, &payload.return_code);

        match &outcome {
            PaymentOutcome::Paid => info!(order_id = %order_id, "payment settled"),
            PaymentOutcome::Failed(FailureReason::Tampered) => {
                warn!(order_id = %order_id, ?endpoint, "authcode mismatch, payment rejected")
            }
            PaymentOutcome::Failed(reason) => {
                warn!(order_id = %order_id, return_code = %payload.return_code, %reason, "payment failed")
            }
        }

        payment.resolve(outcome.clone());
        Ok(Some(outcome))
    }

    /// Resolves every payment older than the configured TTL as expired.
    ///
    /// Returns the number of evicted payments. Without a TTL nothing expires.
    pub async fn evict_expired(&self) -> Result<usize> {
        let Some(ttl) = self.pending_ttl else {
            return Ok(0);
        };
        let expired = self.store.take_older_than(ttl).await?;
        let count = expired.len();
        for payment in expired {
            warn!(order_id = %payment.order_id, "pending payment expired");
            payment.resolve(PaymentOutcome::Failed(FailureReason::Expired));
        }
        Ok(count)
    }

    pub async fn pending_count(&self) -> Result<usize> {
        self.store.count().await
    }
}
