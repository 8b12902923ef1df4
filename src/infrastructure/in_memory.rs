use crate::domain::payment::{Environment, OrderId, PendingPayment};
use crate::domain::ports::PendingStore;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// A thread-safe in-memory store for pending payments.
///
/// Uses `Arc<Mutex<HashMap<OrderId, PendingPayment>>>` so that creation,
/// lookup and removal are mutually exclusive. Records own a non-`Sync`
/// completion callback, which rules out an `RwLock`.
/// Records are lost when the process exits.
#[derive(Default, Clone)]
pub struct InMemoryPendingStore {
    payments: Arc<Mutex<HashMap<OrderId, PendingPayment>>>,
}

impl InMemoryPendingStore {
    /// Creates a new, empty in-memory pending store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PendingStore for InMemoryPendingStore {
    async fn insert(&self, payment: PendingPayment) -> Result<()> {
        let mut payments = self.payments.lock().await;
        if payments.contains_key(&payment.order_id) {
            return Err(PaymentError::DuplicateOrder(payment.order_id.to_string()));
        }
        payments.insert(payment.order_id.clone(), payment);
        Ok(())
    }

    async fn environment(&self, order_id: &OrderId) -> Result<Option<Environment>> {
        let payments = self.payments.lock().await;
        Ok(payments.get(order_id).map(|payment| payment.environment))
    }

    async fn take(&self, order_id: &OrderId) -> Result<Option<PendingPayment>> {
        let mut payments = self.payments.lock().await;
        Ok(payments.remove(order_id))
    }

    async fn take_older_than(&self, age: Duration) -> Result<Vec<PendingPayment>> {
        let mut payments = self.payments.lock().await;
        let expired: Vec<OrderId> = payments
            .values()
            .filter(|payment| payment.created_at.elapsed() > age)
            .map(|payment| payment.order_id.clone())
            .collect();
        Ok(expired
            .iter()
            .filter_map(|order_id| payments.remove(order_id))
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        let payments = self.payments.lock().await;
        Ok(payments.len())
    }
}
