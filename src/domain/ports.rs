use super::payment::{Environment, OrderId, PendingPayment};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Storage for payments awaiting a gateway callback.
///
/// Every operation must be atomic with respect to the others. `take` is the
/// only way a record leaves the store, which is what makes resolution
/// exactly-once: of two racing callbacks, only one gets the record.
#[async_trait]
pub trait PendingStore: Send + Sync {
    /// Stores a new record. Fails with `DuplicateOrder` if the id is taken.
    async fn insert(&self, payment: PendingPayment) -> Result<()>;
    async fn environment(&self, order_id: &OrderId) -> Result<Option<Environment>>;
    /// Removes and returns the record, if present.
    async fn take(&self, order_id: &OrderId) -> Result<Option<PendingPayment>>;
    /// Removes and returns every record created more than `age` ago.
    async fn take_older_than(&self, age: Duration) -> Result<Vec<PendingPayment>>;
    async fn count(&self) -> Result<usize>;
}

pub type PendingStoreBox = Box<dyn PendingStore>;
pub type PendingStoreFactory = Box<dyn Fn() -> PendingStoreBox + Send + Sync>;

/// Key-value configuration lookup.
pub trait ConfigSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}
