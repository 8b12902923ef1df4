#![allow(dead_code)]

use paygate::application::registry::PaymentRegistry;
use paygate::domain::authcode;
use paygate::domain::callback::CallbackPayload;
use paygate::domain::payment::Resolution;
use paygate::infrastructure::in_memory::InMemoryPendingStore;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const MERCHANT_ID: &str = "1111";
pub const SECRET: &str = "1234125126362364";
pub const SETTLED: &str = "1";

pub fn gateway_config() -> HashMap<String, String> {
    [
        ("payment_pay_url", "https://www.paybyway.com/e-payments/test_pay"),
        ("payment_return_url", "https://localhost/paid"),
        ("payment_cancel_url", "https://localhost/cancelled"),
        ("payment_demo_pay_url", "demopay"),
        ("payment_demo_return_url", "demopaid"),
        ("payment_demo_cancel_url", "democancelled"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub fn registry() -> PaymentRegistry {
    PaymentRegistry::from_source(&gateway_config(), Box::new(InMemoryPendingStore::new()))
        .expect("test config is complete")
}

/// A callback signed the way the gateway signs it.
pub fn valid_callback(secret: &str, order_number: &str, return_code: &str) -> CallbackPayload {
    let settled = (return_code == "0").then(|| SETTLED.to_string());
    let authcode = authcode::inbound(secret, return_code, order_number, settled.as_deref(), None);

    CallbackPayload {
        order_number: order_number.to_string(),
        return_code: return_code.to_string(),
        authcode: authcode.into_string(),
        settled,
        incident_id: None,
    }
}

/// Collects every resolution delivered to the returned callback.
pub fn recorder() -> (
    Arc<Mutex<Vec<Resolution>>>,
    impl FnOnce(Resolution) + Send + 'static,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |resolution| sink.lock().unwrap().push(resolution))
}
