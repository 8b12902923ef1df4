use paygate::domain::authcode;
use paygate::domain::callback::CallbackPayload;
use paygate::domain::config::Endpoints;
use paygate::domain::payment::{Environment, FailureReason, OrderId, PaymentOutcome};
use paygate::error::PaymentError;
use rust_decimal_macros::dec;

mod common;
use common::{MERCHANT_ID, SECRET, recorder, registry, valid_callback};

#[tokio::test]
async fn test_consecutive_payments_get_distinct_order_numbers() {
    let registry = registry();
    let first = registry
        .create_payment(Environment::Real, dec!(2), MERCHANT_ID, SECRET, |_| {})
        .await
        .unwrap();
    let second = registry
        .create_payment(Environment::Real, dec!(2), MERCHANT_ID, SECRET, |_| {})
        .await
        .unwrap();

    assert_ne!(first.order_number, second.order_number);
    assert_eq!(registry.pending_count().await.unwrap(), 2);
}

#[test]
fn test_registry_exposes_resolved_endpoints() {
    let registry = registry();
    let config = registry.config();

    assert_eq!(
        config.real,
        Endpoints {
            pay_url: "https://www.paybyway.com/e-payments/test_pay".to_string(),
            return_url: "https://localhost/paid".to_string(),
            cancel_url: "https://localhost/cancelled".to_string(),
        }
    );
    assert_eq!(
        config.demo,
        Endpoints {
            pay_url: "demopay".to_string(),
            return_url: "demopaid".to_string(),
            cancel_url: "democancelled".to_string(),
        }
    );
    assert_eq!(config.endpoints(Environment::Demo), &config.demo);
}

#[tokio::test]
async fn test_amount_in_minor_units() {
    let registry = registry();
    let form = registry
        .create_payment(Environment::Real, dec!(2436), MERCHANT_ID, SECRET, |_| {})
        .await
        .unwrap();

    assert_eq!(form.amount, "243600");
}

#[tokio::test]
async fn test_real_payments_use_real_urls() {
    let registry = registry();
    let form = registry
        .create_payment(Environment::Real, dec!(10), MERCHANT_ID, SECRET, |_| {})
        .await
        .unwrap();
    let url = registry
        .payment_url(&OrderId::from(form.order_number.as_str()))
        .await
        .unwrap();

    assert!(url.ends_with("/test_pay"));
    assert!(form.return_address.ends_with("/paid"));
    assert!(form.cancel_address.ends_with("/cancelled"));
}

#[tokio::test]
async fn test_demo_payments_use_demo_urls() {
    let registry = registry();
    let form = registry
        .create_payment(Environment::Demo, dec!(10), MERCHANT_ID, SECRET, |_| {})
        .await
        .unwrap();
    let url = registry
        .payment_url(&OrderId::from(form.order_number.as_str()))
        .await
        .unwrap();

    assert_eq!(url, "demopay");
    assert_eq!(form.return_address, "demopaid");
    assert_eq!(form.cancel_address, "democancelled");
}

#[tokio::test]
async fn test_environments_do_not_leak_between_payments() {
    let registry = registry();
    let demo = registry
        .create_payment(Environment::Demo, dec!(1), MERCHANT_ID, SECRET, |_| {})
        .await
        .unwrap();
    let real = registry
        .create_payment(Environment::Real, dec!(1), MERCHANT_ID, SECRET, |_| {})
        .await
        .unwrap();

    let demo_url = registry
        .payment_url(&OrderId::from(demo.order_number.as_str()))
        .await
        .unwrap();
    let real_url = registry
        .payment_url(&OrderId::from(real.order_number.as_str()))
        .await
        .unwrap();

    assert_eq!(demo_url, "demopay");
    assert!(real_url.ends_with("/test_pay"));
}

#[tokio::test]
async fn test_form_authcode_signs_selected_addresses() {
    let registry = registry();
    let form = registry
        .create_payment(Environment::Demo, dec!(19.99), MERCHANT_ID, SECRET, |_| {})
        .await
        .unwrap();

    let expected = authcode::outbound(
        SECRET,
        &authcode::OutboundFields {
            merchant_id: MERCHANT_ID,
            amount_minor_units: 1999,
            currency: "EUR",
            order_number: &form.order_number,
            language: "FI",
            return_address: "demopaid",
            cancel_address: "democancelled",
        },
    );
    assert_eq!(form.authcode, expected.as_str());
    assert_eq!(form.authcode, form.authcode.to_uppercase());
    assert_eq!(form.authcode.len(), 32);
}

#[tokio::test]
async fn test_success_callback_round_trip() {
    let registry = registry();
    let (seen, on_resolved) = recorder();
    let form = registry
        .create_payment(Environment::Real, dec!(2), MERCHANT_ID, SECRET, on_resolved)
        .await
        .unwrap();

    let outcome = registry
        .handle_success(&valid_callback(SECRET, &form.order_number, "0"))
        .await
        .unwrap();

    assert_eq!(outcome, Some(PaymentOutcome::Paid));
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].outcome.error(), None);
    assert_eq!(seen[0].order_id.as_str(), form.order_number);
}

#[tokio::test]
async fn test_success_callback_with_wrong_secret_is_tampered() {
    let registry = registry();
    let (seen, on_resolved) = recorder();
    let form = registry
        .create_payment(Environment::Real, dec!(2), MERCHANT_ID, SECRET, on_resolved)
        .await
        .unwrap();

    registry
        .handle_success(&valid_callback("crap", &form.order_number, "0"))
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].outcome, PaymentOutcome::Failed(FailureReason::Tampered));
    assert_eq!(seen[0].outcome.to_string(), "tampered");
}

#[tokio::test]
async fn test_altered_return_code_is_tampered() {
    let registry = registry();
    let (seen, on_resolved) = recorder();
    let form = registry
        .create_payment(Environment::Real, dec!(2), MERCHANT_ID, SECRET, on_resolved)
        .await
        .unwrap();

    let mut payload = valid_callback(SECRET, &form.order_number, "0");
    payload.return_code = "1".to_string();
    registry.handle_success(&payload).await.unwrap();

    assert_eq!(
        seen.lock().unwrap()[0].outcome,
        PaymentOutcome::Failed(FailureReason::Tampered)
    );
}

#[tokio::test]
async fn test_altered_settled_field_is_tampered() {
    let registry = registry();
    let (seen, on_resolved) = recorder();
    let form = registry
        .create_payment(Environment::Demo, dec!(2), MERCHANT_ID, SECRET, on_resolved)
        .await
        .unwrap();

    let mut payload = valid_callback(SECRET, &form.order_number, "0");
    payload.settled = Some("0".to_string());
    registry.handle_success(&payload).await.unwrap();

    assert_eq!(
        seen.lock().unwrap()[0].outcome,
        PaymentOutcome::Failed(FailureReason::Tampered)
    );
}

#[tokio::test]
async fn test_missing_settled_is_not_signed_as_undefined() {
    let registry = registry();
    let (seen, on_resolved) = recorder();
    let form = registry
        .create_payment(Environment::Real, dec!(2), MERCHANT_ID, SECRET, on_resolved)
        .await
        .unwrap();

    let authcode = authcode::inbound(SECRET, "0", &form.order_number, Some("undefined"), None);
    let payload = CallbackPayload {
        order_number: form.order_number.clone(),
        return_code: "0".to_string(),
        authcode: authcode.into_string(),
        settled: None,
        incident_id: None,
    };

    let outcome = registry.handle_success(&payload).await.unwrap();
    assert_eq!(outcome, Some(PaymentOutcome::Failed(FailureReason::Tampered)));
    assert_eq!(registry.handle_success(&payload).await.unwrap(), None);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].outcome, PaymentOutcome::Failed(FailureReason::Tampered));
}

#[tokio::test]
async fn test_non_zero_return_code_on_success_endpoint() {
    let registry = registry();
    let (seen, on_resolved) = recorder();
    let form = registry
        .create_payment(Environment::Real, dec!(2), MERCHANT_ID, SECRET, on_resolved)
        .await
        .unwrap();

    registry
        .handle_success(&valid_callback(SECRET, &form.order_number, "1"))
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        seen[0].outcome,
        PaymentOutcome::Failed(FailureReason::UnexpectedReturnCode("1".to_string()))
    );
    assert_eq!(seen[0].outcome.to_string(), "weird RETURN_CODE");
}

#[tokio::test]
async fn test_failure_callback_reports_payment_failed() {
    let registry = registry();
    let (seen, on_resolved) = recorder();
    let form = registry
        .create_payment(Environment::Real, dec!(2), MERCHANT_ID, SECRET, on_resolved)
        .await
        .unwrap();

    registry
        .handle_failure(&valid_callback(SECRET, &form.order_number, "1"))
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].outcome.to_string(), "payment failed");
    assert_eq!(seen[0].order_id.as_str(), form.order_number);
}

#[tokio::test]
async fn test_failure_callback_with_incident_id() {
    let registry = registry();
    let (seen, on_resolved) = recorder();
    let form = registry
        .create_payment(Environment::Real, dec!(2), MERCHANT_ID, SECRET, on_resolved)
        .await
        .unwrap();

    let code = authcode::inbound(SECRET, "4", &form.order_number, None, Some("INC-42"));
    let payload = CallbackPayload::from_pairs([
        ("ORDER_NUMBER", form.order_number.as_str()),
        ("RETURN_CODE", "4"),
        ("AUTHCODE", code.as_str()),
        ("INCIDENT_ID", "INC-42"),
    ])
    .unwrap();
    registry.handle_failure(&payload).await.unwrap();

    assert_eq!(
        seen.lock().unwrap()[0].outcome,
        PaymentOutcome::Failed(FailureReason::Declined)
    );
}

#[tokio::test]
async fn test_failure_callback_with_altered_return_code_is_tampered() {
    let registry = registry();
    let (seen, on_resolved) = recorder();
    let form = registry
        .create_payment(Environment::Real, dec!(2), MERCHANT_ID, SECRET, on_resolved)
        .await
        .unwrap();

    let mut payload = valid_callback(SECRET, &form.order_number, "1");
    payload.return_code = "2141234122222".to_string();
    registry.handle_failure(&payload).await.unwrap();

    assert_eq!(seen.lock().unwrap()[0].outcome.to_string(), "tampered");
}

#[tokio::test]
async fn test_second_callback_is_ignored() {
    let registry = registry();
    let (seen, on_resolved) = recorder();
    let form = registry
        .create_payment(Environment::Real, dec!(2), MERCHANT_ID, SECRET, on_resolved)
        .await
        .unwrap();

    let success = valid_callback(SECRET, &form.order_number, "0");
    let failure = valid_callback(SECRET, &form.order_number, "1");
    registry.handle_failure(&failure).await.unwrap();

    assert_eq!(registry.handle_success(&success).await.unwrap(), None);
    assert_eq!(registry.handle_failure(&failure).await.unwrap(), None);
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(registry.pending_count().await.unwrap(), 0);

    let url = registry
        .payment_url(&OrderId::from(form.order_number.as_str()))
        .await;
    assert!(matches!(url, Err(PaymentError::UnknownOrder(_))));
}

#[tokio::test]
async fn test_stray_callback_is_ignored() {
    let registry = registry();
    let (seen, on_resolved) = recorder();
    registry
        .create_payment(Environment::Real, dec!(2), MERCHANT_ID, SECRET, on_resolved)
        .await
        .unwrap();

    let outcome = registry
        .handle_success(&valid_callback(SECRET, "B0_999", "0"))
        .await
        .unwrap();

    assert_eq!(outcome, None);
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(registry.pending_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_callback_resolves_only_its_own_payment() {
    let registry = registry();
    let (first_seen, first_cb) = recorder();
    let (second_seen, second_cb) = recorder();
    let first = registry
        .create_payment(Environment::Real, dec!(2), MERCHANT_ID, SECRET, first_cb)
        .await
        .unwrap();
    let second = registry
        .create_payment(Environment::Demo, dec!(3), MERCHANT_ID, "other-secret", second_cb)
        .await
        .unwrap();

    registry
        .handle_success(&valid_callback("other-secret", &second.order_number, "0"))
        .await
        .unwrap();

    assert!(first_seen.lock().unwrap().is_empty());
    assert_eq!(second_seen.lock().unwrap()[0].outcome, PaymentOutcome::Paid);
    assert!(
        registry
            .payment_url(&OrderId::from(first.order_number.as_str()))
            .await
            .is_ok()
    );
}
