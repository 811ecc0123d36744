//! Checkout pipeline tests against the scripted gateway.
//!
//! Cover the ordering guarantee, halt-on-first-failure, full-replace resend
//! safety and the validation gate that runs before any network call.

use rust_decimal_macros::dec;

use koufeta_integration_tests::{
    GatewayCall, ScriptedGateway, complete_request, eur, field_error,
};
use koufeta_storefront::checkout::{AddressKind, CheckoutError, CheckoutStage, run};
use koufeta_storefront::gateway::GatewayError;

/// The full mutation sequence of a successful run.
const FULL_RUN: [GatewayCall; 7] = [
    GatewayCall::UpdateShippingAddress,
    GatewayCall::UpdateBillingAddress,
    GatewayCall::UpdateEmail,
    GatewayCall::SelectDeliveryMethod,
    GatewayCall::FetchTotal,
    GatewayCall::CreatePayment,
    GatewayCall::Complete,
];

#[tokio::test]
async fn successful_run_invokes_every_step_in_order() {
    let gateway = ScriptedGateway::new();

    let completed = run(&gateway, &complete_request())
        .await
        .expect("pipeline should complete");

    assert_eq!(gateway.calls(), FULL_RUN);
    assert_eq!(completed.order.number, "1042");
    assert_eq!(gateway.orders().len(), 1);
}

#[tokio::test]
async fn shipping_failure_halts_before_any_later_step() {
    let gateway = ScriptedGateway::new();
    gateway.fail_at(
        GatewayCall::UpdateShippingAddress,
        field_error("postalCode", "Invalid postal code"),
    );

    let err = run(&gateway, &complete_request())
        .await
        .expect_err("pipeline should halt");

    assert!(matches!(
        err,
        CheckoutError::Gateway {
            stage: CheckoutStage::UpdatingShippingAddress,
            source: GatewayError::Fields(_),
        }
    ));
    // Nothing after the failed mutation was attempted
    assert_eq!(gateway.calls(), vec![GatewayCall::UpdateShippingAddress]);
    assert!(gateway.billing_address().is_none());
    assert!(gateway.email().is_none());
    assert!(gateway.payments().is_empty());
    assert!(gateway.orders().is_empty());
}

#[tokio::test]
async fn payment_failure_never_reaches_completion() {
    let gateway = ScriptedGateway::new();
    gateway.fail_at(
        GatewayCall::CreatePayment,
        field_error("token", "Card declined"),
    );

    let err = run(&gateway, &complete_request())
        .await
        .expect_err("pipeline should halt");

    assert!(matches!(
        err,
        CheckoutError::Gateway {
            stage: CheckoutStage::CreatingPayment,
            ..
        }
    ));
    let calls = gateway.calls();
    assert_eq!(calls.last(), Some(&GatewayCall::CreatePayment));
    assert!(!calls.contains(&GatewayCall::Complete));
    assert!(gateway.orders().is_empty());
}

#[tokio::test]
async fn resubmitting_identical_input_is_a_full_replace() {
    let gateway = ScriptedGateway::new();
    let request = complete_request();

    run(&gateway, &request).await.expect("first run");
    let first_shipping = gateway.shipping_address().expect("shipping stored");

    run(&gateway, &request).await.expect("second run");
    let second_shipping = gateway.shipping_address().expect("shipping stored");

    // The stored address is overwritten, not appended to: both runs leave
    // the gateway holding exactly the submitted address
    assert_eq!(first_shipping.0.street_address1, "Ermou 41");
    assert_eq!(second_shipping.0.street_address1, "Ermou 41");
    assert_eq!(first_shipping.1, second_shipping.1);
    assert_eq!(gateway.billing_address().expect("billing stored").0.city, "Athens");

    // Two full runs, each with the complete sequence
    assert_eq!(gateway.calls().len(), FULL_RUN.len() * 2);
    assert_eq!(gateway.orders().len(), 2);
}

#[tokio::test]
async fn payment_is_created_for_the_freshly_fetched_total() {
    // Subtotal alone is 160; selecting the delivery method raises the
    // authoritative total to 175. The payment must carry the post-delivery
    // amount, proving the total is fetched after delivery selection.
    let gateway = ScriptedGateway::with_totals(eur(dec!(160)), eur(dec!(15)));

    let completed = run(&gateway, &complete_request())
        .await
        .expect("pipeline should complete");

    let payments = gateway.payments();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount, eur(dec!(175)));
    assert_eq!(payments[0].token, "tok_vis_4242");
    assert_eq!(completed.amount_charged, eur(dec!(175)));
}

#[tokio::test]
async fn missing_checkout_id_fails_before_any_network_call() {
    let gateway = ScriptedGateway::new();
    let mut request = complete_request();
    request.checkout_id = None;

    let err = run(&gateway, &request).await.expect_err("must fail");

    assert!(matches!(err, CheckoutError::MissingCheckout));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn incomplete_shipping_address_fails_before_any_network_call() {
    let gateway = ScriptedGateway::new();
    let mut request = complete_request();
    request.shipping_address.city = String::new();

    let err = run(&gateway, &request).await.expect_err("must fail");

    match err {
        CheckoutError::IncompleteAddress { kind, fields } => {
            assert_eq!(kind, AddressKind::Shipping);
            assert_eq!(fields, vec!["city"]);
        }
        other => panic!("expected IncompleteAddress, got {other:?}"),
    }
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn incomplete_billing_address_is_reported_separately() {
    let gateway = ScriptedGateway::new();
    let mut request = complete_request();
    request.billing_address.postal_code = "  ".to_string();

    let err = run(&gateway, &request).await.expect_err("must fail");

    assert!(matches!(
        err,
        CheckoutError::IncompleteAddress {
            kind: AddressKind::Billing,
            ..
        }
    ));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn blank_contact_info_fails_validation() {
    let gateway = ScriptedGateway::new();
    let mut request = complete_request();
    request.contact.phone = String::new();

    let err = run(&gateway, &request).await.expect_err("must fail");

    assert!(matches!(err, CheckoutError::IncompleteContactInfo));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn missing_payment_token_fails_validation() {
    let gateway = ScriptedGateway::new();
    let mut request = complete_request();
    request.payment.token = "   ".to_string();

    let err = run(&gateway, &request).await.expect_err("must fail");

    assert!(matches!(err, CheckoutError::MissingPayment));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn missing_delivery_method_fails_validation() {
    let gateway = ScriptedGateway::new();
    let mut request = complete_request();
    request.delivery_method_id = None;

    let err = run(&gateway, &request).await.expect_err("must fail");

    assert!(matches!(err, CheckoutError::MissingDeliveryMethod));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn completion_errors_are_terminal_for_the_attempt() {
    let gateway = ScriptedGateway::new();
    gateway.fail_at(
        GatewayCall::Complete,
        field_error("lines", "An item in this checkout has sold out"),
    );

    let err = run(&gateway, &complete_request())
        .await
        .expect_err("must fail");

    // Field errors on the completion step surface as Completion, carrying
    // the gateway's messages for the buyer
    match err {
        CheckoutError::Completion(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].message.contains("sold out"));
        }
        other => panic!("expected Completion, got {other:?}"),
    }
    assert!(gateway.orders().is_empty());

    // Everything before completion was written; a user-initiated rerun can
    // safely resend it all
    assert!(gateway.shipping_address().is_some());
    assert_eq!(gateway.payments().len(), 1);
}

#[tokio::test]
async fn failed_run_can_be_retried_and_succeed() {
    let gateway = ScriptedGateway::new();
    gateway.fail_at(
        GatewayCall::UpdateEmail,
        field_error("email", "Invalid email"),
    );
    let request = complete_request();

    let err = run(&gateway, &request).await.expect_err("first run halts");
    assert!(matches!(
        err,
        CheckoutError::Gateway {
            stage: CheckoutStage::UpdatingEmail,
            ..
        }
    ));

    // The user fixes nothing gateway-side; clearing the scripted failure
    // models a transient rejection. The rerun starts from the top.
    let retry_gateway = ScriptedGateway::new();
    run(&retry_gateway, &request).await.expect("retry succeeds");
    assert_eq!(retry_gateway.calls(), FULL_RUN);
}
