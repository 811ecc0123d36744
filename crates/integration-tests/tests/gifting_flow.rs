//! Group-gifting contribution flow tests against the scripted gateway.
//!
//! Exercise the fetch-authorize-submit sequence, the advisory ledger
//! rejections, the funding invariant and the concurrent-contributor race.

use rust_decimal_macros::dec;

use koufeta_core::Money;
use koufeta_integration_tests::{GatewayCall, ScriptedGateway, contributor, eur, group_gift};
use koufeta_storefront::registry::{
    ContributionError, ContributionOutcome, LedgerError, RegistryItem, contribute,
};

fn funding_invariant_holds(item: &RegistryItem) -> bool {
    item.pledged_amount.checked_add(item.remaining_balance) == Some(item.target_price)
        && !item.remaining_balance.amount().is_sign_negative()
}

async fn pledge(gateway: &ScriptedGateway, amount: Money) -> Result<ContributionOutcome, ContributionError> {
    let item = gateway.item().expect("gateway seeded with an item");
    contribute(
        gateway,
        item.registry_id,
        &item.variant_id,
        amount,
        contributor(),
        None,
    )
    .await
}

#[tokio::test]
async fn accepted_contribution_decrements_the_balance() {
    let gateway = ScriptedGateway::with_item(group_gift(dec!(300), dec!(120)));

    let outcome = pledge(&gateway, eur(dec!(50))).await.expect("accepted");

    match outcome {
        ContributionOutcome::Accepted { checkout_id, item } => {
            assert!(checkout_id.is_some());
            assert_eq!(item.pledged_amount, eur(dec!(170)));
            assert_eq!(item.remaining_balance, eur(dec!(130)));
            assert!(funding_invariant_holds(&item));
        }
        ContributionOutcome::Outpaced { .. } => panic!("no concurrent contributor scripted"),
    }

    // Fetch happens before submission
    assert_eq!(
        gateway.calls(),
        vec![GatewayCall::FetchRegistryItem, GatewayCall::AddContribution]
    );
}

#[tokio::test]
async fn funding_invariant_holds_across_a_sequence_of_pledges() {
    let gateway = ScriptedGateway::with_item(group_gift(dec!(100), dec!(0)));

    for amount in [dec!(40), dec!(25.50), dec!(34.50)] {
        pledge(&gateway, eur(amount)).await.expect("accepted");
        let item = gateway.item().expect("item present");
        assert!(funding_invariant_holds(&item));
    }

    let item = gateway.item().expect("item present");
    assert!(item.is_fully_funded());
    assert!(item.remaining_balance.is_zero());
}

#[tokio::test]
async fn scenario_contributions_to_the_exact_target_then_reject() {
    // targetPrice 100: 40 then 60 are authorized, a third pledge of 0.01
    // fails with AlreadyFullyFunded
    let gateway = ScriptedGateway::with_item(group_gift(dec!(100), dec!(0)));

    pledge(&gateway, eur(dec!(40))).await.expect("first pledge");
    pledge(&gateway, eur(dec!(60))).await.expect("second pledge");

    let err = pledge(&gateway, eur(dec!(0.01)))
        .await
        .expect_err("item is closed");
    assert!(matches!(
        err,
        ContributionError::Ledger(LedgerError::AlreadyFullyFunded)
    ));
}

#[tokio::test]
async fn overlarge_pledge_is_rejected_locally_and_leaves_state_untouched() {
    let gateway = ScriptedGateway::with_item(group_gift(dec!(100), dec!(75)));

    let err = pledge(&gateway, eur(dec!(30)))
        .await
        .expect_err("exceeds balance");

    match err {
        ContributionError::Ledger(LedgerError::ExceedsRemainingBalance { remaining }) => {
            assert_eq!(remaining, eur(dec!(25)));
        }
        other => panic!("expected ExceedsRemainingBalance, got {other:?}"),
    }

    // The rejection is local: the item was fetched but nothing was submitted
    assert_eq!(gateway.calls(), vec![GatewayCall::FetchRegistryItem]);
    let item = gateway.item().expect("item present");
    assert_eq!(item.remaining_balance, eur(dec!(25)));
}

#[tokio::test]
async fn non_positive_pledge_is_rejected_locally() {
    let gateway = ScriptedGateway::with_item(group_gift(dec!(100), dec!(0)));

    let err = pledge(&gateway, eur(dec!(0))).await.expect_err("invalid");

    assert!(matches!(
        err,
        ContributionError::Ledger(LedgerError::InvalidAmount(_))
    ));
    assert_eq!(gateway.calls(), vec![GatewayCall::FetchRegistryItem]);
}

#[tokio::test]
async fn losing_the_funding_race_is_not_an_error() {
    // Remaining balance is 30 when fetched, but a concurrent contributor
    // pledges 25 before our submission lands, leaving room for only 5
    let gateway = ScriptedGateway::with_item(group_gift(dec!(100), dec!(70)));
    gateway.outpace_next_contribution(eur(dec!(25)));

    let outcome = pledge(&gateway, eur(dec!(30))).await.expect("reconciled");

    match outcome {
        ContributionOutcome::Outpaced { item } => {
            // The fresh funding state reflects the winner's pledge
            assert_eq!(item.remaining_balance, eur(dec!(5)));
            assert!(funding_invariant_holds(&item));
        }
        ContributionOutcome::Accepted { .. } => panic!("the race was scripted to be lost"),
    }

    // Fetch, rejected submission, then the reconciliation re-fetch
    assert_eq!(
        gateway.calls(),
        vec![
            GatewayCall::FetchRegistryItem,
            GatewayCall::AddContribution,
            GatewayCall::FetchRegistryItem,
        ]
    );
}

#[tokio::test]
async fn race_to_a_fully_funded_item_renders_the_closed_state() {
    // The concurrent contributor takes everything that was left
    let gateway = ScriptedGateway::with_item(group_gift(dec!(100), dec!(80)));
    gateway.outpace_next_contribution(eur(dec!(20)));

    let outcome = pledge(&gateway, eur(dec!(10))).await.expect("reconciled");

    match outcome {
        ContributionOutcome::Outpaced { item } => {
            assert!(item.is_fully_funded());
            assert!(item.remaining_balance.is_zero());
        }
        ContributionOutcome::Accepted { .. } => panic!("the race was scripted to be lost"),
    }
}

#[tokio::test]
async fn exact_remaining_balance_closes_the_item() {
    let gateway = ScriptedGateway::with_item(group_gift(dec!(250), dec!(200)));

    let outcome = pledge(&gateway, eur(dec!(50))).await.expect("accepted");

    match outcome {
        ContributionOutcome::Accepted { item, .. } => {
            assert!(item.is_fully_funded());
            assert_eq!(item.pledged_amount, eur(dec!(250)));
        }
        ContributionOutcome::Outpaced { .. } => panic!("no concurrent contributor scripted"),
    }
}
