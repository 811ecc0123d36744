//! Local contribution authorization.
//!
//! [`authorize`] checks a pledge against the most recently fetched funding
//! state. The check is advisory: the gateway re-validates atomically when
//! the contribution is submitted, and under concurrent funding the gateway
//! can still refuse an amount that passed here. See
//! [`gifting::contribute`](super::gifting::contribute) for how that
//! refusal is reconciled.

use chrono::Utc;
use thiserror::Error;

use koufeta_core::{ContributorId, Money};

use super::{Contribution, RegistryItem};

/// Why a contribution was refused.
///
/// Checked in a fixed order: amount validity first, then the terminal
/// fully-funded state, then the balance. A contribution against a fully
/// funded item always reports [`LedgerError::AlreadyFullyFunded`], even
/// when the amount would also exceed the (zero) remaining balance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Non-positive amount, or a currency other than the item's.
    #[error("invalid contribution amount: {0}")]
    InvalidAmount(Money),
    /// The funding goal was already reached.
    #[error("this gift is already fully funded")]
    AlreadyFullyFunded,
    /// The amount is larger than what is left to fund.
    #[error("contribution exceeds the remaining balance of {remaining}")]
    ExceedsRemainingBalance {
        /// The balance that was still open when the pledge was checked.
        remaining: Money,
    },
}

/// A locally authorized pledge plus the item state it would produce.
#[derive(Debug, Clone)]
pub struct Authorized {
    pub contribution: Contribution,
    /// The item with the pledge applied. Advisory only; the gateway's
    /// answer on submission is authoritative.
    pub item: RegistryItem,
}

/// Authorize a pledge against the given funding state.
///
/// On success the returned item preserves
/// `pledged_amount + remaining_balance == target_price`.
///
/// # Errors
///
/// Returns [`LedgerError`] when the amount is invalid, the item is already
/// fully funded, or the amount exceeds the remaining balance.
pub fn authorize(
    item: &RegistryItem,
    amount: Money,
    contributor: ContributorId,
) -> Result<Authorized, LedgerError> {
    if !amount.is_positive() || amount.currency() != item.target_price.currency() {
        return Err(LedgerError::InvalidAmount(amount));
    }
    if item.is_fully_funded() {
        return Err(LedgerError::AlreadyFullyFunded);
    }
    if amount.amount() > item.remaining_balance.amount() {
        return Err(LedgerError::ExceedsRemainingBalance {
            remaining: item.remaining_balance,
        });
    }

    // Currencies were checked above, so these cannot fail on mismatch
    let pledged_amount = item
        .pledged_amount
        .checked_add(amount)
        .ok_or(LedgerError::InvalidAmount(amount))?;
    let remaining_balance = item
        .remaining_balance
        .checked_sub(amount)
        .ok_or(LedgerError::InvalidAmount(amount))?;

    let contribution = Contribution {
        registry_id: item.registry_id,
        variant_id: item.variant_id.clone(),
        amount,
        contributor,
        created_at: Utc::now(),
    };

    Ok(Authorized {
        contribution,
        item: RegistryItem {
            pledged_amount,
            remaining_balance,
            ..item.clone()
        },
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use koufeta_core::{CurrencyCode, RegistryId, VariantId};

    use super::*;

    fn eur(amount: Decimal) -> Money {
        Money::new(amount, CurrencyCode::Eur)
    }

    fn item(target: Decimal, pledged: Decimal) -> RegistryItem {
        RegistryItem {
            registry_id: RegistryId::generate(),
            variant_id: VariantId::from("UHJvZHVjdFZhcmlhbnQ6NDI="),
            variant_name: "Espresso machine".to_string(),
            quantity: 1,
            is_virtual: false,
            is_group_gifting: true,
            target_price: eur(target),
            pledged_amount: eur(pledged),
            remaining_balance: eur(target - pledged),
            is_purchased: false,
        }
    }

    #[test]
    fn test_authorize_updates_both_sides_of_the_balance() {
        let contributor = ContributorId::generate();
        let authorized = authorize(&item(dec!(300), dec!(120)), eur(dec!(50)), contributor).unwrap();

        assert_eq!(authorized.item.pledged_amount, eur(dec!(170)));
        assert_eq!(authorized.item.remaining_balance, eur(dec!(130)));
        assert_eq!(authorized.contribution.amount, eur(dec!(50)));
        assert_eq!(authorized.contribution.contributor, contributor);
    }

    #[test]
    fn test_authorize_preserves_target_invariant() {
        let it = item(dec!(300), dec!(120));
        let authorized = authorize(&it, eur(dec!(75.50)), ContributorId::generate()).unwrap();

        let sum = authorized
            .item
            .pledged_amount
            .checked_add(authorized.item.remaining_balance)
            .unwrap();
        assert_eq!(sum, it.target_price);
        assert!(authorized.item.remaining_balance.is_positive());
    }

    #[test]
    fn test_zero_amount_is_invalid() {
        let err = authorize(
            &item(dec!(100), dec!(0)),
            eur(dec!(0)),
            ContributorId::generate(),
        )
        .unwrap_err();
        assert_eq!(err, LedgerError::InvalidAmount(eur(dec!(0))));
    }

    #[test]
    fn test_negative_amount_is_invalid() {
        let err = authorize(
            &item(dec!(100), dec!(0)),
            eur(dec!(-10)),
            ContributorId::generate(),
        )
        .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }

    #[test]
    fn test_currency_mismatch_is_invalid() {
        let pounds = Money::new(dec!(10), CurrencyCode::Gbp);
        let err = authorize(&item(dec!(100), dec!(0)), pounds, ContributorId::generate())
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }

    #[test]
    fn test_exceeding_the_balance_reports_what_remains() {
        let err = authorize(
            &item(dec!(100), dec!(80)),
            eur(dec!(30)),
            ContributorId::generate(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            LedgerError::ExceedsRemainingBalance {
                remaining: eur(dec!(20)),
            }
        );
    }

    #[test]
    fn test_exact_remaining_balance_fully_funds_the_item() {
        let authorized = authorize(
            &item(dec!(100), dec!(80)),
            eur(dec!(20)),
            ContributorId::generate(),
        )
        .unwrap();

        assert!(authorized.item.is_fully_funded());
        assert_eq!(authorized.item.pledged_amount, eur(dec!(100)));
        assert!(authorized.item.remaining_balance.is_zero());
    }

    #[test]
    fn test_fully_funded_item_rejects_even_one_cent() {
        // Fully funded wins over exceeds-balance: the caller learns the
        // item is closed, not that one cent was too much
        let err = authorize(
            &item(dec!(100), dec!(100)),
            eur(dec!(0.01)),
            ContributorId::generate(),
        )
        .unwrap_err();
        assert_eq!(err, LedgerError::AlreadyFullyFunded);
    }

    #[test]
    fn test_fully_funded_item_rejects_large_amounts_the_same_way() {
        let err = authorize(
            &item(dec!(100), dec!(100)),
            eur(dec!(500)),
            ContributorId::generate(),
        )
        .unwrap_err();
        assert_eq!(err, LedgerError::AlreadyFullyFunded);
    }

    #[test]
    fn test_is_fully_funded_transitions_at_zero_remaining() {
        assert!(!item(dec!(100), dec!(99.99)).is_fully_funded());
        assert!(item(dec!(100), dec!(100)).is_fully_funded());
    }
}
