//! Group-gifting registry domain.
//!
//! Couples invite guests to fund big-ticket gifts together: each registry
//! line carries a funding target, and guests pledge arbitrary amounts until
//! the target is met. The commerce gateway owns the authoritative funding
//! state; this module holds the read-side mirror, the local authorization
//! rules ([`ledger`]) and the contribution flow ([`gifting`]).

pub mod gifting;
pub mod ledger;

pub use gifting::{
    ContributionError, ContributionOutcome, ContributionReceipt, ContributionRequest,
    RegistryGateway, contribute,
};
pub use ledger::{Authorized, LedgerError};

use chrono::{DateTime, Utc};

use koufeta_core::{ContributorId, Money, RegistryId, VariantId};

/// A registry line as the gateway reports it.
///
/// Invariant maintained by the gateway and preserved by the ledger:
/// `pledged_amount + remaining_balance == target_price`, with
/// `remaining_balance` never negative.
#[derive(Debug, Clone)]
pub struct RegistryItem {
    pub registry_id: RegistryId,
    pub variant_id: VariantId,
    pub variant_name: String,
    pub quantity: i64,
    /// Virtual items (honeymoon funds and the like) skip shipping.
    pub is_virtual: bool,
    /// Whether guests may fund this item in parts.
    pub is_group_gifting: bool,
    pub target_price: Money,
    pub pledged_amount: Money,
    pub remaining_balance: Money,
    /// Set once the item has been bought outright.
    pub is_purchased: bool,
}

impl RegistryItem {
    /// Whether the funding goal has been reached.
    ///
    /// A fully funded item accepts no further contributions.
    #[must_use]
    pub fn is_fully_funded(&self) -> bool {
        !self.remaining_balance.is_positive()
    }
}

/// An accepted pledge against a registry line.
///
/// Immutable once authorized; adjustments happen through the registry
/// owner's tools on the gateway, never by editing a contribution.
#[derive(Debug, Clone)]
pub struct Contribution {
    pub registry_id: RegistryId,
    pub variant_id: VariantId,
    pub amount: Money,
    pub contributor: ContributorId,
    pub created_at: DateTime<Utc>,
}
