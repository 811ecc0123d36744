//! Group-gifting contribution flow.
//!
//! A contribution runs in three steps: fetch the item's current funding
//! state, authorize the pledge locally against it, then submit it to the
//! gateway. The gateway is the serialization point for concurrent pledges;
//! the local check only catches amounts that are already stale or invalid
//! before a network round trip is spent on them.

use thiserror::Error;
use tracing::{info, instrument};

use koufeta_core::{CheckoutId, ContributorId, Money, RegistryId, VariantId};

use crate::gateway::{error_codes, GatewayError};

use super::ledger::{self, LedgerError};
use super::RegistryItem;

/// Registry operations the contribution flow needs from the commerce
/// gateway.
#[allow(async_fn_in_trait)]
pub trait RegistryGateway {
    /// Fetch the current funding state of one registry item.
    async fn registry_item(
        &self,
        registry_id: RegistryId,
        variant_id: &VariantId,
    ) -> Result<RegistryItem, GatewayError>;

    /// Submit a contribution. The gateway re-checks the remaining balance
    /// atomically and refuses amounts that no longer fit.
    async fn add_contribution(
        &self,
        request: &ContributionRequest,
    ) -> Result<ContributionReceipt, GatewayError>;
}

/// A contribution as submitted to the gateway.
#[derive(Debug, Clone)]
pub struct ContributionRequest {
    pub registry_id: RegistryId,
    pub variant_id: VariantId,
    pub amount: Money,
    pub contributor: ContributorId,
    /// Existing checkout to attach the contribution line to, if the
    /// contributor already has one open.
    pub checkout_id: Option<CheckoutId>,
}

/// What the gateway returned for an accepted contribution.
#[derive(Debug, Clone)]
pub struct ContributionReceipt {
    /// The checkout carrying the contribution line. Created by the
    /// gateway when the request did not name one.
    pub checkout_id: Option<CheckoutId>,
    /// Funding state after the contribution was applied.
    pub item: RegistryItem,
}

/// Result of a contribution attempt that reached the gateway.
#[derive(Debug, Clone)]
pub enum ContributionOutcome {
    /// The gateway accepted the pledge.
    Accepted {
        checkout_id: Option<CheckoutId>,
        item: RegistryItem,
    },
    /// A concurrent contributor changed the balance between our fetch and
    /// our submission, and the pledged amount no longer fits. Carries a
    /// fresh funding state so the caller can re-render it.
    Outpaced { item: RegistryItem },
}

#[derive(Debug, Error)]
pub enum ContributionError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Run the full contribution flow for one pledge.
///
/// # Errors
///
/// Returns [`ContributionError::Ledger`] when the pledge fails the local
/// authorization checks, and [`ContributionError::Gateway`] when a gateway
/// call fails for any reason other than losing a funding race.
#[instrument(
    skip(gateway),
    fields(registry_id = %registry_id, variant_id = %variant_id, amount = %amount)
)]
pub async fn contribute<G: RegistryGateway>(
    gateway: &G,
    registry_id: RegistryId,
    variant_id: &VariantId,
    amount: Money,
    contributor: ContributorId,
    checkout_id: Option<CheckoutId>,
) -> Result<ContributionOutcome, ContributionError> {
    let item = gateway.registry_item(registry_id, variant_id).await?;
    let authorized = ledger::authorize(&item, amount, contributor)?;

    let request = ContributionRequest {
        registry_id,
        variant_id: variant_id.clone(),
        amount: authorized.contribution.amount,
        contributor,
        checkout_id,
    };

    match gateway.add_contribution(&request).await {
        Ok(receipt) => Ok(ContributionOutcome::Accepted {
            checkout_id: receipt.checkout_id,
            item: receipt.item,
        }),
        Err(GatewayError::Fields(errors))
            if errors
                .iter()
                .any(|e| e.code == error_codes::CONTRIBUTION_EXCEEDS_BALANCE) =>
        {
            // Lost the race to another contributor. Surface the state they
            // left behind instead of a hard error.
            info!("contribution outpaced by concurrent funding");
            let item = gateway.registry_item(registry_id, variant_id).await?;
            Ok(ContributionOutcome::Outpaced { item })
        }
        Err(err) => Err(err.into()),
    }
}
