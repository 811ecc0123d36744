//! Session-related types and helpers.
//!
//! State carried across requests: the checkout in progress, the anonymous
//! contributor handle, and the last placed order for the confirmation page.

use tower_sessions::Session;

use koufeta_core::CheckoutId;

use crate::gateway::types::PlacedOrder;

/// Session keys for checkout and gifting state.
pub mod keys {
    /// Key for the id of the checkout in progress.
    pub const CHECKOUT_ID: &str = "checkout_id";

    /// Key for the anonymous contributor handle.
    pub const CONTRIBUTOR_ID: &str = "contributor_id";

    /// Key for the most recently placed order.
    pub const LAST_ORDER: &str = "last_order";
}

/// Get the id of the checkout in progress, if any.
pub async fn checkout_id(session: &Session) -> Option<CheckoutId> {
    session
        .get::<CheckoutId>(keys::CHECKOUT_ID)
        .await
        .ok()
        .flatten()
}

/// Attach a checkout to the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_checkout_id(
    session: &Session,
    checkout_id: &CheckoutId,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CHECKOUT_ID, checkout_id).await
}

/// Detach the checkout from the session.
///
/// Called after the order is placed, or when the gateway no longer knows
/// the checkout id we were holding.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_checkout_id(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<CheckoutId>(keys::CHECKOUT_ID).await?;
    Ok(())
}

/// Record the placed order for the confirmation page.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn remember_order(
    session: &Session,
    order: &PlacedOrder,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::LAST_ORDER, order).await
}

/// Get the most recently placed order, if any.
pub async fn last_order(session: &Session) -> Option<PlacedOrder> {
    session
        .get::<PlacedOrder>(keys::LAST_ORDER)
        .await
        .ok()
        .flatten()
}
