//! Domain types for the commerce gateway.
//!
//! These types provide a clean, ergonomic API separate from the raw
//! `graphql_client` generated types. Everything here is a read-only mirror
//! of gateway state; nothing is cached between requests.

use serde::{Deserialize, Serialize};

use koufeta_core::{CheckoutId, Money, OrderId};

/// Machine-readable error codes the storefront reacts to.
///
/// Any other code is surfaced to the user verbatim via the error message.
pub mod error_codes {
    /// A contribution exceeded the item's live remaining balance. Expected
    /// under concurrent funding; the flow re-fetches and re-renders instead
    /// of treating this as a failure.
    pub const CONTRIBUTION_EXCEEDS_BALANCE: &str = "CONTRIBUTION_EXCEEDS_BALANCE";
}

/// Validation failure attached to a mutation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path of the offending input field, if attributable.
    pub field: Option<String>,
    /// Human-readable message from the gateway.
    pub message: String,
    /// Machine-readable code, e.g. `CONTRIBUTION_EXCEEDS_BALANCE`.
    pub code: String,
}

/// Read-only snapshot of a checkout draft for rendering.
///
/// Always fetched fresh; totals may change server-side between requests
/// (promotions expiring, stock adjustments), so a stored copy is never
/// authoritative.
#[derive(Debug, Clone)]
pub struct CheckoutSummary {
    pub id: CheckoutId,
    pub email: Option<String>,
    /// Total number of units across all lines.
    pub quantity: i64,
    pub lines: Vec<CheckoutLine>,
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
    /// Currently applied voucher code, if any.
    pub voucher_code: Option<String>,
    /// Discount currently applied by the voucher.
    pub discount: Option<Money>,
    pub gift_cards: Vec<AppliedGiftCard>,
}

/// A single line in the checkout.
#[derive(Debug, Clone)]
pub struct CheckoutLine {
    pub id: String,
    pub product_name: String,
    pub variant_name: String,
    pub quantity: i64,
    pub total: Money,
}

/// A gift card applied to the checkout.
#[derive(Debug, Clone)]
pub struct AppliedGiftCard {
    pub id: String,
    /// Masked code for display, e.g. `****-HJKL`.
    pub display_code: String,
    pub current_balance: Money,
}

/// The order created by completing a checkout.
///
/// Serializable so the confirmation page can read it back out of the
/// session after the redirect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub id: OrderId,
    /// Customer-facing order number.
    pub number: String,
    /// Display status from the gateway, e.g. `Unfulfilled`.
    pub status: String,
    pub total: Money,
}
