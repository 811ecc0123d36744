//! Type conversion functions for gateway API responses.
//!
//! The gateway transports money as a decimal amount plus a free-form
//! currency string. Converting into domain types re-validates the currency
//! against the closed `CurrencyCode` set, so conversions are fallible.

pub mod checkout;
pub mod registry;

pub use checkout::{
    SummaryData, convert_billing_error, convert_complete_error, convert_delivery_error,
    convert_email_error, convert_order, convert_payment_error, convert_promo_add_error,
    convert_promo_remove_error, convert_shipping_error, convert_summary, convert_total,
};
pub use registry::{RegistryItemData, convert_contribution_error, convert_registry_item};

use thiserror::Error;

use koufeta_core::{CurrencyCode, CurrencyCodeError, Money};

/// A gateway response did not fit the storefront's domain types.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The gateway sent a currency outside the configured set.
    #[error(transparent)]
    Currency(#[from] CurrencyCodeError),
}

/// Build a [`Money`] from the gateway's amount and currency string pair.
fn money(amount: rust_decimal::Decimal, currency: &str) -> Result<Money, ConversionError> {
    Ok(Money::new(amount, currency.parse::<CurrencyCode>()?))
}
