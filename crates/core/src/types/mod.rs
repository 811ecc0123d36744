//! Core types for Koufeta.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod country;
pub mod id;
pub mod money;

pub use country::{CountryCode, CountryCodeError, CurrencyCode, CurrencyCodeError};
pub use id::*;
pub use money::Money;
