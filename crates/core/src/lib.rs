//! Koufeta Core - Shared domain types.
//!
//! This crate provides the common types used across all Koufeta components:
//! - `storefront` - Public-facing gift-registry storefront
//! - `integration-tests` - Cross-crate test suite
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Money arithmetic, country/currency codes, and type-safe IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
