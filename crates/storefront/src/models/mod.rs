//! Domain models for storefront.
//!
//! Most domain data lives on the commerce gateway and is fetched fresh per
//! request; the only state kept on this side is what the session carries
//! between requests.

pub mod session;

pub use session::keys as session_keys;
