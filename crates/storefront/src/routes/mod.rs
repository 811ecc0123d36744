//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to checkout
//!
//! # Checkout
//! GET  /checkout               - Checkout page (summary + forms)
//! POST /checkout               - Complete the checkout
//! GET  /checkout/confirmation  - Order confirmation page
//! POST /checkout/promo         - Apply promo code (returns summary fragment)
//! POST /checkout/promo/remove  - Remove promo code (returns summary fragment)
//!
//! # Registry (group gifting)
//! GET  /registry/{registry_id}/items/{variant_id}             - Gift funding page
//! POST /registry/{registry_id}/items/{variant_id}/contribute  - Contribute (returns funding fragment)
//! ```

pub mod checkout;
pub mod registry;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, checkout_rate_limiter};
use crate::state::AppState;

/// Redirect the bare domain to the checkout page.
async fn root() -> Redirect {
    Redirect::to("/checkout")
}

/// Create the checkout routes router.
///
/// Completion gets the strict limiter because every attempt creates a
/// payment at the gateway; promo endpoints get the relaxed one.
pub fn checkout_routes() -> Router<AppState> {
    let submit = Router::new()
        .route("/", post(checkout::complete))
        .route_layer(checkout_rate_limiter());

    let promo = Router::new()
        .route("/promo", post(checkout::promo_add))
        .route("/promo/remove", post(checkout::promo_remove))
        .route_layer(api_rate_limiter());

    Router::new()
        .route("/", get(checkout::show))
        .route("/confirmation", get(checkout::confirmation))
        .merge(submit)
        .merge(promo)
}

/// Create the registry routes router.
pub fn registry_routes() -> Router<AppState> {
    let contribute = Router::new()
        .route(
            "/{registry_id}/items/{variant_id}/contribute",
            post(registry::contribute),
        )
        .route_layer(api_rate_limiter());

    Router::new()
        .route("/{registry_id}/items/{variant_id}", get(registry::show))
        .merge(contribute)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        // Checkout routes
        .nest("/checkout", checkout_routes())
        // Registry routes
        .nest("/registry", registry_routes())
}
