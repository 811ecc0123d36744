//! Contributor identity extractor.
//!
//! Gift contributors are anonymous. Each browser session gets a stable
//! random handle so the gateway can attribute contributions without an
//! account or login.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use tower_sessions::Session;

use koufeta_core::ContributorId;

use crate::models::session_keys;

/// Extractor that resolves the contributor handle for this session.
///
/// Returns the stored handle if the session already has one, otherwise mints
/// a fresh one and stores it. The handle lives as long as the session does;
/// clearing cookies starts a new contributor.
///
/// # Example
///
/// ```rust,ignore
/// async fn contribute_handler(
///     Contributor(contributor_id): Contributor,
/// ) -> impl IntoResponse {
///     format!("contributing as {contributor_id}")
/// }
/// ```
pub struct Contributor(pub ContributorId);

impl<S> FromRequestParts<S> for Contributor
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

        if let Some(existing) = session
            .get::<ContributorId>(session_keys::CONTRIBUTOR_ID)
            .await
            .ok()
            .flatten()
        {
            return Ok(Self(existing));
        }

        let minted = ContributorId::generate();

        // Save the handle to the session; the request proceeds either way
        if let Err(e) = session.insert(session_keys::CONTRIBUTOR_ID, minted).await {
            tracing::error!("Failed to store contributor handle in session: {e}");
        }

        Ok(Self(minted))
    }
}
