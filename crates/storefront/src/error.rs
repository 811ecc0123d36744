//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Route handlers that do not render a rich error
//! state themselves return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::gateway::GatewayError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Commerce gateway operation failed.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Session read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// True for errors that indicate trouble on our side or the gateway's,
    /// rather than a client mistake.
    fn is_unexpected(&self) -> bool {
        match self {
            Self::Gateway(err) => !matches!(
                err,
                GatewayError::NotFound(_) | GatewayError::Fields(_) | GatewayError::RateLimited(_)
            ),
            Self::Session(_) => true,
            Self::NotFound(_) | Self::BadRequest(_) => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_unexpected() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Gateway(err) => match err {
                GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
                GatewayError::Fields(_) => StatusCode::UNPROCESSABLE_ENTITY,
                GatewayError::RateLimited(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Gateway(err) => match err {
                GatewayError::NotFound(_) => "Not found".to_string(),
                GatewayError::Fields(_) => err.to_string(),
                GatewayError::RateLimited(_) => {
                    "The shop is busy, please try again in a moment".to_string()
                }
                _ => "External service error".to_string(),
            },
            Self::Session(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from the contributor handle.
///
/// Contributors are anonymous, so this only carries the session-scoped id.
pub fn set_sentry_contributor(contributor_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(contributor_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("checkout", "Submitted checkout", Some(&[("checkout_id", "abc")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::types::FieldError;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("registry item".to_string());
        assert_eq!(err.to_string(), "Not found: registry item");

        let err = AppError::BadRequest("invalid amount".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid amount");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_gateway_errors_map_to_upstream_statuses() {
        assert_eq!(
            get_status(AppError::Gateway(GatewayError::NotFound(
                "checkout".to_string()
            ))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Gateway(GatewayError::RateLimited(3))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Gateway(GatewayError::Fields(vec![FieldError {
                field: Some("email".to_string()),
                message: "invalid email format".to_string(),
                code: "INVALID".to_string(),
            }]))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Gateway(GatewayError::GraphQL(vec![]))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_field_errors_are_exposed_to_the_client() {
        let err = AppError::Gateway(GatewayError::Fields(vec![FieldError {
            field: Some("promo_code".to_string()),
            message: "This code has expired".to_string(),
            code: "EXPIRED".to_string(),
        }]));
        // The display form carries the gateway's user-facing message
        assert!(err.to_string().contains("This code has expired"));
    }
}
