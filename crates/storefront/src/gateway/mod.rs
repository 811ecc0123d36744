//! Commerce gateway GraphQL client.
//!
//! # Architecture
//!
//! - Uses `graphql-client` crate for type-safe GraphQL queries
//! - The gateway is the source of truth - NO local sync, direct API calls
//! - Nothing is cached: checkout totals and funding balances move under
//!   concurrent use, so every render re-fetches
//!
//! # Error mapping
//!
//! Transport and protocol failures become [`GatewayError`] variants.
//! Validation failures the gateway attaches to a mutation payload become
//! [`GatewayError::Fields`], which callers can match on by error code
//! (see [`error_codes`]).
//!
//! # Example
//!
//! ```rust,ignore
//! use koufeta_storefront::gateway::GatewayClient;
//!
//! let client = GatewayClient::new(&config.gateway)?;
//!
//! // Fetch a checkout summary for rendering
//! let summary = client.checkout_summary(&checkout_id).await?;
//! ```

mod client;
mod conversions;
mod queries;
pub mod types;

pub use client::GatewayClient;
pub use conversions::ConversionError;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when talking to the commerce gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the gateway.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Validation errors attached to a mutation payload.
    #[error("Validation errors: {}", format_field_errors(.0))]
    Fields(Vec<FieldError>),

    /// A response did not fit the storefront's domain types.
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// A GraphQL error returned by the gateway.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if !e.locations.is_empty() {
                let loc = &e.locations[0];
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_field_errors(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .map(|e| match &e.field {
            Some(field) => format!("{field}: {}", e.message),
            None => e.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::NotFound("checkout Q2hlY2tvdXQ6MQ==".to_string());
        assert_eq!(err.to_string(), "Not found: checkout Q2hlY2tvdXQ6MQ==");
    }

    #[test]
    fn test_graphql_error_formatting() {
        let errors = vec![
            GraphQLError {
                message: "Field not found".to_string(),
                locations: vec![],
                path: vec![],
            },
            GraphQLError {
                message: "Invalid ID".to_string(),
                locations: vec![],
                path: vec![],
            },
        ];
        let err = GatewayError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_graphql_error_empty_messages() {
        // Empty message but with path and location info
        let errors = vec![GraphQLError {
            message: String::new(),
            locations: vec![GraphQLErrorLocation { line: 5, column: 10 }],
            path: vec![
                serde_json::Value::String("checkout".to_string()),
                serde_json::Value::Number(0.into()),
            ],
        }];
        let err = GatewayError::GraphQL(errors);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: path: checkout.0 at line 5:10"
        );
    }

    #[test]
    fn test_graphql_error_no_details() {
        let errors = vec![GraphQLError {
            message: String::new(),
            locations: vec![],
            path: vec![],
        }];
        let err = GatewayError::GraphQL(errors);
        assert_eq!(err.to_string(), "GraphQL errors: [error 1]: (no details)");
    }

    #[test]
    fn test_graphql_error_empty_vec() {
        let err = GatewayError::GraphQL(vec![]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: (no error details provided)"
        );
    }

    #[test]
    fn test_rate_limited_error() {
        let err = GatewayError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }

    #[test]
    fn test_field_errors_with_and_without_field_paths() {
        let err = GatewayError::Fields(vec![
            FieldError {
                field: Some("address.postalCode".to_string()),
                message: "Invalid postal code".to_string(),
                code: "INVALID".to_string(),
            },
            FieldError {
                field: None,
                message: "Checkout has expired".to_string(),
                code: "EXPIRED".to_string(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Validation errors: address.postalCode: Invalid postal code; Checkout has expired"
        );
    }
}
