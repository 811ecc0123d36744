//! Commerce gateway API client implementation.
//!
//! Uses `graphql_client` for type-safe queries with `reqwest` for HTTP.
//! One client is shared across the whole app; it holds configuration and a
//! connection pool, never per-checkout state.

use std::sync::Arc;
use std::time::Duration;

use graphql_client::{GraphQLQuery, Response};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};
use url::Url;

use koufeta_core::{CheckoutId, DeliveryMethodId, Money, RegistryId, VariantId};

use crate::checkout::forms::PostalAddress;
use crate::checkout::pipeline::CheckoutGateway;
use crate::config::GatewayConfig;
use crate::registry::RegistryItem;
use crate::registry::gifting::{ContributionReceipt, ContributionRequest, RegistryGateway};

use super::conversions::{
    convert_billing_error, convert_complete_error, convert_contribution_error,
    convert_delivery_error, convert_email_error, convert_order, convert_payment_error,
    convert_promo_add_error, convert_promo_remove_error, convert_registry_item,
    convert_shipping_error, convert_summary, convert_total,
};
use super::queries::{
    CheckoutBillingAddressUpdate, CheckoutComplete, CheckoutDeliveryMethodUpdate,
    CheckoutEmailUpdate, CheckoutPaymentCreate, CheckoutPromoCodeAdd, CheckoutPromoCodeRemove,
    CheckoutShippingAddressUpdate, GetCheckoutSummary, GetCheckoutTotal, GetRegistryItem,
    RegistryContributionAdd, checkout_billing_address_update, checkout_complete,
    checkout_delivery_method_update, checkout_email_update, checkout_payment_create,
    checkout_promo_code_add, checkout_promo_code_remove, checkout_shipping_address_update,
    get_checkout_summary, get_checkout_total, get_registry_item, registry_contribution_add,
};
use super::types::{CheckoutSummary, PlacedOrder};
use super::{GatewayError, GraphQLError, GraphQLErrorLocation};

// =============================================================================
// GatewayClient
// =============================================================================

/// Client for the commerce gateway API.
///
/// Provides type-safe access to checkout and registry operations. Cheap to
/// clone; clones share the same HTTP connection pool.
#[derive(Clone)]
pub struct GatewayClient {
    inner: Arc<GatewayClientInner>,
}

struct GatewayClientInner {
    client: reqwest::Client,
    endpoint: Url,
    app_token: String,
    channel: String,
    payment_id: String,
}

impl GatewayClient {
    /// Create a new gateway client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &GatewayConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(GatewayClientInner {
                client,
                endpoint: config.url.clone(),
                app_token: config.app_token.expose_secret().to_string(),
                channel: config.channel.clone(),
                payment_id: config.payment_id.clone(),
            }),
        })
    }

    /// Execute a GraphQL query.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, GatewayError>
    where
        Q::Variables: serde::Serialize,
    {
        let request_body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .bearer_auth(&self.inner.app_token)
            // The gateway resolves channel-scoped prices and stock per request
            .header("X-Sales-Channel", &self.inner.channel)
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(GatewayError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Gateway returned non-success status"
            );
            return Err(GatewayError::GraphQL(vec![GraphQLError {
                message: format!(
                    "HTTP {status}: {}",
                    response_text.chars().take(200).collect::<String>()
                ),
                locations: vec![],
                path: vec![],
            }]));
        }

        // Parse the response
        let response: Response<Q::ResponseData> = match serde_json::from_str(&response_text) {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse gateway GraphQL response"
                );
                return Err(GatewayError::Parse(e));
            }
        };

        // Check for GraphQL errors
        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            tracing::debug!(errors = ?errors, "GraphQL errors in response");

            return Err(GatewayError::GraphQL(
                errors
                    .into_iter()
                    .map(|e| GraphQLError {
                        message: e.message,
                        locations: e.locations.map_or_else(Vec::new, |locs| {
                            locs.into_iter()
                                .map(|l| GraphQLErrorLocation {
                                    line: i64::from(l.line),
                                    column: i64::from(l.column),
                                })
                                .collect()
                        }),
                        path: e.path.map_or_else(Vec::new, |p| {
                            p.into_iter()
                                .map(|fragment| match fragment {
                                    graphql_client::PathFragment::Key(s) => {
                                        serde_json::Value::String(s)
                                    }
                                    graphql_client::PathFragment::Index(i) => {
                                        serde_json::Value::Number(i.into())
                                    }
                                })
                                .collect()
                        }),
                    })
                    .collect(),
            ));
        }

        response.data.ok_or_else(|| {
            tracing::error!(
                body = %response_text.chars().take(500).collect::<String>(),
                "Gateway GraphQL response has no data and no errors"
            );
            GatewayError::GraphQL(vec![GraphQLError {
                message: "No data in response".to_string(),
                locations: vec![],
                path: vec![],
            }])
        })
    }

    // =========================================================================
    // Checkout Rendering and Promo Methods
    // =========================================================================

    /// Fetch a fresh summary of the checkout for rendering.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] if the checkout id is unknown or
    /// has expired on the gateway side.
    #[instrument(skip(self), fields(checkout_id = %checkout_id))]
    pub async fn checkout_summary(
        &self,
        checkout_id: &CheckoutId,
    ) -> Result<CheckoutSummary, GatewayError> {
        let variables = get_checkout_summary::Variables {
            checkout_id: checkout_id.to_string(),
        };

        let data = self.execute::<GetCheckoutSummary>(variables).await?;

        let checkout = data
            .checkout
            .ok_or_else(|| GatewayError::NotFound(format!("Checkout not found: {checkout_id}")))?;

        Ok(convert_summary(checkout)?)
    }

    /// Apply a voucher or gift-card code to the checkout.
    ///
    /// # Errors
    ///
    /// Invalid or expired codes come back as [`GatewayError::Fields`].
    #[instrument(skip(self, code), fields(checkout_id = %checkout_id))]
    pub async fn promo_code_add(
        &self,
        checkout_id: &CheckoutId,
        code: &str,
    ) -> Result<CheckoutSummary, GatewayError> {
        let variables = checkout_promo_code_add::Variables {
            checkout_id: checkout_id.to_string(),
            promo_code: code.to_string(),
        };

        let data = self.execute::<CheckoutPromoCodeAdd>(variables).await?;
        let result = data.checkout_promo_code_add;

        if !result.errors.is_empty() {
            return Err(GatewayError::Fields(
                result
                    .errors
                    .into_iter()
                    .map(|e| convert_promo_add_error(e))
                    .collect(),
            ));
        }

        if let Some(checkout) = result.checkout {
            return Ok(convert_summary(checkout)?);
        }

        Err(GatewayError::GraphQL(vec![GraphQLError {
            message: "Failed to apply promo code".to_string(),
            locations: vec![],
            path: vec![],
        }]))
    }

    /// Remove a voucher or gift-card code from the checkout.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Fields`] if the code is not attached.
    #[instrument(skip(self, code), fields(checkout_id = %checkout_id))]
    pub async fn promo_code_remove(
        &self,
        checkout_id: &CheckoutId,
        code: &str,
    ) -> Result<CheckoutSummary, GatewayError> {
        let variables = checkout_promo_code_remove::Variables {
            checkout_id: checkout_id.to_string(),
            promo_code: code.to_string(),
        };

        let data = self.execute::<CheckoutPromoCodeRemove>(variables).await?;
        let result = data.checkout_promo_code_remove;

        if !result.errors.is_empty() {
            return Err(GatewayError::Fields(
                result
                    .errors
                    .into_iter()
                    .map(|e| convert_promo_remove_error(e))
                    .collect(),
            ));
        }

        if let Some(checkout) = result.checkout {
            return Ok(convert_summary(checkout)?);
        }

        Err(GatewayError::GraphQL(vec![GraphQLError {
            message: "Failed to remove promo code".to_string(),
            locations: vec![],
            path: vec![],
        }]))
    }
}

/// Empty or whitespace-only form values become absent optional inputs.
fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// =============================================================================
// CheckoutGateway Implementation
// =============================================================================

impl CheckoutGateway for GatewayClient {
    #[instrument(skip(self, address, phone), fields(checkout_id = %checkout_id))]
    async fn update_shipping_address(
        &self,
        checkout_id: &CheckoutId,
        address: &PostalAddress,
        phone: &str,
    ) -> Result<(), GatewayError> {
        let variables = checkout_shipping_address_update::Variables {
            checkout_id: checkout_id.to_string(),
            address: checkout_shipping_address_update::AddressInput {
                first_name: address.first_name.trim().to_string(),
                last_name: address.last_name.trim().to_string(),
                street_address1: address.street_address1.trim().to_string(),
                street_address2: optional(&address.street_address2),
                city: address.city.trim().to_string(),
                postal_code: address.postal_code.trim().to_string(),
                country: address.country.code().to_string(),
                country_area: optional(&address.country_area),
                phone: optional(phone),
            },
        };

        let data = self.execute::<CheckoutShippingAddressUpdate>(variables).await?;
        let result = data.checkout_shipping_address_update;

        if !result.errors.is_empty() {
            return Err(GatewayError::Fields(
                result
                    .errors
                    .into_iter()
                    .map(|e| convert_shipping_error(e))
                    .collect(),
            ));
        }

        if result.checkout.is_some() {
            return Ok(());
        }

        Err(GatewayError::GraphQL(vec![GraphQLError {
            message: "Failed to update shipping address".to_string(),
            locations: vec![],
            path: vec![],
        }]))
    }

    #[instrument(skip(self, address, phone), fields(checkout_id = %checkout_id))]
    async fn update_billing_address(
        &self,
        checkout_id: &CheckoutId,
        address: &PostalAddress,
        phone: &str,
    ) -> Result<(), GatewayError> {
        let variables = checkout_billing_address_update::Variables {
            checkout_id: checkout_id.to_string(),
            address: checkout_billing_address_update::AddressInput {
                first_name: address.first_name.trim().to_string(),
                last_name: address.last_name.trim().to_string(),
                street_address1: address.street_address1.trim().to_string(),
                street_address2: optional(&address.street_address2),
                city: address.city.trim().to_string(),
                postal_code: address.postal_code.trim().to_string(),
                country: address.country.code().to_string(),
                country_area: optional(&address.country_area),
                phone: optional(phone),
            },
        };

        let data = self.execute::<CheckoutBillingAddressUpdate>(variables).await?;
        let result = data.checkout_billing_address_update;

        if !result.errors.is_empty() {
            return Err(GatewayError::Fields(
                result
                    .errors
                    .into_iter()
                    .map(|e| convert_billing_error(e))
                    .collect(),
            ));
        }

        if result.checkout.is_some() {
            return Ok(());
        }

        Err(GatewayError::GraphQL(vec![GraphQLError {
            message: "Failed to update billing address".to_string(),
            locations: vec![],
            path: vec![],
        }]))
    }

    #[instrument(skip(self, email), fields(checkout_id = %checkout_id))]
    async fn update_email(
        &self,
        checkout_id: &CheckoutId,
        email: &str,
    ) -> Result<(), GatewayError> {
        let variables = checkout_email_update::Variables {
            checkout_id: checkout_id.to_string(),
            email: email.to_string(),
        };

        let data = self.execute::<CheckoutEmailUpdate>(variables).await?;
        let result = data.checkout_email_update;

        if !result.errors.is_empty() {
            return Err(GatewayError::Fields(
                result.errors.into_iter().map(|e| convert_email_error(e)).collect(),
            ));
        }

        if result.checkout.is_some() {
            return Ok(());
        }

        Err(GatewayError::GraphQL(vec![GraphQLError {
            message: "Failed to update email".to_string(),
            locations: vec![],
            path: vec![],
        }]))
    }

    #[instrument(skip(self), fields(checkout_id = %checkout_id, delivery_method_id = %delivery_method_id))]
    async fn select_delivery_method(
        &self,
        checkout_id: &CheckoutId,
        delivery_method_id: &DeliveryMethodId,
    ) -> Result<(), GatewayError> {
        let variables = checkout_delivery_method_update::Variables {
            checkout_id: checkout_id.to_string(),
            delivery_method_id: delivery_method_id.to_string(),
        };

        let data = self.execute::<CheckoutDeliveryMethodUpdate>(variables).await?;
        let result = data.checkout_delivery_method_update;

        if !result.errors.is_empty() {
            return Err(GatewayError::Fields(
                result
                    .errors
                    .into_iter()
                    .map(|e| convert_delivery_error(e))
                    .collect(),
            ));
        }

        if result.checkout.is_some() {
            return Ok(());
        }

        Err(GatewayError::GraphQL(vec![GraphQLError {
            message: "Failed to select delivery method".to_string(),
            locations: vec![],
            path: vec![],
        }]))
    }

    #[instrument(skip(self), fields(checkout_id = %checkout_id))]
    async fn fetch_total(&self, checkout_id: &CheckoutId) -> Result<Money, GatewayError> {
        let variables = get_checkout_total::Variables {
            checkout_id: checkout_id.to_string(),
        };

        let data = self.execute::<GetCheckoutTotal>(variables).await?;

        let checkout = data
            .checkout
            .ok_or_else(|| GatewayError::NotFound(format!("Checkout not found: {checkout_id}")))?;

        Ok(convert_total(checkout)?)
    }

    #[instrument(skip(self, token), fields(checkout_id = %checkout_id, amount = %amount))]
    async fn create_payment(
        &self,
        checkout_id: &CheckoutId,
        amount: Money,
        token: &str,
    ) -> Result<(), GatewayError> {
        let variables = checkout_payment_create::Variables {
            checkout_id: checkout_id.to_string(),
            input: checkout_payment_create::PaymentInput {
                gateway: self.inner.payment_id.clone(),
                token: token.to_string(),
                amount: amount.amount(),
                currency: amount.currency().code().to_string(),
            },
        };

        let data = self.execute::<CheckoutPaymentCreate>(variables).await?;
        let result = data.checkout_payment_create;

        if !result.errors.is_empty() {
            return Err(GatewayError::Fields(
                result
                    .errors
                    .into_iter()
                    .map(|e| convert_payment_error(e))
                    .collect(),
            ));
        }

        if let Some(payment) = result.payment {
            debug!(payment_id = %payment.id, charge_status = %payment.charge_status, "Payment created");
            return Ok(());
        }

        Err(GatewayError::GraphQL(vec![GraphQLError {
            message: "Failed to create payment".to_string(),
            locations: vec![],
            path: vec![],
        }]))
    }

    #[instrument(skip(self), fields(checkout_id = %checkout_id))]
    async fn complete(&self, checkout_id: &CheckoutId) -> Result<PlacedOrder, GatewayError> {
        let variables = checkout_complete::Variables {
            checkout_id: checkout_id.to_string(),
        };

        let data = self.execute::<CheckoutComplete>(variables).await?;
        let result = data.checkout_complete;

        if !result.errors.is_empty() {
            return Err(GatewayError::Fields(
                result
                    .errors
                    .into_iter()
                    .map(|e| convert_complete_error(e))
                    .collect(),
            ));
        }

        if let Some(order) = result.order {
            return Ok(convert_order(order)?);
        }

        Err(GatewayError::GraphQL(vec![GraphQLError {
            message: "Failed to complete checkout".to_string(),
            locations: vec![],
            path: vec![],
        }]))
    }
}

// =============================================================================
// RegistryGateway Implementation
// =============================================================================

impl RegistryGateway for GatewayClient {
    #[instrument(skip(self), fields(registry_id = %registry_id, variant_id = %variant_id))]
    async fn registry_item(
        &self,
        registry_id: RegistryId,
        variant_id: &VariantId,
    ) -> Result<RegistryItem, GatewayError> {
        let variables = get_registry_item::Variables {
            registry_id: registry_id.as_uuid(),
            variant_id: variant_id.to_string(),
        };

        let data = self.execute::<GetRegistryItem>(variables).await?;

        let item = data.registry_item.ok_or_else(|| {
            GatewayError::NotFound(format!("Registry item not found: {registry_id}/{variant_id}"))
        })?;

        Ok(convert_registry_item(item)?)
    }

    #[instrument(
        skip(self, request),
        fields(registry_id = %request.registry_id, variant_id = %request.variant_id, amount = %request.amount)
    )]
    async fn add_contribution(
        &self,
        request: &ContributionRequest,
    ) -> Result<ContributionReceipt, GatewayError> {
        let variables = registry_contribution_add::Variables {
            input: registry_contribution_add::ContributionInput {
                registry_id: request.registry_id.as_uuid(),
                variant_id: request.variant_id.to_string(),
                amount: request.amount.amount(),
                currency: request.amount.currency().code().to_string(),
                contributor_id: request.contributor.as_uuid(),
                checkout_id: request.checkout_id.as_ref().map(ToString::to_string),
            },
        };

        let data = self.execute::<RegistryContributionAdd>(variables).await?;
        let result = data.registry_contribution_add;

        if !result.errors.is_empty() {
            return Err(GatewayError::Fields(
                result
                    .errors
                    .into_iter()
                    .map(convert_contribution_error)
                    .collect(),
            ));
        }

        if let Some(item) = result.registry_item {
            return Ok(ContributionReceipt {
                checkout_id: result.checkout_id.map(CheckoutId::new),
                item: convert_registry_item(item)?,
            });
        }

        Err(GatewayError::GraphQL(vec![GraphQLError {
            message: "Failed to add contribution".to_string(),
            locations: vec![],
            path: vec![],
        }]))
    }
}
