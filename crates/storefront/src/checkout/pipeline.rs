//! The checkout completion pipeline.
//!
//! A run drives a draft checkout through a fixed sequence of gateway
//! mutations into an order. The order is load-bearing: the gateway
//! computes shipping-dependent tax only after a valid shipping address is
//! attached, and payment creation needs the final total, which needs the
//! delivery method. Every write is a full replace, so re-running the whole
//! pipeline after a failure is safe; nothing is retried automatically.

use thiserror::Error;
use tracing::{info, instrument};

use koufeta_core::{CheckoutId, DeliveryMethodId, Money};

use crate::gateway::types::{FieldError, PlacedOrder};
use crate::gateway::GatewayError;

use super::forms::{ContactInfo, PaymentDraft, PostalAddress};

/// Pipeline stages in execution order.
///
/// Carried by [`CheckoutError::Gateway`] so the caller can tell where a
/// run halted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStage {
    UpdatingShippingAddress,
    UpdatingBillingAddress,
    UpdatingEmail,
    SelectingDeliveryMethod,
    FetchingTotal,
    CreatingPayment,
    Completing,
}

impl CheckoutStage {
    /// Short progressive-tense label for error messages.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::UpdatingShippingAddress => "saving the shipping address",
            Self::UpdatingBillingAddress => "saving the billing address",
            Self::UpdatingEmail => "saving the contact email",
            Self::SelectingDeliveryMethod => "selecting the delivery method",
            Self::FetchingTotal => "fetching the order total",
            Self::CreatingPayment => "creating the payment",
            Self::Completing => "placing the order",
        }
    }
}

impl std::fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The two address slots on a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Shipping,
    Billing,
}

impl std::fmt::Display for AddressKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Shipping => "shipping",
            Self::Billing => "billing",
        })
    }
}

/// Why a pipeline run failed.
///
/// Validation variants are raised before any network call, so the buyer's
/// input is still on the page and can be corrected and resubmitted.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// No draft checkout exists for this session.
    #[error("no checkout in progress")]
    MissingCheckout,

    /// Email or phone is missing.
    #[error("contact info is incomplete")]
    IncompleteContactInfo,

    /// A required address field is empty.
    #[error("{kind} address is incomplete: missing {}", fields.join(", "))]
    IncompleteAddress {
        kind: AddressKind,
        fields: Vec<&'static str>,
    },

    /// No delivery method was selected.
    #[error("no delivery method selected")]
    MissingDeliveryMethod,

    /// The payment form was left empty.
    #[error("payment details are missing")]
    MissingPayment,

    /// A gateway call failed; the run halted at the named stage.
    #[error("checkout halted while {stage}: {source}")]
    Gateway {
        stage: CheckoutStage,
        source: GatewayError,
    },

    /// The gateway refused to finalize the checkout.
    #[error("checkout could not be completed: {}", format_completion_errors(.0))]
    Completion(Vec<FieldError>),
}

fn format_completion_errors(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return "(no reason given)".to_string();
    }
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Everything a pipeline run needs, collected from the session and the
/// submitted form.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    /// The draft checkout held in the session, if one exists.
    pub checkout_id: Option<CheckoutId>,
    pub contact: ContactInfo,
    pub shipping_address: PostalAddress,
    pub billing_address: PostalAddress,
    pub delivery_method_id: Option<DeliveryMethodId>,
    pub payment: PaymentDraft,
}

/// Result of a successful pipeline run.
#[derive(Debug, Clone)]
pub struct CompletedCheckout {
    pub order: PlacedOrder,
    /// The authoritative total fetched immediately before payment. This is
    /// what the buyer was charged, even if a cached page showed otherwise.
    pub amount_charged: Money,
}

/// Checkout operations the pipeline needs from the commerce gateway.
///
/// Split from the concrete client so tests can run the pipeline against a
/// scripted gateway.
#[allow(async_fn_in_trait)]
pub trait CheckoutGateway {
    /// Replace the checkout's shipping address. Full replace, no patching.
    async fn update_shipping_address(
        &self,
        checkout_id: &CheckoutId,
        address: &PostalAddress,
        phone: &str,
    ) -> Result<(), GatewayError>;

    /// Replace the checkout's billing address. Full replace, no patching.
    async fn update_billing_address(
        &self,
        checkout_id: &CheckoutId,
        address: &PostalAddress,
        phone: &str,
    ) -> Result<(), GatewayError>;

    /// Set the checkout's contact email.
    async fn update_email(&self, checkout_id: &CheckoutId, email: &str)
    -> Result<(), GatewayError>;

    /// Select the delivery method.
    async fn select_delivery_method(
        &self,
        checkout_id: &CheckoutId,
        delivery_method_id: &DeliveryMethodId,
    ) -> Result<(), GatewayError>;

    /// Fetch the authoritative total. Never cached across the payment step.
    async fn fetch_total(&self, checkout_id: &CheckoutId) -> Result<Money, GatewayError>;

    /// Create a payment for exactly the given amount.
    async fn create_payment(
        &self,
        checkout_id: &CheckoutId,
        amount: Money,
        token: &str,
    ) -> Result<(), GatewayError>;

    /// Finalize the checkout into an order.
    async fn complete(&self, checkout_id: &CheckoutId) -> Result<PlacedOrder, GatewayError>;
}

/// Drive a draft checkout through the full completion sequence.
///
/// Inputs are validated up front; the first gateway call happens only once
/// everything needed by the whole run is present. Each stage waits for the
/// previous one, and the run halts at the first failure without touching
/// later stages.
///
/// # Errors
///
/// Returns a validation variant of [`CheckoutError`] before any network
/// call, [`CheckoutError::Gateway`] when a stage fails, and
/// [`CheckoutError::Completion`] when the gateway refuses to finalize.
#[instrument(skip_all)]
pub async fn run<G: CheckoutGateway>(
    gateway: &G,
    request: &CheckoutRequest,
) -> Result<CompletedCheckout, CheckoutError> {
    let checkout_id = request
        .checkout_id
        .as_ref()
        .ok_or(CheckoutError::MissingCheckout)?;

    if !request.contact.is_complete() {
        return Err(CheckoutError::IncompleteContactInfo);
    }
    let missing = request.shipping_address.missing_fields();
    if !missing.is_empty() {
        return Err(CheckoutError::IncompleteAddress {
            kind: AddressKind::Shipping,
            fields: missing,
        });
    }
    let missing = request.billing_address.missing_fields();
    if !missing.is_empty() {
        return Err(CheckoutError::IncompleteAddress {
            kind: AddressKind::Billing,
            fields: missing,
        });
    }
    let delivery_method_id = request
        .delivery_method_id
        .as_ref()
        .ok_or(CheckoutError::MissingDeliveryMethod)?;
    if !request.payment.is_complete() {
        return Err(CheckoutError::MissingPayment);
    }

    let phone = request.contact.phone.trim();

    gateway
        .update_shipping_address(checkout_id, &request.shipping_address, phone)
        .await
        .map_err(|source| CheckoutError::Gateway {
            stage: CheckoutStage::UpdatingShippingAddress,
            source,
        })?;

    gateway
        .update_billing_address(checkout_id, &request.billing_address, phone)
        .await
        .map_err(|source| CheckoutError::Gateway {
            stage: CheckoutStage::UpdatingBillingAddress,
            source,
        })?;

    gateway
        .update_email(checkout_id, request.contact.email.trim())
        .await
        .map_err(|source| CheckoutError::Gateway {
            stage: CheckoutStage::UpdatingEmail,
            source,
        })?;

    gateway
        .select_delivery_method(checkout_id, delivery_method_id)
        .await
        .map_err(|source| CheckoutError::Gateway {
            stage: CheckoutStage::SelectingDeliveryMethod,
            source,
        })?;

    // Promotions and gift cards may have moved the total since the page was
    // rendered; the payment must be created for this fetch's amount.
    let total = gateway
        .fetch_total(checkout_id)
        .await
        .map_err(|source| CheckoutError::Gateway {
            stage: CheckoutStage::FetchingTotal,
            source,
        })?;

    gateway
        .create_payment(checkout_id, total, request.payment.token.trim())
        .await
        .map_err(|source| CheckoutError::Gateway {
            stage: CheckoutStage::CreatingPayment,
            source,
        })?;

    let order = match gateway.complete(checkout_id).await {
        Ok(order) => order,
        Err(GatewayError::Fields(errors)) => return Err(CheckoutError::Completion(errors)),
        Err(source) => {
            return Err(CheckoutError::Gateway {
                stage: CheckoutStage::Completing,
                source,
            });
        }
    };

    info!(checkout_id = %checkout_id, order_id = %order.id, total = %total, "checkout completed");

    Ok(CompletedCheckout {
        order,
        amount_charged: total,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // Every stage a halt can report is a gateway-facing step; validation
    // failures carry their own error variants instead of a stage.
    const STAGES: [CheckoutStage; 7] = [
        CheckoutStage::UpdatingShippingAddress,
        CheckoutStage::UpdatingBillingAddress,
        CheckoutStage::UpdatingEmail,
        CheckoutStage::SelectingDeliveryMethod,
        CheckoutStage::FetchingTotal,
        CheckoutStage::CreatingPayment,
        CheckoutStage::Completing,
    ];

    #[test]
    fn test_stage_labels_are_distinct() {
        for (i, stage) in STAGES.iter().enumerate() {
            assert!(!stage.label().is_empty());
            for other in &STAGES[i + 1..] {
                assert_ne!(stage.label(), other.label());
            }
        }
    }

    #[test]
    fn test_gateway_halt_names_the_stage() {
        let err = CheckoutError::Gateway {
            stage: CheckoutStage::CreatingPayment,
            source: GatewayError::NotFound("checkout".to_string()),
        };
        assert!(err.to_string().contains("creating the payment"));
    }

    #[test]
    fn test_incomplete_address_lists_missing_fields() {
        let err = CheckoutError::IncompleteAddress {
            kind: AddressKind::Billing,
            fields: vec!["city", "postal code"],
        };
        assert_eq!(
            err.to_string(),
            "billing address is incomplete: missing city, postal code"
        );
    }
}
