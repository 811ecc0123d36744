//! Checkout route handlers.
//!
//! The checkout page renders a fresh summary from the gateway on every load.
//! Promo code operations use HTMX to swap the summary fragment; completing
//! the checkout is a full form post that runs the whole pipeline.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use koufeta_core::{CheckoutId, CountryCode, DeliveryMethodId};

use crate::checkout::{
    CheckoutError, CheckoutRequest, ContactInfo, PaymentDraft, PostalAddress, run,
};
use crate::error::{AppError, add_breadcrumb};
use crate::gateway::{
    GatewayError,
    types::{AppliedGiftCard, CheckoutLine, CheckoutSummary, PlacedOrder},
};
use crate::models::session as session_store;
use crate::state::AppState;

/// Checkout line display data for templates.
#[derive(Clone)]
pub struct LineView {
    pub product_name: String,
    pub variant_name: String,
    pub quantity: i64,
    pub total: String,
}

/// Applied gift card display data for templates.
#[derive(Clone)]
pub struct GiftCardView {
    pub display_code: String,
    pub current_balance: String,
}

/// Checkout display data for templates.
#[derive(Clone)]
pub struct CheckoutView {
    pub lines: Vec<LineView>,
    pub quantity: i64,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
    pub voucher_code: Option<String>,
    pub discount: Option<String>,
    pub gift_cards: Vec<GiftCardView>,
}

impl CheckoutView {
    /// Create an empty checkout.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            quantity: 0,
            subtotal: "€0.00".to_string(),
            shipping: "€0.00".to_string(),
            total: "€0.00".to_string(),
            voucher_code: None,
            discount: None,
            gift_cards: Vec::new(),
        }
    }
}

/// Country select option for address forms.
#[derive(Clone)]
pub struct CountryOption {
    pub code: &'static str,
    pub name: &'static str,
    pub selected: bool,
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&CheckoutSummary> for CheckoutView {
    fn from(summary: &CheckoutSummary) -> Self {
        Self {
            lines: summary.lines.iter().map(LineView::from).collect(),
            quantity: summary.quantity,
            subtotal: summary.subtotal.to_string(),
            shipping: summary.shipping.to_string(),
            total: summary.total.to_string(),
            voucher_code: summary.voucher_code.clone(),
            discount: summary.discount.as_ref().map(ToString::to_string),
            gift_cards: summary.gift_cards.iter().map(GiftCardView::from).collect(),
        }
    }
}

impl From<&CheckoutLine> for LineView {
    fn from(line: &CheckoutLine) -> Self {
        Self {
            product_name: line.product_name.clone(),
            variant_name: line.variant_name.clone(),
            quantity: line.quantity,
            total: line.total.to_string(),
        }
    }
}

impl From<&AppliedGiftCard> for GiftCardView {
    fn from(card: &AppliedGiftCard) -> Self {
        Self {
            display_code: card.display_code.clone(),
            current_balance: card.current_balance.to_string(),
        }
    }
}

/// Build the country options for an address form select.
fn country_options(selected: &str) -> Vec<CountryOption> {
    CountryCode::ALL
        .iter()
        .map(|country| CountryOption {
            code: country.code(),
            name: country.name(),
            selected: country.code() == selected,
        })
        .collect()
}

// =============================================================================
// Forms and Templates
// =============================================================================

/// Checkout completion form data.
///
/// Flat on purpose: HTML forms post flat key-value pairs, so the shipping
/// and billing address fields carry prefixes instead of nesting.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub shipping_first_name: String,
    #[serde(default)]
    pub shipping_last_name: String,
    #[serde(default)]
    pub shipping_street_address1: String,
    #[serde(default)]
    pub shipping_street_address2: String,
    #[serde(default)]
    pub shipping_city: String,
    #[serde(default)]
    pub shipping_postal_code: String,
    #[serde(default)]
    pub shipping_country: String,
    #[serde(default)]
    pub shipping_country_area: String,
    /// Present when the "billing same as shipping" checkbox is ticked.
    #[serde(default)]
    pub billing_same_as_shipping: Option<String>,
    #[serde(default)]
    pub billing_first_name: String,
    #[serde(default)]
    pub billing_last_name: String,
    #[serde(default)]
    pub billing_street_address1: String,
    #[serde(default)]
    pub billing_street_address2: String,
    #[serde(default)]
    pub billing_city: String,
    #[serde(default)]
    pub billing_postal_code: String,
    #[serde(default)]
    pub billing_country: String,
    #[serde(default)]
    pub billing_country_area: String,
    #[serde(default)]
    pub delivery_method_id: String,
    #[serde(default)]
    pub payment_token: String,
}

/// Promo code form data.
#[derive(Debug, Deserialize)]
pub struct PromoForm {
    pub code: String,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub checkout: CheckoutView,
    pub shipping_countries: Vec<CountryOption>,
    pub billing_countries: Vec<CountryOption>,
    pub form: CheckoutForm,
    pub error: Option<String>,
    pub promo_error: Option<String>,
}

/// Checkout summary fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/checkout_summary.html")]
pub struct CheckoutSummaryTemplate {
    pub checkout: CheckoutView,
    pub promo_error: Option<String>,
}

/// Order confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmation.html")]
pub struct ConfirmationTemplate {
    pub order_number: String,
    pub order_status: String,
    pub order_total: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout page.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
) -> Result<CheckoutShowTemplate, AppError> {
    let checkout = match session_store::checkout_id(&session).await {
        Some(checkout_id) => match state.gateway().checkout_summary(&checkout_id).await {
            Ok(summary) => CheckoutView::from(&summary),
            Err(GatewayError::NotFound(_)) => {
                // The gateway expired or completed this checkout; drop the
                // stale id and show the empty state
                if let Err(e) = session_store::clear_checkout_id(&session).await {
                    tracing::error!("Failed to clear stale checkout from session: {e}");
                }
                CheckoutView::empty()
            }
            Err(e) => return Err(AppError::Gateway(e)),
        },
        None => CheckoutView::empty(),
    };

    Ok(CheckoutShowTemplate {
        checkout,
        shipping_countries: country_options(CountryCode::Gr.code()),
        billing_countries: country_options(CountryCode::Gr.code()),
        form: CheckoutForm::default(),
        error: None,
        promo_error: None,
    })
}

/// Complete the checkout.
///
/// Runs the full completion pipeline against the gateway. On success the
/// order is recorded in the session and the client is redirected to the
/// confirmation page; on failure the page is re-rendered with the reason and
/// the submitted values.
#[instrument(skip(state, session, form))]
pub async fn complete(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response, AppError> {
    let checkout_id = session_store::checkout_id(&session).await;

    add_breadcrumb("checkout", "Submitted checkout", None);

    let request = build_request(checkout_id, &form)?;

    match run(state.gateway(), &request).await {
        Ok(completed) => {
            // Session bookkeeping failures must not fail a placed order
            if let Err(e) = session_store::remember_order(&session, &completed.order).await {
                tracing::error!("Failed to store placed order in session: {e}");
            }
            if let Err(e) = session_store::clear_checkout_id(&session).await {
                tracing::error!("Failed to clear completed checkout from session: {e}");
            }

            Ok(Redirect::to("/checkout/confirmation").into_response())
        }
        Err(err) => {
            if is_unexpected(&err) {
                sentry::capture_error(&err);
            }
            tracing::warn!(error = %err, "Checkout did not complete");

            // Re-render with a fresh summary; mutations up to the failed
            // stage have already been applied on the gateway
            let checkout = match &request.checkout_id {
                Some(id) => match state.gateway().checkout_summary(id).await {
                    Ok(summary) => CheckoutView::from(&summary),
                    Err(_) => CheckoutView::empty(),
                },
                None => CheckoutView::empty(),
            };

            let template = CheckoutShowTemplate {
                checkout,
                shipping_countries: country_options(&form.shipping_country),
                billing_countries: country_options(&form.billing_country),
                error: Some(user_message(&err)),
                promo_error: None,
                form,
            };

            Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response())
        }
    }
}

/// Display the order confirmation page.
#[instrument(skip(session))]
pub async fn confirmation(session: Session) -> Result<ConfirmationTemplate, AppError> {
    let order: PlacedOrder = session_store::last_order(&session)
        .await
        .ok_or_else(|| AppError::NotFound("no recent order".to_string()))?;

    Ok(ConfirmationTemplate {
        order_number: order.number,
        order_status: order.status,
        order_total: order.total.to_string(),
    })
}

/// Apply a promo code (HTMX).
#[instrument(skip(state, session, form))]
pub async fn promo_add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PromoForm>,
) -> Result<Response, AppError> {
    let Some(checkout_id) = session_store::checkout_id(&session).await else {
        return Ok(no_checkout_fragment().into_response());
    };

    add_breadcrumb("checkout", "Applied promo code", None);

    promo_response(
        &state,
        &checkout_id,
        state
            .gateway()
            .promo_code_add(&checkout_id, form.code.trim())
            .await,
    )
    .await
}

/// Remove a promo code (HTMX).
#[instrument(skip(state, session, form))]
pub async fn promo_remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PromoForm>,
) -> Result<Response, AppError> {
    let Some(checkout_id) = session_store::checkout_id(&session).await else {
        return Ok(no_checkout_fragment().into_response());
    };

    add_breadcrumb("checkout", "Removed promo code", None);

    promo_response(
        &state,
        &checkout_id,
        state
            .gateway()
            .promo_code_remove(&checkout_id, form.code.trim())
            .await,
    )
    .await
}

// =============================================================================
// Helpers
// =============================================================================

/// Render a promo operation result as a summary fragment.
async fn promo_response(
    state: &AppState,
    checkout_id: &CheckoutId,
    result: Result<CheckoutSummary, GatewayError>,
) -> Result<Response, AppError> {
    match result {
        Ok(summary) => Ok((
            AppendHeaders([("HX-Trigger", "checkout-updated")]),
            CheckoutSummaryTemplate {
                checkout: CheckoutView::from(&summary),
                promo_error: None,
            },
        )
            .into_response()),
        Err(GatewayError::Fields(errors)) => {
            // The code was rejected; show the gateway's reason beside an
            // unchanged summary
            let summary = state.gateway().checkout_summary(checkout_id).await?;
            let message = errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");

            Ok(CheckoutSummaryTemplate {
                checkout: CheckoutView::from(&summary),
                promo_error: Some(message),
            }
            .into_response())
        }
        Err(e) => Err(AppError::Gateway(e)),
    }
}

/// Fragment shown when a promo operation arrives without a checkout.
fn no_checkout_fragment() -> CheckoutSummaryTemplate {
    CheckoutSummaryTemplate {
        checkout: CheckoutView::empty(),
        promo_error: Some("No checkout in progress".to_string()),
    }
}

/// Build a pipeline request from submitted form values.
fn build_request(
    checkout_id: Option<CheckoutId>,
    form: &CheckoutForm,
) -> Result<CheckoutRequest, AppError> {
    let shipping_address = PostalAddress {
        first_name: form.shipping_first_name.clone(),
        last_name: form.shipping_last_name.clone(),
        street_address1: form.shipping_street_address1.clone(),
        street_address2: form.shipping_street_address2.clone(),
        city: form.shipping_city.clone(),
        postal_code: form.shipping_postal_code.clone(),
        country: parse_country(&form.shipping_country)?,
        country_area: form.shipping_country_area.clone(),
    };

    let billing_address = if form.billing_same_as_shipping.is_some() {
        shipping_address.clone()
    } else {
        PostalAddress {
            first_name: form.billing_first_name.clone(),
            last_name: form.billing_last_name.clone(),
            street_address1: form.billing_street_address1.clone(),
            street_address2: form.billing_street_address2.clone(),
            city: form.billing_city.clone(),
            postal_code: form.billing_postal_code.clone(),
            country: parse_country(&form.billing_country)?,
            country_area: form.billing_country_area.clone(),
        }
    };

    Ok(CheckoutRequest {
        checkout_id,
        contact: ContactInfo {
            email: form.email.clone(),
            phone: form.phone.clone(),
        },
        shipping_address,
        billing_address,
        delivery_method_id: optional_delivery_method(&form.delivery_method_id),
        payment: PaymentDraft {
            token: form.payment_token.clone(),
        },
    })
}

/// Countries come from a fixed select, so a parse failure means the form was
/// tampered with.
fn parse_country(code: &str) -> Result<CountryCode, AppError> {
    code.trim()
        .parse::<CountryCode>()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

fn optional_delivery_method(value: &str) -> Option<DeliveryMethodId> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(DeliveryMethodId::from(trimmed))
    }
}

/// Error text safe for the checkout form banner.
fn user_message(err: &CheckoutError) -> String {
    match err {
        CheckoutError::Gateway { stage, source } => match source {
            GatewayError::Fields(_) => err.to_string(),
            GatewayError::RateLimited(_) => {
                "The shop is busy, please try again in a moment".to_string()
            }
            _ => format!("Something went wrong while {stage}, please try again"),
        },
        other => other.to_string(),
    }
}

/// True for halts that indicate gateway trouble rather than a user mistake.
fn is_unexpected(err: &CheckoutError) -> bool {
    matches!(
        err,
        CheckoutError::Gateway { source, .. }
            if !matches!(source, GatewayError::Fields(_) | GatewayError::RateLimited(_))
    )
}
