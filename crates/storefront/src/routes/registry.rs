//! Registry route handlers.
//!
//! Group-gifting pages show the live funding state of a registry item and
//! accept contributions over HTMX. The local ledger check is advisory; the
//! gateway decides contested contributions, and losing that race renders as
//! a normal outcome here, not an error.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{AppendHeaders, IntoResponse, Response},
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use koufeta_core::{CurrencyCode, Money, RegistryId, VariantId};

use crate::error::{AppError, add_breadcrumb, set_sentry_contributor};
use crate::middleware::Contributor;
use crate::models::session as session_store;
use crate::registry::{
    RegistryItem,
    gifting::{self, ContributionError, ContributionOutcome, RegistryGateway},
};
use crate::state::AppState;

/// Funding state display data for templates.
#[derive(Clone)]
pub struct FundingView {
    pub variant_name: String,
    pub quantity: i64,
    pub target_price: String,
    pub pledged_amount: String,
    pub remaining_balance: String,
    pub currency: String,
    pub percent_funded: i64,
    pub is_group_gifting: bool,
    pub is_fully_funded: bool,
    pub is_purchased: bool,
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&RegistryItem> for FundingView {
    fn from(item: &RegistryItem) -> Self {
        Self {
            variant_name: item.variant_name.clone(),
            quantity: item.quantity,
            target_price: item.target_price.to_string(),
            pledged_amount: item.pledged_amount.to_string(),
            remaining_balance: item.remaining_balance.to_string(),
            currency: item.target_price.currency().code().to_string(),
            percent_funded: percent_funded(item),
            is_group_gifting: item.is_group_gifting,
            is_fully_funded: item.is_fully_funded(),
            is_purchased: item.is_purchased,
        }
    }
}

/// Funding progress as a whole percentage, clamped to 0..=100.
fn percent_funded(item: &RegistryItem) -> i64 {
    let target = item.target_price.amount();
    if target.is_zero() {
        return 100;
    }

    (item.pledged_amount.amount() * Decimal::ONE_HUNDRED / target)
        .floor()
        .to_i64()
        .unwrap_or(0)
        .clamp(0, 100)
}

// =============================================================================
// Forms and Templates
// =============================================================================

/// Contribution form data.
#[derive(Debug, Deserialize)]
pub struct ContributeForm {
    pub amount: String,
    /// Hidden field carrying the item's currency from the rendered page.
    pub currency: String,
}

/// Registry item page template.
#[derive(Template, WebTemplate)]
#[template(path = "registry/item.html")]
pub struct RegistryItemTemplate {
    pub funding: FundingView,
    pub registry_id: String,
    pub variant_id: String,
    pub message: Option<String>,
    pub error: Option<String>,
    pub show_checkout_link: bool,
}

/// Funding state fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/registry_funding.html")]
pub struct RegistryFundingTemplate {
    pub funding: FundingView,
    pub registry_id: String,
    pub variant_id: String,
    pub message: Option<String>,
    pub error: Option<String>,
    pub show_checkout_link: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the funding page for a registry item.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path((registry_id, variant_id)): Path<(RegistryId, VariantId)>,
) -> Result<RegistryItemTemplate, AppError> {
    let item = state
        .gateway()
        .registry_item(registry_id, &variant_id)
        .await?;

    Ok(RegistryItemTemplate {
        funding: FundingView::from(&item),
        registry_id: registry_id.to_string(),
        variant_id: variant_id.to_string(),
        message: None,
        error: None,
        show_checkout_link: false,
    })
}

/// Contribute towards a registry item (HTMX).
///
/// Returns the refreshed funding fragment. Ledger rejections and losing the
/// funding race both render inline; only transport-level gateway failures
/// become error responses.
#[instrument(skip(state, session, form))]
pub async fn contribute(
    State(state): State<AppState>,
    session: Session,
    Contributor(contributor): Contributor,
    Path((registry_id, variant_id)): Path<(RegistryId, VariantId)>,
    Form(form): Form<ContributeForm>,
) -> Result<Response, AppError> {
    set_sentry_contributor(&contributor);
    add_breadcrumb("registry", "Submitted contribution", None);

    let amount = parse_amount(&form)?;
    let checkout_id = session_store::checkout_id(&session).await;

    match gifting::contribute(
        state.gateway(),
        registry_id,
        &variant_id,
        amount,
        contributor,
        checkout_id,
    )
    .await
    {
        Ok(ContributionOutcome::Accepted { checkout_id, item }) => {
            // The gateway created or extended a checkout for this guest
            if let Some(id) = &checkout_id {
                if let Err(e) = session_store::set_checkout_id(&session, id).await {
                    tracing::error!("Failed to store checkout id in session: {e}");
                }
            }

            Ok((
                AppendHeaders([("HX-Trigger", "registry-updated")]),
                fragment(
                    &item,
                    registry_id,
                    &variant_id,
                    Some("Thank you! Your contribution was added.".to_string()),
                    None,
                    checkout_id.is_some(),
                ),
            )
                .into_response())
        }
        Ok(ContributionOutcome::Outpaced { item }) => Ok(fragment(
            &item,
            registry_id,
            &variant_id,
            None,
            Some("This gift was fully funded by someone else a moment ago.".to_string()),
            false,
        )
        .into_response()),
        Err(ContributionError::Ledger(e)) => {
            // Rejected before anything reached the gateway; refresh the
            // funding state for an honest progress bar
            let item = state
                .gateway()
                .registry_item(registry_id, &variant_id)
                .await?;

            Ok(fragment(&item, registry_id, &variant_id, None, Some(e.to_string()), false)
                .into_response())
        }
        Err(ContributionError::Gateway(e)) => Err(AppError::Gateway(e)),
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Build the funding fragment for a contribution response.
fn fragment(
    item: &RegistryItem,
    registry_id: RegistryId,
    variant_id: &VariantId,
    message: Option<String>,
    error: Option<String>,
    show_checkout_link: bool,
) -> RegistryFundingTemplate {
    RegistryFundingTemplate {
        funding: FundingView::from(item),
        registry_id: registry_id.to_string(),
        variant_id: variant_id.to_string(),
        message,
        error,
        show_checkout_link,
    }
}

/// Parse the contribution amount from form values.
fn parse_amount(form: &ContributeForm) -> Result<Money, AppError> {
    let amount = form
        .amount
        .trim()
        .parse::<Decimal>()
        .map_err(|_| AppError::BadRequest("invalid contribution amount".to_string()))?;

    let currency = form
        .currency
        .trim()
        .parse::<CurrencyCode>()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(Money::new(amount, currency))
}
