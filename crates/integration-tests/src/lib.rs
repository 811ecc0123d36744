//! Shared fixtures for the Koufeta integration tests.
//!
//! The centrepiece is [`ScriptedGateway`], an in-memory stand-in for the
//! commerce gateway. It records every call in invocation order, keeps the
//! state the mutations write (addresses, email, payments, funding balances)
//! and can be scripted to fail at a chosen operation or to let a concurrent
//! contributor win a funding race.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Mutex;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use koufeta_core::{
    CheckoutId, ContributorId, CurrencyCode, DeliveryMethodId, Money, OrderId, RegistryId,
    VariantId,
};
use koufeta_storefront::checkout::{
    CheckoutGateway, CheckoutRequest, ContactInfo, PaymentDraft, PostalAddress,
};
use koufeta_storefront::gateway::{
    GatewayError,
    types::{FieldError, PlacedOrder, error_codes},
};
use koufeta_storefront::registry::{
    ContributionReceipt, ContributionRequest, RegistryGateway, RegistryItem,
};

/// One gateway operation, as observed by the scripted gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayCall {
    UpdateShippingAddress,
    UpdateBillingAddress,
    UpdateEmail,
    SelectDeliveryMethod,
    FetchTotal,
    CreatePayment,
    Complete,
    FetchRegistryItem,
    AddContribution,
}

/// A payment the scripted gateway accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPayment {
    pub amount: Money,
    pub token: String,
}

#[derive(Default)]
struct GatewayState {
    calls: Vec<GatewayCall>,
    fail_at: Option<(GatewayCall, FieldError)>,
    shipping: Option<(PostalAddress, String)>,
    billing: Option<(PostalAddress, String)>,
    email: Option<String>,
    delivery_method: Option<DeliveryMethodId>,
    payments: Vec<RecordedPayment>,
    orders: Vec<OrderId>,
    item: Option<RegistryItem>,
    /// Pledge a concurrent contributor lands just before the next
    /// `add_contribution` is evaluated.
    concurrent_pledge: Option<Money>,
}

/// In-memory commerce gateway for driving the checkout pipeline and the
/// contribution flow in tests.
///
/// The total it reports is `subtotal` until a delivery method is selected
/// and `subtotal + delivery_fee` afterwards, so tests can observe that the
/// payment is created for the freshly fetched amount rather than anything
/// the caller saw earlier.
pub struct ScriptedGateway {
    subtotal: Money,
    delivery_fee: Money,
    state: Mutex<GatewayState>,
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedGateway {
    /// Gateway with the default totals: subtotal €160.00, delivery €15.00.
    #[must_use]
    pub fn new() -> Self {
        Self::with_totals(eur(dec!(160)), eur(dec!(15)))
    }

    #[must_use]
    pub fn with_totals(subtotal: Money, delivery_fee: Money) -> Self {
        Self {
            subtotal,
            delivery_fee,
            state: Mutex::new(GatewayState::default()),
        }
    }

    /// Gateway seeded with one registry item.
    #[must_use]
    pub fn with_item(item: RegistryItem) -> Self {
        let gateway = Self::new();
        gateway.lock().item = Some(item);
        gateway
    }

    /// Script the named operation to fail with a single field error.
    pub fn fail_at(&self, call: GatewayCall, error: FieldError) {
        self.lock().fail_at = Some((call, error));
    }

    /// Script a concurrent contributor whose pledge lands between the next
    /// fetch and the next submission.
    pub fn outpace_next_contribution(&self, amount: Money) {
        self.lock().concurrent_pledge = Some(amount);
    }

    /// Calls observed so far, in invocation order.
    #[must_use]
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    /// The shipping address and phone currently stored on the checkout.
    #[must_use]
    pub fn shipping_address(&self) -> Option<(PostalAddress, String)> {
        self.lock().shipping.clone()
    }

    /// The billing address and phone currently stored on the checkout.
    #[must_use]
    pub fn billing_address(&self) -> Option<(PostalAddress, String)> {
        self.lock().billing.clone()
    }

    #[must_use]
    pub fn email(&self) -> Option<String> {
        self.lock().email.clone()
    }

    #[must_use]
    pub fn payments(&self) -> Vec<RecordedPayment> {
        self.lock().payments.clone()
    }

    /// Orders placed through `complete`.
    #[must_use]
    pub fn orders(&self) -> Vec<OrderId> {
        self.lock().orders.clone()
    }

    /// Current funding state of the seeded registry item.
    #[must_use]
    pub fn item(&self) -> Option<RegistryItem> {
        self.lock().item.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GatewayState> {
        self.state.lock().expect("gateway state mutex poisoned")
    }

    /// Record the call, then fail it if a failure was scripted for it.
    fn begin(&self, call: GatewayCall) -> Result<(), GatewayError> {
        let mut state = self.lock();
        state.calls.push(call);
        if let Some((at, error)) = &state.fail_at
            && *at == call
        {
            return Err(GatewayError::Fields(vec![error.clone()]));
        }
        Ok(())
    }

    fn current_total(&self) -> Money {
        let delivery_selected = self.lock().delivery_method.is_some();
        if delivery_selected {
            self.subtotal
                .checked_add(self.delivery_fee)
                .unwrap_or(self.subtotal)
        } else {
            self.subtotal
        }
    }
}

impl CheckoutGateway for ScriptedGateway {
    async fn update_shipping_address(
        &self,
        _checkout_id: &CheckoutId,
        address: &PostalAddress,
        phone: &str,
    ) -> Result<(), GatewayError> {
        self.begin(GatewayCall::UpdateShippingAddress)?;
        self.lock().shipping = Some((address.clone(), phone.to_string()));
        Ok(())
    }

    async fn update_billing_address(
        &self,
        _checkout_id: &CheckoutId,
        address: &PostalAddress,
        phone: &str,
    ) -> Result<(), GatewayError> {
        self.begin(GatewayCall::UpdateBillingAddress)?;
        self.lock().billing = Some((address.clone(), phone.to_string()));
        Ok(())
    }

    async fn update_email(
        &self,
        _checkout_id: &CheckoutId,
        email: &str,
    ) -> Result<(), GatewayError> {
        self.begin(GatewayCall::UpdateEmail)?;
        self.lock().email = Some(email.to_string());
        Ok(())
    }

    async fn select_delivery_method(
        &self,
        _checkout_id: &CheckoutId,
        delivery_method_id: &DeliveryMethodId,
    ) -> Result<(), GatewayError> {
        self.begin(GatewayCall::SelectDeliveryMethod)?;
        self.lock().delivery_method = Some(delivery_method_id.clone());
        Ok(())
    }

    async fn fetch_total(&self, _checkout_id: &CheckoutId) -> Result<Money, GatewayError> {
        self.begin(GatewayCall::FetchTotal)?;
        Ok(self.current_total())
    }

    async fn create_payment(
        &self,
        _checkout_id: &CheckoutId,
        amount: Money,
        token: &str,
    ) -> Result<(), GatewayError> {
        self.begin(GatewayCall::CreatePayment)?;
        self.lock().payments.push(RecordedPayment {
            amount,
            token: token.to_string(),
        });
        Ok(())
    }

    async fn complete(&self, _checkout_id: &CheckoutId) -> Result<PlacedOrder, GatewayError> {
        self.begin(GatewayCall::Complete)?;
        let order = PlacedOrder {
            id: OrderId::from("T3JkZXI6MTA0Mg=="),
            number: "1042".to_string(),
            status: "Unfulfilled".to_string(),
            total: self.current_total(),
        };
        self.lock().orders.push(order.id.clone());
        Ok(order)
    }
}

impl RegistryGateway for ScriptedGateway {
    async fn registry_item(
        &self,
        registry_id: RegistryId,
        variant_id: &VariantId,
    ) -> Result<RegistryItem, GatewayError> {
        self.begin(GatewayCall::FetchRegistryItem)?;
        self.lock().item.clone().ok_or_else(|| {
            GatewayError::NotFound(format!("Registry item not found: {registry_id}/{variant_id}"))
        })
    }

    async fn add_contribution(
        &self,
        request: &ContributionRequest,
    ) -> Result<ContributionReceipt, GatewayError> {
        self.begin(GatewayCall::AddContribution)?;

        let mut state = self.lock();
        let Some(mut item) = state.item.clone() else {
            return Err(GatewayError::NotFound(format!(
                "Registry item not found: {}/{}",
                request.registry_id, request.variant_id
            )));
        };

        // A scripted concurrent contributor gets their pledge in first
        if let Some(pledge) = state.concurrent_pledge.take() {
            item = apply_pledge(&item, pledge);
            state.item = Some(item.clone());
        }

        // Atomic check-and-decrement: this is the serialization point the
        // advisory client-side ledger defers to
        if request.amount.amount() > item.remaining_balance.amount() {
            return Err(GatewayError::Fields(vec![FieldError {
                field: Some("amount".to_string()),
                message: "Contribution exceeds the remaining balance".to_string(),
                code: error_codes::CONTRIBUTION_EXCEEDS_BALANCE.to_string(),
            }]));
        }

        let item = apply_pledge(&item, request.amount);
        state.item = Some(item.clone());

        Ok(ContributionReceipt {
            checkout_id: Some(
                request
                    .checkout_id
                    .clone()
                    .unwrap_or_else(|| CheckoutId::from("Q2hlY2tvdXQ6Z2lmdA==")),
            ),
            item,
        })
    }
}

fn apply_pledge(item: &RegistryItem, amount: Money) -> RegistryItem {
    RegistryItem {
        pledged_amount: item
            .pledged_amount
            .checked_add(amount)
            .expect("fixture currencies always match"),
        remaining_balance: item
            .remaining_balance
            .checked_sub(amount)
            .expect("fixture currencies always match"),
        ..item.clone()
    }
}

// =============================================================================
// Fixture builders
// =============================================================================

/// Euro amount shorthand for test literals.
#[must_use]
pub fn eur(amount: Decimal) -> Money {
    Money::new(amount, CurrencyCode::Eur)
}

/// A fully populated Greek shipping address.
#[must_use]
pub fn greek_address() -> PostalAddress {
    PostalAddress {
        first_name: "Eleni".to_string(),
        last_name: "Papadopoulou".to_string(),
        street_address1: "Ermou 41".to_string(),
        street_address2: String::new(),
        city: "Athens".to_string(),
        postal_code: "105 63".to_string(),
        country: koufeta_core::CountryCode::Gr,
        country_area: "Attica".to_string(),
    }
}

/// A checkout request that passes every validation check.
#[must_use]
pub fn complete_request() -> CheckoutRequest {
    CheckoutRequest {
        checkout_id: Some(CheckoutId::from("Q2hlY2tvdXQ6YWJj")),
        contact: ContactInfo {
            email: "eleni@example.gr".to_string(),
            phone: "+30 210 1234567".to_string(),
        },
        shipping_address: greek_address(),
        billing_address: greek_address(),
        delivery_method_id: Some(DeliveryMethodId::from("U2hpcHBpbmdNZXRob2Q6MQ==")),
        payment: PaymentDraft {
            token: "tok_vis_4242".to_string(),
        },
    }
}

/// A group-gifting registry item with the given funding state, in euros.
#[must_use]
pub fn group_gift(target: Decimal, pledged: Decimal) -> RegistryItem {
    RegistryItem {
        registry_id: RegistryId::generate(),
        variant_id: VariantId::from("UHJvZHVjdFZhcmlhbnQ6NDI="),
        variant_name: "Espresso machine".to_string(),
        quantity: 1,
        is_virtual: false,
        is_group_gifting: true,
        target_price: eur(target),
        pledged_amount: eur(pledged),
        remaining_balance: eur(target - pledged),
        is_purchased: false,
    }
}

/// A generic rejection for scripting gateway failures.
#[must_use]
pub fn field_error(field: &str, message: &str) -> FieldError {
    FieldError {
        field: Some(field.to_string()),
        message: message.to_string(),
        code: "INVALID".to_string(),
    }
}

/// A throwaway contributor handle.
#[must_use]
pub fn contributor() -> ContributorId {
    ContributorId::generate()
}
