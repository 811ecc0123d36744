//! Checkout completion pipeline and its input forms.
//!
//! The flow is deliberately thin on this side: the gateway owns the
//! checkout aggregate, and this module only validates what the buyer
//! typed, then drives the gateway through a fixed mutation sequence.

pub mod forms;
pub mod pipeline;

pub use forms::{ContactInfo, PaymentDraft, PostalAddress};
pub use pipeline::{
    AddressKind, CheckoutError, CheckoutGateway, CheckoutRequest, CheckoutStage,
    CompletedCheckout, run,
};
