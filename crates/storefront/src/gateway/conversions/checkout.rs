//! Checkout type conversion functions.

use koufeta_core::{CheckoutId, Money, OrderId};

use crate::gateway::types::{
    AppliedGiftCard, CheckoutLine, CheckoutSummary, FieldError, PlacedOrder,
};

use super::super::queries::{
    checkout_billing_address_update, checkout_complete, checkout_delivery_method_update,
    checkout_email_update, checkout_payment_create, checkout_promo_code_add,
    checkout_promo_code_remove, checkout_shipping_address_update, get_checkout_summary,
    get_checkout_total,
};
use super::{ConversionError, money};

// =============================================================================
// SummaryData Trait - Generic checkout summary conversion
// =============================================================================

pub fn convert_summary<T: SummaryData>(summary: T) -> Result<CheckoutSummary, ConversionError> {
    summary.into_summary()
}

pub trait SummaryData {
    fn into_summary(self) -> Result<CheckoutSummary, ConversionError>;
}

// =============================================================================
// GetCheckoutSummary Implementation
// =============================================================================

impl SummaryData for get_checkout_summary::CheckoutSummaryFields {
    fn into_summary(self) -> Result<CheckoutSummary, ConversionError> {
        Ok(CheckoutSummary {
            id: CheckoutId::new(self.id),
            email: self.email,
            quantity: self.quantity,
            lines: self
                .lines
                .into_iter()
                .map(convert_line_get)
                .collect::<Result<_, _>>()?,
            subtotal: money(
                self.subtotal_price.gross.amount,
                &self.subtotal_price.gross.currency,
            )?,
            shipping: money(
                self.shipping_price.gross.amount,
                &self.shipping_price.gross.currency,
            )?,
            total: money(
                self.total_price.gross.amount,
                &self.total_price.gross.currency,
            )?,
            voucher_code: self.voucher_code,
            discount: self
                .discount
                .map(|d| money(d.amount, &d.currency))
                .transpose()?,
            gift_cards: self
                .gift_cards
                .into_iter()
                .map(convert_gift_card_get)
                .collect::<Result<_, _>>()?,
        })
    }
}

fn convert_line_get(
    line: get_checkout_summary::CheckoutSummaryFieldsLines,
) -> Result<CheckoutLine, ConversionError> {
    Ok(CheckoutLine {
        id: line.id,
        product_name: line.product_name,
        variant_name: line.variant_name,
        quantity: line.quantity,
        total: money(
            line.total_price.gross.amount,
            &line.total_price.gross.currency,
        )?,
    })
}

fn convert_gift_card_get(
    card: get_checkout_summary::CheckoutSummaryFieldsGiftCards,
) -> Result<AppliedGiftCard, ConversionError> {
    Ok(AppliedGiftCard {
        id: card.id,
        display_code: card.display_code,
        current_balance: money(card.current_balance.amount, &card.current_balance.currency)?,
    })
}

// =============================================================================
// CheckoutPromoCodeAdd Implementation
// =============================================================================

impl SummaryData for checkout_promo_code_add::CheckoutSummaryFields {
    fn into_summary(self) -> Result<CheckoutSummary, ConversionError> {
        Ok(CheckoutSummary {
            id: CheckoutId::new(self.id),
            email: self.email,
            quantity: self.quantity,
            lines: self
                .lines
                .into_iter()
                .map(convert_line_promo_add)
                .collect::<Result<_, _>>()?,
            subtotal: money(
                self.subtotal_price.gross.amount,
                &self.subtotal_price.gross.currency,
            )?,
            shipping: money(
                self.shipping_price.gross.amount,
                &self.shipping_price.gross.currency,
            )?,
            total: money(
                self.total_price.gross.amount,
                &self.total_price.gross.currency,
            )?,
            voucher_code: self.voucher_code,
            discount: self
                .discount
                .map(|d| money(d.amount, &d.currency))
                .transpose()?,
            gift_cards: self
                .gift_cards
                .into_iter()
                .map(convert_gift_card_promo_add)
                .collect::<Result<_, _>>()?,
        })
    }
}

fn convert_line_promo_add(
    line: checkout_promo_code_add::CheckoutSummaryFieldsLines,
) -> Result<CheckoutLine, ConversionError> {
    Ok(CheckoutLine {
        id: line.id,
        product_name: line.product_name,
        variant_name: line.variant_name,
        quantity: line.quantity,
        total: money(
            line.total_price.gross.amount,
            &line.total_price.gross.currency,
        )?,
    })
}

fn convert_gift_card_promo_add(
    card: checkout_promo_code_add::CheckoutSummaryFieldsGiftCards,
) -> Result<AppliedGiftCard, ConversionError> {
    Ok(AppliedGiftCard {
        id: card.id,
        display_code: card.display_code,
        current_balance: money(card.current_balance.amount, &card.current_balance.currency)?,
    })
}

// =============================================================================
// CheckoutPromoCodeRemove Implementation
// =============================================================================

impl SummaryData for checkout_promo_code_remove::CheckoutSummaryFields {
    fn into_summary(self) -> Result<CheckoutSummary, ConversionError> {
        Ok(CheckoutSummary {
            id: CheckoutId::new(self.id),
            email: self.email,
            quantity: self.quantity,
            lines: self
                .lines
                .into_iter()
                .map(convert_line_promo_remove)
                .collect::<Result<_, _>>()?,
            subtotal: money(
                self.subtotal_price.gross.amount,
                &self.subtotal_price.gross.currency,
            )?,
            shipping: money(
                self.shipping_price.gross.amount,
                &self.shipping_price.gross.currency,
            )?,
            total: money(
                self.total_price.gross.amount,
                &self.total_price.gross.currency,
            )?,
            voucher_code: self.voucher_code,
            discount: self
                .discount
                .map(|d| money(d.amount, &d.currency))
                .transpose()?,
            gift_cards: self
                .gift_cards
                .into_iter()
                .map(convert_gift_card_promo_remove)
                .collect::<Result<_, _>>()?,
        })
    }
}

fn convert_line_promo_remove(
    line: checkout_promo_code_remove::CheckoutSummaryFieldsLines,
) -> Result<CheckoutLine, ConversionError> {
    Ok(CheckoutLine {
        id: line.id,
        product_name: line.product_name,
        variant_name: line.variant_name,
        quantity: line.quantity,
        total: money(
            line.total_price.gross.amount,
            &line.total_price.gross.currency,
        )?,
    })
}

fn convert_gift_card_promo_remove(
    card: checkout_promo_code_remove::CheckoutSummaryFieldsGiftCards,
) -> Result<AppliedGiftCard, ConversionError> {
    Ok(AppliedGiftCard {
        id: card.id,
        display_code: card.display_code,
        current_balance: money(card.current_balance.amount, &card.current_balance.currency)?,
    })
}

// =============================================================================
// Total and Order Conversions
// =============================================================================

pub fn convert_total(
    checkout: get_checkout_total::GetCheckoutTotalCheckout,
) -> Result<Money, ConversionError> {
    money(
        checkout.total_price.gross.amount,
        &checkout.total_price.gross.currency,
    )
}

pub fn convert_order(
    order: checkout_complete::CheckoutCompleteCheckoutCompleteOrder,
) -> Result<PlacedOrder, ConversionError> {
    Ok(PlacedOrder {
        id: OrderId::new(order.id),
        number: order.number,
        status: order.status_display,
        total: money(order.total.gross.amount, &order.total.gross.currency)?,
    })
}

// =============================================================================
// Field Error Conversions
// =============================================================================

pub fn convert_shipping_error(
    error: checkout_shipping_address_update::CheckoutErrorFields,
) -> FieldError {
    FieldError {
        field: error.field,
        message: error.message,
        code: error.code,
    }
}

pub fn convert_billing_error(
    error: checkout_billing_address_update::CheckoutErrorFields,
) -> FieldError {
    FieldError {
        field: error.field,
        message: error.message,
        code: error.code,
    }
}

pub fn convert_email_error(error: checkout_email_update::CheckoutErrorFields) -> FieldError {
    FieldError {
        field: error.field,
        message: error.message,
        code: error.code,
    }
}

pub fn convert_delivery_error(
    error: checkout_delivery_method_update::CheckoutErrorFields,
) -> FieldError {
    FieldError {
        field: error.field,
        message: error.message,
        code: error.code,
    }
}

pub fn convert_payment_error(error: checkout_payment_create::CheckoutErrorFields) -> FieldError {
    FieldError {
        field: error.field,
        message: error.message,
        code: error.code,
    }
}

pub fn convert_complete_error(error: checkout_complete::CheckoutErrorFields) -> FieldError {
    FieldError {
        field: error.field,
        message: error.message,
        code: error.code,
    }
}

pub fn convert_promo_add_error(error: checkout_promo_code_add::CheckoutErrorFields) -> FieldError {
    FieldError {
        field: error.field,
        message: error.message,
        code: error.code,
    }
}

pub fn convert_promo_remove_error(
    error: checkout_promo_code_remove::CheckoutErrorFields,
) -> FieldError {
    FieldError {
        field: error.field,
        message: error.message,
        code: error.code,
    }
}
