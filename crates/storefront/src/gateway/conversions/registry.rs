//! Registry type conversion functions.

use koufeta_core::{RegistryId, VariantId};

use crate::gateway::types::FieldError;
use crate::registry::RegistryItem;

use super::super::queries::{get_registry_item, registry_contribution_add};
use super::{ConversionError, money};

// =============================================================================
// RegistryItemData Trait - Generic registry item conversion
// =============================================================================

pub fn convert_registry_item<T: RegistryItemData>(item: T) -> Result<RegistryItem, ConversionError> {
    item.into_item()
}

pub trait RegistryItemData {
    fn into_item(self) -> Result<RegistryItem, ConversionError>;
}

// =============================================================================
// GetRegistryItem Implementation
// =============================================================================

impl RegistryItemData for get_registry_item::RegistryItemFields {
    fn into_item(self) -> Result<RegistryItem, ConversionError> {
        Ok(RegistryItem {
            registry_id: RegistryId::new(self.registry_id),
            variant_id: VariantId::new(self.variant_id),
            variant_name: self.variant_name,
            quantity: self.quantity,
            is_virtual: self.is_virtual,
            is_group_gifting: self.is_group_gifting,
            target_price: money(self.target_price.amount, &self.target_price.currency)?,
            pledged_amount: money(self.pledged_amount.amount, &self.pledged_amount.currency)?,
            remaining_balance: money(
                self.remaining_balance.amount,
                &self.remaining_balance.currency,
            )?,
            is_purchased: self.is_purchased,
        })
    }
}

// =============================================================================
// RegistryContributionAdd Implementation
// =============================================================================

impl RegistryItemData for registry_contribution_add::RegistryItemFields {
    fn into_item(self) -> Result<RegistryItem, ConversionError> {
        Ok(RegistryItem {
            registry_id: RegistryId::new(self.registry_id),
            variant_id: VariantId::new(self.variant_id),
            variant_name: self.variant_name,
            quantity: self.quantity,
            is_virtual: self.is_virtual,
            is_group_gifting: self.is_group_gifting,
            target_price: money(self.target_price.amount, &self.target_price.currency)?,
            pledged_amount: money(self.pledged_amount.amount, &self.pledged_amount.currency)?,
            remaining_balance: money(
                self.remaining_balance.amount,
                &self.remaining_balance.currency,
            )?,
            is_purchased: self.is_purchased,
        })
    }
}

// =============================================================================
// Field Error Conversions
// =============================================================================

pub fn convert_contribution_error(
    error: registry_contribution_add::RegistryContributionAddRegistryContributionAddErrors,
) -> FieldError {
    FieldError {
        field: error.field,
        message: error.message,
        code: error.code,
    }
}
