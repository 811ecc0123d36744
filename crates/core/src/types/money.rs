//! Monetary amounts with currency-aware arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::country::CurrencyCode;

/// A monetary amount in a specific currency.
///
/// Amounts are stored as [`Decimal`] in the currency's standard unit
/// (euros, not cents) and serialize as strings to preserve precision.
///
/// Arithmetic is only defined between amounts of the same currency; the
/// checked operations return `None` on a currency mismatch or on decimal
/// overflow, mirroring [`Decimal::checked_add`].
///
/// ## Examples
///
/// ```
/// use koufeta_core::{CurrencyCode, Money};
/// use rust_decimal::Decimal;
///
/// let price = Money::new(Decimal::new(2500, 2), CurrencyCode::Eur);
/// assert_eq!(price.to_string(), "€25.00");
///
/// let tip = Money::new(Decimal::new(150, 2), CurrencyCode::Eur);
/// assert_eq!(price.checked_add(tip), Some(Money::new(Decimal::new(2650, 2), CurrencyCode::Eur)));
///
/// let pounds = Money::new(Decimal::ONE, CurrencyCode::Gbp);
/// assert_eq!(price.checked_add(pounds), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: CurrencyCode,
}

impl Money {
    /// Create a new amount.
    #[must_use]
    pub const fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Zero in the given currency.
    #[must_use]
    pub const fn zero(currency: CurrencyCode) -> Self {
        Self {
            amount: Decimal::ZERO,
            currency,
        }
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// The currency of this amount.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Add two amounts of the same currency.
    ///
    /// Returns `None` if the currencies differ or the addition overflows.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        if self.currency != other.currency {
            return None;
        }
        self.amount
            .checked_add(other.amount)
            .map(|amount| Self::new(amount, self.currency))
    }

    /// Subtract an amount of the same currency.
    ///
    /// Returns `None` if the currencies differ or the subtraction overflows.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        if self.currency != other.currency {
            return None;
        }
        self.amount
            .checked_sub(other.amount)
            .map(|amount| Self::new(amount, self.currency))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:.2}", self.currency.symbol(), self.amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn eur(amount: Decimal) -> Money {
        Money::new(amount, CurrencyCode::Eur)
    }

    #[test]
    fn test_checked_add_same_currency() {
        let sum = eur(dec!(10.50)).checked_add(eur(dec!(4.50))).unwrap();
        assert_eq!(sum, eur(dec!(15.00)));
    }

    #[test]
    fn test_checked_add_currency_mismatch() {
        let gbp = Money::new(dec!(1), CurrencyCode::Gbp);
        assert_eq!(eur(dec!(1)).checked_add(gbp), None);
    }

    #[test]
    fn test_checked_sub_same_currency() {
        let diff = eur(dec!(100)).checked_sub(eur(dec!(40))).unwrap();
        assert_eq!(diff, eur(dec!(60)));
    }

    #[test]
    fn test_checked_sub_currency_mismatch() {
        let usd = Money::new(dec!(1), CurrencyCode::Usd);
        assert_eq!(eur(dec!(1)).checked_sub(usd), None);
    }

    #[test]
    fn test_checked_sub_can_go_negative() {
        // Callers decide whether negative balances are meaningful
        let diff = eur(dec!(10)).checked_sub(eur(dec!(25))).unwrap();
        assert_eq!(diff.amount(), dec!(-15));
        assert!(!diff.is_positive());
    }

    #[test]
    fn test_is_positive() {
        assert!(eur(dec!(0.01)).is_positive());
        assert!(!eur(dec!(0)).is_positive());
        assert!(!eur(dec!(-5)).is_positive());
    }

    #[test]
    fn test_is_zero() {
        assert!(Money::zero(CurrencyCode::Eur).is_zero());
        assert!(!eur(dec!(0.01)).is_zero());
    }

    #[test]
    fn test_display_formats_symbol_and_two_decimals() {
        assert_eq!(eur(dec!(25)).to_string(), "€25.00");
        assert_eq!(eur(dec!(9.9)).to_string(), "€9.90");
        assert_eq!(
            Money::new(dec!(3.5), CurrencyCode::Gbp).to_string(),
            "£3.50"
        );
    }

    #[test]
    fn test_serde_round_trip_preserves_amount() {
        let money = eur(dec!(123.45));
        let json = serde_json::to_string(&money).unwrap();
        assert!(json.contains("123.45"));
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, money);
    }

    #[test]
    fn test_equality_ignores_trailing_zeros() {
        assert_eq!(eur(dec!(25.0)), eur(dec!(25.00)));
    }
}
