//! Currency and shipping-country codes.
//!
//! Both enums are closed: the storefront only accepts currencies and ships
//! to countries the commerce gateway has been configured for. Unknown codes
//! coming back from the gateway are treated as contract violations by the
//! caller, not silently passed through.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing a [`CurrencyCode`] from a string.
#[derive(Debug, Clone, Error)]
#[error("unsupported currency code: {0}")]
pub struct CurrencyCodeError(pub String);

/// ISO 4217 currency codes accepted by the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    #[default]
    Eur,
    Usd,
    Gbp,
}

impl CurrencyCode {
    /// The ISO 4217 code, e.g. `"EUR"`.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Eur => "EUR",
            Self::Usd => "USD",
            Self::Gbp => "GBP",
        }
    }

    /// The display symbol, e.g. `"€"`.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Eur => "€",
            Self::Usd => "$",
            Self::Gbp => "£",
        }
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EUR" => Ok(Self::Eur),
            "USD" => Ok(Self::Usd),
            "GBP" => Ok(Self::Gbp),
            other => Err(CurrencyCodeError(other.to_owned())),
        }
    }
}

/// Error parsing a [`CountryCode`] from a string.
#[derive(Debug, Clone, Error)]
#[error("unsupported country code: {0}")]
pub struct CountryCodeError(pub String);

/// ISO 3166-1 alpha-2 codes for countries the storefront ships to.
///
/// The set covers the Greek home market plus the EU countries and a few
/// others the store delivers to. Guests abroad can still contribute to a
/// registry; these codes also back their billing addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum CountryCode {
    #[default]
    Gr,
    Cy,
    At,
    Be,
    Bg,
    De,
    Dk,
    Es,
    Fi,
    Fr,
    Ie,
    It,
    Lu,
    Mt,
    Nl,
    Pt,
    Ro,
    Se,
    Gb,
    Us,
}

impl CountryCode {
    /// All supported countries, in the order shown in address forms.
    pub const ALL: [Self; 20] = [
        Self::Gr,
        Self::Cy,
        Self::At,
        Self::Be,
        Self::Bg,
        Self::De,
        Self::Dk,
        Self::Es,
        Self::Fi,
        Self::Fr,
        Self::Ie,
        Self::It,
        Self::Lu,
        Self::Mt,
        Self::Nl,
        Self::Pt,
        Self::Ro,
        Self::Se,
        Self::Gb,
        Self::Us,
    ];

    /// The ISO 3166-1 alpha-2 code, e.g. `"GR"`.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Gr => "GR",
            Self::Cy => "CY",
            Self::At => "AT",
            Self::Be => "BE",
            Self::Bg => "BG",
            Self::De => "DE",
            Self::Dk => "DK",
            Self::Es => "ES",
            Self::Fi => "FI",
            Self::Fr => "FR",
            Self::Ie => "IE",
            Self::It => "IT",
            Self::Lu => "LU",
            Self::Mt => "MT",
            Self::Nl => "NL",
            Self::Pt => "PT",
            Self::Ro => "RO",
            Self::Se => "SE",
            Self::Gb => "GB",
            Self::Us => "US",
        }
    }

    /// English display name for address forms.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Gr => "Greece",
            Self::Cy => "Cyprus",
            Self::At => "Austria",
            Self::Be => "Belgium",
            Self::Bg => "Bulgaria",
            Self::De => "Germany",
            Self::Dk => "Denmark",
            Self::Es => "Spain",
            Self::Fi => "Finland",
            Self::Fr => "France",
            Self::Ie => "Ireland",
            Self::It => "Italy",
            Self::Lu => "Luxembourg",
            Self::Mt => "Malta",
            Self::Nl => "Netherlands",
            Self::Pt => "Portugal",
            Self::Ro => "Romania",
            Self::Se => "Sweden",
            Self::Gb => "United Kingdom",
            Self::Us => "United States",
        }
    }

    /// Whether the commerce gateway defines administrative areas for this
    /// country. Addresses in these countries must carry a `country_area`.
    #[must_use]
    pub const fn has_subdivisions(&self) -> bool {
        matches!(self, Self::Gr | Self::Cy)
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CountryCode {
    type Err = CountryCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|c| c.code() == s)
            .copied()
            .ok_or_else(|| CountryCodeError(s.to_owned()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code_round_trip() {
        for code in ["EUR", "USD", "GBP"] {
            let parsed: CurrencyCode = code.parse().unwrap();
            assert_eq!(parsed.code(), code);
            assert_eq!(parsed.to_string(), code);
        }
    }

    #[test]
    fn test_currency_code_unknown() {
        assert!("CHF".parse::<CurrencyCode>().is_err());
        assert!("eur".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_currency_serde_uses_uppercase() {
        let json = serde_json::to_string(&CurrencyCode::Eur).unwrap();
        assert_eq!(json, "\"EUR\"");
        let back: CurrencyCode = serde_json::from_str("\"GBP\"").unwrap();
        assert_eq!(back, CurrencyCode::Gbp);
    }

    #[test]
    fn test_country_code_round_trip() {
        for country in CountryCode::ALL {
            let parsed: CountryCode = country.code().parse().unwrap();
            assert_eq!(parsed, country);
        }
    }

    #[test]
    fn test_country_code_unknown() {
        assert!("ZZ".parse::<CountryCode>().is_err());
    }

    #[test]
    fn test_subdivision_countries() {
        assert!(CountryCode::Gr.has_subdivisions());
        assert!(CountryCode::Cy.has_subdivisions());
        assert!(!CountryCode::De.has_subdivisions());
        assert!(!CountryCode::Us.has_subdivisions());
    }

    #[test]
    fn test_country_serde_uses_uppercase() {
        let json = serde_json::to_string(&CountryCode::Gr).unwrap();
        assert_eq!(json, "\"GR\"");
        let back: CountryCode = serde_json::from_str("\"CY\"").unwrap();
        assert_eq!(back, CountryCode::Cy);
    }
}
