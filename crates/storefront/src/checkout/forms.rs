//! Buyer-entered checkout input and completeness checks.
//!
//! All checks are pure. They gate pipeline submission and also drive the
//! per-section completion badges on the checkout page, so the same
//! functions run on every render and on every submit.

use koufeta_core::CountryCode;

/// Contact details attached to the checkout.
#[derive(Debug, Clone, Default)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
}

impl ContactInfo {
    /// Both fields filled in, ignoring surrounding whitespace.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.phone.trim().is_empty()
    }
}

/// A shipping or billing address as entered in the checkout form.
///
/// Optional fields arrive from the form as empty strings; whitespace-only
/// values count as missing.
#[derive(Debug, Clone, Default)]
pub struct PostalAddress {
    pub first_name: String,
    pub last_name: String,
    pub street_address1: String,
    pub street_address2: String,
    pub city: String,
    pub postal_code: String,
    pub country: CountryCode,
    /// Region or prefecture. Required for countries with subdivisions,
    /// free text otherwise.
    pub country_area: String,
}

impl PostalAddress {
    /// Every required field filled in for the selected country.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Display names of required fields that are empty or whitespace-only.
    ///
    /// The country itself cannot be missing: it is a closed enum and the
    /// form select always carries a value.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.first_name.trim().is_empty() {
            missing.push("first name");
        }
        if self.last_name.trim().is_empty() {
            missing.push("last name");
        }
        if self.street_address1.trim().is_empty() {
            missing.push("street address");
        }
        if self.city.trim().is_empty() {
            missing.push("city");
        }
        if self.postal_code.trim().is_empty() {
            missing.push("postal code");
        }
        if self.country.has_subdivisions() && self.country_area.trim().is_empty() {
            missing.push("region");
        }
        missing
    }
}

/// Single-use payment token from the card form.
///
/// The processor tokenizes the instrument in the browser; the raw card
/// number never reaches this server.
#[derive(Debug, Clone, Default)]
pub struct PaymentDraft {
    pub token: String,
}

impl PaymentDraft {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greek_address() -> PostalAddress {
        PostalAddress {
            first_name: "Eleni".to_string(),
            last_name: "Papadopoulou".to_string(),
            street_address1: "Ermou 41".to_string(),
            street_address2: String::new(),
            city: "Athens".to_string(),
            postal_code: "105 63".to_string(),
            country: CountryCode::Gr,
            country_area: "Attica".to_string(),
        }
    }

    #[test]
    fn test_fully_populated_greek_address_is_complete() {
        assert!(greek_address().is_complete());
        assert!(greek_address().missing_fields().is_empty());
    }

    #[test]
    fn test_each_required_field_blocks_completion() {
        let blank_in = |f: fn(&mut PostalAddress)| {
            let mut address = greek_address();
            f(&mut address);
            address
        };

        assert!(!blank_in(|a| a.first_name.clear()).is_complete());
        assert!(!blank_in(|a| a.last_name.clear()).is_complete());
        assert!(!blank_in(|a| a.street_address1.clear()).is_complete());
        assert!(!blank_in(|a| a.city.clear()).is_complete());
        assert!(!blank_in(|a| a.postal_code.clear()).is_complete());
    }

    #[test]
    fn test_whitespace_only_counts_as_missing() {
        let mut address = greek_address();
        address.city = "   ".to_string();
        assert!(!address.is_complete());
        assert_eq!(address.missing_fields(), vec!["city"]);
    }

    #[test]
    fn test_street_address2_is_never_required() {
        let mut address = greek_address();
        address.street_address2 = String::new();
        assert!(address.is_complete());
    }

    #[test]
    fn test_country_area_required_for_greece_and_cyprus() {
        let mut address = greek_address();
        address.country_area = String::new();
        assert_eq!(address.missing_fields(), vec!["region"]);

        address.country = CountryCode::Cy;
        assert_eq!(address.missing_fields(), vec!["region"]);
    }

    #[test]
    fn test_country_area_optional_elsewhere() {
        let mut address = greek_address();
        address.country = CountryCode::De;
        address.country_area = String::new();
        assert!(address.is_complete());
    }

    #[test]
    fn test_missing_fields_reports_all_blanks() {
        let address = PostalAddress {
            country: CountryCode::Gr,
            ..PostalAddress::default()
        };
        assert_eq!(
            address.missing_fields(),
            vec![
                "first name",
                "last name",
                "street address",
                "city",
                "postal code",
                "region",
            ]
        );
    }

    #[test]
    fn test_contact_info_completeness() {
        let complete = ContactInfo {
            email: "eleni@example.gr".to_string(),
            phone: "+30 210 1234567".to_string(),
        };
        assert!(complete.is_complete());

        let blank_phone = ContactInfo {
            phone: "  ".to_string(),
            ..complete.clone()
        };
        assert!(!blank_phone.is_complete());

        assert!(!ContactInfo::default().is_complete());
    }

    #[test]
    fn test_payment_draft_completeness() {
        assert!(!PaymentDraft::default().is_complete());
        assert!(
            !PaymentDraft {
                token: " ".to_string()
            }
            .is_complete()
        );
        assert!(
            PaymentDraft {
                token: "tok_vis_4242".to_string()
            }
            .is_complete()
        );
    }
}
