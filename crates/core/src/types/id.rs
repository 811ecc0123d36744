//! Newtype IDs for type-safe entity references.
//!
//! The commerce gateway owns most identifiers and treats them as opaque
//! strings, so [`define_id!`] wraps `String`. Identifiers minted locally
//! (registries, contributors) are UUIDs via [`define_uuid_id!`].

/// Macro to define a type-safe wrapper for an opaque gateway ID.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Accessors: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use koufeta_core::define_id;
/// define_id!(CheckoutId);
/// define_id!(OrderId);
///
/// let checkout_id = CheckoutId::from("Q2hlY2tvdXQ6MTIz");
///
/// // These are different types, so this won't compile:
/// // let _: OrderId = checkout_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from an owned string.
            #[must_use]
            pub const fn new(id: String) -> Self {
                Self(id)
            }

            /// Get the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Macro to define a type-safe wrapper for a locally minted UUID.
///
/// Same shape as [`define_id!`], backed by [`uuid::Uuid`] and `Copy`,
/// plus `generate()` for minting fresh v4 identifiers and `FromStr` for
/// parsing path parameters.
#[macro_export]
macro_rules! define_uuid_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(::uuid::Uuid);

        impl $name {
            /// Wrap an existing UUID.
            #[must_use]
            pub const fn new(id: ::uuid::Uuid) -> Self {
                Self(id)
            }

            /// Mint a fresh random (v4) identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(::uuid::Uuid::new_v4())
            }

            /// Get the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> ::uuid::Uuid {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.parse::<::uuid::Uuid>().map(Self)
            }
        }

        impl From<::uuid::Uuid> for $name {
            fn from(id: ::uuid::Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for ::uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Gateway-owned identifiers
define_id!(CheckoutId);
define_id!(OrderId);
define_id!(VariantId);
define_id!(DeliveryMethodId);

// Locally minted identifiers
define_uuid_id!(RegistryId);
define_uuid_id!(ContributorId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_string_id_round_trip() {
        let id = CheckoutId::from("Q2hlY2tvdXQ6YWJj");
        assert_eq!(id.as_str(), "Q2hlY2tvdXQ6YWJj");
        assert_eq!(id.to_string(), "Q2hlY2tvdXQ6YWJj");
        assert_eq!(id.clone().into_inner(), "Q2hlY2tvdXQ6YWJj");
    }

    #[test]
    fn test_string_id_serde_is_transparent() {
        let id = OrderId::from("T3JkZXI6MQ==");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"T3JkZXI6MQ==\"");
        let back: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_uuid_id_generate_is_unique() {
        let a = RegistryId::generate();
        let b = RegistryId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_uuid_id_parse_round_trip() {
        let id = ContributorId::generate();
        let parsed: ContributorId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_uuid_id_parse_rejects_garbage() {
        assert!("not-a-uuid".parse::<RegistryId>().is_err());
    }
}
