//! GraphQL query definitions for the commerce gateway API.

use graphql_client::GraphQLQuery;

// Scalar types for the gateway GraphQL schema
// Must be defined in the same module where GraphQLQuery derive is used
// Note: These MUST match the GraphQL schema scalar names exactly
type Decimal = rust_decimal::Decimal;
#[allow(clippy::upper_case_acronyms)]
type UUID = uuid::Uuid;

// Checkout pipeline mutations
#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/gateway/schema.graphql",
    query_path = "graphql/gateway/queries/checkout.graphql",
    response_derives = "Debug, Clone"
)]
pub struct CheckoutShippingAddressUpdate;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/gateway/schema.graphql",
    query_path = "graphql/gateway/queries/checkout.graphql",
    response_derives = "Debug, Clone"
)]
pub struct CheckoutBillingAddressUpdate;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/gateway/schema.graphql",
    query_path = "graphql/gateway/queries/checkout.graphql",
    response_derives = "Debug, Clone"
)]
pub struct CheckoutEmailUpdate;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/gateway/schema.graphql",
    query_path = "graphql/gateway/queries/checkout.graphql",
    response_derives = "Debug, Clone"
)]
pub struct CheckoutDeliveryMethodUpdate;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/gateway/schema.graphql",
    query_path = "graphql/gateway/queries/checkout.graphql",
    response_derives = "Debug, Clone"
)]
pub struct GetCheckoutTotal;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/gateway/schema.graphql",
    query_path = "graphql/gateway/queries/checkout.graphql",
    response_derives = "Debug, Clone"
)]
pub struct CheckoutPaymentCreate;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/gateway/schema.graphql",
    query_path = "graphql/gateway/queries/checkout.graphql",
    response_derives = "Debug, Clone"
)]
pub struct CheckoutComplete;

// Checkout rendering and promo codes
#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/gateway/schema.graphql",
    query_path = "graphql/gateway/queries/checkout.graphql",
    response_derives = "Debug, Clone"
)]
pub struct GetCheckoutSummary;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/gateway/schema.graphql",
    query_path = "graphql/gateway/queries/checkout.graphql",
    response_derives = "Debug, Clone"
)]
pub struct CheckoutPromoCodeAdd;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/gateway/schema.graphql",
    query_path = "graphql/gateway/queries/checkout.graphql",
    response_derives = "Debug, Clone"
)]
pub struct CheckoutPromoCodeRemove;

// Registry queries and mutations
#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/gateway/schema.graphql",
    query_path = "graphql/gateway/queries/registry.graphql",
    response_derives = "Debug, Clone"
)]
pub struct GetRegistryItem;

#[derive(GraphQLQuery)]
#[graphql(
    schema_path = "graphql/gateway/schema.graphql",
    query_path = "graphql/gateway/queries/registry.graphql",
    response_derives = "Debug, Clone"
)]
pub struct RegistryContributionAdd;
