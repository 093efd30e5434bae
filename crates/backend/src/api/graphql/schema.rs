use async_graphql::{EmptySubscription, MergedObject, Schema};

use super::company::{CompanyMutation, CompanyQuery};
use super::customer::{CustomerMutation, CustomerQuery};
use super::health::HealthQuery;
use crate::domain::a001_customer::service::CustomerService;
use crate::domain::a002_company::service::CompanyService;

#[derive(MergedObject, Default)]
pub struct RootQuery(HealthQuery, CustomerQuery, CompanyQuery);

#[derive(MergedObject, Default)]
pub struct RootMutation(CustomerMutation, CompanyMutation);

pub type AppSchema = Schema<RootQuery, RootMutation, EmptySubscription>;

/// Services are injected as schema data; the caller's `UserInfo` is added per request
pub fn build_schema(customers: CustomerService, companies: CompanyService) -> AppSchema {
    Schema::build(
        RootQuery::default(),
        RootMutation::default(),
        EmptySubscription,
    )
    .data(customers)
    .data(companies)
    .finish()
}
