use async_graphql::{Context, Object, Result, SimpleObject};
use chrono::{DateTime, Utc};

use crate::domain::a001_customer::service::CustomerService;

#[derive(SimpleObject)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub storage_backend: String,
}

#[derive(Default)]
pub struct HealthQuery;

#[Object]
impl HealthQuery {
    async fn health(&self, ctx: &Context<'_>) -> Result<HealthStatus> {
        let customers = ctx.data::<CustomerService>()?;
        Ok(HealthStatus {
            status: "ok".into(),
            timestamp: Utc::now(),
            storage_backend: customers.backend_name().into(),
        })
    }
}
