use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use contracts::domain::a001_customer::aggregate::{
    CreateCustomerDto, Customer, UpdateCustomerDto,
};
use contracts::shared::pagination::{Page, PageQuery};
use serde_json::json;

use crate::domain::a001_customer::service::{self, CustomerService};
use crate::shared::error::DomainError;
use crate::state::AppState;

use super::extract::{ApiJson, ApiPath, ApiQuery};

/// POST /api/customers
pub async fn create(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<CreateCustomerDto>,
) -> Result<(StatusCode, Json<Customer>), DomainError> {
    let customer = state.customers.create(dto).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /api/customers?limit=&cursor=&status=
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Page<Customer>>, DomainError> {
    Ok(Json(state.customers.find_all(query).await?))
}

/// GET /api/customers/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Customer>, DomainError> {
    let id = CustomerService::parse_id(&id)?;
    Ok(Json(state.customers.find_one(id).await?))
}

/// GET /api/customers/identification/:identification
pub async fn get_by_identification(
    State(state): State<AppState>,
    ApiPath(identification): ApiPath<String>,
) -> Result<Json<Customer>, DomainError> {
    Ok(Json(
        state
            .customers
            .find_by_identification(&identification)
            .await?,
    ))
}

/// PUT /api/customers/:id
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(dto): ApiJson<UpdateCustomerDto>,
) -> Result<Json<Customer>, DomainError> {
    let id = CustomerService::parse_id(&id)?;
    Ok(Json(state.customers.update(id, dto).await?))
}

/// DELETE /api/customers/:id
/// PATCH /api/customers/:id/soft-delete
pub async fn soft_delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<StatusCode, DomainError> {
    let id = CustomerService::parse_id(&id)?;
    state.customers.soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/customers/:id/restore
pub async fn restore(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Customer>, DomainError> {
    let id = CustomerService::parse_id(&id)?;
    Ok(Json(state.customers.restore(id).await?))
}

/// POST /api/customers/testdata
pub async fn insert_test_data(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, DomainError> {
    let inserted = service::insert_test_data(&state.customers).await?;
    Ok(Json(json!({ "inserted": inserted })))
}
