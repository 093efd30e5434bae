use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use contracts::domain::a002_company::aggregate::{
    CreateCompanyDto, Company, UpdateCompanyDto,
};
use contracts::shared::pagination::{Page, PageQuery};
use serde_json::json;

use crate::domain::a002_company::service::{self, CompanyService};
use crate::shared::error::DomainError;
use crate::state::AppState;

use super::extract::{ApiJson, ApiPath, ApiQuery};

/// POST /api/companies
pub async fn create(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<CreateCompanyDto>,
) -> Result<(StatusCode, Json<Company>), DomainError> {
    let company = state.companies.create(dto).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// GET /api/companies?limit=&cursor=&status=
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> Result<Json<Page<Company>>, DomainError> {
    Ok(Json(state.companies.find_all(query).await?))
}

/// GET /api/companies/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Company>, DomainError> {
    let id = CompanyService::parse_id(&id)?;
    Ok(Json(state.companies.find_one(id).await?))
}

/// GET /api/companies/identification/:identification
pub async fn get_by_identification(
    State(state): State<AppState>,
    ApiPath(identification): ApiPath<String>,
) -> Result<Json<Company>, DomainError> {
    Ok(Json(
        state
            .companies
            .find_by_identification(&identification)
            .await?,
    ))
}

/// PUT /api/companies/:id
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiJson(dto): ApiJson<UpdateCompanyDto>,
) -> Result<Json<Company>, DomainError> {
    let id = CompanyService::parse_id(&id)?;
    Ok(Json(state.companies.update(id, dto).await?))
}

/// DELETE /api/companies/:id
/// PATCH /api/companies/:id/soft-delete
pub async fn soft_delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<StatusCode, DomainError> {
    let id = CompanyService::parse_id(&id)?;
    state.companies.soft_delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/companies/:id/restore
pub async fn restore(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
) -> Result<Json<Company>, DomainError> {
    let id = CompanyService::parse_id(&id)?;
    Ok(Json(state.companies.restore(id).await?))
}

/// POST /api/companies/testdata
pub async fn insert_test_data(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, DomainError> {
    let inserted = service::insert_test_data(&state.companies).await?;
    Ok(Json(json!({ "inserted": inserted })))
}
