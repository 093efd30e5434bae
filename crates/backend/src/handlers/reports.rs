use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use contracts::dashboards::d400_analytics_report::dto::{
    CompanyReport, CustomerReport, DashboardResponse, ReportRequest, ReportsHealth,
};
use contracts::system::auth::{ROLE_ADMIN, ROLE_ANALYST, ROLE_MANAGER};

use crate::shared::error::DomainError;
use crate::state::AppState;
use crate::system::auth::extractor::CurrentUser;
use crate::system::auth::AuthError;

use super::extract::ApiQuery;

const REPORT_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_ANALYST];
const DASHBOARD_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_ANALYST, ROLE_MANAGER];

/// Role or domain failure on a report endpoint
pub enum ReportError {
    Auth(AuthError),
    Domain(DomainError),
}

impl From<AuthError> for ReportError {
    fn from(e: AuthError) -> Self {
        ReportError::Auth(e)
    }
}

impl From<DomainError> for ReportError {
    fn from(e: DomainError) -> Self {
        ReportError::Domain(e)
    }
}

impl IntoResponse for ReportError {
    fn into_response(self) -> Response {
        match self {
            ReportError::Auth(e) => e.into_response(),
            ReportError::Domain(e) => e.into_response(),
        }
    }
}

/// GET /api/reports/customers?dateFrom=&dateTo=
pub async fn customers(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(request): ApiQuery<ReportRequest>,
) -> Result<Json<CustomerReport>, ReportError> {
    user.require_any_role(REPORT_ROLES)?;
    Ok(Json(state.reports.customer_report(&request).await?))
}

/// GET /api/reports/companies?dateFrom=&dateTo=
pub async fn companies(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(request): ApiQuery<ReportRequest>,
) -> Result<Json<CompanyReport>, ReportError> {
    user.require_any_role(REPORT_ROLES)?;
    Ok(Json(state.reports.company_report(&request).await?))
}

/// GET /api/reports/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<DashboardResponse>, ReportError> {
    user.require_any_role(DASHBOARD_ROLES)?;
    Ok(Json(state.reports.dashboard().await?))
}

/// GET /api/reports/health
pub async fn health(State(state): State<AppState>) -> Json<ReportsHealth> {
    Json(state.reports.health())
}
