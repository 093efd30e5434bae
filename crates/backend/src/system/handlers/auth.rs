use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use contracts::system::auth::{TokenRequest, TokenResponse};
use serde_json::json;

use crate::state::AppState;
use crate::system::auth::client_credentials::TokenError;

impl IntoResponse for TokenError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = match &self {
            TokenError::MissingParameters(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            TokenError::Upstream(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        };
        (status, Json(json!({ "error": code, "message": self.to_string() }))).into_response()
    }
}

/// POST /api/auth/token
///
/// Body is optional; absent values come from the identity provider settings.
pub async fn issue_token(
    State(state): State<AppState>,
    body: Option<Json<TokenRequest>>,
) -> Result<Json<TokenResponse>, TokenError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let token = state.token_client.issue(request).await?;
    Ok(Json(token))
}
