pub mod client_credentials;
pub mod extractor;
pub mod jwt;
pub mod middleware;

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::system::auth::{UserInfo, ROLE_ADMIN};
use serde_json::json;

use crate::shared::config::AuthConfig;
use jwt::TokenVerifier;

/// Authentication and authorization failures
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingBearerToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("jwks refresh failed: {0}")]
    JwksRefresh(String),

    #[error("token verification is not configured")]
    NotConfigured,

    #[error("requires one of the roles: {0}")]
    Forbidden(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Forbidden(_) => "FORBIDDEN",
            _ => "UNAUTHORIZED",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::debug!("Rejected request: {}", self);
        }
        let body = json!({ "error": self.code(), "message": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Front door for bearer authentication. With authentication disabled
/// every request runs as a development principal holding `admin`.
#[derive(Debug)]
pub struct Authenticator {
    enabled: bool,
    verifier: TokenVerifier,
}

impl Authenticator {
    pub fn new(settings: AuthConfig) -> anyhow::Result<Self> {
        let enabled = settings.enabled;
        let verifier = TokenVerifier::new(settings)?;
        if !enabled {
            tracing::warn!("Authentication is DISABLED, all requests run as the development principal");
        } else if !verifier.is_configured() {
            tracing::warn!("Authentication enabled but neither auth.jwks_url nor auth.hs256_secret is set; every token will be rejected");
        }
        Ok(Self { enabled, verifier })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<UserInfo, AuthError> {
        if !self.enabled {
            return Ok(development_principal());
        }
        let token = extract_bearer_token(headers).ok_or(AuthError::MissingBearerToken)?;
        self.verifier.verify_token(&token).await
    }
}

pub fn development_principal() -> UserInfo {
    UserInfo {
        user_id: "dev-user".into(),
        email: None,
        roles: vec![ROLE_ADMIN.into()],
        permissions: Vec::new(),
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
