use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::shared::error::DomainError;

impl DomainError {
    pub fn status(&self) -> StatusCode {
        match self {
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Conflict { .. } => StatusCode::CONFLICT,
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let message = match &self {
            DomainError::Internal(cause) => {
                tracing::error!("Internal error: {}", cause);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (
            self.status(),
            Json(json!({ "error": self.code(), "message": message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::common::ValidationError;

    #[test]
    fn test_status_mapping() {
        let validation = DomainError::from(ValidationError::new("name", "Name is required"));
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let missing = DomainError::NotFound {
            entity: "Company",
            key: "id",
            value: "x".into(),
        };
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let internal = DomainError::Internal("disk on fire".into());
        assert_eq!(internal.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
