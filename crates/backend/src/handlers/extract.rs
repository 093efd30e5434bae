use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use contracts::domain::common::ValidationError;

use crate::shared::error::DomainError;

/// `Json` whose rejection renders as the usual `{error, message}` body
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(DomainError))]
pub struct ApiJson<T>(pub T);

/// `Query` whose rejection renders as the usual `{error, message}` body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(DomainError))]
pub struct ApiQuery<T>(pub T);

/// `Path` whose rejection renders as the usual `{error, message}` body
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(DomainError))]
pub struct ApiPath<T>(pub T);

impl From<JsonRejection> for DomainError {
    fn from(rejection: JsonRejection) -> Self {
        DomainError::Validation(ValidationError::new("body", rejection.body_text()))
    }
}

impl From<QueryRejection> for DomainError {
    fn from(rejection: QueryRejection) -> Self {
        DomainError::Validation(ValidationError::new("query", rejection.body_text()))
    }
}

impl From<PathRejection> for DomainError {
    fn from(rejection: PathRejection) -> Self {
        DomainError::Validation(ValidationError::new("path", rejection.body_text()))
    }
}
