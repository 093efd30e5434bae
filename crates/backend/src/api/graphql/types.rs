use async_graphql::{Enum, ErrorExtensions};
use contracts::domain::common::EntityStatus;

use crate::shared::error::DomainError;

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(name = "EntityStatus")]
pub enum StatusGql {
    Active,
    Pending,
    Inactive,
}

impl From<EntityStatus> for StatusGql {
    fn from(s: EntityStatus) -> Self {
        match s {
            EntityStatus::Active => StatusGql::Active,
            EntityStatus::Pending => StatusGql::Pending,
            EntityStatus::Inactive => StatusGql::Inactive,
        }
    }
}

impl From<StatusGql> for EntityStatus {
    fn from(s: StatusGql) -> Self {
        match s {
            StatusGql::Active => EntityStatus::Active,
            StatusGql::Pending => EntityStatus::Pending,
            StatusGql::Inactive => EntityStatus::Inactive,
        }
    }
}

impl ErrorExtensions for DomainError {
    fn extend(&self) -> async_graphql::Error {
        let code = self.code();
        let message = match self {
            DomainError::Internal(cause) => {
                tracing::error!("Internal error: {}", cause);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        async_graphql::Error::new(message).extend_with(|_, e| e.set("code", code))
    }
}

/// `?`-friendly conversion for resolvers
pub fn gql_err(e: DomainError) -> async_graphql::Error {
    e.extend()
}
