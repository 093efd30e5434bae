use async_trait::async_trait;
use contracts::domain::common::{AggregateId, AggregateRoot, EntityStatus, ValidationError};
use contracts::shared::pagination::Page;

use crate::shared::error::{StorageError, StorageResult};

/// Resolved listing parameters handed to a backend
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// Always greater than zero
    pub limit: u32,
    pub cursor: Option<String>,
    pub status: Option<EntityStatus>,
}

/// Storage contract for one aggregate type.
///
/// Lookups by id or identification never return soft-deleted records, with
/// the single exception of `restore`.
#[async_trait]
pub trait Repository<A: AggregateRoot>: Send + Sync {
    /// Persist a new record. A collision with an active identification is
    /// reported as `UniqueViolation`, atomically with the write.
    async fn create(&self, aggregate: A) -> StorageResult<A>;

    /// One page of non-deleted records, optionally filtered by status
    async fn find_all(&self, request: &PageRequest) -> StorageResult<Page<A>>;

    async fn find_one(&self, id: A::Id) -> StorageResult<A>;

    async fn find_by_identification(&self, identification: &str) -> StorageResult<A>;

    /// Merge the supplied fields into a non-deleted record
    async fn update(&self, id: A::Id, dto: &A::Update) -> StorageResult<A>;

    async fn soft_delete(&self, id: A::Id) -> StorageResult<A>;

    /// Looks the record up including deleted ones
    async fn restore(&self, id: A::Id) -> StorageResult<A>;

    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;
}

/// Offset cursor: the decimal offset of the next page
pub fn parse_offset_cursor(cursor: Option<&str>) -> StorageResult<u64> {
    match cursor {
        None => Ok(0),
        Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
            StorageError::Validation(ValidationError::new(
                "cursor",
                format!("Invalid cursor '{}'", raw),
            ))
        }),
    }
}

/// Key cursor: the id of the last record of the previous page
pub fn parse_key_cursor<A: AggregateRoot>(cursor: Option<&str>) -> StorageResult<Option<A::Id>> {
    match cursor {
        None => Ok(None),
        Some(raw) => A::Id::from_string(raw).map(Some).map_err(|_| {
            StorageError::Validation(ValidationError::new(
                "cursor",
                format!("Invalid cursor '{}'", raw),
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_customer::aggregate::Customer;

    #[test]
    fn test_parse_offset_cursor() {
        assert_eq!(parse_offset_cursor(None).unwrap(), 0);
        assert_eq!(parse_offset_cursor(Some("20")).unwrap(), 20);
        assert!(matches!(
            parse_offset_cursor(Some("abc")),
            Err(StorageError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_key_cursor() {
        assert!(parse_key_cursor::<Customer>(None).unwrap().is_none());
        let id = "8a3c1f4e-5b6d-4e7f-8a9b-0c1d2e3f4a5b";
        let parsed = parse_key_cursor::<Customer>(Some(id)).unwrap().unwrap();
        assert_eq!(parsed.as_string(), id);
        assert!(parse_key_cursor::<Customer>(Some("not-a-uuid")).is_err());
    }
}
