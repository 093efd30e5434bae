use serde::{de::DeserializeOwned, Serialize};

use super::{AggregateId, EntityMetadata, EntityStatus, ValidationError};

/// Трейт для корня агрегата
///
/// The lifecycle contract shared by every entity module: field validation,
/// partial updates, soft delete and restore. Storage backends and services
/// are written once against this trait.
pub trait AggregateRoot:
    Clone + std::fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Тип идентификатора агрегата
    type Id: AggregateId;
    /// Payload accepted at creation
    type Create: Clone + std::fmt::Debug + Send + Sync + Serialize + DeserializeOwned + 'static;
    /// Partial update, every field optional
    type Update: Clone
        + std::fmt::Debug
        + Default
        + Send
        + Sync
        + Serialize
        + DeserializeOwned
        + 'static;

    // ============================================================================
    // Методы экземпляра
    // ============================================================================

    fn id(&self) -> Self::Id;

    fn identification(&self) -> &str;

    fn metadata(&self) -> &EntityMetadata;

    fn metadata_mut(&mut self) -> &mut EntityMetadata;

    /// Build a validated aggregate with a fresh id and `PENDING` unless the
    /// payload overrides the status.
    fn new_for_insert(dto: Self::Create) -> Result<Self, ValidationError>;

    /// Validate every bounded field
    fn validate(&self) -> Result<(), ValidationError>;

    /// Validate only the fields present in `dto`, without touching any state
    fn validate_update(dto: &Self::Update) -> Result<(), ValidationError>;

    /// Identification requested by an update, if it carries one
    fn requested_identification(dto: &Self::Update) -> Option<&str>;

    /// Apply a partial update. All supplied fields are validated before the
    /// first assignment, so a failure leaves the aggregate untouched.
    fn update(&mut self, dto: &Self::Update) -> Result<(), ValidationError>;

    /// Payload that recreates this aggregate on a remote system
    fn to_create_dto(&self) -> Self::Create;

    // ============================================================================
    // Метаданные класса агрегата
    // ============================================================================

    /// Индекс агрегата в системе (например, "a001")
    fn aggregate_index() -> &'static str;

    /// Имя коллекции (например, "customers")
    fn collection_name() -> &'static str;

    /// Имя элемента для сообщений (например, "Customer")
    fn element_name() -> &'static str;

    // ============================================================================
    // Методы с реализацией по умолчанию
    // ============================================================================

    fn status(&self) -> EntityStatus {
        self.metadata().status
    }

    fn is_deleted(&self) -> bool {
        self.metadata().is_deleted()
    }

    /// Sets `deletedAt`, `INACTIVE` and refreshes `updateDate`. Not guarded
    /// against an already deleted aggregate; callers check that.
    fn soft_delete(&mut self) {
        self.metadata_mut().mark_deleted();
    }

    /// Clears `deletedAt` and always returns to `ACTIVE`
    fn restore(&mut self) {
        self.metadata_mut().restore();
    }
}
