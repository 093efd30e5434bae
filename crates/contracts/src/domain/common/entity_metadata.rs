use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::EntityStatus;

/// Метаданные жизненного цикла записи (status, timestamps, soft delete)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityMetadata {
    pub status: EntityStatus,
    /// Set once at creation
    pub create_date: DateTime<Utc>,
    /// Refreshed on every mutation, never earlier than `create_date`
    pub update_date: DateTime<Utc>,
    /// Presence marks the record as soft-deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EntityMetadata {
    /// Метаданные для новой записи
    pub fn new(status: EntityStatus) -> Self {
        let now = Utc::now();
        Self {
            status,
            create_date: now,
            update_date: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Обновить timestamp
    ///
    /// `update_date` only moves forward: a clock reading that is not later
    /// than the stored value advances it by one microsecond instead.
    pub fn touch(&mut self) {
        let now = Utc::now();
        self.update_date = if now > self.update_date {
            now
        } else {
            self.update_date + Duration::microseconds(1)
        };
    }

    /// Мягкое удаление
    pub fn mark_deleted(&mut self) {
        self.touch();
        self.deleted_at = Some(self.update_date);
        self.status = EntityStatus::Inactive;
    }

    /// Восстановление после мягкого удаления. Prior status is not kept.
    pub fn restore(&mut self) {
        self.touch();
        self.deleted_at = None;
        self.status = EntityStatus::Active;
    }
}

impl Default for EntityMetadata {
    fn default() -> Self {
        Self::new(EntityStatus::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metadata_has_equal_dates() {
        let meta = EntityMetadata::new(EntityStatus::Pending);
        assert_eq!(meta.create_date, meta.update_date);
        assert!(!meta.is_deleted());
    }

    #[test]
    fn test_touch_is_strictly_monotonic() {
        let mut meta = EntityMetadata::new(EntityStatus::Pending);
        meta.update_date = Utc::now() + Duration::hours(1);
        let before = meta.update_date;
        meta.touch();
        assert!(meta.update_date > before);
    }

    #[test]
    fn test_mark_deleted_then_restore() {
        let mut meta = EntityMetadata::new(EntityStatus::Pending);
        meta.mark_deleted();
        assert_eq!(meta.status, EntityStatus::Inactive);
        assert_eq!(meta.deleted_at, Some(meta.update_date));

        meta.restore();
        assert_eq!(meta.status, EntityStatus::Active);
        assert!(meta.deleted_at.is_none());
        assert!(meta.update_date > meta.create_date);
    }

    #[test]
    fn test_mark_deleted_twice_keeps_end_state() {
        let mut meta = EntityMetadata::new(EntityStatus::Active);
        meta.mark_deleted();
        meta.mark_deleted();
        assert_eq!(meta.status, EntityStatus::Inactive);
        assert!(meta.is_deleted());
    }

    #[test]
    fn test_deleted_at_is_omitted_when_unset() {
        let meta = EntityMetadata::new(EntityStatus::Active);
        let json = serde_json::to_value(&meta).unwrap();
        assert!(json.get("deletedAt").is_none());
        assert_eq!(json["status"], "active");
        assert!(json.get("createDate").is_some());
    }
}
