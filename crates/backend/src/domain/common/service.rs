use contracts::domain::common::{AggregateId, AggregateRoot};
use contracts::shared::pagination::{Page, PageQuery};
use contracts::domain::common::ValidationError;
use std::sync::Arc;

use crate::shared::data::repository::{PageRequest, Repository};
use crate::shared::error::{DomainError, StorageError};

/// Lifecycle orchestration for one aggregate type: identification
/// uniqueness, pagination defaults and translation of storage failures.
pub struct LifecycleService<A: AggregateRoot> {
    repository: Arc<dyn Repository<A>>,
    default_page_size: u32,
}

impl<A: AggregateRoot> Clone for LifecycleService<A> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            default_page_size: self.default_page_size,
        }
    }
}

impl<A: AggregateRoot> LifecycleService<A> {
    pub fn new(repository: Arc<dyn Repository<A>>, default_page_size: u32) -> Self {
        Self {
            repository,
            default_page_size: default_page_size.max(1),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.repository.backend_name()
    }

    /// Parse an id received from a caller
    pub fn parse_id(raw: &str) -> Result<A::Id, DomainError> {
        Ok(A::Id::from_string(raw)?)
    }

    /// Создание новой записи
    pub async fn create(&self, dto: A::Create) -> Result<A, DomainError> {
        let aggregate = A::new_for_insert(dto)?;
        let identification = aggregate.identification().to_string();

        self.ensure_identification_free(&identification, None).await?;

        let created = self
            .repository
            .create(aggregate)
            .await
            .map_err(|e| self.map_storage(e, "identification", &identification))?;
        tracing::info!(
            "{} {} created ({})",
            A::element_name(),
            created.id().as_string(),
            identification
        );
        Ok(created)
    }

    /// Страница активных записей
    pub async fn find_all(&self, query: PageQuery) -> Result<Page<A>, DomainError> {
        let limit = query.limit.unwrap_or(self.default_page_size);
        if limit == 0 {
            return Err(ValidationError::new("limit", "Limit must be greater than 0").into());
        }
        let request = PageRequest {
            limit,
            cursor: query.cursor,
            status: query.status,
        };
        self.repository
            .find_all(&request)
            .await
            .map_err(|e| self.map_storage(e, "cursor", request.cursor.as_deref().unwrap_or("")))
    }

    pub async fn find_one(&self, id: A::Id) -> Result<A, DomainError> {
        self.repository
            .find_one(id)
            .await
            .map_err(|e| self.map_storage(e, "id", &id.as_string()))
    }

    pub async fn find_by_identification(&self, identification: &str) -> Result<A, DomainError> {
        self.repository
            .find_by_identification(identification)
            .await
            .map_err(|e| self.map_storage(e, "identification", identification))
    }

    /// Частичное обновление. All supplied fields are validated before any
    /// storage access.
    pub async fn update(&self, id: A::Id, dto: A::Update) -> Result<A, DomainError> {
        A::validate_update(&dto)?;

        let current = self.find_one(id).await?;
        if let Some(requested) = A::requested_identification(&dto) {
            if requested != current.identification() {
                self.ensure_identification_free(requested, Some(id)).await?;
            }
        }

        let conflict_key = A::requested_identification(&dto)
            .unwrap_or(current.identification())
            .to_string();
        let updated = self
            .repository
            .update(id, &dto)
            .await
            .map_err(|e| match e {
                StorageError::NotFound => self.map_storage(e, "id", &id.as_string()),
                other => self.map_storage(other, "identification", &conflict_key),
            })?;
        tracing::info!("{} {} updated", A::element_name(), id.as_string());
        Ok(updated)
    }

    /// Мягкое удаление
    pub async fn soft_delete(&self, id: A::Id) -> Result<A, DomainError> {
        let deleted = self
            .repository
            .soft_delete(id)
            .await
            .map_err(|e| self.map_storage(e, "id", &id.as_string()))?;
        tracing::info!("{} {} soft-deleted", A::element_name(), id.as_string());
        Ok(deleted)
    }

    /// Восстановление. Always ends in ACTIVE.
    pub async fn restore(&self, id: A::Id) -> Result<A, DomainError> {
        let restored = self
            .repository
            .restore(id)
            .await
            .map_err(|e| match e {
                StorageError::UniqueViolation(_) | StorageError::Validation(_) => {
                    self.map_storage(e, "identification", "")
                }
                other => self.map_storage(other, "id", &id.as_string()),
            })?;
        tracing::info!("{} {} restored", A::element_name(), id.as_string());
        Ok(restored)
    }

    /// Walk pages until `max` active records are read or the listing ends
    pub async fn collect_active(&self, max: usize) -> Result<Vec<A>, DomainError> {
        let mut items = Vec::new();
        let mut cursor = None;
        while items.len() < max {
            let remaining = (max - items.len()).min(100) as u32;
            let page = self
                .find_all(PageQuery {
                    limit: Some(remaining),
                    cursor,
                    status: None,
                })
                .await?;
            items.extend(page.items);
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        items.truncate(max);
        Ok(items)
    }

    async fn ensure_identification_free(
        &self,
        identification: &str,
        except: Option<A::Id>,
    ) -> Result<(), DomainError> {
        match self.repository.find_by_identification(identification).await {
            Ok(existing) if Some(existing.id()) != except => {
                Err(self.map_storage(
                    StorageError::UniqueViolation(identification.to_string()),
                    "identification",
                    identification,
                ))
            }
            Ok(_) | Err(StorageError::NotFound) => Ok(()),
            Err(e) => Err(self.map_storage(e, "identification", identification)),
        }
    }

    fn map_storage(&self, err: StorageError, key: &'static str, value: &str) -> DomainError {
        match err {
            StorageError::NotFound => DomainError::NotFound {
                entity: A::element_name(),
                key,
                value: value.to_string(),
            },
            StorageError::UniqueViolation(identification) => {
                tracing::warn!(
                    "{} identification '{}' already in use",
                    A::element_name(),
                    identification
                );
                DomainError::Conflict {
                    entity: A::element_name(),
                    identification,
                }
            }
            StorageError::Validation(e) => DomainError::Validation(e),
            StorageError::Backend(cause) => {
                tracing::error!(
                    "{} storage failure on {} backend: {}",
                    A::element_name(),
                    self.repository.backend_name(),
                    cause
                );
                DomainError::Internal(cause)
            }
        }
    }
}
