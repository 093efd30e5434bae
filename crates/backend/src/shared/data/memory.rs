use async_trait::async_trait;
use contracts::domain::common::{AggregateId, AggregateRoot};
use contracts::shared::pagination::Page;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::repository::{parse_key_cursor, PageRequest, Repository};
use crate::shared::error::{StorageError, StorageResult};

/// In-process backend ordered by id. The uniqueness check and the write run
/// under the same lock.
pub struct MemoryRepository<A: AggregateRoot> {
    items: Arc<RwLock<BTreeMap<String, A>>>,
}

impl<A: AggregateRoot> MemoryRepository<A> {
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl<A: AggregateRoot> Default for MemoryRepository<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: AggregateRoot> Clone for MemoryRepository<A> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

fn identification_taken<A: AggregateRoot>(
    items: &BTreeMap<String, A>,
    identification: &str,
    except: &str,
) -> bool {
    items
        .iter()
        .any(|(key, a)| key != except && !a.is_deleted() && a.identification() == identification)
}

#[async_trait]
impl<A: AggregateRoot> Repository<A> for MemoryRepository<A> {
    async fn create(&self, aggregate: A) -> StorageResult<A> {
        let mut items = self.items.write().await;
        let key = aggregate.id().as_string();
        if identification_taken(&items, aggregate.identification(), &key) {
            return Err(StorageError::UniqueViolation(
                aggregate.identification().to_string(),
            ));
        }
        items.insert(key, aggregate.clone());
        Ok(aggregate)
    }

    async fn find_all(&self, request: &PageRequest) -> StorageResult<Page<A>> {
        let after = parse_key_cursor::<A>(request.cursor.as_deref())?;
        let lower = match &after {
            Some(id) => Bound::Excluded(id.as_string()),
            None => Bound::Unbounded,
        };

        let items = self.items.read().await;
        let limit = request.limit as usize;
        let mut matched = items
            .range((lower, Bound::Unbounded))
            .map(|(_, a)| a)
            .filter(|a| !a.is_deleted())
            .filter(|a| request.status.map_or(true, |s| a.status() == s))
            .take(limit + 1)
            .cloned()
            .collect::<Vec<_>>();

        let next_cursor = if matched.len() > limit {
            matched.truncate(limit);
            matched.last().map(|a| a.id().as_string())
        } else {
            None
        };
        Ok(Page::new(matched, next_cursor))
    }

    async fn find_one(&self, id: A::Id) -> StorageResult<A> {
        let items = self.items.read().await;
        items
            .get(&id.as_string())
            .filter(|a| !a.is_deleted())
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn find_by_identification(&self, identification: &str) -> StorageResult<A> {
        let items = self.items.read().await;
        items
            .values()
            .find(|a| !a.is_deleted() && a.identification() == identification)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn update(&self, id: A::Id, dto: &A::Update) -> StorageResult<A> {
        let mut items = self.items.write().await;
        let key = id.as_string();
        let mut aggregate = items
            .get(&key)
            .filter(|a| !a.is_deleted())
            .cloned()
            .ok_or(StorageError::NotFound)?;

        aggregate.update(dto)?;
        if identification_taken(&items, aggregate.identification(), &key) {
            return Err(StorageError::UniqueViolation(
                aggregate.identification().to_string(),
            ));
        }
        items.insert(key, aggregate.clone());
        Ok(aggregate)
    }

    async fn soft_delete(&self, id: A::Id) -> StorageResult<A> {
        let mut items = self.items.write().await;
        let aggregate = items
            .get_mut(&id.as_string())
            .filter(|a| !a.is_deleted())
            .ok_or(StorageError::NotFound)?;
        aggregate.soft_delete();
        Ok(aggregate.clone())
    }

    async fn restore(&self, id: A::Id) -> StorageResult<A> {
        let mut items = self.items.write().await;
        let key = id.as_string();
        let mut aggregate = items.get(&key).cloned().ok_or(StorageError::NotFound)?;

        if aggregate.is_deleted() && identification_taken(&items, aggregate.identification(), &key)
        {
            return Err(StorageError::UniqueViolation(
                aggregate.identification().to_string(),
            ));
        }
        aggregate.restore();
        items.insert(key, aggregate.clone());
        Ok(aggregate)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
