use async_trait::async_trait;
use contracts::domain::common::{AggregateId, AggregateRoot};
use contracts::shared::pagination::Page;
use redis::aio::ConnectionManager;
use std::marker::PhantomData;

use super::repository::{parse_key_cursor, PageRequest, Repository};
use crate::shared::error::{StorageError, StorageResult};

/// Number of ids fetched from the index per round trip while filling a page
const SCAN_BATCH: usize = 100;

/// Claims KEYS[1] for ARGV[1] and writes the item in the same step.
///
/// KEYS: claim, item, index, optional previous claim.
/// ARGV: id, item json, item key prefix, identification.
///
/// A claim whose holder no longer carries the identification (item missing,
/// deleted or renamed) is stale and taken over. The previous claim is
/// dropped only while it still points at this id.
const CLAIM_AND_STORE_SCRIPT: &str = r#"
local holder = redis.call('GET', KEYS[1])
if holder and holder ~= ARGV[1] then
    local raw = redis.call('GET', ARGV[3] .. holder)
    if raw then
        local doc = cjson.decode(raw)
        if doc['identification'] == ARGV[4] and doc['deletedAt'] == nil then
            return 0
        end
    end
end
redis.call('SET', KEYS[1], ARGV[1])
redis.call('SET', KEYS[2], ARGV[2])
redis.call('ZADD', KEYS[3], 0, ARGV[1])
if KEYS[4] and KEYS[4] ~= KEYS[1] and redis.call('GET', KEYS[4]) == ARGV[1] then
    redis.call('DEL', KEYS[4])
end
return 1
"#;

/// Writes the item and releases KEYS[1] if it still belongs to ARGV[1].
///
/// KEYS: claim, item, index. ARGV: id, item json.
const STORE_AND_RELEASE_SCRIPT: &str = r#"
redis.call('SET', KEYS[2], ARGV[2])
redis.call('ZADD', KEYS[3], 0, ARGV[1])
if redis.call('GET', KEYS[1]) == ARGV[1] then
    redis.call('DEL', KEYS[1])
end
return 1
"#;

/// Key layout for one collection
#[derive(Debug, Clone)]
pub struct KeySpace {
    namespace: String,
    collection: &'static str,
}

impl KeySpace {
    pub fn new(namespace: &str, collection: &'static str) -> Self {
        Self {
            namespace: namespace.trim_end_matches(':').to_string(),
            collection,
        }
    }

    pub fn item(&self, id: &str) -> String {
        format!("{}:{}:item:{}", self.namespace, self.collection, id)
    }

    pub fn identification(&self, identification: &str) -> String {
        format!(
            "{}:{}:identification:{}",
            self.namespace, self.collection, identification
        )
    }

    /// Prefix of item keys, completed by an id
    pub fn item_prefix(&self) -> String {
        format!("{}:{}:item:", self.namespace, self.collection)
    }

    /// Sorted set holding every id with score 0, ordered lexicographically
    pub fn index(&self) -> String {
        format!("{}:{}:ids", self.namespace, self.collection)
    }
}

/// Lower bound for ZRANGEBYLEX: exclusive after the cursor, else open
pub fn lex_lower_bound(after: Option<&str>) -> String {
    match after {
        Some(id) => format!("({}", id),
        None => "-".to_string(),
    }
}

/// Key-value backend on Redis. Each record is a JSON value; the active
/// identification is a claim key holding the owner's id. Claims change only
/// inside the same script that writes the item, so a claim and its item
/// never disagree after a failed call.
pub struct RedisRepository<A: AggregateRoot> {
    conn: ConnectionManager,
    keys: KeySpace,
    _marker: PhantomData<fn() -> A>,
}

impl<A: AggregateRoot> RedisRepository<A> {
    pub fn new(conn: ConnectionManager, namespace: &str) -> Self {
        Self {
            conn,
            keys: KeySpace::new(namespace, A::collection_name()),
            _marker: PhantomData,
        }
    }

    async fn load(&self, id: &str) -> StorageResult<Option<A>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = redis::cmd("GET")
            .arg(self.keys.item(id))
            .query_async(&mut conn)
            .await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn load_active(&self, id: &str) -> StorageResult<A> {
        match self.load(id).await? {
            Some(a) if !a.is_deleted() => Ok(a),
            _ => Err(StorageError::NotFound),
        }
    }

    /// Claim the aggregate's identification and write it atomically.
    /// `previous` is an identification to give up in the same step.
    async fn claim_and_store(&self, aggregate: &A, previous: Option<&str>) -> StorageResult<()> {
        let mut conn = self.conn.clone();
        let id = aggregate.id().as_string();
        let json = serde_json::to_string(aggregate)?;

        let script = redis::Script::new(CLAIM_AND_STORE_SCRIPT);
        let mut invocation = script.prepare_invoke();
        invocation
            .key(self.keys.identification(aggregate.identification()))
            .key(self.keys.item(&id))
            .key(self.keys.index());
        if let Some(previous) = previous {
            invocation.key(self.keys.identification(previous));
        }
        invocation
            .arg(&id)
            .arg(json)
            .arg(self.keys.item_prefix())
            .arg(aggregate.identification());

        let claimed: i64 = invocation.invoke_async(&mut conn).await?;
        if claimed == 1 {
            Ok(())
        } else {
            Err(StorageError::UniqueViolation(
                aggregate.identification().to_string(),
            ))
        }
    }

    /// Write the aggregate and give up its identification atomically
    async fn store_and_release(&self, aggregate: &A) -> StorageResult<()> {
        let mut conn = self.conn.clone();
        let id = aggregate.id().as_string();
        let json = serde_json::to_string(aggregate)?;
        let _: i64 = redis::Script::new(STORE_AND_RELEASE_SCRIPT)
            .key(self.keys.identification(aggregate.identification()))
            .key(self.keys.item(&id))
            .key(self.keys.index())
            .arg(&id)
            .arg(json)
            .invoke_async(&mut conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<A: AggregateRoot> Repository<A> for RedisRepository<A> {
    async fn create(&self, aggregate: A) -> StorageResult<A> {
        self.claim_and_store(&aggregate, None).await?;
        Ok(aggregate)
    }

    async fn find_all(&self, request: &PageRequest) -> StorageResult<Page<A>> {
        let after = parse_key_cursor::<A>(request.cursor.as_deref())?.map(|id| id.as_string());
        let limit = request.limit as usize;
        let mut conn = self.conn.clone();
        let mut lower = lex_lower_bound(after.as_deref());
        let mut items: Vec<A> = Vec::with_capacity(limit);

        loop {
            let ids: Vec<String> = redis::cmd("ZRANGEBYLEX")
                .arg(self.keys.index())
                .arg(&lower)
                .arg("+")
                .arg("LIMIT")
                .arg(0)
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;
            if ids.is_empty() {
                return Ok(Page::new(items, None));
            }

            let item_keys: Vec<String> = ids.iter().map(|id| self.keys.item(id)).collect();
            let values: Vec<Option<String>> = redis::cmd("MGET")
                .arg(&item_keys)
                .query_async(&mut conn)
                .await?;

            for (id, value) in ids.iter().zip(values) {
                let Some(json) = value else { continue };
                let aggregate: A = serde_json::from_str(&json)?;
                if aggregate.is_deleted() {
                    continue;
                }
                if request.status.map_or(false, |s| aggregate.status() != s) {
                    continue;
                }
                items.push(aggregate);
                if items.len() == limit {
                    return Ok(Page::new(items, Some(id.clone())));
                }
            }

            if ids.len() < SCAN_BATCH {
                return Ok(Page::new(items, None));
            }
            if let Some(last) = ids.last() {
                lower = lex_lower_bound(Some(last));
            }
        }
    }

    async fn find_one(&self, id: A::Id) -> StorageResult<A> {
        self.load_active(&id.as_string()).await
    }

    async fn find_by_identification(&self, identification: &str) -> StorageResult<A> {
        let mut conn = self.conn.clone();
        let holder: Option<String> = redis::cmd("GET")
            .arg(self.keys.identification(identification))
            .query_async(&mut conn)
            .await?;
        let id = holder.ok_or(StorageError::NotFound)?;
        let aggregate = self.load_active(&id).await?;
        if aggregate.identification() == identification {
            Ok(aggregate)
        } else {
            Err(StorageError::NotFound)
        }
    }

    async fn update(&self, id: A::Id, dto: &A::Update) -> StorageResult<A> {
        let mut aggregate = self.load_active(&id.as_string()).await?;
        let previous = aggregate.identification().to_string();
        aggregate.update(dto)?;

        let released = (aggregate.identification() != previous).then_some(previous.as_str());
        self.claim_and_store(&aggregate, released).await?;
        Ok(aggregate)
    }

    async fn soft_delete(&self, id: A::Id) -> StorageResult<A> {
        let mut aggregate = self.load_active(&id.as_string()).await?;
        aggregate.soft_delete();
        self.store_and_release(&aggregate).await?;
        Ok(aggregate)
    }

    async fn restore(&self, id: A::Id) -> StorageResult<A> {
        let mut aggregate = self
            .load(&id.as_string())
            .await?
            .ok_or(StorageError::NotFound)?;
        aggregate.restore();
        self.claim_and_store(&aggregate, None).await?;
        Ok(aggregate)
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

/// Connect with an auto-reconnecting connection manager
pub async fn connect(url: &str) -> anyhow::Result<ConnectionManager> {
    let client = redis::Client::open(url)?;
    let manager = ConnectionManager::new(client).await?;
    Ok(manager)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let keys = KeySpace::new("partner-hub:", "customers");
        assert_eq!(keys.item("abc"), "partner-hub:customers:item:abc");
        assert_eq!(
            keys.identification("12345678901"),
            "partner-hub:customers:identification:12345678901"
        );
        assert_eq!(keys.index(), "partner-hub:customers:ids");
    }

    #[test]
    fn test_lex_lower_bound() {
        assert_eq!(lex_lower_bound(None), "-");
        assert_eq!(lex_lower_bound(Some("0f1e")), "(0f1e");
        assert_eq!(
            KeySpace::new("ns", "companies").item_prefix() + "abc",
            KeySpace::new("ns", "companies").item("abc")
        );
    }

    // Live tests below run only when REDIS_URL points at a server.
    // Each test works in its own namespace.

    use contracts::domain::a002_company::aggregate::{
        Company, CompanyId, CreateCompanyDto, UpdateCompanyDto,
    };
    use contracts::domain::common::EntityStatus;

    async fn live_repository() -> Option<(RedisRepository<Company>, ConnectionManager, KeySpace)> {
        let url = std::env::var("REDIS_URL").ok()?;
        let conn = connect(&url)
            .await
            .expect("REDIS_URL is set but the server is unreachable");
        let namespace = format!("partner-hub-test-{}", uuid::Uuid::new_v4());
        let keys = KeySpace::new(&namespace, Company::collection_name());
        Some((RedisRepository::new(conn.clone(), &namespace), conn, keys))
    }

    fn company(identification: &str, status: EntityStatus) -> Company {
        Company::new_for_insert(CreateCompanyDto {
            identification: identification.into(),
            name: "Andes Logistics".into(),
            alias: "Andes".into(),
            address: "Carrera 7 # 71-21".into(),
            status: Some(status),
        })
        .unwrap()
    }

    fn created_id(raw: &str) -> CompanyId {
        CompanyId::from_string(raw).unwrap()
    }

    #[tokio::test]
    async fn test_redis_identification_lifecycle() {
        let Some((repo, _, _)) = live_repository().await else {
            return;
        };

        let first = repo
            .create(company("900123456", EntityStatus::Active))
            .await
            .unwrap();
        let duplicate = repo.create(company("900123456", EntityStatus::Active)).await;
        assert!(matches!(duplicate, Err(StorageError::UniqueViolation(ref v)) if v == "900123456"));

        repo.soft_delete(first.id).await.unwrap();
        assert!(matches!(
            repo.find_by_identification("900123456").await,
            Err(StorageError::NotFound)
        ));

        let second = repo
            .create(company("900123456", EntityStatus::Pending))
            .await
            .unwrap();
        assert!(matches!(
            repo.restore(first.id).await,
            Err(StorageError::UniqueViolation(_))
        ));
        assert_eq!(
            repo.find_by_identification("900123456").await.unwrap().id,
            second.id
        );

        repo.soft_delete(second.id).await.unwrap();
        let restored = repo.restore(first.id).await.unwrap();
        assert_eq!(restored.metadata.status, EntityStatus::Active);
        assert!(restored.metadata.deleted_at.is_none());
    }

    #[tokio::test]
    async fn test_redis_update_moves_claim() {
        let Some((repo, _, _)) = live_repository().await else {
            return;
        };

        let moved = repo
            .create(company("800-OLD", EntityStatus::Active))
            .await
            .unwrap();
        let other = repo
            .create(company("800-OTHER", EntityStatus::Active))
            .await
            .unwrap();

        let blocked = repo
            .update(
                moved.id,
                &UpdateCompanyDto {
                    identification: Some("800-OTHER".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(blocked, Err(StorageError::UniqueViolation(_))));
        assert_eq!(
            repo.find_by_identification("800-OTHER").await.unwrap().id,
            other.id
        );

        repo.update(
            moved.id,
            &UpdateCompanyDto {
                identification: Some("800-NEW".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(repo
            .create(company("800-OLD", EntityStatus::Active))
            .await
            .is_ok());
        assert!(matches!(
            repo.create(company("800-NEW", EntityStatus::Active)).await,
            Err(StorageError::UniqueViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_redis_stale_claim_is_taken_over() {
        let Some((repo, mut conn, keys)) = live_repository().await else {
            return;
        };

        // claim left behind by a record that was never written
        let orphan = uuid::Uuid::new_v4().to_string();
        let _: () = redis::cmd("SET")
            .arg(keys.identification("700-STALE"))
            .arg(&orphan)
            .query_async(&mut conn)
            .await
            .unwrap();

        let created = repo
            .create(company("700-STALE", EntityStatus::Active))
            .await
            .unwrap();
        let holder: Option<String> = redis::cmd("GET")
            .arg(keys.identification("700-STALE"))
            .query_async(&mut conn)
            .await
            .unwrap();
        assert_eq!(holder, Some(created.id.to_string()));

        // claim pointing at a record that is already soft-deleted
        let mut deleted = company("700-GONE", EntityStatus::Active);
        deleted.soft_delete();
        let deleted_id = deleted.id.to_string();
        let _: () = redis::cmd("SET")
            .arg(keys.item(&deleted_id))
            .arg(serde_json::to_string(&deleted).unwrap())
            .query_async(&mut conn)
            .await
            .unwrap();
        let _: () = redis::cmd("SET")
            .arg(keys.identification("700-GONE"))
            .arg(&deleted_id)
            .query_async(&mut conn)
            .await
            .unwrap();
        assert!(repo
            .create(company("700-GONE", EntityStatus::Active))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_redis_pagination_skips_deleted_and_filters_status() {
        let Some((repo, _, _)) = live_repository().await else {
            return;
        };

        let mut ids = Vec::new();
        for i in 0..7 {
            let status = if i % 2 == 0 {
                EntityStatus::Active
            } else {
                EntityStatus::Pending
            };
            let created = repo
                .create(company(&format!("C-{}", i), status))
                .await
                .unwrap();
            ids.push(created.id.as_string());
        }
        repo.soft_delete(created_id(&ids[0])).await.unwrap();

        let mut seen = Vec::new();
        let mut cursor = None;
        loop {
            let page = repo
                .find_all(&PageRequest {
                    limit: 2,
                    cursor: cursor.clone(),
                    status: None,
                })
                .await
                .unwrap();
            assert!(page.count <= 2);
            seen.extend(page.items.into_iter().map(|c| c.id.as_string()));
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        assert_eq!(seen.len(), 6);
        assert!(!seen.contains(&ids[0]));
        let mut sorted = seen.clone();
        sorted.sort();
        assert_eq!(seen, sorted);

        let pending = repo
            .find_all(&PageRequest {
                limit: 10,
                cursor: None,
                status: Some(EntityStatus::Pending),
            })
            .await
            .unwrap();
        assert_eq!(pending.count, 3);
        assert!(pending
            .items
            .iter()
            .all(|c| c.metadata.status == EntityStatus::Pending));
    }
}
