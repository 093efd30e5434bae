use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use contracts::domain::a001_customer::aggregate::{
    Customer, CustomerId, UpdateCustomerDto,
};
use contracts::domain::common::{AggregateId, AggregateRoot, EntityMetadata};
use contracts::shared::pagination::Page;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

use crate::shared::data::db::is_unique_violation;
use crate::shared::data::repository::{parse_offset_cursor, PageRequest, Repository};
use crate::shared::error::{StorageError, StorageResult};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_customer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub identification: String,
    pub name: String,
    pub lastname: String,
    pub date_born: NaiveDate,
    pub gender: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Customer {
    type Error = StorageError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            status: m.status.parse().map_err(StorageError::backend)?,
            create_date: m.created_at,
            update_date: m.updated_at,
            deleted_at: m.deleted_at,
        };
        Ok(Customer {
            id: CustomerId::from_string(&m.id).map_err(StorageError::backend)?,
            identification: m.identification,
            name: m.name,
            lastname: m.lastname,
            date_born: m.date_born,
            gender: m.gender.parse().map_err(StorageError::backend)?,
            metadata,
        })
    }
}

fn to_active_model(aggregate: &Customer) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.id.as_string()),
        identification: Set(aggregate.identification.clone()),
        name: Set(aggregate.name.clone()),
        lastname: Set(aggregate.lastname.clone()),
        date_born: Set(aggregate.date_born),
        gender: Set(aggregate.gender.as_str().to_string()),
        status: Set(aggregate.metadata.status.as_str().to_string()),
        created_at: Set(aggregate.metadata.create_date),
        updated_at: Set(aggregate.metadata.update_date),
        deleted_at: Set(aggregate.metadata.deleted_at),
    }
}

/// Relational backend for customers (sea-orm over SQLite)
#[derive(Clone)]
pub struct SqlCustomerRepository {
    conn: DatabaseConnection,
}

impl SqlCustomerRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn get_including_deleted(&self, id: &str) -> StorageResult<Customer> {
        Entity::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .map_err(StorageError::backend)?
            .ok_or(StorageError::NotFound)?
            .try_into()
    }

    async fn get_active(&self, id: &str) -> StorageResult<Customer> {
        Entity::find_by_id(id.to_string())
            .filter(Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .map_err(StorageError::backend)?
            .ok_or(StorageError::NotFound)?
            .try_into()
    }

    async fn save(&self, aggregate: &Customer) -> StorageResult<()> {
        to_active_model(aggregate)
            .update(&self.conn)
            .await
            .map_err(|e| map_write_err(e, aggregate))?;
        Ok(())
    }
}

fn map_write_err(e: DbErr, aggregate: &Customer) -> StorageError {
    if is_unique_violation(&e) {
        StorageError::UniqueViolation(aggregate.identification.clone())
    } else {
        StorageError::backend(e)
    }
}

#[async_trait]
impl Repository<Customer> for SqlCustomerRepository {
    async fn create(&self, aggregate: Customer) -> StorageResult<Customer> {
        Entity::insert(to_active_model(&aggregate))
            .exec_without_returning(&self.conn)
            .await
            .map_err(|e| map_write_err(e, &aggregate))?;
        Ok(aggregate)
    }

    async fn find_all(&self, request: &PageRequest) -> StorageResult<Page<Customer>> {
        let offset = parse_offset_cursor(request.cursor.as_deref())?;
        let limit = u64::from(request.limit);

        let mut query = Entity::find().filter(Column::DeletedAt.is_null());
        if let Some(status) = request.status {
            query = query.filter(Column::Status.eq(status.as_str()));
        }
        let rows = query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .offset(offset)
            .limit(limit + 1)
            .all(&self.conn)
            .await
            .map_err(StorageError::backend)?;

        let has_more = rows.len() as u64 > limit;
        let items = rows
            .into_iter()
            .take(limit as usize)
            .map(Customer::try_from)
            .collect::<StorageResult<Vec<_>>>()?;
        let next_cursor = has_more.then(|| (offset + limit).to_string());
        Ok(Page::new(items, next_cursor))
    }

    async fn find_one(&self, id: CustomerId) -> StorageResult<Customer> {
        self.get_active(&id.as_string()).await
    }

    async fn find_by_identification(&self, identification: &str) -> StorageResult<Customer> {
        Entity::find()
            .filter(Column::Identification.eq(identification))
            .filter(Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .map_err(StorageError::backend)?
            .ok_or(StorageError::NotFound)?
            .try_into()
    }

    async fn update(&self, id: CustomerId, dto: &UpdateCustomerDto) -> StorageResult<Customer> {
        let mut aggregate = self.get_active(&id.as_string()).await?;
        aggregate.update(dto)?;
        self.save(&aggregate).await?;
        Ok(aggregate)
    }

    async fn soft_delete(&self, id: CustomerId) -> StorageResult<Customer> {
        let mut aggregate = self.get_active(&id.as_string()).await?;
        aggregate.soft_delete();
        self.save(&aggregate).await?;
        Ok(aggregate)
    }

    async fn restore(&self, id: CustomerId) -> StorageResult<Customer> {
        let mut aggregate = self.get_including_deleted(&id.as_string()).await?;
        aggregate.restore();
        self.save(&aggregate).await?;
        Ok(aggregate)
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::open_temp_database;
    use contracts::domain::a001_customer::aggregate::{CreateCustomerDto, CustomerGender};
    use contracts::domain::common::EntityStatus;
    use std::collections::HashSet;

    fn customer(identification: &str) -> Customer {
        Customer::new_for_insert(CreateCustomerDto {
            identification: identification.into(),
            name: "Jane".into(),
            lastname: "Smith".into(),
            date_born: NaiveDate::from_ymd_opt(1985, 3, 20).unwrap(),
            gender: CustomerGender::Female,
            status: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let (_dir, conn) = open_temp_database().await;
        let repo = SqlCustomerRepository::new(conn);

        let created = repo.create(customer("23456789012")).await.unwrap();
        let found = repo.find_one(created.id).await.unwrap();
        assert_eq!(found.identification, "23456789012");
        assert_eq!(found.gender, CustomerGender::Female);
        assert_eq!(found.date_born, created.date_born);
        assert_eq!(found.status(), EntityStatus::Pending);

        let by_ident = repo.find_by_identification("23456789012").await.unwrap();
        assert_eq!(by_ident.id, created.id);
    }

    #[tokio::test]
    async fn test_unique_index_rejects_active_duplicate() {
        let (_dir, conn) = open_temp_database().await;
        let repo = SqlCustomerRepository::new(conn);

        let first = repo.create(customer("99999999999")).await.unwrap();
        let err = repo.create(customer("99999999999")).await.unwrap_err();
        assert!(matches!(err, StorageError::UniqueViolation(ref v) if v == "99999999999"));

        // Soft-deleted rows do not block reuse, but block their own restore
        repo.soft_delete(first.id).await.unwrap();
        repo.create(customer("99999999999")).await.unwrap();
        let err = repo.restore(first.id).await.unwrap_err();
        assert!(matches!(err, StorageError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_soft_delete_and_restore() {
        let (_dir, conn) = open_temp_database().await;
        let repo = SqlCustomerRepository::new(conn);
        let created = repo.create(customer("34567890123")).await.unwrap();

        let deleted = repo.soft_delete(created.id).await.unwrap();
        assert_eq!(deleted.status(), EntityStatus::Inactive);
        assert!(matches!(
            repo.find_one(created.id).await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            repo.soft_delete(created.id).await,
            Err(StorageError::NotFound)
        ));

        let restored = repo.restore(created.id).await.unwrap();
        assert_eq!(restored.status(), EntityStatus::Active);
        assert!(repo.find_one(created.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_offset_pagination_is_newest_first_and_complete() {
        let (_dir, conn) = open_temp_database().await;
        let repo = SqlCustomerRepository::new(conn);
        for i in 0..12 {
            repo.create(customer(&format!("ID-{:02}", i))).await.unwrap();
        }

        let mut seen = HashSet::new();
        let mut cursor = None;
        let mut previous: Option<Customer> = None;
        loop {
            let page = repo
                .find_all(&PageRequest {
                    limit: 5,
                    cursor: cursor.clone(),
                    status: None,
                })
                .await
                .unwrap();
            for item in page.items {
                if let Some(prev) = &previous {
                    assert!(prev.metadata.create_date >= item.metadata.create_date);
                }
                assert!(seen.insert(item.identification.clone()));
                previous = Some(item);
            }
            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        assert_eq!(seen.len(), 12);
    }

    #[tokio::test]
    async fn test_update_applies_partial_fields() {
        let (_dir, conn) = open_temp_database().await;
        let repo = SqlCustomerRepository::new(conn);
        let created = repo.create(customer("U-1")).await.unwrap();

        let updated = repo
            .update(
                created.id,
                &UpdateCustomerDto {
                    lastname: Some("Johnson".into()),
                    status: Some(EntityStatus::Active),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.lastname, "Johnson");
        assert_eq!(updated.name, "Jane");

        let stored = repo.find_one(created.id).await.unwrap();
        assert_eq!(stored.status(), EntityStatus::Active);
        assert!(stored.metadata.update_date > stored.metadata.create_date);
    }
}
