use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contracts::domain::a002_company::aggregate::{Company, CompanyId, UpdateCompanyDto};
use contracts::domain::common::{AggregateId, AggregateRoot, EntityMetadata};
use contracts::shared::pagination::Page;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

use crate::shared::data::db::is_unique_violation;
use crate::shared::data::repository::{parse_offset_cursor, PageRequest, Repository};
use crate::shared::error::{StorageError, StorageResult};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_company")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub identification: String,
    pub name: String,
    pub alias: String,
    pub address: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Company {
    type Error = StorageError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            status: m.status.parse().map_err(StorageError::backend)?,
            create_date: m.created_at,
            update_date: m.updated_at,
            deleted_at: m.deleted_at,
        };
        Ok(Company {
            id: CompanyId::from_string(&m.id).map_err(StorageError::backend)?,
            identification: m.identification,
            name: m.name,
            alias: m.alias,
            address: m.address,
            metadata,
        })
    }
}

fn to_active_model(aggregate: &Company) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.id.as_string()),
        identification: Set(aggregate.identification.clone()),
        name: Set(aggregate.name.clone()),
        alias: Set(aggregate.alias.clone()),
        address: Set(aggregate.address.clone()),
        status: Set(aggregate.metadata.status.as_str().to_string()),
        created_at: Set(aggregate.metadata.create_date),
        updated_at: Set(aggregate.metadata.update_date),
        deleted_at: Set(aggregate.metadata.deleted_at),
    }
}

fn map_write_err(e: DbErr, aggregate: &Company) -> StorageError {
    if is_unique_violation(&e) {
        StorageError::UniqueViolation(aggregate.identification.clone())
    } else {
        StorageError::backend(e)
    }
}

/// Relational backend for companies (sea-orm over SQLite)
#[derive(Clone)]
pub struct SqlCompanyRepository {
    conn: DatabaseConnection,
}

impl SqlCompanyRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn get(&self, id: &str, include_deleted: bool) -> StorageResult<Company> {
        let mut query = Entity::find_by_id(id.to_string());
        if !include_deleted {
            query = query.filter(Column::DeletedAt.is_null());
        }
        query
            .one(&self.conn)
            .await
            .map_err(StorageError::backend)?
            .ok_or(StorageError::NotFound)?
            .try_into()
    }

    async fn save(&self, aggregate: &Company) -> StorageResult<()> {
        to_active_model(aggregate)
            .update(&self.conn)
            .await
            .map_err(|e| map_write_err(e, aggregate))?;
        Ok(())
    }
}

#[async_trait]
impl Repository<Company> for SqlCompanyRepository {
    async fn create(&self, aggregate: Company) -> StorageResult<Company> {
        Entity::insert(to_active_model(&aggregate))
            .exec_without_returning(&self.conn)
            .await
            .map_err(|e| map_write_err(e, &aggregate))?;
        Ok(aggregate)
    }

    async fn find_all(&self, request: &PageRequest) -> StorageResult<Page<Company>> {
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
            .map(Company::try_from)
            .collect::<StorageResult<Vec<_>>>()?;
        let next_cursor = has_more.then(|| (offset + limit).to_string());
        Ok(Page::new(items, next_cursor))
    }

    async fn find_one(&self, id: CompanyId) -> StorageResult<Company> {
        self.get(&id.as_string(), false).await
    }

    async fn find_by_identification(&self, identification: &str) -> StorageResult<Company> {
        Entity::find()
            .filter(Column::Identification.eq(identification))
            .filter(Column::DeletedAt.is_null())
            .one(&self.conn)
            .await
            .map_err(StorageError::backend)?
            .ok_or(StorageError::NotFound)?
            .try_into()
    }

    async fn update(&self, id: CompanyId, dto: &UpdateCompanyDto) -> StorageResult<Company> {
        let mut aggregate = self.get(&id.as_string(), false).await?;
        aggregate.update(dto)?;
        self.save(&aggregate).await?;
        Ok(aggregate)
    }

    async fn soft_delete(&self, id: CompanyId) -> StorageResult<Company> {
        let mut aggregate = self.get(&id.as_string(), false).await?;
        aggregate.soft_delete();
        self.save(&aggregate).await?;
        Ok(aggregate)
    }

    async fn restore(&self, id: CompanyId) -> StorageResult<Company> {
        let mut aggregate = self.get(&id.as_string(), true).await?;
        aggregate.restore();
        self.save(&aggregate).await?;
        Ok(aggregate)
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
