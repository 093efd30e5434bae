use async_graphql::{Context, InputObject, Object, Result, SimpleObject, ID};
use chrono::{DateTime, Utc};
use contracts::domain::a002_company::aggregate::{Company, CreateCompanyDto, UpdateCompanyDto};
use contracts::shared::pagination::{Page, PageQuery};

use super::types::{gql_err, StatusGql};
use crate::domain::a002_company::service::CompanyService;

#[derive(SimpleObject, Clone, Debug)]
#[graphql(name = "Company")]
pub struct CompanyGql {
    pub id: ID,
    pub identification: String,
    pub name: String,
    pub alias: String,
    pub address: String,
    pub status: StatusGql,
    pub create_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Company> for CompanyGql {
    fn from(c: Company) -> Self {
        Self {
            id: ID(c.id.to_string()),
            identification: c.identification,
            name: c.name,
            alias: c.alias,
            address: c.address,
            status: c.metadata.status.into(),
            create_date: c.metadata.create_date,
            update_date: c.metadata.update_date,
            deleted_at: c.metadata.deleted_at,
        }
    }
}

#[derive(SimpleObject)]
pub struct CompanyPage {
    pub items: Vec<CompanyGql>,
    pub next_cursor: Option<String>,
    pub count: u32,
}

impl From<Page<Company>> for CompanyPage {
    fn from(page: Page<Company>) -> Self {
        let page = page.map(CompanyGql::from);
        Self {
            items: page.items,
            next_cursor: page.next_cursor,
            count: page.count as u32,
        }
    }
}

#[derive(InputObject)]
pub struct CreateCompanyInput {
    pub identification: String,
    pub name: String,
    pub alias: String,
    pub address: String,
    pub status: Option<StatusGql>,
}

impl From<CreateCompanyInput> for CreateCompanyDto {
    fn from(i: CreateCompanyInput) -> Self {
        Self {
            identification: i.identification,
            name: i.name,
            alias: i.alias,
            address: i.address,
            status: i.status.map(Into::into),
        }
    }
}

#[derive(InputObject, Default)]
pub struct UpdateCompanyInput {
    pub identification: Option<String>,
    pub name: Option<String>,
    pub alias: Option<String>,
    pub address: Option<String>,
    pub status: Option<StatusGql>,
}

impl From<UpdateCompanyInput> for UpdateCompanyDto {
    fn from(i: UpdateCompanyInput) -> Self {
        Self {
            identification: i.identification,
            name: i.name,
            alias: i.alias,
            address: i.address,
            status: i.status.map(Into::into),
        }
    }
}

#[derive(Default)]
pub struct CompanyQuery;

#[Object]
impl CompanyQuery {
    async fn companies(
        &self,
        ctx: &Context<'_>,
        limit: Option<u32>,
        cursor: Option<String>,
        status: Option<StatusGql>,
    ) -> Result<CompanyPage> {
        let service = ctx.data::<CompanyService>()?;
        let query = PageQuery {
            limit,
            cursor,
            status: status.map(Into::into),
        };
        Ok(service.find_all(query).await.map_err(gql_err)?.into())
    }

    async fn company(&self, ctx: &Context<'_>, id: ID) -> Result<CompanyGql> {
        let service = ctx.data::<CompanyService>()?;
        let id = CompanyService::parse_id(&id).map_err(gql_err)?;
        Ok(service.find_one(id).await.map_err(gql_err)?.into())
    }

    async fn company_by_identification(
        &self,
        ctx: &Context<'_>,
        identification: String,
    ) -> Result<CompanyGql> {
        let service = ctx.data::<CompanyService>()?;
        Ok(service
            .find_by_identification(&identification)
            .await
            .map_err(gql_err)?
            .into())
    }
}

#[derive(Default)]
pub struct CompanyMutation;

#[Object]
impl CompanyMutation {
    async fn create_company(
        &self,
        ctx: &Context<'_>,
        input: CreateCompanyInput,
    ) -> Result<CompanyGql> {
        let service = ctx.data::<CompanyService>()?;
        Ok(service.create(input.into()).await.map_err(gql_err)?.into())
    }

    async fn update_company(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateCompanyInput,
    ) -> Result<CompanyGql> {
        let service = ctx.data::<CompanyService>()?;
        let id = CompanyService::parse_id(&id).map_err(gql_err)?;
        Ok(service
            .update(id, input.into())
            .await
            .map_err(gql_err)?
            .into())
    }

    async fn soft_delete_company(&self, ctx: &Context<'_>, id: ID) -> Result<CompanyGql> {
        let service = ctx.data::<CompanyService>()?;
        let id = CompanyService::parse_id(&id).map_err(gql_err)?;
        Ok(service.soft_delete(id).await.map_err(gql_err)?.into())
    }

    async fn restore_company(&self, ctx: &Context<'_>, id: ID) -> Result<CompanyGql> {
        let service = ctx.data::<CompanyService>()?;
        let id = CompanyService::parse_id(&id).map_err(gql_err)?;
        Ok(service.restore(id).await.map_err(gql_err)?.into())
    }
}
