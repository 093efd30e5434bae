use async_graphql::{Context, Enum, InputObject, Object, Result, SimpleObject, ID};
use chrono::{DateTime, NaiveDate, Utc};
use contracts::domain::a001_customer::aggregate::{
    CreateCustomerDto, Customer, CustomerGender, UpdateCustomerDto,
};
use contracts::shared::pagination::{Page, PageQuery};

use super::types::{gql_err, StatusGql};
use crate::domain::a001_customer::service::CustomerService;

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(name = "Gender")]
pub enum GenderGql {
    Male,
    Female,
    Other,
}

impl From<CustomerGender> for GenderGql {
    fn from(g: CustomerGender) -> Self {
        match g {
            CustomerGender::Male => GenderGql::Male,
            CustomerGender::Female => GenderGql::Female,
            CustomerGender::Other => GenderGql::Other,
        }
    }
}

impl From<GenderGql> for CustomerGender {
    fn from(g: GenderGql) -> Self {
        match g {
            GenderGql::Male => CustomerGender::Male,
            GenderGql::Female => CustomerGender::Female,
            GenderGql::Other => CustomerGender::Other,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(name = "Customer")]
pub struct CustomerGql {
    pub id: ID,
    pub identification: String,
    pub name: String,
    pub lastname: String,
    pub date_born: NaiveDate,
    pub gender: GenderGql,
    pub status: StatusGql,
    pub create_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Customer> for CustomerGql {
    fn from(c: Customer) -> Self {
        Self {
            id: ID(c.id.to_string()),
            identification: c.identification,
            name: c.name,
            lastname: c.lastname,
            date_born: c.date_born,
            gender: c.gender.into(),
            status: c.metadata.status.into(),
            create_date: c.metadata.create_date,
            update_date: c.metadata.update_date,
            deleted_at: c.metadata.deleted_at,
        }
    }
}

#[derive(SimpleObject)]
pub struct CustomerPage {
    pub items: Vec<CustomerGql>,
    pub next_cursor: Option<String>,
    pub count: u32,
}

impl From<Page<Customer>> for CustomerPage {
    fn from(page: Page<Customer>) -> Self {
        let page = page.map(CustomerGql::from);
        Self {
            items: page.items,
            next_cursor: page.next_cursor,
            count: page.count as u32,
        }
    }
}

#[derive(InputObject)]
pub struct CreateCustomerInput {
    pub identification: String,
    pub name: String,
    pub lastname: String,
    pub date_born: NaiveDate,
    pub gender: GenderGql,
    pub status: Option<StatusGql>,
}

impl From<CreateCustomerInput> for CreateCustomerDto {
    fn from(i: CreateCustomerInput) -> Self {
        Self {
            identification: i.identification,
            name: i.name,
            lastname: i.lastname,
            date_born: i.date_born,
            gender: i.gender.into(),
            status: i.status.map(Into::into),
        }
    }
}

#[derive(InputObject, Default)]
pub struct UpdateCustomerInput {
    pub identification: Option<String>,
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub date_born: Option<NaiveDate>,
    pub gender: Option<GenderGql>,
    pub status: Option<StatusGql>,
}

impl From<UpdateCustomerInput> for UpdateCustomerDto {
    fn from(i: UpdateCustomerInput) -> Self {
        Self {
            identification: i.identification,
            name: i.name,
            lastname: i.lastname,
            date_born: i.date_born,
            gender: i.gender.map(Into::into),
            status: i.status.map(Into::into),
        }
    }
}

#[derive(Default)]
pub struct CustomerQuery;

#[Object]
impl CustomerQuery {
    async fn customers(
        &self,
        ctx: &Context<'_>,
        limit: Option<u32>,
        cursor: Option<String>,
        status: Option<StatusGql>,
    ) -> Result<CustomerPage> {
        let service = ctx.data::<CustomerService>()?;
        let query = PageQuery {
            limit,
            cursor,
            status: status.map(Into::into),
        };
        let page = service.find_all(query).await.map_err(gql_err)?;
        Ok(page.into())
    }

    async fn customer(&self, ctx: &Context<'_>, id: ID) -> Result<CustomerGql> {
        let service = ctx.data::<CustomerService>()?;
        let id = CustomerService::parse_id(&id).map_err(gql_err)?;
        Ok(service.find_one(id).await.map_err(gql_err)?.into())
    }

    async fn customer_by_identification(
        &self,
        ctx: &Context<'_>,
        identification: String,
    ) -> Result<CustomerGql> {
        let service = ctx.data::<CustomerService>()?;
        let customer = service
            .find_by_identification(&identification)
            .await
            .map_err(gql_err)?;
        Ok(customer.into())
    }
}

#[derive(Default)]
pub struct CustomerMutation;

#[Object]
impl CustomerMutation {
    async fn create_customer(
        &self,
        ctx: &Context<'_>,
        input: CreateCustomerInput,
    ) -> Result<CustomerGql> {
        let service = ctx.data::<CustomerService>()?;
        let customer = service.create(input.into()).await.map_err(gql_err)?;
        Ok(customer.into())
    }

    async fn update_customer(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdateCustomerInput,
    ) -> Result<CustomerGql> {
        let service = ctx.data::<CustomerService>()?;
        let id = CustomerService::parse_id(&id).map_err(gql_err)?;
        let customer = service.update(id, input.into()).await.map_err(gql_err)?;
        Ok(customer.into())
    }

    async fn soft_delete_customer(&self, ctx: &Context<'_>, id: ID) -> Result<CustomerGql> {
        let service = ctx.data::<CustomerService>()?;
        let id = CustomerService::parse_id(&id).map_err(gql_err)?;
        Ok(service.soft_delete(id).await.map_err(gql_err)?.into())
    }

    async fn restore_customer(&self, ctx: &Context<'_>, id: ID) -> Result<CustomerGql> {
        let service = ctx.data::<CustomerService>()?;
        let id = CustomerService::parse_id(&id).map_err(gql_err)?;
        Ok(service.restore(id).await.map_err(gql_err)?.into())
    }
}
