use async_trait::async_trait;
use contracts::domain::common::{AggregateId, AggregateRoot};
use contracts::shared::pagination::Page;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::time::Duration;

use super::repository::{PageRequest, Repository};
use crate::shared::error::{StorageError, StorageResult};

/// Backend that forwards every operation to another service exposing the
/// same REST surface under `{base_url}/{collection}`.
pub struct RemoteRepository<A: AggregateRoot> {
    client: reqwest::Client,
    base_url: String,
    _marker: PhantomData<fn() -> A>,
}

impl<A: AggregateRoot> RemoteRepository<A> {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                A::collection_name()
            ),
            _marker: PhantomData,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        identification: Option<&str>,
    ) -> StorageResult<T> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_status(status, &body, identification))
    }
}

/// Translate a non-success answer from the remote service
fn map_status(status: StatusCode, body: &str, identification: Option<&str>) -> StorageError {
    match status {
        StatusCode::NOT_FOUND => StorageError::NotFound,
        StatusCode::CONFLICT => {
            StorageError::UniqueViolation(identification.unwrap_or_default().to_string())
        }
        _ => StorageError::Backend(format!("remote answered {}: {}", status, body)),
    }
}

#[async_trait]
impl<A: AggregateRoot> Repository<A> for RemoteRepository<A> {
    async fn create(&self, aggregate: A) -> StorageResult<A> {
        let dto = aggregate.to_create_dto();
        let request = self.client.post(self.url("")).json(&dto);
        self.send(request, Some(aggregate.identification())).await
    }

    async fn find_all(&self, request: &PageRequest) -> StorageResult<Page<A>> {
        let mut query: Vec<(&str, String)> = vec![("limit", request.limit.to_string())];
        if let Some(cursor) = &request.cursor {
            query.push(("cursor", cursor.clone()));
        }
        if let Some(status) = request.status {
            query.push(("status", status.as_str().to_string()));
        }
        let builder = self.client.get(self.url("")).query(&query);
        self.send(builder, None).await
    }

    async fn find_one(&self, id: A::Id) -> StorageResult<A> {
        let request = self.client.get(self.url(&format!("/{}", id.as_string())));
        self.send(request, None).await
    }

    async fn find_by_identification(&self, identification: &str) -> StorageResult<A> {
        let path = format!(
            "/identification/{}",
            urlencoding::encode(identification)
        );
        let request = self.client.get(self.url(&path));
        self.send(request, Some(identification)).await
    }

    async fn update(&self, id: A::Id, dto: &A::Update) -> StorageResult<A> {
        let request = self
            .client
            .put(self.url(&format!("/{}", id.as_string())))
            .json(dto);
        let identification = A::requested_identification(dto);
        self.send(request, identification).await
    }

    async fn soft_delete(&self, id: A::Id) -> StorageResult<A> {
        let path = format!("/{}", id.as_string());
        let response = self
            .client
            .request(Method::PATCH, self.url(&format!("{}/soft-delete", path)))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<A>().await?);
        }
        if status != StatusCode::METHOD_NOT_ALLOWED && status != StatusCode::NOT_IMPLEMENTED {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body, None));
        }

        // Older remotes only know plain DELETE, which may answer without a body
        tracing::debug!(
            "{} soft-delete route unavailable ({}), falling back to DELETE",
            A::collection_name(),
            status
        );
        let mut aggregate = self.find_one(id).await?;
        let response = self.client.delete(self.url(&path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status, &body, None));
        }
        let bytes = response.bytes().await?;
        if let Ok(remote) = serde_json::from_slice::<A>(&bytes) {
            return Ok(remote);
        }

        // Deleted records cannot be read back; report the local view of it
        aggregate.soft_delete();
        Ok(aggregate)
    }

    async fn restore(&self, id: A::Id) -> StorageResult<A> {
        let request = self.client.request(
            Method::PATCH,
            self.url(&format!("/{}/restore", id.as_string())),
        );
        self.send(request, None).await
    }

    fn backend_name(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contracts::domain::a001_customer::aggregate::{
        CreateCustomerDto, Customer, CustomerGender, UpdateCustomerDto,
    };
    use contracts::domain::common::EntityStatus;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn customer() -> Customer {
        Customer::new_for_insert(CreateCustomerDto {
            identification: "12345678901".into(),
            name: "John".into(),
            lastname: "Doe".into(),
            date_born: NaiveDate::from_ymd_opt(1990, 1, 15).unwrap(),
            gender: CustomerGender::Male,
            status: None,
        })
        .unwrap()
    }

    fn repo(server: &MockServer) -> RemoteRepository<Customer> {
        RemoteRepository::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_create_posts_create_payload() {
        let server = MockServer::start().await;
        let local = customer();
        Mock::given(method("POST"))
            .and(path("/customers"))
            .and(body_partial_json(serde_json::json!({
                "identification": "12345678901",
                "dateBorn": "1990-01-15",
                "gender": "male"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(&local))
            .expect(1)
            .mount(&server)
            .await;

        let created = repo(&server).create(local.clone()).await.unwrap();
        assert_eq!(created.id, local.id);
    }

    #[tokio::test]
    async fn test_conflict_maps_to_unique_violation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/customers"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let err = repo(&server).create(customer()).await.unwrap_err();
        assert!(matches!(err, StorageError::UniqueViolation(ref v) if v == "12345678901"));
    }

    #[tokio::test]
    async fn test_not_found_and_server_errors() {
        let server = MockServer::start().await;
        let local = customer();
        Mock::given(method("GET"))
            .and(path(format!("/customers/{}", local.id)))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(format!("/customers/{}", local.id)))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let repo = repo(&server);
        assert!(matches!(
            repo.find_one(local.id).await,
            Err(StorageError::NotFound)
        ));
        let err = repo
            .update(local.id, &UpdateCustomerDto::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Backend(ref m) if m.contains("bad gateway")));
    }

    #[tokio::test]
    async fn test_find_all_forwards_query() {
        let server = MockServer::start().await;
        let page = Page::new(vec![customer()], Some("10".into()));
        Mock::given(method("GET"))
            .and(path("/customers"))
            .and(query_param("limit", "10"))
            .and(query_param("status", "pending"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&page))
            .mount(&server)
            .await;

        let result = repo(&server)
            .find_all(&PageRequest {
                limit: 10,
                cursor: None,
                status: Some(EntityStatus::Pending),
            })
            .await
            .unwrap();
        assert_eq!(result.count, 1);
        assert_eq!(result.next_cursor.as_deref(), Some("10"));
    }

    #[tokio::test]
    async fn test_soft_delete_falls_back_to_delete_on_405() {
        let server = MockServer::start().await;
        let local = customer();
        Mock::given(method("PATCH"))
            .and(path(format!("/customers/{}/soft-delete", local.id)))
            .respond_with(ResponseTemplate::new(405))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/customers/{}", local.id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(&local))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("/customers/{}", local.id)))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let deleted = repo(&server).soft_delete(local.id).await.unwrap();
        assert_eq!(deleted.status(), EntityStatus::Inactive);
        assert!(deleted.is_deleted());
    }

    #[tokio::test]
    async fn test_soft_delete_does_not_fall_back_on_404() {
        let server = MockServer::start().await;
        let local = customer();
        Mock::given(method("PATCH"))
            .and(path(format!("/customers/{}/soft-delete", local.id)))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let err = repo(&server).soft_delete(local.id).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }
}
