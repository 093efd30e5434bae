pub mod db;
pub mod kv;
pub mod memory;
pub mod remote;
pub mod repository;

use anyhow::Context;
use contracts::domain::a001_customer::aggregate::Customer;
use contracts::domain::a002_company::aggregate::Company;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::a001_customer::repository::SqlCustomerRepository;
use crate::domain::a002_company::repository::SqlCompanyRepository;
use crate::shared::config::{self, Config, StorageBackend};
use repository::Repository;

/// Repositories of every aggregate, bound to one backend
#[derive(Clone)]
pub struct Repositories {
    pub customers: Arc<dyn Repository<Customer>>,
    pub companies: Arc<dyn Repository<Company>>,
}

/// Build the repositories for the backend selected in configuration
pub async fn build_repositories(config: &Config) -> anyhow::Result<Repositories> {
    let backend = config.storage.backend;
    tracing::info!("Storage backend: {}", backend.as_str());

    match backend {
        StorageBackend::Sqlite => {
            let db_path = config::get_database_path(config)?;
            let conn = db::initialize_database(&db_path)
                .await
                .with_context(|| format!("db init failed: {}", db_path.display()))?;
            Ok(Repositories {
                customers: Arc::new(SqlCustomerRepository::new(conn.clone())),
                companies: Arc::new(SqlCompanyRepository::new(conn)),
            })
        }
        StorageBackend::Redis => {
            let conn = kv::connect(&config.redis.url)
                .await
                .with_context(|| format!("redis connect failed: {}", config.redis.url))?;
            let namespace = &config.redis.namespace;
            Ok(Repositories {
                customers: Arc::new(kv::RedisRepository::<Customer>::new(conn.clone(), namespace)),
                companies: Arc::new(kv::RedisRepository::<Company>::new(conn, namespace)),
            })
        }
        StorageBackend::Remote => {
            let base_url = config
                .remote
                .base_url
                .as_deref()
                .context("remote backend selected but remote.base_url is not set")?;
            let timeout = Duration::from_secs(config.remote.timeout_secs);
            Ok(Repositories {
                customers: Arc::new(remote::RemoteRepository::<Customer>::new(base_url, timeout)?),
                companies: Arc::new(remote::RemoteRepository::<Company>::new(base_url, timeout)?),
            })
        }
        StorageBackend::Memory => Ok(Repositories::in_memory()),
    }
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            customers: Arc::new(memory::MemoryRepository::<Customer>::new()),
            companies: Arc::new(memory::MemoryRepository::<Company>::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remote_backend_requires_base_url() {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Remote;
        assert!(build_repositories(&config).await.is_err());

        config.remote.base_url = Some("http://127.0.0.1:4000".into());
        let repos = build_repositories(&config).await.unwrap();
        assert_eq!(repos.customers.backend_name(), "remote");
    }

    #[tokio::test]
    async fn test_sqlite_backend_uses_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.database.path = dir.path().join("app.db").to_string_lossy().into_owned();

        let repos = build_repositories(&config).await.unwrap();
        assert_eq!(repos.companies.backend_name(), "sqlite");
        assert!(dir.path().join("app.db").exists());
    }
}
