use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub remote: RemoteConfig,
    pub auth: AuthConfig,
    pub identity_provider: IdentityProviderConfig,
    pub analytics: AnalyticsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty list allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Redis,
    Remote,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Sqlite => "sqlite",
            StorageBackend::Redis => "redis",
            StorageBackend::Remote => "remote",
            StorageBackend::Memory => "memory",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "relational" => Ok(StorageBackend::Sqlite),
            "redis" | "kv" => Ok(StorageBackend::Redis),
            "remote" | "proxy" => Ok(StorageBackend::Remote),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow::anyhow!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub default_page_size: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            default_page_size: contracts::shared::pagination::DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "target/db/app.db".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    /// Prefix for every key written by the service
    pub namespace: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".into(),
            namespace: "partner-hub".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub enabled: bool,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub jwks_url: Option<String>,
    pub roles_claim: String,
    /// Shared secret for HS256 tokens, takes precedence over JWKS
    pub hs256_secret: Option<String>,
    pub jwks_cache_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            issuer: None,
            audience: None,
            jwks_url: None,
            roles_claim: "roles".into(),
            hs256_secret: None,
            jwks_cache_ttl_secs: 600,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct IdentityProviderConfig {
    pub domain: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub audience: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub cube_api_url: Option<String>,
    pub cube_api_token: Option<String>,
    /// Upper bound of records read for one report
    pub report_limit: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            cube_api_url: None,
            cube_api_token: None,
            report_limit: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory. Defaults to `logs` next to the executable.
    pub dir: Option<String>,
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000

[storage]
backend = "sqlite"
default_page_size = 10

[database]
path = "target/db/app.db"

[auth]
enabled = true
roles_claim = "roles"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// Environment variables are applied on top of either source.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = load_file_config()?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

fn load_file_config() -> anyhow::Result<Config> {
    // Try to find config.toml next to the executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    // Fall back to default config
    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Apply deployment environment variables. `lookup` returns the variable's
/// value if set.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> anyhow::Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(port) = get("PORT") {
        config.server.port = port
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT '{}': {}", port, e))?;
    }
    if let Some(backend) = get("STORAGE_BACKEND") {
        config.storage.backend = backend.parse()?;
    }
    if let Some(path) = get("DATABASE_PATH") {
        config.database.path = path;
    }
    if let Some(url) = get("REDIS_URL") {
        config.redis.url = url;
    }
    if let Some(url) = get("REMOTE_BACKEND_URL").or_else(|| get("REMOTE_API_URL")) {
        config.remote.base_url = Some(url);
    }

    let idp = &mut config.identity_provider;
    if let Some(v) = get("AUTH0_DOMAIN") {
        idp.domain = Some(v);
    }
    if let Some(v) = get("AUTH0_CLIENT_ID") {
        idp.client_id = Some(v);
    }
    if let Some(v) = get("AUTH0_CLIENT_SECRET") {
        idp.client_secret = Some(v);
    }
    if let Some(v) = get("AUTH0_AUDIENCE") {
        idp.audience = Some(v.clone());
        config.auth.audience.get_or_insert(v);
    }

    if let Some(v) = get("AUTH0_JWKS_URI") {
        config.auth.jwks_url = Some(v);
    }
    if let Some(v) = get("JWT_ISSUER") {
        config.auth.issuer = Some(v);
    }
    if let Some(v) = get("AUTH0_ROLES_CLAIM") {
        config.auth.roles_claim = v;
    }
    if config.auth.jwks_url.is_none() {
        if let Some(domain) = &config.identity_provider.domain {
            config.auth.jwks_url = Some(format!(
                "{}/.well-known/jwks.json",
                identity_provider_base_url(domain)
            ));
        }
    }

    if let Some(v) = get("CUBE_API_URL") {
        config.analytics.cube_api_url = Some(v);
    }
    if let Some(v) = get("CUBE_API_TOKEN") {
        config.analytics.cube_api_token = Some(v);
    }

    Ok(())
}

/// `https://{domain}` unless the domain already carries a scheme
pub fn identity_provider_base_url(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    }
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    resolve_relative_to_exe(&config.database.path)
}

/// Directory for log files
pub fn get_log_dir(config: &Config) -> anyhow::Result<PathBuf> {
    match &config.logging.dir {
        Some(dir) => resolve_relative_to_exe(dir),
        None => resolve_relative_to_exe("logs"),
    }
}

fn resolve_relative_to_exe(path_str: &str) -> anyhow::Result<PathBuf> {
    let path = Path::new(path_str);

    // If absolute path, use as is
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    // If relative path, resolve it relative to the executable directory
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(path));
        }
    }

    // Fallback: use relative to current directory
    Ok(PathBuf::from(path_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_loads() {
        let config: Result<Config, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.database.path, "target/db/app.db");
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.storage.default_page_size, 10);
        assert_eq!(config.auth.roles_claim, "roles");
        assert_eq!(config.analytics.report_limit, 1000);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PORT", "8080"),
            ("STORAGE_BACKEND", "remote"),
            ("REMOTE_API_URL", "http://backend:4000"),
            ("AUTH0_DOMAIN", "tenant.auth0.com"),
            ("AUTH0_AUDIENCE", "https://api.partner-hub"),
            ("CUBE_API_URL", ""),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Remote);
        assert_eq!(
            config.remote.base_url.as_deref(),
            Some("http://backend:4000")
        );
        assert_eq!(
            config.auth.jwks_url.as_deref(),
            Some("https://tenant.auth0.com/.well-known/jwks.json")
        );
        assert_eq!(
            config.auth.audience.as_deref(),
            Some("https://api.partner-hub")
        );
        assert!(config.analytics.cube_api_url.is_none());
    }

    #[test]
    fn test_invalid_backend_is_rejected() {
        let mut config = Config::default();
        let result = apply_env_overrides(&mut config, |k| {
            (k == "STORAGE_BACKEND").then(|| "dynamo".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_identity_provider_base_url() {
        assert_eq!(
            identity_provider_base_url("tenant.auth0.com/"),
            "https://tenant.auth0.com"
        );
        assert_eq!(
            identity_provider_base_url("http://127.0.0.1:9000"),
            "http://127.0.0.1:9000"
        );
    }
}
