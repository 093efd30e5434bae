use contracts::system::auth::UserInfo;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::AuthError;
use crate::shared::config::AuthConfig;

#[derive(Debug, Clone)]
struct CachedJwks {
    set: Arc<JwkSet>,
    fetched_at: Instant,
}

impl CachedJwks {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Verifies bearer access tokens issued by the identity provider.
///
/// Tokens are checked against the provider's JWKS (RS256/ES256, key picked by
/// `kid`) or against a shared HS256 secret when one is configured.
#[derive(Debug)]
pub struct TokenVerifier {
    settings: AuthConfig,
    jwks_cache: RwLock<Option<CachedJwks>>,
    http: reqwest::Client,
}

impl TokenVerifier {
    pub fn new(settings: AuthConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            settings,
            jwks_cache: RwLock::new(None),
            http,
        })
    }

    /// True when a key source is available
    pub fn is_configured(&self) -> bool {
        self.settings.hs256_secret.is_some() || self.settings.jwks_url.is_some()
    }

    /// Validate a raw JWT and build the principal from its claims
    pub async fn verify_token(&self, token: &str) -> Result<UserInfo, AuthError> {
        let claims = if let Some(secret) = self.settings.hs256_secret.as_deref() {
            self.decode_hs256(token, secret)?
        } else {
            self.decode_with_jwks(token).await?
        };
        self.principal_from_claims(&claims)
    }

    fn decode_hs256(&self, token: &str, secret: &str) -> Result<Value, AuthError> {
        let validation = self.validation_for(Algorithm::HS256);
        decode::<Value>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    async fn decode_with_jwks(&self, token: &str) -> Result<Value, AuthError> {
        if self.settings.jwks_url.is_none() {
            return Err(AuthError::NotConfigured);
        }
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("missing kid".to_string()))?;
        let algorithm = match header.alg {
            Algorithm::RS256 => Algorithm::RS256,
            Algorithm::ES256 => Algorithm::ES256,
            other => {
                return Err(AuthError::InvalidToken(format!(
                    "unsupported algorithm: {:?}",
                    other
                )));
            }
        };

        let jwk = self
            .get_jwk(&kid)
            .await?
            .ok_or_else(|| AuthError::InvalidToken("unknown kid".to_string()))?;
        let decoding_key = DecodingKey::from_jwk(&jwk)
            .map_err(|e| AuthError::InvalidToken(format!("invalid jwk: {}", e)))?;

        let validation = self.validation_for(algorithm);
        decode::<Value>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn validation_for(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.algorithms = vec![algorithm];
        validation.validate_nbf = true;

        let mut required = vec!["exp"];
        if let Some(issuer) = self.settings.issuer.as_deref() {
            validation.set_issuer(&[issuer]);
            required.push("iss");
        }
        match self.settings.audience.as_deref() {
            Some(audience) => {
                validation.set_audience(&[audience]);
                required.push("aud");
            }
            None => validation.validate_aud = false,
        }
        validation.set_required_spec_claims(&required);
        validation
    }

    fn principal_from_claims(&self, claims: &Value) -> Result<UserInfo, AuthError> {
        let Some(object) = claims.as_object() else {
            return Err(AuthError::InvalidToken(
                "claims payload must be a json object".to_string(),
            ));
        };

        let user_id = object
            .get("sub")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AuthError::InvalidToken("missing sub".to_string()))?;
        let email = object
            .get("email")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(UserInfo {
            user_id,
            email,
            roles: string_list(object.get(self.settings.roles_claim.as_str())),
            permissions: string_list(object.get("permissions")),
        })
    }

    async fn get_jwk(&self, kid: &str) -> Result<Option<Jwk>, AuthError> {
        if let Some(jwk) = self.cached_jwk(kid).await {
            return Ok(Some(jwk));
        }

        self.refresh_jwks().await?;
        Ok(self.cached_jwk(kid).await)
    }

    async fn cached_jwk(&self, kid: &str) -> Option<Jwk> {
        let ttl = Duration::from_secs(self.settings.jwks_cache_ttl_secs);
        let cache = self.jwks_cache.read().await;
        let set = match cache.as_ref() {
            Some(cached) if cached.is_fresh(ttl) => Arc::clone(&cached.set),
            _ => return None,
        };
        drop(cache);

        set.keys
            .iter()
            .find(|jwk| jwk.common.key_id.as_deref() == Some(kid))
            .cloned()
    }

    async fn refresh_jwks(&self) -> Result<(), AuthError> {
        let url = self
            .settings
            .jwks_url
            .as_deref()
            .ok_or(AuthError::NotConfigured)?;
        let set = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AuthError::JwksRefresh(e.to_string()))?
            .error_for_status()
            .map_err(|e| AuthError::JwksRefresh(e.to_string()))?
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::JwksRefresh(e.to_string()))?;

        tracing::debug!("JWKS refreshed: {} keys", set.keys.len());
        *self.jwks_cache.write().await = Some(CachedJwks {
            set: Arc::new(set),
            fetched_at: Instant::now(),
        });
        Ok(())
    }
}

/// Roles may be a JSON array of strings or a single string
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(single)) => vec![single.clone()],
        _ => Vec::new(),
    }
}
