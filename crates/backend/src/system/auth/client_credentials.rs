use contracts::system::auth::{TokenRequest, TokenResponse};
use std::time::Duration;

use crate::shared::config::{identity_provider_base_url, IdentityProviderConfig};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingParameters(Vec<&'static str>),

    #[error("Identity provider unavailable: {0}")]
    Upstream(String),
}

/// Obtains access tokens with the OAuth2 client-credentials grant
#[derive(Debug, Clone)]
pub struct ClientCredentialsClient {
    http: reqwest::Client,
    defaults: IdentityProviderConfig,
}

impl ClientCredentialsClient {
    pub fn new(defaults: IdentityProviderConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { http, defaults })
    }

    pub async fn issue(&self, request: TokenRequest) -> Result<TokenResponse, TokenError> {
        let pick = |given: Option<String>, fallback: &Option<String>| {
            given
                .filter(|v| !v.trim().is_empty())
                .or_else(|| fallback.clone().filter(|v| !v.trim().is_empty()))
        };
        let domain = pick(request.domain, &self.defaults.domain);
        let client_id = pick(request.client_id, &self.defaults.client_id);
        let client_secret = pick(request.client_secret, &self.defaults.client_secret);
        let audience = pick(request.audience, &self.defaults.audience);

        let (Some(domain), Some(client_id), Some(client_secret), Some(audience)) =
            (&domain, &client_id, &client_secret, &audience)
        else {
            let missing = [
                ("domain", domain.is_none()),
                ("clientId", client_id.is_none()),
                ("clientSecret", client_secret.is_none()),
                ("audience", audience.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();
            return Err(TokenError::MissingParameters(missing));
        };

        let url = format!("{}/oauth/token", identity_provider_base_url(domain));
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("audience", audience.as_str()),
        ];

        let response = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| TokenError::Upstream(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Token request to {} failed: {} {}", url, status, body);
            return Err(TokenError::Upstream(format!("{}: {}", status, body)));
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| TokenError::Upstream(e.to_string()))?;
        tracing::info!("Issued client-credentials token for client {}", client_id);
        Ok(token)
    }
}
