use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

/// Client for the Cube analytics API (`POST {base}/v1/load`)
#[derive(Debug, Clone)]
pub struct CubeClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl CubeClient {
    pub fn new(base_url: &str, token: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Push one report. `data_type` names the cube ("customers", ...).
    pub async fn send<T: Serialize>(&self, data_type: &str, data: &T) -> anyhow::Result<()> {
        let payload = json!({
            "query": {
                "measures": [format!("{}.count", data_type)],
                "timeDimensions": [{
                    "dimension": format!("{}.createDate", data_type),
                    "granularity": "month",
                }],
                "dimensions": [format!("{}.status", data_type)],
            },
            "metadata": data,
            "timestamp": Utc::now().to_rfc3339(),
        });

        let response = self
            .http
            .post(format!("{}/v1/load", self.base_url))
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Cube API returned {}", status);
        }
        Ok(())
    }
}
