use crate::config::WatchConfig;
use crate::error::{Result, WatchError};
use crate::source::StatusSource;
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

/// Client for the Practicum homework status API.
pub struct PracticumClient {
    endpoint: String,
    token: String,
    client: reqwest::Client,
}

impl PracticumClient {
    /// Build a client for `config.endpoint` authenticated with `token`.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &WatchConfig, token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| WatchError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            token: token.to_owned(),
            client,
        })
    }
}

#[async_trait]
impl StatusSource for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<serde_json::Value> {
        debug!(endpoint = %self.endpoint, from_date, "requesting homework statuses");
        let response = self
            .client
            .get(&self.endpoint)
            .header("Authorization", format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| {
                WatchError::Transport(format!(
                    "request to {} with from_date={from_date} failed: {e}",
                    self.endpoint
                ))
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(WatchError::BadStatus {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| WatchError::MalformedResponse(format!("body is not JSON: {e}")))
    }
}
