use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::models::{AskRequest, AskResponse, HealthResponse};
use super::{AskError, AskService};
use crate::config::Config;

/// `reqwest` client for the consular assistant service.
pub struct HttpAskClient {
    http: reqwest::Client,
    base_url: String,
    session_id: Option<String>,
}

impl HttpAskClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.server_url.clone(),
            session_id: Some(config.session_id.clone()),
        })
    }

    /// Client for `base_url` with no session id and no timeout.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send_question(&self, request: &AskRequest) -> Result<AskResponse, AskError> {
        let response = self
            .http
            .post(self.endpoint("ask"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // An unreadable failure body still counts as a failure response.
            let detail = match response.text().await {
                Ok(body) => error_detail(&body),
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        status = status.as_u16(),
                        "unreadable /ask error body"
                    );
                    None
                }
            };
            return Err(AskError::Remote {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.text().await?;
        match serde_json::from_str::<AskResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(err) => {
                tracing::warn!(error = %err, "unparsable /ask success body");
                Ok(AskResponse::default())
            }
        }
    }

    /// Check `GET /health`.
    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self
            .http
            .get(self.endpoint("health"))
            .send()
            .await
            .context("Failed to reach the assistant service")?;

        if !response.status().is_success() {
            anyhow::bail!("Health check failed with status: {}", response.status());
        }

        response
            .json::<HealthResponse>()
            .await
            .context("Failed to parse health response")
    }
}

#[async_trait]
impl AskService for HttpAskClient {
    async fn ask(&self, question: &str) -> Result<AskResponse, AskError> {
        let request = AskRequest::new(question).with_session(self.session_id.as_deref());

        let started = Instant::now();
        let result = self.send_question(&request).await;
        let latency_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => tracing::info!(latency_ms, "question answered"),
            Err(err) => tracing::warn!(latency_ms, kind = err.kind(), error = %err, "question failed"),
        }

        result
    }
}

/// Pull the `detail` string out of an error body, kept exactly as sent.
/// Anything else (HTML pages, validation arrays, empty strings) yields `None`.
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(Value::as_str)
        .filter(|detail| !detail.is_empty())
        .map(str::to_string)
}
