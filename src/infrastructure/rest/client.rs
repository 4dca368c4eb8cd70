//! REST implementation of the analysis service client port.

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::models::analysis::{AnalysisSummary, OccurrenceInfo, ScanOccurrence};
use crate::domain::models::config::ApiConfig;
use crate::domain::ports::analysis_client::{AnalysisServiceClient, ServiceError};
use crate::domain::ports::version_info::VersionInfoProvider;

/// HTTP client for the analysis service REST API.
///
/// Holds a pooled `reqwest` client with the configured timeout and proxy.
/// Credentials travel as api-key headers on every request; the version
/// string from the injected provider becomes the User-Agent.
pub struct RestAnalysisClient {
    http: HttpClient,
    base_url: String,
    api_id: String,
    api_key: String,
}

impl RestAnalysisClient {
    pub fn new(
        config: &ApiConfig,
        version: &dyn VersionInfoProvider,
    ) -> Result<Self, ServiceError> {
        let mut builder = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(4)
            .user_agent(format!("vigil/{}", version.version()));
        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|err| ServiceError::Network(format!("invalid proxy: {err}")))?;
            builder = builder.proxy(proxy);
        }
        let http = builder
            .build()
            .map_err(|err| ServiceError::Network(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_id: config.id.clone(),
            api_key: config.key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response, ServiceError> {
        debug!(path, "analysis service request");
        self.http
            .get(self.url(path))
            .query(query)
            .header("X-Api-Id", &self.api_id)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|err| ServiceError::Network(err.to_string()))
    }

    async fn expect_success(response: Response) -> Result<Response, ServiceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "failed to read error response".to_string());
        Err(ServiceError::Http {
            status: status.as_u16(),
            message: truncate(&message, 300),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ServiceError> {
        let response = Self::expect_success(self.get(path, query).await?).await?;
        response
            .json()
            .await
            .map_err(|err| ServiceError::InvalidPayload(err.to_string()))
    }

    async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String, ServiceError> {
        let response = Self::expect_success(self.get(path, query).await?).await?;
        response
            .text()
            .await
            .map_err(|err| ServiceError::InvalidPayload(err.to_string()))
    }
}

fn truncate(message: &str, limit: usize) -> String {
    if message.len() <= limit {
        message.to_string()
    } else {
        let mut end = limit;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &message[..end])
    }
}

#[async_trait]
impl AnalysisServiceClient for RestAnalysisClient {
    async fn analysis_by_name(&self, name: &str) -> Result<AnalysisSummary, ServiceError> {
        self.get_json("/analyses", &[("name", name)]).await
    }

    async fn resubmit_analysis(
        &self,
        analysis_id: &str,
        max_duration_hours: u32,
    ) -> Result<(), ServiceError> {
        let response = self
            .http
            .post(self.url(&format!("/analyses/{analysis_id}/resubmit")))
            .header("X-Api-Id", &self.api_id)
            .header("X-Api-Key", &self.api_key)
            .json(&serde_json::json!({ "max_duration_hours": max_duration_hours }))
            .send()
            .await
            .map_err(|err| ServiceError::Network(err.to_string()))?;
        Self::expect_success(response).await.map(|_| ())
    }

    async fn latest_occurrence(
        &self,
        occurrence_id: &str,
    ) -> Result<Option<OccurrenceInfo>, ServiceError> {
        let response = self
            .get(&format!("/analysis_occurrences/{occurrence_id}"), &[])
            .await?;
        // A not-yet-visible occurrence is a normal waiting state, not an error.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::expect_success(response).await?;
        response
            .json()
            .await
            .map(Some)
            .map_err(|err| ServiceError::InvalidPayload(err.to_string()))
    }

    async fn scan_occurrences(
        &self,
        occurrence_id: &str,
    ) -> Result<Vec<ScanOccurrence>, ServiceError> {
        self.get_json(
            &format!("/analysis_occurrences/{occurrence_id}/scan_occurrences"),
            &[],
        )
        .await
    }

    async fn build_info(&self, app_id: &str, build_id: &str) -> Result<String, ServiceError> {
        self.get_text("/buildinfo", &[("app_id", app_id), ("build_id", build_id)])
            .await
    }

    async fn detailed_report(&self, build_id: &str) -> Result<String, ServiceError> {
        self.get_text("/detailedreport", &[("build_id", build_id)])
            .await
    }
}
