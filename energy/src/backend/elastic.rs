//! Elasticsearch backend over HTTP

use super::{Connector, SearchBackend};
use crate::config::BackendConfig;
use crate::error::EnergyError;
use crate::query::SearchRequest;
use crate::response::SearchResponse;
use crate::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Hands out [`ElasticClient`]s sharing one connection pool
pub struct ElasticConnector {
    http: Client,
    config: BackendConfig,
}

impl ElasticConnector {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| EnergyError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    fn base_url(&self) -> Result<String> {
        if let Some(url) = non_empty(&self.config.url) {
            return Ok(url.trim_end_matches('/').to_string());
        }
        match non_empty(&self.config.cloud_id) {
            Some(cloud_id) => decode_cloud_id(cloud_id),
            None => Err(EnergyError::Configuration(
                "no cluster configured: set CLOUD_ID or backend.url".to_string(),
            )),
        }
    }
}

impl Connector for ElasticConnector {
    fn connect(&self) -> Result<Arc<dyn SearchBackend>> {
        let api_key = non_empty(&self.config.api_key).ok_or_else(|| {
            EnergyError::Configuration("no API key configured: set API_KEY".to_string())
        })?;
        let base_url = self.base_url()?;

        Ok(Arc::new(ElasticClient {
            http: self.http.clone(),
            base_url,
            api_key: api_key.to_string(),
        }))
    }
}

/// Per-request handle. Cloning the inner `reqwest::Client` shares its pool.
pub struct ElasticClient {
    http: Client,
    base_url: String,
    api_key: String,
}

#[async_trait]
impl SearchBackend for ElasticClient {
    async fn search(&self, index: &str, request: &SearchRequest) -> Result<SearchResponse> {
        let start = Instant::now();

        let response = self
            .http
            .post(format!("{}/{}/_search", self.base_url, index))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("ApiKey {}", self.api_key),
            )
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EnergyError::BackendUnavailable(format!(
                "search on '{}' failed ({}): {}",
                index, status, body
            )));
        }

        let body: SearchResponse = response.json().await?;

        debug!(
            index,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Backend search completed"
        );

        Ok(body)
    }
}

/// Resolve an Elastic Cloud ID to the cluster's HTTPS endpoint.
///
/// Format: `<label>:<base64("<host>[:<port>]$<es_uuid>[$<kibana_uuid>]")>`
pub fn decode_cloud_id(cloud_id: &str) -> Result<String> {
    let invalid =
        |reason: &str| EnergyError::Configuration(format!("invalid cloud id: {}", reason));

    let payload = cloud_id
        .rsplit_once(':')
        .map(|(_, payload)| payload)
        .unwrap_or(cloud_id)
        .trim();

    let decoded = STANDARD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .map_err(|_| invalid("payload is not base64"))?;
    let decoded = String::from_utf8(decoded).map_err(|_| invalid("payload is not UTF-8"))?;

    let mut parts = decoded.split('$');
    let host = parts.next().filter(|h| !h.is_empty()).ok_or_else(|| invalid("missing host"))?;
    let es_uuid = parts
        .next()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| invalid("missing cluster id"))?;

    Ok(match host.split_once(':') {
        Some((domain, port)) => format!("https://{}.{}:{}", es_uuid, domain, port),
        None => format!("https://{}.{}", es_uuid, host),
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
