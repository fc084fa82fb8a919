//! HTTP client for the hosted content store's query API.

use std::time::Instant;

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{Client, StatusCode, Url, header};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::application::repos::{ContentStore, StoreError, StoreQuery};
use crate::config::StoreSettings;

use super::error::InfraError;

pub(crate) const METRIC_STORE_QUERIES: &str = "nostalgia_store_queries_total";
pub(crate) const METRIC_STORE_FAILURES: &str = "nostalgia_store_query_failures_total";
pub(crate) const METRIC_STORE_DURATION_MS: &str = "nostalgia_store_query_duration_ms";

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    description: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

/// Read-only client issuing GROQ queries over HTTP.
#[derive(Clone, Debug)]
pub struct HttpContentStore {
    client: Client,
    endpoint: Url,
    token: Option<String>,
}

impl HttpContentStore {
    pub fn new(settings: &StoreSettings) -> Result<Self, InfraError> {
        let endpoint = query_endpoint(settings)?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| InfraError::store_client("http client", err))?;

        Ok(Self {
            client,
            endpoint,
            token: settings.token.clone(),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("nostalgia/", env!("CARGO_PKG_VERSION"))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request_url(&self, query: &StoreQuery) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query.groq);
            for (name, value) in &query.params {
                pairs.append_pair(&format!("${name}"), &value.to_string());
            }
        }
        url
    }

    async fn execute(&self, query: &StoreQuery) -> Result<Value, StoreError> {
        let mut request = self.client.get(self.request_url(query));
        if let Some(token) = &self.token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = request.send().await.map_err(StoreError::transport)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(StoreError::transport)?;

        if !status.is_success() {
            return Err(error_from_body(status, &bytes));
        }

        let body: QueryResponse =
            serde_json::from_slice(&bytes).map_err(|err| StoreError::decode(query.name, err))?;
        if let Some(ms) = body.ms {
            debug!(query = query.name, server_ms = ms, "store query completed");
        }
        Ok(body.result)
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn fetch(&self, query: &StoreQuery) -> Result<Value, StoreError> {
        let started_at = Instant::now();
        counter!(METRIC_STORE_QUERIES, "query" => query.name).increment(1);

        let result = self.execute(query).await;

        histogram!(METRIC_STORE_DURATION_MS, "query" => query.name)
            .record(started_at.elapsed().as_secs_f64() * 1000.0);
        if let Err(err) = &result {
            counter!(METRIC_STORE_FAILURES, "query" => query.name).increment(1);
            warn!(query = query.name, error = %err, "store query failed");
        }
        result
    }
}

fn query_endpoint(settings: &StoreSettings) -> Result<Url, InfraError> {
    let base = match &settings.api_host {
        Some(host) => host.clone(),
        None => {
            let host = if settings.use_cdn { "apicdn" } else { "api" };
            Url::parse(&format!(
                "https://{}.{host}.sanity.io/",
                settings.project_id
            ))
            .map_err(|err| InfraError::store_client("host", err))?
        }
    };

    base.join(&format!(
        "v{}/data/query/{}",
        settings.api_version, settings.dataset
    ))
    .map_err(|err| InfraError::store_client("endpoint", err))
}

fn error_from_body(status: StatusCode, bytes: &[u8]) -> StoreError {
    match serde_json::from_slice::<ErrorResponse>(bytes) {
        Ok(ErrorResponse { error }) if status == StatusCode::BAD_REQUEST => {
            let description = error
                .description
                .or(error.kind)
                .unwrap_or_else(|| "query rejected".to_string());
            StoreError::Query(description)
        }
        Ok(ErrorResponse { error }) => StoreError::Status {
            status: status.as_u16(),
            message: error
                .description
                .or(error.kind)
                .unwrap_or_else(|| status.to_string()),
        },
        Err(_) => StoreError::Status {
            status: status.as_u16(),
            message: String::from_utf8_lossy(bytes).chars().take(200).collect(),
        },
    }
}
