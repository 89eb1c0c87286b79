//! `reqwest`-backed [`QueryService`] and the connector that builds it.
//!
//! Wire protocol:
//!
//! | Operation | Request | Success response |
//! |-----------|---------|------------------|
//! | `submit_query` | `POST {endpoint}/{query_path}`, body = query JSON | `{"id": "<uuid>"}` |
//! | `fetch_page` | `POST {endpoint}/{results_path}`, body = `{"id": "<uuid>", "page": n}` | result frame JSON |
//!
//! Any non-2xx status is reported as [`ServiceError::Rejected`] carrying the
//! response body as its message.

use async_trait::async_trait;
use qmodel::{
    CorrelationId, Endpoint, PageIndex, Query, QueryService, ResultFrame, ServiceConnector,
    ServiceError,
};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{ConfigError, HttpTransportConfig};

// ---------------------------------------------------------------------------
// Wire bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: CorrelationId,
}

#[derive(Debug, Serialize)]
struct PageRequest {
    id: CorrelationId,
    page: PageIndex,
}

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

/// Builds [`HttpQueryService`] handles.
///
/// Building a handle resolves the endpoint into request URLs and creates a
/// `reqwest` client; no request is sent until the first call.
#[derive(Debug, Clone, Default)]
pub struct HttpConnector {
    config: HttpTransportConfig,
}

impl HttpConnector {
    /// Creates a connector using `config`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if `config` fails validation.
    pub fn new(config: HttpTransportConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl ServiceConnector for HttpConnector {
    type Service = HttpQueryService;

    fn connect(&self, endpoint: &Endpoint) -> Result<HttpQueryService, ServiceError> {
        let base = base_url(&self.config, endpoint)?;
        let join = |path: &str| {
            base.join(path.trim_start_matches('/')).map_err(|e| {
                ServiceError::connect(endpoint, format!("invalid path '{path}': {e}"))
            })
        };
        let query_url = join(&self.config.query_path)?;
        let results_url = join(&self.config.results_path)?;

        let client = Client::builder()
            .connect_timeout(self.config.connect_timeout())
            .build()
            .map_err(|e| {
                ServiceError::connect(
                    endpoint,
                    format!("HTTP client could not be initialised: {e}"),
                )
            })?;

        debug!(%query_url, %results_url, "HTTP query service handle built");
        Ok(HttpQueryService {
            client,
            query_url,
            results_url,
        })
    }
}

/// Turns an endpoint into the base URL that request paths are joined onto.
///
/// A bare `host:port` gets the configured scheme. The result always ends in
/// `/` so that joining keeps any path prefix on the endpoint.
fn base_url(config: &HttpTransportConfig, endpoint: &Endpoint) -> Result<Url, ServiceError> {
    if endpoint.is_blank() {
        return Err(ServiceError::connect(endpoint, "endpoint is empty"));
    }

    let raw = endpoint.as_str().trim();
    let mut url = if raw.contains("://") {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{}://{raw}", config.scheme))
    }
    .map_err(|e| ServiceError::connect(endpoint, format!("malformed address: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ServiceError::connect(
            endpoint,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ServiceError::connect(endpoint, "address has no host"));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

// ---------------------------------------------------------------------------
// Service handle
// ---------------------------------------------------------------------------

/// A [`QueryService`] that talks JSON over HTTP.
///
/// Cheap to share: `reqwest::Client` pools connections internally.
#[derive(Debug, Clone)]
pub struct HttpQueryService {
    client: Client,
    query_url: Url,
    results_url: Url,
}

impl HttpQueryService {
    /// URL that query submissions are posted to.
    pub fn query_url(&self) -> &Url {
        &self.query_url
    }

    /// URL that page requests are posted to.
    pub fn results_url(&self) -> &Url {
        &self.results_url
    }
}

#[async_trait]
impl QueryService for HttpQueryService {
    async fn submit_query(&self, query: Query) -> Result<CorrelationId, ServiceError> {
        debug!(url = %self.query_url, "Submitting query");
        let response = self
            .client
            .post(self.query_url.clone())
            .json(&query)
            .send()
            .await
            .map_err(|e| ServiceError::transport(e.to_string()))?;

        let body: SubmitResponse = decode(response).await?;
        Ok(body.id)
    }

    async fn fetch_page(
        &self,
        id: CorrelationId,
        page: PageIndex,
    ) -> Result<ResultFrame, ServiceError> {
        debug!(url = %self.results_url, correlation_id = %id, %page, "Fetching result page");
        let response = self
            .client
            .post(self.results_url.clone())
            .json(&PageRequest { id, page })
            .send()
            .await
            .map_err(|e| ServiceError::transport(e.to_string()))?;

        decode(response).await
    }
}

/// Maps a response to `T`, or to the matching [`ServiceError`].
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable error body: {e}>"));
        return Err(ServiceError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| ServiceError::transport(format!("reading response body: {e}")))?;
    serde_json::from_slice(&body)
        .map_err(|e| ServiceError::protocol(format!("undecodable response body: {e}")))
}
