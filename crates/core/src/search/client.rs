use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use super::{CandidateSearch, SearchQuery, SearchRequest, SearchResponse};
use crate::{config::SearchConfig, errors::SearchError};

/// Posts `{"query": ...}` to the candidate search service. One attempt per
/// call; timeouts and failures surface as [`SearchError`] without retry.
#[derive(Clone, Debug)]
pub struct HttpCandidateSearch {
    client: Client,
    endpoint: String,
}

impl HttpCandidateSearch {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| SearchError::Client(error.to_string()))?;
        Ok(Self { client, endpoint: endpoint.into() })
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        Self::new(config.endpoint_url(), config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CandidateSearch for HttpCandidateSearch {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SearchError> {
        debug!(
            event_name = "search.request.sent",
            endpoint = %self.endpoint,
            query_chars = query.as_str().chars().count(),
            "posting candidate search request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(&SearchRequest { query: query.as_str() })
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                event_name = "search.request.rejected",
                endpoint = %self.endpoint,
                status = status.as_u16(),
                "candidate search service returned a non-success status"
            );
            return Err(SearchError::Upstream { status: status.as_u16(), body });
        }

        let body = response.text().await.map_err(classify_request_error)?;
        if body.trim().is_empty() {
            return Ok(SearchResponse::default());
        }

        let decoded = serde_json::from_str::<Option<SearchResponse>>(&body)
            .map_err(|error| SearchError::Decode(error.to_string()))?;
        Ok(decoded.unwrap_or_default())
    }
}

/// Opens (and drops) a TCP connection to the configured search host within
/// the request timeout. Returns the connect latency.
pub async fn probe_reachability(config: &SearchConfig) -> Result<Duration, SearchError> {
    let address = format!("{}:{}", config.host, config.port);
    let started = Instant::now();

    match tokio::time::timeout(config.timeout(), TcpStream::connect(&address)).await {
        Ok(Ok(_stream)) => Ok(started.elapsed()),
        Ok(Err(error)) => Err(SearchError::Transport(format!("connect to {address} failed: {error}"))),
        Err(_) => Err(SearchError::Timeout(format!(
            "connect to {address} timed out after {}s",
            config.timeout_secs
        ))),
    }
}

fn classify_request_error(error: reqwest::Error) -> SearchError {
    if error.is_timeout() {
        SearchError::Timeout(error.to_string())
    } else {
        SearchError::Transport(error.to_string())
    }
}
