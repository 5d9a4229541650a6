//! HTTP client: one GET per query against the ask endpoint, JSON answer back.

use crate::config::Config;
use crate::messages::{QueryOutput, QUERY_PARAM};

/// Banner text for every failure that is not an HTTP status error.
pub const UNKNOWN_ERROR: &str = "An unknown error occurred";

/// Query failure.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Backend answered with a non-2xx status. The body is ignored.
    #[error("Unexpected response: {status} {status_text}")]
    UnexpectedResponse { status: u16, status_text: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

impl ClientError {
    /// Whether this is a recognised failure whose own message is shown to the user.
    pub fn is_known(&self) -> bool {
        matches!(self, ClientError::UnexpectedResponse { .. })
    }

    /// The single user-visible string for this failure.
    pub fn user_message(&self) -> String {
        if self.is_known() {
            self.to_string()
        } else {
            UNKNOWN_ERROR.to_string()
        }
    }
}

/// Client bound to one ask endpoint.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    endpoint: reqwest::Url,
}

impl Client {
    /// Build a client for `{base_url}{ask_path}` (e.g. `http://127.0.0.1:8000` + `/api/ask`).
    pub fn new(base_url: &str, ask_path: &str) -> Result<Self, ClientError> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), ask_path);
        let endpoint = reqwest::Url::parse(&url).map_err(|e| ClientError::InvalidEndpoint {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::new(config.base_url(), config.ask_path())
    }

    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }

    /// Send `query` and decode the answer. Exactly one attempt; no timeout.
    pub async fn ask(&self, query: &str) -> Result<QueryOutput, ClientError> {
        tracing::debug!(endpoint = %self.endpoint, query_len = query.len(), "sending query");
        let response = self
            .http
            .get(self.endpoint.clone())
            .query(&[(QUERY_PARAM, query)])
            .send()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "query request failed"))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "unexpected response status");
            return Err(ClientError::UnexpectedResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "reading response body failed"))?;
        let output = QueryOutput::from_json(&body)
            .inspect_err(|e| tracing::warn!(error = %e, "response body is not a query output"))?;
        tracing::debug!(citations = output.citations.len(), "query answered");
        Ok(output)
    }
}
