//! HTTP request executor.
//!
//! Sends fixture requests to the remote API: flattened `key=value` pairs go
//! out form-encoded (query string for bodyless methods), authentication is
//! a bearer key, and failures are classified by the error-type label in the
//! response body so the engine can match declared expectations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use seedbed_proto::{ApiRequest, RequestError, RequestExecutor};
use serde::Deserialize;
use tracing::{debug, info};

/// Connection settings for the target API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_key: String,
    /// Account to run requests on behalf of, sent as the `X-Account`
    /// header when present.
    pub account: Option<String>,
    pub base_url: String,
}

/// Production [`RequestExecutor`] over HTTP.
pub struct HttpExecutor {
    client: Client,
    config: ApiConfig,
}

impl HttpExecutor {
    pub fn new(config: ApiConfig) -> Result<Self, RequestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| RequestError::Transport(err.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>, RequestError> {
        let method = Method::from_bytes(request.method.to_uppercase().as_bytes())
            .map_err(|_| RequestError::InvalidRequest(format!("bad method: {}", request.method)))?;
        let pairs = split_pairs(&request.params);

        debug!("{} {} ({} params)", method, request.path, pairs.len());

        let in_query_string = method == Method::GET || method == Method::DELETE;

        let mut builder = self
            .client
            .request(method, self.url(&request.path))
            .bearer_auth(&self.config.api_key);

        if let Some(account) = &self.config.account {
            builder = builder.header("X-Account", account);
        }

        // GET and DELETE carry parameters in the query string; everything
        // else form-encodes them as the body.
        builder = if in_query_string {
            builder.query(&pairs)
        } else {
            builder.form(&pairs)
        };

        let response = builder
            .send()
            .await
            .map_err(|err| RequestError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| RequestError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }

        if !request.suppress_output {
            info!("{}", String::from_utf8_lossy(&body));
        }

        Ok(body.to_vec())
    }
}

/// Splits pre-flattened `key=value` entries into pairs for form encoding.
/// An entry without `=` becomes a key with an empty value.
fn split_pairs(params: &[String]) -> Vec<(&str, &str)> {
    params
        .iter()
        .map(|entry| entry.split_once('=').unwrap_or((entry.as_str(), "")))
        .collect()
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    error_type: Option<String>,
    message: Option<String>,
}

/// Classifies a non-success response into a typed API error.
///
/// The error-type label comes from the response body when the service
/// supplies one; otherwise the HTTP status class stands in.
fn classify_failure(status: u16, body: &[u8]) -> RequestError {
    let parsed: Option<ErrorBody> = serde_json::from_slice(body).ok();

    let (error_type, message) = match parsed {
        Some(ErrorBody { error }) => (
            error.error_type.unwrap_or_else(|| fallback_type(status)),
            error
                .message
                .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned()),
        ),
        None => (
            fallback_type(status),
            String::from_utf8_lossy(body).into_owned(),
        ),
    };

    RequestError::Api {
        error_type,
        message,
        status: Some(status),
    }
}

fn fallback_type(status: u16) -> String {
    if status >= 500 {
        "api_error".to_string()
    } else {
        "invalid_request_error".to_string()
    }
}
