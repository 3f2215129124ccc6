//! The request descriptor and transport trait.
//!
//! Defines the [`RequestExecutor`] trait that transport adapters (HTTP,
//! scripted test doubles) implement. The engine builds an [`ApiRequest`]
//! per fixture step and hands it to the executor; it never touches the
//! wire itself.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// One outgoing API call, fully resolved.
///
/// `params` is the ordered list of flattened `key=value` pairs produced by
/// the parameter flattener; the transport form-encodes them as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiRequest {
    pub method: String,
    pub path: String,
    pub params: Vec<String>,
    pub suppress_output: bool,
}

impl ApiRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            params: Vec::new(),
            suppress_output: false,
        }
    }
}

/// A transport backend that can perform an API request.
///
/// Implementations own credentials and base-URL concerns; the engine only
/// supplies the method, path, and flattened parameters. The returned bytes
/// are the raw response body, parsed as JSON by the caller.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>, RequestError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_roundtrips_through_json() {
        let req = ApiRequest {
            method: "post".to_string(),
            path: "/v1/customers".to_string(),
            params: vec!["email=a@b.com".to_string()],
            suppress_output: true,
        };
        let json = serde_json::to_string(&req).unwrap();
        let back: ApiRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.method, "post");
        assert_eq!(back.params, vec!["email=a@b.com"]);
    }
}
