//! Test doubles for deterministic engine testing.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use seedbed_proto::{ApiRequest, RequestError, RequestExecutor};

use crate::environment::Environment;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// Raw response body, returned as success.
    Body(String),
    /// Classified API failure.
    ApiError {
        error_type: String,
        message: String,
    },
}

/// Request executor that returns pre-scripted responses in order and
/// records every request it receives.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    state: Mutex<ScriptedState>,
}

#[derive(Debug, Default)]
struct ScriptedState {
    responses: Vec<ScriptedResponse>,
    current: usize,
    executions: Vec<ApiRequest>,
}

impl ScriptedExecutor {
    pub fn new(responses: Vec<ScriptedResponse>) -> Self {
        Self {
            state: Mutex::new(ScriptedState {
                responses,
                current: 0,
                executions: Vec::new(),
            }),
        }
    }

    /// All requests executed so far, in order.
    pub fn executions(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().executions.clone()
    }

    /// Number of requests executed so far.
    pub fn execution_count(&self) -> usize {
        self.state.lock().unwrap().executions.len()
    }
}

#[async_trait]
impl RequestExecutor for ScriptedExecutor {
    async fn execute(&self, request: &ApiRequest) -> Result<Vec<u8>, RequestError> {
        let mut state = self.state.lock().unwrap();
        state.executions.push(request.clone());

        let response = state.responses.get(state.current).cloned();
        state.current += 1;

        match response {
            Some(ScriptedResponse::Body(body)) => Ok(body.into_bytes()),
            Some(ScriptedResponse::ApiError {
                error_type,
                message,
            }) => Err(RequestError::Api {
                error_type,
                message,
                status: Some(402),
            }),
            None => Ok(b"{}".to_vec()),
        }
    }
}

/// In-memory environment provider.
#[derive(Debug, Default)]
pub struct FakeEnvironment {
    vars: HashMap<String, String>,
    env_file: Option<PathBuf>,
}

impl FakeEnvironment {
    pub fn with_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            env_file: None,
        }
    }

    /// Points the provider at an env file location.
    pub fn with_env_file(mut self, path: PathBuf) -> Self {
        self.env_file = Some(path);
        self
    }
}

impl Environment for FakeEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.is_empty()).cloned()
    }

    fn env_file_path(&self) -> Option<PathBuf> {
        self.env_file.clone()
    }
}
