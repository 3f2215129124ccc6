//! Fixture orchestration.
//!
//! Drives the steps of a fixture set in declared order, one request at a
//! time. Each step's path and parameters are resolved against the cache
//! built by the steps before it, so the loop never has more than one
//! request in flight and later steps always see earlier responses.

use chrono::Utc;
use seedbed_proto::{ApiRequest, RequestExecutor};
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::ResponseCache;
use crate::env_sync;
use crate::environment::Environment;
use crate::error::Result;
use crate::fixture::{FixtureSet, FixtureStep};
use crate::flatten::flatten_params;
use crate::resolver::Resolver;

/// Outcome of one executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded,
    /// The request failed, but with the step's declared expected error
    /// type; the run continues and nothing is cached under the step name.
    FailedExpected,
}

/// Executes a fixture set against a request backend.
pub struct Orchestrator<'a> {
    set: &'a FixtureSet,
    executor: &'a dyn RequestExecutor,
    env: &'a dyn Environment,
    cache: ResponseCache,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        set: &'a FixtureSet,
        executor: &'a dyn RequestExecutor,
        env: &'a dyn Environment,
    ) -> Self {
        Self {
            set,
            executor,
            env,
            cache: ResponseCache::new(),
        }
    }

    /// Runs every step in declared order.
    ///
    /// Returns the ordered list of attempted step names, including steps
    /// whose failure matched their declared expectation. The first
    /// unexpected failure aborts the run; steps already executed keep their
    /// remote effects, there is no rollback.
    pub async fn run(&mut self) -> Result<Vec<String>> {
        let mut attempted = Vec::with_capacity(self.set.fixtures.len());

        for step in &self.set.fixtures {
            info!("Setting up fixture for: {}", step.name);
            attempted.push(step.name.clone());

            match self.execute_step(step).await? {
                StepOutcome::Succeeded => {}
                StepOutcome::FailedExpected => {
                    info!("Fixture {:?} failed as expected, continuing", step.name);
                }
            }
        }

        Ok(attempted)
    }

    async fn execute_step(&mut self, step: &FixtureStep) -> Result<StepOutcome> {
        let request = self.build_request(step)?;

        match self.executor.execute(&request).await {
            Ok(body) => {
                let response = serde_json::from_slice(&body).unwrap_or(Value::Null);
                self.cache.insert(step.name.clone(), response);
                Ok(StepOutcome::Succeeded)
            }
            Err(err) => match step.expected_error() {
                Some(expected) if err.matches_expected(expected) => {
                    debug!("step {:?} failed with expected type {expected}", step.name);
                    Ok(StepOutcome::FailedExpected)
                }
                _ => Err(err.into()),
            },
        }
    }

    fn build_request(&self, step: &FixtureStep) -> Result<ApiRequest> {
        let resolver = Resolver::new(&self.cache, self.env);
        let path = resolver.resolve_string(&step.path)?;

        let mut params = Vec::new();
        if step.method == "post" && !self.set.meta.exclude_metadata {
            params.push(format!(
                "metadata[_created_by_fixture]={}",
                Utc::now().to_rfc3339()
            ));
        }
        if let Some(step_params) = &step.params {
            params.extend(flatten_params(&resolver, step_params)?);
        }

        Ok(ApiRequest {
            method: step.method.clone(),
            path,
            params,
            suppress_output: true,
        })
    }

    /// Resolves the declared env outputs against the populated cache and
    /// merges them into the local env file.
    pub fn update_env(&self) -> Result<()> {
        env_sync::update_env(self.set, &self.cache, self.env)
    }

    /// The responses cached so far.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FixtureError;
    use crate::fixture::FixtureSet;
    use crate::testing::{FakeEnvironment, ScriptedExecutor, ScriptedResponse};
    use seedbed_proto::RequestError;

    fn fixture_set(json: &str) -> FixtureSet {
        FixtureSet::from_slice(json.as_bytes()).unwrap()
    }

    #[tokio::test]
    async fn later_steps_see_earlier_responses() {
        let set = fixture_set(
            r#"{
                "_meta": {"exclude_metadata": true},
                "fixtures": [
                    {"name": "customer", "method": "post", "path": "/v1/customers",
                     "params": {"email": "a@b.com"}},
                    {"name": "charge", "method": "post", "path": "/v1/charges",
                     "params": {"customer": "${customer:id}", "amount": 500}}
                ]
            }"#,
        );
        let executor = ScriptedExecutor::new(vec![
            ScriptedResponse::Body(r#"{"id": "cus_123"}"#.to_string()),
            ScriptedResponse::Body(r#"{"id": "ch_1"}"#.to_string()),
        ]);
        let env = FakeEnvironment::default();

        let mut orchestrator = Orchestrator::new(&set, &executor, &env);
        let attempted = orchestrator.run().await.unwrap();

        assert_eq!(attempted, vec!["customer", "charge"]);
        let executions = executor.executions();
        assert_eq!(executions[0].params, vec!["email=a@b.com"]);
        assert_eq!(executions[1].params, vec!["customer=cus_123", "amount=500"]);
    }

    #[tokio::test]
    async fn path_queries_resolve_against_cache() {
        let set = fixture_set(
            r#"{
                "_meta": {"exclude_metadata": true},
                "fixtures": [
                    {"name": "customer", "method": "post", "path": "/v1/customers"},
                    {"name": "delete", "method": "delete",
                     "path": "/v1/customers/${customer:id}"}
                ]
            }"#,
        );
        let executor = ScriptedExecutor::new(vec![
            ScriptedResponse::Body(r#"{"id": "cus_9"}"#.to_string()),
            ScriptedResponse::Body("{}".to_string()),
        ]);
        let env = FakeEnvironment::default();

        Orchestrator::new(&set, &executor, &env).run().await.unwrap();

        assert_eq!(executor.executions()[1].path, "/v1/customers/cus_9");
    }

    #[tokio::test]
    async fn post_requests_get_metadata_stamp() {
        let set = fixture_set(
            r#"{"fixtures": [
                {"name": "customer", "method": "post", "path": "/v1/customers"}
            ]}"#,
        );
        let executor = ScriptedExecutor::new(vec![ScriptedResponse::Body("{}".to_string())]);
        let env = FakeEnvironment::default();

        Orchestrator::new(&set, &executor, &env).run().await.unwrap();

        let params = &executor.executions()[0].params;
        assert_eq!(params.len(), 1);
        assert!(params[0].starts_with("metadata[_created_by_fixture]="));
    }

    #[tokio::test]
    async fn non_post_requests_are_not_stamped() {
        let set = fixture_set(
            r#"{"fixtures": [
                {"name": "customer", "method": "get", "path": "/v1/customers"}
            ]}"#,
        );
        let executor = ScriptedExecutor::new(vec![ScriptedResponse::Body("{}".to_string())]);
        let env = FakeEnvironment::default();

        Orchestrator::new(&set, &executor, &env).run().await.unwrap();

        assert!(executor.executions()[0].params.is_empty());
    }

    #[tokio::test]
    async fn exclude_metadata_suppresses_the_stamp() {
        let set = fixture_set(
            r#"{
                "_meta": {"exclude_metadata": true},
                "fixtures": [
                    {"name": "customer", "method": "post", "path": "/v1/customers"}
                ]
            }"#,
        );
        let executor = ScriptedExecutor::new(vec![ScriptedResponse::Body("{}".to_string())]);
        let env = FakeEnvironment::default();

        Orchestrator::new(&set, &executor, &env).run().await.unwrap();

        assert!(executor.executions()[0].params.is_empty());
    }

    #[tokio::test]
    async fn expected_failure_continues_without_caching() {
        let set = fixture_set(
            r#"{
                "_meta": {"exclude_metadata": true},
                "fixtures": [
                    {"name": "declined", "method": "post", "path": "/v1/charges",
                     "expected_error_type": "card_error"},
                    {"name": "customer", "method": "post", "path": "/v1/customers"}
                ]
            }"#,
        );
        let executor = ScriptedExecutor::new(vec![
            ScriptedResponse::ApiError {
                error_type: "card_error".to_string(),
                message: "Your card was declined".to_string(),
            },
            ScriptedResponse::Body(r#"{"id": "cus_1"}"#.to_string()),
        ]);
        let env = FakeEnvironment::default();

        let mut orchestrator = Orchestrator::new(&set, &executor, &env);
        let attempted = orchestrator.run().await.unwrap();

        assert_eq!(attempted, vec!["declined", "customer"]);
        assert!(!orchestrator.cache().contains("declined"));
        assert!(orchestrator.cache().contains("customer"));
    }

    #[tokio::test]
    async fn mismatched_error_type_aborts() {
        let set = fixture_set(
            r#"{
                "_meta": {"exclude_metadata": true},
                "fixtures": [
                    {"name": "declined", "method": "post", "path": "/v1/charges",
                     "expected_error_type": "card_error"},
                    {"name": "never_runs", "method": "post", "path": "/v1/customers"}
                ]
            }"#,
        );
        let executor = ScriptedExecutor::new(vec![ScriptedResponse::ApiError {
            error_type: "invalid_request_error".to_string(),
            message: "bad request".to_string(),
        }]);
        let env = FakeEnvironment::default();

        let err = Orchestrator::new(&set, &executor, &env)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FixtureError::Request(RequestError::Api { .. })
        ));
        assert_eq!(executor.execution_count(), 1);
    }

    #[tokio::test]
    async fn unexpected_failure_aborts_immediately() {
        let set = fixture_set(
            r#"{
                "_meta": {"exclude_metadata": true},
                "fixtures": [
                    {"name": "boom", "method": "post", "path": "/v1/charges"},
                    {"name": "never_runs", "method": "post", "path": "/v1/customers"}
                ]
            }"#,
        );
        let executor = ScriptedExecutor::new(vec![ScriptedResponse::ApiError {
            error_type: "api_error".to_string(),
            message: "server error".to_string(),
        }]);
        let env = FakeEnvironment::default();

        assert!(
            Orchestrator::new(&set, &executor, &env)
                .run()
                .await
                .is_err()
        );
        assert_eq!(executor.execution_count(), 1);
    }

    #[tokio::test]
    async fn reference_to_swallowed_step_is_a_hard_error() {
        let set = fixture_set(
            r#"{
                "_meta": {"exclude_metadata": true},
                "fixtures": [
                    {"name": "declined", "method": "post", "path": "/v1/charges",
                     "expected_error_type": "card_error"},
                    {"name": "refund", "method": "post", "path": "/v1/refunds",
                     "params": {"charge": "${declined:id}"}}
                ]
            }"#,
        );
        let executor = ScriptedExecutor::new(vec![ScriptedResponse::ApiError {
            error_type: "card_error".to_string(),
            message: "declined".to_string(),
        }]);
        let env = FakeEnvironment::default();

        let err = Orchestrator::new(&set, &executor, &env)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, FixtureError::Reference { ref name, .. } if name == "declined"));
    }

    #[tokio::test]
    async fn non_json_response_is_cached_as_null() {
        let set = fixture_set(
            r#"{
                "_meta": {"exclude_metadata": true},
                "fixtures": [
                    {"name": "weird", "method": "get", "path": "/v1/status"},
                    {"name": "next", "method": "get",
                     "path": "/v1/things/${weird:id|fallback}"}
                ]
            }"#,
        );
        let executor = ScriptedExecutor::new(vec![
            ScriptedResponse::Body("not json".to_string()),
            ScriptedResponse::Body("{}".to_string()),
        ]);
        let env = FakeEnvironment::default();

        Orchestrator::new(&set, &executor, &env).run().await.unwrap();

        // The lookup finds nothing in the null placeholder and falls back.
        assert_eq!(executor.executions()[1].path, "/v1/things/fallback");
    }
}
