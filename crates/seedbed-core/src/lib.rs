//! # seedbed-core
//!
//! Core fixture engine for Seedbed.
//!
//! This crate provides:
//! - The fixture file model and loader
//! - The `${name:expression|default}` query syntax and value resolver
//! - The parameter flattener producing ordered `key=value` pairs
//! - The sequential orchestrator with response caching and expected-error
//!   handling
//! - Environment synchronization for persisting resolved outputs

mod cache;
mod env_sync;
mod environment;
mod error;
mod fixture;
mod flatten;
mod orchestrator;
mod params;
pub mod query;
mod resolver;
pub mod testing;

pub use cache::ResponseCache;
pub use env_sync::update_env;
pub use environment::{Environment, SystemEnvironment};
pub use error::{FixtureError, Result};
pub use fixture::{FixtureMeta, FixtureSet, FixtureStep, SUPPORTED_TEMPLATE_VERSION};
pub use flatten::flatten_params;
pub use orchestrator::{Orchestrator, StepOutcome};
pub use params::{ParamValue, Scalar};
pub use query::{ENV_SENTINEL, Query, Segment, contains_query, first_query, split_queries};
pub use resolver::Resolver;
