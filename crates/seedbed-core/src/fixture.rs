//! Fixture file model and loading.
//!
//! A fixture file is JSON: a `_meta` block, an ordered list of steps, and an
//! `env` mapping of output names to query expressions. The set is loaded
//! once and immutable afterwards.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{FixtureError, Result};
use crate::params::ParamValue;

/// Highest fixture template version this engine understands.
pub const SUPPORTED_TEMPLATE_VERSION: i64 = 0;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureMeta {
    #[serde(default)]
    pub template_version: i64,
    #[serde(default)]
    pub exclude_metadata: bool,
}

/// One declarative API call.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureStep {
    pub name: String,
    #[serde(default)]
    pub expected_error_type: Option<String>,
    pub path: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<ParamValue>,
}

impl FixtureStep {
    /// The declared error expectation, ignoring empty strings.
    pub fn expected_error(&self) -> Option<&str> {
        self.expected_error_type
            .as_deref()
            .filter(|t| !t.is_empty())
    }
}

/// A parsed fixture file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureSet {
    #[serde(default, rename = "_meta")]
    pub meta: FixtureMeta,
    #[serde(default)]
    pub fixtures: Vec<FixtureStep>,
    #[serde(default)]
    pub env: IndexMap<String, String>,
}

impl FixtureSet {
    /// Parses a fixture set from raw JSON bytes, rejecting unsupported
    /// template versions before any request could be made.
    pub fn from_slice(data: &[u8]) -> Result<Self> {
        let set: FixtureSet = serde_json::from_slice(data)?;
        if set.meta.template_version > SUPPORTED_TEMPLATE_VERSION {
            return Err(FixtureError::UnsupportedVersion(set.meta.template_version));
        }
        Ok(set)
    }

    /// Reads and parses a fixture file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_slice(&std::fs::read(path)?)
    }
}
