//! Environment provider capability.
//!
//! Process-environment lookup and env-file location are injected behind the
//! [`Environment`] trait so the resolver and synchronizer can be tested
//! without touching real process state. The production implementation reads
//! `std::env` and a `.env` file in the working directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Access to environment variables and the local env file.
pub trait Environment: Send + Sync {
    /// Process-level variable lookup. Empty values count as absent.
    fn var(&self, key: &str) -> Option<String>;

    /// Location of the local env file, if one applies.
    fn env_file_path(&self) -> Option<PathBuf>;
}

/// Production provider backed by the process environment and a `.env` file
/// in the current working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|value| !value.is_empty())
    }

    fn env_file_path(&self) -> Option<PathBuf> {
        std::env::current_dir().ok().map(|dir| dir.join(".env"))
    }
}

/// Parses a `KEY=value` env file into a sorted map.
pub(crate) fn load_env_file(path: &Path) -> Result<BTreeMap<String, String>, dotenvy::Error> {
    let mut entries = BTreeMap::new();
    for item in dotenvy::from_path_iter(path)? {
        let (key, value) = item?;
        entries.insert(key, value);
    }
    Ok(entries)
}
