//! Environment synchronization.
//!
//! After a successful run, declared env outputs are resolved against the
//! populated response cache and merged into the local env file so other
//! tooling can pick them up. Resolution here is strict: an env value that
//! silently came out empty would poison whatever reads the file later.

use std::fs;

use tracing::{debug, info};

use crate::cache::ResponseCache;
use crate::environment::{Environment, load_env_file};
use crate::error::{FixtureError, Result};
use crate::fixture::FixtureSet;
use crate::resolver::Resolver;

/// Merges resolved env outputs into the local env file.
///
/// A missing env file makes this a no-op; one is never created. Merging is
/// last-write-wins per key and leaves unrelated keys intact. The file is
/// only rewritten once every declared entry has resolved, so a resolution
/// failure leaves it untouched.
pub fn update_env(set: &FixtureSet, cache: &ResponseCache, env: &dyn Environment) -> Result<()> {
    if set.env.is_empty() {
        return Ok(());
    }

    let Some(path) = env.env_file_path() else {
        return Ok(());
    };
    if !path.exists() {
        debug!("no env file at {}, nothing to update", path.display());
        return Ok(());
    }

    let mut entries = load_env_file(&path).map_err(|err| {
        FixtureError::EnvSync(format!("failed to parse {}: {err}", path.display()))
    })?;

    let resolver = Resolver::new(cache, env);
    for (key, expression) in &set.env {
        let value = resolver.resolve_string_strict(expression)?;
        entries.insert(key.clone(), value);
    }

    let mut content = String::new();
    for (key, value) in &entries {
        content.push_str(key);
        content.push('=');
        content.push_str(value);
        content.push('\n');
    }
    fs::write(&path, content)?;

    info!("Updated env file: {}", path.display());
    Ok(())
}
