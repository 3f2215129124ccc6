//! Value resolution for embedded queries.
//!
//! Turns `${name:expression|default}` occurrences into concrete strings by
//! consulting cached responses or the environment provider. Resolution is
//! lenient by default: an absent environment variable degrades to the
//! default or an empty string, and a path expression that finds nothing
//! degrades to the default or the raw query text. Referencing a fixture
//! name that never executed is always a hard error.
//!
//! The strict variant is used when persisting env output, where a silently
//! empty value would poison downstream tooling.

use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::environment::{Environment, load_env_file};
use crate::error::{FixtureError, Result};
use crate::query::{self, ENV_SENTINEL, Query, Segment};

pub struct Resolver<'a> {
    cache: &'a ResponseCache,
    env: &'a dyn Environment,
}

impl<'a> Resolver<'a> {
    pub fn new(cache: &'a ResponseCache, env: &'a dyn Environment) -> Self {
        Self { cache, env }
    }

    /// Resolves every embedded query in `input`, interleaving resolved
    /// values with the literal text around them. Strings without queries
    /// come back verbatim.
    pub fn resolve_string(&self, input: &str) -> Result<String> {
        self.resolve_segments(input, false)
    }

    /// Like [`Resolver::resolve_string`], but a query that produces no
    /// value (and has no default) is an error instead of degrading.
    pub fn resolve_string_strict(&self, input: &str) -> Result<String> {
        self.resolve_segments(input, true)
    }

    fn resolve_segments(&self, input: &str, strict: bool) -> Result<String> {
        let mut out = String::new();
        for segment in query::split_queries(input) {
            match segment {
                Segment::Literal(text) => out.push_str(&text),
                Segment::Query(q) => out.push_str(&self.resolve_query(&q, strict)?),
            }
        }
        Ok(out)
    }

    fn resolve_query(&self, query: &Query, strict: bool) -> Result<String> {
        if query.name == ENV_SENTINEL {
            return self.resolve_env_var(query, strict);
        }

        if !self.cache.contains(&query.name) {
            return Err(FixtureError::Reference {
                name: query.name.clone(),
                suggestions: similar_names(self.cache, &query.name),
            });
        }

        match self.cache.lookup(&query.name, &query.expression) {
            Some(value) => Ok(value),
            None => match &query.default_value {
                Some(default) => Ok(default.clone()),
                None if strict => Err(FixtureError::EnvSync(format!(
                    "no value produced for {}",
                    query.raw
                ))),
                None => {
                    debug!("path {:?} found nothing in {:?}", query.expression, query.name);
                    Ok(query.raw.clone())
                }
            },
        }
    }

    fn resolve_env_var(&self, query: &Query, strict: bool) -> Result<String> {
        let key = &query.expression;

        let value = self.env.var(key).or_else(|| {
            let path = self.env.env_file_path()?;
            load_env_file(&path).ok()?.remove(key)
        });

        match value {
            Some(value) if !value.is_empty() => Ok(value),
            _ => {
                if let Some(default) = &query.default_value {
                    return Ok(default.clone());
                }
                if strict {
                    return Err(FixtureError::EnvSync(format!(
                        "no value for env var: {key}"
                    )));
                }
                warn!("No value for env var: {key}");
                Ok(String::new())
            }
        }
    }
}

fn normalize_for_comparison(name: &str) -> String {
    name.to_lowercase().replace(['_', '-'], "")
}

/// Cached names whose normalized form relates to the queried name by
/// substring containment in either direction. Exact matches never suggest
/// themselves.
fn similar_names(cache: &ResponseCache, name: &str) -> Vec<String> {
    let target = normalize_for_comparison(name);
    cache
        .names()
        .filter(|candidate| *candidate != name)
        .filter(|candidate| {
            let normalized = normalize_for_comparison(candidate);
            normalized.contains(&target) || target.contains(&normalized)
        })
        .map(ToString::to_string)
        .collect()
}
