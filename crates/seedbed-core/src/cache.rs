//! Run-scoped cache of parsed step responses.
//!
//! Each executed step stores its parsed JSON body under the step name, and
//! later steps query into those bodies by path expression. The cache only
//! grows during a run and is discarded afterwards.

use indexmap::IndexMap;
use serde_json::Value;
use serde_json_path::JsonPath;
use tracing::debug;

/// Parsed responses keyed by fixture step name.
#[derive(Debug, Default)]
pub struct ResponseCache {
    responses: IndexMap<String, Value>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a response under a step name. A repeated name overwrites the
    /// previous response silently.
    pub fn insert(&mut self, name: impl Into<String>, response: Value) {
        self.responses.insert(name.into(), response);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.responses.contains_key(name)
    }

    /// Step names present in the cache, in execution order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.responses.keys().map(String::as_str)
    }

    /// Evaluates a path expression against a cached response.
    ///
    /// Bare dot-paths (`id`, `source.card.last4`) are normalized to rooted
    /// JSONPath form before evaluation. Returns `None` when the name is not
    /// cached, the expression is malformed, or the path finds nothing; the
    /// caller decides how to degrade.
    pub fn lookup(&self, name: &str, expression: &str) -> Option<String> {
        let response = self.responses.get(name)?;

        let rooted;
        let expression = if expression.starts_with('$') {
            expression
        } else {
            rooted = format!("$.{expression}");
            &rooted
        };

        let path = match JsonPath::parse(expression) {
            Ok(path) => path,
            Err(err) => {
                debug!("invalid path expression {expression:?}: {err}");
                return None;
            }
        };

        path.query(response).first().map(render_value)
    }
}

/// Renders a found JSON node as a flat string value.
///
/// Strings are emitted without quotes; everything else uses its JSON text.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
