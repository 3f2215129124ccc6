//! Error types for the fixture engine.

use seedbed_proto::RequestError;
use thiserror::Error;

/// Errors that abort a fixture run.
///
/// Lookup misses that degrade gracefully (an absent environment variable, a
/// path expression that finds nothing) are handled inside the resolver and
/// never appear here.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse fixture file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("fixture version not supported: {0}")]
    UnsupportedVersion(i64),

    #[error("an undeclared fixture name was referenced: {name}{}", suggestion_hint(.suggestions))]
    Reference {
        name: String,
        suggestions: Vec<String>,
    },

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("failed to update env file: {0}")]
    EnvSync(String),
}

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, FixtureError>;

fn suggestion_hint(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(
            "\nPerhaps you meant one of the following: {}",
            suggestions.join(", ")
        )
    }
}
