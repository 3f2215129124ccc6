//! Embedded query syntax.
//!
//! Fixture paths and string parameter values may embed references to prior
//! responses or environment variables:
//!
//! ```text
//! ${name:expression}
//! ${name:expression|default}
//! ```
//!
//! `name` is a fixture step name, or `.env` to look up an environment
//! variable instead. `expression` is a path into the named response (or the
//! variable key). A query can appear as a substring of a larger value, and
//! one value can hold several queries; [`split_queries`] exposes the matches
//! together with the literal text between them so callers can reassemble the
//! final string. Text that doesn't match the syntax is never an error, it is
//! simply literal.

use std::sync::LazyLock;

use regex::Regex;

/// Name designating an environment-variable lookup instead of a cached
/// response.
pub const ENV_SENTINEL: &str = ".env";

// `name` and `expression` are non-empty, non-greedy runs excluding `|` and
// `}`; the optional default excludes `}` and newlines and runs to the
// closing brace.
static QUERY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^|}]+?):([^|}]+?)(?:\|([^}\n]+))?\}").expect("query pattern is valid")
});

/// One parsed `${name:expression|default}` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// The exact substring that matched, kept for fallback output.
    pub raw: String,
    pub name: String,
    pub expression: String,
    pub default_value: Option<String>,
}

/// A piece of a string that may embed queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Query(Query),
}

/// Returns true if the string embeds at least one query.
pub fn contains_query(value: &str) -> bool {
    QUERY_RE.is_match(value)
}

/// Parses the first embedded query, if any.
pub fn first_query(value: &str) -> Option<Query> {
    QUERY_RE.captures(value).map(|caps| query_from_captures(&caps))
}

/// Splits a string into literal text and embedded queries, in order.
///
/// Interleaving the resolved queries with the literal segments reproduces
/// the original string with each query replaced by its value. Empty literal
/// runs are omitted.
pub fn split_queries(value: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in QUERY_RE.captures_iter(value) {
        let whole = caps.get(0).expect("capture group 0 always present");
        if whole.start() > cursor {
            segments.push(Segment::Literal(value[cursor..whole.start()].to_string()));
        }
        segments.push(Segment::Query(query_from_captures(&caps)));
        cursor = whole.end();
    }

    if cursor < value.len() {
        segments.push(Segment::Literal(value[cursor..].to_string()));
    }

    segments
}

fn query_from_captures(caps: &regex::Captures<'_>) -> Query {
    Query {
        raw: caps[0].to_string(),
        name: caps[1].to_string(),
        expression: caps[2].to_string(),
        default_value: caps.get(3).map(|m| m.as_str().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_expression() {
        let query = first_query("${customer:id}").unwrap();
        assert_eq!(query.name, "customer");
        assert_eq!(query.expression, "id");
        assert_eq!(query.default_value, None);
        assert_eq!(query.raw, "${customer:id}");
    }

    #[test]
    fn parses_default_value() {
        let query = first_query("${.env:API_KEY|sk_test_123}").unwrap();
        assert_eq!(query.name, ".env");
        assert_eq!(query.expression, "API_KEY");
        assert_eq!(query.default_value.as_deref(), Some("sk_test_123"));
    }

    #[test]
    fn plain_strings_do_not_match() {
        assert!(!contains_query("just a plain value"));
        assert!(first_query("v1/customers").is_none());
    }

    #[test]
    fn malformed_syntax_is_literal() {
        assert!(!contains_query("${missing_separator}"));
        assert!(!contains_query("${unclosed:query"));
        let segments = split_queries("${unclosed:query");
        assert_eq!(
            segments,
            vec![Segment::Literal("${unclosed:query".to_string())]
        );
    }

    #[test]
    fn query_embedded_in_larger_string() {
        let segments = split_queries("v1/customers/${customer:id}/sources");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], Segment::Literal("v1/customers/".to_string()));
        assert!(matches!(&segments[1], Segment::Query(q) if q.name == "customer"));
        assert_eq!(segments[2], Segment::Literal("/sources".to_string()));
    }

    #[test]
    fn multiple_queries_in_one_string() {
        let segments = split_queries("${a:x}-${b:y}");
        let queries: Vec<&Query> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Query(q) => Some(q),
                Segment::Literal(_) => None,
            })
            .collect();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].name, "a");
        assert_eq!(queries[1].name, "b");
    }

    #[test]
    fn expression_with_dotted_path() {
        let query = first_query("${charge:source.card.last4}").unwrap();
        assert_eq!(query.expression, "source.card.last4");
    }

    #[test]
    fn leading_literal_omitted_when_query_starts_string() {
        let segments = split_queries("${customer:id}/delete");
        assert!(matches!(&segments[0], Segment::Query(_)));
        assert_eq!(segments[1], Segment::Literal("/delete".to_string()));
    }
}
