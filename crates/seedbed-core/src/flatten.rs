//! Parameter flattening.
//!
//! Converts a nested parameter value into the ordered flat `key=value`
//! form the wire encoding expects, using bracket-path notation:
//!
//! ```text
//! {"email": "a@b.com"}                  -> email=a@b.com
//! {"metadata": {"name": "blah"}}        -> metadata[name]=blah
//! {"lines": [{"id": "a"}, {"id": "b"}]} -> lines[0][id]=a, lines[1][id]=b
//! {"tags": ["x", "y"]}                  -> tags[]=x, tags[]=y
//! ```
//!
//! Every string leaf passes through the resolver, so embedded queries are
//! replaced before encoding. Mapping keys are walked in declaration order,
//! which makes the output deterministic for a structurally identical input.

use indexmap::IndexMap;

use crate::error::Result;
use crate::params::{ParamValue, Scalar};
use crate::resolver::Resolver;

/// Flattens a step's parameters into ordered `key=value` pairs.
///
/// Entries are trimmed and empty entries discarded. A bare top-level scalar
/// produces nothing, since it has no key to carry it.
pub fn flatten_params(resolver: &Resolver<'_>, params: &ParamValue) -> Result<Vec<String>> {
    let mut entries = Vec::new();
    match params {
        ParamValue::Mapping(map) => flatten_mapping(resolver, map, "", None, &mut entries)?,
        ParamValue::Sequence(seq) => flatten_sequence(resolver, seq, "", &mut entries)?,
        ParamValue::Scalar(_) => {}
    }

    Ok(entries
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(ToString::to_string)
        .collect())
}

fn flatten_mapping(
    resolver: &Resolver<'_>,
    map: &IndexMap<String, ParamValue>,
    parent: &str,
    array_index: Option<usize>,
    out: &mut Vec<String>,
) -> Result<()> {
    for (key, value) in map {
        let keyname = match (parent.is_empty(), array_index) {
            // ex: lines[0][id]=id_0000, lines[1][id]=id_1234
            (false, Some(index)) => format!("{parent}[{index}][{key}]"),
            // ex: metadata[name]=blah
            (false, None) => format!("{parent}[{key}]"),
            (true, _) => key.clone(),
        };

        match value {
            ParamValue::Scalar(Scalar::Null) => {}
            ParamValue::Scalar(scalar) => {
                let rendered = render_scalar(resolver, scalar)?;
                out.push(format!("{keyname}={rendered}"));
            }
            ParamValue::Mapping(nested) => {
                flatten_mapping(resolver, nested, &keyname, array_index, out)?;
            }
            ParamValue::Sequence(nested) => flatten_sequence(resolver, nested, &keyname, out)?,
        }
    }
    Ok(())
}

fn flatten_sequence(
    resolver: &Resolver<'_>,
    seq: &[ParamValue],
    parent: &str,
    out: &mut Vec<String>,
) -> Result<()> {
    // The index only advances for mapping elements of this sequence.
    let mut array_index = 0;
    for value in seq {
        match value {
            ParamValue::Scalar(Scalar::Null) => {}
            ParamValue::Scalar(scalar) => {
                let rendered = render_scalar(resolver, scalar)?;
                out.push(format!("{parent}[]={rendered}"));
            }
            ParamValue::Mapping(map) => {
                flatten_mapping(resolver, map, parent, Some(array_index), out)?;
                array_index += 1;
            }
            // Nested sequences flatten under the same parent without adding
            // an index segment.
            ParamValue::Sequence(nested) => flatten_sequence(resolver, nested, parent, out)?,
        }
    }
    Ok(())
}

fn render_scalar(resolver: &Resolver<'_>, scalar: &Scalar) -> Result<String> {
    Ok(match scalar {
        Scalar::Str(s) => resolver.resolve_string(s)?,
        Scalar::Int(i) => i.to_string(),
        Scalar::Float(f) => format_float(*f),
        Scalar::Bool(b) => b.to_string(),
        Scalar::Null => String::new(),
    })
}

/// Minimal decimal rendering that round-trips exactly.
///
/// Fixture numbers arrive as floats even when written without a fraction,
/// so `10` must stay `10` and `25.00` must become `25`, while `20.10`
/// keeps its meaningful digit as `20.1`. Display on `f64` produces the
/// shortest round-tripping form and never switches to scientific notation.
fn format_float(value: f64) -> String {
    format!("{value}")
}
