//! serverStatus document normalization
//!
//! The mongo shell's `printjson` emits shell constructors around some values
//! (`ISODate("...")`, `NumberLong(42)`, `Timestamp(1, 2)`), which is not JSON.
//! They are stripped textually before parsing, then the tree is flattened into
//! `parent_child_leaf` keys.
//!
//! The strip is line-oriented and greedy, one substitution per match: a line
//! holding two wrappers keeps everything between the first `(` and the last
//! `)`, and wrappers whose arguments span lines are left untouched. Such
//! documents fail to parse and the instance is reported as malformed.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Separator used between flattened path segments
pub const FLATTEN_SEPARATOR: &str = "_";

/// Flattened `path -> leaf` view of a status document
pub type FlatMetricMap = BTreeMap<String, Value>;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("status document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("status document is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

fn wrapper_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w+\((.*)\)").expect("wrapper pattern is valid"))
}

/// Replace every `identifier(content)` with `content`
pub fn strip_wrappers(raw: &str) -> String {
    wrapper_pattern().replace_all(raw, "$1").into_owned()
}

/// Parse shell output into a JSON object
pub fn parse_document(raw: &str) -> Result<Map<String, Value>, NormalizeError> {
    match serde_json::from_str::<Value>(&strip_wrappers(raw))? {
        Value::Object(map) => Ok(map),
        other => Err(NormalizeError::NotAnObject(kind_name(&other))),
    }
}

/// Flatten nested objects into `a_b_c` keys; arrays and scalars are leaves
pub fn flatten(document: &Map<String, Value>) -> FlatMetricMap {
    let mut flat = FlatMetricMap::new();
    flatten_into(document, "", &mut flat);
    flat
}

fn flatten_into(document: &Map<String, Value>, prefix: &str, flat: &mut FlatMetricMap) {
    for (key, value) in document {
        match value {
            Value::Object(child) => {
                let child_prefix = format!("{}{}{}", prefix, key, FLATTEN_SEPARATOR);
                flatten_into(child, &child_prefix, flat);
            }
            leaf => {
                flat.insert(format!("{}{}", prefix, key), leaf.clone());
            }
        }
    }
}

/// Strip, parse and flatten in one step
pub fn normalize(raw: &str) -> Result<FlatMetricMap, NormalizeError> {
    parse_document(raw).map(|document| flatten(&document))
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
