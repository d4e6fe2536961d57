//! Query evaluation over a document tree.

use std::cmp::Ordering;

use serde_json::Value;

use crate::parse::{parse, CmpOp, FilterTest, Query, QueryParseError, Selector};

/// Evaluate `query` against `doc`, returning matched locations as
/// native-notation path strings in document order. Zero matches is not an
/// error; an unparsable expression is.
pub fn select(doc: &Value, query: &str) -> Result<Vec<String>, QueryParseError> {
    let parsed = parse(query)?;
    Ok(eval(&parsed, doc))
}

fn eval(query: &Query, doc: &Value) -> Vec<String> {
    let mut frontier: Vec<(String, &Value)> = vec![(String::new(), doc)];

    for selector in &query.selectors {
        let mut next = Vec::new();
        for (path, value) in &frontier {
            step(selector, path, value, &mut next);
        }
        frontier = next;
    }

    frontier.into_iter().map(|(path, _)| path).collect()
}

fn step<'a>(
    selector: &Selector,
    path: &str,
    value: &'a Value,
    out: &mut Vec<(String, &'a Value)>,
) {
    match selector {
        Selector::Key(key) => {
            if let Value::Object(map) = value {
                if let Some(child) = map.get(key) {
                    out.push((push_key(path, key), child));
                }
            }
        }
        Selector::Index(index) => {
            if let Value::Array(arr) = value {
                let idx = if *index < 0 {
                    let Some(i) = arr.len().checked_sub(index.unsigned_abs()) else {
                        return;
                    };
                    i
                } else {
                    *index as usize
                };
                if let Some(child) = arr.get(idx) {
                    out.push((push_index(path, idx), child));
                }
            }
        }
        Selector::Wildcard => match value {
            Value::Object(map) => {
                for (key, child) in map {
                    out.push((push_key(path, key), child));
                }
            }
            Value::Array(arr) => {
                for (idx, child) in arr.iter().enumerate() {
                    out.push((push_index(path, idx), child));
                }
            }
            _ => {}
        },
        Selector::Filter { field, test } => match value {
            Value::Object(map) => {
                for (key, child) in map {
                    if filter_matches(child, field, test) {
                        out.push((push_key(path, key), child));
                    }
                }
            }
            Value::Array(arr) => {
                for (idx, child) in arr.iter().enumerate() {
                    if filter_matches(child, field, test) {
                        out.push((push_index(path, idx), child));
                    }
                }
            }
            _ => {}
        },
    }
}

fn filter_matches(candidate: &Value, field: &[String], test: &FilterTest) -> bool {
    let mut current = candidate;
    for key in field {
        match current {
            Value::Object(map) => match map.get(key) {
                Some(child) => current = child,
                None => return false,
            },
            _ => return false,
        }
    }
    match test {
        FilterTest::Exists => true,
        FilterTest::Cmp { op, value } => compare(*op, current, value),
    }
}

fn compare(op: CmpOp, left: &Value, right: &Value) -> bool {
    // Numbers compare by value so an integer field matches a float literal
    let ord = match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    };
    match op {
        CmpOp::Eq => ord == Some(Ordering::Equal),
        CmpOp::Ne => ord != Some(Ordering::Equal),
        CmpOp::Lt => ord == Some(Ordering::Less),
        CmpOp::Le => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
        CmpOp::Gt => ord == Some(Ordering::Greater),
        CmpOp::Ge => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
    }
}

fn push_key(base: &str, key: &str) -> String {
    if is_identifier(key) {
        if base.is_empty() {
            key.to_string()
        } else {
            format!("{base}.{key}")
        }
    } else {
        format!("{base}['{}']", escape_quoted(key))
    }
}

// Backslash-escape the quoting characters so a key containing an apostrophe
// survives the native-notation round trip.
fn escape_quoted(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for ch in key.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(ch),
        }
    }
    out
}

fn push_index(base: &str, idx: usize) -> String {
    format!("{base}[{idx}]")
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}
