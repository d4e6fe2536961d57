//! JSON Pointer (RFC 6901) utilities.
//!
//! A pointer is an ordered sequence of reference tokens rooted at the
//! document root. The literal token `-` addresses the append position of an
//! array. A pointer is only meaningful relative to a specific document
//! snapshot; mutation can leave it dangling.
//!
//! # Example
//!
//! ```
//! use json_graft_json_pointer::{parse_pointer, format_pointer, get};
//!
//! let path = parse_pointer("/foo/bar");
//! assert_eq!(path, vec!["foo".to_string(), "bar".to_string()]);
//! assert_eq!(format_pointer(&path), "/foo/bar");
//!
//! let doc = serde_json::json!({"foo": {"bar": 42}});
//! assert_eq!(get(&doc, &path), Some(&serde_json::json!(42)));
//! ```

use serde_json::Value;

/// A parsed pointer: one string per reference token.
pub type Path = Vec<String>;

/// Unescape a reference token per RFC 6901: `~1` → `/`, then `~0` → `~`.
///
/// # Example
///
/// ```
/// use json_graft_json_pointer::unescape_token;
///
/// assert_eq!(unescape_token("a~0b"), "a~b");
/// assert_eq!(unescape_token("c~1d"), "c/d");
/// ```
pub fn unescape_token(token: &str) -> String {
    if !token.contains('~') {
        return token.to_string();
    }
    // Order matters: ~1 must be replaced before ~0
    token.replace("~1", "/").replace("~0", "~")
}

/// Escape a reference token per RFC 6901: `~` → `~0`, then `/` → `~1`.
///
/// # Example
///
/// ```
/// use json_graft_json_pointer::escape_token;
///
/// assert_eq!(escape_token("a~b"), "a~0b");
/// assert_eq!(escape_token("c/d"), "c~1d");
/// ```
pub fn escape_token(token: &str) -> String {
    if !token.contains('~') && !token.contains('/') {
        return token.to_string();
    }
    // Order matters: ~ must be escaped before /
    token.replace('~', "~0").replace('/', "~1")
}

/// Parse a pointer string into reference tokens.
///
/// The empty string is the root (empty path); otherwise the leading `/` is
/// stripped and each token is unescaped.
///
/// # Example
///
/// ```
/// use json_graft_json_pointer::parse_pointer;
///
/// assert_eq!(parse_pointer(""), Vec::<String>::new());
/// assert_eq!(parse_pointer("/foo/0"), vec!["foo", "0"]);
/// assert_eq!(parse_pointer("/a~0b/c~1d"), vec!["a~b", "c/d"]);
/// ```
pub fn parse_pointer(pointer: &str) -> Path {
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer[1..].split('/').map(unescape_token).collect()
}

/// Format reference tokens back into a pointer string.
///
/// The root (empty path) formats as the empty string.
pub fn format_pointer(path: &[String]) -> String {
    let mut out = String::new();
    for token in path {
        out.push('/');
        out.push_str(&escape_token(token));
    }
    out
}

/// Check whether a token is a valid array index: ASCII digits only, no
/// leading zero except `"0"` itself.
pub fn is_valid_index(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    let bytes = token.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|b| b.is_ascii_digit())
}

/// Immutable traversal to the value at `path`.
///
/// Returns `None` if any token is absent or addresses into a scalar. The
/// append token `-` never resolves to an existing element.
pub fn get<'a>(doc: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = doc;
    for token in path {
        match current {
            Value::Array(arr) => {
                if token == "-" || !is_valid_index(token) {
                    return None;
                }
                let idx: usize = token.parse().ok()?;
                current = arr.get(idx)?;
            }
            Value::Object(map) => {
                current = map.get(token)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Mutable traversal to the value at `path`.
pub fn get_mut<'a>(doc: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    let mut current = doc;
    for token in path {
        match current {
            Value::Array(arr) => {
                if token == "-" || !is_valid_index(token) {
                    return None;
                }
                let idx: usize = token.parse().ok()?;
                current = arr.get_mut(idx)?;
            }
            Value::Object(map) => {
                current = map.get_mut(token)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escape_roundtrip() {
        for token in ["plain", "a~b", "c/d", "~/", "~0", ""] {
            assert_eq!(unescape_token(&escape_token(token)), token);
        }
    }

    #[test]
    fn unescape_order() {
        // ~01 must decode to "~1", not "/"
        assert_eq!(unescape_token("~01"), "~1");
    }

    #[test]
    fn parse_root_and_tokens() {
        assert_eq!(parse_pointer(""), Vec::<String>::new());
        assert_eq!(parse_pointer("/"), vec![""]);
        assert_eq!(parse_pointer("/foo/bar"), vec!["foo", "bar"]);
        assert_eq!(parse_pointer("/a~0b/c~1d/1"), vec!["a~b", "c/d", "1"]);
    }

    #[test]
    fn format_escapes() {
        assert_eq!(format_pointer(&[]), "");
        assert_eq!(
            format_pointer(&["a~b".to_string(), "c/d".to_string()]),
            "/a~0b/c~1d"
        );
    }

    #[test]
    fn pointer_roundtrip() {
        for ptr in ["", "/", "/foo", "/foo/0", "/a~0b/c~1d"] {
            assert_eq!(format_pointer(&parse_pointer(ptr)), ptr);
        }
    }

    #[test]
    fn index_validation() {
        assert!(is_valid_index("0"));
        assert!(is_valid_index("42"));
        assert!(!is_valid_index("01"));
        assert!(!is_valid_index("-1"));
        assert!(!is_valid_index(""));
        assert!(!is_valid_index("x"));
    }

    #[test]
    fn get_object_and_array() {
        let doc = json!({"a": {"b": [1, 2, 3]}});
        assert_eq!(get(&doc, &parse_pointer("/a/b/1")), Some(&json!(2)));
        assert_eq!(get(&doc, &parse_pointer("/a/missing")), None);
        assert_eq!(get(&doc, &parse_pointer("/a/b/3")), None);
    }

    #[test]
    fn get_root() {
        let doc = json!([1]);
        assert_eq!(get(&doc, &[]), Some(&doc));
    }

    #[test]
    fn get_append_token_is_not_a_location() {
        let doc = json!({"a": [1, 2]});
        assert_eq!(get(&doc, &parse_pointer("/a/-")), None);
    }

    #[test]
    fn get_into_scalar_fails() {
        let doc = json!({"a": 1});
        assert_eq!(get(&doc, &parse_pointer("/a/b")), None);
    }

    #[test]
    fn get_mut_allows_in_place_edit() {
        let mut doc = json!({"a": [1, 2]});
        *get_mut(&mut doc, &parse_pointer("/a/0")).unwrap() = json!(99);
        assert_eq!(doc, json!({"a": [99, 2]}));
    }
}
