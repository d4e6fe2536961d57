//! Native path notation to structural pointer translation.
//!
//! The query engine reports match locations in its native notation: object
//! membership as dot-separated identifiers, array membership as bracketed
//! zero-based indices, non-identifier keys in apostrophe-quoted brackets
//! (`foo[3].bar`, `a['we ird']`). This module converts such a path into a
//! pointer string: every bracket group becomes a standalone segment, every
//! remaining dot a segment separator, apostrophe quoting is stripped, and
//! the result carries a single leading `/`.
//!
//! Each segment is RFC 6901 escaped, so `~` and `/` appearing inside a
//! matched key survive the translation.

use std::sync::OnceLock;

use regex::Regex;

use json_graft_json_pointer::escape_token;

static TOKEN: OnceLock<Regex> = OnceLock::new();

// One capture per reference token: bracketed index, bracketed quoted key
// (quoting characters may be backslash-escaped inside), or a dot-delimited
// bare run.
fn token_re() -> &'static Regex {
    TOKEN.get_or_init(|| Regex::new(r"\[(\d+)\]|\['((?:\\.|[^'\\])*)'\]|([^.\[]+)").unwrap())
}

// Undo the engine's backslash escaping inside a quoted key.
fn unescape_quoted(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Convert a native-notation path to a pointer string.
///
/// The empty native path (a match at the document root) converts to the
/// empty pointer.
///
/// # Example
///
/// ```
/// use json_graft::json_patch::notation::to_pointer;
///
/// assert_eq!(to_pointer("a.b[2].c"), "/a/b/2/c");
/// assert_eq!(to_pointer("items[0]"), "/items/0");
/// ```
pub fn to_pointer(native: &str) -> String {
    let mut out = String::with_capacity(native.len() + 1);
    for caps in token_re().captures_iter(native) {
        let token = if let Some(quoted) = caps.get(2) {
            unescape_quoted(quoted.as_str())
        } else {
            caps.get(1)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default()
                .to_string()
        };
        out.push('/');
        out.push_str(&escape_token(&token));
    }
    out
}
