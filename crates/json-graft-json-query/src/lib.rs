//! JSONPath-subset query engine.
//!
//! Evaluates a selection expression against a JSON document and reports each
//! match as a path string in the engine's native notation: dot-separated
//! identifiers with bracketed, zero-based array indices
//! (`items[0].name`), non-identifier keys rendered in apostrophe-quoted
//! brackets (`a['strange key']`).
//!
//! Supported grammar: root `$`, child names (`.name`, `['name']`), indices
//! (`[3]`, negative counts from the end), wildcards (`.*`, `[*]`), and
//! comparison filters (`[?(@.field == literal)]`). Slices, unions, and
//! recursive descent are not part of this engine.
//!
//! # Example
//!
//! ```
//! use json_graft_json_query::select;
//! use serde_json::json;
//!
//! let doc = json!({"items": [{"name": "a"}, {"name": "b"}]});
//! let matches = select(&doc, "$.items[*]").unwrap();
//! assert_eq!(matches, vec!["items[0]", "items[1]"]);
//! ```

mod eval;
mod parse;

pub use eval::select;
pub use parse::{parse, CmpOp, FilterTest, Query, QueryParseError, Selector};
