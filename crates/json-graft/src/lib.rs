//! json-graft — declarative JSON patching.
//!
//! Mutates a generic JSON document by applying ordered groups of declarative
//! patch operations. An operation addresses its target either by a direct
//! structural pointer (RFC 6901) or by a query expression that fans out into
//! one concrete edit per match at apply time.
//!
//! Groups are independent: operations within a group are causally
//! sequential and the first failure truncates the remainder of that group
//! only, with no rollback of edits already made. Later groups still run
//! against the partially-mutated document.
//!
//! # Example
//!
//! ```
//! use json_graft::integrate;
//! use json_graft::json_patch::codec::group_from_json;
//! use serde_json::json;
//!
//! let group = group_from_json(&json!([
//!     {"op": "replace", "path": "/hp", "value": 150},
//!     {"op": "add", "path": "/tags/1", "value": "x"}
//! ]))
//! .unwrap();
//!
//! let out = integrate(r#"{"hp":100,"tags":["a","b"]}"#, &[group]).unwrap();
//! let doc: serde_json::Value = serde_json::from_str(&out).unwrap();
//! assert_eq!(doc, json!({"hp": 150, "tags": ["a", "x", "b"]}));
//! ```

pub mod integrate;
pub mod json_patch;

pub use integrate::{integrate, integrate_with_report, IntegrateError};
pub use json_patch::{
    apply_group, apply_op, expand, to_pointer, ConcreteOp, DeclarativeOp, GroupOutcome, OpKind,
    PatchError, PatchGroup, Target,
};
