//! The patch engine: declarative operation model, expansion, and application.
//!
//! A [`DeclarativeOp`] is a caller-authored edit request that may address its
//! target directly (pointer) or through a query expression. The expander
//! (`expand.rs`) resolves each declaration into zero or more [`ConcreteOp`]s
//! carrying plain pointers; the applier (`apply.rs`) executes a flattened
//! concrete sequence against the document with RFC 6902 semantics and
//! truncate-on-first-failure group behavior.

pub mod apply;
pub mod codec;
pub mod expand;
pub mod notation;
pub mod types;
pub mod validate;

pub use apply::{apply_group, apply_op};
pub use expand::{expand, ExpandError};
pub use notation::to_pointer;
pub use types::{
    ConcreteOp, DeclarativeOp, GroupOutcome, OpKind, PatchError, PatchGroup, Path, Target,
};
pub use validate::{validate_group, validate_op};
