//! Declarative operation expansion.
//!
//! Translates one [`DeclarativeOp`] into an ordered list of concrete,
//! pointer-addressed operations. Direct-pointer declarations pass through
//! one-to-one; query declarations fan out into one concrete operation per
//! match, in match order. Expansion never mutates the document.

use serde_json::Value;
use thiserror::Error;

use json_graft_json_pointer::parse_pointer;
use json_graft_json_query::{select, QueryParseError};

use super::notation::to_pointer;
use super::types::{ConcreteOp, DeclarativeOp, OpKind, PatchError, Path, Target};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExpandError {
    /// The resolver could not parse the query expression. Fatal for the
    /// whole integrate call, not just the current group.
    #[error("invalid query: {0}")]
    Query(#[from] QueryParseError),
    /// The declaration is structurally incomplete (missing payload/source).
    #[error(transparent)]
    Op(PatchError),
}

/// Strip the leading relative-to-match marker from a pointer suffix.
///
/// At the declaration site a leading `@` distinguishes "relative to each
/// match" from "absolute" pointer authoring.
pub(crate) fn trim_leading_at(suffix: &str) -> &str {
    suffix.strip_prefix('@').unwrap_or(suffix)
}

/// Expand a declarative operation against the current document state.
///
/// A query with zero matches expands to an empty sequence, which is not an
/// error.
pub fn expand(doc: &Value, decl: &DeclarativeOp) -> Result<Vec<ConcreteOp>, ExpandError> {
    match &decl.target {
        Target::Pointer(path) => Ok(vec![concrete(decl, path.clone())?]),
        Target::Query { expr, suffix } => {
            let suffix = trim_leading_at(suffix);
            let mut ops = Vec::new();
            for native in select(doc, expr)? {
                let pointer = to_pointer(&native) + suffix;
                ops.push(concrete(decl, parse_pointer(&pointer))?);
            }
            Ok(ops)
        }
    }
}

fn concrete(decl: &DeclarativeOp, path: Path) -> Result<ConcreteOp, ExpandError> {
    let value = || {
        decl.value.clone().ok_or_else(|| {
            ExpandError::Op(PatchError::InvalidOp(format!(
                "{} requires 'value'",
                decl.op.as_str()
            )))
        })
    };
    let from = || {
        decl.from.clone().ok_or_else(|| {
            ExpandError::Op(PatchError::InvalidOp(format!(
                "{} requires 'from'",
                decl.op.as_str()
            )))
        })
    };
    Ok(match decl.op {
        OpKind::Add => ConcreteOp::Add {
            path,
            value: value()?,
        },
        OpKind::Remove => ConcreteOp::Remove { path },
        OpKind::Replace => ConcreteOp::Replace {
            path,
            value: value()?,
        },
        OpKind::Move => ConcreteOp::Move {
            path,
            from: from()?,
        },
        OpKind::Copy => ConcreteOp::Copy {
            path,
            from: from()?,
        },
        OpKind::Test => ConcreteOp::Test {
            path,
            value: value()?,
        },
    })
}
