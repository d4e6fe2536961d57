//! Structural validation of decoded declarative operations.
//!
//! Checks the per-kind payload invariants that the record shape cannot
//! express: add/replace/test carry `value`, move/copy carry `from`, and a
//! query target carries a non-empty, well-formed suffix (after the optional
//! `@` marker it must be empty or `/`-rooted). Validation never inspects the
//! document; it is a pure pre-flight over caller input.

use super::expand::trim_leading_at;
use super::types::{DeclarativeOp, PatchError, PatchGroup, Target};

/// Validate one declarative operation.
pub fn validate_op(decl: &DeclarativeOp) -> Result<(), PatchError> {
    if decl.op.requires_value() && decl.value.is_none() {
        return Err(PatchError::InvalidOp(format!(
            "{} requires 'value'",
            decl.op.as_str()
        )));
    }
    if decl.op.requires_from() && decl.from.is_none() {
        return Err(PatchError::InvalidOp(format!(
            "{} requires 'from'",
            decl.op.as_str()
        )));
    }
    if let Target::Query { suffix, .. } = &decl.target {
        if suffix.is_empty() {
            return Err(PatchError::InvalidOp(
                "query target requires a non-empty pointer suffix".into(),
            ));
        }
        // After the relative-to-match marker the suffix must be a pointer:
        // empty (the match itself) or `/`-rooted. Anything else would glue
        // onto the match's last token when the pointers are joined.
        let trimmed = trim_leading_at(suffix);
        if !trimmed.is_empty() && !trimmed.starts_with('/') {
            return Err(PatchError::InvalidOp(format!(
                "pointer suffix must be empty or start with '/', got '{suffix}'"
            )));
        }
    }
    Ok(())
}

/// Validate every operation in a group, failing on the first offender.
pub fn validate_group(group: &PatchGroup) -> Result<(), PatchError> {
    group.ops.iter().try_for_each(validate_op)
}
