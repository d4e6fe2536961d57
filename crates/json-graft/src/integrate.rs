//! Integration driver.
//!
//! Orchestrates one full pass: parse the source text, expand and apply each
//! patch group in order against the shared document, serialize the result.
//! Only a malformed source or an unparsable query aborts the call; a group
//! whose application truncates early is recorded in the report and the next
//! group still runs against the partially-mutated document.

use serde_json::Value;
use thiserror::Error;

use json_graft_json_query::QueryParseError;

use crate::json_patch::{apply_group, expand, ExpandError, GroupOutcome, PatchGroup};

#[derive(Debug, Error)]
pub enum IntegrateError {
    /// Source text is empty or not valid JSON.
    #[error("MALFORMED_SOURCE: {0}")]
    MalformedSource(String),
    /// A query expression the resolver cannot parse. Caller-input error,
    /// not recoverable per group.
    #[error("INVALID_QUERY: {0}")]
    InvalidQuery(#[from] QueryParseError),
    #[error("SERIALIZE: {0}")]
    Serialize(serde_json::Error),
}

/// Apply all groups to the parsed source and return the serialized result.
///
/// The result reflects every operation that could be applied, in order,
/// skipping the remainder of any group that hit an inapplicable operation.
pub fn integrate(source: &str, groups: &[PatchGroup]) -> Result<String, IntegrateError> {
    let (text, _) = integrate_with_report(source, groups)?;
    Ok(text)
}

/// Like [`integrate`], but also returns one [`GroupOutcome`] per group so
/// callers can observe truncation points.
pub fn integrate_with_report(
    source: &str,
    groups: &[PatchGroup],
) -> Result<(String, Vec<GroupOutcome>), IntegrateError> {
    if source.trim().is_empty() {
        return Err(IntegrateError::MalformedSource("empty source".into()));
    }
    let mut doc: Value = serde_json::from_str(source)
        .map_err(|e| IntegrateError::MalformedSource(e.to_string()))?;

    let mut report = Vec::with_capacity(groups.len());
    for group in groups {
        report.push(integrate_group(&mut doc, group)?);
    }

    let text = serde_json::to_string_pretty(&doc).map_err(IntegrateError::Serialize)?;
    Ok((text, report))
}

/// Expand one group into a flattened concrete sequence, then apply it.
///
/// Expansion happens for the whole group before any edit, against the
/// document state left by earlier groups. A structurally invalid
/// declaration truncates the group before anything is applied.
fn integrate_group(doc: &mut Value, group: &PatchGroup) -> Result<GroupOutcome, IntegrateError> {
    let mut ops = Vec::with_capacity(group.ops.len());
    for decl in &group.ops {
        match expand(doc, decl) {
            Ok(expanded) => ops.extend(expanded),
            Err(ExpandError::Query(e)) => return Err(IntegrateError::InvalidQuery(e)),
            Err(ExpandError::Op(error)) => {
                return Ok(GroupOutcome::Truncated { applied: 0, error })
            }
        }
    }
    Ok(apply_group(doc, &ops))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_patch::codec::group_from_json;
    use serde_json::json;

    #[test]
    fn empty_group_list_is_identity() {
        let out = integrate(r#"{"b":1,"a":[2,3]}"#, &[]).unwrap();
        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc, json!({"b": 1, "a": [2, 3]}));
        // Key order survives the round trip
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"b":1,"a":[2,3]}"#);
    }

    #[test]
    fn output_is_indented() {
        let out = integrate(r#"{"a":1}"#, &[]).unwrap();
        assert_eq!(out, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn malformed_source_is_fatal() {
        assert!(matches!(
            integrate("{not json", &[]),
            Err(IntegrateError::MalformedSource(_))
        ));
        assert!(matches!(
            integrate("   ", &[]),
            Err(IntegrateError::MalformedSource(_))
        ));
    }

    #[test]
    fn invalid_query_is_fatal() {
        let group = group_from_json(&json!([
            {"op": "remove", "query": "not a query", "pointerSuffix": "@/x"}
        ]))
        .unwrap();
        assert!(matches!(
            integrate(r#"{"a":1}"#, &[group]),
            Err(IntegrateError::InvalidQuery(_))
        ));
    }

    #[test]
    fn truncated_group_reports_position_and_error() {
        let group = group_from_json(&json!([
            {"op": "replace", "path": "/hp", "value": 150},
            {"op": "replace", "path": "/mp", "value": 5},
            {"op": "add", "path": "/x", "value": 1}
        ]))
        .unwrap();
        let (out, report) = integrate_with_report(r#"{"hp":100}"#, &[group]).unwrap();
        assert_eq!(report.len(), 1);
        assert!(matches!(
            report[0],
            GroupOutcome::Truncated { applied: 1, .. }
        ));
        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc, json!({"hp": 150}));
    }

    #[test]
    fn invalid_declaration_truncates_group_without_edits() {
        // Missing 'value' is caught at expansion time, before any edit
        let group = PatchGroup::new(vec![crate::json_patch::DeclarativeOp {
            op: crate::json_patch::OpKind::Add,
            target: crate::json_patch::Target::Pointer(vec!["a".to_string()]),
            from: None,
            value: None,
        }]);
        let (out, report) = integrate_with_report(r#"{"a":1}"#, &[group]).unwrap();
        assert!(matches!(
            report[0],
            GroupOutcome::Truncated { applied: 0, .. }
        ));
        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc, json!({"a": 1}));
    }
}
