//! JSON codec for declarative operations and patch groups.
//!
//! External record shape:
//! `{op, path?, pointer?, query?, pointerSuffix?, from?, value?}` where at
//! most one of `path`/`pointer`/`query` is set per record (`pointer` is a
//! legacy alias of `path`; `query` additionally requires `pointerSuffix`).
//! The exactly-one-addressing-mode invariant is enforced here, at decode
//! time.

use serde_json::{json, Map, Value};

use json_graft_json_pointer::{format_pointer, parse_pointer};

use super::types::{DeclarativeOp, OpKind, PatchError, PatchGroup, Path, Target};

fn decode_pointer(v: &Value, field: &str) -> Result<Path, PatchError> {
    let s = v
        .as_str()
        .ok_or_else(|| PatchError::InvalidOp(format!("'{field}' must be a string")))?;
    Ok(parse_pointer(s))
}

// ── Deserialization ───────────────────────────────────────────────────────

/// Decode one declarative operation record.
pub fn op_from_json(v: &Value) -> Result<DeclarativeOp, PatchError> {
    let obj = v
        .as_object()
        .ok_or_else(|| PatchError::InvalidOp("operation must be an object".into()))?;
    let op_str = obj
        .get("op")
        .and_then(|v| v.as_str())
        .ok_or_else(|| PatchError::InvalidOp("missing 'op' field".into()))?;
    let op = OpKind::from_str(op_str)?;

    let path = obj.get("path");
    let pointer = obj.get("pointer");
    let query = obj.get("query");
    let mode_count = [path, pointer, query].iter().filter(|v| v.is_some()).count();
    if mode_count != 1 {
        return Err(PatchError::InvalidOp(format!(
            "exactly one of 'path', 'pointer', 'query' required, found {mode_count}"
        )));
    }

    let target = if let Some(p) = path.or(pointer) {
        Target::Pointer(decode_pointer(p, "path")?)
    } else {
        let expr = query
            .and_then(|q| q.as_str())
            .ok_or_else(|| PatchError::InvalidOp("'query' must be a string".into()))?
            .to_string();
        let suffix = obj
            .get("pointerSuffix")
            .ok_or_else(|| PatchError::InvalidOp("'query' requires 'pointerSuffix'".into()))?
            .as_str()
            .ok_or_else(|| PatchError::InvalidOp("'pointerSuffix' must be a string".into()))?
            .to_string();
        Target::Query { expr, suffix }
    };

    let from = obj
        .get("from")
        .map(|v| decode_pointer(v, "from"))
        .transpose()?;
    let value = obj.get("value").cloned();

    let decl = DeclarativeOp {
        op,
        target,
        from,
        value,
    };
    super::validate::validate_op(&decl)?;
    Ok(decl)
}

/// Decode a JSON array of operation records into one patch group.
pub fn group_from_json(v: &Value) -> Result<PatchGroup, PatchError> {
    let arr = v
        .as_array()
        .ok_or_else(|| PatchError::InvalidOp("patch group must be an array".into()))?;
    let ops: Result<Vec<_>, _> = arr.iter().map(op_from_json).collect();
    Ok(PatchGroup::new(ops?))
}

// ── Serialization ─────────────────────────────────────────────────────────

/// Encode one declarative operation into the external record shape.
pub fn op_to_json(decl: &DeclarativeOp) -> Value {
    let mut m = Map::new();
    m.insert("op".into(), json!(decl.op.as_str()));
    match &decl.target {
        Target::Pointer(path) => {
            m.insert("path".into(), json!(format_pointer(path)));
        }
        Target::Query { expr, suffix } => {
            m.insert("query".into(), json!(expr));
            m.insert("pointerSuffix".into(), json!(suffix));
        }
    }
    if let Some(from) = &decl.from {
        m.insert("from".into(), json!(format_pointer(from)));
    }
    if let Some(value) = &decl.value {
        m.insert("value".into(), value.clone());
    }
    Value::Object(m)
}

/// Encode a patch group as a JSON array of operation records.
pub fn group_to_json(group: &PatchGroup) -> Value {
    Value::Array(group.ops.iter().map(op_to_json).collect())
}
