//! Concrete operation application (RFC 6902 semantics).
//!
//! Operations run strictly in sequence order. [`apply_group`] implements the
//! group-level partial-failure rule: the first failing operation truncates
//! the remainder of the group, edits already made stay committed, and no
//! rollback is attempted.

use serde_json::Value;

use json_graft_json_pointer::{get, get_mut};

use super::types::{ConcreteOp, GroupOutcome, PatchError};

// ── Path navigation ───────────────────────────────────────────────────────

fn get_mut_at<'a>(doc: &'a mut Value, path: &[String]) -> Result<&'a mut Value, PatchError> {
    get_mut(doc, path).ok_or(PatchError::NotFound)
}

fn parse_index(token: &str) -> Result<usize, PatchError> {
    if !json_graft_json_pointer::is_valid_index(token) {
        return Err(PatchError::InvalidIndex);
    }
    token.parse().map_err(|_| PatchError::InvalidIndex)
}

// ── Individual operation applicators ──────────────────────────────────────

/// `add`: upsert for object keys, insert-and-shift for array indices.
/// Index == length and the `-` token both append.
fn apply_add(doc: &mut Value, path: &[String], value: Value) -> Result<(), PatchError> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent_path, token) = path.split_at(path.len() - 1);
    let token = &token[0];
    let parent = get_mut_at(doc, parent_path)?;
    match parent {
        Value::Object(map) => {
            map.insert(token.clone(), value);
            Ok(())
        }
        Value::Array(arr) => {
            if token == "-" {
                arr.push(value);
                return Ok(());
            }
            let idx = parse_index(token)?;
            if idx > arr.len() {
                return Err(PatchError::InvalidIndex);
            }
            arr.insert(idx, value);
            Ok(())
        }
        _ => Err(PatchError::InvalidTarget),
    }
}

/// `remove`: deletes the target; array elements after it shift left.
fn apply_remove(doc: &mut Value, path: &[String]) -> Result<Value, PatchError> {
    if path.is_empty() {
        return Err(PatchError::InvalidTarget);
    }
    let (parent_path, token) = path.split_at(path.len() - 1);
    let token = &token[0];
    let parent = get_mut_at(doc, parent_path)?;
    match parent {
        Value::Object(map) => map.shift_remove(token).ok_or(PatchError::NotFound),
        Value::Array(arr) => {
            let idx = parse_index(token)?;
            if idx >= arr.len() {
                return Err(PatchError::InvalidIndex);
            }
            Ok(arr.remove(idx))
        }
        _ => Err(PatchError::InvalidTarget),
    }
}

/// `replace`: overwrites an existing target.
fn apply_replace(doc: &mut Value, path: &[String], value: Value) -> Result<(), PatchError> {
    if path.is_empty() {
        *doc = value;
        return Ok(());
    }
    let (parent_path, token) = path.split_at(path.len() - 1);
    let token = &token[0];
    let parent = get_mut_at(doc, parent_path)?;
    match parent {
        Value::Object(map) => match map.get_mut(token) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(PatchError::NotFound),
        },
        Value::Array(arr) => {
            let idx = parse_index(token)?;
            if idx >= arr.len() {
                return Err(PatchError::InvalidIndex);
            }
            arr[idx] = value;
            Ok(())
        }
        _ => Err(PatchError::InvalidTarget),
    }
}

/// `move`: remove at `from`, then add at `path`. Compound and atomic for
/// failure-reporting purposes.
fn apply_move(doc: &mut Value, path: &[String], from: &[String]) -> Result<(), PatchError> {
    // A location cannot be moved into its own subtree
    if path.len() > from.len() && path[..from.len()] == from[..] {
        return Err(PatchError::InvalidTarget);
    }
    let value = apply_remove(doc, from)?;
    apply_add(doc, path, value)
}

/// `copy`: add at `path` using an independent snapshot of the value at
/// `from` (no aliasing).
fn apply_copy(doc: &mut Value, path: &[String], from: &[String]) -> Result<(), PatchError> {
    let snapshot = get(doc, from).ok_or(PatchError::NotFound)?.clone();
    apply_add(doc, path, snapshot)
}

/// `test`: structural equality check; never mutates.
fn apply_test(doc: &Value, path: &[String], value: &Value) -> Result<(), PatchError> {
    let actual = get(doc, path).ok_or(PatchError::NotFound)?;
    if actual == value {
        Ok(())
    } else {
        Err(PatchError::Test)
    }
}

// ── Group application ─────────────────────────────────────────────────────

/// Apply a single concrete operation, mutating `doc` in place.
pub fn apply_op(doc: &mut Value, op: &ConcreteOp) -> Result<(), PatchError> {
    match op {
        ConcreteOp::Add { path, value } => apply_add(doc, path, value.clone()),
        ConcreteOp::Remove { path } => apply_remove(doc, path).map(|_| ()),
        ConcreteOp::Replace { path, value } => apply_replace(doc, path, value.clone()),
        ConcreteOp::Move { path, from } => apply_move(doc, path, from),
        ConcreteOp::Copy { path, from } => apply_copy(doc, path, from),
        ConcreteOp::Test { path, value } => apply_test(doc, path, value),
    }
}

/// Apply a group's flattened concrete sequence left-to-right.
///
/// On the first failure the outcome records how many operations committed
/// and why the group stopped; the document keeps all prior edits.
pub fn apply_group(doc: &mut Value, ops: &[ConcreteOp]) -> GroupOutcome {
    for (i, op) in ops.iter().enumerate() {
        if let Err(error) = apply_op(doc, op) {
            return GroupOutcome::Truncated { applied: i, error };
        }
    }
    GroupOutcome::Applied { count: ops.len() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use json_graft_json_pointer::parse_pointer;
    use serde_json::json;

    fn p(s: &str) -> Vec<String> {
        parse_pointer(s)
    }

    #[test]
    fn add_to_object_is_upsert() {
        let mut doc = json!({"a": 1, "b": 2});
        apply_op(
            &mut doc,
            &ConcreteOp::Add {
                path: p("/a"),
                value: json!(9),
            },
        )
        .unwrap();
        // Existing key overwritten, key order untouched
        assert_eq!(
            serde_json::to_string(&doc).unwrap(),
            r#"{"a":9,"b":2}"#
        );
    }

    #[test]
    fn add_to_array_inserts_and_shifts() {
        let mut doc = json!([1, 2, 3]);
        apply_op(
            &mut doc,
            &ConcreteOp::Add {
                path: p("/1"),
                value: json!(99),
            },
        )
        .unwrap();
        assert_eq!(doc, json!([1, 99, 2, 3]));
    }

    #[test]
    fn add_at_length_appends() {
        let mut doc = json!([1, 2]);
        apply_op(
            &mut doc,
            &ConcreteOp::Add {
                path: p("/2"),
                value: json!(3),
            },
        )
        .unwrap();
        assert_eq!(doc, json!([1, 2, 3]));
    }

    #[test]
    fn add_append_token() {
        let mut doc = json!({"tags": ["a"]});
        apply_op(
            &mut doc,
            &ConcreteOp::Add {
                path: p("/tags/-"),
                value: json!("b"),
            },
        )
        .unwrap();
        assert_eq!(doc, json!({"tags": ["a", "b"]}));
    }

    #[test]
    fn add_past_length_fails() {
        let mut doc = json!([1]);
        let result = apply_op(
            &mut doc,
            &ConcreteOp::Add {
                path: p("/5"),
                value: json!(0),
            },
        );
        assert_eq!(result, Err(PatchError::InvalidIndex));
    }

    #[test]
    fn add_at_root_replaces_document() {
        let mut doc = json!({"a": 1});
        apply_op(
            &mut doc,
            &ConcreteOp::Add {
                path: p(""),
                value: json!([1]),
            },
        )
        .unwrap();
        assert_eq!(doc, json!([1]));
    }

    #[test]
    fn remove_from_array_shifts_left() {
        let mut doc = json!([1, 2, 3]);
        apply_op(&mut doc, &ConcreteOp::Remove { path: p("/1") }).unwrap();
        assert_eq!(doc, json!([1, 3]));
    }

    #[test]
    fn remove_missing_key_fails() {
        let mut doc = json!({"a": 1});
        let result = apply_op(&mut doc, &ConcreteOp::Remove { path: p("/b") });
        assert_eq!(result, Err(PatchError::NotFound));
    }

    #[test]
    fn replace_requires_existing_target() {
        let mut doc = json!({"a": 1});
        let result = apply_op(
            &mut doc,
            &ConcreteOp::Replace {
                path: p("/b"),
                value: json!(2),
            },
        );
        assert_eq!(result, Err(PatchError::NotFound));
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn replace_indexing_into_scalar_fails() {
        let mut doc = json!({"a": 1});
        let result = apply_op(
            &mut doc,
            &ConcreteOp::Replace {
                path: p("/a/b/c"),
                value: json!(2),
            },
        );
        assert_eq!(result, Err(PatchError::NotFound));
    }

    #[test]
    fn move_between_keys() {
        let mut doc = json!({"a": 1, "b": 2});
        apply_op(
            &mut doc,
            &ConcreteOp::Move {
                path: p("/c"),
                from: p("/a"),
            },
        )
        .unwrap();
        assert_eq!(doc, json!({"b": 2, "c": 1}));
    }

    #[test]
    fn move_into_own_subtree_fails() {
        let mut doc = json!({"a": {"b": 1}});
        let result = apply_op(
            &mut doc,
            &ConcreteOp::Move {
                path: p("/a/c"),
                from: p("/a"),
            },
        );
        assert_eq!(result, Err(PatchError::InvalidTarget));
    }

    #[test]
    fn copy_takes_independent_snapshot() {
        let mut doc = json!({"src": {"x": 1}, "dst": {}});
        apply_op(
            &mut doc,
            &ConcreteOp::Copy {
                path: p("/dst/y"),
                from: p("/src"),
            },
        )
        .unwrap();
        // Mutating the copy must not touch the source
        apply_op(
            &mut doc,
            &ConcreteOp::Replace {
                path: p("/dst/y/x"),
                value: json!(2),
            },
        )
        .unwrap();
        assert_eq!(doc["src"]["x"], json!(1));
        assert_eq!(doc["dst"]["y"]["x"], json!(2));
    }

    #[test]
    fn test_op_does_not_mutate() {
        let mut doc = json!({"a": 42});
        apply_op(
            &mut doc,
            &ConcreteOp::Test {
                path: p("/a"),
                value: json!(42),
            },
        )
        .unwrap();
        assert_eq!(doc, json!({"a": 42}));

        let result = apply_op(
            &mut doc,
            &ConcreteOp::Test {
                path: p("/a"),
                value: json!(99),
            },
        );
        assert_eq!(result, Err(PatchError::Test));
    }

    #[test]
    fn group_applies_fully() {
        let mut doc = json!({"a": 1});
        let outcome = apply_group(
            &mut doc,
            &[
                ConcreteOp::Add {
                    path: p("/b"),
                    value: json!(2),
                },
                ConcreteOp::Replace {
                    path: p("/a"),
                    value: json!(10),
                },
            ],
        );
        assert_eq!(outcome, GroupOutcome::Applied { count: 2 });
        assert_eq!(doc, json!({"a": 10, "b": 2}));
    }

    #[test]
    fn group_truncates_at_first_failure_keeping_prior_edits() {
        let mut doc = json!({"hp": 100});
        let outcome = apply_group(
            &mut doc,
            &[
                ConcreteOp::Replace {
                    path: p("/hp"),
                    value: json!(150),
                },
                ConcreteOp::Replace {
                    path: p("/mp"),
                    value: json!(5),
                },
                ConcreteOp::Add {
                    path: p("/never"),
                    value: json!(1),
                },
            ],
        );
        assert_eq!(
            outcome,
            GroupOutcome::Truncated {
                applied: 1,
                error: PatchError::NotFound,
            }
        );
        // First edit committed, failing and subsequent ops absent
        assert_eq!(doc, json!({"hp": 150}));
    }

    #[test]
    fn test_mismatch_truncates_remainder_only() {
        let mut doc = json!({"a": 1, "b": 2});
        let outcome = apply_group(
            &mut doc,
            &[
                ConcreteOp::Test {
                    path: p("/a"),
                    value: json!(0),
                },
                ConcreteOp::Remove { path: p("/b") },
            ],
        );
        assert!(outcome.is_truncated());
        assert_eq!(doc, json!({"a": 1, "b": 2}));
    }
}
