//! Core types for the patch engine.

use serde_json::Value;
use thiserror::Error;

pub use json_graft_json_pointer::Path;

// ── Error ─────────────────────────────────────────────────────────────────

/// Failure of a single concrete operation during application.
///
/// All kinds are treated identically at the group level: the group stops at
/// the failing operation. The distinct kinds are retained for diagnostics.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PatchError {
    /// Target token absent (replace/remove/test, or a move/copy source).
    #[error("NOT_FOUND")]
    NotFound,
    /// `test` value mismatch.
    #[error("TEST")]
    Test,
    /// Array index out of range, or not a valid index token at all.
    #[error("INVALID_INDEX")]
    InvalidIndex,
    /// Indexing into a scalar, or an otherwise impossible target.
    #[error("INVALID_TARGET")]
    InvalidTarget,
    /// Structurally malformed operation record.
    #[error("INVALID_OP: {0}")]
    InvalidOp(String),
}

// ── Operation kinds ───────────────────────────────────────────────────────

/// The six RFC 6902 operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Add => "add",
            OpKind::Remove => "remove",
            OpKind::Replace => "replace",
            OpKind::Move => "move",
            OpKind::Copy => "copy",
            OpKind::Test => "test",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, PatchError> {
        match s {
            "add" => Ok(OpKind::Add),
            "remove" => Ok(OpKind::Remove),
            "replace" => Ok(OpKind::Replace),
            "move" => Ok(OpKind::Move),
            "copy" => Ok(OpKind::Copy),
            "test" => Ok(OpKind::Test),
            other => Err(PatchError::InvalidOp(format!("unknown op: {other}"))),
        }
    }

    /// Kinds whose records must carry a `value` payload.
    pub fn requires_value(&self) -> bool {
        matches!(self, OpKind::Add | OpKind::Replace | OpKind::Test)
    }

    /// Kinds whose records must carry a `from` pointer.
    pub fn requires_from(&self) -> bool {
        matches!(self, OpKind::Move | OpKind::Copy)
    }
}

// ── Declarative operations ────────────────────────────────────────────────

/// How a declarative operation addresses its target. Exactly one mode per
/// operation; the external record fields `path` and `pointer` both decode to
/// [`Target::Pointer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// A pre-formed pointer.
    Pointer(Path),
    /// A query expression plus a pointer fragment appended to each match.
    /// A leading `@` on the suffix marks it as relative to the match.
    Query { expr: String, suffix: String },
}

/// One requested edit. May resolve to zero, one, or many concrete edits
/// depending on the addressing mode.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarativeOp {
    pub op: OpKind,
    pub target: Target,
    /// Source pointer for move/copy.
    pub from: Option<Path>,
    /// Payload for add/replace/test.
    pub value: Option<Value>,
}

/// One atomic-intent batch of declarative operations (e.g. one mod's
/// contribution). Groups are applied in caller order and are independent of
/// each other's failures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchGroup {
    pub ops: Vec<DeclarativeOp>,
}

impl PatchGroup {
    pub fn new(ops: Vec<DeclarativeOp>) -> Self {
        Self { ops }
    }
}

// ── Concrete operations ───────────────────────────────────────────────────

/// A fully resolved, pointer-addressed edit. Produced only by the expander;
/// never carries a query.
#[derive(Debug, Clone, PartialEq)]
pub enum ConcreteOp {
    Add { path: Path, value: Value },
    Remove { path: Path },
    Replace { path: Path, value: Value },
    Move { path: Path, from: Path },
    Copy { path: Path, from: Path },
    Test { path: Path, value: Value },
}

impl ConcreteOp {
    pub fn kind(&self) -> OpKind {
        match self {
            ConcreteOp::Add { .. } => OpKind::Add,
            ConcreteOp::Remove { .. } => OpKind::Remove,
            ConcreteOp::Replace { .. } => OpKind::Replace,
            ConcreteOp::Move { .. } => OpKind::Move,
            ConcreteOp::Copy { .. } => OpKind::Copy,
            ConcreteOp::Test { .. } => OpKind::Test,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ConcreteOp::Add { path, .. } => path,
            ConcreteOp::Remove { path } => path,
            ConcreteOp::Replace { path, .. } => path,
            ConcreteOp::Move { path, .. } => path,
            ConcreteOp::Copy { path, .. } => path,
            ConcreteOp::Test { path, .. } => path,
        }
    }
}

// ── Group outcome ─────────────────────────────────────────────────────────

/// Result of applying one group's concrete sequence. Truncation is not an
/// error at the call level; prior edits stay committed.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupOutcome {
    /// Every operation applied.
    Applied { count: usize },
    /// Operation `applied` failed; operations `0..applied` are committed and
    /// the rest of the group was abandoned.
    Truncated { applied: usize, error: PatchError },
}

impl GroupOutcome {
    pub fn is_truncated(&self) -> bool {
        matches!(self, GroupOutcome::Truncated { .. })
    }
}
