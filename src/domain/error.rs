//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::key::KeyKind;

/// Domain errors represent tree-rule violations.
/// These are independent of file formats and I/O.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid {kind} key '{value}': {reason}")]
    InvalidKey {
        kind: KeyKind,
        value: String,
        reason: String,
    },

    #[error("unknown key kind '{0}' (expected N, T or C)")]
    UnknownKeyKind(String),

    #[error("key already present in the tree: {0}")]
    DuplicateKey(String),

    #[error("key kind mismatch: tree holds {expected} keys, got a {found} key")]
    KeyKindMismatch { expected: KeyKind, found: KeyKind },

    #[error("key kind can only be changed while the tree is empty")]
    KeyKindLocked,

    #[error("invalid node index {index}: {reason}")]
    InvalidIndex { index: i64, reason: String },

    #[error("node {0} is referenced more than once (cycle or shared child)")]
    CycleDetected(usize),

    #[error("node {0} is not reachable from the root")]
    UnreachableNode(usize),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
