//! Domain error model.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Infrastructure concerns belong elsewhere.
///
/// Every ledger-mutating operation that returns one of these has left the
/// store untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", content = "detail", rename_all = "snake_case")]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input, zero quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced canonical record, location, or set instance is missing.
    #[error("not found: {0}")]
    NotFound(String),

    /// No alias exists for a foreign identifier.
    #[error("unresolved identifier: {0}")]
    Unresolved(String),

    /// A foreign identifier maps to conflicting canonical ids.
    #[error("ambiguous identifier: {0}")]
    Ambiguous(String),

    /// A move or part-out asked for more than is available or eligible.
    #[error("insufficient quantity: requested {requested}, available {available} ({detail})")]
    InsufficientQuantity {
        requested: i64,
        available: i64,
        detail: String,
    },

    /// The operation would break conservation or template capacity.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Delete/merge preconditions unmet (location still holds inventory or children).
    #[error("location not empty: {0}")]
    NonEmptyLocation(String),

    /// A batch with this fingerprint was already committed.
    #[error("batch already imported: {0}")]
    DuplicateImport(String),

    /// A uniqueness conflict (e.g. duplicate label among active siblings).
    #[error("conflict: {0}")]
    Conflict(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn unresolved(msg: impl Into<String>) -> Self {
        Self::Unresolved(msg.into())
    }

    pub fn ambiguous(msg: impl Into<String>) -> Self {
        Self::Ambiguous(msg.into())
    }

    pub fn insufficient(requested: i64, available: i64, detail: impl Into<String>) -> Self {
        Self::InsufficientQuantity {
            requested,
            available,
            detail: detail.into(),
        }
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn non_empty(msg: impl Into<String>) -> Self {
        Self::NonEmptyLocation(msg.into())
    }

    pub fn duplicate_import(fingerprint: impl Into<String>) -> Self {
        Self::DuplicateImport(fingerprint.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Stable machine-readable code, used by callers that map errors to
    /// transport responses.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation_error",
            DomainError::NotFound(_) => "not_found",
            DomainError::Unresolved(_) => "unresolved",
            DomainError::Ambiguous(_) => "ambiguous",
            DomainError::InsufficientQuantity { .. } => "insufficient_quantity",
            DomainError::InvariantViolation(_) => "invariant_violation",
            DomainError::NonEmptyLocation(_) => "non_empty_location",
            DomainError::DuplicateImport(_) => "duplicate_import",
            DomainError::Conflict(_) => "conflict",
            DomainError::InvalidId(_) => "invalid_id",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_quantity_message_carries_amounts() {
        let err = DomainError::insufficient(5, 4, "part-out 3001/5");
        assert_eq!(
            err.to_string(),
            "insufficient quantity: requested 5, available 4 (part-out 3001/5)"
        );
        assert_eq!(err.code(), "insufficient_quantity");
    }
}
