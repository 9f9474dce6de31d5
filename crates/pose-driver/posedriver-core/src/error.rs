//! Error types for pose driver operations

use serde::{Deserialize, Serialize};

/// Result type for pose driver operations
pub type Result<T> = core::result::Result<T, PoseDriverError>;

/// Errors raised by the pose driver registry and its entities.
///
/// Degenerate geometry (zero swing vectors, coincident poses, zero norms) is never an
/// error; those cases resolve to documented fallback values instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PoseDriverError {
    /// Group lookup by name or identifier failed
    #[error("Group not found: {name}")]
    GroupNotFound { name: String },

    /// Shape key lookup by name or identifier failed
    #[error("Shape key not found: {name}")]
    ShapeKeyNotFound { name: String },

    /// A group still has members bound to it
    #[error("Group {name} is not empty ({members} members)")]
    GroupNotEmpty { name: String, members: usize },

    /// The shape key already has a pose driver
    #[error("Shape key already driven: {name}")]
    AlreadyDriven { name: String },

    /// The reference (basis) key cannot be driven
    #[error("Reference key cannot be driven: {name}")]
    ReferenceKey { name: String },

    /// Wrong kind of entity passed where a specific kind is required
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Invalid value
    #[error("Invalid value: {reason}")]
    InvalidValue { reason: String },

    /// A compiled expression failed to parse or evaluate
    #[error("Expression error in '{expression}': {reason}")]
    Expression { expression: String, reason: String },

    /// Serialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl PoseDriverError {
    /// Get the error category for grouping similar errors
    pub fn category(&self) -> &'static str {
        match self {
            PoseDriverError::GroupNotFound { .. } | PoseDriverError::ShapeKeyNotFound { .. } => {
                "reference"
            }
            PoseDriverError::GroupNotEmpty { .. }
            | PoseDriverError::AlreadyDriven { .. }
            | PoseDriverError::ReferenceKey { .. } => "mutation",
            PoseDriverError::TypeMismatch { .. } => "type",
            PoseDriverError::InvalidValue { .. } => "validation",
            PoseDriverError::Expression { .. } => "expression",
            PoseDriverError::SerializationError { .. } => "serialization",
        }
    }

    /// Whether retrying after resolving a naming or membership conflict can succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PoseDriverError::GroupNotEmpty { .. } | PoseDriverError::AlreadyDriven { .. }
        )
    }
}

impl From<serde_json::Error> for PoseDriverError {
    fn from(err: serde_json::Error) -> Self {
        PoseDriverError::SerializationError {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_group_related_errors() {
        let missing = PoseDriverError::GroupNotFound {
            name: "Elbow".into(),
        };
        assert_eq!(missing.category(), "reference");
        let busy = PoseDriverError::GroupNotEmpty {
            name: "Elbow".into(),
            members: 2,
        };
        assert_eq!(busy.category(), "mutation");
        assert!(busy.is_recoverable());
        assert_eq!(busy.to_string(), "Group Elbow is not empty (2 members)");
    }
}
