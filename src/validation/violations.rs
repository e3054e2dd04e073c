//! Individual validation problems.

use crate::container::ElementKind;
use crate::core::{DataType, ElementId, StateId};
use thiserror::Error;

/// A single problem found while validating a definition or linkage.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationIssue {
    #[error("Name must not be empty")]
    EmptyName,

    #[error("Name '{name}' has leading or trailing whitespace")]
    UntrimmedName { name: String },

    #[error("Name '{name}' exceeds {max} characters")]
    NameTooLong { name: String, max: usize },

    #[error("Name '{name}' is already used by {kind} {existing}")]
    DuplicateName {
        name: String,
        kind: ElementKind,
        existing: ElementId,
    },

    #[error("Unknown data type '{0}'")]
    UnknownType(String),

    #[error("Default '{literal}' is not a valid {data_type} literal")]
    InvalidDefault { literal: String, data_type: DataType },

    #[error("A {0} carries no data type")]
    Untyped(ElementKind),

    #[error("Element {id} is a {found}, expected {expected}")]
    WrongKind {
        id: ElementId,
        found: ElementKind,
        expected: String,
    },

    #[error("Outcome {outcome} of state {state} is already connected")]
    OutcomeConnected { state: StateId, outcome: ElementId },

    #[error("Cannot connect {from} data to {to} data")]
    TypeMismatch { from: DataType, to: DataType },

    #[error("Custom check failed: {message}")]
    CustomCheckFailed { message: String },
}

pub(crate) fn describe(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
