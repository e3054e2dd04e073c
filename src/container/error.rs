//! Errors raised by state mutations.

use crate::core::{DataType, ElementId, LinkId, StateId};
use crate::validation::violations::{describe, ValidationIssue};
use thiserror::Error;

/// Errors that can occur when editing a state's elements or structure
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StateError {
    /// One or more definition or linkage problems
    #[error("Validation failed: {}", describe(.0))]
    Validation(Vec<ValidationIssue>),

    /// The existing default cannot be represented in the new type
    #[error("Cannot coerce default '{literal}' of element {id} to {target}")]
    TypeCoercion {
        id: ElementId,
        literal: String,
        target: DataType,
    },

    #[error("Element {0} not found")]
    NotFound(ElementId),

    #[error("State {0} not found")]
    StateNotFound(StateId),

    #[error("Link {0} not found")]
    LinkNotFound(LinkId),

    /// A transition or data flow still references the element
    #[error("Element {id} is referenced by {references} linkage(s)")]
    InUse { id: ElementId, references: usize },

    /// A transition or data flow still references the child state
    #[error("State {id} is referenced by {} linkage(s)", .links.len())]
    StateInUse { id: StateId, links: Vec<LinkId> },

    #[error("State {0} already exists in this container")]
    DuplicateState(StateId),
}

impl From<ValidationIssue> for StateError {
    fn from(issue: ValidationIssue) -> Self {
        Self::Validation(vec![issue])
    }
}
