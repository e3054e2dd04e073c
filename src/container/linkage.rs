//! Transitions and data flows between the states of a container.

use crate::core::{ElementId, LinkId, StateId};
use serde::{Deserialize, Serialize};

/// Where a transition leads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionTarget {
    /// A child state of the same container.
    State(StateId),
    /// One of the container's own outcomes.
    Outcome(ElementId),
}

/// Connects a child's outcome to a sibling or to a container outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub id: LinkId,
    pub from_state: StateId,
    pub from_outcome: ElementId,
    pub to: TransitionTarget,
}

impl Transition {
    pub fn references_state(&self, state: &StateId) -> bool {
        self.from_state == *state || self.to == TransitionTarget::State(state.clone())
    }
}

/// A port of a specific state.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    pub state: StateId,
    pub port: ElementId,
}

impl PortRef {
    pub fn new(state: &StateId, port: ElementId) -> Self {
        Self {
            state: state.clone(),
            port,
        }
    }
}

/// Moves data from one port to another inside a container.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFlow {
    pub id: LinkId,
    pub from: PortRef,
    pub to: PortRef,
}

impl DataFlow {
    pub fn references_state(&self, state: &StateId) -> bool {
        self.from.state == *state || self.to.state == *state
    }
}
