//! Change notifications published by states.

use crate::container::ElementKind;
use crate::core::{DataType, ElementId, LinkId, StateId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What changed in a state.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum StateChange {
    Renamed { from: String, to: String },
    ElementAdded { id: ElementId, kind: ElementKind },
    ElementRemoved { id: ElementId, kind: ElementKind },
    ElementRenamed { id: ElementId, from: String, to: String },
    ElementRetyped { id: ElementId, data_type: DataType },
    DefaultChanged { id: ElementId },
    ChildAdded { child: StateId },
    ChildRemoved { child: StateId },
    TransitionAdded { link: LinkId },
    TransitionRemoved { link: LinkId },
    DataFlowAdded { link: LinkId },
    DataFlowRemoved { link: LinkId },
}

/// A change to one state, as seen by subscribers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateEvent {
    pub state: StateId,
    pub change: StateChange,
    pub at: DateTime<Utc>,
}
