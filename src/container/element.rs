//! Outcomes, data ports and scoped variables.

use crate::core::{DataType, ElementId, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which collection of a state an element belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Outcome,
    InputPort,
    OutputPort,
    ScopedVariable,
}

impl ElementKind {
    /// Ports and scoped variables carry data; outcomes do not.
    pub fn carries_data(&self) -> bool {
        !matches!(self, Self::Outcome)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Outcome => "outcome",
            Self::InputPort => "input port",
            Self::OutputPort => "output port",
            Self::ScopedVariable => "scoped variable",
        };
        f.write_str(name)
    }
}

/// Value view of an outcome, port or scoped variable.
///
/// Elements handed out by a state are copies; editing one has no effect
/// on the state it came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub name: String,
    /// `None` for outcomes.
    pub data_type: Option<DataType>,
    pub default_value: Option<Value>,
}

impl Element {
    /// Default value rendered as an editable literal.
    pub fn default_literal(&self) -> Option<String> {
        self.default_value.as_ref().map(Value::to_literal)
    }
}
