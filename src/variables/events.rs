//! Change notifications published by the global variable manager.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Kind of mutation that produced an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableOperation {
    Set,
    Delete,
    Lock,
    Unlock,
    SetLocked,
}

impl fmt::Display for VariableOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Set => "set",
            Self::Delete => "delete",
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::SetLocked => "set_locked",
        };
        f.write_str(name)
    }
}

/// A single change to the global variable store.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariableEvent {
    pub operation: VariableOperation,
    pub key: String,
    pub at: DateTime<Utc>,
}

impl VariableEvent {
    pub(crate) fn new(operation: VariableOperation, key: &str) -> Self {
        Self {
            operation,
            key: key.to_string(),
            at: Utc::now(),
        }
    }
}
