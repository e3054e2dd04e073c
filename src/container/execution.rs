//! Leaf states that own outcomes and data ports but no children.

use crate::config::RuntimeConfig;
use crate::container::body::StateBody;
use crate::container::state::{sealed, State};
use crate::core::StateId;
use crate::validation::DefinitionRules;
use std::sync::Arc;

/// A state without children, executed by user logic.
///
/// The `with_*` methods configure the state before it is shared or added
/// to a container.
#[derive(Debug)]
pub struct ExecutionState {
    body: StateBody,
}

impl ExecutionState {
    pub fn new(name: &str) -> Self {
        Self {
            body: StateBody::new(name),
        }
    }

    pub fn with_id(mut self, id: StateId) -> Self {
        self.body.set_id(id);
        self
    }

    pub fn with_rules(mut self, rules: Arc<DefinitionRules>) -> Self {
        self.body.set_rules(rules);
        self
    }

    pub fn with_config(mut self, config: &RuntimeConfig) -> Self {
        self.body.apply_config(config);
        self
    }
}

impl sealed::HasBody for ExecutionState {
    fn body(&self) -> &StateBody {
        &self.body
    }
}

impl State for ExecutionState {}
