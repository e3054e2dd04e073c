//! Builder for constructing container states.

use crate::builder::error::BuildError;
use crate::config::RuntimeConfig;
use crate::container::{ContainerState, ElementKind, State};
use crate::core::StateId;
use crate::validation::DefinitionRules;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
enum Definition {
    Outcome(String),
    Typed {
        kind: ElementKind,
        name: String,
        data_type: String,
        default: Option<String>,
    },
}

/// Builder for constructing container states with a fluent API.
///
/// # Example
///
/// ```rust
/// use hierstate::builder::ContainerStateBuilder;
/// use hierstate::container::{ExecutionState, State};
///
/// let container = ContainerStateBuilder::new("pick_and_place")
///     .outcome("success")
///     .outcome("failure")
///     .input_port("object", "str", None)
///     .scoped_variable("attempts", "int", Some("0"))
///     .child(ExecutionState::new("grasp"))
///     .build()
///     .unwrap();
///
/// assert_eq!(container.outcomes().len(), 2);
/// assert_eq!(container.scoped_variables().len(), 1);
/// assert_eq!(container.children().len(), 1);
/// ```
#[derive(Debug)]
pub struct ContainerStateBuilder {
    name: String,
    id: Option<StateId>,
    rules: Option<Arc<DefinitionRules>>,
    config: Option<RuntimeConfig>,
    definitions: Vec<Definition>,
    children: Vec<Arc<dyn State>>,
}

impl ContainerStateBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            rules: None,
            config: None,
            definitions: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Use an explicit id instead of a generated one.
    pub fn id(mut self, id: impl Into<StateId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Validate every definition with these rules.
    pub fn rules(mut self, rules: DefinitionRules) -> Self {
        self.rules = Some(Arc::new(rules));
        self
    }

    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn outcome(mut self, name: impl Into<String>) -> Self {
        self.definitions.push(Definition::Outcome(name.into()));
        self
    }

    pub fn input_port(self, name: impl Into<String>, data_type: &str, default: Option<&str>) -> Self {
        self.typed(ElementKind::InputPort, name.into(), data_type, default)
    }

    pub fn output_port(self, name: impl Into<String>, data_type: &str, default: Option<&str>) -> Self {
        self.typed(ElementKind::OutputPort, name.into(), data_type, default)
    }

    pub fn scoped_variable(
        self,
        name: impl Into<String>,
        data_type: &str,
        default: Option<&str>,
    ) -> Self {
        self.typed(ElementKind::ScopedVariable, name.into(), data_type, default)
    }

    pub fn child(mut self, state: impl State + 'static) -> Self {
        self.children.push(Arc::new(state));
        self
    }

    /// Build the container.
    /// Returns the error of the first definition that is rejected.
    pub fn build(self) -> Result<ContainerState, BuildError> {
        if self.name.trim().is_empty() {
            return Err(BuildError::MissingName);
        }

        let mut container = ContainerState::new(&self.name);
        if let Some(id) = self.id {
            container = container.with_id(id);
        }
        if let Some(rules) = self.rules {
            container = container.with_rules(rules);
        }
        if let Some(config) = &self.config {
            config.validate()?;
            container = container.with_config(config);
        }

        for definition in &self.definitions {
            match definition {
                Definition::Outcome(name) => {
                    container.add_outcome(name)?;
                }
                Definition::Typed {
                    kind,
                    name,
                    data_type,
                    default,
                } => {
                    let default = default.as_deref();
                    match kind {
                        ElementKind::InputPort => container.add_input_port(name, data_type, default)?,
                        ElementKind::OutputPort => {
                            container.add_output_port(name, data_type, default)?
                        }
                        ElementKind::ScopedVariable => {
                            container.add_scoped_variable(name, data_type, default)?
                        }
                        ElementKind::Outcome => container.add_outcome(name)?,
                    };
                }
            }
        }
        for child in self.children {
            container.attach(child)?;
        }

        debug!(
            state = %container.state_id(),
            name = %self.name,
            elements = self.definitions.len(),
            "Container built"
        );
        Ok(container)
    }

    fn typed(mut self, kind: ElementKind, name: String, data_type: &str, default: Option<&str>) -> Self {
        self.definitions.push(Definition::Typed {
            kind,
            name,
            data_type: data_type.to_string(),
            default: default.map(str::to_string),
        });
        self
    }
}
