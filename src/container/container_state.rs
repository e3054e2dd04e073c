//! Container states: children, scoped variables and the linkages between
//! them.

use crate::config::RuntimeConfig;
use crate::container::body::StateBody;
use crate::container::element::{Element, ElementKind};
use crate::container::error::StateError;
use crate::container::events::StateChange;
use crate::container::linkage::{DataFlow, PortRef, Transition, TransitionTarget};
use crate::container::state::sealed::HasBody;
use crate::container::state::State;
use crate::core::{ElementId, IdCounter, LinkId, StateId};
use crate::validation::{DefinitionRules, ValidationIssue};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

const OWN_SOURCES: &[ElementKind] = &[ElementKind::InputPort, ElementKind::ScopedVariable];
const OWN_TARGETS: &[ElementKind] = &[ElementKind::OutputPort, ElementKind::ScopedVariable];
const CHILD_SOURCES: &[ElementKind] = &[ElementKind::OutputPort];
const CHILD_TARGETS: &[ElementKind] = &[ElementKind::InputPort];
const OUTCOMES: &[ElementKind] = &[ElementKind::Outcome];

#[derive(Debug, Default)]
struct Structure {
    children: Vec<Arc<dyn State>>,
    transitions: BTreeMap<LinkId, Transition>,
    data_flows: BTreeMap<LinkId, DataFlow>,
    links: IdCounter,
}

impl Structure {
    fn child(&self, id: &StateId) -> Result<Arc<dyn State>, StateError> {
        self.children
            .iter()
            .find(|child| child.state_id() == *id)
            .cloned()
            .ok_or_else(|| StateError::StateNotFound(id.clone()))
    }

    fn links_to(&self, id: &StateId) -> Vec<LinkId> {
        self.transitions
            .values()
            .filter(|t| t.references_state(id))
            .map(|t| t.id)
            .chain(
                self.data_flows
                    .values()
                    .filter(|f| f.references_state(id))
                    .map(|f| f.id),
            )
            .collect()
    }
}

/// A state that owns child states, scoped variables, and the transitions
/// and data flows connecting them.
///
/// Linkages pin the elements they reference: removing a referenced port,
/// outcome or scoped variable fails with [`StateError::InUse`], and
/// removing a referenced child fails with [`StateError::StateInUse`],
/// until the linkage is removed first.
///
/// # Example
///
/// ```rust
/// use hierstate::container::{ContainerState, ExecutionState, PortRef, State, TransitionTarget};
///
/// let root = ContainerState::new("root");
/// let finished = root.add_outcome("finished").unwrap();
/// let goal = root.add_scoped_variable("goal", "int", Some("3")).unwrap();
///
/// let worker = ExecutionState::new("worker");
/// let done = worker.add_outcome("done").unwrap();
/// let input = worker.add_input_port("goal", "int", None).unwrap();
/// let worker_id = root.add_state(worker).unwrap();
///
/// root.add_transition(&worker_id, done, TransitionTarget::Outcome(finished)).unwrap();
/// let flow = root
///     .add_data_flow(PortRef::new(&root.state_id(), goal), PortRef::new(&worker_id, input))
///     .unwrap();
///
/// assert!(root.remove(goal).is_err());
/// root.remove_data_flow(flow).unwrap();
/// assert!(root.remove(goal).is_ok());
/// ```
#[derive(Debug)]
pub struct ContainerState {
    body: StateBody,
    structure: Mutex<Structure>,
}

impl ContainerState {
    pub fn new(name: &str) -> Self {
        Self {
            body: StateBody::new(name),
            structure: Mutex::new(Structure::default()),
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

    pub fn add_scoped_variable(
        &self,
        name: &str,
        data_type: &str,
        default: Option<&str>,
    ) -> Result<ElementId, StateError> {
        self.body
            .add(ElementKind::ScopedVariable, name, Some((data_type, default)))
    }

    pub fn scoped_variables(&self) -> Vec<Element> {
        self.body.of_kind(ElementKind::ScopedVariable)
    }

    /// Add a child state. Its id must differ from this container's id and
    /// from every existing child's id.
    pub fn add_state(&self, state: impl State + 'static) -> Result<StateId, StateError> {
        self.attach(Arc::new(state))
    }

    /// Add an already shared child state.
    pub fn attach(&self, state: Arc<dyn State>) -> Result<StateId, StateError> {
        let child_id = state.state_id();
        let mut structure = self.structure.lock();
        if child_id == *self.body.id() || structure.child(&child_id).is_ok() {
            return Err(StateError::DuplicateState(child_id));
        }
        structure.children.push(state);

        debug!(state = %self.body.id(), child = %child_id, "Child state added");
        self.body.publish(StateChange::ChildAdded {
            child: child_id.clone(),
        });
        Ok(child_id)
    }

    /// Remove a child state that no transition or data flow references.
    pub fn remove_state(&self, id: &StateId) -> Result<Arc<dyn State>, StateError> {
        let mut structure = self.structure.lock();
        let position = structure
            .children
            .iter()
            .position(|child| child.state_id() == *id)
            .ok_or_else(|| StateError::StateNotFound(id.clone()))?;

        let links = structure.links_to(id);
        if !links.is_empty() {
            return Err(StateError::StateInUse {
                id: id.clone(),
                links,
            });
        }
        let child = structure.children.remove(position);

        debug!(state = %self.body.id(), child = %id, "Child state removed");
        self.body
            .publish(StateChange::ChildRemoved { child: id.clone() });
        Ok(child)
    }

    /// Shared handle to a child state.
    pub fn child(&self, id: &StateId) -> Result<Arc<dyn State>, StateError> {
        self.structure.lock().child(id)
    }

    /// Child states in insertion order.
    pub fn children(&self) -> Vec<Arc<dyn State>> {
        self.structure.lock().children.clone()
    }

    pub fn child_ids(&self) -> Vec<StateId> {
        self.structure
            .lock()
            .children
            .iter()
            .map(|child| child.state_id())
            .collect()
    }

    /// Connect a child's outcome to a sibling state or to one of this
    /// container's outcomes. Each outcome has at most one transition.
    pub fn add_transition(
        &self,
        from_state: &StateId,
        from_outcome: ElementId,
        to: TransitionTarget,
    ) -> Result<LinkId, StateError> {
        let mut structure = self.structure.lock();
        let source = structure.child(from_state)?;
        if structure
            .transitions
            .values()
            .any(|t| t.from_state == *from_state && t.from_outcome == from_outcome)
        {
            return Err(ValidationIssue::OutcomeConnected {
                state: from_state.clone(),
                outcome: from_outcome,
            }
            .into());
        }
        if let TransitionTarget::State(target) = &to {
            structure.child(target)?;
        }

        source.body().retain(from_outcome, OUTCOMES)?;
        if let TransitionTarget::Outcome(target) = &to {
            if let Err(error) = self.body.retain(*target, OUTCOMES) {
                source.body().release(from_outcome);
                return Err(error);
            }
        }

        let id = structure.links.next_link();
        structure.transitions.insert(
            id,
            Transition {
                id,
                from_state: from_state.clone(),
                from_outcome,
                to,
            },
        );

        debug!(state = %self.body.id(), link = %id, from = %from_state, "Transition added");
        self.body.publish(StateChange::TransitionAdded { link: id });
        Ok(id)
    }

    pub fn remove_transition(&self, id: LinkId) -> Result<Transition, StateError> {
        let mut structure = self.structure.lock();
        let transition = structure
            .transitions
            .remove(&id)
            .ok_or(StateError::LinkNotFound(id))?;

        if let Ok(source) = structure.child(&transition.from_state) {
            source.body().release(transition.from_outcome);
        }
        if let TransitionTarget::Outcome(target) = transition.to {
            self.body.release(target);
        }

        debug!(state = %self.body.id(), link = %id, "Transition removed");
        self.body.publish(StateChange::TransitionRemoved { link: id });
        Ok(transition)
    }

    pub fn transitions(&self) -> Vec<Transition> {
        self.structure.lock().transitions.values().cloned().collect()
    }

    /// Connect two ports with compatible data types.
    ///
    /// Sources are this container's input ports and scoped variables or a
    /// child's output ports. Targets are this container's output ports and
    /// scoped variables or a child's input ports.
    pub fn add_data_flow(&self, from: PortRef, to: PortRef) -> Result<LinkId, StateError> {
        let mut structure = self.structure.lock();

        let source = self.retain_port(&structure, &from, OWN_SOURCES, CHILD_SOURCES)?;
        let target = match self.retain_port(&structure, &to, OWN_TARGETS, CHILD_TARGETS) {
            Ok(target) => target,
            Err(error) => {
                self.release_port(&structure, &from);
                return Err(error);
            }
        };

        if let (Some(from_type), Some(to_type)) = (source.data_type, target.data_type) {
            if !from_type.is_compatible_with(to_type) {
                self.release_port(&structure, &from);
                self.release_port(&structure, &to);
                return Err(ValidationIssue::TypeMismatch {
                    from: from_type,
                    to: to_type,
                }
                .into());
            }
        }

        let id = structure.links.next_link();
        structure
            .data_flows
            .insert(id, DataFlow { id, from, to });

        debug!(state = %self.body.id(), link = %id, "Data flow added");
        self.body.publish(StateChange::DataFlowAdded { link: id });
        Ok(id)
    }

    pub fn remove_data_flow(&self, id: LinkId) -> Result<DataFlow, StateError> {
        let mut structure = self.structure.lock();
        let flow = structure
            .data_flows
            .remove(&id)
            .ok_or(StateError::LinkNotFound(id))?;

        self.release_port(&structure, &flow.from);
        self.release_port(&structure, &flow.to);

        debug!(state = %self.body.id(), link = %id, "Data flow removed");
        self.body.publish(StateChange::DataFlowRemoved { link: id });
        Ok(flow)
    }

    pub fn data_flows(&self) -> Vec<DataFlow> {
        self.structure.lock().data_flows.values().cloned().collect()
    }

    fn retain_port(
        &self,
        structure: &Structure,
        port: &PortRef,
        own: &[ElementKind],
        child: &[ElementKind],
    ) -> Result<Element, StateError> {
        if port.state == *self.body.id() {
            self.body.retain(port.port, own)
        } else {
            structure.child(&port.state)?.body().retain(port.port, child)
        }
    }

    fn release_port(&self, structure: &Structure, port: &PortRef) {
        if port.state == *self.body.id() {
            self.body.release(port.port);
        } else if let Ok(child) = structure.child(&port.state) {
            child.body().release(port.port);
        }
    }
}

impl HasBody for ContainerState {
    fn body(&self) -> &StateBody {
        &self.body
    }
}

impl State for ContainerState {
    fn is_container(&self) -> bool {
        true
    }

    fn as_container(&self) -> Option<&ContainerState> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ExecutionState;
    use crate::core::{DataType, Value};

    fn worker(name: &str) -> ExecutionState {
        let state = ExecutionState::new(name);
        state.add_outcome("done").unwrap();
        state.add_input_port("in", "int", None).unwrap();
        state.add_output_port("out", "int", None).unwrap();
        state
    }

    fn element_id(state: &dyn State, name: &str) -> ElementId {
        state
            .elements()
            .into_iter()
            .find(|e| e.name == name)
            .map(|e| e.id)
            .unwrap()
    }

    #[test]
    fn scoped_variables_get_distinct_ids() {
        let container = ContainerState::new("c");
        let x = container.add_scoped_variable("x", "int", None).unwrap();
        let y = container.add_scoped_variable("y", "int", None).unwrap();
        assert_ne!(x, y);

        container.remove(y).unwrap();
        let again = container.add_scoped_variable("y", "int", None).unwrap();
        assert_ne!(again, y);
        assert_eq!(container.scoped_variables().len(), 2);
    }

    #[test]
    fn retype_scoped_variable() {
        let container = ContainerState::new("c");
        let five = container.add_scoped_variable("five", "int", Some("5")).unwrap();
        let word = container.add_scoped_variable("word", "str", Some("abc")).unwrap();

        let retyped = container.retype(five, "string").unwrap();
        assert_eq!(retyped.data_type, Some(DataType::Str));
        assert_eq!(retyped.default_value, Some(Value::Str("5".into())));

        assert!(matches!(
            container.retype(word, "int"),
            Err(StateError::TypeCoercion { .. })
        ));
    }

    #[test]
    fn duplicate_child_ids_are_rejected() {
        let container = ContainerState::new("c").with_id(StateId::new("ROOT"));
        container
            .add_state(ExecutionState::new("a").with_id(StateId::new("A")))
            .unwrap();

        assert_eq!(
            container.add_state(ExecutionState::new("b").with_id(StateId::new("A"))),
            Err(StateError::DuplicateState(StateId::new("A")))
        );
        assert_eq!(
            container.add_state(ExecutionState::new("c").with_id(StateId::new("ROOT"))),
            Err(StateError::DuplicateState(StateId::new("ROOT")))
        );
        assert_eq!(container.child_ids(), vec![StateId::new("A")]);
    }

    #[test]
    fn transition_pins_outcomes() {
        let container = ContainerState::new("c");
        let finished = container.add_outcome("finished").unwrap();
        let a = container.add_state(worker("a")).unwrap();
        let child = container.child(&a).unwrap();
        let done = element_id(child.as_ref(), "done");

        let link = container
            .add_transition(&a, done, TransitionTarget::Outcome(finished))
            .unwrap();

        assert_eq!(
            container.remove(finished),
            Err(StateError::InUse {
                id: finished,
                references: 1
            })
        );
        assert!(matches!(child.remove(done), Err(StateError::InUse { .. })));
        assert!(matches!(
            container.remove_state(&a),
            Err(StateError::StateInUse { .. })
        ));

        let removed = container.remove_transition(link).unwrap();
        assert_eq!(removed.from_outcome, done);
        assert!(container.remove(finished).is_ok());
        assert!(child.remove(done).is_ok());
        assert!(container.remove_state(&a).is_ok());
        assert!(container.children().is_empty());
    }

    #[test]
    fn outcome_has_single_transition() {
        let container = ContainerState::new("c");
        let a = container.add_state(worker("a")).unwrap();
        let b = container.add_state(worker("b")).unwrap();
        let done = element_id(container.child(&a).unwrap().as_ref(), "done");

        container
            .add_transition(&a, done, TransitionTarget::State(b.clone()))
            .unwrap();
        assert!(matches!(
            container.add_transition(&a, done, TransitionTarget::State(b)),
            Err(StateError::Validation(_))
        ));
        assert_eq!(container.transitions().len(), 1);
    }

    #[test]
    fn transition_endpoints_must_exist_and_be_outcomes() {
        let container = ContainerState::new("c");
        let a = container.add_state(worker("a")).unwrap();
        let child = container.child(&a).unwrap();
        let done = element_id(child.as_ref(), "done");
        let input = element_id(child.as_ref(), "in");

        assert!(matches!(
            container.add_transition(&StateId::new("nope"), done, TransitionTarget::State(a.clone())),
            Err(StateError::StateNotFound(_))
        ));
        assert!(matches!(
            container.add_transition(&a, input, TransitionTarget::State(a.clone())),
            Err(StateError::Validation(_))
        ));
        assert!(matches!(
            container.add_transition(&a, done, TransitionTarget::Outcome(ElementId(999))),
            Err(StateError::NotFound(_))
        ));
        // A failed attempt must not leave the source pinned.
        assert!(child.remove(done).is_ok());
    }

    #[test]
    fn data_flow_checks_direction_and_type() {
        let container = ContainerState::new("c");
        let own = container.state_id();
        let goal = container.add_scoped_variable("goal", "int", None).unwrap();
        let label = container.add_input_port("label", "str", None).unwrap();
        let a = container.add_state(worker("a")).unwrap();
        let child = container.child(&a).unwrap();
        let input = element_id(child.as_ref(), "in");
        let output = element_id(child.as_ref(), "out");

        // Wrong direction: a child's input is not a source.
        assert!(matches!(
            container.add_data_flow(PortRef::new(&a, input), PortRef::new(&own, goal)),
            Err(StateError::Validation(_))
        ));
        // Type mismatch: str into int.
        assert!(matches!(
            container.add_data_flow(PortRef::new(&own, label), PortRef::new(&a, input)),
            Err(StateError::Validation(_))
        ));
        assert!(container.remove(label).is_ok());

        let flow = container
            .add_data_flow(PortRef::new(&a, output), PortRef::new(&own, goal))
            .unwrap();
        assert!(matches!(container.remove(goal), Err(StateError::InUse { .. })));
        assert!(matches!(child.remove(output), Err(StateError::InUse { .. })));
        assert!(matches!(
            container.retype(goal, "float"),
            Err(StateError::InUse { .. })
        ));

        let removed = container.remove_data_flow(flow).unwrap();
        assert_eq!(removed.from.port, output);
        assert_eq!(
            container.remove_data_flow(flow),
            Err(StateError::LinkNotFound(flow))
        );
        assert!(container.remove(goal).is_ok());
    }

    #[test]
    fn nested_containers_are_reachable() {
        let root = ContainerState::new("root");
        let inner = ContainerState::new("inner");
        inner.add_scoped_variable("counter", "int", Some("0")).unwrap();
        let inner_id = root.add_state(inner).unwrap();

        let handle = root.child(&inner_id).unwrap();
        assert!(handle.is_container());
        let nested = handle.as_container().unwrap();
        assert_eq!(nested.scoped_variables().len(), 1);
        nested
            .add_scoped_variable("limit", "int", Some("10"))
            .unwrap();
        assert_eq!(
            root.child(&inner_id)
                .unwrap()
                .as_container()
                .unwrap()
                .scoped_variables()
                .len(),
            2
        );
    }

    #[test]
    fn structural_changes_are_published() {
        let container = ContainerState::new("c");
        let mut events = container.subscribe();

        let a = container.add_state(worker("a")).unwrap();
        let scoped = container.add_scoped_variable("v", "int", None).unwrap();
        container.rename(scoped, "w").unwrap();
        container.remove(scoped).unwrap();
        container.remove_state(&a).unwrap();

        let changes: Vec<StateChange> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|event| event.change)
            .collect();
        assert_eq!(
            changes,
            vec![
                StateChange::ChildAdded { child: a.clone() },
                StateChange::ElementAdded {
                    id: scoped,
                    kind: ElementKind::ScopedVariable
                },
                StateChange::ElementRenamed {
                    id: scoped,
                    from: "v".into(),
                    to: "w".into()
                },
                StateChange::ElementRemoved {
                    id: scoped,
                    kind: ElementKind::ScopedVariable
                },
                StateChange::ChildRemoved { child: a },
            ]
        );
    }
}
