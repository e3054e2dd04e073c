//! The `State` trait shared by leaf and container states.
//!
//! Every state owns outcomes and data ports. The trait provides the whole
//! element editing surface as provided methods, so execution states and
//! container states behave identically for the elements they share.

use crate::container::element::{Element, ElementKind};
use crate::container::error::StateError;
use crate::container::events::StateEvent;
use crate::container::ContainerState;
use crate::core::{ElementId, StateId};
use std::fmt::Debug;
use tokio::sync::broadcast;

pub(crate) mod sealed {
    use crate::container::body::StateBody;

    /// Grants crate-internal access to a state's body. Not nameable
    /// outside the crate, which keeps [`State`](super::State) closed to
    /// the state kinds defined here.
    pub trait HasBody {
        fn body(&self) -> &StateBody;
    }
}

/// Trait for states of a hierarchical state machine.
///
/// All methods take `&self` and may be called from several threads at
/// once; edits of one state are serialized internally. Accessors return
/// copies of elements, never references into the state.
///
/// # Example
///
/// ```rust
/// use hierstate::container::{ExecutionState, State};
///
/// let state = ExecutionState::new("move_arm");
/// let done = state.add_outcome("done").unwrap();
/// let target = state.add_input_port("target", "list", Some("[0.0, 0.5]")).unwrap();
///
/// state.rename(done, "reached").unwrap();
/// assert_eq!(state.lookup(done).unwrap().name, "reached");
/// assert_eq!(state.input_ports().len(), 1);
/// assert!(state.remove(target).is_ok());
/// assert!(state.lookup(target).is_err());
/// ```
pub trait State: sealed::HasBody + Debug + Send + Sync {
    fn state_id(&self) -> StateId {
        self.body().id().clone()
    }

    fn name(&self) -> String {
        self.body().name()
    }

    fn set_name(&self, name: &str) -> Result<(), StateError> {
        self.body().set_name(name)
    }

    fn is_container(&self) -> bool {
        false
    }

    /// Downcast to a container to reach its children and linkages.
    fn as_container(&self) -> Option<&ContainerState> {
        None
    }

    fn add_outcome(&self, name: &str) -> Result<ElementId, StateError> {
        self.body().add(ElementKind::Outcome, name, None)
    }

    fn add_input_port(
        &self,
        name: &str,
        data_type: &str,
        default: Option<&str>,
    ) -> Result<ElementId, StateError> {
        self.body()
            .add(ElementKind::InputPort, name, Some((data_type, default)))
    }

    fn add_output_port(
        &self,
        name: &str,
        data_type: &str,
        default: Option<&str>,
    ) -> Result<ElementId, StateError> {
        self.body()
            .add(ElementKind::OutputPort, name, Some((data_type, default)))
    }

    fn rename(&self, id: ElementId, name: &str) -> Result<Element, StateError> {
        self.body().rename(id, name)
    }

    /// Change an element's data type, coercing its default value.
    fn retype(&self, id: ElementId, data_type: &str) -> Result<Element, StateError> {
        self.body().retype(id, data_type)
    }

    fn set_default(&self, id: ElementId, literal: &str) -> Result<Element, StateError> {
        self.body().set_default(id, literal)
    }

    fn clear_default(&self, id: ElementId) -> Result<Element, StateError> {
        self.body().clear_default(id)
    }

    /// Remove an element. Fails with `InUse` while a linkage references it.
    fn remove(&self, id: ElementId) -> Result<Element, StateError> {
        self.body().remove(id)
    }

    fn lookup(&self, id: ElementId) -> Result<Element, StateError> {
        self.body().lookup(id)
    }

    /// All elements in insertion order.
    fn elements(&self) -> Vec<Element> {
        self.body().elements()
    }

    fn outcomes(&self) -> Vec<Element> {
        self.body().of_kind(ElementKind::Outcome)
    }

    fn input_ports(&self) -> Vec<Element> {
        self.body().of_kind(ElementKind::InputPort)
    }

    fn output_ports(&self) -> Vec<Element> {
        self.body().of_kind(ElementKind::OutputPort)
    }

    /// Elements of one kind in natural name order, for list presentation.
    fn sorted_by_name(&self, kind: ElementKind) -> Vec<Element> {
        self.body().sorted_by_name(kind)
    }

    fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.body().subscribe()
    }
}
