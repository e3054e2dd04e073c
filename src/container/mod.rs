//! The state model: execution and container states, their elements, and
//! the linkages between them.
//!
//! Every state owns outcomes and typed data ports. A [`ContainerState`]
//! also owns child states, scoped variables, transitions and data flows.
//! All edits go through the [`State`] trait and are serialized per state,
//! and every accepted edit is published as a [`StateEvent`].

mod body;
mod container_state;
pub mod element;
pub mod error;
pub mod events;
mod execution;
pub mod linkage;
mod registry;
mod state;

pub use container_state::ContainerState;
pub use element::{Element, ElementKind};
pub use error::StateError;
pub use events::{StateChange, StateEvent};
pub use execution::ExecutionState;
pub use linkage::{DataFlow, PortRef, Transition, TransitionTarget};
pub use state::State;
