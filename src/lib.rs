//! Hierstate: shared runtime state for hierarchical state machines
//!
//! Hierstate holds the data a state machine runtime shares between
//! concurrently executing states, and the editable model of those states.
//!
//! # Core Concepts
//!
//! - **Global variables**: a thread-safe key/value store with per-key
//!   locks and access tokens ([`GlobalVariableManager`])
//! - **States**: execution states and container states owning outcomes,
//!   typed data ports and scoped variables ([`State`])
//! - **Linkages**: transitions and data flows that pin what they reference
//! - **Change events**: every accepted mutation is published on a
//!   broadcast channel
//!
//! # Example
//!
//! ```rust
//! use hierstate::container::{ContainerState, State};
//! use hierstate::variables::{GlobalVariableManager, VariableError};
//! use hierstate::Value;
//!
//! let globals = GlobalVariableManager::new();
//! globals.set_variable("counter", 1);
//!
//! let token = globals.lock_variable("counter").unwrap();
//! let current = globals.get_locked_variable("counter", token).unwrap();
//! assert_eq!(current, Value::Int(1));
//! globals.set_locked_variable("counter", token, 2).unwrap();
//! globals.unlock_variable("counter", token).unwrap();
//! assert_eq!(
//!     globals.unlock_variable("counter", token),
//!     Err(VariableError::WrongAccessKey { key: "counter".into() })
//! );
//!
//! let root = ContainerState::new("root");
//! let x = root.add_input_port("x", "int", Some("0")).unwrap();
//! let y = root.add_scoped_variable("y", "int", Some("1")).unwrap();
//! root.rename(y, "z").unwrap();
//! assert!(root.remove(x).is_ok());
//! assert!(root.remove(x).is_err());
//! ```

pub mod builder;
pub mod config;
pub mod container;
pub mod core;
pub mod validation;
pub mod variables;

// Re-export commonly used types
pub use builder::{BuildError, ContainerStateBuilder};
pub use config::{ConfigError, RuntimeConfig};
pub use container::{ContainerState, ExecutionState, State, StateError, StateEvent};
pub use core::{DataType, ElementId, LinkId, StateId, Value};
pub use variables::{GlobalVariableManager, LockToken, VariableError, VariableEvent};
