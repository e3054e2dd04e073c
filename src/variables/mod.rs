//! Global variables shared across concurrently running state machine
//! branches.
//!
//! [`GlobalVariableManager`] keeps one lock per key plus a structural
//! lock for the key set. Plain `get`/`set`/`delete` hold a key's lock only
//! for the copy; [`GlobalVariableManager::lock_variable`] hands out a
//! [`LockToken`] that authorizes the `*_locked_variable` operations until
//! the matching unlock. Every mutation is published as a
//! [`VariableEvent`].

pub mod error;
pub mod events;
pub mod guard;
mod lock;
pub mod manager;

pub use error::VariableError;
pub use events::{VariableEvent, VariableOperation};
pub use guard::VariableGuard;
pub use lock::LockToken;
pub use manager::GlobalVariableManager;
