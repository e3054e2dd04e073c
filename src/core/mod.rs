//! Core value types shared by the variable store and the state model.
//!
//! - [`Value`] and [`DataType`]: tagged values with literal parsing
//! - Identifiers for states, elements and links
//! - Natural name ordering for sorted listings

mod ids;
mod ordering;
mod value;

pub(crate) use ids::IdCounter;
pub use ids::{ElementId, LinkId, StateId};
pub use ordering::natural_cmp;
pub use value::{DataType, Value, ValueError};
