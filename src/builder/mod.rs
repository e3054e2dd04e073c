//! Builder API for program-driven construction of container states.
//!
//! Definitions are recorded first and applied in order by `build()`, so
//! the first invalid definition aborts the build and no partially
//! configured container escapes.

pub mod container;
pub mod error;

pub use container::ContainerStateBuilder;
pub use error::BuildError;
