//! Validation of element definitions.
//!
//! Definitions are checked with Stillwater's `Validation` type, which
//! accumulates every problem instead of stopping at the first one. An
//! editor entering a port with an empty name and an unparseable default
//! learns about both problems from a single attempt.
//!
//! # Example
//!
//! ```rust
//! use hierstate::container::ElementKind;
//! use hierstate::validation::{DefinitionContext, RulesBuilder};
//!
//! let rules = RulesBuilder::new().unique_names().max_name_len(32).build();
//! let context = DefinitionContext::new(ElementKind::InputPort, "speed").typed("float", Some("0.5"));
//! assert!(rules.check(&context).is_ok());
//! ```

pub mod builder;
pub mod context;
pub mod rules;
pub mod violations;

pub use builder::RulesBuilder;
pub use context::DefinitionContext;
pub use rules::{DefinitionCheck, DefinitionRules};
pub use violations::ValidationIssue;
