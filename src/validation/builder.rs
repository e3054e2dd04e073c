//! Builder API for creating definition rules.

use crate::validation::context::DefinitionContext;
use crate::validation::rules::{DefinitionCheck, DefinitionRules};
use crate::validation::violations::ValidationIssue;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for creating definition rules
pub struct RulesBuilder {
    unique_names: bool,
    max_name_len: Option<usize>,
    required_checks: Vec<DefinitionCheck>,
}

impl RulesBuilder {
    pub fn new() -> Self {
        Self {
            unique_names: false,
            max_name_len: None,
            required_checks: Vec::new(),
        }
    }

    /// Reject names already used by another element of the same kind
    pub fn unique_names(mut self) -> Self {
        self.unique_names = true;
        self
    }

    /// Set maximum name length in characters
    pub fn max_name_len(mut self, n: usize) -> Self {
        self.max_name_len = Some(n);
        self
    }

    /// Add a custom validation check
    pub fn require<F>(mut self, check: F) -> Self
    where
        F: Fn(&DefinitionContext<'_>) -> Validation<(), NonEmptyVec<ValidationIssue>>
            + Send
            + Sync
            + 'static,
    {
        self.required_checks.push(Box::new(check));
        self
    }

    /// Add a simple predicate check with error message
    pub fn require_pred<F>(mut self, predicate: F, error_msg: String) -> Self
    where
        F: Fn(&DefinitionContext<'_>) -> bool + Send + Sync + 'static,
    {
        let check = move |ctx: &DefinitionContext<'_>| {
            if predicate(ctx) {
                Validation::success(())
            } else {
                Validation::fail(ValidationIssue::CustomCheckFailed {
                    message: error_msg.clone(),
                })
            }
        };
        self.required_checks.push(Box::new(check));
        self
    }

    /// Build the definition rules
    pub fn build(self) -> DefinitionRules {
        DefinitionRules {
            unique_names: self.unique_names,
            max_name_len: self.max_name_len,
            required_checks: self.required_checks,
        }
    }
}

impl Default for RulesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
