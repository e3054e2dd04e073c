//! Definition rules for outcomes, ports and scoped variables.

use crate::core::DataType;
use crate::validation::context::DefinitionContext;
use crate::validation::violations::ValidationIssue;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Type alias for custom definition checks
pub type DefinitionCheck =
    Box<dyn Fn(&DefinitionContext<'_>) -> Validation<(), NonEmptyVec<ValidationIssue>> + Send + Sync>;

/// Rules every element definition of a state must satisfy.
/// Uses Validation to report ALL problems of a definition at once.
///
/// The built-in rules always apply: a non-empty trimmed name, a known
/// type name and a default literal that parses under that type. Unique
/// names, a maximum name length and custom checks are opt-in.
#[derive(Default)]
pub struct DefinitionRules {
    pub(crate) unique_names: bool,
    pub(crate) max_name_len: Option<usize>,
    pub(crate) required_checks: Vec<DefinitionCheck>,
}

impl std::fmt::Debug for DefinitionRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinitionRules")
            .field("unique_names", &self.unique_names)
            .field("max_name_len", &self.max_name_len)
            .field("required_checks", &self.required_checks.len())
            .finish()
    }
}

impl DefinitionRules {
    /// Enforce all rules, accumulating ALL issues.
    pub fn enforce(&self, context: &DefinitionContext<'_>) -> Validation<(), NonEmptyVec<ValidationIssue>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<ValidationIssue>>> = Vec::new();

        checks.push(check_name(context.name));

        if let Some(max) = self.max_name_len {
            let check = if context.name.chars().count() > max {
                Validation::fail(ValidationIssue::NameTooLong {
                    name: context.name.to_string(),
                    max,
                })
            } else {
                Validation::success(())
            };
            checks.push(check);
        }

        if self.unique_names {
            let clash = context
                .siblings
                .iter()
                .find(|element| element.name == context.name);
            let check = match clash {
                Some(existing) => Validation::fail(ValidationIssue::DuplicateName {
                    name: context.name.to_string(),
                    kind: existing.kind,
                    existing: existing.id,
                }),
                None => Validation::success(()),
            };
            checks.push(check);
        }

        if let Some(type_name) = context.data_type {
            checks.push(check_type(type_name, context.default));
        }

        for check_fn in &self.required_checks {
            checks.push(check_fn(context));
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// [`enforce`](Self::enforce) as a `Result` listing every issue.
    pub fn check(&self, context: &DefinitionContext<'_>) -> Result<(), Vec<ValidationIssue>> {
        match self.enforce(context) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(issues) => Err(issues.iter().cloned().collect()),
        }
    }
}

fn check_name(name: &str) -> Validation<(), NonEmptyVec<ValidationIssue>> {
    if name.trim().is_empty() {
        Validation::fail(ValidationIssue::EmptyName)
    } else if name.trim() != name {
        Validation::fail(ValidationIssue::UntrimmedName {
            name: name.to_string(),
        })
    } else {
        Validation::success(())
    }
}

fn check_type(type_name: &str, default: Option<&str>) -> Validation<(), NonEmptyVec<ValidationIssue>> {
    let data_type = match type_name.parse::<DataType>() {
        Ok(data_type) => data_type,
        Err(_) => return Validation::fail(ValidationIssue::UnknownType(type_name.to_string())),
    };
    match default {
        Some(literal) if data_type.parse_literal(literal).is_err() => {
            Validation::fail(ValidationIssue::InvalidDefault {
                literal: literal.to_string(),
                data_type,
            })
        }
        _ => Validation::success(()),
    }
}
