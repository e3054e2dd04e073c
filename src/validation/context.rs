//! Context provided to definition checks.

use crate::container::{Element, ElementKind};

/// A proposed element definition, as entered by an editor or program.
#[derive(Clone, Debug)]
pub struct DefinitionContext<'a> {
    pub kind: ElementKind,
    pub name: &'a str,
    pub data_type: Option<&'a str>,
    pub default: Option<&'a str>,
    /// Existing elements of the same kind, excluding the element being
    /// edited.
    pub siblings: &'a [Element],
}

impl<'a> DefinitionContext<'a> {
    pub fn new(kind: ElementKind, name: &'a str) -> Self {
        Self {
            kind,
            name,
            data_type: None,
            default: None,
            siblings: &[],
        }
    }

    pub fn typed(mut self, data_type: &'a str, default: Option<&'a str>) -> Self {
        self.data_type = Some(data_type);
        self.default = default;
        self
    }

    pub fn with_siblings(mut self, siblings: &'a [Element]) -> Self {
        self.siblings = siblings;
        self
    }
}
