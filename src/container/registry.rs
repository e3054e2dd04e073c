//! Ordered element collections of a single state.

use crate::container::element::{Element, ElementKind};
use crate::container::error::StateError;
use crate::core::{natural_cmp, DataType, ElementId, IdCounter};
use crate::validation::{DefinitionContext, DefinitionRules, ValidationIssue};
use std::collections::{BTreeMap, HashMap};

/// Data type name and optional default literal of a new data element.
pub(crate) type Typing<'a> = Option<(&'a str, Option<&'a str>)>;

/// Elements of one state, keyed by id.
///
/// Ids grow monotonically, so id order is insertion order. Linkages pin
/// the elements they reference; a pinned element cannot be removed or
/// retyped.
#[derive(Debug, Default)]
pub(crate) struct ElementRegistry {
    elements: BTreeMap<ElementId, Element>,
    references: HashMap<ElementId, usize>,
    ids: IdCounter,
}

fn parse_type(type_name: &str) -> Result<DataType, StateError> {
    type_name
        .parse::<DataType>()
        .map_err(|_| ValidationIssue::UnknownType(type_name.to_string()).into())
}

impl ElementRegistry {
    pub(crate) fn add(
        &mut self,
        rules: &DefinitionRules,
        kind: ElementKind,
        name: &str,
        typing: Typing<'_>,
    ) -> Result<Element, StateError> {
        let siblings = self.of_kind(kind);
        let mut context = DefinitionContext::new(kind, name).with_siblings(&siblings);
        if let Some((type_name, default)) = typing {
            context = context.typed(type_name, default);
        }
        rules.check(&context).map_err(StateError::Validation)?;

        let (data_type, default_value) = match typing {
            Some((type_name, default)) => {
                let data_type = parse_type(type_name)?;
                let default_value = default
                    .map(|literal| {
                        data_type.parse_literal(literal).map_err(|_| {
                            StateError::from(ValidationIssue::InvalidDefault {
                                literal: literal.to_string(),
                                data_type,
                            })
                        })
                    })
                    .transpose()?;
                (Some(data_type), default_value)
            }
            None => (None, None),
        };

        let element = Element {
            id: self.ids.next_element(),
            kind,
            name: name.to_string(),
            data_type,
            default_value,
        };
        self.elements.insert(element.id, element.clone());
        Ok(element)
    }

    /// Rename an element, returning the previous name.
    pub(crate) fn rename(
        &mut self,
        rules: &DefinitionRules,
        id: ElementId,
        name: &str,
    ) -> Result<(Element, String), StateError> {
        let kind = self.lookup(id)?.kind;
        let siblings: Vec<Element> = self
            .of_kind(kind)
            .into_iter()
            .filter(|element| element.id != id)
            .collect();
        let context = DefinitionContext::new(kind, name).with_siblings(&siblings);
        rules.check(&context).map_err(StateError::Validation)?;

        let element = self.get_mut(id)?;
        let previous = std::mem::replace(&mut element.name, name.to_string());
        Ok((element.clone(), previous))
    }

    /// Change the data type, coercing the current default into it.
    ///
    /// The element is left untouched when coercion fails.
    pub(crate) fn retype(&mut self, id: ElementId, type_name: &str) -> Result<Element, StateError> {
        let element = self.lookup(id)?;
        let current = element
            .data_type
            .ok_or(ValidationIssue::Untyped(element.kind))?;
        let data_type = parse_type(type_name)?;
        if data_type == current {
            return Ok(element);
        }

        let references = self.reference_count(id);
        if references > 0 {
            return Err(StateError::InUse { id, references });
        }

        let default_value = match &element.default_value {
            Some(value) => Some(data_type.coerce(value).map_err(|_| StateError::TypeCoercion {
                id,
                literal: value.to_literal(),
                target: data_type,
            })?),
            None => None,
        };

        let stored = self.get_mut(id)?;
        stored.data_type = Some(data_type);
        stored.default_value = default_value;
        Ok(stored.clone())
    }

    pub(crate) fn set_default(&mut self, id: ElementId, literal: &str) -> Result<Element, StateError> {
        let element = self.lookup(id)?;
        let data_type = element
            .data_type
            .ok_or(ValidationIssue::Untyped(element.kind))?;
        let value = data_type.parse_literal(literal).map_err(|_| {
            StateError::from(ValidationIssue::InvalidDefault {
                literal: literal.to_string(),
                data_type,
            })
        })?;

        let stored = self.get_mut(id)?;
        stored.default_value = Some(value);
        Ok(stored.clone())
    }

    pub(crate) fn clear_default(&mut self, id: ElementId) -> Result<Element, StateError> {
        let element = self.lookup(id)?;
        if !element.kind.carries_data() {
            return Err(ValidationIssue::Untyped(element.kind).into());
        }
        let stored = self.get_mut(id)?;
        stored.default_value = None;
        Ok(stored.clone())
    }

    pub(crate) fn remove(&mut self, id: ElementId) -> Result<Element, StateError> {
        if !self.elements.contains_key(&id) {
            return Err(StateError::NotFound(id));
        }
        let references = self.reference_count(id);
        if references > 0 {
            return Err(StateError::InUse { id, references });
        }
        self.elements.remove(&id).ok_or(StateError::NotFound(id))
    }

    pub(crate) fn lookup(&self, id: ElementId) -> Result<Element, StateError> {
        self.elements
            .get(&id)
            .cloned()
            .ok_or(StateError::NotFound(id))
    }

    pub(crate) fn all(&self) -> Vec<Element> {
        self.elements.values().cloned().collect()
    }

    pub(crate) fn of_kind(&self, kind: ElementKind) -> Vec<Element> {
        self.elements
            .values()
            .filter(|element| element.kind == kind)
            .cloned()
            .collect()
    }

    /// Elements of one kind in natural name order, ties broken by id.
    pub(crate) fn sorted_by_name(&self, kind: ElementKind) -> Vec<Element> {
        let mut elements = self.of_kind(kind);
        elements.sort_by(|a, b| natural_cmp(&a.name, &b.name).then(a.id.cmp(&b.id)));
        elements
    }

    /// Pin an element on behalf of a linkage.
    pub(crate) fn retain(&mut self, id: ElementId) -> Result<Element, StateError> {
        let element = self.lookup(id)?;
        *self.references.entry(id).or_default() += 1;
        Ok(element)
    }

    pub(crate) fn release(&mut self, id: ElementId) {
        if let Some(count) = self.references.get_mut(&id) {
            *count -= 1;
            if *count == 0 {
                self.references.remove(&id);
            }
        }
    }

    pub(crate) fn reference_count(&self, id: ElementId) -> usize {
        self.references.get(&id).copied().unwrap_or(0)
    }

    fn get_mut(&mut self, id: ElementId) -> Result<&mut Element, StateError> {
        self.elements.get_mut(&id).ok_or(StateError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::validation::RulesBuilder;

    fn registry() -> (ElementRegistry, DefinitionRules) {
        (ElementRegistry::default(), DefinitionRules::default())
    }

    #[test]
    fn ids_are_distinct_and_not_reused() {
        let (mut registry, rules) = registry();
        let x = registry
            .add(&rules, ElementKind::ScopedVariable, "x", Some(("int", None)))
            .unwrap();
        let y = registry
            .add(&rules, ElementKind::ScopedVariable, "y", Some(("int", None)))
            .unwrap();
        assert_ne!(x.id, y.id);

        registry.remove(y.id).unwrap();
        let z = registry
            .add(&rules, ElementKind::ScopedVariable, "y", Some(("int", None)))
            .unwrap();
        assert_ne!(z.id, y.id);
        assert_ne!(z.id, x.id);
    }

    #[test]
    fn invalid_definitions_are_rejected() {
        let (mut registry, rules) = registry();
        let unknown = registry.add(&rules, ElementKind::InputPort, "p", Some(("tensor", None)));
        assert!(matches!(unknown, Err(StateError::Validation(_))));

        let bad_default = registry.add(&rules, ElementKind::InputPort, "p", Some(("int", Some("x"))));
        assert!(matches!(bad_default, Err(StateError::Validation(_))));
        assert!(registry.all().is_empty());
    }

    #[test]
    fn retype_coerces_default() {
        let (mut registry, rules) = registry();
        let id = registry
            .add(&rules, ElementKind::ScopedVariable, "v", Some(("int", Some("5"))))
            .unwrap()
            .id;

        let retyped = registry.retype(id, "string").unwrap();
        assert_eq!(retyped.data_type, Some(DataType::Str));
        assert_eq!(retyped.default_value, Some(Value::Str("5".into())));
    }

    #[test]
    fn failed_retype_leaves_element_unchanged() {
        let (mut registry, rules) = registry();
        let id = registry
            .add(&rules, ElementKind::ScopedVariable, "v", Some(("str", Some("abc"))))
            .unwrap()
            .id;

        let result = registry.retype(id, "float");
        assert!(matches!(result, Err(StateError::TypeCoercion { .. })));
        let element = registry.lookup(id).unwrap();
        assert_eq!(element.data_type, Some(DataType::Str));
        assert_eq!(element.default_value, Some(Value::Str("abc".into())));
    }

    #[test]
    fn outcomes_have_no_type() {
        let (mut registry, rules) = registry();
        let id = registry.add(&rules, ElementKind::Outcome, "done", None).unwrap().id;
        assert!(matches!(
            registry.retype(id, "int"),
            Err(StateError::Validation(_))
        ));
        assert!(matches!(
            registry.set_default(id, "1"),
            Err(StateError::Validation(_))
        ));
        assert!(matches!(
            registry.clear_default(id),
            Err(StateError::Validation(_))
        ));
    }

    #[test]
    fn pinned_elements_cannot_be_removed() {
        let (mut registry, rules) = registry();
        let id = registry
            .add(&rules, ElementKind::OutputPort, "out", Some(("int", None)))
            .unwrap()
            .id;

        registry.retain(id).unwrap();
        assert_eq!(
            registry.remove(id),
            Err(StateError::InUse { id, references: 1 })
        );
        assert!(matches!(
            registry.retype(id, "float"),
            Err(StateError::InUse { .. })
        ));

        registry.release(id);
        assert!(registry.remove(id).is_ok());
        assert_eq!(registry.remove(id), Err(StateError::NotFound(id)));
    }

    #[test]
    fn rename_respects_unique_names_excluding_self() {
        let mut registry = ElementRegistry::default();
        let rules = RulesBuilder::new().unique_names().build();
        let a = registry.add(&rules, ElementKind::Outcome, "a", None).unwrap().id;
        registry.add(&rules, ElementKind::Outcome, "b", None).unwrap();

        assert!(registry.rename(&rules, a, "a").is_ok());
        assert!(matches!(
            registry.rename(&rules, a, "b"),
            Err(StateError::Validation(_))
        ));
        let (renamed, previous) = registry.rename(&rules, a, "c").unwrap();
        assert_eq!(renamed.name, "c");
        assert_eq!(previous, "a");
    }

    #[test]
    fn sorted_listing_uses_natural_order() {
        let (mut registry, rules) = registry();
        for name in ["var_10", "var_2", "var_1"] {
            registry
                .add(&rules, ElementKind::ScopedVariable, name, Some(("int", None)))
                .unwrap();
        }

        let insertion: Vec<String> = registry
            .of_kind(ElementKind::ScopedVariable)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(insertion, vec!["var_10", "var_2", "var_1"]);

        let sorted: Vec<String> = registry
            .sorted_by_name(ElementKind::ScopedVariable)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(sorted, vec!["var_1", "var_2", "var_10"]);
    }
}
