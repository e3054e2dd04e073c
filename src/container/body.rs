//! Identity, element registry and event channel shared by every state kind.

use crate::config::RuntimeConfig;
use crate::container::element::{Element, ElementKind};
use crate::container::error::StateError;
use crate::container::events::{StateChange, StateEvent};
use crate::container::registry::{ElementRegistry, Typing};
use crate::core::{ElementId, StateId};
use crate::validation::{DefinitionRules, ValidationIssue};
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug)]
struct BodyInner {
    name: String,
    registry: ElementRegistry,
}

/// Every edit of a state's elements runs under the body's mutex, which
/// keeps id assignment unique and collection order deterministic when
/// several editors work on the same state. Events are published before
/// the mutex is released so subscribers see changes in mutation order.
#[derive(Debug)]
pub struct StateBody {
    id: StateId,
    inner: Mutex<BodyInner>,
    rules: Arc<DefinitionRules>,
    events: broadcast::Sender<StateEvent>,
}

impl StateBody {
    pub(crate) fn new(name: &str) -> Self {
        let (events, _) = broadcast::channel(RuntimeConfig::default().channel_capacity());
        Self {
            id: StateId::generate(),
            inner: Mutex::new(BodyInner {
                name: name.to_string(),
                registry: ElementRegistry::default(),
            }),
            rules: Arc::new(DefinitionRules::default()),
            events,
        }
    }

    pub(crate) fn set_id(&mut self, id: StateId) {
        self.id = id;
    }

    pub(crate) fn set_rules(&mut self, rules: Arc<DefinitionRules>) {
        self.rules = rules;
    }

    /// Recreate the event channel with the configured capacity. Existing
    /// subscribers are disconnected.
    pub(crate) fn apply_config(&mut self, config: &RuntimeConfig) {
        let (events, _) = broadcast::channel(config.channel_capacity());
        self.events = events;
    }

    pub(crate) fn id(&self) -> &StateId {
        &self.id
    }

    pub(crate) fn name(&self) -> String {
        self.inner.lock().name.clone()
    }

    pub(crate) fn set_name(&self, name: &str) -> Result<(), StateError> {
        if name.trim().is_empty() {
            return Err(ValidationIssue::EmptyName.into());
        }
        let mut inner = self.inner.lock();
        let previous = std::mem::replace(&mut inner.name, name.to_string());
        debug!(state = %self.id, from = %previous, to = %name, "State renamed");
        self.publish(StateChange::Renamed {
            from: previous,
            to: name.to_string(),
        });
        Ok(())
    }

    pub(crate) fn add(
        &self,
        kind: ElementKind,
        name: &str,
        typing: Typing<'_>,
    ) -> Result<ElementId, StateError> {
        let mut inner = self.inner.lock();
        let element = inner.registry.add(&self.rules, kind, name, typing)?;
        debug!(state = %self.id, id = %element.id, %kind, name = %name, "Element added");
        self.publish(StateChange::ElementAdded {
            id: element.id,
            kind,
        });
        Ok(element.id)
    }

    pub(crate) fn rename(&self, id: ElementId, name: &str) -> Result<Element, StateError> {
        let mut inner = self.inner.lock();
        let (element, previous) = inner.registry.rename(&self.rules, id, name)?;
        debug!(state = %self.id, %id, from = %previous, to = %name, "Element renamed");
        self.publish(StateChange::ElementRenamed {
            id,
            from: previous,
            to: name.to_string(),
        });
        Ok(element)
    }

    pub(crate) fn retype(&self, id: ElementId, type_name: &str) -> Result<Element, StateError> {
        let mut inner = self.inner.lock();
        let before = inner.registry.lookup(id)?.data_type;
        let element = inner.registry.retype(id, type_name)?;
        if let Some(data_type) = element.data_type.filter(|t| Some(*t) != before) {
            debug!(state = %self.id, %id, %data_type, "Element retyped");
            self.publish(StateChange::ElementRetyped { id, data_type });
        }
        Ok(element)
    }

    pub(crate) fn set_default(&self, id: ElementId, literal: &str) -> Result<Element, StateError> {
        let mut inner = self.inner.lock();
        let element = inner.registry.set_default(id, literal)?;
        debug!(state = %self.id, %id, "Default value changed");
        self.publish(StateChange::DefaultChanged { id });
        Ok(element)
    }

    pub(crate) fn clear_default(&self, id: ElementId) -> Result<Element, StateError> {
        let mut inner = self.inner.lock();
        let element = inner.registry.clear_default(id)?;
        debug!(state = %self.id, %id, "Default value cleared");
        self.publish(StateChange::DefaultChanged { id });
        Ok(element)
    }

    pub(crate) fn remove(&self, id: ElementId) -> Result<Element, StateError> {
        let mut inner = self.inner.lock();
        let element = inner.registry.remove(id)?;
        debug!(state = %self.id, %id, kind = %element.kind, "Element removed");
        self.publish(StateChange::ElementRemoved {
            id,
            kind: element.kind,
        });
        Ok(element)
    }

    pub(crate) fn lookup(&self, id: ElementId) -> Result<Element, StateError> {
        self.inner.lock().registry.lookup(id)
    }

    pub(crate) fn elements(&self) -> Vec<Element> {
        self.inner.lock().registry.all()
    }

    pub(crate) fn of_kind(&self, kind: ElementKind) -> Vec<Element> {
        self.inner.lock().registry.of_kind(kind)
    }

    pub(crate) fn sorted_by_name(&self, kind: ElementKind) -> Vec<Element> {
        self.inner.lock().registry.sorted_by_name(kind)
    }

    /// Pin an element whose kind is one of `accepted`.
    pub(crate) fn retain(&self, id: ElementId, accepted: &[ElementKind]) -> Result<Element, StateError> {
        let mut inner = self.inner.lock();
        let element = inner.registry.lookup(id)?;
        if !accepted.contains(&element.kind) {
            return Err(ValidationIssue::WrongKind {
                id,
                found: element.kind,
                expected: accepted
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" or "),
            }
            .into());
        }
        inner.registry.retain(id)
    }

    pub(crate) fn release(&self, id: ElementId) {
        self.inner.lock().registry.release(id);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }

    pub(crate) fn publish(&self, change: StateChange) {
        // No subscribers is not an error.
        let _ = self.events.send(StateEvent {
            state: self.id.clone(),
            change,
            at: Utc::now(),
        });
    }
}
