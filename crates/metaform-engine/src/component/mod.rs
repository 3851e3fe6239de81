//! Declarative construction protocol
//!
//! A [`ComponentDescriptor`] names a component type together with the
//! properties, event handlers and references to apply. [`Application`]
//! turns descriptors into live, registered components, deferring reference
//! wiring to a second pass when several components are created in one batch.

mod application;
mod lifecycle;

pub use application::Application;
pub use lifecycle::{
    add_event_handler, begin_update, dispose, end_update, raise_property_changed,
    remove_event_handler, set_properties,
};

use metaform_sdk::{TypeId, Value};

/// Everything needed to create one component
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    /// Type to instantiate; must derive from `Core.Component`
    pub type_id: TypeId,
    /// Property values, applied in order
    pub properties: Vec<(String, Value)>,
    /// Event name to handler
    pub events: Vec<(String, Value)>,
    /// Property name to the id of the component it should reference
    pub references: Vec<(String, String)>,
    /// Host element for controls and behaviors
    pub element: Value,
}

impl ComponentDescriptor {
    /// Descriptor for `type_id` with nothing to apply
    pub fn new(type_id: TypeId) -> Self {
        Self {
            type_id,
            properties: Vec::new(),
            events: Vec::new(),
            references: Vec::new(),
            element: Value::Undefined,
        }
    }

    /// Add a property value
    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    /// Add an event handler
    pub fn event(mut self, name: impl Into<String>, handler: impl Into<Value>) -> Self {
        self.events.push((name.into(), handler.into()));
        self
    }

    /// Add a reference to another component by id
    pub fn reference(mut self, name: impl Into<String>, id: impl Into<String>) -> Self {
        self.references.push((name.into(), id.into()));
        self
    }

    /// Bind to a host element
    pub fn element(mut self, element: impl Into<Value>) -> Self {
        self.element = element.into();
        self
    }
}

/// Snapshot the fields of a plain object as a property list
pub(crate) fn entries(value: &Value) -> Vec<(String, Value)> {
    match value.as_object() {
        Some(obj) => obj
            .borrow()
            .fields()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect(),
        None => Vec::new(),
    }
}

/// Pack a property list into a plain object, or `Undefined` when empty
pub(crate) fn pack(items: &[(String, Value)]) -> Value {
    if items.is_empty() {
        Value::Undefined
    } else {
        Value::plain(items.iter().cloned())
    }
}
