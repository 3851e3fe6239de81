//! Instances, component state and namespace containers

use std::cell::RefCell;
use std::rc::Rc;

use crate::handler::FunctionRef;
use crate::value::{ElementRef, TypeId, Value};

// ============================================================================
// Component state
// ============================================================================

/// Lifecycle phase of a component instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, no update batch opened yet
    Created,
    /// Inside an update batch
    Updating,
    /// First update batch completed
    Initialized,
    /// Disposed; no longer registered with the application
    Disposed,
}

/// Named event handler lists
#[derive(Debug, Default, Clone)]
pub struct EventHandlerList {
    events: Vec<(String, Vec<FunctionRef>)>,
}

impl EventHandlerList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a handler to an event
    pub fn add_handler(&mut self, event: &str, handler: FunctionRef) {
        match self.events.iter_mut().find(|(name, _)| name == event) {
            Some((_, handlers)) => handlers.push(handler),
            None => self.events.push((event.to_string(), vec![handler])),
        }
    }

    /// Unsubscribe a handler (by identity). Returns true if it was present.
    pub fn remove_handler(&mut self, event: &str, handler: &FunctionRef) -> bool {
        let Some((_, handlers)) = self.events.iter_mut().find(|(name, _)| name == event) else {
            return false;
        };
        match handlers.iter().position(|h| Rc::ptr_eq(h, handler)) {
            Some(index) => {
                handlers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the handlers subscribed to an event
    pub fn handlers(&self, event: &str) -> Vec<FunctionRef> {
        self.events
            .iter()
            .find(|(name, _)| name == event)
            .map(|(_, handlers)| handlers.clone())
            .unwrap_or_default()
    }

    /// Number of handlers subscribed to an event
    pub fn handler_count(&self, event: &str) -> usize {
        self.events
            .iter()
            .find(|(name, _)| name == event)
            .map_or(0, |(_, handlers)| handlers.len())
    }

    /// Drop every subscription
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Per-instance state of a component
#[derive(Debug, Clone)]
pub struct ComponentState {
    /// Application-wide id, if assigned
    pub id: Option<String>,
    /// Whether the id has been assigned once already
    pub id_set: bool,
    /// Current lifecycle phase
    pub phase: Lifecycle,
    /// Inside an update batch
    pub updating: bool,
    /// First update batch has completed
    pub initialized: bool,
    /// Subscribed event handlers
    pub events: EventHandlerList,
}

impl ComponentState {
    /// Fresh state for a newly constructed component
    pub fn new() -> Self {
        Self {
            id: None,
            id_set: false,
            phase: Lifecycle::Created,
            updating: false,
            initialized: false,
            events: EventHandlerList::new(),
        }
    }
}

impl Default for ComponentState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Instance
// ============================================================================

/// An object instance.
///
/// An instance without a type id has no metadata and is treated as an
/// instance of the universal root type only.
#[derive(Debug, Default)]
pub struct Instance {
    type_id: Option<TypeId>,
    fields: Vec<(String, Value)>,
    element: Option<ElementRef>,
    component: Option<ComponentState>,
}

/// Shared handle to an instance
pub type ObjectRef = Rc<RefCell<Instance>>;

impl Instance {
    /// Create an instance of a registered type
    pub fn new(type_id: TypeId) -> Self {
        Self {
            type_id: Some(type_id),
            ..Self::default()
        }
    }

    /// Create a plain object (no metadata)
    pub fn plain() -> Self {
        Self::default()
    }

    /// Runtime type, if the instance carries metadata
    pub fn type_id(&self) -> Option<TypeId> {
        self.type_id
    }

    /// Get a field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Set a field, inserting it if absent
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Check whether a field exists on the instance itself
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Fields in insertion order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of fields
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Host element the instance is bound to
    pub fn element(&self) -> Option<&ElementRef> {
        self.element.as_ref()
    }

    /// Bind the instance to a host element
    pub fn set_element(&mut self, element: Option<ElementRef>) {
        self.element = element;
    }

    /// Component state, if the instance is a component
    pub fn component(&self) -> Option<&ComponentState> {
        self.component.as_ref()
    }

    /// Mutable component state
    pub fn component_mut(&mut self) -> Option<&mut ComponentState> {
        self.component.as_mut()
    }

    /// Attach component state
    pub fn attach_component(&mut self, state: ComponentState) {
        self.component = Some(state);
    }
}

// ============================================================================
// Namespace
// ============================================================================

/// A named container in the global scope
#[derive(Debug)]
pub struct Namespace {
    name: String,
    members: RefCell<Vec<(String, Value)>>,
}

/// Shared handle to a namespace
pub type NamespaceRef = Rc<Namespace>;

impl Namespace {
    /// Create an empty namespace with its full dotted name
    pub fn new(name: impl Into<String>) -> NamespaceRef {
        Rc::new(Self {
            name: name.into(),
            members: RefCell::new(Vec::new()),
        })
    }

    /// Full dotted name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a direct member
    pub fn get(&self, segment: &str) -> Option<Value> {
        self.members
            .borrow()
            .iter()
            .find(|(n, _)| n == segment)
            .map(|(_, v)| v.clone())
    }

    /// Bind a direct member, replacing any previous binding
    pub fn set(&self, segment: impl Into<String>, value: Value) {
        let segment = segment.into();
        let mut members = self.members.borrow_mut();
        match members.iter_mut().find(|(n, _)| *n == segment) {
            Some((_, slot)) => *slot = value,
            None => members.push((segment, value)),
        }
    }

    /// Remove a direct member
    pub fn remove(&self, segment: &str) -> Option<Value> {
        let mut members = self.members.borrow_mut();
        let index = members.iter().position(|(n, _)| n == segment)?;
        Some(members.remove(index).1)
    }

    /// Names of direct members in binding order
    pub fn member_names(&self) -> Vec<String> {
        self.members.borrow().iter().map(|(n, _)| n.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::NativeFunction;

    #[test]
    fn test_instance_fields() {
        let mut obj = Instance::new(TypeId::new(3));
        obj.set("x", Value::from(1));
        obj.set("y", Value::from(2));
        obj.set("x", Value::from(10));

        assert_eq!(obj.type_id(), Some(TypeId::new(3)));
        assert_eq!(obj.get("x"), Some(&Value::from(10)));
        assert_eq!(obj.field_count(), 2);
        assert!(obj.has_field("y"));
        assert!(!obj.has_field("z"));
        let names: Vec<&str> = obj.fields().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn test_event_handler_list() {
        let mut list = EventHandlerList::new();
        let h1 = NativeFunction::new("h1", |_, _, _| Ok(Value::Undefined));
        let h2 = NativeFunction::new("h2", |_, _, _| Ok(Value::Undefined));

        list.add_handler("click", h1.clone());
        list.add_handler("click", h2.clone());
        assert_eq!(list.handler_count("click"), 2);
        assert!(list.remove_handler("click", &h1));
        assert!(!list.remove_handler("click", &h1));
        assert_eq!(list.handlers("click").len(), 1);
        assert_eq!(list.handler_count("missing"), 0);
    }

    #[test]
    fn test_namespace_members() {
        let ns = Namespace::new("App.Widgets");
        ns.set("Button", Value::from(1));
        assert_eq!(ns.name(), "App.Widgets");
        assert_eq!(ns.get("Button"), Some(Value::from(1)));
        assert_eq!(ns.member_names(), vec!["Button".to_string()]);
        assert!(ns.remove("Button").is_some());
        assert!(ns.get("Button").is_none());
    }

    #[test]
    fn test_component_state_defaults() {
        let state = ComponentState::new();
        assert_eq!(state.phase, Lifecycle::Created);
        assert!(!state.updating);
        assert!(!state.initialized);
        assert!(state.id.is_none());
    }
}
