//! Application: component store, disposables and construction batches

use std::rc::Rc;

use metaform_sdk::{ObjectRef, ReflectError, ReflectResult, Value};
use rustc_hash::FxHashMap;
use tracing::debug;

use super::lifecycle::{self, component_id};
use super::{pack, ComponentDescriptor};
use crate::registry::builtins::{BEHAVIOR, COMPONENT, CONTROL, I_DISPOSABLE};
use crate::registry::{Member, TypeRegistry};
use crate::resources::{self, format1};
use crate::validate::signatures;

/// Registered components plus the state of the current construction batch
#[derive(Debug, Default)]
pub struct Application {
    components: FxHashMap<String, ObjectRef>,
    disposables: Vec<ObjectRef>,
    creating: bool,
    disposing: bool,
    second_pass: Vec<(ObjectRef, Vec<(String, String)>)>,
    created: Vec<ObjectRef>,
}

impl Application {
    /// Create an empty application
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Create a component from a descriptor.
    ///
    /// Properties and events are applied inside an update batch. Outside a
    /// construction batch references are wired and the batch closed before
    /// returning; inside one, components with references are finished by
    /// [`end_create_components`].
    ///
    /// A component that fails any later step is unregistered again and never
    /// reaches the store.
    ///
    /// [`end_create_components`]: Application::end_create_components
    pub fn create(
        &mut self,
        registry: &TypeRegistry,
        desc: ComponentDescriptor,
    ) -> ReflectResult<ObjectRef> {
        let ty = desc.type_id;
        if registry.options().validate_arguments {
            let references: Vec<(String, Value)> = desc
                .references
                .iter()
                .map(|(name, id)| (name.clone(), Value::from(id.as_str())))
                .collect();
            registry.validator().validate_params(
                &[
                    Value::Type(ty),
                    pack(&desc.properties),
                    pack(&desc.events),
                    pack(&references),
                    desc.element.clone(),
                ],
                &signatures::CREATE_COMPONENT,
            )?;
        }
        let element = match &desc.element {
            Value::Element(element) if element.kind().is_dom_target() => Some(element.clone()),
            Value::Undefined | Value::Null => None,
            _ => return Err(ReflectError::argument("element", resources::ARGUMENT_DOM_ELEMENT)),
        };

        if !registry.inherits_from(ty, COMPONENT) {
            return Err(ReflectError::argument(
                "type",
                format1(resources::CREATE_NOT_COMPONENT, &registry.type_name_of(ty)),
            ));
        }
        let ui_bound = [CONTROL, BEHAVIOR]
            .into_iter()
            .any(|ui| ty == ui || registry.inherits_from(ty, ui));
        match (ui_bound, element.is_some()) {
            (true, false) => {
                return Err(ReflectError::argument("element", resources::CREATE_NO_DOM))
            }
            (false, true) => {
                return Err(ReflectError::argument("element", resources::CREATE_COMPONENT_ON_DOM))
            }
            _ => {}
        }

        let component = registry.construct(ty, element, &[])?;
        self.register_disposable_object(registry, &Value::Object(component.clone()))?;
        if let Err(err) = self.populate(registry, &component, desc) {
            self.forget(&component);
            return Err(err);
        }
        debug!(
            type_name = %registry.type_name_of(ty),
            batched = self.creating,
            "created component"
        );
        Ok(component)
    }

    /// Apply properties, events and references to a freshly constructed
    /// component
    fn populate(
        &mut self,
        registry: &TypeRegistry,
        component: &ObjectRef,
        desc: ComponentDescriptor,
    ) -> ReflectResult<()> {
        let ty = desc.type_id;
        let value = Value::Object(component.clone());
        lifecycle::begin_update(registry, &value)?;

        if !desc.properties.is_empty() {
            lifecycle::set_properties(registry, &value, &desc.properties)?;
        }
        for (event, handler) in &desc.events {
            let declared = registry
                .descriptor(ty)
                .and_then(|d| d.member(event))
                .is_some_and(|member| member.is_event());
            if !declared {
                return Err(ReflectError::invalid_operation(format1(
                    resources::UNDEFINED_EVENT,
                    event,
                )));
            }
            if handler.as_function().is_none() {
                return Err(ReflectError::invalid_operation(resources::EVENT_HANDLER_NOT_FUNCTION));
            }
            lifecycle::add_event_handler(registry, &value, event, handler)?;
        }

        if component_id(component)?.is_some() {
            self.add_component(component)?;
        }

        if self.creating {
            if desc.references.is_empty() {
                lifecycle::end_update(registry, &value)?;
            } else {
                self.second_pass.push((component.clone(), desc.references));
            }
            self.created.push(component.clone());
        } else {
            self.set_references(registry, component, &desc.references)?;
            lifecycle::end_update(registry, &value)?;
        }
        Ok(())
    }

    /// Drop every trace of a component whose creation failed
    fn forget(&mut self, component: &ObjectRef) {
        self.unregister_disposable_object(component);
        self.remove_component(component);
        self.second_pass.retain(|(pending, _)| !Rc::ptr_eq(pending, component));
        self.created.retain(|created| !Rc::ptr_eq(created, component));
    }

    /// Wire each reference through the property's setter
    fn set_references(
        &self,
        registry: &TypeRegistry,
        component: &ObjectRef,
        references: &[(String, String)],
    ) -> ReflectResult<()> {
        let Some(ty) = component.borrow().type_id() else {
            return Err(ReflectError::argument("component", resources::NOT_A_COMPONENT));
        };
        registry.resolve_inheritance(ty);
        for (name, id) in references {
            let accessor = match registry.descriptor(ty).and_then(|d| d.member(name)) {
                Some(Member::Property(accessor)) if accessor.has_setter() => accessor,
                _ => {
                    return Err(ReflectError::invalid_operation(format1(
                        resources::PROPERTY_NOT_WRITABLE,
                        name,
                    )))
                }
            };
            let target = self.find_component(id).ok_or_else(|| {
                ReflectError::invalid_operation(format1(resources::REFERENCE_NOT_FOUND, id))
            })?;
            if let Some(result) = accessor.set(registry, component, Value::Object(target)) {
                result?;
            }
        }
        Ok(())
    }

    /// Start a construction batch
    pub fn begin_create_components(&mut self) {
        self.creating = true;
        debug!("began construction batch");
    }

    /// Finish a construction batch: wire deferred references, close the
    /// update batch of every component that had them, and return every
    /// component created during the batch.
    ///
    /// The batch always completes. Every deferred component has its update
    /// batch closed even when wiring another one fails; the first failure is
    /// then returned and the batch's components are not carried over.
    pub fn end_create_components(
        &mut self,
        registry: &TypeRegistry,
    ) -> ReflectResult<Vec<ObjectRef>> {
        let pending = std::mem::take(&mut self.second_pass);
        let created = std::mem::take(&mut self.created);
        self.creating = false;

        let mut first_error = None;
        for (component, references) in &pending {
            let wired = self.set_references(registry, component, references);
            let closed = lifecycle::end_update(registry, &Value::Object(component.clone()));
            if let Err(err) = wired.and(closed) {
                first_error.get_or_insert(err);
            }
        }
        debug!(created = created.len(), deferred = pending.len(), "ended construction batch");
        match first_error {
            Some(err) => Err(err),
            None => Ok(created),
        }
    }

    /// Whether a construction batch is open
    pub fn is_creating_components(&self) -> bool {
        self.creating
    }

    // ========================================================================
    // Component store
    // ========================================================================

    /// Register a component under its id
    pub fn add_component(&mut self, component: &ObjectRef) -> ReflectResult<()> {
        let id = component_id(component)?
            .ok_or_else(|| ReflectError::invalid_operation(resources::CANT_ADD_WITHOUT_ID))?;
        if self.components.contains_key(&id) {
            return Err(ReflectError::invalid_operation(format1(resources::DUPLICATE_ID, &id)));
        }
        debug!(%id, "added component");
        self.components.insert(id, component.clone());
        Ok(())
    }

    /// Look up a component by id
    pub fn find_component(&self, id: &str) -> Option<ObjectRef> {
        self.components.get(id).cloned()
    }

    /// Unregister a component. Returns whether it was registered.
    pub fn remove_component(&mut self, component: &ObjectRef) -> bool {
        let Ok(Some(id)) = component_id(component) else {
            return false;
        };
        match self.components.get(&id) {
            Some(stored) if Rc::ptr_eq(stored, component) => {
                self.components.remove(&id);
                true
            }
            _ => false,
        }
    }

    /// Registered components, ordered by id
    pub fn get_components(&self) -> Vec<ObjectRef> {
        let mut entries: Vec<(&String, &ObjectRef)> = self.components.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, component)| component.clone()).collect()
    }

    // ========================================================================
    // Disposables
    // ========================================================================

    /// Track an object to dispose with the application
    pub fn register_disposable_object(
        &mut self,
        registry: &TypeRegistry,
        object: &Value,
    ) -> ReflectResult<()> {
        let obj = match object {
            Value::Object(obj) if registry.is_instance_of_type(I_DISPOSABLE, object) => obj,
            other => {
                return Err(ReflectError::argument_type(
                    "object",
                    registry.get_type_name(other),
                    registry.type_name_of(I_DISPOSABLE),
                ))
            }
        };
        if !self.disposables.iter().any(|d| Rc::ptr_eq(d, obj)) {
            self.disposables.push(obj.clone());
        }
        Ok(())
    }

    /// Stop tracking an object. Returns whether it was tracked.
    pub fn unregister_disposable_object(&mut self, object: &ObjectRef) -> bool {
        match self.disposables.iter().position(|d| Rc::ptr_eq(d, object)) {
            Some(index) => {
                self.disposables.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of tracked disposables
    pub fn disposable_count(&self) -> usize {
        self.disposables.len()
    }

    /// Dispose one component and forget it
    pub fn dispose_component(
        &mut self,
        registry: &TypeRegistry,
        component: &ObjectRef,
    ) -> ReflectResult<()> {
        lifecycle::dispose(registry, &Value::Object(component.clone()))?;
        self.unregister_disposable_object(component);
        self.remove_component(component);
        Ok(())
    }

    /// Dispose every tracked object, then clear the component store.
    ///
    /// A failing `dispose` does not stop the others; the first failure is
    /// returned once every object has been visited.
    pub fn dispose(&mut self, registry: &TypeRegistry) -> ReflectResult<()> {
        if self.disposing {
            return Ok(());
        }
        self.disposing = true;
        let disposables = std::mem::take(&mut self.disposables);
        debug!(count = disposables.len(), "disposing application");
        let mut first_error = None;
        for object in &disposables {
            if let Err(err) = registry.invoke(&Value::Object(object.clone()), "dispose", &[]) {
                debug!(error = %err, "dispose failed");
                first_error.get_or_insert(err);
            }
        }
        self.components.clear();
        self.disposing = false;
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Whether [`dispose`](Application::dispose) is running
    pub fn is_disposing(&self) -> bool {
        self.disposing
    }
}
