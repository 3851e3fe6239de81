//! Component lifecycle and property application
//!
//! Lifecycle calls dispatch through the merged member table, so a component
//! type may override `initialize`, `updated` or `dispose` and reach the
//! built-in behavior with `call_base_method`.

use metaform_sdk::{ObjectRef, ReflectError, ReflectResult, TypeId, Value};

use super::entries;
use crate::registry::builtins::with_state;
use crate::registry::{Member, TypeRegistry};
use crate::resources::{self, format1};
use crate::validate::signatures;

// ============================================================================
// Lifecycle
// ============================================================================

/// Open an update batch on `component`
pub fn begin_update(registry: &TypeRegistry, component: &Value) -> ReflectResult<()> {
    registry.invoke(component, "beginUpdate", &[])?;
    Ok(())
}

/// Close an update batch. The first batch to close initializes the component.
pub fn end_update(registry: &TypeRegistry, component: &Value) -> ReflectResult<()> {
    registry.invoke(component, "endUpdate", &[])?;
    Ok(())
}

/// Notify `propertyChanged` subscribers
pub fn raise_property_changed(
    registry: &TypeRegistry,
    component: &Value,
    property: &str,
) -> ReflectResult<()> {
    registry.invoke(component, "raisePropertyChanged", &[Value::from(property)])?;
    Ok(())
}

/// Run the component's `dispose` member
pub fn dispose(registry: &TypeRegistry, component: &Value) -> ReflectResult<()> {
    registry.invoke(component, "dispose", &[])?;
    Ok(())
}

// ============================================================================
// Events
// ============================================================================

fn declares_event(registry: &TypeRegistry, ty: TypeId, event: &str) -> bool {
    registry.resolve_inheritance(ty);
    registry
        .descriptor(ty)
        .and_then(|desc| desc.member(event))
        .is_some_and(|member| member.is_event())
}

fn component_object(value: &Value) -> ReflectResult<&ObjectRef> {
    value
        .as_object()
        .ok_or_else(|| ReflectError::argument("component", resources::NOT_A_COMPONENT))
}

/// Subscribe `handler` to an event declared on the component's type
pub fn add_event_handler(
    registry: &TypeRegistry,
    component: &Value,
    event: &str,
    handler: &Value,
) -> ReflectResult<()> {
    if registry.options().validate_arguments {
        registry
            .validator()
            .validate_params(&[Value::from(event), handler.clone()], &signatures::EVENT_HANDLER)?;
    }
    let obj = component_object(component)?;
    if !declares_event(registry, registry.get_type(component), event) {
        return Err(ReflectError::invalid_operation(format1(resources::UNDEFINED_EVENT, event)));
    }
    let handler = handler
        .as_function()
        .cloned()
        .ok_or_else(|| ReflectError::invalid_operation(resources::EVENT_HANDLER_NOT_FUNCTION))?;
    with_state(obj, |state| state.events.add_handler(event, handler))
}

/// Unsubscribe `handler`. Returns whether it was subscribed.
pub fn remove_event_handler(
    registry: &TypeRegistry,
    component: &Value,
    event: &str,
    handler: &Value,
) -> ReflectResult<bool> {
    if registry.options().validate_arguments {
        registry
            .validator()
            .validate_params(&[Value::from(event), handler.clone()], &signatures::EVENT_HANDLER)?;
    }
    let obj = component_object(component)?;
    match handler.as_function() {
        Some(handler) => with_state(obj, |state| state.events.remove_handler(event, handler)),
        None => Ok(false),
    }
}

// ============================================================================
// Properties
// ============================================================================

/// Apply `properties` to `target`.
///
/// On typed objects each name goes through the registered accessor: the
/// setter when there is one, otherwise the getter's result is appended to
/// (array values) or recursed into (nested property maps). Names without an
/// accessor assign an existing field. Plain objects take any field.
///
/// A component not already updating is wrapped in its own update batch.
pub fn set_properties(
    registry: &TypeRegistry,
    target: &Value,
    properties: &[(String, Value)],
) -> ReflectResult<()> {
    let obj = match target {
        Value::Object(obj) => obj,
        other => {
            return Err(ReflectError::argument_type(
                "target",
                registry.get_type_name(other),
                "Object",
            ))
        }
    };
    let (ty, batch) = {
        let instance = obj.borrow();
        let batch = instance.component().is_some_and(|state| !state.updating);
        (instance.type_id(), batch)
    };

    if batch {
        begin_update(registry, target)?;
    }
    for (name, value) in properties {
        match ty {
            Some(ty) => set_typed(registry, ty, obj, name, value)?,
            None => set_plain(registry, obj, name, value)?,
        }
    }
    if batch {
        end_update(registry, target)?;
    }
    Ok(())
}

fn set_plain(
    registry: &TypeRegistry,
    obj: &ObjectRef,
    name: &str,
    value: &Value,
) -> ReflectResult<()> {
    let existing = obj.borrow().get(name).cloned();
    match existing {
        Some(existing @ Value::Object(_)) if value.is_plain_object() => {
            set_properties(registry, &existing, &entries(value))
        }
        _ => {
            obj.borrow_mut().set(name, value.clone());
            Ok(())
        }
    }
}

fn set_typed(
    registry: &TypeRegistry,
    ty: TypeId,
    obj: &ObjectRef,
    name: &str,
    value: &Value,
) -> ReflectResult<()> {
    registry.resolve_inheritance(ty);
    let member = registry.descriptor(ty).and_then(|desc| desc.member(name));
    match member {
        Some(Member::Property(accessor)) => {
            if let Some(result) = accessor.set(registry, obj, value.clone()) {
                return result;
            }
            let current = match accessor.get(registry, obj) {
                Some(result) => result?,
                None => return Err(not_writable(name)),
            };
            apply_through_getter(registry, name, &current, value)
        }
        Some(Member::Method(_)) | Some(Member::Event) => Err(not_writable(name)),
        Some(Member::Field(_)) | None => {
            let existing = obj.borrow().get(name).cloned();
            match existing {
                None => Err(ReflectError::invalid_operation(format1(
                    resources::PROPERTY_UNDEFINED,
                    name,
                ))),
                Some(existing @ Value::Object(_)) if value.is_plain_object() => {
                    set_properties(registry, &existing, &entries(value))
                }
                Some(_) => {
                    obj.borrow_mut().set(name, value.clone());
                    Ok(())
                }
            }
        }
    }
}

fn apply_through_getter(
    registry: &TypeRegistry,
    name: &str,
    current: &Value,
    value: &Value,
) -> ReflectResult<()> {
    if let Value::Array(items) = value {
        let Value::Array(target) = current else {
            return Err(ReflectError::invalid_operation(format1(
                resources::PROPERTY_NOT_AN_ARRAY,
                name,
            )));
        };
        let appended = items.borrow().clone();
        target.borrow_mut().extend(appended);
        return Ok(());
    }
    if value.is_plain_object() {
        if current.is_nullish() {
            return Err(ReflectError::invalid_operation(format1(
                resources::PROPERTY_NULL_OR_UNDEFINED,
                name,
            )));
        }
        return set_properties(registry, current, &entries(value));
    }
    Err(not_writable(name))
}

fn not_writable(name: &str) -> ReflectError {
    ReflectError::invalid_operation(format1(resources::PROPERTY_NOT_WRITABLE, name))
}

/// Id of a component, if it has one
pub(crate) fn component_id(obj: &ObjectRef) -> ReflectResult<Option<String>> {
    obj.borrow()
        .component()
        .map(|state| state.id.clone())
        .ok_or_else(|| ReflectError::argument("component", resources::NOT_A_COMPONENT))
}
