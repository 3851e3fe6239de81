//! Built-in types installed into every registry
//!
//! Root classes mirror the host's primitive constructors. The `Core`
//! namespace carries the component model: the lifecycle interfaces,
//! `Core.Component` and the UI-bound `Core.UI.Control` / `Core.UI.Behavior`.

use metaform_sdk::{
    ComponentState, Lifecycle, Namespace, NamespaceRef, ObjectRef, PropertyAccessor, ReflectContext,
    ReflectError, ReflectResult, TypeId, Value,
};

use super::descriptor::{Member, MemberTable, TypeKind};
use super::TypeRegistry;
use crate::resources;

// ============================================================================
// Fixed type ids
// ============================================================================

/// Universal root type
pub const OBJECT: TypeId = TypeId::new(0);
/// Boolean primitive
pub const BOOLEAN: TypeId = TypeId::new(1);
/// Number primitive
pub const NUMBER: TypeId = TypeId::new(2);
/// String primitive
pub const STRING: TypeId = TypeId::new(3);
/// Array
pub const ARRAY: TypeId = TypeId::new(4);
/// Native callables
pub const FUNCTION: TypeId = TypeId::new(5);
/// Type handles (derives from `Function`)
pub const TYPE: TypeId = TypeId::new(6);
/// Error objects
pub const ERROR: TypeId = TypeId::new(7);
/// `Core.IDisposable`
pub const I_DISPOSABLE: TypeId = TypeId::new(8);
/// `Core.INotifyPropertyChange`
pub const I_NOTIFY_PROPERTY_CHANGE: TypeId = TypeId::new(9);
/// `Core.INotifyDisposing`
pub const I_NOTIFY_DISPOSING: TypeId = TypeId::new(10);
/// `Core.Component`
pub const COMPONENT: TypeId = TypeId::new(11);
/// `Core.UI.Control`
pub const CONTROL: TypeId = TypeId::new(12);
/// `Core.UI.Behavior`
pub const BEHAVIOR: TypeId = TypeId::new(13);

/// Number of built-in descriptors
pub const BUILTIN_COUNT: usize = 14;

/// Event raised by `dispose`
pub const DISPOSING_EVENT: &str = "disposing";
/// Event raised by `raisePropertyChanged`
pub const PROPERTY_CHANGED_EVENT: &str = "propertyChanged";

// ============================================================================
// Component state helpers
// ============================================================================

fn not_a_component() -> ReflectError {
    ReflectError::argument("this", resources::NOT_A_COMPONENT)
}

/// Run `f` against the component state of `obj`
pub(crate) fn with_state<R>(
    obj: &ObjectRef,
    f: impl FnOnce(&mut ComponentState) -> R,
) -> ReflectResult<R> {
    let mut instance = obj.borrow_mut();
    let state = instance.component_mut().ok_or_else(not_a_component)?;
    Ok(f(state))
}

fn with_this<R>(this: &Value, f: impl FnOnce(&mut ComponentState) -> R) -> ReflectResult<R> {
    let obj = this.as_object().ok_or_else(not_a_component)?;
    with_state(obj, f)
}

/// Invoke every handler subscribed to `event` on `this`.
///
/// Handlers are snapshotted first so a handler may unsubscribe itself.
pub(crate) fn raise_event(
    ctx: &dyn ReflectContext,
    this: &Value,
    event: &str,
    args: &[Value],
) -> ReflectResult<()> {
    let handlers = with_this(this, |state| state.events.handlers(event))?;
    for handler in handlers {
        handler.call(ctx, this, args)?;
    }
    Ok(())
}

// ============================================================================
// Member tables
// ============================================================================

fn component_members() -> MemberTable {
    let mut members = MemberTable::new();

    members.insert(
        "id",
        Member::Property(
            PropertyAccessor::new()
                .with_getter(|_, obj| {
                    with_state(obj, |state| state.id.clone().map_or(Value::Null, Value::from))
                })
                .with_setter(|ctx, obj, value| {
                    let id = match value.as_str() {
                        Some(id) => id.to_string(),
                        None => {
                            return Err(ReflectError::argument_type(
                                "value",
                                ctx.type_name(ctx.get_type(&value)),
                                "String",
                            ))
                        }
                    };
                    with_state(obj, |state| {
                        if state.id_set {
                            return Err(ReflectError::invalid_operation(
                                resources::COMPONENT_CANT_SET_ID_TWICE,
                            ));
                        }
                        state.id_set = true;
                        state.id = Some(id);
                        Ok(())
                    })?
                }),
        ),
    );
    members.insert(
        "isInitialized",
        Member::Property(
            PropertyAccessor::new()
                .with_getter(|_, obj| with_state(obj, |state| Value::Bool(state.initialized))),
        ),
    );
    members.insert(
        "isUpdating",
        Member::Property(
            PropertyAccessor::new()
                .with_getter(|_, obj| with_state(obj, |state| Value::Bool(state.updating))),
        ),
    );

    members.insert(DISPOSING_EVENT, Member::Event);
    members.insert(PROPERTY_CHANGED_EVENT, Member::Event);

    members.insert(
        "beginUpdate",
        Member::method("beginUpdate", |_, this, _| {
            with_this(this, |state| {
                state.updating = true;
                state.phase = Lifecycle::Updating;
            })?;
            Ok(Value::Undefined)
        }),
    );
    members.insert(
        "endUpdate",
        Member::method("endUpdate", |ctx, this, _| {
            let initialized = with_this(this, |state| {
                state.updating = false;
                state.initialized
            })?;
            if !initialized {
                ctx.invoke(this, "initialize", &[])?;
            }
            ctx.invoke(this, "updated", &[])?;
            Ok(Value::Undefined)
        }),
    );
    members.insert(
        "initialize",
        Member::method("initialize", |_, this, _| {
            with_this(this, |state| {
                state.initialized = true;
                state.phase = Lifecycle::Initialized;
            })?;
            Ok(Value::Undefined)
        }),
    );
    members.insert("updated", Member::method("updated", |_, _, _| Ok(Value::Undefined)));
    members.insert(
        "raisePropertyChanged",
        Member::method("raisePropertyChanged", |ctx, this, args| {
            let name = match args.first() {
                Some(Value::String(name)) => name.clone(),
                Some(other) => {
                    return Err(ReflectError::argument_type(
                        "propertyName",
                        ctx.type_name(ctx.get_type(other)),
                        "String",
                    ))
                }
                None => return Err(ReflectError::parameter_count()),
            };
            let event_args = Value::plain([("propertyName", Value::String(name))]);
            raise_event(ctx, this, PROPERTY_CHANGED_EVENT, &[event_args])?;
            Ok(Value::Undefined)
        }),
    );
    members.insert(
        "dispose",
        Member::method("dispose", |ctx, this, _| {
            raise_event(ctx, this, DISPOSING_EVENT, &[])?;
            with_this(this, |state| {
                state.events.clear();
                state.updating = false;
                state.phase = Lifecycle::Disposed;
            })?;
            Ok(Value::Undefined)
        }),
    );

    members
}

fn element_members() -> MemberTable {
    let mut members = MemberTable::new();
    members.insert(
        "element",
        Member::Property(PropertyAccessor::new().with_getter(|_, obj| {
            Ok(obj.borrow().element().cloned().map_or(Value::Null, Value::Element))
        })),
    );
    members
}

fn interface_placeholder(name: &'static str) -> Member {
    Member::method(name, |_, _, _| Err(ReflectError::not_implemented(resources::NOT_IMPLEMENTED)))
}

// ============================================================================
// Installation
// ============================================================================

/// Create a framework namespace directly, overwriting whatever the scope
/// held under that path.
fn framework_namespace(
    registry: &mut TypeRegistry,
    parent: Option<&NamespaceRef>,
    segment: &str,
) -> NamespaceRef {
    let full = match parent {
        Some(p) => format!("{}.{}", p.name(), segment),
        None => segment.to_string(),
    };
    let ns = Namespace::new(full);
    match parent {
        Some(p) => p.set(segment, Value::Namespace(ns.clone())),
        None => {
            registry.scope.define_global(segment, Value::Namespace(ns.clone()));
            registry.root_namespaces.push(ns.clone());
        }
    }
    ns
}

/// Install the built-in descriptors. Ids are assigned in declaration order
/// and match the constants above.
pub(crate) fn install(registry: &mut TypeRegistry) {
    let roots = [
        ("Object", OBJECT, None),
        ("Boolean", BOOLEAN, None),
        ("Number", NUMBER, None),
        ("String", STRING, None),
        ("Array", ARRAY, None),
        ("Function", FUNCTION, None),
        ("Type", TYPE, Some(FUNCTION)),
        ("Error", ERROR, None),
    ];
    for (name, expected, base) in roots {
        let id = registry.install_builtin(name, TypeKind::Class, base, &[], MemberTable::new());
        debug_assert_eq!(id, expected);
        registry.scope.define_global(name, Value::Type(id));
    }

    let core = framework_namespace(registry, None, "Core");
    let ui = framework_namespace(registry, Some(&core), "UI");

    let mut disposable = MemberTable::new();
    disposable.insert("dispose", interface_placeholder("dispose"));
    let mut property_change = MemberTable::new();
    property_change.insert(PROPERTY_CHANGED_EVENT, Member::Event);
    let mut notify_disposing = MemberTable::new();
    notify_disposing.insert(DISPOSING_EVENT, Member::Event);

    let interfaces = [
        ("IDisposable", I_DISPOSABLE, disposable),
        ("INotifyPropertyChange", I_NOTIFY_PROPERTY_CHANGE, property_change),
        ("INotifyDisposing", I_NOTIFY_DISPOSING, notify_disposing),
    ];
    for (name, expected, members) in interfaces {
        let full = format!("Core.{}", name);
        let id = registry.install_builtin(&full, TypeKind::Interface, None, &[], members);
        debug_assert_eq!(id, expected);
        core.set(name, Value::Type(id));
    }

    let component = registry.install_builtin(
        "Core.Component",
        TypeKind::Class,
        None,
        &[I_DISPOSABLE, I_NOTIFY_PROPERTY_CHANGE, I_NOTIFY_DISPOSING],
        component_members(),
    );
    debug_assert_eq!(component, COMPONENT);
    core.set("Component", Value::Type(component));

    for (name, expected) in [("Control", CONTROL), ("Behavior", BEHAVIOR)] {
        let full = format!("Core.UI.{}", name);
        let id = registry.install_builtin(
            &full,
            TypeKind::Class,
            Some(COMPONENT),
            &[],
            element_members(),
        );
        debug_assert_eq!(id, expected);
        ui.set(name, Value::Type(id));
    }

    registry.resolve_all();
}

/// Whether `ty` is one of the built-in primitive root classes, whose
/// instances are host values rather than metadata-carrying objects
pub(crate) fn matches_primitive(ty: TypeId, value: &Value) -> Option<bool> {
    let matched = match ty {
        OBJECT => !value.is_nullish(),
        BOOLEAN => matches!(value, Value::Bool(_)),
        NUMBER => matches!(value, Value::Number(_)),
        STRING => matches!(value, Value::String(_)),
        ARRAY => matches!(value, Value::Array(_)),
        FUNCTION => matches!(value, Value::Function(_) | Value::Type(_)),
        TYPE => matches!(value, Value::Type(_)),
        _ => return None,
    };
    Some(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistry;

    #[test]
    fn test_builtin_ids_are_bound() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.parse_type("Object").unwrap(), Some(OBJECT));
        assert_eq!(registry.parse_type("Number").unwrap(), Some(NUMBER));
        assert_eq!(registry.parse_type("Core.Component").unwrap(), Some(COMPONENT));
        assert_eq!(registry.parse_type("Core.UI.Control").unwrap(), Some(CONTROL));
        assert_eq!(registry.type_count(), BUILTIN_COUNT);
    }

    #[test]
    fn test_component_implements_lifecycle_interfaces() {
        let registry = TypeRegistry::new();
        assert!(registry.implements_interface(COMPONENT, I_DISPOSABLE));
        assert!(registry.implements_interface(CONTROL, I_NOTIFY_PROPERTY_CHANGE));
        assert!(registry.inherits_from(BEHAVIOR, COMPONENT));
        assert!(registry.inherits_from(TYPE, FUNCTION));
        assert!(!registry.inherits_from(COMPONENT, COMPONENT));
    }

    #[test]
    fn test_core_is_a_root_namespace() {
        let registry = TypeRegistry::new();
        let names: Vec<String> = registry
            .get_root_namespaces()
            .iter()
            .map(|ns| ns.name().to_string())
            .collect();
        assert_eq!(names, vec!["Core".to_string()]);
    }

    #[test]
    fn test_primitive_matching() {
        assert_eq!(matches_primitive(NUMBER, &Value::from(1)), Some(true));
        assert_eq!(matches_primitive(NUMBER, &Value::from("1")), Some(false));
        assert_eq!(matches_primitive(OBJECT, &Value::Null), Some(false));
        assert_eq!(matches_primitive(FUNCTION, &Value::Type(COMPONENT)), Some(true));
        assert_eq!(matches_primitive(COMPONENT, &Value::Null), None);
    }
}
