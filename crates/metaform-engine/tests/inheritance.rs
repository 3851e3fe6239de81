//! Tests for inheritance resolution, reflection and base dispatch

use metaform_engine::builtins::{COMPONENT, I_DISPOSABLE, OBJECT};
use metaform_engine::{Member, RuntimeOptions, TypeRegistry, TypeSpec, CONSTRUCTOR};
use metaform_sdk::{ErrorKind, ReflectContext, TypeId, Value};

/// `Vehicles.Vehicle` <- `Vehicles.Car` <- `Vehicles.SportsCar`, each
/// overriding `describe` and delegating to its base through a captured id.
fn vehicles(options: RuntimeOptions) -> (TypeRegistry, TypeId, TypeId, TypeId) {
    let mut registry = TypeRegistry::with_options(options);
    registry.register_namespace("Vehicles").unwrap();

    let vehicle = registry
        .define_type(
            "Vehicles.Vehicle",
            TypeSpec::new()
                .method("describe", |_, _, _| Ok(Value::from("vehicle")))
                .method("wheels", |_, _, _| Ok(Value::from(4)))
                .field("speed", 0),
        )
        .unwrap();
    registry.register_class("Vehicles.Vehicle", vehicle, None, &[]).unwrap();

    let car = derive(&mut registry, "Vehicles.Car", "car", vehicle);
    let sports = derive(&mut registry, "Vehicles.SportsCar", "sports", car);
    (registry, vehicle, car, sports)
}

fn derive(registry: &mut TypeRegistry, name: &str, label: &'static str, base: TypeId) -> TypeId {
    let ty = registry.new_type();
    registry
        .add_member(
            ty,
            "describe",
            Member::method("describe", move |ctx, this, _| {
                let inner = ctx.call_base_method(ty, this, "describe", None)?;
                Ok(Value::from(format!("{}:{}", label, inner)))
            }),
        )
        .unwrap();
    registry.assign(name, Value::Type(ty)).unwrap();
    registry.register_class(name, ty, Some(base), &[]).unwrap();
    ty
}

// ============================================================================
// Member resolution
// ============================================================================

mod resolution {
    use super::*;

    #[test]
    fn test_base_members_reachable_after_first_use() {
        let (registry, vehicle, car, _) = vehicles(RuntimeOptions::default());
        assert!(registry.inherits_from(car, vehicle));

        let desc = registry.descriptor(car).unwrap();
        for (name, _) in registry.descriptor(vehicle).unwrap().members().iter() {
            assert!(desc.members().contains(name), "missing {}", name);
        }
        assert!(!desc.is_base_merge_pending());
    }

    #[test]
    fn test_shadowed_members_are_kept() {
        let (registry, _, car, _) = vehicles(RuntimeOptions::default());
        let obj = Value::Object(registry.construct(car, None, &[]).unwrap());
        assert_eq!(registry.invoke(&obj, "describe", &[]).unwrap(), Value::from("car:vehicle"));
        assert_eq!(registry.invoke(&obj, "wheels", &[]).unwrap(), Value::from(4));
        assert_eq!(obj.as_object().unwrap().borrow().get("speed"), Some(&Value::from(0)));
    }

    #[test]
    fn test_override_chain_dispatches_through_each_base() {
        let (registry, _, _, sports) = vehicles(RuntimeOptions::default());
        let obj = Value::Object(registry.construct(sports, None, &[]).unwrap());
        assert_eq!(
            registry.invoke(&obj, "describe", &[]).unwrap(),
            Value::from("sports:car:vehicle")
        );
    }

    #[test]
    fn test_resolve_all_then_nothing_pending() {
        let (registry, _, car, sports) = vehicles(RuntimeOptions::default());
        assert_eq!(registry.resolve_all(), 2);
        assert!(!registry.descriptor(car).unwrap().is_base_merge_pending());
        assert!(!registry.descriptor(sports).unwrap().is_base_merge_pending());
        assert!(registry.descriptor(sports).unwrap().members().contains("wheels"));
        assert_eq!(registry.resolve_all(), 0);
    }

    #[test]
    fn test_eager_resolution() {
        let (registry, _, car, sports) = vehicles(RuntimeOptions::eager());
        assert!(!registry.descriptor(car).unwrap().is_base_merge_pending());
        assert!(!registry.descriptor(sports).unwrap().is_base_merge_pending());
        assert_eq!(registry.resolve_all(), 0);
    }

    #[test]
    fn test_resolving_subtype_resolves_bases_first() {
        let (registry, _, car, sports) = vehicles(RuntimeOptions::default());
        registry.resolve_inheritance(sports);
        assert!(!registry.descriptor(car).unwrap().is_base_merge_pending());
        let members = registry.descriptor(sports).unwrap().members();
        assert!(members.contains("speed"));
    }
}

// ============================================================================
// Interfaces
// ============================================================================

mod interfaces {
    use super::*;

    #[test]
    fn test_interface_members_become_callable() {
        let mut registry = TypeRegistry::new();
        registry.register_namespace("Io").unwrap();
        let closable = registry
            .define_type(
                "Io.IClosable",
                TypeSpec::new()
                    .method("close", |_, _, _| Ok(Value::from("closed")))
                    .method("flush", |_, _, _| Ok(Value::from("interface flush"))),
            )
            .unwrap();
        registry.register_interface("Io.IClosable", closable).unwrap();

        let file = registry
            .define_type(
                "Io.File",
                TypeSpec::new().method("flush", |_, _, _| Ok(Value::from("file flush"))),
            )
            .unwrap();
        registry.register_class("Io.File", file, None, &[closable]).unwrap();

        assert!(registry.implements_interface(file, closable));
        let obj = Value::Object(registry.construct(file, None, &[]).unwrap());
        assert_eq!(registry.invoke(&obj, "close", &[]).unwrap(), Value::from("closed"));
        assert_eq!(registry.invoke(&obj, "flush", &[]).unwrap(), Value::from("file flush"));
        assert!(registry.is_implemented_by(closable, &obj));
        assert!(!registry.is_implemented_by(closable, &Value::Null));
    }

    #[test]
    fn test_interfaces_inherited_through_base() {
        let mut registry = TypeRegistry::new();
        registry.register_namespace("Ui").unwrap();
        let panel = registry.define_type("Ui.Panel", TypeSpec::new()).unwrap();
        registry.register_class("Ui.Panel", panel, Some(COMPONENT), &[]).unwrap();

        assert!(registry.implements_interface(panel, I_DISPOSABLE));
        assert!(registry.get_interfaces(panel).contains(&I_DISPOSABLE));
        assert!(!registry.implements_interface(panel, panel));
    }
}

// ============================================================================
// Construction and base dispatch
// ============================================================================

mod construction {
    use super::*;

    #[test]
    fn test_initialize_base_runs_base_constructor() {
        let mut registry = TypeRegistry::new();
        registry.register_namespace("Geo").unwrap();
        let point = registry
            .define_type(
                "Geo.Point",
                TypeSpec::new().method(CONSTRUCTOR, |_, this, args| {
                    if let Some(obj) = this.as_object() {
                        obj.borrow_mut().set("x", args.first().cloned().unwrap_or(Value::from(0)));
                    }
                    Ok(Value::Undefined)
                }),
            )
            .unwrap();
        registry.register_class("Geo.Point", point, None, &[]).unwrap();

        let labelled = registry.new_type();
        registry
            .add_member(
                labelled,
                CONSTRUCTOR,
                Member::method(CONSTRUCTOR, move |ctx, this, args| {
                    ctx.call_base_method(labelled, this, CONSTRUCTOR, Some(args))?;
                    if let Some(obj) = this.as_object() {
                        obj.borrow_mut().set("label", Value::from("p"));
                    }
                    Ok(Value::Undefined)
                }),
            )
            .unwrap();
        registry.assign("Geo.Labelled", Value::Type(labelled)).unwrap();
        registry.register_class("Geo.Labelled", labelled, Some(point), &[]).unwrap();

        let obj = registry.construct(labelled, None, &[Value::from(7)]).unwrap();
        assert_eq!(obj.borrow().get("x"), Some(&Value::from(7)));
        assert_eq!(obj.borrow().get("label"), Some(&Value::from("p")));

        registry
            .initialize_base(labelled, &Value::Object(obj.clone()), Some(&[Value::from(9)]))
            .unwrap();
        assert_eq!(obj.borrow().get("x"), Some(&Value::from(9)));
    }

    #[test]
    fn test_reflect_context_is_object_safe() {
        let (registry, vehicle, car, _) = vehicles(RuntimeOptions::default());
        let ctx: &dyn ReflectContext = &registry;
        assert_eq!(ctx.type_name(car), "Vehicles.Car");
        assert_eq!(ctx.base_type(car), Some(vehicle));
        assert!(ctx.inherits_from(car, vehicle));
        assert!(ctx.is_instance_of_type(OBJECT, &Value::from("text")));
    }

    #[test]
    fn test_get_base_method() {
        let (registry, _, car, _) = vehicles(RuntimeOptions::default());
        let obj = Value::Object(registry.construct(car, None, &[]).unwrap());
        let base = registry.get_base_method(car, &obj, "describe").unwrap().unwrap();
        assert_eq!(base.call(&registry, &obj, &[]).unwrap(), Value::from("vehicle"));
        assert!(registry.get_base_method(car, &obj, "missing").unwrap().is_none());

        let err = registry.get_base_method(car, &Value::from(1), "describe").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentType);
    }

    #[test]
    fn test_type_names() {
        let (registry, vehicle, car, _) = vehicles(RuntimeOptions::default());
        let obj = Value::Object(registry.construct(car, None, &[]).unwrap());
        assert_eq!(registry.get_type(&obj), car);
        assert_eq!(registry.get_type_name(&obj), "Vehicles.Car");
        assert_eq!(registry.get_base_type(car), Some(vehicle));
        assert_eq!(registry.get_base_type(vehicle), None);
        assert_eq!(registry.get_name(&Value::Type(vehicle)), "Vehicles.Vehicle");
        assert_eq!(registry.get_name(&Value::from(3)), "");
    }
}
