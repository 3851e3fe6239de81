//! Tests for namespace and type registration

use metaform_engine::builtins::{self, COMPONENT, I_DISPOSABLE};
use metaform_engine::{GlobalScope, HostScope, RuntimeOptions, TypeKind, TypeRegistry, TypeSpec};
use metaform_sdk::{ErrorKind, Value};

/// Route `tracing` output to the test harness (`RUST_LOG=debug` to see it)
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn registry_with(namespace: &str) -> TypeRegistry {
    init_tracing();
    let mut registry = TypeRegistry::new();
    registry.register_namespace(namespace).unwrap();
    registry
}

// ============================================================================
// Namespaces
// ============================================================================

mod namespaces {
    use super::*;

    #[test]
    fn test_chain_is_created_once() {
        let mut registry = TypeRegistry::new();
        let first = registry.register_namespace("Acme.Billing.Invoices").unwrap();
        let second = registry.register_namespace("Acme.Billing.Invoices").unwrap();
        assert!(std::rc::Rc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "Acme.Billing.Invoices");

        let acme = registry.lookup("Acme").unwrap();
        assert!(registry.is_namespace(&acme));
        assert_eq!(registry.get_name(&acme), "Acme");
        assert!(registry.lookup("Acme.Billing").is_some());
    }

    #[test]
    fn test_root_namespaces_are_tracked_in_order() {
        let mut registry = TypeRegistry::new();
        registry.register_namespace("Zeta.Inner").unwrap();
        registry.register_namespace("Alpha").unwrap();
        registry.register_namespace("Zeta.Other").unwrap();
        let names: Vec<String> = registry
            .get_root_namespaces()
            .iter()
            .map(|ns| ns.name().to_string())
            .collect();
        assert_eq!(names, vec!["Core", "Zeta", "Alpha"]);
    }

    #[test]
    fn test_invalid_paths() {
        let mut registry = TypeRegistry::new();
        for path in ["", "a..b", "1abc", "Acme.", "Acme.class"] {
            let err = registry.register_namespace(path).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Argument, "path {:?}", path);
            assert_eq!(err.param_name(), Some("namespacePath"));
        }
    }

    #[test]
    fn test_segment_holding_an_object_is_rejected() {
        let mut registry = TypeRegistry::new();
        let err = registry.register_namespace("Core.Component.Parts").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert!(err.to_string().contains("Core.Component"));
    }

    #[test]
    fn test_depth_limit() {
        let options = RuntimeOptions {
            max_namespace_depth: 2,
            ..RuntimeOptions::default()
        };
        let mut registry = TypeRegistry::with_options(options);
        assert!(registry.register_namespace("A.B").is_ok());
        assert!(registry.register_namespace("A.B.C").is_err());
    }
}

// ============================================================================
// Classes and interfaces
// ============================================================================

mod classes {
    use super::*;

    #[test]
    fn test_register_class_with_base_and_interface() {
        let mut registry = registry_with("Shop");
        let priced = registry.define_type("Shop.IPriced", TypeSpec::new()).unwrap();
        registry.register_interface("Shop.IPriced", priced).unwrap();

        let item = registry
            .define_type(
                "Shop.Item",
                TypeSpec::new().method("price", |_, _, _| Ok(Value::from(10))),
            )
            .unwrap();
        registry.register_class("Shop.Item", item, Some(COMPONENT), &[priced]).unwrap();

        let desc = registry.descriptor(item).unwrap();
        assert_eq!(desc.name(), Some("Shop.Item"));
        assert_eq!(desc.kind(), TypeKind::Class);
        assert_eq!(desc.base(), Some(COMPONENT));
        assert!(registry.inherits_from(item, COMPONENT));
        assert!(registry.implements_interface(item, priced));
        assert!(registry.implements_interface(item, I_DISPOSABLE));
        assert!(registry.is_class(&Value::Type(item)));
        assert!(registry.is_interface(&Value::Type(priced)));
        assert!(registry.is_registered("Shop.Item"));
    }

    #[test]
    fn test_registering_twice_fails() {
        let mut registry = registry_with("Shop");
        let item = registry.define_type("Shop.Item", TypeSpec::new()).unwrap();
        registry.register_class("Shop.Item", item, None, &[]).unwrap();
        let err = registry.register_class("Shop.Item", item, None, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert!(err.to_string().contains("Type Shop.Item has already been registered"));
    }

    #[test]
    fn test_name_must_resolve_to_the_type() {
        let mut registry = registry_with("Shop");
        let item = registry.define_type("Shop.Item", TypeSpec::new()).unwrap();
        let other = registry.define_type("Shop.Other", TypeSpec::new()).unwrap();

        let err = registry.register_class("Shop.Missing", item, None, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);
        assert_eq!(err.param_name(), Some("typeName"));

        let err = registry.register_class("Shop.Other", item, None, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);

        let err = registry.register_class("Shop..Item", item, None, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);

        assert!(registry.register_class("Shop.Other", other, None, &[]).is_ok());
    }

    #[test]
    fn test_failed_registration_leaves_no_trace() {
        let mut registry = registry_with("Shop");
        let item = registry.define_type("Shop.Item", TypeSpec::new()).unwrap();
        let not_iface = registry.define_type("Shop.NotIface", TypeSpec::new()).unwrap();

        let err = registry
            .register_class("Shop.Item", item, None, &[not_iface])
            .unwrap_err();
        assert_eq!(err.param_name(), Some("interfaceTypes[0]"));
        assert!(!registry.is_registered("Shop.Item"));
        assert_eq!(registry.descriptor(item).unwrap().kind(), TypeKind::Unregistered);

        let err = registry
            .register_class("Shop.Item", item, Some(I_DISPOSABLE), &[])
            .unwrap_err();
        assert_eq!(err.param_name(), Some("baseType"));
        assert!(registry.register_class("Shop.Item", item, None, &[]).is_ok());
    }

    #[test]
    fn test_parse_type() {
        let mut registry = registry_with("Shop");
        let item = registry.define_type("Shop.Item", TypeSpec::new()).unwrap();
        registry.register_class("Shop.Item", item, None, &[]).unwrap();

        assert_eq!(registry.parse_type("Shop.Item").unwrap(), Some(item));
        assert_eq!(registry.parse_type("").unwrap(), None);
        assert!(registry.parse_type("Shop").is_err());
        assert!(registry.parse_type("Shop.Nope").is_err());

        let shop = registry.register_namespace("Shop").unwrap();
        assert_eq!(registry.parse_type_in(&shop, "item"), Some(item));
        assert_eq!(registry.parse_type_in(&shop, "ITEM"), Some(item));
        assert_eq!(registry.parse_type_in(&shop, "nope"), None);
    }

    #[test]
    fn test_registered_types_include_builtins() {
        let mut registry = registry_with("Shop");
        let item = registry.define_type("Shop.Item", TypeSpec::new()).unwrap();
        registry.register_class("Shop.Item", item, None, &[]).unwrap();
        let types = registry.get_registered_types();
        assert_eq!(types.len(), builtins::BUILTIN_COUNT + 1);
        assert_eq!(types.last(), Some(&item));
    }
}

// ============================================================================
// Host scopes
// ============================================================================

mod scopes {
    use super::*;

    /// Scope that counts root-level definitions
    struct CountingScope {
        inner: GlobalScope,
        defines: std::rc::Rc<std::cell::Cell<usize>>,
    }

    impl HostScope for CountingScope {
        fn lookup_global(&self, name: &str) -> Option<Value> {
            self.inner.lookup_global(name)
        }

        fn define_global(&mut self, name: &str, value: Value) {
            self.defines.set(self.defines.get() + 1);
            self.inner.define_global(name, value);
        }
    }

    #[test]
    fn test_custom_scope_receives_bindings() {
        let defines = std::rc::Rc::new(std::cell::Cell::new(0));
        let scope = CountingScope {
            inner: GlobalScope::new(),
            defines: defines.clone(),
        };
        let mut registry = TypeRegistry::with_scope(RuntimeOptions::default(), Box::new(scope));
        let builtin_defines = defines.get();
        assert!(builtin_defines > 0);

        registry.register_namespace("Plugins").unwrap();
        let ty = registry.define_type("Plugins.Loader", TypeSpec::new()).unwrap();
        registry.register_class("Plugins.Loader", ty, None, &[]).unwrap();
        assert_eq!(defines.get(), builtin_defines + 1);
        assert_eq!(registry.lookup("Plugins.Loader"), Some(Value::Type(ty)));
    }

    #[test]
    fn test_assign_requires_namespace_parent() {
        let mut registry = registry_with("Shop");
        assert!(registry.assign("Shop.Constant", Value::from(1)).is_ok());
        let err = registry.assign("Nowhere.Constant", Value::from(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);
        let err = registry.assign("Shop.Constant.Inner", Value::from(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }
}
