//! Runtime: a registry paired with its application
//!
//! Most callers only need one registry and one application. `Runtime` owns
//! both and exposes the construction entry points without threading the
//! registry through every call.

use metaform_sdk::{ObjectRef, ReflectResult, Value};

use crate::component::{Application, ComponentDescriptor};
use crate::options::RuntimeOptions;
use crate::registry::TypeRegistry;
use crate::validate::signatures;

/// Type registry plus application state
#[derive(Debug, Default)]
pub struct Runtime {
    registry: TypeRegistry,
    application: Application,
}

impl Runtime {
    /// Create a runtime with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runtime with the given options
    pub fn with_options(options: RuntimeOptions) -> Self {
        Self {
            registry: TypeRegistry::with_options(options),
            application: Application::new(),
        }
    }

    /// The type registry
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// The type registry, for registration
    pub fn registry_mut(&mut self) -> &mut TypeRegistry {
        &mut self.registry
    }

    /// The application
    pub fn application(&self) -> &Application {
        &self.application
    }

    /// The application, for direct store manipulation
    pub fn application_mut(&mut self) -> &mut Application {
        &mut self.application
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Create a component. See [`Application::create`].
    pub fn create(&mut self, desc: ComponentDescriptor) -> ReflectResult<ObjectRef> {
        self.application.create(&self.registry, desc)
    }

    /// Start a construction batch
    pub fn begin_create_components(&mut self) {
        self.application.begin_create_components();
    }

    /// Finish a construction batch
    pub fn end_create_components(&mut self) -> ReflectResult<Vec<ObjectRef>> {
        self.application.end_create_components(&self.registry)
    }

    /// Find a component by an id supplied as a dynamic value
    pub fn find_component(&self, id: &Value) -> ReflectResult<Option<ObjectRef>> {
        if self.registry.options().validate_arguments {
            self.registry
                .validator()
                .validate_params(std::slice::from_ref(id), &signatures::FIND_COMPONENT)?;
        }
        Ok(id.as_str().and_then(|id| self.application.find_component(id)))
    }

    /// Dispose a single component
    pub fn dispose_component(&mut self, component: &ObjectRef) -> ReflectResult<()> {
        self.application.dispose_component(&self.registry, component)
    }

    /// Dispose every tracked object
    pub fn dispose(&mut self) -> ReflectResult<()> {
        self.application.dispose(&self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::builtins::COMPONENT;
    use crate::registry::TypeSpec;
    use metaform_sdk::ErrorKind;

    #[test]
    fn test_find_component_validates_id() {
        let mut runtime = Runtime::new();
        runtime.registry_mut().register_namespace("Demo").unwrap();
        let ty = runtime.registry_mut().define_type("Demo.Part", TypeSpec::new()).unwrap();
        runtime
            .registry_mut()
            .register_class("Demo.Part", ty, Some(COMPONENT), &[])
            .unwrap();

        runtime
            .create(ComponentDescriptor::new(ty).property("id", "part"))
            .unwrap();
        assert!(runtime.find_component(&Value::from("part")).unwrap().is_some());
        assert!(runtime.find_component(&Value::from("other")).unwrap().is_none());

        let err = runtime.find_component(&Value::from(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentType);
        let err = runtime.find_component(&Value::Null).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentNull);
    }

    #[test]
    fn test_release_skips_boundary_checks() {
        let runtime = Runtime::with_options(RuntimeOptions::release());
        assert!(runtime.find_component(&Value::from(1)).unwrap().is_none());
    }
}
