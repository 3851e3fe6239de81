//! Reflection API
//!
//! Runtime "is-a" queries, base-method dispatch and metadata accessors.
//! Every query resolves pending inheritance first, so results never depend
//! on whether a type has been used before.

use metaform_sdk::{FunctionRef, ReflectContext, ReflectError, ReflectResult, TypeId, Value};
use tracing::trace;

use crate::registry::builtins::{self, OBJECT};
use crate::registry::{Member, TypeRegistry};
use crate::resources;
use crate::validate::{signatures, ContractValidator};

impl TypeRegistry {
    // ========================================================================
    // Runtime types
    // ========================================================================

    /// Runtime type of a value. Values without metadata map to `Object`.
    pub fn get_type(&self, value: &Value) -> TypeId {
        match value {
            Value::Bool(_) => builtins::BOOLEAN,
            Value::Number(_) => builtins::NUMBER,
            Value::String(_) => builtins::STRING,
            Value::Array(_) => builtins::ARRAY,
            Value::Function(_) => builtins::FUNCTION,
            Value::Type(_) => builtins::TYPE,
            Value::Object(obj) => obj.borrow().type_id().unwrap_or(OBJECT),
            Value::Undefined | Value::Null | Value::Namespace(_) | Value::Element(_) => OBJECT,
        }
    }

    /// Registered name of a value's runtime type
    pub fn get_type_name(&self, value: &Value) -> String {
        self.type_name_of(self.get_type(value))
    }

    /// Registered name of `ty`, or an empty string
    pub fn type_name_of(&self, ty: TypeId) -> String {
        self.descriptor(ty)
            .and_then(|desc| desc.name())
            .unwrap_or_default()
            .to_string()
    }

    /// Immediate base class
    pub fn get_base_type(&self, ty: TypeId) -> Option<TypeId> {
        self.descriptor(ty).and_then(|desc| desc.base())
    }

    // ========================================================================
    // Relationship queries
    // ========================================================================

    /// Whether `value`'s runtime type is `ty`, derives from it or implements it
    pub fn is_instance_of_type(&self, ty: TypeId, value: &Value) -> bool {
        if value.is_nullish() {
            return false;
        }
        if let Some(matched) = builtins::matches_primitive(ty, value) {
            if matched {
                return true;
            }
        }
        let actual = self.get_type(value);
        actual == ty || self.inherits_from(actual, ty) || self.implements_interface(actual, ty)
    }

    /// Whether `base` is a strict ancestor of `ty`
    pub fn inherits_from(&self, ty: TypeId, base: TypeId) -> bool {
        self.resolve_inheritance(ty);
        let mut current = self.get_base_type(ty);
        while let Some(id) = current {
            if id == base {
                return true;
            }
            current = self.get_base_type(id);
        }
        false
    }

    /// Whether `ty` or one of its bases declares `iface`. Answers are cached
    /// per type, keyed by interface name.
    pub fn implements_interface(&self, ty: TypeId, iface: TypeId) -> bool {
        let Some(desc) = self.descriptor(ty) else {
            return false;
        };
        let Some(iface_name) = self.descriptor(iface).and_then(|d| d.name()) else {
            return false;
        };
        self.resolve_inheritance(ty);
        if let Some(&cached) = desc.interface_cache.borrow().get(iface_name) {
            return cached;
        }

        let mut found = false;
        let mut current = Some(ty);
        while let Some(id) = current {
            let Some(d) = self.descriptor(id) else { break };
            if d.interfaces().contains(&iface) {
                found = true;
                break;
            }
            current = d.base();
        }
        desc.interface_cache
            .borrow_mut()
            .insert(iface_name.to_string(), found);
        trace!(?ty, interface = iface_name, found, "interface cache fill");
        found
    }

    /// Interfaces declared along the base chain, without duplicates
    pub fn get_interfaces(&self, ty: TypeId) -> Vec<TypeId> {
        let mut result = Vec::new();
        let mut current = Some(ty);
        while let Some(id) = current {
            let Some(desc) = self.descriptor(id) else { break };
            for &iface in desc.interfaces() {
                if !result.contains(&iface) {
                    result.push(iface);
                }
            }
            current = desc.base();
        }
        result
    }

    /// Whether `value`'s runtime type implements `iface`
    pub fn is_implemented_by(&self, iface: TypeId, value: &Value) -> bool {
        if value.is_nullish() {
            return false;
        }
        self.implements_interface(self.get_type(value), iface)
    }

    // ========================================================================
    // Base dispatch
    // ========================================================================

    /// Method `name` as defined on the immediate base of `ty`.
    ///
    /// Looks in the base's own table, never the merged table of `ty`, so an
    /// override can reach the implementation it replaced.
    pub fn get_base_method(
        &self,
        ty: TypeId,
        instance: &Value,
        name: &str,
    ) -> ReflectResult<Option<FunctionRef>> {
        if !self.is_instance_of_type(ty, instance) {
            return Err(ReflectError::argument_type(
                "instance",
                self.get_type_name(instance),
                self.type_name_of(ty),
            ));
        }
        let Some(base) = self.get_base_type(ty) else {
            return Ok(None);
        };
        self.resolve_inheritance(base);
        Ok(self
            .descriptor(base)
            .and_then(|desc| desc.member(name))
            .and_then(|member| member.as_method().cloned()))
    }

    /// Invoke the base implementation of `name` on `instance`
    pub fn call_base_method(
        &self,
        ty: TypeId,
        instance: &Value,
        name: &str,
        args: Option<&[Value]>,
    ) -> ReflectResult<Value> {
        if self.options().validate_arguments {
            let base_args = args.map_or(Value::Null, |a| Value::array(a.to_vec()));
            ContractValidator::new(self).validate_params(
                &[instance.clone(), Value::from(name), base_args],
                &signatures::CALL_BASE_METHOD,
            )?;
        }
        let method = self.get_base_method(ty, instance, name)?.ok_or_else(|| {
            ReflectError::invalid_operation(resources::format1(resources::METHOD_NOT_FOUND, name))
        })?;
        method.call(self, instance, args.unwrap_or(&[]))
    }

    /// Invoke `name` through the merged member table of the instance's type,
    /// falling back to a callable stored in an instance field
    pub fn invoke(&self, instance: &Value, name: &str, args: &[Value]) -> ReflectResult<Value> {
        let ty = self.get_type(instance);
        self.resolve_inheritance(ty);
        let member = self.descriptor(ty).and_then(|desc| desc.member(name));
        if let Some(Member::Method(method)) = member {
            return method.call(self, instance, args);
        }
        if let Some(obj) = instance.as_object() {
            let field = obj.borrow().get(name).cloned();
            if let Some(Value::Function(method)) = field {
                return method.call(self, instance, args);
            }
        }
        Err(ReflectError::invalid_operation(resources::format1(
            resources::METHOD_NOT_FOUND,
            name,
        )))
    }

    // ========================================================================
    // Metadata accessors (null-tolerant)
    // ========================================================================

    /// Name of a type or namespace value; empty for anything else
    pub fn get_name(&self, value: &Value) -> String {
        match value {
            Value::Type(id) => self.type_name_of(*id),
            Value::Namespace(ns) => ns.name().to_string(),
            _ => String::new(),
        }
    }

    fn type_flag(
        &self,
        value: &Value,
        check: impl Fn(&crate::registry::TypeDescriptor) -> bool,
    ) -> bool {
        value
            .as_type()
            .and_then(|id| self.descriptor(id))
            .is_some_and(check)
    }

    /// Whether `value` is a registered class
    pub fn is_class(&self, value: &Value) -> bool {
        self.type_flag(value, |desc| desc.is_class())
    }

    /// Whether `value` is a registered interface
    pub fn is_interface(&self, value: &Value) -> bool {
        self.type_flag(value, |desc| desc.is_interface())
    }

    /// Whether `value` is a registered enum
    pub fn is_enum(&self, value: &Value) -> bool {
        self.type_flag(value, |desc| desc.is_enum())
    }

    /// Whether `value` is a registered flags enum
    pub fn is_flags(&self, value: &Value) -> bool {
        self.type_flag(value, |desc| desc.is_flags())
    }

    /// Whether `value` is a namespace container
    pub fn is_namespace(&self, value: &Value) -> bool {
        matches!(value, Value::Namespace(_))
    }
}

impl ReflectContext for TypeRegistry {
    fn type_name(&self, ty: TypeId) -> String {
        self.type_name_of(ty)
    }

    fn get_type(&self, value: &Value) -> TypeId {
        TypeRegistry::get_type(self, value)
    }

    fn base_type(&self, ty: TypeId) -> Option<TypeId> {
        self.get_base_type(ty)
    }

    fn is_instance_of_type(&self, ty: TypeId, value: &Value) -> bool {
        TypeRegistry::is_instance_of_type(self, ty, value)
    }

    fn inherits_from(&self, ty: TypeId, base: TypeId) -> bool {
        TypeRegistry::inherits_from(self, ty, base)
    }

    fn implements_interface(&self, ty: TypeId, interface: TypeId) -> bool {
        TypeRegistry::implements_interface(self, ty, interface)
    }

    fn call_base_method(
        &self,
        ty: TypeId,
        instance: &Value,
        name: &str,
        args: Option<&[Value]>,
    ) -> ReflectResult<Value> {
        TypeRegistry::call_base_method(self, ty, instance, name, args)
    }

    fn invoke(&self, instance: &Value, name: &str, args: &[Value]) -> ReflectResult<Value> {
        TypeRegistry::invoke(self, instance, name, args)
    }
}
