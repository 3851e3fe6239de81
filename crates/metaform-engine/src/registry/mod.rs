//! Descriptor store and namespace registration
//!
//! The `TypeRegistry` owns every type descriptor, the global host scope the
//! descriptors are bound in, and the name indexes used for string lookups.
//! Registration validates everything before mutating so a failed call never
//! leaves a partially registered type behind.

pub mod builtins;
mod descriptor;
mod names;
mod namespace;

pub use descriptor::{Member, MemberTable, TypeDescriptor, TypeKind, TypeSpec};
pub use names::{is_fully_qualified_identifier, is_identifier, is_reserved_word, RESERVED_WORDS};
pub use namespace::{GlobalScope, HostScope};

use std::fmt;

use metaform_sdk::{NamespaceRef, ReflectError, ReflectResult, TypeId, Value};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::options::RuntimeOptions;
use crate::resources;

/// Process-scoped registry of type descriptors
pub struct TypeRegistry {
    types: Vec<TypeDescriptor>,
    registered: FxHashMap<String, TypeId>,
    upper_case: FxHashMap<String, TypeId>,
    pub(crate) scope: Box<dyn HostScope>,
    pub(crate) root_namespaces: Vec<NamespaceRef>,
    options: RuntimeOptions,
}

impl TypeRegistry {
    /// Create a registry with default options and an empty global scope
    pub fn new() -> Self {
        Self::with_options(RuntimeOptions::default())
    }

    /// Create a registry with the given options
    pub fn with_options(options: RuntimeOptions) -> Self {
        Self::with_scope(options, Box::new(GlobalScope::new()))
    }

    /// Create a registry over a caller-provided host scope. The built-in
    /// types are bound into the scope immediately.
    pub fn with_scope(options: RuntimeOptions, scope: Box<dyn HostScope>) -> Self {
        let mut registry = Self {
            types: Vec::with_capacity(builtins::BUILTIN_COUNT),
            registered: FxHashMap::default(),
            upper_case: FxHashMap::default(),
            scope,
            root_namespaces: Vec::new(),
            options,
        };
        builtins::install(&mut registry);
        registry
    }

    /// Active options
    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    // ========================================================================
    // Descriptors
    // ========================================================================

    /// Look up a descriptor
    pub fn descriptor(&self, ty: TypeId) -> Option<&TypeDescriptor> {
        self.types.get(ty.index())
    }

    pub(crate) fn desc(&self, ty: TypeId) -> ReflectResult<&TypeDescriptor> {
        self.types
            .get(ty.index())
            .ok_or_else(|| ReflectError::argument("type", resources::NOT_A_TYPE))
    }

    pub(crate) fn desc_mut(&mut self, ty: TypeId) -> ReflectResult<&mut TypeDescriptor> {
        self.types
            .get_mut(ty.index())
            .ok_or_else(|| ReflectError::argument("type", resources::NOT_A_TYPE))
    }

    /// Number of descriptors, registered or not
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Create an unregistered descriptor. Bind it with [`assign`] and then
    /// register it under the bound name.
    ///
    /// [`assign`]: TypeRegistry::assign
    pub fn new_type(&mut self) -> TypeId {
        let id = TypeId::new(self.types.len() as u32);
        self.types.push(TypeDescriptor::new(id));
        id
    }

    /// Add or replace a member on a type's own table
    pub fn add_member(&mut self, ty: TypeId, name: &str, member: Member) -> ReflectResult<()> {
        let desc = self.desc_mut(ty)?;
        desc.members.get_mut().insert(name, member);
        desc.interface_cache.get_mut().clear();
        Ok(())
    }

    /// Bind a value in the host scope. Parent segments must be registered
    /// namespaces.
    pub fn assign(&mut self, path: &str, value: Value) -> ReflectResult<()> {
        namespace::bind(self.scope.as_mut(), path, value)
    }

    /// Resolve a dotted path through the host scope
    pub fn lookup(&self, path: &str) -> Option<Value> {
        self.scope.resolve(path)
    }

    /// Create a descriptor from a spec and bind it at `path`
    pub fn define_type(&mut self, path: &str, spec: TypeSpec) -> ReflectResult<TypeId> {
        let id = self.new_type();
        self.desc_mut(id)?.members = spec.members.into();
        self.assign(path, Value::Type(id))?;
        Ok(id)
    }

    pub(crate) fn install_builtin(
        &mut self,
        name: &str,
        kind: TypeKind,
        base: Option<TypeId>,
        interfaces: &[TypeId],
        members: MemberTable,
    ) -> TypeId {
        let mut members = members;
        for &iface in interfaces {
            if let Some(desc) = self.types.get(iface.index()) {
                for (member_name, member) in desc.members.borrow().iter() {
                    members.insert_if_absent(member_name, member);
                }
            }
        }

        let id = TypeId::new(self.types.len() as u32);
        let mut desc = TypeDescriptor::new(id);
        desc.name = Some(name.to_string());
        desc.kind = kind;
        desc.base = base;
        desc.base_merge_pending.set(base.is_some());
        desc.interfaces = interfaces.to_vec();
        desc.members = members.into();
        self.types.push(desc);

        self.registered.insert(name.to_string(), id);
        self.upper_case.insert(name.to_uppercase(), id);
        id
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Idempotently create the namespace chain for a dotted path
    pub fn register_namespace(&mut self, path: &str) -> ReflectResult<NamespaceRef> {
        let max_depth = self.options.max_namespace_depth;
        let (ns, new_root) = namespace::register_chain(self.scope.as_mut(), path, max_depth)?;
        if let Some(root) = new_root {
            self.root_namespaces.push(root);
        }
        Ok(ns)
    }

    /// Check that `name` is well formed, resolves to `ty` in the host scope
    /// and is not taken.
    pub(crate) fn check_registration(
        &self,
        param: &str,
        name: &str,
        ty: TypeId,
    ) -> ReflectResult<()> {
        let desc = self.desc(ty)?;
        if !is_fully_qualified_identifier(name)
            || name.split('.').any(str::is_empty)
            || name.split('.').count() > self.options.max_namespace_depth
        {
            return Err(ReflectError::argument(param, resources::NOT_A_TYPE_NAME));
        }
        if name.split('.').any(is_reserved_word) {
            return Err(ReflectError::argument(param, resources::BAD_TYPE_NAME));
        }
        match self.scope.resolve(name) {
            None => return Err(ReflectError::argument(param, resources::ARGUMENT_TYPE_NAME)),
            Some(Value::Type(bound)) if bound == ty => {}
            Some(_) => return Err(ReflectError::argument(param, resources::BAD_TYPE_NAME)),
        }
        if self.registered.contains_key(name) {
            return Err(ReflectError::invalid_operation(resources::format1(
                resources::TYPE_REGISTERED_TWICE,
                name,
            )));
        }
        if let Some(existing) = desc.name() {
            return Err(ReflectError::invalid_operation(resources::format1(
                resources::TYPE_REGISTERED_TWICE,
                existing,
            )));
        }
        Ok(())
    }

    pub(crate) fn record_name(&mut self, name: &str, ty: TypeId) {
        self.registered.insert(name.to_string(), ty);
        self.upper_case.insert(name.to_uppercase(), ty);
    }

    /// Register `ty` as a class named `name`.
    ///
    /// `base` must be a registered class; each interface must be a registered
    /// interface. Interface members absent from the class are copied in
    /// immediately; base members are merged on first reflective use (or
    /// right away under `eager_resolution`).
    pub fn register_class(
        &mut self,
        name: &str,
        ty: TypeId,
        base: Option<TypeId>,
        interfaces: &[TypeId],
    ) -> ReflectResult<TypeId> {
        self.check_registration("typeName", name, ty)?;
        if let Some(base) = base {
            if !self.descriptor(base).is_some_and(TypeDescriptor::is_class) {
                return Err(ReflectError::argument("baseType", resources::BASE_NOT_A_CLASS));
            }
        }
        for (i, &iface) in interfaces.iter().enumerate() {
            if !self.descriptor(iface).is_some_and(TypeDescriptor::is_interface) {
                return Err(ReflectError::argument(
                    format!("interfaceTypes[{}]", i),
                    resources::NOT_AN_INTERFACE,
                ));
            }
        }

        let desc = self.desc_mut(ty)?;
        desc.name = Some(name.to_string());
        desc.kind = TypeKind::Class;
        desc.base = base;
        desc.base_merge_pending.set(base.is_some());
        desc.interface_cache.get_mut().clear();
        self.record_name(name, ty);

        if !interfaces.is_empty() {
            self.resolve_inheritance(ty);
            for &iface in interfaces {
                self.merge_interface(ty, iface);
            }
            self.desc_mut(ty)?.interfaces.extend_from_slice(interfaces);
        }
        if self.options.eager_resolution {
            self.resolve_inheritance(ty);
        }

        debug!(
            type_name = name,
            ?base,
            interfaces = interfaces.len(),
            "registered class"
        );
        Ok(ty)
    }

    /// Register `ty` as an interface named `name`
    pub fn register_interface(&mut self, name: &str, ty: TypeId) -> ReflectResult<TypeId> {
        self.check_registration("typeName", name, ty)?;
        let desc = self.desc_mut(ty)?;
        desc.name = Some(name.to_string());
        desc.kind = TypeKind::Interface;
        self.record_name(name, ty);
        debug!(type_name = name, "registered interface");
        Ok(ty)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Resolve a type by case-sensitive name.
    ///
    /// Returns `None` for an empty name; fails if the name is bound to
    /// something other than a type or not bound at all.
    pub fn parse_type(&self, name: &str) -> ReflectResult<Option<TypeId>> {
        if name.is_empty() {
            return Ok(None);
        }
        if let Some(&id) = self.registered.get(name) {
            return Ok(Some(id));
        }
        match self.scope.resolve(name) {
            Some(Value::Type(id)) => Ok(Some(id)),
            _ => Err(ReflectError::argument("typeName", resources::NOT_A_TYPE_NAME)),
        }
    }

    /// Resolve a registered type by case-insensitive name under `ns`
    pub fn parse_type_in(&self, ns: &NamespaceRef, name: &str) -> Option<TypeId> {
        let key = format!("{}.{}", ns.name(), name).to_uppercase();
        self.upper_case.get(&key).copied()
    }

    /// Whether `name` is a registered type name
    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains_key(name)
    }

    /// All registered types, in registration id order
    pub fn get_registered_types(&self) -> Vec<TypeId> {
        let mut ids: Vec<TypeId> = self.registered.values().copied().collect();
        ids.sort();
        ids
    }

    /// Root namespaces in creation order
    pub fn get_root_namespaces(&self) -> Vec<NamespaceRef> {
        self.root_namespaces.clone()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types.len())
            .field("registered", &self.registered.len())
            .field("root_namespaces", &self.root_namespaces.len())
            .field("options", &self.options)
            .finish()
    }
}
