//! Inheritance resolution and instance construction
//!
//! Base members are copied into a subtype's table once, the first time the
//! subtype is used reflectively, or all at once through [`resolve_all`].
//! Members already present on the subtype are never overwritten.
//!
//! [`resolve_all`]: TypeRegistry::resolve_all

use std::cell::RefCell;
use std::rc::Rc;

use metaform_sdk::{
    ComponentState, ElementRef, Instance, ObjectRef, ReflectError, ReflectResult, TypeId, Value,
};
use tracing::{debug, trace};

use crate::registry::builtins::COMPONENT;
use crate::registry::{Member, TypeRegistry};
use crate::resources;

/// Name of the member run on new instances
pub const CONSTRUCTOR: &str = "constructor";

impl TypeRegistry {
    /// Pending types from the outermost unresolved ancestor down to `ty`
    fn pending_chain(&self, ty: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut current = Some(ty);
        while let Some(id) = current {
            match self.descriptor(id) {
                Some(desc) if desc.base_merge_pending.get() => {
                    chain.push(id);
                    current = desc.base;
                }
                _ => break,
            }
        }
        chain.reverse();
        chain
    }

    /// Copy the members of `ty`'s (already resolved) base that `ty` lacks
    fn merge_base(&self, ty: TypeId) {
        let Some(desc) = self.descriptor(ty) else {
            return;
        };
        if let Some(base) = desc.base.and_then(|b| self.descriptor(b)) {
            let inherited = base.members.borrow();
            let mut members = desc.members.borrow_mut();
            let mut copied = 0usize;
            for (name, member) in inherited.iter() {
                if members.insert_if_absent(name, member) {
                    copied += 1;
                }
            }
            trace!(?ty, base = ?base.id, copied, "merged base members");
        }
        desc.base_merge_pending.set(false);
    }

    /// Complete the member table of `ty`. Idempotent.
    pub fn resolve_inheritance(&self, ty: TypeId) {
        for id in self.pending_chain(ty) {
            self.merge_base(id);
        }
    }

    /// Resolve every pending type, bases before subtypes. Returns the number
    /// of types merged.
    pub fn resolve_all(&self) -> usize {
        let mut merged = 0;
        for index in 0..self.type_count() {
            for id in self.pending_chain(TypeId::new(index as u32)) {
                self.merge_base(id);
                merged += 1;
            }
        }
        debug!(merged, "resolved inheritance");
        merged
    }

    /// Copy the members of interface `iface` that `ty` lacks
    pub(crate) fn merge_interface(&self, ty: TypeId, iface: TypeId) {
        let (Some(desc), Some(source)) = (self.descriptor(ty), self.descriptor(iface)) else {
            return;
        };
        if ty == iface {
            return;
        }
        let interface_members = source.members.borrow();
        let mut members = desc.members.borrow_mut();
        for (name, member) in interface_members.iter() {
            members.insert_if_absent(name, member);
        }
        trace!(?ty, ?iface, "merged interface members");
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Create an instance of class `ty`.
    ///
    /// Field defaults are copied onto the instance (arrays are cloned so
    /// instances never share storage), component state is attached to
    /// component types, and the `constructor` member runs last.
    pub fn construct(
        &self,
        ty: TypeId,
        element: Option<ElementRef>,
        args: &[Value],
    ) -> ReflectResult<ObjectRef> {
        let desc = self.desc(ty)?;
        if !desc.is_class() {
            return Err(ReflectError::argument("type", resources::BASE_NOT_A_CLASS));
        }
        self.resolve_inheritance(ty);

        let mut instance = Instance::new(ty);
        let mut constructor = None;
        for (name, member) in desc.members.borrow().iter() {
            match member {
                Member::Field(Value::Array(items)) => {
                    instance.set(name, Value::array(items.borrow().clone()))
                }
                Member::Field(default) => instance.set(name, default.clone()),
                Member::Method(func) if name == CONSTRUCTOR => constructor = Some(func.clone()),
                _ => {}
            }
        }
        instance.set_element(element);
        if ty == COMPONENT || self.inherits_from(ty, COMPONENT) {
            instance.attach_component(ComponentState::new());
        }

        let obj: ObjectRef = Rc::new(RefCell::new(instance));
        if let Some(constructor) = constructor {
            constructor.call(self, &Value::Object(obj.clone()), args)?;
        }
        Ok(obj)
    }

    /// Run the constructor of `ty`'s base on `instance`
    pub fn initialize_base(
        &self,
        ty: TypeId,
        instance: &Value,
        args: Option<&[Value]>,
    ) -> ReflectResult<Value> {
        if !self.is_instance_of_type(ty, instance) {
            return Err(ReflectError::argument_type(
                "instance",
                self.get_type_name(instance),
                self.type_name_of(ty),
            ));
        }
        self.resolve_inheritance(ty);
        if let Some(base) = self.desc(ty)?.base {
            self.resolve_inheritance(base);
            if let Some(Member::Method(constructor)) = self.desc(base)?.member(CONSTRUCTOR) {
                constructor.call(self, instance, args.unwrap_or(&[]))?;
            }
        }
        Ok(instance.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeSpec;
    use metaform_sdk::ReflectContext;

    fn setup() -> (TypeRegistry, TypeId, TypeId) {
        let mut registry = TypeRegistry::new();
        registry.register_namespace("Zoo").unwrap();
        let animal = registry
            .define_type(
                "Zoo.Animal",
                TypeSpec::new()
                    .method("speak", |_, _, _| Ok(Value::from("...")))
                    .method("legs", |_, _, _| Ok(Value::from(4)))
                    .field("tags", Value::array(vec![])),
            )
            .unwrap();
        registry.register_class("Zoo.Animal", animal, None, &[]).unwrap();
        let bird = registry
            .define_type(
                "Zoo.Bird",
                TypeSpec::new().method("legs", |_, _, _| Ok(Value::from(2))),
            )
            .unwrap();
        registry.register_class("Zoo.Bird", bird, Some(animal), &[]).unwrap();
        (registry, animal, bird)
    }

    #[test]
    fn test_lazy_resolution_merges_once() {
        let (registry, _, bird) = setup();
        let desc = registry.descriptor(bird).unwrap();
        assert!(desc.is_base_merge_pending());
        assert!(!desc.members().contains("speak"));

        registry.resolve_inheritance(bird);
        assert!(!desc.is_base_merge_pending());
        assert!(desc.members().contains("speak"));
        assert_eq!(desc.members().len(), 3);
    }

    #[test]
    fn test_subtype_override_wins() {
        let (registry, _, bird) = setup();
        let obj = registry.construct(bird, None, &[]).unwrap();
        let legs = registry.invoke(&Value::Object(obj), "legs", &[]).unwrap();
        assert_eq!(legs, Value::from(2));
    }

    #[test]
    fn test_resolve_all_orders_bases_first() {
        let (mut registry, _, bird) = setup();
        let chick = registry
            .define_type(
                "Zoo.Chick",
                TypeSpec::new().method("speak", |_, _, _| Ok(Value::from("peep"))),
            )
            .unwrap();
        registry.register_class("Zoo.Chick", chick, Some(bird), &[]).unwrap();

        assert_eq!(registry.resolve_all(), 2);
        let members = registry.descriptor(chick).unwrap().members();
        assert!(members.contains("legs"));
        assert!(members.contains("tags"));
        assert_eq!(registry.resolve_all(), 0);
    }

    #[test]
    fn test_construct_copies_array_defaults() {
        let (registry, animal, _) = setup();
        let a = registry.construct(animal, None, &[]).unwrap();
        let b = registry.construct(animal, None, &[]).unwrap();
        let tags_a = a.borrow().get("tags").cloned().unwrap();
        let tags_b = b.borrow().get("tags").cloned().unwrap();
        assert!(!tags_a.same(&tags_b));
    }

    #[test]
    fn test_constructor_and_initialize_base() {
        let mut registry = TypeRegistry::new();
        registry.register_namespace("Geo").unwrap();
        let shape = registry
            .define_type(
                "Geo.Shape",
                TypeSpec::new().method(CONSTRUCTOR, |_, this, args| {
                    let sides = args.first().cloned().unwrap_or(Value::from(0));
                    if let Some(obj) = this.as_object() {
                        obj.borrow_mut().set("sides", sides);
                    }
                    Ok(Value::Undefined)
                }),
            )
            .unwrap();
        registry.register_class("Geo.Shape", shape, None, &[]).unwrap();
        let square = registry
            .define_type(
                "Geo.Square",
                TypeSpec::new().method(CONSTRUCTOR, move |ctx, this, _| {
                    let ty = ctx.get_type(this);
                    ctx.call_base_method(ty, this, CONSTRUCTOR, Some(&[Value::from(4)]))?;
                    Ok(Value::Undefined)
                }),
            )
            .unwrap();
        registry.register_class("Geo.Square", square, Some(shape), &[]).unwrap();

        let obj = registry.construct(square, None, &[]).unwrap();
        assert_eq!(obj.borrow().get("sides"), Some(&Value::from(4)));

        let plain = registry.construct(shape, None, &[]).unwrap();
        registry
            .initialize_base(square, &Value::Object(obj.clone()), Some(&[Value::from(5)]))
            .unwrap();
        assert_eq!(obj.borrow().get("sides"), Some(&Value::from(5)));
        let err = registry
            .initialize_base(square, &Value::Object(plain), None)
            .unwrap_err();
        assert_eq!(err.param_name(), Some("instance"));
    }

    #[test]
    fn test_construct_requires_class() {
        let registry = TypeRegistry::new();
        let err = registry
            .construct(crate::registry::builtins::I_DISPOSABLE, None, &[])
            .unwrap_err();
        assert_eq!(err.param_name(), Some("type"));
    }
}
