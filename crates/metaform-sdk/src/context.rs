//! ReflectContext trait: abstract runtime operations
//!
//! Defines the interface the metaform engine implements. Native methods,
//! accessors and event handlers only see this trait; they never depend on
//! the descriptor store directly.

use crate::error::ReflectResult;
use crate::value::{TypeId, Value};

/// Abstract type runtime handed to native callables.
pub trait ReflectContext {
    // ========================================================================
    // Metadata
    // ========================================================================

    /// Registered name of a type (empty if unregistered)
    fn type_name(&self, ty: TypeId) -> String;

    /// Runtime type of a value; metadata-less values map to the root type
    fn get_type(&self, value: &Value) -> TypeId;

    /// Immediate base type of a class
    fn base_type(&self, ty: TypeId) -> Option<TypeId>;

    // ========================================================================
    // Relationship queries
    // ========================================================================

    /// Whether `value` is an instance of `ty` (directly, by inheritance or
    /// by interface)
    fn is_instance_of_type(&self, ty: TypeId, value: &Value) -> bool;

    /// Whether `ty` has `base` somewhere on its base chain
    fn inherits_from(&self, ty: TypeId, base: TypeId) -> bool;

    /// Whether `ty` or one of its bases implements `interface`
    fn implements_interface(&self, ty: TypeId, interface: TypeId) -> bool;

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Invoke the member `name` as defined on the immediate base of `ty`
    fn call_base_method(
        &self,
        ty: TypeId,
        instance: &Value,
        name: &str,
        args: Option<&[Value]>,
    ) -> ReflectResult<Value>;

    /// Invoke a member through the merged member table of the instance's type
    fn invoke(&self, instance: &Value, name: &str, args: &[Value]) -> ReflectResult<Value>;
}
