//! Metaform SDK - shared vocabulary of the type runtime
//!
//! This crate provides the types collaborators need to declare and query
//! shapes without depending on the full metaform-engine:
//! - **Values**: the dynamic `Value` model, instances and namespaces
//! - **Callables**: native methods, event handlers and property accessors
//! - **Errors**: the structured error taxonomy raised by every public operation
//! - **Context**: the `ReflectContext` trait callables use to reach the runtime
//!
//! # Example
//!
//! ```ignore
//! use metaform_sdk::{NativeFunction, ReflectError, Value};
//!
//! let dispose = NativeFunction::new("dispose", |_ctx, _this, _args| {
//!     Err(ReflectError::not_implemented("dispose"))
//! });
//! assert!(Value::from(dispose).as_function().is_some());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod context;
pub mod error;
pub mod handler;
pub mod object;
pub mod value;

pub use context::ReflectContext;
pub use error::{ErrorInfo, ErrorKind, ReflectError, ReflectResult};
pub use handler::{FunctionRef, GetterFn, NativeFn, NativeFunction, PropertyAccessor, SetterFn};
pub use object::{
    ComponentState, EventHandlerList, Instance, Lifecycle, Namespace, NamespaceRef, ObjectRef,
};
pub use value::{ArrayRef, ElementKind, ElementRef, HostElement, TypeId, Value};
