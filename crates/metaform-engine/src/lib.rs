//! Metaform Engine
//!
//! This crate provides the type runtime behind the metaform component model:
//! - **Registry**: descriptor store, namespace registration and built-in types (`registry` module)
//! - **Inheritance**: lazy or whole-registry base-member resolution and construction
//!   (`inherit` module)
//! - **Reflection**: "is-a" queries, base-method dispatch and metadata accessors (`reflect` module)
//! - **Contracts**: parameter-shape validation at dynamic boundaries (`validate` module)
//! - **Enums**: plain and flags enumerations with parse/format (`enums` module)
//! - **Components**: declarative construction, lifecycle and the application store
//!   (`component` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use metaform_engine::{ComponentDescriptor, Runtime, TypeSpec};
//! use metaform_engine::builtins::COMPONENT;
//! use metaform_sdk::PropertyAccessor;
//!
//! let mut runtime = Runtime::new();
//! let registry = runtime.registry_mut();
//! registry.register_namespace("Shop")?;
//! let cart = registry.define_type(
//!     "Shop.Cart",
//!     TypeSpec::new().property("owner", PropertyAccessor::field("_owner")),
//! )?;
//! registry.register_class("Shop.Cart", cart, Some(COMPONENT), &[])?;
//!
//! let cart = runtime.create(ComponentDescriptor::new(cart).property("id", "cart"))?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Runtime configuration
pub mod options;

/// Descriptor store, namespaces and built-in types
pub mod registry;

/// Inheritance resolution and instance construction
pub mod inherit;

/// Reflection API
pub mod reflect;

/// Contract validator and boundary signatures
pub mod validate;

/// Enumerations
pub mod enums;

/// Declarative construction protocol
pub mod component;

/// Registry plus application
pub mod runtime;

mod resources;

// ============================================================================
// Re-exports
// ============================================================================

pub use component::{Application, ComponentDescriptor};
pub use enums::EnumInfo;
pub use inherit::CONSTRUCTOR;
pub use options::RuntimeOptions;
pub use registry::{
    builtins, GlobalScope, HostScope, Member, MemberTable, TypeDescriptor, TypeKind, TypeRegistry,
    TypeSpec,
};
pub use runtime::Runtime;
pub use validate::{signatures, ContractValidator, ParamSpec};
