//! Value: the dynamic value model exchanged with the type runtime
//!
//! Every argument checked by the contract validator, every member stored on a
//! type and every field of an instance is a `Value`. Primitives are stored
//! inline; arrays, instances, functions, namespaces and host elements are
//! reference-counted and compare by identity.
//!
//! `Undefined` ("no value supplied") and `Null` ("value explicitly absent")
//! are separate variants, so the validator can report them as separate
//! error kinds.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::handler::FunctionRef;
use crate::object::{Instance, NamespaceRef, ObjectRef};

// ============================================================================
// TypeId
// ============================================================================

/// Handle to a type descriptor in the runtime's descriptor store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    /// Create a handle from a raw store index
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Index into the descriptor store
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

// ============================================================================
// Host elements
// ============================================================================

/// Capability tag carried by host element wrappers.
///
/// The contract validator accepts `Window`, `Document` and `Element` where a
/// DOM element is expected; text nodes are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// The global window singleton
    Window,
    /// The global document singleton
    Document,
    /// An element node
    Element,
    /// A text node
    Text,
}

impl ElementKind {
    /// Whether this kind satisfies a DOM-element parameter contract
    pub const fn is_dom_target(self) -> bool {
        !matches!(self, ElementKind::Text)
    }
}

/// Wrapper around a host element handed in by the UI layer
#[derive(Debug)]
pub struct HostElement {
    kind: ElementKind,
    tag: String,
    id: Option<String>,
}

/// Shared handle to a host element
pub type ElementRef = Rc<HostElement>;

impl HostElement {
    /// Wrap an element node
    pub fn element(tag: impl Into<String>) -> ElementRef {
        Rc::new(Self {
            kind: ElementKind::Element,
            tag: tag.into(),
            id: None,
        })
    }

    /// Wrap an element node carrying an id attribute
    pub fn with_id(tag: impl Into<String>, id: impl Into<String>) -> ElementRef {
        Rc::new(Self {
            kind: ElementKind::Element,
            tag: tag.into(),
            id: Some(id.into()),
        })
    }

    /// Wrap a text node
    pub fn text() -> ElementRef {
        Rc::new(Self {
            kind: ElementKind::Text,
            tag: "#text".to_string(),
            id: None,
        })
    }

    /// The window singleton
    pub fn window() -> ElementRef {
        Rc::new(Self {
            kind: ElementKind::Window,
            tag: "#window".to_string(),
            id: None,
        })
    }

    /// The document singleton
    pub fn document() -> ElementRef {
        Rc::new(Self {
            kind: ElementKind::Document,
            tag: "#document".to_string(),
            id: None,
        })
    }

    /// Capability tag
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Id attribute, if any
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

// ============================================================================
// Value
// ============================================================================

/// Shared, growable array storage
pub type ArrayRef = Rc<RefCell<Vec<Value>>>;

/// A dynamic value
#[derive(Clone, Default)]
pub enum Value {
    /// No value supplied
    #[default]
    Undefined,
    /// Value explicitly absent
    Null,
    /// Boolean
    Bool(bool),
    /// IEEE 754 double
    Number(f64),
    /// Immutable string
    String(Rc<str>),
    /// Array (shared, appendable in place)
    Array(ArrayRef),
    /// Object instance, with or without type metadata
    Object(ObjectRef),
    /// Native callable
    Function(FunctionRef),
    /// A type descriptor handle (the "constructor" of a type)
    Type(TypeId),
    /// A namespace container
    Namespace(NamespaceRef),
    /// A host element wrapper
    Element(ElementRef),
}

impl Value {
    /// Create the undefined value
    #[inline]
    pub const fn undefined() -> Self {
        Value::Undefined
    }

    /// Create the null value
    #[inline]
    pub const fn null() -> Self {
        Value::Null
    }

    /// Create a number
    #[inline]
    pub const fn number(n: f64) -> Self {
        Value::Number(n)
    }

    /// Create a string
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    /// Create an array from owned items
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    /// Wrap an instance
    pub fn object(instance: Instance) -> Self {
        Value::Object(Rc::new(RefCell::new(instance)))
    }

    /// Build a plain (metadata-less) object from name/value pairs.
    ///
    /// Plain objects double as nested property maps for the construction
    /// protocol.
    pub fn plain<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let mut instance = Instance::plain();
        for (name, value) in entries {
            instance.set(name, value);
        }
        Value::object(instance)
    }

    /// Check for `Undefined`
    #[inline]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check for `Null`
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check for `Undefined` or `Null`
    #[inline]
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Extract a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extract a number that has no fractional part
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    /// Extract a string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extract array storage
    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Extract an object handle
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Extract a function handle
    pub fn as_function(&self) -> Option<&FunctionRef> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    /// Extract a type handle
    pub fn as_type(&self) -> Option<TypeId> {
        match self {
            Value::Type(t) => Some(*t),
            _ => None,
        }
    }

    /// Extract a namespace handle
    pub fn as_namespace(&self) -> Option<&NamespaceRef> {
        match self {
            Value::Namespace(ns) => Some(ns),
            _ => None,
        }
    }

    /// Extract a host element handle
    pub fn as_element(&self) -> Option<&ElementRef> {
        match self {
            Value::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Whether this is an object without type metadata
    pub fn is_plain_object(&self) -> bool {
        match self {
            Value::Object(o) => o.borrow().type_id().is_none(),
            _ => false,
        }
    }

    /// Identity comparison: reference variants compare by pointer,
    /// primitives by value.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Namespace(a), Value::Namespace(b)) => Rc::ptr_eq(a, b),
            (Value::Element(a), Value::Element(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Short variant name for diagnostics
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::Type(_) => "type",
            Value::Namespace(_) => "namespace",
            Value::Element(_) => "element",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

/// Render a number the way the scripting host prints it (no trailing `.0`
/// on integral values).
fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        write!(f, "NaN")
    } else if n.is_infinite() {
        write!(f, "{}", if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        write!(f, "{}", n as i64)
    } else {
        write!(f, "{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write_number(f, *n),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    if !item.is_nullish() {
                        write!(f, "{}", item)?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Function(func) => write!(f, "function {}()", func.name()),
            Value::Type(id) => write!(f, "[type {}]", id.index()),
            Value::Namespace(ns) => write!(f, "{}", ns.name()),
            Value::Element(e) => write!(f, "[element {}]", e.tag()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Objects are not walked: component graphs may be cyclic.
        match self {
            Value::Undefined => write!(f, "Value::Undefined"),
            Value::Null => write!(f, "Value::Null"),
            Value::Bool(b) => write!(f, "Value::Bool({})", b),
            Value::Number(n) => write!(f, "Value::Number({})", n),
            Value::String(s) => write!(f, "Value::String({:?})", s),
            Value::Array(items) => write!(f, "Value::Array(len={})", items.borrow().len()),
            Value::Object(o) => match o.borrow().type_id() {
                Some(id) => write!(f, "Value::Object({})", id),
                None => write!(f, "Value::Object(plain)"),
            },
            Value::Function(func) => write!(f, "Value::Function({})", func.name()),
            Value::Type(id) => write!(f, "Value::Type({})", id),
            Value::Namespace(ns) => write!(f, "Value::Namespace({})", ns.name()),
            Value::Element(e) => write!(f, "Value::Element({:?}, {})", e.kind(), e.tag()),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<TypeId> for Value {
    fn from(id: TypeId) -> Self {
        Value::Type(id)
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

impl From<FunctionRef> for Value {
    fn from(f: FunctionRef) -> Self {
        Value::Function(f)
    }
}

impl From<ElementRef> for Value {
    fn from(e: ElementRef) -> Self {
        Value::Element(e)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}
