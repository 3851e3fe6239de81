//! Native callables and property accessors
//!
//! Methods, event handlers and property accessors are plain Rust closures.
//! They receive the runtime through `&dyn ReflectContext` so an override can
//! query types or call its base implementation without depending on engine
//! internals.

use std::fmt;
use std::rc::Rc;

use crate::context::ReflectContext;
use crate::error::ReflectResult;
use crate::object::ObjectRef;
use crate::value::Value;

/// Callable signature: `(runtime, this, arguments) -> result`
pub type NativeFn = dyn Fn(&dyn ReflectContext, &Value, &[Value]) -> ReflectResult<Value>;

/// Property read accessor
pub type GetterFn = dyn Fn(&dyn ReflectContext, &ObjectRef) -> ReflectResult<Value>;

/// Property write accessor
pub type SetterFn = dyn Fn(&dyn ReflectContext, &ObjectRef, Value) -> ReflectResult<()>;

// ============================================================================
// NativeFunction
// ============================================================================

/// A named native callable
pub struct NativeFunction {
    name: String,
    func: Box<NativeFn>,
}

/// Shared handle to a native callable
pub type FunctionRef = Rc<NativeFunction>;

impl NativeFunction {
    /// Wrap a closure as a callable
    pub fn new<F>(name: impl Into<String>, func: F) -> FunctionRef
    where
        F: Fn(&dyn ReflectContext, &Value, &[Value]) -> ReflectResult<Value> + 'static,
    {
        Rc::new(Self {
            name: name.into(),
            func: Box::new(func),
        })
    }

    /// Function name (diagnostics only)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke with an explicit receiver
    pub fn call(
        &self,
        ctx: &dyn ReflectContext,
        this: &Value,
        args: &[Value],
    ) -> ReflectResult<Value> {
        (self.func)(ctx, this, args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}

// ============================================================================
// PropertyAccessor
// ============================================================================

/// Getter/setter pair registered for a named property.
///
/// Built once when the type's members are declared; the construction
/// protocol dispatches through it instead of composing accessor names.
#[derive(Clone, Default)]
pub struct PropertyAccessor {
    getter: Option<Rc<GetterFn>>,
    setter: Option<Rc<SetterFn>>,
}

impl PropertyAccessor {
    /// Accessor with neither getter nor setter
    pub fn new() -> Self {
        Self::default()
    }

    /// Accessor backed by an instance field: reads return the field (or
    /// `Undefined`), writes store it.
    pub fn field(backing: impl Into<String>) -> Self {
        let read: Rc<str> = Rc::from(backing.into());
        let write = read.clone();
        Self::new()
            .with_getter(move |_, obj| Ok(obj.borrow().get(&read).cloned().unwrap_or_default()))
            .with_setter(move |_, obj, value| {
                obj.borrow_mut().set(write.to_string(), value);
                Ok(())
            })
    }

    /// Read-only accessor backed by an instance field
    pub fn read_only_field(backing: impl Into<String>) -> Self {
        let read: Rc<str> = Rc::from(backing.into());
        Self::new()
            .with_getter(move |_, obj| Ok(obj.borrow().get(&read).cloned().unwrap_or_default()))
    }

    /// Attach a getter
    pub fn with_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&dyn ReflectContext, &ObjectRef) -> ReflectResult<Value> + 'static,
    {
        self.getter = Some(Rc::new(getter));
        self
    }

    /// Attach a setter
    pub fn with_setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&dyn ReflectContext, &ObjectRef, Value) -> ReflectResult<()> + 'static,
    {
        self.setter = Some(Rc::new(setter));
        self
    }

    /// Whether a getter is registered
    pub fn has_getter(&self) -> bool {
        self.getter.is_some()
    }

    /// Whether a setter is registered
    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }

    /// Read through the getter. `None` when the property is write-only.
    pub fn get(&self, ctx: &dyn ReflectContext, obj: &ObjectRef) -> Option<ReflectResult<Value>> {
        self.getter.as_ref().map(|g| g(ctx, obj))
    }

    /// Write through the setter. `None` when the property is read-only.
    pub fn set(
        &self,
        ctx: &dyn ReflectContext,
        obj: &ObjectRef,
        value: Value,
    ) -> Option<ReflectResult<()>> {
        self.setter.as_ref().map(|s| s(ctx, obj, value))
    }
}

impl fmt::Debug for PropertyAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAccessor")
            .field("getter", &self.getter.is_some())
            .field("setter", &self.setter.is_some())
            .finish()
    }
}
