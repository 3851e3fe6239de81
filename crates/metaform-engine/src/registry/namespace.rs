//! Host scope and namespace chains
//!
//! The host scope is the global binding table that registration consults to
//! confirm a declared dotted name resolves to the object being registered.
//! Dotted paths walk through namespace containers; a path segment that holds
//! anything other than a namespace ends the walk.

use metaform_sdk::{Namespace, NamespaceRef, ReflectError, ReflectResult, Value};
use rustc_hash::FxHashMap;
use tracing::debug;

use super::names::{is_fully_qualified_identifier, is_reserved_word};
use crate::resources;

/// Global binding resolution consumed at registration time
pub trait HostScope {
    /// Look up a root-level binding (case-sensitive)
    fn lookup_global(&self, name: &str) -> Option<Value>;

    /// Bind a root-level name, replacing any previous binding
    fn define_global(&mut self, name: &str, value: Value);

    /// Resolve a dotted path through namespace containers
    fn resolve(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let mut current = self.lookup_global(segments.next()?)?;
        for segment in segments {
            current = current.as_namespace()?.get(segment)?;
        }
        Some(current)
    }
}

/// Default in-memory scope
#[derive(Debug, Default)]
pub struct GlobalScope {
    bindings: FxHashMap<String, Value>,
}

impl GlobalScope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of root-level bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Check if the scope has no bindings
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl HostScope for GlobalScope {
    fn lookup_global(&self, name: &str) -> Option<Value> {
        self.bindings.get(name).cloned()
    }

    fn define_global(&mut self, name: &str, value: Value) {
        self.bindings.insert(name.to_string(), value);
    }
}

/// Bind `value` at `path`. Every parent segment must already resolve to a
/// namespace.
pub(crate) fn bind(scope: &mut dyn HostScope, path: &str, value: Value) -> ReflectResult<()> {
    match path.rsplit_once('.') {
        None => {
            scope.define_global(path, value);
            Ok(())
        }
        Some((parent, leaf)) => match scope.resolve(parent) {
            Some(Value::Namespace(ns)) => {
                ns.set(leaf, value);
                Ok(())
            }
            Some(_) => Err(ReflectError::invalid_operation(resources::format1(
                resources::NAMESPACE_CONTAINS_OBJECT,
                parent,
            ))),
            None => Err(ReflectError::argument("path", resources::INVALID_NAMESPACE)),
        },
    }
}

/// Idempotently extend a namespace chain.
///
/// Returns the innermost namespace and the root namespace if it was newly
/// created by this call.
pub(crate) fn register_chain(
    scope: &mut dyn HostScope,
    path: &str,
    max_depth: usize,
) -> ReflectResult<(NamespaceRef, Option<NamespaceRef>)> {
    if !is_fully_qualified_identifier(path) {
        return Err(ReflectError::argument("namespacePath", resources::INVALID_NAMESPACE));
    }
    let segments: Vec<&str> = path.split('.').collect();
    if segments.len() > max_depth
        || segments.iter().any(|s| s.is_empty() || is_reserved_word(s))
    {
        return Err(ReflectError::argument("namespacePath", resources::INVALID_NAMESPACE));
    }

    let mut new_root = None;
    let mut parent: Option<NamespaceRef> = None;
    for (i, segment) in segments.iter().enumerate() {
        let existing = match &parent {
            None => scope.lookup_global(segment),
            Some(ns) => ns.get(segment),
        };
        let ns = match existing {
            Some(Value::Namespace(ns)) => ns,
            Some(_) => {
                return Err(ReflectError::invalid_operation(resources::format1(
                    resources::NAMESPACE_CONTAINS_OBJECT,
                    &segments[..=i].join("."),
                )))
            }
            None => {
                let ns = Namespace::new(segments[..=i].join("."));
                match &parent {
                    None => {
                        scope.define_global(segment, Value::Namespace(ns.clone()));
                        new_root = Some(ns.clone());
                    }
                    Some(p) => p.set(*segment, Value::Namespace(ns.clone())),
                }
                debug!(namespace = ns.name(), "registered namespace");
                ns
            }
        };
        parent = Some(ns);
    }

    // segments is non-empty after the identifier check
    match parent {
        Some(ns) => Ok((ns, new_root)),
        None => Err(ReflectError::argument("namespacePath", resources::INVALID_NAMESPACE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_walks_namespaces() {
        let mut scope = GlobalScope::new();
        let (inner, root) = register_chain(&mut scope, "App.Widgets", 32).unwrap();
        assert_eq!(inner.name(), "App.Widgets");
        assert_eq!(root.unwrap().name(), "App");

        bind(&mut scope, "App.Widgets.Count", Value::from(3)).unwrap();
        assert_eq!(scope.resolve("App.Widgets.Count"), Some(Value::from(3)));
        assert!(scope.resolve("App.Missing.Count").is_none());
    }

    #[test]
    fn test_register_chain_is_idempotent() {
        let mut scope = GlobalScope::new();
        let (first, root) = register_chain(&mut scope, "A.B", 32).unwrap();
        assert!(root.is_some());
        let (second, root) = register_chain(&mut scope, "A.B", 32).unwrap();
        assert!(root.is_none());
        assert!(std::rc::Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_segment_holding_value_is_rejected() {
        let mut scope = GlobalScope::new();
        scope.define_global("A", Value::from(1));
        let err = register_chain(&mut scope, "A.B", 32).unwrap_err();
        assert_eq!(
            err.to_string(),
            "InvalidOperationException: Object A already exists and is not a namespace."
        );
    }

    #[test]
    fn test_invalid_paths() {
        let mut scope = GlobalScope::new();
        for path in ["", "1abc", "a..b", "a.b.", "a b", "for.x"] {
            let err = register_chain(&mut scope, path, 32).unwrap_err();
            assert_eq!(err.param_name(), Some("namespacePath"), "path {:?}", path);
        }
        let err = register_chain(&mut scope, "a.b.c", 2).unwrap_err();
        assert_eq!(err.param_name(), Some("namespacePath"));
    }

    #[test]
    fn test_bind_requires_namespace_parent() {
        let mut scope = GlobalScope::new();
        assert!(bind(&mut scope, "Nope.X", Value::Null).is_err());
        scope.define_global("Leaf", Value::from(1));
        assert!(bind(&mut scope, "Leaf.X", Value::Null).is_err());
    }
}
