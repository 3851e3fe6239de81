//! Type descriptors and member tables

use std::cell::{Cell, Ref, RefCell};
use std::fmt;

use metaform_sdk::{
    FunctionRef, NativeFunction, PropertyAccessor, ReflectContext, ReflectResult, TypeId, Value,
};
use rustc_hash::FxHashMap;

use crate::enums::EnumInfo;

// ============================================================================
// Members
// ============================================================================

/// An entry in a type's member table
#[derive(Clone)]
pub enum Member {
    /// Callable member
    Method(FunctionRef),
    /// Field with its default value (copied onto new instances)
    Field(Value),
    /// Accessor-backed property
    Property(PropertyAccessor),
    /// Declared event; handlers are stored on the instance
    Event,
}

impl Member {
    /// Wrap a closure as a method member
    pub fn method<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&dyn ReflectContext, &Value, &[Value]) -> ReflectResult<Value> + 'static,
    {
        Member::Method(NativeFunction::new(name, func))
    }

    /// Field member with a default value
    pub fn field(default: impl Into<Value>) -> Self {
        Member::Field(default.into())
    }

    /// Callable, if this is a method
    pub fn as_method(&self) -> Option<&FunctionRef> {
        match self {
            Member::Method(f) => Some(f),
            _ => None,
        }
    }

    /// Accessor, if this is a property
    pub fn as_property(&self) -> Option<&PropertyAccessor> {
        match self {
            Member::Property(p) => Some(p),
            _ => None,
        }
    }

    /// Whether this is an event declaration
    pub fn is_event(&self) -> bool {
        matches!(self, Member::Event)
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Method(func) => write!(f, "Method({})", func.name()),
            Member::Field(v) => write!(f, "Field({:?})", v),
            Member::Property(p) => write!(f, "Property({:?})", p),
            Member::Event => write!(f, "Event"),
        }
    }
}

/// Ordered name → member table with O(1) lookup
#[derive(Debug, Default, Clone)]
pub struct MemberTable {
    entries: Vec<(String, Member)>,
    index: FxHashMap<String, usize>,
}

impl MemberTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a member
    pub fn insert(&mut self, name: impl Into<String>, member: Member) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&i) => self.entries[i].1 = member,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, member));
            }
        }
    }

    /// Insert only when the name is not yet present. Returns true if inserted.
    pub fn insert_if_absent(&mut self, name: &str, member: &Member) -> bool {
        if self.index.contains_key(name) {
            return false;
        }
        self.insert(name, member.clone());
        true
    }

    /// Look up a member
    pub fn get(&self, name: &str) -> Option<&Member> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    /// Check for a member
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Members in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Member)> {
        self.entries.iter().map(|(n, m)| (n.as_str(), m))
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Type descriptor
// ============================================================================

/// Registration state of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Created but not registered yet
    Unregistered,
    /// Registered class
    Class,
    /// Registered interface
    Interface,
    /// Registered enumeration
    Enum,
}

/// Metadata for one type.
///
/// The member table and caches sit behind interior mutability: inheritance
/// merges and cache fills happen during `&self` reflection queries.
#[derive(Debug)]
pub struct TypeDescriptor {
    pub(crate) id: TypeId,
    pub(crate) name: Option<String>,
    pub(crate) kind: TypeKind,
    pub(crate) base: Option<TypeId>,
    pub(crate) interfaces: Vec<TypeId>,
    pub(crate) members: RefCell<MemberTable>,
    pub(crate) base_merge_pending: Cell<bool>,
    pub(crate) interface_cache: RefCell<FxHashMap<String, bool>>,
    pub(crate) enum_info: Option<EnumInfo>,
}

impl TypeDescriptor {
    pub(crate) fn new(id: TypeId) -> Self {
        Self {
            id,
            name: None,
            kind: TypeKind::Unregistered,
            base: None,
            interfaces: Vec::new(),
            members: RefCell::new(MemberTable::new()),
            base_merge_pending: Cell::new(false),
            interface_cache: RefCell::new(FxHashMap::default()),
            enum_info: None,
        }
    }

    /// Handle of this descriptor
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Registered dotted name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Registration state
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Registered as a class
    pub fn is_class(&self) -> bool {
        self.kind == TypeKind::Class
    }

    /// Registered as an interface
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Registered as an enum
    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    /// Registered as a flags enum
    pub fn is_flags(&self) -> bool {
        self.enum_info.as_ref().is_some_and(EnumInfo::is_flags)
    }

    /// Immediate base class
    pub fn base(&self) -> Option<TypeId> {
        self.base
    }

    /// Interfaces declared directly on this type
    pub fn interfaces(&self) -> &[TypeId] {
        &self.interfaces
    }

    /// Inherited members are not yet copied in
    pub fn is_base_merge_pending(&self) -> bool {
        self.base_merge_pending.get()
    }

    /// Borrow the member table
    pub fn members(&self) -> Ref<'_, MemberTable> {
        self.members.borrow()
    }

    /// Clone a member out of the table
    pub fn member(&self, name: &str) -> Option<Member> {
        self.members.borrow().get(name).cloned()
    }

    /// Enum metadata, for registered enums
    pub fn enum_info(&self) -> Option<&EnumInfo> {
        self.enum_info.as_ref()
    }
}

// ============================================================================
// TypeSpec
// ============================================================================

/// Builder collecting the members of a type before it is bound and registered
#[derive(Debug, Default, Clone)]
pub struct TypeSpec {
    pub(crate) members: MemberTable,
}

impl TypeSpec {
    /// Start an empty spec
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a method
    pub fn method<F>(mut self, name: &str, func: F) -> Self
    where
        F: Fn(&dyn ReflectContext, &Value, &[Value]) -> ReflectResult<Value> + 'static,
    {
        self.members.insert(name, Member::method(name, func));
        self
    }

    /// Add a field with a default value
    pub fn field(mut self, name: &str, default: impl Into<Value>) -> Self {
        self.members.insert(name, Member::field(default));
        self
    }

    /// Add an accessor-backed property
    pub fn property(mut self, name: &str, accessor: PropertyAccessor) -> Self {
        self.members.insert(name, Member::Property(accessor));
        self
    }

    /// Declare an event
    pub fn event(mut self, name: &str) -> Self {
        self.members.insert(name, Member::Event);
        self
    }

    /// Add an arbitrary member
    pub fn member(mut self, name: &str, member: Member) -> Self {
        self.members.insert(name, member);
        self
    }

    /// Add an integer enum value
    pub fn value(self, name: &str, value: i64) -> Self {
        self.field(name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_table_order_and_lookup() {
        let mut table = MemberTable::new();
        table.insert("b", Member::field(1));
        table.insert("a", Member::field(2));
        table.insert("b", Member::field(3));

        let names: Vec<&str> = table.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(table.len(), 2);
        match table.get("b") {
            Some(Member::Field(v)) => assert_eq!(v, &Value::from(3)),
            other => panic!("unexpected member {:?}", other),
        }
    }

    #[test]
    fn test_insert_if_absent_keeps_existing() {
        let mut table = MemberTable::new();
        table.insert("x", Member::field(1));
        assert!(!table.insert_if_absent("x", &Member::field(2)));
        assert!(table.insert_if_absent("y", &Member::Event));
        assert!(table.get("y").unwrap().is_event());
        match table.get("x") {
            Some(Member::Field(v)) => assert_eq!(v, &Value::from(1)),
            other => panic!("unexpected member {:?}", other),
        }
    }

    #[test]
    fn test_type_spec_builder() {
        let spec = TypeSpec::new()
            .method("run", |_, _, _| Ok(Value::Null))
            .field("count", 0)
            .event("changed")
            .property("name", PropertyAccessor::field("_name"));

        assert_eq!(spec.members.len(), 4);
        assert!(spec.members.get("run").unwrap().as_method().is_some());
        assert!(spec.members.get("name").unwrap().as_property().is_some());
    }

    #[test]
    fn test_new_descriptor_is_unregistered() {
        let desc = TypeDescriptor::new(TypeId::new(7));
        assert_eq!(desc.kind(), TypeKind::Unregistered);
        assert!(desc.name().is_none());
        assert!(!desc.is_base_merge_pending());
        assert!(!desc.is_flags());
    }
}
