//! Enum subsystem
//!
//! Integer and bit-flag enumerations. The value members of an enum are the
//! integer `Field` members declared on its descriptor; registration checks
//! them and freezes them into an [`EnumInfo`]. Reverse lookups are built on
//! first use and cached.

use once_cell::unsync::OnceCell;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use metaform_sdk::{ReflectError, ReflectResult, TypeId, Value};

use crate::registry::{is_identifier, Member, TypeKind, TypeRegistry};
use crate::resources;
use crate::validate::signatures;

/// Names that collide with the operations installed on every enum
pub const RESERVED_ENUM_NAMES: &[&str] =
    &["parse", "toString", "getName", "constructor", "prototype"];

/// Frozen value table of a registered enum
#[derive(Debug)]
pub struct EnumInfo {
    flags: bool,
    values: Vec<(String, i64)>,
    by_name: FxHashMap<String, i64>,
    by_value: OnceCell<FxHashMap<i64, String>>,
    lower_case: OnceCell<FxHashMap<String, i64>>,
    sorted: OnceCell<Vec<(i64, String)>>,
    mask: i64,
}

impl EnumInfo {
    fn new(flags: bool, values: Vec<(String, i64)>) -> Self {
        let by_name = values.iter().cloned().collect();
        let mask = values.iter().fold(0, |acc, (_, v)| acc | v);
        Self {
            flags,
            values,
            by_name,
            by_value: OnceCell::new(),
            lower_case: OnceCell::new(),
            sorted: OnceCell::new(),
            mask,
        }
    }

    /// Bit-flag enum
    pub fn is_flags(&self) -> bool {
        self.flags
    }

    /// Declared values in declaration order
    pub fn values(&self) -> &[(String, i64)] {
        &self.values
    }

    /// Value of a named member
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.by_name.get(name).copied()
    }

    /// First declared name carrying `value`
    pub fn name_of(&self, value: i64) -> Option<&str> {
        self.by_value
            .get_or_init(|| {
                trace!(count = self.values.len(), "building enum reverse index");
                let mut map = FxHashMap::default();
                for (name, v) in &self.values {
                    map.entry(*v).or_insert_with(|| name.clone());
                }
                map
            })
            .get(&value)
            .map(String::as_str)
    }

    fn lookup_ignore_case(&self, name: &str) -> Option<i64> {
        self.lower_case
            .get_or_init(|| {
                self.values
                    .iter()
                    .map(|(n, v)| (n.to_lowercase(), *v))
                    .collect()
            })
            .get(name)
            .copied()
    }

    /// Non-zero values in ascending order
    fn sorted(&self) -> &[(i64, String)] {
        self.sorted.get_or_init(|| {
            let mut sorted: Vec<(i64, String)> = self
                .values
                .iter()
                .filter(|(_, v)| *v != 0)
                .map(|(n, v)| (*v, n.clone()))
                .collect();
            sorted.sort_by_key(|(v, _)| *v);
            sorted
        })
    }

    /// Whether `value` is a declared member or, for flag enums, a union of
    /// declared bits
    pub fn is_valid_value(&self, value: i64) -> bool {
        if !self.flags || value == 0 {
            return self.name_of(value).is_some();
        }
        value & !self.mask == 0
    }
}

impl TypeRegistry {
    /// Register `ty` as an enum named `name`.
    ///
    /// Every member must be an integer field with an identifier name that
    /// does not shadow an enum operation. Flag enum members must be zero or
    /// a bit not used by another member.
    pub fn register_enum(&mut self, name: &str, ty: TypeId, flags: bool) -> ReflectResult<TypeId> {
        self.check_registration("name", name, ty)?;

        let mut values = Vec::new();
        let mut used_bits = 0i64;
        for (member_name, member) in self.desc(ty)?.members().iter() {
            if !is_identifier(member_name) {
                return Err(ReflectError::invalid_operation(resources::format1(
                    resources::ENUM_INVALID_VALUE_NAME,
                    member_name,
                )));
            }
            let value = match member {
                Member::Field(v) => v.as_integer(),
                _ => None,
            }
            .ok_or_else(|| ReflectError::invalid_operation(resources::ENUM_VALUE_NOT_INTEGER))?;
            if RESERVED_ENUM_NAMES.contains(&member_name) {
                return Err(ReflectError::invalid_operation(resources::format1(
                    resources::ENUM_RESERVED_NAME,
                    member_name,
                )));
            }
            if flags && value != 0 {
                if value < 0 || value & (value - 1) != 0 || value & used_bits != 0 {
                    return Err(ReflectError::invalid_operation(resources::format1(
                        resources::ENUM_FLAG_NOT_SINGLE_BIT,
                        member_name,
                    )));
                }
                used_bits |= value;
            }
            values.push((member_name.to_string(), value));
        }

        let count = values.len();
        self.record_name(name, ty);
        let desc = self.desc_mut(ty)?;
        desc.name = Some(name.to_string());
        desc.kind = TypeKind::Enum;
        desc.enum_info = Some(EnumInfo::new(flags, values));
        debug!(type_name = name, flags, values = count, "registered enum");
        Ok(ty)
    }

    fn enum_info(&self, ty: TypeId) -> ReflectResult<&EnumInfo> {
        self.desc(ty)?
            .enum_info()
            .ok_or_else(|| ReflectError::argument("type", resources::NOT_AN_ENUM))
    }

    /// Value of the member `name` of enum `ty`
    pub fn enum_value(&self, ty: TypeId, name: &str) -> Option<i64> {
        self.descriptor(ty)?.enum_info()?.value_of(name)
    }

    /// Parse the textual form of an enum value.
    ///
    /// Flag enums accept a comma-separated list of names and combine them
    /// with bitwise OR.
    pub fn parse_enum(&self, ty: TypeId, text: &str, ignore_case: bool) -> ReflectResult<i64> {
        if self.options().validate_arguments {
            self.validator().validate_params(
                &[Value::from(text), Value::Bool(ignore_case)],
                &signatures::ENUM_PARSE,
            )?;
        }
        let info = self.enum_info(ty)?;
        let type_name = self.type_name_of(ty);
        let lookup = |token: &str| {
            if ignore_case {
                info.lookup_ignore_case(&token.to_lowercase())
            } else {
                info.value_of(token)
            }
        };
        let invalid = |token: &str| {
            ReflectError::argument(
                "value",
                resources::format2(resources::ENUM_INVALID_VALUE, token, &type_name),
            )
        };

        if !info.is_flags() {
            return lookup(text.trim()).ok_or_else(|| invalid(text));
        }
        let mut value = 0;
        for part in text.split(',').rev() {
            let token = part.trim();
            value |= lookup(token).ok_or_else(|| invalid(token))?;
        }
        Ok(value)
    }

    /// Textual form of an enum value.
    ///
    /// `Null`/`Undefined` yield the enum's own name. Flag values are
    /// decomposed into declared flags, largest first, and listed in
    /// ascending order.
    pub fn enum_to_string(&self, ty: TypeId, value: &Value) -> ReflectResult<String> {
        if self.options().validate_arguments {
            self.validator()
                .validate_params(std::slice::from_ref(value), &signatures::ENUM_TO_STRING)?;
        }
        let info = self.enum_info(ty)?;
        let type_name = self.type_name_of(ty);
        if value.is_nullish() {
            return Ok(type_name);
        }
        let Some(n) = value.as_integer() else {
            return Err(ReflectError::argument_type(
                "value",
                self.get_type_name(value),
                type_name,
            ));
        };

        if !info.is_flags() || n == 0 {
            if let Some(name) = info.name_of(n) {
                return Ok(name.to_string());
            }
        } else {
            let mut parts = Vec::new();
            let mut remaining = n;
            for (v, name) in info.sorted().iter().rev() {
                if v & n == *v {
                    parts.push(name.as_str());
                    remaining -= v;
                    if remaining == 0 {
                        break;
                    }
                }
            }
            if !parts.is_empty() && remaining == 0 {
                parts.reverse();
                return Ok(parts.join(", "));
            }
        }
        Err(ReflectError::argument_out_of_range(
            "value",
            value,
            resources::format2(resources::ENUM_INVALID_VALUE, &value.to_string(), &type_name),
        ))
    }
}
