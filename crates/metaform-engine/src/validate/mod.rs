//! Contract validator
//!
//! Checks call arguments against declared parameter signatures at dynamic
//! boundaries. Checks run in a fixed order per argument: presence, enum
//! domain, DOM shape, declared type, integer; array elements are then
//! checked against the element constraints with the index embedded in the
//! parameter name.

pub mod signatures;

use std::borrow::Cow;

use metaform_sdk::{ReflectError, ReflectResult, TypeId, Value};

use crate::registry::builtins::{ARRAY, NUMBER};
use crate::registry::TypeRegistry;
use crate::resources;

// ============================================================================
// ParamSpec
// ============================================================================

/// Declared contract of one parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    /// Parameter name used in diagnostics
    pub name: Cow<'static, str>,
    /// Declared type, if any
    pub expected: Option<TypeId>,
    /// `Null` and `Undefined` are accepted
    pub may_be_null: bool,
    /// May be omitted; an explicit `Undefined` counts as omitted
    pub optional: bool,
    /// Trailing parameter absorbing any number of arguments
    pub variadic: bool,
    /// Declared type of array elements
    pub element_type: Option<TypeId>,
    /// Array elements may be `Null`/`Undefined`
    pub element_may_be_null: bool,
    /// Array elements must be integral numbers
    pub element_integer: bool,
    /// Array elements must be DOM elements
    pub element_dom_element: bool,
    /// Value must be a DOM element
    pub dom_element: bool,
    /// Value must be an integral number
    pub integer: bool,
}

impl ParamSpec {
    /// Unconstrained required parameter
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            expected: None,
            may_be_null: false,
            optional: false,
            variadic: false,
            element_type: None,
            element_may_be_null: false,
            element_integer: false,
            element_dom_element: false,
            dom_element: false,
            integer: false,
        }
    }

    /// Declare the expected type
    pub fn typed(mut self, ty: TypeId) -> Self {
        self.expected = Some(ty);
        self
    }

    /// Accept `Null`/`Undefined`
    pub fn may_be_null(mut self) -> Self {
        self.may_be_null = true;
        self
    }

    /// Parameter may be omitted
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Trailing parameter array
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Declare the element type of an array parameter
    pub fn element_type(mut self, ty: TypeId) -> Self {
        self.element_type = Some(ty);
        self
    }

    /// Accept nullish array elements
    pub fn element_may_be_null(mut self) -> Self {
        self.element_may_be_null = true;
        self
    }

    /// Require integral array elements
    pub fn element_integer(mut self) -> Self {
        self.element_integer = true;
        self
    }

    /// Require DOM-element array elements
    pub fn element_dom_element(mut self) -> Self {
        self.element_dom_element = true;
        self
    }

    /// Require a DOM element
    pub fn dom_element(mut self) -> Self {
        self.dom_element = true;
        self
    }

    /// Require an integral number
    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }
}

/// Constraints applied to one value (a parameter or an array element)
#[derive(Clone, Copy)]
struct Constraint {
    expected: Option<TypeId>,
    may_be_null: bool,
    optional: bool,
    dom_element: bool,
    integer: bool,
}

// ============================================================================
// ContractValidator
// ============================================================================

/// Validates arguments against parameter signatures using the registry's
/// type relationships
#[derive(Debug, Clone, Copy)]
pub struct ContractValidator<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> ContractValidator<'a> {
    /// Create a validator over a registry
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Check arity, then every supplied argument
    pub fn validate_params(&self, args: &[Value], params: &[ParamSpec]) -> ReflectResult<()> {
        self.validate_parameter_count(args, params)?;
        let Some(last) = params.len().checked_sub(1) else {
            return Ok(());
        };
        for (i, arg) in args.iter().enumerate() {
            let spec = &params[i.min(last)];
            if i >= last && spec.variadic {
                let name = format!("{}[{}]", spec.name, i - last);
                self.validate_parameter(arg, spec, &name)?;
            } else {
                self.validate_parameter(arg, spec, &spec.name)?;
            }
        }
        Ok(())
    }

    /// Check the argument count against the signature.
    ///
    /// Required parameters set the minimum; a variadic trailing parameter
    /// lifts the maximum. A variadic flag anywhere else is ignored.
    pub fn validate_parameter_count(
        &self,
        args: &[Value],
        params: &[ParamSpec],
    ) -> ReflectResult<()> {
        let variadic_tail = params.last().is_some_and(|p| p.variadic);
        let fixed = &params[..params.len() - usize::from(variadic_tail)];
        let min = fixed.iter().filter(|p| !p.optional).count();
        let max = if variadic_tail { usize::MAX } else { params.len() };
        if args.len() < min || args.len() > max {
            return Err(ReflectError::parameter_count());
        }
        Ok(())
    }

    /// Check one argument, including its array elements
    pub fn validate_parameter(
        &self,
        value: &Value,
        spec: &ParamSpec,
        name: &str,
    ) -> ReflectResult<()> {
        self.validate_parameter_type(
            value,
            Constraint {
                expected: spec.expected,
                may_be_null: spec.may_be_null,
                optional: spec.optional,
                dom_element: spec.dom_element,
                integer: spec.integer,
            },
            name,
        )?;

        let check_elements = spec.element_type.is_some() || !spec.element_may_be_null;
        if spec.expected == Some(ARRAY) && check_elements {
            if let Value::Array(items) = value {
                let items = items.borrow().clone();
                let element = Constraint {
                    expected: spec.element_type,
                    may_be_null: spec.element_may_be_null,
                    optional: false,
                    dom_element: spec.element_dom_element,
                    integer: spec.element_integer,
                };
                for (i, item) in items.iter().enumerate() {
                    self.validate_parameter_type(item, element, &format!("{}[{}]", name, i))?;
                }
            }
        }
        Ok(())
    }

    fn validate_parameter_type(
        &self,
        value: &Value,
        c: Constraint,
        name: &str,
    ) -> ReflectResult<()> {
        match value {
            Value::Undefined if c.may_be_null || c.optional => return Ok(()),
            Value::Undefined => return Err(ReflectError::argument_undefined(name)),
            Value::Null if c.may_be_null => return Ok(()),
            Value::Null => return Err(ReflectError::argument_null(name)),
            _ => {}
        }

        if let Some(expected) = c.expected {
            if let Some(info) = self.registry.descriptor(expected).and_then(|d| d.enum_info()) {
                if !matches!(value, Value::Number(_)) {
                    return Err(self.type_mismatch(value, expected, name));
                }
                let valid = value.as_integer().is_some_and(|v| info.is_valid_value(v));
                if !valid {
                    return Err(ReflectError::argument_out_of_range(
                        name,
                        value,
                        resources::format2(
                            resources::ENUM_INVALID_VALUE,
                            &value.to_string(),
                            &self.registry.type_name_of(expected),
                        ),
                    ));
                }
                return Ok(());
            }
        }

        if c.dom_element && !value.as_element().is_some_and(|e| e.kind().is_dom_target()) {
            return Err(ReflectError::argument(name, resources::ARGUMENT_DOM_ELEMENT));
        }

        if let Some(expected) = c.expected {
            if !self.registry.is_instance_of_type(expected, value) {
                return Err(self.type_mismatch(value, expected, name));
            }
        }

        if c.integer && matches!(c.expected, None | Some(NUMBER)) {
            if let Value::Number(_) = value {
                if value.as_integer().is_none() {
                    return Err(ReflectError::argument_out_of_range(
                        name,
                        value,
                        resources::ARGUMENT_INTEGER,
                    ));
                }
            }
        }
        Ok(())
    }

    fn type_mismatch(&self, value: &Value, expected: TypeId, name: &str) -> ReflectError {
        ReflectError::argument_type(
            name,
            self.registry.get_type_name(value),
            self.registry.type_name_of(expected),
        )
    }
}

impl TypeRegistry {
    /// Validator over this registry
    pub fn validator(&self) -> ContractValidator<'_> {
        ContractValidator::new(self)
    }
}
