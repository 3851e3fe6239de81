//! Diagnostic message templates
//!
//! `{0}`/`{1}` placeholders are filled by [`format1`] and [`format2`].

pub(crate) const NOT_A_TYPE_NAME: &str = "Value is not a valid type name.";
pub(crate) const ARGUMENT_TYPE_NAME: &str = "Value is not the name of an existing type.";
pub(crate) const BAD_TYPE_NAME: &str =
    "Value is not the name of the type being registered or the name is a reserved word.";
pub(crate) const TYPE_REGISTERED_TWICE: &str =
    "Type {0} has already been registered. The type may be defined multiple times \
     or the script file that defines it may have already been loaded.";
pub(crate) const BASE_NOT_A_CLASS: &str = "Value is not a class.";
pub(crate) const NOT_AN_INTERFACE: &str = "Value is not a valid interface.";
pub(crate) const NOT_A_TYPE: &str = "Value is not a type.";
pub(crate) const INVALID_NAMESPACE: &str = "Value is not a valid namespace identifier.";
pub(crate) const NAMESPACE_CONTAINS_OBJECT: &str =
    "Object {0} already exists and is not a namespace.";
pub(crate) const METHOD_NOT_FOUND: &str = "No method found with name '{0}'.";

pub(crate) const ARGUMENT_INTEGER: &str = "Value must be an integer.";
pub(crate) const ARGUMENT_DOM_ELEMENT: &str = "Value must be a DOM element.";

pub(crate) const ENUM_INVALID_VALUE: &str = "'{0}' is not a valid value for enum {1}.";
pub(crate) const ENUM_INVALID_VALUE_NAME: &str = "'{0}' is not a valid name for an enum value.";
pub(crate) const ENUM_VALUE_NOT_INTEGER: &str =
    "An enumeration definition can only contain integer values.";
pub(crate) const ENUM_RESERVED_NAME: &str =
    "'{0}' is a reserved name that can't be used as an enum value name.";
pub(crate) const ENUM_FLAG_NOT_SINGLE_BIT: &str =
    "'{0}' must be zero or a single bit not used by another value of a flags enumeration.";
pub(crate) const NOT_AN_ENUM: &str = "Value is not an enumeration.";

pub(crate) const CREATE_NOT_COMPONENT: &str = "{0} does not derive from Core.Component.";
pub(crate) const CREATE_NO_DOM: &str = "Value must not be null for Controls and Behaviors.";
pub(crate) const CREATE_COMPONENT_ON_DOM: &str =
    "Value must be null for Components that are not Controls or Behaviors.";
pub(crate) const UNDEFINED_EVENT: &str = "'{0}' is not an event.";
pub(crate) const EVENT_HANDLER_NOT_FUNCTION: &str = "Handler must be a function.";
pub(crate) const PROPERTY_UNDEFINED: &str = "'{0}' is not a property or an existing field.";
pub(crate) const PROPERTY_NOT_WRITABLE: &str = "'{0}' is not a writable property.";
pub(crate) const PROPERTY_NOT_AN_ARRAY: &str = "'{0}' is not an Array property.";
pub(crate) const PROPERTY_NULL_OR_UNDEFINED: &str =
    "Cannot set the properties of '{0}' because it returned a null value.";
pub(crate) const REFERENCE_NOT_FOUND: &str = "Component '{0}' was not found.";
pub(crate) const CANT_ADD_WITHOUT_ID: &str = "Can't add a component that doesn't have an id.";
pub(crate) const DUPLICATE_ID: &str =
    "Two components with the same id '{0}' can't be added to the application.";
pub(crate) const COMPONENT_CANT_SET_ID_TWICE: &str =
    "The id property of a component can't be set more than once.";
pub(crate) const NOT_A_COMPONENT: &str = "Value is not a component.";
pub(crate) const NOT_IMPLEMENTED: &str = "The method or operation is not implemented.";

/// Fill the `{0}` placeholder
pub(crate) fn format1(template: &str, arg0: &str) -> String {
    template.replace("{0}", arg0)
}

/// Fill the `{0}` and `{1}` placeholders
pub(crate) fn format2(template: &str, arg0: &str, arg1: &str) -> String {
    template.replace("{0}", arg0).replace("{1}", arg1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(format1(METHOD_NOT_FOUND, "run"), "No method found with name 'run'.");
        assert_eq!(
            format2(ENUM_INVALID_VALUE, "7", "Color"),
            "'7' is not a valid value for enum Color."
        );
    }
}
