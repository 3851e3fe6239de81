//! Parameter signatures of the dynamic-boundary operations

use once_cell::sync::Lazy;

use super::ParamSpec;
use crate::registry::builtins::{ARRAY, BOOLEAN, FUNCTION, STRING, TYPE};

/// `call_base_method(instance, name, baseArguments?)`
pub static CALL_BASE_METHOD: Lazy<Vec<ParamSpec>> = Lazy::new(|| {
    vec![
        ParamSpec::new("instance"),
        ParamSpec::new("name").typed(STRING),
        ParamSpec::new("baseArguments")
            .typed(ARRAY)
            .may_be_null()
            .optional()
            .element_may_be_null(),
    ]
});

/// `create(type, properties?, events?, references?, element?)`
pub static CREATE_COMPONENT: Lazy<Vec<ParamSpec>> = Lazy::new(|| {
    vec![
        ParamSpec::new("type").typed(TYPE),
        ParamSpec::new("properties").may_be_null().optional(),
        ParamSpec::new("events").may_be_null().optional(),
        ParamSpec::new("references").may_be_null().optional(),
        ParamSpec::new("element").may_be_null().optional().dom_element(),
    ]
});

/// `parse(value, ignoreCase?)` on an enum
pub static ENUM_PARSE: Lazy<Vec<ParamSpec>> = Lazy::new(|| {
    vec![
        ParamSpec::new("value").typed(STRING),
        ParamSpec::new("ignoreCase").typed(BOOLEAN).optional(),
    ]
});

/// `toString(value?)` on an enum
pub static ENUM_TO_STRING: Lazy<Vec<ParamSpec>> =
    Lazy::new(|| vec![ParamSpec::new("value").may_be_null().optional()]);

/// `add_handler(event, handler)` / `remove_handler(event, handler)`
pub static EVENT_HANDLER: Lazy<Vec<ParamSpec>> = Lazy::new(|| {
    vec![
        ParamSpec::new("event").typed(STRING),
        ParamSpec::new("handler").typed(FUNCTION),
    ]
});

/// `find_component(id)`
pub static FIND_COMPONENT: Lazy<Vec<ParamSpec>> =
    Lazy::new(|| vec![ParamSpec::new("id").typed(STRING)]);
