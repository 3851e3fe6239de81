//! Error taxonomy for the type runtime
//!
//! Every error carries a discriminated kind plus the structured context a
//! reporting layer needs (parameter name, actual value, actual/expected type
//! names) so diagnostics never have to be re-derived.

use serde::Serialize;

use crate::value::Value;

/// Result type for runtime operations
pub type ReflectResult<T> = Result<T, ReflectError>;

/// Discriminated kind tag of a [`ReflectError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Invalid argument
    Argument,
    /// Argument explicitly null
    ArgumentNull,
    /// Argument not supplied (undefined)
    ArgumentUndefined,
    /// Argument outside its domain
    ArgumentOutOfRange,
    /// Argument of the wrong type
    ArgumentType,
    /// Operation not valid in the current state
    InvalidOperation,
    /// Wrong number of arguments
    ParameterCount,
    /// Abstract or interface placeholder invoked
    NotImplemented,
}

impl ErrorKind {
    /// Exception-style name used when rendering
    pub const fn exception_name(self) -> &'static str {
        match self {
            ErrorKind::Argument => "ArgumentException",
            ErrorKind::ArgumentNull => "ArgumentNullException",
            ErrorKind::ArgumentUndefined => "ArgumentUndefinedException",
            ErrorKind::ArgumentOutOfRange => "ArgumentOutOfRangeException",
            ErrorKind::ArgumentType => "ArgumentTypeException",
            ErrorKind::InvalidOperation => "InvalidOperationException",
            ErrorKind::ParameterCount => "ParameterCountException",
            ErrorKind::NotImplemented => "NotImplementedException",
        }
    }
}

fn param_line(param_name: &Option<String>) -> String {
    match param_name {
        Some(name) => format!("\nParameter name: {}", name),
        None => String::new(),
    }
}

fn actual_line(actual_value: &Option<String>) -> String {
    match actual_value {
        Some(value) => format!("\nActual value was {}.", value),
        None => String::new(),
    }
}

fn type_message(actual: &Option<String>, expected: &Option<String>) -> String {
    match (actual, expected) {
        (Some(actual), Some(expected)) => format!(
            "Object of type '{}' cannot be converted to type '{}'.",
            actual, expected
        ),
        _ => "Object cannot be converted to the required type.".to_string(),
    }
}

/// Structured runtime error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReflectError {
    /// Invalid argument
    #[error("ArgumentException: {message}{}", param_line(.param_name))]
    Argument {
        /// Offending parameter
        param_name: Option<String>,
        /// Description
        message: String,
    },

    /// Argument explicitly null where a value is required
    #[error("ArgumentNullException: Value cannot be null.{}", param_line(.param_name))]
    ArgumentNull {
        /// Offending parameter
        param_name: Option<String>,
    },

    /// Argument not supplied where a value is required
    #[error("ArgumentUndefinedException: Value cannot be undefined.{}", param_line(.param_name))]
    ArgumentUndefined {
        /// Offending parameter
        param_name: Option<String>,
    },

    /// Argument outside its accepted domain
    #[error(
        "ArgumentOutOfRangeException: {message}{}{}",
        param_line(.param_name),
        actual_line(.actual_value)
    )]
    ArgumentOutOfRange {
        /// Offending parameter
        param_name: Option<String>,
        /// Rendered actual value
        actual_value: Option<String>,
        /// Description
        message: String,
    },

    /// Argument of the wrong type
    #[error(
        "ArgumentTypeException: {}{}",
        type_message(.actual_type, .expected_type),
        param_line(.param_name)
    )]
    ArgumentType {
        /// Offending parameter
        param_name: Option<String>,
        /// Name of the argument's runtime type
        actual_type: Option<String>,
        /// Name of the declared type
        expected_type: Option<String>,
    },

    /// Operation not valid in the current state
    #[error("InvalidOperationException: {message}")]
    InvalidOperation {
        /// Description
        message: String,
    },

    /// Wrong number of arguments
    #[error("ParameterCountException: {message}")]
    ParameterCount {
        /// Description
        message: String,
    },

    /// Abstract or interface placeholder invoked
    #[error("NotImplementedException: {message}")]
    NotImplemented {
        /// Description
        message: String,
    },
}

impl ReflectError {
    /// Invalid argument
    pub fn argument(param_name: impl Into<String>, message: impl Into<String>) -> Self {
        ReflectError::Argument {
            param_name: Some(param_name.into()),
            message: message.into(),
        }
    }

    /// Argument explicitly null
    pub fn argument_null(param_name: impl Into<String>) -> Self {
        ReflectError::ArgumentNull {
            param_name: Some(param_name.into()),
        }
    }

    /// Argument not supplied
    pub fn argument_undefined(param_name: impl Into<String>) -> Self {
        ReflectError::ArgumentUndefined {
            param_name: Some(param_name.into()),
        }
    }

    /// Argument outside its domain
    pub fn argument_out_of_range(
        param_name: impl Into<String>,
        actual_value: &Value,
        message: impl Into<String>,
    ) -> Self {
        ReflectError::ArgumentOutOfRange {
            param_name: Some(param_name.into()),
            actual_value: (!actual_value.is_nullish()).then(|| actual_value.to_string()),
            message: message.into(),
        }
    }

    /// Argument of the wrong type
    pub fn argument_type(
        param_name: impl Into<String>,
        actual_type: impl Into<String>,
        expected_type: impl Into<String>,
    ) -> Self {
        ReflectError::ArgumentType {
            param_name: Some(param_name.into()),
            actual_type: Some(actual_type.into()),
            expected_type: Some(expected_type.into()),
        }
    }

    /// Operation not valid in the current state
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        ReflectError::InvalidOperation {
            message: message.into(),
        }
    }

    /// Wrong number of arguments
    pub fn parameter_count() -> Self {
        ReflectError::ParameterCount {
            message: "Parameter count mismatch.".to_string(),
        }
    }

    /// Placeholder invoked
    pub fn not_implemented(message: impl Into<String>) -> Self {
        ReflectError::NotImplemented {
            message: message.into(),
        }
    }

    /// Discriminated kind tag
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReflectError::Argument { .. } => ErrorKind::Argument,
            ReflectError::ArgumentNull { .. } => ErrorKind::ArgumentNull,
            ReflectError::ArgumentUndefined { .. } => ErrorKind::ArgumentUndefined,
            ReflectError::ArgumentOutOfRange { .. } => ErrorKind::ArgumentOutOfRange,
            ReflectError::ArgumentType { .. } => ErrorKind::ArgumentType,
            ReflectError::InvalidOperation { .. } => ErrorKind::InvalidOperation,
            ReflectError::ParameterCount { .. } => ErrorKind::ParameterCount,
            ReflectError::NotImplemented { .. } => ErrorKind::NotImplemented,
        }
    }

    /// Offending parameter, for argument-family errors
    pub fn param_name(&self) -> Option<&str> {
        match self {
            ReflectError::Argument { param_name, .. }
            | ReflectError::ArgumentNull { param_name }
            | ReflectError::ArgumentUndefined { param_name }
            | ReflectError::ArgumentOutOfRange { param_name, .. }
            | ReflectError::ArgumentType { param_name, .. } => param_name.as_deref(),
            _ => None,
        }
    }

    /// Snapshot of the structured context for an error-reporting layer
    pub fn info(&self) -> ErrorInfo {
        let (actual_value, actual_type, expected_type) = match self {
            ReflectError::ArgumentOutOfRange { actual_value, .. } => {
                (actual_value.clone(), None, None)
            }
            ReflectError::ArgumentType {
                actual_type,
                expected_type,
                ..
            } => (None, actual_type.clone(), expected_type.clone()),
            _ => (None, None, None),
        };
        ErrorInfo {
            name: self.kind().exception_name(),
            kind: self.kind(),
            message: self.to_string(),
            param_name: self.param_name().map(str::to_string),
            actual_value,
            actual_type,
            expected_type,
        }
    }
}

/// Serializable view of an error's structured context
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    /// Exception-style name
    pub name: &'static str,
    /// Kind tag
    pub kind: ErrorKind,
    /// Fully rendered message
    pub message: String,
    /// Offending parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_name: Option<String>,
    /// Rendered actual value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<String>,
    /// Actual type name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_type: Option<String>,
    /// Expected type name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argument_message() {
        let err = ReflectError::argument("typeName", "Value is not a valid type name.");
        assert_eq!(err.kind(), ErrorKind::Argument);
        assert_eq!(err.param_name(), Some("typeName"));
        assert_eq!(
            err.to_string(),
            "ArgumentException: Value is not a valid type name.\nParameter name: typeName"
        );
    }

    #[test]
    fn test_null_and_undefined_are_distinct_kinds() {
        let null = ReflectError::argument_null("x");
        let undefined = ReflectError::argument_undefined("x");
        assert_eq!(null.kind(), ErrorKind::ArgumentNull);
        assert_eq!(undefined.kind(), ErrorKind::ArgumentUndefined);
        assert_ne!(null, undefined);
    }

    #[test]
    fn test_out_of_range_carries_actual_value() {
        let err = ReflectError::argument_out_of_range(
            "x",
            &Value::number(2.5),
            "Value must be an integer.",
        );
        assert_eq!(
            err.to_string(),
            "ArgumentOutOfRangeException: Value must be an integer.\n\
             Parameter name: x\n\
             Actual value was 2.5."
        );
        assert_eq!(err.info().actual_value.as_deref(), Some("2.5"));
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = ReflectError::argument_type("value", "String", "Number");
        assert!(err.to_string().contains("'String' cannot be converted to type 'Number'"));
        let info = err.info();
        assert_eq!(info.actual_type.as_deref(), Some("String"));
        assert_eq!(info.expected_type.as_deref(), Some("Number"));
    }

    #[test]
    fn test_info_serializes_camel_case() {
        let info = ReflectError::argument_null("handler").info();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["name"], "ArgumentNullException");
        assert_eq!(json["kind"], "ArgumentNull");
        assert_eq!(json["paramName"], "handler");
        assert!(json.get("actualType").is_none());
    }

    #[test]
    fn test_non_argument_errors_have_no_param() {
        assert_eq!(ReflectError::parameter_count().param_name(), None);
        assert_eq!(ReflectError::invalid_operation("x").kind(), ErrorKind::InvalidOperation);
        assert_eq!(ReflectError::not_implemented("x").kind(), ErrorKind::NotImplemented);
    }
}
