//! Runtime configuration

/// Configuration for a [`TypeRegistry`](crate::TypeRegistry)
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    /// Run the contract validator on dynamic-boundary operations
    /// (default: true)
    pub validate_arguments: bool,
    /// Resolve inheritance as soon as a class is registered instead of on
    /// first reflective use (default: false)
    pub eager_resolution: bool,
    /// Maximum number of segments in a dotted namespace or type name
    /// (default: 32)
    pub max_namespace_depth: usize,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        RuntimeOptions {
            validate_arguments: true,
            eager_resolution: false,
            max_namespace_depth: 32,
        }
    }
}

impl RuntimeOptions {
    /// Create default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for trusted callers: boundary contracts are skipped
    pub fn release() -> Self {
        Self {
            validate_arguments: false,
            ..Self::default()
        }
    }

    /// Options that resolve inheritance at registration time
    pub fn eager() -> Self {
        Self {
            eager_resolution: true,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RuntimeOptions::new();
        assert!(options.validate_arguments);
        assert!(!options.eager_resolution);
        assert_eq!(options.max_namespace_depth, 32);
    }

    #[test]
    fn test_presets() {
        assert!(!RuntimeOptions::release().validate_arguments);
        assert!(RuntimeOptions::eager().eager_resolution);
        assert!(RuntimeOptions::eager().validate_arguments);
    }
}
