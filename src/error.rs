//!
//! Defines error types for the namespace permission engine.

/// Represents errors that can occur while building trees, resolving namespaces or filtering data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NspError {
    /// A namespace was empty, had an empty segment, or a leading/trailing dot.
    #[error("Invalid namespace '{namespace}': {reason}")]
    InvalidNamespace { namespace: String, reason: String },
    /// A resource reference had the wrong shape (e.g. a field name spanning several segments).
    #[error("Usage error: {0}")]
    Usage(String),
    /// The operation name has no permission flag in the configured mode.
    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),
    /// The external grant source failed to produce grants for a principal.
    #[error("Grant source error: {0}")]
    GrantSource(String),
}

impl NspError {
    pub(crate) fn invalid_namespace(namespace: &str, reason: impl Into<String>) -> Self {
        NspError::InvalidNamespace {
            namespace: namespace.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading an [`crate::config::NspConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// An environment variable held a value the engine does not understand.
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}
