use thiserror::Error;

/// Top-level error type for the Frontdesk system.
///
/// Each variant wraps a subsystem-specific error. Subsystem crates define
/// their own error types and implement `From<SubsystemError> for
/// FrontdeskError` so that the `?` operator works seamlessly across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrontdeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Action error: {0}")]
    Action(String),

    #[error("Flow error: {0}")]
    Flow(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for FrontdeskError {
    fn from(err: toml::de::Error) -> Self {
        FrontdeskError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for FrontdeskError {
    fn from(err: toml::ser::Error) -> Self {
        FrontdeskError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for FrontdeskError {
    fn from(err: serde_json::Error) -> Self {
        FrontdeskError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Frontdesk operations.
pub type Result<T> = std::result::Result<T, FrontdeskError>;
