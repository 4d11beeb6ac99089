//! Flow engine error types.

use frontdesk_core::FrontdeskError;
use thiserror::Error;

/// Errors surfaced by flows and the flow manager.
///
/// These never escape `FlowManager::process_message`; the manager converts
/// them into an error field on the turn result and keeps the call alive.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Invalid state transition: {0} -> {1}")]
    InvalidTransition(String, String),

    #[error("Unknown flow id: {0}")]
    UnknownFlow(String),

    #[error("Flow processing failed: {0}")]
    Process(String),
}

impl From<FlowError> for FrontdeskError {
    fn from(err: FlowError) -> Self {
        FrontdeskError::Flow(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_display() {
        let err = FlowError::InvalidTransition("confirming".to_string(), "init".to_string());
        assert_eq!(err.to_string(), "Invalid state transition: confirming -> init");
    }

    #[test]
    fn test_unknown_flow_display() {
        let err = FlowError::UnknownFlow("billing".to_string());
        assert_eq!(err.to_string(), "Unknown flow id: billing");
    }

    #[test]
    fn test_conversion_to_frontdesk_error() {
        let err: FrontdeskError = FlowError::Process("boom".to_string()).into();
        assert!(matches!(err, FrontdeskError::Flow(_)));
        assert!(err.to_string().contains("boom"));
    }
}
