//! Error types for the action pipeline.

use crate::types::ActionType;
use frontdesk_core::error::FrontdeskError;

/// Errors from action handler execution.
///
/// These never escape the executor boundary; `ActionExecutor::execute`
/// converts them to failed outcomes.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Action handler failed: {0}")]
    HandlerFailed(String),
    #[error("Action type not registered: {0}")]
    Unregistered(ActionType),
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),
}

impl From<ActionError> for FrontdeskError {
    fn from(err: ActionError) -> Self {
        FrontdeskError::Action(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_error_display() {
        let err = ActionError::HandlerFailed("connection reset".to_string());
        assert_eq!(err.to_string(), "Action handler failed: connection reset");

        let err = ActionError::Unregistered(ActionType::TransferCall);
        assert_eq!(err.to_string(), "Action type not registered: transfer_call");

        let err = ActionError::MissingParameter("date".to_string());
        assert_eq!(err.to_string(), "Missing required parameter: date");
    }

    #[test]
    fn test_action_error_into_frontdesk_error() {
        let err = ActionError::MissingParameter("time".to_string());
        let fd_err: FrontdeskError = err.into();
        assert!(matches!(fd_err, FrontdeskError::Action(_)));
        assert!(fd_err.to_string().contains("time"));
    }

    #[test]
    fn test_unregistered_all_action_types() {
        for at in [
            ActionType::ScheduleAppointment,
            ActionType::CancelAppointment,
            ActionType::TakeMessage,
            ActionType::TransferCall,
            ActionType::LookupInfo,
            ActionType::SaveContact,
            ActionType::SetReminder,
            ActionType::SendEmail,
            ActionType::SendSms,
        ] {
            let err = ActionError::Unregistered(at);
            let msg = err.to_string();
            assert!(msg.starts_with("Action type not registered: "));
            assert!(msg.contains(&at.to_string()));
        }
    }

    #[test]
    fn test_errors_implement_debug() {
        let err = ActionError::HandlerFailed("test".to_string());
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("HandlerFailed"));
    }
}
