//! Core types and value objects for the action pipeline.
//!
//! Defines directives, outcomes, and the closed set of action types.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use frontdesk_core::types::Timestamp;
use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Action types mapping to handler implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    ScheduleAppointment,
    CancelAppointment,
    TakeMessage,
    TransferCall,
    LookupInfo,
    SaveContact,
    SetReminder,
    SendEmail,
    SendSms,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::ScheduleAppointment => write!(f, "schedule_appointment"),
            ActionType::CancelAppointment => write!(f, "cancel_appointment"),
            ActionType::TakeMessage => write!(f, "take_message"),
            ActionType::TransferCall => write!(f, "transfer_call"),
            ActionType::LookupInfo => write!(f, "lookup_info"),
            ActionType::SaveContact => write!(f, "save_contact"),
            ActionType::SetReminder => write!(f, "set_reminder"),
            ActionType::SendEmail => write!(f, "send_email"),
            ActionType::SendSms => write!(f, "send_sms"),
        }
    }
}

impl std::str::FromStr for ActionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "schedule_appointment" => Ok(ActionType::ScheduleAppointment),
            "cancel_appointment" => Ok(ActionType::CancelAppointment),
            "take_message" => Ok(ActionType::TakeMessage),
            "transfer_call" => Ok(ActionType::TransferCall),
            "lookup_info" => Ok(ActionType::LookupInfo),
            "save_contact" => Ok(ActionType::SaveContact),
            "set_reminder" => Ok(ActionType::SetReminder),
            "send_email" => Ok(ActionType::SendEmail),
            "send_sms" => Ok(ActionType::SendSms),
            _ => Err(format!("Unknown action type: {}", s)),
        }
    }
}

// =============================================================================
// Domain Structs
// =============================================================================

/// One parsed action request: a raw type name plus string parameters.
///
/// The type stays a raw string until execution so that unrecognized types
/// flow through as data instead of parse failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDirective {
    pub action_type: String,
    pub params: HashMap<String, String>,
}

impl ActionDirective {
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            params: HashMap::new(),
        }
    }
}

/// Result of executing one directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    /// Unique id of the performed action, present on success.
    pub action_id: Option<String>,
    pub message: String,
    pub details: HashMap<String, String>,
    pub error: Option<String>,
}

impl ActionOutcome {
    /// Successful outcome with no extra details.
    pub fn ok(action_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            action_id: Some(action_id.into()),
            message: message.into(),
            details: HashMap::new(),
            error: None,
        }
    }

    /// Failed outcome. The error text doubles as the message.
    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            success: false,
            action_id: None,
            message: error.clone(),
            details: HashMap::new(),
            error: Some(error),
        }
    }
}

/// One entry in the call-scoped audit log of executed directives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutedAction {
    pub directive: ActionDirective,
    pub outcome: ActionOutcome,
    pub executed_at: Timestamp,
}

/// Synthesize a time-based action id like `apt_1724300000000_7`.
///
/// The counter suffix keeps ids unique when several actions land in the
/// same millisecond.
pub fn next_action_id(prefix: &str) -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!(
        "{}_{}_{}",
        prefix,
        chrono::Utc::now().timestamp_millis(),
        seq
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // ---- ActionType ----

    #[test]
    fn test_action_type_display() {
        assert_eq!(ActionType::ScheduleAppointment.to_string(), "schedule_appointment");
        assert_eq!(ActionType::CancelAppointment.to_string(), "cancel_appointment");
        assert_eq!(ActionType::TakeMessage.to_string(), "take_message");
        assert_eq!(ActionType::TransferCall.to_string(), "transfer_call");
        assert_eq!(ActionType::LookupInfo.to_string(), "lookup_info");
        assert_eq!(ActionType::SaveContact.to_string(), "save_contact");
        assert_eq!(ActionType::SetReminder.to_string(), "set_reminder");
        assert_eq!(ActionType::SendEmail.to_string(), "send_email");
        assert_eq!(ActionType::SendSms.to_string(), "send_sms");
    }

    #[test]
    fn test_action_type_from_str() {
        assert_eq!(
            "schedule_appointment".parse::<ActionType>().unwrap(),
            ActionType::ScheduleAppointment
        );
        assert_eq!(
            "transfer_call".parse::<ActionType>().unwrap(),
            ActionType::TransferCall
        );
        assert_eq!("send_sms".parse::<ActionType>().unwrap(), ActionType::SendSms);
        assert!("launch_rocket".parse::<ActionType>().is_err());
    }

    #[test]
    fn test_action_type_from_str_error_message() {
        let err = "launch_rocket".parse::<ActionType>().unwrap_err();
        assert_eq!(err, "Unknown action type: launch_rocket");
    }

    #[test]
    fn test_action_type_serde_round_trip() {
        for variant in [
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
            let json = serde_json::to_string(&variant).unwrap();
            let rt: ActionType = serde_json::from_str(&json).unwrap();
            assert_eq!(variant, rt);
        }
    }

    #[test]
    fn test_action_type_serialization_format() {
        assert_eq!(
            serde_json::to_string(&ActionType::ScheduleAppointment).unwrap(),
            "\"schedule_appointment\""
        );
        assert_eq!(
            serde_json::to_string(&ActionType::SendSms).unwrap(),
            "\"send_sms\""
        );
    }

    // ---- ActionDirective ----

    #[test]
    fn test_directive_new() {
        let d = ActionDirective::new("take_message");
        assert_eq!(d.action_type, "take_message");
        assert!(d.params.is_empty());
    }

    #[test]
    fn test_directive_serde_round_trip() {
        let mut d = ActionDirective::new("schedule_appointment");
        d.params.insert("date".to_string(), "tomorrow".to_string());
        let json = serde_json::to_string(&d).unwrap();
        let rt: ActionDirective = serde_json::from_str(&json).unwrap();
        assert_eq!(rt, d);
    }

    // ---- ActionOutcome ----

    #[test]
    fn test_outcome_ok() {
        let outcome = ActionOutcome::ok("apt_123", "Appointment scheduled");
        assert!(outcome.success);
        assert_eq!(outcome.action_id.as_deref(), Some("apt_123"));
        assert_eq!(outcome.message, "Appointment scheduled");
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_outcome_failure() {
        let outcome = ActionOutcome::failure("Unknown action type: launch_rocket");
        assert!(!outcome.success);
        assert!(outcome.action_id.is_none());
        assert_eq!(outcome.error.as_deref(), Some("Unknown action type: launch_rocket"));
        assert_eq!(outcome.message, "Unknown action type: launch_rocket");
    }

    // ---- next_action_id ----

    #[test]
    fn test_action_ids_are_unique() {
        let a = next_action_id("apt");
        let b = next_action_id("apt");
        assert_ne!(a, b);
        assert!(a.starts_with("apt_"));
    }
}
