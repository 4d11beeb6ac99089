//! Flow state enums with validated transitions.
//!
//! Each conversational flow that runs a state machine gets its own enum
//! and a transition validator in the same shape:
//! every collecting state can skip forward past fields that are already
//! filled, and terminal states (`completed`, `cancelled`, `failed`) have
//! no outgoing edges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FlowError;

// =============================================================================
// Appointment
// =============================================================================

/// States of the appointment booking flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentState {
    Init,
    Rescheduling,
    CollectingDate,
    CollectingTime,
    CollectingDuration,
    CollectingName,
    CollectingPurpose,
    Confirming,
    Completed,
    Cancelled,
}

impl AppointmentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentState::Completed | AppointmentState::Cancelled)
    }
}

impl Default for AppointmentState {
    fn default() -> Self {
        AppointmentState::Init
    }
}

impl fmt::Display for AppointmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppointmentState::Init => "init",
            AppointmentState::Rescheduling => "rescheduling",
            AppointmentState::CollectingDate => "collecting_date",
            AppointmentState::CollectingTime => "collecting_time",
            AppointmentState::CollectingDuration => "collecting_duration",
            AppointmentState::CollectingName => "collecting_name",
            AppointmentState::CollectingPurpose => "collecting_purpose",
            AppointmentState::Confirming => "confirming",
            AppointmentState::Completed => "completed",
            AppointmentState::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for AppointmentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(AppointmentState::Init),
            "rescheduling" => Ok(AppointmentState::Rescheduling),
            "collecting_date" => Ok(AppointmentState::CollectingDate),
            "collecting_time" => Ok(AppointmentState::CollectingTime),
            "collecting_duration" => Ok(AppointmentState::CollectingDuration),
            "collecting_name" => Ok(AppointmentState::CollectingName),
            "collecting_purpose" => Ok(AppointmentState::CollectingPurpose),
            "confirming" => Ok(AppointmentState::Confirming),
            "completed" => Ok(AppointmentState::Completed),
            "cancelled" => Ok(AppointmentState::Cancelled),
            _ => Err(format!("Unknown appointment state: {}", s)),
        }
    }
}

/// Validate an appointment state transition.
///
/// Collection order is date, time, duration, name, purpose; a transition
/// may skip any prefix of that order whose fields arrived early, which is
/// why every collecting state has edges to all later ones. Cancellation
/// is allowed from every non-terminal state.
pub fn validate_appointment_transition(
    from: AppointmentState,
    to: AppointmentState,
) -> Result<(), FlowError> {
    use AppointmentState::*;

    let valid = matches!(
        (from, to),
        (Init, Rescheduling)
            | (Init, CollectingDate)
            | (Init, CollectingTime)
            | (Init, CollectingDuration)
            | (Init, CollectingName)
            | (Init, CollectingPurpose)
            | (Init, Confirming)
            | (Init, Cancelled)
            | (Rescheduling, CollectingDate)
            | (Rescheduling, CollectingTime)
            | (Rescheduling, Confirming)
            | (Rescheduling, Cancelled)
            | (CollectingDate, CollectingTime)
            | (CollectingDate, CollectingDuration)
            | (CollectingDate, CollectingName)
            | (CollectingDate, CollectingPurpose)
            | (CollectingDate, Confirming)
            | (CollectingDate, Cancelled)
            | (CollectingTime, CollectingDuration)
            | (CollectingTime, CollectingName)
            | (CollectingTime, CollectingPurpose)
            | (CollectingTime, Confirming)
            | (CollectingTime, Cancelled)
            | (CollectingDuration, CollectingName)
            | (CollectingDuration, CollectingPurpose)
            | (CollectingDuration, Confirming)
            | (CollectingDuration, Cancelled)
            | (CollectingName, CollectingPurpose)
            | (CollectingName, Confirming)
            | (CollectingName, Cancelled)
            | (CollectingPurpose, Confirming)
            | (CollectingPurpose, Cancelled)
            | (Confirming, Completed)
            | (Confirming, Cancelled)
    );

    if valid {
        Ok(())
    } else {
        Err(FlowError::InvalidTransition(from.to_string(), to.to_string()))
    }
}

// =============================================================================
// Message
// =============================================================================

/// States of the message-taking flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageState {
    Init,
    CollectingMessage,
    CollectingCallerInfo,
    CollectingUrgency,
    CollectingCallback,
    Confirming,
    Completed,
    Cancelled,
}

impl MessageState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MessageState::Completed | MessageState::Cancelled)
    }
}

impl Default for MessageState {
    fn default() -> Self {
        MessageState::Init
    }
}

impl fmt::Display for MessageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageState::Init => "init",
            MessageState::CollectingMessage => "collecting_message",
            MessageState::CollectingCallerInfo => "collecting_caller_info",
            MessageState::CollectingUrgency => "collecting_urgency",
            MessageState::CollectingCallback => "collecting_callback",
            MessageState::Confirming => "confirming",
            MessageState::Completed => "completed",
            MessageState::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for MessageState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(MessageState::Init),
            "collecting_message" => Ok(MessageState::CollectingMessage),
            "collecting_caller_info" => Ok(MessageState::CollectingCallerInfo),
            "collecting_urgency" => Ok(MessageState::CollectingUrgency),
            "collecting_callback" => Ok(MessageState::CollectingCallback),
            "confirming" => Ok(MessageState::Confirming),
            "completed" => Ok(MessageState::Completed),
            "cancelled" => Ok(MessageState::Cancelled),
            _ => Err(format!("Unknown message state: {}", s)),
        }
    }
}

/// Validate a message flow state transition.
///
/// Caller-info collection is optional: a message turn may jump straight
/// to urgency collection when the caller is already known.
pub fn validate_message_transition(from: MessageState, to: MessageState) -> Result<(), FlowError> {
    use MessageState::*;

    let valid = matches!(
        (from, to),
        (Init, CollectingMessage)
            | (Init, CollectingCallerInfo)
            | (Init, CollectingUrgency)
            | (CollectingMessage, CollectingCallerInfo)
            | (CollectingMessage, CollectingUrgency)
            | (CollectingCallerInfo, CollectingUrgency)
            | (CollectingUrgency, CollectingCallback)
            | (CollectingCallback, Confirming)
            | (Confirming, Completed)
            | (Confirming, Cancelled)
    );

    if valid {
        Ok(())
    } else {
        Err(FlowError::InvalidTransition(from.to_string(), to.to_string()))
    }
}

// =============================================================================
// Escalation
// =============================================================================

/// States of the human-escalation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationState {
    Init,
    CollectingReason,
    PreparingTransfer,
    Transferring,
    Completed,
    Failed,
}

impl EscalationState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, EscalationState::Completed | EscalationState::Failed)
    }
}

impl Default for EscalationState {
    fn default() -> Self {
        EscalationState::Init
    }
}

impl fmt::Display for EscalationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EscalationState::Init => "init",
            EscalationState::CollectingReason => "collecting_reason",
            EscalationState::PreparingTransfer => "preparing_transfer",
            EscalationState::Transferring => "transferring",
            EscalationState::Completed => "completed",
            EscalationState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for EscalationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(EscalationState::Init),
            "collecting_reason" => Ok(EscalationState::CollectingReason),
            "preparing_transfer" => Ok(EscalationState::PreparingTransfer),
            "transferring" => Ok(EscalationState::Transferring),
            "completed" => Ok(EscalationState::Completed),
            "failed" => Ok(EscalationState::Failed),
            _ => Err(format!("Unknown escalation state: {}", s)),
        }
    }
}

/// Validate an escalation state transition.
///
/// Reason collection is skipped when the first utterance already states
/// one; the transfer itself is single-attempt.
pub fn validate_escalation_transition(
    from: EscalationState,
    to: EscalationState,
) -> Result<(), FlowError> {
    use EscalationState::*;

    let valid = matches!(
        (from, to),
        (Init, CollectingReason)
            | (Init, PreparingTransfer)
            | (CollectingReason, PreparingTransfer)
            | (PreparingTransfer, Transferring)
            | (Transferring, Completed)
            | (Transferring, Failed)
    );

    if valid {
        Ok(())
    } else {
        Err(FlowError::InvalidTransition(from.to_string(), to.to_string()))
    }
}

// =============================================================================
// General
// =============================================================================

/// Informational states of the general router flow.
///
/// These never gate routing decisions; they only record where the
/// conversation is (fresh greeting, mid-conversation, or just resumed
/// after a child flow ended).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneralState {
    Greeting,
    Conversation,
    Resumed,
}

impl Default for GeneralState {
    fn default() -> Self {
        GeneralState::Greeting
    }
}

impl fmt::Display for GeneralState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GeneralState::Greeting => "greeting",
            GeneralState::Conversation => "conversation",
            GeneralState::Resumed => "resumed",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for GeneralState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greeting" => Ok(GeneralState::Greeting),
            "conversation" => Ok(GeneralState::Conversation),
            "resumed" => Ok(GeneralState::Resumed),
            _ => Err(format!("Unknown general state: {}", s)),
        }
    }
}
