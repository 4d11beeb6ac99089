//! Conversation flows for Frontdesk.
//!
//! Five flows cover one call: a general router plus appointment,
//! message, information, and escalation specialists. The [`FlowManager`]
//! owns the per-call [`FlowContext`] and a suspension stack, dispatches
//! each utterance to the active flow, and applies the [`FlowCommand`]
//! the flow hands back.

pub mod appointment;
pub mod context;
pub mod error;
pub mod escalation;
pub mod flow;
pub mod general;
pub mod information;
pub mod manager;
pub mod message;
pub mod states;

pub use context::{
    AppointmentData, EscalationData, FlowContext, GeneralData, InfoData, MessageData, TurnScratch,
    Urgency,
};
pub use error::FlowError;
pub use flow::{
    Flow, FlowCommand, FlowConstructor, FlowId, FlowRegistry, FlowServices, StepOutcome,
    TurnMetadata,
};
pub use manager::{FlowManager, TurnResult};
pub use states::{
    validate_appointment_transition, validate_escalation_transition, validate_message_transition,
    AppointmentState, EscalationState, GeneralState, MessageState,
};
