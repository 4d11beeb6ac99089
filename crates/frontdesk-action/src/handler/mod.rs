//! Action handler registry and trait definition.
//!
//! Defines the `ActionHandler` async trait and provides the handler
//! registry for dispatching directives to the correct implementation.

pub mod cancel;
pub mod contact;
pub mod email;
pub mod lookup;
pub mod reminder;
pub mod schedule;
pub mod sms;
pub mod take_message;
pub mod transfer;

use std::collections::HashMap;

use async_trait::async_trait;
use frontdesk_core::FrontdeskConfig;

use crate::error::ActionError;
use crate::types::{ActionOutcome, ActionType};

/// Async handler for one action type.
///
/// Handlers validate their own parameters and return `ActionError` for
/// anything they cannot execute. Translating those errors into failed
/// outcomes is the executor's job, not theirs.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// The action type this handler serves.
    fn action_type(&self) -> ActionType;

    /// Execute the action with the given parameters.
    async fn execute(&self, params: &HashMap<String, String>) -> Result<ActionOutcome, ActionError>;

    /// Human-readable one-line description of what executing would do.
    fn describe(&self, params: &HashMap<String, String>) -> String;
}

/// Registry mapping action types to their handlers.
pub struct ActionRegistry {
    handlers: HashMap<ActionType, Box<dyn ActionHandler>>,
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under its own action type, replacing any
    /// previous handler for that type.
    pub fn register(&mut self, handler: Box<dyn ActionHandler>) {
        self.handlers.insert(handler.action_type(), handler);
    }

    /// Register the built-in handlers for all nine action types.
    ///
    /// The lookup and transfer handlers read their answers and extension
    /// numbers from the given config.
    pub fn register_defaults(&mut self, config: &FrontdeskConfig) {
        self.register(Box::new(schedule::ScheduleAppointmentHandler));
        self.register(Box::new(cancel::CancelAppointmentHandler));
        self.register(Box::new(take_message::TakeMessageHandler));
        self.register(Box::new(transfer::TransferCallHandler::new(
            config.transfer.clone(),
        )));
        self.register(Box::new(lookup::LookupInfoHandler::new(
            config.knowledge.clone(),
        )));
        self.register(Box::new(contact::SaveContactHandler));
        self.register(Box::new(reminder::SetReminderHandler));
        self.register(Box::new(email::SendEmailHandler));
        self.register(Box::new(sms::SendSmsHandler));
    }

    /// Look up the handler for an action type.
    pub fn get(&self, action_type: ActionType) -> Option<&dyn ActionHandler> {
        self.handlers.get(&action_type).map(|h| h.as_ref())
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry has no handlers.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
