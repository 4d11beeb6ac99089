//! SMS action handler.
//!
//! Queues an outbound text message on the caller's behalf.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ActionError;
use crate::handler::ActionHandler;
use crate::types::{next_action_id, ActionOutcome, ActionType};

/// Handler for `send_sms` directives.
pub struct SendSmsHandler;

#[async_trait]
impl ActionHandler for SendSmsHandler {
    fn action_type(&self) -> ActionType {
        ActionType::SendSms
    }

    async fn execute(&self, params: &HashMap<String, String>) -> Result<ActionOutcome, ActionError> {
        let to = params.get("to").map(String::as_str).unwrap_or("");
        let message = params.get("message").map(String::as_str).unwrap_or("");

        if to.is_empty() {
            return Err(ActionError::MissingParameter("to".to_string()));
        }
        if message.is_empty() {
            return Err(ActionError::MissingParameter("message".to_string()));
        }

        tracing::info!(to = %to, "SMS queued");

        let mut outcome =
            ActionOutcome::ok(next_action_id("sms"), format!("Text sent to {}", to));
        outcome.details.insert("to".to_string(), to.to_string());
        outcome
            .details
            .insert("message".to_string(), message.to_string());

        Ok(outcome)
    }

    fn describe(&self, params: &HashMap<String, String>) -> String {
        let to = params.get("to").map(String::as_str).unwrap_or("<no recipient>");
        format!("Send text to {}", to)
    }
}
