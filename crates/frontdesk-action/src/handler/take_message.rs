//! Message-taking action handler.
//!
//! Records a message for a staff member along with caller details,
//! urgency, and callback preference.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ActionError;
use crate::handler::ActionHandler;
use crate::types::{next_action_id, ActionOutcome, ActionType};

/// Handler for `take_message` directives.
pub struct TakeMessageHandler;

#[async_trait]
impl ActionHandler for TakeMessageHandler {
    fn action_type(&self) -> ActionType {
        ActionType::TakeMessage
    }

    async fn execute(&self, params: &HashMap<String, String>) -> Result<ActionOutcome, ActionError> {
        let message = params.get("message").map(String::as_str).unwrap_or("");

        if message.is_empty() {
            return Err(ActionError::MissingParameter("message".to_string()));
        }

        let caller_name = params.get("caller_name").map(String::as_str).unwrap_or("");
        let caller_number = params
            .get("caller_number")
            .map(String::as_str)
            .unwrap_or("");
        let urgency = params.get("urgency").map(String::as_str).unwrap_or("normal");
        let callback = params.get("callback").map(String::as_str).unwrap_or("false");

        tracing::info!(urgency = %urgency, callback = %callback, "Message taken");

        let mut outcome = ActionOutcome::ok(next_action_id("msg"), "Message taken".to_string());
        outcome
            .details
            .insert("message".to_string(), message.to_string());
        outcome
            .details
            .insert("urgency".to_string(), urgency.to_string());
        outcome
            .details
            .insert("callback".to_string(), callback.to_string());
        if !caller_name.is_empty() {
            outcome
                .details
                .insert("caller_name".to_string(), caller_name.to_string());
        }
        if !caller_number.is_empty() {
            outcome
                .details
                .insert("caller_number".to_string(), caller_number.to_string());
        }

        Ok(outcome)
    }

    fn describe(&self, params: &HashMap<String, String>) -> String {
        let message = params
            .get("message")
            .map(String::as_str)
            .unwrap_or("<no message>");
        format!("Take message: {}", message)
    }
}
