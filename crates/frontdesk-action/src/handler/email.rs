//! Email action handler.
//!
//! Queues an outbound email on the caller's behalf. Validation is
//! presence-only; address syntax is the upstream extractor's concern.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ActionError;
use crate::handler::ActionHandler;
use crate::types::{next_action_id, ActionOutcome, ActionType};

/// Handler for `send_email` directives.
pub struct SendEmailHandler;

#[async_trait]
impl ActionHandler for SendEmailHandler {
    fn action_type(&self) -> ActionType {
        ActionType::SendEmail
    }

    async fn execute(&self, params: &HashMap<String, String>) -> Result<ActionOutcome, ActionError> {
        let to = params.get("to").map(String::as_str).unwrap_or("");
        let body = params.get("body").map(String::as_str).unwrap_or("");

        if to.is_empty() {
            return Err(ActionError::MissingParameter("to".to_string()));
        }
        if body.is_empty() {
            return Err(ActionError::MissingParameter("body".to_string()));
        }

        let subject = params
            .get("subject")
            .map(String::as_str)
            .unwrap_or("Message from the front desk");

        tracing::info!(to = %to, subject = %subject, "Email queued");

        let mut outcome =
            ActionOutcome::ok(next_action_id("email"), format!("Email sent to {}", to));
        outcome.details.insert("to".to_string(), to.to_string());
        outcome
            .details
            .insert("subject".to_string(), subject.to_string());

        Ok(outcome)
    }

    fn describe(&self, params: &HashMap<String, String>) -> String {
        let to = params.get("to").map(String::as_str).unwrap_or("<no recipient>");
        format!("Send email to {}", to)
    }
}
