//! Reminder action handler.
//!
//! Records a reminder with an optional date and time.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ActionError;
use crate::handler::ActionHandler;
use crate::types::{next_action_id, ActionOutcome, ActionType};

/// Handler for `set_reminder` directives.
pub struct SetReminderHandler;

#[async_trait]
impl ActionHandler for SetReminderHandler {
    fn action_type(&self) -> ActionType {
        ActionType::SetReminder
    }

    async fn execute(&self, params: &HashMap<String, String>) -> Result<ActionOutcome, ActionError> {
        let message = params.get("message").map(String::as_str).unwrap_or("");

        if message.is_empty() {
            return Err(ActionError::MissingParameter("message".to_string()));
        }

        let date = params.get("date").map(String::as_str).unwrap_or("");
        let time = params.get("time").map(String::as_str).unwrap_or("");

        tracing::info!(message = %message, "Reminder set");

        let mut outcome = ActionOutcome::ok(
            next_action_id("rem"),
            format!("Reminder set: {}", message),
        );
        outcome
            .details
            .insert("message".to_string(), message.to_string());
        if !date.is_empty() {
            outcome.details.insert("date".to_string(), date.to_string());
        }
        if !time.is_empty() {
            outcome.details.insert("time".to_string(), time.to_string());
        }

        Ok(outcome)
    }

    fn describe(&self, params: &HashMap<String, String>) -> String {
        let message = params
            .get("message")
            .map(String::as_str)
            .unwrap_or("<no message>");
        format!("Set reminder: {}", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_reminder_valid_params() {
        let handler = SetReminderHandler;
        let outcome = handler
            .execute(&params(&[
                ("message", "call Bob"),
                ("date", "tomorrow"),
                ("time", "3 pm"),
            ]))
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message, "Reminder set: call Bob");
        assert!(outcome.action_id.unwrap().starts_with("rem_"));
        assert_eq!(outcome.details["date"], "tomorrow");
    }

    #[tokio::test]
    async fn test_reminder_message_only() {
        let handler = SetReminderHandler;
        let outcome = handler
            .execute(&params(&[("message", "water the plants")]))
            .await
            .unwrap();
        assert!(outcome.success);
        assert!(!outcome.details.contains_key("date"));
        assert!(!outcome.details.contains_key("time"));
    }

    #[tokio::test]
    async fn test_reminder_missing_message() {
        let handler = SetReminderHandler;
        let err = handler.execute(&HashMap::new()).await.unwrap_err();
        assert!(matches!(err, ActionError::MissingParameter(ref p) if p == "message"));
    }

    #[test]
    fn test_reminder_action_type() {
        assert_eq!(SetReminderHandler.action_type(), ActionType::SetReminder);
    }

    #[test]
    fn test_reminder_describe() {
        let desc = SetReminderHandler.describe(&params(&[("message", "hello")]));
        assert_eq!(desc, "Set reminder: hello");
    }
}
