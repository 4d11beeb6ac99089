//! Contact-saving action handler.
//!
//! Stores a caller's name and phone number for later follow-up.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ActionError;
use crate::handler::ActionHandler;
use crate::types::{next_action_id, ActionOutcome, ActionType};

/// Handler for `save_contact` directives.
pub struct SaveContactHandler;

#[async_trait]
impl ActionHandler for SaveContactHandler {
    fn action_type(&self) -> ActionType {
        ActionType::SaveContact
    }

    async fn execute(&self, params: &HashMap<String, String>) -> Result<ActionOutcome, ActionError> {
        let name = params.get("name").map(String::as_str).unwrap_or("");
        let phone = params.get("phone").map(String::as_str).unwrap_or("");

        if name.is_empty() {
            return Err(ActionError::MissingParameter("name".to_string()));
        }
        if phone.is_empty() {
            return Err(ActionError::MissingParameter("phone".to_string()));
        }

        let email = params.get("email").map(String::as_str).unwrap_or("");

        tracing::info!(name = %name, "Contact saved");

        let mut outcome = ActionOutcome::ok(
            next_action_id("contact"),
            format!("Contact {} saved", name),
        );
        outcome.details.insert("name".to_string(), name.to_string());
        outcome
            .details
            .insert("phone".to_string(), phone.to_string());
        if !email.is_empty() {
            outcome
                .details
                .insert("email".to_string(), email.to_string());
        }

        Ok(outcome)
    }

    fn describe(&self, params: &HashMap<String, String>) -> String {
        let name = params.get("name").map(String::as_str).unwrap_or("<no name>");
        format!("Save contact {}", name)
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
    async fn test_contact_valid_params() {
        let handler = SaveContactHandler;
        let outcome = handler
            .execute(&params(&[
                ("name", "Jane Doe"),
                ("phone", "555-123-4567"),
                ("email", "jane@example.com"),
            ]))
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message, "Contact Jane Doe saved");
        assert!(outcome.action_id.unwrap().starts_with("contact_"));
        assert_eq!(outcome.details["email"], "jane@example.com");
    }

    #[tokio::test]
    async fn test_contact_missing_name() {
        let handler = SaveContactHandler;
        let err = handler
            .execute(&params(&[("phone", "555-0100")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::MissingParameter(ref p) if p == "name"));
    }

    #[tokio::test]
    async fn test_contact_missing_phone() {
        let handler = SaveContactHandler;
        let err = handler
            .execute(&params(&[("name", "Jane")]))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::MissingParameter(ref p) if p == "phone"));
    }

    #[test]
    fn test_contact_action_type() {
        assert_eq!(SaveContactHandler.action_type(), ActionType::SaveContact);
    }

    #[test]
    fn test_contact_describe() {
        let desc = SaveContactHandler.describe(&params(&[("name", "Jane")]));
        assert_eq!(desc, "Save contact Jane");
    }
}
