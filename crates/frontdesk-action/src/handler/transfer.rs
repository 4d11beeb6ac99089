//! Call transfer action handler.
//!
//! Routes the caller to a destination extension, warm or cold.

use std::collections::HashMap;

use async_trait::async_trait;
use frontdesk_core::config::TransferConfig;

use crate::error::ActionError;
use crate::handler::ActionHandler;
use crate::types::{next_action_id, ActionOutcome, ActionType};

/// Handler for `transfer_call` directives.
///
/// Destinations resolve to extension numbers through the transfer table;
/// unknown destinations fall back to the general extension.
pub struct TransferCallHandler {
    extensions: TransferConfig,
}

impl TransferCallHandler {
    pub fn new(extensions: TransferConfig) -> Self {
        Self { extensions }
    }
}

#[async_trait]
impl ActionHandler for TransferCallHandler {
    fn action_type(&self) -> ActionType {
        ActionType::TransferCall
    }

    async fn execute(&self, params: &HashMap<String, String>) -> Result<ActionOutcome, ActionError> {
        let destination = params.get("destination").map(String::as_str).unwrap_or("");

        if destination.is_empty() {
            return Err(ActionError::MissingParameter("destination".to_string()));
        }

        let style = params.get("style").map(String::as_str).unwrap_or("warm");
        let reason = params.get("reason").map(String::as_str).unwrap_or("");
        let person = params.get("person").map(String::as_str).unwrap_or("");
        let attempt = params.get("attempt").map(String::as_str).unwrap_or("1");
        let extension = self.extensions.extension_for(destination);

        tracing::info!(
            destination = %destination,
            extension = %extension,
            style = %style,
            "Transferring call"
        );

        let mut outcome = ActionOutcome::ok(
            next_action_id("transfer"),
            format!("Transferring you to {} (ext. {})", destination, extension),
        );
        outcome
            .details
            .insert("destination".to_string(), destination.to_string());
        outcome
            .details
            .insert("extension".to_string(), extension.to_string());
        outcome.details.insert("style".to_string(), style.to_string());
        outcome
            .details
            .insert("attempt".to_string(), attempt.to_string());
        if !reason.is_empty() {
            outcome
                .details
                .insert("reason".to_string(), reason.to_string());
        }
        if !person.is_empty() {
            outcome
                .details
                .insert("person".to_string(), person.to_string());
        }

        Ok(outcome)
    }

    fn describe(&self, params: &HashMap<String, String>) -> String {
        let destination = params
            .get("destination")
            .map(String::as_str)
            .unwrap_or("<no destination>");
        format!("Transfer call to {}", destination)
    }
}
