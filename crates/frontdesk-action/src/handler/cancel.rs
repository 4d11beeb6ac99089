//! Appointment cancellation action handler.
//!
//! Cancels a previously scheduled appointment by its id.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ActionError;
use crate::handler::ActionHandler;
use crate::types::{next_action_id, ActionOutcome, ActionType};

/// Handler for `cancel_appointment` directives.
pub struct CancelAppointmentHandler;

#[async_trait]
impl ActionHandler for CancelAppointmentHandler {
    fn action_type(&self) -> ActionType {
        ActionType::CancelAppointment
    }

    async fn execute(&self, params: &HashMap<String, String>) -> Result<ActionOutcome, ActionError> {
        let appointment_id = params
            .get("appointment_id")
            .map(String::as_str)
            .unwrap_or("");

        if appointment_id.is_empty() {
            return Err(ActionError::MissingParameter("appointment_id".to_string()));
        }

        tracing::info!(appointment_id = %appointment_id, "Appointment cancelled");

        let mut outcome = ActionOutcome::ok(
            next_action_id("cancel"),
            format!("Appointment {} cancelled", appointment_id),
        );
        outcome
            .details
            .insert("appointment_id".to_string(), appointment_id.to_string());

        Ok(outcome)
    }

    fn describe(&self, params: &HashMap<String, String>) -> String {
        let appointment_id = params
            .get("appointment_id")
            .map(String::as_str)
            .unwrap_or("<no id>");
        format!("Cancel appointment {}", appointment_id)
    }
}
