//! Appointment scheduling action handler.
//!
//! Books an appointment slot from collected date, time, and caller details.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ActionError;
use crate::handler::ActionHandler;
use crate::types::{next_action_id, ActionOutcome, ActionType};

/// Handler for `schedule_appointment` directives.
pub struct ScheduleAppointmentHandler;

#[async_trait]
impl ActionHandler for ScheduleAppointmentHandler {
    fn action_type(&self) -> ActionType {
        ActionType::ScheduleAppointment
    }

    async fn execute(&self, params: &HashMap<String, String>) -> Result<ActionOutcome, ActionError> {
        let date = params.get("date").map(String::as_str).unwrap_or("");
        let time = params.get("time").map(String::as_str).unwrap_or("");

        if date.is_empty() {
            return Err(ActionError::MissingParameter("date".to_string()));
        }
        if time.is_empty() {
            return Err(ActionError::MissingParameter("time".to_string()));
        }

        let duration = params.get("duration").map(String::as_str).unwrap_or("30");
        let name = params.get("name").map(String::as_str).unwrap_or("");
        let purpose = params.get("purpose").map(String::as_str).unwrap_or("");

        tracing::info!(date = %date, time = %time, duration = %duration, "Appointment scheduled");

        let mut outcome = ActionOutcome::ok(
            next_action_id("apt"),
            format!("Appointment scheduled for {} at {}", date, time),
        );
        outcome.details.insert("date".to_string(), date.to_string());
        outcome.details.insert("time".to_string(), time.to_string());
        outcome
            .details
            .insert("duration".to_string(), duration.to_string());
        if !name.is_empty() {
            outcome.details.insert("name".to_string(), name.to_string());
        }
        if !purpose.is_empty() {
            outcome
                .details
                .insert("purpose".to_string(), purpose.to_string());
        }

        Ok(outcome)
    }

    fn describe(&self, params: &HashMap<String, String>) -> String {
        let date = params.get("date").map(String::as_str).unwrap_or("<no date>");
        let time = params.get("time").map(String::as_str).unwrap_or("<no time>");
        format!("Schedule appointment on {} at {}", date, time)
    }
}
