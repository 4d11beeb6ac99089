//! Appointment flow: books or reschedules an appointment slot.
//!
//! Collection order is date, time, duration, name, purpose. A single
//! utterance can fill any number of those at once, so each turn ingests
//! whatever the extractor found and then advances to the first state
//! whose field is still missing. Duration never blocks; it parses from
//! phrases like "45 minutes" or "half an hour" and otherwise stays at
//! the 30-minute default.

use async_trait::async_trait;
use regex::Regex;
use tracing::info;

use frontdesk_action::ActionDirective;
use frontdesk_core::Timestamp;
use frontdesk_nlu::{is_affirmative, is_negative, EntityKind};

use crate::context::{AppointmentData, FlowContext};
use crate::error::FlowError;
use crate::flow::{Flow, FlowCommand, FlowId, FlowServices, StepOutcome, TurnMetadata};
use crate::states::{validate_appointment_transition, AppointmentState};

const CANCEL_PHRASES: &[&str] = &["never mind", "nevermind", "forget it"];
const RESCHEDULE_PHRASES: &[&str] = &["change my appointment", "move my appointment"];

pub struct AppointmentFlow {
    services: FlowServices,
    duration_regex: Regex,
    purpose_regex: Regex,
}

impl AppointmentFlow {
    pub fn new(services: FlowServices) -> Self {
        Self {
            services,
            duration_regex: Regex::new(r"\b(\d+)\s*(minutes?|mins?|hours?|hrs?)\b").unwrap(),
            purpose_regex: Regex::new(r"(?i)\b(?:reason|purpose|regarding)(?:\s+is)?[\s:]+(.+)$")
                .unwrap(),
        }
    }

    /// Narrower than the shared denial heuristic: only an outright
    /// cancellation should abort mid-collection, while "no" or "don't"
    /// can legitimately appear inside a booking request.
    fn is_cancellation(utterance: &str) -> bool {
        let lower = utterance.to_lowercase();
        lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|w| w == "cancel")
            || CANCEL_PHRASES.iter().any(|p| lower.contains(p))
    }

    fn is_reschedule(utterance: &str) -> bool {
        let lower = utterance.to_lowercase();
        lower.contains("reschedule") || RESCHEDULE_PHRASES.iter().any(|p| lower.contains(p))
    }

    fn parse_duration(&self, utterance: &str) -> Option<u32> {
        let lower = utterance.to_lowercase();
        if lower.contains("half an hour") || lower.contains("half hour") {
            return Some(30);
        }
        if lower.contains("quarter") && lower.contains("hour") {
            return Some(15);
        }
        if let Some(caps) = self.duration_regex.captures(&lower) {
            let n: u32 = caps[1].parse().ok()?;
            let minutes = if caps[2].starts_with('h') {
                n.saturating_mul(60)
            } else {
                n
            };
            return Some(minutes);
        }
        if lower.contains("an hour") {
            return Some(60);
        }
        None
    }

    fn extract_purpose(&self, utterance: &str) -> Option<String> {
        let caps = self.purpose_regex.captures(utterance)?;
        let purpose = caps[1]
            .trim()
            .trim_end_matches(['.', ',', '!', '?'])
            .to_string();
        if purpose.is_empty() {
            None
        } else {
            Some(purpose)
        }
    }

    /// Fill appointment fields from whatever the current utterance holds.
    fn ingest(&self, utterance: &str, context: &mut FlowContext) {
        let extracted = self.services.extractor.extract(utterance);
        context.merge_entities(extracted.clone());

        let data = &mut context.appointment;
        if data.date.is_none() {
            if let Some(date) = extracted.get(&EntityKind::Dates).and_then(|v| v.first()) {
                data.date = Some(date.clone());
            }
        }
        if data.time.is_none() {
            if let Some(time) = extracted.get(&EntityKind::Times).and_then(|v| v.first()) {
                data.time = Some(time.clone());
            }
        }
        if let Some(minutes) = self.parse_duration(utterance) {
            data.duration_minutes = minutes;
        }
        if data.name.is_none() {
            if let Some(name) = extracted.get(&EntityKind::Names).and_then(|v| v.first()) {
                data.name = Some(name.clone());
            }
        }
        if data.purpose.is_none() {
            if let Some(purpose) = self.extract_purpose(utterance) {
                data.purpose = Some(purpose);
            } else if data.state == AppointmentState::CollectingPurpose {
                // The flow asked for the purpose, so the answer is the
                // whole utterance
                let fallback = utterance.trim();
                if !fallback.is_empty() {
                    data.purpose = Some(fallback.to_string());
                }
            }
        }
    }

    /// First state in collection order whose field is still missing.
    /// Rescheduling only re-collects date and time.
    fn advance_target(data: &AppointmentData) -> AppointmentState {
        if data.date.is_none() {
            AppointmentState::CollectingDate
        } else if data.time.is_none() {
            AppointmentState::CollectingTime
        } else if !data.rescheduling && data.name.is_none() {
            AppointmentState::CollectingName
        } else if !data.rescheduling && data.purpose.is_none() {
            AppointmentState::CollectingPurpose
        } else {
            AppointmentState::Confirming
        }
    }

    fn set_state(
        &self,
        context: &mut FlowContext,
        to: AppointmentState,
    ) -> Result<(), FlowError> {
        validate_appointment_transition(context.appointment.state, to)?;
        context.appointment.state = to;
        Ok(())
    }

    fn advance(&self, context: &mut FlowContext) -> Result<StepOutcome, FlowError> {
        let target = Self::advance_target(&context.appointment);
        if context.appointment.state != target {
            self.set_state(context, target)?;
        }
        let response = match target {
            AppointmentState::CollectingDate => "What date would you like to come in?".to_string(),
            AppointmentState::CollectingTime => "What time works best for you?".to_string(),
            AppointmentState::CollectingName => "Can I get your name?".to_string(),
            AppointmentState::CollectingPurpose => "What is the appointment regarding?".to_string(),
            _ => self.confirmation_prompt(&context.appointment),
        };
        Ok(StepOutcome::reply(response))
    }

    fn confirmation_prompt(&self, data: &AppointmentData) -> String {
        let date = data.date.as_deref().unwrap_or("the requested date");
        let time = data.time.as_deref().unwrap_or("the requested time");
        let mut summary = format!("{} at {} for {} minutes", date, time, data.duration_minutes);
        if let Some(name) = data.name.as_deref() {
            summary.push_str(&format!(" for {}", name));
        }
        if let Some(purpose) = data.purpose.as_deref() {
            summary.push_str(&format!(" regarding {}", purpose));
        }
        if data.rescheduling {
            format!("I'll move your appointment to {}. Shall I confirm?", summary)
        } else {
            format!("I have you down for {}. Shall I book it?", summary)
        }
    }

    async fn confirm(&self, context: &mut FlowContext) -> Result<StepOutcome, FlowError> {
        let data = &context.appointment;
        let mut directive = ActionDirective::new("schedule_appointment");
        directive
            .params
            .insert("date".to_string(), data.date.clone().unwrap_or_default());
        directive
            .params
            .insert("time".to_string(), data.time.clone().unwrap_or_default());
        directive
            .params
            .insert("duration".to_string(), data.duration_minutes.to_string());
        if let Some(name) = data.name.clone() {
            directive.params.insert("name".to_string(), name);
        }
        if let Some(purpose) = data.purpose.clone() {
            directive.params.insert("purpose".to_string(), purpose);
        }

        let outcome = self.services.executor.execute(&directive).await;
        info!(success = outcome.success, "Appointment confirmation executed");
        context.scratch.appointment_result = Some(outcome.clone());
        self.set_state(context, AppointmentState::Completed)?;
        Ok(StepOutcome::finish(outcome.message))
    }
}

#[async_trait]
impl Flow for AppointmentFlow {
    fn id(&self) -> FlowId {
        FlowId::Appointment
    }

    fn initialize(&mut self, _context: &mut FlowContext) {}

    async fn process(
        &mut self,
        utterance: &str,
        _metadata: &TurnMetadata,
        context: &mut FlowContext,
    ) -> Result<StepOutcome, FlowError> {
        if context.appointment.state.is_terminal() {
            context.appointment = AppointmentData::default();
        }
        let state = context.appointment.state;

        if state != AppointmentState::Confirming && Self::is_cancellation(utterance) {
            self.set_state(context, AppointmentState::Cancelled)?;
            return Ok(StepOutcome::finish(
                "Okay, I won't book anything. Is there something else I can help with?",
            ));
        }

        match state {
            AppointmentState::Init
            | AppointmentState::Rescheduling
            | AppointmentState::CollectingDate
            | AppointmentState::CollectingTime
            | AppointmentState::CollectingDuration
            | AppointmentState::CollectingName
            | AppointmentState::CollectingPurpose => {
                if state == AppointmentState::Init && Self::is_reschedule(utterance) {
                    self.set_state(context, AppointmentState::Rescheduling)?;
                    context.appointment.rescheduling = true;
                }
                self.ingest(utterance, context);
                self.advance(context)
            }
            AppointmentState::Confirming => {
                if is_affirmative(utterance) {
                    self.confirm(context).await
                } else if is_negative(utterance) {
                    self.set_state(context, AppointmentState::Cancelled)?;
                    Ok(StepOutcome::finish(
                        "Okay, I won't book it. Is there something else I can help with?",
                    ))
                } else {
                    Ok(StepOutcome::reply(
                        self.confirmation_prompt(&context.appointment),
                    ))
                }
            }
            // Terminal states were reset above
            AppointmentState::Completed | AppointmentState::Cancelled => {
                Err(FlowError::Process(format!(
                    "appointment flow stepped in terminal state {}",
                    state
                )))
            }
        }
    }

    fn cleanup(&mut self, context: &mut FlowContext) {
        context.appointment.last_updated = Some(Timestamp::now());
    }

    fn resume(&mut self, context: &mut FlowContext) -> FlowCommand {
        if context.appointment.state.is_terminal() {
            FlowCommand::End
        } else {
            FlowCommand::None
        }
    }
}
