//! Message flow: takes a message for the office.
//!
//! A first utterance of at least five words is treated as the message
//! body itself; shorter openers get an explicit prompt. Caller name and
//! number come from extracted entities, then from call metadata, and
//! are only asked for when both are still unknown. Urgency and callback
//! preference are each collected in one turn before confirmation.

use async_trait::async_trait;
use tracing::info;

use frontdesk_action::ActionDirective;
use frontdesk_core::Timestamp;
use frontdesk_nlu::{is_affirmative, is_negative, EntityKind};

use crate::context::{FlowContext, MessageData, Urgency};
use crate::error::FlowError;
use crate::flow::{Flow, FlowCommand, FlowId, FlowServices, StepOutcome, TurnMetadata};
use crate::states::{validate_message_transition, MessageState};

/// Shorter first utterances are requests to leave a message, not the
/// message itself.
const MIN_MESSAGE_WORDS: usize = 5;

const CRITICAL_WORDS: &[&str] = &["emergency", "critical", "immediately", "right away"];
const LOW_WORDS: &[&str] = &["no rush", "whenever", "not urgent", "no hurry"];
const HIGH_WORDS: &[&str] = &["urgent", "important", "asap", "as soon as"];
const CALLBACK_PHRASES: &[&str] = &["call me back", "call back", "callback"];

pub struct MessageFlow {
    services: FlowServices,
}

impl MessageFlow {
    pub fn new(services: FlowServices) -> Self {
        Self { services }
    }

    /// Low is checked before high so "not urgent" lands in the low bucket.
    fn parse_urgency(utterance: &str) -> Urgency {
        let lower = utterance.to_lowercase();
        if CRITICAL_WORDS.iter().any(|w| lower.contains(w)) {
            Urgency::Critical
        } else if LOW_WORDS.iter().any(|w| lower.contains(w)) {
            Urgency::Low
        } else if HIGH_WORDS.iter().any(|w| lower.contains(w)) {
            Urgency::High
        } else {
            Urgency::Normal
        }
    }

    fn wants_callback(utterance: &str) -> bool {
        let lower = utterance.to_lowercase();
        if CALLBACK_PHRASES.iter().any(|p| lower.contains(p)) {
            return true;
        }
        if is_affirmative(utterance) {
            return true;
        }
        false
    }

    /// Fill caller name and number from accumulated entities, then from
    /// call metadata. Never overwrites a value already collected.
    fn fill_caller_info(context: &mut FlowContext) {
        if context.message_data.caller_name.is_none() {
            context.message_data.caller_name = context
                .first_entity(EntityKind::Names)
                .map(str::to_string)
                .or_else(|| context.metadata.caller_name.clone());
        }
        if context.message_data.caller_number.is_none() {
            context.message_data.caller_number = context
                .first_entity(EntityKind::PhoneNumbers)
                .map(str::to_string)
                .or_else(|| context.metadata.caller_number.clone());
        }
    }

    fn set_state(&self, context: &mut FlowContext, to: MessageState) -> Result<(), FlowError> {
        validate_message_transition(context.message_data.state, to)?;
        context.message_data.state = to;
        Ok(())
    }

    /// The message body is captured; decide whether caller info still
    /// needs a turn of its own.
    fn after_message(&self, context: &mut FlowContext) -> Result<StepOutcome, FlowError> {
        Self::fill_caller_info(context);
        let data = &context.message_data;
        if data.caller_name.is_none() && data.caller_number.is_none() {
            self.set_state(context, MessageState::CollectingCallerInfo)?;
            Ok(StepOutcome::reply("Can I get your name and a callback number?"))
        } else {
            self.set_state(context, MessageState::CollectingUrgency)?;
            Ok(StepOutcome::reply("How urgent is this message?"))
        }
    }

    fn confirmation_prompt(data: &MessageData) -> String {
        let message = data.message.as_deref().unwrap_or("");
        let mut summary = format!("I have your message: \"{}\"", message);
        if let Some(name) = data.caller_name.as_deref() {
            summary.push_str(&format!(" from {}", name));
        }
        if data.urgency != Urgency::Normal {
            summary.push_str(&format!(", marked {}", data.urgency));
        }
        if data.callback == Some(true) {
            summary.push_str(", callback requested");
        }
        summary.push_str(". Shall I save it?");
        summary
    }

    async fn confirm(&self, context: &mut FlowContext) -> Result<StepOutcome, FlowError> {
        let data = &context.message_data;
        let mut directive = ActionDirective::new("take_message");
        directive.params.insert(
            "message".to_string(),
            data.message.clone().unwrap_or_default(),
        );
        if let Some(name) = data.caller_name.clone() {
            directive.params.insert("caller_name".to_string(), name);
        }
        if let Some(number) = data.caller_number.clone() {
            directive.params.insert("caller_number".to_string(), number);
        }
        directive
            .params
            .insert("urgency".to_string(), data.urgency.to_string());
        if let Some(callback) = data.callback {
            directive
                .params
                .insert("callback".to_string(), callback.to_string());
        }

        let outcome = self.services.executor.execute(&directive).await;
        info!(success = outcome.success, "Message confirmation executed");
        context.scratch.message_result = Some(outcome.clone());
        self.set_state(context, MessageState::Completed)?;
        Ok(StepOutcome::finish(outcome.message))
    }
}

#[async_trait]
impl Flow for MessageFlow {
    fn id(&self) -> FlowId {
        FlowId::Message
    }

    fn initialize(&mut self, _context: &mut FlowContext) {}

    async fn process(
        &mut self,
        utterance: &str,
        _metadata: &TurnMetadata,
        context: &mut FlowContext,
    ) -> Result<StepOutcome, FlowError> {
        if context.message_data.state.is_terminal() {
            context.message_data = MessageData::default();
        }

        let extracted = self.services.extractor.extract(utterance);
        context.merge_entities(extracted);

        match context.message_data.state {
            MessageState::Init => {
                if utterance.split_whitespace().count() >= MIN_MESSAGE_WORDS {
                    context.message_data.message = Some(utterance.trim().to_string());
                    self.after_message(context)
                } else {
                    self.set_state(context, MessageState::CollectingMessage)?;
                    Ok(StepOutcome::reply("What message would you like to leave?"))
                }
            }
            MessageState::CollectingMessage => {
                let trimmed = utterance.trim();
                if trimmed.is_empty() {
                    Ok(StepOutcome::reply("What message would you like to leave?"))
                } else {
                    context.message_data.message = Some(trimmed.to_string());
                    self.after_message(context)
                }
            }
            MessageState::CollectingCallerInfo => {
                // One turn only; take whatever the caller offered and move on
                Self::fill_caller_info(context);
                self.set_state(context, MessageState::CollectingUrgency)?;
                Ok(StepOutcome::reply("How urgent is this message?"))
            }
            MessageState::CollectingUrgency => {
                context.message_data.urgency = Self::parse_urgency(utterance);
                self.set_state(context, MessageState::CollectingCallback)?;
                Ok(StepOutcome::reply(
                    "Would you like a callback when someone is available?",
                ))
            }
            MessageState::CollectingCallback => {
                context.message_data.callback = Some(Self::wants_callback(utterance));
                self.set_state(context, MessageState::Confirming)?;
                Ok(StepOutcome::reply(Self::confirmation_prompt(
                    &context.message_data,
                )))
            }
            MessageState::Confirming => {
                if is_affirmative(utterance) {
                    self.confirm(context).await
                } else if is_negative(utterance) {
                    self.set_state(context, MessageState::Cancelled)?;
                    Ok(StepOutcome::finish(
                        "Okay, I won't take a message. Is there something else I can help with?",
                    ))
                } else {
                    Ok(StepOutcome::reply(Self::confirmation_prompt(
                        &context.message_data,
                    )))
                }
            }
            // Terminal states were reset above
            MessageState::Completed | MessageState::Cancelled => Err(FlowError::Process(format!(
                "message flow stepped in terminal state {}",
                context.message_data.state
            ))),
        }
    }

    fn cleanup(&mut self, context: &mut FlowContext) {
        context.message_data.last_updated = Some(Timestamp::now());
    }

    fn resume(&mut self, context: &mut FlowContext) -> FlowCommand {
        if context.message_data.state.is_terminal() {
            FlowCommand::End
        } else {
            FlowCommand::None
        }
    }
}
