//! Escalation flow: hands the caller to a human.
//!
//! A single transfer attempt, no automatic retry. Destination and a
//! possible named person are classified from the first utterance; a
//! short opener gets one reason-collection turn, anything longer is
//! taken as the reason itself and the transfer runs in the same turn,
//! passing through the preparing and transferring states.

use async_trait::async_trait;
use regex::Regex;
use tracing::info;

use frontdesk_action::ActionDirective;
use frontdesk_core::Timestamp;

use crate::context::{EscalationData, FlowContext};
use crate::error::FlowError;
use crate::flow::{Flow, FlowCommand, FlowId, FlowServices, StepOutcome, TurnMetadata};
use crate::states::{validate_escalation_transition, EscalationState};

/// Openers shorter than this lack a usable reason.
const MIN_REASON_WORDS: usize = 5;

const BILLING_WORDS: &[&str] = &["billing", "bill", "invoice", "payment"];
const SALES_WORDS: &[&str] = &["sales", "buy", "purchase"];
const SUPPORT_WORDS: &[&str] = &["support", "technical", "problem", "issue"];
const COLD_PHRASES: &[&str] = &["immediately", "just transfer", "right now"];

pub struct EscalationFlow {
    services: FlowServices,
    person_regex: Regex,
}

impl EscalationFlow {
    pub fn new(services: FlowServices) -> Self {
        Self {
            services,
            person_regex: Regex::new(
                r"\b[Ss]peak\s+(?:to|with)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)",
            )
            .unwrap(),
        }
    }

    /// Emergency outranks every other destination, including a named
    /// person in the same utterance.
    fn classify_destination(&self, utterance: &str) -> (String, Option<String>) {
        let lower = utterance.to_lowercase();
        if lower.contains("emergency") {
            return ("emergency".to_string(), None);
        }
        if BILLING_WORDS.iter().any(|w| lower.contains(w)) {
            return ("billing".to_string(), None);
        }
        if SALES_WORDS.iter().any(|w| lower.contains(w)) {
            return ("sales".to_string(), None);
        }
        if SUPPORT_WORDS.iter().any(|w| lower.contains(w)) {
            return ("support".to_string(), None);
        }
        if let Some(caps) = self.person_regex.captures(utterance) {
            return ("person".to_string(), Some(caps[1].to_string()));
        }
        ("general".to_string(), None)
    }

    fn set_state(&self, context: &mut FlowContext, to: EscalationState) -> Result<(), FlowError> {
        validate_escalation_transition(context.escalation.state, to)?;
        context.escalation.state = to;
        Ok(())
    }

    /// Run the rest of the pipeline in one turn: classify the transfer
    /// style, execute the transfer, and land in a terminal state.
    async fn transfer(
        &self,
        utterance: &str,
        context: &mut FlowContext,
    ) -> Result<StepOutcome, FlowError> {
        self.set_state(context, EscalationState::PreparingTransfer)?;
        let lower = utterance.to_lowercase();
        let style = if COLD_PHRASES.iter().any(|p| lower.contains(p)) {
            "cold"
        } else {
            "warm"
        };
        context.escalation.style = Some(style.to_string());

        self.set_state(context, EscalationState::Transferring)?;
        context.escalation.attempts += 1;

        let data = &context.escalation;
        let mut directive = ActionDirective::new("transfer_call");
        directive.params.insert(
            "destination".to_string(),
            data.destination.clone().unwrap_or_default(),
        );
        directive
            .params
            .insert("style".to_string(), style.to_string());
        if let Some(reason) = data.reason.clone() {
            directive.params.insert("reason".to_string(), reason);
        }
        directive
            .params
            .insert("attempt".to_string(), data.attempts.to_string());
        if let Some(person) = data.person.clone() {
            directive.params.insert("person".to_string(), person);
        }

        let outcome = self.services.executor.execute(&directive).await;
        info!(
            destination = %context.escalation.destination.as_deref().unwrap_or(""),
            success = outcome.success,
            "Transfer attempted"
        );
        context.scratch.transfer_result = Some(outcome.clone());

        if outcome.success {
            self.set_state(context, EscalationState::Completed)?;
            Ok(StepOutcome::finish(outcome.message))
        } else {
            self.set_state(context, EscalationState::Failed)?;
            Ok(StepOutcome::finish(
                "I wasn't able to transfer your call. Can I take a message instead?",
            ))
        }
    }
}

#[async_trait]
impl Flow for EscalationFlow {
    fn id(&self) -> FlowId {
        FlowId::Escalation
    }

    fn initialize(&mut self, _context: &mut FlowContext) {}

    async fn process(
        &mut self,
        utterance: &str,
        _metadata: &TurnMetadata,
        context: &mut FlowContext,
    ) -> Result<StepOutcome, FlowError> {
        if context.escalation.state.is_terminal() {
            context.escalation = EscalationData::default();
        }

        let extracted = self.services.extractor.extract(utterance);
        context.merge_entities(extracted);

        match context.escalation.state {
            EscalationState::Init => {
                let (destination, person) = self.classify_destination(utterance);
                context.escalation.destination = Some(destination);
                context.escalation.person = person;

                if utterance.split_whitespace().count() < MIN_REASON_WORDS {
                    self.set_state(context, EscalationState::CollectingReason)?;
                    Ok(StepOutcome::reply(
                        "Can you tell me briefly what this is regarding?",
                    ))
                } else {
                    context.escalation.reason = Some(utterance.trim().to_string());
                    self.transfer(utterance, context).await
                }
            }
            EscalationState::CollectingReason => {
                context.escalation.reason = Some(utterance.trim().to_string());
                self.transfer(utterance, context).await
            }
            // The transfer pipeline never rests in these states
            EscalationState::PreparingTransfer | EscalationState::Transferring => {
                Err(FlowError::Process(format!(
                    "escalation flow stepped in transient state {}",
                    context.escalation.state
                )))
            }
            // Terminal states were reset above
            EscalationState::Completed | EscalationState::Failed => {
                Err(FlowError::Process(format!(
                    "escalation flow stepped in terminal state {}",
                    context.escalation.state
                )))
            }
        }
    }

    fn cleanup(&mut self, context: &mut FlowContext) {
        context.escalation.last_updated = Some(Timestamp::now());
    }

    fn resume(&mut self, context: &mut FlowContext) -> FlowCommand {
        if context.escalation.state.is_terminal() {
            FlowCommand::End
        } else {
            FlowCommand::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_action::{ActionExecutor, ActionRegistry};
    use frontdesk_core::FrontdeskConfig;
    use std::sync::Arc;

    fn flow() -> EscalationFlow {
        EscalationFlow::new(FlowServices::new(Arc::new(FrontdeskConfig::default())))
    }

    async fn step(
        flow: &mut EscalationFlow,
        utterance: &str,
        ctx: &mut FlowContext,
    ) -> StepOutcome {
        flow.process(utterance, &TurnMetadata::new(), ctx)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_emergency_with_reason_transfers_in_one_turn() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();
        let outcome = step(&mut flow, "speak to a human, this is an emergency", &mut ctx).await;

        assert_eq!(ctx.escalation.destination.as_deref(), Some("emergency"));
        assert_eq!(
            ctx.escalation.reason.as_deref(),
            Some("speak to a human, this is an emergency")
        );
        assert_eq!(ctx.escalation.state, EscalationState::Completed);
        assert_eq!(ctx.escalation.attempts, 1);
        assert_eq!(outcome.command, FlowCommand::End);

        let result = ctx.scratch.transfer_result.as_ref().unwrap();
        assert!(result.success);
        assert_eq!(result.details["extension"], "911");
    }

    #[tokio::test]
    async fn test_short_opener_collects_reason_first() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();

        let outcome = step(&mut flow, "transfer me please", &mut ctx).await;
        assert_eq!(ctx.escalation.state, EscalationState::CollectingReason);
        assert_eq!(ctx.escalation.destination.as_deref(), Some("general"));
        assert!(outcome.response.unwrap().contains("regarding"));
        assert_eq!(flow.services.executor.executed_count(), 0);

        let outcome = step(&mut flow, "my invoice looks wrong", &mut ctx).await;
        assert_eq!(ctx.escalation.state, EscalationState::Completed);
        assert_eq!(
            ctx.escalation.reason.as_deref(),
            Some("my invoice looks wrong")
        );
        assert_eq!(outcome.command, FlowCommand::End);
        assert_eq!(flow.services.executor.executed_count(), 1);
    }

    #[tokio::test]
    async fn test_named_person_captured() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();
        step(
            &mut flow,
            "I need to speak with Sarah Connor about my account",
            &mut ctx,
        )
        .await;
        assert_eq!(ctx.escalation.destination.as_deref(), Some("person"));
        assert_eq!(ctx.escalation.person.as_deref(), Some("Sarah Connor"));

        let result = ctx.scratch.transfer_result.as_ref().unwrap();
        assert_eq!(result.details["person"], "Sarah Connor");
        assert_eq!(result.details["extension"], "0");
    }

    #[tokio::test]
    async fn test_cold_style_keywords() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();
        step(
            &mut flow,
            "just transfer me to billing right now please",
            &mut ctx,
        )
        .await;
        assert_eq!(ctx.escalation.destination.as_deref(), Some("billing"));
        assert_eq!(ctx.escalation.style.as_deref(), Some("cold"));
        let result = ctx.scratch.transfer_result.as_ref().unwrap();
        assert_eq!(result.details["style"], "cold");
        assert_eq!(result.details["extension"], "400");
    }

    #[tokio::test]
    async fn test_failed_transfer_lands_in_failed_state() {
        let config = Arc::new(FrontdeskConfig::default());
        let executor = Arc::new(ActionExecutor::new(ActionRegistry::new()));
        let mut flow = EscalationFlow::new(FlowServices::with_executor(config, executor));
        let mut ctx = FlowContext::default();

        let outcome = step(
            &mut flow,
            "I have a technical problem with my account",
            &mut ctx,
        )
        .await;
        assert_eq!(ctx.escalation.state, EscalationState::Failed);
        assert_eq!(outcome.command, FlowCommand::End);
        assert!(outcome.response.unwrap().contains("wasn't able to transfer"));
        let result = ctx.scratch.transfer_result.as_ref().unwrap();
        assert!(!result.success);
    }

    #[tokio::test]
    async fn test_terminal_state_resets_for_new_attempt() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();
        step(&mut flow, "speak to a human, this is an emergency", &mut ctx).await;
        assert_eq!(ctx.escalation.state, EscalationState::Completed);

        step(&mut flow, "transfer me to billing about an invoice", &mut ctx).await;
        assert_eq!(ctx.escalation.destination.as_deref(), Some("billing"));
        assert_eq!(ctx.escalation.attempts, 1);
    }

    #[tokio::test]
    async fn test_resume_after_terminal_cascades_end() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();
        ctx.escalation.state = EscalationState::Failed;
        assert_eq!(flow.resume(&mut ctx), FlowCommand::End);

        ctx.escalation.state = EscalationState::CollectingReason;
        assert_eq!(flow.resume(&mut ctx), FlowCommand::None);
    }
}
