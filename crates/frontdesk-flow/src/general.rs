//! General flow: the conversational router.
//!
//! Every call starts here. Each turn merges the utterance's entities into
//! the shared context, classifies intent, and either hands the utterance
//! to a specialized child flow or handles it in place by executing any
//! embedded action directives.

use async_trait::async_trait;
use tracing::info;

use frontdesk_action::DirectiveParser;
use frontdesk_nlu::{classify_intent, IntentKind};

use crate::context::FlowContext;
use crate::error::FlowError;
use crate::flow::{Flow, FlowCommand, FlowId, FlowServices, StepOutcome, TurnMetadata};
use crate::states::GeneralState;

pub struct GeneralFlow {
    services: FlowServices,
    parser: DirectiveParser,
}

impl GeneralFlow {
    pub fn new(services: FlowServices) -> Self {
        Self {
            services,
            parser: DirectiveParser::new(),
        }
    }

    /// The child flow serving an intent, if the intent has one.
    fn child_flow(intent: IntentKind) -> Option<FlowId> {
        match intent {
            IntentKind::Appointment => Some(FlowId::Appointment),
            IntentKind::Message => Some(FlowId::Message),
            IntentKind::Information => Some(FlowId::Information),
            IntentKind::Escalation => Some(FlowId::Escalation),
            IntentKind::General => None,
        }
    }

    fn greeting(&self) -> String {
        format!(
            "Thank you for calling {}. How can I help you?",
            self.services.config.general.business_name
        )
    }
}

#[async_trait]
impl Flow for GeneralFlow {
    fn id(&self) -> FlowId {
        FlowId::General
    }

    fn initialize(&mut self, _context: &mut FlowContext) {}

    async fn process(
        &mut self,
        utterance: &str,
        _metadata: &TurnMetadata,
        context: &mut FlowContext,
    ) -> Result<StepOutcome, FlowError> {
        context.merge_entities(self.services.extractor.extract(utterance));

        let intent = classify_intent(utterance);

        // Route to a child flow on a fresh specialized intent. A repeat
        // of the prior intent stays here so consecutive "appointment"
        // turns do not re-enter the child that just ran.
        if let Some(child) = Self::child_flow(intent) {
            if context.current_intent != Some(intent) {
                context.current_intent = Some(intent);
                context.scratch.transitioned_to = Some(child.to_string());
                info!(intent = %intent, child = %child, "Routing to child flow");
                return Ok(StepOutcome::handoff(child));
            }
        }

        let greeting_turn = context.general.state == GeneralState::Greeting;
        context.general.state = GeneralState::Conversation;
        context.current_intent = Some(intent);

        let mut executed_messages = Vec::new();
        for directive in self.parser.parse(utterance) {
            let outcome = self.services.executor.execute(&directive).await;
            executed_messages.push(outcome.message);
        }

        let response = if !executed_messages.is_empty() {
            executed_messages.join(" ")
        } else if greeting_turn {
            self.greeting()
        } else {
            "How else can I help you?".to_string()
        };

        Ok(StepOutcome::reply(response))
    }

    fn cleanup(&mut self, context: &mut FlowContext) {
        context.general.last_updated = Some(frontdesk_core::Timestamp::now());
    }

    fn resume(&mut self, context: &mut FlowContext) -> FlowCommand {
        // Reset the intent latch so the very next utterance can route
        // freely again, including back into the child that just ended.
        context.current_intent = None;
        context.general.state = GeneralState::Resumed;
        FlowCommand::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_core::FrontdeskConfig;
    use frontdesk_nlu::EntityKind;
    use std::sync::Arc;

    fn flow() -> GeneralFlow {
        GeneralFlow::new(FlowServices::new(Arc::new(FrontdeskConfig::default())))
    }

    async fn step(flow: &mut GeneralFlow, utterance: &str, ctx: &mut FlowContext) -> StepOutcome {
        flow.process(utterance, &TurnMetadata::new(), ctx)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_appointment_intent_hands_off() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();
        let outcome = step(&mut flow, "I need to schedule an appointment", &mut ctx).await;
        assert_eq!(outcome.command, FlowCommand::Start(FlowId::Appointment));
        assert!(outcome.response.is_none());
        assert_eq!(ctx.current_intent, Some(IntentKind::Appointment));
        assert_eq!(ctx.scratch.transitioned_to.as_deref(), Some("appointment"));
    }

    #[tokio::test]
    async fn test_repeated_intent_does_not_reroute() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();
        ctx.current_intent = Some(IntentKind::Appointment);
        let outcome = step(&mut flow, "about that appointment again", &mut ctx).await;
        assert_eq!(outcome.command, FlowCommand::None);
        assert!(ctx.scratch.transitioned_to.is_none());
    }

    #[tokio::test]
    async fn test_resume_resets_intent_latch() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();
        ctx.current_intent = Some(IntentKind::Appointment);
        let command = flow.resume(&mut ctx);
        assert_eq!(command, FlowCommand::None);
        assert!(ctx.current_intent.is_none());
        assert_eq!(ctx.general.state, GeneralState::Resumed);

        // Same intent routes again after the latch reset
        let outcome = step(&mut flow, "schedule an appointment please", &mut ctx).await;
        assert_eq!(outcome.command, FlowCommand::Start(FlowId::Appointment));
    }

    #[tokio::test]
    async fn test_greeting_on_first_general_turn() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();
        let outcome = step(&mut flow, "hello there", &mut ctx).await;
        assert_eq!(outcome.command, FlowCommand::None);
        let response = outcome.response.unwrap();
        assert!(response.contains("Thank you for calling"));
        assert_eq!(ctx.general.state, GeneralState::Conversation);

        let outcome = step(&mut flow, "hmm", &mut ctx).await;
        assert_eq!(outcome.response.as_deref(), Some("How else can I help you?"));
    }

    #[tokio::test]
    async fn test_entities_merged_before_routing() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();
        step(
            &mut flow,
            "I want to book an appointment tomorrow at 2 pm",
            &mut ctx,
        )
        .await;
        assert_eq!(ctx.first_entity(EntityKind::Dates), Some("tomorrow"));
        assert_eq!(ctx.first_entity(EntityKind::Times), Some("2 pm"));
    }

    #[tokio::test]
    async fn test_general_turn_executes_inline_directives() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();
        let outcome = step(
            &mut flow,
            "noted [ACTION:set_reminder{message:call Bob}]",
            &mut ctx,
        )
        .await;
        assert_eq!(
            outcome.response.as_deref(),
            Some("Reminder set: call Bob")
        );
        assert_eq!(flow.services.executor.executed_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_directive_executes_nothing() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();
        let outcome = step(&mut flow, "I'll help [ACTION:send_email{to}]", &mut ctx).await;
        assert_eq!(flow.services.executor.executed_count(), 0);
        // Falls back to the greeting since nothing executed
        assert!(outcome.response.unwrap().contains("Thank you for calling"));
    }
}
