//! Information flow: answers questions from the office knowledge base.
//!
//! No rigid state machine here; the flow runs a resolution loop. Every
//! turn classifies the query into a category, executes one lookup, and
//! appends the result to an audit log. The flow ends itself only when a
//! query resolved and the utterance carries no follow-up indicator.

use async_trait::async_trait;
use tracing::info;

use frontdesk_action::{ActionDirective, NO_INFORMATION};
use frontdesk_core::Timestamp;

use crate::context::FlowContext;
use crate::error::FlowError;
use crate::flow::{Flow, FlowCommand, FlowId, FlowServices, StepOutcome, TurnMetadata};

/// Ordered category keyword sets; first match wins, `general` is the
/// fallback.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("hours", &["hour", "open", "close", "closing", "opening"]),
    ("location", &["location", "address", "where", "located", "directions"]),
    ("services", &["service", "offer", "provide", "do you do"]),
    ("pricing", &["price", "pricing", "cost", "charge", "fee", "how much"]),
    ("contact", &["contact", "email", "phone number", "fax", "reach you"]),
    ("staff", &["staff", "doctor", "team", "specialist", "who works"]),
    ("policies", &["policy", "policies", "insurance", "cancellation"]),
];

const FOLLOWUP_WORDS: &[&str] = &["also", "and"];
const FOLLOWUP_PHRASES: &[&str] = &["another question", "what about", "one more"];

pub struct InformationFlow {
    services: FlowServices,
}

impl InformationFlow {
    pub fn new(services: FlowServices) -> Self {
        Self { services }
    }

    fn classify_category(utterance: &str) -> &'static str {
        let lower = utterance.to_lowercase();
        for (category, keywords) in CATEGORY_KEYWORDS {
            if keywords.iter().any(|k| lower.contains(k)) {
                return category;
            }
        }
        "general"
    }

    /// Word-level check for "and"/"also" so "Sandy" or "handle" cannot
    /// hold the flow open.
    fn has_followup(utterance: &str) -> bool {
        let lower = utterance.to_lowercase();
        let has_word = lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|w| FOLLOWUP_WORDS.contains(&w));
        has_word || FOLLOWUP_PHRASES.iter().any(|p| lower.contains(p))
    }
}

#[async_trait]
impl Flow for InformationFlow {
    fn id(&self) -> FlowId {
        FlowId::Information
    }

    fn initialize(&mut self, _context: &mut FlowContext) {}

    async fn process(
        &mut self,
        utterance: &str,
        _metadata: &TurnMetadata,
        context: &mut FlowContext,
    ) -> Result<StepOutcome, FlowError> {
        let extracted = self.services.extractor.extract(utterance);
        context.merge_entities(extracted);

        let category = Self::classify_category(utterance);
        if !context.info_data.info_results.is_empty() {
            context
                .info_data
                .followup_queries
                .push(utterance.trim().to_string());
        }
        context.info_data.category = Some(category.to_string());

        let mut directive = ActionDirective::new("lookup_info");
        directive
            .params
            .insert("category".to_string(), category.to_string());
        directive
            .params
            .insert("query".to_string(), utterance.trim().to_string());

        let outcome = self.services.executor.execute(&directive).await;
        let answer = outcome
            .details
            .get("info")
            .cloned()
            .unwrap_or_else(|| outcome.message.clone());

        let resolved = outcome.success && answer != NO_INFORMATION;
        info!(category = %category, resolved, "Information lookup");

        context.scratch.info_result = Some(outcome);
        context.info_data.info_results.push(answer.clone());
        context.info_data.resolved = resolved;

        if !resolved {
            return Ok(StepOutcome::reply(
                "I'm sorry, I don't have that information. Is there anything else you'd like to know?",
            ));
        }
        if Self::has_followup(utterance) {
            Ok(StepOutcome::reply(format!(
                "{} What else would you like to know?",
                answer
            )))
        } else {
            Ok(StepOutcome::finish(answer))
        }
    }

    fn cleanup(&mut self, context: &mut FlowContext) {
        context.info_data.last_updated = Some(Timestamp::now());
    }

    fn resume(&mut self, context: &mut FlowContext) -> FlowCommand {
        if context.info_data.resolved {
            FlowCommand::End
        } else {
            FlowCommand::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frontdesk_core::FrontdeskConfig;
    use std::sync::Arc;

    fn flow() -> InformationFlow {
        InformationFlow::new(FlowServices::new(Arc::new(FrontdeskConfig::default())))
    }

    async fn step(
        flow: &mut InformationFlow,
        utterance: &str,
        ctx: &mut FlowContext,
    ) -> StepOutcome {
        flow.process(utterance, &TurnMetadata::new(), ctx)
            .await
            .unwrap()
    }

    #[test]
    fn test_category_classification() {
        assert_eq!(InformationFlow::classify_category("What are your hours?"), "hours");
        assert_eq!(
            InformationFlow::classify_category("Where are you located?"),
            "location"
        );
        assert_eq!(
            InformationFlow::classify_category("How much does a visit cost?"),
            "pricing"
        );
        assert_eq!(
            InformationFlow::classify_category("Which doctors are on staff?"),
            "staff"
        );
        assert_eq!(InformationFlow::classify_category("Tell me more"), "general");
    }

    #[test]
    fn test_followup_indicators() {
        assert!(InformationFlow::has_followup("hours and location please"));
        assert!(InformationFlow::has_followup("I also wanted to ask"));
        assert!(InformationFlow::has_followup("what about parking"));
        assert!(!InformationFlow::has_followup("What are your hours?"));
        // Substrings of ordinary words must not count
        assert!(!InformationFlow::has_followup("Sandy can handle it"));
    }

    #[tokio::test]
    async fn test_resolved_query_without_followup_ends_flow() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();
        let outcome = step(&mut flow, "What are your hours?", &mut ctx).await;
        assert_eq!(outcome.command, FlowCommand::End);
        assert!(ctx.info_data.resolved);
        assert_eq!(ctx.info_data.category.as_deref(), Some("hours"));
        assert_eq!(ctx.info_data.info_results.len(), 1);
        assert!(ctx.info_data.followup_queries.is_empty());
    }

    #[tokio::test]
    async fn test_followup_indicator_keeps_flow_open() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();

        let outcome = step(
            &mut flow,
            "What are your hours and where are you located?",
            &mut ctx,
        )
        .await;
        assert_eq!(outcome.command, FlowCommand::None);
        assert!(outcome.response.unwrap().contains("What else"));

        let outcome = step(&mut flow, "where are you located", &mut ctx).await;
        assert_eq!(outcome.command, FlowCommand::End);
        assert_eq!(ctx.info_data.info_results.len(), 2);
        assert_eq!(
            ctx.info_data.followup_queries,
            vec!["where are you located".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unresolved_query_stays_open_with_apology() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();
        let outcome = step(&mut flow, "What are your prices?", &mut ctx).await;
        assert_eq!(outcome.command, FlowCommand::None);
        assert!(!ctx.info_data.resolved);
        assert!(outcome.response.unwrap().contains("don't have that information"));
        // The sentinel still lands in the audit log
        assert_eq!(ctx.info_data.info_results.len(), 1);
        assert_eq!(ctx.info_data.info_results[0], NO_INFORMATION);
    }

    #[tokio::test]
    async fn test_audit_log_is_append_only() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();
        step(&mut flow, "What are your hours and services?", &mut ctx).await;
        let first = ctx.info_data.info_results[0].clone();
        step(&mut flow, "what services do you offer", &mut ctx).await;
        assert_eq!(ctx.info_data.info_results.len(), 2);
        assert_eq!(ctx.info_data.info_results[0], first);
    }

    #[tokio::test]
    async fn test_resume_cascades_end_once_resolved() {
        let mut flow = flow();
        let mut ctx = FlowContext::default();
        ctx.info_data.resolved = true;
        assert_eq!(flow.resume(&mut ctx), FlowCommand::End);

        ctx.info_data.resolved = false;
        assert_eq!(flow.resume(&mut ctx), FlowCommand::None);
    }
}
