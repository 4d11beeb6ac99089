//! Information lookup action handler.
//!
//! Answers business questions (hours, location, pricing, ...) from the
//! knowledge section of the config.

use std::collections::HashMap;

use async_trait::async_trait;
use frontdesk_core::config::KnowledgeConfig;

use crate::error::ActionError;
use crate::handler::ActionHandler;
use crate::types::{next_action_id, ActionOutcome, ActionType};

/// Sentinel detail value returned when no answer is configured.
///
/// Lookups that come back empty are still successful outcomes; callers
/// distinguish an unanswered query by this value in the `info` detail.
pub const NO_INFORMATION: &str = "No information found";

/// Handler for `lookup_info` directives.
pub struct LookupInfoHandler {
    knowledge: KnowledgeConfig,
}

impl LookupInfoHandler {
    pub fn new(knowledge: KnowledgeConfig) -> Self {
        Self { knowledge }
    }

    /// Resolve an answer from the category, falling back to scanning the
    /// query text for a known category keyword.
    fn resolve(&self, category: &str, query: &str) -> Option<String> {
        if let Some(answer) = self.knowledge.answer_for(category) {
            return Some(answer.to_string());
        }
        let query = query.to_lowercase();
        for candidate in [
            "hours", "location", "services", "pricing", "contact", "staff", "policies",
        ] {
            if query.contains(candidate) {
                if let Some(answer) = self.knowledge.answer_for(candidate) {
                    return Some(answer.to_string());
                }
            }
        }
        None
    }
}

#[async_trait]
impl ActionHandler for LookupInfoHandler {
    fn action_type(&self) -> ActionType {
        ActionType::LookupInfo
    }

    async fn execute(&self, params: &HashMap<String, String>) -> Result<ActionOutcome, ActionError> {
        let category = params.get("category").map(String::as_str).unwrap_or("");
        let query = params.get("query").map(String::as_str).unwrap_or("");

        if category.is_empty() && query.is_empty() {
            return Err(ActionError::MissingParameter("category".to_string()));
        }

        let info = self
            .resolve(category, query)
            .unwrap_or_else(|| NO_INFORMATION.to_string());

        tracing::info!(category = %category, found = %(info != NO_INFORMATION), "Information lookup");

        let mut outcome = ActionOutcome::ok(next_action_id("info"), info.clone());
        outcome.details.insert("info".to_string(), info);
        if !category.is_empty() {
            outcome
                .details
                .insert("category".to_string(), category.to_string());
        }
        if !query.is_empty() {
            outcome
                .details
                .insert("query".to_string(), query.to_string());
        }

        Ok(outcome)
    }

    fn describe(&self, params: &HashMap<String, String>) -> String {
        let category = params
            .get("category")
            .map(String::as_str)
            .unwrap_or("general");
        format!("Look up {} information", category)
    }
}
