//! Shared per-call conversation state.
//!
//! One `FlowContext` is created per call and lives until teardown. Every
//! flow reads and writes it through a mutable borrow, so a parent flow
//! resumed after a child ends observes everything the child changed.
//! Each flow variant owns exactly one namespace struct here and never
//! touches another variant's namespace.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use frontdesk_action::ActionOutcome;
use frontdesk_core::{CallMetadata, Timestamp};
use frontdesk_nlu::{EntityKind, EntityMap, IntentKind};

use crate::states::{AppointmentState, EscalationState, GeneralState, MessageState};

// =============================================================================
// Urgency
// =============================================================================

/// Urgency of a recorded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Critical,
    High,
    Normal,
    Low,
}

impl Default for Urgency {
    fn default() -> Self {
        Urgency::Normal
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Urgency::Critical => "critical",
            Urgency::High => "high",
            Urgency::Normal => "normal",
            Urgency::Low => "low",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical" => Ok(Urgency::Critical),
            "high" => Ok(Urgency::High),
            "normal" => Ok(Urgency::Normal),
            "low" => Ok(Urgency::Low),
            _ => Err(format!("Unknown urgency: {}", s)),
        }
    }
}

// =============================================================================
// Flow namespaces
// =============================================================================

/// General router flow namespace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralData {
    pub state: GeneralState,
    pub last_updated: Option<Timestamp>,
}

/// Appointment flow namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentData {
    pub state: AppointmentState,
    pub date: Option<String>,
    pub time: Option<String>,
    /// Appointment length in minutes. Defaults to 30 and never blocks
    /// collection.
    pub duration_minutes: u32,
    pub name: Option<String>,
    pub purpose: Option<String>,
    pub rescheduling: bool,
    pub last_updated: Option<Timestamp>,
}

impl Default for AppointmentData {
    fn default() -> Self {
        Self {
            state: AppointmentState::default(),
            date: None,
            time: None,
            duration_minutes: 30,
            name: None,
            purpose: None,
            rescheduling: false,
            last_updated: None,
        }
    }
}

/// Message flow namespace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageData {
    pub state: MessageState,
    pub message: Option<String>,
    pub caller_name: Option<String>,
    pub caller_number: Option<String>,
    pub urgency: Urgency,
    pub callback: Option<bool>,
    pub last_updated: Option<Timestamp>,
}

/// Information flow namespace.
///
/// `info_results` is a strictly append-only log of every lookup result
/// in turn order; it is the flow's audit trail and is never rewritten.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InfoData {
    pub resolved: bool,
    pub category: Option<String>,
    pub followup_queries: Vec<String>,
    pub info_results: Vec<String>,
    pub last_updated: Option<Timestamp>,
}

/// Escalation flow namespace.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EscalationData {
    pub state: EscalationState,
    pub destination: Option<String>,
    pub person: Option<String>,
    pub reason: Option<String>,
    pub style: Option<String>,
    pub attempts: u32,
    pub last_updated: Option<Timestamp>,
}

// =============================================================================
// Turn scratch
// =============================================================================

/// Write-once-per-turn side channel consumed by the caller of
/// `process_message`, never by other flows. Cleared at the start of each
/// turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TurnScratch {
    pub transitioned_to: Option<String>,
    pub appointment_result: Option<ActionOutcome>,
    pub message_result: Option<ActionOutcome>,
    pub transfer_result: Option<ActionOutcome>,
    pub info_result: Option<ActionOutcome>,
    pub error: Option<String>,
}

impl TurnScratch {
    pub fn clear(&mut self) {
        *self = TurnScratch::default();
    }
}

// =============================================================================
// FlowContext
// =============================================================================

/// The whole conversational state of one call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowContext {
    /// Immutable call metadata, set at call start.
    pub metadata: CallMetadata,
    /// Accumulated entities, de-duplicated per class, append-only for
    /// the duration of the call.
    pub entities: EntityMap,
    /// Last intent the general flow classified. Suppresses redundant
    /// re-transitions into the same child flow on consecutive turns.
    pub current_intent: Option<IntentKind>,
    pub general: GeneralData,
    pub appointment: AppointmentData,
    pub message_data: MessageData,
    pub info_data: InfoData,
    pub escalation: EscalationData,
    /// Free-form values merged in by `end_flow` outputs.
    pub extras: HashMap<String, String>,
    pub scratch: TurnScratch,
}

impl FlowContext {
    /// Create a fresh context for a call.
    pub fn new(metadata: CallMetadata) -> Self {
        Self {
            metadata,
            ..Self::default()
        }
    }

    /// Union-merge freshly extracted entities into the accumulated map.
    /// Existing values are kept, new values appended, duplicates dropped,
    /// and no class ever shrinks.
    pub fn merge_entities(&mut self, extracted: EntityMap) {
        for (kind, values) in extracted {
            let entry = self.entities.entry(kind).or_default();
            for value in values {
                if !entry.contains(&value) {
                    entry.push(value);
                }
            }
        }
    }

    /// First accumulated value of an entity class, if any.
    pub fn first_entity(&self, kind: EntityKind) -> Option<&str> {
        self.entities
            .get(&kind)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(kind: EntityKind, values: &[&str]) -> EntityMap {
        let mut map = EntityMap::new();
        map.insert(kind, values.iter().map(|v| v.to_string()).collect());
        map
    }

    // ---- Entity merging ----

    #[test]
    fn test_merge_entities_appends_new_values() {
        let mut ctx = FlowContext::default();
        ctx.merge_entities(entities(EntityKind::Dates, &["tomorrow"]));
        ctx.merge_entities(entities(EntityKind::Dates, &["next Tuesday"]));
        assert_eq!(
            ctx.entities[&EntityKind::Dates],
            vec!["tomorrow".to_string(), "next Tuesday".to_string()]
        );
    }

    #[test]
    fn test_merge_entities_deduplicates() {
        let mut ctx = FlowContext::default();
        ctx.merge_entities(entities(EntityKind::Times, &["2 pm", "2 pm"]));
        ctx.merge_entities(entities(EntityKind::Times, &["2 pm"]));
        assert_eq!(ctx.entities[&EntityKind::Times], vec!["2 pm".to_string()]);
    }

    #[test]
    fn test_merge_entities_never_shrinks() {
        let mut ctx = FlowContext::default();
        ctx.merge_entities(entities(EntityKind::Names, &["John Doe"]));
        ctx.merge_entities(EntityMap::new());
        ctx.merge_entities(entities(EntityKind::Emails, &["a@b.com"]));
        assert_eq!(ctx.entities[&EntityKind::Names], vec!["John Doe".to_string()]);
        assert_eq!(ctx.entities.len(), 2);
    }

    #[test]
    fn test_first_entity() {
        let mut ctx = FlowContext::default();
        assert!(ctx.first_entity(EntityKind::Dates).is_none());
        ctx.merge_entities(entities(EntityKind::Dates, &["tomorrow", "friday"]));
        assert_eq!(ctx.first_entity(EntityKind::Dates), Some("tomorrow"));
    }

    // ---- Defaults ----

    #[test]
    fn test_fresh_context_defaults() {
        let ctx = FlowContext::new(CallMetadata::default());
        assert_eq!(ctx.appointment.state, AppointmentState::Init);
        assert_eq!(ctx.appointment.duration_minutes, 30);
        assert_eq!(ctx.message_data.state, MessageState::Init);
        assert_eq!(ctx.message_data.urgency, Urgency::Normal);
        assert!(!ctx.info_data.resolved);
        assert_eq!(ctx.escalation.state, EscalationState::Init);
        assert_eq!(ctx.escalation.attempts, 0);
        assert!(ctx.current_intent.is_none());
        assert!(ctx.extras.is_empty());
    }

    #[test]
    fn test_scratch_clear() {
        let mut scratch = TurnScratch {
            transitioned_to: Some("appointment".to_string()),
            error: Some("boom".to_string()),
            ..TurnScratch::default()
        };
        scratch.clear();
        assert!(scratch.transitioned_to.is_none());
        assert!(scratch.error.is_none());
    }

    // ---- Urgency ----

    #[test]
    fn test_urgency_display_parse_round_trip() {
        for urgency in [Urgency::Critical, Urgency::High, Urgency::Normal, Urgency::Low] {
            let parsed: Urgency = urgency.to_string().parse().unwrap();
            assert_eq!(parsed, urgency);
        }
    }

    #[test]
    fn test_urgency_unknown_rejected() {
        assert!("panic".parse::<Urgency>().is_err());
    }

    #[test]
    fn test_urgency_default_is_normal() {
        assert_eq!(Urgency::default(), Urgency::Normal);
    }
}
