//! Flow trait, registry, and the step contract between flows and the
//! flow manager.
//!
//! Flows never call back into the manager. Each processing step returns a
//! `StepOutcome` whose `FlowCommand` tells the manager what to do next
//! (nothing, start a child flow, or end this flow), which keeps the
//! manager the single owner of the active-flow stack and the context.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use frontdesk_action::ActionExecutor;
use frontdesk_core::FrontdeskConfig;
use frontdesk_nlu::EntityExtractor;

use crate::context::FlowContext;
use crate::error::FlowError;

/// Per-turn metadata supplied by the caller of `process_message`.
pub type TurnMetadata = HashMap<String, String>;

// =============================================================================
// FlowId
// =============================================================================

/// Identifier of one of the five built-in flow kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowId {
    General,
    Appointment,
    Message,
    Information,
    Escalation,
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlowId::General => "general",
            FlowId::Appointment => "appointment",
            FlowId::Message => "message",
            FlowId::Information => "information",
            FlowId::Escalation => "escalation",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for FlowId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(FlowId::General),
            "appointment" => Ok(FlowId::Appointment),
            "message" => Ok(FlowId::Message),
            // "info" is the short registry key, "information" the intent name
            "information" | "info" => Ok(FlowId::Information),
            "escalation" => Ok(FlowId::Escalation),
            _ => Err(format!("Unknown flow id: {}", s)),
        }
    }
}

// =============================================================================
// Step contract
// =============================================================================

/// What a flow asks the manager to do after a processing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowCommand {
    /// Stay on the current flow.
    None,
    /// Suspend the current flow and start the named child flow. The
    /// manager re-dispatches the same utterance to the child.
    Start(FlowId),
    /// End the current flow and resume the suspended parent, if any.
    End,
}

/// Result of one flow processing step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub response: Option<String>,
    pub command: FlowCommand,
}

impl StepOutcome {
    /// Respond and stay on this flow.
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
            command: FlowCommand::None,
        }
    }

    /// Stay on this flow without responding.
    pub fn silent() -> Self {
        Self {
            response: None,
            command: FlowCommand::None,
        }
    }

    /// Hand the utterance over to a child flow.
    pub fn handoff(flow_id: FlowId) -> Self {
        Self {
            response: None,
            command: FlowCommand::Start(flow_id),
        }
    }

    /// Respond and end this flow.
    pub fn finish(text: impl Into<String>) -> Self {
        Self {
            response: Some(text.into()),
            command: FlowCommand::End,
        }
    }
}

// =============================================================================
// Services
// =============================================================================

/// Shared handles every flow needs: the action executor, the entity
/// extractor, and the loaded config.
#[derive(Clone)]
pub struct FlowServices {
    pub executor: Arc<ActionExecutor>,
    pub extractor: Arc<EntityExtractor>,
    pub config: Arc<FrontdeskConfig>,
}

impl FlowServices {
    /// Build the default service set from a config: extractor plus an
    /// executor with all built-in handlers registered.
    pub fn new(config: Arc<FrontdeskConfig>) -> Self {
        Self {
            executor: Arc::new(ActionExecutor::with_defaults(&config)),
            extractor: Arc::new(EntityExtractor::new()),
            config,
        }
    }

    /// Build a service set around a custom executor.
    pub fn with_executor(config: Arc<FrontdeskConfig>, executor: Arc<ActionExecutor>) -> Self {
        Self {
            executor,
            extractor: Arc::new(EntityExtractor::new()),
            config,
        }
    }
}

// =============================================================================
// Flow trait
// =============================================================================

/// Capability set every conversational flow implements.
#[async_trait]
pub trait Flow: Send {
    /// Which of the five flow kinds this is.
    fn id(&self) -> FlowId;

    /// Prepare the flow's namespace in the context. Must be idempotent:
    /// initializing twice never resets an in-progress state.
    fn initialize(&mut self, context: &mut FlowContext);

    /// Advance the flow by one caller utterance.
    async fn process(
        &mut self,
        utterance: &str,
        metadata: &TurnMetadata,
        context: &mut FlowContext,
    ) -> Result<StepOutcome, FlowError>;

    /// Stamp the namespace before the flow is suspended or ended. Called
    /// exactly once per suspension or end.
    fn cleanup(&mut self, context: &mut FlowContext);

    /// React to becoming active again after a child flow ended. Returns
    /// `FlowCommand::End` to cascade termination when this flow's own
    /// state had already reached a terminal before suspension.
    fn resume(&mut self, context: &mut FlowContext) -> FlowCommand;
}

// =============================================================================
// Registry
// =============================================================================

/// Constructor for one flow kind.
pub type FlowConstructor = Box<dyn Fn(FlowServices) -> Box<dyn Flow> + Send + Sync>;

/// Static mapping from flow ids to constructors.
///
/// Fixed to the five built-in kinds in production; tests register their
/// own entries to observe manager behavior from the outside.
pub struct FlowRegistry {
    constructors: HashMap<FlowId, FlowConstructor>,
}

impl FlowRegistry {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registry with all five built-in flows.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(
            FlowId::General,
            Box::new(|services| Box::new(crate::general::GeneralFlow::new(services))),
        );
        registry.register(
            FlowId::Appointment,
            Box::new(|services| Box::new(crate::appointment::AppointmentFlow::new(services))),
        );
        registry.register(
            FlowId::Message,
            Box::new(|services| Box::new(crate::message::MessageFlow::new(services))),
        );
        registry.register(
            FlowId::Information,
            Box::new(|services| Box::new(crate::information::InformationFlow::new(services))),
        );
        registry.register(
            FlowId::Escalation,
            Box::new(|services| Box::new(crate::escalation::EscalationFlow::new(services))),
        );
        registry
    }

    pub fn register(&mut self, id: FlowId, constructor: FlowConstructor) {
        self.constructors.insert(id, constructor);
    }

    /// Construct a fresh flow instance for the id.
    pub fn create(&self, id: FlowId, services: FlowServices) -> Option<Box<dyn Flow>> {
        self.constructors.get(&id).map(|ctor| ctor(services))
    }

    pub fn contains(&self, id: FlowId) -> bool {
        self.constructors.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl Default for FlowRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
