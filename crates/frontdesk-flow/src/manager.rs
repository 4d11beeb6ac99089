//! Flow manager: single source of truth for which flow is active.
//!
//! The manager owns the one `FlowContext` for the call and a stack of
//! suspended parent flows. A flow hands control around by returning a
//! `FlowCommand` from `process`; the manager applies the command, and on
//! a start it re-dispatches the same utterance to the child flow so a
//! routed first utterance still gets processed this turn. All failure
//! paths degrade to "no active flow" or an error field on the turn
//! result; nothing here crashes the call.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;
use tracing::{info, warn};

use frontdesk_core::CallMetadata;

use crate::context::FlowContext;
use crate::flow::{Flow, FlowCommand, FlowId, FlowRegistry, FlowServices, TurnMetadata};

/// Upper bound on same-turn flow starts. Routing normally hops once
/// (general into a child); the bound stops a misbehaving flow pair from
/// bouncing an utterance forever.
const MAX_TURN_HOPS: u32 = 4;

/// What `process_message` hands back to the call loop each turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnResult {
    /// Flow left active once the turn settled.
    pub flow: String,
    pub response: Option<String>,
    /// Set when the general flow routed into a child this turn.
    pub transitioned_to: Option<String>,
    pub error: Option<String>,
}

pub struct FlowManager {
    registry: FlowRegistry,
    services: FlowServices,
    active: Option<Box<dyn Flow>>,
    stack: Vec<Box<dyn Flow>>,
    context: FlowContext,
    turns: u32,
}

impl FlowManager {
    pub fn new(services: FlowServices, metadata: CallMetadata) -> Self {
        Self::with_registry(FlowRegistry::with_builtins(), services, metadata)
    }

    /// Build a manager around a custom registry so tests can substitute
    /// their own flows.
    pub fn with_registry(
        registry: FlowRegistry,
        services: FlowServices,
        metadata: CallMetadata,
    ) -> Self {
        Self {
            registry,
            services,
            active: None,
            stack: Vec::new(),
            context: FlowContext::new(metadata),
            turns: 0,
        }
    }

    pub fn context(&self) -> &FlowContext {
        &self.context
    }

    pub fn services(&self) -> &FlowServices {
        &self.services
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn active_flow(&self) -> Option<FlowId> {
        self.active.as_ref().map(|f| f.id())
    }

    /// Start a flow by id, suspending the currently active flow under it.
    ///
    /// The active flow is cleaned up and pushed before the id is looked
    /// up; an unknown id restores it and returns false rather than
    /// erroring.
    pub fn start_flow(&mut self, flow_id: &str, input_context: Option<FlowContext>) -> bool {
        let had_active = self.active.is_some();
        if let Some(mut flow) = self.active.take() {
            flow.cleanup(&mut self.context);
            self.stack.push(flow);
        }

        let created = FlowId::from_str(flow_id)
            .ok()
            .and_then(|id| self.registry.create(id, self.services.clone()));

        match created {
            Some(mut flow) => {
                if let Some(context) = input_context {
                    self.context = context;
                }
                flow.initialize(&mut self.context);
                info!(flow = %flow.id(), depth = self.stack.len(), "Flow started");
                self.active = Some(flow);
                true
            }
            None => {
                warn!(flow = %flow_id, "Unknown flow id");
                if had_active {
                    self.active = self.stack.pop();
                }
                false
            }
        }
    }

    /// End the active flow and resume its parent, if any.
    ///
    /// `output` is merged into the context's extras before the parent's
    /// `resume` runs, so the parent sees everything the child produced.
    /// A parent whose own state already finished cascades another end.
    pub fn end_flow(&mut self, output: Option<HashMap<String, String>>) -> Option<&FlowContext> {
        if self.active.is_none() && self.stack.is_empty() {
            return None;
        }
        if let Some(mut flow) = self.active.take() {
            flow.cleanup(&mut self.context);
            info!(flow = %flow.id(), depth = self.stack.len(), "Flow ended");
        }

        match self.stack.pop() {
            Some(mut parent) => {
                if let Some(output) = output {
                    self.context.extras.extend(output);
                }
                let command = parent.resume(&mut self.context);
                self.active = Some(parent);
                match command {
                    FlowCommand::End => self.end_flow(None),
                    _ => Some(&self.context),
                }
            }
            None => None,
        }
    }

    /// The single per-turn entry point.
    ///
    /// Returns `None` only when no flow could be started at all; every
    /// other failure comes back as an error field on the result.
    pub async fn process_message(
        &mut self,
        utterance: &str,
        metadata: Option<TurnMetadata>,
    ) -> Option<TurnResult> {
        self.context.scratch.clear();
        self.turns += 1;
        let metadata = metadata.unwrap_or_default();

        if self.active.is_none() {
            let default = self.services.config.general.default_flow.clone();
            if !self.start_flow(&default, None) {
                warn!(flow = %default, "Default flow could not be started");
                return None;
            }
        }

        let mut response: Option<String> = None;
        let mut hops = 0u32;
        loop {
            let Some(flow) = self.active.as_mut() else {
                break;
            };
            let flow_name = flow.id().to_string();
            match flow.process(utterance, &metadata, &mut self.context).await {
                Ok(outcome) => {
                    if outcome.response.is_some() {
                        response = outcome.response;
                    }
                    match outcome.command {
                        FlowCommand::None => break,
                        FlowCommand::End => {
                            self.end_flow(None);
                            break;
                        }
                        FlowCommand::Start(child) => {
                            hops += 1;
                            if hops >= MAX_TURN_HOPS {
                                warn!(hops, "Turn hop limit reached");
                                break;
                            }
                            if !self.start_flow(&child.to_string(), None) {
                                break;
                            }
                            // Same utterance goes to the child next iteration
                        }
                    }
                }
                Err(e) => {
                    warn!(flow = %flow_name, error = %e, "Flow processing failed");
                    self.context.scratch.error = Some(e.to_string());
                    break;
                }
            }
        }

        Some(self.turn_result(response))
    }

    /// Unconditional teardown for call termination or reset.
    pub fn clear_flows(&mut self) {
        info!(
            turns = self.turns,
            executed_actions = self.services.executor.executed_count(),
            "Call teardown"
        );
        if let Some(mut flow) = self.active.take() {
            flow.cleanup(&mut self.context);
        }
        self.stack.clear();
        self.context = FlowContext::new(self.context.metadata.clone());
        self.turns = 0;
    }

    fn turn_result(&self, response: Option<String>) -> TurnResult {
        TurnResult {
            flow: self
                .active
                .as_ref()
                .map(|f| f.id().to_string())
                .unwrap_or_else(|| "none".to_string()),
            response,
            transitioned_to: self.context.scratch.transitioned_to.clone(),
            error: self.context.scratch.error.clone(),
        }
    }
}
