//! Action executor with a call-scoped audit log.
//!
//! The executor is the boundary where action failures stop being errors:
//! whatever goes wrong inside (unknown type, unregistered handler, handler
//! error), `execute` returns a failed `ActionOutcome` and the call goes on.

use std::sync::Mutex;

use frontdesk_core::{FrontdeskConfig, Timestamp};
use tracing::warn;

use crate::error::ActionError;
use crate::handler::ActionRegistry;
use crate::types::{ActionDirective, ActionOutcome, ActionType, ExecutedAction};

/// Executes directives against a handler registry and remembers every
/// execution for the duration of the call.
pub struct ActionExecutor {
    registry: ActionRegistry,
    log: Mutex<Vec<ExecutedAction>>,
}

impl ActionExecutor {
    /// Create an executor over the given registry.
    pub fn new(registry: ActionRegistry) -> Self {
        Self {
            registry,
            log: Mutex::new(Vec::new()),
        }
    }

    /// Create an executor with all nine built-in handlers registered.
    pub fn with_defaults(config: &FrontdeskConfig) -> Self {
        let mut registry = ActionRegistry::new();
        registry.register_defaults(config);
        Self::new(registry)
    }

    /// Execute one directive. Never fails: every error path degrades to a
    /// failed outcome with the error text in `error` and `message`.
    pub async fn execute(&self, directive: &ActionDirective) -> ActionOutcome {
        let outcome = self.dispatch(directive).await;
        self.record(directive, &outcome);
        outcome
    }

    async fn dispatch(&self, directive: &ActionDirective) -> ActionOutcome {
        let action_type: ActionType = match directive.action_type.parse() {
            Ok(t) => t,
            Err(e) => {
                warn!(action_type = %directive.action_type, "Directive has unknown action type");
                return ActionOutcome::failure(e);
            }
        };

        let handler = match self.registry.get(action_type) {
            Some(h) => h,
            None => {
                warn!(action_type = %action_type, "No handler registered for action type");
                return ActionOutcome::failure(
                    ActionError::Unregistered(action_type).to_string(),
                );
            }
        };

        match handler.execute(&directive.params).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(action_type = %action_type, error = %e, "Action handler failed");
                ActionOutcome::failure(e.to_string())
            }
        }
    }

    fn record(&self, directive: &ActionDirective, outcome: &ActionOutcome) {
        match self.log.lock() {
            Ok(mut log) => log.push(ExecutedAction {
                directive: directive.clone(),
                outcome: outcome.clone(),
                executed_at: Timestamp::now(),
            }),
            Err(e) => warn!(error = %e, "Action log lock poisoned, entry dropped"),
        }
    }

    /// Snapshot of every directive executed so far, in execution order.
    pub fn executed(&self) -> Vec<ExecutedAction> {
        match self.log.lock() {
            Ok(log) => log.clone(),
            Err(e) => {
                warn!(error = %e, "Action log lock poisoned");
                Vec::new()
            }
        }
    }

    /// Number of directives executed so far.
    pub fn executed_count(&self) -> usize {
        self.log.lock().map(|log| log.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn executor() -> ActionExecutor {
        ActionExecutor::with_defaults(&FrontdeskConfig::default())
    }

    fn directive(action_type: &str, pairs: &[(&str, &str)]) -> ActionDirective {
        ActionDirective {
            action_type: action_type.to_string(),
            params: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_execute_success_path() {
        let executor = executor();
        let outcome = executor
            .execute(&directive("set_reminder", &[("message", "call Bob")]))
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Reminder set: call Bob");
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn test_execute_unknown_type_degrades_to_failure() {
        let executor = executor();
        let outcome = executor.execute(&directive("teleport", &[])).await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Unknown action type: teleport"));
    }

    #[tokio::test]
    async fn test_execute_unregistered_type_degrades_to_failure() {
        let executor = ActionExecutor::new(ActionRegistry::new());
        let outcome = executor
            .execute(&directive("set_reminder", &[("message", "hi")]))
            .await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.error.as_deref(),
            Some("Action type not registered: set_reminder")
        );
    }

    #[tokio::test]
    async fn test_execute_handler_error_degrades_to_failure() {
        let executor = executor();
        let outcome = executor
            .execute(&directive("schedule_appointment", &[("time", "2 pm")]))
            .await;
        assert!(!outcome.success);
        assert_eq!(
            outcome.error.as_deref(),
            Some("Missing required parameter: date")
        );
        assert_eq!(outcome.message, "Missing required parameter: date");
    }

    #[tokio::test]
    async fn test_executed_log_records_in_order() {
        let executor = executor();
        executor
            .execute(&directive("set_reminder", &[("message", "one")]))
            .await;
        executor.execute(&directive("teleport", &[])).await;

        let log = executor.executed();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].directive.action_type, "set_reminder");
        assert!(log[0].outcome.success);
        assert_eq!(log[1].directive.action_type, "teleport");
        assert!(!log[1].outcome.success);
        assert_eq!(executor.executed_count(), 2);
    }

    #[tokio::test]
    async fn test_executed_log_empty_before_any_execution() {
        let executor = executor();
        assert!(executor.executed().is_empty());
        assert_eq!(executor.executed_count(), 0);
    }

    #[tokio::test]
    async fn test_execute_all_defaults_dispatch() {
        // Every built-in type dispatches to a real handler, none panic
        let executor = executor();
        let cases: Vec<ActionDirective> = vec![
            directive("schedule_appointment", &[("date", "tomorrow"), ("time", "9 am")]),
            directive("cancel_appointment", &[("appointment_id", "apt_1_0")]),
            directive("take_message", &[("message", "call me back please")]),
            directive("transfer_call", &[("destination", "support")]),
            directive("lookup_info", &[("category", "hours")]),
            directive("save_contact", &[("name", "Jane"), ("phone", "555-0100")]),
            directive("set_reminder", &[("message", "water plants")]),
            directive("send_email", &[("to", "a@b.com"), ("body", "hi")]),
            directive("send_sms", &[("to", "555-0100"), ("message", "hi")]),
        ];
        for case in &cases {
            let outcome = executor.execute(case).await;
            assert!(outcome.success, "{} failed: {:?}", case.action_type, outcome.error);
        }
        assert_eq!(executor.executed_count(), cases.len());
    }
}
