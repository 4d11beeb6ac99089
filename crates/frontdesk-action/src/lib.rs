//! Action layer for Frontdesk.
//!
//! Parses action directives embedded in conversation text and dispatches
//! them through pluggable handlers, recording every execution in a
//! call-scoped audit log.

pub mod directive;
pub mod error;
pub mod executor;
pub mod handler;
pub mod types;

pub use directive::DirectiveParser;
pub use error::ActionError;
pub use executor::ActionExecutor;
pub use handler::lookup::NO_INFORMATION;
pub use handler::{ActionHandler, ActionRegistry};
pub use types::{next_action_id, ActionDirective, ActionOutcome, ActionType, ExecutedAction};
