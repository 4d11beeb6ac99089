//! Rule-based text analysis for the Frontdesk call engine: entity
//! extraction, intent classification, and shared keyword heuristics.

pub mod entity;
pub mod intent;
pub mod keywords;

pub use entity::{EntityExtractor, EntityKind, EntityMap};
pub use intent::{classify_intent, IntentKind};
pub use keywords::{is_affirmative, is_negative};
