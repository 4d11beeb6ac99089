use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Newtype Wrappers - Identity
// =============================================================================

/// Unique identifier for a single call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(pub Uuid);

impl CallId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CallId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Newtype Wrappers - Temporal
// =============================================================================

/// Unix timestamp in seconds since epoch.
///
/// Compared by value. Two Timestamps with the same inner value are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap_or_default()
    }
}

// =============================================================================
// Call Metadata
// =============================================================================

/// Immutable facts about a call, set once when the call starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallMetadata {
    pub call_id: CallId,
    /// Caller name if known from the telephony layer (caller id lookup).
    pub caller_name: Option<String>,
    /// Caller number if known from the telephony layer.
    pub caller_number: Option<String>,
    pub started_at: Timestamp,
}

impl CallMetadata {
    pub fn new(caller_name: Option<String>, caller_number: Option<String>) -> Self {
        Self {
            call_id: CallId::new(),
            caller_name,
            caller_number,
            started_at: Timestamp::now(),
        }
    }
}

impl Default for CallMetadata {
    fn default() -> Self {
        Self::new(None, None)
    }
}
