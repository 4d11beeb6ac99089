//! Rule-based intent classification for caller utterances.
//!
//! The General Flow routes on the result, so precedence is part of the
//! contract: appointment > message > information > escalation > general,
//! first match wins.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The intents the router distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    /// Caller wants to book, reschedule, or cancel an appointment.
    Appointment,
    /// Caller wants to leave a message.
    Message,
    /// Caller is asking about the business (hours, location, pricing, ...).
    Information,
    /// Caller wants a human or an urgent transfer.
    Escalation,
    /// Anything else; handled conversationally by the General Flow.
    General,
}

impl std::fmt::Display for IntentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IntentKind::Appointment => "appointment",
            IntentKind::Message => "message",
            IntentKind::Information => "information",
            IntentKind::Escalation => "escalation",
            IntentKind::General => "general",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for IntentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "appointment" => Ok(IntentKind::Appointment),
            "message" => Ok(IntentKind::Message),
            "information" => Ok(IntentKind::Information),
            "escalation" => Ok(IntentKind::Escalation),
            "general" => Ok(IntentKind::General),
            _ => Err(format!("Unknown intent: {}", s)),
        }
    }
}

// =============================================================================
// Compiled regex sets (compiled once, reused across calls)
// =============================================================================

struct IntentPatterns {
    appointment: Vec<Regex>,
    message: Vec<Regex>,
    information: Vec<Regex>,
    escalation: Vec<Regex>,
}

static INTENT_PATTERNS: LazyLock<IntentPatterns> = LazyLock::new(|| {
    let mk = |pats: &[&str]| -> Vec<Regex> {
        pats.iter()
            .map(|p| Regex::new(p).expect("Invalid intent regex"))
            .collect()
    };

    IntentPatterns {
        // Appointment patterns (checked first; "schedule" beats everything)
        appointment: mk(&[
            r"(?i)\bappointments?\b",
            r"(?i)\bschedule\b",
            r"(?i)\bbook(?:ing)?\b",
            r"(?i)\breschedule\b",
            r"(?i)\bavailability\b",
            r"(?i)\bcome\s+in\s+(?:on|at|for)\b",
        ]),
        // Message patterns
        message: mk(&[
            r"(?i)\b(?:leave|take)\s+a\s+message\b",
            r"(?i)\bmessage\s+for\b",
            r"(?i)\bpass\s+(?:this\s+)?along\b",
            r"(?i)\blet\s+\w+\s+know\b",
            r"(?i)\btell\s+(?:him|her|them)\b",
        ]),
        // Information patterns
        information: mk(&[
            r"(?i)\bhours\b",
            r"(?i)\b(?:location|address|directions)\b",
            r"(?i)\bwhere\s+are\s+you\b",
            r"(?i)\bhow\s+much\b",
            r"(?i)\b(?:price|prices|pricing|cost|costs|fees?)\b",
            r"(?i)\bservices\b",
            r"(?i)\bquestion\b",
            r"(?i)\binformation\b",
            r"(?i)\bpolic(?:y|ies)\b",
        ]),
        // Escalation patterns
        escalation: mk(&[
            r"(?i)\bspeak\s+(?:to|with)\s+(?:a\s+|an\s+|the\s+)?(?:human|person|someone|manager|supervisor|representative|agent|operator)\b",
            r"(?i)\btalk\s+(?:to|with)\s+(?:a\s+|an\s+|the\s+)?(?:human|person|someone|manager|supervisor|representative|agent|operator)\b",
            r"(?i)\btransfer\s+me\b",
            r"(?i)\breal\s+person\b",
            r"(?i)\bhuman\s+being\b",
            r"(?i)\boperator\b",
            r"(?i)\bemergency\b",
            // Case-sensitive on purpose: the capital letter is the person signal
            r"\b[Ss]peak\s+(?:to|with)\s+[A-Z][a-z]+\b",
        ]),
    }
});

/// Classify the intent of one utterance.
///
/// Checks pattern groups in precedence order and falls back to
/// [`IntentKind::General`] when nothing matches.
pub fn classify_intent(utterance: &str) -> IntentKind {
    let pats = &*INTENT_PATTERNS;

    for re in &pats.appointment {
        if re.is_match(utterance) {
            return IntentKind::Appointment;
        }
    }

    for re in &pats.message {
        if re.is_match(utterance) {
            return IntentKind::Message;
        }
    }

    for re in &pats.information {
        if re.is_match(utterance) {
            return IntentKind::Information;
        }
    }

    for re in &pats.escalation {
        if re.is_match(utterance) {
            return IntentKind::Escalation;
        }
    }

    IntentKind::General
}
