//! Shared confirmation / denial keyword heuristics.
//!
//! Used by every CONFIRMING state and by callback-preference classification,
//! so the two keyword sets must stay disjoint.

static AFFIRMATIVE_WORDS: &[&str] = &[
    "yes", "yeah", "yep", "yup", "sure", "correct", "right", "absolutely",
    "definitely", "confirm", "confirmed", "ok", "okay", "certainly", "affirmative",
];

static AFFIRMATIVE_PHRASES: &[&str] = &[
    "sounds good",
    "that works",
    "go ahead",
    "please do",
    "that's right",
    "that is right",
];

static NEGATIVE_WORDS: &[&str] = &[
    "no", "nope", "nah", "cancel", "wrong", "incorrect", "stop", "negative",
];

static NEGATIVE_PHRASES: &[&str] = &[
    "don't",
    "do not",
    "never mind",
    "nevermind",
    "forget it",
    "not right",
    "not correct",
    "changed my mind",
];

fn words_of(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// Returns true when the utterance reads as a confirmation.
pub fn is_affirmative(text: &str) -> bool {
    let lower = text.to_lowercase();
    let words = words_of(text);
    AFFIRMATIVE_WORDS.iter().any(|w| words.iter().any(|t| t == w))
        || AFFIRMATIVE_PHRASES.iter().any(|p| lower.contains(p))
}

/// Returns true when the utterance reads as a denial or cancellation.
pub fn is_negative(text: &str) -> bool {
    let lower = text.to_lowercase();
    let words = words_of(text);
    NEGATIVE_WORDS.iter().any(|w| words.iter().any(|t| t == w))
        || NEGATIVE_PHRASES.iter().any(|p| lower.contains(p))
}
