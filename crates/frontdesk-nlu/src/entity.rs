//! Entity extraction from caller utterances.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The classes of entity the extractor recognizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    PhoneNumbers,
    Emails,
    Dates,
    Times,
    Names,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::PhoneNumbers => "phone_numbers",
            EntityKind::Emails => "emails",
            EntityKind::Dates => "dates",
            EntityKind::Times => "times",
            EntityKind::Names => "names",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "phone_numbers" => Ok(EntityKind::PhoneNumbers),
            "emails" => Ok(EntityKind::Emails),
            "dates" => Ok(EntityKind::Dates),
            "times" => Ok(EntityKind::Times),
            "names" => Ok(EntityKind::Names),
            _ => Err(format!("Unknown entity class: {}", s)),
        }
    }
}

/// Entity class to the ordered values observed for it. Classes with no
/// matches are absent rather than empty.
pub type EntityMap = HashMap<EntityKind, Vec<String>>;

/// Extracts phone numbers, emails, dates, times, and names from text.
pub struct EntityExtractor {
    phone_regex: Regex,
    email_regex: Regex,
    date_iso_regex: Regex,
    date_slash_regex: Regex,
    date_relative_regex: Regex,
    date_month_regex: Regex,
    time_meridiem_regex: Regex,
    time_clock_regex: Regex,
    time_word_regex: Regex,
    name_intro_regex: Regex,
    name_pair_regex: Regex,
}

impl EntityExtractor {
    /// Create a new entity extractor with pre-compiled regex patterns.
    pub fn new() -> Self {
        Self {
            phone_regex: Regex::new(
                r#"(?:\+?1[-.\s]?)?\(?\d{3}\)?[-.\s]\d{3}[-.\s]?\d{4}\b|\b\d{3}[-.\s]\d{4}\b"#,
            )
            .unwrap(),
            email_regex: Regex::new(r#"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"#)
                .unwrap(),
            date_iso_regex: Regex::new(r#"\b\d{4}-\d{2}-\d{2}\b"#).unwrap(),
            date_slash_regex: Regex::new(r#"\b\d{1,2}/\d{1,2}(?:/\d{2,4})?\b"#).unwrap(),
            date_relative_regex: Regex::new(
                r#"(?i)\b(?:today|tomorrow|yesterday|(?:next|this|last)\s+(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday|week|month)|monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b"#,
            )
            .unwrap(),
            date_month_regex: Regex::new(
                r#"(?i)\b(?:january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{1,2}(?:st|nd|rd|th)?\b"#,
            )
            .unwrap(),
            time_meridiem_regex: Regex::new(r#"(?i)\b\d{1,2}(?::\d{2})?\s*(?:am|pm)\b"#).unwrap(),
            time_clock_regex: Regex::new(r#"\b\d{1,2}:\d{2}\b"#).unwrap(),
            time_word_regex: Regex::new(r#"(?i)\b(?:noon|midnight)\b"#).unwrap(),
            name_intro_regex: Regex::new(
                r#"(?:[Mm]y name is|[Tt]his is|[Ii]'m|[Ii] am|[Cc]alling for)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)"#,
            )
            .unwrap(),
            name_pair_regex: Regex::new(r#"\b([A-Z][a-z]+)\s+([A-Z][a-z]+)\b"#).unwrap(),
        }
    }

    /// Extract all recognized entities from the given text.
    ///
    /// Never fails; returns an empty map when nothing matches. Values are
    /// de-duplicated per class, preserving first-seen order.
    pub fn extract(&self, text: &str) -> EntityMap {
        let mut entities = EntityMap::new();

        // Phone numbers
        let mut phones = Vec::new();
        for m in self.phone_regex.find_iter(text) {
            push_unique(&mut phones, m.as_str());
        }
        insert_class(&mut entities, EntityKind::PhoneNumbers, phones);

        // Emails
        let mut emails = Vec::new();
        for m in self.email_regex.find_iter(text) {
            push_unique(&mut emails, m.as_str());
        }
        insert_class(&mut entities, EntityKind::Emails, emails);

        // Dates: ISO, slash, relative expressions, then "March 5" forms
        let mut dates = Vec::new();
        for re in [
            &self.date_iso_regex,
            &self.date_slash_regex,
            &self.date_relative_regex,
            &self.date_month_regex,
        ] {
            for m in re.find_iter(text) {
                push_unique(&mut dates, m.as_str());
            }
        }
        insert_class(&mut entities, EntityKind::Dates, dates);

        // Times: meridiem forms first so "2:30 pm" is not re-captured as "2:30"
        let mut times = Vec::new();
        let mut meridiem_spans: Vec<(usize, usize)> = Vec::new();
        for m in self.time_meridiem_regex.find_iter(text) {
            meridiem_spans.push((m.start(), m.end()));
            push_unique(&mut times, m.as_str());
        }
        for m in self.time_clock_regex.find_iter(text) {
            let covered = meridiem_spans
                .iter()
                .any(|&(start, end)| m.start() >= start && m.end() <= end);
            if !covered {
                push_unique(&mut times, m.as_str());
            }
        }
        for m in self.time_word_regex.find_iter(text) {
            push_unique(&mut times, m.as_str());
        }
        insert_class(&mut entities, EntityKind::Times, times);

        // Names: explicit self-introductions first, then capitalized pairs
        let mut names = Vec::new();
        for caps in self.name_intro_regex.captures_iter(text) {
            if let Some(name) = caps.get(1) {
                if !is_common_word(first_word(name.as_str())) {
                    push_unique(&mut names, name.as_str());
                }
            }
        }
        for caps in self.name_pair_regex.captures_iter(text) {
            let (first, second) = (caps.get(1), caps.get(2));
            if let (Some(first), Some(second)) = (first, second) {
                if !is_common_word(first.as_str()) && !is_common_word(second.as_str()) {
                    push_unique(&mut names, &format!("{} {}", first.as_str(), second.as_str()));
                }
            }
        }
        insert_class(&mut entities, EntityKind::Names, names);

        entities
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

fn insert_class(entities: &mut EntityMap, kind: EntityKind, values: Vec<String>) {
    if !values.is_empty() {
        entities.insert(kind, values);
    }
}

fn first_word(s: &str) -> &str {
    s.split_whitespace().next().unwrap_or(s)
}

/// Returns true for words that are commonly false-positive person names.
fn is_common_word(s: &str) -> bool {
    matches!(
        s,
        "The"
            | "This"
            | "That"
            | "These"
            | "Those"
            | "There"
            | "Here"
            | "When"
            | "Where"
            | "What"
            | "Which"
            | "They"
            | "Next"
            | "Last"
            | "Good"
            | "Thank"
            | "Thanks"
            | "Please"
            | "Hello"
            | "Main"
            | "Street"
            | "Monday"
            | "Tuesday"
            | "Wednesday"
            | "Thursday"
            | "Friday"
            | "Saturday"
            | "Sunday"
            | "January"
            | "February"
            | "March"
            | "April"
            | "May"
            | "June"
            | "July"
            | "August"
            | "September"
            | "October"
            | "November"
            | "December"
    )
}
