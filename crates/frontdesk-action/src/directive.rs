//! Parses action directives embedded in free text.
//!
//! Two independent syntaxes are recognized, both scanned over the whole
//! text:
//!
//! - inline: `[ACTION:send_sms{to:555-0100,message:running late}]`
//! - fenced block labelled `action` containing one JSON mapping with a
//!   `type` key and either a nested `params` mapping or top-level keys
//!
//! Inline matches precede block matches in the returned order. Malformed
//! input is never an error: bad pairs and bad blocks are skipped, the
//! blocks with a logged warning.

use std::collections::HashMap;

use regex::Regex;
use tracing::warn;

use crate::types::ActionDirective;

/// Directive scanner with pre-compiled grammar patterns.
pub struct DirectiveParser {
    inline_regex: Regex,
    block_regex: Regex,
}

impl DirectiveParser {
    pub fn new() -> Self {
        Self {
            inline_regex: Regex::new(r#"\[ACTION:(\w+)\{([^}]*)\}\]"#).unwrap(),
            block_regex: Regex::new(r#"(?s)```action\s+(.*?)```"#).unwrap(),
        }
    }

    /// Extract all directives from the text, inline syntax first.
    pub fn parse(&self, text: &str) -> Vec<ActionDirective> {
        let mut directives = Vec::new();

        for caps in self.inline_regex.captures_iter(text) {
            let action_type = caps[1].to_string();
            let body = caps[2].trim();

            let mut params = HashMap::new();
            for pair in body.split(',') {
                let pair = pair.trim();
                if pair.is_empty() {
                    continue;
                }
                // Pairs without a colon are malformed and skipped
                if let Some((key, value)) = pair.split_once(':') {
                    params.insert(key.trim().to_string(), value.trim().to_string());
                }
            }

            // A non-empty body that produced no pairs means the whole
            // directive was malformed, not merely sparse
            if params.is_empty() && !body.is_empty() {
                warn!(action_type = %action_type, "Skipping malformed inline directive");
                continue;
            }

            directives.push(ActionDirective {
                action_type,
                params,
            });
        }

        for caps in self.block_regex.captures_iter(text) {
            let body = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            match parse_block(body) {
                Some(directive) => directives.push(directive),
                None => warn!("Skipping malformed action block"),
            }
        }

        directives
    }
}

impl Default for DirectiveParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one fenced block body as a JSON directive.
///
/// Requires a mapping with a string `type` key. Parameters come from a
/// nested `params` mapping when present, otherwise from the remaining
/// top-level keys. Scalar values are stringified; arrays and nested
/// objects are dropped with a warning.
fn parse_block(body: &str) -> Option<ActionDirective> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let obj = value.as_object()?;
    let action_type = obj.get("type")?.as_str()?.to_string();

    let mut params = HashMap::new();
    if let Some(nested) = obj.get("params").and_then(|p| p.as_object()) {
        for (key, value) in nested {
            insert_scalar(&mut params, key, value);
        }
    } else {
        for (key, value) in obj {
            if key == "type" {
                continue;
            }
            insert_scalar(&mut params, key, value);
        }
    }

    Some(ActionDirective {
        action_type,
        params,
    })
}

fn insert_scalar(params: &mut HashMap<String, String>, key: &str, value: &serde_json::Value) {
    let text = match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => {
            warn!(param = %key, "Skipping non-scalar directive parameter");
            return;
        }
    };
    params.insert(key.to_string(), text);
}
