//! Best-effort conversion of model output into JSON.
//!
//! The stages run in a fixed order and stop at the first successful parse:
//!
//! 1. trim, strip one leading/trailing code fence, parse
//! 2. escape stray backslashes, drop control characters other than `\n`/`\t`, parse
//! 3. drop every remaining control character, parse
//!
//! Anything still unparsable yields `None`.

use serde_json::Value;
use tracing::debug;

/// Parse `raw` model text into a JSON value, or `None` when every stage fails.
pub fn normalize(raw: &str) -> Option<Value> {
    let text = strip_fences(raw);

    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }

    let repaired = strip_control_chars(&escape_stray_backslashes(text), true);
    match serde_json::from_str(&repaired) {
        Ok(value) => {
            debug!("Parsed model output after escape repair");
            return Some(value);
        }
        Err(e) => debug!("Escape repair did not produce JSON: {}", e),
    }

    let stripped = strip_control_chars(&repaired, false);
    match serde_json::from_str(&stripped) {
        Ok(value) => {
            debug!("Parsed model output after stripping control characters");
            Some(value)
        }
        Err(e) => {
            debug!("Model output is not JSON: {}", e);
            None
        }
    }
}

/// Remove a single leading ```` ```json ```` / ```` ``` ```` marker and a single trailing ```` ``` ````.
pub(crate) fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

fn is_simple_escape(c: char) -> bool {
    matches!(c, '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't')
}

/// Double every backslash that does not start a valid JSON escape.
pub(crate) fn escape_stray_backslashes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '\\' {
            out.push(c);
            i += 1;
            continue;
        }

        match chars.get(i + 1) {
            Some(&next) if is_simple_escape(next) => {
                out.push('\\');
                out.push(next);
                i += 2;
            }
            Some(&'u')
                if chars.len() >= i + 6
                    && chars[i + 2..i + 6].iter().all(|h| h.is_ascii_hexdigit()) =>
            {
                out.extend(&chars[i..i + 6]);
                i += 6;
            }
            _ => {
                out.push_str("\\\\");
                i += 1;
            }
        }
    }

    out
}

/// Drop ASCII control characters, optionally keeping newline and tab.
pub(crate) fn strip_control_chars(text: &str, keep_newline_tab: bool) -> String {
    text.chars()
        .filter(|c| {
            if !c.is_ascii_control() {
                return true;
            }
            keep_newline_tab && (*c == '\n' || *c == '\t')
        })
        .collect()
}
