//! Display formatting for request and response payloads.
//!
//! Every path out of this module yields HTML-escaped text; formatting
//! failures degrade to the escaped raw input and are never reported to the
//! caller.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::models::{AppError, AppResult};
use crate::utils::escape_html;

const INDENT: &str = "  ";

struct MarkupPatterns {
    /// Text followed by a closing tag on the same line, e.g. `<id>7</id>`.
    inline_element: Regex,
    closing_tag: Regex,
    /// An opening tag that is not self-closing.
    opening_tag: Regex,
}

impl MarkupPatterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            inline_element: Regex::new(r".+</\w[^>]*>$")?,
            closing_tag: Regex::new(r"^</\w")?,
            opening_tag: Regex::new(r"^<\w([^>]*[^/])?>.*$")?,
        })
    }
}

static MARKUP_PATTERNS: Lazy<Result<MarkupPatterns, regex::Error>> = Lazy::new(MarkupPatterns::compile);

pub struct PayloadFormatter;

impl PayloadFormatter {
    pub fn format(value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(text) => Self::format_text(text),
            structured => Self::format_structured(structured),
        }
    }

    pub fn format_optional(value: Option<&Value>) -> String {
        value.map(Self::format).unwrap_or_default()
    }

    /// Formats payload text: JSON first, then markup, then plain text.
    pub fn format_text(text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        match serde_json::from_str::<Value>(text) {
            Ok(parsed) => Self::format_structured(&parsed),
            Err(_) if text.trim_start().starts_with('<') => match format_markup(text) {
                Ok(formatted) => escape_html(&formatted),
                Err(e) => {
                    debug!(error = %e, "markup reformat failed, showing raw payload");
                    escape_html(text)
                }
            },
            Err(_) => escape_html(text),
        }
    }

    fn format_structured(value: &Value) -> String {
        match serde_json::to_string_pretty(value) {
            Ok(pretty) => escape_html(&pretty),
            Err(_) => escape_html(&value.to_string()),
        }
    }
}

/// Best-effort markup indentation.
///
/// Breaks the text between adjacent tags and indents each line by the
/// current nesting depth. This does not validate the markup; unbalanced input
/// just produces uneven indentation.
pub fn format_markup(markup: &str) -> AppResult<String> {
    let patterns = MARKUP_PATTERNS
        .as_ref()
        .map_err(|e| AppError::FormatError(e.to_string()))?;

    let expanded = markup.replace("><", ">\n<");
    let mut formatted = String::with_capacity(expanded.len() * 2);
    let mut depth: usize = 0;

    for line in expanded.lines() {
        let mut opens = false;
        if patterns.inline_element.is_match(line) {
            // balanced on one line
        } else if patterns.closing_tag.is_match(line) {
            depth = depth.saturating_sub(1);
        } else if patterns.opening_tag.is_match(line) {
            opens = true;
        }

        formatted.push_str(&INDENT.repeat(depth));
        formatted.push_str(line);
        formatted.push('\n');

        if opens {
            depth += 1;
        }
    }

    Ok(formatted.trim().to_string())
}
