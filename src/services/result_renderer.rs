//! HTML rendering of iteration results.
//!
//! Payloads go through [`PayloadFormatter`]; every other piece of result text
//! is escaped before it is placed in markup.

use chrono::Local;
use serde_json::{Map, Value};

use crate::models::{ApiCallResult, IterationResult, IterationStatus};
use crate::services::PayloadFormatter;
use crate::utils::escape_html;

pub const NO_RESULTS_HTML: &str = "<div class=\"empty-state\">No results returned.</div>";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %:z";
pub const REPORT_TITLE: &str = "API Response Comparison Report";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSummary {
    pub total: usize,
    pub total_duration_ms: u64,
    pub matches: usize,
    pub mismatches: usize,
    pub errors: usize,
    pub generated_at: String,
}

impl ResultSummary {
    pub fn from_results(results: &[IterationResult], generated_at: impl Into<String>) -> Self {
        let count = |status: IterationStatus| results.iter().filter(|r| r.status == status).count();

        Self {
            total: results.len(),
            total_duration_ms: results.iter().map(IterationResult::total_duration).sum(),
            matches: count(IterationStatus::Match),
            mismatches: count(IterationStatus::Mismatch),
            errors: count(IterationStatus::Error),
            generated_at: generated_at.into(),
        }
    }
}

pub struct ResultRenderer;

impl ResultRenderer {
    /// Renders the results fragment, stamped with the current local time.
    pub fn render(results: &[IterationResult]) -> String {
        Self::render_at(results, &Local::now().format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn render_at(results: &[IterationResult], generated_at: &str) -> String {
        if results.is_empty() {
            return NO_RESULTS_HTML.to_string();
        }

        let summary = ResultSummary::from_results(results, generated_at);
        let mut html = render_summary(&summary);
        for (index, result) in results.iter().enumerate() {
            html.push_str(&render_iteration(index + 1, result));
        }
        html
    }

    /// A standalone page around the results fragment.
    pub fn render_document(results: &[IterationResult]) -> String {
        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n<title>{title}</title>\n</head>\n<body>\n<h1>{title}</h1>\n<div id=\"resultsContainer\">{body}</div>\n</body>\n</html>\n",
            title = REPORT_TITLE,
            body = Self::render(results),
        )
    }
}

/// `key=value` pairs joined by `; `. String values are shown without quotes.
pub fn format_tokens(tokens: &Map<String, Value>) -> String {
    tokens
        .iter()
        .map(|(key, value)| match value {
            Value::String(text) => format!("{}={}", key, text),
            other => format!("{}={}", key, other),
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn render_summary(summary: &ResultSummary) -> String {
    format!(
        concat!(
            "<div class=\"results-summary\"><div class=\"comparison-grid\">",
            "<div class=\"card\"><h3>Execution Summary</h3>",
            "<div><strong>Total Iterations:</strong> {total}</div>",
            "<div><strong>Total Duration:</strong> {duration} ms</div>",
            "<div><strong>Report Generated:</strong> {generated}</div>",
            "</div>",
            "<div class=\"card\"><h3>Comparison Summary</h3>",
            "<div><span class=\"status-MATCH\">Matches: {matches}</span></div>",
            "<div><span class=\"status-MISMATCH\">Mismatches: {mismatches}</span></div>",
            "<div><span class=\"status-ERROR\">Errors: {errors}</span></div>",
            "</div></div></div>"
        ),
        total = summary.total,
        duration = summary.total_duration_ms,
        generated = escape_html(&summary.generated_at),
        matches = summary.matches,
        mismatches = summary.mismatches,
        errors = summary.errors,
    )
}

fn render_iteration(ordinal: usize, result: &IterationResult) -> String {
    let status = result.status.as_str();

    let tokens = result
        .iteration_tokens
        .as_ref()
        .map(format_tokens)
        .filter(|tokens| !tokens.is_empty())
        .map(|tokens| format!("<br><small class=\"result-tokens\">Tokens: {}</small>", escape_html(&tokens)))
        .unwrap_or_default();

    let baseline = result
        .baseline_service_name
        .as_deref()
        .map(|service| {
            let reference = [
                Some(service),
                result.baseline_date.as_deref(),
                result.baseline_run_id.as_deref(),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" / ");
            format!("<br><small class=\"result-baseline\">Baseline: {}</small>", escape_html(&reference))
        })
        .unwrap_or_default();

    let timestamp = result
        .timestamp
        .as_deref()
        .filter(|timestamp| !timestamp.is_empty())
        .map(|timestamp| format!("<span class=\"result-time\">{}</span>", escape_html(timestamp)))
        .unwrap_or_default();

    format!(
        concat!(
            "<details class=\"result-item\">",
            "<summary class=\"result-header\">",
            "<span class=\"result-title\"><span>Iteration #{ordinal} - {operation}</span>{tokens}{baseline}</span>",
            "<span class=\"result-meta\">{timestamp}<span class=\"status-{status}\">{status}</span></span>",
            "</summary>",
            "<div class=\"result-body\">{body}</div>",
            "</details>"
        ),
        ordinal = ordinal,
        operation = escape_html(&result.operation_name),
        tokens = tokens,
        baseline = baseline,
        timestamp = timestamp,
        status = status,
        body = render_body(result),
    )
}

fn render_body(result: &IterationResult) -> String {
    if result.status == IterationStatus::Error {
        let message = result.error_message.as_deref().unwrap_or_default();
        return format!("<p class=\"error-text\">{}</p>", escape_html(message));
    }

    let mut body = String::new();

    if result.status == IterationStatus::Mismatch {
        if let Some(differences) = result.differences.as_ref().filter(|d| !d.is_empty()) {
            body.push_str("<div class=\"diff-list\"><h5>Differences Found</h5><ul>");
            for difference in differences {
                body.push_str(&format!("<li>{}</li>", escape_html(difference)));
            }
            body.push_str("</ul></div>");
        }
    }

    let request = PayloadFormatter::format_optional(
        result.api1.as_ref().and_then(|call| call.request_payload.as_ref()),
    );
    if !request.is_empty() {
        body.push_str(&format!(
            "<div class=\"request-box\"><h4>Request Payload</h4><pre>{}</pre></div>",
            request
        ));
    }

    let api1 = result.api1.clone().unwrap_or_default();
    if result.status == IterationStatus::Match {
        body.push_str(&format!(
            concat!(
                "<div class=\"single-view\"><h4>Response (Identical)</h4>",
                "<pre>{}</pre><p><small>Duration: {}ms</small></p></div>"
            ),
            response_text(&api1),
            api1.duration
        ));
    } else {
        let api2 = result.api2.clone().unwrap_or_default();
        body.push_str(&format!(
            concat!(
                "<div class=\"comparison-grid\">",
                "<div class=\"payload-box\"><h4>API 1 Response ({}ms)</h4><pre>{}</pre></div>",
                "<div class=\"payload-box\"><h4>API 2 Response ({}ms)</h4><pre>{}</pre></div>",
                "</div>"
            ),
            api1.duration,
            response_text(&api1),
            api2.duration,
            response_text(&api2)
        ));
    }

    body
}

fn response_text(call: &ApiCallResult) -> String {
    PayloadFormatter::format_optional(call.response_payload.as_ref())
}
