//! Rendering diff results as text.
//!
//! [`render`] turns a [`DiffOutcome`] back into the plain report used for
//! alerting: the values now found at the changed locations. [`request_diff`]
//! is the single entry point composing dispatch and rendering.
//! [`format_outcome`] wraps the report for the command line (plain, JSON,
//! or coloured terminal output).
//!
//! # Examples
//!
//! ```
//! use pagediff_rs::{parse_json, request_diff, DiffConfig, Document};
//!
//! let old = Document::Json(parse_json(r#"{"a": {"b": 1}}"#).unwrap());
//! let new = Document::Json(parse_json(r#"{"a": {"b": 2}}"#).unwrap());
//!
//! let report = request_diff(&old, &new, &DiffConfig::default()).unwrap();
//! assert_eq!(report, "2\n");
//! ```

use crate::diff::{diff_documents, DiffConfig, DiffOutcome, DiffSet};
use crate::document::{Document, DocumentKind};
use crate::error::{DiffError, OutputError};
use crate::path::{resolve, resolve_element};
use colored::*;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The bare report, exactly as [`render`] produces it
    Plain,
    /// JSON object with the report kind, the changed locations and the report
    Json,
    /// Coloured, one change per line, with a summary
    Terminal,
}

/// Options for terminal output.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Show full values instead of truncated previews
    pub show_values: bool,
    /// Maximum length for displayed values (truncate if longer)
    pub max_value_length: usize,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            show_values: false,
            max_value_length: 80,
        }
    }
}

/// Diffs two documents and renders the report against the second one.
///
/// Returns an empty string when nothing changed, and `Err` when the diff
/// could not be computed at all.
pub fn request_diff(a: &Document, b: &Document, config: &DiffConfig) -> Result<String, DiffError> {
    let outcome = diff_documents(a, b, config)?;
    Ok(render(&outcome, b))
}

/// Renders a diff outcome as text, reading values from `source`.
///
/// - pass-through: the whole passed-through document, serialized
/// - text: the added words joined by single spaces
/// - XML: every text node under each changed element, one per line; an
///   element missing from `source` or holding no text contributes an empty
///   line
/// - JSON: the value at each changed location followed by a newline; a
///   location missing from `source` contributes an empty line
pub fn render(outcome: &DiffOutcome<'_>, source: &Document) -> String {
    let (kind, diff) = match outcome {
        DiffOutcome::PassThrough(document) => return document.to_text(),
        DiffOutcome::Changes { diff, .. } if diff.is_empty() => return String::new(),
        DiffOutcome::Changes { kind, diff } => (*kind, diff),
    };

    match kind {
        DocumentKind::Text => diff.iter().map(String::as_str).collect::<Vec<_>>().join(" "),
        DocumentKind::Xml => render_xml(diff, source),
        DocumentKind::Json => diff
            .iter()
            .map(|location| render_entry(DocumentKind::Json, location, source) + "\n")
            .collect(),
    }
}

fn render_xml(diff: &DiffSet, source: &Document) -> String {
    let mut report = diff
        .iter()
        .map(|location| render_entry(DocumentKind::Xml, location, source))
        .collect::<Vec<_>>()
        .join("\n");
    // Removed or text-less elements must not read as "no changes".
    if report.is_empty() {
        report.push('\n');
    }
    report
}

/// Renders the contribution of one reported entry. Unresolvable entries render empty.
pub fn render_entry(kind: DocumentKind, entry: &str, source: &Document) -> String {
    match (kind, source) {
        (DocumentKind::Text, _) => entry.to_string(),
        (DocumentKind::Json, Document::Json(root)) => match resolve(root, entry) {
            Ok(Some(value)) => value.to_string(),
            _ => String::new(),
        },
        (DocumentKind::Xml, Document::Xml(root)) => match resolve_element(root, entry) {
            Ok(Some(element)) => element.text_nodes().join("\n"),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

/// Formats a diff outcome according to the specified format and options.
pub fn format_outcome(
    outcome: &DiffOutcome<'_>,
    source: &Document,
    format: &OutputFormat,
    options: &OutputOptions,
) -> Result<String, OutputError> {
    match format {
        OutputFormat::Plain => Ok(render(outcome, source)),
        OutputFormat::Json => format_json(outcome, source),
        OutputFormat::Terminal => Ok(format_terminal(outcome, source, options)),
    }
}

fn format_json(outcome: &DiffOutcome<'_>, source: &Document) -> Result<String, OutputError> {
    use serde_json::json;

    let locations: Vec<&str> = match outcome {
        DiffOutcome::Changes { diff, .. } => diff.iter().map(String::as_str).collect(),
        DiffOutcome::PassThrough(_) => Vec::new(),
    };

    let output = json!({
        "kind": outcome.kind_name(),
        "changed": !outcome.is_empty(),
        "locations": locations,
        "report": render(outcome, source),
    });

    serde_json::to_string_pretty(&output)
        .map_err(|e| OutputError::JsonSerializationError { source: e })
}

/// Formats a diff outcome for terminal output with colors.
///
/// Color scheme:
/// - Changed locations: yellow (bright_yellow for symbols)
/// - Added words: green
/// - Pass-through header: cyan
fn format_terminal(outcome: &DiffOutcome<'_>, source: &Document, options: &OutputOptions) -> String {
    if outcome.is_empty() {
        return "No changes detected.".dimmed().to_string();
    }

    let mut output = String::new();
    match outcome {
        DiffOutcome::PassThrough(document) => {
            output.push_str(
                &"Document kind changed, showing the whole new snapshot:"
                    .cyan()
                    .to_string(),
            );
            output.push('\n');
            output.push_str(&document.to_text());
            output.push('\n');
        }
        DiffOutcome::Changes { kind, diff } => {
            for entry in diff {
                output.push_str(&format_change_terminal(*kind, entry, source, options));
                output.push('\n');
            }
            output.push('\n');
            output.push_str(&format_summary(*kind, diff.len()));
        }
    }
    output
}

fn format_change_terminal(
    kind: DocumentKind,
    entry: &str,
    source: &Document,
    options: &OutputOptions,
) -> String {
    if kind == DocumentKind::Text {
        return format!("{} {}", "+".bright_green(), entry.green());
    }

    let value = match (kind, source) {
        (DocumentKind::Json, Document::Json(root)) => match resolve(root, entry) {
            Ok(Some(node)) if options.show_values => node.to_string(),
            Ok(Some(node)) => node.preview(options.max_value_length),
            _ => String::new(),
        },
        _ => {
            let value = render_entry(kind, entry, source).replace('\n', " ");
            if options.show_values {
                value
            } else {
                truncate(&value, options.max_value_length)
            }
        }
    };
    format!("{} {}: {}", "•".bright_yellow(), entry.yellow(), value)
}

fn truncate(value: &str, max_len: usize) -> String {
    if value.chars().count() > max_len {
        let kept: String = value.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        value.to_string()
    }
}

fn format_summary(kind: DocumentKind, count: usize) -> String {
    let noun = match (kind, count) {
        (DocumentKind::Text, 1) => "added word",
        (DocumentKind::Text, _) => "added words",
        (_, 1) => "changed location",
        (_, _) => "changed locations",
    };
    format!("Summary: {} {} ({})", count, noun, kind)
}
