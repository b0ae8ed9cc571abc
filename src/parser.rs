//! Turning raw snapshots into documents.
//!
//! The format comes from, in order of precedence: a declared content type
//! (as found in an HTTP `Content-Type` header), the file extension, or
//! sniffing the bytes themselves. JSON bodies wrapped in a JSONP callback
//! are unwrapped. Content that is not recognised as structured becomes a
//! plain-text document with unprintable characters stripped.
//!
//! YAML and TOML are only used when asked for explicitly (by extension);
//! both map onto the same value tree as JSON.
//!
//! # Examples
//!
//! ```
//! use pagediff_rs::parser::parse_content;
//! use pagediff_rs::{Document, DocumentKind};
//!
//! let doc = parse_content("response", br#"callback({"ok": true})"#, Some("application/javascript; charset=utf-8")).unwrap();
//! assert_eq!(doc.kind(), DocumentKind::Text);
//!
//! let doc = parse_content("response", br#"callback({"ok": true})"#, None).unwrap();
//! assert_eq!(doc.kind(), DocumentKind::Json);
//!
//! let doc = parse_content("page", b"<html><body><p>hi</p></body></html>", Some("text/html")).unwrap();
//! assert!(matches!(doc, Document::Xml(_)));
//! ```

use crate::document::Document;
use crate::error::ParseError;
use crate::markup::{parse_html, parse_xml};
use crate::tree::Node;
use indexmap::IndexMap;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

static JSON_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^[\{\[].*[\}\]]$").expect("static regex"));

static JSONP_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^[\w$.]*\s*\((?P<json>[\{\[].*[\}\]])\)\s*;?$").expect("static regex")
});

/// Explicitly requested input format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatHint {
    Json,
    Yaml,
    Toml,
    Xml,
    Html,
    Text,
}

impl FormatHint {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            "xml" | "rss" | "atom" | "svg" | "xhtml" => Some(Self::Xml),
            "html" | "htm" => Some(Self::Html),
            "txt" | "text" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Parses a snapshot file into a document.
///
/// A declared `content_type` wins over the file extension; without either,
/// the bytes are sniffed.
///
/// # Errors
///
/// This function will return an error if:
/// - The file does not exist (`ParseError::FileNotFound`)
/// - The file cannot be read (`ParseError::ReadError`)
/// - The content does not parse as the declared or implied format
pub fn parse_file(path: &Path, content_type: Option<&str>) -> Result<Document, ParseError> {
    let name = path.to_string_lossy().to_string();
    if !path.exists() {
        return Err(ParseError::file_not_found(name));
    }

    let content = fs::read(path).map_err(|e| ParseError::read_error(name.clone(), e))?;

    if content_type.is_some() {
        return parse_content(&name, &content, content_type);
    }

    let hint = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(FormatHint::from_extension);

    match hint {
        Some(hint) => match std::str::from_utf8(&content) {
            Ok(text) => parse_as(&name, text, hint),
            Err(_) => Ok(Document::Text(strip_unprintable(&content))),
        },
        None => parse_content(&name, &content, None),
    }
}

/// Parses raw bytes, using the declared content type when there is one.
///
/// `name` only labels errors and log lines.
pub fn parse_content(
    name: &str,
    content: &[u8],
    content_type: Option<&str>,
) -> Result<Document, ParseError> {
    let declared = content_type.map(mime_essence).filter(|m| !m.is_empty());
    let sniffed = declared.is_none();
    let mime = declared.unwrap_or_else(|| sniff_mime(content).to_string());
    tracing::debug!(
        "{}: content type {} ({})",
        name,
        mime,
        if sniffed { "sniffed" } else { "declared" }
    );

    let Ok(text) = std::str::from_utf8(content) else {
        return Ok(Document::Text(strip_unprintable(content)));
    };

    if mime.contains("json") {
        return parse_as(name, text, FormatHint::Json);
    }
    if mime.contains("html") {
        return parse_as(name, text, FormatHint::Html);
    }
    if mime.contains("xml") {
        return match parse_xml(text) {
            Ok(root) => Ok(Document::Xml(root)),
            // Sniffed markup that is not well-formed is most likely HTML.
            Err(_) if sniffed => parse_as(name, text, FormatHint::Html),
            Err(e) => Err(ParseError::markup_error(name, e.to_string())),
        };
    }
    if mime.starts_with("text/") {
        if let Some(node) = json_body(text).and_then(|body| parse_json(body).ok()) {
            return Ok(Document::Json(node));
        }
        if text.trim_start().starts_with('<') {
            if let Ok(root) = parse_html(text) {
                return Ok(Document::Xml(root));
            }
        }
        return Ok(Document::Text(text.to_string()));
    }

    Ok(Document::Text(strip_unprintable(content)))
}

/// Parses text in a known format.
pub fn parse_as(name: &str, text: &str, hint: FormatHint) -> Result<Document, ParseError> {
    match hint {
        FormatHint::Json => parse_json(json_body(text).unwrap_or(text))
            .map(Document::Json)
            .map_err(|e| ParseError::json_error(name, e)),
        FormatHint::Yaml => parse_yaml(text)
            .map(Document::Json)
            .map_err(|e| ParseError::yaml_error(name, e)),
        FormatHint::Toml => parse_toml(text)
            .map(Document::Json)
            .map_err(|e| ParseError::toml_error(name, e)),
        FormatHint::Xml => parse_xml(text)
            .map(Document::Xml)
            .map_err(|e| ParseError::markup_error(name, e.to_string())),
        FormatHint::Html => parse_html(text)
            .map(Document::Xml)
            .map_err(|e| ParseError::markup_error(name, e.to_string())),
        FormatHint::Text => Ok(Document::Text(text.to_string())),
    }
}

/// The part of a content-type header before any parameters, lowercased.
fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

/// Guesses a MIME type from the bytes alone.
pub fn sniff_mime(content: &[u8]) -> &'static str {
    let Ok(text) = std::str::from_utf8(content) else {
        return "application/octet-stream";
    };
    let trimmed = text.trim_start();
    let head: String = trimmed.chars().take(512).collect::<String>().to_lowercase();

    if json_body(text).is_some() {
        "application/json"
    } else if head.starts_with("<!doctype html") || head.starts_with("<html") {
        "text/html"
    } else if head.starts_with("<?xml") {
        if head.contains("<html") {
            "text/html"
        } else {
            "application/xml"
        }
    } else if head.starts_with('<') {
        "text/xml"
    } else if text.chars().all(|c| !c.is_control() || c.is_whitespace()) {
        "text/plain"
    } else {
        "application/octet-stream"
    }
}

/// The JSON payload of a body: the body itself, or the argument of a JSONP call.
pub fn json_body(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if JSON_BODY.is_match(trimmed) {
        return Some(trimmed);
    }
    JSONP_BODY
        .captures(trimmed)
        .and_then(|caps| caps.name("json"))
        .map(|m| m.as_str())
}

/// Decodes bytes as text, dropping control characters (other than
/// whitespace) and anything that is not valid UTF-8.
pub fn strip_unprintable(content: &[u8]) -> String {
    String::from_utf8_lossy(content)
        .chars()
        .filter(|c| (!c.is_control() || c.is_whitespace()) && *c != char::REPLACEMENT_CHARACTER)
        .collect()
}

/// Parses a JSON string into a Node.
///
/// # Examples
///
/// ```
/// use pagediff_rs::parser::parse_json;
///
/// let json = r#"{"name": "Alice", "age": 30}"#;
/// let node = parse_json(json).unwrap();
/// ```
pub fn parse_json(content: &str) -> Result<Node, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    Ok(json_to_node(value))
}

/// Parses a YAML string into a Node.
pub fn parse_yaml(content: &str) -> Result<Node, serde_yaml::Error> {
    let value: serde_yaml::Value = serde_yaml::from_str(content)?;
    Ok(yaml_to_node(value))
}

/// Parses a TOML document into a Node (always an object at the root).
pub fn parse_toml(content: &str) -> Result<Node, toml::de::Error> {
    let table: toml::Table = toml::from_str(content)?;
    Ok(toml_to_node(toml::Value::Table(table)))
}

fn json_to_node(value: serde_json::Value) -> Node {
    match value {
        serde_json::Value::Null => Node::Null,
        serde_json::Value::Bool(b) => Node::Bool(b),
        serde_json::Value::Number(n) => Node::Number(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::String(s) => Node::String(s),
        serde_json::Value::Array(arr) => Node::Array(arr.into_iter().map(json_to_node).collect()),
        serde_json::Value::Object(obj) => {
            let map: IndexMap<String, Node> =
                obj.into_iter().map(|(k, v)| (k, json_to_node(v))).collect();
            Node::Object(map)
        }
    }
}

/// Converts a serde_yaml::Value to our Node representation.
///
/// Tags are evaluated away and non-string keys are converted to strings.
fn yaml_to_node(value: serde_yaml::Value) -> Node {
    match value {
        serde_yaml::Value::Null => Node::Null,
        serde_yaml::Value::Bool(b) => Node::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                Node::Number(f)
            } else if let Some(i) = n.as_i64() {
                Node::Number(i as f64)
            } else if let Some(u) = n.as_u64() {
                Node::Number(u as f64)
            } else {
                Node::Number(0.0)
            }
        }
        serde_yaml::Value::String(s) => Node::String(s),
        serde_yaml::Value::Sequence(seq) => {
            Node::Array(seq.into_iter().map(yaml_to_node).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let index_map: IndexMap<String, Node> = map
                .into_iter()
                .map(|(k, v)| {
                    let key_str = match k {
                        serde_yaml::Value::String(s) => s,
                        serde_yaml::Value::Number(n) => n.to_string(),
                        serde_yaml::Value::Bool(b) => b.to_string(),
                        serde_yaml::Value::Null => "null".to_string(),
                        other => format!("{:?}", other),
                    };
                    (key_str, yaml_to_node(v))
                })
                .collect();
            Node::Object(index_map)
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_node(tagged.value),
    }
}

fn toml_to_node(value: toml::Value) -> Node {
    match value {
        toml::Value::String(s) => Node::String(s),
        toml::Value::Integer(i) => Node::Number(i as f64),
        toml::Value::Float(f) => Node::Number(f),
        toml::Value::Boolean(b) => Node::Bool(b),
        toml::Value::Datetime(dt) => Node::String(dt.to_string()),
        toml::Value::Array(arr) => Node::Array(arr.into_iter().map(toml_to_node).collect()),
        toml::Value::Table(table) => Node::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_node(v)))
                .collect(),
        ),
    }
}
