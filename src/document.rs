//! Parsed snapshots of a resource.

use crate::markup::Element;
use crate::tree::Node;
use std::fmt;

/// The three document shapes the diff engines understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Json,
    Xml,
    Text,
}

impl DocumentKind {
    pub fn name(&self) -> &'static str {
        match self {
            DocumentKind::Json => "json",
            DocumentKind::Xml => "xml",
            DocumentKind::Text => "text",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One parsed snapshot: a JSON value tree, an element tree, or plain text.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Json(Node),
    Xml(Element),
    Text(String),
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Json(_) => DocumentKind::Json,
            Document::Xml(_) => DocumentKind::Xml,
            Document::Text(_) => DocumentKind::Text,
        }
    }

    /// Serializes the whole document: markup for element trees, compact
    /// JSON for value trees, text as-is.
    pub fn to_text(&self) -> String {
        match self {
            Document::Json(node) => node.to_json().to_string(),
            Document::Xml(root) => root.to_markup(),
            Document::Text(text) => text.clone(),
        }
    }
}

impl From<Node> for Document {
    fn from(node: Node) -> Self {
        Document::Json(node)
    }
}

impl From<Element> for Document {
    fn from(element: Element) -> Self {
        Document::Xml(element)
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Document::Text(text)
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Document::Text(text.to_string())
    }
}
