//! Element trees for XML and HTML documents.
//!
//! Parsing is built on `quick-xml`'s pull reader. XML is parsed strictly
//! (one root, balanced tags); HTML is parsed leniently: void elements close
//! themselves, stray end tags are dropped, unclosed elements are closed at
//! end of input, and several top-level elements are wrapped in a synthetic
//! `<html>` root.
//!
//! Whitespace-only text is discarded and surrounding whitespace trimmed, so
//! indentation changes never register as differences.

use crate::error::MarkupError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::fmt::Write as _;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

const ESCAPABLE_RAW_TEXT_ELEMENTS: &[&str] = &["textarea", "title"];

/// A child of an element: either a nested element or a run of text.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Element(Element),
    Text(String),
}

/// A named element with attributes (in document order) and ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Content>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Content::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Content::Text(text.into()));
        self
    }

    /// Child elements in document order, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|child| match child {
            Content::Element(element) => Some(element),
            Content::Text(_) => None,
        })
    }

    /// Nesting depth of the element tree; an element without child elements has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((element, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(element.child_elements().map(|child| (child, depth + 1)));
        }
        deepest
    }

    /// Attributes sorted by name, the canonical order used for serialization.
    pub fn sorted_attributes(&self) -> Vec<(&str, &str)> {
        let mut attributes: Vec<(&str, &str)> = self
            .attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect();
        attributes.sort();
        attributes
    }

    /// Every text node under this element, in document order.
    pub fn text_nodes(&self) -> Vec<&str> {
        let mut texts = Vec::new();
        let mut stack: Vec<&Content> = self.children.iter().rev().collect();
        while let Some(content) = stack.pop() {
            match content {
                Content::Text(text) => texts.push(text.as_str()),
                Content::Element(element) => stack.extend(element.children.iter().rev()),
            }
        }
        texts
    }

    /// Canonical markup: attributes sorted by name, text and attribute values escaped.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in self.sorted_attributes() {
            let _ = write!(out, " {}=\"{}\"", name, quick_xml::escape::escape(value));
        }
        out.push('>');
        for child in &self.children {
            match child {
                Content::Element(element) => element.write_markup(out),
                Content::Text(text) => out.push_str(&quick_xml::escape::escape(text.as_str())),
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }

    /// Equality of canonical markup, without building the strings.
    ///
    /// `a.canonical_eq(&b)` holds exactly when `a.to_markup() == b.to_markup()`.
    pub fn canonical_eq(&self, other: &Element) -> bool {
        self.tag == other.tag
            && self.sorted_attributes() == other.sorted_attributes()
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(other.children.iter())
                .all(|pair| match pair {
                    (Content::Element(a), Content::Element(b)) => a.canonical_eq(b),
                    (Content::Text(a), Content::Text(b)) => a == b,
                    _ => false,
                })
    }
}

/// Parses a well-formed XML document into its root element.
pub fn parse_xml(content: &str) -> Result<Element, MarkupError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut builder = TreeBuilder::new(false);
    loop {
        let event = reader
            .read_event()
            .map_err(|e| syntax_error(e, reader.buffer_position()))?;
        match event {
            Event::Start(start) => builder.open(element_from(&start, false)?),
            Event::Empty(start) => builder.open_and_close(element_from(&start, false)?),
            Event::End(end) => builder.close(&String::from_utf8_lossy(end.name().as_ref()))?,
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| syntax_error(e, reader.buffer_position()))?;
                builder.text(&text);
            }
            Event::CData(data) => builder.text(&String::from_utf8_lossy(&data.into_inner())),
            Event::Eof => break,
            _ => {}
        }
    }
    builder.finish()
}

/// Parses HTML (or tag soup) into an element tree.
///
/// The bodies of raw-text elements (`script`, `style`, `textarea`, `title`)
/// are kept as a single text node instead of being read as markup. Tags whose
/// names could not be addressed by an element path are dropped, their
/// content kept in place.
pub fn parse_html(content: &str) -> Result<Element, MarkupError> {
    let mut reader = html_reader(content);
    let mut offset = 0;

    let mut builder = TreeBuilder::new(true);
    loop {
        let event = reader
            .read_event()
            .map_err(|e| syntax_error(e, offset + reader.buffer_position() as usize))?;
        match event {
            Event::Start(start) => {
                let element = element_from(&start, true)?;
                if !is_addressable(&element.tag) {
                    continue;
                }
                if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                    builder.open_and_close(element);
                } else if RAW_TEXT_ELEMENTS.contains(&element.tag.as_str()) {
                    let body_start = offset + reader.buffer_position() as usize;
                    let (body, resume) = raw_text(content, body_start, &element.tag);
                    let tag = element.tag.clone();
                    let text = if ESCAPABLE_RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
                        quick_xml::escape::unescape(body).unwrap_or(Cow::Borrowed(body))
                    } else {
                        Cow::Borrowed(body)
                    };
                    builder.open(element);
                    builder.text(text.trim());
                    builder.close(&tag)?;

                    // The reader cannot skip ahead, so parsing resumes on a fresh one.
                    offset = resume;
                    reader = html_reader(&content[offset..]);
                } else {
                    builder.open(element);
                }
            }
            Event::Empty(start) => {
                let element = element_from(&start, true)?;
                if is_addressable(&element.tag) {
                    builder.open_and_close(element);
                }
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).to_lowercase();
                builder.close(&name)?;
            }
            Event::Text(text) => {
                // Named HTML entities such as &nbsp; are not XML escapes.
                let text = text
                    .unescape()
                    .unwrap_or_else(|_| Cow::Owned(String::from_utf8_lossy(&text).into_owned()));
                builder.text(&text);
            }
            Event::CData(data) => builder.text(&String::from_utf8_lossy(&data.into_inner())),
            Event::Eof => break,
            _ => {}
        }
    }
    builder.finish()
}

fn html_reader(input: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(input);
    let config = reader.config_mut();
    config.trim_text(true);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    reader
}

/// Body of a raw-text element starting at byte `from`, and the byte just past
/// its closing tag. An unclosed element runs to the end of the input.
fn raw_text<'a>(content: &'a str, from: usize, tag: &str) -> (&'a str, usize) {
    let rest = &content[from..];
    let lowered = rest.to_ascii_lowercase();
    let closing = format!("</{}", tag);

    let mut search = 0;
    while let Some(found) = lowered[search..].find(&closing) {
        let end = search + found;
        let after = end + closing.len();
        match lowered.as_bytes().get(after) {
            Some(b'>') | Some(b'/') | None => {}
            Some(c) if c.is_ascii_whitespace() => {}
            Some(_) => {
                search = after;
                continue;
            }
        }
        let resume = lowered[after..].find('>').map_or(rest.len(), |i| after + i + 1);
        return (&rest[..end], from + resume);
    }
    (rest, content.len())
}

/// Element names end up as steps of an element path, where `[`, `]` and `/`
/// are delimiters.
fn is_addressable(tag: &str) -> bool {
    !tag.is_empty() && !tag.contains(['[', ']', '/'])
}

fn syntax_error(err: impl std::fmt::Display, position: impl std::fmt::Display) -> MarkupError {
    MarkupError::Syntax(format!("{} at byte {}", err, position))
}

fn element_from(start: &BytesStart<'_>, html: bool) -> Result<Element, MarkupError> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    if !html && !is_addressable(&name) {
        return Err(MarkupError::Syntax(format!("invalid element name <{}>", name)));
    }
    let mut element = Element::new(if html { name.to_lowercase() } else { name });

    if html {
        for attribute in start.html_attributes().flatten() {
            let key = String::from_utf8_lossy(attribute.key.as_ref()).to_lowercase();
            let value = attribute
                .unescape_value()
                .map(Cow::into_owned)
                .unwrap_or_else(|_| String::from_utf8_lossy(&attribute.value).into_owned());
            element.attributes.push((key, value));
        }
    } else {
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| MarkupError::Syntax(e.to_string()))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| MarkupError::Syntax(e.to_string()))?
                .into_owned();
            element.attributes.push((key, value));
        }
    }
    Ok(element)
}

struct TreeBuilder {
    html: bool,
    open: Vec<Element>,
    top_level: Vec<Content>,
}

impl TreeBuilder {
    fn new(html: bool) -> Self {
        Self {
            html,
            open: Vec::new(),
            top_level: Vec::new(),
        }
    }

    fn open(&mut self, element: Element) {
        self.open.push(element);
    }

    fn open_and_close(&mut self, element: Element) {
        self.attach(element);
    }

    fn close(&mut self, name: &str) -> Result<(), MarkupError> {
        if self.html {
            // Implicitly close everything opened after the matching element.
            let Some(position) = self.open.iter().rposition(|e| e.tag == name) else {
                return Ok(());
            };
            while self.open.len() > position {
                self.close_top();
            }
            return Ok(());
        }

        match self.open.last() {
            Some(top) if top.tag == name => {
                self.close_top();
                Ok(())
            }
            Some(top) => Err(MarkupError::MismatchedTag {
                expected: top.tag.clone(),
                found: name.to_string(),
            }),
            None => Err(MarkupError::Syntax(format!("unexpected closing tag </{}>", name))),
        }
    }

    fn close_top(&mut self) {
        if let Some(element) = self.open.pop() {
            self.attach(element);
        }
    }

    fn attach(&mut self, element: Element) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(Content::Element(element)),
            None => self.top_level.push(Content::Element(element)),
        }
    }

    fn text(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        match self.open.last_mut() {
            Some(parent) => parent.children.push(Content::Text(text.to_string())),
            // Text outside the root only survives in HTML, under the synthetic root.
            None if self.html => self.top_level.push(Content::Text(text.to_string())),
            None => {}
        }
    }

    fn finish(mut self) -> Result<Element, MarkupError> {
        if self.html {
            while !self.open.is_empty() {
                self.close_top();
            }
        } else if let Some(unclosed) = self.open.last() {
            return Err(MarkupError::Unclosed(unclosed.tag.clone()));
        }

        let element_count = self
            .top_level
            .iter()
            .filter(|c| matches!(c, Content::Element(_)))
            .count();

        if self.top_level.is_empty() {
            return Err(MarkupError::NoRoot);
        }
        if element_count == 1 && self.top_level.len() == 1 {
            if let Some(Content::Element(root)) = self.top_level.pop() {
                return Ok(root);
            }
        }
        if !self.html {
            return Err(if element_count == 0 {
                MarkupError::NoRoot
            } else {
                MarkupError::MultipleRoots
            });
        }

        let mut root = Element::new("html");
        root.children = self.top_level;
        Ok(root)
    }
}
