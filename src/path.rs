//! Locations: string addresses of nodes inside a document.
//!
//! JSON locations are JSONPath-style: `items[0].name`, with keys that
//! contain special characters wrapped in double quotes (`meta."last seen"`).
//! The document root itself is addressed as `$`.
//!
//! XML locations are absolute element paths in the style of a canonical
//! XPath: `/html/body/div[2]/p`. The `[n]` ordinal (1-based) is only
//! written when a parent has more than one child element with that tag.
//!
//! Every location produced here resolves back to the node it came from.
//!
//! # Examples
//!
//! ```
//! use pagediff_rs::parser::parse_json;
//! use pagediff_rs::path::{flatten, resolve};
//!
//! let doc = parse_json(r#"{"a": {"b": [10, 20]}}"#).unwrap();
//! let locations: Vec<String> = flatten(&doc).map(|(_, location)| location).collect();
//! assert_eq!(locations, vec!["a", "a.b", "a.b[0]", "a.b[1]"]);
//!
//! let value = resolve(&doc, "a.b[1]").unwrap().unwrap();
//! assert_eq!(value.to_string(), "20");
//! ```

use crate::error::PathError;
use crate::markup::Element;
use crate::tree::Node;
use std::borrow::Cow;
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::CharIndices;

/// A string address of a node (see the module docs for the two syntaxes).
pub type Location = String;

/// Location of the root of a JSON document.
pub const ROOT: &str = "$";

/// One step of a parsed JSON location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

fn needs_quotes(key: &str) -> bool {
    key.is_empty()
        || key.starts_with(['$', '/'])
        || key
            .chars()
            .any(|c| matches!(c, '[' | ']' | '"' | '\'' | '.' | '\\') || c.is_whitespace())
}

/// Renders an object key as a location segment, quoting it when needed.
pub fn quote_key(key: &str) -> Cow<'_, str> {
    if !needs_quotes(key) {
        return Cow::Borrowed(key);
    }
    let mut quoted = String::with_capacity(key.len() + 2);
    quoted.push('"');
    for c in key.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    Cow::Owned(quoted)
}

/// Location of an object member below `parent` (`""` for the root).
pub fn child_key(parent: &str, key: &str) -> Location {
    if parent.is_empty() {
        quote_key(key).into_owned()
    } else {
        format!("{}.{}", parent, quote_key(key))
    }
}

/// Location of an array element below `parent` (`""` for the root).
pub fn child_index(parent: &str, index: usize) -> Location {
    format!("{}[{}]", parent, index)
}

/// Lazy pre-order traversal of a JSON tree, yielding every node below the
/// root together with its location. Containers come before their children.
pub struct Flatten<'a> {
    stack: Vec<(&'a Node, Location)>,
}

impl<'a> Flatten<'a> {
    fn push_children(&mut self, node: &'a Node, location: &str) {
        match node {
            Node::Object(map) => {
                for (key, value) in map.iter().rev() {
                    self.stack.push((value, child_key(location, key)));
                }
            }
            Node::Array(items) => {
                for (index, value) in items.iter().enumerate().rev() {
                    self.stack.push((value, child_index(location, index)));
                }
            }
            _ => {}
        }
    }
}

impl<'a> Iterator for Flatten<'a> {
    type Item = (&'a Node, Location);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, location) = self.stack.pop()?;
        self.push_children(node, &location);
        Some((node, location))
    }
}

pub fn flatten(root: &Node) -> Flatten<'_> {
    let mut flatten = Flatten { stack: Vec::new() };
    flatten.push_children(root, "");
    flatten
}

/// Parses a JSON location into its segments. `$` (or `""`) is the root.
pub fn parse_location(location: &str) -> Result<Vec<Segment>, PathError> {
    let mut segments = Vec::new();
    let body = location.strip_prefix(ROOT).unwrap_or(location);
    let mut chars = body.char_indices().peekable();
    let mut first = location.len() == body.len();

    while let Some(&(_, c)) = chars.peek() {
        match c {
            '[' => {
                chars.next();
                segments.push(Segment::Index(read_index(location, &mut chars)?));
            }
            '.' => {
                chars.next();
                segments.push(Segment::Key(read_key(location, body, &mut chars)?));
            }
            _ if first => {
                segments.push(Segment::Key(read_key(location, body, &mut chars)?));
            }
            _ => {
                return Err(PathError::malformed(
                    location,
                    format!("unexpected character {:?}", c),
                ))
            }
        }
        first = false;
    }
    Ok(segments)
}

fn read_index(location: &str, chars: &mut Peekable<CharIndices<'_>>) -> Result<usize, PathError> {
    let mut digits = String::new();
    loop {
        match chars.next() {
            Some((_, ']')) => break,
            Some((_, c)) if c.is_ascii_digit() => digits.push(c),
            Some((_, c)) => {
                return Err(PathError::malformed(
                    location,
                    format!("invalid character {:?} in index", c),
                ))
            }
            None => return Err(PathError::malformed(location, "unterminated index")),
        }
    }
    digits
        .parse()
        .map_err(|_| PathError::malformed(location, "empty or oversized index"))
}

fn read_key(
    location: &str,
    body: &str,
    chars: &mut Peekable<CharIndices<'_>>,
) -> Result<String, PathError> {
    if let Some(&(_, '"')) = chars.peek() {
        chars.next();
        let mut key = String::new();
        loop {
            match chars.next() {
                Some((_, '\\')) => match chars.next() {
                    Some((_, escaped)) => key.push(escaped),
                    None => return Err(PathError::malformed(location, "dangling escape")),
                },
                Some((_, '"')) => break,
                Some((_, c)) => key.push(c),
                None => return Err(PathError::malformed(location, "unterminated quoted key")),
            }
        }
        return match chars.peek() {
            None | Some((_, '.')) | Some((_, '[')) => Ok(key),
            Some(&(_, c)) => Err(PathError::malformed(
                location,
                format!("unexpected character {:?} after quoted key", c),
            )),
        };
    }

    let start = chars.peek().map(|&(i, _)| i).unwrap_or(body.len());
    let mut end = body.len();
    while let Some(&(i, c)) = chars.peek() {
        if c == '.' || c == '[' {
            end = i;
            break;
        }
        chars.next();
    }
    if start == end {
        return Err(PathError::malformed(location, "empty key"));
    }
    Ok(body[start..end].to_string())
}

/// Point query: the node at `location`, or `None` when it does not exist.
pub fn resolve<'a>(root: &'a Node, location: &str) -> Result<Option<&'a Node>, PathError> {
    let mut current = root;
    for segment in parse_location(location)? {
        let next = match (&segment, current) {
            (Segment::Key(key), Node::Object(map)) => map.get(key),
            (Segment::Index(index), Node::Array(items)) => items.get(*index),
            _ => None,
        };
        match next {
            Some(node) => current = node,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

/// Document-order traversal of an element tree, yielding every element
/// (the root included) with its absolute location.
pub struct ElementNodes<'a> {
    stack: Vec<(&'a Element, Location)>,
}

impl<'a> Iterator for ElementNodes<'a> {
    type Item = (&'a Element, Location);

    fn next(&mut self) -> Option<Self::Item> {
        let (element, location) = self.stack.pop()?;

        let mut totals: HashMap<&str, usize> = HashMap::new();
        for child in element.child_elements() {
            *totals.entry(child.tag.as_str()).or_default() += 1;
        }
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut children = Vec::new();
        for child in element.child_elements() {
            let ordinal = seen.entry(child.tag.as_str()).or_default();
            *ordinal += 1;
            let child_location = if totals[child.tag.as_str()] > 1 {
                format!("{}/{}[{}]", location, child.tag, ordinal)
            } else {
                format!("{}/{}", location, child.tag)
            };
            children.push((child, child_location));
        }
        self.stack.extend(children.into_iter().rev());

        Some((element, location))
    }
}

pub fn for_each_node(root: &Element) -> ElementNodes<'_> {
    ElementNodes {
        stack: vec![(root, format!("/{}", root.tag))],
    }
}

/// Finds the element addressed by an absolute element path.
pub fn resolve_element<'a>(
    root: &'a Element,
    location: &str,
) -> Result<Option<&'a Element>, PathError> {
    let Some(body) = location.strip_prefix('/') else {
        return Err(PathError::malformed(location, "element path must start with '/'"));
    };

    let mut steps = Vec::new();
    for step in body.split('/') {
        steps.push(parse_step(location, step)?);
    }

    let mut steps = steps.into_iter();
    match steps.next() {
        Some((tag, ordinal)) if tag == root.tag && ordinal <= 1 => {}
        _ => return Ok(None),
    }

    let mut current = root;
    for (tag, ordinal) in steps {
        let next = current
            .child_elements()
            .filter(|child| child.tag == tag)
            .nth(ordinal.saturating_sub(1));
        match next {
            Some(element) => current = element,
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

/// Splits `tag[n]` into the tag and its 1-based ordinal (`0` when absent).
fn parse_step<'s>(location: &str, step: &'s str) -> Result<(&'s str, usize), PathError> {
    let (tag, ordinal) = match step.split_once('[') {
        Some((tag, rest)) => {
            let digits = rest
                .strip_suffix(']')
                .ok_or_else(|| PathError::malformed(location, "unterminated ordinal"))?;
            let ordinal: usize = digits
                .parse()
                .map_err(|_| PathError::malformed(location, "invalid ordinal"))?;
            if ordinal == 0 {
                return Err(PathError::malformed(location, "ordinals start at 1"));
            }
            (tag, ordinal)
        }
        None => (step, 0),
    };
    if tag.is_empty() {
        return Err(PathError::malformed(location, "empty element name"));
    }
    Ok((tag, ordinal))
}
