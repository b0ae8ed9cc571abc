//! Value tree for JSON-like documents.

use indexmap::IndexMap;
use std::fmt;

/// A node in a JSON value tree (also produced from YAML and TOML input).
///
/// Object keys keep their document order so that traversal, and therefore
/// the order of reported locations, follows the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Object(IndexMap<String, Node>),
    Array(Vec<Node>),
}

impl Node {
    pub fn type_name(&self) -> &str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "boolean",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Object(_) => "object",
            Node::Array(_) => "array",
        }
    }

    /// True for objects and arrays.
    pub fn is_container(&self) -> bool {
        matches!(self, Node::Object(_) | Node::Array(_))
    }

    /// True for values that have a meaningful string form for noise matching.
    ///
    /// `null` is deliberately not a scalar here: it carries no text a sign
    /// token could match.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Node::Bool(_) | Node::Number(_) | Node::String(_))
    }

    /// Checks if two nodes are semantically equal (ignores key ordering, uses epsilon for floats).
    pub fn semantic_equals(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Null, Node::Null) => true,
            (Node::Bool(a), Node::Bool(b)) => a == b,
            (Node::String(a), Node::String(b)) => a == b,
            (Node::Number(a), Node::Number(b)) => {
                const EPSILON: f64 = 1e-10;
                (a - b).abs() < EPSILON
            }
            (Node::Object(a), Node::Object(b)) => {
                if a.len() != b.len() {
                    return false;
                }
                a.iter()
                    .all(|(key, value)| b.get(key).is_some_and(|v| value.semantic_equals(v)))
            }
            (Node::Array(a), Node::Array(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|(item_a, item_b)| item_a.semantic_equals(item_b))
            }
            _ => false,
        }
    }

    /// Nesting depth of the tree; a scalar has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            match node {
                Node::Object(map) => stack.extend(map.values().map(|v| (v, depth + 1))),
                Node::Array(items) => stack.extend(items.iter().map(|v| (v, depth + 1))),
                _ => {}
            }
        }
        deepest
    }

    /// Returns a short preview of the node's value, truncated to max_len.
    pub fn preview(&self, max_len: usize) -> String {
        let preview = match self {
            Node::String(s) => format!("\"{}\"", s),
            Node::Object(map) => match map.len() {
                0 => "{}".to_string(),
                1 => "{ 1 key }".to_string(),
                count => format!("{{ {} keys }}", count),
            },
            Node::Array(arr) => match arr.len() {
                0 => "[]".to_string(),
                1 => "[ 1 item ]".to_string(),
                count => format!("[ {} items ]", count),
            },
            other => other.to_string(),
        };

        if preview.chars().count() > max_len {
            let kept: String = preview.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", kept)
        } else {
            preview
        }
    }

    /// Converts the node back into a `serde_json::Value`.
    ///
    /// Integral numbers are emitted as integers so that `2` does not come
    /// back as `2.0`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => match as_integer(*n) {
                Some(i) => Value::from(i),
                None => serde_json::Number::from_f64(*n)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
            },
            Node::String(s) => Value::String(s.clone()),
            Node::Array(arr) => Value::Array(arr.iter().map(Node::to_json).collect()),
            Node::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// String form of a node: strings verbatim, everything else as compact JSON.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::String(s) => f.write_str(s),
            Node::Number(n) => match as_integer(*n) {
                Some(i) => write!(f, "{}", i),
                None => write!(f, "{}", n),
            },
            other => write!(f, "{}", other.to_json()),
        }
    }
}

fn as_integer(n: f64) -> Option<i64> {
    // Beyond 2^53 an f64 no longer holds every integer exactly.
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_EXACT {
        Some(n as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scalars() {
        assert_eq!(Node::Number(2.0).to_string(), "2");
        assert_eq!(Node::Number(2.5).to_string(), "2.5");
        assert_eq!(Node::String("plain".to_string()).to_string(), "plain");
        assert_eq!(Node::Bool(false).to_string(), "false");
        assert_eq!(Node::Null.to_string(), "null");
    }

    #[test]
    fn test_display_containers_as_json() {
        let mut map = IndexMap::new();
        map.insert("b".to_string(), Node::Number(1.0));
        map.insert("a".to_string(), Node::String("x".to_string()));
        assert_eq!(Node::Object(map).to_string(), r#"{"b":1,"a":"x"}"#);
    }

    #[test]
    fn test_semantic_equals_ignores_key_order() {
        let mut first = IndexMap::new();
        first.insert("a".to_string(), Node::Number(1.0));
        first.insert("b".to_string(), Node::Number(2.0));
        let mut second = IndexMap::new();
        second.insert("b".to_string(), Node::Number(2.0));
        second.insert("a".to_string(), Node::Number(1.0));
        assert!(Node::Object(first).semantic_equals(&Node::Object(second)));
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let node = Node::String("ééééééééé".to_string());
        let preview = node.preview(6);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 6);
    }
}
