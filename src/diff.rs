//! Change detection between two snapshots of a document.
//!
//! Each engine walks the first document (`a`, the baseline) and asks, for
//! every node, whether the same location in the second document (`b`)
//! still holds an equal value. The differing locations are collapsed to
//! the deepest ones (see [`crate::collapse`]) and filtered through the
//! caller's [`ExclusionSet`].
//!
//! Plain text has no locations: the text engine reports the words that
//! were added in `b` instead.
//!
//! # Examples
//!
//! ```
//! use pagediff_rs::{json_diff, parse_json, DiffConfig};
//!
//! let old = parse_json(r#"{"a": {"b": 1}, "c": true}"#).unwrap();
//! let new = parse_json(r#"{"a": {"b": 2}, "c": true}"#).unwrap();
//!
//! let diff = json_diff(&old, &new, &DiffConfig::default()).unwrap();
//! assert_eq!(diff.len(), 1);
//! assert!(diff.contains("a.b"));
//! ```

use crate::collapse::collapse_ancestors;
use crate::document::{Document, DocumentKind};
use crate::error::DiffError;
use crate::filter::ExclusionSet;
use crate::markup::Element;
use crate::path::{flatten, for_each_node, resolve, resolve_element, Location, ROOT};
use crate::tree::Node;
use indexmap::IndexSet;
use similar::{capture_diff_slices, Algorithm, ChangeTag};

/// Reported changes: locations for JSON and XML, added words for text.
///
/// Kept in the order the changes were found, without duplicates.
pub type DiffSet = IndexSet<String>;

pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Configuration for the diff engines.
#[derive(Debug, Clone)]
pub struct DiffConfig {
    /// Previously acknowledged changes to leave out of the result
    pub exclusions: ExclusionSet,
    /// Substrings marking scalar values that vary on every fetch (JSON only)
    pub sign_tokens: Vec<String>,
    /// Documents nesting deeper than this are refused
    pub max_depth: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            exclusions: ExclusionSet::new(),
            sign_tokens: Vec::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DiffConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn with_sign_token(mut self, token: impl Into<String>) -> Self {
        self.sign_tokens.push(token.into());
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Result of dispatching two documents to an engine.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffOutcome<'b> {
    /// Both documents had the same kind; `diff` holds the changes found.
    Changes { kind: DocumentKind, diff: DiffSet },
    /// The documents have different kinds; the whole second document is the report.
    PassThrough(&'b Document),
}

impl DiffOutcome<'_> {
    /// Name of the report kind: the engine that ran, or `passthrough`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DiffOutcome::Changes { kind, .. } => kind.name(),
            DiffOutcome::PassThrough(_) => "passthrough",
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            DiffOutcome::Changes { diff, .. } => diff.is_empty(),
            DiffOutcome::PassThrough(document) => match document {
                Document::Text(text) => text.is_empty(),
                _ => false,
            },
        }
    }
}

/// Compares two documents, picking the engine from their kinds.
///
/// Documents of different kinds cannot be compared position by position,
/// so the second one is passed through whole. An engine failure comes back
/// as `Err` and must not be read as "no changes".
pub fn diff_documents<'b>(
    a: &Document,
    b: &'b Document,
    config: &DiffConfig,
) -> Result<DiffOutcome<'b>, DiffError> {
    let result = match (a, b) {
        (Document::Json(old), Document::Json(new)) => json_diff(old, new, config),
        (Document::Xml(old), Document::Xml(new)) => xml_diff(old, new, config),
        (Document::Text(old), Document::Text(new)) => Ok(text_diff(old, new, config)),
        _ => {
            tracing::debug!(
                "Document kinds differ ({} vs {}), passing second document through",
                a.kind(),
                b.kind()
            );
            return Ok(DiffOutcome::PassThrough(b));
        }
    };

    match result {
        Ok(diff) => Ok(DiffOutcome::Changes {
            kind: a.kind(),
            diff,
        }),
        Err(err) => {
            tracing::warn!("{} diff failed: {}", a.kind(), err);
            Err(err)
        }
    }
}

/// Compares two JSON value trees.
///
/// Every node of `a` is looked up at the same location in `b`. A missing
/// node, a value of another type, or an unequal value is a change, unless
/// the value in `b` is a scalar containing one of the sign tokens. When the
/// roots themselves are not containers of the same kind, they are compared
/// whole and reported as `$`.
pub fn json_diff(a: &Node, b: &Node, config: &DiffConfig) -> Result<DiffSet, DiffError> {
    check_depth(a.depth().max(b.depth()), config)?;

    let mut candidates: Vec<Location> = Vec::new();
    if a.is_container() && a.type_name() == b.type_name() {
        for (value, location) in flatten(a) {
            let other = resolve(b, &location)?;
            if !json_unchanged(value, other, &config.sign_tokens) {
                candidates.push(location);
            }
        }
    } else if !json_unchanged(a, Some(b), &config.sign_tokens) {
        candidates.push(ROOT.to_string());
    }

    Ok(finish(DocumentKind::Json, candidates, &config.exclusions))
}

fn json_unchanged(value: &Node, other: Option<&Node>, sign_tokens: &[String]) -> bool {
    match other {
        Some(other) => value.semantic_equals(other) || is_noise(other, sign_tokens),
        None => false,
    }
}

/// True when `value` is a scalar whose string form contains a sign token.
///
/// Empty tokens are ignored; they would match every value.
pub fn is_noise(value: &Node, sign_tokens: &[String]) -> bool {
    if !value.is_scalar() || sign_tokens.is_empty() {
        return false;
    }
    let text = value.to_string();
    sign_tokens
        .iter()
        .any(|token| !token.is_empty() && text.contains(token.as_str()))
}

/// Compares two element trees.
///
/// Every element of `a` is looked up by its absolute path in `b` and
/// compared by canonical markup. Sign tokens do not apply to markup.
pub fn xml_diff(a: &Element, b: &Element, config: &DiffConfig) -> Result<DiffSet, DiffError> {
    check_depth(a.depth().max(b.depth()), config)?;

    let mut candidates: Vec<Location> = Vec::new();
    for (element, location) in for_each_node(a) {
        match resolve_element(b, &location)? {
            Some(other) if element.canonical_eq(other) => {}
            _ => candidates.push(location),
        }
    }

    Ok(finish(DocumentKind::Xml, candidates, &config.exclusions))
}

/// Compares two texts word by word and returns the words added in `b`.
///
/// Sign tokens are not applied to text.
pub fn text_diff(a: &str, b: &str, config: &DiffConfig) -> DiffSet {
    let old: Vec<&str> = a.split_whitespace().collect();
    let new: Vec<&str> = b.split_whitespace().collect();

    let mut added = DiffSet::new();
    for op in capture_diff_slices(Algorithm::Lcs, &old, &new) {
        for change in op.iter_changes(&old, &new) {
            if change.tag() == ChangeTag::Insert && !config.exclusions.excludes_token(change.value())
            {
                added.insert(change.value().to_string());
            }
        }
    }

    tracing::debug!("text diff: {} added tokens", added.len());
    added
}

fn check_depth(depth: usize, config: &DiffConfig) -> Result<(), DiffError> {
    if depth > config.max_depth {
        return Err(DiffError::TooDeep {
            limit: config.max_depth,
        });
    }
    Ok(())
}

fn finish(kind: DocumentKind, candidates: Vec<Location>, exclusions: &ExclusionSet) -> DiffSet {
    let candidate_count = candidates.len();
    let collapsed = collapse_ancestors(candidates);
    let diff: DiffSet = if exclusions.is_empty() {
        collapsed.into_iter().collect()
    } else {
        collapsed
            .into_iter()
            .filter(|location| !exclusions.excludes_location(location))
            .collect()
    };

    tracing::debug!(
        "{} diff: {} candidates, {} reported after collapsing and exclusions",
        kind,
        candidate_count,
        diff.len()
    );
    diff
}
