//! Exclusion of acknowledged changes from diff results.
//!
//! An [`ExclusionSet`] holds exact entries (locations, or tokens for text
//! documents) and optional glob-style patterns matched against location
//! segments.
//!
//! # Pattern Syntax
//!
//! - `foo` - matches literal segment "foo"
//! - `*` - matches any single path segment
//! - `[*]` - matches any single array index or element ordinal
//! - `**` - matches any number of path segments (including zero)
//! - `foo.bar` / `/foo/bar` - matches nested JSON / XML paths
//! - `**.timestamp` - matches "timestamp" at any depth
//!
//! # Examples
//!
//! ```
//! use pagediff_rs::filter::{ExclusionSet, PathPattern};
//!
//! let pattern = PathPattern::parse("**.timestamp");
//! assert!(pattern.matches("meta.timestamp"));
//! assert!(pattern.matches("items[3].timestamp"));
//!
//! let exclusions = ExclusionSet::new().exclude("a.b").ignore("/html/head/**");
//! assert!(exclusions.excludes_location("a.b"));
//! assert!(exclusions.excludes_location("/html/head/title"));
//! assert!(!exclusions.excludes_location("a.c"));
//! ```

use std::collections::HashSet;

/// A single segment in a path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    /// Matches an exact segment
    Literal(String),
    /// Matches any single path segment (*)
    SingleWildcard,
    /// Matches any single index segment ([*])
    IndexWildcard,
    /// Matches any number of path segments (**)
    DoubleWildcard,
}

/// Splits a location into its segments.
///
/// Separators are `.` and `/`; a bracketed index is a segment of its own
/// (kept with its brackets), and quoted keys are kept verbatim.
pub fn split_segments(location: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = location.chars();

    while let Some(c) = chars.next() {
        match c {
            '.' | '/' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
                current.push('[');
                for inner in chars.by_ref() {
                    current.push(inner);
                    if inner == ']' {
                        break;
                    }
                }
                segments.push(std::mem::take(&mut current));
            }
            '"' => {
                current.push('"');
                let mut escaped = false;
                for inner in chars.by_ref() {
                    current.push(inner);
                    match inner {
                        '\\' if !escaped => escaped = true,
                        '"' if !escaped => break,
                        _ => escaped = false,
                    }
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// A compiled path pattern for matching against locations.
#[derive(Debug, Clone)]
pub struct PathPattern {
    pub segments: Vec<PatternSegment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = split_segments(pattern)
            .into_iter()
            .map(|s| match s.as_str() {
                "**" => PatternSegment::DoubleWildcard,
                "*" => PatternSegment::SingleWildcard,
                "[*]" => PatternSegment::IndexWildcard,
                _ => PatternSegment::Literal(s),
            })
            .collect();
        Self { segments }
    }

    pub fn matches(&self, location: &str) -> bool {
        self.matches_segments(&split_segments(location))
    }

    pub fn matches_segments(&self, path: &[String]) -> bool {
        self.matches_recursive(&self.segments, path)
    }

    fn matches_recursive(&self, pattern: &[PatternSegment], path: &[String]) -> bool {
        match (pattern.first(), path.first()) {
            (None, None) => true,
            (None, Some(_)) => false,
            (Some(_seg), None) => pattern
                .iter()
                .all(|s| matches!(s, PatternSegment::DoubleWildcard)),
            (Some(seg), Some(path_seg)) => match seg {
                PatternSegment::Literal(lit) => {
                    if lit == path_seg {
                        self.matches_recursive(&pattern[1..], &path[1..])
                    } else {
                        false
                    }
                }
                PatternSegment::SingleWildcard => self.matches_recursive(&pattern[1..], &path[1..]),
                PatternSegment::IndexWildcard => {
                    path_seg.starts_with('[')
                        && self.matches_recursive(&pattern[1..], &path[1..])
                }
                PatternSegment::DoubleWildcard => {
                    self.matches_recursive(&pattern[1..], path)
                        || self.matches_recursive(pattern, &path[1..])
                }
            },
        }
    }
}

/// Caller-supplied changes to suppress from a diff result.
///
/// Exact entries apply to every document kind (locations for JSON and XML,
/// tokens for text). Patterns only apply to locations.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    entries: HashSet<String>,
    patterns: Vec<PathPattern>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude(mut self, entry: impl Into<String>) -> Self {
        self.insert(entry);
        self
    }

    pub fn ignore(mut self, pattern: &str) -> Self {
        self.add_pattern(pattern);
        self
    }

    pub fn insert(&mut self, entry: impl Into<String>) {
        self.entries.insert(entry.into());
    }

    pub fn add_pattern(&mut self, pattern: &str) {
        self.patterns.push(PathPattern::parse(pattern));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len() + self.patterns.len()
    }

    pub fn excludes_location(&self, location: &str) -> bool {
        if self.entries.contains(location) {
            return true;
        }
        if self.patterns.is_empty() {
            return false;
        }
        let segments = split_segments(location);
        self.patterns.iter().any(|p| p.matches_segments(&segments))
    }

    pub fn excludes_token(&self, token: &str) -> bool {
        self.entries.contains(token)
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for ExclusionSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for entry in iter {
            self.insert(entry);
        }
    }
}
