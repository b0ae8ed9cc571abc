//! Ancestor collapsing of candidate locations.
//!
//! The engines emit candidates during a single pre-order pass, so an
//! ancestor is always followed directly by its first differing descendant.
//! Collapsing keeps only the deepest entry of each such chain. Only
//! adjacent entries are compared: branches that merely share a prefix
//! somewhere else in the list are left alone.

use crate::path::Location;

/// True when `ancestor` addresses a node above `descendant`.
///
/// The prefix must end on a segment boundary. For element paths (leading
/// `/`) that is a `/` only, since `div[2]` is a sibling of `div`, not a
/// child. For JSON locations it is `.` or `[`, so `a` is an ancestor of
/// `a.b` and `a[0]` but not of `ab` or `a/b`.
pub fn is_ancestor(ancestor: &str, descendant: &str) -> bool {
    if descendant.len() <= ancestor.len() || !descendant.starts_with(ancestor) {
        return false;
    }
    let boundary = descendant.as_bytes()[ancestor.len()];
    if ancestor.starts_with('/') {
        boundary == b'/'
    } else {
        matches!(boundary, b'.' | b'[')
    }
}

/// Drops every candidate that is an ancestor of the candidate right after it.
///
/// Works as a stack: each incoming location pops the ancestors waiting on
/// top of the stack before being pushed itself. Duplicates collapse into
/// the first occurrence.
pub fn collapse_ancestors<I>(candidates: I) -> Vec<Location>
where
    I: IntoIterator<Item = Location>,
{
    let mut stack: Vec<Location> = Vec::new();
    for candidate in candidates {
        while stack
            .last()
            .is_some_and(|top| is_ancestor(top, &candidate))
        {
            stack.pop();
        }
        if stack.last() != Some(&candidate) {
            stack.push(candidate);
        }
    }
    stack
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations(items: &[&str]) -> Vec<Location> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_is_ancestor_boundaries() {
        assert!(is_ancestor("a", "a.b"));
        assert!(is_ancestor("a", "a[0]"));
        assert!(is_ancestor("/html/body", "/html/body/div"));
        assert!(!is_ancestor("a", "ab"));
        assert!(!is_ancestor("a[1]", "a[10]"));
        assert!(!is_ancestor("a", "a"));
    }

    #[test]
    fn test_is_ancestor_indexed_sibling_elements() {
        assert!(!is_ancestor("/html/body/div", "/html/body/div[2]"));
        assert!(is_ancestor("/html/body/div[2]", "/html/body/div[2]/p"));
        assert!(!is_ancestor("a", "a/b"));
    }

    #[test]
    fn test_collapse_keeps_indexed_sibling_element() {
        let collapsed = collapse_ancestors(locations(&["/r/div", "/r/div[2]"]));
        assert_eq!(collapsed, locations(&["/r/div", "/r/div[2]"]));
    }

    #[test]
    fn test_collapse_chain() {
        let collapsed = collapse_ancestors(locations(&["a", "a.b", "a.b.c"]));
        assert_eq!(collapsed, locations(&["a.b.c"]));
    }

    #[test]
    fn test_collapse_keeps_siblings() {
        let collapsed = collapse_ancestors(locations(&["a", "a.b", "a.c", "d"]));
        assert_eq!(collapsed, locations(&["a.b", "a.c", "d"]));
    }

    #[test]
    fn test_collapse_keeps_prefix_sharing_keys() {
        let collapsed = collapse_ancestors(locations(&["a", "ab"]));
        assert_eq!(collapsed, locations(&["a", "ab"]));
    }

    #[test]
    fn test_collapse_empty() {
        assert!(collapse_ancestors(Vec::new()).is_empty());
    }
}
