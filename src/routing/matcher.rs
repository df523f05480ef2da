//! Path pattern matching.
//!
//! # Responsibilities
//! - Split request paths and patterns into `/`-separated segments
//! - Match a single pattern against a request path
//! - Classify and validate patterns coming from configuration
//!
//! # Design Decisions
//! - Three pattern forms only: root (`""`, `"/"`, `"/*"`), exact, and
//!   segment wildcards (`*` standing for exactly one segment)
//! - A trailing `*` segment also accepts any number of extra path segments
//! - Pattern segments beyond the end of the path fail that pattern
//! - A pattern without a trailing `*` matches only paths of the same depth
//! - No suffix-extension (`*.jsp`) patterns
//! - No regex; matching is a single pass over the segments

/// Shape of a mapping pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// `""`, `"/"` or `"/*"`: matches every path.
    Root,
    /// Literal segments only.
    Exact,
    /// At least one `*` segment.
    Wildcard,
}

/// Split on `/`, dropping trailing empty segments.
///
/// `""` yields a single empty segment and `"/"` yields none, so
/// `"/a/b/"` and `"/a/b"` split the same way.
pub fn split_segments(path: &str) -> Vec<&str> {
    if path.is_empty() {
        return vec![""];
    }
    let mut segments: Vec<&str> = path.split('/').collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    segments
}

/// True for the patterns that match unconditionally.
pub fn is_root_pattern(pattern: &str) -> bool {
    matches!(pattern, "" | "/" | "/*")
}

fn is_root_path(path: &str) -> bool {
    matches!(path, "" | "/")
}

/// Classify a pattern.
pub fn classify(pattern: &str) -> PatternKind {
    if is_root_pattern(pattern) {
        PatternKind::Root
    } else if split_segments(pattern).contains(&"*") {
        PatternKind::Wildcard
    } else {
        PatternKind::Exact
    }
}

/// Match one mapping pattern against a request path.
pub fn pattern_matches(pattern: &str, path: &str) -> bool {
    if is_root_pattern(pattern) {
        return true;
    }
    // Nothing but a root pattern can match the empty path.
    if is_root_path(path) {
        return false;
    }
    segments_match(&split_segments(pattern), &split_segments(path))
}

/// Same as [`pattern_matches`] with the path already split.
pub(crate) fn pattern_matches_segments(pattern: &str, path: &str, path_parts: &[&str]) -> bool {
    if is_root_pattern(pattern) {
        return true;
    }
    if is_root_path(path) {
        return false;
    }
    segments_match(&split_segments(pattern), path_parts)
}

fn segments_match(pattern_parts: &[&str], path_parts: &[&str]) -> bool {
    let Some(last) = pattern_parts.len().checked_sub(1) else {
        return false;
    };

    for (i, expected) in pattern_parts.iter().enumerate() {
        let Some(actual) = path_parts.get(i) else {
            return false;
        };
        let wildcard = *expected == "*";
        if !wildcard && expected != actual {
            return false;
        }
        if i == last {
            return wildcard || path_parts.len() == pattern_parts.len();
        }
    }
    false
}

/// Check a pattern before it is accepted from configuration.
pub fn validate_pattern(pattern: &str) -> Result<PatternKind, String> {
    if is_root_pattern(pattern) {
        return Ok(PatternKind::Root);
    }
    if !pattern.starts_with('/') {
        return Err(format!("pattern '{pattern}' must start with '/'"));
    }
    for segment in split_segments(pattern) {
        if segment.contains('*') && segment != "*" {
            return Err(format!(
                "pattern '{pattern}': '*' must stand alone in a segment"
            ));
        }
    }
    Ok(classify(pattern))
}
