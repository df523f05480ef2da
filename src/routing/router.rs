//! Route lookup over registered handlers and filters.
//!
//! # Responsibilities
//! - Resolve a request path to exactly one handler registration, or none
//! - Collect the filters that wrap a resolved handler
//!
//! # Design Decisions
//! - First match wins in registry enumeration order; there is no
//!   longest-match or specificity ranking between patterns
//! - Within a registration, patterns are tried in the order they were added
//! - The request path is split once per lookup

use crate::dispatch::DispatcherType;
use crate::registry::{FilterEntry, HandlerRegistration};
use crate::routing::matcher::{pattern_matches_segments, split_segments};

/// Find the registration whose mapping first matches `path`.
pub fn resolve<'a, I>(registrations: I, path: &str) -> Option<&'a HandlerRegistration>
where
    I: IntoIterator<Item = &'a HandlerRegistration>,
{
    let path_parts = split_segments(path);
    for registration in registrations {
        for pattern in registration.mappings() {
            if pattern_matches_segments(pattern, path, &path_parts) {
                tracing::trace!(handler = %registration.name(), pattern = %pattern, path = %path, "Route matched");
                return Some(registration);
            }
        }
    }
    None
}

/// Filters applying to a dispatch, in enumeration order.
pub fn matching_filters<'a, I>(
    filters: I,
    path: &str,
    handler_name: &str,
    dispatch_type: DispatcherType,
) -> Vec<&'a FilterEntry>
where
    I: IntoIterator<Item = &'a FilterEntry>,
{
    filters
        .into_iter()
        .filter(|f| f.applies_to(path, handler_name, dispatch_type))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{filter_fn, handler_fn};
    use std::sync::Arc;

    fn registration(name: &str, patterns: &[&str]) -> HandlerRegistration {
        let mut reg = HandlerRegistration::new(name, Arc::new(handler_fn(|_, _| Ok(()))));
        reg.add_mapping(patterns.iter().copied());
        reg
    }

    fn names<'a>(filters: &[&'a FilterEntry]) -> Vec<&'a str> {
        filters.iter().map(|f| f.name()).collect()
    }

    #[test]
    fn test_exact_route() {
        let regs = vec![registration("greet", &["/hello"])];
        assert_eq!(resolve(&regs, "/hello").map(|r| r.name()), Some("greet"));
        assert!(resolve(&regs, "/hello/world").is_none());
        assert!(resolve(&regs, "/").is_none());
    }

    #[test]
    fn test_root_mapping_wins_for_every_path() {
        for root in ["", "/", "/*"] {
            let regs = vec![registration("app", &[root])];
            for path in ["", "/", "/a", "/a/b"] {
                assert_eq!(resolve(&regs, path).map(|r| r.name()), Some("app"));
            }
        }
    }

    #[test]
    fn test_enumeration_order_beats_specificity() {
        let regs = vec![registration("wide", &["/a/*"]), registration("narrow", &["/a/b"])];
        assert_eq!(resolve(&regs, "/a/b").map(|r| r.name()), Some("wide"));

        let regs = vec![registration("narrow", &["/a/b"]), registration("wide", &["/a/*"])];
        assert_eq!(resolve(&regs, "/a/b").map(|r| r.name()), Some("narrow"));
    }

    #[test]
    fn test_mismatch_moves_to_next_pattern() {
        let regs = vec![
            registration("first", &["/x", "/y/*"]),
            registration("second", &["/z"]),
        ];
        assert_eq!(resolve(&regs, "/y/1").map(|r| r.name()), Some("first"));
        assert_eq!(resolve(&regs, "/z").map(|r| r.name()), Some("second"));
        assert!(resolve(&regs, "/x/y").is_none());
    }

    #[test]
    fn test_unmapped_registration_never_matches() {
        let regs = vec![registration("named-only", &[])];
        assert!(resolve(&regs, "/").is_none());
        assert!(resolve(&regs, "/anything").is_none());
    }

    #[test]
    fn test_matching_filters_keep_order() {
        let mut log = FilterEntry::new("log", Arc::new(filter_fn(|req, res, chain| chain.do_filter(req, res))));
        log.add_mapping_for_url_patterns(&[], true, ["/*"]);
        let mut auth = FilterEntry::new("auth", Arc::new(filter_fn(|req, res, chain| chain.do_filter(req, res))));
        auth.add_mapping_for_url_patterns(&[], true, ["/admin/*"]);
        let mut inc = FilterEntry::new("inc", Arc::new(filter_fn(|req, res, chain| chain.do_filter(req, res))));
        inc.add_mapping_for_url_patterns(&[DispatcherType::Include], true, ["/*"]);
        let filters = vec![log, auth, inc];

        let chain = matching_filters(&filters, "/admin/users", "admin", DispatcherType::Request);
        assert_eq!(names(&chain), vec!["log", "auth"]);

        let chain = matching_filters(&filters, "/public", "public", DispatcherType::Include);
        assert_eq!(names(&chain), vec!["log", "inc"]);
    }
}
