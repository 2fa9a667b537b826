//! Dotted paths over a JSON tree.

use serde_json::Value;

/// Segment that matches any single segment
pub const WILDCARD: &str = "*";

/// Split a dotted path into its segments
///
/// The empty path has no segments.
#[must_use]
pub fn segments(path: &str) -> Vec<&str> {
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('.').collect()
    }
}

/// Whether `pattern` selects `path`
///
/// `"*"` selects everything. Otherwise every non-wildcard segment of the
/// pattern must equal the path segment at the same index. Segment counts are
/// not compared, so `calculator` selects `calculator.orderValue` and
/// `customer.data.x` does not select `customer.data`.
#[must_use]
pub fn matches(pattern: &str, path: &str) -> bool {
    if pattern == WILDCARD || pattern == path {
        return true;
    }

    let path_segments = segments(path);
    segments(pattern)
        .iter()
        .enumerate()
        .all(|(i, segment)| *segment == WILDCARD || path_segments.get(i) == Some(segment))
}

/// Walk `root` along `path`; objects by key, arrays by index
#[must_use]
pub fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(*segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Join a parent path and a child segment
#[must_use]
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn exact_and_global_wildcard() {
        assert!(matches("calculator.orderValue", "calculator.orderValue"));
        assert!(matches("*", "ui.loading"));
        assert!(!matches("calculator.orderValue", "calculator.leadTime"));
    }

    #[test]
    fn trailing_wildcard() {
        assert!(matches("calculator.*", "calculator.orderValue"));
        assert!(matches("calculator.*", "calculator.leadTime"));
        assert!(!matches("calculator.*", "customer.data"));
    }

    #[test]
    fn inner_wildcard() {
        assert!(matches("settings.integrations.*.token", "settings.integrations.monday.token"));
        assert!(!matches("settings.integrations.*.token", "settings.integrations.xentral.url"));
    }

    #[test]
    fn prefix_tolerance() {
        assert!(matches("calculator", "calculator.calculation.totalDiscount"));
        assert!(!matches("customer.data.companyName", "customer.data"));
        // The wildcard segment need not exist.
        assert!(matches("customer.*", "customer"));
    }

    #[test]
    fn lookup_walks_objects_and_arrays() {
        let tree = json!({ "ui": { "notifications": [{ "id": "a" }] } });
        assert_eq!(
            lookup(&tree, &["ui", "notifications", "0", "id"]),
            Some(&json!("a"))
        );
        assert_eq!(lookup(&tree, &["ui", "missing"]), None);
        assert_eq!(lookup(&tree, &["ui", "notifications", "x"]), None);
        assert_eq!(lookup(&tree, &[]), Some(&tree));
    }

    proptest! {
        #[test]
        fn every_path_matches_itself_and_star(parts in prop::collection::vec("[a-z]{1,6}", 1..5)) {
            let path = parts.join(".");
            prop_assert!(matches(&path, &path));
            prop_assert!(matches(WILDCARD, &path));
        }

        #[test]
        fn prefix_pattern_matches_longer_paths(
            parts in prop::collection::vec("[a-z]{1,6}", 2..6),
            cut in 1usize..5,
        ) {
            let cut = cut.min(parts.len() - 1);
            let pattern = parts[..cut].join(".");
            prop_assert!(matches(&pattern, &parts.join(".")));
        }
    }
}
