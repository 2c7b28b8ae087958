//! Lookup helpers over diffs and JSON values.
//!
//! Diffs are short, so lookups are linear scans in diff order; the first
//! entry with a matching key wins.

use serde_json::Value;

use crate::types::{Diff, DiffEntry, DiffKey};

/// Indentation used when stringifying JSON values for display.
pub const JSON_INDENT: &str = "  ";

/// Find the first entry with the given key.
pub fn get_diff_entry_by_key<'a, K>(diff: &'a [DiffEntry], key: &K) -> Option<&'a DiffEntry>
where
    K: ?Sized,
    DiffKey: PartialEq<K>,
{
    diff.iter().find(|e| e.key() == key)
}

/// Find the nested diff of the first entry with the given key.
///
/// Returns `None` when no entry has the key or when that entry is not a
/// `patch`.
pub fn get_sub_diff_by_key<'a, K>(diff: &'a [DiffEntry], key: &K) -> Option<&'a Diff>
where
    K: ?Sized,
    DiffKey: PartialEq<K>,
{
    match get_diff_entry_by_key(diff, key)? {
        DiffEntry::Patch { diff, .. } => Some(diff),
        _ => None,
    }
}

/// Follow `path` down through nested `patch` entries.
///
/// An empty path returns the diff itself.
pub fn get_sub_diff_by_path<'a>(diff: &'a [DiffEntry], path: &[String]) -> Option<&'a [DiffEntry]> {
    let mut current = diff;
    for step in path {
        current = match current.iter().find(|e| e.key().matches_step(step))? {
            DiffEntry::Patch { diff, .. } => diff,
            _ => return None,
        };
    }
    Some(current)
}

/// Follow `path` down through objects (by key) and arrays (by index).
pub fn get_member_by_path<'a>(value: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = value;
    for step in path {
        current = match current {
            Value::Object(map) => map.get(step)?,
            Value::Array(items) => items.get(step.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Deep copy of `diff` with every provenance annotation removed.
pub fn strip_source(diff: &[DiffEntry]) -> Diff {
    diff.iter()
        .map(|entry| match entry {
            DiffEntry::Patch { key, diff, .. } => DiffEntry::Patch {
                key: key.clone(),
                diff: strip_source(diff),
                source: None,
            },
            other => other.clone().with_source(None),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{op_add_range, op_patch, op_remove, op_remove_range, op_replace};
    use serde_json::json;

    fn cell_diff() -> Diff {
        vec![
            op_patch("metadata", vec![op_remove("tags")]),
            op_replace("execution_count", json!(3)),
            op_patch("source", vec![op_remove_range(0, 1)]),
            op_patch("source", vec![op_remove_range(1, 1)]),
        ]
    }

    #[test]
    fn entry_by_key_finds_first_match() {
        let diff = cell_diff();
        let e = get_diff_entry_by_key(&diff, "execution_count").unwrap();
        assert_eq!(e, &op_replace("execution_count", json!(3)));
        assert_eq!(
            get_sub_diff_by_key(&diff, "source"),
            Some(&vec![op_remove_range(0, 1)])
        );
        assert!(get_diff_entry_by_key(&diff, "outputs").is_none());
    }

    #[test]
    fn sub_diff_by_key_requires_patch() {
        let diff = cell_diff();
        assert!(get_sub_diff_by_key(&diff, "execution_count").is_none());
    }

    #[test]
    fn lookup_by_index() {
        let diff = vec![op_remove_range(0, 1), op_patch(2, vec![op_remove("a")])];
        assert!(get_diff_entry_by_key(&diff, &0usize).is_some());
        assert_eq!(get_sub_diff_by_key(&diff, &2usize).map(Vec::len), Some(1));
        assert!(get_diff_entry_by_key(&diff, &1usize).is_none());
    }

    #[test]
    fn sub_diff_by_path_walks_patches() {
        let diff = vec![op_patch(
            "data",
            vec![op_patch("text/plain", vec![op_remove_range(0, 1)])],
        )];
        let path = vec!["data".to_string(), "text/plain".to_string()];
        assert_eq!(
            get_sub_diff_by_path(&diff, &path),
            Some(&[op_remove_range(0, 1)][..])
        );
        let missing = vec!["data".to_string(), "image/png".to_string()];
        assert_eq!(get_sub_diff_by_path(&diff, &missing), None);
        assert_eq!(get_sub_diff_by_path(&diff, &[]).map(<[_]>::len), Some(1));
    }

    #[test]
    fn member_by_path() {
        let v = json!({"data": {"text/plain": ["a", "b"]}, "list": [1, {"x": 2}]});
        let p = |s: &[&str]| s.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(
            get_member_by_path(&v, &p(&["data", "text/plain"])),
            Some(&json!(["a", "b"]))
        );
        assert_eq!(get_member_by_path(&v, &p(&["list", "1", "x"])), Some(&json!(2)));
        assert_eq!(get_member_by_path(&v, &p(&["list", "9"])), None);
        assert_eq!(get_member_by_path(&v, &p(&["data", "text/plain", "x"])), None);
    }

    #[test]
    fn strip_source_recurses() {
        let diff = vec![
            op_add_range(0, vec![json!("x")]).with_source(Some(json!("remote"))),
            op_patch(1, vec![op_remove("a").with_source(Some(json!("local")))])
                .with_source(Some(json!("local"))),
        ];
        let stripped = strip_source(&diff);
        assert_eq!(
            stripped,
            vec![
                op_add_range(0, vec![json!("x")]),
                op_patch(1, vec![op_remove("a")]),
            ]
        );
        // the input is left untouched
        assert!(diff[0].source().is_some());
    }
}
