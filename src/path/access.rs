// ============================================================================
// subject-store - Path Get/Set
// ============================================================================

use serde_json::{Map, Value};

use crate::core::error::PathError;
use crate::path::{Path, Segment};

/// Most `null`s a single write may append to an array
pub const MAX_ARRAY_PADDING: usize = 1 << 16;

// =============================================================================
// READ
// =============================================================================

/// Read the value at `path`, or `default` when it cannot be resolved.
///
/// Any failure (malformed selector, missing intermediate, wrong container
/// kind, or a `null` at the end of the path) yields `default`. A selector
/// that names an existing key of the root object is used as that key
/// directly.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use subject_store::path::get;
///
/// let state = json!({"todos": [{"title": "write docs"}], "a.b": 1});
/// assert_eq!(get(&state, "todos[0].title", json!(null)), json!("write docs"));
/// assert_eq!(get(&state, "a.b", json!(null)), json!(1));
/// assert_eq!(get(&state, "todos[3].title", json!("none")), json!("none"));
/// ```
pub fn get(root: &Value, path: impl Into<Path>, default: Value) -> Value {
    match get_ref(root, &path.into()) {
        Some(Value::Null) | None => default,
        Some(found) => found.clone(),
    }
}

/// Borrow the value at `path`, if it resolves.
pub fn get_ref<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    if let Some(found) = literal_entry(root, path) {
        return Some(found);
    }
    let segments = path.segments().ok()?;
    segments.iter().try_fold(root, step)
}

/// Mutably borrow the value at `segments`, without creating anything.
pub fn get_mut<'a>(root: &'a mut Value, segments: &[Segment]) -> Option<&'a mut Value> {
    segments.iter().try_fold(root, step_mut)
}

fn literal_entry<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    let literal = path.literal()?;
    root.as_object()?.get(literal)
}

fn step<'a>(value: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match (value, segment) {
        (Value::Object(map), Segment::Key(key)) => map.get(key),
        (Value::Object(map), Segment::Index(index)) => map.get(&index.to_string()),
        (Value::Array(items), Segment::Index(index)) => items.get(*index),
        (Value::Array(items), Segment::Key(key)) => items.get(array_index(key)?),
        _ => None,
    }
}

fn step_mut<'a>(value: &'a mut Value, segment: &Segment) -> Option<&'a mut Value> {
    match (value, segment) {
        (Value::Object(map), Segment::Key(key)) => map.get_mut(key),
        (Value::Object(map), Segment::Index(index)) => map.get_mut(&index.to_string()),
        (Value::Array(items), Segment::Index(index)) => items.get_mut(*index),
        (Value::Array(items), Segment::Key(key)) => items.get_mut(array_index(key)?),
        _ => None,
    }
}

/// A key usable as an array index: canonical decimal, so `"01"` is not `1`.
fn array_index(key: &str) -> Option<usize> {
    key.parse::<usize>()
        .ok()
        .filter(|index| index.to_string() == key)
}

// =============================================================================
// WRITE
// =============================================================================

/// Return a copy of `root` with `value` stored at `path`.
///
/// Every container along the path is a fresh copy; `root` is untouched and
/// repeated calls on the same root are independent. Missing (or scalar)
/// intermediates become an array when the next segment is a bracketed index
/// and an object otherwise. Writing more than [`MAX_ARRAY_PADDING`] entries
/// past the end of an array is rejected. A path that cannot be applied is
/// logged and the returned copy equals `root`; use [`try_set`] to get the
/// error instead.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use subject_store::path::set;
///
/// let root = json!({"a": {"b": 1, "c": 2}});
/// let updated = set(&root, "a.b", json!(9));
///
/// assert_eq!(updated, json!({"a": {"b": 9, "c": 2}}));
/// assert_eq!(root, json!({"a": {"b": 1, "c": 2}}));
///
/// let created = set(&json!({}), "list[1].name", json!("x"));
/// assert_eq!(created, json!({"list": [null, {"name": "x"}]}));
/// ```
pub fn set(root: &Value, path: impl Into<Path>, value: Value) -> Value {
    let path = path.into();
    let mut copy = root.clone();
    if let Err(err) = set_in_place(&mut copy, &path, value) {
        tracing::warn!(%path, error = %err, "path set rejected");
    }
    copy
}

/// Like [`set`], but reports malformed or inapplicable paths.
pub fn try_set(root: &Value, path: impl Into<Path>, value: Value) -> Result<Value, PathError> {
    let mut copy = root.clone();
    set_in_place(&mut copy, &path.into(), value)?;
    Ok(copy)
}

/// Store `value` at `path` inside `root`, creating containers as needed.
///
/// On error `root` is left unchanged.
pub fn set_in_place(root: &mut Value, path: &Path, value: Value) -> Result<(), PathError> {
    if let (Some(literal), Value::Object(map)) = (path.literal(), &mut *root) {
        if map.contains_key(literal) {
            map.insert(literal.to_string(), value);
            return Ok(());
        }
    }

    let segments = path.segments()?;
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return Ok(());
    };
    check_writable(root, segments)?;

    let mut current = root;
    for (i, segment) in parents.iter().enumerate() {
        let slot = slot_mut(current, segment)?;
        if !is_container(slot) {
            *slot = empty_container_for(&segments[i + 1]);
        }
        current = slot;
    }
    *slot_mut(current, last)? = value;
    Ok(())
}

/// Walk `segments` without mutating, failing where [`slot_mut`] would.
fn check_writable(root: &Value, segments: &[Segment]) -> Result<(), PathError> {
    let mut current = Some(root);
    for segment in segments {
        current = match (current, segment) {
            (Some(Value::Object(map)), Segment::Key(key)) => map.get(key),
            (Some(Value::Object(map)), Segment::Index(index)) => map.get(&index.to_string()),
            (Some(Value::Array(items)), segment) => {
                let index = array_slot(segment)?;
                padded_len(index, items.len())?;
                items.get(index)
            }
            // Missing or scalar: replaced by a fresh container for `segment`
            (_, Segment::Index(index)) => {
                padded_len(*index, 0)?;
                None
            }
            (_, Segment::Key(_)) => None,
        };
    }
    Ok(())
}

/// The array position `segment` names.
fn array_slot(segment: &Segment) -> Result<usize, PathError> {
    match segment {
        Segment::Index(index) => Ok(*index),
        Segment::Key(key) => {
            array_index(key).ok_or_else(|| PathError::KeyOnArray { key: key.clone() })
        }
    }
}

/// Length an array of `len` must grow to so that `index` exists.
fn padded_len(index: usize, len: usize) -> Result<usize, PathError> {
    if index < len {
        return Ok(len);
    }
    index
        .checked_add(1)
        .filter(|new_len| new_len - len <= MAX_ARRAY_PADDING)
        .ok_or(PathError::IndexTooLarge { index, len })
}

fn is_container(value: &Value) -> bool {
    value.is_object() || value.is_array()
}

fn empty_container_for(segment: &Segment) -> Value {
    match segment {
        Segment::Index(_) => Value::Array(Vec::new()),
        Segment::Key(_) => Value::Object(Map::new()),
    }
}

/// The entry `segment` names inside `container`, created as `null` if absent.
///
/// A scalar `container` is first replaced by an empty container suited to
/// `segment`; arrays are padded with `null` up to the index.
fn slot_mut<'a>(container: &'a mut Value, segment: &Segment) -> Result<&'a mut Value, PathError> {
    match container {
        Value::Object(map) => {
            let key = match segment {
                Segment::Key(key) => key.clone(),
                Segment::Index(index) => index.to_string(),
            };
            Ok(map.entry(key).or_insert(Value::Null))
        }
        Value::Array(items) => {
            let index = array_slot(segment)?;
            let len = padded_len(index, items.len())?;
            items.resize(len, Value::Null);
            Ok(&mut items[index])
        }
        scalar => {
            *scalar = empty_container_for(segment);
            slot_mut(scalar, segment)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracing_test::traced_test;

    #[test]
    fn get_walks_mixed_paths() {
        let state = json!({"a": {"b": [10, {"c": "deep"}]}});
        assert_eq!(get(&state, "a.b[1]['c']", json!(null)), json!("deep"));
        assert_eq!(get(&state, "a.b[0]", json!(null)), json!(10));
        assert_eq!(get(&state, ["a", "b", "1", "c"], json!(null)), json!("deep"));
    }

    #[test]
    fn get_recovers_with_default() {
        let state = json!({"a": {"b": 1}, "n": null});
        assert_eq!(get(&state, "a.x.y", json!(0)), json!(0));
        assert_eq!(get(&state, "a.b.c", json!(0)), json!(0));
        assert_eq!(get(&state, "a..b", json!("bad")), json!("bad"));
        assert_eq!(get(&state, "n", json!("null")), json!("null"));
    }

    #[test]
    fn get_literal_key_first() {
        let state = json!({"a.b": "literal", "a": {"b": "nested"}});
        assert_eq!(get(&state, "a.b", json!(null)), json!("literal"));
        assert_eq!(get(&state, "['a']['b']", json!(null)), json!("nested"));

        let state = json!({"odd-key": 1});
        assert_eq!(get(&state, "odd-key", json!(null)), json!(1));
    }

    #[test]
    fn get_index_and_key_interplay() {
        let list = json!([["x", "y"]]);
        assert_eq!(get(&list, 0usize, json!(null)), json!(["x", "y"]));
        assert_eq!(get(&list, "[0].1", json!(null)), json!("y"));
        assert_eq!(get(&list, "[0]['01']", json!("none")), json!("none"));

        let map = json!({"0": "zero"});
        assert_eq!(get(&map, "[0]", json!(null)), json!("zero"));
        assert_eq!(get(&json!([1]), "[-1]", json!("none")), json!("none"));
    }

    #[test]
    fn empty_path_addresses_root() {
        let state = json!({"a": 1});
        assert_eq!(get(&state, "", json!(null)), state);
        assert_eq!(set(&state, "", json!(2)), json!(2));
    }

    #[test]
    fn set_preserves_siblings_and_input() {
        let root = json!({"a": {"b": 1, "c": 2}, "z": [1, 2]});
        let first = set(&root, "a.b", json!(9));
        let second = set(&root, "a.c", json!(7));

        assert_eq!(root, json!({"a": {"b": 1, "c": 2}, "z": [1, 2]}));
        assert_eq!(first, json!({"a": {"b": 9, "c": 2}, "z": [1, 2]}));
        assert_eq!(second, json!({"a": {"b": 1, "c": 7}, "z": [1, 2]}));
    }

    #[test]
    fn set_creates_missing_containers() {
        assert_eq!(set(&json!({}), "a.b.c", json!(1)), json!({"a": {"b": {"c": 1}}}));
        assert_eq!(set(&json!({}), "a[2]", json!(true)), json!({"a": [null, null, true]}));
        assert_eq!(set(&json!({}), "a.0", json!(1)), json!({"a": {"0": 1}}));
        assert_eq!(set(&json!({"a": 5}), "a.b", json!(1)), json!({"a": {"b": 1}}));
        assert_eq!(set(&json!(null), "[1]", json!("x")), json!([null, "x"]));
        assert_eq!(set(&json!(3), "k", json!("x")), json!({"k": "x"}));
    }

    #[test]
    fn set_index_variants() {
        let list = json!([1, 2, 3]);
        assert_eq!(set(&list, 1usize, json!(20)), json!([1, 20, 3]));
        assert_eq!(set(&list, "1", json!(20)), json!([1, 20, 3]));
        assert_eq!(set(&json!({}), "[0]", json!("v")), json!({"0": "v"}));
    }

    #[test]
    fn set_literal_key_first() {
        let root = json!({"a.b": 1});
        assert_eq!(set(&root, "a.b", json!(2)), json!({"a.b": 2}));
    }

    #[test]
    fn try_set_reports_errors() {
        assert_eq!(
            try_set(&json!({}), "a[", json!(1)),
            Err(PathError::UnterminatedBracket { offset: 1 })
        );
        assert_eq!(
            try_set(&json!({"list": [1]}), "list.name", json!(1)),
            Err(PathError::KeyOnArray { key: "name".into() })
        );
    }

    #[traced_test]
    #[test]
    fn set_logs_rejected_paths() {
        let root = json!({"list": [1]});
        assert_eq!(set(&root, "list.name", json!(1)), root);
        assert!(logs_contain("path set rejected"));
    }

    #[test]
    fn set_rejects_huge_indices() {
        let root = json!({"a": []});
        assert_eq!(set(&root, "a[18446744073709551615]", json!(1)), root);
        assert_eq!(set(&root, "a[1000000000000]", json!(1)), root);
        assert_eq!(
            try_set(&json!([]), "[18446744073709551615]", json!(1)),
            Err(PathError::IndexTooLarge {
                index: usize::MAX,
                len: 0
            })
        );

        let padded = set(&json!([]), MAX_ARRAY_PADDING - 1, json!(1));
        assert_eq!(padded.as_array().map(Vec::len), Some(MAX_ARRAY_PADDING));
    }

    #[test]
    fn rejected_set_in_place_leaves_root_unchanged() {
        let mut root = json!({"list": [1]});

        assert!(set_in_place(&mut root, &Path::from("a.b[99999999].c"), json!(1)).is_err());
        assert!(set_in_place(&mut root, &Path::from("new[0].list.name"), json!(1)).is_ok());
        assert!(set_in_place(&mut root, &Path::from("new[0].other[99999999]"), json!(1)).is_err());
        assert!(set_in_place(&mut root, &Path::from("list.name"), json!(1)).is_err());

        assert_eq!(root, json!({"list": [1], "new": [{"list": {"name": 1}}]}));
    }

    #[test]
    fn get_mut_does_not_create() {
        let mut state = json!({"a": [1, 2]});
        *get_mut(&mut state, &[Segment::from("a"), Segment::Index(1)]).unwrap() = json!(5);
        assert_eq!(state, json!({"a": [1, 5]}));
        assert!(get_mut(&mut state, &[Segment::from("missing")]).is_none());
        assert_eq!(state, json!({"a": [1, 5]}));
    }
}
