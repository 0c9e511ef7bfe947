// algebra.rs - pure operations over styles (merge, diff, containment, signature)

use super::{OptionValue, Style};

/// Deep-update: every value in `group` overrides the same-named value in
/// `parent`, recursing into nested styles rather than replacing them
/// wholesale. Keys present only in `parent` are kept untouched.
pub fn merge(parent: &Style, group: &Style) -> Style {
    let mut out = parent.clone();
    for (key, value) in group.iter() {
        match (out.get(key), value) {
            (Some(OptionValue::Nested(existing)), OptionValue::Nested(incoming)) => {
                let merged = merge(existing, incoming);
                out.set(key, OptionValue::Nested(merged));
            }
            _ => out.set(key, value.clone()),
        }
    }
    out
}

/// Deep symmetric difference by key path and value: returns
/// `(unique_to_a, unique_to_b)`, the keys/values present in one style but
/// not matched exactly by the other. Nested styles are diffed recursively;
/// a nested option only appears whole in the result if the two sides'
/// nested contents actually differ.
pub fn diff(a: &Style, b: &Style) -> (Style, Style) {
    let mut unique_to_a = Style::new();
    let mut unique_to_b = Style::new();

    for (key, va) in a.iter() {
        match b.get(key) {
            None => unique_to_a.set(key, va.clone()),
            Some(vb) => match (va, vb) {
                (OptionValue::Nested(na), OptionValue::Nested(nb)) => {
                    let (da, db) = diff(na, nb);
                    if !da.is_empty() {
                        unique_to_a.set(key, OptionValue::Nested(da));
                    }
                    if !db.is_empty() {
                        unique_to_b.set(key, OptionValue::Nested(db));
                    }
                }
                _ if va != vb => {
                    unique_to_a.set(key, va.clone());
                    unique_to_b.set(key, vb.clone());
                }
                _ => {}
            },
        }
    }
    for (key, vb) in b.iter() {
        if a.get(key).is_none() {
            unique_to_b.set(key, vb.clone());
        }
    }

    (unique_to_a, unique_to_b)
}

/// Structural containment: every key in `group` is present in `parent`. If
/// `match_values` is set, the values must also compare equal (recursing
/// into nested styles).
pub fn contains_all(group: &Style, parent: &Style, match_values: bool) -> bool {
    group.iter().all(|(key, value)| match parent.get(key) {
        None => false,
        Some(parent_value) if match_values => match (value, parent_value) {
            (OptionValue::Nested(g), OptionValue::Nested(p)) => contains_all(g, p, true),
            _ => value == parent_value,
        },
        Some(_) => true,
    })
}

/// Canonical stringification, used as the de-duplication key during search.
/// Order-insensitive: keys are sorted before rendering at every level.
pub fn signature(style: &Style) -> String {
    format!("{{{}}}", style.signature_body())
}

/// Render with the based-on/major option first, the rest in original
/// registration order, for human-facing output (`--output-style`, the
/// bestofround summary).
pub fn sorted_style(style: &Style, major_key: &str) -> Style {
    let mut out = Style::new();
    if let Some(value) = style.get(major_key) {
        out.set(major_key, value.clone());
    }
    for (key, value) in style.iter() {
        if key != major_key {
            out.set(key, value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(pairs: &[(&str, OptionValue)]) -> Style {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn merge_is_idempotent() {
        let base = s(&[("ColumnLimit", OptionValue::Int(80))]);
        let group = s(&[("UseTab", OptionValue::Bool(false))]);
        let once = merge(&base, &group);
        let twice = merge(&once, &group);
        assert_eq!(signature(&once), signature(&twice));
    }

    #[test]
    fn merge_overrides_and_preserves() {
        let base = s(&[("A", OptionValue::Int(1)), ("B", OptionValue::Int(2))]);
        let group = s(&[("A", OptionValue::Int(9))]);
        let merged = merge(&base, &group);
        assert_eq!(merged.get("A").unwrap().as_int(), Some(9));
        assert_eq!(merged.get("B").unwrap().as_int(), Some(2));
    }

    #[test]
    fn diff_round_trip_on_symmetric_keys() {
        let a = s(&[("A", OptionValue::Int(1)), ("B", OptionValue::Int(2))]);
        let b = s(&[("A", OptionValue::Int(9)), ("C", OptionValue::Int(3))]);
        let (ua, ub) = diff(&a, &b);
        let merged_a = merge(&a, &ub);
        let merged_b = merge(&b, &ua);
        // on the symmetric-difference key paths (A and C), both merges agree
        assert_eq!(merged_a.get("A"), merged_b.get("A"));
        assert_eq!(merged_a.get("C"), merged_b.get("C"));
    }

    #[test]
    fn contains_all_respects_match_values() {
        let parent = s(&[("A", OptionValue::Int(1))]);
        let group = s(&[("A", OptionValue::Int(2))]);
        assert!(contains_all(&group, &parent, false));
        assert!(!contains_all(&group, &parent, true));
    }

    #[test]
    fn signature_is_order_insensitive() {
        let a = s(&[("A", OptionValue::Int(1)), ("B", OptionValue::Int(2))]);
        let b = s(&[("B", OptionValue::Int(2)), ("A", OptionValue::Int(1))]);
        assert_eq!(signature(&a), signature(&b));
    }
}
