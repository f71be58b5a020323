//! Multi-key sorting driven by the JSON:API `sort` parameter

use std::borrow::Cow;
use std::cmp::Ordering;

/// Values which expose named sort keys
pub trait Sortable {
    /// The key for `field`, or `None` when the value has no such field
    ///
    /// Keys compare ordinally by their UTF-8 bytes, with no case folding or
    /// locale collation, so `"Zulu"` sorts before `"apple"`. `None` sorts
    /// before any present key.
    fn sort_value(&self, field: &str) -> Option<Cow<'_, str>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// A stable multi-key comparator
///
/// Built from a sort specification and the whitelist of sortable fields.
/// Fields outside the whitelist are not honored; they are returned from
/// [`Sorter::parse`] so the caller can report them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sorter {
    keys: Vec<(String, SortDirection)>,
}

impl Sorter {
    /// Parse `spec` (`key,-value`) against `whitelist`
    ///
    /// Returns the sorter and the rejected field names, in spec order.
    pub fn parse(spec: Option<&str>, whitelist: &[&str]) -> (Self, Vec<String>) {
        let mut keys = Vec::new();
        let mut rejected = Vec::new();

        for segment in spec.unwrap_or_default().split(',').map(str::trim) {
            let (field, direction) = match segment.strip_prefix('-') {
                Some(field) => (field, SortDirection::Descending),
                None => (segment, SortDirection::Ascending),
            };

            if field.is_empty() {
                continue;
            }

            if whitelist.contains(&field) {
                keys.push((field.to_string(), direction));
            } else {
                rejected.push(field.to_string());
            }
        }

        (Self { keys }, rejected)
    }

    pub fn keys(&self) -> &[(String, SortDirection)] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn compare<T: Sortable>(&self, a: &T, b: &T) -> Ordering {
        for (field, direction) in &self.keys {
            let ordering = a.sort_value(field).cmp(&b.sort_value(field));
            let ordering = match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            };

            if ordering != Ordering::Equal {
                return ordering;
            }
        }

        Ordering::Equal
    }

    /// Sort `items` in place; equal entries keep their input order
    pub fn sort<T: Sortable>(&self, items: &mut [T]) {
        if self.keys.is_empty() {
            return;
        }

        items.sort_by(|a, b| self.compare(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        key: &'static str,
        value: &'static str,
    }

    impl Sortable for Row {
        fn sort_value(&self, field: &str) -> Option<Cow<'_, str>> {
            match field {
                "key" => Some(Cow::Borrowed(self.key)),
                "value" => Some(Cow::Borrowed(self.value)),
                _ => None,
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { key: "b", value: "1" },
            Row { key: "a", value: "2" },
            Row { key: "b", value: "0" },
            Row { key: "a", value: "1" },
        ]
    }

    #[test]
    fn test_keys_compare_ordinally() {
        let (sorter, _) = Sorter::parse(Some("key"), &["key"]);
        let upper = Row { key: "Zulu", value: "" };
        let lower = Row { key: "apple", value: "" };

        assert_eq!(sorter.compare(&upper, &lower), Ordering::Less);
    }

    #[test]
    fn test_parse_whitelist() {
        let (sorter, rejected) = Sorter::parse(Some("key,-value,colour"), &["key", "value"]);
        assert_eq!(
            sorter.keys(),
            &[
                ("key".to_string(), SortDirection::Ascending),
                ("value".to_string(), SortDirection::Descending),
            ]
        );
        assert_eq!(rejected, vec!["colour".to_string()]);
    }

    #[test]
    fn test_parse_skips_empty_segments() {
        let (sorter, rejected) = Sorter::parse(Some(" , -,key"), &["key"]);
        assert_eq!(sorter.keys().len(), 1);
        assert!(rejected.is_empty());

        let (sorter, _) = Sorter::parse(None, &["key"]);
        assert!(sorter.is_empty());
    }

    #[test]
    fn test_sort_is_stable() {
        let (sorter, _) = Sorter::parse(Some("key"), &["key"]);
        let mut items = rows();
        sorter.sort(&mut items);

        let values: Vec<(&str, &str)> = items.iter().map(|r| (r.key, r.value)).collect();
        assert_eq!(values, vec![("a", "2"), ("a", "1"), ("b", "1"), ("b", "0")]);
    }

    #[test]
    fn test_sort_multiple_keys_descending() {
        let (sorter, _) = Sorter::parse(Some("-key,value"), &["key", "value"]);
        let mut items = rows();
        sorter.sort(&mut items);

        let values: Vec<(&str, &str)> = items.iter().map(|r| (r.key, r.value)).collect();
        assert_eq!(values, vec![("b", "0"), ("b", "1"), ("a", "1"), ("a", "2")]);
    }

    #[test]
    fn test_empty_sorter_keeps_order() {
        let sorter = Sorter::default();
        let mut items = rows();
        sorter.sort(&mut items);
        assert_eq!(items, rows());
    }
}
