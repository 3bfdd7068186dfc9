//! Choice lists for select, radio and multi-select fields.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Lists longer than this get a search box.
pub const SEARCH_THRESHOLD: usize = 5;

/// One selectable choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: Value,
}

impl SelectOption {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Whether a list of `count` options should offer searching.
pub fn search_enabled(count: usize) -> bool {
    count > SEARCH_THRESHOLD
}

/// Keep the items whose key contains `filter` (case-insensitively), then
/// optionally sort them by key, case-insensitively.
///
/// An empty filter keeps everything. Sorting is stable.
///
/// # Example
///
/// ```
/// use formwire::options::{SelectOption, filter_and_sort};
///
/// let options = vec![
///     SelectOption::new("Gold", "g"),
///     SelectOption::new("bronze", "b"),
///     SelectOption::new("Silver", "s"),
/// ];
/// let found = filter_and_sort(&options, "L", |o| o.label.as_str(), true);
/// let labels: Vec<_> = found.iter().map(|o| o.label.as_str()).collect();
/// assert_eq!(labels, ["Gold", "Silver"]);
/// ```
pub fn filter_and_sort<'a, T, F>(items: &'a [T], filter: &str, key: F, sort: bool) -> Vec<&'a T>
where
    F: Fn(&T) -> &str,
{
    let needle = filter.to_lowercase();
    let mut result: Vec<&T> = items
        .iter()
        .filter(|item| needle.is_empty() || key(*item).to_lowercase().contains(&needle))
        .collect();

    if sort && result.len() > 1 {
        result.sort_by_cached_key(|item| key(*item).to_lowercase());
    }
    result
}
