//! Sort helpers for derived views.
//!
//! All view sorts are stable (equal keys keep their incoming order) and
//! deterministic: records with a missing sort key always sort last, in both
//! directions, regardless of input order.

use std::cmp::Ordering;
use std::sync::Arc;

/// Sort direction for a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Stable-sort `items` by an optional key. Missing keys sort last.
pub(crate) fn sort_by_optional_key<T, K: Ord>(
    items: &mut [Arc<T>],
    direction: SortDirection,
    key: impl Fn(&T) -> Option<K>,
) {
    items.sort_by(|a, b| match (key(a), key(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(ka), Some(kb)) => match direction {
            SortDirection::Asc => ka.cmp(&kb),
            SortDirection::Desc => kb.cmp(&ka),
        },
    });
}
