//! State transitions of the filter bar.
//!
//! Every function here is pure: it takes the current [`FilterState`] and
//! returns the next one (or the link that leads to it). Changing any
//! filter drops the page so the listing restarts at page 1; only
//! pagination moves the page.

use crate::query;
use crate::types::{Field, FilterState};

/// Set `field` to `value` (blank clears it). Any field other than `page`
/// also resets pagination.
pub fn apply_field_change(current: &FilterState, field: Field, value: &str) -> FilterState {
    let mut next = current.clone();
    next.set(field, value);
    if field.is_filter() {
        next.page = None;
    }
    next
}

/// Drop a single filter. Removing a filter is a filter change, so the page
/// is reset too.
pub fn remove_filter(current: &FilterState, field: Field) -> FilterState {
    let mut next = current.clone();
    next.clear(field);
    next.page = None;
    next
}

/// Move to `page`, keeping every filter
pub fn go_to_page(current: &FilterState, page: u32) -> FilterState {
    current.clone().with_page(page)
}

/// True when setting `field` to `value` would not change what it holds
pub fn is_noop(current: &FilterState, field: Field, value: &str) -> bool {
    let mut probe = FilterState::new();
    probe.set(field, value);
    probe.get(field) == current.get(field)
}

/// Link target for a "remove filter" chip
pub fn remove_filter_href(current: &FilterState, field: Field, base_path: &str) -> String {
    query::serialize(&remove_filter(current, field), base_path)
}

/// Make every pagination link carry the active filters
pub fn rewrite_pagination_links<S: AsRef<str>>(hrefs: &[S], current: &FilterState) -> Vec<String> {
    hrefs
        .iter()
        .map(|href| query::rewrite_link(href.as_ref(), current, &Field::FILTERS))
        .collect()
}
