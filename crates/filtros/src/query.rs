use std::collections::{BTreeMap, HashSet};
use url::form_urlencoded;

use crate::types::{Field, FilterState};

/// An href split into its path, query and fragment parts.
/// Works on absolute URLs as well as relative links like `?page=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Href<'a> {
    /// Everything before the `?` (scheme, host and path when present)
    pub path: &'a str,
    /// Query string without the leading `?`
    pub query: &'a str,
    /// Fragment without the leading `#`
    pub fragment: Option<&'a str>,
}

impl<'a> Href<'a> {
    pub fn split(href: &'a str) -> Self {
        let (rest, fragment) = match href.split_once('#') {
            Some((rest, frag)) => (rest, Some(frag)),
            None => (href, None),
        };
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        Self {
            path,
            query,
            fragment,
        }
    }

    fn rebuild(&self, query: &str) -> String {
        let mut out = String::with_capacity(self.path.len() + query.len() + 2);
        out.push_str(self.path);
        if !query.is_empty() {
            out.push('?');
            out.push_str(query);
        }
        if let Some(frag) = self.fragment {
            out.push('#');
            out.push_str(frag);
        }
        out
    }
}

/// Build a `FilterState` from a query string (a leading `?` is allowed).
///
/// Unknown parameters are ignored. When a parameter repeats, the first
/// occurrence decides, even if it is empty.
pub fn parse(query: &str) -> FilterState {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut state = FilterState::new();
    let mut seen = HashSet::new();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        let Some(field) = Field::from_param(&key) else {
            continue;
        };
        if seen.insert(field) {
            state.set(field, &value);
        }
    }

    state
}

/// Parse the query part of a full href or URL
pub fn parse_location(href: &str) -> FilterState {
    parse(Href::split(href).query)
}

/// Encode the present fields of `state` as a query string, without `?`
pub fn encode(state: &FilterState) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (field, value) in state.pairs() {
        serializer.append_pair(field.param(), &value);
    }
    serializer.finish()
}

/// Navigation URL for `state` under `base_path`.
///
/// An empty state yields the bare path; with an empty path as well the
/// result is `?`, which still clears the current query on navigation.
pub fn serialize(state: &FilterState, base_path: &str) -> String {
    let query = encode(state);
    match (base_path.is_empty(), query.is_empty()) {
        (true, true) => "?".to_string(),
        (false, true) => base_path.to_string(),
        _ => format!("{}?{}", base_path, query),
    }
}

/// Overlay the `preserve` fields of `state` onto the query string of `href`.
///
/// Parameters already in the link keep their position; missing ones are
/// appended in serialization order. Fields absent from `state` leave the
/// link untouched, and `page` is never overlaid: the link's own page is
/// its target.
pub fn rewrite_link(href: &str, state: &FilterState, preserve: &[Field]) -> String {
    let parts = Href::split(href);
    let mut pairs = decode_pairs(parts.query);

    for field in Field::FILTERS {
        if !preserve.contains(&field) {
            continue;
        }
        if let Some(value) = state.get(field) {
            set_pair(&mut pairs, field.param(), &value);
        }
    }

    parts.rebuild(&encode_pairs(&pairs))
}

/// First value of parameter `name` in `href`
pub fn get_param(href: &str, name: &str) -> Option<String> {
    form_urlencoded::parse(Href::split(href).query.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

/// Set parameter `name` in `href`, replacing the first occurrence in place
/// and dropping any later duplicates
pub fn set_param(href: &str, name: &str, value: &str) -> String {
    let parts = Href::split(href);
    let mut pairs = decode_pairs(parts.query);
    set_pair(&mut pairs, name, value);
    parts.rebuild(&encode_pairs(&pairs))
}

/// Remove every occurrence of parameter `name` from `href`
pub fn remove_param(href: &str, name: &str) -> String {
    let parts = Href::split(href);
    let mut pairs = decode_pairs(parts.query);
    pairs.retain(|(k, _)| k != name);
    parts.rebuild(&encode_pairs(&pairs))
}

/// All parameters of `href`; a repeated name keeps its last value
pub fn all_params(href: &str) -> BTreeMap<String, String> {
    form_urlencoded::parse(Href::split(href).query.as_bytes())
        .into_owned()
        .collect()
}

fn decode_pairs(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

fn encode_pairs(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish()
}

fn set_pair(pairs: &mut Vec<(String, String)>, name: &str, value: &str) {
    let mut found = false;
    pairs.retain_mut(|(k, v)| {
        if k != name {
            return true;
        }
        if found {
            return false;
        }
        found = true;
        *v = value.to_string();
        true
    });
    if !found {
        pairs.push((name.to_string(), value.to_string()));
    }
}
