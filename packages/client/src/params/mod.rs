//! Request parameter helpers
//!
//! Parameters travel as a flat string map. API wrappers use these helpers
//! to pull required values out of the map, restrict it to the keys an
//! endpoint accepts, and build path segments.

use std::collections::HashMap;

use crate::error::{self, Result};

/// Parameters accepted by every endpoint (index, type and id travel in the
/// path and are not listed).
pub const COMMON_PARAMETERS: [&str; 5] = ["ignore", "body", "node_id", "name", "field"];

/// Parameters accepted by every endpoint that returns a query response.
pub const COMMON_QUERY_PARAMETERS: [&str; 3] = ["format", "pretty", "human"];

pub type Params = HashMap<String, String>;

/// Returns the value for `key`, or `default` when unset.
#[must_use]
pub fn value_or<'a>(params: &'a Params, key: &str, default: &'a str) -> &'a str {
    params.get(key).map_or(default, String::as_str)
}

/// Copy of `params` restricted to the `allowed` keys.
#[must_use]
pub fn only(params: &Params, allowed: &[&str]) -> Params {
    params
        .iter()
        .filter(|(key, _)| allowed.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Sets `key` to `value` unless it is already present.
pub fn set_default(params: &mut Params, key: &str, value: impl Into<String>) {
    params.entry(key.to_string()).or_insert_with(|| value.into());
}

/// Returns the value of a parameter the endpoint cannot do without.
///
/// # Errors
///
/// `missing-required-parameter` when the key is absent and
/// `empty-required-parameter` when its value is empty.
pub fn enforce_parameter<'a>(params: &'a Params, name: &str) -> Result<&'a str> {
    match params.get(name) {
        None => Err(error::missing_required_parameter(name)),
        Some(value) if value.is_empty() => Err(error::empty_required_parameter(name)),
        Some(value) => Ok(value.as_str()),
    }
}

/// Keeps the `allowed` keys plus the common and common-query parameters.
#[must_use]
pub fn extract_parameters(params: &Params, allowed: &[&str]) -> Params {
    let keys: Vec<&str> = allowed
        .iter()
        .copied()
        .chain(COMMON_PARAMETERS)
        .chain(COMMON_QUERY_PARAMETERS)
        .collect();
    only(params, &keys)
}

/// Percent-encodes a value for use in a path segment or list.
#[must_use]
pub fn escape(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Joins path segments, trimming whitespace and slashes and dropping empty
/// segments.
#[must_use]
pub fn pathify<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|segment| {
            segment
                .as_ref()
                .trim_matches(|c: char| c.is_whitespace() || c == '/')
        })
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Comma-separated list of the non-empty items, each escaped.
#[must_use]
pub fn listify<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| item.as_ref())
        .filter(|item| !item.is_empty())
        .map(escape)
        .collect::<Vec<_>>()
        .join(",")
}

/// Query string for `params`, keys sorted so URLs are stable.
///
/// # Errors
///
/// Returns a `builder` error if the pairs cannot be encoded.
pub fn to_query_string(params: &Params) -> Result<String> {
    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    pairs.sort_unstable();
    serde_urlencoded::to_string(pairs).map_err(error::builder)
}
