use crate::error::Error;
use hyper::{
    header::{HeaderName, HeaderValue, COOKIE},
    HeaderMap,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use url::form_urlencoded;

pub const CORS_HEADERS: [(&str, &str); 2] = [
    (
        "Access-Control-Allow-Methods",
        "GET, POST, PUT, DELETE, PATCH, OPTIONS, HEAD",
    ),
    (
        "Access-Control-Allow-Headers",
        "Content-Type, Authorization, X-API-Key, X-Request-ID, X-Client-Version",
    ),
];

pub const JSON_CONTENT_TYPE: &str = "application/json";

lazy_static! {
    static ref JSON_CONTENT_TYPE_REGEX: Regex =
        Regex::new(r"(?i)^\s*application/([a-z0-9!#$&^_.-]+\+)?json\s*(;|$)").unwrap();
    static ref FORM_CONTENT_TYPE_REGEX: Regex =
        Regex::new(r"(?i)^\s*application/x-www-form-urlencoded\s*(;|$)").unwrap();
}

pub fn is_json_content_type(content_type: &str) -> bool {
    JSON_CONTENT_TYPE_REGEX.is_match(content_type)
}

pub fn is_form_content_type(content_type: &str) -> bool {
    FORM_CONTENT_TYPE_REGEX.is_match(content_type)
}

pub fn extract_headers(header_map: &HeaderMap) -> BTreeMap<String, String> {
    // it currently ignores header values with opaque characters
    let mut headers = BTreeMap::new();

    for (key, value) in header_map
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str(), v)))
    {
        // cookie pairs join with "; "
        let separator = if key == COOKIE.as_str() { "; " } else { ", " };

        headers
            .entry(key.to_owned())
            .and_modify(|existing: &mut String| {
                existing.push_str(separator);
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_owned());
    }

    headers
}

pub fn put_headers<'a, I: IntoIterator<Item = (&'a str, &'a str)>>(
    header_map: &mut HeaderMap<HeaderValue>,
    headers: I,
) -> Result<(), Error> {
    for (key, value) in headers {
        let header_name = HeaderName::from_lowercase(key.to_lowercase().as_bytes())?;
        let header_value = HeaderValue::from_str(value)?;
        header_map.append(header_name, header_value);
    }

    Ok(())
}

/// Parses `a=1&a=2&tag[]=x` style input into an ordered map.
///
/// Repeated keys collapse into an array in arrival order, and a `[]` suffix
/// always produces an array under the bare key.
pub fn parse_form_pairs(input: &[u8]) -> Map<String, Value> {
    let mut params = Map::new();

    for (key, value) in form_urlencoded::parse(input) {
        let mut key = key.into_owned();
        let force_array = key.ends_with("[]");
        if force_array {
            key.truncate(key.len() - 2);
        }
        if key.is_empty() {
            continue;
        }

        let value = Value::String(value.into_owned());
        match params.get_mut(&key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = std::mem::take(existing);
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                let value = if force_array {
                    Value::Array(vec![value])
                } else {
                    value
                };
                params.insert(key, value);
            }
        }
    }

    params
}
