use crate::{error::Error, util};
use hyper::{header, Body, Response, StatusCode};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::{collections::BTreeMap, fmt::Display};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Other(String),
}

impl HttpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Other(method) => method.as_str(),
        }
    }
}

impl From<&hyper::Method> for HttpMethod {
    fn from(method: &hyper::Method) -> Self {
        match method.as_str() {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            "PUT" => HttpMethod::Put,
            "DELETE" => HttpMethod::Delete,
            "PATCH" => HttpMethod::Patch,
            "OPTIONS" => HttpMethod::Options,
            "HEAD" => HttpMethod::Head,
            other => HttpMethod::Other(other.to_owned()),
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for HttpMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Everything a destination saw about one inbound request.
///
/// Serializes to the `received` object echoed back in success bodies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestSnapshot {
    pub method: HttpMethod,
    #[serde(rename = "url")]
    pub original_url: String,
    pub path: String,
    pub query: Map<String, Value>,
    pub headers: BTreeMap<String, String>,
    #[serde(serialize_with = "serialize_body")]
    pub body: Option<Value>,
}

impl RequestSnapshot {
    /// True when there is a body worth logging: absent bodies and empty
    /// objects, arrays or strings don't count.
    pub fn has_body(&self) -> bool {
        match &self.body {
            None | Some(Value::Null) => false,
            Some(Value::Object(map)) => !map.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::String(text)) => !text.is_empty(),
            Some(_) => true,
        }
    }
}

// an absent body is echoed as `{}`
fn serialize_body<S: Serializer>(body: &Option<Value>, serializer: S) -> Result<S::Ok, S::Error> {
    match body {
        Some(value) => value.serialize(serializer),
        None => Map::new().serialize(serializer),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl ResponseEnvelope {
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    pub fn empty(status: StatusCode) -> Self {
        Self { status, body: None }
    }

    pub fn into_response(self) -> Result<Response<Body>, Error> {
        let mut response_builder = Response::builder().status(self.status);

        if let Some(headers_mut) = response_builder.headers_mut() {
            util::put_headers(headers_mut, util::CORS_HEADERS.iter().copied())?;
            if self.body.is_some() {
                headers_mut.insert(
                    header::CONTENT_TYPE,
                    header::HeaderValue::from_static(util::JSON_CONTENT_TYPE),
                );
            }
        }

        let body = match self.body {
            Some(value) => Body::from(serde_json::to_vec(&value)?),
            None => Body::empty(),
        };

        Ok(response_builder.body(body)?)
    }
}
