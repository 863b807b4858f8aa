use crate::{util, HttpMethod, RequestSnapshot};
use flate2::read::{GzDecoder, ZlibDecoder};
use hyper::{
    body::HttpBody,
    header::{CONTENT_ENCODING, CONTENT_TYPE},
    http::request::Parts,
    Body, HeaderMap, Request,
};
use serde_json::Value;
use std::io::Read;
use tracing::warn;

/// Reads the request and records its shape. Never fails: a body that can't
/// be read, is too large or doesn't parse is captured as absent.
pub async fn capture_request(request: Request<Body>, body_limit: usize) -> RequestSnapshot {
    let (parts, mut body) = request.into_parts();
    let bytes = read_body(&mut body, body_limit)
        .await
        .and_then(|bytes| decode_body(&parts.headers, bytes, body_limit));

    snapshot_from_parts(&parts, bytes.as_deref())
}

pub fn snapshot_from_parts(parts: &Parts, body: Option<&[u8]>) -> RequestSnapshot {
    RequestSnapshot {
        method: HttpMethod::from(&parts.method),
        original_url: parts.uri.to_string(),
        path: parts.uri.path().to_owned(),
        query: parts
            .uri
            .query()
            .map(|query| util::parse_form_pairs(query.as_bytes()))
            .unwrap_or_default(),
        headers: util::extract_headers(&parts.headers),
        body: body.and_then(|bytes| parse_body(&parts.headers, bytes)),
    }
}

/// Reads the whole body, keeping at most `limit` bytes. An oversized body is
/// still read to the end so the client finishes writing before the response
/// goes out.
async fn read_body(body: &mut Body, limit: usize) -> Option<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut over_limit = false;

    while let Some(chunk) = body.data().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!(error = %e, "couldn't read the request body, capturing it as empty");
                return None;
            }
        };

        if over_limit {
            continue;
        }
        if buffer.len() + chunk.len() > limit {
            warn!(limit, "request body is over the limit, capturing it as empty");
            over_limit = true;
            buffer = Vec::new();
            continue;
        }
        buffer.extend_from_slice(&chunk);
    }

    if over_limit {
        None
    } else {
        Some(buffer)
    }
}

/// Inflates `gzip` and `deflate` bodies. The limit applies to the inflated
/// size as well.
fn decode_body(headers: &HeaderMap, bytes: Vec<u8>, limit: usize) -> Option<Vec<u8>> {
    let encoding = match headers.get(CONTENT_ENCODING) {
        Some(value) => value.to_str().ok()?.trim().to_ascii_lowercase(),
        None => return Some(bytes),
    };

    let decoder: Box<dyn Read + '_> = match encoding.as_str() {
        "" | "identity" => return Some(bytes),
        "gzip" => Box::new(GzDecoder::new(&bytes[..])),
        "deflate" => Box::new(ZlibDecoder::new(&bytes[..])),
        other => {
            warn!(encoding = other, "unsupported content encoding, capturing the body as empty");
            return None;
        }
    };

    let mut decoded = Vec::new();
    match decoder.take(limit as u64 + 1).read_to_end(&mut decoded) {
        Ok(_) if decoded.len() > limit => {
            warn!(limit, "inflated request body is over the limit, capturing it as empty");
            None
        }
        Ok(_) => Some(decoded),
        Err(e) => {
            warn!(error = %e, encoding = %encoding, "couldn't inflate the request body, capturing it as empty");
            None
        }
    }
}

fn parse_body(headers: &HeaderMap, bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }

    let content_type = headers.get(CONTENT_TYPE)?.to_str().ok()?;

    if util::is_json_content_type(content_type) {
        match serde_json::from_slice(bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "malformed JSON body, capturing it as empty");
                None
            }
        }
    } else if util::is_form_content_type(content_type) {
        Some(Value::Object(util::parse_form_pairs(bytes)))
    } else {
        None
    }
}
