use super::{iso_timestamp, DestinationIdentity, ResponsePolicy};
use crate::{HttpMethod, RequestSnapshot, ResponseEnvelope};
use chrono::{DateTime, Utc};
use hyper::StatusCode;
use serde_json::{json, Value};

pub fn success_status(method: &HttpMethod) -> StatusCode {
    match method {
        HttpMethod::Post => StatusCode::CREATED,
        HttpMethod::Delete => StatusCode::NO_CONTENT,
        _ => StatusCode::OK,
    }
}

pub fn success_message(method: &HttpMethod, display_name: &str) -> String {
    match method {
        HttpMethod::Post => format!("Resource created successfully by {}", display_name),
        HttpMethod::Delete => format!("Resource deleted successfully by {}", display_name),
        other => format!("{} request successfully processed by {}", other, display_name),
    }
}

/// Success-shaped rendering shared by both destinations.
pub(crate) fn render_success(
    identity: &DestinationIdentity,
    snapshot: &RequestSnapshot,
    now: DateTime<Utc>,
) -> ResponseEnvelope {
    let status = success_status(&snapshot.method);
    if status == StatusCode::NO_CONTENT {
        return ResponseEnvelope::empty(status);
    }

    let mut body = json!({
        "app": identity.app,
        "port": identity.port,
        "timestamp": iso_timestamp(now),
        "received": snapshot,
        "message": success_message(&snapshot.method, identity.display_name),
        "note": identity.note,
    });

    if let (Some(lucky), Some(fields)) = (identity.lucky, body.as_object_mut()) {
        fields.insert("lucky".into(), Value::from(lucky));
    }

    ResponseEnvelope::json(status, body)
}

#[derive(Debug, Clone)]
pub struct DeterministicPolicy {
    identity: DestinationIdentity,
}

impl DeterministicPolicy {
    pub fn new(port: u16) -> Self {
        Self {
            identity: DestinationIdentity::deterministic(port),
        }
    }
}

impl ResponsePolicy for DeterministicPolicy {
    fn identity(&self) -> &DestinationIdentity {
        &self.identity
    }

    fn render_at(&self, snapshot: &RequestSnapshot, now: DateTime<Utc>) -> ResponseEnvelope {
        render_success(&self.identity, snapshot, now)
    }
}
