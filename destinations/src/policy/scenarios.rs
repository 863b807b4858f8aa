use super::{iso_timestamp, DestinationIdentity};
use crate::{random_source::RandomSource, RequestSnapshot, ResponseEnvelope};
use chrono::{DateTime, Utc};
use hyper::StatusCode;
use lazy_static::lazy_static;
use serde_json::{json, Map, Value};

pub const TRACE_ID_PREFIX: &str = "trace-";
pub const TRACE_ID_SUFFIX_LEN: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    Fixed(Value),
    /// Replaced with the request's original URL.
    RequestedPath,
    /// Replaced with a freshly generated trace id.
    TraceId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorScenario {
    pub status: StatusCode,
    pub template: Vec<(&'static str, TemplateValue)>,
}

impl ErrorScenario {
    fn new(
        status: StatusCode,
        error: &str,
        message: &str,
        code: &str,
        extras: Vec<(&'static str, TemplateValue)>,
    ) -> Self {
        let mut template = vec![
            ("error", TemplateValue::Fixed(error.into())),
            ("message", TemplateValue::Fixed(message.into())),
            ("code", TemplateValue::Fixed(code.into())),
        ];
        template.extend(extras);

        Self { status, template }
    }

    pub fn code(&self) -> Option<&str> {
        self.template.iter().find_map(|(field, value)| match value {
            TemplateValue::Fixed(Value::String(code)) if *field == "code" => Some(code.as_str()),
            _ => None,
        })
    }

    /// Turns the template into a response body for `snapshot`.
    ///
    /// Template fields come first in catalog order, followed by the request
    /// context: `timestamp`, `path`, `method`, `app`, `port` and `note`.
    pub fn materialize(
        &self,
        snapshot: &RequestSnapshot,
        identity: &DestinationIdentity,
        now: DateTime<Utc>,
        random: &dyn RandomSource,
    ) -> ResponseEnvelope {
        let mut body = Map::new();

        for (field, value) in &self.template {
            let value = match value {
                TemplateValue::Fixed(value) => value.clone(),
                TemplateValue::RequestedPath => Value::from(snapshot.original_url.as_str()),
                TemplateValue::TraceId => Value::from(format!(
                    "{}{}",
                    TRACE_ID_PREFIX,
                    random.next_alphanumeric(TRACE_ID_SUFFIX_LEN)
                )),
            };
            body.insert((*field).to_owned(), value);
        }

        body.insert("timestamp".into(), iso_timestamp(now).into());
        body.insert("path".into(), snapshot.original_url.as_str().into());
        body.insert("method".into(), snapshot.method.as_str().into());
        body.insert("app".into(), identity.app.into());
        body.insert("port".into(), identity.port.into());
        body.insert("note".into(), identity.note.into());

        ResponseEnvelope::json(self.status, Value::Object(body))
    }
}

fn fixed(value: Value) -> TemplateValue {
    TemplateValue::Fixed(value)
}

lazy_static! {
    pub static ref ERROR_SCENARIOS: [ErrorScenario; 10] = [
        ErrorScenario::new(
            StatusCode::BAD_REQUEST,
            "Bad Request",
            "Invalid request parameters",
            "INVALID_PARAMS",
            vec![(
                "details",
                fixed(json!("The request contains malformed or missing parameters")),
            )],
        ),
        ErrorScenario::new(
            StatusCode::UNAUTHORIZED,
            "Unauthorized",
            "Authentication required",
            "AUTH_REQUIRED",
            vec![],
        ),
        ErrorScenario::new(
            StatusCode::FORBIDDEN,
            "Forbidden",
            "Access denied",
            "ACCESS_DENIED",
            vec![(
                "details",
                fixed(json!("You do not have permission to access this resource")),
            )],
        ),
        ErrorScenario::new(
            StatusCode::NOT_FOUND,
            "Not Found",
            "Resource not found",
            "RESOURCE_NOT_FOUND",
            vec![("requestedPath", TemplateValue::RequestedPath)],
        ),
        ErrorScenario::new(
            StatusCode::CONFLICT,
            "Conflict",
            "Resource already exists",
            "DUPLICATE_RESOURCE",
            vec![("conflictField", fixed(json!("email")))],
        ),
        ErrorScenario::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Unprocessable Entity",
            "Validation failed",
            "VALIDATION_ERROR",
            vec![(
                "errors",
                fixed(json!([
                    { "field": "email", "message": "Invalid email format" },
                    { "field": "age", "message": "Must be a positive number" }
                ])),
            )],
        ),
        ErrorScenario::new(
            StatusCode::TOO_MANY_REQUESTS,
            "Too Many Requests",
            "Rate limit exceeded",
            "RATE_LIMIT_EXCEEDED",
            vec![("retryAfter", fixed(json!(60)))],
        ),
        ErrorScenario::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
            "An unexpected error occurred",
            "INTERNAL_ERROR",
            vec![("traceId", TemplateValue::TraceId)],
        ),
        ErrorScenario::new(
            StatusCode::BAD_GATEWAY,
            "Bad Gateway",
            "Upstream service unavailable",
            "UPSTREAM_ERROR",
            vec![],
        ),
        ErrorScenario::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Service Unavailable",
            "Service is temporarily unavailable",
            "SERVICE_UNAVAILABLE",
            vec![("retryAfter", fixed(json!(30)))],
        ),
    ];
}
