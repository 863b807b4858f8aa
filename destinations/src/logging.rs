use crate::{destination_configuration::LogFormat, RequestSnapshot, ResponseEnvelope};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the global subscriber. `RUST_LOG` overrides the `info` default.
/// Does nothing if a subscriber is already installed.
pub fn init(log_format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = FmtSubscriber::builder().with_env_filter(filter);

    let result = match log_format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish()),
    };

    if result.is_err() {
        tracing::debug!("a global subscriber is already installed");
    }
}

pub fn log_incoming(snapshot: &RequestSnapshot) {
    let query = Value::Object(snapshot.query.clone());
    let headers = serde_json::to_string(&snapshot.headers).unwrap_or_default();

    if let Some(body) = snapshot.body.as_ref().filter(|_| snapshot.has_body()) {
        info!(
            method = %snapshot.method,
            url = %snapshot.original_url,
            path = %snapshot.path,
            query = %query,
            headers = %headers,
            body = %body,
            "incoming request"
        );
    } else {
        info!(
            method = %snapshot.method,
            url = %snapshot.original_url,
            path = %snapshot.path,
            query = %query,
            headers = %headers,
            "incoming request"
        );
    }
}

pub fn log_outgoing(envelope: &ResponseEnvelope) {
    let status = envelope.status.as_u16();

    match &envelope.body {
        Some(body) => info!(status, body = %body, "sending response"),
        None => info!(status, "sending response"),
    }
}
