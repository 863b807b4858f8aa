mod deterministic;
mod fault_injection;
mod scenarios;

use crate::{RequestSnapshot, ResponseEnvelope};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Debug;

pub use deterministic::{success_message, success_status, DeterministicPolicy};
pub use fault_injection::{FaultInjectionPolicy, FAILURE_PROBABILITY};
pub use scenarios::{
    ErrorScenario, TemplateValue, ERROR_SCENARIOS, TRACE_ID_PREFIX, TRACE_ID_SUFFIX_LEN,
};

/// Decides the status and body a destination answers a captured request with.
pub trait ResponsePolicy: Debug + Send + Sync {
    fn identity(&self) -> &DestinationIdentity;

    fn render_at(&self, snapshot: &RequestSnapshot, now: DateTime<Utc>) -> ResponseEnvelope;

    fn render(&self, snapshot: &RequestSnapshot) -> ResponseEnvelope {
        self.render_at(snapshot, Utc::now())
    }
}

/// The fields a destination stamps on every body it renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationIdentity {
    pub app: &'static str,
    pub display_name: &'static str,
    pub port: u16,
    pub note: &'static str,
    pub lucky: Option<&'static str>,
}

impl DestinationIdentity {
    pub fn deterministic(port: u16) -> Self {
        Self {
            app: "test-destination-app1",
            display_name: "App1",
            port,
            note: "This response came from APP1 (Response Source)",
            lucky: None,
        }
    }

    pub fn fault_success(port: u16) -> Self {
        Self {
            app: "test-destination-app3-error-simulator",
            display_name: "App3",
            port,
            note: "This success response came from APP3 (Error Simulator)",
            lucky: Some("You got a success response! (30% chance)"),
        }
    }

    pub fn fault_error(port: u16) -> Self {
        Self {
            note: "This error response came from APP3 (Error Simulator)",
            lucky: None,
            ..Self::fault_success(port)
        }
    }
}

// millisecond precision with a `Z` suffix, e.g. 2024-05-01T09:30:00.123Z
pub(crate) fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}
