use super::{
    deterministic::render_success, scenarios::ERROR_SCENARIOS, DestinationIdentity,
    ResponsePolicy,
};
use crate::{random_source::RandomSource, RequestSnapshot, ResponseEnvelope};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Chance that a request is answered from the error catalog.
pub const FAILURE_PROBABILITY: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct FaultInjectionPolicy {
    success_identity: DestinationIdentity,
    error_identity: DestinationIdentity,
    random: Arc<dyn RandomSource>,
}

impl FaultInjectionPolicy {
    pub fn new(port: u16, random: Arc<dyn RandomSource>) -> Self {
        Self {
            success_identity: DestinationIdentity::fault_success(port),
            error_identity: DestinationIdentity::fault_error(port),
            random,
        }
    }
}

impl ResponsePolicy for FaultInjectionPolicy {
    fn identity(&self) -> &DestinationIdentity {
        &self.success_identity
    }

    fn render_at(&self, snapshot: &RequestSnapshot, now: DateTime<Utc>) -> ResponseEnvelope {
        if self.random.next_unit() >= FAILURE_PROBABILITY {
            return render_success(&self.success_identity, snapshot, now);
        }

        let scenario = &ERROR_SCENARIOS[self.random.next_index(ERROR_SCENARIOS.len())];
        debug!(
            status = scenario.status.as_u16(),
            code = scenario.code().unwrap_or_default(),
            "injecting error scenario"
        );

        scenario.materialize(snapshot, &self.error_identity, now, self.random.as_ref())
    }
}
