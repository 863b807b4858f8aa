mod capture;
mod destination_configuration;
mod error;
pub mod logging;
pub mod policy;
mod random_source;
pub mod runner;
mod snapshot;
mod test_destination;
mod util;

pub use capture::{capture_request, snapshot_from_parts};
pub use destination_configuration::{
    DestinationConfiguration, DestinationKind, LogFormat, BODY_LIMIT_VAR, DEFAULT_BODY_LIMIT,
    HOST_VAR, LOG_FORMAT_VAR, PORT_VAR,
};
pub use error::Error;
pub use random_source::{RandomSource, ScriptedRandom, ThreadRandom};
pub use shadow_destinations_codegen::deterministic_destination_test;
pub use shadow_destinations_codegen::fault_destination_test;
pub use snapshot::{HttpMethod, RequestSnapshot, ResponseEnvelope};
pub use test_destination::TestDestination;
pub use util::CORS_HEADERS;
