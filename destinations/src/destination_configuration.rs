use crate::{
    error::Error,
    policy::{DeterministicPolicy, FaultInjectionPolicy, ResponsePolicy},
    random_source::{RandomSource, ThreadRandom},
};
use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    str::FromStr,
    sync::Arc,
};

pub const PORT_VAR: &str = "PORT";
pub const HOST_VAR: &str = "DESTINATION_HOST";
pub const BODY_LIMIT_VAR: &str = "DESTINATION_BODY_LIMIT";
pub const LOG_FORMAT_VAR: &str = "DESTINATION_LOG_FORMAT";

pub const DEFAULT_BODY_LIMIT: usize = 100 * 1024;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DestinationKind {
    Deterministic,
    FaultInjection,
}

impl DestinationKind {
    pub fn default_port(self) -> u16 {
        match self {
            DestinationKind::Deterministic => 3001,
            DestinationKind::FaultInjection => 3003,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(Error::InvalidConfiguration(LOG_FORMAT_VAR, s.into())),
        }
    }
}

/// Everything needed to run one destination.
#[derive(Debug, Clone)]
pub struct DestinationConfiguration {
    kind: DestinationKind,
    host: IpAddr,
    port: u16,
    body_limit: usize,
    log_format: LogFormat,
    random_source: Option<Arc<dyn RandomSource>>,
}

impl DestinationConfiguration {
    /// Create a configuration with the defaults for `kind`: all interfaces,
    /// the kind's default port and a 100 KiB body limit.
    pub fn new(kind: DestinationKind) -> Self {
        Self {
            kind,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: kind.default_port(),
            body_limit: DEFAULT_BODY_LIMIT,
            log_format: LogFormat::Text,
            random_source: None,
        }
    }

    /// Create a configuration for `kind` from the process environment.
    ///
    /// # Arguments
    /// `kind` - which destination is being configured.
    ///
    /// # Returns
    /// The configuration, or `Error::InvalidConfiguration` naming the first
    /// variable that couldn't be parsed.
    pub fn from_env(kind: DestinationKind) -> Result<Self, Error> {
        Self::from_lookup(kind, |name| env::var(name).ok())
    }

    /// Same as `from_env`, but reads variables through `lookup`.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(
        kind: DestinationKind,
        lookup: F,
    ) -> Result<Self, Error> {
        let mut configuration = Self::new(kind);

        if let Some(port) = lookup(PORT_VAR) {
            configuration.port = parse_var(PORT_VAR, &port)?;
        }
        if let Some(host) = lookup(HOST_VAR) {
            configuration.host = parse_var(HOST_VAR, &host)?;
        }
        if let Some(body_limit) = lookup(BODY_LIMIT_VAR) {
            configuration.body_limit = parse_var(BODY_LIMIT_VAR, &body_limit)?;
        }
        if let Some(log_format) = lookup(LOG_FORMAT_VAR) {
            configuration.log_format = log_format.parse()?;
        }

        Ok(configuration)
    }

    pub fn kind(&self) -> DestinationKind {
        self.kind
    }

    pub fn set_host(&mut self, host: IpAddr) {
        self.host = host;
    }

    pub fn host(&self) -> IpAddr {
        self.host
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn set_body_limit(&mut self, body_limit: usize) {
        self.body_limit = body_limit;
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    pub fn set_log_format(&mut self, log_format: LogFormat) {
        self.log_format = log_format;
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    pub fn set_random_source(&mut self, random_source: Arc<dyn RandomSource>) {
        self.random_source = Some(random_source);
    }

    /// The injected random source, or a `ThreadRandom` when none was set.
    /// Fails if the source doesn't pass its `check`.
    pub fn random_source(&self) -> Result<Arc<dyn RandomSource>, Error> {
        match &self.random_source {
            Some(random_source) => {
                random_source.check()?;
                Ok(random_source.clone())
            }
            None => Ok(Arc::new(ThreadRandom::new()?)),
        }
    }

    /// Build the policy for this destination. `port` is the port actually
    /// bound, which differs from `port()` when it was 0.
    pub fn response_policy(&self, port: u16) -> Result<Arc<dyn ResponsePolicy>, Error> {
        Ok(match self.kind {
            DestinationKind::Deterministic => Arc::new(DeterministicPolicy::new(port)),
            DestinationKind::FaultInjection => {
                Arc::new(FaultInjectionPolicy::new(port, self.random_source()?))
            }
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str, value: &str) -> Result<T, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidConfiguration(name, value.into()))
}
