use crate::{
    capture, error::Error, logging, policy::ResponsePolicy, util, DestinationConfiguration,
    DestinationKind, ResponseEnvelope,
};
use futures::future::{self, Either};
use hyper::{
    server::conn::AddrIncoming,
    service::{make_service_fn, service_fn},
    Body, Method, Request, Response, Server, StatusCode,
};
use std::{convert::Infallible, future::Future, net::SocketAddr, sync::Arc};
use tracing::{error, info, warn};

/// A policy plus the capture settings it runs with. Cheap to clone; every
/// connection gets its own handle.
#[derive(Debug, Clone)]
pub struct Destination {
    kind: DestinationKind,
    policy: Arc<dyn ResponsePolicy>,
    body_limit: usize,
}

impl Destination {
    pub fn from_configuration(
        configuration: &DestinationConfiguration,
        port: u16,
    ) -> Result<Self, Error> {
        Ok(Self {
            kind: configuration.kind(),
            policy: configuration.response_policy(port)?,
            body_limit: configuration.body_limit(),
        })
    }

    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        // preflight never reaches the policy
        let envelope = if request.method() == Method::OPTIONS {
            ResponseEnvelope::empty(StatusCode::OK)
        } else {
            let snapshot = capture::capture_request(request, self.body_limit).await;
            logging::log_incoming(&snapshot);

            let envelope = self.policy.render(&snapshot);
            logging::log_outgoing(&envelope);
            envelope
        };

        match envelope.into_response() {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "couldn't build the response");
                internal_error_response()
            }
        }
    }

    fn log_banner(&self) {
        let port = self.policy.identity().port;

        match self.kind {
            DestinationKind::Deterministic => {
                info!("Test Destination App1 is running on port {}", port);
                info!("Ready to receive forwarded traffic from HTTP Shadower");
                info!("All incoming requests will be logged to console");
            }
            DestinationKind::FaultInjection => {
                info!(
                    "Test Destination App3 (Error Simulator) is running on port {}",
                    port
                );
                info!("Ready to receive forwarded traffic from HTTP Shadower");
                info!("This app randomly throws errors (70% chance) or returns success (30% chance)");
            }
        }
    }
}

fn internal_error_response() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;

    if let Err(e) = util::put_headers(response.headers_mut(), util::CORS_HEADERS.iter().copied()) {
        error!(error = %e, "couldn't add CORS headers to the error response");
    }

    response
}

pub fn bind(addr: SocketAddr) -> Result<AddrIncoming, Error> {
    AddrIncoming::bind(&addr).map_err(|e| Error::Bind(addr, e))
}

/// Runs the destination described by `configuration` until SIGINT or SIGTERM.
pub async fn serve(configuration: DestinationConfiguration) -> Result<(), Error> {
    let incoming = bind(configuration.socket_addr())?;
    let destination = Destination::from_configuration(&configuration, incoming.local_addr().port())?;

    serve_destination(destination, incoming, shutdown_signal()).await
}

/// Serves `destination` on `incoming` until `shutdown` resolves. In-flight
/// connections are not drained.
pub async fn serve_destination<F: Future<Output = ()>>(
    destination: Destination,
    incoming: AddrIncoming,
    shutdown: F,
) -> Result<(), Error> {
    destination.log_banner();
    let display_name = destination.policy.identity().display_name;
    let destination = Arc::new(destination);

    let server = Server::builder(incoming).serve(make_service_fn(move |_| {
        let destination = destination.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |request| {
                let destination = destination.clone();
                async move { Ok::<_, Infallible>(destination.handle(request).await) }
            }))
        }
    }));

    futures::pin_mut!(server, shutdown);

    match future::select(server, shutdown).await {
        Either::Left((result, _)) => result.map_err(Error::from),
        Either::Right(((), _)) => {
            info!("{} shutting down gracefully...", display_name);
            Ok(())
        }
    }
}

pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
                return;
            }
            Err(e) => warn!(error = %e, "couldn't listen for SIGTERM"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "couldn't listen for Ctrl-C, running until killed");
        future::pending::<()>().await;
    }
}
