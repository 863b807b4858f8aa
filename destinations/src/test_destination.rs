use crate::{
    error::Error,
    runner::{self, Destination},
    DestinationConfiguration,
};
use futures::channel::oneshot;
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::mpsc,
    thread::{self, JoinHandle},
};
use tokio::runtime::Runtime;

/// A destination served from a background thread, for use in tests.
///
/// The server runs on its own tokio runtime, so tests can talk to it with a
/// blocking client. Dropping the handle stops the server.
#[derive(Debug)]
pub struct TestDestination {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<Result<(), Error>>>,
}

impl TestDestination {
    pub fn start(configuration: DestinationConfiguration) -> Result<Self, Error> {
        let (ready_sender, ready_receiver) = mpsc::channel::<Result<SocketAddr, Error>>();
        let (shutdown_sender, shutdown_receiver) = oneshot::channel::<()>();

        let join_handle = thread::spawn(move || -> Result<(), Error> {
            Runtime::new()?.block_on(async move {
                let prepared = runner::bind(configuration.socket_addr()).and_then(|incoming| {
                    let port = incoming.local_addr().port();
                    Destination::from_configuration(&configuration, port)
                        .map(|destination| (incoming, destination))
                });

                let (incoming, destination) = match prepared {
                    Ok(prepared) => prepared,
                    Err(e) => {
                        let _ = ready_sender.send(Err(e));
                        return Ok(());
                    }
                };

                let _ = ready_sender.send(Ok(incoming.local_addr()));
                runner::serve_destination(destination, incoming, async {
                    let _ = shutdown_receiver.await;
                })
                .await
            })
        });

        match ready_receiver.recv() {
            Ok(Ok(addr)) => Ok(Self {
                addr,
                shutdown: Some(shutdown_sender),
                join_handle: Some(join_handle),
            }),
            Ok(Err(e)) => {
                let _ = join_handle.join();
                Err(e)
            }
            // the thread exited before binding
            Err(_) => match join_handle.join() {
                Ok(Err(e)) => Err(e),
                _ => Err(Error::ServerThreadPanicked),
            },
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// `http://host:port` with no trailing slash. An unspecified bind
    /// address is reported as loopback.
    pub fn base_url(&self) -> String {
        let ip = if self.addr.ip().is_unspecified() {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            self.addr.ip()
        };

        format!("http://{}", SocketAddr::new(ip, self.addr.port()))
    }

    pub fn url<S: AsRef<str>>(&self, path_and_query: S) -> String {
        format!("{}{}", self.base_url(), path_and_query.as_ref())
    }

    pub fn stop(mut self) -> Result<(), Error> {
        self.shutdown_and_join()
    }

    fn shutdown_and_join(&mut self) -> Result<(), Error> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        match self.join_handle.take() {
            Some(join_handle) => join_handle
                .join()
                .map_err(|_| Error::ServerThreadPanicked)?,
            None => Ok(()),
        }
    }
}

impl Drop for TestDestination {
    fn drop(&mut self) {
        let _ = self.shutdown_and_join();
    }
}
