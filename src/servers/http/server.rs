//! The HTTP server instance controller.
//!
//! It is a state machine: a server starts `Stopped`, [`HttpServer::start`]
//! turns it into `Running` (the listener is bound), and
//! [`HttpServer::stop`] brings it back to `Stopped`. In-flight requests are
//! allowed to finish during a graceful shutdown.
use std::net::SocketAddr;
use std::sync::Arc;

use derive_more::Constructor;
use thiserror::Error;
use tokio::sync::oneshot::{Receiver, Sender};
use tracing::info;

use super::v1::routes::router;
use crate::core::Tracker;

/// Signal sent to a running server to make it shut down.
#[derive(Copy, Clone, Debug)]
pub enum Halted {
    Normal,
}

/// Errors starting or stopping the HTTP server.
#[derive(Error, Debug)]
pub enum Error {
    /// Binding the listener failed; surfaced to the operator at startup.
    #[error("could not start the http tracker on {addr}: {source}")]
    FailedToBind { addr: SocketAddr, source: std::io::Error },

    #[error("could not stop the http tracker: {reason}")]
    FailedToStop { reason: String },
}

/// A HTTP server instance controller with no server running.
pub type StoppedHttpServer = HttpServer<Stopped>;

/// A HTTP server instance controller with a running server.
pub type RunningHttpServer = HttpServer<Running>;

/// The HTTP server controller, parameterized by its state.
pub struct HttpServer<S> {
    pub state: S,
}

/// A stopped server: just the configuration to launch one.
pub struct Stopped {
    launcher: Launcher,
}

/// A running server: the bound address and the handles to wait for it or
/// halt it.
pub struct Running {
    /// The address the listener is actually bound to (useful with port `0`).
    pub binding: SocketAddr,
    halt_task: Sender<Halted>,
    task: tokio::task::JoinHandle<Launcher>,
}

#[derive(Constructor, Debug)]
pub struct Launcher {
    pub bind_to: SocketAddr,
}

impl Launcher {
    async fn start(
        self,
        tracker: Arc<Tracker>,
        rx_halt: Receiver<Halted>,
    ) -> Result<(SocketAddr, tokio::task::JoinHandle<Launcher>), Error> {
        let listener = tokio::net::TcpListener::bind(self.bind_to)
            .await
            .map_err(|source| Error::FailedToBind {
                addr: self.bind_to,
                source,
            })?;

        let binding = listener.local_addr().map_err(|source| Error::FailedToBind {
            addr: self.bind_to,
            source,
        })?;

        info!("starting http tracker on: http://{binding}");

        let app = router(tracker);

        let task = tokio::spawn(async move {
            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                .with_graceful_shutdown(async move {
                    drop(rx_halt.await);
                    info!("shutting down http tracker on: http://{binding}");
                })
                .await
                .expect("the http tracker server should not crash");

            self
        });

        Ok((binding, task))
    }
}

impl HttpServer<Stopped> {
    /// A new server controller in `stopped` state.
    #[must_use]
    pub fn new(launcher: Launcher) -> Self {
        Self {
            state: Stopped { launcher },
        }
    }

    /// Binds the listener and starts serving, moving to `running` state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FailedToBind`] when the configured address cannot be
    /// bound, so the operator sees startup failures directly.
    pub async fn start(self, tracker: Arc<Tracker>) -> Result<HttpServer<Running>, Error> {
        let (tx_halt, rx_halt) = tokio::sync::oneshot::channel::<Halted>();

        let (binding, task) = self.state.launcher.start(tracker, rx_halt).await?;

        Ok(HttpServer {
            state: Running {
                binding,
                halt_task: tx_halt,
                task,
            },
        })
    }
}

impl HttpServer<Running> {
    /// The full announce URL served by this tracker instance.
    #[must_use]
    pub fn announce_url(&self) -> String {
        format!("http://{}/announce", self.state.binding)
    }

    /// Signals a graceful shutdown and waits for the server to finish,
    /// moving back to `stopped` state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FailedToStop`] when the halt channel is already
    /// closed or the server task cannot be joined.
    pub async fn stop(self) -> Result<HttpServer<Stopped>, Error> {
        self.state.halt_task.send(Halted::Normal).map_err(|_| Error::FailedToStop {
            reason: "halt channel was closed".to_owned(),
        })?;

        let launcher = self.state.task.await.map_err(|err| Error::FailedToStop {
            reason: err.to_string(),
        })?;

        Ok(HttpServer {
            state: Stopped { launcher },
        })
    }
}
