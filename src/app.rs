//! Application wiring: starts the jobs the tracker process is made of.
//!
//! - The HTTP tracker serving `GET /announce`.
//! - The peer collector sweeping stale peers.
//!
//! Stopping the application stops the collector first and then gracefully
//! shuts the HTTP server down; in-flight requests are allowed to finish.
use std::sync::Arc;

use tracing::info;
use ttorrent_configuration::Configuration;

use crate::bootstrap::jobs::{http_tracker, peer_collector};
use crate::core;
use crate::servers::http::server::{self, RunningHttpServer};

/// The running jobs of a started tracker application.
pub struct Jobs {
    pub http_tracker: RunningHttpServer,
    pub peer_collector: peer_collector::Job,
}

impl Jobs {
    /// Stops all jobs, gracefully.
    pub async fn stop(self) {
        self.peer_collector.stop().await;

        if let Err(err) = self.http_tracker.stop().await {
            info!("error stopping the http tracker: {err}");
        }
    }
}

/// Starts the application jobs.
///
/// # Errors
///
/// Returns the HTTP server's startup error when its address cannot be bound.
pub async fn start(configuration: &Configuration, tracker: Arc<core::Tracker>) -> Result<Jobs, server::Error> {
    let http_tracker = http_tracker::start_job(&configuration.http_tracker, tracker.clone()).await?;

    let peer_collector = peer_collector::start_job(configuration.core.peer_collection_interval, &tracker);

    Ok(Jobs {
        http_tracker,
        peer_collector,
    })
}
