//! HTTP tracker job starter.
use std::sync::Arc;

use tracing::info;
use ttorrent_configuration::HttpTracker;

use crate::core;
use crate::servers::http::server::{Error, HttpServer, Launcher, RunningHttpServer};

/// Starts the HTTP tracker on the configured address.
///
/// # Errors
///
/// Returns the server's startup error when the address cannot be bound.
pub async fn start_job(config: &HttpTracker, tracker: Arc<core::Tracker>) -> Result<RunningHttpServer, Error> {
    let server = HttpServer::new(Launcher::new(config.bind_address)).start(tracker).await?;

    info!("http tracker announce url: {}", server.announce_url());

    Ok(server)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::start_job;
    use crate::core::Tracker;

    #[tokio::test]
    async fn it_should_start_the_http_tracker_job() {
        let configuration = ttorrent_test_helpers::configuration::ephemeral();
        let tracker = Arc::new(Tracker::new(&configuration));

        let server = start_job(&configuration.http_tracker, tracker)
            .await
            .expect("it should start the http tracker");

        server.stop().await.expect("it should stop the http tracker");
    }
}
