use std::path::Path;
use std::sync::Arc;

use tracing::info;
use ttorrent::{app, bootstrap, core};
use ttorrent_configuration::Configuration;

#[tokio::main]
async fn main() {
    let configuration = match std::env::args().nth(1) {
        Some(path) => Configuration::load_from_file(Path::new(&path)).expect("it should load the configuration file"),
        None => Configuration::default(),
    };

    bootstrap::logging::setup(&configuration);

    let tracker = Arc::new(core::Tracker::new(&configuration));

    let jobs = app::start(&configuration, tracker)
        .await
        .expect("it should start the tracker application");

    tokio::signal::ctrl_c().await.expect("it should listen for the shutdown signal");

    info!("shutting down...");
    jobs.stop().await;
}
