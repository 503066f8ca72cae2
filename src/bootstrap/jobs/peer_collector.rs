//! The peer collector job (the reaper).
//!
//! Every `peer_collection_interval` seconds it sweeps all tracked torrents
//! and removes peers whose last announce is older than the freshness window.
//! The sweep goes torrent by torrent, each under its own swarm lock, so
//! announces for other torrents are never blocked by it.
//!
//! The job observes its halt signal between sweeps and exits promptly; it
//! also exits when the tracker itself has been dropped.
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::core;

/// A running peer collector that can be stopped.
pub struct Job {
    task: JoinHandle<()>,
    halt: tokio::sync::oneshot::Sender<()>,
}

impl Job {
    /// Signals the collector to stop and waits for it.
    pub async fn stop(self) {
        drop(self.halt.send(()));
        drop(self.task.await);
    }
}

/// Spawns the peer collector, sweeping every `interval` seconds.
#[must_use]
pub fn start_job(interval: u64, tracker: &Arc<core::Tracker>) -> Job {
    let weak_tracker = Arc::downgrade(tracker);
    let (halt, mut rx_halt) = tokio::sync::oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval));
        interval.tick().await;

        loop {
            tokio::select! {
                _ = &mut rx_halt => {
                    info!("stopping peer collection job...");
                    break;
                }
                _ = interval.tick() => {
                    if let Some(tracker) = weak_tracker.upgrade() {
                        let start_time = Instant::now();
                        debug!("collecting stale peers...");
                        tracker.cleanup_torrents();
                        debug!("collected stale peers in {}ms", start_time.elapsed().as_millis());
                    } else {
                        break;
                    }
                }
            }
        }
    });

    Job { task, halt }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::start_job;
    use crate::core::Tracker;

    #[tokio::test]
    async fn it_should_observe_the_halt_signal_between_sweeps() {
        let tracker = Arc::new(Tracker::new(&ttorrent_test_helpers::configuration::ephemeral()));

        let job = start_job(3600, &tracker);

        // With an hour-long sweep period, only the halt signal can end the
        // job this quickly.
        tokio::time::timeout(std::time::Duration::from_secs(5), job.stop())
            .await
            .expect("the job should stop before its next sweep");
    }

    #[tokio::test]
    async fn it_should_exit_when_the_tracker_is_dropped() {
        let tracker = Arc::new(Tracker::new(&ttorrent_test_helpers::configuration::ephemeral()));

        let job = start_job(1, &tracker);
        drop(tracker);

        tokio::time::timeout(std::time::Duration::from_secs(5), job.task)
            .await
            .expect("the job should exit once the tracker is gone")
            .expect("the job should not panic");
    }
}
