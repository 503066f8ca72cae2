//! Long-running jobs started by the application: the HTTP tracker and the
//! peer collector.
pub mod http_tracker;
pub mod peer_collector;
