//! Process setup: logging and the application jobs.
pub mod jobs;
pub mod logging;
