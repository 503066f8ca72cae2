//! Helpers shared by the test suites of the workspace crates.
pub mod configuration;
pub mod random;
