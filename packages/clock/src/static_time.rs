//! Time of the application start, fixed at first access.
use std::time::SystemTime;

lazy_static! {
    /// The instant the process (first) asked for it.
    pub static ref TIME_AT_APP_START: SystemTime = SystemTime::now();
}
