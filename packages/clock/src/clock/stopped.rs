use std::time::Duration;

use ttorrent_primitives::DurationSinceUnixEpoch;

use super::Time;
use crate::clock;

pub struct StoppedClock {}

/// Control surface of the stopped clock. The fixed time is thread-local, so
/// tests running in parallel do not interfere with each other.
pub trait Stopped: Time {
    /// Set the clock to a given time.
    fn local_set(unix_time: &DurationSinceUnixEpoch);

    /// Set the clock to the Unix Epoch.
    fn local_set_to_unix_epoch() {
        Self::local_set(&DurationSinceUnixEpoch::ZERO);
    }

    /// Set the clock to the current system time.
    fn local_set_to_system_time_now();

    /// Move the clock forward.
    fn local_add(duration: &Duration);

    /// Move the clock backward.
    fn local_sub(duration: &Duration);

    /// Reset the clock to its default fixed time.
    fn local_reset();
}

impl Time for clock::Stopped {
    fn now() -> DurationSinceUnixEpoch {
        detail::FIXED_TIME.with(|time| *time.borrow())
    }
}

impl Stopped for clock::Stopped {
    fn local_set(unix_time: &DurationSinceUnixEpoch) {
        detail::FIXED_TIME.with(|time| {
            *time.borrow_mut() = *unix_time;
        });
    }

    fn local_set_to_system_time_now() {
        Self::local_set(&detail::get_app_start_time());
    }

    fn local_add(duration: &Duration) {
        detail::FIXED_TIME.with(|time| {
            let current = *time.borrow();
            *time.borrow_mut() = current.saturating_add(*duration);
        });
    }

    fn local_sub(duration: &Duration) {
        detail::FIXED_TIME.with(|time| {
            let current = *time.borrow();
            *time.borrow_mut() = current.saturating_sub(*duration);
        });
    }

    fn local_reset() {
        Self::local_set(&detail::get_default_fixed_time());
    }
}

mod detail {
    use std::cell::RefCell;
    use std::time::SystemTime;

    use ttorrent_primitives::DurationSinceUnixEpoch;

    use crate::static_time;

    thread_local!(pub static FIXED_TIME: RefCell<DurationSinceUnixEpoch> = RefCell::new(get_default_fixed_time()));

    pub fn get_app_start_time() -> DurationSinceUnixEpoch {
        (*static_time::TIME_AT_APP_START)
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("app start time is after the unix epoch")
    }

    #[cfg(not(test))]
    pub fn get_default_fixed_time() -> DurationSinceUnixEpoch {
        get_app_start_time()
    }

    #[cfg(test)]
    pub fn get_default_fixed_time() -> DurationSinceUnixEpoch {
        DurationSinceUnixEpoch::ZERO
    }
}
