use std::time::Duration;

use ttorrent_primitives::DurationSinceUnixEpoch;

use self::stopped::StoppedClock;
use self::working::WorkingClock;

pub mod stopped;
pub mod working;

/// A clock, either working (production) or stopped (tests).
#[derive(Debug)]
pub struct Clock<T> {
    clock: std::marker::PhantomData<T>,
}

/// The working clock: returns the current system time.
pub type Working = Clock<WorkingClock>;
/// The stopped clock: returns a fixed time until it is moved.
pub type Stopped = Clock<StoppedClock>;

/// Types usable as a timestamp source.
pub trait Time: Sized {
    fn now() -> DurationSinceUnixEpoch;

    #[must_use]
    fn now_add(add_time: &Duration) -> Option<DurationSinceUnixEpoch> {
        Self::now().checked_add(*add_time)
    }

    #[must_use]
    fn now_sub(sub_time: &Duration) -> Option<DurationSinceUnixEpoch> {
        Self::now().checked_sub(*sub_time)
    }
}

#[cfg(test)]
mod tests {
    use std::any::TypeId;
    use std::time::Duration;

    use crate::clock::{Stopped, Time, Working};
    use crate::CurrentClock;

    #[test]
    fn it_should_default_to_the_stopped_clock_when_testing() {
        assert_eq!(TypeId::of::<Stopped>(), TypeId::of::<CurrentClock>());
        assert_eq!(Stopped::now(), CurrentClock::now());
    }

    #[test]
    fn it_should_use_a_fixed_time_for_testing() {
        let time = CurrentClock::now();
        std::thread::sleep(Duration::from_millis(10));
        let time_2 = CurrentClock::now();

        assert_eq!(time, time_2);
    }

    #[test]
    fn it_should_have_different_times_on_the_two_clocks() {
        assert_ne!(Stopped::now(), Working::now());
    }
}
