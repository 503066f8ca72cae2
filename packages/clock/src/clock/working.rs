use std::time::SystemTime;

use ttorrent_primitives::DurationSinceUnixEpoch;

use crate::clock;

pub struct WorkingClock;

impl clock::Time for clock::Working {
    fn now() -> DurationSinceUnixEpoch {
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("system time is before the unix epoch")
    }
}
