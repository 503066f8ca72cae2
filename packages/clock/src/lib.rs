//! Time sources for the tracker.
//!
//! Peer freshness is decided by comparing timestamps, so where the time comes
//! from must be controllable: production code uses the [`clock::Working`]
//! clock, tests use the [`clock::Stopped`] clock which only moves when told
//! to. Both are used through the [`clock::Time`] trait.
//!
//! Each consuming crate declares its own `CurrentClock` alias so that its
//! unit tests automatically get the stopped clock:
//!
//! ```rust
//! #[cfg(not(test))]
//! pub(crate) type CurrentClock = ttorrent_clock::clock::Working;
//!
//! #[cfg(test)]
//! pub(crate) type CurrentClock = ttorrent_clock::clock::Stopped;
//! ```
pub mod clock;
pub mod static_time;

#[macro_use]
extern crate lazy_static;

/// Working clock in production, stopped clock under test.
#[cfg(not(test))]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Working;

#[cfg(test)]
#[allow(dead_code)]
pub(crate) type CurrentClock = clock::Stopped;
