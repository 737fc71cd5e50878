//! Time sources used for credential expiry decisions.

// self
use crate::_prelude::*;

/// Source of the current UTC instant.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Returns the current instant.
	fn now(&self) -> OffsetDateTime;
}

/// Wall-clock time via [`OffsetDateTime::now_utc`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// Manually driven clock for tests and simulations.
#[derive(Debug)]
pub struct ManualClock(Mutex<OffsetDateTime>);
impl ManualClock {
	/// Creates a clock frozen at `start`.
	pub fn new(start: OffsetDateTime) -> Self {
		Self(Mutex::new(start))
	}

	/// Moves the clock forward (or backward, for negative values) by `delta`.
	pub fn advance(&self, delta: Duration) {
		*self.0.lock() += delta;
	}

	/// Pins the clock to `instant`.
	pub fn set(&self, instant: OffsetDateTime) {
		*self.0.lock() = instant;
	}
}
impl Clock for ManualClock {
	fn now(&self) -> OffsetDateTime {
		*self.0.lock()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn manual_clock_advances_and_pins() {
		let clock = ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC));

		clock.advance(Duration::seconds(70));

		assert_eq!(clock.now(), macros::datetime!(2025-01-01 00:01:10 UTC));

		clock.set(macros::datetime!(2025-02-01 00:00 UTC));

		assert_eq!(clock.now(), macros::datetime!(2025-02-01 00:00 UTC));
	}

	#[test]
	fn system_clock_is_utc() {
		assert!(SystemClock.now().offset().is_utc());
	}
}
