// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::obs::{OpKind, OpOutcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"mower_control_op_total",
			"op" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Thread-safe counters describing token cache behavior.
#[derive(Debug, Default)]
pub struct TokenMetrics {
	reuses: AtomicU64,
	exchanges: AtomicU64,
	failures: AtomicU64,
}
impl TokenMetrics {
	/// Calls served from a still-valid cached credential.
	pub fn reuses(&self) -> u64 {
		self.reuses.load(Ordering::Relaxed)
	}

	/// Successful token exchanges.
	pub fn exchanges(&self) -> u64 {
		self.exchanges.load(Ordering::Relaxed)
	}

	/// Failed token exchanges, including missing-credential refusals.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_reuse(&self) {
		self.reuses.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_exchange(&self) {
		self.exchanges.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_op_outcome_is_callable_in_any_build() {
		record_op_outcome(OpKind::SendCommand, OpOutcome::Failure);
	}

	#[test]
	fn token_metrics_count_independently() {
		let metrics = TokenMetrics::default();

		metrics.record_reuse();
		metrics.record_reuse();
		metrics.record_exchange();

		assert_eq!((metrics.reuses(), metrics.exchanges(), metrics.failures()), (2, 1, 0));
	}
}
