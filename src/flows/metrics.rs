//! Always-on in-process counters, independent of the optional `metrics` recorder.

// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe attempt/success/failure counters for one flow.
#[derive(Debug, Default)]
pub struct FlowCounters {
	attempts: AtomicU64,
	successes: AtomicU64,
	failures: AtomicU64,
}
impl FlowCounters {
	/// Number of attempts started.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Number of successful completions.
	pub fn successes(&self) -> u64 {
		self.successes.load(Ordering::Relaxed)
	}

	/// Number of failures.
	pub fn failures(&self) -> u64 {
		self.failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.successes.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failures.fetch_add(1, Ordering::Relaxed);
	}
}

/// Counters the session keeps for its bounded flows, so callers and tests can assert call
/// counts such as the one-refresh-per-resource-retry limit.
#[derive(Debug, Default)]
pub struct SessionMetrics {
	/// Counters for refresh-token exchanges.
	pub refresh: FlowCounters,
	/// Counters for protected-resource requests; every HTTP attempt counts once.
	pub resource: FlowCounters,
}
