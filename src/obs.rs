//! Optional observability helpers for cache and enumeration operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to emit structured spans named `access_broker.op` with the `op`
//!   and `stage` fields, plus debug events for enumeration run-state transitions.
//! - Enable `metrics` to increment the `access_broker_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`.

mod metrics;
mod tracing;

pub use self::{metrics::*, tracing::*};
pub(crate) use self::tracing::trace_debug;

// self
use crate::_prelude::*;

/// Operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// [`CredentialCache::retrieve`](crate::cache::CredentialCache::retrieve).
	CredentialRetrieve,
	/// [`BoundedEnumerator::enumerate`](crate::enumerate::BoundedEnumerator::enumerate).
	Enumeration,
	/// Provider option listing.
	Options,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::CredentialRetrieve => "credential_retrieve",
			OpKind::Enumeration => "enumeration",
			OpKind::Options => "options",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}

	/// Maps an operation result onto its terminal outcome.
	pub fn of<T, E>(result: &std::result::Result<T, E>) -> Self {
		match result {
			Ok(_) => OpOutcome::Success,
			Err(_) => OpOutcome::Failure,
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
