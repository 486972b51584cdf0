// self
use crate::obs::{OpKind, OpOutcome};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"access_broker_op_total",
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

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::CredentialError;

	#[test]
	fn failed_retrievals_are_labelled_by_operation_and_outcome() {
		let failed = Err::<(), _>(CredentialError::ExpiredOnReceipt {
			expires_at: time::macros::datetime!(2025-01-01 00:00 UTC),
		});
		let outcome = OpOutcome::of(&failed);

		assert_eq!(OpKind::CredentialRetrieve.as_str(), "credential_retrieve");
		assert_eq!(outcome.as_str(), "failure");

		record_op_outcome(OpKind::CredentialRetrieve, outcome);
	}
}
