//! Crate-level error types shared by the credential cache, the enumerator, and providers.

// self
use crate::{
	_prelude::*,
	auth::{CredentialSetBuilderError, IdentifierError},
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Type-erased failure reported by caller-supplied remote capabilities.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem, raised before any network activity.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Role assumption failed or produced unusable credentials.
	#[error(transparent)]
	Credential(#[from] CredentialError),
	/// A page fetch or item enrichment failed; no partial results are available.
	#[error(transparent)]
	Enumeration(#[from] EnumerationError),

	/// Caller asked for options of an argument the provider does not know.
	#[error("Argument `{arg}` is not supported by this provider.")]
	InvalidArgument {
		/// Argument name supplied by the caller.
		arg: String,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required identifier is missing or malformed.
	#[error(transparent)]
	InvalidIdentifier(#[from] IdentifierError),
	/// Requested session duration is outside what the role-assumption endpoint accepts.
	#[error("Session duration of {seconds}s is outside the supported {min}s..={max}s range.")]
	SessionDurationOutOfRange {
		/// Requested duration in whole seconds.
		seconds: i64,
		/// Minimum accepted duration in seconds.
		min: i64,
		/// Maximum accepted duration in seconds.
		max: i64,
	},
	/// Enumeration was configured without any worker capacity.
	#[error("Concurrency limit must be at least 1.")]
	ZeroConcurrency,
	/// Provider configuration document could not be decoded.
	#[error("Provider configuration is invalid.")]
	Parse {
		/// Underlying decoding failure.
		#[source]
		source: serde_json::Error,
	},
}
impl From<IdentifierError> for Error {
	fn from(e: IdentifierError) -> Self {
		ConfigError::from(e).into()
	}
}

/// Role-assumption failures. Never retried internally.
#[derive(Debug, ThisError)]
pub enum CredentialError {
	/// The role-assumption endpoint (or the base credential source behind it) failed.
	#[error("Unable to assume role `{role_arn}`.")]
	AssumeRole {
		/// Role that was being assumed.
		role_arn: String,
		/// Failure reported by the role assumer.
		#[source]
		source: BoxError,
	},
	/// The endpoint returned credentials that were already expired when received.
	#[error("Received credentials already expired at {expires_at}.")]
	ExpiredOnReceipt {
		/// Expiry carried by the received credentials.
		expires_at: OffsetDateTime,
	},
	/// Credential material could not be assembled.
	#[error("Unable to build credential set.")]
	Build(#[from] CredentialSetBuilderError),
}

/// Enumeration failures. The first one observed during a run is the one reported.
#[derive(Debug, ThisError)]
pub enum EnumerationError {
	/// Fetching a page failed.
	#[error("Failed to fetch page {page}.")]
	PageFetch {
		/// One-based index of the page that failed.
		page: usize,
		/// Failure reported by the page fetcher.
		#[source]
		source: BoxError,
	},
	/// Enriching an item failed.
	#[error("Failed to enrich item `{reference}`.")]
	Enrichment {
		/// Reference of the item being enriched.
		reference: String,
		/// Failure reported by the enricher.
		#[source]
		source: BoxError,
	},
	/// Pagination did not terminate within the configured page limit.
	#[error("Pagination exceeded the limit of {limit} pages.")]
	PageLimitExceeded {
		/// Configured page limit.
		limit: usize,
	},
	/// An enrichment worker panicked.
	#[error("Enrichment worker panicked.")]
	WorkerPanicked,
	/// The worker pool stopped handing out permits.
	#[error("Enrichment worker pool is closed.")]
	WorkerPool,
	/// The run was cancelled by its caller.
	#[error("Enumeration was cancelled.")]
	Cancelled,
}
