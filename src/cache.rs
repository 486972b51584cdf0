//! Role-assumption credential cache with expiry tracking and single-flight refresh.
//!
//! [`CredentialCache::retrieve`] hands out the cached [`CredentialSet`] while it stays valid
//! beyond the configured expiry window, without suspending or touching the network. Once the
//! set is missing or stale, callers serialize behind one async guard: the first performs the
//! role assumption and swaps the cached set, the rest re-check the cache after acquiring the
//! guard and reuse the fresh value. At most one assumption is in flight per cache.

mod metrics;

pub use self::metrics::CacheMetrics;

// self
use crate::{
	_prelude::*,
	auth::CredentialSet,
	clock::{Clock, SystemClock},
	error::CredentialError,
	obs::{self, OpKind, OpOutcome, OpSpan},
	sts::{RoleAssumer, RoleAssumptionRequest},
};

/// Auto-refreshing cache of delegated credentials for one role.
///
/// Clones share the cached set, the refresh guard, and the metrics.
#[derive(Clone)]
pub struct CredentialCache {
	request: Arc<RoleAssumptionRequest>,
	assumer: Arc<dyn RoleAssumer>,
	clock: Arc<dyn Clock>,
	expiry_window: Duration,
	current: Arc<RwLock<Option<CredentialSet>>>,
	refresh_guard: Arc<AsyncMutex<()>>,
	metrics: Arc<CacheMetrics>,
}
impl CredentialCache {
	/// Creates an empty cache that assumes `request` through `assumer`.
	pub fn new(request: RoleAssumptionRequest, assumer: Arc<dyn RoleAssumer>) -> Self {
		Self {
			request: Arc::new(request),
			assumer,
			clock: Arc::new(SystemClock),
			expiry_window: Duration::ZERO,
			current: Default::default(),
			refresh_guard: Default::default(),
			metrics: Default::default(),
		}
	}

	/// Creates a cache for `role_arn` with a generated session name and default duration.
	///
	/// Fails with a configuration error when the role ARN is empty or malformed.
	pub fn for_role(role_arn: impl AsRef<str>, assumer: Arc<dyn RoleAssumer>) -> Result<Self> {
		Ok(Self::new(RoleAssumptionRequest::new(role_arn)?, assumer))
	}

	/// Replaces the clock used for freshness decisions.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Treats credentials as stale once they are within `window` of expiring (defaults to 0).
	///
	/// The window is capped at half the requested session duration so freshly assumed
	/// credentials are always served for a while before the next refresh.
	pub fn with_expiry_window(mut self, window: Duration) -> Self {
		let cap = self.request.duration() / 2;

		self.expiry_window = window.clamp(Duration::ZERO, cap);

		self
	}

	/// Effective expiry window after capping.
	pub fn expiry_window(&self) -> Duration {
		self.expiry_window
	}

	/// Returns valid credentials, assuming the role only when the cached set is missing or
	/// stale.
	pub async fn retrieve(&self) -> Result<CredentialSet> {
		const KIND: OpKind = OpKind::CredentialRetrieve;

		if let Some(current) = self.fresh_snapshot() {
			self.metrics.record_hit();

			return Ok(current);
		}

		let span = OpSpan::new(KIND, "refresh");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span.instrument(self.refresh()).await;

		obs::record_op_outcome(KIND, OpOutcome::of(&result));

		result
	}

	/// Drops the cached set so the next [`retrieve`](Self::retrieve) assumes the role again.
	pub fn invalidate(&self) {
		*self.current.write() = None;
	}

	/// Returns a snapshot of the cached set without checking freshness or refreshing.
	pub fn peek(&self) -> Option<CredentialSet> {
		self.current.read().clone()
	}

	/// Parameters sent with every role assumption.
	pub fn request(&self) -> &RoleAssumptionRequest {
		&self.request
	}

	/// Counters describing cache hits, refreshes, and failures.
	pub fn metrics(&self) -> &CacheMetrics {
		&self.metrics
	}

	async fn refresh(&self) -> Result<CredentialSet> {
		let _singleflight = self.refresh_guard.lock().await;

		if let Some(current) = self.fresh_snapshot() {
			self.metrics.record_hit();

			return Ok(current);
		}

		self.metrics.record_refresh();

		let fresh = self.assumer.assume_role(&self.request).await.map_err(|source| {
			self.metrics.record_failure();

			CredentialError::AssumeRole { role_arn: self.request.role_arn().to_string(), source }
		})?;

		// Material inside the expiry window is still handed out once; only already-expired
		// material is rejected.
		if let Some(expires_at) = fresh.expires_at
			&& fresh.is_expired_at(self.clock.now())
		{
			self.metrics.record_failure();

			return Err(CredentialError::ExpiredOnReceipt { expires_at }.into());
		}

		*self.current.write() = Some(fresh.clone());

		Ok(fresh)
	}

	fn fresh_snapshot(&self) -> Option<CredentialSet> {
		let now = self.clock.now();

		self.current.read().as_ref().filter(|set| set.is_fresh_at(now, self.expiry_window)).cloned()
	}
}
impl Debug for CredentialCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialCache")
			.field("request", &self.request)
			.field("expiry_window", &self.expiry_window)
			.field("cached", &self.current.read().is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::{
		_preludet::*,
		clock::ManualClock,
		sts::{AssumeRoleFn, AssumeRoleFuture},
	};

	const ROLE: &str = "arn:aws:iam::123456789012:role/granted-sso";

	fn cache_with(clock: &ManualClock, assumer: Arc<dyn RoleAssumer>) -> CredentialCache {
		CredentialCache::for_role(ROLE, assumer)
			.expect("Cache fixture should build.")
			.with_clock(Arc::new(clock.clone()))
	}

	#[tokio::test]
	async fn sequential_retrievals_within_validity_assume_once() {
		let clock = ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC));
		let calls = Arc::new(AtomicUsize::new(0));
		let cache = cache_with(
			&clock,
			Arc::new(counting_assumer(clock.clone(), Duration::minutes(15), calls.clone())),
		);
		let first = cache.retrieve().await.expect("First retrieval should assume the role.");

		for _ in 0..10 {
			clock.advance(Duration::minutes(1));

			let again = cache.retrieve().await.expect("Cached retrieval should succeed.");

			assert_eq!(again, first);
		}

		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert_eq!(cache.metrics().refreshes(), 1);
		assert_eq!(cache.metrics().hits(), 10);
	}

	#[tokio::test]
	async fn expired_credentials_are_refreshed_with_the_same_session_name() {
		let clock = ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC));
		let sessions = Arc::new(Mutex::new(Vec::new()));
		let seen = sessions.clone();
		let minting_clock = clock.clone();
		let assumer = AssumeRoleFn::new(
			move |request: RoleAssumptionRequest| -> AssumeRoleFuture<'static> {
				let tag = {
					let mut seen = seen.lock();

					seen.push(request.session_name().clone());
					seen.len().to_string()
				};
				let expires_at = minting_clock.now() + Duration::minutes(15);

				Box::pin(async move { Ok(credentials_expiring_at(&tag, expires_at)) })
			},
		);
		let cache = cache_with(&clock, Arc::new(assumer));
		let first = cache.retrieve().await.expect("First retrieval should succeed.");

		clock.advance(Duration::minutes(15));

		let second = cache.retrieve().await.expect("Expired set should be refreshed.");

		assert_ne!(first.access_key_id, second.access_key_id);
		assert!(!second.is_expired_at(clock.now()));

		let sessions = sessions.lock();

		assert_eq!(sessions.len(), 2);
		assert_eq!(sessions[0], sessions[1]);
		assert_eq!(&sessions[0], cache.request().session_name());
	}

	#[tokio::test]
	async fn expiry_window_refreshes_early() {
		let clock = ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC));
		let calls = Arc::new(AtomicUsize::new(0));
		let cache = cache_with(
			&clock,
			Arc::new(counting_assumer(clock.clone(), Duration::minutes(15), calls.clone())),
		)
		.with_expiry_window(Duration::minutes(1));

		cache.retrieve().await.expect("First retrieval should succeed.");
		clock.advance(Duration::minutes(13) + Duration::seconds(59));
		cache.retrieve().await.expect("Set outside the window should be reused.");

		assert_eq!(calls.load(Ordering::SeqCst), 1);

		clock.advance(Duration::seconds(1));
		cache.retrieve().await.expect("Set inside the window should be refreshed.");

		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn oversized_expiry_windows_are_capped_at_half_the_session() {
		let clock = ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC));
		let calls = Arc::new(AtomicUsize::new(0));
		let cache = cache_with(
			&clock,
			Arc::new(counting_assumer(clock.clone(), Duration::minutes(15), calls.clone())),
		)
		.with_expiry_window(Duration::minutes(20));

		assert_eq!(cache.expiry_window(), Duration::seconds(450));
		assert_eq!(
			cache.clone().with_expiry_window(Duration::minutes(-1)).expiry_window(),
			Duration::ZERO
		);

		cache.retrieve().await.expect("First retrieval should succeed.");
		clock.advance(Duration::minutes(7));
		cache.retrieve().await.expect("Set outside the capped window should be reused.");

		assert_eq!(calls.load(Ordering::SeqCst), 1);

		clock.advance(Duration::seconds(30));
		cache.retrieve().await.expect("Set inside the capped window should be refreshed.");

		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn credentials_expired_on_receipt_are_rejected() {
		let clock = ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC));
		let expires_at = clock.now();
		let assumer = AssumeRoleFn::new(move |_request: RoleAssumptionRequest| async move {
			Ok::<_, BoxError>(credentials_expiring_at("stale", expires_at))
		});
		let cache = cache_with(&clock, Arc::new(assumer));
		let err = cache.retrieve().await.expect_err("Stale material must not be handed out.");

		assert!(matches!(
			err,
			Error::Credential(CredentialError::ExpiredOnReceipt { expires_at: at }) if at == expires_at
		));
		assert!(cache.peek().is_none());
		assert_eq!(cache.metrics().failures(), 1);
	}

	#[tokio::test]
	async fn assume_failures_surface_as_credential_errors() {
		let clock = ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC));
		let assumer = AssumeRoleFn::new(|_request: RoleAssumptionRequest| async move {
			Err::<CredentialSet, BoxError>("AccessDenied".into())
		});
		let cache = cache_with(&clock, Arc::new(assumer));
		let err = cache.retrieve().await.expect_err("Assume-role failures must propagate.");

		match err {
			Error::Credential(CredentialError::AssumeRole { role_arn, source }) => {
				assert_eq!(role_arn, ROLE);
				assert_eq!(source.to_string(), "AccessDenied");
			},
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[tokio::test]
	async fn permanent_credentials_are_never_refreshed() {
		let clock = ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC));
		let calls = Arc::new(AtomicUsize::new(0));
		let counter = calls.clone();
		let assumer = AssumeRoleFn::new(move |_request: RoleAssumptionRequest| {
			counter.fetch_add(1, Ordering::SeqCst);

			async move {
				CredentialSet::builder()
					.access_key_id("AKIASTATIC")
					.secret_access_key("secret")
					.build()
					.map_err(BoxError::from)
			}
		});
		let cache = cache_with(&clock, Arc::new(assumer));

		cache.retrieve().await.expect("First retrieval should succeed.");
		clock.advance(Duration::days(365));
		cache.retrieve().await.expect("Permanent set should be reused.");

		assert_eq!(calls.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn invalidate_forces_a_refresh() {
		let clock = ManualClock::new(macros::datetime!(2025-01-01 00:00 UTC));
		let calls = Arc::new(AtomicUsize::new(0));
		let cache = cache_with(
			&clock,
			Arc::new(counting_assumer(clock.clone(), Duration::minutes(15), calls.clone())),
		);

		cache.retrieve().await.expect("First retrieval should succeed.");
		cache.invalidate();

		assert!(cache.peek().is_none());

		cache.retrieve().await.expect("Retrieval after invalidation should succeed.");

		assert_eq!(calls.load(Ordering::SeqCst), 2);
	}
}
