//! Bounded-concurrency enumeration of cursor-paginated collections with fail-fast cancellation.
//!
//! [`BoundedEnumerator`] fetches pages strictly one after another and fans every new reference
//! out to an [`ItemEnricher`] on the tokio runtime, never running more enrichments at once than
//! the configured limit. The first failure cancels the run: page fetching stops, permit waits are
//! abandoned, in-flight enrichers observe the [`Cancellation`] handle, and the call returns only
//! after every spawned worker has unwound. Partial results are never returned.
//!
//! ```text
//! Idle -> Paging -> Paging (next page) -> Succeeded
//!                \-> Draining (first failure) -> Failed
//! ```

mod cancel;
mod page;
mod result;

pub use cancel::*;
pub use page::*;
pub use result::ResultSet;

// std
use std::num::NonZeroUsize;
// crates.io
use tokio::{
	sync::{OwnedSemaphorePermit, Semaphore},
	task::JoinSet,
};
// self
use crate::{
	_prelude::*,
	enumerate::result::{Accumulator, FirstError},
	error::{ConfigError, EnumerationError},
	obs::{self, OpKind, OpOutcome, OpSpan, trace_debug},
};

/// Lifecycle of one enumeration run, reported in debug traces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunState {
	/// Constructed, nothing fetched yet.
	Idle,
	/// Fetching pages and submitting enrichment work.
	Paging,
	/// A failure was recorded; waiting for outstanding workers to unwind.
	Draining,
	/// Every page was fetched and every worker finished without error.
	Succeeded,
	/// The run ended with its first recorded error.
	Failed,
}
impl RunState {
	/// Returns a stable label suitable for trace fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RunState::Idle => "idle",
			RunState::Paging => "paging",
			RunState::Draining => "draining",
			RunState::Succeeded => "succeeded",
			RunState::Failed => "failed",
		}
	}

	/// Maps a finished run's result onto its terminal state.
	pub fn of<T, E>(result: &std::result::Result<T, E>) -> Self {
		match result {
			Ok(_) => RunState::Succeeded,
			Err(_) => RunState::Failed,
		}
	}
}
impl Display for RunState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Drives paginated enumeration with a bounded enrichment pool.
#[derive(Clone, Copy, Debug)]
pub struct BoundedEnumerator {
	concurrency: NonZeroUsize,
	page_limit: Option<usize>,
}
impl BoundedEnumerator {
	/// Concurrency limit used by [`Default`].
	pub const DEFAULT_CONCURRENCY: usize = 5;

	/// Creates an enumerator allowing at most `concurrency_limit` concurrent enrichments.
	///
	/// A limit of zero is a configuration error.
	pub fn new(concurrency_limit: usize) -> Result<Self> {
		let concurrency =
			NonZeroUsize::new(concurrency_limit).ok_or(ConfigError::ZeroConcurrency)?;

		Ok(Self { concurrency, page_limit: None })
	}

	/// Fails the run with [`EnumerationError::PageLimitExceeded`] once `limit` pages were fetched
	/// and the listing still has more.
	pub fn with_page_limit(mut self, limit: usize) -> Self {
		self.page_limit = Some(limit);

		self
	}

	/// Maximum number of concurrent enrichments.
	pub fn concurrency_limit(&self) -> usize {
		self.concurrency.get()
	}

	/// Enumerates every page from `fetcher`, keeping the references `enricher` accepts.
	pub async fn enumerate<P, E>(&self, fetcher: &P, enricher: Arc<E>) -> Result<ResultSet>
	where
		P: ?Sized + PageFetcher,
		E: ?Sized + ItemEnricher + 'static,
	{
		self.enumerate_with(&Cancellation::new(), fetcher, enricher).await
	}

	/// Same as [`enumerate`](Self::enumerate), but also stops when `cancellation` fires.
	///
	/// The run works on a child of `cancellation`, so its own failures never cancel the caller.
	/// Dropping the returned future aborts every outstanding worker.
	pub async fn enumerate_with<P, E>(
		&self,
		cancellation: &Cancellation,
		fetcher: &P,
		enricher: Arc<E>,
	) -> Result<ResultSet>
	where
		P: ?Sized + PageFetcher,
		E: ?Sized + ItemEnricher + 'static,
	{
		const KIND: OpKind = OpKind::Enumeration;

		let span = OpSpan::new(KIND, "enumerate");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span.instrument(self.run(cancellation.child(), fetcher, enricher)).await;

		obs::record_op_outcome(KIND, OpOutcome::of(&result));

		result
	}

	async fn run<P, E>(&self, run: Cancellation, fetcher: &P, enricher: Arc<E>) -> Result<ResultSet>
	where
		P: ?Sized + PageFetcher,
		E: ?Sized + ItemEnricher + 'static,
	{
		let permits = Arc::new(Semaphore::new(self.concurrency.get()));
		let results = Accumulator::default();
		let first_error = FirstError::default();
		let mut workers = JoinSet::new();
		let mut submitted = HashSet::new();
		let mut cursor = None::<String>;
		let mut pages = 0_usize;

		trace_debug!(
			from = %RunState::Idle,
			to = %RunState::Paging,
			concurrency = self.concurrency.get(),
			"Enumeration run started."
		);

		'paging: loop {
			if let Some(limit) = self.page_limit
				&& pages >= limit
			{
				first_error.record(EnumerationError::PageLimitExceeded { limit });
				run.cancel();

				break;
			}

			let fetched = tokio::select! {
				biased;
				_ = run.cancelled() => None,
				page = fetcher.fetch_page(cursor.as_deref()) => Some(page),
			};
			let Some(fetched) = fetched else { break };

			pages += 1;

			let page = match fetched {
				Ok(page) => page,
				Err(source) => {
					first_error.record(EnumerationError::PageFetch { page: pages, source });
					run.cancel();

					break;
				},
			};

			trace_debug!(page = pages, items = page.items.len(), "Fetched page.");

			for reference in page.items {
				if !submitted.insert(reference.clone()) {
					continue;
				}

				let acquired = tokio::select! {
					biased;
					_ = run.cancelled() => None,
					permit = permits.clone().acquire_owned() => Some(permit),
				};
				let Some(acquired) = acquired else { break 'paging };
				let Ok(permit) = acquired else {
					first_error.record(EnumerationError::WorkerPool);
					run.cancel();

					break 'paging;
				};

				workers.spawn(enrich_one(
					permit,
					run.clone(),
					enricher.clone(),
					reference,
					results.clone(),
					first_error.clone(),
				));
			}

			match page.next_cursor {
				Some(next) => cursor = Some(next),
				None => break,
			}
		}

		if run.is_cancelled() {
			trace_debug!(
				from = %RunState::Paging,
				to = %RunState::Draining,
				outstanding = workers.len(),
				"Enumeration run cancelled; draining workers."
			);
		}

		while let Some(joined) = workers.join_next().await {
			if let Err(e) = joined
				&& e.is_panic()
			{
				first_error.record(EnumerationError::WorkerPanicked);
				run.cancel();
			}
		}

		let outcome = match first_error.take() {
			Some(e) => Err(e.into()),
			None if run.is_cancelled() => Err(EnumerationError::Cancelled.into()),
			None => Ok(results.finish()),
		};
		trace_debug!(
			to = %RunState::of(&outcome),
			pages,
			submitted = submitted.len(),
			"Enumeration run finished."
		);

		outcome
	}
}
impl Default for BoundedEnumerator {
	fn default() -> Self {
		Self {
			concurrency: NonZeroUsize::new(Self::DEFAULT_CONCURRENCY).unwrap_or(NonZeroUsize::MIN),
			page_limit: None,
		}
	}
}

async fn enrich_one<E>(
	permit: OwnedSemaphorePermit,
	run: Cancellation,
	enricher: Arc<E>,
	reference: String,
	results: Accumulator,
	first_error: FirstError,
) where
	E: ?Sized + ItemEnricher + 'static,
{
	let _permit = permit;
	// The enricher runs as its own task so a panic surfaces here while the permit is still held.
	let mut enrichment = JoinSet::new();

	enrichment.spawn({
		let run = run.clone();
		let reference = reference.clone();

		async move { enricher.enrich(&run, &reference).await }
	});

	let joined = tokio::select! {
		biased;
		_ = run.cancelled() => None,
		joined = enrichment.join_next() => joined,
	};
	let Some(joined) = joined else {
		enrichment.shutdown().await;

		return;
	};

	match joined {
		Ok(Ok(item)) =>
			if let Some(option) = item.option {
				results.push(option);
			},
		Ok(Err(source)) => {
			if first_error.record(EnumerationError::Enrichment { reference, source }) {
				trace_debug!("Enrichment failed; cancelling run.");
			}

			run.cancel();
		},
		Err(e) => {
			if e.is_panic() && first_error.record(EnumerationError::WorkerPanicked) {
				trace_debug!("Enricher panicked; cancelling run.");
			}

			run.cancel();
		},
	}
}
