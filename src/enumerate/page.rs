//! Remote seams driven by the enumerator: page fetching and per-item enrichment.

// self
use crate::{_prelude::*, enumerate::Cancellation, options::ArgOption};

/// Boxed future returned by [`PageFetcher::fetch_page`].
pub type PageFuture<'a> = Pin<Box<dyn Future<Output = Result<Page, BoxError>> + 'a + Send>>;
/// Boxed future returned by [`ItemEnricher::enrich`].
pub type EnrichFuture<'a> =
	Pin<Box<dyn Future<Output = Result<EnrichedItem, BoxError>> + 'a + Send>>;

/// Cursor-paginated listing endpoint.
pub trait PageFetcher
where
	Self: Send + Sync,
{
	/// Fetches the page starting at `cursor` (`None` for the first page).
	fn fetch_page<'a>(&'a self, cursor: Option<&'a str>) -> PageFuture<'a>;
}

/// Per-item lookup deciding whether a reference belongs in the result.
///
/// Enrichers that make several remote calls per item should poll
/// [`Cancellation::is_cancelled`] between them and bail out early.
pub trait ItemEnricher
where
	Self: Send + Sync,
{
	/// Describes `reference` and applies the inclusion predicate.
	fn enrich<'a>(&'a self, cancellation: &'a Cancellation, reference: &'a str)
	-> EnrichFuture<'a>;
}

/// Adapts a closure returning a future into a [`PageFetcher`].
///
/// The closure receives an owned copy of the cursor.
#[derive(Clone)]
pub struct PageFn<F>(F);
impl<F> PageFn<F> {
	/// Wraps the provided closure.
	pub fn new(f: F) -> Self {
		Self(f)
	}
}
impl<F, Fut> PageFetcher for PageFn<F>
where
	F: Send + Sync + Fn(Option<String>) -> Fut,
	Fut: 'static + Send + Future<Output = Result<Page, BoxError>>,
{
	fn fetch_page<'a>(&'a self, cursor: Option<&'a str>) -> PageFuture<'a> {
		Box::pin((self.0)(cursor.map(ToOwned::to_owned)))
	}
}
impl<F> Debug for PageFn<F> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("PageFn(..)")
	}
}

/// Adapts a closure returning a future into an [`ItemEnricher`].
///
/// The closure receives a clone of the run's cancellation handle and an owned reference.
#[derive(Clone)]
pub struct EnrichFn<F>(F);
impl<F> EnrichFn<F> {
	/// Wraps the provided closure.
	pub fn new(f: F) -> Self {
		Self(f)
	}
}
impl<F, Fut> ItemEnricher for EnrichFn<F>
where
	F: Send + Sync + Fn(Cancellation, String) -> Fut,
	Fut: 'static + Send + Future<Output = Result<EnrichedItem, BoxError>>,
{
	fn enrich<'a>(
		&'a self,
		cancellation: &'a Cancellation,
		reference: &'a str,
	) -> EnrichFuture<'a> {
		Box::pin((self.0)(cancellation.clone(), reference.to_owned()))
	}
}
impl<F> Debug for EnrichFn<F> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("EnrichFn(..)")
	}
}

/// One page of item references.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Page {
	/// Opaque item references, in listing order.
	pub items: Vec<String>,
	/// Cursor of the following page; `None` on the last page.
	pub next_cursor: Option<String>,
}
impl Page {
	/// Creates a page followed by the page at `next_cursor`.
	pub fn new<I, S>(items: I, next_cursor: Option<String>) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self { items: items.into_iter().map(Into::into).collect(), next_cursor }
	}

	/// Creates the final page of a listing.
	pub fn last<I, S>(items: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::new(items, None)
	}

	/// Whether pagination ends after this page.
	pub fn is_last(&self) -> bool {
		self.next_cursor.is_none()
	}
}

/// Outcome of enriching one reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnrichedItem {
	/// Reference that was enriched.
	pub reference: String,
	/// Option surfaced to callers; present only when the item is included.
	pub option: Option<ArgOption>,
}
impl EnrichedItem {
	/// Marks `reference` as included under the given label and value.
	pub fn accepted(
		reference: impl Into<String>,
		label: impl Into<String>,
		value: impl Into<String>,
	) -> Self {
		Self { reference: reference.into(), option: Some(ArgOption::new(label, value)) }
	}

	/// Marks `reference` as excluded.
	pub fn rejected(reference: impl Into<String>) -> Self {
		Self { reference: reference.into(), option: None }
	}

	/// Whether the item belongs in the result.
	pub fn included(&self) -> bool {
		self.option.is_some()
	}
}
