//! Enumeration output and the state shared by enrichment workers.

// self
use crate::{_prelude::*, error::EnumerationError, options::ArgOption};

/// Finalized enumeration output.
///
/// Holds exactly the included items, each at most once. Order follows enrichment completion
/// and carries no meaning; use [`into_sorted`](Self::into_sorted) for a stable order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet(Vec<ArgOption>);
impl ResultSet {
	/// Number of included items.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether nothing was included.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over the included options.
	pub fn iter(&self) -> std::slice::Iter<'_, ArgOption> {
		self.0.iter()
	}

	/// Iterates over the values of the included options.
	pub fn values(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(|option| option.value.as_str())
	}

	/// Returns the options sorted by label, then value.
	pub fn into_sorted(mut self) -> Vec<ArgOption> {
		self.0.sort();

		self.0
	}

	/// Returns the options in completion order.
	pub fn into_vec(self) -> Vec<ArgOption> {
		self.0
	}
}
impl IntoIterator for ResultSet {
	type IntoIter = std::vec::IntoIter<ArgOption>;
	type Item = ArgOption;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}
impl<'a> IntoIterator for &'a ResultSet {
	type IntoIter = std::slice::Iter<'a, ArgOption>;
	type Item = &'a ArgOption;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

/// Append-only collector shared by the workers of one run.
#[derive(Clone, Debug, Default)]
pub(crate) struct Accumulator(Arc<Mutex<Vec<ArgOption>>>);
impl Accumulator {
	pub(crate) fn push(&self, option: ArgOption) {
		self.0.lock().push(option);
	}

	/// Call only after every worker has finished.
	pub(crate) fn finish(self) -> ResultSet {
		ResultSet(std::mem::take(&mut *self.0.lock()))
	}
}

/// Slot keeping the first error reported during a run.
#[derive(Clone, Debug, Default)]
pub(crate) struct FirstError(Arc<Mutex<Option<EnumerationError>>>);
impl FirstError {
	/// Stores `err` unless an error was already recorded; returns whether it was stored.
	pub(crate) fn record(&self, err: EnumerationError) -> bool {
		let mut slot = self.0.lock();

		if slot.is_some() {
			return false;
		}

		*slot = Some(err);

		true
	}

	pub(crate) fn take(&self) -> Option<EnumerationError> {
		self.0.lock().take()
	}
}
