//! Selectable argument values surfaced to access-request forms.

// self
use crate::_prelude::*;

/// Boxed future returned by [`ArgOptioner::options`].
pub type OptionsFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<ArgOption>>> + 'a + Send>>;

/// Providers that can list the values an argument accepts.
pub trait ArgOptioner
where
	Self: Send + Sync,
{
	/// Lists the options for `arg`.
	///
	/// Unknown arguments fail with [`Error::InvalidArgument`] before any remote call.
	fn options<'a>(&'a self, arg: &'a str) -> OptionsFuture<'a>;
}

/// Providers that describe the arguments they accept as a JSON schema document.
pub trait ArgSchemarer {
	/// Schema of the argument object submitted with an access request.
	fn arg_schema(&self) -> serde_json::Value;
}

/// One selectable value with its display label.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArgOption {
	/// Human-readable label.
	pub label: String,
	/// Value submitted with the request.
	pub value: String,
}
impl ArgOption {
	/// Creates an option.
	pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
		Self { label: label.into(), value: value.into() }
	}
}
