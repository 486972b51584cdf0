//! Cancellation handles shared between an enumeration run, its workers, and its caller.

// crates.io
use tokio::sync::watch;
// self
use crate::_prelude::*;

/// Boxed future returned by [`Cancellation::cancelled`].
pub type CancelledFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a + Send>>;

/// Cloneable cancellation signal.
///
/// Cancelling a handle cancels every clone and every child derived from it. Cancelling a
/// child leaves its parent untouched, which is how one enumeration run fails fast without
/// cancelling the caller's wider operation.
#[derive(Clone)]
pub struct Cancellation {
	signal: Arc<watch::Sender<bool>>,
	parent: Option<Arc<Cancellation>>,
}
impl Cancellation {
	/// Creates a fresh, uncancelled handle.
	pub fn new() -> Self {
		let (signal, _) = watch::channel(false);

		Self { signal: Arc::new(signal), parent: None }
	}

	/// Derives a child handle that observes this handle's cancellation.
	pub fn child(&self) -> Self {
		Self { parent: Some(Arc::new(self.clone())), ..Self::new() }
	}

	/// Cancels this handle, its clones, and its children.
	pub fn cancel(&self) {
		self.signal.send_replace(true);
	}

	/// Returns `true` once this handle or any ancestor has been cancelled.
	pub fn is_cancelled(&self) -> bool {
		*self.signal.borrow() || self.parent.as_ref().is_some_and(|parent| parent.is_cancelled())
	}

	/// Resolves once this handle or any ancestor is cancelled.
	pub fn cancelled(&self) -> CancelledFuture<'_> {
		Box::pin(async move {
			let mut own = self.signal.subscribe();

			match &self.parent {
				Some(parent) => {
					tokio::select! {
						_ = own.wait_for(|cancelled| *cancelled) => {},
						_ = parent.cancelled() => {},
					}
				},
				None => {
					let _ = own.wait_for(|cancelled| *cancelled).await;
				},
			}
		})
	}
}
impl Default for Cancellation {
	fn default() -> Self {
		Self::new()
	}
}
impl Debug for Cancellation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Cancellation").field("cancelled", &self.is_cancelled()).finish()
	}
}
