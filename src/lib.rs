//! Temporary cloud access primitives: single-flight role-assumption credential caches and
//! bounded, fail-fast paginated enumeration for access-provider integrations.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod clock;
pub mod enumerate;
pub mod error;
pub mod obs;
pub mod options;
pub mod sso;
pub mod sts;

mod _prelude {
	pub use std::{
		collections::HashSet,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{BoxError, Error, Result};
}

#[cfg(test)] use color_eyre as _;
