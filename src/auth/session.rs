//! Unique, time-sortable role session names.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
// self
use crate::{_prelude::*, auth::SessionName};

const RANDOM_BYTES: usize = 12;

impl SessionName {
	/// Generates a fresh session name: 12 hex digits of Unix milliseconds followed by 16
	/// URL-safe base64 characters of randomness.
	///
	/// Names generated later sort after earlier ones, and every character is accepted by STS.
	pub fn generate() -> Self {
		Self::generate_at(OffsetDateTime::now_utc())
	}

	/// Generates a session name stamped with the provided instant.
	pub fn generate_at(instant: OffsetDateTime) -> Self {
		let millis = u64::try_from(instant.unix_timestamp_nanos() / 1_000_000).unwrap_or(0);
		let mut entropy = [0_u8; RANDOM_BYTES];

		rand::rng().fill_bytes(&mut entropy);

		// Hex digits plus the URL-safe alphabet always satisfy the session-name rules.
		Self(format!("{millis:012x}{}", URL_SAFE_NO_PAD.encode(entropy)))
	}
}
