//! Immutable delegated credential sets, lifecycle helpers, and builders.

// self
use crate::{_prelude::*, auth::CredentialSecret};

/// Lifecycle status for a credential set at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialStatus {
	/// Credentials never expire (static keys).
	Permanent,
	/// Credentials are valid until their expiry instant.
	Active,
	/// Credentials reached their expiry instant.
	Expired,
}

/// Errors produced by [`CredentialSetBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CredentialSetBuilderError {
	/// Issued when no access key id was provided.
	#[error("Access key id is required.")]
	MissingAccessKeyId,
	/// Issued when no secret access key was provided.
	#[error("Secret access key is required.")]
	MissingSecretAccessKey,
}

/// Delegated credential material returned by a role assumption.
///
/// A set is replaced wholesale on every refresh and never mutated in place; callers receive
/// clones.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSet {
	/// Access key id. Not secret on its own but still tied to the session.
	pub access_key_id: String,
	/// Secret access key; callers must avoid logging it.
	pub secret_access_key: CredentialSecret,
	/// Session token issued alongside temporary keys.
	pub session_token: Option<CredentialSecret>,
	/// Expiry instant, `None` when the credentials cannot expire.
	pub expires_at: Option<OffsetDateTime>,
}
impl CredentialSet {
	/// Returns a builder for credential sets.
	pub fn builder() -> CredentialSetBuilder {
		CredentialSetBuilder::default()
	}

	/// Whether the credentials carry an expiry at all.
	pub fn can_expire(&self) -> bool {
		self.expires_at.is_some()
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> CredentialStatus {
		match self.expires_at {
			None => CredentialStatus::Permanent,
			Some(expires_at) if instant >= expires_at => CredentialStatus::Expired,
			Some(_) => CredentialStatus::Active,
		}
	}

	/// Returns `true` if the set has expired at the provided instant.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		matches!(self.status_at(instant), CredentialStatus::Expired)
	}

	/// Returns `true` if the set is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` when the set may be handed out at `instant`, i.e. it cannot expire or it
	/// remains valid for longer than `window`.
	pub fn is_fresh_at(&self, instant: OffsetDateTime, window: Duration) -> bool {
		match self.expires_at {
			None => true,
			Some(expires_at) => expires_at - window > instant,
		}
	}
}
impl Debug for CredentialSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialSet")
			.field("access_key_id", &self.access_key_id)
			.field("secret_access_key", &"<redacted>")
			.field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`CredentialSet`].
#[derive(Clone, Debug, Default)]
pub struct CredentialSetBuilder {
	access_key_id: Option<String>,
	secret_access_key: Option<CredentialSecret>,
	session_token: Option<CredentialSecret>,
	expires_at: Option<OffsetDateTime>,
}
impl CredentialSetBuilder {
	/// Provides the access key id.
	pub fn access_key_id(mut self, value: impl Into<String>) -> Self {
		self.access_key_id = Some(value.into());

		self
	}

	/// Provides the secret access key.
	pub fn secret_access_key(mut self, value: impl Into<String>) -> Self {
		self.secret_access_key = Some(CredentialSecret::new(value));

		self
	}

	/// Provides the session token.
	pub fn session_token(mut self, value: impl Into<String>) -> Self {
		self.session_token = Some(CredentialSecret::new(value));

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets an optional expiry, as reported by endpoints where expiration may be absent.
	pub fn maybe_expires_at(mut self, instant: Option<OffsetDateTime>) -> Self {
		self.expires_at = instant;

		self
	}

	/// Consumes the builder and produces a [`CredentialSet`].
	pub fn build(self) -> Result<CredentialSet, CredentialSetBuilderError> {
		let access_key_id = self
			.access_key_id
			.filter(|value| !value.is_empty())
			.ok_or(CredentialSetBuilderError::MissingAccessKeyId)?;
		let secret_access_key = self
			.secret_access_key
			.filter(|value| !value.is_empty())
			.ok_or(CredentialSetBuilderError::MissingSecretAccessKey)?;

		Ok(CredentialSet {
			access_key_id,
			secret_access_key,
			session_token: self.session_token,
			expires_at: self.expires_at,
		})
	}
}
