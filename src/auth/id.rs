//! Strongly typed identifiers for roles, SSO instances, identity stores, and role sessions.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal, $validate:path) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(pub(super) String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				$validate($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				$validate($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const ARN_MAX_LEN: usize = 2048;
const IDENTITY_STORE_ID_MAX_LEN: usize = 64;
const SESSION_NAME_MIN_LEN: usize = 2;
const SESSION_NAME_MAX_LEN: usize = 64;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (role ARN, instance ARN, ...).
		kind: &'static str,
	},
	/// The identifier contains whitespace characters.
	#[error("{kind} identifier contains whitespace.")]
	ContainsWhitespace {
		/// Kind of identifier.
		kind: &'static str,
	},
	/// The identifier is shorter than allowed.
	#[error("{kind} identifier must be at least {min} characters.")]
	TooShort {
		/// Kind of identifier.
		kind: &'static str,
		/// Minimum permitted character count.
		min: usize,
	},
	/// The identifier exceeded the allowed character count.
	#[error("{kind} identifier exceeds {max} characters.")]
	TooLong {
		/// Kind of identifier.
		kind: &'static str,
		/// Maximum permitted character count.
		max: usize,
	},
	/// ARN-shaped identifiers must start with `arn:`.
	#[error("{kind} identifier must start with `arn:`.")]
	NotAnArn {
		/// Kind of identifier.
		kind: &'static str,
	},
	/// The identifier contains a character outside the allowed set.
	#[error("{kind} identifier contains the disallowed character {character:?}.")]
	DisallowedCharacter {
		/// Kind of identifier.
		kind: &'static str,
		/// First offending character.
		character: char,
	},
}

def_id! { RoleArn, "ARN of the role assumed to obtain delegated credentials.", "Role ARN", validate_arn }
def_id! { InstanceArn, "ARN of the SSO instance that owns permission sets.", "Instance ARN", validate_arn }
def_id! { IdentityStoreId, "Identifier of the identity store backing an SSO instance (e.g. `d-1234567890`).", "Identity store", validate_identity_store_id }
def_id! { SessionName, "Role session name attached to every assumption made by one credential cache.", "Session name", validate_session_name }

fn validate_view(kind: &'static str, view: &str, max: usize) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_whitespace) {
		return Err(IdentifierError::ContainsWhitespace { kind });
	}
	if view.len() > max {
		return Err(IdentifierError::TooLong { kind, max });
	}

	Ok(())
}

fn validate_arn(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	validate_view(kind, view, ARN_MAX_LEN)?;

	if !view.starts_with("arn:") {
		return Err(IdentifierError::NotAnArn { kind });
	}

	Ok(())
}

fn validate_identity_store_id(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	validate_view(kind, view, IDENTITY_STORE_ID_MAX_LEN)
}

fn validate_session_name(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	validate_view(kind, view, SESSION_NAME_MAX_LEN)?;

	if view.len() < SESSION_NAME_MIN_LEN {
		return Err(IdentifierError::TooShort { kind, min: SESSION_NAME_MIN_LEN });
	}
	// STS accepts `[\w+=,.@-]` only.
	if let Some(character) = view.chars().find(|c| !is_session_name_char(*c)) {
		return Err(IdentifierError::DisallowedCharacter { kind, character });
	}

	Ok(())
}

fn is_session_name_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '=' | ',' | '.' | '@' | '-')
}
