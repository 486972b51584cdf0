//! Role-assumption contracts consumed by [`CredentialCache`](crate::cache::CredentialCache).
//!
//! The crate never talks to a token service directly. Callers supply a [`RoleAssumer`] that
//! resolves whatever ambient credentials it needs (environment, profile, instance metadata)
//! and performs the assume-role call described by a [`RoleAssumptionRequest`]. Closures can be
//! adapted with [`AssumeRoleFn`].

// self
use crate::{
	_prelude::*,
	auth::{CredentialSet, RoleArn, SessionName},
	error::ConfigError,
};

/// Boxed future returned by [`RoleAssumer::assume_role`].
pub type AssumeRoleFuture<'a> =
	Pin<Box<dyn Future<Output = Result<CredentialSet, BoxError>> + 'a + Send>>;

/// Capability that exchanges ambient credentials for delegated ones.
pub trait RoleAssumer
where
	Self: Send + Sync,
{
	/// Assumes the role described by `request`.
	fn assume_role<'a>(&'a self, request: &'a RoleAssumptionRequest) -> AssumeRoleFuture<'a>;
}

/// Adapts a closure returning a future into a [`RoleAssumer`].
#[derive(Clone)]
pub struct AssumeRoleFn<F>(F);
impl<F> AssumeRoleFn<F> {
	/// Wraps the provided closure.
	pub fn new(f: F) -> Self {
		Self(f)
	}
}
impl<F, Fut> RoleAssumer for AssumeRoleFn<F>
where
	F: Send + Sync + Fn(RoleAssumptionRequest) -> Fut,
	Fut: 'static + Send + Future<Output = Result<CredentialSet, BoxError>>,
{
	fn assume_role<'a>(&'a self, request: &'a RoleAssumptionRequest) -> AssumeRoleFuture<'a> {
		Box::pin((self.0)(request.clone()))
	}
}
impl<F> Debug for AssumeRoleFn<F> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("AssumeRoleFn(..)")
	}
}

/// Parameters of every role assumption performed by one credential cache.
///
/// Immutable once built; the session name is generated at construction and reused across
/// refreshes unless overridden through the builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleAssumptionRequest {
	role_arn: RoleArn,
	session_name: SessionName,
	duration: Duration,
}
impl RoleAssumptionRequest {
	/// Default session duration (15 minutes).
	pub const DEFAULT_DURATION: Duration = Duration::seconds(900);
	/// Shortest session the role-assumption endpoint accepts.
	pub const MIN_DURATION: Duration = Duration::seconds(900);
	/// Longest session the role-assumption endpoint accepts.
	pub const MAX_DURATION: Duration = Duration::seconds(43_200);

	/// Builds a request with a generated session name and the default duration.
	pub fn new(role_arn: impl AsRef<str>) -> Result<Self> {
		Self::builder(role_arn).build()
	}

	/// Returns a builder for the provided role ARN.
	pub fn builder(role_arn: impl AsRef<str>) -> RoleAssumptionRequestBuilder {
		RoleAssumptionRequestBuilder::new(role_arn.as_ref())
	}

	/// Role being assumed.
	pub fn role_arn(&self) -> &RoleArn {
		&self.role_arn
	}

	/// Session name sent with every assumption.
	pub fn session_name(&self) -> &SessionName {
		&self.session_name
	}

	/// Requested session duration.
	pub fn duration(&self) -> Duration {
		self.duration
	}
}

/// Builder for [`RoleAssumptionRequest`].
#[derive(Clone, Debug)]
pub struct RoleAssumptionRequestBuilder {
	role_arn: String,
	session_name: Option<String>,
	duration: Duration,
}
impl RoleAssumptionRequestBuilder {
	fn new(role_arn: &str) -> Self {
		Self {
			role_arn: role_arn.to_owned(),
			session_name: None,
			duration: RoleAssumptionRequest::DEFAULT_DURATION,
		}
	}

	/// Overrides the generated session name.
	pub fn session_name(mut self, name: impl Into<String>) -> Self {
		self.session_name = Some(name.into());

		self
	}

	/// Overrides the session duration.
	pub fn duration(mut self, duration: Duration) -> Self {
		self.duration = duration;

		self
	}

	/// Validates the parameters and produces the request.
	pub fn build(self) -> Result<RoleAssumptionRequest> {
		let role_arn = RoleArn::new(&self.role_arn)?;
		let session_name = match self.session_name {
			Some(name) => SessionName::new(name)?,
			None => SessionName::generate(),
		};

		if self.duration < RoleAssumptionRequest::MIN_DURATION
			|| self.duration > RoleAssumptionRequest::MAX_DURATION
		{
			return Err(ConfigError::SessionDurationOutOfRange {
				seconds: self.duration.whole_seconds(),
				min: RoleAssumptionRequest::MIN_DURATION.whole_seconds(),
				max: RoleAssumptionRequest::MAX_DURATION.whole_seconds(),
			}
			.into());
		}

		Ok(RoleAssumptionRequest { role_arn, session_name, duration: self.duration })
	}
}
