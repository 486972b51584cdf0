//! SSO access provider built on the credential cache and the bounded enumerator.
//!
//! The provider assumes its administration role once at [`SsoProvider::init`] and keeps the
//! credentials fresh through a shared [`CredentialCache`]. Option listing for
//! `permissionSetArn` describes every permission set of the instance with at most
//! [`BoundedEnumerator::DEFAULT_CONCURRENCY`] concurrent lookups and keeps only the sets tagged
//! with [`MANAGED_BY_TAG`]; `accountId` pages through the organization's accounts.

pub mod api;
pub mod config;

pub use api::*;
pub use config::*;

// self
use crate::{
	_prelude::*,
	auth::InstanceArn,
	cache::CredentialCache,
	enumerate::{
		BoundedEnumerator, Cancellation, EnrichFuture, EnrichedItem, ItemEnricher, PageFetcher,
		PageFuture,
	},
	error::EnumerationError,
	obs::{self, OpKind, OpOutcome, OpSpan, trace_debug},
	options::{ArgOption, ArgOptioner, ArgSchemarer, OptionsFuture},
	sts::{RoleAssumer, RoleAssumptionRequest},
};

/// Tag marking permission sets that may be requested through the access workflow.
pub const MANAGED_BY_TAG: &str = "commonfate.io/managed-by-granted";
/// Session name used when the provider assumes its administration role.
pub const SESSION_NAME: &str = "accesshandler-aws-sso";
/// Argument selecting a permission set.
pub const PERMISSION_SET_ARG: &str = "permissionSetArn";
/// Argument selecting an organization account.
pub const ACCOUNT_ARG: &str = "accountId";

/// SSO access provider.
#[derive(Debug)]
pub struct SsoProvider<C> {
	config: SsoConfig,
	credentials: CredentialCache,
	client: Arc<C>,
	enumerator: BoundedEnumerator,
}
impl<C> SsoProvider<C>
where
	C: 'static + SsoAdminApi,
{
	/// Assumes the administration role, verifies the credentials, and builds the API client.
	///
	/// `make_client` receives a clone of the credential cache so the client can fetch fresh
	/// credentials for every call.
	pub async fn init<F>(
		config: SsoConfig,
		assumer: Arc<dyn RoleAssumer>,
		make_client: F,
	) -> Result<Self>
	where
		F: FnOnce(&SsoConfig, CredentialCache) -> C,
	{
		let request = RoleAssumptionRequest::builder(&config.sso_role_arn)
			.session_name(SESSION_NAME)
			.build()?;
		let credentials = CredentialCache::new(request, assumer);

		// Expired material is rejected by the cache itself.
		credentials.retrieve().await?;

		let client = Arc::new(make_client(&config, credentials.clone()));

		trace_debug!(
			instance_arn = %config.instance_arn,
			identity_store_id = %config.identity_store_id,
			"Configured SSO provider."
		);

		Ok(Self { config, credentials, client, enumerator: BoundedEnumerator::default() })
	}

	/// Replaces the enumerator used for permission-set listing.
	pub fn with_enumerator(mut self, enumerator: BoundedEnumerator) -> Self {
		self.enumerator = enumerator;

		self
	}

	/// Provider configuration.
	pub fn config(&self) -> &SsoConfig {
		&self.config
	}

	/// Credential cache shared with the API client.
	pub fn credentials(&self) -> &CredentialCache {
		&self.credentials
	}

	/// API client.
	pub fn client(&self) -> &C {
		&self.client
	}

	/// Lists the permission sets managed through the access workflow.
	pub async fn permission_set_options(&self) -> Result<Vec<ArgOption>> {
		let fetcher =
			PermissionSetPages { client: &*self.client, instance_arn: &self.config.instance_arn };
		let enricher = Arc::new(ManagedPermissionSets {
			client: self.client.clone(),
			instance_arn: self.config.instance_arn.clone(),
		});

		Ok(self.enumerator.enumerate(&fetcher, enricher).await?.into_vec())
	}

	/// Lists every account of the organization.
	pub async fn account_options(&self) -> Result<Vec<ArgOption>> {
		let mut options = Vec::new();
		let mut next_token = None::<String>;
		let mut pages = 0_usize;

		loop {
			pages += 1;

			let page = self
				.client
				.list_accounts(next_token.as_deref())
				.await
				.map_err(|source| EnumerationError::PageFetch { page: pages, source })?;

			options.extend(
				page.accounts
					.into_iter()
					.map(|account| ArgOption::new(account.name.unwrap_or_default(), account.id)),
			);

			match page.next_token {
				Some(token) => next_token = Some(token),
				None => return Ok(options),
			}
		}
	}
}
impl<C> ArgOptioner for SsoProvider<C>
where
	C: 'static + SsoAdminApi,
{
	fn options<'a>(&'a self, arg: &'a str) -> OptionsFuture<'a> {
		const KIND: OpKind = OpKind::Options;

		Box::pin(async move {
			let stage = match arg {
				PERMISSION_SET_ARG => "permission_sets",
				ACCOUNT_ARG => "accounts",
				_ => return Err(Error::InvalidArgument { arg: arg.to_owned() }),
			};
			let span = OpSpan::new(KIND, stage);

			obs::record_op_outcome(KIND, OpOutcome::Attempt);

			let result = span
				.instrument(async {
					if arg == PERMISSION_SET_ARG {
						self.permission_set_options().await
					} else {
						self.account_options().await
					}
				})
				.await;

			obs::record_op_outcome(KIND, OpOutcome::of(&result));

			result
		})
	}
}

impl<C> ArgSchemarer for SsoProvider<C>
where
	C: 'static + SsoAdminApi,
{
	fn arg_schema(&self) -> serde_json::Value {
		serde_json::json!({
			"$schema": "https://json-schema.org/draft/2020-12/schema",
			"title": "SSO access arguments",
			"type": "object",
			"properties": {
				PERMISSION_SET_ARG: {
					"title": "Permission Set",
					"description": "ARN of the permission set to grant.",
					"type": "string",
				},
				ACCOUNT_ARG: {
					"title": "Account",
					"description": "Organization account the permission set is provisioned to.",
					"type": "string",
				},
			},
			"required": [PERMISSION_SET_ARG, ACCOUNT_ARG],
			"additionalProperties": false,
		})
	}
}

struct PermissionSetPages<'c, C> {
	client: &'c C,
	instance_arn: &'c InstanceArn,
}
impl<C> PageFetcher for PermissionSetPages<'_, C>
where
	C: SsoAdminApi,
{
	fn fetch_page<'a>(&'a self, cursor: Option<&'a str>) -> PageFuture<'a> {
		self.client.list_permission_sets(self.instance_arn, cursor)
	}
}

struct ManagedPermissionSets<C> {
	client: Arc<C>,
	instance_arn: InstanceArn,
}
impl<C> ManagedPermissionSets<C>
where
	C: SsoAdminApi,
{
	async fn is_managed(&self, cancellation: &Cancellation, arn: &str) -> Result<bool, BoxError> {
		let mut next_token = None::<String>;

		loop {
			if cancellation.is_cancelled() {
				return Ok(false);
			}

			let page = self
				.client
				.list_tags_for_resource(&self.instance_arn, arn, next_token.as_deref())
				.await?;

			if page.tags.iter().any(|tag| tag.key == MANAGED_BY_TAG) {
				return Ok(true);
			}

			match page.next_token {
				Some(token) => next_token = Some(token),
				None => return Ok(false),
			}
		}
	}
}
impl<C> ItemEnricher for ManagedPermissionSets<C>
where
	C: SsoAdminApi,
{
	fn enrich<'a>(
		&'a self,
		cancellation: &'a Cancellation,
		reference: &'a str,
	) -> EnrichFuture<'a> {
		Box::pin(async move {
			let permission_set =
				self.client.describe_permission_set(&self.instance_arn, reference).await?;

			if !self.is_managed(cancellation, reference).await? {
				return Ok::<_, BoxError>(EnrichedItem::rejected(reference));
			}

			Ok(EnrichedItem::accepted(reference, permission_set.label(), reference))
		})
	}
}
