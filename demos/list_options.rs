//! Demonstrates initializing the SSO provider against an in-memory admin API and listing the
//! options of both supported arguments.
//!
//! The role assumer hands out one-hour credentials; a real integration would call the
//! role-assumption endpoint with ambient credentials instead.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use time::{Duration, OffsetDateTime};
// self
use access_broker::{
	auth::{CredentialSet, InstanceArn},
	cache::CredentialCache,
	enumerate::Page,
	error::BoxError,
	options::ArgOptioner,
	sso::{
		Account, AccountPage, ApiFuture, MANAGED_BY_TAG, PermissionSet, SsoAdminApi, SsoConfig,
		SsoProvider, Tag, TagPage,
	},
	sts::{AssumeRoleFn, RoleAssumptionRequest},
};

/// Admin API serving one page of permission sets and one page of accounts.
struct InMemorySso {
	// Held the way an SDK client would hold its credential provider.
	_credentials: CredentialCache,
}
impl SsoAdminApi for InMemorySso {
	fn list_permission_sets<'a>(
		&'a self,
		_instance_arn: &'a InstanceArn,
		_next_token: Option<&'a str>,
	) -> ApiFuture<'a, Page> {
		let arns = ["arn:ps/admin", "arn:ps/legacy", "arn:ps/support"];

		Box::pin(async move { Ok::<_, BoxError>(Page::last(arns)) })
	}

	fn describe_permission_set<'a>(
		&'a self,
		_instance_arn: &'a InstanceArn,
		permission_set_arn: &'a str,
	) -> ApiFuture<'a, PermissionSet> {
		let name = permission_set_arn.trim_start_matches("arn:ps/").to_owned();

		Box::pin(async move {
			Ok::<_, BoxError>(PermissionSet {
				name: Some(name),
				description: Some("Managed by the demo".into()),
			})
		})
	}

	fn list_tags_for_resource<'a>(
		&'a self,
		_instance_arn: &'a InstanceArn,
		resource_arn: &'a str,
		_next_token: Option<&'a str>,
	) -> ApiFuture<'a, TagPage> {
		let tags = if resource_arn.ends_with("legacy") {
			Vec::new()
		} else {
			vec![Tag::new(MANAGED_BY_TAG, Some("true".into()))]
		};

		Box::pin(async move { Ok::<_, BoxError>(TagPage { tags, next_token: None }) })
	}

	fn list_accounts<'a>(&'a self, _next_token: Option<&'a str>) -> ApiFuture<'a, AccountPage> {
		Box::pin(async {
			Ok::<_, BoxError>(AccountPage {
				accounts: vec![
					Account { id: "111111111111".into(), name: Some("Production".into()) },
					Account { id: "222222222222".into(), name: Some("Staging".into()) },
				],
				next_token: None,
			})
		})
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = SsoConfig::from_json(
		r#"{
			"ssoRoleArn": "arn:aws:iam::123456789012:role/granted-sso",
			"instanceArn": "arn:aws:sso:::instance/ssoins-1234567890abcdef",
			"identityStoreId": "d-1234567890"
		}"#,
	)?;
	let assumer = AssumeRoleFn::new(|request: RoleAssumptionRequest| async move {
		CredentialSet::builder()
			.access_key_id(format!("ASIA-{}", request.session_name()))
			.secret_access_key("demo-secret")
			.session_token("demo-token")
			.expires_at(OffsetDateTime::now_utc() + Duration::hours(1))
			.build()
			.map_err(BoxError::from)
	});
	let provider = SsoProvider::init(config, Arc::new(assumer), |_config, credentials| {
		InMemorySso { _credentials: credentials }
	})
	.await?;

	for arg in ["permissionSetArn", "accountId"] {
		println!("{arg}:");

		for option in provider.options(arg).await? {
			println!("  {} => {}", option.label, option.value);
		}
	}

	Ok(())
}
