//! Remote SSO administration and organization endpoints consumed by the provider.

// self
use crate::{_prelude::*, auth::InstanceArn, enumerate::Page};

/// Boxed future returned by [`SsoAdminApi`] calls.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BoxError>> + 'a + Send>>;

/// SSO admin and organizations calls the provider needs.
///
/// Every listing call is cursor-paginated: pass `None` for the first page and the returned
/// token for the following ones.
pub trait SsoAdminApi
where
	Self: Send + Sync,
{
	/// Lists permission set ARNs of an instance.
	fn list_permission_sets<'a>(
		&'a self,
		instance_arn: &'a InstanceArn,
		next_token: Option<&'a str>,
	) -> ApiFuture<'a, Page>;

	/// Describes one permission set.
	fn describe_permission_set<'a>(
		&'a self,
		instance_arn: &'a InstanceArn,
		permission_set_arn: &'a str,
	) -> ApiFuture<'a, PermissionSet>;

	/// Lists the tags attached to a resource of the instance.
	fn list_tags_for_resource<'a>(
		&'a self,
		instance_arn: &'a InstanceArn,
		resource_arn: &'a str,
		next_token: Option<&'a str>,
	) -> ApiFuture<'a, TagPage>;

	/// Lists the accounts of the organization.
	fn list_accounts<'a>(&'a self, next_token: Option<&'a str>) -> ApiFuture<'a, AccountPage>;
}

/// Permission set description.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
	/// Display name.
	pub name: Option<String>,
	/// Free-form description.
	pub description: Option<String>,
}
impl PermissionSet {
	/// Label shown for the permission set: `name`, or `name: description` when described.
	pub fn label(&self) -> String {
		let name = self.name.as_deref().unwrap_or_default();

		match &self.description {
			Some(description) => format!("{name}: {description}"),
			None => name.to_owned(),
		}
	}
}

/// Resource tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
	/// Tag key.
	pub key: String,
	/// Tag value.
	pub value: Option<String>,
}
impl Tag {
	/// Creates a tag.
	pub fn new(key: impl Into<String>, value: Option<String>) -> Self {
		Self { key: key.into(), value }
	}
}

/// One page of tags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagPage {
	/// Tags on this page.
	pub tags: Vec<Tag>,
	/// Token of the following page.
	pub next_token: Option<String>,
}

/// Organization account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
	/// Twelve-digit account id.
	pub id: String,
	/// Account name.
	pub name: Option<String>,
}

/// One page of accounts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountPage {
	/// Accounts on this page.
	pub accounts: Vec<Account>,
	/// Token of the following page.
	pub next_token: Option<String>,
}
