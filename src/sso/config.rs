//! Provider configuration document.

// self
use crate::{
	_prelude::*,
	auth::{IdentityStoreId, InstanceArn, RoleArn},
	error::ConfigError,
};

/// Describes one key of a provider configuration document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ConfigField {
	/// camelCase key in the JSON document.
	pub key: &'static str,
	/// Operator-facing description.
	pub description: &'static str,
	/// Whether the key may be omitted.
	pub optional: bool,
}
impl ConfigField {
	const fn required(key: &'static str, description: &'static str) -> Self {
		Self { key, description, optional: false }
	}

	const fn optional(key: &'static str, description: &'static str) -> Self {
		Self { key, description, optional: true }
	}
}

/// Settings of an SSO access provider, decoded from its camelCase JSON document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsoConfig {
	/// Role with permission to administer SSO.
	pub sso_role_arn: RoleArn,
	/// SSO instance that owns the permission sets.
	pub instance_arn: InstanceArn,
	/// Identity store backing the instance.
	pub identity_store_id: IdentityStoreId,
	/// Region the instance is deployed to; the ambient default applies when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub region: Option<String>,
}
impl SsoConfig {
	/// Keys of the configuration document with their operator-facing descriptions.
	pub const FIELDS: [ConfigField; 4] = [
		ConfigField::required(
			"ssoRoleArn",
			"The ARN of the AWS IAM Role with permission to administer SSO",
		),
		ConfigField::required("identityStoreId", "the AWS SSO Identity Store ID"),
		ConfigField::required("instanceArn", "the AWS SSO Instance ARN"),
		ConfigField::optional("region", "the region the AWS SSO instance is deployed to"),
	];

	/// Decodes and validates a JSON configuration document.
	pub fn from_json(json: &str) -> Result<Self> {
		serde_json::from_str(json).map_err(|source| ConfigError::Parse { source }.into())
	}
}
