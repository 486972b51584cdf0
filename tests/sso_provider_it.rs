// std
use std::{
	collections::HashMap,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use time::{Duration, OffsetDateTime};
// self
use access_broker::{
	auth::{CredentialSet, InstanceArn},
	enumerate::Page,
	error::{BoxError, CredentialError, EnumerationError, Error},
	options::{ArgOption, ArgOptioner, ArgSchemarer},
	sso::{
		Account, AccountPage, ApiFuture, MANAGED_BY_TAG, PermissionSet, SsoAdminApi, SsoConfig,
		SsoProvider, Tag, TagPage,
	},
	sts::{AssumeRoleFn, RoleAssumer, RoleAssumptionRequest},
};

const CONFIG: &str = r#"{
	"ssoRoleArn": "arn:aws:iam::123456789012:role/granted-sso",
	"instanceArn": "arn:aws:sso:::instance/ssoins-1234567890abcdef",
	"identityStoreId": "d-1234567890",
	"region": "ap-southeast-2"
}"#;

fn next_of<T>(pages: &[T], index: usize) -> Option<String> {
	(index + 1 < pages.len()).then(|| (index + 1).to_string())
}

fn index_of(token: Option<&str>) -> Result<usize, BoxError> {
	Ok(token.map(str::parse).transpose()?.unwrap_or(0))
}

#[derive(Debug, Default)]
struct FakeSso {
	permission_sets: Vec<Vec<String>>,
	details: HashMap<String, PermissionSet>,
	tags: HashMap<String, Vec<Vec<Tag>>>,
	accounts: Vec<Vec<Account>>,
	failing_describe: Option<String>,
	calls: AtomicUsize,
}
impl FakeSso {
	fn with_permission_set(
		mut self,
		arn: &str,
		name: &str,
		description: Option<&str>,
		tag_pages: Vec<Vec<&str>>,
	) -> Self {
		self.details.insert(arn.to_owned(), PermissionSet {
			name: Some(name.to_owned()),
			description: description.map(str::to_owned),
		});
		self.tags.insert(
			arn.to_owned(),
			tag_pages
				.into_iter()
				.map(|page| page.into_iter().map(|key| Tag::new(key, None)).collect())
				.collect(),
		);

		self
	}
}
impl SsoAdminApi for FakeSso {
	fn list_permission_sets<'a>(
		&'a self,
		_instance_arn: &'a InstanceArn,
		next_token: Option<&'a str>,
	) -> ApiFuture<'a, Page> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let index = index_of(next_token)?;

			Ok::<_, BoxError>(Page::new(
				self.permission_sets[index].clone(),
				next_of(&self.permission_sets, index),
			))
		})
	}

	fn describe_permission_set<'a>(
		&'a self,
		_instance_arn: &'a InstanceArn,
		permission_set_arn: &'a str,
	) -> ApiFuture<'a, PermissionSet> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);

			if self.failing_describe.as_deref() == Some(permission_set_arn) {
				return Err("AccessDeniedException".into());
			}

			self.details
				.get(permission_set_arn)
				.cloned()
				.ok_or_else(|| BoxError::from(format!("ResourceNotFound: {permission_set_arn}")))
		})
	}

	fn list_tags_for_resource<'a>(
		&'a self,
		_instance_arn: &'a InstanceArn,
		resource_arn: &'a str,
		next_token: Option<&'a str>,
	) -> ApiFuture<'a, TagPage> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let index = index_of(next_token)?;
			let pages = self.tags.get(resource_arn).map(Vec::as_slice).unwrap_or_default();
			let tags = pages.get(index).cloned().unwrap_or_default();

			Ok::<_, BoxError>(TagPage { tags, next_token: next_of(pages, index) })
		})
	}

	fn list_accounts<'a>(&'a self, next_token: Option<&'a str>) -> ApiFuture<'a, AccountPage> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let index = index_of(next_token)?;

			Ok::<_, BoxError>(AccountPage {
				accounts: self.accounts[index].clone(),
				next_token: next_of(&self.accounts, index),
			})
		})
	}
}

fn fresh_assumer(
	sessions: Arc<parking_lot::Mutex<Vec<String>>>,
	ttl: Duration,
) -> Arc<dyn RoleAssumer> {
	Arc::new(AssumeRoleFn::new(move |request: RoleAssumptionRequest| {
		sessions.lock().push(request.session_name().to_string());

		async move {
			CredentialSet::builder()
				.access_key_id("ASIAPROVIDER")
				.secret_access_key("secret")
				.session_token("token")
				.expires_at(OffsetDateTime::now_utc() + ttl)
				.build()
				.map_err(BoxError::from)
		}
	}))
}

fn fake() -> FakeSso {
	FakeSso {
		permission_sets: vec![
			vec!["arn:ps/admin".into(), "arn:ps/billing".into()],
			vec!["arn:ps/readonly".into()],
			vec![],
		],
		accounts: vec![
			vec![Account { id: "111111111111".into(), name: Some("Production".into()) }],
			vec![Account { id: "222222222222".into(), name: None }],
		],
		..Default::default()
	}
	.with_permission_set("arn:ps/admin", "Admin", None, vec![vec!["owner"], vec![MANAGED_BY_TAG]])
	.with_permission_set("arn:ps/billing", "Billing", Some("Invoices"), vec![vec!["owner"]])
	.with_permission_set(
		"arn:ps/readonly",
		"ReadOnly",
		Some("View everything"),
		vec![vec![MANAGED_BY_TAG, "owner"]],
	)
}

async fn provider(api: FakeSso) -> SsoProvider<FakeSso> {
	let config = SsoConfig::from_json(CONFIG).expect("Configuration should decode.");
	let sessions = Arc::new(parking_lot::Mutex::new(Vec::new()));

	SsoProvider::init(config, fresh_assumer(sessions, Duration::hours(1)), |_config, _cache| api)
		.await
		.expect("Provider should initialize.")
}

#[tokio::test]
async fn init_assumes_the_admin_role_once_with_a_fixed_session_name() {
	let config = SsoConfig::from_json(CONFIG).expect("Configuration should decode.");
	let sessions = Arc::new(parking_lot::Mutex::new(Vec::new()));
	let provider = SsoProvider::init(
		config,
		fresh_assumer(sessions.clone(), Duration::hours(1)),
		|config, cache| {
			assert_eq!(config.region.as_deref(), Some("ap-southeast-2"));
			assert!(cache.peek().is_some());

			FakeSso::default()
		},
	)
	.await
	.expect("Provider should initialize.");

	assert_eq!(*sessions.lock(), ["accesshandler-aws-sso"]);
	assert_eq!(
		provider.credentials().peek().map(|set| set.access_key_id).as_deref(),
		Some("ASIAPROVIDER")
	);
}

#[tokio::test]
async fn init_rejects_expired_credentials() {
	let config = SsoConfig::from_json(CONFIG).expect("Configuration should decode.");
	let sessions = Arc::new(parking_lot::Mutex::new(Vec::new()));
	let err = SsoProvider::init(
		config,
		fresh_assumer(sessions, Duration::minutes(-5)),
		|_config, _cache| FakeSso::default(),
	)
	.await
	.expect_err("Expired credentials must abort initialization.");

	assert!(matches!(err, Error::Credential(CredentialError::ExpiredOnReceipt { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn permission_set_options_keep_only_managed_sets() {
	let provider = provider(fake()).await;
	let mut options = provider.options("permissionSetArn").await.expect("Listing should succeed.");

	options.sort();

	assert_eq!(options, [
		ArgOption::new("Admin", "arn:ps/admin"),
		ArgOption::new("ReadOnly: View everything", "arn:ps/readonly"),
	]);
}

#[tokio::test]
async fn account_options_walk_every_page() {
	let provider = provider(fake()).await;
	let options = provider.options("accountId").await.expect("Listing should succeed.");

	assert_eq!(options, [
		ArgOption::new("Production", "111111111111"),
		ArgOption::new("", "222222222222"),
	]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn every_schema_argument_has_options() {
	let provider = provider(fake()).await;
	let schema = provider.arg_schema();
	let properties = schema["properties"].as_object().expect("Schema should list properties.");

	assert_eq!(schema["required"], serde_json::json!(["permissionSetArn", "accountId"]));
	assert_eq!(schema["additionalProperties"], false);
	assert_eq!(properties["permissionSetArn"]["title"], "Permission Set");
	assert_eq!(properties["accountId"]["title"], "Account");

	for arg in properties.keys() {
		let options = provider.options(arg).await.expect("Schema arguments should be listable.");

		assert!(!options.is_empty(), "`{arg}` should have options.");
	}
}

#[tokio::test]
async fn unknown_arguments_fail_before_any_remote_call() {
	let provider = provider(fake()).await;
	let err = provider.options("region").await.expect_err("Unknown arguments must be rejected.");

	assert!(matches!(err, Error::InvalidArgument { ref arg } if arg == "region"));
	assert_eq!(provider.client().calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn a_failing_describe_fails_the_whole_listing() {
	let api = FakeSso { failing_describe: Some("arn:ps/billing".into()), ..fake() };
	let provider = provider(api).await;
	let err = provider.options("permissionSetArn").await.expect_err("Listing must fail.");

	match err {
		Error::Enumeration(EnumerationError::Enrichment { reference, source }) => {
			assert_eq!(reference, "arn:ps/billing");
			assert_eq!(source.to_string(), "AccessDeniedException");
		},
		other => panic!("Unexpected error: {other:?}"),
	}
}
