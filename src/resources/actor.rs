use crate::collection::{Capabilities, CollectionOperation, ListOptions, ResourceCollectionClient};
use crate::models::{Actor, Build, PaginatedList, Run};
use crate::request::{QueryParams, RequestBody};
use crate::resource::{EndpointOptions, ResourceClient, ResourceOptions};
use crate::resources::{BuildCollectionClient, RunCollectionClient};
use crate::webhooks::{encode_webhooks, Webhook};
use crate::{Error, Result};
use http::Method;
use serde::Serialize;
use serde_json::Value;

/// Options for starting a run of an actor or a task.
///
/// # Examples
///
/// ```
/// use apify_client::resources::RunOptions;
/// use serde_json::json;
///
/// let options = RunOptions::new()
///     .input(json!({"startUrls": ["https://example.com"]}))
///     .memory_mbytes(1024)
///     .wait_for_finish(60);
/// assert_eq!(options.memory_mbytes, Some(1024));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    /// Input passed to the run as the JSON body.
    pub input: Option<Value>,
    /// Build tag or number to run, e.g. `latest`.
    pub build: Option<String>,
    /// Run timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Memory limit in megabytes.
    pub memory_mbytes: Option<u64>,
    /// Seconds the API holds the start request open waiting for the run to finish.
    pub wait_for_finish: Option<u64>,
    /// Ad-hoc webhooks for this run only.
    pub webhooks: Vec<Webhook>,
}

impl RunOptions {
    /// Default build, limits and no input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the input.
    pub fn input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    /// Sets the build.
    pub fn build(mut self, build: impl Into<String>) -> Self {
        self.build = Some(build.into());
        self
    }

    /// Sets the run timeout.
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Sets the memory limit.
    pub fn memory_mbytes(mut self, memory_mbytes: u64) -> Self {
        self.memory_mbytes = Some(memory_mbytes);
        self
    }

    /// Sets the server-side wait.
    pub fn wait_for_finish(mut self, wait_secs: u64) -> Self {
        self.wait_for_finish = Some(wait_secs);
        self
    }

    /// Adds an ad-hoc webhook.
    pub fn webhook(mut self, webhook: Webhook) -> Self {
        self.webhooks.push(webhook);
        self
    }

    /// The `POST .../runs` call these options describe.
    pub(crate) fn endpoint(&self) -> Result<EndpointOptions> {
        if matches!(&self.build, Some(build) if build.trim().is_empty()) {
            return Err(Error::Validation("build must not be empty".to_string()));
        }

        let mut params = QueryParams::new();
        params.insert_opt("build", self.build.as_deref());
        params.insert_opt("timeout", self.timeout_secs);
        params.insert_opt("memory", self.memory_mbytes);
        params.insert_opt("waitForFinish", self.wait_for_finish);
        if !self.webhooks.is_empty() {
            params.insert("webhooks", encode_webhooks(&self.webhooks)?);
        }

        let mut endpoint = EndpointOptions::new(Method::POST).action("runs").params(params);
        endpoint.body = self.input.clone().map(RequestBody::Json);
        Ok(endpoint)
    }
}

/// Options for building an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Actor version to build, e.g. `0.1`.
    pub version: String,
    /// Build with beta versions of the runtime packages.
    pub beta_packages: Option<bool>,
    /// Tag assigned to a successful build.
    pub tag: Option<String>,
    /// Reuse cached layers.
    pub use_cache: Option<bool>,
    /// Seconds the API holds the request open waiting for the build to finish.
    pub wait_for_finish: Option<u64>,
}

impl BuildOptions {
    /// Builds `version` with default settings.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            beta_packages: None,
            tag: None,
            use_cache: None,
            wait_for_finish: None,
        }
    }

    /// Sets the tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Sets cache usage.
    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = Some(use_cache);
        self
    }

    /// Sets beta packages.
    pub fn beta_packages(mut self, beta_packages: bool) -> Self {
        self.beta_packages = Some(beta_packages);
        self
    }

    /// Sets the server-side wait.
    pub fn wait_for_finish(mut self, wait_secs: u64) -> Self {
        self.wait_for_finish = Some(wait_secs);
        self
    }

    fn to_params(&self) -> Result<QueryParams> {
        if self.version.trim().is_empty() {
            return Err(Error::Validation("build version must not be empty".to_string()));
        }

        let mut params = QueryParams::new().with("version", self.version.as_str());
        params.insert_opt("betaPackages", self.beta_packages);
        params.insert_opt("tag", self.tag.as_deref());
        params.insert_opt("useCache", self.use_cache);
        params.insert_opt("waitForFinish", self.wait_for_finish);
        Ok(params)
    }
}

/// The actors of the account: `acts`.
#[derive(Debug, Clone)]
pub struct ActorCollectionClient {
    collection: ResourceCollectionClient,
}

impl ActorCollectionClient {
    pub(crate) fn new(options: ResourceOptions) -> Self {
        let capabilities = Capabilities::without([CollectionOperation::GetOrCreate]);
        Self {
            collection: ResourceCollectionClient::new(options, capabilities),
        }
    }

    /// Lists actors. Pass the `my` filter to list only actors the user owns.
    pub async fn list(&self, options: &ListOptions) -> Result<PaginatedList<Actor>> {
        self.collection.list(options).await
    }

    /// Creates an actor from `actor`, a JSON object in the API's actor shape.
    pub async fn create<B: Serialize + ?Sized>(&self, actor: &B) -> Result<Actor> {
        self.collection.create(actor).await
    }
}

/// One actor: `acts/{id}`.
#[derive(Debug, Clone)]
pub struct ActorClient {
    resource: ResourceClient,
}

impl ActorClient {
    pub(crate) fn new(options: ResourceOptions) -> Self {
        Self {
            resource: ResourceClient::new(options),
        }
    }

    /// The generic client underneath.
    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    /// Fetches the actor; `None` if it does not exist.
    pub async fn get(&self) -> Result<Option<Actor>> {
        self.resource.get().await
    }

    /// Updates the actor with the fields in `patch`.
    pub async fn update<B: Serialize + ?Sized>(&self, patch: &B) -> Result<Actor> {
        self.resource.update(patch).await
    }

    /// Deletes the actor.
    pub async fn delete(&self) -> Result<()> {
        self.resource.delete().await
    }

    /// Starts a run and returns it immediately, or once it finishes if
    /// `wait_for_finish` is set and the run ends in time.
    pub async fn start(&self, options: &RunOptions) -> Result<Run> {
        self.resource.invoke(options.endpoint()?).await?.into_data()
    }

    /// Starts a build of `options.version`.
    pub async fn build(&self, options: &BuildOptions) -> Result<Build> {
        let endpoint = EndpointOptions::new(Method::POST)
            .action("builds")
            .params(options.to_params()?);
        self.resource.invoke(endpoint).await?.into_data()
    }

    /// The builds of this actor.
    pub fn builds(&self) -> BuildCollectionClient {
        BuildCollectionClient::new(self.resource.sub_resource_options("builds", None))
    }

    /// The runs of this actor.
    pub fn runs(&self) -> RunCollectionClient {
        RunCollectionClient::new(self.resource.sub_resource_options("runs", None))
    }
}
