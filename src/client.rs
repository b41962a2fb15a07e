//! The top-level API client.
//!
//! [`ApifyClient`] is the main entry point. Use [`ApifyClientBuilder`] to
//! configure it, then derive resource clients from it.

use crate::config::ClientConfig;
use crate::request::QueryParams;
use crate::resource::{ResourceClient, ResourceOptions};
use crate::resources::{
    ActorClient, ActorCollectionClient, BuildClient, DatasetClient, DatasetCollectionClient,
    LogClient, RunClient, TaskClient, TaskCollectionClient,
};
use crate::statistics::{Statistics, StatisticsSnapshot};
use crate::transport::{ReqwestTransport, Transport};
use crate::{HttpClient, Result, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A client for the Apify API.
///
/// The client is cheap to clone and designed to be reused. Every resource
/// client derived from it shares its transport, retry policy and
/// [`Statistics`]. Deriving a resource client performs no I/O.
///
/// # Examples
///
/// ```no_run
/// use apify_client::{ApifyClient, ListOptions, WaitForFinishOptions};
/// use apify_client::resources::RunOptions;
///
/// # async fn example() -> Result<(), apify_client::Error> {
/// let client = ApifyClient::builder().token("my-token").build()?;
///
/// let actors = client.actors().list(&ListOptions::new().limit(10)).await?;
/// println!("{} actors in total", actors.total);
///
/// let run = client.actor("apify/hello-world").start(&RunOptions::new()).await?;
/// let finished = client
///     .run(&run.id, "apify/hello-world")
///     .wait_for_finish(&WaitForFinishOptions::new().wait_secs(120))
///     .await?;
/// println!("Run status: {:?}", finished.map(|run| run.status));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApifyClient {
    http_client: HttpClient,
    base_params: QueryParams,
}

impl std::fmt::Debug for ApifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The token lives in `base_params` and is never printed.
        f.debug_struct("ApifyClient")
            .field("http_client", &self.http_client)
            .finish_non_exhaustive()
    }
}

impl ApifyClient {
    /// Creates a new `ApifyClientBuilder`.
    pub fn builder() -> ApifyClientBuilder {
        ApifyClientBuilder::new()
    }

    /// Creates a client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`](crate::Error::ConfigurationError)
    /// if the configuration is invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        ApifyClientBuilder::new().config(config).build()
    }

    /// The executor shared by every resource client.
    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    /// The live statistics.
    pub fn statistics(&self) -> &Arc<Statistics> {
        self.http_client.stats()
    }

    /// A copy of the current statistics.
    pub fn stats(&self) -> StatisticsSnapshot {
        self.http_client.stats().snapshot()
    }

    /// All actors.
    pub fn actors(&self) -> ActorCollectionClient {
        ActorCollectionClient::new(self.options("acts"))
    }

    /// One actor, by id or by `username/actor-name`.
    pub fn actor(&self, id: &str) -> ActorClient {
        ActorClient::new(self.options("acts").with_id(id))
    }

    /// One build of an actor.
    pub fn build(&self, id: &str, actor_id: &str) -> BuildClient {
        BuildClient::new(self.actor_resource(actor_id).sub_resource_options("builds", Some(id)))
    }

    /// One run of an actor.
    pub fn run(&self, id: &str, actor_id: &str) -> RunClient {
        RunClient::new(self.actor_resource(actor_id).sub_resource_options("runs", Some(id)))
    }

    /// All tasks.
    pub fn tasks(&self) -> TaskCollectionClient {
        TaskCollectionClient::new(self.options("actor-tasks"))
    }

    /// One task, by id or by `username~task-name`.
    pub fn task(&self, id: &str) -> TaskClient {
        TaskClient::new(self.options("actor-tasks").with_id(id))
    }

    /// All datasets.
    pub fn datasets(&self) -> DatasetCollectionClient {
        DatasetCollectionClient::new(self.options("datasets"))
    }

    /// One dataset, by id or by `username~dataset-name`.
    pub fn dataset(&self, id: &str) -> DatasetClient {
        DatasetClient::new(self.options("datasets").with_id(id))
    }

    /// The log of a build or run.
    pub fn log(&self, id: &str) -> LogClient {
        LogClient::new(self.options("logs").with_id(id))
    }

    fn options(&self, resource_path: &str) -> ResourceOptions {
        ResourceOptions::new(self.http_client.clone(), resource_path, self.base_params.clone())
    }

    fn actor_resource(&self, actor_id: &str) -> ResourceClient {
        ResourceClient::new(self.options("acts").with_id(actor_id))
    }
}

/// Builder for configuring and creating an [`ApifyClient`].
///
/// Starts from [`ClientConfig::default`]; every setter overrides one field.
///
/// # Examples
///
/// ```no_run
/// use apify_client::ApifyClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), apify_client::Error> {
/// let client = ApifyClientBuilder::new()
///     .base_url("http://localhost:3333")?
///     .token("my-token")
///     .max_retries(3)
///     .min_delay_between_retries(Duration::from_millis(100))
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ApifyClientBuilder {
    config: ClientConfig,
    timeout: Option<Duration>,
    retry_policy: Option<RetryPolicy>,
    transport: Option<Arc<dyn Transport>>,
}

impl ApifyClientBuilder {
    /// Creates a new `ApifyClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            timeout: None,
            retry_policy: None,
            transport: None,
        }
    }

    /// Replaces every configured value with `config`.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self.timeout = None;
        self
    }

    /// Sets the API host. `/v2` is appended unless the URL already ends in it.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let url = Url::parse(url.as_ref())?;
        self.config.base_url = url.to_string();
        Ok(self)
    }

    /// Sets the API token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Sets how many times a retryable failure is retried.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Sets the backoff before the first retry.
    pub fn min_delay_between_retries(mut self, delay: Duration) -> Self {
        self.config.min_delay_between_retries_millis =
            u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replaces the retry policy derived from `max_retries` and
    /// `min_delay_between_retries`.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Sends requests through `transport` instead of the default reqwest one.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the configured `ApifyClient`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn build(self) -> Result<ApifyClient> {
        self.config.validate()?;
        let api_url = self.config.api_url()?;

        let retry_policy = self.retry_policy.unwrap_or_else(|| {
            RetryPolicy::new(
                self.config.max_retries,
                self.config.min_delay_between_retries(),
            )
        });
        let timeout = self.timeout.unwrap_or_else(|| self.config.timeout());

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        let stats = Arc::new(Statistics::new(retry_policy.max_retries));
        let http_client = HttpClient::new(transport, api_url, retry_policy, Some(timeout), stats)?;

        let mut base_params = QueryParams::new();
        base_params.insert_opt("token", self.config.token);

        tracing::debug!(
            api_url = %http_client.api_url(),
            max_retries = http_client.retry_policy().max_retries,
            "Created API client"
        );

        Ok(ApifyClient {
            http_client,
            base_params,
        })
    }
}

impl Default for ApifyClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
