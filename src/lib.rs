//! # apify-client - A client for the Apify API
//!
//! A typed, retry-aware client for the Apify REST API built on top of `reqwest`.
//! Every call goes through one shared HTTP executor that retries rate-limited
//! and failing requests with exponential backoff and counts what it did.
//!
//! ## Quick Start
//!
//! ```no_run
//! use apify_client::{ApifyClient, ListOptions, WaitForFinishOptions};
//! use apify_client::resources::RunOptions;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), apify_client::Error> {
//!     let client = ApifyClient::builder().token("my-token").build()?;
//!
//!     // Start a run and wait up to two minutes for it to finish
//!     let actor = client.actor("apify/hello-world");
//!     let run = actor
//!         .start(&RunOptions::new().input(json!({"message": "hi"})))
//!         .await?;
//!     let run = client
//!         .run(&run.id, "apify/hello-world")
//!         .wait_for_finish(&WaitForFinishOptions::new().wait_secs(120))
//!         .await?;
//!     println!("Run finished as {:?}", run.map(|run| run.status));
//!
//!     // Page through the newest runs
//!     let page = actor.runs().list(&ListOptions::new().limit(10).desc(true), None).await?;
//!     println!("{} of {} runs", page.items.len(), page.total);
//!
//!     println!("Requests sent: {}", client.stats().requests);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Resource clients** - actors, builds, runs, tasks, datasets and logs, derived from one top-level client
//! - **Retries** - 5xx, transport failures and 429s are retried with jittered exponential backoff
//! - **Statistics** - calls, physical requests and rate-limit errors per attempt, shared by all derived clients
//! - **Not-found handling** - `get` of a missing record is `Ok(None)`, `delete` of one is `Ok(())`
//! - **Waiting for jobs** - poll builds and runs until they finish or a deadline passes
//! - **Pluggable transport** - swap the reqwest transport for your own [`Transport`]
//!
//! ## Error Handling
//!
//! Errors keep the raw response and classify themselves with [`ErrorKind`]:
//!
//! ```no_run
//! use apify_client::{ApifyClient, Error, ErrorKind};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = ApifyClient::builder().build()?;
//! match client.dataset("my-dataset").get().await {
//!     Ok(dataset) => println!("Dataset: {:?}", dataset),
//!     Err(Error::HttpError { status, error_type, raw_response, .. }) => {
//!         eprintln!("HTTP error {} ({:?}): {}", status, error_type, raw_response);
//!     }
//!     Err(e) if e.kind() == ErrorKind::RetryBudgetExhausted => {
//!         eprintln!("Gave up: {}", e);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Retry Policy
//!
//! ```no_run
//! use apify_client::{ApifyClient, RetryPolicy};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), apify_client::Error> {
//! let client = ApifyClient::builder()
//!     .retry_policy(
//!         RetryPolicy::new(4, Duration::from_millis(250))
//!             .with_max_backoff(Duration::from_secs(10))
//!             .with_retry_on_status([429, 408]),
//!     )
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod client;
mod collection;
mod config;
mod error;
mod http_client;
pub mod models;
pub mod rate_limit;
mod request;
mod resource;
pub mod resources;
mod response;
pub mod retry;
mod statistics;
mod transport;
mod wait;
mod webhooks;

pub use client::{ApifyClient, ApifyClientBuilder};
pub use collection::{
    Capabilities, CollectionOperation, GetOrCreateOptions, ListOptions, ResourceCollectionClient,
};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{Error, ErrorKind, Result, RECORD_NOT_FOUND};
pub use http_client::HttpClient;
pub use models::{ActorJobStatus, PaginatedList};
pub use request::{QueryParams, QueryValue, RequestBody, RequestDescriptor};
pub use resource::{EndpointOptions, ResourceClient, ResourceOptions};
pub use response::Response;
pub use retry::RetryPolicy;
pub use statistics::{Statistics, StatisticsSnapshot};
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
pub use wait::{wait_for_finish, JobSnapshot, WaitForFinishOptions};
pub use webhooks::{encode_webhooks, Webhook, WebhookEventType};
