use crate::collection::{Capabilities, ListOptions, ResourceCollectionClient};
use crate::models::{Build, PaginatedList};
use crate::resource::{EndpointOptions, ResourceClient, ResourceOptions};
use crate::resources::log::fetch_text;
use crate::wait::{wait_for_finish, WaitForFinishOptions};
use crate::Result;
use http::Method;

/// The builds of one actor: `acts/{actor}/builds`. Listing only.
#[derive(Debug, Clone)]
pub struct BuildCollectionClient {
    collection: ResourceCollectionClient,
}

impl BuildCollectionClient {
    pub(crate) fn new(options: ResourceOptions) -> Self {
        Self {
            collection: ResourceCollectionClient::new(options, Capabilities::read_only()),
        }
    }

    /// Lists builds.
    pub async fn list(&self, options: &ListOptions) -> Result<PaginatedList<Build>> {
        self.collection.list(options).await
    }
}

/// One actor build: `acts/{actor}/builds/{id}`.
#[derive(Debug, Clone)]
pub struct BuildClient {
    resource: ResourceClient,
}

impl BuildClient {
    pub(crate) fn new(options: ResourceOptions) -> Self {
        Self {
            resource: ResourceClient::new(options),
        }
    }

    /// The generic client underneath.
    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    /// Fetches the build; `None` if it does not exist.
    pub async fn get(&self) -> Result<Option<Build>> {
        self.resource.get().await
    }

    /// Aborts the build and returns its updated state.
    pub async fn abort(&self) -> Result<Build> {
        self.resource
            .invoke(EndpointOptions::new(Method::POST).action("abort"))
            .await?
            .into_data()
    }

    /// Polls until the build finishes or `options.wait_secs` elapse.
    ///
    /// See [`wait_for_finish`] for the exact semantics.
    pub async fn wait_for_finish(&self, options: &WaitForFinishOptions) -> Result<Option<Build>> {
        wait_for_finish(&self.resource, options).await
    }

    /// Fetches the build log.
    pub async fn log(&self) -> Result<Option<String>> {
        fetch_text(&self.resource, Some("log")).await
    }
}
