use crate::collection::{Capabilities, ListOptions, ResourceCollectionClient};
use crate::models::{ActorJobStatus, PaginatedList, Run};
use crate::resource::{EndpointOptions, ResourceClient, ResourceOptions};
use crate::resources::log::fetch_text;
use crate::resources::DatasetClient;
use crate::wait::{wait_for_finish, WaitForFinishOptions};
use crate::Result;
use http::Method;

/// The runs of one actor or task, e.g. `acts/{actor}/runs`. Listing only.
#[derive(Debug, Clone)]
pub struct RunCollectionClient {
    collection: ResourceCollectionClient,
}

impl RunCollectionClient {
    pub(crate) fn new(options: ResourceOptions) -> Self {
        Self {
            collection: ResourceCollectionClient::new(options, Capabilities::read_only()),
        }
    }

    /// Lists runs, optionally only those in `status`.
    pub async fn list(
        &self,
        options: &ListOptions,
        status: Option<ActorJobStatus>,
    ) -> Result<PaginatedList<Run>> {
        match status {
            Some(status) => {
                let options = options.clone().filter("status", status.as_wire());
                self.collection.list(&options).await
            }
            None => self.collection.list(options).await,
        }
    }
}

/// One actor run: `acts/{actor}/runs/{id}`.
#[derive(Debug, Clone)]
pub struct RunClient {
    resource: ResourceClient,
}

impl RunClient {
    pub(crate) fn new(options: ResourceOptions) -> Self {
        Self {
            resource: ResourceClient::new(options),
        }
    }

    /// The generic client underneath.
    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    /// Fetches the run; `None` if it does not exist.
    pub async fn get(&self) -> Result<Option<Run>> {
        self.resource.get().await
    }

    /// Aborts the run and returns its updated state.
    pub async fn abort(&self) -> Result<Run> {
        self.resource
            .invoke(EndpointOptions::new(Method::POST).action("abort"))
            .await?
            .into_data()
    }

    /// Polls until the run finishes or `options.wait_secs` elapse.
    ///
    /// The returned run is not inspected: a `FAILED` run is still `Ok`.
    pub async fn wait_for_finish(&self, options: &WaitForFinishOptions) -> Result<Option<Run>> {
        wait_for_finish(&self.resource, options).await
    }

    /// Fetches the run log.
    pub async fn log(&self) -> Result<Option<String>> {
        fetch_text(&self.resource, Some("log")).await
    }

    /// The default dataset of the run.
    pub fn dataset(&self) -> DatasetClient {
        DatasetClient::new(self.resource.sub_resource_options("dataset", None))
    }
}
