use crate::collection::{Capabilities, CollectionOperation, ListOptions, ResourceCollectionClient};
use crate::models::{PaginatedList, Run, Task};
use crate::resource::{ResourceClient, ResourceOptions};
use crate::resources::{RunCollectionClient, RunOptions};
use crate::Result;
use serde::Serialize;

/// The saved tasks of the account: `actor-tasks`.
#[derive(Debug, Clone)]
pub struct TaskCollectionClient {
    collection: ResourceCollectionClient,
}

impl TaskCollectionClient {
    pub(crate) fn new(options: ResourceOptions) -> Self {
        let capabilities = Capabilities::without([CollectionOperation::GetOrCreate]);
        Self {
            collection: ResourceCollectionClient::new(options, capabilities),
        }
    }

    /// Lists tasks.
    pub async fn list(&self, options: &ListOptions) -> Result<PaginatedList<Task>> {
        self.collection.list(options).await
    }

    /// Creates a task. `task` must name the actor (`actId`) it runs.
    pub async fn create<B: Serialize + ?Sized>(&self, task: &B) -> Result<Task> {
        self.collection.create(task).await
    }
}

/// One task: `actor-tasks/{id}`.
#[derive(Debug, Clone)]
pub struct TaskClient {
    resource: ResourceClient,
}

impl TaskClient {
    pub(crate) fn new(options: ResourceOptions) -> Self {
        Self {
            resource: ResourceClient::new(options),
        }
    }

    /// The generic client underneath.
    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    /// Fetches the task; `None` if it does not exist.
    pub async fn get(&self) -> Result<Option<Task>> {
        self.resource.get().await
    }

    /// Updates the task with the fields in `patch`.
    pub async fn update<B: Serialize + ?Sized>(&self, patch: &B) -> Result<Task> {
        self.resource.update(patch).await
    }

    /// Deletes the task.
    pub async fn delete(&self) -> Result<()> {
        self.resource.delete().await
    }

    /// Starts a run of the task. `options.input` overrides fields of the saved input.
    pub async fn start(&self, options: &RunOptions) -> Result<Run> {
        self.resource.invoke(options.endpoint()?).await?.into_data()
    }

    /// The runs of this task.
    pub fn runs(&self) -> RunCollectionClient {
        RunCollectionClient::new(self.resource.sub_resource_options("runs", None))
    }
}
