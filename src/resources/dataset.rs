use crate::collection::{
    Capabilities, CollectionOperation, GetOrCreateOptions, ListOptions, ResourceCollectionClient,
};
use crate::models::{Dataset, PaginatedList};
use crate::resource::{ResourceClient, ResourceOptions};
use crate::Result;
use serde::Serialize;

/// The datasets of the account: `datasets`.
///
/// Datasets are created by name through [`get_or_create`](Self::get_or_create);
/// there is no plain create.
#[derive(Debug, Clone)]
pub struct DatasetCollectionClient {
    collection: ResourceCollectionClient,
}

impl DatasetCollectionClient {
    pub(crate) fn new(options: ResourceOptions) -> Self {
        let capabilities = Capabilities::without([CollectionOperation::Create]);
        Self {
            collection: ResourceCollectionClient::new(options, capabilities),
        }
    }

    /// Lists datasets. Unnamed datasets are only included when `unnamed` is set.
    pub async fn list(&self, options: &ListOptions, unnamed: bool) -> Result<PaginatedList<Dataset>> {
        if unnamed {
            let options = options.clone().filter("unnamed", true);
            self.collection.list(&options).await
        } else {
            self.collection.list(options).await
        }
    }

    /// Returns the dataset called `name`, creating it if it does not exist.
    pub async fn get_or_create(&self, name: &str) -> Result<Dataset> {
        self.collection
            .get_or_create(&GetOrCreateOptions::named(name))
            .await
    }
}

/// One dataset: `datasets/{id}`, or the default dataset of a run.
#[derive(Debug, Clone)]
pub struct DatasetClient {
    resource: ResourceClient,
}

impl DatasetClient {
    pub(crate) fn new(options: ResourceOptions) -> Self {
        Self {
            resource: ResourceClient::new(options),
        }
    }

    /// The generic client underneath.
    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    /// Fetches the dataset; `None` if it does not exist.
    pub async fn get(&self) -> Result<Option<Dataset>> {
        self.resource.get().await
    }

    /// Updates the dataset, e.g. renames it.
    pub async fn update<B: Serialize + ?Sized>(&self, patch: &B) -> Result<Dataset> {
        self.resource.update(patch).await
    }

    /// Deletes the dataset.
    pub async fn delete(&self) -> Result<()> {
        self.resource.delete().await
    }
}
