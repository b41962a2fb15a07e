//! Typed clients for concrete API resources.
//!
//! Each wrapper composes a [`ResourceClient`](crate::ResourceClient) or a
//! [`ResourceCollectionClient`](crate::ResourceCollectionClient) and exposes
//! only the verbs the API supports for that resource.

mod actor;
mod build;
mod dataset;
mod log;
mod run;
mod task;

pub use actor::{ActorClient, ActorCollectionClient, BuildOptions, RunOptions};
pub use build::{BuildClient, BuildCollectionClient};
pub use dataset::{DatasetClient, DatasetCollectionClient};
pub use log::LogClient;
pub use run::{RunClient, RunCollectionClient};
pub use task::{TaskClient, TaskCollectionClient};
