//! The base client for a collection of resources of one kind.
//!
//! Collections differ in which generic verbs the API supports: runs can only be
//! listed, datasets can be listed and fetched by name, actors can be listed and
//! created. Rather than subclassing, each collection is built with a
//! [`Capabilities`] set; the typed wrappers in [`resources`](crate::resources)
//! expose only the verbs their set includes, and the shared base refuses the
//! rest with [`Error::NotSupported`] before sending anything.

use crate::models::PaginatedList;
use crate::request::{QueryParams, RequestBody, RequestDescriptor};
use crate::resource::{join_segments, split_path, ResourceOptions};
use crate::{Error, Result};
use http::{HeaderMap, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use url::Url;

/// A generic collection verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CollectionOperation {
    /// Paginated listing.
    List,
    /// Creating a new resource.
    Create,
    /// Fetching a named resource, creating it if missing.
    GetOrCreate,
}

impl CollectionOperation {
    /// The operation name used in errors.
    pub fn name(self) -> &'static str {
        match self {
            CollectionOperation::List => "list",
            CollectionOperation::Create => "create",
            CollectionOperation::GetOrCreate => "getOrCreate",
        }
    }
}

/// The verbs a collection supports, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities(BTreeSet<CollectionOperation>);

impl Capabilities {
    /// Every generic verb.
    pub fn all() -> Self {
        Self::only([
            CollectionOperation::List,
            CollectionOperation::Create,
            CollectionOperation::GetOrCreate,
        ])
    }

    /// Listing only.
    pub fn read_only() -> Self {
        Self::only([CollectionOperation::List])
    }

    /// Exactly the given verbs.
    pub fn only(operations: impl IntoIterator<Item = CollectionOperation>) -> Self {
        Self(operations.into_iter().collect())
    }

    /// Every verb except the given ones.
    pub fn without(operations: impl IntoIterator<Item = CollectionOperation>) -> Self {
        let mut capabilities = Self::all();
        for operation in operations {
            capabilities.0.remove(&operation);
        }
        capabilities
    }

    /// Returns `true` if `operation` is enabled.
    pub fn supports(&self, operation: CollectionOperation) -> bool {
        self.0.contains(&operation)
    }
}

const RESERVED_LIST_PARAMS: [&str; 3] = ["limit", "offset", "desc"];

/// Pagination, ordering and filters for list calls.
///
/// # Examples
///
/// ```
/// use apify_client::ListOptions;
///
/// let options = ListOptions::new().limit(5).offset(3).desc(true);
/// let pairs = options.to_params().unwrap().to_pairs();
///
/// assert_eq!(
///     pairs,
///     vec![
///         ("desc".to_string(), "true".to_string()),
///         ("limit".to_string(), "5".to_string()),
///         ("offset".to_string(), "3".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    /// Maximum number of items to return.
    pub limit: Option<u64>,
    /// Number of items to skip.
    pub offset: Option<u64>,
    /// Newest first when `true`.
    pub desc: Option<bool>,
    /// Collection-specific filters, e.g. `status` for runs.
    pub filters: QueryParams,
}

impl ListOptions {
    /// No pagination, default order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `limit`.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets `offset`.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sets `desc`.
    pub fn desc(mut self, desc: bool) -> Self {
        self.desc = Some(desc);
        self
    }

    /// Adds a collection-specific filter.
    pub fn filter(mut self, name: impl Into<String>, value: impl Into<crate::QueryValue>) -> Self {
        self.filters.insert(name, value);
        self
    }

    /// Validates and converts to query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a filter shadows `limit`, `offset` or `desc`.
    pub fn to_params(&self) -> Result<QueryParams> {
        for reserved in RESERVED_LIST_PARAMS {
            if self.filters.get(reserved).is_some() {
                return Err(Error::Validation(format!(
                    "`{}` must be set through ListOptions, not as a filter",
                    reserved
                )));
            }
        }

        let mut params = self.filters.clone();
        params.insert_opt("limit", self.limit);
        params.insert_opt("offset", self.offset);
        params.insert_opt("desc", self.desc);
        Ok(params)
    }
}

/// Arguments of a get-or-create call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetOrCreateOptions {
    /// Name identifying the resource. Unnamed resources are always created.
    pub name: Option<String>,
    /// Initial body used if the resource is created.
    pub body: Option<serde_json::Value>,
}

impl GetOrCreateOptions {
    /// Get or create the resource called `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            body: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if matches!(&self.name, Some(name) if name.trim().is_empty()) {
            return Err(Error::Validation("name must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Generic verbs over a resource collection.
#[derive(Debug, Clone)]
pub struct ResourceCollectionClient {
    options: ResourceOptions,
    capabilities: Capabilities,
}

impl ResourceCollectionClient {
    /// Creates a collection client with the given capability set.
    pub fn new(options: ResourceOptions, capabilities: Capabilities) -> Self {
        Self {
            options,
            capabilities,
        }
    }

    /// The enabled verbs.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// The collection URL.
    pub fn url(&self) -> Url {
        join_segments(self.options.base_url(), split_path(self.options.resource_path()))
    }

    /// Lists one page of the collection.
    pub async fn list<T: DeserializeOwned>(&self, options: &ListOptions) -> Result<PaginatedList<T>> {
        self.ensure(CollectionOperation::List)?;
        let params = options.to_params()?;
        self.send(Method::GET, params, None).await
    }

    /// Creates a resource.
    pub async fn create<B, T>(&self, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.ensure(CollectionOperation::Create)?;
        let body = serde_json::to_value(body)
            .map_err(|e| Error::SerializationFailed(e.to_string()))?;
        self.send(Method::POST, QueryParams::new(), Some(RequestBody::Json(body)))
            .await
    }

    /// Returns the resource called `options.name`, creating it first if needed.
    ///
    /// The API decides which happened; the result has the same shape either way.
    pub async fn get_or_create<T: DeserializeOwned>(&self, options: &GetOrCreateOptions) -> Result<T> {
        self.ensure(CollectionOperation::GetOrCreate)?;
        options.validate()?;

        let mut params = QueryParams::new();
        params.insert_opt("name", options.name.as_deref());
        let body = options.body.clone().map(RequestBody::Json);
        self.send(Method::POST, params, body).await
    }

    fn ensure(&self, operation: CollectionOperation) -> Result<()> {
        if !self.capabilities.supports(operation) {
            return Err(Error::NotSupported {
                operation: operation.name(),
                resource: self.options.resource_path().to_string(),
            });
        }
        self.options.validate()?;
        if self.options.id().is_some() {
            return Err(Error::Validation(
                "collection clients cannot be scoped to an id".to_string(),
            ));
        }
        Ok(())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        call_params: QueryParams,
        body: Option<RequestBody>,
    ) -> Result<T> {
        let descriptor = RequestDescriptor {
            method,
            url: self.url().to_string(),
            params: self.options.params().merged(&call_params),
            headers: HeaderMap::new(),
            body,
            json: true,
        };
        self.options
            .http_client()
            .call(descriptor)
            .await?
            .into_data()
    }
}
