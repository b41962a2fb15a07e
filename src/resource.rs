//! The base client for a single addressable resource.
//!
//! Concrete wrappers (actors, runs, datasets...) compose a [`ResourceClient`]
//! and forward to its generic verbs. It derives URLs and query parameters from
//! its [`ResourceOptions`], unwraps the `data` envelope and turns 404
//! `record-not-found` answers into `None` for reads and `()` for deletes.

use crate::collection::ListOptions;
use crate::models::PaginatedList;
use crate::request::{QueryParams, RequestBody, RequestDescriptor};
use crate::{Error, HttpClient, Response, Result};
use http::{HeaderMap, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

/// Where a resource lives and how to reach it.
///
/// Cloning shares the [`HttpClient`] (and therefore the statistics) of the
/// top-level client that created these options. The base URL always comes
/// from an [`HttpClient`] or from another resource, so it can carry path
/// segments.
#[derive(Debug, Clone)]
pub struct ResourceOptions {
    base_url: Url,
    resource_path: String,
    id: Option<String>,
    params: QueryParams,
    http_client: HttpClient,
}

impl ResourceOptions {
    /// Options for a top-level resource kind under the client's API root.
    pub fn new(http_client: HttpClient, resource_path: impl Into<String>, params: QueryParams) -> Self {
        Self {
            base_url: http_client.api_url().clone(),
            resource_path: resource_path.into(),
            id: None,
            params,
            http_client,
        }
    }

    /// Scopes the options to one resource id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// URL the resource path is appended to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Path segment(s) of the resource kind, e.g. `acts` or `actor-tasks`.
    pub fn resource_path(&self) -> &str {
        &self.resource_path
    }

    /// Resource id, for id-scoped clients.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Parameters sent with every call (e.g. the auth token).
    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// The executor shared with the top-level client.
    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.resource_path.trim_matches('/').is_empty() {
            return Err(Error::Validation("resource path must not be empty".to_string()));
        }
        if matches!(&self.id, Some(id) if id.trim().is_empty()) {
            return Err(Error::Validation("resource id must not be empty".to_string()));
        }
        Ok(())
    }

    /// `base_url / resource_path [/ id]`, with `/` in the id rewritten to `~`.
    pub(crate) fn resolved_url(&self) -> Url {
        let id = self.id.as_deref().map(safe_id);
        join_segments(
            &self.base_url,
            split_path(&self.resource_path).chain(id.as_deref()),
        )
    }
}

/// A resource-specific call, e.g. "abort a run" or "fetch a log".
#[derive(Debug, Clone)]
pub struct EndpointOptions {
    /// The HTTP method.
    pub method: Method,
    /// Path appended after the resource id, e.g. `abort`.
    pub action: Option<String>,
    /// Per-call parameters, overriding the resource's base parameters.
    pub params: QueryParams,
    /// Additional headers.
    pub headers: HeaderMap,
    /// Optional body.
    pub body: Option<RequestBody>,
    /// Whether the response is JSON.
    pub json: bool,
}

impl EndpointOptions {
    /// A JSON call with no action, parameters or body.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            action: None,
            params: QueryParams::new(),
            headers: HeaderMap::new(),
            body: None,
            json: true,
        }
    }

    /// Sets the action path.
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Merges per-call parameters.
    pub fn params(mut self, params: QueryParams) -> Self {
        self.params.extend(params);
        self
    }

    /// Sets a JSON body.
    pub fn json_body<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::SerializationFailed(e.to_string()))?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    /// Marks the response as non-JSON.
    pub fn raw(mut self) -> Self {
        self.json = false;
        self
    }
}

/// Generic verbs over one resource.
///
/// Construction never fails; malformed options (an empty id, say) are
/// reported as [`Error::Validation`] by the first call, before any I/O.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    options: ResourceOptions,
}

impl ResourceClient {
    /// Creates a client over `options`.
    pub fn new(options: ResourceOptions) -> Self {
        Self { options }
    }

    /// The resolved options.
    pub fn options(&self) -> &ResourceOptions {
        &self.options
    }

    /// The resource id, if the client is id-scoped.
    pub fn id(&self) -> Option<&str> {
        self.options.id()
    }

    /// Builds `base_url / resource_path / id / action`.
    ///
    /// Ids are escaped as one path segment; `/` in an id is rewritten to `~`
    /// the way the API expects (`user/actor` becomes `user~actor`).
    pub fn url(&self, action: Option<&str>) -> Url {
        let url = self.options.resolved_url();
        match action {
            Some(action) => join_segments(&url, split_path(action)),
            None => url,
        }
    }

    /// Base parameters overridden by `call_params`.
    pub fn params(&self, call_params: &QueryParams) -> QueryParams {
        self.options.params.merged(call_params)
    }

    /// Options for a child resource nested under this one, e.g. the runs of an actor.
    ///
    /// The child shares this client's [`HttpClient`] and base parameters.
    pub fn sub_resource_options(&self, resource_path: impl Into<String>, id: Option<&str>) -> ResourceOptions {
        ResourceOptions {
            base_url: self.url(None),
            resource_path: resource_path.into(),
            id: id.map(str::to_string),
            params: self.options.params.clone(),
            http_client: self.options.http_client.clone(),
        }
    }

    /// Fetches the resource; `None` if it does not exist.
    pub async fn get<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.get_with(QueryParams::new()).await
    }

    /// [`ResourceClient::get`] with extra query parameters.
    pub async fn get_with<T: DeserializeOwned>(&self, params: QueryParams) -> Result<Option<T>> {
        let result = self.invoke(EndpointOptions::new(Method::GET).params(params)).await;
        match catch_not_found(result)? {
            Some(response) => response.into_data().map(Some),
            None => Ok(None),
        }
    }

    /// Applies `patch` with a PUT and returns the updated resource.
    pub async fn update<B, T>(&self, patch: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.invoke(EndpointOptions::new(Method::PUT).json_body(patch)?)
            .await?
            .into_data()
    }

    /// Deletes the resource. Deleting a missing resource succeeds.
    pub async fn delete(&self) -> Result<()> {
        let result = self.invoke(EndpointOptions::new(Method::DELETE)).await;
        catch_not_found(result)?;
        Ok(())
    }

    /// Lists items exposed at this resource's URL.
    pub async fn list<T: DeserializeOwned>(&self, options: &ListOptions) -> Result<PaginatedList<T>> {
        self.invoke(EndpointOptions::new(Method::GET).params(options.to_params()?))
            .await?
            .into_data()
    }

    /// Executes an arbitrary call against this resource and returns the raw response.
    pub async fn invoke(&self, endpoint: EndpointOptions) -> Result<Response> {
        self.options.validate()?;
        let descriptor = RequestDescriptor {
            method: endpoint.method,
            url: self.url(endpoint.action.as_deref()).to_string(),
            params: self.params(&endpoint.params),
            headers: endpoint.headers,
            body: endpoint.body,
            json: endpoint.json,
        };
        self.options.http_client.call(descriptor).await
    }
}

/// Turns a 404 `record-not-found` error into `Ok(None)`.
pub(crate) fn catch_not_found<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_record_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

fn safe_id(id: &str) -> String {
    id.replace('/', "~")
}

pub(crate) fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Appends `segments` to `base`, percent-encoding each one.
pub(crate) fn join_segments<'a>(base: &Url, segments: impl Iterator<Item = &'a str>) -> Url {
    let mut url = base.clone();
    // Every base URL originates from a validated `HttpClient` API root.
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty();
        path.extend(segments);
    }
    url
}
