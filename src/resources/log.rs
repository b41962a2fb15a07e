use crate::resource::{catch_not_found, EndpointOptions, ResourceClient, ResourceOptions};
use crate::{Response, Result};
use http::Method;

/// The log of a build or run: `logs/{id}`.
///
/// Logs are plain text, so the request is sent without JSON handling and the
/// body is returned as is.
#[derive(Debug, Clone)]
pub struct LogClient {
    resource: ResourceClient,
}

impl LogClient {
    pub(crate) fn new(options: ResourceOptions) -> Self {
        Self {
            resource: ResourceClient::new(options),
        }
    }

    /// Fetches the log text; `None` if there is no such log.
    pub async fn get(&self) -> Result<Option<String>> {
        fetch_text(&self.resource, None).await
    }
}

/// GETs a plain-text document under `resource`, mapping `record-not-found` to `None`.
pub(crate) async fn fetch_text(resource: &ResourceClient, action: Option<&str>) -> Result<Option<String>> {
    let mut endpoint = EndpointOptions::new(Method::GET).raw();
    if let Some(action) = action {
        endpoint = endpoint.action(action);
    }
    let response = catch_not_found(resource.invoke(endpoint).await)?;
    Ok(response.map(Response::into_text))
}
