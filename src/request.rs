//! Request descriptors and query parameter serialization.

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A primitive query parameter value.
///
/// Booleans serialize to `"true"` / `"false"` and numbers to their decimal form.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// A text value, sent verbatim.
    String(String),
    /// A boolean flag.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    UInt(u64),
    /// A floating point number.
    Float(f64),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::String(s) => f.write_str(s),
            QueryValue::Bool(b) => write!(f, "{}", b),
            QueryValue::Int(n) => write!(f, "{}", n),
            QueryValue::UInt(n) => write!(f, "{}", n),
            QueryValue::Float(n) => write!(f, "{}", n),
        }
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::String(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::String(value.to_string())
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        QueryValue::String(value.clone())
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<u64> for QueryValue {
    fn from(value: u64) -> Self {
        QueryValue::UInt(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::UInt(value.into())
    }
}

impl From<usize> for QueryValue {
    fn from(value: usize) -> Self {
        QueryValue::UInt(value as u64)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

/// An ordered set of query parameters.
///
/// Later inserts replace earlier values for the same name, which is how
/// per-call parameters take precedence over a resource's base parameters.
///
/// # Examples
///
/// ```
/// use apify_client::QueryParams;
///
/// let base = QueryParams::new().with("token", "secret").with("desc", false);
/// let call = QueryParams::new().with("desc", true).with("limit", 5u32);
///
/// let merged = base.merged(&call);
/// assert_eq!(
///     merged.to_pairs(),
///     vec![
///         ("desc".to_string(), "true".to_string()),
///         ("limit".to_string(), "5".to_string()),
///         ("token".to_string(), "secret".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(BTreeMap<String, QueryValue>);

impl QueryParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<QueryValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Sets a parameter only when `value` is `Some`. `None` leaves it unset,
    /// which is distinct from sending `false` or `0`.
    pub fn insert_opt<V: Into<QueryValue>>(&mut self, name: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    /// Builder-style [`QueryParams::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the value set for `name`.
    pub fn get(&self, name: &str) -> Option<&QueryValue> {
        self.0.get(name)
    }

    /// Returns `true` if no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a copy of `self` overridden by every parameter of `other`.
    pub fn merged(&self, other: &QueryParams) -> QueryParams {
        let mut merged = self.clone();
        merged.extend(other.clone());
        merged
    }

    /// Serializes every value to its wire form.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect()
    }

    pub(crate) fn validate(&self) -> crate::Result<()> {
        for (name, value) in &self.0 {
            if name.is_empty() {
                return Err(crate::Error::Validation(
                    "query parameter name must not be empty".to_string(),
                ));
            }
            if let QueryValue::Float(n) = value {
                if !n.is_finite() {
                    return Err(crate::Error::Validation(format!(
                        "query parameter `{}` must be a finite number",
                        name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Extend<(String, QueryValue)> for QueryParams {
    fn extend<I: IntoIterator<Item = (String, QueryValue)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for QueryParams {
    type Item = (String, QueryValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, QueryValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The body of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent as `application/json`.
    Json(serde_json::Value),
    /// Sent verbatim.
    Text(String),
}

/// Everything needed to execute one logical API call.
///
/// The `url` may be absolute or relative to the API root of the
/// [`HttpClient`](crate::HttpClient) executing it.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// The HTTP method.
    pub method: Method,

    /// Absolute URL, or a path relative to the API root.
    pub url: String,

    /// Query parameters.
    pub params: QueryParams,

    /// Additional headers for this request.
    pub headers: HeaderMap,

    /// Optional request body.
    pub body: Option<RequestBody>,

    /// Whether the response is expected to be JSON.
    pub json: bool,
}

impl RequestDescriptor {
    /// Creates a JSON request with no parameters or body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: QueryParams::new(),
            headers: HeaderMap::new(),
            body: None,
            json: true,
        }
    }

    /// Adds a header to the request.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the header name or value is invalid.
    pub fn with_header(
        mut self,
        name: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> crate::Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| crate::Error::Validation(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| crate::Error::Validation(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds a query parameter to the request.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.params.insert(name, value);
        self
    }

    /// Merges `params` into the request, overriding existing names.
    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params.extend(params);
        self
    }

    /// Sets a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`](crate::Error::SerializationFailed)
    /// if `body` cannot be represented as JSON.
    pub fn with_json_body<T: Serialize + ?Sized>(mut self, body: &T) -> crate::Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| crate::Error::SerializationFailed(e.to_string()))?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    /// Sets a plain text body.
    pub fn with_text_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    /// Marks the response as non-JSON (e.g. a log).
    pub fn raw(mut self) -> Self {
        self.json = false;
        self
    }

    /// Checks the descriptor before any I/O is attempted.
    pub fn validate(&self) -> crate::Result<()> {
        if self.url.trim().is_empty() {
            return Err(crate::Error::Validation("request URL must not be empty".to_string()));
        }
        if self.body.is_some() && matches!(self.method, Method::GET | Method::HEAD) {
            return Err(crate::Error::Validation(format!(
                "{} requests cannot carry a body",
                self.method
            )));
        }
        self.params.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_value_serialization() {
        assert_eq!(QueryValue::from(true).to_string(), "true");
        assert_eq!(QueryValue::from(false).to_string(), "false");
        assert_eq!(QueryValue::from(5u32).to_string(), "5");
        assert_eq!(QueryValue::from(-3i64).to_string(), "-3");
        assert_eq!(QueryValue::from(1.5f64).to_string(), "1.5");
        assert_eq!(QueryValue::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_list_params_serialize_to_text() {
        let params = QueryParams::new()
            .with("limit", 5u32)
            .with("offset", 3u32)
            .with("desc", true);

        assert_eq!(
            params.to_pairs(),
            vec![
                ("desc".to_string(), "true".to_string()),
                ("limit".to_string(), "5".to_string()),
                ("offset".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_unset_optional_is_omitted() {
        let mut params = QueryParams::new();
        params.insert_opt("forefront", None::<bool>);
        params.insert_opt("clean", Some(false));

        assert!(params.get("forefront").is_none());
        assert_eq!(params.get("clean"), Some(&QueryValue::Bool(false)));
    }

    #[test]
    fn test_per_call_params_take_precedence() {
        let base = QueryParams::new().with("token", "base-token");
        let call = QueryParams::new().with("token", "call-token");

        assert_eq!(
            base.merged(&call).get("token"),
            Some(&QueryValue::String("call-token".to_string()))
        );
    }

    #[test]
    fn test_validation_rejects_bad_descriptors() {
        assert!(RequestDescriptor::new(Method::GET, "").validate().is_err());
        assert!(RequestDescriptor::new(Method::GET, "acts")
            .with_text_body("x")
            .validate()
            .is_err());
        assert!(RequestDescriptor::new(Method::GET, "acts")
            .with_param("limit", f64::NAN)
            .validate()
            .is_err());
        assert!(RequestDescriptor::new(Method::GET, "acts").validate().is_ok());
    }

    #[test]
    fn test_invalid_header_is_validation_error() {
        let result = RequestDescriptor::new(Method::GET, "acts").with_header("bad header", "x");
        assert!(matches!(result, Err(crate::Error::Validation(_))));
    }
}
