use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};

use super::param::ParamValue;
use crate::client::error::ApiClientError;

/// Represents HTTP headers for an API call.
///
/// Headers are kept as an ordered list of name/value pairs: adding a header never
/// replaces an existing value, so repeated headers are sent in insertion order.
/// Names and values are validated when the call is finalized.
///
/// # Example
///
/// ```rust
/// use restline_core::CallHeaders;
///
/// let headers = CallHeaders::new()
///     .add_header("Accept", "application/json")
///     .add_header("X-Trace", "a")
///     .add_header("X-Trace", "b");
/// assert_eq!(headers.get_all("x-trace").collect::<Vec<_>>(), ["a", "b"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallHeaders {
    headers: Vec<(String, String)>,
}

impl CallHeaders {
    /// Creates a new empty `CallHeaders` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header.
    pub fn add_header(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.append(name, value);
        self
    }

    /// Appends a header, keeping any previous value with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.headers
            .push((name.into(), value.into().to_query_value()));
    }

    /// Sets a header, removing every previous value with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        self.remove(&name);
        self.append(name, value);
    }

    /// Removes every value of a header. Names are compared case-insensitively.
    pub fn remove(&mut self, name: &str) {
        self.headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
    }

    /// Returns the first value of a header.
    pub fn get<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        self.get_all(name).next()
    }

    /// Returns all values of a header, in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Checks if the headers collection is empty.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Returns the number of header values.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Iterates over header name/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Converts headers to an HTTP header map, preserving the order of repeated names.
    pub(in crate::client) fn to_header_map(&self) -> Result<HeaderMap, ApiClientError> {
        let mut result = HeaderMap::with_capacity(self.headers.len());

        for (name, value) in &self.headers {
            result.append(
                HeaderName::from_bytes(name.as_bytes())?,
                HeaderValue::from_str(value)?,
            );
        }

        Ok(result)
    }
}
