use indexmap::IndexMap;

use super::param::ParamValue;

/// Explicit query parameters of a call.
///
/// Unlike [`CallParams`](super::CallParams), these always end up in the URL query
/// string, after any query already present on the base URL or the call path.
///
/// # Example
///
/// ```rust
/// use restline_core::CallQuery;
///
/// let query = CallQuery::new()
///     .add_param("page", 2)
///     .add_param("sort", "name");
/// assert_eq!(query.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallQuery {
    params: IndexMap<String, String>,
}

impl CallQuery {
    /// Creates an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, replacing a previous value with the same name.
    pub fn add_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a parameter, replacing a previous value with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.params
            .insert(name.into(), value.into().to_query_value());
    }

    /// Removes a parameter.
    pub fn remove(&mut self, name: &str) {
        self.params.shift_remove(name);
    }

    /// Returns the string value of a parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Checks if the query is empty.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Merges another query into this one, `other` taking precedence.
    pub fn merge(mut self, other: Self) -> Self {
        self.params.extend(other.params);
        self
    }

    /// Encodes the query as `application/x-www-form-urlencoded`.
    ///
    /// # Errors
    ///
    /// Returns the encoder error, if any.
    pub fn to_query_string(&self) -> Result<String, serde_urlencoded::ser::Error> {
        let pairs: Vec<_> = self.params.iter().collect();
        serde_urlencoded::to_string(pairs)
    }
}
