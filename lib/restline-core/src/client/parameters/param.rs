use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

/// A dynamically typed parameter value.
///
/// Parameters set with [`ApiCall::with_param`](crate::ApiCall::with_param) are placed either in
/// the query string or in the JSON body depending on the HTTP method. A single
/// rule is used for each placement:
///
/// - **query**: [`to_query_value`](Self::to_query_value), strings are kept verbatim, numbers
///   and booleans use their JSON text, structured values use their compact JSON text;
/// - **body**: the value serializes to its native JSON form (no tagging).
///
/// # Examples
///
/// ```rust
/// use restline_core::ParamValue;
///
/// assert_eq!(ParamValue::from("bar").to_query_value(), "bar");
/// assert_eq!(ParamValue::from(3).to_query_value(), "3");
/// assert_eq!(ParamValue::from(true).to_query_value(), "true");
///
/// let json = serde_json::to_string(&ParamValue::from(3)).unwrap();
/// assert_eq!(json, "3");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A string value.
    String(String),
    /// A JSON number.
    Number(serde_json::Number),
    /// A boolean value.
    Bool(bool),
    /// Any other JSON value (arrays, objects, null).
    Json(serde_json::Value),
}

impl ParamValue {
    /// Returns the string used when the value is placed in a query string.
    pub fn to_query_value(&self) -> String {
        match self {
            Self::String(value) => value.clone(),
            Self::Number(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
            Self::Json(value) => value.to_string(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_value())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Number(serde_json::Number::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map_or(Self::Json(serde_json::Value::Null), Self::Number)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        Self::from(f64::from(value))
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(value) => Self::String(value),
            serde_json::Value::Number(value) => Self::Number(value),
            serde_json::Value::Bool(value) => Self::Bool(value),
            value => Self::Json(value),
        }
    }
}

/// Method dependent parameters of a call, keyed by name.
///
/// Setting a key twice keeps the last value. Iteration follows the first
/// insertion of each key so that finalizing the same call twice yields the same
/// bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CallParams {
    params: IndexMap<String, ParamValue>,
}

impl CallParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a parameter.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(name.into(), value.into());
    }

    /// Removes a parameter, returning its previous value.
    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.params.shift_remove(name)
    }

    /// Returns the value of a parameter.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Checks if there is no parameter.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Iterates over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Encodes the parameters as an `application/x-www-form-urlencoded` query string.
    pub(in crate::client) fn to_query_string(
        &self,
    ) -> Result<String, serde_urlencoded::ser::Error> {
        let pairs: Vec<_> = self
            .params
            .iter()
            .map(|(name, value)| (name.as_str(), value.to_query_value()))
            .collect();
        serde_urlencoded::to_string(pairs)
    }
}
