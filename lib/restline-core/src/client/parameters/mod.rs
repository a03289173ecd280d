//! Request parts accumulated by an [`ApiCall`](crate::ApiCall).
//!
//! - [`CallParams`] - Method dependent parameters (query string or JSON body)
//! - [`CallQuery`] - Query string parameters, whatever the method
//! - [`CallHeaders`] - HTTP headers, repeated names allowed
//! - [`CallBody`] - Explicit request body content

mod param;
pub use self::param::{CallParams, ParamValue};

mod query;
pub use self::query::CallQuery;

mod headers;
pub use self::headers::CallHeaders;

mod body;
pub use self::body::CallBody;
