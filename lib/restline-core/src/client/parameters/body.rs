use std::io::Read;

use bytes::Bytes;
use headers::ContentType;
use serde::Serialize;

use crate::client::error::ApiClientError;

/// Represents the body of an HTTP request with its content type.
///
/// Setting an explicit body on a call takes precedence over the JSON body that
/// would otherwise be derived from its parameters.
#[derive(Clone, derive_more::Debug, PartialEq)]
pub struct CallBody {
    pub(in crate::client) content_type: ContentType,
    #[debug(ignore)]
    pub(in crate::client) data: Bytes,
}

impl CallBody {
    /// Creates a JSON body from a serializable type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use restline_core::CallBody;
    /// # use serde::Serialize;
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// #[derive(Serialize)]
    /// struct Order {
    ///     qty: u32,
    /// }
    ///
    /// let body = CallBody::json(&Order { qty: 3 })?;
    /// assert_eq!(body.data(), br#"{"qty":3}"#);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be serialized.
    pub fn json<T>(t: &T) -> Result<Self, ApiClientError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_vec(t)?;
        Ok(Self {
            content_type: ContentType::json(),
            data: Bytes::from(data),
        })
    }

    /// Creates a form-encoded body from a serializable type.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be encoded as `application/x-www-form-urlencoded`.
    pub fn form<T>(t: &T) -> Result<Self, ApiClientError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_urlencoded::to_string(t)?;
        Ok(Self {
            content_type: ContentType::form_url_encoded(),
            data: Bytes::from(data),
        })
    }

    /// Creates a raw body with custom content type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use restline_core::CallBody;
    /// use headers::ContentType;
    ///
    /// let body = CallBody::raw(vec![0xFF, 0xFE, 0xFD], ContentType::octet_stream());
    /// assert_eq!(body.content_type(), ContentType::octet_stream());
    /// ```
    pub fn raw(data: impl Into<Bytes>, content_type: ContentType) -> Self {
        Self {
            content_type,
            data: data.into(),
        }
    }

    /// Creates a `text/plain` body.
    pub fn text(text: impl Into<String>) -> Self {
        Self::raw(text.into(), ContentType::text_utf8())
    }

    /// Reads a body verbatim from a reader.
    ///
    /// The content type is parsed as a media type, e.g. `application/x-www-form-urlencoded`.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader fails or the content type is not a valid media type.
    pub fn from_reader<R>(mut reader: R, content_type: &str) -> Result<Self, ApiClientError>
    where
        R: Read,
    {
        let content_type = parse_content_type(content_type)?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self::raw(data, content_type))
    }

    /// Returns the body content type.
    pub fn content_type(&self) -> ContentType {
        self.content_type.clone()
    }

    /// Returns the body bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

pub(in crate::client) fn parse_content_type(value: &str) -> Result<ContentType, ApiClientError> {
    value
        .parse::<mime::Mime>()
        .map(ContentType::from)
        .map_err(|_| ApiClientError::InvalidContentType {
            content_type: value.to_string(),
        })
}
