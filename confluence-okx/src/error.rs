use confluence_core::ConfluenceError;
use thiserror::Error;

use crate::OkxConnector;

/// OKX response codes that mean the requested instrument does not exist.
const NOT_FOUND_CODES: &[&str] = &["51001", "51000"];

/// Failures raised while talking to the OKX REST API.
///
/// Converted into [`ConfluenceError`] at the session boundary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OkxError {
    /// Transport failure, timeout, or client construction error.
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    /// Endpoint URL could not be composed.
    #[error("url: {0}")]
    Url(#[from] url::ParseError),
    /// The envelope carried a non-zero `code`.
    #[error("api error {code}: {msg}")]
    Api {
        /// OKX error code.
        code: String,
        /// OKX error message.
        msg: String,
    },
    /// Non-success HTTP status without a decodable envelope.
    #[error("http status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// The response body did not match the expected shape.
    #[error("decode: {0}")]
    Decode(String),
    /// A single-item endpoint returned no data.
    #[error("empty response for {0}")]
    Empty(String),
    /// The session was already closed.
    #[error("session closed")]
    Closed,
}

impl From<OkxError> for ConfluenceError {
    fn from(e: OkxError) -> Self {
        match e {
            OkxError::Empty(what) => Self::not_found(what),
            OkxError::Api { code, msg } if NOT_FOUND_CODES.contains(&code.as_str()) => {
                Self::not_found(msg)
            }
            OkxError::Decode(msg) => Self::Data(msg),
            other => Self::connector(OkxConnector::NAME, other.to_string()),
        }
    }
}
