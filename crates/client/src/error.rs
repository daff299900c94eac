/// Errors from the API client layer.
///
/// Every variant renders as a message fit for display next to the
/// request that caused it. The client never retries.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-2xx status. `message` is taken from the
    /// response body when it carries one.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        message: String,
    },

    /// A 204 (or otherwise empty) response where a body was required.
    #[error("Empty response from {endpoint}")]
    EmptyBody { endpoint: String },

    /// The response body could not be decoded into the expected shape.
    #[error("Malformed response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
}

impl RequestError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// HTTP status of an [`Api`](Self::Api) error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
