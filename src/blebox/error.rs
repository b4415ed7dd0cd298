use std::time::Duration;

use hyper::StatusCode;

/// Failure of a single request against a blebox device.
///
/// Every variant leaves the adapter unavailable; the distinction only matters
/// for logging.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("invalid device url {url}: {err}")]
    InvalidUri {
        url: String,
        err: hyper::http::uri::InvalidUri,
    },

    #[error("failed to build request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("transport error: {0}")]
    Transport(#[from] hyper::Error),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("device answered with HTTP {0}")]
    Status(StatusCode),

    #[error("failed to encode request body: {0}")]
    Encode(serde_json::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_path_to_error::Error<serde_json::Error>),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl DeviceError {
    /// Whether the device could not be reached at all, as opposed to
    /// answering with something we did not understand.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            DeviceError::Transport(_) | DeviceError::Timeout(_) | DeviceError::InvalidUri { .. }
        )
    }

    pub fn unexpected(reason: impl Into<String>) -> Self {
        DeviceError::UnexpectedResponse(reason.into())
    }
}

/// Errors that prevent an entity from being registered at all.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("{host}: cannot determine the device type: {source}")]
    TypeProbe {
        host: String,
        #[source]
        source: DeviceError,
    },

    #[error("{host}: unknown device type \"{device_type}\"")]
    UnknownType { host: String, device_type: String },
}
