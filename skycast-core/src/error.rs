//! Error types for the acquisition pipeline.
//!
//! [`LocationError`] and [`FetchError`] are produced at the capability
//! seams; [`ErrorKind`] is the flattened, clone-able kind a session
//! publishes so the display layer can pick recovery wording without
//! holding on to the underlying transport errors.

use reqwest::StatusCode;
use thiserror::Error;

/// Outcome of a failed location request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location service unavailable")]
    Unavailable,

    #[error("location request timed out")]
    Timeout,
}

/// Outcome of a failed forecast fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("forecast request failed with status {0}")]
    Http(StatusCode),

    #[error("failed to decode forecast body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The body decoded cleanly but violates the forecast-window contract
    /// (fewer days than requested).
    #[error("forecast contract violation: {0}")]
    Contract(String),
}

/// Session-published error kind, one variant per way the pipeline can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location service unavailable")]
    LocationUnavailable,

    #[error("location request timed out")]
    LocationTimeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("forecast request failed with status {0}")]
    Http(u16),

    #[error("malformed forecast response: {0}")]
    Decode(String),
}

impl ErrorKind {
    /// Recovery wording for the display layer. Transport problems suggest
    /// checking the connection; a malformed response only warrants a retry.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "Allow location access and try again.",
            Self::LocationUnavailable | Self::LocationTimeout => {
                "Could not determine your location. Try again."
            }
            Self::Network(_) | Self::Http(_) => "Check your connection and try again.",
            Self::Decode(_) => "The weather service sent an unexpected response. Try again.",
        }
    }

    /// True for failures of the transport rather than of the payload.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Http(_))
    }
}

impl From<LocationError> for ErrorKind {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::PermissionDenied => ErrorKind::PermissionDenied,
            LocationError::Unavailable => ErrorKind::LocationUnavailable,
            LocationError::Timeout => ErrorKind::LocationTimeout,
        }
    }
}

impl From<FetchError> for ErrorKind {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Network(e) => ErrorKind::Network(e.to_string()),
            FetchError::Http(status) => ErrorKind::Http(status.as_u16()),
            FetchError::Decode(e) => ErrorKind::Decode(e.to_string()),
            FetchError::Contract(msg) => ErrorKind::Decode(msg),
        }
    }
}

/// Returned by session queries that only make sense in the loaded state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("forecast not loaded yet")]
    NotReady,

    #[error("day index {0} is out of range (0-2)")]
    DayOutOfRange(usize),
}
