//! Error types for the homework watcher.

/// How a failed cycle is surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Expected condition; logged at debug level and never notified.
    Debug,
    /// Logged at error level and notified once per failure streak.
    Reportable,
    /// Stops the poll loop.
    Fatal,
}

/// Top-level error type for the watcher pipeline.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Required environment values are absent or blank.
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingConfig(Vec<String>),

    /// Configuration file could not be read or parsed.
    #[error("config error: {0}")]
    Config(String),

    /// The status API could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The status API answered with a non-200 status.
    #[error("request to {endpoint} returned HTTP {status}")]
    BadStatus { endpoint: String, status: u16 },

    /// Payload has the wrong shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Payload lacks a required field.
    #[error("response is missing field `{0}`")]
    MissingField(String),

    /// Status code not present in the verdict table.
    #[error("unknown homework status `{0}`")]
    UnknownStatus(String),

    /// Message could not be delivered to the chat.
    #[error("message delivery failed: {0}")]
    Delivery(String),

    /// State store failure.
    #[error("state store error: {0}")]
    Store(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The API returned no homework records.
    #[error("homework list is empty")]
    EmptyList,

    /// The latest homework status was already reported.
    #[error("no new statuses")]
    NoNewStatus,
}

impl WatchError {
    /// Classify this error for the poll loop.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::MissingConfig(_) | Self::Config(_) => Severity::Fatal,
            Self::EmptyList | Self::NoNewStatus => Severity::Debug,
            Self::Transport(_)
            | Self::BadStatus { .. }
            | Self::MalformedResponse(_)
            | Self::MissingField(_)
            | Self::UnknownStatus(_)
            | Self::Delivery(_)
            | Self::Store(_)
            | Self::Io(_) => Severity::Reportable,
        }
    }
}

impl From<rusqlite::Error> for WatchError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Store(e.to_string())
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, WatchError>;
