//! Error types shared by the authorization flow, the resource clients and the facade.

use std::fmt;
use std::time::Duration;

/// Coarse classification of an [`Error`], used for structured logging and by callers that
/// need to tell provider failures apart from transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Authorization,
    StateMismatch,
    ProviderApi,
    Transport,
    Fetch,
    Upload,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::Authorization => write!(f, "authorization"),
            Self::StateMismatch => write!(f, "state_mismatch"),
            Self::ProviderApi => write!(f, "provider_api"),
            Self::Transport => write!(f, "transport"),
            Self::Fetch => write!(f, "fetch"),
            Self::Upload => write!(f, "upload"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Client credentials or endpoints are missing or malformed. No call was attempted.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The provider (or the callback) reported an OAuth error instead of a code.
    #[error(
        "authorization denied: {error}{}",
        .description.as_deref().map(|d| format!(" ({d})")).unwrap_or_default()
    )]
    Authorization {
        error: String,
        description: Option<String>,
    },

    /// The `state` echoed on the callback is not the one that was issued.
    #[error("authorization state mismatch: callback state does not match the issued state")]
    StateMismatch,

    /// The remote endpoint answered with a non-success status.
    ///
    /// The raw response body is kept verbatim for diagnostics.
    #[error("LinkedIn API {operation} failed with status {status}: {body}")]
    ProviderApi {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("{operation}: HTTP transport error: {source}")]
    Http {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation}: timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("{operation}: could not decode response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Downloading the source media failed.
    #[error("fetch media from {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The signed upload URL rejected the binary transfer.
    #[error("media upload rejected with status {status}: {body}")]
    Upload { status: u16, body: String },

    /// A caller-supplied value cannot be sent; no request was made.
    #[error("{operation}: invalid argument: {reason}")]
    InvalidArgument {
        operation: &'static str,
        reason: String,
    },

    #[error("token store: {0}")]
    Store(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Authorization { .. } => ErrorKind::Authorization,
            Self::StateMismatch => ErrorKind::StateMismatch,
            Self::ProviderApi { .. } => ErrorKind::ProviderApi,
            Self::Http { .. }
            | Self::Timeout { .. }
            | Self::Decode { .. }
            | Self::InvalidArgument { .. }
            | Self::Store(_) => ErrorKind::Transport,
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::Upload { .. } => ErrorKind::Upload,
        }
    }

    /// Raw response body of a provider failure, if this error carries one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::ProviderApi { body, .. } | Self::Upload { body, .. } => Some(body),
            _ => None,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
