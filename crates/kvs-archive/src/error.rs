use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("HTTP error {status}: {error_type:?} {message:?}")]
    HttpError {
        status: reqwest::StatusCode,
        /// Service error type, e.g. `ResourceNotFoundException`.
        error_type: Option<String>,
        message: Option<String>,
    },

    #[error("Missing field in response: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    RequestError(#[from] reqwest::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    UrlParseError(#[from] url::ParseError),
}

const TRANSIENT_ERROR_TYPES: &[&str] = &[
    "ClientLimitExceededException",
    "ThrottlingException",
    "ServiceUnavailableException",
];

impl ArchiveError {
    /// Service-assigned error type, if the failure came from the service.
    pub fn error_type(&self) -> Option<&str> {
        match self {
            Self::HttpError { error_type, .. } => error_type.as_deref(),
            _ => None,
        }
    }

    /// Whether repeating the same request later may succeed.
    ///
    /// Throttling, server-side failures and transport timeouts are transient.
    /// Everything else, bad criteria or missing streams included, is not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpError {
                status, error_type, ..
            } => {
                status.as_u16() == 429
                    || status.is_server_error()
                    || error_type
                        .as_deref()
                        .is_some_and(|t| TRANSIENT_ERROR_TYPES.contains(&t))
            }
            Self::RequestError(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
