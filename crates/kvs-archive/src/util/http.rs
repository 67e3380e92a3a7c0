use std::{ops::Deref, str::FromStr, time::Duration};

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client, ClientBuilder,
};

use crate::error::{ArchiveError, ArchiveResult};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared HTTP client. Extra headers (credentials from an external signer or
/// a gateway token) are sent with every request.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(builder: ClientBuilder) -> ArchiveResult<Self> {
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn with_headers(headers: HeaderMap) -> ArchiveResult<Self> {
        Self::with_timeout(headers, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(headers: HeaderMap, timeout: Duration) -> ArchiveResult<Self> {
        Self::new(
            Client::builder()
                .default_headers(headers)
                .timeout(timeout),
        )
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::with_timeout(HeaderMap::new(), DEFAULT_TIMEOUT).unwrap_or_else(|e| {
            log::warn!("Failed to build HTTP client: {e}");
            Self {
                client: Client::new(),
            }
        })
    }
}

impl Deref for HttpClient {
    type Target = Client;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

/// Parses `Name: value` header lines.
pub fn parse_headers<I, S>(lines: I) -> ArchiveResult<HeaderMap>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut headers = HeaderMap::new();
    for line in lines {
        let line = line.as_ref();
        let (key, value) = line.split_once(':').ok_or_else(|| {
            ArchiveError::InvalidArgument(format!("invalid header line: {line}"))
        })?;
        let name = HeaderName::from_str(key.trim())
            .map_err(|e| ArchiveError::InvalidArgument(format!("invalid header name: {e}")))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|e| ArchiveError::InvalidArgument(format!("invalid header value: {e}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}
