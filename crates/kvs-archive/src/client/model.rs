use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiName {
    ListFragments,
    GetMediaForFragmentList,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct MediaRequest<'a> {
    pub stream_name: &'a str,
    pub fragments: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct DataEndpointRequest<'a> {
    pub stream_name: &'a str,
    #[serde(rename = "APIName")]
    pub api_name: ApiName,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct DataEndpointResponse {
    pub data_endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ServiceErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    pub message: Option<String>,
}

impl ServiceErrorBody {
    /// `__type` may be namespaced, e.g. `com.amazonaws...#ResourceNotFoundException`.
    pub fn error_type(&self) -> Option<String> {
        self.error_type
            .as_deref()
            .and_then(|t| t.rsplit('#').next())
            .map(str::to_string)
    }
}
