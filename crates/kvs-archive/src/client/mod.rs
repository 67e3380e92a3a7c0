mod model;

pub use model::ApiName;

use reqwest::{Response, Url};
use serde::Serialize;

use crate::{
    error::{ArchiveError, ArchiveResult},
    Bytes, FragmentPage, FragmentSource, HttpClient, ListFragmentsRequest, MediaSource,
};
use model::{DataEndpointRequest, DataEndpointResponse, MediaRequest, ServiceErrorBody};

/// Client of the archived media API.
///
/// Listing and media retrieval are served from per-stream data endpoints,
/// which may differ from each other.
#[derive(Clone)]
pub struct ArchivedMediaClient {
    client: HttpClient,
    list_fragments_url: Url,
    media_url: Url,
}

impl ArchivedMediaClient {
    pub fn new(
        client: HttpClient,
        list_fragments_endpoint: &str,
        media_endpoint: &str,
    ) -> ArchiveResult<Self> {
        Ok(Self {
            client,
            list_fragments_url: endpoint_url(list_fragments_endpoint)?.join("listFragments")?,
            media_url: endpoint_url(media_endpoint)?.join("getMediaForFragmentList")?,
        })
    }

    /// Resolves both data endpoints of `stream_name` through the control plane.
    pub async fn discover(
        client: HttpClient,
        control_endpoint: &str,
        stream_name: &str,
    ) -> ArchiveResult<Self> {
        let list_fragments_endpoint =
            get_data_endpoint(&client, control_endpoint, stream_name, ApiName::ListFragments)
                .await?;
        let media_endpoint = get_data_endpoint(
            &client,
            control_endpoint,
            stream_name,
            ApiName::GetMediaForFragmentList,
        )
        .await?;

        Self::new(client, &list_fragments_endpoint, &media_endpoint)
    }

    pub fn list_fragments_url(&self) -> &Url {
        &self.list_fragments_url
    }

    pub fn media_url(&self) -> &Url {
        &self.media_url
    }
}

impl FragmentSource for ArchivedMediaClient {
    async fn list_fragments(&self, request: ListFragmentsRequest) -> ArchiveResult<FragmentPage> {
        log::debug!("ListFragments request: {request:?}");
        let response = post_json(&self.client, self.list_fragments_url.clone(), &request).await?;
        let page = response.json().await?;
        Ok(page)
    }
}

impl MediaSource for ArchivedMediaClient {
    async fn get_media_for_fragment_list(
        &self,
        stream_name: &str,
        fragments: &[String],
    ) -> ArchiveResult<Bytes> {
        let request = MediaRequest {
            stream_name,
            fragments,
        };
        let response = post_json(&self.client, self.media_url.clone(), &request).await?;
        if let Some(content_type) = response.headers().get(reqwest::header::CONTENT_TYPE) {
            log::debug!("GetMediaForFragmentList content type: {content_type:?}");
        }

        let payload = response.bytes().await?;
        Ok(payload)
    }
}

/// Asks the control plane which endpoint serves `api` for `stream_name`.
pub async fn get_data_endpoint(
    client: &HttpClient,
    control_endpoint: &str,
    stream_name: &str,
    api: ApiName,
) -> ArchiveResult<String> {
    let url = endpoint_url(control_endpoint)?.join("getDataEndpoint")?;
    let request = DataEndpointRequest {
        stream_name,
        api_name: api,
    };

    let response = post_json(client, url, &request).await?;
    let data: DataEndpointResponse = response.json().await?;
    let endpoint = data
        .data_endpoint
        .ok_or(ArchiveError::MissingField("DataEndpoint"))?;

    log::info!("{api:?} endpoint of {stream_name}: {endpoint}");
    Ok(endpoint)
}

fn endpoint_url(endpoint: &str) -> ArchiveResult<Url> {
    let mut url = Url::parse(endpoint)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

async fn post_json<B>(client: &HttpClient, url: Url, body: &B) -> ArchiveResult<Response>
where
    B: Serialize + ?Sized,
{
    let request = client.post(url).json(body);
    let response = request.send().await?;
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let header_type = response
        .headers()
        .get("x-amzn-ErrorType")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(':').next())
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let body = response.text().await.unwrap_or_default();
    if !body.is_empty() {
        tracing::warn!("Error body: {body}");
    }
    let parsed: ServiceErrorBody = serde_json::from_str(&body).unwrap_or_default();

    Err(ArchiveError::HttpError {
        status,
        error_type: header_type.or_else(|| parsed.error_type()),
        message: parsed.message,
    })
}
