use std::{num::NonZeroU32, time::Duration};

use kvs_archive::{
    list_all_fragments, mkv::CountVisitor, ArchiveError, ArchivedMediaClient, ArchivedMediaWorker,
    FragmentSource, HttpClient, ListFragmentsRequest, MediaSource, PageCursor, RetryPolicy,
    RetryingSource,
};
use reqwest::header::HeaderMap;
use serde_json::json;
use wiremock::{
    matchers::{body_json, body_partial_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::{
    fixture::{fragment_payload, selector},
    AssertWrapper,
};

fn client(server: &MockServer) -> ArchivedMediaClient {
    ArchivedMediaClient::new(HttpClient::default(), &server.uri(), &server.uri()).unwrap()
}

fn selector_body() -> serde_json::Value {
    json!({
        "FragmentSelectorType": "SERVER_TIMESTAMP",
        "TimestampRange": {
            "StartTimestamp": 1704067200.0,
            "EndTimestamp": 1704067500.0
        }
    })
}

fn fragments(numbers: &[&str]) -> serde_json::Value {
    numbers
        .iter()
        .map(|n| {
            json!({
                "FragmentNumber": n,
                "FragmentSizeInBytes": 1024,
                "ProducerTimestamp": 1704067201.5,
                "ServerTimestamp": 1704067202.25,
                "FragmentLengthInMilliseconds": 2000
            })
        })
        .collect()
}

#[tokio::test]
async fn test_list_fragments_request() -> anyhow::Result<()> {
    crate::init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/listFragments"))
        .and(body_json(json!({
            "StreamName": "camera",
            "MaxResults": 100,
            "FragmentSelector": selector_body()
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Fragments": fragments(&["91343852333181432392682062607743920146264558553"]),
            "NextToken": "T1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server)
        .list_fragments(ListFragmentsRequest {
            stream_name: "camera".to_string(),
            max_results: 100,
            cursor: PageCursor::Selector(selector()),
        })
        .await?;

    assert_eq!(page.continuation(), Some("T1"));
    assert_eq!(page.fragments.len(), 1);

    let fragment = &page.fragments[0];
    assert_eq!(
        fragment.fragment_number,
        "91343852333181432392682062607743920146264558553"
    );
    assert_eq!(fragment.fragment_size_in_bytes, Some(1024));
    assert_eq!(fragment.fragment_length_in_milliseconds, Some(2000));
    assert_eq!(
        fragment.server_timestamp.map(|t| t.timestamp_millis()),
        Some(1704067202250)
    );

    Ok(())
}

#[tokio::test]
async fn test_list_all_fragments_follows_next_token() -> anyhow::Result<()> {
    crate::init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/listFragments"))
        .and(body_partial_json(json!({
            "MaxResults": 2,
            "FragmentSelector": selector_body()
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Fragments": fragments(&["103", "101"]),
            "NextToken": "T1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/listFragments"))
        .and(body_json(json!({
            "StreamName": "camera",
            "MaxResults": 2,
            "NextToken": "T1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Fragments": fragments(&["102"])
        })))
        .expect(1)
        .mount(&server)
        .await;

    let numbers = list_all_fragments(
        &client(&server),
        "camera",
        &selector(),
        NonZeroU32::new(2).unwrap(),
    )
    .await?;
    assert_eq!(numbers, vec!["101", "102", "103"]);

    Ok(())
}

#[tokio::test]
async fn test_error_type_from_header() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/listFragments"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header(
                    "x-amzn-ErrorType",
                    "ResourceNotFoundException:http://internal.amazon.com/",
                )
                .set_body_json(json!({ "message": "Stream camera not found" })),
        )
        .mount(&server)
        .await;

    let error = list_all_fragments(
        &client(&server),
        "camera",
        &selector(),
        NonZeroU32::new(100).unwrap(),
    )
    .await
    .unwrap_err();

    match &error {
        ArchiveError::HttpError {
            status,
            error_type,
            message,
        } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(error_type.as_deref(), Some("ResourceNotFoundException"));
            assert_eq!(message.as_deref(), Some("Stream camera not found"));
        }
        e => panic!("unexpected error: {e:?}"),
    }
    assert!(!error.is_transient());
}

#[tokio::test]
async fn test_error_type_from_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/listFragments"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__type": "com.amazonaws.kinesisvideo#ClientLimitExceededException",
            "Message": "Too many requests"
        })))
        .mount(&server)
        .await;

    let error = list_all_fragments(
        &client(&server),
        "camera",
        &selector(),
        NonZeroU32::new(100).unwrap(),
    )
    .await
    .unwrap_err();

    assert_eq!(error.error_type(), Some("ClientLimitExceededException"));
    assert!(error.is_transient());
}

#[tokio::test]
async fn test_retrying_source_recovers_from_throttling() -> anyhow::Result<()> {
    crate::init_test_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/listFragments"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/listFragments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Fragments": fragments(&["7"])
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = RetryingSource::new(
        client(&server),
        RetryPolicy::new(2).with_delay(Duration::from_millis(1), Duration::from_millis(5)),
    );
    let numbers = list_all_fragments(
        &source,
        "camera",
        &selector(),
        NonZeroU32::new(100).unwrap(),
    )
    .await?;
    assert_eq!(numbers, vec!["7"]);

    Ok(())
}

#[tokio::test]
async fn test_get_media_for_fragment_list() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let payload = fragment_payload("101", 2);

    Mock::given(method("POST"))
        .and(path("/getMediaForFragmentList"))
        .and(body_json(json!({
            "StreamName": "camera",
            "Fragments": ["101", "102"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(payload.clone(), "video/webm"))
        .expect(1)
        .mount(&server)
        .await;

    let media = client(&server)
        .get_media_for_fragment_list("camera", &["101".to_string(), "102".to_string()])
        .await?;
    assert_eq!(media.as_ref(), payload.as_slice());

    Ok(())
}

#[tokio::test]
async fn test_discover_data_endpoints() -> anyhow::Result<()> {
    let control = MockServer::start().await;
    let data = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/getDataEndpoint"))
        .and(body_json(json!({
            "StreamName": "camera",
            "APIName": "LIST_FRAGMENTS"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "DataEndpoint": data.uri()
        })))
        .expect(1)
        .mount(&control)
        .await;
    Mock::given(method("POST"))
        .and(path("/getDataEndpoint"))
        .and(body_json(json!({
            "StreamName": "camera",
            "APIName": "GET_MEDIA_FOR_FRAGMENT_LIST"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "DataEndpoint": format!("{}/media", data.uri())
        })))
        .expect(1)
        .mount(&control)
        .await;

    let client =
        ArchivedMediaClient::discover(HttpClient::default(), &control.uri(), "camera").await?;
    assert_eq!(
        client.list_fragments_url().as_str(),
        format!("{}/listFragments", data.uri())
    );
    assert_eq!(
        client.media_url().as_str(),
        format!("{}/media/getMediaForFragmentList", data.uri())
    );

    Ok(())
}

#[tokio::test]
async fn test_discover_without_endpoint() {
    let control = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/getDataEndpoint"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&control)
        .await;

    let result =
        ArchivedMediaClient::discover(HttpClient::default(), &control.uri(), "camera").await;
    assert!(matches!(
        result,
        Err(ArchiveError::MissingField("DataEndpoint"))
    ));
}

#[tokio::test]
async fn test_worker_over_http() -> anyhow::Result<()> {
    crate::init_test_logging();
    let server = MockServer::start().await;

    let mut payload = fragment_payload("1", 3);
    payload.extend(fragment_payload("2", 4));

    Mock::given(method("POST"))
        .and(path("/listFragments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Fragments": fragments(&["2", "1"])
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/getMediaForFragmentList"))
        .and(body_partial_json(json!({ "Fragments": ["1", "2"] })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(payload.clone(), "video/webm"))
        .expect(1)
        .mount(&server)
        .await;

    let worker = ArchivedMediaWorker::new(client(&server), "camera", selector());
    let mut counts = CountVisitor::new();
    let report = worker.run(&mut counts).await.assert_success();

    assert_eq!(report.fragment_count, 2);
    assert_eq!(report.payload_bytes, payload.len());
    assert!(report.visit_completed);
    assert_eq!(counts.frames(), 7);

    Ok(())
}

#[tokio::test]
async fn test_client_timeout_is_transient() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/listFragments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "Fragments": [] }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let http = HttpClient::with_timeout(HeaderMap::new(), Duration::from_millis(50)).unwrap();
    let client = ArchivedMediaClient::new(http, &server.uri(), &server.uri()).unwrap();
    let error = list_all_fragments(&client, "camera", &selector(), NonZeroU32::new(100).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(&error, ArchiveError::RequestError(e) if e.is_timeout()));
    assert!(error.is_transient());
}
