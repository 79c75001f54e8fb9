//! Tests for the guide client against a local fixture server
//!
//! The fixture serves a handful of routes with fixed behavior so status
//! handling, validators and streaming to disk can be checked without network
//! access.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::NaiveDate;
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;
use url::Url;

use super::*;
use crate::app::cache::CacheValidators;
use crate::app::models::Channel;
use crate::app::scheduler::task::execute_request;

pub(crate) const ETAG_V1: &str = "\"v1\"";
pub(crate) const LAST_MODIFIED: &str = "Tue, 01 Jun 2021 00:00:00 GMT";
pub(crate) const GUIDE_XML: &[u8] = b"<tv><programme channel=\"abc\"/></tv>";

pub(crate) fn gzip(content: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).unwrap();
    encoder.finish().unwrap()
}

async fn ok_route() -> Response {
    (
        [(header::ETAG, ETAG_V1), (header::LAST_MODIFIED, LAST_MODIFIED)],
        gzip(GUIDE_XML),
    )
        .into_response()
}

pub(crate) const LAST_MODIFIED_V2: &str = "Wed, 02 Jun 2021 00:00:00 GMT";

/// A replaced body that carries no ETag
async fn last_modified_route() -> Response {
    ([(header::LAST_MODIFIED, LAST_MODIFIED_V2)], gzip(GUIDE_XML)).into_response()
}

async fn conditional_route(headers: HeaderMap) -> Response {
    let matches = headers
        .get(header::IF_NONE_MATCH)
        .is_some_and(|value| value == ETAG_V1);
    if matches {
        (StatusCode::NOT_MODIFIED, [(header::ETAG, ETAG_V1)]).into_response()
    } else {
        ok_route().await
    }
}

async fn echo_route(headers: HeaderMap) -> Response {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let accept = headers
        .get(header::ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    format!("{}|{}", user_agent, accept).into_response()
}

async fn broken_route() -> Response {
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

/// Start the fixture server and return its base URL
pub(crate) async fn start_fixture_server() -> Url {
    let app = Router::new()
        .route("/ok/:file", get(ok_route))
        .route("/conditional/:file", get(conditional_route))
        .route("/echo/:file", get(echo_route))
        .route("/last-modified/:file", get(last_modified_route))
        .route("/broken/:file", get(broken_route));

    let listener =
        std::net::TcpListener::bind("127.0.0.1:0").expect("failed to bind fixture server");
    listener
        .set_nonblocking(true)
        .expect("failed to set nonblocking on fixture listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let listener = tokio::net::TcpListener::from_std(listener)
            .expect("failed to convert fixture listener");
        axum::serve(listener, app).await.unwrap();
    });

    Url::parse(&format!("http://{}/", addr)).unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()
}

fn request_for(base: &Url, route: &str, dir: &Path) -> RequestInfo {
    let channel = Arc::new(Channel::new("abc", [base.join(route).unwrap().to_string()]));
    let url = build_request_url(&channel, day(), &mut rand::thread_rng()).unwrap();
    RequestInfo::new(
        channel,
        day(),
        day(),
        url,
        dir.join("abc_2021-06-01.xml.gz"),
        dir.join("abc_2021-06-01.cache"),
    )
}

#[tokio::test]
async fn test_ok_response_streams_to_data_file() {
    let base = start_fixture_server().await;
    let temp_dir = TempDir::new().unwrap();
    let client = GuideClient::new().unwrap();
    let mut request = request_for(&base, "ok/", temp_dir.path());

    let status = client.fetch(&mut request).await.unwrap();

    let stored = std::fs::read(&request.data_file).unwrap();
    assert_eq!(stored, gzip(GUIDE_XML));
    assert_eq!(
        status,
        FetchStatus::Downloaded {
            bytes: stored.len() as u64
        }
    );
    assert_eq!(request.validators.etag.as_deref(), Some(ETAG_V1));
    assert_eq!(request.validators.last_modified.as_deref(), Some(LAST_MODIFIED));
    assert!(!DownloadHandler::temp_path(&request.data_file).exists());
}

#[tokio::test]
async fn test_not_modified_leaves_data_file_alone() {
    let base = start_fixture_server().await;
    let temp_dir = TempDir::new().unwrap();
    let client = GuideClient::new().unwrap();
    let mut request = request_for(&base, "conditional/", temp_dir.path());

    std::fs::write(&request.data_file, b"previous data").unwrap();
    request.validators = CacheValidators {
        etag: Some(ETAG_V1.to_string()),
        ..Default::default()
    };

    let status = client.fetch(&mut request).await.unwrap();
    assert_eq!(status, FetchStatus::NotModified);
    assert_eq!(std::fs::read(&request.data_file).unwrap(), b"previous data");
    assert_eq!(request.validators.etag.as_deref(), Some(ETAG_V1));
}

#[tokio::test]
async fn test_request_headers_are_sent() {
    let base = start_fixture_server().await;
    let temp_dir = TempDir::new().unwrap();
    let client = GuideClient::with_config(&ClientConfig::default().with_user_agent("guide-test/2.0"))
        .unwrap();
    let mut request = request_for(&base, "echo/", temp_dir.path());

    client.fetch(&mut request).await.unwrap();
    let echoed = std::fs::read_to_string(&request.data_file).unwrap();
    assert_eq!(echoed, "guide-test/2.0|gzip");
}

#[tokio::test]
async fn test_not_found() {
    let base = start_fixture_server().await;
    let temp_dir = TempDir::new().unwrap();
    let client = GuideClient::new().unwrap();
    let mut request = request_for(&base, "missing/", temp_dir.path());

    let result = client.fetch(&mut request).await;
    assert!(matches!(result, Err(DownloadError::NotFound { .. })));
    assert!(!request.data_file.exists());
}

#[tokio::test]
async fn test_server_error() {
    let base = start_fixture_server().await;
    let temp_dir = TempDir::new().unwrap();
    let client = GuideClient::new().unwrap();
    let mut request = request_for(&base, "broken/", temp_dir.path());

    let result = client.fetch(&mut request).await;
    assert!(matches!(
        result,
        Err(DownloadError::ServerError { status: 500 })
    ));
}

#[tokio::test]
async fn test_connection_refused() {
    let temp_dir = TempDir::new().unwrap();
    let client = GuideClient::new().unwrap();

    // Bind and drop to get a port nothing listens on
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let base = Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();
    let mut request = request_for(&base, "ok/", temp_dir.path());

    let result = client.fetch(&mut request).await;
    assert!(matches!(result, Err(DownloadError::Http(_))));
}

#[tokio::test]
async fn test_new_body_replaces_stored_validators() {
    let base = start_fixture_server().await;
    let temp_dir = TempDir::new().unwrap();
    let client = Arc::new(GuideClient::new().unwrap());
    let request = request_for(&base, "last-modified/", temp_dir.path());

    std::fs::write(&request.data_file, b"previous data").unwrap();
    CacheValidators {
        etag: Some(ETAG_V1.to_string()),
        last_modified: Some(LAST_MODIFIED.to_string()),
        fetched_at: None,
    }
    .store(&request.metadata_file)
    .await
    .unwrap();

    let request = execute_request(client, request, false).await;
    assert!(request.success);
    assert_eq!(request.validators.etag, None);

    let stored = CacheValidators::load(&request.metadata_file)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.etag, None);
    assert_eq!(stored.last_modified.as_deref(), Some(LAST_MODIFIED_V2));
    assert!(!std::fs::read_to_string(&request.metadata_file)
        .unwrap()
        .contains("v1"));
}
