use std::fs;

use artgen_engine::{
    download_artifact, ApiSettings, AtomicFileWriter, ReqwestApi, WorkflowError,
    DOWNLOAD_ID_LENGTH,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const JPEG_BYTES: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg-body";
const PREFIX: &str = "vector_art_";

/// Direct fetches carry a numeric `t` cache buster.
struct CacheBuster;

impl Match for CacheBuster {
    fn matches(&self, request: &Request) -> bool {
        request
            .url
            .query_pairs()
            .any(|(key, value)| key == "t" && !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()))
    }
}

fn api_for(server: &MockServer) -> ReqwestApi {
    ReqwestApi::new(ApiSettings {
        api_base: format!("{}/api", server.uri()),
        ..ApiSettings::default()
    })
    .unwrap()
}

fn saved_files(dir: &TempDir) -> Vec<String> {
    fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect()
}

#[tokio::test]
async fn proxy_success_saves_without_direct_fetch() {
    let server = MockServer::start().await;
    let result_url = format!("{}/results/out.jpg", server.uri());
    Mock::given(method("GET"))
        .and(path("/api/download-proxy"))
        .and(query_param("url", result_url.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(JPEG_BYTES))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/results/out.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(JPEG_BYTES))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(dir.path().to_path_buf());
    let saved = download_artifact(&api_for(&server), &result_url, &writer, PREFIX)
        .await
        .expect("download ok");

    let name = saved.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with(PREFIX));
    assert!(name.ends_with(".jpg"));
    assert_eq!(name.len(), PREFIX.len() + DOWNLOAD_ID_LENGTH + ".jpg".len());
    assert_eq!(fs::read(&saved).unwrap(), JPEG_BYTES);
    server.verify().await;
}

#[tokio::test]
async fn proxy_failure_falls_back_to_one_direct_fetch() {
    let server = MockServer::start().await;
    let result_url = format!("{}/results/out.jpg", server.uri());
    Mock::given(method("GET"))
        .and(path("/api/download-proxy"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/results/out.jpg"))
        .and(CacheBuster)
        .respond_with(ResponseTemplate::new(200).set_body_bytes(JPEG_BYTES))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(dir.path().to_path_buf());
    let saved = download_artifact(&api_for(&server), &result_url, &writer, PREFIX)
        .await
        .expect("direct fallback ok");

    assert_eq!(fs::read(&saved).unwrap(), JPEG_BYTES);
    assert_eq!(saved_files(&dir).len(), 1);
    server.verify().await;
}

#[tokio::test]
async fn both_strategies_failing_saves_nothing() {
    let server = MockServer::start().await;
    let result_url = format!("{}/results/out.jpg", server.uri());
    Mock::given(method("GET"))
        .and(path("/api/download-proxy"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/results/out.jpg"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(dir.path().to_path_buf());
    let err = download_artifact(&api_for(&server), &result_url, &writer, PREFIX)
        .await
        .unwrap_err();

    match err {
        WorkflowError::Download { proxy, direct } => {
            assert!(proxy.contains("500"), "proxy: {proxy}");
            assert!(direct.contains("403"), "direct: {direct}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(saved_files(&dir).is_empty());
    server.verify().await;
}

#[tokio::test]
async fn oversized_proxy_body_triggers_fallback() {
    let server = MockServer::start().await;
    let result_url = format!("{}/results/out.jpg", server.uri());
    Mock::given(method("GET"))
        .and(path("/api/download-proxy"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/results/out.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(&b"small"[..]))
        .expect(1)
        .mount(&server)
        .await;

    let api = ReqwestApi::new(ApiSettings {
        api_base: format!("{}/api", server.uri()),
        max_download_bytes: 16,
        ..ApiSettings::default()
    })
    .unwrap();
    let dir = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(dir.path().to_path_buf());
    let saved = download_artifact(&api, &result_url, &writer, PREFIX)
        .await
        .unwrap();
    assert_eq!(fs::read(saved).unwrap(), b"small");
    server.verify().await;
}
