use std::time::Duration;

use artgen_engine::{
    ApiSettings, EngineEvent, EngineHandle, PollSettings, UploadedImage, WorkflowError,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WAIT: Duration = Duration::from_secs(10);

fn settings_for(server: &MockServer, interval: Duration) -> ApiSettings {
    ApiSettings {
        api_base: server.uri(),
        content_base: "https://contents.example.com".to_string(),
        user_id: "user-1".to_string(),
        poll: PollSettings {
            interval,
            max_polls: 10,
        },
        ..ApiSettings::default()
    }
}

fn next_event(engine: &EngineHandle) -> EngineEvent {
    engine.recv_timeout(WAIT).expect("engine event")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn upload_generate_download_round() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-emd-upload-url"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(format!("{}/bucket/t", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/bucket/t"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/image-gen"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jobId": "job-9"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/image-gen/user-1/job-9/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "pending"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    let result_url = format!("{}/results/out.jpg", server.uri());
    Mock::given(method("GET"))
        .and(path("/image-gen/user-1/job-9/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "result": {"mediaUrl": result_url.clone()}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/download-proxy"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(&b"jpeg-bytes"[..]))
        .mount(&server)
        .await;

    let input = TempDir::new().unwrap();
    let image = input.path().join("me.png");
    std::fs::write(&image, b"\x89PNG\r\n\x1a\nrest").unwrap();
    let output = TempDir::new().unwrap();

    let engine = EngineHandle::new(
        settings_for(&server, Duration::from_millis(5)),
        output.path().to_path_buf(),
    )
    .unwrap();

    engine.upload(1, &image);
    assert_eq!(
        next_event(&engine),
        EngineEvent::UploadStarted {
            generation: 1,
            byte_len: 12,
            content_type: "image/png".to_string(),
        }
    );
    let uploaded = match next_event(&engine) {
        EngineEvent::UploadCompleted {
            generation: 1,
            result: Ok(uploaded),
        } => uploaded,
        other => panic!("unexpected event: {other:?}"),
    };
    let UploadedImage {
        destination_name,
        public_url,
    } = uploaded;
    assert!(destination_name.ends_with(".png"));
    assert_eq!(
        public_url,
        format!("https://contents.example.com/{destination_name}")
    );

    engine.generate(1, public_url);
    assert_eq!(
        next_event(&engine),
        EngineEvent::JobSubmitted {
            generation: 1,
            job_id: "job-9".to_string(),
        }
    );
    assert_eq!(
        next_event(&engine),
        EngineEvent::PollAttempt {
            generation: 1,
            attempt: 1,
        }
    );
    assert_eq!(
        next_event(&engine),
        EngineEvent::PollAttempt {
            generation: 1,
            attempt: 2,
        }
    );
    assert_eq!(
        next_event(&engine),
        EngineEvent::GenerationCompleted {
            generation: 1,
            result: Ok(result_url.clone()),
        }
    );

    engine.download(result_url);
    match next_event(&engine) {
        EngineEvent::DownloadCompleted { result: Ok(saved) } => {
            assert_eq!(saved.parent(), Some(output.path()));
            assert_eq!(std::fs::read(saved).unwrap(), b"jpeg-bytes");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancel_abandons_running_poll() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/image-gen"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"jobId": "job-9"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/image-gen/user-1/job-9/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "pending"})))
        .expect(1)
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let engine = EngineHandle::new(
        settings_for(&server, Duration::from_secs(60)),
        output.path().to_path_buf(),
    )
    .unwrap();

    engine.generate(3, "https://contents.example.com/a.jpg");
    assert!(matches!(
        next_event(&engine),
        EngineEvent::JobSubmitted { generation: 3, .. }
    ));
    assert!(matches!(
        next_event(&engine),
        EngineEvent::PollAttempt {
            generation: 3,
            attempt: 1
        }
    ));

    engine.cancel();
    assert_eq!(
        next_event(&engine),
        EngineEvent::GenerationCompleted {
            generation: 3,
            result: Err(WorkflowError::Cancelled),
        }
    );
    server.verify().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreadable_file_fails_upload_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let output = TempDir::new().unwrap();
    let engine = EngineHandle::new(
        settings_for(&server, Duration::from_millis(5)),
        output.path().to_path_buf(),
    )
    .unwrap();

    engine.upload(7, output.path().join("missing.png"));
    match next_event(&engine) {
        EngineEvent::UploadCompleted {
            generation: 7,
            result: Err(WorkflowError::ReadFile { .. }),
        } => {}
        other => panic!("unexpected event: {other:?}"),
    }
    server.verify().await;
}
