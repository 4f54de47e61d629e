//! Endpoint fallback and failure policy of the image upload service,
//! exercised against a real HTTP server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pubdesk::config::Config;
use pubdesk::contract::{LoginRedirect, MockLoginRedirect, MockSessionStore, SessionStore};
use pubdesk::http::ApiClient;
use pubdesk::upload::{ImageUploadService, SelectedFile};
use pubdesk::ClientError;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str) -> Config {
    Config {
        base_url: base_url.trim_end_matches('/').to_string(),
        session_file: PathBuf::from("unused-session.json"),
        request_timeout: Duration::from_secs(5),
        upload_timeout: Duration::from_secs(5),
    }
}

fn signed_out_client(server: &MockServer) -> ApiClient {
    let mut store = MockSessionStore::new();
    store.expect_load().returning(|| None);
    let store: Arc<dyn SessionStore> = Arc::new(store);
    let redirect: Arc<dyn LoginRedirect> = Arc::new(MockLoginRedirect::new());
    ApiClient::new(&test_config(&server.uri()), store, redirect).unwrap()
}

fn two_megabyte_jpeg() -> SelectedFile {
    SelectedFile::new("photo.jpg", "image/jpeg", vec![0u8; 2 * 1024 * 1024])
}

#[tokio::test]
async fn primary_success_skips_the_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "imageUrl": "https://host/x.jpg", "publicId": "abc" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = ImageUploadService::new(signed_out_client(&server));
    let file = two_megabyte_jpeg();
    let result = service.upload(&file).await.unwrap();

    assert_eq!(result.image_url, "https://host/x.jpg");
    assert_eq!(result.public_id.as_deref(), Some("abc"));
    assert_eq!(result.original_file_name, "photo.jpg");
    assert_eq!(result.file_size, 2 * 1024 * 1024);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "no fallback request expected");
}

#[tokio::test]
async fn primary_failure_falls_back_to_legacy_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/upload"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload/image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "filename": "y.png" })))
        .expect(1)
        .mount(&server)
        .await;

    let service = ImageUploadService::new(signed_out_client(&server));
    let file = two_megabyte_jpeg();
    let result = service.upload(&file).await.unwrap();

    assert_eq!(result.image_url, format!("{}/uploads/y.png", server.uri()));
}

#[tokio::test]
async fn both_endpoints_failing_surfaces_the_most_specific_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/upload"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "disk full" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload/image"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let service = ImageUploadService::new(signed_out_client(&server));
    let file = two_megabyte_jpeg();
    let err = service.upload(&file).await.expect_err("both endpoints down");

    match err {
        ClientError::Http { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "bad gateway");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn backend_message_beats_missing_fields() {
    // Primary answers 2xx with a junk body (shape failure); the fallback's
    // explicit backend message should win.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/upload/image"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "unsupported file" })),
        )
        .mount(&server)
        .await;

    let service = ImageUploadService::new(signed_out_client(&server));
    let file = two_megabyte_jpeg();
    let err = service.upload(&file).await.expect_err("must fail");

    match err {
        ClientError::Http { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "unsupported file");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn validation_failure_makes_no_network_call() {
    let server = MockServer::start().await;

    let service = ImageUploadService::new(signed_out_client(&server));
    let file = SelectedFile::new("doc.pdf", "application/pdf", vec![0u8; 128]);
    let err = service.upload(&file).await.expect_err("must fail validation");

    assert!(matches!(err, ClientError::Validation(_)));
    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty(), "validation must run before any request");
}

#[tokio::test]
async fn unauthorized_clears_session_once_and_skips_the_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/upload"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut store = MockSessionStore::new();
    store.expect_load().returning(|| None);
    store.expect_clear().times(1).return_const(());
    let mut redirect = MockLoginRedirect::new();
    redirect.expect_redirect_to_login().times(1).return_const(());

    let store: Arc<dyn SessionStore> = Arc::new(store);
    let redirect: Arc<dyn LoginRedirect> = Arc::new(redirect);
    let client = ApiClient::new(&test_config(&server.uri()), store, redirect).unwrap();

    let service = ImageUploadService::new(client);
    let file = two_megabyte_jpeg();
    let err = service.upload(&file).await.expect_err("401 must fail");

    assert!(matches!(err, ClientError::Unauthorized));
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1, "an expired session must not hit the fallback");
}

#[tokio::test]
async fn delete_image_surfaces_backend_message_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/images/abc"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "image not found" })),
        )
        .mount(&server)
        .await;

    let service = ImageUploadService::new(signed_out_client(&server));
    let err = service.delete_image("abc").await.expect_err("must fail");

    match err {
        ClientError::Http { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "image not found");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}
