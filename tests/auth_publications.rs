//! Auth flow and the thin publications client against a mock backend.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use pubdesk::auth::AuthApi;
use pubdesk::config::Config;
use pubdesk::contract::{LoginRedirect, MockLoginRedirect, MockSessionStore, SessionStore};
use pubdesk::http::ApiClient;
use pubdesk::publications::{NewComment, PublicationApi};
use pubdesk::session::FileSessionStore;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str, session_file: PathBuf) -> Config {
    Config {
        base_url: base_url.trim_end_matches('/').to_string(),
        session_file,
        request_timeout: Duration::from_secs(5),
        upload_timeout: Duration::from_secs(5),
    }
}

fn signed_out_client(server: &MockServer) -> ApiClient {
    let mut store = MockSessionStore::new();
    store.expect_load().returning(|| None);
    let store: Arc<dyn SessionStore> = Arc::new(store);
    let redirect: Arc<dyn LoginRedirect> = Arc::new(MockLoginRedirect::new());
    ApiClient::new(
        &test_config(&server.uri(), PathBuf::from("unused.json")),
        store,
        redirect,
    )
    .unwrap()
}

#[tokio::test]
async fn login_persists_the_session_and_later_requests_use_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_partial_json(json!({ "email": "admin@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok123",
            "user": { "id": "u1", "name": "Admin", "email": "admin@example.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/publications"))
        .and(header("Authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    let store: Arc<dyn SessionStore> = Arc::new(FileSessionStore::new(session_file.clone()));
    let redirect: Arc<dyn LoginRedirect> = Arc::new(MockLoginRedirect::new());
    let client = ApiClient::new(
        &test_config(&server.uri(), session_file.clone()),
        Arc::clone(&store),
        redirect,
    )
    .unwrap();

    let auth = AuthApi::new(client.clone(), Arc::clone(&store));
    let session = auth.login("admin@example.com", "hunter2").await.unwrap();
    assert_eq!(session.token, "tok123");
    assert!(session_file.exists(), "session must be persisted");

    // The very next call picks the token up from the store.
    let api = PublicationApi::new(client);
    assert!(api.list().await.unwrap().is_empty());

    auth.logout();
    assert!(!session_file.exists(), "logout must clear the session");
}

#[tokio::test]
async fn create_publication_sends_camel_case_payload() {
    let server = MockServer::start().await;
    let publication = json!({
        "id": "pub-1",
        "title": "Spring issue",
        "content": "Hello subscribers, the garden is waking up again this year.",
        "imageUrl": "https://host/x.jpg",
        "validFrom": "2026-03-01T00:00:00Z",
        "validTo": "2026-04-01T00:00:00Z",
        "tags": ["news"],
        "sendNewsletter": true
    });
    Mock::given(method("POST"))
        .and(path("/publications"))
        .and(body_partial_json(json!({
            "title": "Spring issue",
            "imageUrl": "https://host/x.jpg",
            "sendNewsletter": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(&publication))
        .expect(1)
        .mount(&server)
        .await;

    let api = PublicationApi::new(signed_out_client(&server));
    let new_publication = serde_json::from_value(json!({
        "title": "Spring issue",
        "content": "Hello subscribers, the garden is waking up again this year.",
        "imageUrl": "https://host/x.jpg",
        "validFrom": "2026-03-01T00:00:00Z",
        "validTo": "2026-04-01T00:00:00Z",
        "tags": ["news"],
        "sendNewsletter": true
    }))
    .unwrap();

    let created = api.create(&new_publication).await.unwrap();
    assert_eq!(created.id, "pub-1");
    assert_eq!(created.image_url.as_deref(), Some("https://host/x.jpg"));
    assert!(created.send_newsletter);
}

#[tokio::test]
async fn comments_and_newsletter_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/publications/pub-1/comments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "c1", "author": "Reader", "content": "Nice one"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/publications/pub-1/comments/c1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/newsletter/subscribers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "s1", "email": "reader@example.com" }
        ])))
        .mount(&server)
        .await;

    let api = PublicationApi::new(signed_out_client(&server));

    let comment = api
        .add_comment(
            "pub-1",
            &NewComment {
                author: "Reader".to_string(),
                content: "Nice one".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(comment.id, "c1");
    api.delete_comment("pub-1", "c1").await.unwrap();

    let subscribers = api.subscribers().await.unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].email, "reader@example.com");
}
