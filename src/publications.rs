//! Typed wrappers over the publications, comments, newsletter and user
//! endpoints. Thin by design: request/response models plus one method per
//! endpoint, with all transport and error normalization in
//! [`crate::http::ApiClient`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::contract::PublicationStore;
use crate::error::Result;
use crate::http::ApiClient;
use crate::session::UserRecord;

/// A stored publication as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub send_newsletter: bool,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
}

/// Payload for creating or replacing a publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPublication {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub send_newsletter: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub author: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub subscribed_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct PublicationApi {
    client: ApiClient,
}

impl PublicationApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Publication>> {
        self.client.get("/publications").await
    }

    pub async fn get(&self, id: &str) -> Result<Publication> {
        self.client.get(&format!("/publications/{id}")).await
    }

    pub async fn create(&self, publication: &NewPublication) -> Result<Publication> {
        info!(title = %publication.title, "Creating publication");
        self.client.post_json("/publications", publication).await
    }

    pub async fn update(&self, id: &str, publication: &NewPublication) -> Result<Publication> {
        info!(id, title = %publication.title, "Updating publication");
        self.client
            .put_json(&format!("/publications/{id}"), publication)
            .await
    }

    pub async fn remove(&self, id: &str) -> Result<()> {
        info!(id, "Deleting publication");
        self.client.delete(&format!("/publications/{id}")).await
    }

    pub async fn list_comments(&self, publication_id: &str) -> Result<Vec<Comment>> {
        self.client
            .get(&format!("/publications/{publication_id}/comments"))
            .await
    }

    pub async fn add_comment(&self, publication_id: &str, comment: &NewComment) -> Result<Comment> {
        self.client
            .post_json(&format!("/publications/{publication_id}/comments"), comment)
            .await
    }

    pub async fn delete_comment(&self, publication_id: &str, comment_id: &str) -> Result<()> {
        self.client
            .delete(&format!(
                "/publications/{publication_id}/comments/{comment_id}"
            ))
            .await
    }

    pub async fn subscribers(&self) -> Result<Vec<Subscriber>> {
        self.client.get("/newsletter/subscribers").await
    }

    pub async fn subscribe(&self, email: &str) -> Result<Subscriber> {
        self.client
            .post_json("/newsletter/subscribe", &serde_json::json!({ "email": email }))
            .await
    }

    pub async fn unsubscribe(&self, subscriber_id: &str) -> Result<()> {
        self.client
            .delete(&format!("/newsletter/subscribers/{subscriber_id}"))
            .await
    }

    pub async fn get_user(&self, id: &str) -> Result<UserRecord> {
        self.client.get(&format!("/users/{id}")).await
    }

    pub async fn update_user(&self, id: &str, user: &UserRecord) -> Result<UserRecord> {
        self.client.put_json(&format!("/users/{id}"), user).await
    }

    pub async fn delete_user(&self, id: &str) -> Result<()> {
        self.client.delete(&format!("/users/{id}")).await
    }
}

#[async_trait]
impl PublicationStore for PublicationApi {
    async fn create(&self, publication: NewPublication) -> Result<Publication> {
        PublicationApi::create(self, &publication).await
    }

    async fn update(&self, id: &str, publication: NewPublication) -> Result<Publication> {
        PublicationApi::update(self, id, &publication).await
    }
}
