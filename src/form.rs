//! Publication draft: the controlled-form state behind the create/edit
//! screen. Validation distinguishes hard errors (which block submission
//! before any network call) from soft warnings (logged, shown, but not
//! blocking).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::contract::PublicationStore;
use crate::error::{ClientError, Result};
use crate::publications::{NewPublication, Publication};
use crate::upload::UploadResult;

/// Content shorter than this draws a soft warning.
pub const SHORT_CONTENT_LEN: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub send_newsletter: bool,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
}

impl PublicationDraft {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        valid_from: DateTime<Utc>,
        valid_to: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            image_url: None,
            valid_from,
            valid_to,
            category: None,
            tags: BTreeSet::new(),
            send_newsletter: false,
            author_name: None,
            author_email: None,
        }
    }

    /// Compose a finished upload into the draft. The URL has been validated
    /// by the upload pipeline, satisfying the "empty or previously
    /// uploaded" invariant on `image_url`.
    pub fn set_image(&mut self, result: &UploadResult) {
        self.image_url = Some(result.image_url.clone());
    }

    /// Hard checks return `Err` and must block submission; the `Ok` payload
    /// is the list of soft warnings.
    pub fn validate(&self) -> Result<Vec<String>> {
        if self.title.trim().is_empty() {
            return Err(ClientError::validation("A title is required."));
        }
        if self.content.trim().is_empty() {
            return Err(ClientError::validation("Content is required."));
        }
        if self.valid_to <= self.valid_from {
            return Err(ClientError::validation(
                "The end date must be after the start date.",
            ));
        }
        if let Some(url) = self.image_url.as_deref() {
            if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ClientError::validation(
                    "The image URL must come from a completed upload.",
                ));
            }
        }

        let mut warnings = Vec::new();
        if self.content.trim().chars().count() < SHORT_CONTENT_LEN {
            warnings.push(format!(
                "The content is quite short ({} characters). Consider expanding it.",
                self.content.trim().chars().count()
            ));
        }
        Ok(warnings)
    }

    pub fn to_publication(&self) -> NewPublication {
        NewPublication {
            title: self.title.trim().to_string(),
            content: self.content.clone(),
            image_url: self.image_url.clone().filter(|url| !url.is_empty()),
            valid_from: self.valid_from,
            valid_to: self.valid_to,
            category: self.category.clone(),
            tags: self.tags.iter().cloned().collect(),
            send_newsletter: self.send_newsletter,
            author_name: self.author_name.clone(),
            author_email: self.author_email.clone(),
        }
    }

    /// Validate, then create. Validation failures never reach the store.
    pub async fn submit<S: PublicationStore + ?Sized>(&self, store: &S) -> Result<Publication> {
        for warning in self.validate()? {
            warn!(warning = %warning, "Draft warning");
        }
        info!(title = %self.title, "Submitting new publication");
        store.create(self.to_publication()).await
    }

    /// Validate, then update an existing publication.
    pub async fn submit_update<S: PublicationStore + ?Sized>(
        &self,
        store: &S,
        id: &str,
    ) -> Result<Publication> {
        for warning in self.validate()? {
            warn!(warning = %warning, "Draft warning");
        }
        info!(id, title = %self.title, "Submitting publication update");
        store.update(id, self.to_publication()).await
    }
}
