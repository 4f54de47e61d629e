//! Trait seams between the UI-facing pieces and everything with side effects.
//!
//! Every trait here is annotated for `mockall` so the widget, form and
//! transport tests can run against deterministic mocks. Real
//! implementations: [`crate::session::FileSessionStore`],
//! [`crate::upload::ImageUploadService`],
//! [`crate::publications::PublicationApi`], and the CLI's login redirect.

use async_trait::async_trait;
use mockall::automock;

use crate::error::Result;
use crate::publications::{NewPublication, Publication};
use crate::session::Session;
use crate::upload::{SelectedFile, UploadResult};

/// Persisted session state (token + user record).
///
/// Read on every outgoing request, cleared exactly once on HTTP 401. The
/// interface is infallible by contract: implementations log persistence
/// failures instead of propagating them.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Option<Session>;
    fn save(&self, session: Session);
    fn clear(&self);
}

/// The login surface. Invoked exactly once per expired session, right after
/// the store is cleared.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self);
}

/// Uploads a validated file and deletes previously uploaded images.
///
/// Implementors own endpoint selection (including the one-level legacy
/// fallback) and response-shape normalization; callers only ever see the
/// canonical [`UploadResult`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, file: SelectedFile) -> Result<UploadResult>;

    async fn delete_image(&self, public_id: &str) -> Result<()>;
}

/// Persistence boundary for the publication form.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait PublicationStore: Send + Sync {
    async fn create(&self, publication: NewPublication) -> Result<Publication>;

    async fn update(&self, id: &str, publication: NewPublication) -> Result<Publication>;
}
