//! Image upload service: client-side validation, the multipart upload
//! itself, and normalization of the backend's divergent response shapes.
//!
//! The backend has grown four distinct upload response shapes over time:
//! direct camelCase fields, a `{success, data}` (or `imageData`) envelope,
//! snake_case fields, and a "classic" non-managed endpoint that answers
//! with `fileUrl`/`filename` only. All four normalize into the single
//! canonical [`UploadResult`]; a 2xx response in which no URL field can be
//! discovered is a [`ClientError::Shape`] failure.
//!
//! Failure policy: when the managed endpoint (`/images/upload`) fails, the
//! service makes exactly one attempt against the legacy endpoint
//! (`/upload/image`). That is a fallback, not a retry loop; if both fail
//! the most specific of the two errors propagates.

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::contract::ImageUploader;
use crate::error::{ClientError, Result};
use crate::http::ApiClient;

/// Hard cap on upload size.
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;
/// Longest accepted file name.
pub const MAX_FILENAME_LEN: usize = 255;

/// Mime types the backend will store.
pub const ALLOWED_MIME_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
    "image/tiff",
];

/// Characters never allowed in an uploaded file name.
pub const FORBIDDEN_NAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Managed upload endpoint.
pub const PRIMARY_UPLOAD_PATH: &str = "/images/upload";
/// Legacy fallback endpoint.
pub const FALLBACK_UPLOAD_PATH: &str = "/upload/image";

/// A file the user picked, held in memory the way a browser file input
/// would hand it over.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk, sniffing the mime type from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image.jpg")
            .to_string();
        let mime = mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok(Self { name, mime, bytes })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Canonical result of a successful upload, however the backend answered.
///
/// `image_url` is always present and non-empty; everything else is
/// best-effort from the response, with name and size taken from the file
/// that was sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub image_url: String,
    pub public_id: Option<String>,
    pub original_file_name: String,
    pub file_size: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Client-side checks, run before any network call.
pub fn validate(file: &SelectedFile) -> Result<()> {
    if !ALLOWED_MIME_TYPES.contains(&file.mime.as_str()) {
        return Err(ClientError::validation(format!(
            "Unsupported image type: {}. Use JPEG, PNG, GIF, WebP, BMP or TIFF.",
            file.mime
        )));
    }
    if file.size() == 0 {
        return Err(ClientError::validation("The selected file is empty."));
    }
    if file.size() > MAX_FILE_BYTES {
        return Err(ClientError::validation(format!(
            "The image is too large ({} bytes). The limit is 10 MiB.",
            file.size()
        )));
    }
    if file.name.chars().count() > MAX_FILENAME_LEN {
        return Err(ClientError::validation(
            "The file name is too long (255 characters maximum).",
        ));
    }
    if file.name.contains(&FORBIDDEN_NAME_CHARS[..]) {
        return Err(ClientError::validation(
            "The file name contains characters that are not allowed: < > : \" / \\ | ? *",
        ));
    }
    Ok(())
}

/// Uploads images through the shared [`ApiClient`].
#[derive(Clone)]
pub struct ImageUploadService {
    client: ApiClient,
}

impl ImageUploadService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Validate, then upload. The managed endpoint is tried first; on
    /// failure exactly one attempt is made against the legacy endpoint.
    /// Validation failures and expired sessions never reach the fallback.
    pub async fn upload(&self, file: &SelectedFile) -> Result<UploadResult> {
        validate(file)?;
        info!(
            file = %file.name,
            size = file.size(),
            mime = %file.mime,
            "Uploading image via managed endpoint"
        );
        let primary_err = match self.attempt(PRIMARY_UPLOAD_PATH, "image", file).await {
            Ok(result) => {
                info!(url = %result.image_url, "Upload succeeded");
                return Ok(result);
            }
            // A 401 has already cleared the session; the legacy endpoint
            // would only fail the same way.
            Err(ClientError::Unauthorized) => return Err(ClientError::Unauthorized),
            Err(e) => e,
        };
        warn!(error = %primary_err, "Managed upload failed, falling back to legacy endpoint");
        match self.attempt(FALLBACK_UPLOAD_PATH, "file", file).await {
            Ok(result) => {
                info!(url = %result.image_url, "Fallback upload succeeded");
                Ok(result)
            }
            Err(ClientError::Unauthorized) => Err(ClientError::Unauthorized),
            Err(fallback_err) => Err(most_specific(primary_err, fallback_err)),
        }
    }

    async fn attempt(&self, path: &str, field: &str, file: &SelectedFile) -> Result<UploadResult> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime)?;
        let form = reqwest::multipart::Form::new().part(field.to_string(), part);
        let body = self.client.post_multipart(path, form).await?;
        normalize_upload_response(&body, &file.name, file.size(), &self.uploads_base())
    }

    /// Delete a previously uploaded image. Backend-reported failures
    /// surface verbatim through the normal error path.
    pub async fn delete_image(&self, public_id: &str) -> Result<()> {
        info!(public_id, "Deleting uploaded image");
        self.client.delete(&format!("/images/{public_id}")).await
    }

    fn uploads_base(&self) -> String {
        format!("{}/uploads", self.client.base_url())
    }
}

#[async_trait]
impl ImageUploader for ImageUploadService {
    async fn upload(&self, file: SelectedFile) -> Result<UploadResult> {
        ImageUploadService::upload(self, &file).await
    }

    async fn delete_image(&self, public_id: &str) -> Result<()> {
        ImageUploadService::delete_image(self, public_id).await
    }
}

/// Rank errors so the caller sees the most informative of the two failed
/// attempts: a backend-supplied message beats a missing field, which beats
/// a bare transport failure. Ties go to the fallback attempt.
fn most_specific(primary: ClientError, fallback: ClientError) -> ClientError {
    fn rank(e: &ClientError) -> u8 {
        match e {
            ClientError::Unauthorized => 4,
            ClientError::Http { .. } | ClientError::Validation(_) => 3,
            ClientError::Shape(_) => 2,
            ClientError::Transport(_) => 1,
        }
    }
    if rank(&primary) > rank(&fallback) {
        primary
    } else {
        fallback
    }
}

/// Normalize any of the four known response shapes into an
/// [`UploadResult`].
///
/// The URL is looked for at the top level and under the `data` and
/// `imageData` envelopes, in camelCase and snake_case, and finally as the
/// classic `fileUrl`/`filename` pair (a bare `filename` is resolved against
/// the uploads base path). No discoverable, non-empty URL means the
/// response is rejected as malformed.
pub fn normalize_upload_response(
    body: &Value,
    file_name: &str,
    file_size: u64,
    uploads_base: &str,
) -> Result<UploadResult> {
    let envelopes = [Some(body), body.get("data"), body.get("imageData")];
    let candidates: Vec<&Value> = envelopes.into_iter().flatten().collect();

    let mut image_url = None;
    for candidate in &candidates {
        image_url = str_field(candidate, &["imageUrl", "url", "image_url", "fileUrl", "file_url"]);
        if image_url.is_none() {
            // Classic endpoint: only the stored file name comes back.
            image_url = str_field(candidate, &["filename", "file_name"])
                .map(|name| format!("{}/{}", uploads_base.trim_end_matches('/'), name));
        }
        if image_url.is_some() {
            break;
        }
    }
    let image_url = image_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ClientError::shape("upload response contains no image URL"))?;

    let mut result = UploadResult {
        image_url,
        public_id: None,
        original_file_name: file_name.to_string(),
        file_size,
        width: None,
        height: None,
    };
    for candidate in &candidates {
        if result.public_id.is_none() {
            result.public_id = str_field(candidate, &["publicId", "public_id"]);
        }
        if result.width.is_none() {
            result.width = u32_field(candidate, "width");
        }
        if result.height.is_none() {
            result.height = u32_field(candidate, "height");
        }
    }
    debug!(url = %result.image_url, public_id = ?result.public_id, "Normalized upload response");
    Ok(result)
}

fn str_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        value
            .get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    })
}

fn u32_field(value: &Value, key: &str) -> Option<u32> {
    value
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
}
