use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

/// Backend base URL in production builds.
pub const PRODUCTION_BASE_URL: &str = "https://api.pubdesk.app";
/// Backend base URL when built with the `local-backend` feature.
pub const LOCAL_BASE_URL: &str = "http://localhost:8080";

/// Timeout for ordinary API calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for multipart uploads, which move real bytes.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Which backend this build talks to. Selected at compile time by the
/// `local-backend` cargo feature; a config file or env var can still
/// override the resulting base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiEnvironment {
    Production,
    Local,
}

impl ApiEnvironment {
    pub fn from_build() -> Self {
        if cfg!(feature = "local-backend") {
            ApiEnvironment::Local
        } else {
            ApiEnvironment::Production
        }
    }

    pub fn base_url(&self) -> &'static str {
        match self {
            ApiEnvironment::Production => PRODUCTION_BASE_URL,
            ApiEnvironment::Local => LOCAL_BASE_URL,
        }
    }
}

/// Resolved client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, without a trailing slash.
    pub base_url: String,
    /// Where the persisted session (token + user record) lives on disk.
    pub session_file: PathBuf,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
}

impl Config {
    pub fn for_environment(env: ApiEnvironment) -> Self {
        let config = Config {
            base_url: env.base_url().to_string(),
            session_file: PathBuf::from(".pubdesk/session.json"),
            request_timeout: REQUEST_TIMEOUT,
            upload_timeout: UPLOAD_TIMEOUT,
        };
        info!(environment = ?env, base_url = %config.base_url, "Resolved API environment");
        config
    }

    /// Base path served back for files stored by the legacy upload endpoint.
    pub fn uploads_base(&self) -> String {
        format!("{}/uploads", self.base_url)
    }

    pub fn trace_loaded(&self) {
        info!(
            base_url = %self.base_url,
            session_file = %self.session_file.display(),
            "Loaded Config"
        );
        debug!(?self, "Config loaded (full debug)");
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::for_environment(ApiEnvironment::from_build())
    }
}
