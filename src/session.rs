//! Persisted session state: the bearer token and current-user record.
//!
//! The browser front-ends this backend serves keep both in localStorage;
//! here they live in a small JSON file whose path comes from
//! [`crate::config::Config::session_file`]. The store interface is
//! deliberately fire-and-forget: persistence failures are logged, never
//! surfaced, so a broken disk cannot block an API call.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::contract::SessionStore;

/// The signed-in user as the backend reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Token plus user record, persisted as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserRecord,
}

/// JSON-file-backed [`SessionStore`].
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<Session> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(error = ?e, path = %self.path.display(), "Failed to read session file");
                return None;
            }
        };
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                // A corrupt session is treated as signed-out.
                warn!(error = ?e, path = %self.path.display(), "Session file is not valid JSON, ignoring");
                None
            }
        }
    }

    fn save(&self, session: Session) {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = fs::create_dir_all(parent) {
                    warn!(error = ?e, path = %parent.display(), "Failed to create session directory");
                    return;
                }
            }
        }
        match serde_json::to_string_pretty(&session) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    warn!(error = ?e, path = %self.path.display(), "Failed to persist session");
                } else {
                    debug!(user = %session.user.email, path = %self.path.display(), "Session persisted");
                }
            }
            Err(e) => warn!(error = ?e, "Failed to serialize session"),
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Session cleared"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(error = ?e, path = %self.path.display(), "Failed to remove session file"),
        }
    }
}
