//! Merges the optional YAML config file with environment overrides into a
//! resolved [`Config`]. The file carries no secrets; the session token
//! lives in the session file, never here.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::{error, info};

use crate::config::{ApiEnvironment, Config};

#[derive(Debug, Default, Deserialize)]
struct StaticConfig {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    session_file: Option<PathBuf>,
}

/// Resolve configuration: build-time environment defaults, then the YAML
/// file (if given), then `PUBDESK_BASE_URL` / `PUBDESK_SESSION_FILE` from
/// the environment.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    dotenvy::dotenv().ok(); // loads environment variables from .env if present

    let mut config = Config::for_environment(ApiEnvironment::from_build());

    if let Some(path_ref) = path {
        info!(config_path = ?path_ref, "Loading configuration from file");
        let config_content = match fs::read_to_string(path_ref) {
            Ok(content) => content,
            Err(e) => {
                error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
                return Err(anyhow::anyhow!(
                    "Failed to read config file {:?}: {}",
                    path_ref,
                    e
                ));
            }
        };
        let static_conf: StaticConfig = match serde_yaml::from_str(&config_content) {
            Ok(conf) => {
                info!(config_path = ?path_ref, "Parsed config YAML successfully");
                conf
            }
            Err(e) => {
                error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
                return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
            }
        };
        if let Some(base_url) = static_conf.base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(session_file) = static_conf.session_file {
            config.session_file = session_file;
        }
    }

    if let Ok(base_url) = std::env::var("PUBDESK_BASE_URL") {
        info!(base_url = %base_url, "Base URL overridden from environment");
        config.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Ok(session_file) = std::env::var("PUBDESK_SESSION_FILE") {
        config.session_file = PathBuf::from(session_file);
    }

    config.trace_loaded();
    Ok(config)
}
