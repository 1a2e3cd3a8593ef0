//! Ingestion source configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the remote file-transfer source
///
/// Credentials come from the `SFTP_USER` / `SFTP_PASS` environment variables
/// (the names the deployment's compose file exports); host and port default to
/// the fixed container endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Remote server hostname
    pub host: String,
    /// Remote server port
    pub port: u16,
    /// Username (default: "anonymous")
    pub username: String,
    /// Password (default: "anonymous")
    pub password: String,
    /// Root directory, listed for diagnostics only
    pub root_dir: String,
    /// Upload directory holding the CSV drops
    pub upload_dir: String,
    /// Local path of the persisted known-file set
    pub known_files_path: PathBuf,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            host: "sftp".to_string(),
            port: 21,
            username: "anonymous".to_string(),
            password: "anonymous".to_string(),
            root_dir: "/".to_string(),
            upload_dir: "/upload".to_string(),
            known_files_path: PathBuf::from("known_files.json"),
        }
    }
}

impl IngestConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `SFTP_HOST`: remote hostname
    /// - `SFTP_PORT`: remote port
    /// - `SFTP_USER`: username
    /// - `SFTP_PASS`: password
    /// - `MDP_UPLOAD_DIR`: upload directory
    /// - `MDP_KNOWN_FILES`: path of the persisted known-file set
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("SFTP_HOST") {
            config.host = host;
        }

        if let Ok(port) = std::env::var("SFTP_PORT") {
            if let Ok(port) = port.parse() {
                config.port = port;
            }
        }

        if let Ok(user) = std::env::var("SFTP_USER") {
            config.username = user;
        }

        if let Ok(pass) = std::env::var("SFTP_PASS") {
            config.password = pass;
        }

        if let Ok(dir) = std::env::var("MDP_UPLOAD_DIR") {
            config.upload_dir = dir;
        }

        if let Ok(path) = std::env::var("MDP_KNOWN_FILES") {
            config.known_files_path = PathBuf::from(path);
        }

        config
    }

    /// Set remote host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set remote port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set credentials
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Set upload directory
    pub fn with_upload_dir(mut self, dir: impl Into<String>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    /// Set the known-file set path
    pub fn with_known_files_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_files_path = path.into();
        self
    }

    /// Server address in `host:port` form
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
