// Copyright (C) 2025 Tessera Cloud Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for the Tessera SDK.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, SdkError};
use crate::poll::PollConfig;

const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

/// Configuration for the SDK.
///
/// Passed by reference into every workflow function; there is no process-wide
/// singleton.
#[derive(Clone)]
pub struct SdkConfig {
    /// Base URL of the Tessera API.
    pub api_url: String,
    /// Bearer token used to authenticate every request.
    pub api_token: String,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Status polling behavior.
    pub poll: PollConfig,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: String::new(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            poll: PollConfig::default(),
        }
    }
}

// Token must not leak into logs.
impl fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkConfig")
            .field("api_url", &self.api_url)
            .field("api_token", &"***")
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("poll", &self.poll)
            .finish()
    }
}

/// On-disk credentials file shape.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    api_url: Option<String>,
    api_token: Option<String>,
}

impl SdkConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration for localhost development.
    pub fn localhost() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            ..Self::default()
        }
    }

    /// Create a configuration from the environment.
    ///
    /// Environment variables:
    /// - `TESSERA_API_URL`: API base URL (default: "http://127.0.0.1:3000")
    /// - `TESSERA_API_TOKEN`: Bearer token
    /// - `TESSERA_CREDENTIALS_FILE`: JSON file with `api_url`/`api_token`;
    ///   explicit env vars take precedence over file values
    /// - `TESSERA_CONNECT_TIMEOUT_MS`: Connection timeout (default: 10000)
    /// - `TESSERA_REQUEST_TIMEOUT_MS`: Request timeout (default: 30000)
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("TESSERA_CREDENTIALS_FILE") {
            config = config.merge_credentials_file(Path::new(&path))?;
        }

        if let Ok(url) = std::env::var("TESSERA_API_URL") {
            config.api_url = url;
        }
        if let Ok(token) = std::env::var("TESSERA_API_TOKEN") {
            config.api_token = token;
        }

        if let Ok(ms) = std::env::var("TESSERA_CONNECT_TIMEOUT_MS") {
            let ms: u64 = ms
                .parse()
                .map_err(|e| SdkError::Config(format!("invalid TESSERA_CONNECT_TIMEOUT_MS: {}", e)))?;
            config.connect_timeout = Duration::from_millis(ms);
        }
        if let Ok(ms) = std::env::var("TESSERA_REQUEST_TIMEOUT_MS") {
            let ms: u64 = ms
                .parse()
                .map_err(|e| SdkError::Config(format!("invalid TESSERA_REQUEST_TIMEOUT_MS: {}", e)))?;
            config.request_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Load credentials from a JSON file, keeping existing values where the
    /// file is silent.
    pub fn merge_credentials_file(mut self, path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let creds: CredentialsFile = serde_json::from_str(&raw)
            .map_err(|e| SdkError::Config(format!("invalid credentials file: {}", e)))?;
        if let Some(url) = creds.api_url {
            self.api_url = url;
        }
        if let Some(token) = creds.api_token {
            self.api_token = token;
        }
        Ok(self)
    }

    /// Set the API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the bearer token.
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = token.into();
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the polling behavior.
    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::sync::Mutex;

    use super::*;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to set env vars for a test and restore them after
    struct EnvGuard {
        vars: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self { vars: Vec::new() }
        }

        fn set(&mut self, key: &str, value: &str) {
            let old = env::var(key).ok();
            self.vars.push((key.to_string(), old));
            // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
            unsafe { env::set_var(key, value) };
        }

        fn remove(&mut self, key: &str) {
            let old = env::var(key).ok();
            self.vars.push((key.to_string(), old));
            // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
            unsafe { env::remove_var(key) };
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.vars.drain(..).rev() {
                // SAFETY: Tests are serialized via ENV_MUTEX, so no concurrent access
                unsafe {
                    match value {
                        Some(v) => env::set_var(&key, v),
                        None => env::remove_var(&key),
                    }
                }
            }
        }
    }

    #[test]
    fn test_default_config() {
        let config = SdkConfig::default();
        assert_eq!(config.api_url, "http://127.0.0.1:3000");
        assert!(config.api_token.is_empty());
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builder_methods() {
        let config = SdkConfig::new()
            .with_api_url("https://api.tessera.cloud")
            .with_api_token("tok-123")
            .with_connect_timeout(Duration::from_secs(5))
            .with_request_timeout(Duration::from_secs(60));

        assert_eq!(config.api_url, "https://api.tessera.cloud");
        assert_eq!(config.api_token, "tok-123");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = SdkConfig::new().with_api_token("super-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("***"));
    }

    #[test]
    fn test_merge_credentials_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(
            &path,
            r#"{"api_url": "https://file.example", "api_token": "file-token"}"#,
        )
        .unwrap();

        let config = SdkConfig::new().merge_credentials_file(&path).unwrap();
        assert_eq!(config.api_url, "https://file.example");
        assert_eq!(config.api_token, "file-token");
    }

    #[test]
    fn test_from_env_reads_credentials_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(
            &path,
            r#"{"api_url": "https://file.example", "api_token": "file-token"}"#,
        )
        .unwrap();

        guard.set("TESSERA_CREDENTIALS_FILE", path.to_str().unwrap());
        guard.remove("TESSERA_API_URL");
        guard.remove("TESSERA_API_TOKEN");
        guard.remove("TESSERA_CONNECT_TIMEOUT_MS");
        guard.remove("TESSERA_REQUEST_TIMEOUT_MS");

        let config = SdkConfig::from_env().unwrap();
        assert_eq!(config.api_url, "https://file.example");
        assert_eq!(config.api_token, "file-token");
    }

    #[test]
    fn test_from_env_vars_override_credentials_file() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let mut guard = EnvGuard::new();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(
            &path,
            r#"{"api_url": "https://file.example", "api_token": "file-token"}"#,
        )
        .unwrap();

        guard.set("TESSERA_CREDENTIALS_FILE", path.to_str().unwrap());
        guard.set("TESSERA_API_URL", "https://env.example");
        guard.set("TESSERA_API_TOKEN", "env-token");
        guard.remove("TESSERA_CONNECT_TIMEOUT_MS");
        guard.remove("TESSERA_REQUEST_TIMEOUT_MS");

        let config = SdkConfig::from_env().unwrap();
        assert_eq!(config.api_url, "https://env.example");
        assert_eq!(config.api_token, "env-token");
    }

    #[test]
    fn test_merge_credentials_file_missing() {
        let err = SdkConfig::new()
            .merge_credentials_file(Path::new("/nonexistent/creds.json"))
            .unwrap_err();
        assert!(err.to_string().contains("configuration error"));
    }
}
