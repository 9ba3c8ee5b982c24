//! Application settings loaded via OrthoConfig.
//!
//! Every value can come from the command line, a config file or a
//! `REDECOR_*` environment variable. Unset values fall back to the defaults
//! exposed by the accessor methods, so the struct itself stays a plain record
//! of what the operator actually provided.

use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::RetryPolicy;
use crate::outbound::detection::DetectorTimeouts;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_ML_SERVICE_URL: &str = "http://localhost:5001";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_DETECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_DETECT_MAX_ATTEMPTS: u32 = 2;
const DEFAULT_RETRY_INITIAL_BACKOFF_MS: u64 = 250;
const DEFAULT_RETRY_MAX_BACKOFF_MS: u64 = 2_000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

/// Start-up configuration for the backend server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "REDECOR")]
pub struct AppSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    pub port: Option<u16>,
    /// PostgreSQL URL; without one the in-memory store is used.
    pub database_url: Option<String>,
    /// Browser origin allowed by CORS.
    pub frontend_url: Option<String>,
    /// Base URL of the object-detection service.
    pub ml_service_url: Option<String>,
    /// Directory for stored room images.
    pub upload_dir: Option<PathBuf>,
    /// Deadline for one detection call, in seconds.
    pub detect_timeout_secs: Option<u64>,
    /// Deadline for detector health and category calls, in seconds.
    pub probe_timeout_secs: Option<u64>,
    /// Total detection attempts, including the first.
    pub detect_max_attempts: Option<u32>,
    /// Delay before the first retry, in milliseconds.
    pub retry_initial_backoff_ms: Option<u64>,
    /// Cap on the retry delay, in milliseconds.
    pub retry_max_backoff_ms: Option<u64>,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: Option<usize>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
}

impl AppSettings {
    /// Interface to bind, defaulting to all interfaces.
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Port to bind, defaulting to 5000.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Allowed CORS origin.
    pub fn frontend_url(&self) -> &str {
        self.frontend_url.as_deref().unwrap_or(DEFAULT_FRONTEND_URL)
    }

    /// Detection service root.
    pub fn ml_service_url(&self) -> &str {
        self.ml_service_url
            .as_deref()
            .unwrap_or(DEFAULT_ML_SERVICE_URL)
    }

    /// Directory for stored images.
    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    /// Per-operation detector deadlines.
    pub fn detector_timeouts(&self) -> DetectorTimeouts {
        DetectorTimeouts {
            detect: Duration::from_secs(
                self.detect_timeout_secs
                    .unwrap_or(DEFAULT_DETECT_TIMEOUT_SECS),
            ),
            probe: Duration::from_secs(
                self.probe_timeout_secs
                    .unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS),
            ),
        }
    }

    /// Detection retry budget.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self
                .detect_max_attempts
                .unwrap_or(DEFAULT_DETECT_MAX_ATTEMPTS),
            initial_backoff: Duration::from_millis(
                self.retry_initial_backoff_ms
                    .unwrap_or(DEFAULT_RETRY_INITIAL_BACKOFF_MS),
            ),
            max_backoff: Duration::from_millis(
                self.retry_max_backoff_ms
                    .unwrap_or(DEFAULT_RETRY_MAX_BACKOFF_MS),
            ),
        }
    }

    /// Upload size limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    /// Database pool size.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }
}
