use std::path::PathBuf;

use salon_core::overlap::OverlapPolicy;

/// Default cap on request bodies, photo uploads included (10 MiB).
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for in-flight requests after a shutdown signal.
    pub shutdown_timeout_secs: u64,
    /// Directory where uploaded photos are written (default: `uploads`).
    pub upload_dir: PathBuf,
    /// Maximum request body size in bytes.
    pub upload_max_bytes: usize,
    /// Whether cancelled appointments keep blocking their slot.
    pub cancelled_blocks_slot: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `UPLOAD_DIR`            | `uploads`               |
    /// | `UPLOAD_MAX_BYTES`      | `10485760`              |
    /// | `CANCELLED_BLOCKS_SLOT` | `false`                 |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let upload_dir =
            PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));

        let upload_max_bytes: usize = std::env::var("UPLOAD_MAX_BYTES")
            .map(|v| v.parse().expect("UPLOAD_MAX_BYTES must be a valid usize"))
            .unwrap_or(DEFAULT_UPLOAD_MAX_BYTES);

        let cancelled_blocks_slot = std::env::var("CANCELLED_BLOCKS_SLOT")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            upload_dir,
            upload_max_bytes,
            cancelled_blocks_slot,
        }
    }

    /// Overlap rules applied to every booking write.
    pub fn overlap_policy(&self) -> OverlapPolicy {
        OverlapPolicy {
            cancelled_blocks: self.cancelled_blocks_slot,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
