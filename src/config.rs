//! Configuration management.
//!
//! Configuration is read once at startup from:
//! - Command-line arguments via clap
//! - Environment variables with `NVGL8R_` prefix
//! - Defaults for everything except the password
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use nvgl8r::config::Config;
//!
//! let config = Config::parse();
//! config.validate()?;
//! println!("Listening on {}", config.bind_address());
//! ```
//!
//! # Environment Variables
//!
//! - `NVGL8R_HOST` - Server bind address (default: 0.0.0.0)
//! - `NVGL8R_PORT` - Server port (default: 8888)
//! - `NVGL8R_PASSWORD` - Password required from every client (required)
//! - `NVGL8R_RELAY` - Relay uploads to `host:port` instead of storing them
//! - `NVGL8R_RELAY_TIMEOUT` - Relay call timeout in seconds (default: 10)
//! - `NVGL8R_STATIC_DIR` - Static assets directory (default: static)
//! - `NVGL8R_PHOTOS_DIR` - Photo storage directory (default: photos)
//! - `NVGL8R_CAPACITY` - Number of photos retained (default: 5)
//! - `NVGL8R_MAX_UPLOAD_SIZE` - Upload body limit in bytes (default: 20 MiB)

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::ConfigError;
use crate::photos::DEFAULT_PHOTO_CAPACITY;
use crate::relay::{RelayTarget, DEFAULT_RELAY_TIMEOUT};
use crate::server::DEFAULT_MAX_UPLOAD_SIZE;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8888;

/// Default static assets directory.
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Default photo storage directory.
pub const DEFAULT_PHOTOS_DIR: &str = "photos";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Nvgl8r - a password-protected photo drop.
///
/// Keeps the most recent uploaded photos on disk and serves them, together
/// with the monitor and capture pages, to authenticated clients. With
/// `--relay`, uploads are forwarded to another instance instead.
#[derive(Parser, Debug, Clone)]
#[command(name = "nvgl8r")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "NVGL8R_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "NVGL8R_PORT")]
    pub port: u16,

    /// Password for authentication.
    ///
    /// Only a salted hash of it is kept in memory.
    #[arg(long, env = "NVGL8R_PASSWORD", hide_env_values = true)]
    pub password: String,

    // =========================================================================
    // Relay Configuration
    // =========================================================================
    /// Relay photos to another server (format: host:port).
    #[arg(long, env = "NVGL8R_RELAY")]
    pub relay: Option<String>,

    /// Timeout in seconds for each relay call.
    #[arg(long, default_value_t = DEFAULT_RELAY_TIMEOUT.as_secs(), env = "NVGL8R_RELAY_TIMEOUT")]
    pub relay_timeout: u64,

    // =========================================================================
    // Storage Configuration
    // =========================================================================
    /// Directory static pages are served from.
    #[arg(long, default_value = DEFAULT_STATIC_DIR, env = "NVGL8R_STATIC_DIR")]
    pub static_dir: PathBuf,

    /// Directory uploaded photos are kept in. Emptied at startup and shutdown.
    #[arg(long, default_value = DEFAULT_PHOTOS_DIR, env = "NVGL8R_PHOTOS_DIR")]
    pub photos_dir: PathBuf,

    /// Number of most recent photos to keep.
    #[arg(long, default_value_t = DEFAULT_PHOTO_CAPACITY, env = "NVGL8R_CAPACITY")]
    pub capacity: usize,

    /// Maximum upload size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_SIZE, env = "NVGL8R_MAX_UPLOAD_SIZE")]
    pub max_upload_size: usize,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.password.is_empty() {
            return Err(
                "A password is required. Set --password or NVGL8R_PASSWORD".to_string(),
            );
        }

        if self.capacity == 0 {
            return Err("capacity must be greater than 0".to_string());
        }
        if self.relay_timeout == 0 {
            return Err("relay_timeout must be greater than 0".to_string());
        }
        if self.max_upload_size == 0 {
            return Err("max_upload_size must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Parse the relay target, if one is configured.
    ///
    /// Not covered by [`validate`](Self::validate); startup calls both.
    pub fn relay_target(&self) -> Result<Option<RelayTarget>, ConfigError> {
        self.relay.as_deref().map(str::parse).transpose()
    }

    /// Relay call timeout.
    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay_timeout)
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Tests
// =============================================================================
