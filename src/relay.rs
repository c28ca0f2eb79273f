//! Upload relay to a peer instance.
//!
//! In relay mode the service keeps nothing locally: each uploaded photo is
//! posted to `http://{host}:{port}/upload` on the peer, carrying the
//! caller's `Authorization` header unchanged. The peer re-authenticates the
//! request, so paired instances are expected to share a password.
//!
//! A failed forward is reported to the uploader as-is. There are no retries
//! and no local fallback copy.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::HeaderValue;
use tracing::{debug, warn};

use crate::error::{ConfigError, RelayError};

/// Default timeout for one relay call.
pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(10);

// =============================================================================
// Relay Target
// =============================================================================

/// Peer that receives relayed uploads, parsed from `host:port`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTarget {
    pub host: String,
    pub port: u16,
}

impl RelayTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Upload endpoint on the peer.
    pub fn upload_url(&self) -> String {
        format!("http://{}:{}/upload", self.host, self.port)
    }
}

impl fmt::Display for RelayTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for RelayTarget {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidRelayTarget {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let (host, port) = value
            .split_once(':')
            .ok_or_else(|| invalid("expected host:port"))?;

        if port.contains(':') {
            return Err(invalid("expected exactly one ':'"));
        }
        if host.is_empty() {
            return Err(invalid("host is empty"));
        }

        let port: u16 = port
            .parse()
            .map_err(|_| invalid("port must be an integer between 1 and 65535"))?;
        if port == 0 {
            return Err(invalid("port must be an integer between 1 and 65535"));
        }

        Ok(Self::new(host, port))
    }
}

// =============================================================================
// Relay Forwarder
// =============================================================================

/// Forwards upload bodies to a [`RelayTarget`].
///
/// Cloning is cheap; the underlying HTTP client is shared.
#[derive(Clone)]
pub struct RelayForwarder {
    client: reqwest::Client,
    target: RelayTarget,
    url: String,
}

impl RelayForwarder {
    /// Build a forwarder whose calls give up after `timeout`.
    pub fn new(target: RelayTarget, timeout: Duration) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Client(e.to_string()))?;
        let url = target.upload_url();

        Ok(Self {
            client,
            target,
            url,
        })
    }

    pub fn target(&self) -> &RelayTarget {
        &self.target
    }

    /// Post `data` to the peer.
    ///
    /// `authorization` is copied verbatim when present. Any non-2xx answer
    /// is an error.
    pub async fn forward(
        &self,
        data: Bytes,
        authorization: Option<&HeaderValue>,
    ) -> Result<(), RelayError> {
        let size = data.len();
        let mut request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "image/jpeg")
            .body(data);

        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value.clone());
        }

        let response = request.send().await.map_err(|e| {
            warn!(peer = %self.target, "Relay request failed: {}", e);
            RelayError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                peer = %self.target,
                status = status.as_u16(),
                "Relay peer rejected upload"
            );
            return Err(RelayError::Status(status.as_u16()));
        }

        debug!(peer = %self.target, bytes = size, "Relayed photo");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
