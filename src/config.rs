//! Client configuration and per-request options.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Default port devices listen on.
pub const PORT: u16 = 56700;

/// Default time to wait for each reply.
pub const TIMEOUT_MS: u64 = 250;

/// Default number of send attempts per request.
pub const MAX_RETRIES: u32 = 10;

/// Client-wide settings.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use lifx_lan_rs::ClientConfig;
///
/// let config = ClientConfig::from_json_str(r#"{"broadcast_address": "192.168.1.255"}"#).unwrap();
/// assert_eq!(config.port, 56700);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Identifies this client to devices; echoed in every reply.
    pub source: u32,
    /// Destination for requests without a target.
    pub broadcast_address: IpAddr,
    /// Remote port for broadcasts.
    pub port: u16,
    pub timeout_ms: u64,
    pub max_retries: u32,
    /// Replies to wait for before a request completes; 0 waits for the full timeout.
    pub max_replies: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            source: random_source(),
            broadcast_address: IpAddr::V4(Ipv4Addr::BROADCAST),
            port: PORT,
            timeout_ms: TIMEOUT_MS,
            max_retries: MAX_RETRIES,
            max_replies: 1,
        }
    }
}

/// A random non-zero source identifier.
fn random_source() -> u32 {
    let id = uuid::Uuid::new_v4().as_u128() as u32;
    id.max(1)
}

impl ClientConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::JsonLoad)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Error::JsonDump)
    }

    pub fn broadcast_target(&self) -> SocketAddr {
        SocketAddr::new(self.broadcast_address, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Options for a request that uses the configured defaults.
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            response_required: true,
            max_replies: self.max_replies,
            timeout: self.timeout(),
            max_retries: self.max_retries,
        }
    }
}

/// Per-request settings.
///
/// Build one from [`ClientConfig::request_options`] and override fields with
/// the setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    /// Wait for replies. When false the request is sent once and returns at once.
    pub response_required: bool,
    /// Replies to collect before returning; 0 collects until the timeout.
    pub max_replies: usize,
    /// Time to wait for each reply.
    pub timeout: Duration,
    /// Send attempts; always at least one.
    pub max_retries: u32,
}

impl Default for RequestOptions {
    fn default() -> Self {
        RequestOptions {
            response_required: true,
            max_replies: 1,
            timeout: Duration::from_millis(TIMEOUT_MS),
            max_retries: MAX_RETRIES,
        }
    }
}

impl RequestOptions {
    pub fn fire_and_forget(mut self) -> Self {
        self.response_required = false;
        self
    }

    pub fn response_required(mut self, required: bool) -> Self {
        self.response_required = required;
        self
    }

    pub fn max_replies(mut self, max_replies: usize) -> Self {
        self.max_replies = max_replies;
        self
    }

    /// Collect every reply that arrives before the timeout.
    pub fn unbounded(self) -> Self {
        self.max_replies(0)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Serializable snapshot of the settings a handle was built with.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub ip: Option<IpAddr>,
    pub port: Option<u16>,
    pub mac: Option<String>,
    pub label: Option<String>,
}
