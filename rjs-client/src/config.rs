//! # Client Configuration
//!
//! Plain serde structs so callers can load them from whatever format they
//! already use. Timeouts accept human-readable durations ("250ms", "2s").

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a single node, used by both the single and pooled clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server address, e.g. "127.0.0.1:6379".
    pub addr: String,
    /// Maximum idle connections kept in the pool.
    pub max_idle: usize,
    /// Maximum total connections (idle + in-use).
    pub max_total: usize,
    /// Optional TCP read timeout.
    #[serde(with = "humantime_serde")]
    pub read_timeout: Option<Duration>,
    /// Optional TCP write timeout.
    #[serde(with = "humantime_serde")]
    pub write_timeout: Option<Duration>,
    /// Optional TCP connect timeout.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            addr: "127.0.0.1:6379".to_string(),
            max_idle: 8,
            max_total: 16,
            read_timeout: None,
            write_timeout: None,
            connect_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Default configuration pointed at `addr`.
    pub fn with_addr(addr: impl Into<String>) -> Self {
        ClientConfig {
            addr: addr.into(),
            ..ClientConfig::default()
        }
    }
}

/// Configuration for the cluster-aware client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Nodes tried in order when loading the slot map.
    pub seeds: Vec<String>,
    /// Maximum `MOVED`/`ASK` hops followed for one command.
    pub max_redirects: usize,
    /// Template applied to every node pool; `addr` is replaced per node.
    pub node: ClientConfig,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        ClusterConfig {
            seeds: Vec::new(),
            max_redirects: 3,
            node: ClientConfig::default(),
        }
    }
}
