//! # RJS Blocking Clients
//!
//! Purpose: Carry Redis-compatible commands to a single node, a pooled node,
//! or a cluster over RESP2. These clients know nothing about JSON documents;
//! they accept a command name plus arguments and return the raw reply.
//!
//! ## Design Principles
//! 1. **Object Pool Pattern**: Reuse TCP connections to avoid repeated connects.
//! 2. **Caller-Owned Lifecycle**: Clients are built by the caller and shared by `Arc`.
//! 3. **Minimal Allocation**: Reuse buffers for RESP framing and parsing.
//! 4. **Protocol Clarity**: Encode/parse RESP2 explicitly for correctness.

mod client;
mod cluster;
mod config;
mod connection;
mod error;
mod pool;
mod resp;

pub use client::{PooledClient, SingleClient};
pub use cluster::{key_slot, ClusterClient, NUM_SLOTS};
pub use config::{ClientConfig, ClusterConfig};
pub use error::{ClientError, ClientResult};
pub use resp::RespValue;
