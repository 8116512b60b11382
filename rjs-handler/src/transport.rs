//! # Transport Adapters
//!
//! The one capability the handler needs from a client: run a named command
//! with ordered arguments and hand back the raw reply. Adapters exist for
//! every bundled client; applications can implement [`Transport`] for
//! their own.

use bytes::Bytes;
use rjs_client::{ClientResult, ClusterClient, PooledClient, SingleClient};

use crate::reply::Reply;

/// Executes one command against the store.
///
/// Implementations must surface store error replies as
/// [`ClientError::Server`](rjs_client::ClientError::Server) and must not
/// retry on the handler's behalf.
pub trait Transport: Send + Sync {
    fn execute(&self, name: &str, args: &[Bytes]) -> ClientResult<Reply>;
}

impl Transport for SingleClient {
    fn execute(&self, name: &str, args: &[Bytes]) -> ClientResult<Reply> {
        Reply::from_resp(self.exec(name.as_bytes(), args)?)
    }
}

impl Transport for PooledClient {
    fn execute(&self, name: &str, args: &[Bytes]) -> ClientResult<Reply> {
        Reply::from_resp(self.exec(name.as_bytes(), args)?)
    }
}

impl Transport for ClusterClient {
    fn execute(&self, name: &str, args: &[Bytes]) -> ClientResult<Reply> {
        Reply::from_resp(self.exec(name.as_bytes(), args)?)
    }
}
