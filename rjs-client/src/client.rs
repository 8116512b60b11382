//! # Single-Node Clients
//!
//! Purpose: Expose a compact, blocking `exec` for issuing Redis-compatible
//! commands to one server over RESP2.
//!
//! ## Design Principles
//! 1. **Facade Pattern**: Callers see `exec` only; pooling and framing stay hidden.
//! 2. **Borrow-Friendly API**: Accept anything `AsRef<[u8]>` to avoid copies.
//! 3. **Fail Fast**: Protocol violations surface immediately as errors.
//! 4. **Raw Replies**: Error replies come back as `RespValue::Error`; mapping
//!    them is the caller's decision.

use parking_lot::Mutex;
use tracing::debug;

use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::error::{ClientError, ClientResult};
use crate::pool::ConnectionPool;
use crate::resp::RespValue;

/// One blocking connection shared behind a mutex.
///
/// Commands are serialized on the connection. After an IO or protocol
/// failure the connection is dropped and every later call returns
/// [`ClientError::Broken`]; reconnecting is up to the owner.
pub struct SingleClient {
    addr: String,
    conn: Mutex<Option<Connection>>,
}

impl SingleClient {
    /// Connects with default settings.
    pub fn connect(addr: impl Into<String>) -> ClientResult<Self> {
        Self::with_config(ClientConfig::with_addr(addr))
    }

    /// Connects with a custom configuration. Pool limits are ignored.
    pub fn with_config(config: ClientConfig) -> ClientResult<Self> {
        let conn = Connection::connect(&config)?;
        Ok(SingleClient {
            addr: config.addr,
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Address this client is connected to.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Returns false once a failure has dropped the connection.
    pub fn is_connected(&self) -> bool {
        self.conn.lock().is_some()
    }

    /// Executes one command and returns the raw reply.
    pub fn exec<A: AsRef<[u8]>>(&self, name: &[u8], args: &[A]) -> ClientResult<RespValue> {
        let mut guard = self.conn.lock();
        let conn = guard.as_mut().ok_or(ClientError::Broken)?;
        let response = conn.exec(name, args);
        if let Err(err) = &response {
            debug!(addr = %self.addr, error = %err, "dropping broken connection");
            *guard = None;
        }
        response
    }
}

/// Client with connection pooling.
///
/// Each call acquires a connection, executes one command, and returns the
/// connection to the pool.
pub struct PooledClient {
    pool: ConnectionPool,
}

impl PooledClient {
    /// Creates a client with default configuration.
    ///
    /// No connection is opened until the first command.
    pub fn connect(addr: impl Into<String>) -> Self {
        Self::with_config(ClientConfig::with_addr(addr))
    }

    /// Creates a client with a custom configuration.
    pub fn with_config(config: ClientConfig) -> Self {
        PooledClient {
            pool: ConnectionPool::new(config),
        }
    }

    /// Address of the pooled node.
    pub fn addr(&self) -> &str {
        &self.pool.config().addr
    }

    /// Connections currently owned by the pool.
    pub fn open_connections(&self) -> usize {
        self.pool.total()
    }

    /// Executes one command on a pooled connection and returns the raw reply.
    pub fn exec<A: AsRef<[u8]>>(&self, name: &[u8], args: &[A]) -> ClientResult<RespValue> {
        let mut conn = self.pool.acquire()?;
        conn.exec(name, args)
    }

    /// Sends `ASKING` and then the command on the same connection.
    pub(crate) fn exec_asking<A: AsRef<[u8]>>(
        &self,
        name: &[u8],
        args: &[A],
    ) -> ClientResult<RespValue> {
        let mut conn = self.pool.acquire()?;
        match conn.exec::<&[u8]>(b"ASKING", &[])? {
            RespValue::Simple(_) => conn.exec(name, args),
            RespValue::Error(message) => Err(ClientError::server(&message)),
            _ => Err(ClientError::UnexpectedResponse),
        }
    }
}
