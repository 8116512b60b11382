//! Transport error taxonomy shared by every client.

use thiserror::Error;

/// Result type for the blocking clients.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the blocking clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or IO failure while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// RESP2 framing or parse error.
    #[error("protocol error")]
    Protocol,

    /// Server returned an error reply.
    #[error("server error: {message}")]
    Server { message: String },

    /// Response type did not match the expected command response.
    #[error("unexpected response")]
    UnexpectedResponse,

    /// Pool is at capacity and no idle connections are available.
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Address could not be resolved into a socket address.
    #[error("invalid address")]
    InvalidAddress,

    /// A previous IO or protocol failure left the single connection unusable.
    #[error("connection is broken")]
    Broken,

    /// No seed node answered, or a slot has no known owner.
    #[error("cluster is down: {0}")]
    ClusterDown(String),

    /// The cluster kept redirecting past the configured limit.
    #[error("too many cluster redirects ({0})")]
    TooManyRedirects(usize),
}

impl ClientError {
    pub(crate) fn server(message: &[u8]) -> Self {
        ClientError::Server {
            message: String::from_utf8_lossy(message).into_owned(),
        }
    }

    /// Returns the server error message when this is a store error reply.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Server { message } => Some(message),
            _ => None,
        }
    }
}
