//! Error type returned by every handler operation.

use rjs_client::ClientError;
use thiserror::Error;

/// Result type for handler operations.
pub type RjsResult<T> = Result<T, RjsError>;

/// Failures of a handler call.
///
/// Build-time variants (`Serialization`, `UnsupportedOption`,
/// `MissingArgument`) are raised before anything reaches the network.
#[derive(Debug, Error)]
pub enum RjsError {
    /// No transport is bound to the handler.
    #[error("no active client bound to the handler")]
    NoActiveClient,

    /// The value could not be encoded as JSON.
    #[error("failed to encode value as JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The transport failed or the store replied with an error.
    #[error(transparent)]
    Transport(#[from] ClientError),

    /// An option the command does not accept, or accepts only once.
    #[error("unsupported option for {command}: {option}")]
    UnsupportedOption {
        command: &'static str,
        option: String,
    },

    /// A command that needs at least one of something got none.
    #[error("{command} requires at least one {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    /// A `Reply` accessor was used on the wrong reply shape.
    #[error("unexpected reply: expected {expected}")]
    UnexpectedReply { expected: &'static str },
}

impl RjsError {
    /// The underlying transport error, untouched.
    pub fn transport(&self) -> Option<&ClientError> {
        match self {
            RjsError::Transport(err) => Some(err),
            _ => None,
        }
    }
}
