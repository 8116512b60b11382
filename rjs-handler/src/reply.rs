//! Raw store replies, passed through without JSON decoding.

use bytes::Bytes;
use rjs_client::{ClientError, ClientResult, RespValue};

use crate::error::{RjsError, RjsResult};

/// A reply from the store.
///
/// `Bulk` payloads of read commands hold JSON text exactly as the store sent
/// it; turning that into a typed value is left to the caller. `Nil` is a
/// successful "absent" result (missing key or path), not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Simple status text such as `OK` or a `JSON.TYPE` name.
    Status(String),
    /// Counts, lengths, indices, sizes.
    Integer(i64),
    /// Binary-safe payload, usually serialized JSON.
    Bulk(Bytes),
    /// Null bulk or null array.
    Nil,
    /// Multi-value replies (`JSON.MGET`, `JSON.OBJKEYS`, ...).
    Array(Vec<Reply>),
}

impl Reply {
    /// Converts a wire value, turning error replies into [`ClientError::Server`].
    pub(crate) fn from_resp(value: RespValue) -> ClientResult<Self> {
        Ok(match value {
            RespValue::Simple(text) => Reply::Status(String::from_utf8_lossy(&text).into_owned()),
            RespValue::Error(message) => {
                return Err(ClientError::Server {
                    message: String::from_utf8_lossy(&message).into_owned(),
                })
            }
            RespValue::Integer(value) => Reply::Integer(value),
            RespValue::Bulk(Some(data)) => Reply::Bulk(data),
            RespValue::Bulk(None) | RespValue::Array(None) => Reply::Nil,
            RespValue::Array(Some(items)) => Reply::Array(
                items
                    .into_iter()
                    .map(Reply::from_resp)
                    .collect::<ClientResult<_>>()?,
            ),
        })
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Nil)
    }

    /// Payload bytes of a bulk or status reply.
    pub fn as_bytes(&self) -> RjsResult<&[u8]> {
        match self {
            Reply::Bulk(data) => Ok(&data[..]),
            Reply::Status(text) => Ok(text.as_bytes()),
            _ => Err(RjsError::UnexpectedReply {
                expected: "bulk or status",
            }),
        }
    }

    /// Payload of a bulk or status reply as UTF-8 text.
    pub fn as_str(&self) -> RjsResult<&str> {
        std::str::from_utf8(self.as_bytes()?).map_err(|_| RjsError::UnexpectedReply {
            expected: "UTF-8 text",
        })
    }

    pub fn as_integer(&self) -> RjsResult<i64> {
        match self {
            Reply::Integer(value) => Ok(*value),
            _ => Err(RjsError::UnexpectedReply { expected: "integer" }),
        }
    }

    pub fn into_array(self) -> RjsResult<Vec<Reply>> {
        match self {
            Reply::Array(items) => Ok(items),
            _ => Err(RjsError::UnexpectedReply { expected: "array" }),
        }
    }
}
