//! Value codec for the write path.
//!
//! Only encoding lives here. Read replies are handed back as raw bytes and
//! the caller picks the shape to decode into.

use bytes::Bytes;
use serde::Serialize;

use crate::error::RjsResult;

/// Serializes `value` into the JSON text sent as a command argument.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> RjsResult<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}
