//! # RESP2 Encoding and Parsing
//!
//! Purpose: Encode client commands and parse server responses while keeping
//! allocations under control.
//!
//! ## Design Principles
//! 1. **State-Free Parsing**: Responses are parsed top-down with minimal state.
//! 2. **Buffer Reuse**: Caller provides buffers to avoid per-call allocations.
//! 3. **Binary-Safe**: Bulk strings are treated as raw bytes.
//! 4. **Fail Fast**: Invalid framing returns protocol errors immediately.

use std::io::BufRead;

use bytes::Bytes;

use crate::error::{ClientError, ClientResult};

/// Largest bulk string accepted from a server, matching the Redis
/// `proto-max-bulk-len` default.
const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

/// Largest element count accepted in one array header.
const MAX_ARRAY_LEN: i64 = 1 << 32;

// Upper bound on array slots reserved before any element arrives.
const ARRAY_PREALLOC: usize = 1024;

/// RESP response value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespValue {
    /// +OK or +PONG style responses.
    Simple(Vec<u8>),
    /// -ERR ... responses.
    Error(Vec<u8>),
    /// :123 responses.
    Integer(i64),
    /// $... bulk strings, with None for null.
    Bulk(Option<Bytes>),
    /// *... arrays, with None for a null array.
    Array(Option<Vec<RespValue>>),
}

/// Encodes `name` followed by `args` as a RESP2 array into the provided buffer.
pub fn encode_command<A: AsRef<[u8]>>(name: &[u8], args: &[A], out: &mut Vec<u8>) {
    out.push(b'*');
    push_usize(out, args.len() + 1);
    out.extend_from_slice(b"\r\n");
    push_bulk(out, name);
    for arg in args {
        push_bulk(out, arg.as_ref());
    }
}

fn push_bulk(out: &mut Vec<u8>, data: &[u8]) {
    out.push(b'$');
    push_usize(out, data.len());
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(data);
    out.extend_from_slice(b"\r\n");
}

/// Reads one RESP value from the buffered reader.
pub fn read_response<R: BufRead>(
    reader: &mut R,
    line_buf: &mut Vec<u8>,
) -> ClientResult<RespValue> {
    read_line(reader, line_buf)?;
    if line_buf.is_empty() {
        return Err(ClientError::Protocol);
    }

    match line_buf[0] {
        b'+' => Ok(RespValue::Simple(line_buf[1..].to_vec())),
        b'-' => Ok(RespValue::Error(line_buf[1..].to_vec())),
        b':' => Ok(RespValue::Integer(parse_i64(&line_buf[1..])?)),
        b'$' => {
            let len = parse_i64(&line_buf[1..])?;
            parse_bulk_len(reader, len, line_buf)
        }
        b'*' => {
            let len = parse_i64(&line_buf[1..])?;
            parse_array_len(reader, len, line_buf)
        }
        _ => Err(ClientError::Protocol),
    }
}

fn parse_bulk_len<R: BufRead>(
    reader: &mut R,
    len: i64,
    line_buf: &mut Vec<u8>,
) -> ClientResult<RespValue> {
    if len < 0 {
        return Ok(RespValue::Bulk(None));
    }
    if len > MAX_BULK_LEN {
        return Err(ClientError::Protocol);
    }
    let mut data = vec![0u8; len as usize];
    reader.read_exact(&mut data)?;

    let mut crlf = [0u8; 2];
    reader.read_exact(&mut crlf)?;
    if crlf != [b'\r', b'\n'] {
        return Err(ClientError::Protocol);
    }

    line_buf.clear();
    Ok(RespValue::Bulk(Some(Bytes::from(data))))
}

fn parse_array_len<R: BufRead>(
    reader: &mut R,
    len: i64,
    line_buf: &mut Vec<u8>,
) -> ClientResult<RespValue> {
    if len < 0 {
        return Ok(RespValue::Array(None));
    }
    if len > MAX_ARRAY_LEN {
        return Err(ClientError::Protocol);
    }

    let mut items = Vec::with_capacity((len as usize).min(ARRAY_PREALLOC));
    for _ in 0..len {
        items.push(read_response(reader, line_buf)?);
    }
    Ok(RespValue::Array(Some(items)))
}

fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> ClientResult<()> {
    buf.clear();
    let bytes = reader.read_until(b'\n', buf)?;
    if bytes == 0 {
        return Err(ClientError::Protocol);
    }
    if buf.len() < 2 || buf[buf.len() - 2] != b'\r' {
        return Err(ClientError::Protocol);
    }
    buf.truncate(buf.len() - 2);
    Ok(())
}

fn parse_i64(data: &[u8]) -> ClientResult<i64> {
    let (negative, digits) = match data.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, data),
    };
    if digits.is_empty() {
        return Err(ClientError::Protocol);
    }

    // Accumulate as a negative number so i64::MIN stays representable.
    let mut value: i64 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return Err(ClientError::Protocol);
        }
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_sub((b - b'0') as i64))
            .ok_or(ClientError::Protocol)?;
    }

    if negative {
        Ok(value)
    } else {
        value.checked_neg().ok_or(ClientError::Protocol)
    }
}

fn push_usize(out: &mut Vec<u8>, mut value: usize) {
    // Digits go into a stack buffer, then out in reverse.
    let mut buf = [0u8; 20];
    let mut len = 0;
    loop {
        buf[len] = b'0' + (value % 10) as u8;
        value /= 10;
        len += 1;
        if value == 0 {
            break;
        }
    }
    out.extend(buf[..len].iter().rev());
}
