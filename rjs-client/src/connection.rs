//! # TCP Connection
//!
//! A single blocking RESP2 connection with reusable buffers. Both the pool
//! and the single-node client are built on this type.

use std::io::{BufReader, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::resp::{encode_command, read_response, RespValue};

/// Single TCP connection with reusable buffers.
///
/// The buffers are stored on the connection to avoid per-call allocations.
pub(crate) struct Connection {
    // Buffered reader reduces syscalls while still allowing direct writes.
    reader: BufReader<TcpStream>,
    line_buf: Vec<u8>,
    write_buf: Vec<u8>,
}

impl Connection {
    pub(crate) fn connect(config: &ClientConfig) -> ClientResult<Self> {
        let stream = connect_stream(config)?;
        if let Some(timeout) = config.read_timeout {
            stream.set_read_timeout(Some(timeout))?;
        }
        if let Some(timeout) = config.write_timeout {
            stream.set_write_timeout(Some(timeout))?;
        }
        // Disable Nagle to keep request latency low for small payloads.
        stream.set_nodelay(true)?;
        debug!(addr = %config.addr, "connected");

        Ok(Connection {
            reader: BufReader::new(stream),
            line_buf: Vec::with_capacity(128),
            write_buf: Vec::with_capacity(256),
        })
    }

    /// Writes one command and reads exactly one reply.
    pub(crate) fn exec<A: AsRef<[u8]>>(
        &mut self,
        name: &[u8],
        args: &[A],
    ) -> ClientResult<RespValue> {
        self.write_buf.clear();
        encode_command(name, args, &mut self.write_buf);

        let stream = self.reader.get_mut();
        stream.write_all(&self.write_buf)?;
        stream.flush()?;

        read_response(&mut self.reader, &mut self.line_buf)
    }
}

fn connect_stream(config: &ClientConfig) -> ClientResult<TcpStream> {
    let addr = resolve(&config.addr)?;
    let stream = match config.connect_timeout {
        Some(timeout) => TcpStream::connect_timeout(&addr, timeout)?,
        None => TcpStream::connect(addr)?,
    };
    Ok(stream)
}

fn resolve(addr: &str) -> ClientResult<SocketAddr> {
    addr.to_socket_addrs()
        .map_err(|_| ClientError::InvalidAddress)?
        .next()
        .ok_or(ClientError::InvalidAddress)
}
