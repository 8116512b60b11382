//! # Cluster Client
//!
//! Purpose: Route each command to the node serving its key's hash slot.
//!
//! ## Design Principles
//! 1. **Slot Table**: One owner entry per slot, loaded from `CLUSTER SLOTS`.
//! 2. **Lazy Pools**: Every node gets its own `PooledClient` on first use.
//! 3. **Bounded Redirects**: `MOVED` updates the table, `ASK` is one-shot;
//!    both stop after `max_redirects` hops.
//! 4. **Raw Replies**: Non-redirect error replies are returned untouched.

use std::collections::HashMap;
use std::sync::Arc;

use crc::{Crc, CRC_16_XMODEM};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::client::PooledClient;
use crate::config::{ClientConfig, ClusterConfig};
use crate::error::{ClientError, ClientResult};
use crate::resp::RespValue;

/// The total number of hash slots in a cluster.
pub const NUM_SLOTS: usize = 16384;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Calculates the hash slot for a key.
///
/// When the key contains a non-empty hash tag (`{...}`), only the tag is
/// hashed so related keys can be forced into one slot.
pub fn key_slot(key: &[u8]) -> u16 {
    let hashed = hash_tag(key).unwrap_or(key);
    CRC16.checksum(hashed) % NUM_SLOTS as u16
}

fn hash_tag(key: &[u8]) -> Option<&[u8]> {
    let start = key.iter().position(|&b| b == b'{')?;
    let len = key[start + 1..].iter().position(|&b| b == b'}')?;
    if len == 0 {
        return None;
    }
    Some(&key[start + 1..start + 1 + len])
}

/// Finds the argument that decides routing, if the command has one.
fn routing_key<'a, A: AsRef<[u8]>>(name: &[u8], args: &'a [A]) -> Option<&'a [u8]> {
    const KEYLESS: &[&[u8]] = &[b"PING", b"ECHO", b"INFO", b"CLUSTER", b"ASKING", b"COMMAND"];
    const SUBCOMMAND_FIRST: &[&[u8]] = &[b"JSON.DEBUG", b"OBJECT", b"MEMORY"];

    if KEYLESS.iter().any(|cmd| name.eq_ignore_ascii_case(cmd)) {
        return None;
    }
    let position = if SUBCOMMAND_FIRST.iter().any(|cmd| name.eq_ignore_ascii_case(cmd)) {
        1
    } else {
        0
    };
    args.get(position).map(AsRef::as_ref)
}

#[derive(Debug, PartialEq, Eq)]
enum Redirect {
    Moved { slot: u16, addr: String },
    Ask { addr: String },
}

/// Parses `MOVED <slot> <addr>` / `ASK <slot> <addr>` error replies.
///
/// An address with an empty host (`:7002`) keeps the host of `current`.
fn parse_redirect(message: &[u8], current: &str) -> Option<Redirect> {
    let text = std::str::from_utf8(message).ok()?;
    let mut parts = text.split_ascii_whitespace();
    let kind = parts.next()?;
    let slot: u16 = parts.next()?.parse().ok()?;
    let mut addr = parts.next()?.to_string();
    if addr.starts_with(':') {
        addr = format!("{}{}", host_of(current), addr);
    }
    match kind {
        "MOVED" => Some(Redirect::Moved { slot, addr }),
        "ASK" => Some(Redirect::Ask { addr }),
        _ => None,
    }
}

fn host_of(addr: &str) -> &str {
    addr.rsplit_once(':').map_or(addr, |(host, _)| host)
}

type SlotTable = Vec<Option<Arc<str>>>;

/// Cluster-aware client that routes by key hash slot.
pub struct ClusterClient {
    config: ClusterConfig,
    slots: RwLock<SlotTable>,
    nodes: Mutex<HashMap<Arc<str>, Arc<PooledClient>>>,
}

impl ClusterClient {
    /// Creates the client and loads the slot map from the first seed that answers.
    pub fn connect(config: ClusterConfig) -> ClientResult<Self> {
        let client = ClusterClient {
            config,
            slots: RwLock::new(vec![None; NUM_SLOTS]),
            nodes: Mutex::new(HashMap::new()),
        };
        client.refresh_slots()?;
        Ok(client)
    }

    /// Reloads the whole slot map via `CLUSTER SLOTS`.
    pub fn refresh_slots(&self) -> ClientResult<()> {
        let mut last_error = None;
        for seed in &self.config.seeds {
            let node = self.node(seed);
            match node.exec(b"CLUSTER", &[b"SLOTS"]) {
                Ok(RespValue::Array(Some(entries))) => match parse_slots(&entries, seed) {
                    Ok(table) => {
                        let served = table.iter().filter(|owner| owner.is_some()).count();
                        *self.slots.write() = table;
                        debug!(seed = %seed, served, "loaded cluster slot map");
                        return Ok(());
                    }
                    Err(err) => {
                        warn!(seed = %seed, "malformed CLUSTER SLOTS reply");
                        last_error = Some(err.to_string());
                    }
                },
                Ok(RespValue::Error(message)) => {
                    last_error = Some(String::from_utf8_lossy(&message).into_owned());
                }
                Ok(_) => last_error = Some("unexpected CLUSTER SLOTS reply".to_string()),
                Err(err) => last_error = Some(err.to_string()),
            }
        }
        Err(ClientError::ClusterDown(
            last_error.unwrap_or_else(|| "no seed nodes configured".to_string()),
        ))
    }

    /// Address currently recorded as the owner of `slot`.
    pub fn slot_owner(&self, slot: u16) -> Option<String> {
        self.slots
            .read()
            .get(slot as usize)
            .and_then(|owner| owner.as_deref().map(str::to_string))
    }

    /// Executes one command on the node owning its key and returns the raw reply.
    pub fn exec<A: AsRef<[u8]>>(&self, name: &[u8], args: &[A]) -> ClientResult<RespValue> {
        let mut addr = match routing_key(name, args) {
            Some(key) => self.owner_of(key_slot(key))?,
            None => self.any_node()?,
        };
        let mut asking = false;

        for _ in 0..=self.config.max_redirects {
            let node = self.node(&addr);
            let response = if asking {
                node.exec_asking(name, args)?
            } else {
                node.exec(name, args)?
            };

            let redirect = match &response {
                RespValue::Error(message) => parse_redirect(message, &addr),
                _ => None,
            };
            let Some(redirect) = redirect else {
                return Ok(response);
            };

            match redirect {
                Redirect::Moved { slot, addr: target } => {
                    debug!(slot, from = %addr, to = %target, "following MOVED");
                    let target: Arc<str> = target.into();
                    if let Some(owner) = self.slots.write().get_mut(slot as usize) {
                        *owner = Some(target.clone());
                    }
                    addr = target;
                    asking = false;
                }
                Redirect::Ask { addr: target } => {
                    debug!(from = %addr, to = %target, "following ASK");
                    addr = target.into();
                    asking = true;
                }
            }
        }

        Err(ClientError::TooManyRedirects(self.config.max_redirects))
    }

    fn owner_of(&self, slot: u16) -> ClientResult<Arc<str>> {
        self.slots.read()[slot as usize]
            .clone()
            .ok_or_else(|| ClientError::ClusterDown(format!("slot {slot} is not served")))
    }

    fn any_node(&self) -> ClientResult<Arc<str>> {
        if let Some(owner) = self.slots.read().iter().flatten().next() {
            return Ok(owner.clone());
        }
        self.config
            .seeds
            .first()
            .map(|seed| Arc::from(seed.as_str()))
            .ok_or_else(|| ClientError::ClusterDown("no seed nodes configured".to_string()))
    }

    fn node(&self, addr: &str) -> Arc<PooledClient> {
        let mut nodes = self.nodes.lock();
        if let Some(node) = nodes.get(addr) {
            return node.clone();
        }
        let config = ClientConfig {
            addr: addr.to_string(),
            ..self.config.node.clone()
        };
        let node = Arc::new(PooledClient::with_config(config));
        nodes.insert(Arc::from(addr), node.clone());
        node
    }
}

/// Builds a slot table from a `CLUSTER SLOTS` reply.
///
/// Each entry is `[start, end, [host, port, ...], replicas...]`; only the
/// primary is used. An empty host means "same host as the node asked".
fn parse_slots(entries: &[RespValue], asked: &str) -> ClientResult<SlotTable> {
    let mut table = vec![None; NUM_SLOTS];
    for entry in entries {
        let RespValue::Array(Some(fields)) = entry else {
            return Err(ClientError::Protocol);
        };
        let (start, end, primary) = match fields.as_slice() {
            [
                RespValue::Integer(start),
                RespValue::Integer(end),
                RespValue::Array(Some(primary)),
                ..
            ] => (*start, *end, primary),
            _ => return Err(ClientError::Protocol),
        };
        if start < 0 || end < start || end >= NUM_SLOTS as i64 {
            return Err(ClientError::Protocol);
        }
        let addr: Arc<str> = match primary.as_slice() {
            [RespValue::Bulk(Some(host)), RespValue::Integer(port), ..] => {
                let host = String::from_utf8_lossy(host);
                let host = if host.is_empty() { host_of(asked).into() } else { host };
                format!("{host}:{port}").into()
            }
            _ => return Err(ClientError::Protocol),
        };
        for owner in &mut table[start as usize..=end as usize] {
            *owner = Some(addr.clone());
        }
    }
    Ok(table)
}
