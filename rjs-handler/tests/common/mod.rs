#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use rjs_handler::{ClientError, ClientResult, Reply, Transport};
use serde_json::Value;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

type Responder = Box<dyn Fn() -> ClientResult<Reply> + Send + Sync>;

/// Records every command and answers with a fixed reply.
pub struct Spy {
    calls: Mutex<Vec<(String, Vec<Bytes>)>>,
    respond: Responder,
}

impl Spy {
    /// Answers every command with `Status(label)`.
    pub fn labelled(label: &'static str) -> Self {
        Spy {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(move || Ok(Reply::Status(label.to_string()))),
        }
    }

    pub fn failing(make: fn() -> ClientError) -> Self {
        Spy {
            calls: Mutex::new(Vec::new()),
            respond: Box::new(move || Err(make())),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<Bytes>)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl Transport for Spy {
    fn execute(&self, name: &str, args: &[Bytes]) -> ClientResult<Reply> {
        self.calls.lock().push((name.to_string(), args.to_vec()));
        (self.respond)()
    }
}

/// Minimal in-process JSON store that understands dotted object paths
/// ("." for the root, ".a.b" below it).
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<String, Value>>,
}

fn server_error(message: impl Into<String>) -> ClientError {
    ClientError::Server {
        message: message.into(),
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('.').filter(|segment| !segment.is_empty()).collect()
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    segments(path).into_iter().try_fold(root, |value, segment| value.get(segment))
}

fn lookup_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    segments(path)
        .into_iter()
        .try_fold(root, |value, segment| value.get_mut(segment))
}

fn parse_json(raw: &str) -> ClientResult<Value> {
    serde_json::from_str(raw).map_err(|_| server_error("ERR invalid JSON"))
}

fn parse_all(raw: &[String]) -> ClientResult<Vec<Value>> {
    raw.iter().map(|item| parse_json(item)).collect()
}

fn parse_int(raw: &str) -> ClientResult<i64> {
    raw.parse().map_err(|_| server_error("ERR not an integer"))
}

fn bulk(value: &Value) -> Reply {
    Reply::Bulk(Bytes::from(value.to_string()))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Clamps an index into `0..=len`, counting negatives from the end.
fn normalize(index: i64, len: usize) -> usize {
    let len = len as i64;
    let index = if index < 0 { len + index } else { index };
    index.clamp(0, len) as usize
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn with_value<R>(
        &self,
        key: &str,
        path: &str,
        f: impl FnOnce(&mut Value) -> ClientResult<R>,
    ) -> ClientResult<Option<R>> {
        let mut docs = self.docs.lock();
        let Some(root) = docs.get_mut(key) else {
            return Ok(None);
        };
        let value = lookup_mut(root, path)
            .ok_or_else(|| server_error(format!("ERR Path '{path}' does not exist")))?;
        f(value).map(Some)
    }

    fn with_array<R>(
        &self,
        key: &str,
        path: &str,
        f: impl FnOnce(&mut Vec<Value>) -> ClientResult<R>,
    ) -> ClientResult<Option<R>> {
        self.with_value(key, path, |value| match value {
            Value::Array(items) => f(items),
            _ => Err(server_error("WRONGTYPE not an array")),
        })
    }

    fn set(
        &self,
        key: &str,
        path: &str,
        raw: &str,
        condition: Option<&str>,
    ) -> ClientResult<Reply> {
        let value = parse_json(raw)?;
        let mut docs = self.docs.lock();
        let exists = docs.get(key).and_then(|root| lookup(root, path)).is_some();
        match condition {
            Some("NX") if exists => return Ok(Reply::Nil),
            Some("XX") if !exists => return Ok(Reply::Nil),
            _ => {}
        }

        let parts = segments(path);
        let Some((last, parents)) = parts.split_last() else {
            docs.insert(key.to_string(), value);
            return Ok(Reply::Status("OK".to_string()));
        };
        let root = docs
            .get_mut(key)
            .ok_or_else(|| server_error("ERR new objects must be created at the root"))?;
        let parent = parents
            .iter()
            .try_fold(root, |value, segment| value.get_mut(*segment))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| server_error(format!("ERR Path '{path}' does not exist")))?;
        parent.insert(last.to_string(), value);
        Ok(Reply::Status("OK".to_string()))
    }

    fn get(&self, args: &[String]) -> ClientResult<Reply> {
        let key = &args[0];
        let mut rest = args[1..].iter();
        let mut paths = Vec::new();
        while let Some(arg) = rest.next() {
            match arg.as_str() {
                "INDENT" | "NEWLINE" | "SPACE" => {
                    rest.next();
                }
                "NOESCAPE" => {}
                path => paths.push(path),
            }
        }
        let docs = self.docs.lock();
        let Some(root) = docs.get(key) else {
            return Ok(Reply::Nil);
        };
        let path = paths.first().copied().unwrap_or(".");
        lookup(root, path)
            .map(bulk)
            .ok_or_else(|| server_error(format!("ERR Path '{path}' does not exist")))
    }

    fn dispatch(&self, name: &str, args: &[String]) -> ClientResult<Reply> {
        let reply = |found: Option<Reply>| found.unwrap_or(Reply::Nil);
        match name {
            "JSON.SET" => self.set(&args[0], &args[1], &args[2], args.get(3).map(String::as_str)),
            "JSON.GET" => self.get(args),
            "JSON.MGET" => {
                let (path, keys) = args.split_last().ok_or_else(|| server_error("ERR arity"))?;
                let docs = self.docs.lock();
                let items = keys
                    .iter()
                    .map(|key| {
                        docs.get(key)
                            .and_then(|root| lookup(root, path))
                            .map_or(Reply::Nil, bulk)
                    })
                    .collect();
                Ok(Reply::Array(items))
            }
            "JSON.DEL" | "JSON.FORGET" => {
                let mut docs = self.docs.lock();
                let parts = segments(&args[1]);
                let removed = match parts.split_last() {
                    None => docs.remove(&args[0]).is_some(),
                    Some((last, parents)) => docs
                        .get_mut(&args[0])
                        .and_then(|root| parents.iter().try_fold(root, |v, s| v.get_mut(*s)))
                        .and_then(Value::as_object_mut)
                        .and_then(|parent| parent.remove(*last))
                        .is_some(),
                };
                Ok(Reply::Integer(removed as i64))
            }
            "JSON.TYPE" => {
                let docs = self.docs.lock();
                Ok(docs
                    .get(&args[0])
                    .and_then(|root| lookup(root, &args[1]))
                    .map_or(Reply::Nil, |value| Reply::Status(type_name(value).to_string())))
            }
            "JSON.NUMINCRBY" | "JSON.NUMMULTBY" => {
                let by = parse_json(&args[2])?;
                let multiply = name == "JSON.NUMMULTBY";
                self.with_value(&args[0], &args[1], |value| {
                    let current = value
                        .as_i64()
                        .ok_or_else(|| server_error("WRONGTYPE not a number"))?;
                    let by = by.as_i64().ok_or_else(|| server_error("ERR not an integer"))?;
                    *value = Value::from(if multiply { current * by } else { current + by });
                    Ok(bulk(value))
                })
                .map(reply)
            }
            "JSON.STRAPPEND" => {
                let suffix = parse_json(&args[2])?;
                let suffix = suffix
                    .as_str()
                    .ok_or_else(|| server_error("ERR expected a string"))?
                    .to_string();
                self.with_value(&args[0], &args[1], |value| match value {
                    Value::String(text) => {
                        text.push_str(&suffix);
                        Ok(Reply::Integer(text.len() as i64))
                    }
                    _ => Err(server_error("WRONGTYPE not a string")),
                })
                .map(reply)
            }
            "JSON.STRLEN" => self
                .with_value(&args[0], &args[1], |value| match value {
                    Value::String(text) => Ok(Reply::Integer(text.len() as i64)),
                    _ => Err(server_error("WRONGTYPE not a string")),
                })
                .map(reply),
            "JSON.ARRLEN" => self
                .with_array(&args[0], &args[1], |items| Ok(Reply::Integer(items.len() as i64)))
                .map(reply),
            "JSON.ARRAPPEND" => {
                let values = parse_all(&args[2..])?;
                self.with_array(&args[0], &args[1], |items| {
                    items.extend(values);
                    Ok(Reply::Integer(items.len() as i64))
                })
                .map(reply)
            }
            "JSON.ARRINSERT" => {
                let index = parse_int(&args[2])?;
                let values = parse_all(&args[3..])?;
                self.with_array(&args[0], &args[1], |items| {
                    let at = normalize(index, items.len());
                    items.splice(at..at, values);
                    Ok(Reply::Integer(items.len() as i64))
                })
                .map(reply)
            }
            "JSON.ARRINDEX" => {
                let needle = parse_json(&args[2])?;
                let start = args.get(3).map(|raw| parse_int(raw)).transpose()?.unwrap_or(0);
                let stop = args.get(4).map(|raw| parse_int(raw)).transpose()?.unwrap_or(0);
                self.with_array(&args[0], &args[1], |items| {
                    let len = items.len();
                    let from = normalize(start, len);
                    let to = if stop == 0 { len } else { normalize(stop, len) };
                    let found = (from..to.max(from)).find(|&idx| items[idx] == needle);
                    Ok(Reply::Integer(found.map_or(-1, |idx| idx as i64)))
                })
                .map(reply)
            }
            "JSON.ARRPOP" => {
                let index = args.get(2).map(|raw| parse_int(raw)).transpose()?.unwrap_or(-1);
                self.with_array(&args[0], &args[1], |items| {
                    if items.is_empty() {
                        return Err(server_error("ERR array index out of range"));
                    }
                    let at = normalize(index, items.len()).min(items.len() - 1);
                    Ok(bulk(&items.remove(at)))
                })
                .map(reply)
            }
            "JSON.ARRTRIM" => {
                let start = parse_int(&args[2])?;
                let stop = parse_int(&args[3])?;
                self.with_array(&args[0], &args[1], |items| {
                    let len = items.len();
                    let from = normalize(start, len);
                    // Stop is inclusive.
                    let last = if stop < 0 { len as i64 + stop } else { stop.min(len as i64 - 1) };
                    *items = if from < len && last >= from as i64 {
                        items[from..=last as usize].to_vec()
                    } else {
                        Vec::new()
                    };
                    Ok(Reply::Integer(items.len() as i64))
                })
                .map(reply)
            }
            "JSON.OBJKEYS" | "JSON.OBJLEN" => {
                let keys_only = name == "JSON.OBJKEYS";
                self.with_value(&args[0], &args[1], |value| {
                    let object = value
                        .as_object()
                        .ok_or_else(|| server_error("WRONGTYPE not an object"))?;
                    Ok(if keys_only {
                        let keys = object.keys().map(|k| Reply::Bulk(Bytes::from(k.clone())));
                        Reply::Array(keys.collect())
                    } else {
                        Reply::Integer(object.len() as i64)
                    })
                })
                .map(reply)
            }
            "JSON.DEBUG" => match args[0].as_str() {
                "HELP" => Ok(Reply::Array(vec![Reply::Status("MEMORY <key> [path]".to_string())])),
                "MEMORY" => self
                    .with_value(&args[1], &args[2], |value| {
                        Ok(Reply::Integer(value.to_string().len() as i64))
                    })
                    .map(|found| found.unwrap_or(Reply::Integer(0))),
                other => Err(server_error(format!("ERR unknown subcommand '{other}'"))),
            },
            other => Err(server_error(format!("ERR unknown command '{other}'"))),
        }
    }
}

impl Transport for MemoryStore {
    fn execute(&self, name: &str, args: &[Bytes]) -> ClientResult<Reply> {
        let args: Vec<String> = args
            .iter()
            .map(|arg| String::from_utf8_lossy(arg).into_owned())
            .collect();
        self.dispatch(name, &args)
    }
}

/// Accepts one connection, reads one request, and answers with `reply`.
pub fn canned_server(reply: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr").to_string();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
        let mut buf = [0u8; 1024];
        let _ = stream.read(&mut buf);
        let _ = stream.write_all(reply);
        let _ = stream.flush();
    });
    addr
}

/// Serves one connection, answering each request with the next scripted reply.
///
/// `script` receives the bound address so replies can point back at it.
/// Returns the address and the raw requests seen so far.
pub fn scripted_server<F>(script: F) -> (String, Arc<Mutex<Vec<Vec<u8>>>>)
where
    F: FnOnce(&str) -> Vec<Vec<u8>>,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr").to_string();
    let replies = script(&addr);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
        let mut buf = [0u8; 1024];
        for reply in replies {
            let Ok(read) = stream.read(&mut buf) else {
                return;
            };
            if read == 0 {
                return;
            }
            log.lock().push(buf[..read].to_vec());
            let _ = stream.write_all(&reply);
            let _ = stream.flush();
        }
    });
    (addr, seen)
}
