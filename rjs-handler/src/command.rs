//! # Command Builder
//!
//! Purpose: Turn one logical JSON operation into the verb and ordered
//! argument list the store expects.
//!
//! ## Design Principles
//! 1. **Faithful Transcription**: Indices and numbers go out as given; range
//!    checks belong to the store, which knows the real array length.
//! 2. **Encode Up Front**: Payloads are serialized while building, so an
//!    unencodable value never reaches a transport.
//! 3. **Fixed Order**: Tokens follow the documented grammar of each command.

use bytes::Bytes;
use serde::Serialize;

use crate::codec;
use crate::error::{RjsError, RjsResult};
use crate::options::{
    encode_get_options, DebugSubcommand, GetOption, PopTarget, SearchRange, SetCondition,
};

/// A ready-to-send command: verb plus ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: &'static str,
    args: Vec<Bytes>,
}

impl Command {
    fn new(name: &'static str) -> Self {
        Command {
            name,
            args: Vec::new(),
        }
    }

    fn keyed(name: &'static str, key: &str, path: &str) -> Self {
        Command::new(name).arg(key).arg(path)
    }

    fn arg(mut self, token: &str) -> Self {
        self.args.push(Bytes::copy_from_slice(token.as_bytes()));
        self
    }

    fn int(mut self, value: i64) -> Self {
        self.args.push(Bytes::from(value.to_string()));
        self
    }

    fn json<T: Serialize + ?Sized>(mut self, value: &T) -> RjsResult<Self> {
        self.args.push(codec::encode(value)?);
        Ok(self)
    }

    fn json_all<T: Serialize>(mut self, values: &[T], argument: &'static str) -> RjsResult<Self> {
        if values.is_empty() {
            return Err(RjsError::MissingArgument {
                command: self.name,
                argument,
            });
        }
        for value in values {
            self = self.json(value)?;
        }
        Ok(self)
    }

    /// The command verb, e.g. `JSON.SET`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Arguments after the verb, in wire order.
    pub fn args(&self) -> &[Bytes] {
        &self.args
    }

    /// `JSON.SET key path json [NX|XX]`
    pub fn set<T: Serialize + ?Sized>(
        key: &str,
        path: &str,
        value: &T,
        condition: SetCondition,
    ) -> RjsResult<Self> {
        let cmd = Command::keyed("JSON.SET", key, path).json(value)?;
        Ok(match condition.token() {
            Some(token) => cmd.arg(token),
            None => cmd,
        })
    }

    /// `JSON.GET key [INDENT s] [NEWLINE s] [SPACE s] [NOESCAPE] path...`
    ///
    /// With no paths the store answers for the root.
    pub fn get(key: &str, paths: &[&str], options: &[GetOption]) -> RjsResult<Self> {
        let mut cmd = Command::new("JSON.GET").arg(key);
        cmd.args.extend(encode_get_options(options)?);
        Ok(paths.iter().fold(cmd, |cmd, path| cmd.arg(path)))
    }

    /// `JSON.MGET key... path`
    pub fn mget(keys: &[&str], path: &str) -> RjsResult<Self> {
        if keys.is_empty() {
            return Err(RjsError::MissingArgument {
                command: "JSON.MGET",
                argument: "key",
            });
        }
        let cmd = keys.iter().fold(Command::new("JSON.MGET"), |cmd, key| cmd.arg(key));
        Ok(cmd.arg(path))
    }

    /// `JSON.DEL key path`
    pub fn del(key: &str, path: &str) -> Self {
        Command::keyed("JSON.DEL", key, path)
    }

    /// `JSON.FORGET key path`, an alias of `JSON.DEL`.
    pub fn forget(key: &str, path: &str) -> Self {
        Command::keyed("JSON.FORGET", key, path)
    }

    /// `JSON.TYPE key path`
    pub fn type_of(key: &str, path: &str) -> Self {
        Command::keyed("JSON.TYPE", key, path)
    }

    /// `JSON.CLEAR key path`
    pub fn clear(key: &str, path: &str) -> Self {
        Command::keyed("JSON.CLEAR", key, path)
    }

    /// `JSON.TOGGLE key path`
    pub fn toggle(key: &str, path: &str) -> Self {
        Command::keyed("JSON.TOGGLE", key, path)
    }

    /// `JSON.RESP key path`
    pub fn resp(key: &str, path: &str) -> Self {
        Command::keyed("JSON.RESP", key, path)
    }

    /// `JSON.NUMINCRBY key path number`
    pub fn num_incr_by<N>(key: &str, path: &str, number: &N) -> RjsResult<Self>
    where
        N: Serialize + ?Sized,
    {
        Command::keyed("JSON.NUMINCRBY", key, path).json(number)
    }

    /// `JSON.NUMMULTBY key path number`
    pub fn num_mult_by<N>(key: &str, path: &str, number: &N) -> RjsResult<Self>
    where
        N: Serialize + ?Sized,
    {
        Command::keyed("JSON.NUMMULTBY", key, path).json(number)
    }

    /// `JSON.STRAPPEND key path "text"`; the text is sent as a JSON string.
    pub fn str_append(key: &str, path: &str, text: &str) -> RjsResult<Self> {
        Command::keyed("JSON.STRAPPEND", key, path).json(text)
    }

    /// `JSON.STRLEN key path`
    pub fn str_len(key: &str, path: &str) -> Self {
        Command::keyed("JSON.STRLEN", key, path)
    }

    /// `JSON.ARRAPPEND key path json...`
    pub fn arr_append<T: Serialize>(key: &str, path: &str, values: &[T]) -> RjsResult<Self> {
        Command::keyed("JSON.ARRAPPEND", key, path).json_all(values, "value")
    }

    /// `JSON.ARRINSERT key path index json...`
    pub fn arr_insert<T: Serialize>(
        key: &str,
        path: &str,
        index: i64,
        values: &[T],
    ) -> RjsResult<Self> {
        Command::keyed("JSON.ARRINSERT", key, path)
            .int(index)
            .json_all(values, "value")
    }

    /// `JSON.ARRINDEX key path json [start [stop]]`
    pub fn arr_index<T: Serialize + ?Sized>(
        key: &str,
        path: &str,
        value: &T,
        range: SearchRange,
    ) -> RjsResult<Self> {
        let cmd = Command::keyed("JSON.ARRINDEX", key, path).json(value)?;
        Ok(range.bounds().into_iter().fold(cmd, Command::int))
    }

    /// `JSON.ARRLEN key path`
    pub fn arr_len(key: &str, path: &str) -> Self {
        Command::keyed("JSON.ARRLEN", key, path)
    }

    /// `JSON.ARRPOP key path [index]`
    pub fn arr_pop(key: &str, path: &str, target: PopTarget) -> Self {
        let cmd = Command::keyed("JSON.ARRPOP", key, path);
        match target.index() {
            Some(index) => cmd.int(index),
            None => cmd,
        }
    }

    /// `JSON.ARRTRIM key path start stop`
    pub fn arr_trim(key: &str, path: &str, start: i64, stop: i64) -> Self {
        Command::keyed("JSON.ARRTRIM", key, path).int(start).int(stop)
    }

    /// `JSON.OBJKEYS key path`
    pub fn obj_keys(key: &str, path: &str) -> Self {
        Command::keyed("JSON.OBJKEYS", key, path)
    }

    /// `JSON.OBJLEN key path`
    pub fn obj_len(key: &str, path: &str) -> Self {
        Command::keyed("JSON.OBJLEN", key, path)
    }

    /// `JSON.DEBUG HELP` or `JSON.DEBUG MEMORY key path`
    pub fn debug(subcommand: DebugSubcommand, key: &str, path: &str) -> Self {
        let cmd = Command::new("JSON.DEBUG").arg(subcommand.keyword());
        match subcommand {
            DebugSubcommand::Help => cmd,
            DebugSubcommand::Memory => cmd.arg(key).arg(path),
        }
    }
}
