//! # Handler
//!
//! Purpose: Expose every JSON command as one method and route it through
//! the currently bound transport.
//!
//! ## Design Principles
//! 1. **Facade Pattern**: Callers see typed methods; building and dispatch stay hidden.
//! 2. **Atomic Rebinding**: The client tag and the transport live in one enum
//!    behind one lock, so they always change together.
//! 3. **Short Critical Sections**: The lock is held only to clone the `Arc`;
//!    network calls run unlocked, and rebinding never waits on them.
//! 4. **Check Binding First**: An unbound handler fails before any building or IO.

use std::sync::Arc;

use parking_lot::RwLock;
use rjs_client::{ClusterClient, PooledClient, SingleClient};
use serde::Serialize;
use tracing::{debug, trace};

use crate::command::Command;
use crate::error::{RjsError, RjsResult};
use crate::options::{DebugSubcommand, GetOption, PopTarget, SearchRange, SetCondition};
use crate::reply::Reply;
use crate::transport::Transport;

/// Which kind of client a handler is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    Inactive,
    Single,
    Pooled,
    Cluster,
    /// A caller-provided [`Transport`].
    Custom,
}

enum Binding {
    Inactive,
    Active {
        kind: ClientKind,
        transport: Arc<dyn Transport>,
    },
}

/// Entry point for JSON commands.
///
/// A handler starts inactive. Bind a client with one of the `set_*_client`
/// methods; rebinding replaces the previous client and
/// [`set_client_inactive`](Handler::set_client_inactive) releases it. The
/// handler only holds an `Arc`: the caller keeps ownership of the client and
/// its connections.
///
/// All methods take `&self`, so a handler can be shared across threads.
/// A call that starts after a rebind uses the new client.
pub struct Handler {
    binding: RwLock<Binding>,
}

impl Default for Handler {
    fn default() -> Self {
        Handler::new()
    }
}

impl Handler {
    /// Creates an inactive handler.
    pub fn new() -> Self {
        Handler {
            binding: RwLock::new(Binding::Inactive),
        }
    }

    /// The kind of client currently bound.
    pub fn client_kind(&self) -> ClientKind {
        match &*self.binding.read() {
            Binding::Inactive => ClientKind::Inactive,
            Binding::Active { kind, .. } => *kind,
        }
    }

    /// Binds a single blocking connection.
    pub fn set_single_client(&self, client: Arc<SingleClient>) {
        self.bind(ClientKind::Single, client);
    }

    /// Binds a pooled client.
    pub fn set_pooled_client(&self, client: Arc<PooledClient>) {
        self.bind(ClientKind::Pooled, client);
    }

    /// Binds a cluster-aware client.
    pub fn set_cluster_client(&self, client: Arc<ClusterClient>) {
        self.bind(ClientKind::Cluster, client);
    }

    /// Binds any other transport.
    pub fn set_custom_client(&self, transport: Arc<dyn Transport>) {
        self.bind(ClientKind::Custom, transport);
    }

    /// Unbinds the current client. Later calls fail with
    /// [`RjsError::NoActiveClient`] until a client is bound again.
    pub fn set_client_inactive(&self) {
        *self.binding.write() = Binding::Inactive;
        debug!("client unbound");
    }

    fn bind(&self, kind: ClientKind, transport: Arc<dyn Transport>) {
        *self.binding.write() = Binding::Active { kind, transport };
        debug!(?kind, "client bound");
    }

    fn active(&self) -> RjsResult<Arc<dyn Transport>> {
        match &*self.binding.read() {
            Binding::Inactive => Err(RjsError::NoActiveClient),
            Binding::Active { transport, .. } => Ok(transport.clone()),
        }
    }

    /// Sends an already built command through the bound client.
    pub fn execute(&self, command: &Command) -> RjsResult<Reply> {
        let transport = self.active()?;
        dispatch(transport.as_ref(), command)
    }

    fn run<F>(&self, build: F) -> RjsResult<Reply>
    where
        F: FnOnce() -> RjsResult<Command>,
    {
        let transport = self.active()?;
        let command = build()?;
        dispatch(transport.as_ref(), &command)
    }

    /// `JSON.SET key path value`
    pub fn json_set<T>(&self, key: &str, path: &str, value: &T) -> RjsResult<Reply>
    where
        T: Serialize + ?Sized,
    {
        self.json_set_with(key, path, value, SetCondition::Always)
    }

    /// `JSON.SET key path value [NX|XX]`
    ///
    /// A write skipped by the condition comes back as [`Reply::Nil`].
    pub fn json_set_with<T: Serialize + ?Sized>(
        &self,
        key: &str,
        path: &str,
        value: &T,
        condition: SetCondition,
    ) -> RjsResult<Reply> {
        self.run(|| Command::set(key, path, value, condition))
    }

    /// `JSON.GET key path`; the reply is the raw JSON text.
    pub fn json_get(&self, key: &str, path: &str) -> RjsResult<Reply> {
        self.json_get_with(key, &[path], &[])
    }

    /// `JSON.GET` with several paths and formatting options.
    pub fn json_get_with(
        &self,
        key: &str,
        paths: &[&str],
        options: &[GetOption],
    ) -> RjsResult<Reply> {
        self.run(|| Command::get(key, paths, options))
    }

    /// `JSON.MGET key... path`
    pub fn json_mget(&self, keys: &[&str], path: &str) -> RjsResult<Reply> {
        self.run(|| Command::mget(keys, path))
    }

    /// `JSON.DEL key path`
    pub fn json_del(&self, key: &str, path: &str) -> RjsResult<Reply> {
        self.run(|| Ok(Command::del(key, path)))
    }

    /// `JSON.FORGET key path`
    pub fn json_forget(&self, key: &str, path: &str) -> RjsResult<Reply> {
        self.run(|| Ok(Command::forget(key, path)))
    }

    /// `JSON.TYPE key path`
    pub fn json_type(&self, key: &str, path: &str) -> RjsResult<Reply> {
        self.run(|| Ok(Command::type_of(key, path)))
    }

    /// `JSON.CLEAR key path`
    pub fn json_clear(&self, key: &str, path: &str) -> RjsResult<Reply> {
        self.run(|| Ok(Command::clear(key, path)))
    }

    /// `JSON.TOGGLE key path`
    pub fn json_toggle(&self, key: &str, path: &str) -> RjsResult<Reply> {
        self.run(|| Ok(Command::toggle(key, path)))
    }

    /// `JSON.RESP key path`
    pub fn json_resp(&self, key: &str, path: &str) -> RjsResult<Reply> {
        self.run(|| Ok(Command::resp(key, path)))
    }

    /// `JSON.NUMINCRBY key path number`
    pub fn json_num_incr_by<N>(&self, key: &str, path: &str, number: &N) -> RjsResult<Reply>
    where
        N: Serialize + ?Sized,
    {
        self.run(|| Command::num_incr_by(key, path, number))
    }

    /// `JSON.NUMMULTBY key path number`
    pub fn json_num_mult_by<N>(&self, key: &str, path: &str, number: &N) -> RjsResult<Reply>
    where
        N: Serialize + ?Sized,
    {
        self.run(|| Command::num_mult_by(key, path, number))
    }

    /// `JSON.STRAPPEND key path text`
    pub fn json_str_append(&self, key: &str, path: &str, text: &str) -> RjsResult<Reply> {
        self.run(|| Command::str_append(key, path, text))
    }

    /// `JSON.STRLEN key path`
    pub fn json_str_len(&self, key: &str, path: &str) -> RjsResult<Reply> {
        self.run(|| Ok(Command::str_len(key, path)))
    }

    /// `JSON.ARRAPPEND key path value...`
    pub fn json_arr_append<T>(&self, key: &str, path: &str, values: &[T]) -> RjsResult<Reply>
    where
        T: Serialize,
    {
        self.run(|| Command::arr_append(key, path, values))
    }

    /// `JSON.ARRINSERT key path index value...`
    pub fn json_arr_insert<T: Serialize>(
        &self,
        key: &str,
        path: &str,
        index: i64,
        values: &[T],
    ) -> RjsResult<Reply> {
        self.run(|| Command::arr_insert(key, path, index, values))
    }

    /// `JSON.ARRINDEX key path value [start [stop]]`
    ///
    /// A value that is not found yields `Reply::Integer(-1)`.
    pub fn json_arr_index<T: Serialize + ?Sized>(
        &self,
        key: &str,
        path: &str,
        value: &T,
        range: SearchRange,
    ) -> RjsResult<Reply> {
        self.run(|| Command::arr_index(key, path, value, range))
    }

    /// `JSON.ARRLEN key path`
    pub fn json_arr_len(&self, key: &str, path: &str) -> RjsResult<Reply> {
        self.run(|| Ok(Command::arr_len(key, path)))
    }

    /// `JSON.ARRPOP key path [index]`; the reply is the removed element as JSON.
    pub fn json_arr_pop(&self, key: &str, path: &str, target: PopTarget) -> RjsResult<Reply> {
        self.run(|| Ok(Command::arr_pop(key, path, target)))
    }

    /// `JSON.ARRTRIM key path start stop`
    pub fn json_arr_trim(&self, key: &str, path: &str, start: i64, stop: i64) -> RjsResult<Reply> {
        self.run(|| Ok(Command::arr_trim(key, path, start, stop)))
    }

    /// `JSON.OBJKEYS key path`
    pub fn json_obj_keys(&self, key: &str, path: &str) -> RjsResult<Reply> {
        self.run(|| Ok(Command::obj_keys(key, path)))
    }

    /// `JSON.OBJLEN key path`
    pub fn json_obj_len(&self, key: &str, path: &str) -> RjsResult<Reply> {
        self.run(|| Ok(Command::obj_len(key, path)))
    }

    /// `JSON.DEBUG HELP` or `JSON.DEBUG MEMORY key path`
    pub fn json_debug(
        &self,
        subcommand: DebugSubcommand,
        key: &str,
        path: &str,
    ) -> RjsResult<Reply> {
        self.run(|| Ok(Command::debug(subcommand, key, path)))
    }
}

fn dispatch(transport: &dyn Transport, command: &Command) -> RjsResult<Reply> {
    trace!(command = command.name(), args = command.args().len(), "dispatching");
    Ok(transport.execute(command.name(), command.args())?)
}
