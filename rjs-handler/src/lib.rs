//! # RJS Handler
//!
//! Purpose: Build `JSON.*` commands for a Redis-compatible store and send
//! them through whichever client the application has bound.
//!
//! ## Design Principles
//! 1. **Facade Pattern**: `Handler` exposes one method per JSON command.
//! 2. **Swappable Transports**: Any client implementing [`Transport`] can be bound at runtime.
//! 3. **Encode, Never Decode**: Values are serialized on the way out; replies
//!    come back raw for the caller to decode.
//! 4. **Errors Travel Unchanged**: Transport failures are wrapped transparently, never retried.
//!
//! ```no_run
//! use std::sync::Arc;
//! use rjs_client::PooledClient;
//! use rjs_handler::{Handler, PopTarget};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let handler = Handler::new();
//! handler.set_pooled_client(Arc::new(PooledClient::connect("127.0.0.1:6379")));
//!
//! handler.json_set("arr", ".", &["one", "two", "three"])?;
//! let last = handler.json_arr_pop("arr", ".", PopTarget::Last)?;
//! let last: String = serde_json::from_slice(last.as_bytes()?)?;
//! assert_eq!(last, "three");
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod command;
mod error;
mod handler;
pub mod options;
mod reply;
mod transport;

pub use command::Command;
pub use error::{RjsError, RjsResult};
pub use handler::{ClientKind, Handler};
pub use options::{DebugSubcommand, GetOption, PopTarget, SearchRange, SetCondition};
pub use reply::Reply;
pub use transport::Transport;

pub use rjs_client::{ClientError, ClientResult};
