//! sample-cache — client-side normalized entity cache for a specimen-tracking
//! desktop app.
//!
//! The backend owns seven interrelated entity types (locations, specimen
//! types, studies, study subjects, specimens, matrix tubes, matrix plates).
//! This crate keeps a session-local mirror of them: normalized on write
//! (id-keyed tables plus explicit ordered id lists), denormalized on read
//! (memoized join views). All mutation flows through a single pure reducer,
//! so every observer sees either the state before a command or the state
//! after it — never anything in between.
//!
//! # Layout
//!
//! - [`model`] — entity types and wire payload types.
//! - [`store`] — [`store::Table`], [`store::CacheState`], [`store::Store`].
//! - [`command`] — the closed command set dispatched into the reducer.
//! - [`reducer`] — the command reducer engine, entity merger, and cascade
//!   resolver.
//! - [`view`] — memoized derived views ([`view::Views`]).
//! - [`gateway`] — the seam to the backend API: turns fetch outcomes into
//!   commands and maps the error taxonomy.
//!
//! The cache holds no state across sessions and writes nothing to disk: a
//! [`store::Store`] is constructed at session start and dropped at session
//! end.

pub mod command;
pub mod error;
pub mod gateway;
pub mod model;
pub mod reducer;
pub mod store;
pub mod view;

pub use command::Command;
pub use error::{ApiError, ApiResult};
pub use store::{CacheState, Store, Table};
pub use view::{Linked, Views};
