//! Scheduling core for agenda.
//!
//! - `validate`: time-range and overlap checks, run before any write
//! - `aggregate`: merging owned and invited events into one read model
//! - `retry`: bounded retry with exponential backoff
//! - `remote`: the event store backends and the retrying `StoreClient`
//! - `manager`: create / update / delete / fetch orchestration

pub mod aggregate;
pub mod config;
pub mod date_range;
pub mod error;
pub mod event;
pub mod manager;
pub mod remote;
pub mod retry;
pub mod validate;

pub use error::{AgendaError, AgendaResult};
pub use event::*;
