//! Graph sessions: lazily dereferenced, per-crawl views of a remote graph
//!
//! A `TripleSource` is the transport (in memory, SQLite snapshot, ...); a
//! `GraphSession` adds the per-crawl cache and retry behaviour on top.

mod cached;
mod memory;
mod retry;
mod traits;

pub use cached::CachedSession;
pub use memory::MemorySource;
pub use retry::RetryPolicy;
pub use traits::{GraphSession, ObjectFilter, SessionError, SessionResult, TripleSource};
