//! Persistent graph snapshots
//!
//! `SqliteSource` stores a snapshot of the entity graph in SQLite and serves
//! it as a `TripleSource`, so crawls can run offline against imported data.

mod sqlite;
mod traits;

pub use sqlite::SqliteSource;
pub use traits::{OpenStore, StorageError, StorageResult};
