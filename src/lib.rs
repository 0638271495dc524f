//! Lineage: path crawling over lazily dereferenced entity graphs
//!
//! Starting from one named entity, a crawl follows a single chosen relation
//! outward and assembles the entities it discovers into a tree. Wherever
//! more than one successor qualifies, an external resolver (a person or an
//! automated policy) decides which one the crawl continues along.
//!
//! # Core Concepts
//!
//! - **Sessions**: per-crawl caches over a [`TripleSource`] such as a SQLite snapshot
//! - **Resolvers**: choose the date predicates, the path predicate and branch successors
//! - **Data tree**: append-only result tree rooted in a payload-less root
//!
//! # Example
//!
//! ```
//! use lineage::{CrawlTask, MemorySource};
//!
//! let task = CrawlTask::default();
//! let outcome = task.run("Nobody", MemorySource::new()).unwrap();
//! assert!(!outcome.result.is_ok());
//! ```

pub mod config;
pub mod graph;
pub mod query;
pub mod resolve;
pub mod session;
pub mod storage;

pub use config::{ConfigError, CrawlConfig, DateFormats};
pub use graph::{DataTree, DateValue, Literal, Node, NodeId, Payload, Term, Triple};
pub use query::{
    BranchRecord, CrawlError, CrawlEvent, CrawlOutcome, CrawlTask, EventLog, InitialSearchResult, NoopListener,
    ProgressListener, QueryData, Restriction, VisitedSet,
};
pub use resolve::{
    CancellationToken, Candidate, DateChoice, FirstCandidate, FixedDates, FixedPredicate, NoChoice, ReferenceHolder,
    ResolutionError, Resolver, ThreadedResolver, WaitPolicy,
};
pub use session::{CachedSession, GraphSession, MemorySource, RetryPolicy, SessionError, TripleSource};
pub use storage::{OpenStore, SqliteSource, StorageError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
