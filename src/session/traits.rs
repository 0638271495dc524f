//! Session and source contracts

use crate::graph::Triple;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while dereferencing resources
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("source unreachable while dereferencing {uri}: {reason}")]
    Unreachable { uri: String, reason: String },

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("malformed document for {uri}: {reason}")]
    Malformed { uri: String, reason: String },

    #[error("storage error: {0}")]
    Storage(String),
}

impl SessionError {
    pub fn unreachable(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unreachable {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Which objects a `select` keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectFilter {
    #[default]
    Any,
    /// Only URI resources
    Resources,
    /// Only literals
    Literals,
}

impl ObjectFilter {
    pub fn accepts(&self, triple: &Triple) -> bool {
        match self {
            Self::Any => true,
            Self::Resources => triple.object.is_resource(),
            Self::Literals => triple.object.is_literal(),
        }
    }
}

/// The remote transport: turns a URI into the document describing it
///
/// Implementations must be thread-safe (Send + Sync) so one source can back
/// several sessions.
pub trait TripleSource: Send + Sync {
    /// Fetch every triple the source publishes for `uri`.
    ///
    /// An unknown resource yields an empty document, not an error.
    fn dereference(&self, uri: &str) -> SessionResult<Vec<Triple>>;
}

impl<S: TripleSource + ?Sized> TripleSource for Arc<S> {
    fn dereference(&self, uri: &str) -> SessionResult<Vec<Triple>> {
        (**self).dereference(uri)
    }
}

impl<S: TripleSource + ?Sized> TripleSource for Box<S> {
    fn dereference(&self, uri: &str) -> SessionResult<Vec<Triple>> {
        (**self).dereference(uri)
    }
}

/// Per-crawl view of the remote graph
///
/// `fetch` dereferences lazily and caches; `select` only looks at data
/// already fetched in this session.
pub trait GraphSession: Send {
    /// Dereference `uri` (at most once per session) and return the triples
    /// whose subject is `uri`.
    fn fetch(&mut self, uri: &str) -> SessionResult<Vec<Triple>>;

    /// Triples with the given subject, optionally restricted to one predicate,
    /// in the order they were fetched.
    fn select(&self, subject: &str, predicate: Option<&str>, filter: ObjectFilter) -> Vec<Triple>;

    /// Whether `uri` has been dereferenced in this session
    fn is_fetched(&self, uri: &str) -> bool;

    /// True if at least one `(subject, predicate, *)` statement is known
    fn has_statement(&self, subject: &str, predicate: &str) -> bool {
        !self.select(subject, Some(predicate), ObjectFilter::Any).is_empty()
    }
}
