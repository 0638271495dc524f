//! Resolver port and the values it chooses between

use super::holder::ReferenceHolder;
use crate::graph::{NodeId, Term, Triple};
use crate::query::QueryData;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The pair of date predicates chosen during the initial search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateChoice {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DateChoice {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    /// Same predicate for both ends of the range
    pub fn single(predicate: impl Into<String>) -> Self {
        let predicate = predicate.into();
        Self {
            start: Some(predicate.clone()),
            end: Some(predicate),
        }
    }
}

/// One of several children competing to continue a branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// The child already appended to the tree
    pub node: NodeId,
    pub term: Term,
    /// Display name at the time of resolution
    pub name: String,
}

/// Chooses among candidates on behalf of the crawl
///
/// Returning `None` means the resolver produced no reference at all, which
/// the crawl treats as an unexpected failure. A non-blocking resolver
/// returns a finished holder; a blocking one returns a pending holder and
/// completes it from another thread.
pub trait Resolver<C, T>: Send + Sync {
    fn resolve(&self, candidates: &[C], query: &QueryData) -> Option<ReferenceHolder<T>>;
}

impl<C, T, R: Resolver<C, T> + ?Sized> Resolver<C, T> for Arc<R> {
    fn resolve(&self, candidates: &[C], query: &QueryData) -> Option<ReferenceHolder<T>> {
        (**self).resolve(candidates, query)
    }
}

impl<C, T, R: Resolver<C, T> + ?Sized> Resolver<C, T> for Box<R> {
    fn resolve(&self, candidates: &[C], query: &QueryData) -> Option<ReferenceHolder<T>> {
        (**self).resolve(candidates, query)
    }
}

/// Chooses the start and end date predicates
pub type DateResolver = Arc<dyn Resolver<Triple, DateChoice>>;

/// Chooses the path predicate
pub type PathResolver = Arc<dyn Resolver<Triple, String>>;

/// Chooses which child continues an ambiguous branch
pub type BranchResolver = Arc<dyn Resolver<Candidate, NodeId>>;
