//! Built-in resolvers

use super::cancel::CancellationToken;
use super::holder::ReferenceHolder;
use super::traits::{Candidate, DateChoice, Resolver};
use crate::graph::{NodeId, Triple};
use crate::query::QueryData;
use std::sync::Arc;
use std::thread;
use tracing::debug;

/// Picks the first URI-resource candidate without blocking
///
/// For date selection, the first date statement's predicate is used for both
/// ends of the range.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstCandidate;

impl Resolver<Candidate, NodeId> for FirstCandidate {
    fn resolve(&self, candidates: &[Candidate], _query: &QueryData) -> Option<ReferenceHolder<NodeId>> {
        let chosen = candidates.iter().find(|c| c.term.is_resource()).map(|c| c.node);
        Some(ReferenceHolder::finished(chosen.into_iter().collect()))
    }
}

impl Resolver<Triple, String> for FirstCandidate {
    fn resolve(&self, candidates: &[Triple], _query: &QueryData) -> Option<ReferenceHolder<String>> {
        let chosen = candidates
            .iter()
            .find(|t| t.object.is_resource())
            .map(|t| t.predicate.clone());
        Some(ReferenceHolder::finished(chosen.into_iter().collect()))
    }
}

impl Resolver<Triple, DateChoice> for FirstCandidate {
    fn resolve(&self, candidates: &[Triple], _query: &QueryData) -> Option<ReferenceHolder<DateChoice>> {
        let chosen = candidates.first().map(|t| DateChoice::single(t.predicate.clone()));
        Some(ReferenceHolder::finished(chosen.into_iter().collect()))
    }
}

/// Deliberately chooses nothing, without blocking
#[derive(Debug, Clone, Copy, Default)]
pub struct NoChoice;

impl<C, T> Resolver<C, T> for NoChoice {
    fn resolve(&self, _candidates: &[C], _query: &QueryData) -> Option<ReferenceHolder<T>> {
        Some(ReferenceHolder::nothing())
    }
}

/// Chooses a known path predicate if the subject offers it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPredicate(pub String);

impl FixedPredicate {
    pub fn new(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }
}

impl Resolver<Triple, String> for FixedPredicate {
    fn resolve(&self, candidates: &[Triple], _query: &QueryData) -> Option<ReferenceHolder<String>> {
        if candidates.iter().any(|t| t.predicate == self.0) {
            Some(ReferenceHolder::one(self.0.clone()))
        } else {
            debug!(target: "lineage::resolve", predicate = %self.0, "fixed predicate not offered");
            Some(ReferenceHolder::nothing())
        }
    }
}

/// Chooses known start and end date predicates, each only if offered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedDates {
    pub start: String,
    pub end: String,
}

impl FixedDates {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl Resolver<Triple, DateChoice> for FixedDates {
    fn resolve(&self, candidates: &[Triple], _query: &QueryData) -> Option<ReferenceHolder<DateChoice>> {
        let offered = |p: &str| candidates.iter().any(|t| t.predicate == p);
        let choice = DateChoice {
            start: offered(&self.start).then(|| self.start.clone()),
            end: offered(&self.end).then(|| self.end.clone()),
        };
        Some(ReferenceHolder::one(choice))
    }
}

type Choose<C, T> = dyn Fn(Vec<C>) -> Vec<T> + Send + Sync;

/// Blocking resolver: answers on a spawned thread
///
/// `resolve` returns a pending holder at once. The closure runs on its own
/// thread (typically prompting a user) and its answer completes the holder,
/// waking the crawl worker.
///
/// The thread is detached: a crawl that gives up on a deadline does not stop
/// it. With a cancellation token attached, the closure is skipped once the
/// token is cancelled and a late answer is dropped instead of completing the
/// holder.
pub struct ThreadedResolver<C, T> {
    choose: Arc<Choose<C, T>>,
    cancel: Option<CancellationToken>,
}

impl<C, T> ThreadedResolver<C, T> {
    pub fn new<F>(choose: F) -> Self
    where
        F: Fn(Vec<C>) -> Vec<T> + Send + Sync + 'static,
    {
        Self {
            choose: Arc::new(choose),
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

impl<C, T> Resolver<C, T> for ThreadedResolver<C, T>
where
    C: Clone + Send + 'static,
    T: Send + 'static,
{
    fn resolve(&self, candidates: &[C], _query: &QueryData) -> Option<ReferenceHolder<T>> {
        let holder = ReferenceHolder::pending();
        let answer = holder.clone();
        let choose = Arc::clone(&self.choose);
        let cancel = self.cancel.clone();
        let candidates = candidates.to_vec();
        let cancelled = move || cancel.as_ref().is_some_and(CancellationToken::is_cancelled);
        thread::spawn(move || {
            if cancelled() {
                return;
            }
            let chosen = choose(candidates);
            if cancelled() {
                debug!(target: "lineage::resolve", "dropping answer after cancellation");
                return;
            }
            answer.complete(chosen);
        });
        Some(holder)
    }
}
