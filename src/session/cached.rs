//! CachedSession: the default GraphSession over any TripleSource

use super::retry::RetryPolicy;
use super::traits::{GraphSession, ObjectFilter, SessionResult, TripleSource};
use crate::graph::Triple;
use crate::resolve::CancellationToken;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Session model built from dereferenced documents
///
/// Every fetched document is merged into a subject-indexed model, so triples
/// about other resources that a document happens to contain are selectable
/// too. Each URI is dereferenced at most once.
pub struct CachedSession<S> {
    source: S,
    retry: RetryPolicy,
    cancel: CancellationToken,
    fetched: HashSet<String>,
    by_subject: HashMap<String, Vec<Triple>>,
    known: HashSet<Triple>,
}

impl<S: TripleSource> CachedSession<S> {
    pub fn new(source: S) -> Self {
        Self::with_retry(source, RetryPolicy::default())
    }

    pub fn with_retry(source: S, retry: RetryPolicy) -> Self {
        Self {
            source,
            retry,
            cancel: CancellationToken::new(),
            fetched: HashSet::new(),
            by_subject: HashMap::new(),
            known: HashSet::new(),
        }
    }

    /// Let cancellation interrupt retry backoff
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Number of distinct triples in the model
    pub fn triple_count(&self) -> usize {
        self.known.len()
    }

    fn merge(&mut self, document: Vec<Triple>) {
        for triple in document {
            if self.known.insert(triple.clone()) {
                self.by_subject
                    .entry(triple.subject.clone())
                    .or_default()
                    .push(triple);
            }
        }
    }
}

impl<S: TripleSource> GraphSession for CachedSession<S> {
    fn fetch(&mut self, uri: &str) -> SessionResult<Vec<Triple>> {
        if !self.fetched.contains(uri) {
            let source = &self.source;
            let document = self.retry.run(uri, &self.cancel, || source.dereference(uri))?;
            debug!(target: "lineage::session", uri, triples = document.len(), "dereferenced");
            self.merge(document);
            self.fetched.insert(uri.to_string());
        }
        Ok(self.select(uri, None, ObjectFilter::Any))
    }

    fn select(&self, subject: &str, predicate: Option<&str>, filter: ObjectFilter) -> Vec<Triple> {
        let Some(triples) = self.by_subject.get(subject) else {
            return Vec::new();
        };
        triples
            .iter()
            .filter(|t| predicate.map_or(true, |p| t.predicate == p))
            .filter(|t| filter.accepts(t))
            .cloned()
            .collect()
    }

    fn is_fetched(&self, uri: &str) -> bool {
        self.fetched.contains(uri)
    }
}
