//! In-memory triple source

use super::traits::{SessionError, SessionResult, TripleSource};
use crate::graph::{parse_ntriples, NTriplesError, Triple};
use dashmap::DashMap;
use std::io::BufRead;

/// A triple source backed by in-memory documents
///
/// Documents are keyed by the URI that dereferences to them. Transient
/// failures can be injected per URI, and every dereference is counted.
#[derive(Debug, Default)]
pub struct MemorySource {
    documents: DashMap<String, Vec<Triple>>,
    failures: DashMap<String, u32>,
    dereferences: DashMap<String, usize>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group triples into documents by subject
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        let source = Self::new();
        for triple in triples {
            source.insert(triple);
        }
        source
    }

    pub fn from_ntriples<R: BufRead>(reader: R) -> Result<Self, NTriplesError> {
        Ok(Self::from_triples(parse_ntriples(reader)?))
    }

    /// Add a triple to its subject's document
    pub fn insert(&self, triple: Triple) {
        self.documents
            .entry(triple.subject.clone())
            .or_default()
            .push(triple);
    }

    /// Replace the whole document served for `uri`
    pub fn insert_document(&self, uri: impl Into<String>, triples: Vec<Triple>) {
        self.documents.insert(uri.into(), triples);
    }

    /// Make the next `n` dereferences of `uri` fail as unreachable
    pub fn fail_times(&self, uri: impl Into<String>, n: u32) {
        self.failures.insert(uri.into(), n);
    }

    /// Make every dereference of `uri` fail as unreachable
    pub fn mark_unreachable(&self, uri: impl Into<String>) {
        self.fail_times(uri, u32::MAX);
    }

    pub fn dereference_count(&self, uri: &str) -> usize {
        self.dereferences.get(uri).map(|c| *c).unwrap_or(0)
    }

    pub fn total_dereferences(&self) -> usize {
        self.dereferences.iter().map(|c| *c.value()).sum()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }
}

impl TripleSource for MemorySource {
    fn dereference(&self, uri: &str) -> SessionResult<Vec<Triple>> {
        *self.dereferences.entry(uri.to_string()).or_insert(0) += 1;

        if let Some(mut remaining) = self.failures.get_mut(uri) {
            if *remaining > 0 {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                return Err(SessionError::unreachable(uri, "injected failure"));
            }
        }

        Ok(self
            .documents
            .get(uri)
            .map(|doc| doc.value().clone())
            .unwrap_or_default())
    }
}
