//! Cycle guard for a single crawl

use std::collections::HashSet;

/// URIs already dereferenced and recursed into during one crawl
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    uris: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `uri`. Returns true only the first time a URI is added.
    pub fn add(&mut self, uri: &str) -> bool {
        if self.uris.contains(uri) {
            return false;
        }
        self.uris.insert(uri.to_string())
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.uris.contains(uri)
    }

    pub fn clear(&mut self) {
        self.uris.clear();
    }

    pub fn len(&self) -> usize {
        self.uris.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }
}
