//! Common test utilities for crawl integration tests
//!
//! `GraphBuilder` assembles small entity graphs in a `MemorySource`, with
//! the predicates a crawl negotiates (dates, the path relation) pre-named.

#![allow(dead_code)]

use lineage::{CrawlConfig, CrawlTask, FixedDates, FixedPredicate, Literal, MemorySource, Term, Triple};
use std::sync::Arc;

pub const NS: &str = "http://ex/";
pub const SUCCESSOR: &str = "http://ex/successor";
pub const BORN: &str = "http://ex/born";
pub const DIED: &str = "http://ex/died";
pub const SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";
pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

pub fn uri(name: &str) -> String {
    format!("{}{}", NS, name)
}

/// Builder for in-memory entity graphs
#[derive(Default)]
pub struct GraphBuilder {
    triples: Vec<Triple>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entity with an English label and a birth/death year pair
    pub fn person(mut self, name: &str, born: i32, died: i32) -> Self {
        let subject = uri(name);
        self.triples.push(Triple::new(
            &subject,
            LABEL,
            Term::literal(Literal::lang(name.replace('_', " "), "en")),
        ));
        self.triples
            .push(Triple::new(&subject, BORN, Term::literal(Literal::xsd(born.to_string(), "gYear"))));
        self.triples
            .push(Triple::new(&subject, DIED, Term::literal(Literal::xsd(died.to_string(), "gYear"))));
        self
    }

    /// `from --successor--> to`
    pub fn successor(self, from: &str, to: &str) -> Self {
        self.link(from, SUCCESSOR, to)
    }

    pub fn link(mut self, from: &str, predicate: &str, to: &str) -> Self {
        self.triples.push(Triple::link(uri(from), predicate, uri(to)));
        self
    }

    pub fn literal(mut self, from: &str, predicate: &str, value: &str) -> Self {
        self.triples
            .push(Triple::new(uri(from), predicate, Term::literal(Literal::simple(value))));
        self
    }

    /// Linear chain `names[0] -> names[1] -> ...` of labelled people
    pub fn chain(mut self, names: &[&str]) -> Self {
        for (i, name) in names.iter().enumerate() {
            self = self.person(name, 1300 + i as i32 * 20, 1350 + i as i32 * 20);
        }
        for pair in names.windows(2) {
            self = self.successor(pair[0], pair[1]);
        }
        self
    }

    pub fn build(self) -> MemorySource {
        MemorySource::from_triples(self.triples)
    }

    pub fn build_shared(self) -> Arc<MemorySource> {
        Arc::new(self.build())
    }
}

/// Config resolving bare names against the fixture namespace
pub fn test_config() -> CrawlConfig {
    CrawlConfig::default().with_base_url(NS)
}

/// Task that picks born/died and the successor relation automatically
pub fn automated_task(config: CrawlConfig) -> CrawlTask {
    CrawlTask::new(config)
        .with_date_resolver(Arc::new(FixedDates::new(BORN, DIED)))
        .with_path_resolver(Arc::new(FixedPredicate::new(SUCCESSOR)))
}
