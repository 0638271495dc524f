//! Per-crawl query state

use super::restriction::{meets_requirements, Restriction};
use crate::graph::{Term, Triple};
use crate::session::{GraphSession, SessionResult};

/// Mutable state of one crawl invocation
///
/// Created when a query starts, owned by the crawl worker, and dropped (or
/// returned in the outcome) when the crawl ends. Never shared between
/// concurrent crawls.
pub struct QueryData {
    pub restrictions: Vec<Restriction>,
    session: Box<dyn GraphSession>,
    pub initial_subject: String,
    /// Statements offered to the path-predicate resolver
    pub path_candidates: Vec<Triple>,
    /// Date-typed statements offered to the date resolver
    pub date_candidates: Vec<Triple>,
    pub path_predicate: Option<String>,
    pub start_date_predicate: Option<String>,
    pub end_date_predicate: Option<String>,
}

impl QueryData {
    pub fn new(initial_subject: impl Into<String>, session: Box<dyn GraphSession>) -> Self {
        Self {
            restrictions: Vec::new(),
            session,
            initial_subject: initial_subject.into(),
            path_candidates: Vec::new(),
            date_candidates: Vec::new(),
            path_predicate: None,
            start_date_predicate: None,
            end_date_predicate: None,
        }
    }

    pub fn with_restrictions(mut self, restrictions: Vec<Restriction>) -> Self {
        self.restrictions = restrictions;
        self
    }

    pub fn session(&self) -> &dyn GraphSession {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> &mut dyn GraphSession {
        self.session.as_mut()
    }

    /// Evaluate this query's restrictions against a candidate object
    pub fn meets_requirements(&mut self, candidate: &Term) -> SessionResult<bool> {
        meets_requirements(self.session.as_mut(), &self.restrictions, candidate)
    }

    /// True once all three predicates have been negotiated
    pub fn is_ready(&self) -> bool {
        self.path_predicate.is_some()
            && self.start_date_predicate.is_some()
            && self.end_date_predicate.is_some()
    }
}

impl std::fmt::Debug for QueryData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryData")
            .field("initial_subject", &self.initial_subject)
            .field("restrictions", &self.restrictions)
            .field("path_candidates", &self.path_candidates.len())
            .field("date_candidates", &self.date_candidates.len())
            .field("path_predicate", &self.path_predicate)
            .field("start_date_predicate", &self.start_date_predicate)
            .field("end_date_predicate", &self.end_date_predicate)
            .finish_non_exhaustive()
    }
}
