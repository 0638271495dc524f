//! Progress notifications emitted by a crawl

use super::initial::InitialSearchResult;
use crate::graph::{DataTree, NodeId};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// Observer of crawl progress
///
/// Called from the crawl worker thread. Implementations that drive a UI must
/// redispatch themselves.
pub trait ProgressListener: Send + Sync {
    fn on_path_predicate_chosen(&self, _predicate: &str) {}

    fn on_date_range_chosen(&self, _start: &str, _end: &str) {}

    fn on_node_added(&self, _tree: &DataTree, _parent: NodeId, _node: NodeId) {}

    /// `chosen` is `None` when the resolver aborted the branch.
    fn on_branch_resolved(&self, _tree: &DataTree, _parent: NodeId, _candidates: &[NodeId], _chosen: Option<NodeId>) {}

    fn on_invalid_query(&self, _query: &str, _result: InitialSearchResult) {}

    fn on_search_done(&self) {}
}

/// Listener that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl ProgressListener for NoopListener {}

/// A recorded listener call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CrawlEvent {
    PathPredicateChosen { predicate: String },
    DateRangeChosen { start: String, end: String },
    NodeAdded { parent: NodeId, node: NodeId },
    BranchResolved {
        parent: NodeId,
        candidates: Vec<NodeId>,
        chosen: Option<NodeId>,
    },
    InvalidQuery { query: String, result: InitialSearchResult },
    SearchDone,
}

/// Listener that records every call in order
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<CrawlEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, event: CrawlEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    pub fn events(&self) -> Vec<CrawlEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `NodeAdded` events
    pub fn nodes_added(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, CrawlEvent::NodeAdded { .. }))
            .count()
    }

    pub fn branches(&self) -> Vec<CrawlEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, CrawlEvent::BranchResolved { .. }))
            .collect()
    }
}

impl ProgressListener for EventLog {
    fn on_path_predicate_chosen(&self, predicate: &str) {
        self.record(CrawlEvent::PathPredicateChosen {
            predicate: predicate.to_string(),
        });
    }

    fn on_date_range_chosen(&self, start: &str, end: &str) {
        self.record(CrawlEvent::DateRangeChosen {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    fn on_node_added(&self, _tree: &DataTree, parent: NodeId, node: NodeId) {
        self.record(CrawlEvent::NodeAdded { parent, node });
    }

    fn on_branch_resolved(&self, _tree: &DataTree, parent: NodeId, candidates: &[NodeId], chosen: Option<NodeId>) {
        self.record(CrawlEvent::BranchResolved {
            parent,
            candidates: candidates.to_vec(),
            chosen,
        });
    }

    fn on_invalid_query(&self, query: &str, result: InitialSearchResult) {
        self.record(CrawlEvent::InvalidQuery {
            query: query.to_string(),
            result,
        });
    }

    fn on_search_done(&self) {
        self.record(CrawlEvent::SearchDone);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_records_in_order() {
        let log = EventLog::new();
        let tree = DataTree::new();
        log.on_path_predicate_chosen("http://ex/next");
        log.on_node_added(&tree, NodeId::ROOT, NodeId(1));
        log.on_search_done();

        assert_eq!(
            log.events(),
            vec![
                CrawlEvent::PathPredicateChosen {
                    predicate: "http://ex/next".into()
                },
                CrawlEvent::NodeAdded {
                    parent: NodeId::ROOT,
                    node: NodeId(1)
                },
                CrawlEvent::SearchDone,
            ]
        );
        assert_eq!(log.nodes_added(), 1);
    }

    #[test]
    fn test_events_serialize_with_tag() {
        let json = serde_json::to_value(CrawlEvent::SearchDone).unwrap();
        assert_eq!(json["event"], "search_done");
    }
}
