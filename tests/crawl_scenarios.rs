//! End-to-end crawls over small in-memory graphs
//!
//! Run with: `cargo test --test crawl_scenarios`

mod common;

use common::{automated_task, test_config, uri, GraphBuilder, BORN, DIED, SAME_AS, SUCCESSOR};
use lineage::query::{BranchRecord, QueryData};
use lineage::{
    Candidate, CrawlError, CrawlEvent, DataTree, DateValue, EventLog, FixedDates, FixedPredicate,
    InitialSearchResult, NodeId, OpenStore, ReferenceHolder, Resolver, Restriction, RetryPolicy, SqliteSource,
};
use std::sync::{Arc, Mutex};

fn uris(tree: &DataTree) -> Vec<String> {
    tree.nodes().filter_map(|n| n.uri.clone()).collect()
}

fn node_for(tree: &DataTree, name: &str) -> NodeId {
    tree.find_by_uri(&uri(name)).unwrap()
}

/// Chooses the candidate with a given URI and remembers every call
struct ChooseUri {
    target: String,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ChooseUri {
    fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            target: uri(name),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl Resolver<Candidate, NodeId> for ChooseUri {
    fn resolve(&self, candidates: &[Candidate], _query: &QueryData) -> Option<ReferenceHolder<NodeId>> {
        self.calls.lock().unwrap().push(
            candidates
                .iter()
                .filter_map(|c| c.term.as_uri().map(str::to_string))
                .collect(),
        );
        let chosen = candidates.iter().find(|c| c.term.as_uri() == Some(self.target.as_str()));
        Some(ReferenceHolder::finished(chosen.map(|c| c.node).into_iter().collect()))
    }
}

/// Resolver that produces no reference at all
struct Broken;

impl Resolver<lineage::Triple, String> for Broken {
    fn resolve(&self, _candidates: &[lineage::Triple], _query: &QueryData) -> Option<ReferenceHolder<String>> {
        None
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_linear_chain_builds_single_path() {
    let source = GraphBuilder::new().chain(&["A", "B", "C"]).build();
    let log = Arc::new(EventLog::new());
    let task = automated_task(test_config()).with_listener(log.clone());

    let outcome = task.run("A", source).unwrap();

    assert_eq!(outcome.result, InitialSearchResult::Ok);
    assert_eq!(outcome.tree.len(), 4);
    assert_eq!(uris(&outcome.tree), vec![uri("A"), uri("B"), uri("C")]);
    assert!(outcome.branches.is_empty());
    assert!(!outcome.cancelled);

    let a = node_for(&outcome.tree, "A");
    let b = node_for(&outcome.tree, "B");
    assert_eq!(outcome.tree.parent_of(a), Some(outcome.tree.root()));
    assert_eq!(outcome.tree.parent_of(b), Some(a));

    let events = log.events();
    assert_eq!(
        events.first(),
        Some(&CrawlEvent::DateRangeChosen {
            start: BORN.into(),
            end: DIED.into()
        })
    );
    assert!(events.contains(&CrawlEvent::PathPredicateChosen {
        predicate: SUCCESSOR.into()
    }));
    assert_eq!(log.nodes_added(), 3);
    assert_eq!(events.last(), Some(&CrawlEvent::SearchDone));
}

#[test]
fn test_nodes_carry_label_and_dates() {
    let source = GraphBuilder::new().chain(&["Charles_IV", "Wenceslaus_IV"]).build();
    let outcome = automated_task(test_config()).run("Charles_IV", source).unwrap();

    let charles = outcome.tree.get(node_for(&outcome.tree, "Charles_IV")).unwrap();
    assert_eq!(charles.name.as_deref(), Some("Charles IV"));
    assert_eq!(charles.start_date, Some(DateValue::Year(1300)));
    assert_eq!(charles.end_date, Some(DateValue::Year(1350)));
}

#[test]
fn test_subject_without_followable_relation() {
    let source = GraphBuilder::new()
        .person("A", 1316, 1378)
        .link("A", SAME_AS, "Elsewhere")
        .literal("A", SUCCESSOR, "nobody")
        .build();
    let log = Arc::new(EventLog::new());
    let task = automated_task(test_config()).with_listener(log.clone());

    let outcome = task.run("A", source).unwrap();

    assert_eq!(outcome.result, InitialSearchResult::SubjectNotFound);
    assert_eq!(outcome.tree.len(), 1);
    assert!(outcome.query.path_candidates.is_empty());
    assert!(log.events().contains(&CrawlEvent::InvalidQuery {
        query: "A".into(),
        result: InitialSearchResult::SubjectNotFound,
    }));
    assert!(!log.events().contains(&CrawlEvent::SearchDone));
}

#[test]
fn test_branch_follows_only_chosen_candidate() {
    // K -> P -> {Alpha, Beta}; Alpha -> Gamma; Beta -> Delta
    let source = GraphBuilder::new()
        .chain(&["K", "P"])
        .successor("P", "Alpha")
        .successor("P", "Beta")
        .successor("Alpha", "Gamma")
        .successor("Beta", "Delta")
        .build();
    let resolver = ChooseUri::new("Beta");
    let task = automated_task(test_config()).with_branch_resolver(resolver.clone());

    let outcome = task.run("K", source).unwrap();
    let tree = &outcome.tree;

    assert_eq!(resolver.calls(), vec![vec![uri("Alpha"), uri("Beta")]]);

    let p = node_for(tree, "P");
    let alpha = node_for(tree, "Alpha");
    let beta = node_for(tree, "Beta");
    assert_eq!(tree.depth_of(p), Some(2));
    assert_eq!(tree.children_of(p), &[alpha, beta]);
    assert!(tree.get(alpha).unwrap().is_leaf());
    assert_eq!(tree.children_of(beta), &[node_for(tree, "Delta")]);
    assert!(tree.find_by_uri(&uri("Gamma")).is_none());

    assert_eq!(
        outcome.branches,
        vec![BranchRecord {
            parent: p,
            candidates: vec![alpha, beta],
            chosen: Some(beta),
        }]
    );
}

#[test]
fn test_revisited_resource_becomes_leaf() {
    // B at depth 2 is reached again from E at depth 5.
    let source = GraphBuilder::new()
        .chain(&["A", "B", "C", "D", "E"])
        .successor("E", "B")
        .build();
    let shared = Arc::new(source);
    let outcome = automated_task(test_config()).run("A", shared.clone()).unwrap();
    let tree = &outcome.tree;

    let bs = tree.find_all_by_uri(&uri("B"));
    assert_eq!(bs.len(), 2);
    assert_eq!(tree.depth_of(bs[0]), Some(2));
    assert_eq!(tree.depth_of(bs[1]), Some(6));
    assert!(tree.get(bs[1]).unwrap().is_leaf());
    assert_eq!(tree.len(), 7);
    assert_eq!(shared.dereference_count(&uri("B")), 1);
}

// ============================================================================
// Restrictions and failures
// ============================================================================

#[test]
fn test_restriction_failure_leaves_subject_a_leaf() {
    let flag = "http://ex/flag";
    let source = GraphBuilder::new()
        .person("A", 1300, 1350)
        .successor("A", "B")
        .successor("A", "C")
        .successor("A", "D")
        .successor("B", "E")
        .link("B", flag, "x")
        .link("D", flag, "x")
        .link("E", flag, "x")
        .build();
    let config = test_config().with_restriction(Restriction::new("http://ex/", "flag"));

    let outcome = automated_task(config).run("A", source).unwrap();

    // B passed before C failed, but the whole step is dropped.
    assert_eq!(uris(&outcome.tree), vec![uri("A")]);
    assert!(outcome.branches.is_empty());
}

#[test]
fn test_restrictions_met_along_chain() {
    let flag = "http://ex/flag";
    let source = GraphBuilder::new()
        .chain(&["A", "B", "C"])
        .link("B", flag, "x")
        .link("C", flag, "x")
        .build();
    let config = test_config().with_restriction(Restriction::new("http://ex/", "flag"));

    let outcome = automated_task(config).run("A", source).unwrap();
    assert_eq!(uris(&outcome.tree), vec![uri("A"), uri("B"), uri("C")]);
}

#[test]
fn test_every_passing_candidate_is_kept_as_child() {
    let source = GraphBuilder::new()
        .person("A", 1300, 1350)
        .successor("A", "B")
        .successor("A", "C")
        .successor("A", "D")
        .build();
    let outcome = automated_task(test_config()).run("A", source).unwrap();

    let a = node_for(&outcome.tree, "A");
    assert_eq!(outcome.tree.children_of(a).len(), 3);
    assert_eq!(outcome.branches.len(), 1);
    assert_eq!(outcome.branches[0].chosen, Some(node_for(&outcome.tree, "B")));
}

#[test]
fn test_unreachable_candidate_is_skipped() {
    let source = GraphBuilder::new()
        .chain(&["A", "B", "C"])
        .successor("A", "Gone")
        .build();
    source.mark_unreachable(uri("Gone"));
    let mut config = test_config();
    config.retry = RetryPolicy::immediate(2);

    let outcome = automated_task(config).run("A", source).unwrap();

    assert_eq!(uris(&outcome.tree), vec![uri("A"), uri("B"), uri("C")]);
    assert!(outcome.branches.is_empty());
}

#[test]
fn test_transient_failure_recovers_with_retry() {
    let source = GraphBuilder::new().chain(&["A", "B", "C"]).build();
    source.fail_times(uri("B"), 2);
    let mut config = test_config();
    config.retry = RetryPolicy::immediate(3);

    let outcome = automated_task(config).run("A", source).unwrap();
    assert_eq!(uris(&outcome.tree), vec![uri("A"), uri("B"), uri("C")]);
}

#[test]
fn test_unreachable_initial_subject_is_fatal() {
    let source = GraphBuilder::new().chain(&["A", "B"]).build();
    source.mark_unreachable(uri("A"));
    let mut config = test_config();
    config.retry = RetryPolicy::none();
    let log = Arc::new(EventLog::new());

    let result = automated_task(config).with_listener(log.clone()).run("A", source);

    match result {
        Err(CrawlError::UnreachableSubject { uri: subject, .. }) => assert_eq!(subject, uri("A")),
        other => panic!("expected unreachable subject, got {:?}", other.map(|o| o.result)),
    }
    assert_eq!(
        log.events(),
        vec![CrawlEvent::InvalidQuery {
            query: "A".into(),
            result: InitialSearchResult::Unknown,
        }]
    );
}

#[test]
fn test_max_depth_is_enforced() {
    let source = GraphBuilder::new().chain(&["A", "B", "C", "D", "E"]).build();
    let outcome = automated_task(test_config().with_max_depth(3))
        .run("A", source)
        .unwrap();
    assert_eq!(uris(&outcome.tree), vec![uri("A"), uri("B"), uri("C")]);
}

// ============================================================================
// Initial search outcomes
// ============================================================================

#[test]
fn test_no_date_found() {
    let source = GraphBuilder::new().successor("A", "B").build();
    let outcome = automated_task(test_config()).run("A", source).unwrap();
    assert_eq!(outcome.result, InitialSearchResult::NoDateFound);
    assert_eq!(outcome.tree.len(), 1);
}

#[test]
fn test_missing_end_date_predicate() {
    let source = GraphBuilder::new().chain(&["A", "B"]).build();
    let task = automated_task(test_config())
        .with_date_resolver(Arc::new(FixedDates::new(BORN, "http://ex/crowned")));
    assert_eq!(
        task.run("A", source).unwrap().result,
        InitialSearchResult::EndDateNotSelected
    );
}

#[test]
fn test_missing_start_date_predicate() {
    let source = GraphBuilder::new().chain(&["A", "B"]).build();
    let task = automated_task(test_config())
        .with_date_resolver(Arc::new(FixedDates::new("http://ex/crowned", DIED)));
    assert_eq!(
        task.run("A", source).unwrap().result,
        InitialSearchResult::StartDateNotSelected
    );
}

#[test]
fn test_path_not_selected() {
    let source = GraphBuilder::new().chain(&["A", "B"]).build();
    let task = automated_task(test_config())
        .with_path_resolver(Arc::new(FixedPredicate::new("http://ex/predecessor")));
    assert_eq!(task.run("A", source).unwrap().result, InitialSearchResult::PathNotSelected);
}

#[test]
fn test_missing_reference_is_unknown() {
    let source = GraphBuilder::new().chain(&["A", "B"]).build();
    let task = automated_task(test_config()).with_path_resolver(Arc::new(Broken));
    assert_eq!(task.run("A", source).unwrap().result, InitialSearchResult::Unknown);
}

#[test]
fn test_date_formats_filter_candidates() {
    let source = GraphBuilder::new().chain(&["A", "B"]).build();
    let mut config = test_config();
    config.valid_date_formats = lineage::DateFormats::only(["date"]);
    let outcome = automated_task(config).run("A", source).unwrap();
    assert_eq!(outcome.result, InitialSearchResult::NoDateFound);
}

// ============================================================================
// Snapshot store
// ============================================================================

#[test]
fn test_crawl_over_sqlite_snapshot() {
    let doc = format!(
        "<{a}> <{s}> <{b}> .\n\
         <{a}> <{born}> \"1316\"^^<http://www.w3.org/2001/XMLSchema#gYear> .\n\
         <{b}> <{s}> <{c}> .\n",
        a = uri("A"),
        b = uri("B"),
        c = uri("C"),
        s = SUCCESSOR,
        born = BORN,
    );
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteSource::open(dir.path().join("graph.db")).unwrap();
    assert_eq!(store.import_ntriples(doc.as_bytes()).unwrap(), 3);

    let task = automated_task(test_config()).with_date_resolver(Arc::new(FixedDates::new(BORN, BORN)));
    let outcome = task.run("A", store).unwrap();

    assert_eq!(outcome.result, InitialSearchResult::Ok);
    assert_eq!(uris(&outcome.tree), vec![uri("A"), uri("B"), uri("C")]);
}
