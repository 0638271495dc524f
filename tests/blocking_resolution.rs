//! Blocking resolvers: answers from other threads, deadlines, cancellation
//!
//! Run with: `cargo test --test blocking_resolution`

mod common;

use common::{automated_task, test_config, uri, GraphBuilder};
use lineage::query::QueryData;
use lineage::{
    CancellationToken, Candidate, CrawlError, DateChoice, InitialSearchResult, NodeId, ReferenceHolder, Resolver,
    ThreadedResolver, Triple,
};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Returns a pending holder and never completes it
struct Silent;

impl<C, T> Resolver<C, T> for Silent {
    fn resolve(&self, _candidates: &[C], _query: &QueryData) -> Option<ReferenceHolder<T>> {
        Some(ReferenceHolder::pending())
    }
}

/// Hands out pending holders that the test completes by hand
#[derive(Default)]
struct Manual {
    pending: Mutex<Vec<(Vec<Candidate>, ReferenceHolder<NodeId>)>>,
}

impl Resolver<Candidate, NodeId> for Manual {
    fn resolve(&self, candidates: &[Candidate], _query: &QueryData) -> Option<ReferenceHolder<NodeId>> {
        let holder = ReferenceHolder::pending();
        self.pending
            .lock()
            .unwrap()
            .push((candidates.to_vec(), holder.clone()));
        Some(holder)
    }
}

fn branching_graph() -> GraphBuilder {
    GraphBuilder::new()
        .person("A", 1300, 1350)
        .successor("A", "B")
        .successor("A", "C")
        .successor("C", "D")
}

#[test]
fn test_threaded_resolver_answers_from_another_thread() {
    let source = branching_graph().build();
    let resolver = ThreadedResolver::new(|candidates: Vec<Candidate>| {
        thread::sleep(Duration::from_millis(20));
        candidates
            .into_iter()
            .filter(|c| c.term.as_uri() == Some("http://ex/C"))
            .map(|c| c.node)
            .collect()
    });
    let task = automated_task(test_config()).with_branch_resolver(Arc::new(resolver));

    let outcome = task.run("A", source).unwrap();

    let c = outcome.tree.find_by_uri(&uri("C")).unwrap();
    assert_eq!(outcome.branches[0].chosen, Some(c));
    assert!(outcome.tree.find_by_uri(&uri("D")).is_some());
}

#[test]
fn test_manual_completion_wakes_crawl() {
    let source = branching_graph().build();
    let manual = Arc::new(Manual::default());
    let mut config = test_config();
    config.poll_interval_ms = 60_000;
    let task = automated_task(config).with_branch_resolver(manual.clone());

    let answerer = {
        let manual = manual.clone();
        thread::spawn(move || loop {
            if let Some((candidates, holder)) = manual.pending.lock().unwrap().pop() {
                assert_eq!(candidates.len(), 2);
                holder.set(vec![candidates[1].node]);
                holder.finish();
                holder.unlock();
                return;
            }
            thread::sleep(Duration::from_millis(5));
        })
    };

    let started = Instant::now();
    let outcome = task.run("A", source).unwrap();
    answerer.join().unwrap();

    assert!(started.elapsed() < Duration::from_secs(30));
    assert!(outcome.tree.find_by_uri(&uri("D")).is_some());
}

#[test]
fn test_deadline_ends_unanswered_branch() {
    let source = branching_graph().build();
    let mut config = test_config();
    config.poll_interval_ms = 10;
    config.resolution_timeout_ms = Some(50);
    let task = automated_task(config).with_branch_resolver(Arc::new(Silent));

    let outcome = task.run("A", source).unwrap();

    assert_eq!(outcome.result, InitialSearchResult::Ok);
    assert!(!outcome.cancelled);
    assert_eq!(outcome.branches.len(), 1);
    assert_eq!(outcome.branches[0].chosen, None);
    assert_eq!(outcome.tree.len(), 4);
    assert!(outcome.tree.find_by_uri(&uri("D")).is_none());
}

#[test]
fn test_deadline_during_date_selection_is_unknown() {
    let source = branching_graph().build();
    let mut config = test_config();
    config.poll_interval_ms = 10;
    config.resolution_timeout_ms = Some(30);
    let silent: Arc<dyn Resolver<Triple, DateChoice>> = Arc::new(Silent);
    let task = automated_task(config).with_date_resolver(silent);

    assert_eq!(task.run("A", source).unwrap().result, InitialSearchResult::Unknown);
}

#[test]
fn test_cancel_wakes_stuck_branch_wait() {
    let source = branching_graph().build();
    let token = CancellationToken::new();
    let task = automated_task(test_config())
        .with_branch_resolver(Arc::new(Silent))
        .with_cancellation(token.clone());

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        token.cancel();
    });

    let started = Instant::now();
    let outcome = task.run("A", source).unwrap();
    canceller.join().unwrap();

    // Default poll interval is 5s; the wakeup must not wait it out.
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(outcome.cancelled);
    // Children added before the branch wait are kept.
    let a = outcome.tree.find_by_uri(&uri("A")).unwrap();
    assert_eq!(outcome.tree.children_of(a).len(), 2);
    assert!(outcome.branches.is_empty());
}

#[test]
fn test_cancel_during_initial_search() {
    let source = branching_graph().build();
    let token = CancellationToken::new();
    let silent: Arc<dyn Resolver<Triple, String>> = Arc::new(Silent);
    let task = automated_task(test_config())
        .with_path_resolver(silent)
        .with_cancellation(token.clone());

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(30));
        token.cancel();
    });

    let result = task.run("A", source);
    canceller.join().unwrap();
    assert!(matches!(result, Err(CrawlError::Cancelled)));
}
