//! PathCrawler: depth-first expansion along the chosen path predicate

use super::decorate::decorate;
use super::listener::ProgressListener;
use super::query_data::QueryData;
use super::visited::VisitedSet;
use crate::config::{CrawlConfig, MAX_DEPTH_LIMIT};
use crate::graph::{DataTree, NodeId, Payload, Term};
use crate::resolve::{BranchResolver, CancellationToken, Candidate, ResolutionError};
use crate::session::ObjectFilter;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A point where several children passed and one was chosen to continue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRecord {
    pub parent: NodeId,
    pub candidates: Vec<NodeId>,
    /// `None` when the resolver chose nothing or never answered
    pub chosen: Option<NodeId>,
}

/// What a crawl produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub tree: DataTree,
    pub branches: Vec<BranchRecord>,
    /// The crawl stopped early on cancellation; the tree is partial
    pub cancelled: bool,
}

/// Cancellation observed somewhere below the current step
struct Interrupted;

type Step = Result<(), Interrupted>;

pub struct PathCrawler<'a> {
    config: &'a CrawlConfig,
    resolver: &'a BranchResolver,
    listener: &'a dyn ProgressListener,
    cancel: &'a CancellationToken,
    visited: VisitedSet,
    tree: DataTree,
    branches: Vec<BranchRecord>,
}

impl<'a> PathCrawler<'a> {
    pub fn new(
        config: &'a CrawlConfig,
        resolver: &'a BranchResolver,
        listener: &'a dyn ProgressListener,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            config,
            resolver,
            listener,
            cancel,
            visited: VisitedSet::new(),
            tree: DataTree::new(),
            branches: Vec::new(),
        }
    }

    /// Crawl from the query's initial subject.
    ///
    /// Expects the initial subject to be fetched and the path predicate
    /// chosen. Without a path predicate only the initial subject is added.
    pub fn crawl(mut self, query: &mut QueryData) -> CrawlReport {
        self.visited.clear();
        let subject = query.initial_subject.clone();
        let root = self.tree.root();
        let cancelled = match self.add_child(query, root, &Term::resource(subject.as_str())) {
            Some(first) => {
                self.visited.add(&subject);
                self.step(query, first, &subject, 1).is_err()
            }
            None => false,
        };
        if cancelled {
            debug!(target: "lineage::crawl", nodes = self.tree.len(), "crawl interrupted");
        }
        CrawlReport {
            tree: self.tree,
            branches: self.branches,
            cancelled,
        }
    }

    fn add_child(&mut self, query: &QueryData, parent: NodeId, term: &Term) -> Option<NodeId> {
        let payload = Payload::from_term(term)?;
        let id = self.tree.append(parent, payload)?;
        if let Some(node) = self.tree.get_mut(id) {
            decorate(node, query);
        }
        self.listener.on_node_added(&self.tree, parent, id);
        Some(id)
    }

    fn step(&mut self, query: &mut QueryData, node: NodeId, subject: &str, depth: usize) -> Step {
        if self.cancel.is_cancelled() {
            return Err(Interrupted);
        }
        if depth >= self.config.max_depth.min(MAX_DEPTH_LIMIT) {
            debug!(target: "lineage::crawl", subject, depth, "max depth reached");
            return Ok(());
        }
        let Some(predicate) = query.path_predicate.clone() else {
            return Ok(());
        };

        let mut statements = query.session().select(subject, Some(&predicate), ObjectFilter::Any);
        statements.sort_by_key(|t| !t.object.is_resource());

        let mut passed = Vec::new();
        for statement in statements {
            if self.cancel.is_cancelled() {
                return Err(Interrupted);
            }
            match query.meets_requirements(&statement.object) {
                Ok(true) => passed.push(statement.object),
                Ok(false) => {
                    // Abandons the whole step, earlier passers included.
                    debug!(target: "lineage::crawl", subject, candidate = %statement.object, "restrictions unmet, ending step");
                    return Ok(());
                }
                Err(e) => {
                    warn!(target: "lineage::crawl", candidate = %statement.object, %e, "skipping candidate");
                }
            }
        }

        let mut children = Vec::with_capacity(passed.len());
        for term in passed {
            if let Some(id) = self.add_child(query, node, &term) {
                children.push((id, term));
            }
        }
        debug!(target: "lineage::crawl", subject, depth, children = children.len(), "step");

        match children.len() {
            0 => Ok(()),
            1 => {
                let (id, term) = &children[0];
                self.descend(query, *id, term, depth + 1)
            }
            _ => {
                let Some(chosen) = self.resolve_branch(query, node, &children)? else {
                    return Ok(());
                };
                match children.iter().find(|(id, _)| *id == chosen) {
                    Some((id, term)) => self.descend(query, *id, term, depth + 1),
                    None => Ok(()),
                }
            }
        }
    }

    /// Ask the branch resolver which child continues. Every child stays in the tree.
    fn resolve_branch(
        &mut self,
        query: &QueryData,
        parent: NodeId,
        children: &[(NodeId, Term)],
    ) -> Result<Option<NodeId>, Interrupted> {
        let candidates: Vec<Candidate> = children
            .iter()
            .map(|(id, term)| Candidate {
                node: *id,
                term: term.clone(),
                name: self
                    .tree
                    .get(*id)
                    .map(|n| n.display_name().to_string())
                    .unwrap_or_default(),
            })
            .collect();
        let ids: Vec<NodeId> = children.iter().map(|(id, _)| *id).collect();

        let chosen = match self.resolver.resolve(&candidates, query) {
            None => {
                warn!(target: "lineage::crawl", %parent, "branch resolver returned no reference");
                None
            }
            Some(holder) => match holder.wait(&self.config.wait_policy(), self.cancel) {
                Ok(values) => values.into_iter().find(|id| ids.contains(id)),
                Err(ResolutionError::Cancelled) => return Err(Interrupted),
                Err(e @ ResolutionError::DeadlineExceeded(_)) => {
                    warn!(target: "lineage::crawl", %parent, %e, "ending unresolved branch");
                    None
                }
            },
        };

        debug!(target: "lineage::crawl", %parent, candidates = ids.len(), ?chosen, "branch resolved");
        self.listener.on_branch_resolved(&self.tree, parent, &ids, chosen);
        self.branches.push(BranchRecord {
            parent,
            candidates: ids,
            chosen,
        });
        Ok(chosen)
    }

    /// Follow a URI child unless it was already visited. Literals end here.
    fn descend(&mut self, query: &mut QueryData, node: NodeId, term: &Term, depth: usize) -> Step {
        let Some(uri) = term.as_uri() else {
            return Ok(());
        };
        if let Err(e) = query.session_mut().fetch(uri) {
            warn!(target: "lineage::crawl", uri, %e, "skipping unreachable branch");
            return Ok(());
        }
        if !self.visited.add(uri) {
            debug!(target: "lineage::crawl", uri, "already visited");
            return Ok(());
        }
        self.step(query, node, uri, depth)
    }
}
