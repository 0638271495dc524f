//! CrawlTask: one query from initial fetch to finished tree

use super::crawler::{BranchRecord, PathCrawler};
use super::error::{CrawlError, CrawlResult};
use super::initial::{InitialSearch, InitialSearchResult};
use super::listener::{NoopListener, ProgressListener};
use super::query_data::QueryData;
use crate::config::CrawlConfig;
use crate::graph::DataTree;
use crate::resolve::{BranchResolver, CancellationToken, DateResolver, FirstCandidate, NoChoice, PathResolver};
use crate::session::{CachedSession, TripleSource};
use std::sync::Arc;
use tracing::{info, info_span};
use uuid::Uuid;

/// Everything a finished (or aborted) crawl leaves behind
#[derive(Debug)]
pub struct CrawlOutcome {
    pub crawl_id: Uuid,
    pub result: InitialSearchResult,
    /// Only the root unless the initial search succeeded
    pub tree: DataTree,
    pub branches: Vec<BranchRecord>,
    pub query: QueryData,
    /// Stopped by cancellation; `tree` is partial
    pub cancelled: bool,
}

/// A configured crawl, reusable across queries
///
/// Defaults: the date and path resolvers choose nothing, so an automated
/// crawl must be given explicit resolvers; branches follow the first URI
/// candidate.
pub struct CrawlTask {
    config: CrawlConfig,
    dates: DateResolver,
    path: PathResolver,
    branches: BranchResolver,
    listener: Arc<dyn ProgressListener>,
    cancel: CancellationToken,
}

impl CrawlTask {
    pub fn new(config: CrawlConfig) -> Self {
        Self {
            config,
            dates: Arc::new(NoChoice),
            path: Arc::new(NoChoice),
            branches: Arc::new(FirstCandidate),
            listener: Arc::new(NoopListener),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_date_resolver(mut self, resolver: DateResolver) -> Self {
        self.dates = resolver;
        self
    }

    pub fn with_path_resolver(mut self, resolver: PathResolver) -> Self {
        self.path = resolver;
        self
    }

    pub fn with_branch_resolver(mut self, resolver: BranchResolver) -> Self {
        self.branches = resolver;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn ProgressListener>) -> Self {
        self.listener = listener;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Token that aborts this task's crawls
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Run one query against `source`.
    ///
    /// `query` is either a full resource URI or a name the configured base
    /// URL is prepended to. Fails only when the initial subject cannot be
    /// dereferenced or the initial search is cancelled; every other outcome,
    /// including a cancelled crawl, is reported in the returned outcome.
    pub fn run<S>(&self, query: &str, source: S) -> CrawlResult<CrawlOutcome>
    where
        S: TripleSource + 'static,
    {
        let crawl_id = Uuid::new_v4();
        let span = info_span!("crawl", id = %crawl_id);
        let _enter = span.enter();

        let subject = self.config.resolve_query(query);
        info!(target: "lineage::crawl", %subject, "starting crawl");

        let session =
            CachedSession::with_retry(source, self.config.retry.clone()).with_cancellation(self.cancel.clone());
        let mut data = QueryData::new(subject.as_str(), Box::new(session))
            .with_restrictions(self.config.restrictions.clone());

        if let Err(source) = data.session_mut().fetch(&subject) {
            self.listener.on_invalid_query(query, InitialSearchResult::Unknown);
            return Err(CrawlError::UnreachableSubject { uri: subject, source });
        }

        let initial = InitialSearch {
            config: &self.config,
            dates: &self.dates,
            path: &self.path,
            listener: self.listener.as_ref(),
            cancel: &self.cancel,
        };
        let result = initial.run(&mut data)?;
        if !result.is_ok() {
            info!(target: "lineage::crawl", %subject, %result, "invalid query");
            self.listener.on_invalid_query(query, result);
            return Ok(CrawlOutcome {
                crawl_id,
                result,
                tree: DataTree::new(),
                branches: Vec::new(),
                query: data,
                cancelled: false,
            });
        }

        let crawler = PathCrawler::new(&self.config, &self.branches, self.listener.as_ref(), &self.cancel);
        let report = crawler.crawl(&mut data);
        info!(
            target: "lineage::crawl",
            %subject,
            nodes = report.tree.len(),
            branches = report.branches.len(),
            cancelled = report.cancelled,
            "crawl finished"
        );
        self.listener.on_search_done();

        Ok(CrawlOutcome {
            crawl_id,
            result,
            tree: report.tree,
            branches: report.branches,
            query: data,
            cancelled: report.cancelled,
        })
    }
}

impl Default for CrawlTask {
    fn default() -> Self {
        Self::new(CrawlConfig::default())
    }
}
