//! Initial search: negotiate the date predicates and the path predicate

use super::error::{CrawlError, CrawlResult};
use super::listener::ProgressListener;
use super::query_data::QueryData;
use crate::config::CrawlConfig;
use crate::graph::Triple;
use crate::resolve::{CancellationToken, DateResolver, PathResolver, ReferenceHolder, ResolutionError};
use crate::session::ObjectFilter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Outcome of the initial search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InitialSearchResult {
    Ok,
    SubjectNotFound,
    PathNotSelected,
    NoDateFound,
    StartDateNotSelected,
    EndDateNotSelected,
    Unknown,
}

impl InitialSearchResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl std::fmt::Display for InitialSearchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Ok => "ok",
            Self::SubjectNotFound => "subject has no followable relation",
            Self::PathNotSelected => "no path predicate selected",
            Self::NoDateFound => "subject has no date statements",
            Self::StartDateNotSelected => "no start date predicate selected",
            Self::EndDateNotSelected => "no end date predicate selected",
            Self::Unknown => "resolver failed to answer",
        };
        f.write_str(text)
    }
}

/// Runs the single-pass negotiation over an already fetched initial subject
pub struct InitialSearch<'a> {
    pub config: &'a CrawlConfig,
    pub dates: &'a DateResolver,
    pub path: &'a PathResolver,
    pub listener: &'a dyn ProgressListener,
    pub cancel: &'a CancellationToken,
}

impl InitialSearch<'_> {
    /// Negotiate dates then path. On `Ok`, `query` carries all three predicates.
    pub fn run(&self, query: &mut QueryData) -> CrawlResult<InitialSearchResult> {
        let result = self.select_dates(query)?;
        if !result.is_ok() {
            return Ok(result);
        }
        self.select_path(query)
    }

    fn select_dates(&self, query: &mut QueryData) -> CrawlResult<InitialSearchResult> {
        let formats = &self.config.valid_date_formats;
        query.date_candidates = query
            .session()
            .select(&query.initial_subject, None, ObjectFilter::Literals)
            .into_iter()
            .filter(|t| {
                t.object
                    .as_literal()
                    .and_then(|l| l.datatype.as_deref())
                    .is_some_and(|dt| formats.matches(dt))
            })
            .collect();
        if query.date_candidates.is_empty() {
            info!(target: "lineage::crawl", subject = %query.initial_subject, "no date found");
            return Ok(InitialSearchResult::NoDateFound);
        }

        let holder = self.dates.resolve(&query.date_candidates, query);
        let Some(choices) = self.await_choice(holder, "date")? else {
            return Ok(InitialSearchResult::Unknown);
        };
        let Some(choice) = choices.into_iter().next() else {
            return Ok(InitialSearchResult::StartDateNotSelected);
        };
        let Some(start) = choice.start else {
            return Ok(InitialSearchResult::StartDateNotSelected);
        };
        let Some(end) = choice.end else {
            return Ok(InitialSearchResult::EndDateNotSelected);
        };

        debug!(target: "lineage::crawl", %start, %end, "date predicates chosen");
        self.listener.on_date_range_chosen(&start, &end);
        query.start_date_predicate = Some(start);
        query.end_date_predicate = Some(end);
        Ok(InitialSearchResult::Ok)
    }

    fn select_path(&self, query: &mut QueryData) -> CrawlResult<InitialSearchResult> {
        query.path_candidates = query
            .session()
            .select(&query.initial_subject, None, ObjectFilter::Resources)
            .into_iter()
            .filter(|t: &Triple| !self.config.is_ignored(&t.predicate))
            .collect();
        if query.path_candidates.is_empty() {
            return Ok(InitialSearchResult::SubjectNotFound);
        }

        let holder = self.path.resolve(&query.path_candidates, query);
        let Some(choices) = self.await_choice(holder, "path")? else {
            return Ok(InitialSearchResult::Unknown);
        };
        let Some(predicate) = choices.into_iter().next() else {
            return Ok(InitialSearchResult::PathNotSelected);
        };

        debug!(target: "lineage::crawl", %predicate, "path predicate chosen");
        self.listener.on_path_predicate_chosen(&predicate);
        query.path_predicate = Some(predicate);
        Ok(InitialSearchResult::Ok)
    }

    /// Wait for a resolver answer. `Ok(None)` means no usable reference.
    fn await_choice<T: Send + 'static>(
        &self,
        holder: Option<ReferenceHolder<T>>,
        what: &str,
    ) -> CrawlResult<Option<Vec<T>>> {
        let Some(holder) = holder else {
            warn!(target: "lineage::crawl", "{} resolver returned no reference", what);
            return Ok(None);
        };
        match holder.wait(&self.config.wait_policy(), self.cancel) {
            Ok(values) => Ok(Some(values)),
            Err(ResolutionError::Cancelled) => Err(CrawlError::Cancelled),
            Err(e @ ResolutionError::DeadlineExceeded(_)) => {
                warn!(target: "lineage::crawl", %e, "{} resolution abandoned", what);
                Ok(None)
            }
        }
    }
}
