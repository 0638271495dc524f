//! Crawling an entity graph along one relation
//!
//! A [`CrawlTask`] fetches the initial subject, negotiates the date and path
//! predicates with its resolvers, then hands the query to the
//! [`PathCrawler`], which grows a [`DataTree`](crate::graph::DataTree)
//! depth-first.

mod crawler;
mod decorate;
mod error;
mod initial;
mod listener;
mod query_data;
mod restriction;
mod task;
mod visited;

pub use crawler::{BranchRecord, CrawlReport, PathCrawler};
pub use decorate::decorate;
pub use error::{CrawlError, CrawlResult};
pub use initial::{InitialSearch, InitialSearchResult};
pub use listener::{CrawlEvent, EventLog, NoopListener, ProgressListener};
pub use query_data::QueryData;
pub use restriction::{meets_requirements, Restriction};
pub use task::{CrawlOutcome, CrawlTask};
pub use visited::VisitedSet;
