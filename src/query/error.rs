//! Crawl errors

use crate::session::SessionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// The initial subject could not be dereferenced
    #[error("initial subject {uri} is unreachable")]
    UnreachableSubject {
        uri: String,
        #[source]
        source: SessionError,
    },

    /// Cancelled before the initial search finished
    #[error("crawl cancelled")]
    Cancelled,
}

pub type CrawlResult<T> = Result<T, CrawlError>;
