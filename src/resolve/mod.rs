//! Ambiguity resolution
//!
//! Hand-off between the crawl worker and an external resolver, human or
//! automated, plus the cancellation token that can abort either side.

mod builtin;
pub mod cancel;
mod holder;
mod traits;

pub use builtin::{FirstCandidate, FixedDates, FixedPredicate, NoChoice, ThreadedResolver};
pub use cancel::CancellationToken;
pub use holder::{ReferenceHolder, ResolutionError, WaitPolicy, DEFAULT_POLL_INTERVAL};
pub use traits::{BranchResolver, Candidate, DateChoice, DateResolver, PathResolver, Resolver};
