//! Restrictions a candidate must satisfy to be accepted

use crate::graph::Term;
use crate::session::{GraphSession, SessionResult};
use serde::{Deserialize, Serialize};

/// A required relation, identified by namespace and local name
///
/// Satisfied by a resource when at least one `(resource, namespace+link, *)`
/// statement is known about it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Restriction {
    pub namespace: String,
    pub link: String,
}

impl Restriction {
    pub fn new(namespace: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            link: link.into(),
        }
    }

    /// Full predicate IRI
    pub fn predicate(&self) -> String {
        format!("{}{}", self.namespace, self.link)
    }
}

/// Check a candidate object against every restriction.
///
/// Literals and blank nodes are never dereferenced and always pass. A
/// resource is fetched into the session first, then must carry a statement
/// for each restriction; the first unmet restriction short-circuits.
pub fn meets_requirements(
    session: &mut dyn GraphSession,
    restrictions: &[Restriction],
    candidate: &Term,
) -> SessionResult<bool> {
    let Some(uri) = candidate.as_uri() else {
        return Ok(true);
    };
    session.fetch(uri)?;
    Ok(restrictions
        .iter()
        .all(|r| session.has_statement(uri, &r.predicate())))
}
