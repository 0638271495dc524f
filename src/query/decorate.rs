//! Fill in display metadata for freshly created nodes

use super::query_data::QueryData;
use crate::graph::{DateValue, Literal, Node, Triple, DBO_ABSTRACT, PREFERRED_LANGUAGE, RDFS_LABEL};
use crate::session::{GraphSession, ObjectFilter};
use tracing::warn;

/// Preferred-language literal, else the first literal of any language
fn pick_literal(triples: &[Triple]) -> Option<&Literal> {
    let literals = || triples.iter().filter_map(|t| t.object.as_literal());
    literals()
        .find(|l| l.language.as_deref() == Some(PREFERRED_LANGUAGE))
        .or_else(|| literals().next())
}

fn first_date(session: &dyn GraphSession, uri: &str, predicate: &str) -> Option<DateValue> {
    session
        .select(uri, Some(predicate), ObjectFilter::Literals)
        .first()
        .and_then(|t| t.object.as_literal())
        .map(|l| DateValue::parse(&l.value))
}

/// Set name, description and dates on a resource node from fetched data.
///
/// Only reads what the session already holds; literal nodes keep their
/// fallback name. The end date defaults to the start date.
pub fn decorate(node: &mut Node, query: &QueryData) {
    let Some(uri) = node.uri.clone() else {
        return;
    };
    let session = query.session();

    let labels = session.select(&uri, Some(RDFS_LABEL), ObjectFilter::Literals);
    if let Some(label) = pick_literal(&labels) {
        node.name = Some(label.value.clone());
    }

    let abstracts = session.select(&uri, Some(DBO_ABSTRACT), ObjectFilter::Literals);
    if let Some(description) = abstracts
        .iter()
        .filter_map(|t| t.object.as_literal())
        .find(|l| l.language.as_deref() == Some(PREFERRED_LANGUAGE))
    {
        node.description = Some(description.value.clone());
    }

    if let Some(start) = &query.start_date_predicate {
        node.start_date = first_date(session, &uri, start);
    }
    if let Some(end) = &query.end_date_predicate {
        node.end_date = first_date(session, &uri, end);
    }
    match (&node.start_date, &node.end_date) {
        (Some(start), None) => node.end_date = Some(start.clone()),
        (None, _) if query.start_date_predicate.is_some() => {
            warn!(target: "lineage::crawl", %uri, "no start date");
        }
        _ => {}
    }
}
