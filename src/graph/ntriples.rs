//! N-Triples ingestion

use super::term::{Literal, Term, Triple};
use rio_api::model::{Literal as RioLiteral, Subject, Term as RioTerm};
use rio_api::parser::TriplesParser;
use rio_turtle::{NTriplesParser, TurtleError};
use std::io::BufRead;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NTriplesError {
    #[error("N-Triples syntax error: {0}")]
    Syntax(#[from] TurtleError),
}

/// Parse an N-Triples document.
///
/// Statements whose subject is a quoted triple are skipped, as are
/// quoted-triple objects.
pub fn parse_ntriples<R: BufRead>(reader: R) -> Result<Vec<Triple>, NTriplesError> {
    let mut out = Vec::new();
    NTriplesParser::new(reader).parse_all(&mut |t| -> Result<(), NTriplesError> {
        // Blank subjects are keyed by the same `_:id` form a blank object displays as
        let subject = match t.subject {
            Subject::NamedNode(n) => n.iri.to_string(),
            Subject::BlankNode(b) => Term::Blank { id: b.id.to_string() }.to_string(),
            _ => return Ok(()),
        };
        let object = match t.object {
            RioTerm::NamedNode(n) => Term::resource(n.iri),
            RioTerm::BlankNode(b) => Term::Blank { id: b.id.to_string() },
            RioTerm::Literal(RioLiteral::Simple { value }) => Term::literal(Literal::simple(value)),
            RioTerm::Literal(RioLiteral::LanguageTaggedString { value, language }) => {
                Term::literal(Literal::lang(value, language))
            }
            RioTerm::Literal(RioLiteral::Typed { value, datatype }) => {
                Term::literal(Literal::typed(value, datatype.iri))
            }
            _ => return Ok(()),
        };
        out.push(Triple::new(subject, t.predicate.iri, object));
        Ok(())
    })?;
    Ok(out)
}
