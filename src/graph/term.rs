//! RDF terms and triples as seen by the crawler

use serde::{Deserialize, Serialize};

/// `rdfs:label`
pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";

/// `dbo:abstract`
pub const DBO_ABSTRACT: &str = "http://dbpedia.org/ontology/abstract";

/// XML Schema datatype namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";

/// Language preferred for labels and descriptions
pub const PREFERRED_LANGUAGE: &str = "en";

/// An inline value with no further structure to follow
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Literal {
    pub fn simple(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    pub fn lang(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    /// Typed literal in the XSD namespace, e.g. `xsd("1500", "gYear")`
    pub fn xsd(value: impl Into<String>, local: &str) -> Self {
        Self::typed(value, format!("{}{}", XSD_NAMESPACE, local))
    }
}

/// The object position of a triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Term {
    /// A dereferenceable resource
    Resource { uri: String },
    /// A blank node; never dereferenced
    Blank { id: String },
    /// An inline literal
    Literal(Literal),
}

impl Term {
    pub fn resource(uri: impl Into<String>) -> Self {
        Self::Resource { uri: uri.into() }
    }

    pub fn literal(literal: Literal) -> Self {
        Self::Literal(literal)
    }

    pub fn is_resource(&self) -> bool {
        matches!(self, Self::Resource { .. })
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// The URI if this term is a resource
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Self::Resource { uri } => Some(uri),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Self::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resource { uri } => write!(f, "<{}>", uri),
            Self::Blank { id } => write!(f, "_:{}", id),
            Self::Literal(lit) => match (&lit.language, &lit.datatype) {
                (Some(lang), _) => write!(f, "\"{}\"@{}", lit.value, lang),
                (None, Some(dt)) => write!(f, "\"{}\"^^<{}>", lit.value, dt),
                (None, None) => write!(f, "\"{}\"", lit.value),
            },
        }
    }
}

/// A single statement `(subject, predicate, object)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: String,
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }

    /// Statement pointing at another resource
    pub fn link(subject: impl Into<String>, predicate: impl Into<String>, target: impl Into<String>) -> Self {
        Self::new(subject, predicate, Term::resource(target))
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<{}> <{}> {}", self.subject, self.predicate, self.object)
    }
}

/// Segment of an IRI after the last `#` or `/`
pub fn local_name(iri: &str) -> &str {
    let trimmed = iri.trim_end_matches(['/', '#']);
    match trimmed.rfind(['#', '/']) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}
