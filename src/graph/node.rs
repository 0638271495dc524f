//! Nodes of the result tree

use super::term::{local_name, Literal, Term};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Identifier of a node within its tree
///
/// Allocated monotonically; the root is always `NodeId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a non-root node stands for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Payload {
    Resource {
        uri: String,
    },
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
    },
}

impl Payload {
    /// Convert a graph term into a payload. Blank nodes have no payload.
    pub fn from_term(term: &Term) -> Option<Self> {
        match term {
            Term::Resource { uri } => Some(Self::Resource { uri: uri.clone() }),
            Term::Literal(Literal { value, datatype, .. }) => Some(Self::Literal {
                value: value.clone(),
                datatype: datatype.clone(),
            }),
            Term::Blank { .. } => None,
        }
    }

    pub fn uri(&self) -> Option<&str> {
        match self {
            Self::Resource { uri } => Some(uri),
            Self::Literal { .. } => None,
        }
    }

    /// Name used until a better one (e.g. a label) is known
    pub fn fallback_name(&self) -> String {
        match self {
            Self::Resource { uri } => local_name(uri).replace('_', " "),
            Self::Literal { value, .. } => value.clone(),
        }
    }
}

/// A temporal value read off a date-typed literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum DateValue {
    DateTime(DateTime<FixedOffset>),
    LocalDateTime(NaiveDateTime),
    Date(NaiveDate),
    Year(i32),
    /// Lexical form that none of the formats above accept (durations, gMonthDay, ...)
    Raw(String),
}

impl DateValue {
    pub fn parse(lexical: &str) -> Self {
        let s = lexical.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Self::DateTime(dt);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
            return Self::LocalDateTime(dt);
        }
        let date_part = s.strip_suffix('Z').unwrap_or(s);
        if let Ok(d) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            return Self::Date(d);
        }
        if let Ok(year) = date_part.parse::<i32>() {
            return Self::Year(year);
        }
        Self::Raw(s.to_string())
    }
}

/// A node in the result tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// `None` only for the root
    pub payload: Option<Payload>,
    pub children: Vec<NodeId>,
    /// Lookup-only back reference
    pub parent: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateValue>,
}

impl Node {
    pub(crate) fn root() -> Self {
        Self {
            id: NodeId::ROOT,
            payload: None,
            children: Vec::new(),
            parent: None,
            name: None,
            uri: None,
            description: None,
            start_date: None,
            end_date: None,
        }
    }

    pub(crate) fn child(id: NodeId, parent: NodeId, payload: Payload) -> Self {
        let uri = payload.uri().map(str::to_string);
        let name = Some(payload.fallback_name());
        Self {
            id,
            payload: Some(payload),
            children: Vec::new(),
            parent: Some(parent),
            name,
            uri,
            description: None,
            start_date: None,
            end_date: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.payload.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<root>")
    }
}
