//! Core data model: RDF terms, the result tree and its nodes

mod node;
pub mod ntriples;
mod term;
mod tree;


pub use node::{DateValue, Node, NodeId, Payload};
pub use ntriples::{parse_ntriples, NTriplesError};
pub use term::{
    local_name, Literal, Term, Triple, DBO_ABSTRACT, PREFERRED_LANGUAGE, RDFS_LABEL, XSD_NAMESPACE,
};
pub use tree::DataTree;
