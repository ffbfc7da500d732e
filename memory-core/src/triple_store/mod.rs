//! Long-term memory storage: the RDF/SPARQL mapping layer (C9, C10, C11).
//!
//! [`queries`] is the vocabulary; [`ontology`] loads it into a fresh store;
//! [`adapter`] is the only thing callers outside this module should touch.

pub mod adapter;
pub mod ontology;
pub mod queries;

pub use adapter::{AdapterStats, MemoryInput, QueryOptions, StoredMemory, TripleStoreAdapter};
pub use ontology::load_ontology;
pub use queries::Relationship;
