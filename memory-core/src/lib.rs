//! Two-tier session memory for coding-assistant agents.
//!
//! Short-lived working context and a scored pending queue live in process
//! memory for the life of a session ([`session`], [`working_context`],
//! [`pending`], [`access_log`]); anything that clears the promotion bar
//! gets written into a per-session RDF store that outlives the session
//! ([`triple_store`], [`store`]). [`facade::Memory`] is the entry point
//! that ties all of it together; most callers only need that module.

pub mod access_log;
pub mod config;
pub mod constants;
pub mod context_builder;
pub mod error;
pub mod facade;
pub mod pending;
pub mod promotion;
pub mod response_processor;
pub mod scorer;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod token_counter;
pub mod triple_store;
pub mod types;
pub mod working_context;

pub use error::{Error, Result};
pub use facade::{Memory, RecallInput, RememberInput};
