//! Ledger events and the audit envelope they are recorded in.
//!
//! Events are facts describing a committed change. The ledger aggregate emits
//! them from `handle`, evolves its state from them in `apply`, and the store
//! appends each one to the audit log wrapped in an [`EventEnvelope`].

pub mod envelope;
pub mod event;
pub mod handler;

pub use envelope::EventEnvelope;
pub use event::Event;
pub use handler::execute;
