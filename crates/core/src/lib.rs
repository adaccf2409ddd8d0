//! `brickledger-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers shared by every other crate, the error taxonomy, and the
//! aggregate/entity traits the ledger is built on.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod pairs;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ColorId, EntryId, LocationId, PartColor, PartId, SetInstanceId, SetNumber, SourceSystem};
