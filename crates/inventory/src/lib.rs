//! Inventory ledger (event-sourced).
//!
//! Quantity-by-location bookkeeping for loose storage, containers, drawers and
//! assembled sets, implemented purely as deterministic domain logic (no IO, no
//! storage). Every operation is a [`LedgerCommand`] decided against current
//! state into [`LedgerEvent`]s; a command either produces all of its events or
//! fails with no effect.

pub mod command;
pub mod event;
pub mod import;
pub mod ledger;
pub mod line;
pub mod location;
pub mod set_instance;

pub use command::{
    AcquireSet, ChangeSetStatus, CommitImport, CreateLocation, DeleteLocation, LedgerCommand,
    MergeLocations, MoveStock, PartOut, PartOutSelection, ReparentContainer, RestoreLocation,
};
pub use event::LedgerEvent;
pub use import::{DeclaredLocation, ImportBatch, ImportLine, ImportOutcome, ImportReceipt, ImportRecord, PlacedLine};
pub use ledger::{Ledger, LedgerTotals};
pub use line::{LineKey, LineStatus, LocationRef};
pub use location::{LocationKind, StorageLocation};
pub use set_instance::{SetInstance, SetStatus};
