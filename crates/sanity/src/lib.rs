//! `brickledger-sanity`
//!
//! Read-only auditor over a ledger snapshot.
//!
//! - It never mutates the ledger or the catalog.
//! - It emits **anomaly reports**, not ledger events.
//! - Anomalies are information, not failures: a clean report is the success
//!   case and a non-empty one is still a successful run.

pub mod anomaly;
pub mod checker;

pub use anomaly::{Anomaly, AnomalyKind, EntityRef};
pub use checker::{run_checks, SanityChecker, SanityReport};
