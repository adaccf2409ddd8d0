//! Transactional in-memory store for the ledger, the alias table and the
//! audit log.

mod in_memory;
mod snapshot;

pub use in_memory::{InMemoryLedgerStore, StoreState, Transaction};
pub use snapshot::StoreSnapshot;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("snapshot I/O failed for {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot format version {0}")]
    UnsupportedFormat(u32),
}
