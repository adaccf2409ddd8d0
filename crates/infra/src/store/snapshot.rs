use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use brickledger_events::EventEnvelope;
use brickledger_inventory::LedgerEvent;

use super::{InMemoryLedgerStore, StoreError, StoreState};

const FORMAT_VERSION: u32 = 1;

/// On-disk form of the store.
///
/// Loading does not re-run write-time checks; a hand-edited or corrupted
/// snapshot is what the sanity checker is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub format_version: u32,
    pub saved_at: DateTime<Utc>,
    pub state: StoreState,
    #[serde(default)]
    pub audit: Vec<EventEnvelope<LedgerEvent>>,
}

impl InMemoryLedgerStore {
    pub fn to_snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        let (state, audit) = self.to_parts()?;
        Ok(StoreSnapshot {
            format_version: FORMAT_VERSION,
            saved_at: Utc::now(),
            state,
            audit,
        })
    }

    pub fn from_snapshot(snapshot: StoreSnapshot) -> Result<Self, StoreError> {
        if snapshot.format_version != FORMAT_VERSION {
            return Err(StoreError::UnsupportedFormat(snapshot.format_version));
        }
        Ok(Self::from_parts(snapshot.state, snapshot.audit))
    }

    /// Write the snapshot next to `path` and rename it into place.
    pub fn save_json(&self, path: &Path) -> Result<(), StoreError> {
        let io = |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io)?;
        }
        let json = serde_json::to_vec_pretty(&self.to_snapshot()?)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io)?;
        fs::rename(&tmp, path).map_err(io)?;
        tracing::info!(path = %path.display(), "snapshot saved");
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self, StoreError> {
        let bytes = fs::read(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: StoreSnapshot = serde_json::from_slice(&bytes)?;
        let store = Self::from_snapshot(snapshot)?;
        tracing::info!(path = %path.display(), "snapshot loaded");
        Ok(store)
    }

    /// Load `path` if it exists, otherwise start empty.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if path.exists() {
            Self::load_json(path)
        } else {
            tracing::info!(path = %path.display(), "no snapshot found; starting empty");
            Ok(Self::new())
        }
    }
}
