use serde::{Deserialize, Serialize};

use brickledger_core::{LocationId, PartColor, SetInstanceId};

/// Where a quantity sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum LocationRef {
    /// Loose, not yet put away.
    Unassigned,
    Storage(LocationId),
    Set(SetInstanceId),
}

impl LocationRef {
    /// Status follows placement: anything held by a set copy is `InSet`.
    pub fn status(&self) -> LineStatus {
        match self {
            LocationRef::Set(_) => LineStatus::InSet,
            LocationRef::Unassigned | LocationRef::Storage(_) => LineStatus::Loose,
        }
    }
}

impl core::fmt::Display for LocationRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LocationRef::Unassigned => f.write_str("unassigned"),
            LocationRef::Storage(id) => write!(f, "location:{id}"),
            LocationRef::Set(id) => write!(f, "set:{id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    Loose,
    InSet,
}

/// Identity of one ledger line. At most one line exists per key; its
/// quantity is kept in the ledger's line map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub part_color: PartColor,
    pub location: LocationRef,
}

impl LineKey {
    pub fn new(part_color: PartColor, location: LocationRef) -> Self {
        Self {
            part_color,
            location,
        }
    }

    pub fn status(&self) -> LineStatus {
        self.location.status()
    }
}
