use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use brickledger_core::{Entity, LocationId};

/// Physical storage kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Drawer,
    /// Box/bin/bag; usually sits in a drawer but may be unassigned.
    Container,
}

impl core::fmt::Display for LocationKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LocationKind::Drawer => f.write_str("drawer"),
            LocationKind::Container => f.write_str("container"),
        }
    }
}

/// A drawer or container. Deletion is soft: `deleted_at` is set and the row
/// is kept for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLocation {
    pub id: LocationId,
    pub kind: LocationKind,
    pub name: String,
    /// Only containers have a parent, and it is always a drawer.
    pub parent: Option<LocationId>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl StorageLocation {
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

impl Entity for StorageLocation {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
