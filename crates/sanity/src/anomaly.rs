use serde::{Deserialize, Serialize};

use brickledger_core::{LocationId, PartColor, SetInstanceId};
use brickledger_inventory::LocationRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A set copy holds more of a part than its template lists.
    TemplateCapacityExceeded,
    NegativeBalance,
    /// A part, color or set template the catalog does not know.
    UnknownCanonicalReference,
    /// InSet line whose set copy does not exist.
    OrphanedSetLine,
    /// Loose line at a missing or deleted location.
    DanglingLocation,
    /// `loose_parts` copy that still holds parts.
    StatusLineMismatch,
    /// Copy in an intact status that is short of template parts.
    MissingTemplateParts,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::TemplateCapacityExceeded => "template_capacity_exceeded",
            AnomalyKind::NegativeBalance => "negative_balance",
            AnomalyKind::UnknownCanonicalReference => "unknown_canonical_reference",
            AnomalyKind::OrphanedSetLine => "orphaned_set_line",
            AnomalyKind::DanglingLocation => "dangling_location",
            AnomalyKind::StatusLineMismatch => "status_line_mismatch",
            AnomalyKind::MissingTemplateParts => "missing_template_parts",
        }
    }
}

impl core::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an anomaly is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum EntityRef {
    SetInstance { id: SetInstanceId },
    Location { id: LocationId },
    Line { part_color: PartColor, location: LocationRef },
    PartColor { part_color: PartColor },
}

impl core::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            EntityRef::SetInstance { id } => write!(f, "set:{id}"),
            EntityRef::Location { id } => write!(f, "location:{id}"),
            EntityRef::Line {
                part_color,
                location,
            } => write!(f, "line:{part_color}@{location}"),
            EntityRef::PartColor { part_color } => write!(f, "part_color:{part_color}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub entity_ref: EntityRef,
    pub detail: String,
}

impl Anomaly {
    pub fn new(kind: AnomalyKind, entity_ref: EntityRef, detail: impl Into<String>) -> Self {
        Self {
            kind,
            entity_ref,
            detail: detail.into(),
        }
    }
}
