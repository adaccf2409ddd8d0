use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use brickledger_catalog::SetTemplate;
use brickledger_core::{LocationId, PartColor, SetInstanceId};

use crate::import::PlacedLine;
use crate::line::LocationRef;
use crate::location::LocationKind;
use crate::set_instance::SetStatus;

/// Command: CreateLocation. The caller chooses the id so a transaction can
/// refer to the new location in later commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLocation {
    pub location_id: LocationId,
    pub kind: LocationKind,
    pub name: String,
    pub parent: Option<LocationId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeleteLocation (soft delete).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteLocation {
    pub location_id: LocationId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RestoreLocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreLocation {
    pub location_id: LocationId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReparentContainer. `None` leaves the container unassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReparentContainer {
    pub location_id: LocationId,
    pub new_parent: Option<LocationId>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MoveStock between loose placements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveStock {
    pub part_color: PartColor,
    pub from: LocationRef,
    pub to: LocationRef,
    pub quantity: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MergeLocations. Everything held by `source` moves to
/// `destination` and `source` is soft-deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeLocations {
    pub source: LocationId,
    pub destination: LocationId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AcquireSet. The template comes from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquireSet {
    pub instance_id: SetInstanceId,
    pub template: SetTemplate,
    pub status: SetStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "lines", rename_all = "snake_case")]
pub enum PartOutSelection {
    /// Everything the copy still holds.
    All,
    Lines(Vec<(PartColor, u32)>),
}

/// Command: PartOut. Moves parts from a set copy into loose stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartOut {
    pub instance_id: SetInstanceId,
    pub selection: PartOutSelection,
    pub destination: LocationRef,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeSetStatus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSetStatus {
    pub instance_id: SetInstanceId,
    pub status: SetStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CommitImport. Lines are already resolved and placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitImport {
    pub fingerprint: String,
    pub lines: Vec<PlacedLine>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCommand {
    CreateLocation(CreateLocation),
    DeleteLocation(DeleteLocation),
    RestoreLocation(RestoreLocation),
    ReparentContainer(ReparentContainer),
    MoveStock(MoveStock),
    MergeLocations(MergeLocations),
    AcquireSet(AcquireSet),
    PartOut(PartOut),
    ChangeSetStatus(ChangeSetStatus),
    CommitImport(CommitImport),
}
