use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use brickledger_catalog::SetTemplate;
use brickledger_core::{LocationId, PartColor, SetInstanceId};
use brickledger_events::Event;

use crate::import::PlacedLine;
use crate::line::LocationRef;
use crate::location::StorageLocation;
use crate::set_instance::{SetInstance, SetStatus};

/// Event: LocationCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCreated {
    pub location: StorageLocation,
}

/// Event: LocationDeleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDeleted {
    pub location_id: LocationId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LocationRestored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRestored {
    pub location_id: LocationId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ContainerReparented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerReparented {
    pub location_id: LocationId,
    pub previous_parent: Option<LocationId>,
    pub new_parent: Option<LocationId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StockMoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMoved {
    pub part_color: PartColor,
    pub from: LocationRef,
    pub to: LocationRef,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: LocationsMerged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationsMerged {
    pub source: LocationId,
    pub destination: LocationId,
    pub transferred: Vec<(PartColor, i64)>,
    /// Empty child containers of `source` and the parent they now have.
    pub children: Vec<LocationId>,
    pub children_parent: Option<LocationId>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SetAcquired. Carries the template so replaying the log never needs
/// the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetAcquired {
    pub instance: SetInstance,
    pub template: SetTemplate,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SetPartedOut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPartedOut {
    pub instance_id: SetInstanceId,
    pub destination: LocationRef,
    pub lines: Vec<(PartColor, i64)>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SetStatusChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetStatusChanged {
    pub instance_id: SetInstanceId,
    pub from: SetStatus,
    pub to: SetStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: BatchImported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchImported {
    pub fingerprint: String,
    pub lines: Vec<PlacedLine>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    LocationCreated(LocationCreated),
    LocationDeleted(LocationDeleted),
    LocationRestored(LocationRestored),
    ContainerReparented(ContainerReparented),
    StockMoved(StockMoved),
    LocationsMerged(LocationsMerged),
    SetAcquired(SetAcquired),
    SetPartedOut(SetPartedOut),
    SetStatusChanged(SetStatusChanged),
    BatchImported(BatchImported),
}

impl Event for LedgerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::LocationCreated(_) => "ledger.location.created",
            LedgerEvent::LocationDeleted(_) => "ledger.location.deleted",
            LedgerEvent::LocationRestored(_) => "ledger.location.restored",
            LedgerEvent::ContainerReparented(_) => "ledger.location.reparented",
            LedgerEvent::StockMoved(_) => "ledger.stock.moved",
            LedgerEvent::LocationsMerged(_) => "ledger.location.merged",
            LedgerEvent::SetAcquired(_) => "ledger.set.acquired",
            LedgerEvent::SetPartedOut(_) => "ledger.set.parted_out",
            LedgerEvent::SetStatusChanged(_) => "ledger.set.status_changed",
            LedgerEvent::BatchImported(_) => "ledger.import.committed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LedgerEvent::LocationCreated(e) => e.location.created_at,
            LedgerEvent::LocationDeleted(e) => e.occurred_at,
            LedgerEvent::LocationRestored(e) => e.occurred_at,
            LedgerEvent::ContainerReparented(e) => e.occurred_at,
            LedgerEvent::StockMoved(e) => e.occurred_at,
            LedgerEvent::LocationsMerged(e) => e.occurred_at,
            LedgerEvent::SetAcquired(e) => e.occurred_at,
            LedgerEvent::SetPartedOut(e) => e.occurred_at,
            LedgerEvent::SetStatusChanged(e) => e.occurred_at,
            LedgerEvent::BatchImported(e) => e.occurred_at,
        }
    }
}
