use core::str::FromStr;

use serde::{Deserialize, Serialize};

use brickledger_core::{DomainError, DomainResult, Entity, SetInstanceId, SetNumber};

/// Lifecycle status of an owned set copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetStatus {
    Built,
    InBox,
    #[serde(rename = "wip")]
    WorkInProgress,
    Teardown,
    LooseParts,
}

impl SetStatus {
    pub const ALL: [SetStatus; 5] = [
        SetStatus::Built,
        SetStatus::InBox,
        SetStatus::WorkInProgress,
        SetStatus::Teardown,
        SetStatus::LooseParts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SetStatus::Built => "built",
            SetStatus::InBox => "in_box",
            SetStatus::WorkInProgress => "wip",
            SetStatus::Teardown => "teardown",
            SetStatus::LooseParts => "loose_parts",
        }
    }

    /// Human-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            SetStatus::Built => "Built",
            SetStatus::InBox => "In box",
            SetStatus::WorkInProgress => "Work in progress",
            SetStatus::Teardown => "Teardown",
            SetStatus::LooseParts => "Loose parts",
        }
    }

    /// Statuses in which the copy is still (meant to be) complete; a partial
    /// part-out moves these to `Teardown`.
    pub fn is_intact(&self) -> bool {
        matches!(
            self,
            SetStatus::Built | SetStatus::InBox | SetStatus::WorkInProgress
        )
    }

    /// Validate a manual status change.
    ///
    /// `exhausted` is true when the copy no longer holds any parts. Only a
    /// part-out may move a copy to `LooseParts`, and an exhausted copy cannot
    /// leave it.
    pub fn check_transition(self, to: SetStatus, exhausted: bool) -> DomainResult<()> {
        if self == SetStatus::LooseParts && exhausted {
            return Err(DomainError::invariant(
                "a fully parted-out set cannot be rebuilt; re-acquire it instead",
            ));
        }
        if to == SetStatus::LooseParts && !exhausted {
            return Err(DomainError::invariant(
                "only a part-out that exhausts the set may mark it loose_parts",
            ));
        }
        Ok(())
    }
}

impl core::fmt::Display for SetStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetStatus {
    type Err = DomainError;

    /// Accepts the canonical names plus the spellings older exports used.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "built" | "assembled" => Ok(SetStatus::Built),
            "in_box" | "inbox" | "boxed" | "sealed" | "new" => Ok(SetStatus::InBox),
            "wip" | "work_in_progress" | "in_progress" | "building" => {
                Ok(SetStatus::WorkInProgress)
            }
            "teardown" | "tear_down" | "partially_parted_out" => Ok(SetStatus::Teardown),
            "loose_parts" | "loose" | "parted_out" => Ok(SetStatus::LooseParts),
            _ => Err(DomainError::validation(format!("unknown set status '{s}'"))),
        }
    }
}

/// One physically owned copy of a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetInstance {
    pub id: SetInstanceId,
    pub set_number: SetNumber,
    /// 1-based, per set number, in acquisition order.
    pub copy_index: u32,
    pub status: SetStatus,
}

impl Entity for SetInstance {
    type Id = SetInstanceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
