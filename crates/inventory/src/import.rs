use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use brickledger_core::{DomainError, DomainResult, LocationId, PartColor};

use crate::line::LocationRef;

/// Placement requested by an import row, before named locations are looked
/// up or created.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclaredLocation {
    Unassigned,
    Location { id: LocationId },
    /// Drawer by name, optionally a container inside it by name. Missing ones
    /// are created inside the import transaction.
    Named {
        drawer: String,
        #[serde(default)]
        container: Option<String>,
    },
}

impl DeclaredLocation {
    /// Parse an export's location column: empty means unassigned, otherwise
    /// `drawer` or `drawer|container`.
    pub fn from_path(raw: &str) -> DomainResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(DeclaredLocation::Unassigned);
        }
        let mut parts = raw.splitn(2, '|').map(str::trim);
        let drawer = parts.next().unwrap_or_default();
        if drawer.is_empty() {
            return Err(DomainError::validation(format!(
                "location '{raw}' has no drawer name"
            )));
        }
        let container = parts.next().filter(|c| !c.is_empty()).map(str::to_string);
        Ok(DeclaredLocation::Named {
            drawer: drawer.to_string(),
            container,
        })
    }

    /// Names trimmed and a blank container dropped: the form used both for
    /// placement and for fingerprinting.
    pub fn normalized(&self) -> Self {
        match self {
            DeclaredLocation::Named { drawer, container } => DeclaredLocation::Named {
                drawer: drawer.trim().to_string(),
                container: container
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string),
            },
            other => other.clone(),
        }
    }

    fn fingerprint_token(&self) -> String {
        match self.normalized() {
            DeclaredLocation::Unassigned => "-".to_string(),
            DeclaredLocation::Location { id } => format!("id:{id}"),
            DeclaredLocation::Named { drawer, container } => {
                format!("name:{drawer}|{}", container.unwrap_or_default())
            }
        }
    }
}

/// One canonical row of an import batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportLine {
    pub part_color: PartColor,
    pub quantity: u32,
    pub location: DeclaredLocation,
}

/// A fully resolved export, ready to be committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportBatch {
    lines: Vec<ImportLine>,
}

impl ImportBatch {
    pub fn new(lines: Vec<ImportLine>) -> DomainResult<Self> {
        if lines.is_empty() {
            return Err(DomainError::validation("import batch has no lines"));
        }
        if let Some(line) = lines.iter().find(|l| l.quantity == 0) {
            return Err(DomainError::validation(format!(
                "import line for {} has zero quantity",
                line.part_color
            )));
        }
        Ok(Self { lines })
    }

    pub fn lines(&self) -> &[ImportLine] {
        &self.lines
    }

    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Content hash of the batch, independent of row order.
    ///
    /// The same export committed twice yields the same fingerprint; a changed
    /// export (any row added, removed or edited) yields a new one.
    pub fn fingerprint(&self) -> String {
        let mut rows: Vec<String> = self
            .lines
            .iter()
            .map(|l| {
                format!(
                    "{}\t{}\t{}\t{}",
                    l.part_color.part,
                    l.part_color.color,
                    l.location.fingerprint_token(),
                    l.quantity
                )
            })
            .collect();
        rows.sort();

        let mut hasher = Sha256::new();
        for row in &rows {
            hasher.update(row.as_bytes());
            hasher.update(b"\n");
        }
        format!("{:x}", hasher.finalize())
    }
}

/// An import row after its location has been materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedLine {
    pub part_color: PartColor,
    pub location: LocationRef,
    pub quantity: u32,
}

/// Ledger-side record of a committed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub fingerprint: String,
    pub committed_at: DateTime<Utc>,
    pub line_count: usize,
    pub total_quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReceipt {
    pub fingerprint: String,
    pub lines_applied: usize,
    pub quantity_added: u64,
    pub locations_created: Vec<LocationId>,
    /// Export rows left out because they could not be committed.
    pub lines_excluded: usize,
}

/// Result of an import attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ImportOutcome {
    Committed(ImportReceipt),
    /// The same batch was committed before; nothing was written.
    AlreadyImported(ImportRecord),
}
