use serde::{Deserialize, Serialize};

use brickledger_catalog::CatalogProvider;
use brickledger_core::{DomainError, DomainResult, PartColor, PartId, SourceSystem};
use brickledger_inventory::{DeclaredLocation, ImportBatch, ImportLine};

use crate::alias::{AliasTable, PartLookup};

/// One row of an external export, in the source system's own ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignLineItem {
    pub source_system: SourceSystem,
    pub source_part_id: String,
    pub source_color_id: i32,
    pub quantity: u32,
    #[serde(default = "unassigned")]
    pub declared_location: DeclaredLocation,
}

fn unassigned() -> DeclaredLocation {
    DeclaredLocation::Unassigned
}

/// Classification of one foreign line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Resolved { part_color: PartColor },
    /// Several canonical parts could be meant; the operator must add an
    /// alias scoped to this color.
    Ambiguous { candidates: Vec<PartId> },
    /// No alias for the part id, the color id, or both. When the color is
    /// missing and the part id is also ambiguous, the competing parts are
    /// listed so both problems surface together.
    Unresolved {
        part_missing: bool,
        color_missing: bool,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        ambiguous_candidates: Vec<PartId>,
    },
    /// Aliases exist but point at something the catalog does not know, or
    /// the line itself is malformed. Excluded from the batch.
    Rejected { error: DomainError },
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedItem {
    /// Position in the submitted export.
    pub index: usize,
    pub item: ForeignLineItem,
    pub resolution: Resolution,
}

/// Every line of an export, classified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub items: Vec<ResolvedItem>,
}

/// A batch that may be committed, plus the lines that were left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPlan {
    pub batch: ImportBatch,
    pub excluded: Vec<ResolvedItem>,
}

impl ResolutionReport {
    pub fn resolved_count(&self) -> usize {
        self.items.iter().filter(|i| i.resolution.is_resolved()).count()
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &ResolvedItem> {
        self.items
            .iter()
            .filter(|i| matches!(i.resolution, Resolution::Unresolved { .. }))
    }

    pub fn ambiguous(&self) -> impl Iterator<Item = &ResolvedItem> {
        self.items
            .iter()
            .filter(|i| matches!(i.resolution, Resolution::Ambiguous { .. }))
    }

    pub fn rejected(&self) -> impl Iterator<Item = &ResolvedItem> {
        self.items
            .iter()
            .filter(|i| matches!(i.resolution, Resolution::Rejected { .. }))
    }

    /// True when nothing blocks an import.
    pub fn is_importable(&self) -> bool {
        self.unresolved().next().is_none() && self.ambiguous().next().is_none()
    }

    /// Turn the report into a committable batch.
    ///
    /// Any unresolved or ambiguous line blocks the whole export. Rejected
    /// lines are excluded and returned alongside the batch.
    pub fn into_import_plan(self) -> DomainResult<ImportPlan> {
        let unresolved = self.unresolved().count();
        if unresolved > 0 {
            return Err(DomainError::unresolved(format!(
                "{unresolved} line(s) have no alias; run precheck and add the missing aliases"
            )));
        }
        let ambiguous = self.ambiguous().count();
        if ambiguous > 0 {
            return Err(DomainError::ambiguous(format!(
                "{ambiguous} line(s) match more than one canonical part; add color-scoped aliases"
            )));
        }

        let mut lines = Vec::new();
        let mut excluded = Vec::new();
        for resolved in self.items {
            match resolved.resolution {
                Resolution::Resolved { part_color } => lines.push(ImportLine {
                    part_color,
                    quantity: resolved.item.quantity,
                    location: resolved.item.declared_location,
                }),
                _ => excluded.push(resolved),
            }
        }
        if lines.is_empty() {
            return Err(DomainError::validation(format!(
                "no importable lines; {} line(s) were rejected",
                excluded.len()
            )));
        }
        Ok(ImportPlan {
            batch: ImportBatch::new(lines)?,
            excluded,
        })
    }
}

/// Resolves foreign lines against an alias table and the catalog. Pure: it
/// only reads.
pub struct Resolver<'a, C: ?Sized> {
    aliases: &'a AliasTable,
    catalog: &'a C,
}

impl<'a, C> Resolver<'a, C>
where
    C: CatalogProvider + ?Sized,
{
    pub fn new(aliases: &'a AliasTable, catalog: &'a C) -> Self {
        Self { aliases, catalog }
    }

    pub fn resolve_item(&self, item: &ForeignLineItem) -> Resolution {
        if item.quantity == 0 {
            return Resolution::Rejected {
                error: DomainError::validation("quantity must be positive"),
            };
        }

        let color = self
            .aliases
            .color_alias(item.source_system, item.source_color_id);
        let part = self.aliases.lookup_part(
            item.source_system,
            &item.source_part_id,
            item.source_color_id,
        );

        let (part, color) = match (part, color) {
            (PartLookup::Scoped(p) | PartLookup::Agnostic(p), Some(c)) => (p, c),
            (PartLookup::OtherScopes(candidates), Some(_)) => {
                return Resolution::Ambiguous { candidates };
            }
            (PartLookup::OtherScopes(candidates), None) => {
                return Resolution::Unresolved {
                    part_missing: false,
                    color_missing: true,
                    ambiguous_candidates: candidates,
                };
            }
            (lookup, color) => {
                return Resolution::Unresolved {
                    part_missing: lookup == PartLookup::Missing,
                    color_missing: color.is_none(),
                    ambiguous_candidates: Vec::new(),
                };
            }
        };

        let part_color = PartColor::new(part, color);
        match self.catalog.ensure_part_color(&part_color) {
            Ok(()) => Resolution::Resolved { part_color },
            Err(error) => {
                tracing::warn!(
                    source_system = %item.source_system,
                    source_part_id = %item.source_part_id,
                    source_color_id = item.source_color_id,
                    %part_color,
                    %error,
                    "alias points outside the catalog"
                );
                Resolution::Rejected { error }
            }
        }
    }

    pub fn resolve_batch(&self, items: &[ForeignLineItem]) -> ResolutionReport {
        let items: Vec<ResolvedItem> = items
            .iter()
            .enumerate()
            .map(|(index, item)| ResolvedItem {
                index,
                item: item.clone(),
                resolution: self.resolve_item(item),
            })
            .collect();
        let report = ResolutionReport { items };
        tracing::debug!(
            total = report.items.len(),
            resolved = report.resolved_count(),
            "export resolved"
        );
        report
    }
}

pub fn resolve_batch<C>(
    aliases: &AliasTable,
    catalog: &C,
    items: &[ForeignLineItem],
) -> ResolutionReport
where
    C: CatalogProvider + ?Sized,
{
    Resolver::new(aliases, catalog).resolve_batch(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickledger_catalog::{CanonicalColor, CanonicalPart, CatalogSnapshot, InMemoryCatalog, Rgb};
    use brickledger_core::ColorId;
    use chrono::Utc;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_snapshot(CatalogSnapshot {
            parts: vec![
                CanonicalPart::new(PartId::parse("3001").unwrap(), "Brick 2 x 4"),
                CanonicalPart::new(PartId::parse("a").unwrap(), "Variant A"),
                CanonicalPart::new(PartId::parse("b").unwrap(), "Variant B"),
            ],
            colors: vec![CanonicalColor::new(ColorId(4), "Red", Rgb { r: 0xC9, g: 0x1A, b: 0x09 })],
            sets: vec![],
        })
    }

    fn aliases() -> AliasTable {
        let mut table = AliasTable::new();
        let now = Utc::now();
        table
            .set_part_alias(SourceSystem::BrickLink, "3001", None, PartId::parse("3001").unwrap(), now)
            .unwrap();
        table
            .set_part_alias(SourceSystem::BrickLink, "x", Some(1), PartId::parse("a").unwrap(), now)
            .unwrap();
        table
            .set_part_alias(SourceSystem::BrickLink, "x", Some(2), PartId::parse("b").unwrap(), now)
            .unwrap();
        table
            .set_part_alias(SourceSystem::BrickLink, "ghost", None, PartId::parse("ghost").unwrap(), now)
            .unwrap();
        table.set_color_alias(SourceSystem::BrickLink, 5, ColorId(4), now);
        table
    }

    fn item(part: &str, color: i32, quantity: u32) -> ForeignLineItem {
        ForeignLineItem {
            source_system: SourceSystem::BrickLink,
            source_part_id: part.to_string(),
            source_color_id: color,
            quantity,
            declared_location: DeclaredLocation::Unassigned,
        }
    }

    #[test]
    fn classifies_each_line() {
        let report = resolve_batch(
            &aliases(),
            &catalog(),
            &[
                item("3001", 5, 2),
                item("3001", 99, 1),
                item("nope", 5, 1),
                item("x", 5, 1),
                item("ghost", 5, 1),
            ],
        );
        let statuses: Vec<_> = report.items.iter().map(|i| i.resolution.clone()).collect();

        assert_eq!(
            statuses[0],
            Resolution::Resolved {
                part_color: PartColor::new(PartId::parse("3001").unwrap(), ColorId(4))
            }
        );
        assert_eq!(
            statuses[1],
            Resolution::Unresolved {
                part_missing: false,
                color_missing: true,
                ambiguous_candidates: vec![],
            }
        );
        assert_eq!(
            statuses[2],
            Resolution::Unresolved {
                part_missing: true,
                color_missing: false,
                ambiguous_candidates: vec![],
            }
        );
        assert!(matches!(&statuses[3], Resolution::Ambiguous { candidates } if candidates.len() == 2));
        assert!(matches!(
            &statuses[4],
            Resolution::Rejected {
                error: DomainError::NotFound(_)
            }
        ));
        assert!(!report.is_importable());
    }

    #[test]
    fn missing_color_keeps_part_ambiguity() {
        let report = resolve_batch(&aliases(), &catalog(), &[item("x", 3, 1), item("3001", 11, 1)]);
        assert_eq!(
            report.items[0].resolution,
            Resolution::Unresolved {
                part_missing: false,
                color_missing: true,
                ambiguous_candidates: vec![PartId::parse("a").unwrap(), PartId::parse("b").unwrap()],
            }
        );
        assert!(matches!(
            &report.items[1].resolution,
            Resolution::Unresolved { ambiguous_candidates, .. } if ambiguous_candidates.is_empty()
        ));
    }

    #[test]
    fn unresolved_lines_block_the_plan() {
        let report = resolve_batch(&aliases(), &catalog(), &[item("3001", 5, 2), item("nope", 5, 1)]);
        assert!(matches!(report.into_import_plan(), Err(DomainError::Unresolved(_))));
    }

    #[test]
    fn rejected_lines_are_excluded_not_dropped() {
        let report = resolve_batch(&aliases(), &catalog(), &[item("3001", 5, 2), item("ghost", 5, 1)]);
        let plan = report.into_import_plan().unwrap();
        assert_eq!(plan.batch.lines().len(), 1);
        assert_eq!(plan.excluded.len(), 1);
        assert_eq!(plan.excluded[0].index, 1);
    }
}
