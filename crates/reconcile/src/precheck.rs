use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use brickledger_catalog::CatalogProvider;
use brickledger_core::{DomainError, PartId, SourceSystem};

use crate::alias::AliasTable;
use crate::resolve::{ForeignLineItem, Resolution, Resolver};
use crate::suggest::{AliasSuggestion, TypoAssist};

/// A source part id with no usable alias, counted across the export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnresolvedPart {
    pub system: SourceSystem,
    pub source_part_id: String,
    pub occurrences: usize,
    pub total_quantity: u64,
    pub suggestions: Vec<AliasSuggestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedColor {
    pub system: SourceSystem,
    pub source_color_id: i32,
    pub occurrences: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbiguousItem {
    pub system: SourceSystem,
    pub source_part_id: String,
    pub source_color_id: i32,
    pub candidates: Vec<PartId>,
    pub occurrences: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedItem {
    pub index: usize,
    pub item: ForeignLineItem,
    pub error: DomainError,
}

/// Everything that would stop (or trim) an import, collected in one pass so
/// the operator can fix it all at once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrecheckReport {
    pub total_items: usize,
    pub resolved_items: usize,
    pub unresolved_parts: Vec<UnresolvedPart>,
    pub unresolved_colors: Vec<UnresolvedColor>,
    pub ambiguous: Vec<AmbiguousItem>,
    pub rejected: Vec<RejectedItem>,
}

impl PrecheckReport {
    /// No unresolved or ambiguous ids remain. Rejected lines do not block.
    pub fn is_clean(&self) -> bool {
        self.unresolved_parts.is_empty()
            && self.unresolved_colors.is_empty()
            && self.ambiguous.is_empty()
    }
}

type AmbiguityKey = (SourceSystem, String, i32);

fn note_ambiguous(
    ambiguous: &mut BTreeMap<AmbiguityKey, AmbiguousItem>,
    item: &ForeignLineItem,
    candidates: &[PartId],
) {
    let source_part_id = item.source_part_id.trim().to_string();
    ambiguous
        .entry((item.source_system, source_part_id.clone(), item.source_color_id))
        .or_insert_with(|| AmbiguousItem {
            system: item.source_system,
            source_part_id,
            source_color_id: item.source_color_id,
            candidates: candidates.to_vec(),
            occurrences: 0,
        })
        .occurrences += 1;
}

/// Dry-run an export: resolve every line, aggregate what is missing and
/// propose aliases for unknown part ids. Reads only; calling it any number of
/// times leaves aliases, catalog and ledger as they were.
pub fn precheck<C>(
    aliases: &AliasTable,
    catalog: &C,
    items: &[ForeignLineItem],
    assist: &TypoAssist,
) -> PrecheckReport
where
    C: CatalogProvider + ?Sized,
{
    let report = Resolver::new(aliases, catalog).resolve_batch(items);

    let mut parts: BTreeMap<(SourceSystem, String), (usize, u64)> = BTreeMap::new();
    let mut colors: BTreeMap<(SourceSystem, i32), usize> = BTreeMap::new();
    let mut ambiguous: BTreeMap<AmbiguityKey, AmbiguousItem> = BTreeMap::new();
    let mut rejected = Vec::new();

    for resolved in &report.items {
        let item = &resolved.item;
        match &resolved.resolution {
            Resolution::Resolved { .. } => {}
            Resolution::Unresolved {
                part_missing,
                color_missing,
                ambiguous_candidates,
            } => {
                if !ambiguous_candidates.is_empty() {
                    note_ambiguous(&mut ambiguous, item, ambiguous_candidates);
                }
                if *part_missing {
                    let entry = parts
                        .entry((item.source_system, item.source_part_id.trim().to_string()))
                        .or_insert((0, 0));
                    entry.0 += 1;
                    entry.1 += u64::from(item.quantity);
                }
                if *color_missing {
                    *colors
                        .entry((item.source_system, item.source_color_id))
                        .or_insert(0) += 1;
                }
            }
            Resolution::Ambiguous { candidates } => {
                note_ambiguous(&mut ambiguous, item, candidates);
            }
            Resolution::Rejected { error } => rejected.push(RejectedItem {
                index: resolved.index,
                item: item.clone(),
                error: error.clone(),
            }),
        }
    }

    let unresolved_parts = parts
        .into_iter()
        .map(|((system, source_part_id), (occurrences, total_quantity))| {
            let suggestions = assist.suggest(aliases, system, &source_part_id);
            UnresolvedPart {
                system,
                source_part_id,
                occurrences,
                total_quantity,
                suggestions,
            }
        })
        .collect();
    let unresolved_colors = colors
        .into_iter()
        .map(|((system, source_color_id), occurrences)| UnresolvedColor {
            system,
            source_color_id,
            occurrences,
        })
        .collect();

    let precheck = PrecheckReport {
        total_items: report.items.len(),
        resolved_items: report.resolved_count(),
        unresolved_parts,
        unresolved_colors,
        ambiguous: ambiguous.into_values().collect(),
        rejected,
    };
    tracing::info!(
        total = precheck.total_items,
        resolved = precheck.resolved_items,
        unresolved_parts = precheck.unresolved_parts.len(),
        unresolved_colors = precheck.unresolved_colors.len(),
        ambiguous = precheck.ambiguous.len(),
        rejected = precheck.rejected.len(),
        "precheck finished"
    );
    precheck
}
