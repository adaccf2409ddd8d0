use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use brickledger_core::{PartId, SourceSystem};

use crate::alias::AliasTable;

/// A proposed alias for an unresolved source part id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasSuggestion {
    /// Known source id the unresolved one resembles.
    pub similar_source_id: String,
    /// Where that known id points.
    pub canonical: PartId,
    /// Normalized Levenshtein similarity in `0.0..=1.0`.
    pub similarity: f64,
}

/// Typo assist: compares an unresolved source part id against the source ids
/// that already have aliases in the same system.
///
/// Suggestions are advisory only. Nothing here writes an alias.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypoAssist {
    pub threshold: f64,
    pub max_candidates: usize,
}

impl Default for TypoAssist {
    fn default() -> Self {
        Self {
            threshold: 0.75,
            max_candidates: 3,
        }
    }
}

impl TypoAssist {
    pub fn new(threshold: f64, max_candidates: usize) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            max_candidates,
        }
    }

    pub fn suggest(
        &self,
        aliases: &AliasTable,
        system: SourceSystem,
        unresolved_source_id: &str,
    ) -> Vec<AliasSuggestion> {
        let needle = unresolved_source_id.trim().to_ascii_lowercase();
        if needle.is_empty() || self.max_candidates == 0 {
            return Vec::new();
        }

        let mut scored: Vec<AliasSuggestion> = aliases
            .known_part_ids(system)
            .into_iter()
            .filter_map(|(known, canonical)| {
                let similarity =
                    strsim::normalized_levenshtein(&needle, &known.to_ascii_lowercase());
                (similarity >= self.threshold).then(|| AliasSuggestion {
                    similar_source_id: known.to_string(),
                    canonical: canonical.clone(),
                    similarity,
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.similar_source_id.cmp(&b.similar_source_id))
        });
        scored.truncate(self.max_candidates);

        tracing::debug!(
            %system,
            source_part_id = unresolved_source_id,
            candidates = scored.len(),
            "typo assist"
        );
        scored
    }
}
