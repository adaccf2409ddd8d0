use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use brickledger_core::{ColorId, DomainError, DomainResult, PartId, SourceSystem};

/// Key of a part alias. `color_scope` narrows the alias to one source color:
/// some systems reuse a part id for designs that the catalog splits by color
/// (printed variants, for instance).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartAliasKey {
    pub system: SourceSystem,
    pub source_part_id: String,
    pub color_scope: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColorAliasKey {
    pub system: SourceSystem,
    pub source_color_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AliasKey {
    Part(PartAliasKey),
    Color(ColorAliasKey),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AliasTarget {
    Part(PartId),
    Color(ColorId),
}

/// One change to the alias table. Replaced mappings stay visible here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRevision {
    pub revision: u64,
    pub key: AliasKey,
    pub previous: Option<AliasTarget>,
    pub current: AliasTarget,
    pub recorded_at: DateTime<Utc>,
}

/// Result of looking up a source part id for a given source color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartLookup {
    /// Alias scoped to exactly this source color.
    Scoped(PartId),
    /// Color-agnostic alias.
    Agnostic(PartId),
    /// Only aliases scoped to other colors exist and they disagree; the
    /// candidates are their distinct targets (at least two).
    OtherScopes(Vec<PartId>),
    Missing,
}

/// Source-id to canonical-id mappings, plus their history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasTable {
    #[serde(with = "brickledger_core::pairs")]
    parts: BTreeMap<PartAliasKey, PartId>,
    #[serde(with = "brickledger_core::pairs")]
    colors: BTreeMap<ColorAliasKey, ColorId>,
    #[serde(default)]
    history: Vec<AliasRevision>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a part alias. Returns the canonical id it replaced,
    /// if any. Re-setting an identical mapping records nothing.
    pub fn set_part_alias(
        &mut self,
        system: SourceSystem,
        source_part_id: &str,
        color_scope: Option<i32>,
        canonical: PartId,
        recorded_at: DateTime<Utc>,
    ) -> DomainResult<Option<PartId>> {
        let source_part_id = source_part_id.trim();
        if source_part_id.is_empty() {
            return Err(DomainError::validation("source part id cannot be empty"));
        }
        let key = PartAliasKey {
            system,
            source_part_id: source_part_id.to_string(),
            color_scope,
        };
        if self.parts.get(&key) == Some(&canonical) {
            return Ok(Some(canonical));
        }
        let previous = self.parts.insert(key.clone(), canonical.clone());
        self.record(
            AliasKey::Part(key),
            previous.clone().map(AliasTarget::Part),
            AliasTarget::Part(canonical),
            recorded_at,
        );
        Ok(previous)
    }

    /// Create or replace a color alias. Returns the canonical id it replaced,
    /// if any.
    pub fn set_color_alias(
        &mut self,
        system: SourceSystem,
        source_color_id: i32,
        canonical: ColorId,
        recorded_at: DateTime<Utc>,
    ) -> Option<ColorId> {
        let key = ColorAliasKey {
            system,
            source_color_id,
        };
        if self.colors.get(&key) == Some(&canonical) {
            return Some(canonical);
        }
        let previous = self.colors.insert(key, canonical);
        self.record(
            AliasKey::Color(key),
            previous.map(AliasTarget::Color),
            AliasTarget::Color(canonical),
            recorded_at,
        );
        previous
    }

    fn record(
        &mut self,
        key: AliasKey,
        previous: Option<AliasTarget>,
        current: AliasTarget,
        recorded_at: DateTime<Utc>,
    ) {
        let revision = self.history.len() as u64 + 1;
        tracing::debug!(revision, ?key, ?previous, ?current, "alias recorded");
        self.history.push(AliasRevision {
            revision,
            key,
            previous,
            current,
            recorded_at,
        });
    }

    pub fn color_alias(&self, system: SourceSystem, source_color_id: i32) -> Option<ColorId> {
        self.colors
            .get(&ColorAliasKey {
                system,
                source_color_id,
            })
            .copied()
    }

    /// Look up a part alias. A scoped alias for `source_color_id` wins over a
    /// color-agnostic one. Aliases scoped to other colors that all agree on
    /// one part say nothing about this color, so they count as missing.
    pub fn lookup_part(
        &self,
        system: SourceSystem,
        source_part_id: &str,
        source_color_id: i32,
    ) -> PartLookup {
        let source_part_id = source_part_id.trim();
        let mut agnostic = None;
        let mut others = BTreeSet::new();
        for (key, target) in self.entries_for(system, source_part_id) {
            match key.color_scope {
                Some(scope) if scope == source_color_id => {
                    return PartLookup::Scoped(target.clone());
                }
                Some(_) => {
                    others.insert(target.clone());
                }
                None => agnostic = Some(target.clone()),
            }
        }
        match agnostic {
            Some(part) => PartLookup::Agnostic(part),
            None if others.len() > 1 => PartLookup::OtherScopes(others.into_iter().collect()),
            None => PartLookup::Missing,
        }
    }

    fn entries_for<'a>(
        &'a self,
        system: SourceSystem,
        source_part_id: &'a str,
    ) -> impl Iterator<Item = (&'a PartAliasKey, &'a PartId)> + 'a {
        // `None` sorts before every `Some`, so this is the first key for the id.
        let start = PartAliasKey {
            system,
            source_part_id: source_part_id.to_string(),
            color_scope: None,
        };
        self.parts
            .range(start..)
            .take_while(move |(k, _)| k.system == system && k.source_part_id == source_part_id)
    }

    /// Every aliased source part id of a system, with one canonical target
    /// each (the color-agnostic one when present).
    pub fn known_part_ids(&self, system: SourceSystem) -> BTreeMap<&str, &PartId> {
        let mut known: BTreeMap<&str, &PartId> = BTreeMap::new();
        for (key, target) in self.parts.iter().filter(|(k, _)| k.system == system) {
            if key.color_scope.is_none() {
                known.insert(&key.source_part_id, target);
            } else {
                known.entry(&key.source_part_id).or_insert(target);
            }
        }
        known
    }

    pub fn part_aliases(&self) -> impl Iterator<Item = (&PartAliasKey, &PartId)> {
        self.parts.iter()
    }

    pub fn color_aliases(&self) -> impl Iterator<Item = (&ColorAliasKey, &ColorId)> {
        self.colors.iter()
    }

    pub fn history(&self) -> &[AliasRevision] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(id: &str) -> PartId {
        PartId::parse(id).unwrap()
    }

    #[test]
    fn scoped_alias_wins_over_agnostic() {
        let mut table = AliasTable::new();
        let now = Utc::now();
        table
            .set_part_alias(SourceSystem::BrickLink, "973pb01", None, part("973p01"), now)
            .unwrap();
        table
            .set_part_alias(SourceSystem::BrickLink, "973pb01", Some(11), part("973p01c11"), now)
            .unwrap();

        assert_eq!(
            table.lookup_part(SourceSystem::BrickLink, "973pb01", 11),
            PartLookup::Scoped(part("973p01c11"))
        );
        assert_eq!(
            table.lookup_part(SourceSystem::BrickLink, "973pb01", 5),
            PartLookup::Agnostic(part("973p01"))
        );
        assert_eq!(
            table.lookup_part(SourceSystem::Rebrickable, "973pb01", 5),
            PartLookup::Missing
        );
    }

    #[test]
    fn other_scopes_only_is_ambiguous() {
        let mut table = AliasTable::new();
        let now = Utc::now();
        table
            .set_part_alias(SourceSystem::Instabrick, "x1", Some(1), part("a"), now)
            .unwrap();
        table
            .set_part_alias(SourceSystem::Instabrick, "x1", Some(2), part("b"), now)
            .unwrap();
        table
            .set_part_alias(SourceSystem::Instabrick, "x10", None, part("z"), now)
            .unwrap();

        assert_eq!(
            table.lookup_part(SourceSystem::Instabrick, "x1", 3),
            PartLookup::OtherScopes(vec![part("a"), part("b")])
        );
    }

    #[test]
    fn single_other_scope_target_is_missing() {
        let mut table = AliasTable::new();
        let now = Utc::now();
        table
            .set_part_alias(SourceSystem::BrickLink, "3001", Some(5), part("3001"), now)
            .unwrap();
        table
            .set_part_alias(SourceSystem::BrickLink, "3001", Some(6), part("3001"), now)
            .unwrap();

        assert_eq!(
            table.lookup_part(SourceSystem::BrickLink, "3001", 11),
            PartLookup::Missing
        );
        assert_eq!(
            table.lookup_part(SourceSystem::BrickLink, "3001", 6),
            PartLookup::Scoped(part("3001"))
        );
    }

    #[test]
    fn replacing_an_alias_keeps_history() {
        let mut table = AliasTable::new();
        let now = Utc::now();
        assert_eq!(
            table.set_color_alias(SourceSystem::BrickLink, 11, ColorId(0), now),
            None
        );
        assert_eq!(
            table.set_color_alias(SourceSystem::BrickLink, 11, ColorId(0), now),
            Some(ColorId(0))
        );
        assert_eq!(
            table.set_color_alias(SourceSystem::BrickLink, 11, ColorId(256), now),
            Some(ColorId(0))
        );

        assert_eq!(table.color_alias(SourceSystem::BrickLink, 11), Some(ColorId(256)));
        assert_eq!(table.history().len(), 2);
        assert_eq!(table.history()[1].previous, Some(AliasTarget::Color(ColorId(0))));
    }

    #[test]
    fn empty_source_part_id_is_rejected() {
        let mut table = AliasTable::new();
        assert!(table
            .set_part_alias(SourceSystem::BrickLink, "  ", None, part("3001"), Utc::now())
            .is_err());
    }

    #[test]
    fn table_survives_json() {
        let mut table = AliasTable::new();
        let now = Utc::now();
        table
            .set_part_alias(SourceSystem::BrickLink, "3001", Some(5), part("3001"), now)
            .unwrap();
        table.set_color_alias(SourceSystem::BrickLink, 5, ColorId(4), now);

        let json = serde_json::to_string(&table).unwrap();
        let back: AliasTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }
}
