use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use brickledger_core::{ColorId, DomainError, DomainResult, PartId, SetNumber};

use crate::model::{CanonicalColor, CanonicalPart, CatalogSnapshot, SetTemplate};
use crate::provider::CatalogProvider;

#[derive(Debug, Default)]
struct CatalogData {
    parts: HashMap<PartId, CanonicalPart>,
    colors: HashMap<ColorId, CanonicalColor>,
    sets: HashMap<SetNumber, SetTemplate>,
}

/// Outcome of a provider refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub parts: usize,
    pub colors: usize,
    pub templates_added: usize,
    /// Set numbers whose incoming template differs from the stored one; the
    /// stored template is kept.
    pub templates_conflicting: Vec<SetNumber>,
}

/// In-memory catalog, read-mostly.
///
/// Parts and colors are replaced wholesale on refresh (the provider is
/// authoritative); set templates are immutable per set number and only ever
/// added.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    inner: RwLock<CatalogData>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        let catalog = Self::new();
        catalog.refresh(snapshot);
        catalog
    }

    fn read(&self) -> RwLockReadGuard<'_, CatalogData> {
        // Every writer replaces whole maps, so a poisoned guard still holds
        // consistent data.
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogData> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn refresh(&self, snapshot: CatalogSnapshot) -> RefreshSummary {
        let parts: HashMap<_, _> = snapshot
            .parts
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        let colors: HashMap<_, _> = snapshot.colors.into_iter().map(|c| (c.id, c)).collect();

        let mut data = self.write();
        let mut summary = RefreshSummary {
            parts: parts.len(),
            colors: colors.len(),
            ..RefreshSummary::default()
        };
        data.parts = parts;
        data.colors = colors;

        for template in snapshot.sets {
            match data.sets.get(&template.set_number) {
                Some(existing) if *existing != template => {
                    tracing::warn!(
                        set_number = %template.set_number,
                        "catalog refresh supplied a different template for an existing set; keeping stored template"
                    );
                    summary.templates_conflicting.push(template.set_number.clone());
                }
                Some(_) => {}
                None => {
                    data.sets.insert(template.set_number.clone(), template);
                    summary.templates_added += 1;
                }
            }
        }

        tracing::info!(
            parts = summary.parts,
            colors = summary.colors,
            templates_added = summary.templates_added,
            templates_conflicting = summary.templates_conflicting.len(),
            "catalog refreshed"
        );
        summary
    }

    /// Add or replace a single part (used when an operator maps an alias to a
    /// part the last refresh did not carry).
    pub fn upsert_part(&self, part: CanonicalPart) {
        self.write().parts.insert(part.id.clone(), part);
    }

    pub fn upsert_color(&self, color: CanonicalColor) {
        self.write().colors.insert(color.id, color);
    }

    /// Store a template unless one already exists for its set number.
    pub fn insert_set_template(&self, template: SetTemplate) -> DomainResult<()> {
        let mut data = self.write();
        if data.sets.contains_key(&template.set_number) {
            return Err(DomainError::conflict(format!(
                "set template {} already exists",
                template.set_number
            )));
        }
        data.sets.insert(template.set_number.clone(), template);
        Ok(())
    }

    pub fn snapshot(&self) -> CatalogSnapshot {
        let data = self.read();
        let mut parts: Vec<_> = data.parts.values().cloned().collect();
        parts.sort_by(|a, b| a.id.cmp(&b.id));
        let mut colors: Vec<_> = data.colors.values().cloned().collect();
        colors.sort_by_key(|c| c.id);
        let mut sets: Vec<_> = data.sets.values().cloned().collect();
        sets.sort_by(|a, b| a.set_number.cmp(&b.set_number));
        CatalogSnapshot { parts, colors, sets }
    }
}

impl CatalogProvider for InMemoryCatalog {
    fn get_canonical_part(&self, id: &PartId) -> DomainResult<CanonicalPart> {
        self.read()
            .parts
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("canonical part {id}")))
    }

    fn get_canonical_color(&self, id: ColorId) -> DomainResult<CanonicalColor> {
        self.read()
            .colors
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("canonical color {id}")))
    }

    fn get_set_template(&self, set_number: &SetNumber) -> DomainResult<SetTemplate> {
        self.read()
            .sets
            .get(set_number)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("set template {set_number}")))
    }
}
