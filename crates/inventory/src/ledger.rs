use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use brickledger_catalog::SetTemplate;
use brickledger_core::{
    Aggregate, AggregateRoot, DomainError, DomainResult, Entity, LocationId, PartColor,
    SetInstanceId, SetNumber,
};

use crate::command::*;
use crate::event::*;
use crate::import::{ImportRecord, PlacedLine};
use crate::line::{LineKey, LineStatus, LocationRef};
use crate::location::{LocationKind, StorageLocation};
use crate::set_instance::{SetInstance, SetStatus};

/// Aggregate root: the whole inventory ledger.
///
/// Quantities are kept as signed integers so that a corrupt snapshot shows up
/// as a negative balance in the sanity checker instead of wrapping; every
/// command keeps them non-negative and removes rows that reach zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(with = "brickledger_core::pairs")]
    locations: BTreeMap<LocationId, StorageLocation>,
    #[serde(with = "brickledger_core::pairs")]
    sets: BTreeMap<SetInstanceId, SetInstance>,
    /// Templates of every acquired set number, frozen at first acquisition.
    #[serde(with = "brickledger_core::pairs")]
    templates: BTreeMap<SetNumber, SetTemplate>,
    #[serde(with = "brickledger_core::pairs")]
    lines: BTreeMap<LineKey, i64>,
    #[serde(with = "brickledger_core::pairs")]
    imports: BTreeMap<String, ImportRecord>,
    version: u64,
}

/// Rollups over the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub loose_total: i64,
    pub in_set_total: i64,
    /// Sum of template quantities over every owned copy.
    pub template_total: i64,
    pub overall_total: i64,
}

impl AggregateRoot for Ledger {
    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for Ledger {
    type Command = LedgerCommand;
    type Event = LedgerEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LedgerEvent::LocationCreated(e) => {
                self.locations.insert(*e.location.id(), e.location.clone());
            }
            LedgerEvent::LocationDeleted(e) => {
                if let Some(loc) = self.locations.get_mut(&e.location_id) {
                    loc.deleted_at = Some(e.occurred_at);
                }
            }
            LedgerEvent::LocationRestored(e) => {
                if let Some(loc) = self.locations.get_mut(&e.location_id) {
                    loc.deleted_at = None;
                }
            }
            LedgerEvent::ContainerReparented(e) => {
                if let Some(loc) = self.locations.get_mut(&e.location_id) {
                    loc.parent = e.new_parent;
                }
            }
            LedgerEvent::StockMoved(e) => {
                self.adjust(&e.part_color, e.from, -e.quantity);
                self.adjust(&e.part_color, e.to, e.quantity);
            }
            LedgerEvent::LocationsMerged(e) => {
                let from = LocationRef::Storage(e.source);
                let to = LocationRef::Storage(e.destination);
                for (pc, qty) in &e.transferred {
                    self.adjust(pc, from, -qty);
                    self.adjust(pc, to, *qty);
                }
                for child in &e.children {
                    if let Some(loc) = self.locations.get_mut(child) {
                        loc.parent = e.children_parent;
                    }
                }
                if let Some(loc) = self.locations.get_mut(&e.source) {
                    loc.deleted_at = Some(e.occurred_at);
                }
            }
            LedgerEvent::SetAcquired(e) => {
                self.templates
                    .entry(e.instance.set_number.clone())
                    .or_insert_with(|| e.template.clone());
                let holder = LocationRef::Set(e.instance.id);
                for (pc, qty) in e.template.parts() {
                    self.adjust(pc, holder, i64::from(qty));
                }
                self.sets.insert(*e.instance.id(), e.instance.clone());
            }
            LedgerEvent::SetPartedOut(e) => {
                let holder = LocationRef::Set(e.instance_id);
                for (pc, qty) in &e.lines {
                    self.adjust(pc, holder, -qty);
                    self.adjust(pc, e.destination, *qty);
                }
            }
            LedgerEvent::SetStatusChanged(e) => {
                if let Some(set) = self.sets.get_mut(&e.instance_id) {
                    set.status = e.to;
                }
            }
            LedgerEvent::BatchImported(e) => {
                let mut total = 0u64;
                for line in &e.lines {
                    self.adjust(&line.part_color, line.location, i64::from(line.quantity));
                    total += u64::from(line.quantity);
                }
                self.imports.insert(
                    e.fingerprint.clone(),
                    ImportRecord {
                        fingerprint: e.fingerprint.clone(),
                        committed_at: e.occurred_at,
                        line_count: e.lines.len(),
                        total_quantity: total,
                    },
                );
            }
        }

        // +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LedgerCommand::CreateLocation(cmd) => self.handle_create_location(cmd),
            LedgerCommand::DeleteLocation(cmd) => self.handle_delete_location(cmd),
            LedgerCommand::RestoreLocation(cmd) => self.handle_restore_location(cmd),
            LedgerCommand::ReparentContainer(cmd) => self.handle_reparent(cmd),
            LedgerCommand::MoveStock(cmd) => self.handle_move(cmd),
            LedgerCommand::MergeLocations(cmd) => self.handle_merge(cmd),
            LedgerCommand::AcquireSet(cmd) => self.handle_acquire(cmd),
            LedgerCommand::PartOut(cmd) => self.handle_part_out(cmd),
            LedgerCommand::ChangeSetStatus(cmd) => self.handle_status(cmd),
            LedgerCommand::CommitImport(cmd) => self.handle_import(cmd),
        }
    }
}

// Queries.
impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location(&self, id: LocationId) -> Option<&StorageLocation> {
        self.locations.get(&id)
    }

    pub fn locations(&self) -> impl Iterator<Item = &StorageLocation> {
        self.locations.values()
    }

    pub fn active_children(&self, id: LocationId) -> impl Iterator<Item = &StorageLocation> {
        self.locations
            .values()
            .filter(move |l| l.parent == Some(id) && l.is_active())
    }

    pub fn set_instance(&self, id: SetInstanceId) -> Option<&SetInstance> {
        self.sets.get(&id)
    }

    pub fn set_instances(&self) -> impl Iterator<Item = &SetInstance> {
        self.sets.values()
    }

    /// Template frozen for a set number the ledger has acquired.
    pub fn template(&self, set_number: &SetNumber) -> Option<&SetTemplate> {
        self.templates.get(set_number)
    }

    pub fn quantity_at(&self, part_color: &PartColor, location: LocationRef) -> i64 {
        self.lines
            .get(&LineKey::new(part_color.clone(), location))
            .copied()
            .unwrap_or(0)
    }

    pub fn lines(&self) -> impl Iterator<Item = (&LineKey, i64)> {
        self.lines.iter().map(|(k, q)| (k, *q))
    }

    pub fn lines_at(&self, location: LocationRef) -> Vec<(PartColor, i64)> {
        self.lines
            .iter()
            .filter(|(k, _)| k.location == location)
            .map(|(k, q)| (k.part_color.clone(), *q))
            .collect()
    }

    pub fn holds_stock(&self, location: LocationRef) -> bool {
        self.lines
            .iter()
            .any(|(k, q)| k.location == location && *q != 0)
    }

    /// Quantity per part-color across every placement.
    pub fn total_by_part_color(&self) -> BTreeMap<PartColor, i64> {
        let mut totals = BTreeMap::new();
        for (key, qty) in &self.lines {
            *totals.entry(key.part_color.clone()).or_insert(0) += qty;
        }
        totals
    }

    pub fn remaining_in_set(&self, id: SetInstanceId) -> i64 {
        self.lines_at(LocationRef::Set(id)).iter().map(|(_, q)| q).sum()
    }

    pub fn is_exhausted(&self, id: SetInstanceId) -> bool {
        self.remaining_in_set(id) <= 0
    }

    /// Resolve a `drawer[|container]` path among active locations.
    pub fn find_by_names(&self, drawer: &str, container: Option<&str>) -> Option<LocationId> {
        let drawer_id = self
            .locations
            .values()
            .find(|l| l.kind == LocationKind::Drawer && l.is_active() && l.name == drawer)?
            .id;
        match container {
            None => Some(drawer_id),
            Some(name) => self
                .active_children(drawer_id)
                .find(|l| l.kind == LocationKind::Container && l.name == name)
                .map(|l| l.id),
        }
    }

    pub fn import_record(&self, fingerprint: &str) -> Option<&ImportRecord> {
        self.imports.get(fingerprint)
    }

    pub fn imports(&self) -> impl Iterator<Item = &ImportRecord> {
        self.imports.values()
    }

    pub fn totals(&self) -> LedgerTotals {
        let mut totals = LedgerTotals::default();
        for (key, qty) in &self.lines {
            match key.status() {
                LineStatus::Loose => totals.loose_total += qty,
                LineStatus::InSet => totals.in_set_total += qty,
            }
        }
        totals.overall_total = totals.loose_total + totals.in_set_total;
        totals.template_total = self
            .sets
            .values()
            .filter_map(|s| self.templates.get(&s.set_number))
            .map(|t| i64::try_from(t.total_parts()).unwrap_or(i64::MAX))
            .sum();
        totals
    }

    /// Structural invariants every committed state satisfies. Returns the
    /// first violation found.
    pub fn verify_invariants(&self) -> DomainResult<()> {
        for (key, qty) in &self.lines {
            if *qty < 0 {
                return Err(DomainError::invariant(format!(
                    "negative balance {qty} for {} at {}",
                    key.part_color, key.location
                )));
            }
            match key.location {
                LocationRef::Unassigned => {}
                LocationRef::Storage(id) => match self.locations.get(&id) {
                    Some(loc) if loc.is_active() => {}
                    Some(_) => {
                        return Err(DomainError::invariant(format!(
                            "stock held by deleted location {id}"
                        )));
                    }
                    None => {
                        return Err(DomainError::invariant(format!(
                            "stock held by unknown location {id}"
                        )));
                    }
                },
                LocationRef::Set(id) => {
                    let set = self.sets.get(&id).ok_or_else(|| {
                        DomainError::invariant(format!("stock held by unknown set copy {id}"))
                    })?;
                    let cap = self
                        .templates
                        .get(&set.set_number)
                        .map(|t| i64::from(t.quantity_of(&key.part_color)))
                        .unwrap_or(0);
                    if *qty > cap {
                        return Err(DomainError::invariant(format!(
                            "set copy {id} holds {qty} of {} but its template lists {cap}",
                            key.part_color
                        )));
                    }
                }
            }
        }
        for loc in self.locations.values().filter(|l| l.is_active()) {
            let Some(parent) = loc.parent else { continue };
            match self.locations.get(&parent) {
                Some(p) if p.is_active() && p.kind == LocationKind::Drawer => {}
                _ => {
                    return Err(DomainError::invariant(format!(
                        "location '{}' sits under {parent}, which is not an active drawer",
                        loc.name
                    )));
                }
            }
        }
        for set in self.sets.values() {
            if set.status == SetStatus::LooseParts && !self.is_exhausted(set.id) {
                return Err(DomainError::invariant(format!(
                    "set copy {} is loose_parts but still holds parts",
                    set.id
                )));
            }
        }
        Ok(())
    }

    fn adjust(&mut self, part_color: &PartColor, location: LocationRef, delta: i64) {
        let key = LineKey::new(part_color.clone(), location);
        let qty = self.lines.entry(key.clone()).or_insert(0);
        *qty += delta;
        if *qty == 0 {
            self.lines.remove(&key);
        }
    }
}

// Decisions.
impl Ledger {
    fn active_location(&self, id: LocationId) -> DomainResult<&StorageLocation> {
        self.locations
            .get(&id)
            .filter(|l| l.is_active())
            .ok_or_else(|| DomainError::not_found(format!("location {id}")))
    }

    fn existing_set(&self, id: SetInstanceId) -> DomainResult<&SetInstance> {
        self.sets
            .get(&id)
            .ok_or_else(|| DomainError::not_found(format!("set copy {id}")))
    }

    /// Loose placements only; set copies are filled by acquisition and
    /// emptied by part-out.
    fn ensure_loose_target(&self, location: LocationRef) -> DomainResult<()> {
        match location {
            LocationRef::Unassigned => Ok(()),
            LocationRef::Storage(id) => self.active_location(id).map(|_| ()),
            LocationRef::Set(id) => Err(DomainError::validation(format!(
                "set copy {id} cannot be used as a loose placement"
            ))),
        }
    }

    /// Drawer names are unique among active drawers; container names among
    /// active containers under the same parent.
    fn ensure_label_free(
        &self,
        kind: LocationKind,
        name: &str,
        parent: Option<LocationId>,
        except: Option<LocationId>,
    ) -> DomainResult<()> {
        let taken = self.locations.values().any(|l| {
            l.is_active()
                && Some(l.id) != except
                && l.kind == kind
                && l.parent == parent
                && l.name == name
        });
        if taken {
            return Err(DomainError::conflict(format!("{kind} '{name}' already exists here")));
        }
        Ok(())
    }

    fn ensure_drawer_parent(&self, parent: Option<LocationId>) -> DomainResult<()> {
        if let Some(parent_id) = parent {
            let parent = self.active_location(parent_id)?;
            if parent.kind != LocationKind::Drawer {
                return Err(DomainError::validation(format!(
                    "containers can only be placed in drawers; {parent_id} is a container"
                )));
            }
        }
        Ok(())
    }

    fn handle_create_location(&self, cmd: &CreateLocation) -> DomainResult<Vec<LedgerEvent>> {
        let name = cmd.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("location name cannot be empty"));
        }
        if self.locations.contains_key(&cmd.location_id) {
            return Err(DomainError::conflict(format!(
                "location {} already exists",
                cmd.location_id
            )));
        }
        match cmd.kind {
            LocationKind::Drawer if cmd.parent.is_some() => {
                return Err(DomainError::validation("drawers cannot have a parent"));
            }
            LocationKind::Drawer => {}
            LocationKind::Container => self.ensure_drawer_parent(cmd.parent)?,
        }
        self.ensure_label_free(cmd.kind, name, cmd.parent, None)?;

        Ok(vec![LedgerEvent::LocationCreated(LocationCreated {
            location: StorageLocation {
                id: cmd.location_id,
                kind: cmd.kind,
                name: name.to_string(),
                parent: cmd.parent,
                created_at: cmd.occurred_at,
                deleted_at: None,
            },
        })])
    }

    fn handle_delete_location(&self, cmd: &DeleteLocation) -> DomainResult<Vec<LedgerEvent>> {
        let loc = self.active_location(cmd.location_id)?;
        if self.holds_stock(LocationRef::Storage(loc.id)) {
            return Err(DomainError::non_empty(format!(
                "{} '{}' still holds parts",
                loc.kind, loc.name
            )));
        }
        if let Some(child) = self.active_children(loc.id).next() {
            return Err(DomainError::non_empty(format!(
                "{} '{}' still contains container '{}'",
                loc.kind, loc.name, child.name
            )));
        }
        Ok(vec![LedgerEvent::LocationDeleted(LocationDeleted {
            location_id: loc.id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_restore_location(&self, cmd: &RestoreLocation) -> DomainResult<Vec<LedgerEvent>> {
        let loc = self
            .locations
            .get(&cmd.location_id)
            .ok_or_else(|| DomainError::not_found(format!("location {}", cmd.location_id)))?;
        if loc.is_active() {
            return Err(DomainError::validation(format!(
                "location '{}' is not deleted",
                loc.name
            )));
        }
        if let Some(parent) = loc.parent {
            if self.active_location(parent).is_err() {
                return Err(DomainError::validation(format!(
                    "parent drawer of '{}' is deleted; restore or reparent it first",
                    loc.name
                )));
            }
        }
        self.ensure_label_free(loc.kind, &loc.name, loc.parent, Some(loc.id))?;
        Ok(vec![LedgerEvent::LocationRestored(LocationRestored {
            location_id: loc.id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reparent(&self, cmd: &ReparentContainer) -> DomainResult<Vec<LedgerEvent>> {
        let loc = self.active_location(cmd.location_id)?;
        if loc.kind != LocationKind::Container {
            return Err(DomainError::validation("only containers can be reparented"));
        }
        if loc.parent == cmd.new_parent {
            return Ok(vec![]);
        }
        self.ensure_drawer_parent(cmd.new_parent)?;
        self.ensure_label_free(loc.kind, &loc.name, cmd.new_parent, Some(loc.id))?;
        Ok(vec![LedgerEvent::ContainerReparented(ContainerReparented {
            location_id: loc.id,
            previous_parent: loc.parent,
            new_parent: cmd.new_parent,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_move(&self, cmd: &MoveStock) -> DomainResult<Vec<LedgerEvent>> {
        if cmd.quantity == 0 {
            return Err(DomainError::validation("move quantity must be positive"));
        }
        if cmd.from == cmd.to {
            return Err(DomainError::validation("source and destination are the same"));
        }
        self.ensure_loose_target(cmd.from)?;
        self.ensure_loose_target(cmd.to)?;

        let requested = i64::from(cmd.quantity);
        let available = self.quantity_at(&cmd.part_color, cmd.from);
        if requested > available {
            return Err(DomainError::insufficient(
                requested,
                available,
                format!("{} at {}", cmd.part_color, cmd.from),
            ));
        }
        Ok(vec![LedgerEvent::StockMoved(StockMoved {
            part_color: cmd.part_color.clone(),
            from: cmd.from,
            to: cmd.to,
            quantity: requested,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_merge(&self, cmd: &MergeLocations) -> DomainResult<Vec<LedgerEvent>> {
        if cmd.source == cmd.destination {
            return Err(DomainError::validation("cannot merge a location into itself"));
        }
        let source = self.active_location(cmd.source)?;
        let destination = self.active_location(cmd.destination)?;
        if destination.parent == Some(source.id) {
            return Err(DomainError::validation(format!(
                "cannot merge '{}' into its own container '{}'",
                source.name, destination.name
            )));
        }

        let children: Vec<&StorageLocation> = self.active_children(source.id).collect();
        if let Some(full) = children
            .iter()
            .find(|c| self.holds_stock(LocationRef::Storage(c.id)))
        {
            return Err(DomainError::non_empty(format!(
                "container '{}' inside '{}' still holds parts; empty or move it first",
                full.name, source.name
            )));
        }
        let children_parent = match destination.kind {
            LocationKind::Drawer => Some(destination.id),
            LocationKind::Container => None,
        };
        let child_ids: BTreeSet<LocationId> = children.iter().map(|c| c.id).collect();
        for child in &children {
            // Siblings already under the new parent keep their names.
            let clash = self.locations.values().any(|l| {
                l.is_active()
                    && !child_ids.contains(&l.id)
                    && l.kind == child.kind
                    && l.parent == children_parent
                    && l.name == child.name
            });
            if clash {
                return Err(DomainError::conflict(format!(
                    "container '{}' would collide with an existing container at the destination",
                    child.name
                )));
            }
        }

        Ok(vec![LedgerEvent::LocationsMerged(LocationsMerged {
            source: source.id,
            destination: destination.id,
            transferred: self.lines_at(LocationRef::Storage(source.id)),
            children: child_ids.into_iter().collect(),
            children_parent,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_acquire(&self, cmd: &AcquireSet) -> DomainResult<Vec<LedgerEvent>> {
        if self.sets.contains_key(&cmd.instance_id) {
            return Err(DomainError::conflict(format!(
                "set copy {} already exists",
                cmd.instance_id
            )));
        }
        if cmd.status == SetStatus::LooseParts {
            return Err(DomainError::validation(
                "a newly acquired set cannot start as loose_parts",
            ));
        }
        let set_number = &cmd.template.set_number;
        if let Some(frozen) = self.templates.get(set_number) {
            if *frozen != cmd.template {
                return Err(DomainError::invariant(format!(
                    "template for set {set_number} differs from the one already in the ledger"
                )));
            }
        }
        let copy_index = self
            .sets
            .values()
            .filter(|s| &s.set_number == set_number)
            .map(|s| s.copy_index)
            .max()
            .unwrap_or(0)
            + 1;

        Ok(vec![LedgerEvent::SetAcquired(SetAcquired {
            instance: SetInstance {
                id: cmd.instance_id,
                set_number: set_number.clone(),
                copy_index,
                status: cmd.status,
            },
            template: cmd.template.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_part_out(&self, cmd: &PartOut) -> DomainResult<Vec<LedgerEvent>> {
        let set = self.existing_set(cmd.instance_id)?;
        self.ensure_loose_target(cmd.destination)?;
        let holder = LocationRef::Set(set.id);

        let lines: Vec<(PartColor, i64)> = match &cmd.selection {
            PartOutSelection::All => self.lines_at(holder),
            PartOutSelection::Lines(requested) => {
                let template = self.templates.get(&set.set_number).ok_or_else(|| {
                    DomainError::invariant(format!("no template for set {}", set.set_number))
                })?;
                let mut wanted: BTreeMap<PartColor, i64> = BTreeMap::new();
                for (pc, qty) in requested {
                    if *qty == 0 {
                        return Err(DomainError::validation(format!(
                            "part-out quantity for {pc} must be positive"
                        )));
                    }
                    *wanted.entry(pc.clone()).or_insert(0) += i64::from(*qty);
                }
                for (pc, qty) in &wanted {
                    if template.quantity_of(pc) == 0 {
                        return Err(DomainError::invariant(format!(
                            "{pc} is not part of set {}",
                            set.set_number
                        )));
                    }
                    let available = self.quantity_at(pc, holder);
                    if *qty > available {
                        return Err(DomainError::insufficient(
                            *qty,
                            available,
                            format!("{pc} in set copy {}", set.id),
                        ));
                    }
                }
                wanted.into_iter().collect()
            }
        };
        if lines.is_empty() {
            return Err(DomainError::validation(format!(
                "set copy {} holds no parts to part out",
                set.id
            )));
        }

        let taken: i64 = lines.iter().map(|(_, q)| q).sum();
        let exhausted = self.remaining_in_set(set.id) - taken <= 0;
        let next_status = if exhausted {
            SetStatus::LooseParts
        } else if set.status.is_intact() {
            SetStatus::Teardown
        } else {
            set.status
        };

        let mut events = vec![LedgerEvent::SetPartedOut(SetPartedOut {
            instance_id: set.id,
            destination: cmd.destination,
            lines,
            occurred_at: cmd.occurred_at,
        })];
        if next_status != set.status {
            events.push(LedgerEvent::SetStatusChanged(SetStatusChanged {
                instance_id: set.id,
                from: set.status,
                to: next_status,
                occurred_at: cmd.occurred_at,
            }));
        }
        Ok(events)
    }

    fn handle_status(&self, cmd: &ChangeSetStatus) -> DomainResult<Vec<LedgerEvent>> {
        let set = self.existing_set(cmd.instance_id)?;
        if set.status == cmd.status {
            return Ok(vec![]);
        }
        set.status
            .check_transition(cmd.status, self.is_exhausted(set.id))?;
        Ok(vec![LedgerEvent::SetStatusChanged(SetStatusChanged {
            instance_id: set.id,
            from: set.status,
            to: cmd.status,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_import(&self, cmd: &CommitImport) -> DomainResult<Vec<LedgerEvent>> {
        if self.imports.contains_key(&cmd.fingerprint) {
            return Err(DomainError::duplicate_import(cmd.fingerprint.clone()));
        }
        if cmd.lines.is_empty() {
            return Err(DomainError::validation("import batch has no lines"));
        }
        for PlacedLine {
            part_color,
            location,
            quantity,
        } in &cmd.lines
        {
            if *quantity == 0 {
                return Err(DomainError::validation(format!(
                    "import line for {part_color} has zero quantity"
                )));
            }
            self.ensure_loose_target(*location)?;
        }
        Ok(vec![LedgerEvent::BatchImported(BatchImported {
            fingerprint: cmd.fingerprint.clone(),
            lines: cmd.lines.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
