//! Service façade: the operations a presentation layer calls.
//!
//! Every mutating operation is one store transaction. Precheck, resolution,
//! suggestions and sanity checks only read.

use chrono::{DateTime, Utc};

use brickledger_catalog::CatalogProvider;
use brickledger_core::{
    ColorId, DomainError, DomainResult, LocationId, PartColor, PartId, SetInstanceId, SetNumber,
    SourceSystem,
};
use brickledger_inventory::{
    AcquireSet, ChangeSetStatus, CommitImport, CreateLocation, DeclaredLocation, DeleteLocation,
    ImportOutcome, ImportReceipt, LedgerCommand, LedgerTotals, LocationKind, LocationRef,
    MergeLocations, MoveStock, PartOut, PartOutSelection, PlacedLine, ReparentContainer,
    RestoreLocation, SetStatus,
};
use brickledger_reconcile::{
    precheck, resolve_batch, AliasSuggestion, ForeignLineItem, PrecheckReport, ResolutionReport,
    TypoAssist,
};
use brickledger_sanity::{Anomaly, SanityChecker, SanityReport};

use crate::settings::AppConfig;
use crate::error::ServiceError;
use crate::store::{InMemoryLedgerStore, Transaction};

pub struct InventoryService<C> {
    catalog: C,
    store: InMemoryLedgerStore,
    assist: TypoAssist,
    checker: SanityChecker,
}

fn logged<T>(operation: &'static str, result: Result<T, ServiceError>) -> Result<T, ServiceError> {
    match &result {
        Ok(_) => tracing::info!(operation, "ledger operation committed"),
        Err(err) => tracing::warn!(operation, code = err.code(), error = %err, "ledger operation rejected"),
    }
    result
}

impl<C> InventoryService<C>
where
    C: CatalogProvider,
{
    pub fn new(catalog: C, store: InMemoryLedgerStore) -> Self {
        Self {
            catalog,
            store,
            assist: TypoAssist::default(),
            checker: SanityChecker::default(),
        }
    }

    pub fn from_config(catalog: C, store: InMemoryLedgerStore, config: &AppConfig) -> Self {
        Self {
            catalog,
            store,
            assist: config.typo_assist(),
            checker: config.sanity_checker(),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn store(&self) -> &InMemoryLedgerStore {
        &self.store
    }

    // ---- Alias API -------------------------------------------------------

    pub fn resolve_batch(&self, items: &[ForeignLineItem]) -> Result<ResolutionReport, ServiceError> {
        Ok(self
            .store
            .read(|s| resolve_batch(&s.aliases, &self.catalog, items))?)
    }

    pub fn precheck(&self, items: &[ForeignLineItem]) -> Result<PrecheckReport, ServiceError> {
        Ok(self
            .store
            .read(|s| precheck(&s.aliases, &self.catalog, items, &self.assist))?)
    }

    pub fn suggest(
        &self,
        system: SourceSystem,
        source_part_id: &str,
    ) -> Result<Vec<AliasSuggestion>, ServiceError> {
        Ok(self
            .store
            .read(|s| self.assist.suggest(&s.aliases, system, source_part_id))?)
    }

    /// Map a source part id (optionally only for one source color) to a
    /// canonical part. Returns the mapping it replaced.
    pub fn set_part_alias(
        &self,
        system: SourceSystem,
        source_part_id: &str,
        canonical: PartId,
        color_scope: Option<i32>,
    ) -> Result<Option<PartId>, ServiceError> {
        self.catalog.get_canonical_part(&canonical)?;
        let result: Result<_, ServiceError> = self.store.transaction(|tx| {
            Ok(tx.aliases_mut().set_part_alias(
                system,
                source_part_id,
                color_scope,
                canonical.clone(),
                Utc::now(),
            )?)
        });
        logged("set_part_alias", result)
    }

    pub fn set_color_alias(
        &self,
        system: SourceSystem,
        source_color_id: i32,
        canonical: ColorId,
    ) -> Result<Option<ColorId>, ServiceError> {
        self.catalog.get_canonical_color(canonical)?;
        let result: Result<_, ServiceError> = self.store.transaction(|tx| {
            Ok(tx
                .aliases_mut()
                .set_color_alias(system, source_color_id, canonical, Utc::now()))
        });
        logged("set_color_alias", result)
    }

    // ---- Ledger API ------------------------------------------------------

    /// Resolve and commit an export in one transaction.
    ///
    /// Any unresolved or ambiguous line aborts the whole import. Lines whose
    /// aliases point outside the catalog are left out and counted in the
    /// receipt. A batch whose fingerprint was already committed returns
    /// `AlreadyImported` and writes nothing.
    pub fn import_batch(&self, items: &[ForeignLineItem]) -> Result<ImportOutcome, ServiceError> {
        let now = Utc::now();
        let result: Result<_, ServiceError> = self.store.transaction(|tx| {
            let plan = resolve_batch(tx.aliases(), &self.catalog, items).into_import_plan()?;
            let fingerprint = plan.batch.fingerprint();
            if let Some(record) = tx.ledger().import_record(&fingerprint) {
                return Ok(ImportOutcome::AlreadyImported(record.clone()));
            }

            let mut created = Vec::new();
            let mut placed = Vec::with_capacity(plan.batch.lines().len());
            for line in plan.batch.lines() {
                self.catalog.ensure_part_color(&line.part_color)?;
                placed.push(PlacedLine {
                    part_color: line.part_color.clone(),
                    location: place(tx, &line.location, now, &mut created)?,
                    quantity: line.quantity,
                });
            }
            let lines_applied = placed.len();
            tx.execute(&LedgerCommand::CommitImport(CommitImport {
                fingerprint: fingerprint.clone(),
                lines: placed,
                occurred_at: now,
            }))?;

            Ok(ImportOutcome::Committed(ImportReceipt {
                fingerprint,
                lines_applied,
                quantity_added: plan.batch.total_quantity(),
                locations_created: created,
                lines_excluded: plan.excluded.len(),
            }))
        });

        match &result {
            Ok(ImportOutcome::Committed(receipt)) => tracing::info!(
                fingerprint = %receipt.fingerprint,
                lines = receipt.lines_applied,
                quantity = receipt.quantity_added,
                locations_created = receipt.locations_created.len(),
                excluded = receipt.lines_excluded,
                "import committed"
            ),
            Ok(ImportOutcome::AlreadyImported(record)) => tracing::info!(
                fingerprint = %record.fingerprint,
                committed_at = %record.committed_at,
                "import skipped; batch already committed"
            ),
            Err(err) => tracing::warn!(code = err.code(), error = %err, "import rejected"),
        }
        result
    }

    pub fn create_location(
        &self,
        kind: LocationKind,
        name: &str,
        parent: Option<LocationId>,
    ) -> Result<LocationId, ServiceError> {
        let location_id = LocationId::new();
        let result: Result<_, ServiceError> = self.store.transaction(|tx| {
            tx.execute(&LedgerCommand::CreateLocation(CreateLocation {
                location_id,
                kind,
                name: name.to_string(),
                parent,
                occurred_at: Utc::now(),
            }))?;
            Ok(location_id)
        });
        logged("create_location", result)
    }

    pub fn delete_location(&self, location_id: LocationId) -> Result<(), ServiceError> {
        let result = self.run(LedgerCommand::DeleteLocation(DeleteLocation {
            location_id,
            occurred_at: Utc::now(),
        }));
        logged("delete_location", result)
    }

    pub fn restore_location(&self, location_id: LocationId) -> Result<(), ServiceError> {
        let result = self.run(LedgerCommand::RestoreLocation(RestoreLocation {
            location_id,
            occurred_at: Utc::now(),
        }));
        logged("restore_location", result)
    }

    pub fn reparent_container(
        &self,
        location_id: LocationId,
        new_parent: Option<LocationId>,
    ) -> Result<(), ServiceError> {
        let result = self.run(LedgerCommand::ReparentContainer(ReparentContainer {
            location_id,
            new_parent,
            occurred_at: Utc::now(),
        }));
        logged("reparent_container", result)
    }

    pub fn move_stock(
        &self,
        part_color: PartColor,
        from: LocationRef,
        to: LocationRef,
        quantity: u32,
    ) -> Result<(), ServiceError> {
        let result = self.run(LedgerCommand::MoveStock(MoveStock {
            part_color,
            from,
            to,
            quantity,
            occurred_at: Utc::now(),
        }));
        logged("move_stock", result)
    }

    pub fn merge(&self, source: LocationId, destination: LocationId) -> Result<(), ServiceError> {
        let result = self.run(LedgerCommand::MergeLocations(MergeLocations {
            source,
            destination,
            occurred_at: Utc::now(),
        }));
        logged("merge", result)
    }

    /// Record a newly owned copy of `set_number`, filled from its catalog
    /// template.
    pub fn acquire_set(
        &self,
        set_number: &SetNumber,
        status: SetStatus,
    ) -> Result<SetInstanceId, ServiceError> {
        let template = self.catalog.get_set_template(set_number)?;
        for (part_color, _) in template.parts() {
            self.catalog.ensure_part_color(part_color)?;
        }
        let instance_id = SetInstanceId::new();
        let result: Result<_, ServiceError> = self.store.transaction(|tx| {
            tx.execute(&LedgerCommand::AcquireSet(AcquireSet {
                instance_id,
                template,
                status,
                occurred_at: Utc::now(),
            }))?;
            Ok(instance_id)
        });
        logged("acquire_set", result)
    }

    /// Move parts out of a set copy into loose stock. Returns the copy's
    /// status afterwards.
    pub fn part_out(
        &self,
        instance_id: SetInstanceId,
        selection: PartOutSelection,
        destination: LocationRef,
    ) -> Result<SetStatus, ServiceError> {
        let result: Result<_, ServiceError> = self.store.transaction(|tx| {
            tx.execute(&LedgerCommand::PartOut(PartOut {
                instance_id,
                selection,
                destination,
                occurred_at: Utc::now(),
            }))?;
            tx.ledger()
                .set_instance(instance_id)
                .map(|s| s.status)
                .ok_or_else(|| DomainError::not_found(format!("set copy {instance_id}")).into())
        });
        logged("part_out", result)
    }

    pub fn set_status(
        &self,
        instance_id: SetInstanceId,
        status: SetStatus,
    ) -> Result<(), ServiceError> {
        let result = self.run(LedgerCommand::ChangeSetStatus(ChangeSetStatus {
            instance_id,
            status,
            occurred_at: Utc::now(),
        }));
        logged("set_status", result)
    }

    fn run(&self, command: LedgerCommand) -> Result<(), ServiceError> {
        self.store.transaction(|tx| {
            tx.execute(&command)?;
            Ok(())
        })
    }

    // ---- Sanity API ------------------------------------------------------

    pub fn run_checks(&self) -> Result<Vec<Anomaly>, ServiceError> {
        Ok(self.sanity_report()?.anomalies)
    }

    pub fn sanity_report(&self) -> Result<SanityReport, ServiceError> {
        Ok(self
            .store
            .read(|s| self.checker.run(&s.ledger, &self.catalog))?)
    }

    pub fn totals(&self) -> Result<LedgerTotals, ServiceError> {
        Ok(self.store.read(|s| s.ledger.totals())?)
    }
}

/// Turn a declared location into a ledger placement, creating named drawers
/// and containers that do not exist yet.
fn place(
    tx: &mut Transaction,
    declared: &DeclaredLocation,
    occurred_at: DateTime<Utc>,
    created: &mut Vec<LocationId>,
) -> DomainResult<LocationRef> {
    let (drawer, container) = match declared.normalized() {
        DeclaredLocation::Unassigned => return Ok(LocationRef::Unassigned),
        DeclaredLocation::Location { id } => return Ok(LocationRef::Storage(id)),
        DeclaredLocation::Named { drawer, container } => (drawer, container),
    };

    let drawer_id = match tx.ledger().find_by_names(&drawer, None) {
        Some(id) => id,
        None => create_named(tx, LocationKind::Drawer, &drawer, None, occurred_at, created)?,
    };
    let Some(container) = container else {
        return Ok(LocationRef::Storage(drawer_id));
    };
    let container_id = match tx.ledger().find_by_names(&drawer, Some(&container)) {
        Some(id) => id,
        None => create_named(
            tx,
            LocationKind::Container,
            &container,
            Some(drawer_id),
            occurred_at,
            created,
        )?,
    };
    Ok(LocationRef::Storage(container_id))
}

fn create_named(
    tx: &mut Transaction,
    kind: LocationKind,
    name: &str,
    parent: Option<LocationId>,
    occurred_at: DateTime<Utc>,
    created: &mut Vec<LocationId>,
) -> DomainResult<LocationId> {
    let location_id = LocationId::new();
    tx.execute(&LedgerCommand::CreateLocation(CreateLocation {
        location_id,
        kind,
        name: name.to_string(),
        parent,
        occurred_at,
    }))?;
    tracing::debug!(%location_id, %kind, name, "location created by import");
    created.push(location_id);
    Ok(location_id)
}
