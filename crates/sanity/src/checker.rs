use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use brickledger_catalog::CatalogProvider;
use brickledger_core::PartColor;
use brickledger_inventory::{Ledger, LedgerTotals, LineStatus, LocationRef, SetInstance, SetStatus};

use crate::anomaly::{Anomaly, AnomalyKind, EntityRef};

/// Output of one sanity pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanityReport {
    pub anomalies: Vec<Anomaly>,
    pub totals: LedgerTotals,
    pub sets_checked: usize,
    pub lines_checked: usize,
}

impl SanityReport {
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }

    pub fn count(&self, kind: AnomalyKind) -> usize {
        self.anomalies.iter().filter(|a| a.kind == kind).count()
    }
}

/// Compares expected against actual quantities across sets and loose storage.
///
/// Model:
/// - Set copies not in `teardown`/`loose_parts` must not exceed their
///   template, and copies in one of `template_statuses` must hold all of it.
/// - Loose quantity aggregated per part-color must not be negative.
/// - Every line must point at an existing placement and a catalog-known
///   part and color.
#[derive(Debug, Clone)]
pub struct SanityChecker {
    template_statuses: BTreeSet<SetStatus>,
}

impl Default for SanityChecker {
    fn default() -> Self {
        Self {
            template_statuses: [SetStatus::Built, SetStatus::InBox].into_iter().collect(),
        }
    }
}

impl SanityChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template_statuses(mut self, statuses: impl IntoIterator<Item = SetStatus>) -> Self {
        self.template_statuses = statuses.into_iter().collect();
        self
    }

    pub fn run<C>(&self, ledger: &Ledger, catalog: &C) -> SanityReport
    where
        C: CatalogProvider + ?Sized,
    {
        let mut anomalies = Vec::new();
        for set in ledger.set_instances() {
            self.check_set(ledger, set, &mut anomalies);
        }
        check_lines(ledger, catalog, &mut anomalies);

        for anomaly in &anomalies {
            match anomaly.kind {
                AnomalyKind::NegativeBalance => tracing::error!(
                    kind = %anomaly.kind,
                    entity = %anomaly.entity_ref,
                    detail = %anomaly.detail,
                    "negative balance in ledger"
                ),
                _ => tracing::warn!(
                    kind = %anomaly.kind,
                    entity = %anomaly.entity_ref,
                    detail = %anomaly.detail,
                    "ledger anomaly"
                ),
            }
        }

        let report = SanityReport {
            anomalies,
            totals: ledger.totals(),
            sets_checked: ledger.set_instances().count(),
            lines_checked: ledger.lines().count(),
        };
        tracing::info!(
            anomalies = report.anomalies.len(),
            sets = report.sets_checked,
            lines = report.lines_checked,
            "sanity check finished"
        );
        report
    }

    fn check_set(&self, ledger: &Ledger, set: &SetInstance, out: &mut Vec<Anomaly>) {
        let entity = EntityRef::SetInstance { id: set.id };
        let held: BTreeMap<PartColor, i64> = ledger
            .lines_at(LocationRef::Set(set.id))
            .into_iter()
            .collect();

        if set.status == SetStatus::LooseParts {
            let remaining: i64 = held.values().filter(|q| **q > 0).sum();
            if remaining > 0 {
                out.push(Anomaly::new(
                    AnomalyKind::StatusLineMismatch,
                    entity.clone(),
                    format!("status loose_parts but {remaining} part(s) still held"),
                ));
            }
        }

        let Some(template) = ledger.template(&set.set_number) else {
            out.push(Anomaly::new(
                AnomalyKind::UnknownCanonicalReference,
                entity,
                format!("no template recorded for set {}", set.set_number),
            ));
            return;
        };

        if !matches!(set.status, SetStatus::Teardown | SetStatus::LooseParts) {
            for (pc, qty) in &held {
                let cap = i64::from(template.quantity_of(pc));
                if *qty > cap {
                    out.push(Anomaly::new(
                        AnomalyKind::TemplateCapacityExceeded,
                        EntityRef::Line {
                            part_color: pc.clone(),
                            location: LocationRef::Set(set.id),
                        },
                        format!(
                            "copy #{} of {} holds {qty} but the template lists {cap}",
                            set.copy_index, set.set_number
                        ),
                    ));
                }
            }
        }

        if self.template_statuses.contains(&set.status) {
            let short: Vec<String> = template
                .parts()
                .filter_map(|(pc, expected)| {
                    let have = held.get(pc).copied().unwrap_or(0);
                    (have < i64::from(expected)).then(|| format!("{pc} {have}/{expected}"))
                })
                .collect();
            if !short.is_empty() {
                out.push(Anomaly::new(
                    AnomalyKind::MissingTemplateParts,
                    entity,
                    format!(
                        "copy #{} of {} is {} but is missing: {}",
                        set.copy_index,
                        set.set_number,
                        set.status,
                        short.join(", ")
                    ),
                ));
            }
        }
    }
}

fn check_lines<C>(ledger: &Ledger, catalog: &C, out: &mut Vec<Anomaly>)
where
    C: CatalogProvider + ?Sized,
{
    let mut loose: BTreeMap<PartColor, i64> = BTreeMap::new();
    let mut seen: BTreeSet<PartColor> = BTreeSet::new();

    for (key, qty) in ledger.lines() {
        let line = EntityRef::Line {
            part_color: key.part_color.clone(),
            location: key.location,
        };
        if qty < 0 {
            out.push(Anomaly::new(
                AnomalyKind::NegativeBalance,
                line.clone(),
                format!("line quantity is {qty} ({:?})", key.status()),
            ));
        }
        if key.status() == LineStatus::Loose {
            *loose.entry(key.part_color.clone()).or_insert(0) += qty;
        }

        match key.location {
            LocationRef::Unassigned => {}
            LocationRef::Storage(id) => match ledger.location(id) {
                Some(loc) if loc.is_active() => {}
                Some(loc) => out.push(Anomaly::new(
                    AnomalyKind::DanglingLocation,
                    line.clone(),
                    format!("{qty} held by deleted {} '{}'", loc.kind, loc.name),
                )),
                None => out.push(Anomaly::new(
                    AnomalyKind::DanglingLocation,
                    line.clone(),
                    format!("{qty} held by unknown location {id}"),
                )),
            },
            LocationRef::Set(id) => {
                if ledger.set_instance(id).is_none() {
                    out.push(Anomaly::new(
                        AnomalyKind::OrphanedSetLine,
                        line.clone(),
                        format!("{qty} held by unknown set copy {id}"),
                    ));
                }
            }
        }

        if seen.insert(key.part_color.clone()) {
            if let Err(err) = catalog.ensure_part_color(&key.part_color) {
                out.push(Anomaly::new(
                    AnomalyKind::UnknownCanonicalReference,
                    EntityRef::PartColor {
                        part_color: key.part_color.clone(),
                    },
                    err.to_string(),
                ));
            }
        }
    }

    for (pc, total) in loose {
        if total < 0 {
            out.push(Anomaly::new(
                AnomalyKind::NegativeBalance,
                EntityRef::PartColor {
                    part_color: pc.clone(),
                },
                format!("aggregate loose quantity of {pc} is {total}"),
            ));
        }
    }
}

/// Run every check with the default configuration.
pub fn run_checks<C>(ledger: &Ledger, catalog: &C) -> Vec<Anomaly>
where
    C: CatalogProvider + ?Sized,
{
    SanityChecker::default().run(ledger, catalog).anomalies
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickledger_catalog::{CanonicalColor, CanonicalPart, CatalogSnapshot, InMemoryCatalog, Rgb, SetTemplate};
    use brickledger_core::{ColorId, LocationId, PartId, SetInstanceId, SetNumber};
    use brickledger_events::execute;
    use brickledger_inventory::{
        AcquireSet, CommitImport, CreateLocation, LedgerCommand, LocationKind, PlacedLine,
    };
    use chrono::Utc;
    use serde_json::json;

    fn pc(part: &str, color: i32) -> PartColor {
        PartColor::new(PartId::parse(part).unwrap(), ColorId(color))
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_snapshot(CatalogSnapshot {
            parts: vec![
                CanonicalPart::new(PartId::parse("3001").unwrap(), "Brick 2 x 4"),
                CanonicalPart::new(PartId::parse("3003").unwrap(), "Brick 2 x 2"),
            ],
            colors: vec![
                CanonicalColor::new(ColorId(5), "Red", Rgb { r: 0xC9, g: 0x1A, b: 0x09 }),
                CanonicalColor::new(ColorId(0), "Black", Rgb { r: 0x05, g: 0x13, b: 0x1D }),
            ],
            sets: vec![],
        })
    }

    fn ledger_with_set(status: SetStatus) -> (Ledger, SetInstanceId) {
        let mut ledger = Ledger::new();
        let id = SetInstanceId::new();
        let template = SetTemplate::new(SetNumber::parse("10270-1").unwrap(), "Bookshop")
            .with_part(pc("3001", 5), 4)
            .with_part(pc("3003", 0), 2);
        execute(
            &mut ledger,
            &LedgerCommand::AcquireSet(AcquireSet {
                instance_id: id,
                template,
                status,
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        (ledger, id)
    }

    /// Overwrite the quantity of the first line matching `part`, the way a
    /// hand-edited snapshot would.
    fn tamper(ledger: &Ledger, part: &str, qty: i64) -> Ledger {
        let mut value = serde_json::to_value(ledger).unwrap();
        let lines = value["lines"].as_array_mut().unwrap();
        let row = lines
            .iter_mut()
            .find(|row| row[0]["part_color"]["part"] == json!(part))
            .unwrap();
        row[1] = json!(qty);
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn consistent_ledger_is_clean() {
        let (mut ledger, _) = ledger_with_set(SetStatus::Built);
        let drawer = LocationId::new();
        execute(
            &mut ledger,
            &LedgerCommand::CreateLocation(CreateLocation {
                location_id: drawer,
                kind: LocationKind::Drawer,
                name: "Drawer 1".into(),
                parent: None,
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        execute(
            &mut ledger,
            &LedgerCommand::CommitImport(CommitImport {
                fingerprint: "fp".into(),
                lines: vec![PlacedLine {
                    part_color: pc("3001", 5),
                    location: LocationRef::Storage(drawer),
                    quantity: 3,
                }],
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();

        let report = SanityChecker::new().run(&ledger, &catalog());
        assert!(report.is_clean(), "{:?}", report.anomalies);
        assert_eq!(report.totals.loose_total, 3);
        assert_eq!(report.totals.in_set_total, 6);
        assert_eq!(report.totals.template_total, 6);
        assert_eq!(report.totals.overall_total, 9);
    }

    #[test]
    fn flags_capacity_overflow_from_a_tampered_snapshot() {
        let (ledger, _) = ledger_with_set(SetStatus::Built);
        let tampered = tamper(&ledger, "3001", 5);

        let anomalies = run_checks(&tampered, &catalog());
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::TemplateCapacityExceeded);
    }

    #[test]
    fn flags_negative_balances_and_missing_parts() {
        let (ledger, _) = ledger_with_set(SetStatus::InBox);
        let tampered = tamper(&ledger, "3003", -1);

        let report = SanityChecker::new().run(&tampered, &catalog());
        assert_eq!(report.count(AnomalyKind::NegativeBalance), 1);
        assert_eq!(report.count(AnomalyKind::MissingTemplateParts), 1);
    }

    #[test]
    fn template_statuses_are_configurable() {
        let (ledger, _) = ledger_with_set(SetStatus::WorkInProgress);
        let tampered = tamper(&ledger, "3003", 1);

        assert!(SanityChecker::new().run(&tampered, &catalog()).is_clean());
        let strict = SanityChecker::new().with_template_statuses(SetStatus::ALL);
        assert_eq!(
            strict.run(&tampered, &catalog()).count(AnomalyKind::MissingTemplateParts),
            1
        );
    }

    #[test]
    fn flags_ids_missing_from_the_catalog() {
        let (ledger, _) = ledger_with_set(SetStatus::Teardown);
        let sparse = InMemoryCatalog::from_snapshot(CatalogSnapshot {
            parts: vec![CanonicalPart::new(PartId::parse("3001").unwrap(), "Brick 2 x 4")],
            colors: vec![CanonicalColor::new(ColorId(5), "Red", Rgb { r: 0xC9, g: 0x1A, b: 0x09 })],
            sets: vec![],
        });

        let anomalies = run_checks(&ledger, &sparse);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::UnknownCanonicalReference);
    }

    #[test]
    fn checker_does_not_mutate() {
        let (ledger, _) = ledger_with_set(SetStatus::Built);
        let before = ledger.clone();
        let _ = run_checks(&ledger, &catalog());
        assert_eq!(ledger, before);
    }
}
