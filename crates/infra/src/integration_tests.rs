//! End-to-end scenarios through the service façade.
//!
//! Catalog → alias table → precheck → import → ledger operations → sanity
//! checks, all against one in-memory store.

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;

    use brickledger_catalog::{
        CanonicalColor, CanonicalPart, CatalogSnapshot, InMemoryCatalog, Rgb, SetTemplate,
    };
    use brickledger_core::{
        ColorId, DomainError, LocationId, PartColor, PartId, SetNumber, SourceSystem,
    };
    use brickledger_inventory::{
        DeclaredLocation, ImportOutcome, LocationKind, LocationRef, PartOutSelection, SetStatus,
    };
    use brickledger_reconcile::ForeignLineItem;

    use crate::error::ServiceError;
    use crate::service::InventoryService;
    use crate::store::InMemoryLedgerStore;

    fn pc(part: &str, color: i32) -> PartColor {
        PartColor::new(PartId::parse(part).unwrap(), ColorId(color))
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_snapshot(CatalogSnapshot {
            parts: vec![
                CanonicalPart::new(PartId::parse("3001").unwrap(), "Brick 2 x 4"),
                CanonicalPart::new(PartId::parse("3003").unwrap(), "Brick 2 x 2"),
                CanonicalPart::new(PartId::parse("3004").unwrap(), "Brick 1 x 2"),
            ],
            colors: vec![
                CanonicalColor::new(ColorId(5), "Red", Rgb::from_hex("C91A09").unwrap()),
                CanonicalColor::new(ColorId(11), "Black", Rgb::from_hex("05131D").unwrap()),
            ],
            sets: vec![
                SetTemplate::new(SetNumber::parse("10270-1").unwrap(), "Bookshop")
                    .with_part(pc("3001", 5), 4)
                    .with_part(pc("3003", 11), 2),
            ],
        })
    }

    fn service() -> InventoryService<InMemoryCatalog> {
        let service = InventoryService::new(catalog(), InMemoryLedgerStore::new());
        service
            .set_part_alias(SourceSystem::BrickLink, "3001", PartId::parse("3001").unwrap(), Some(5))
            .unwrap();
        service
            .set_part_alias(SourceSystem::BrickLink, "3003", PartId::parse("3003").unwrap(), None)
            .unwrap();
        service
            .set_color_alias(SourceSystem::BrickLink, 5, ColorId(5))
            .unwrap();
        service
            .set_color_alias(SourceSystem::BrickLink, 11, ColorId(11))
            .unwrap();
        service
    }

    fn item(part: &str, color: i32, quantity: u32, location: DeclaredLocation) -> ForeignLineItem {
        ForeignLineItem {
            source_system: SourceSystem::BrickLink,
            source_part_id: part.to_string(),
            source_color_id: color,
            quantity,
            declared_location: location,
        }
    }

    fn at(id: LocationId) -> DeclaredLocation {
        DeclaredLocation::Location { id }
    }

    fn domain(err: ServiceError) -> DomainError {
        err.as_domain().cloned().unwrap()
    }

    #[test]
    fn import_adds_to_existing_loose_stock() {
        let service = service();
        let drawer = service.create_location(LocationKind::Drawer, "Drawer 1", None).unwrap();
        service.import_batch(&[item("3001", 5, 3, at(drawer))]).unwrap();

        let export = [item("3001", 5, 12, at(drawer))];
        let report = service.precheck(&export).unwrap();
        assert!(report.is_clean());
        assert!(report.unresolved_parts.is_empty());
        assert!(report.unresolved_colors.is_empty());

        let outcome = service.import_batch(&export).unwrap();
        assert!(matches!(outcome, ImportOutcome::Committed(_)));
        let qty = service
            .store()
            .read(|s| s.ledger.quantity_at(&pc("3001", 5), LocationRef::Storage(drawer)))
            .unwrap();
        assert_eq!(qty, 15);
    }

    #[test]
    fn part_out_beyond_template_fails_and_leaves_set_untouched() {
        let service = service();
        let set = SetNumber::parse("10270-1").unwrap();
        let instance = service.acquire_set(&set, SetStatus::Built).unwrap();

        let err = service
            .part_out(
                instance,
                PartOutSelection::Lines(vec![(pc("3001", 5), 5)]),
                LocationRef::Unassigned,
            )
            .unwrap_err();
        assert!(matches!(
            domain(err),
            DomainError::InsufficientQuantity { requested: 5, available: 4, .. }
        ));

        let (in_set, status) = service
            .store()
            .read(|s| {
                (
                    s.ledger.quantity_at(&pc("3001", 5), LocationRef::Set(instance)),
                    s.ledger.set_instance(instance).map(|i| i.status),
                )
            })
            .unwrap();
        assert_eq!(in_set, 4);
        assert_eq!(status, Some(SetStatus::Built));
    }

    #[test]
    fn part_out_walks_status_to_loose_parts() {
        let service = service();
        let set = SetNumber::parse("10270-1").unwrap();
        let instance = service.acquire_set(&set, SetStatus::Built).unwrap();
        let drawer = service.create_location(LocationKind::Drawer, "Parts", None).unwrap();

        let status = service
            .part_out(
                instance,
                PartOutSelection::Lines(vec![(pc("3001", 5), 3)]),
                LocationRef::Storage(drawer),
            )
            .unwrap();
        assert_eq!(status, SetStatus::Teardown);

        let status = service
            .part_out(instance, PartOutSelection::All, LocationRef::Storage(drawer))
            .unwrap();
        assert_eq!(status, SetStatus::LooseParts);

        let err = service.set_status(instance, SetStatus::Built).unwrap_err();
        assert!(matches!(domain(err), DomainError::InvariantViolation(_)));

        let totals = service.totals().unwrap();
        assert_eq!(totals.in_set_total, 0);
        assert_eq!(totals.loose_total, 6);
        assert!(service.run_checks().unwrap().is_empty());
    }

    #[test]
    fn drawer_deletes_only_after_its_container_is_gone() {
        let service = service();
        let drawer = service.create_location(LocationKind::Drawer, "Drawer 2", None).unwrap();
        let container = service
            .create_location(LocationKind::Container, "Container 9", Some(drawer))
            .unwrap();
        service.import_batch(&[item("3003", 11, 6, at(container))]).unwrap();

        let err = service.delete_location(drawer).unwrap_err();
        assert!(matches!(domain(err), DomainError::NonEmptyLocation(_)));
        let err = service.delete_location(container).unwrap_err();
        assert!(matches!(domain(err), DomainError::NonEmptyLocation(_)));

        service
            .move_stock(
                pc("3003", 11),
                LocationRef::Storage(container),
                LocationRef::Unassigned,
                6,
            )
            .unwrap();
        service.delete_location(container).unwrap();
        service.delete_location(drawer).unwrap();

        let active = service
            .store()
            .read(|s| s.ledger.locations().filter(|l| l.is_active()).count())
            .unwrap();
        assert_eq!(active, 0);
    }

    #[test]
    fn reimporting_the_same_export_changes_nothing() {
        let service = service();
        let export = [
            item("3001", 5, 12, DeclaredLocation::from_path("Drawer 1|Tub A").unwrap()),
            item("3003", 11, 4, DeclaredLocation::Unassigned),
        ];

        let first = service.import_batch(&export).unwrap();
        let ImportOutcome::Committed(receipt) = first else {
            panic!("first import must commit");
        };
        assert_eq!(receipt.lines_applied, 2);
        assert_eq!(receipt.quantity_added, 16);
        assert_eq!(receipt.locations_created.len(), 2);

        let state = service.store().state().unwrap();
        let audit = service.store().audit_log(0).unwrap();

        let second = service.import_batch(&export).unwrap();
        match second {
            ImportOutcome::AlreadyImported(record) => {
                assert_eq!(record.fingerprint, receipt.fingerprint)
            }
            other => panic!("expected AlreadyImported, got {other:?}"),
        }
        assert_eq!(service.store().state().unwrap(), state);
        assert_eq!(service.store().audit_log(0).unwrap(), audit);
    }

    #[test]
    fn named_locations_are_reused_by_later_imports() {
        let service = service();
        let path = DeclaredLocation::from_path("Drawer 1|Tub A").unwrap();
        service.import_batch(&[item("3001", 5, 2, path.clone())]).unwrap();
        let outcome = service.import_batch(&[item("3003", 11, 1, path)]).unwrap();

        let ImportOutcome::Committed(receipt) = outcome else {
            panic!("second import is a different batch");
        };
        assert!(receipt.locations_created.is_empty());
        let count = service.store().read(|s| s.ledger.locations().count()).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn one_unresolved_line_aborts_the_whole_import() {
        let service = service();
        let before = service.store().state().unwrap();

        let err = service
            .import_batch(&[
                item("3001", 5, 12, DeclaredLocation::Unassigned),
                item("3010", 5, 1, DeclaredLocation::Unassigned),
            ])
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::Unresolved(_)));
        assert_eq!(service.store().state().unwrap(), before);
        assert!(service.store().audit_log(0).unwrap().is_empty());
    }

    #[test]
    fn aliases_scoped_to_other_colors() {
        let service = service();
        let line = [item("3001", 11, 1, DeclaredLocation::Unassigned)];

        // One scoped alias (color 5) says nothing about color 11.
        let report = service.precheck(&line).unwrap();
        assert!(report.ambiguous.is_empty());
        assert_eq!(report.unresolved_parts.len(), 1);
        assert_eq!(report.unresolved_parts[0].source_part_id, "3001");

        // Two scoped aliases with different targets conflict.
        service
            .set_part_alias(SourceSystem::BrickLink, "3001", PartId::parse("3004").unwrap(), Some(6))
            .unwrap();
        let report = service.precheck(&line).unwrap();
        assert!(report.unresolved_parts.is_empty());
        assert_eq!(report.ambiguous.len(), 1);
        assert_eq!(
            report.ambiguous[0].candidates,
            vec![PartId::parse("3001").unwrap(), PartId::parse("3004").unwrap()]
        );
        let err = service.import_batch(&line).unwrap_err();
        assert!(matches!(domain(err), DomainError::Ambiguous(_)));
    }

    #[test]
    fn alias_to_a_missing_canonical_part_is_excluded() {
        let service = service();
        let seeded: Result<_, ServiceError> = service.store().transaction(|tx| {
            Ok(tx.aliases_mut().set_part_alias(
                SourceSystem::BrickLink,
                "9999",
                None,
                PartId::parse("9999").unwrap(),
                Utc::now(),
            )?)
        });
        seeded.unwrap();

        let export = [
            item("3003", 11, 2, DeclaredLocation::Unassigned),
            item("9999", 11, 7, DeclaredLocation::Unassigned),
        ];
        assert_eq!(service.precheck(&export).unwrap().rejected.len(), 1);

        let ImportOutcome::Committed(receipt) = service.import_batch(&export).unwrap() else {
            panic!("valid lines must still commit");
        };
        assert_eq!(receipt.lines_applied, 1);
        assert_eq!(receipt.lines_excluded, 1);
        assert_eq!(service.totals().unwrap().loose_total, 2);
    }

    #[test]
    fn setting_an_alias_to_an_unknown_part_is_refused() {
        let service = service();
        let err = service
            .set_part_alias(SourceSystem::Rebrickable, "3001", PartId::parse("nope").unwrap(), None)
            .unwrap_err();
        assert!(matches!(domain(err), DomainError::NotFound(_)));
    }

    #[test]
    fn suggestions_come_from_known_source_ids() {
        let service = service();
        let suggestions = service.suggest(SourceSystem::BrickLink, "3003a").unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].similar_source_id, "3003");

        let report = service
            .precheck(&[item("3003a", 11, 1, DeclaredLocation::Unassigned)])
            .unwrap();
        assert_eq!(report.unresolved_parts.len(), 1);
        assert_eq!(report.unresolved_parts[0].suggestions.len(), 1);
    }

    #[test]
    fn merge_folds_source_into_destination() {
        let service = service();
        let a = service.create_location(LocationKind::Drawer, "A", None).unwrap();
        let b = service.create_location(LocationKind::Drawer, "B", None).unwrap();
        service
            .import_batch(&[
                item("3003", 11, 2, at(a)),
                item("3003", 11, 5, at(b)),
            ])
            .unwrap();

        service.merge(a, b).unwrap();
        let (at_b, a_active) = service
            .store()
            .read(|s| {
                (
                    s.ledger.quantity_at(&pc("3003", 11), LocationRef::Storage(b)),
                    s.ledger.location(a).map(|l| l.is_active()),
                )
            })
            .unwrap();
        assert_eq!(at_b, 7);
        assert_eq!(a_active, Some(false));

        service.restore_location(a).unwrap();
        assert!(service.run_checks().unwrap().is_empty());
    }

    #[test]
    fn store_survives_a_snapshot_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let service = service();
        service
            .import_batch(&[item("3001", 5, 3, DeclaredLocation::from_path("D1").unwrap())])
            .unwrap();
        service.store().save_json(&path).unwrap();

        let reopened = InventoryService::new(catalog(), InMemoryLedgerStore::open(&path).unwrap());
        assert_eq!(reopened.totals().unwrap(), service.totals().unwrap());
        assert_eq!(
            reopened.store().audit_log(0).unwrap(),
            service.store().audit_log(0).unwrap()
        );
    }

    fn export_strategy() -> impl Strategy<Value = Vec<ForeignLineItem>> {
        let line = (
            prop::sample::select(vec![("3001", 5), ("3003", 11), ("3003", 5)]),
            1u32..40,
            prop::sample::select(vec!["", "D1", "D1|T1", "D2|T1"]),
        )
            .prop_map(|((part, color), quantity, path)| {
                let location = if path.is_empty() {
                    DeclaredLocation::Unassigned
                } else {
                    DeclaredLocation::from_path(path).unwrap()
                };
                item(part, color, quantity, location)
            });
        prop::collection::vec(line, 1..8)
    }

    proptest! {
        #[test]
        fn importing_twice_equals_importing_once(export in export_strategy()) {
            let service = service();
            service.import_batch(&export).unwrap();
            let once = service.store().state().unwrap();

            let again = service.import_batch(&export).unwrap();
            prop_assert!(matches!(again, ImportOutcome::AlreadyImported(_)), "second import must be skipped");
            prop_assert_eq!(service.store().state().unwrap(), once);
        }

        #[test]
        fn precheck_never_writes(export in export_strategy(), extra in "[0-9a-z]{1,6}", runs in 1usize..4) {
            let service = service();
            let mut export = export;
            export.push(item(&extra, 99, 1, DeclaredLocation::Unassigned));
            let before = service.store().state().unwrap();
            for _ in 0..runs {
                service.precheck(&export).unwrap();
                service.resolve_batch(&export).unwrap();
            }
            prop_assert_eq!(service.store().state().unwrap(), before);
            prop_assert!(service.store().audit_log(0).unwrap().is_empty());
        }

        #[test]
        fn last_alias_write_wins(
            writes in prop::collection::vec(
                (
                    prop::sample::select(vec!["a", "b", "c"]),
                    prop::option::of(prop::sample::select(vec![5, 11])),
                    prop::sample::select(vec!["3001", "3003", "3004"]),
                ),
                1..20,
            )
        ) {
            let service = InventoryService::new(catalog(), InMemoryLedgerStore::new());
            let mut expected = std::collections::BTreeMap::new();
            for (source, scope, canonical) in &writes {
                service
                    .set_part_alias(SourceSystem::Instabrick, source, PartId::parse(canonical).unwrap(), *scope)
                    .unwrap();
                expected.insert((source.to_string(), *scope), canonical.to_string());
            }

            let actual: std::collections::BTreeMap<_, _> = service
                .store()
                .read(|s| {
                    s.aliases
                        .part_aliases()
                        .map(|(k, v)| ((k.source_part_id.clone(), k.color_scope), v.as_str().to_string()))
                        .collect()
                })
                .unwrap();
            prop_assert_eq!(actual, expected);
        }
    }
}
