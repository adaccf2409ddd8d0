use std::sync::{Mutex, RwLock};

use serde::{Deserialize, Serialize};

use brickledger_core::{AggregateRoot, DomainError, DomainResult};
use brickledger_events::{execute, EventEnvelope};
use brickledger_inventory::{Ledger, LedgerCommand, LedgerEvent};
use brickledger_reconcile::AliasTable;

use super::StoreError;

/// Everything a transaction may change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreState {
    pub ledger: Ledger,
    pub aliases: AliasTable,
}

#[derive(Debug, Default)]
struct Inner {
    state: StoreState,
    audit: Vec<EventEnvelope<LedgerEvent>>,
}

/// Working copy handed to a transaction body.
///
/// Commands run against a clone of the committed state; nothing is visible
/// to readers until the body returns `Ok` and the postconditions hold.
#[derive(Debug)]
pub struct Transaction {
    state: StoreState,
    events: Vec<LedgerEvent>,
}

impl Transaction {
    pub fn ledger(&self) -> &Ledger {
        &self.state.ledger
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.state.aliases
    }

    pub fn aliases_mut(&mut self) -> &mut AliasTable {
        &mut self.state.aliases
    }

    /// Decide and apply one ledger command on the working copy.
    pub fn execute(&mut self, command: &LedgerCommand) -> DomainResult<Vec<LedgerEvent>> {
        let events = execute(&mut self.state.ledger, command)?;
        self.events.extend(events.iter().cloned());
        Ok(events)
    }

    pub fn events(&self) -> &[LedgerEvent] {
        &self.events
    }
}

/// In-memory store with single-writer transactions.
///
/// - Writers are serialized by `writer`; each works on a private clone and
///   publishes it with one short write-lock swap.
/// - Readers take the read lock only long enough to look at (or clone) the
///   committed state, so they never see a half-applied transaction.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    writer: Mutex<()>,
    inner: RwLock<Inner>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn from_parts(state: StoreState, audit: Vec<EventEnvelope<LedgerEvent>>) -> Self {
        Self {
            writer: Mutex::new(()),
            inner: RwLock::new(Inner { state, audit }),
        }
    }

    pub(super) fn to_parts(
        &self,
    ) -> Result<(StoreState, Vec<EventEnvelope<LedgerEvent>>), StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok((inner.state.clone(), inner.audit.clone()))
    }

    /// Run `f` against the committed state.
    pub fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> Result<T, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(f(&inner.state))
    }

    pub fn state(&self) -> Result<StoreState, StoreError> {
        self.read(StoreState::clone)
    }

    /// Audit entries with a sequence number greater than `after`.
    pub fn audit_log(&self, after: u64) -> Result<Vec<EventEnvelope<LedgerEvent>>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(inner
            .audit
            .iter()
            .filter(|e| e.sequence_number() > after)
            .cloned()
            .collect())
    }

    /// Execute `body` as one atomic transaction.
    ///
    /// On `Err` from the body, or when the resulting ledger breaks an
    /// invariant, the working copy is dropped and the committed state is
    /// untouched. On success every ledger event is appended to the audit log
    /// with the next sequence number.
    pub fn transaction<T, E, F>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce(&mut Transaction) -> Result<T, E>,
        E: From<DomainError> + From<StoreError>,
    {
        // The guard protects no data, so a panic in an earlier body is harmless.
        let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());

        let mut tx = Transaction {
            state: self.state()?,
            events: Vec::new(),
        };
        let value = match body(&mut tx) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!("transaction rolled back");
                return Err(err);
            }
        };
        if !tx.events.is_empty() {
            tx.state.ledger.verify_invariants()?;
        }

        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        let mut sequence = inner.audit.last().map(|e| e.sequence_number()).unwrap_or(0);
        let committed = tx.events.len();
        for event in tx.events {
            sequence += 1;
            inner.audit.push(EventEnvelope::wrap(sequence, event));
        }
        inner.state = tx.state;
        tracing::debug!(
            events = committed,
            last_sequence = sequence,
            ledger_version = inner.state.ledger.version(),
            "transaction committed"
        );
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickledger_core::LocationId;
    use brickledger_inventory::{CreateLocation, LocationKind};
    use chrono::Utc;

    #[derive(Debug)]
    enum TestError {
        Domain(DomainError),
        Store,
    }

    impl From<DomainError> for TestError {
        fn from(value: DomainError) -> Self {
            TestError::Domain(value)
        }
    }

    impl From<StoreError> for TestError {
        fn from(_: StoreError) -> Self {
            TestError::Store
        }
    }

    fn create(name: &str) -> LedgerCommand {
        LedgerCommand::CreateLocation(CreateLocation {
            location_id: LocationId::new(),
            kind: LocationKind::Drawer,
            name: name.to_string(),
            parent: None,
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn failed_body_leaves_no_trace() {
        let store = InMemoryLedgerStore::new();
        let result: Result<(), TestError> = store.transaction(|tx| {
            tx.execute(&create("Drawer 1"))?;
            tx.execute(&create("Drawer 1"))?;
            Ok(())
        });

        assert!(matches!(result, Err(TestError::Domain(DomainError::Conflict(_)))));
        assert_eq!(store.read(|s| s.ledger.locations().count()).unwrap(), 0);
        assert!(store.audit_log(0).unwrap().is_empty());
    }

    #[test]
    fn commit_appends_sequenced_audit_entries() {
        let store = InMemoryLedgerStore::new();
        for name in ["A", "B"] {
            let result: Result<_, TestError> = store.transaction(|tx| tx.execute(&create(name)).map_err(Into::into));
            result.unwrap();
        }

        let log = store.audit_log(0).unwrap();
        let sequences: Vec<u64> = log.iter().map(|e| e.sequence_number()).collect();
        assert_eq!(sequences, vec![1, 2]);
        assert_eq!(log[0].event_type(), "ledger.location.created");
        assert_eq!(store.audit_log(1).unwrap().len(), 1);
        assert_eq!(store.read(|s| s.ledger.version()).unwrap(), 2);
    }
}
