use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use brickledger_core::EntryId;

use crate::Event;

/// Audit log entry wrapping one committed event.
///
/// Notes:
/// - **Append-only**: `sequence_number` increases by one per committed event
///   across the whole log and is assigned by the store at commit time.
/// - `payload` is the typed event; `event_type` is duplicated alongside it so
///   the log can be filtered without matching on the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    entry_id: EntryId,
    sequence_number: u64,
    event_type: String,
    event_version: u32,
    occurred_at: DateTime<Utc>,
    payload: E,
}

impl<E: Event> EventEnvelope<E> {
    pub fn wrap(sequence_number: u64, payload: E) -> Self {
        Self {
            entry_id: EntryId::new(),
            sequence_number,
            event_type: payload.event_type().to_string(),
            event_version: payload.version(),
            occurred_at: payload.occurred_at(),
            payload,
        }
    }
}

impl<E> EventEnvelope<E> {
    pub fn entry_id(&self) -> EntryId {
        self.entry_id
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn event_version(&self) -> u32 {
        self.event_version
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
