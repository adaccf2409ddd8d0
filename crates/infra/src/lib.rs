//! Infrastructure layer: transactional store, snapshot persistence,
//! configuration and the service façade callers drive.

pub mod settings;
pub mod error;
pub mod service;
pub mod store;

mod integration_tests;

pub use settings::{AppConfig, SanityConfig, SuggestConfig};
pub use error::ServiceError;
pub use service::InventoryService;
pub use store::{InMemoryLedgerStore, StoreError, StoreSnapshot, StoreState, Transaction};
