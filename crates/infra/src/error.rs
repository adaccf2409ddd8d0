use thiserror::Error;

use brickledger_core::DomainError;

use crate::store::StoreError;

/// Error returned by [`crate::InventoryService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Deterministic business failure; the store is unchanged.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Stable machine-readable code for transports.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Domain(err) => err.code(),
            ServiceError::Store(_) => "store_error",
        }
    }

    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            ServiceError::Domain(err) => Some(err),
            ServiceError::Store(_) => None,
        }
    }
}
