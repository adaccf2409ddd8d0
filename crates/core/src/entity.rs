//! Entity trait: records whose identity outlives changes to their attributes.

/// Implemented by ledger records that are addressed by id (storage locations,
/// owned set copies) rather than compared by value.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
