use std::sync::Arc;

use brickledger_core::{ColorId, DomainResult, PartColor, PartId, SetNumber};

use crate::model::{CanonicalColor, CanonicalPart, SetTemplate};

/// Read-only access to canonical reference data.
///
/// Implementations are authoritative: a `NotFound` here means the id must not
/// be written into the ledger.
pub trait CatalogProvider: Send + Sync {
    fn get_canonical_part(&self, id: &PartId) -> DomainResult<CanonicalPart>;

    fn get_canonical_color(&self, id: ColorId) -> DomainResult<CanonicalColor>;

    fn get_set_template(&self, set_number: &SetNumber) -> DomainResult<SetTemplate>;

    /// Referential-integrity check for one ledger key.
    fn ensure_part_color(&self, part_color: &PartColor) -> DomainResult<()> {
        self.get_canonical_part(&part_color.part)?;
        self.get_canonical_color(part_color.color)?;
        Ok(())
    }
}

impl<C> CatalogProvider for Arc<C>
where
    C: CatalogProvider + ?Sized,
{
    fn get_canonical_part(&self, id: &PartId) -> DomainResult<CanonicalPart> {
        (**self).get_canonical_part(id)
    }

    fn get_canonical_color(&self, id: ColorId) -> DomainResult<CanonicalColor> {
        (**self).get_canonical_color(id)
    }

    fn get_set_template(&self, set_number: &SetNumber) -> DomainResult<SetTemplate> {
        (**self).get_set_template(set_number)
    }
}
