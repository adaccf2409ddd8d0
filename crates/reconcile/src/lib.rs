//! Alias reconciliation.
//!
//! Maps the part and color ids used by external systems (BrickLink,
//! Instabrick, Rebrickable) onto canonical catalog ids, classifies every line
//! of an export before it may touch the ledger, and proposes aliases for
//! unresolved part ids by string similarity.

pub mod alias;
pub mod precheck;
pub mod resolve;
pub mod suggest;

pub use alias::{AliasKey, AliasRevision, AliasTable, AliasTarget, ColorAliasKey, PartAliasKey, PartLookup};
pub use precheck::{precheck, AmbiguousItem, PrecheckReport, RejectedItem, UnresolvedColor, UnresolvedPart};
pub use resolve::{resolve_batch, ForeignLineItem, ImportPlan, Resolution, ResolutionReport, ResolvedItem, Resolver};
pub use suggest::{AliasSuggestion, TypoAssist};
