//! Valence saturation checking and bond order assignment for molecular
//! graphs.
//!
//! Molecules are atom/bond graphs ([`Mol`]) whose atoms may arrive
//! partially specified: hydrogen counts undetermined, bond orders below
//! their final values. A [`Checker`] matches atoms against an ordered
//! atom-type template catalog to decide saturation, derive missing
//! hydrogen counts, and search for a bond-order assignment that saturates
//! the whole graph. Three checker flavours share one engine: charge-only
//! matching, charge-plus-hybridization matching, and the lone-pair
//! corrector.

pub mod atom;
pub mod bond;
pub mod catalog;
pub mod checker;
pub mod element;
pub mod formula;
pub mod graph_ops;
pub mod hydrogen;
pub mod lonepair;
pub mod mol;
mod saturate;
pub mod traits;
pub mod valence;

pub use atom::{Atom, Hybridization};
pub use bond::{Bond, BondOrder};
pub use catalog::{AtomType, Catalog, CatalogError};
pub use checker::{
    AtomEnv, ChargeMatch, CheckError, Checker, HybridMatch, MatchPolicy, SaturateError,
    SaturationReport, DEFAULT_STEP_LIMIT,
};
pub use element::Element;
pub use formula::{average_mol_weight, mol_formula};
pub use graph_ops::{connected_components, get_fragments, num_components};
pub use hydrogen::{add_explicit, collapse_explicit, fill_implicit};
pub use lonepair::LonePairChecker;
pub use mol::Mol;

#[cfg(test)]
mod tests;
