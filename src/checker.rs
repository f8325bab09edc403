//! The saturation engine.
//!
//! A [`Checker`] decides whether atoms are valence-saturated with respect
//! to an atom-type catalog, derives missing implicit hydrogen counts, and
//! drives the bond-order saturation search.
//! The matching rules that differ between checker flavours live behind
//! [`MatchPolicy`]: [`ChargeMatch`] compares formal charge only,
//! [`HybridMatch`] additionally requires the atom's hybridization to be
//! absent or equal to the template's and derives hydrogens from the
//! template's formal neighbour count.

use std::fmt;
use std::sync::Arc;

use log::debug;
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::{Atom, Hybridization};
use crate::bond::{Bond, BondOrder};
use crate::catalog::{self, AtomType, Catalog, CatalogError};
use crate::mol::Mol;
use crate::valence::{bond_order_sum, explicit_neighbor_count, max_bond_order};

/// Default choice-point budget for one saturation search.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Snapshot of the valence environment of one atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtomEnv {
    pub bond_order_sum: u8,
    pub max_bond_order: Option<BondOrder>,
    /// Implicit hydrogen count; unset reads as 0.
    pub hydrogen_count: u8,
    pub formal_charge: i8,
    pub hybridization: Option<Hybridization>,
    pub neighbour_count: u8,
}

impl AtomEnv {
    pub fn of(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> AtomEnv {
        let atom = mol.atom(idx);
        AtomEnv {
            bond_order_sum: bond_order_sum(mol, idx),
            max_bond_order: max_bond_order(mol, idx),
            hydrogen_count: atom.hydrogen_count.unwrap_or(0),
            formal_charge: atom.formal_charge,
            hybridization: atom.hybridization,
            neighbour_count: explicit_neighbor_count(mol, idx),
        }
    }
}

/// Template-matching rules injected into the engine.
pub trait MatchPolicy {
    /// Identity gate: may this template describe this atom at all?
    fn admissible(&self, env: &AtomEnv, template: &AtomType) -> bool;

    /// Loose test used while bond orders are still rising: the atom could
    /// still grow into this template.
    fn could_match(&self, env: &AtomEnv, template: &AtomType) -> bool {
        self.admissible(env, template)
            && env.bond_order_sum + env.hydrogen_count <= template.bond_order_sum
            && env
                .max_bond_order
                .map_or(true, |m| m <= template.max_bond_order)
    }

    /// Hydrogens the template says this atom is missing.
    fn missing_hydrogens(&self, env: &AtomEnv, template: &AtomType) -> u8;
}

/// Match on formal charge alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChargeMatch;

impl MatchPolicy for ChargeMatch {
    fn admissible(&self, env: &AtomEnv, template: &AtomType) -> bool {
        env.formal_charge == template.formal_charge
    }

    fn missing_hydrogens(&self, env: &AtomEnv, template: &AtomType) -> u8 {
        template.bond_order_sum.saturating_sub(env.bond_order_sum)
    }
}

/// Match on formal charge plus hybridization.
#[derive(Debug, Clone, Copy, Default)]
pub struct HybridMatch;

impl MatchPolicy for HybridMatch {
    fn admissible(&self, env: &AtomEnv, template: &AtomType) -> bool {
        if env.formal_charge != template.formal_charge {
            return false;
        }
        match env.hybridization {
            None => true,
            Some(h) => template.hybridization == Some(h),
        }
    }

    fn missing_hydrogens(&self, env: &AtomEnv, template: &AtomType) -> u8 {
        match (env.hybridization, template.hybridization, template.neighbour_count) {
            (Some(_), Some(_), Some(neighbours)) => {
                neighbours.saturating_sub(env.neighbour_count)
            }
            _ => template.bond_order_sum.saturating_sub(env.bond_order_sum),
        }
    }
}

/// Errors from the saturation predicates and the hydrogen calculator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// The element is known to the catalog but no template admits the
    /// atom's formal charge (or, for the hybrid checker, its
    /// hybridization).
    NoMatchingAtomType {
        atom: NodeIndex,
        symbol: String,
        formal_charge: i8,
    },
    /// The catalog has no entries for this element. Raised only in strict
    /// mode; permissive mode treats such atoms as saturated.
    UnknownElement { atom: NodeIndex, symbol: String },
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatchingAtomType {
                atom,
                symbol,
                formal_charge,
            } => write!(
                f,
                "no atom type matches atom {} ({symbol}, charge {formal_charge})",
                atom.index(),
            ),
            Self::UnknownElement { atom, symbol } => {
                write!(f, "no atom types known for element {symbol} (atom {})", atom.index())
            }
        }
    }
}

impl std::error::Error for CheckError {}

/// Errors from the bond-order saturation search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaturateError {
    Check(CheckError),
    /// The backtracking search was exhausted; the listed atoms cannot be
    /// saturated by raising bond orders. The graph is left untouched.
    Unsaturatable { atoms: Vec<NodeIndex> },
    /// The choice-point budget ran out before the search concluded. The
    /// graph is left untouched.
    StepLimitExceeded { limit: usize },
}

impl fmt::Display for SaturateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Check(e) => write!(f, "{e}"),
            Self::Unsaturatable { atoms } => {
                write!(f, "cannot saturate molecule: atoms [")?;
                for (i, idx) in atoms.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", idx.index())?;
                }
                write!(f, "] remain unsaturated")
            }
            Self::StepLimitExceeded { limit } => {
                write!(f, "saturation search exceeded {limit} choice points")
            }
        }
    }
}

impl std::error::Error for SaturateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Check(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CheckError> for SaturateError {
    fn from(e: CheckError) -> Self {
        Self::Check(e)
    }
}

/// Outcome of a successful [`Checker::saturate`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaturationReport {
    /// Number of bonds whose order ended above its starting order.
    pub raised_bonds: usize,
    /// Atoms skipped because their element has no catalog entries. Empty in
    /// strict mode.
    pub unknown_elements: Vec<NodeIndex>,
}

/// Saturation engine over one catalog and one match policy.
pub struct Checker<P = ChargeMatch> {
    catalog: Arc<Catalog>,
    policy: P,
    strict: bool,
    step_limit: usize,
}

impl Checker<ChargeMatch> {
    /// Charge-only checker against the built-in `structgen` catalog.
    pub fn charge_only() -> Result<Self, CatalogError> {
        Ok(Self::with_catalog(catalog::load(catalog::STRUCTGEN)?, ChargeMatch))
    }
}

impl Checker<HybridMatch> {
    /// Charge-plus-hybridization checker against the built-in `valency`
    /// catalog.
    pub fn hybrid() -> Result<Self, CatalogError> {
        Ok(Self::with_catalog(catalog::load(catalog::VALENCY)?, HybridMatch))
    }
}

impl<P: MatchPolicy> Checker<P> {
    pub fn with_catalog(catalog: Arc<Catalog>, policy: P) -> Self {
        Self {
            catalog,
            policy,
            strict: false,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    /// Promote unknown elements from silent warnings to hard errors.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Cap the number of choice points one saturation search may expand.
    pub fn step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub(crate) fn policy(&self) -> &P {
        &self.policy
    }

    pub(crate) fn is_strict(&self) -> bool {
        self.strict
    }

    pub(crate) fn max_steps(&self) -> usize {
        self.step_limit
    }

    /// Whether `idx` is valence-saturated.
    ///
    /// Pseudo-atoms and radical-marked atoms are always saturated; unknown
    /// elements are saturated in permissive mode. A known element whose
    /// admissible templates all fail the exact-equality test is unsaturated;
    /// an element with no admissible template at all is an error.
    pub fn is_atom_saturated(
        &self,
        mol: &Mol<Atom, Bond>,
        idx: NodeIndex,
    ) -> Result<bool, CheckError> {
        let atom = mol.atom(idx);
        if atom.is_pseudo() || atom.is_radical() {
            return Ok(true);
        }
        let templates = self.catalog.lookup(atom.symbol());
        if templates.is_empty() {
            if self.strict {
                return Err(CheckError::UnknownElement {
                    atom: idx,
                    symbol: atom.symbol().to_string(),
                });
            }
            debug!(
                "no atom types for {}; treating atom {} as saturated",
                atom.symbol(),
                idx.index()
            );
            return Ok(true);
        }
        let env = AtomEnv::of(mol, idx);
        let mut any_admissible = false;
        for template in templates {
            if !self.policy.admissible(&env, template) {
                continue;
            }
            any_admissible = true;
            if env.bond_order_sum + env.hydrogen_count == template.bond_order_sum
                && env
                    .max_bond_order
                    .map_or(true, |m| m <= template.max_bond_order)
            {
                return Ok(true);
            }
        }
        if any_admissible {
            Ok(false)
        } else {
            Err(CheckError::NoMatchingAtomType {
                atom: idx,
                symbol: atom.symbol().to_string(),
                formal_charge: atom.formal_charge,
            })
        }
    }

    /// A bond is saturated iff both endpoints are.
    pub fn is_bond_saturated(
        &self,
        mol: &Mol<Atom, Bond>,
        edge: EdgeIndex,
    ) -> Result<bool, CheckError> {
        let (a, b) = mol.bond_endpoints(edge).expect("valid edge");
        Ok(self.is_atom_saturated(mol, a)? && self.is_atom_saturated(mol, b)?)
    }

    /// A graph is saturated iff all its atoms are.
    pub fn is_saturated(&self, mol: &Mol<Atom, Bond>) -> Result<bool, CheckError> {
        for idx in mol.atoms() {
            if !self.is_atom_saturated(mol, idx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Number of implicit hydrogens the atom lacks, per the first template
    /// it could still match. Radical and pseudo atoms need none; an atom
    /// already at or over every admissible template's capacity needs none.
    pub fn missing_hydrogens(
        &self,
        mol: &Mol<Atom, Bond>,
        idx: NodeIndex,
    ) -> Result<u8, CheckError> {
        let atom = mol.atom(idx);
        if atom.is_pseudo() || atom.is_radical() {
            return Ok(0);
        }
        let templates = self.catalog.lookup(atom.symbol());
        if templates.is_empty() {
            if self.strict {
                return Err(CheckError::UnknownElement {
                    atom: idx,
                    symbol: atom.symbol().to_string(),
                });
            }
            debug!(
                "no atom types for {}; atom {} gets no implicit hydrogens",
                atom.symbol(),
                idx.index()
            );
            return Ok(0);
        }
        let env = AtomEnv::of(mol, idx);
        let mut any_admissible = false;
        for template in templates {
            if self.policy.could_match(&env, template) {
                return Ok(self.policy.missing_hydrogens(&env, template));
            }
            any_admissible |= self.policy.admissible(&env, template);
        }
        if any_admissible {
            Ok(0)
        } else {
            Err(CheckError::NoMatchingAtomType {
                atom: idx,
                symbol: atom.symbol().to_string(),
                formal_charge: atom.formal_charge,
            })
        }
    }

    /// Typed warning surface for the permissive unknown-element fallback:
    /// every non-pseudo atom whose element has no catalog entries.
    pub fn unknown_elements(&self, mol: &Mol<Atom, Bond>) -> Vec<NodeIndex> {
        mol.atoms()
            .filter(|&idx| {
                let atom = mol.atom(idx);
                !atom.is_pseudo() && self.catalog.lookup(atom.symbol()).is_empty()
            })
            .collect()
    }

    /// Saturate the graph by raising bond orders until every atom matches a
    /// template. No-op when already saturated. On failure the graph is
    /// restored to its entry state and an error is returned; there is no
    /// partial success.
    pub fn saturate(&self, mol: &mut Mol<Atom, Bond>) -> Result<SaturationReport, SaturateError> {
        crate::saturate::run(self, mol)
    }
}
