//! Lone-pair checker variant.
//!
//! Shares the checker contract but corrects a different property: instead
//! of raising bond orders it adjusts each atom's lone-pair markers toward
//! `(valency - hydrogen_count - bond_order_sum - formal_charge) / 2`, the
//! pair count left over once bonding electrons are spoken for. Template
//! matching is the same first-could-match scan the hydrogen calculator
//! uses, against a catalog that carries valence-electron counts.

use std::sync::Arc;

use log::debug;
use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::catalog::{self, Catalog, CatalogError};
use crate::checker::{AtomEnv, ChargeMatch, CheckError, Checker, MatchPolicy};
use crate::mol::Mol;

pub struct LonePairChecker {
    inner: Checker<ChargeMatch>,
}

impl LonePairChecker {
    /// Lone-pair checker against the built-in `valency` catalog.
    pub fn new() -> Result<Self, CatalogError> {
        Ok(Self {
            inner: Checker::with_catalog(catalog::load(catalog::VALENCY)?, ChargeMatch),
        })
    }

    pub fn with_catalog(catalog: Arc<Catalog>) -> Self {
        Self {
            inner: Checker::with_catalog(catalog, ChargeMatch),
        }
    }

    /// Promote unknown elements from silent skips to hard errors.
    pub fn strict(mut self) -> Self {
        self.inner = self.inner.strict();
        self
    }

    /// Lone pairs the atom should carry, or `None` where lone-pair
    /// reasoning does not apply (pseudo-atoms, radicals, unknown elements).
    fn expected_lone_pairs(
        &self,
        mol: &Mol<Atom, Bond>,
        idx: NodeIndex,
    ) -> Result<Option<u8>, CheckError> {
        let atom = mol.atom(idx);
        if atom.is_pseudo() || atom.is_radical() {
            return Ok(None);
        }
        let templates = self.inner.catalog().lookup(atom.symbol());
        if templates.is_empty() {
            if self.inner.is_strict() {
                return Err(CheckError::UnknownElement {
                    atom: idx,
                    symbol: atom.symbol().to_string(),
                });
            }
            debug!(
                "no atom types for {}; skipping lone pairs on atom {}",
                atom.symbol(),
                idx.index()
            );
            return Ok(None);
        }
        let env = AtomEnv::of(mol, idx);
        let policy = ChargeMatch;
        let template = templates
            .iter()
            .find(|t| policy.could_match(&env, t))
            .or_else(|| templates.iter().find(|t| policy.admissible(&env, t)));
        let Some(template) = template else {
            return Err(CheckError::NoMatchingAtomType {
                atom: idx,
                symbol: atom.symbol().to_string(),
                formal_charge: atom.formal_charge,
            });
        };
        let valency = template.valency.unwrap_or(template.bond_order_sum) as i16;
        let pairs = (valency
            - env.hydrogen_count as i16
            - env.bond_order_sum as i16
            - env.formal_charge as i16)
            / 2;
        Ok(Some(pairs.max(0) as u8))
    }

    /// Whether the atom already carries its expected lone-pair count.
    pub fn is_atom_saturated(
        &self,
        mol: &Mol<Atom, Bond>,
        idx: NodeIndex,
    ) -> Result<bool, CheckError> {
        match self.expected_lone_pairs(mol, idx)? {
            None => Ok(true),
            Some(expected) => Ok(mol.atom(idx).lone_pairs == expected),
        }
    }

    pub fn is_saturated(&self, mol: &Mol<Atom, Bond>) -> Result<bool, CheckError> {
        for idx in mol.atoms() {
            if !self.is_atom_saturated(mol, idx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Same derivation as the charge-only checker's hydrogen calculator.
    pub fn missing_hydrogens(
        &self,
        mol: &Mol<Atom, Bond>,
        idx: NodeIndex,
    ) -> Result<u8, CheckError> {
        self.inner.missing_hydrogens(mol, idx)
    }

    /// Add or remove lone-pair markers until every atom carries its
    /// expected count. All expectations are resolved before any atom is
    /// touched, so an error leaves the graph unchanged.
    pub fn saturate(&self, mol: &mut Mol<Atom, Bond>) -> Result<(), CheckError> {
        let mut corrections = Vec::new();
        for idx in mol.atoms() {
            if let Some(expected) = self.expected_lone_pairs(mol, idx)? {
                if mol.atom(idx).lone_pairs != expected {
                    corrections.push((idx, expected));
                }
            }
        }
        for (idx, expected) in corrections {
            debug!("atom {}: lone pairs -> {expected}", idx.index());
            mol.atom_mut(idx).lone_pairs = expected;
        }
        Ok(())
    }
}
