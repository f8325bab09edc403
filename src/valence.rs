use petgraph::graph::NodeIndex;

use crate::bond::BondOrder;
use crate::mol::Mol;
use crate::traits::{HasBondOrder, HasHydrogenCount};

/// Sum of the numeric orders of all bonds incident to `atom`.
pub fn bond_order_sum<A, B>(mol: &Mol<A, B>, atom: NodeIndex) -> u8
where
    B: HasBondOrder,
{
    mol.bonds_of(atom)
        .map(|ei| mol.bond(ei).bond_order().numeric())
        .sum()
}

/// Highest order among the bonds incident to `atom`; `None` for an
/// unbonded atom.
pub fn max_bond_order<A, B>(mol: &Mol<A, B>, atom: NodeIndex) -> Option<BondOrder>
where
    B: HasBondOrder,
{
    mol.bonds_of(atom).map(|ei| mol.bond(ei).bond_order()).max()
}

/// Number of explicit (graph-node) neighbors of `atom`.
pub fn explicit_neighbor_count<A, B>(mol: &Mol<A, B>, atom: NodeIndex) -> u8 {
    mol.neighbors(atom).count() as u8
}

/// Bond-order sum plus the implicit hydrogen count (unset counts as 0).
pub fn total_valence<A, B>(mol: &Mol<A, B>, atom: NodeIndex) -> u8
where
    A: HasHydrogenCount,
    B: HasBondOrder,
{
    bond_order_sum(mol, atom) + mol.atom(atom).hydrogen_count().unwrap_or(0)
}
