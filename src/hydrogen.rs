use log::debug;
use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::checker::{CheckError, Checker, MatchPolicy};
use crate::element::Element;
use crate::mol::Mol;

/// Set every atom's implicit hydrogen count to what the checker says it is
/// missing.
///
/// Pseudo-atoms keep their count unset; radicals get 0. All counts are
/// resolved before any atom is written, so an error leaves the graph
/// unchanged. Idempotent: the derivation looks only at bonds, not at the
/// counts being replaced.
pub fn fill_implicit<P: MatchPolicy>(
    mol: &mut Mol<Atom, Bond>,
    checker: &Checker<P>,
) -> Result<(), CheckError> {
    let mut counts = Vec::with_capacity(mol.atom_count());
    for idx in mol.atoms() {
        if mol.atom(idx).is_pseudo() {
            continue;
        }
        counts.push((idx, checker.missing_hydrogens(mol, idx)?));
    }
    for (idx, count) in counts {
        debug!("atom {}: implicit hydrogens -> {count}", idx.index());
        mol.atom_mut(idx).hydrogen_count = Some(count);
    }
    Ok(())
}

/// Materialize implicit hydrogens as explicit graph atoms.
///
/// Every implicit hydrogen becomes a hydrogen atom joined to its parent by
/// a single bond; parents end up with an explicit count of 0. Unset counts
/// are treated as "no hydrogens to add" and become 0.
pub fn add_explicit(mol: &Mol<Atom, Bond>) -> Mol<Atom, Bond> {
    let mut result = Mol::new();
    let mut index_map = Vec::with_capacity(mol.atom_count());

    for idx in mol.atoms() {
        let atom = mol.atom(idx);
        let new_idx = result.add_atom(Atom {
            hydrogen_count: Some(0),
            ..atom.clone()
        });
        index_map.push(new_idx);
    }

    for edge in mol.bonds() {
        let (a, b) = mol.bond_endpoints(edge).expect("valid edge");
        result.add_bond(
            index_map[a.index()],
            index_map[b.index()],
            mol.bond(edge).clone(),
        );
    }

    for (idx, &parent) in index_map.iter().enumerate() {
        let h_count = mol
            .atom(NodeIndex::new(idx))
            .hydrogen_count
            .unwrap_or(0);
        for _ in 0..h_count {
            let h = result.add_atom(Atom {
                hydrogen_count: Some(0),
                ..Atom::of(Element::H)
            });
            result.add_bond(parent, h, Bond::default());
        }
    }

    result
}

/// Fold plain explicit hydrogens back into their parents' implicit counts.
///
/// A hydrogen atom is folded when it is uncharged, not a radical, and bonded
/// to exactly one neighbor by a single bond. Charged, radical, and bridging
/// hydrogens stay as graph atoms.
pub fn collapse_explicit(mol: &Mol<Atom, Bond>) -> Mol<Atom, Bond> {
    let node_count = mol.atom_count();
    let mut removable = vec![false; node_count];
    let mut extra_h: Vec<u8> = vec![0; node_count];

    for idx in mol.atoms() {
        let atom = mol.atom(idx);
        if atom.atomic_num != 1 || atom.formal_charge != 0 || atom.is_radical() {
            continue;
        }
        let neighbors: Vec<_> = mol.neighbors(idx).collect();
        if neighbors.len() != 1 {
            continue;
        }
        let bond = mol
            .bond_between(idx, neighbors[0])
            .expect("neighbor implies bond");
        if mol.bond(bond).order != crate::bond::BondOrder::Single {
            continue;
        }
        removable[idx.index()] = true;
        extra_h[neighbors[0].index()] += 1;
    }

    let mut result = Mol::new();
    let mut index_map: Vec<Option<NodeIndex>> = vec![None; node_count];

    for idx in mol.atoms() {
        if removable[idx.index()] {
            continue;
        }
        let atom = mol.atom(idx);
        let new_idx = result.add_atom(Atom {
            hydrogen_count: Some(atom.hydrogen_count.unwrap_or(0) + extra_h[idx.index()]),
            ..atom.clone()
        });
        index_map[idx.index()] = Some(new_idx);
    }

    for edge in mol.bonds() {
        let (a, b) = mol.bond_endpoints(edge).expect("valid edge");
        if let (Some(new_a), Some(new_b)) = (index_map[a.index()], index_map[b.index()]) {
            result.add_bond(new_a, new_b, mol.bond(edge).clone());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    #[test]
    fn fill_methane() {
        let mut mol = Mol::new();
        let c = mol.add_atom(Atom::of(Element::C));
        let checker = Checker::charge_only().unwrap();
        fill_implicit(&mut mol, &checker).unwrap();
        assert_eq!(mol.atom(c).hydrogen_count, Some(4));
    }

    #[test]
    fn fill_ethanol_skeleton() {
        let mut mol = Mol::new();
        let c0 = mol.add_atom(Atom::of(Element::C));
        let c1 = mol.add_atom(Atom::of(Element::C));
        let o = mol.add_atom(Atom::of(Element::O));
        mol.add_bond(c0, c1, Bond::default());
        mol.add_bond(c1, o, Bond::default());
        let checker = Checker::charge_only().unwrap();
        fill_implicit(&mut mol, &checker).unwrap();
        assert_eq!(mol.atom(c0).hydrogen_count, Some(3));
        assert_eq!(mol.atom(c1).hydrogen_count, Some(2));
        assert_eq!(mol.atom(o).hydrogen_count, Some(1));
        assert!(checker.is_saturated(&mol).unwrap());
    }

    #[test]
    fn fill_is_idempotent() {
        let mut mol = Mol::new();
        let c = mol.add_atom(Atom::of(Element::C));
        let checker = Checker::charge_only().unwrap();
        fill_implicit(&mut mol, &checker).unwrap();
        fill_implicit(&mut mol, &checker).unwrap();
        assert_eq!(mol.atom(c).hydrogen_count, Some(4));
    }

    #[test]
    fn fill_radical_gets_zero() {
        let mut mol = Mol::new();
        let c = mol.add_atom(Atom {
            radical_electrons: 1,
            ..Atom::of(Element::C)
        });
        let checker = Checker::charge_only().unwrap();
        fill_implicit(&mut mol, &checker).unwrap();
        assert_eq!(mol.atom(c).hydrogen_count, Some(0));
    }

    #[test]
    fn fill_pseudo_left_unset() {
        let mut mol = Mol::new();
        let star = mol.add_atom(Atom::pseudo());
        let checker = Checker::charge_only().unwrap();
        fill_implicit(&mut mol, &checker).unwrap();
        assert_eq!(mol.atom(star).hydrogen_count, None);
    }

    #[test]
    fn fill_error_leaves_graph_unchanged() {
        let mut mol = Mol::new();
        let c = mol.add_atom(Atom::of(Element::C));
        mol.add_atom(Atom {
            formal_charge: 3,
            ..Atom::of(Element::C)
        });
        let checker = Checker::charge_only().unwrap();
        assert!(fill_implicit(&mut mol, &checker).is_err());
        assert_eq!(mol.atom(c).hydrogen_count, None);
    }

    #[test]
    fn add_explicit_methane() {
        let mut mol = Mol::new();
        mol.add_atom(Atom {
            hydrogen_count: Some(4),
            ..Atom::of(Element::C)
        });
        let explicit = add_explicit(&mol);
        assert_eq!(explicit.atom_count(), 5);
        assert_eq!(explicit.bond_count(), 4);
        assert_eq!(explicit.atom(n(0)).hydrogen_count, Some(0));
        for i in 1..5 {
            assert_eq!(explicit.atom(n(i)).atomic_num, 1);
        }
    }

    #[test]
    fn add_explicit_unset_counts_add_nothing() {
        let mut mol = Mol::new();
        mol.add_atom(Atom::of(Element::Fe));
        let explicit = add_explicit(&mol);
        assert_eq!(explicit.atom_count(), 1);
        assert_eq!(explicit.bond_count(), 0);
    }

    #[test]
    fn collapse_round_trip() {
        let mut mol = Mol::new();
        let a = mol.add_atom(Atom {
            hydrogen_count: Some(3),
            ..Atom::of(Element::C)
        });
        let b = mol.add_atom(Atom {
            hydrogen_count: Some(3),
            ..Atom::of(Element::C)
        });
        mol.add_bond(a, b, Bond::default());

        let explicit = add_explicit(&mol);
        assert_eq!(explicit.atom_count(), 8);
        let collapsed = collapse_explicit(&explicit);
        assert_eq!(collapsed.atom_count(), 2);
        assert_eq!(collapsed.bond_count(), 1);
        assert_eq!(collapsed.atom(n(0)).hydrogen_count, Some(3));
        assert_eq!(collapsed.atom(n(1)).hydrogen_count, Some(3));
    }

    #[test]
    fn collapse_keeps_charged_hydrogen() {
        let mut mol = Mol::new();
        mol.add_atom(Atom {
            formal_charge: 1,
            ..Atom::of(Element::H)
        });
        let collapsed = collapse_explicit(&mol);
        assert_eq!(collapsed.atom_count(), 1);
        assert_eq!(collapsed.atom(n(0)).formal_charge, 1);
    }

    #[test]
    fn collapse_keeps_radical_hydrogen() {
        let mut mol = Mol::new();
        let c = mol.add_atom(Atom::of(Element::C));
        let h = mol.add_atom(Atom {
            radical_electrons: 1,
            ..Atom::of(Element::H)
        });
        mol.add_bond(c, h, Bond::default());
        let collapsed = collapse_explicit(&mol);
        assert_eq!(collapsed.atom_count(), 2);
    }

    #[test]
    fn collapse_no_explicit_hydrogens() {
        let mut mol = Mol::new();
        mol.add_atom(Atom {
            hydrogen_count: Some(4),
            ..Atom::of(Element::C)
        });
        let collapsed = collapse_explicit(&mol);
        assert_eq!(collapsed.atom_count(), 1);
        assert_eq!(collapsed.atom(n(0)).hydrogen_count, Some(4));
    }

    #[test]
    fn empty_graphs() {
        let mol = Mol::<Atom, Bond>::new();
        assert_eq!(add_explicit(&mol).atom_count(), 0);
        assert_eq!(collapse_explicit(&mol).atom_count(), 0);
    }
}
