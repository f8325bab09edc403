use crate::*;

use petgraph::graph::NodeIndex;

fn n(i: usize) -> NodeIndex {
    NodeIndex::new(i)
}

#[test]
fn mol_add_atoms_and_bonds() {
    let mut mol = Mol::<Atom, Bond>::new();
    let c = mol.add_atom(Atom::of(Element::C));
    let o = mol.add_atom(Atom::of(Element::O));
    let bond_idx = mol.add_bond(
        c,
        o,
        Bond {
            order: BondOrder::Double,
        },
    );

    assert_eq!(mol.atom_count(), 2);
    assert_eq!(mol.bond_count(), 1);
    assert_eq!(mol.atom(c).atomic_num, 6);
    assert_eq!(mol.atom(o).atomic_num, 8);
    assert_eq!(mol.bond(bond_idx).order, BondOrder::Double);
}

#[test]
fn mol_neighbors_and_bonds_of() {
    let mut mol = Mol::<Atom, Bond>::new();
    let a = mol.add_atom(Atom::default());
    let b = mol.add_atom(Atom::default());
    let c = mol.add_atom(Atom::default());
    mol.add_bond(a, b, Bond::default());
    mol.add_bond(a, c, Bond::default());

    assert_eq!(mol.neighbors(a).count(), 2);
    assert_eq!(mol.bonds_of(a).count(), 2);
    assert!(mol.bond_between(a, b).is_some());
    assert_eq!(mol.bond_between(b, c), None);
}

#[test]
fn mol_equality_is_structural() {
    let build = || {
        let mut mol = Mol::<Atom, Bond>::new();
        let a = mol.add_atom(Atom::of(Element::C));
        let b = mol.add_atom(Atom::of(Element::O));
        mol.add_bond(a, b, Bond::default());
        mol
    };
    assert_eq!(build(), build());

    let mut different = build();
    let first_bond = different.bonds().next().unwrap();
    different.bond_mut(first_bond).order = BondOrder::Double;
    assert_ne!(build(), different);
}

// Skeleton in, finished molecule out: the workflow the toolkit layers on
// top of this engine.
#[test]
fn skeleton_to_formula_workflow() {
    // Acetic acid skeleton: CC(=O)O with the carbonyl double bond not yet
    // assigned. saturate finds it, fill_implicit is not needed here.
    let mut mol = Mol::new();
    let c_methyl = mol.add_atom(Atom {
        hydrogen_count: Some(3),
        ..Atom::of(Element::C)
    });
    let c_acid = mol.add_atom(Atom {
        hydrogen_count: Some(0),
        ..Atom::of(Element::C)
    });
    let o_carbonyl = mol.add_atom(Atom {
        hydrogen_count: Some(0),
        ..Atom::of(Element::O)
    });
    let o_hydroxyl = mol.add_atom(Atom {
        hydrogen_count: Some(1),
        ..Atom::of(Element::O)
    });
    mol.add_bond(c_methyl, c_acid, Bond::default());
    let carbonyl = mol.add_bond(c_acid, o_carbonyl, Bond::default());
    mol.add_bond(c_acid, o_hydroxyl, Bond::default());

    let checker = Checker::charge_only().unwrap();
    checker.saturate(&mut mol).unwrap();
    assert_eq!(mol.bond(carbonyl).order, BondOrder::Double);
    assert!(checker.is_saturated(&mol).unwrap());
    assert_eq!(mol_formula(&mol), "C2H4O2");

    let lone_pairs = LonePairChecker::new().unwrap();
    lone_pairs.saturate(&mut mol).unwrap();
    assert_eq!(mol.atom(o_carbonyl).lone_pairs, 2);
    assert_eq!(mol.atom(o_hydroxyl).lone_pairs, 2);
    assert_eq!(mol.atom(c_acid).lone_pairs, 0);
}

#[test]
fn fill_then_explicit_round_trip() {
    let mut mol = Mol::new();
    let c0 = mol.add_atom(Atom::of(Element::C));
    let c1 = mol.add_atom(Atom::of(Element::C));
    mol.add_bond(c0, c1, Bond::default());

    let checker = Checker::charge_only().unwrap();
    fill_implicit(&mut mol, &checker).unwrap();
    assert_eq!(mol.atom(n(0)).hydrogen_count, Some(3));

    let explicit = add_explicit(&mol);
    assert_eq!(explicit.atom_count(), 8);
    assert!(checker.is_saturated(&explicit).unwrap());

    let collapsed = collapse_explicit(&explicit);
    assert_eq!(collapsed.atom_count(), 2);
    assert_eq!(collapsed.atom(n(0)).hydrogen_count, Some(3));
}

#[test]
fn fragments_then_saturate_each() {
    let mut mol = Mol::new();
    let a = mol.add_atom(Atom {
        hydrogen_count: Some(2),
        ..Atom::of(Element::C)
    });
    let b = mol.add_atom(Atom {
        hydrogen_count: Some(2),
        ..Atom::of(Element::C)
    });
    mol.add_bond(a, b, Bond::default());
    mol.add_atom(Atom {
        formal_charge: -1,
        ..Atom::of(Element::Cl)
    });

    assert_eq!(num_components(&mol), 2);
    let checker = Checker::charge_only().unwrap();
    for mut frag in get_fragments(&mol) {
        checker.saturate(&mut frag).unwrap();
        assert!(checker.is_saturated(&frag).unwrap());
    }
}
