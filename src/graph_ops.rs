use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::mol::Mol;

/// Connected components of the graph, each as a sorted list of atom indices.
pub fn connected_components<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let n = mol.atom_count();
    let mut visited = vec![false; n];
    let mut components = Vec::new();
    for node in mol.atoms() {
        if visited[node.index()] {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if visited[current.index()] {
                continue;
            }
            visited[current.index()] = true;
            component.push(current);
            for neighbor in mol.neighbors(current) {
                if !visited[neighbor.index()] {
                    stack.push(neighbor);
                }
            }
        }
        component.sort();
        components.push(component);
    }
    components
}

pub fn num_components<A, B>(mol: &Mol<A, B>) -> usize {
    connected_components(mol).len()
}

/// Bonds of the graph grouped by connected component, in the same component
/// order as [`connected_components`]. Within a component, bonds keep their
/// edge-index order.
pub fn component_bonds<A, B>(mol: &Mol<A, B>) -> Vec<Vec<EdgeIndex>> {
    let components = connected_components(mol);
    let mut component_of = vec![usize::MAX; mol.atom_count()];
    for (cid, comp) in components.iter().enumerate() {
        for &node in comp {
            component_of[node.index()] = cid;
        }
    }
    let mut grouped = vec![Vec::new(); components.len()];
    for edge in mol.bonds() {
        if let Some((a, _)) = mol.bond_endpoints(edge) {
            grouped[component_of[a.index()]].push(edge);
        }
    }
    grouped
}

/// Split a disconnected graph into one `Mol` per connected component.
pub fn get_fragments<A: Clone, B: Clone>(mol: &Mol<A, B>) -> Vec<Mol<A, B>> {
    let components = connected_components(mol);
    let mut fragments = Vec::with_capacity(components.len());
    for component in &components {
        let mut frag = Mol::new();
        let mut index_map = vec![NodeIndex::new(0); mol.atom_count()];
        for &old_idx in component {
            let new_idx = frag.add_atom(mol.atom(old_idx).clone());
            index_map[old_idx.index()] = new_idx;
        }
        for &old_idx in component {
            for edge in mol.bonds_of(old_idx) {
                if let Some((a, b)) = mol.bond_endpoints(edge) {
                    if a == old_idx && a.index() < b.index() {
                        frag.add_bond(
                            index_map[a.index()],
                            index_map[b.index()],
                            mol.bond(edge).clone(),
                        );
                    }
                }
            }
        }
        fragments.push(frag);
    }
    fragments
}
