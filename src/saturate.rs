//! Bond-order saturation search.
//!
//! Given a graph whose bonds may sit below their final orders, the search
//! raises orders one increment at a time until every atom matches a catalog
//! template, backtracking when a raise leads nowhere. Greedy raising can
//! deadlock in rings, where a double bond sometimes has to land on a later
//! bond to free valence on an earlier atom, so each bond gets two tries:
//! raise it now ("direct"), or leave it for the remainder of the list and
//! check afterwards that it got saturated incidentally ("deferred").
//!
//! The recursion of the classic formulation is flattened into an explicit
//! choice-point stack, and every expansion counts against the checker's
//! step budget; the worst case is exponential and must fail closed. The
//! search mutates bond orders as it goes but works against a snapshot:
//! callers never observe a half-mutated graph after a failure.

use std::collections::HashMap;

use log::debug;
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::checker::{AtomEnv, Checker, MatchPolicy, SaturateError, SaturationReport};
use crate::graph_ops::component_bonds;
use crate::mol::Mol;

pub(crate) fn run<P: MatchPolicy>(
    checker: &Checker<P>,
    mol: &mut Mol<Atom, Bond>,
) -> Result<SaturationReport, SaturateError> {
    let unknown_elements = checker.unknown_elements(mol);
    if checker.is_saturated(mol)? {
        return Ok(SaturationReport {
            raised_bonds: 0,
            unknown_elements,
        });
    }

    let snapshot: Vec<(EdgeIndex, BondOrder)> =
        mol.bonds().map(|e| (e, mol.bond(e).order)).collect();

    match run_components(checker, mol, &snapshot) {
        Ok(steps) => {
            let raised_bonds = snapshot
                .iter()
                .filter(|&&(e, start)| mol.bond(e).order != start)
                .count();
            debug!("saturated: {raised_bonds} bonds raised in {steps} steps");
            Ok(SaturationReport {
                raised_bonds,
                unknown_elements,
            })
        }
        Err(e) => {
            restore(mol, &snapshot);
            Err(match e {
                SaturateError::Unsaturatable { .. } => SaturateError::Unsaturatable {
                    atoms: unsaturated_atoms(checker, mol),
                },
                other => other,
            })
        }
    }
}

fn run_components<P: MatchPolicy>(
    checker: &Checker<P>,
    mol: &mut Mol<Atom, Bond>,
    snapshot: &[(EdgeIndex, BondOrder)],
) -> Result<usize, SaturateError> {
    let mut search = Search {
        checker,
        floor: snapshot.iter().copied().collect(),
        steps: 0,
        limit: checker.max_steps(),
    };
    for bonds in component_bonds(mol) {
        if bonds.is_empty() {
            continue;
        }
        if !search.solve(mol, &bonds)? {
            return Err(SaturateError::Unsaturatable { atoms: Vec::new() });
        }
    }
    // Bondless atoms are not reachable through any bond list; they decide
    // success here.
    if !checker.is_saturated(mol)? {
        return Err(SaturateError::Unsaturatable { atoms: Vec::new() });
    }
    Ok(search.steps)
}

fn restore(mol: &mut Mol<Atom, Bond>, snapshot: &[(EdgeIndex, BondOrder)]) {
    for &(edge, order) in snapshot {
        mol.bond_mut(edge).order = order;
    }
}

fn unsaturated_atoms<P: MatchPolicy>(
    checker: &Checker<P>,
    mol: &Mol<Atom, Bond>,
) -> Vec<NodeIndex> {
    mol.atoms()
        .filter(|&idx| !matches!(checker.is_atom_saturated(mol, idx), Ok(true)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    /// Both endpoints saturated.
    Saturated,
    /// Both endpoints unsaturated; the bond may be raised.
    Raisable,
    /// One endpoint saturated, one not; passed through unresolved.
    Mixed,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Enter,
    AfterDirect,
    AfterDeferred,
    AfterMixed,
}

#[derive(Debug)]
struct Frame {
    idx: usize,
    phase: Phase,
    raised: Option<EdgeIndex>,
}

impl Frame {
    fn enter(idx: usize) -> Frame {
        Frame {
            idx,
            phase: Phase::Enter,
            raised: None,
        }
    }
}

struct Search<'a, P> {
    checker: &'a Checker<P>,
    /// Bond order at search start; undo never goes below this.
    floor: HashMap<EdgeIndex, BondOrder>,
    steps: usize,
    limit: usize,
}

impl<P: MatchPolicy> Search<'_, P> {
    /// Solve one component's bond list. `Ok(true)` means every bond in the
    /// list ended saturated.
    fn solve(
        &mut self,
        mol: &mut Mol<Atom, Bond>,
        bonds: &[EdgeIndex],
    ) -> Result<bool, SaturateError> {
        let mut stack = vec![Frame::enter(0)];
        let mut ok = false;

        while let Some(mut frame) = stack.pop() {
            match frame.phase {
                Phase::Enter => {
                    self.steps += 1;
                    if self.steps > self.limit {
                        return Err(SaturateError::StepLimitExceeded { limit: self.limit });
                    }
                    if frame.idx == bonds.len() {
                        ok = true;
                        continue;
                    }
                    let edge = bonds[frame.idx];
                    match self.bond_status(mol, edge)? {
                        Status::Saturated => {
                            // Nothing to decide; the remainder's result is
                            // this level's result.
                            stack.push(Frame::enter(frame.idx + 1));
                        }
                        Status::Raisable => {
                            if self.raise_by_increment(mol, edge) {
                                // Direct: raise one increment, then require
                                // the full list again; a double or triple
                                // bond needs repeated increments.
                                frame.raised = Some(edge);
                                frame.phase = Phase::AfterDirect;
                                stack.push(frame);
                                stack.push(Frame::enter(0));
                            } else {
                                let next = frame.idx + 1;
                                frame.phase = Phase::AfterDeferred;
                                stack.push(frame);
                                stack.push(Frame::enter(next));
                            }
                        }
                        Status::Mixed => {
                            let next = frame.idx + 1;
                            frame.phase = Phase::AfterMixed;
                            stack.push(frame);
                            stack.push(Frame::enter(next));
                        }
                    }
                }
                Phase::AfterDirect => {
                    if !ok {
                        // Deferred: undo the increment, resolve the
                        // remainder first, re-check this bond afterwards.
                        let edge = frame.raised.take().expect("direct branch raised a bond");
                        self.lower_by_decrement(mol, edge);
                        let next = frame.idx + 1;
                        frame.phase = Phase::AfterDeferred;
                        stack.push(frame);
                        stack.push(Frame::enter(next));
                    }
                }
                Phase::AfterDeferred | Phase::AfterMixed => {
                    if ok {
                        ok = self.checker.is_bond_saturated(mol, bonds[frame.idx])?;
                    }
                }
            }
        }
        Ok(ok)
    }

    fn bond_status(
        &self,
        mol: &Mol<Atom, Bond>,
        edge: EdgeIndex,
    ) -> Result<Status, SaturateError> {
        let (a, b) = mol.bond_endpoints(edge).expect("valid edge");
        let sat_a = self.checker.is_atom_saturated(mol, a)?;
        let sat_b = self.checker.is_atom_saturated(mol, b)?;
        Ok(match (sat_a, sat_b) {
            (true, true) => Status::Saturated,
            (false, false) => Status::Raisable,
            _ => Status::Mixed,
        })
    }

    /// Raise the bond one increment if some pair of still-viable endpoint
    /// templates admits an order above the current one.
    fn raise_by_increment(&self, mol: &mut Mol<Atom, Bond>, edge: EdgeIndex) -> bool {
        let (a, b) = mol.bond_endpoints(edge).expect("valid edge");
        let order = mol.bond(edge).order;
        let Some(next) = order.raised() else {
            return false;
        };
        let policy = self.checker.policy();
        let env_a = AtomEnv::of(mol, a);
        let env_b = AtomEnv::of(mol, b);
        let types_a = self.checker.catalog().lookup(mol.atom(a).symbol());
        let types_b = self.checker.catalog().lookup(mol.atom(b).symbol());
        for ta in types_a.iter().filter(|t| policy.could_match(&env_a, t)) {
            if order >= ta.max_bond_order {
                continue;
            }
            for tb in types_b.iter().filter(|t| policy.could_match(&env_b, t)) {
                if order < tb.max_bond_order {
                    mol.bond_mut(edge).order = next;
                    debug!("raised bond {} to {:?}", edge.index(), next);
                    return true;
                }
            }
        }
        false
    }

    /// Undo one increment, never dropping below the order recorded at
    /// search start.
    fn lower_by_decrement(&self, mol: &mut Mol<Atom, Bond>, edge: EdgeIndex) {
        let order = mol.bond(edge).order;
        let floor = self.floor.get(&edge).copied().unwrap_or(BondOrder::Single);
        if order <= floor {
            return;
        }
        if let Some(prev) = order.lowered() {
            mol.bond_mut(edge).order = prev;
            debug!("lowered bond {} to {:?}", edge.index(), prev);
        }
    }
}
