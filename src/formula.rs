//! Molecular formula and weight analysis.
//!
//! [`mol_formula`] produces a Hill system string and
//! [`average_mol_weight`] the average molecular weight in daltons. Both
//! assume implicit hydrogen counts have been determined, e.g. by
//! [`fill_implicit`](crate::hydrogen::fill_implicit).

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::element::Element;
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasFormalCharge, HasHydrogenCount};

/// Average molecular weight in daltons, over natural isotopic abundance.
/// Pseudo-atoms contribute nothing.
pub fn average_mol_weight<A: HasAtomicNum + HasHydrogenCount, B>(mol: &Mol<A, B>) -> f64 {
    let h_weight = Element::H.atomic_weight();
    mol.atoms().fold(0.0, |acc, idx| {
        let a = mol.atom(idx);
        let mass = Element::from_atomic_num(a.atomic_num()).map_or(0.0, |e| e.atomic_weight());
        acc + mass + a.hydrogen_count().unwrap_or(0) as f64 * h_weight
    })
}

/// Molecular formula as a Hill system string: C first, then H, then the
/// remaining elements alphabetically; net charge appended as `+`, `2+`,
/// `-`, `2-`, ….
pub fn mol_formula<A: HasAtomicNum + HasHydrogenCount + HasFormalCharge, B>(
    mol: &Mol<A, B>,
) -> String {
    let mut counts: BTreeMap<&'static str, u32> = BTreeMap::new();
    let mut net_charge: i32 = 0;

    for idx in mol.atoms() {
        let a = mol.atom(idx);
        if let Some(elem) = Element::from_atomic_num(a.atomic_num()) {
            *counts.entry(elem.symbol()).or_default() += 1;
        }
        let hc = a.hydrogen_count().unwrap_or(0) as u32;
        if hc > 0 {
            *counts.entry("H").or_default() += hc;
        }
        net_charge += a.formal_charge() as i32;
    }

    let mut result = String::new();

    if counts.contains_key("C") {
        append_element(&mut result, "C", counts.remove("C").unwrap());
        if let Some(h) = counts.remove("H") {
            append_element(&mut result, "H", h);
        }
    }

    for (sym, count) in &counts {
        append_element(&mut result, sym, *count);
    }

    match net_charge.cmp(&0) {
        std::cmp::Ordering::Greater => {
            if net_charge > 1 {
                write!(result, "{net_charge}+").unwrap();
            } else {
                result.push('+');
            }
        }
        std::cmp::Ordering::Less => {
            if net_charge < -1 {
                write!(result, "{}-", net_charge.unsigned_abs()).unwrap();
            } else {
                result.push('-');
            }
        }
        std::cmp::Ordering::Equal => {}
    }

    result
}

fn append_element(out: &mut String, symbol: &str, count: u32) {
    out.push_str(symbol);
    if count > 1 {
        write!(out, "{count}").unwrap();
    }
}
