use serde::{Deserialize, Serialize};

use crate::element::Element;

/// Electronic geometry class of an atom, as constrained by hybridization-aware
/// atom-type tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hybridization {
    /// sp (linear); "sp1" in some tables.
    #[serde(rename = "sp1", alias = "sp")]
    SP,
    #[serde(rename = "sp2")]
    SP2,
    #[serde(rename = "sp3")]
    SP3,
}

/// Default atom type for a molecular graph node.
///
/// Fields the saturation engine reads and writes. `hydrogen_count` is
/// `None` until the caller or
/// [`fill_implicit`](crate::hydrogen::fill_implicit) has determined it;
/// an unset count is treated as 0 in valence arithmetic but is not the same
/// as an explicit 0.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, …). `0` marks a pseudo-atom: a
    /// placeholder exempt from all valence reasoning.
    pub atomic_num: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Implicit (suppressed) hydrogen count; `None` = not yet determined.
    pub hydrogen_count: Option<u8>,
    /// Hybridization tag, if known. Consulted only by the
    /// hybridization-aware checker.
    pub hybridization: Option<Hybridization>,
    /// Unpaired-electron count. Any nonzero value marks an open shell, for
    /// which hydrogen saturation is undefined.
    pub radical_electrons: u8,
    /// Lone-pair marker count, maintained by the lone-pair checker.
    pub lone_pairs: u8,
}

impl Atom {
    /// Atom of the given element in its default state.
    pub fn of(element: Element) -> Atom {
        Atom {
            atomic_num: element.atomic_num(),
            ..Atom::default()
        }
    }

    /// Placeholder atom exempt from valence reasoning.
    pub fn pseudo() -> Atom {
        Atom::default()
    }

    pub fn is_pseudo(&self) -> bool {
        self.atomic_num == 0
    }

    pub fn is_radical(&self) -> bool {
        self.radical_electrons > 0
    }

    /// Element symbol; `"*"` for pseudo-atoms.
    pub fn symbol(&self) -> &'static str {
        Element::from_atomic_num(self.atomic_num)
            .map(Element::symbol)
            .unwrap_or("*")
    }
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> Option<u8> {
        self.hydrogen_count
    }
}
