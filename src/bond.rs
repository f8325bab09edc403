use serde::{Deserialize, Serialize};

/// Bond order between two atoms.
///
/// `Aromatic` never appears on a bond produced by this crate; it exists as
/// the sentinel value some atom-type tables use for "any order up to
/// aromatic" in their max-bond-order column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Numeric order: 1, 2, 3; 4 for the aromatic sentinel.
    pub fn numeric(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Aromatic => 4,
        }
    }

    /// The order one increment up, if one exists. The aromatic sentinel is
    /// not reachable by raising.
    pub fn raised(self) -> Option<BondOrder> {
        match self {
            BondOrder::Single => Some(BondOrder::Double),
            BondOrder::Double => Some(BondOrder::Triple),
            BondOrder::Triple | BondOrder::Aromatic => None,
        }
    }

    /// The order one increment down, if one exists.
    pub fn lowered(self) -> Option<BondOrder> {
        match self {
            BondOrder::Single => None,
            BondOrder::Double => Some(BondOrder::Single),
            BondOrder::Triple => Some(BondOrder::Double),
            BondOrder::Aromatic => Some(BondOrder::Triple),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    pub order: BondOrder,
}

impl Default for Bond {
    fn default() -> Self {
        Self {
            order: BondOrder::Single,
        }
    }
}

impl crate::traits::HasBondOrder for Bond {
    fn bond_order(&self) -> BondOrder {
        self.order
    }
}
