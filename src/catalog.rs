//! Atom-type template catalogs.
//!
//! A catalog maps an element symbol to an ordered list of [`AtomType`]
//! templates — tabulated valence profiles the checker matches atoms
//! against. Order matters: the first matching template wins. Catalogs are
//! loaded once per identifier, cached process-wide, and read-only
//! thereafter; a malformed source is a fatal load error, never a partial
//! catalog.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};

use serde::Deserialize;

use crate::atom::Hybridization;
use crate::bond::BondOrder;

/// Identifier of the built-in charge-only catalog used for structure
/// generation style checks.
pub const STRUCTGEN: &str = "structgen";

/// Identifier of the built-in hybridization-aware catalog, which also
/// carries the valence-electron counts the lone-pair checker needs.
pub const VALENCY: &str = "valency";

/// A tabulated valence profile for an element in a given charge (and
/// optionally hybridization) state.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AtomType {
    pub id: String,
    pub symbol: String,
    #[serde(default)]
    pub formal_charge: i8,
    /// Maximum bond-order sum (including implicit hydrogens) this type
    /// admits.
    pub bond_order_sum: u8,
    /// Highest order any single bond may take under this type.
    pub max_bond_order: BondOrder,
    /// Formal neighbour count, for hybridization-aware hydrogen derivation.
    #[serde(default)]
    pub neighbour_count: Option<u8>,
    #[serde(default)]
    pub hybridization: Option<Hybridization>,
    /// Valence-electron count, for lone-pair correction.
    #[serde(default)]
    pub valency: Option<u8>,
}

#[derive(Deserialize)]
struct CatalogFile {
    id: String,
    atom_types: Vec<AtomType>,
}

/// Symbol → ordered template list.
#[derive(Debug)]
pub struct Catalog {
    id: String,
    by_symbol: HashMap<String, Vec<AtomType>>,
}

impl Catalog {
    /// Parse a catalog from its JSON wire format.
    pub fn from_json(json: &str) -> Result<Catalog, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json).map_err(|e| CatalogError::Parse {
            id: String::new(),
            message: e.to_string(),
        })?;
        let mut by_symbol: HashMap<String, Vec<AtomType>> = HashMap::new();
        for atom_type in file.atom_types {
            by_symbol
                .entry(atom_type.symbol.clone())
                .or_default()
                .push(atom_type);
        }
        Ok(Catalog {
            id: file.id,
            by_symbol,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Templates for `symbol`, in catalog order. Empty for unknown symbols.
    pub fn lookup(&self, symbol: &str) -> &[AtomType] {
        self.by_symbol.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// No catalog with this identifier is built in or registered.
    UnknownCatalog { id: String },
    /// The catalog source could not be parsed.
    Parse { id: String, message: String },
    /// A catalog with this identifier is already registered.
    DuplicateId { id: String },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCatalog { id } => write!(f, "unknown atom type catalog '{id}'"),
            Self::Parse { id, message } => {
                if id.is_empty() {
                    write!(f, "cannot parse atom type catalog: {message}")
                } else {
                    write!(f, "cannot parse atom type catalog '{id}': {message}")
                }
            }
            Self::DuplicateId { id } => {
                write!(f, "atom type catalog '{id}' is already registered")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

fn registry() -> &'static Mutex<HashMap<String, Arc<Catalog>>> {
    static REGISTRY: OnceLock<Mutex<HashMap<String, Arc<Catalog>>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Load a catalog by identifier. Built-in catalogs ([`STRUCTGEN`],
/// [`VALENCY`]) are parsed on first use; repeated loads return the same
/// shared instance.
pub fn load(id: &str) -> Result<Arc<Catalog>, CatalogError> {
    let mut reg = registry().lock().expect("catalog registry poisoned");
    if let Some(catalog) = reg.get(id) {
        return Ok(Arc::clone(catalog));
    }
    let source = match id {
        STRUCTGEN => include_str!("../data/structgen_atomtypes.json"),
        VALENCY => include_str!("../data/valency_atomtypes.json"),
        _ => {
            return Err(CatalogError::UnknownCatalog { id: id.to_string() });
        }
    };
    let catalog = Arc::new(Catalog::from_json(source).map_err(|e| match e {
        CatalogError::Parse { message, .. } => CatalogError::Parse {
            id: id.to_string(),
            message,
        },
        other => other,
    })?);
    reg.insert(id.to_string(), Arc::clone(&catalog));
    Ok(catalog)
}

/// Register a caller-built catalog under its identifier so later
/// [`load`] calls can find it. Identifiers are unique for the life of the
/// process.
pub fn register(catalog: Catalog) -> Result<Arc<Catalog>, CatalogError> {
    let mut reg = registry().lock().expect("catalog registry poisoned");
    if reg.contains_key(catalog.id()) {
        return Err(CatalogError::DuplicateId {
            id: catalog.id().to_string(),
        });
    }
    let id = catalog.id().to_string();
    let catalog = Arc::new(catalog);
    reg.insert(id, Arc::clone(&catalog));
    Ok(catalog)
}
