use serde::{Deserialize, Serialize};

/// Index-based handle of a cell inside the arena owned by the tissue.
///
/// The handle is identical to the rank of the cell.
/// Cells never store references to each other but only these handles which are resolved
/// through the tissue at the time they are needed.
#[derive(Clone, Copy, Debug, Default, Deserialize, Hash, PartialEq, Eq, Ord, PartialOrd, Serialize)]
pub struct CellHandle(pub usize);

impl core::fmt::Display for CellHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lineage of a cell
///
/// The ancestry is determined once when the cell is created and never changes afterwards.
#[derive(Clone, Copy, Debug, Deserialize, Hash, PartialEq, Eq, Ord, PartialOrd, Serialize)]
pub enum Ancestry {
    /// Initially placed inside the tissue
    Initial,
    /// Produced by division of the cell with the given rank
    Division(CellHandle),
}

impl Ancestry {
    /// Rank of the parent cell if this cell was created by division.
    pub fn parent(&self) -> Option<CellHandle> {
        match self {
            Ancestry::Initial => None,
            Ancestry::Division(parent) => Some(*parent),
        }
    }
}

/// Specifies how to retrieve a unique identifier of an object.
pub trait Id {
    /// The identifier type is usually chosen to be completely unique and repeatable across
    /// different simulations.
    type Identifier;

    /// Retrieves the Identifier from the object.
    fn get_id(&self) -> Self::Identifier;
    /// Returns a reference to the id of the object.
    fn ref_id(&self) -> &Self::Identifier;
}
