#![warn(missing_docs)]
//! # meristem - Building Blocks
//!
//! Mechanics of a single plant cell in the shoot apical meristem.
//! A [Cell] is a polygon of wall nodes connected by linear and bending springs which
//! encloses a number of cytoplasm nodes.
//! Cells grow depending on the morphogens WUS and CK, insert and remove wall nodes while
//! growing and finally divide into two.
//!
//! ```rust
//! # use meristem_building_blocks::prelude::*;
//! # use nalgebra::Vector2;
//! let params = Parameters::default();
//! let mut cell = Cell::new(
//!     CellHandle(0),
//!     Vector2::new(0.0, 0.0),
//!     1.0,
//!     1,
//!     false,
//!     false,
//!     &params,
//! )?;
//! let tissue: Vec<Cell> = Vec::new();
//! cell.calc_new_forces(&tissue, &params)?;
//! cell.update_node_locations(&params)?;
//! assert!(cell.check_invariants().is_ok());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//! All constants are contained in [Parameters] which are passed explicitly to every
//! operation which needs them.

/// Nodes and the interactions between them
pub mod cell_building_blocks;

/// Collection of complete cell models
pub mod cell_models;

/// Global parameters of all cells
pub mod parameters;

/// Handy re-exports of every building block.
pub mod prelude;

pub use crate::cell_building_blocks::*;
pub use crate::cell_models::meristem_cell::*;
pub use crate::parameters::*;
