#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! [meristem](crate) simulates the cells of a growing shoot apical meristem.
//!
//! Every cell is a ring of wall nodes connected by linear and bending springs which encloses
//! a set of cytoplasm nodes.
//! Cells grow depending on the morphogens WUS and CK, insert new wall nodes as their
//! perimeter expands and divide along a plane determined by their shape or stress tensor.
//!
//! The individual parts are split into separate crates.
//! - [concepts] contains traits and error types.
//! - [building_blocks] contains the [Cell] model and all of its [Parameters].
//! - [core](mod@core) contains the [Tissue] which drives many cells.
//!
//! ```
//! use meristem::prelude::*;
//!
//! let settings = Settings::from_ron_str("(
//!     n_steps: 20,
//!     seed_cells: [
//!         (center: (0.0, 0.0), radius: 1.0),
//!         (center: (2.1, 0.0), radius: 1.0),
//!     ],
//! )")?;
//! let mut tissue = Tissue::new(settings)?;
//! tissue.run()?;
//! assert_eq!(tissue.current_step(), 20);
//! tissue.check_invariants()?;
//! # Ok::<(), SimulationError>(())
//! ```

pub use meristem_building_blocks as building_blocks;

pub use meristem_concepts as concepts;

pub use meristem_core as core;

/// Re-exports the default simulation types and traits.
pub mod prelude;
pub use meristem_building_blocks::*;
pub use meristem_concepts::*;
pub use meristem_core::*;
