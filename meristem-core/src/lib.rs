#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! Drives a tissue of [meristem cells](meristem_building_blocks::Cell) step by step.
//!
//! ## Tissue
//! The [Tissue] is an arena which stores every cell at the index given by its rank.
//! Cells only refer to each other by [CellHandle](meristem_concepts::CellHandle).
//! Each step first calculates the forces of all cells in parallel over shared borrows and
//! applies them afterwards.
//! Cell cycles and divisions are processed sequentially in the order of the ranks such
//! that a fixed [rng_seed](Settings::rng_seed) always leads to the same result.
//!
//! ## Configuration
//! All [Parameters](meristem_building_blocks::Parameters), the morphogen input and the
//! seed cells are collected in [Settings] which can be read from [ron] or json files.
//!
//! ## Logging
//! Failed divisions and skipped topology edits are reported as [tracing] events.
//! The `spans` feature additionally instruments every step and provides [init_tracing].

mod config;
mod errors;
#[cfg(feature = "spans")]
mod logging;
mod tissue;

pub use config::*;
pub use errors::*;
#[cfg(feature = "spans")]
#[cfg_attr(docsrs, doc(cfg(feature = "spans")))]
pub use logging::*;
pub use tissue::*;

#[doc(hidden)]
pub use rayon;

#[doc(hidden)]
pub use tracing;
