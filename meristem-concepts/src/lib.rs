#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
//! This crate encapsulates concepts which govern the mechanical model of a single plant cell
//! inside a tissue.
//! Cells are described as rings of wall nodes filled with cytoplasm nodes.
//! The concepts defined here are implemented by the
//! [meristem-building-blocks](https://docs.rs/meristem-building-blocks) crate and driven by
//! the tissue of [meristem-core](https://docs.rs/meristem-core).

mod cell;
mod cycle;
mod errors;
mod interaction;
mod mechanics;

pub use cell::*;
pub use cycle::*;
pub use errors::*;
pub use interaction::*;
pub use mechanics::*;
