use crate::cell::CellHandle;
use crate::errors::DivisionError;

use serde::{Deserialize, Serialize};

/// Contains all events which can arise during the cell cycle and need to be communicated to
/// the tissue (see also [Cycle]).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum CycleEvent {
    /// A cell-event which calls the [Cycle::divide] method which will spawn an additional
    /// cell and modify the existing one.
    Division,
}

/// This trait represents the cycle of a cell and works in tandem with the [CycleEvent] enum.
///
/// The `update_cycle` function is designed to be called once every step and return only
/// something if a specific cycle event is supposed to be occurring.
/// The tissue is responsible to call the corresponding functions as needed.
pub trait Cycle<Cell, Params> {
    /// Continuously updates cellular properties and may spawn a [CycleEvent] which then
    /// calls the corresponding functions (see also [CycleEvent]).
    #[must_use]
    fn update_cycle(
        rng: &mut rand_chacha::ChaCha8Rng,
        step: usize,
        params: &Params,
        cell: &mut Cell,
    ) -> Option<CycleEvent>;

    /// Performs division of the cell by modifying the existing one and spawning an
    /// additional cell which will be registered under the given handle.
    /// When an error is returned, the existing cell must not have been modified.
    /// Corresponds to [CycleEvent::Division].
    fn divide(
        params: &Params,
        cell: &mut Cell,
        daughter: CellHandle,
    ) -> Result<Cell, DivisionError>;
}
