pub use crate::cell_building_blocks::tensor::*;
pub use crate::cell_building_blocks::*;

pub use crate::cell_models::meristem_cell::*;

pub use crate::parameters::*;

pub use meristem_concepts::*;
