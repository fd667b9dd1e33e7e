pub use meristem_building_blocks::prelude::*;
pub use meristem_concepts::*;
pub use meristem_core::*;
