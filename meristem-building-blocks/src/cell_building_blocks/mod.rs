/// Physical interactions between individual nodes
mod interaction;
/// Wall and cytoplasm nodes
mod node;
/// Shape tensors and their principal axes
pub mod tensor;

pub use interaction::*;
pub use node::*;
