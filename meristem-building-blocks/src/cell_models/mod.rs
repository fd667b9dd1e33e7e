/// Plant cell made of a closed ring of wall nodes which encloses cytoplasm nodes.
///
/// The [Cell](meristem_cell::Cell) owns all of its nodes and refers to other cells only by
/// their [CellHandle](meristem_concepts::CellHandle).
pub mod meristem_cell;
