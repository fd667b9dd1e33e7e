use crate::errors::CalcError;

/// Trait describing force-interactions between two nodes.
pub trait Interaction<Pos, Force> {
    /// Calculates the forces between two positions.
    /// The function returns two forces, one acting on the own node and the other on the
    /// external node.
    fn calculate_force_between(
        &self,
        own_pos: &Pos,
        ext_pos: &Pos,
    ) -> Result<(Force, Force), CalcError>;
}

/// Allows cells to detect neighboring cells
pub trait NeighborInteraction<Pos> {
    /// Checks if the other object at the given position is close enough to be considered a
    /// neighbor.
    fn is_neighbor(&self, own_pos: &Pos, ext_pos: &Pos) -> Result<bool, CalcError>;
}
