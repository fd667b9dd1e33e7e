use super::{Cell, TissueView};
use crate::cell_building_blocks::{DistanceThreshold, WallNodeKey};
use crate::parameters::Parameters;

use meristem_concepts::{CellHandle, NeighborInteraction};

use serde::{Deserialize, Serialize};

/// Adhesive link between a wall node of this cell and a wall node of a neighboring cell.
///
/// The link only stores keys.
/// If either node has been deleted in the meantime, the link no longer resolves and is
/// ignored when calculating forces.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdhesionSpring {
    /// Wall node of this cell
    pub own_node: WallNodeKey,
    /// Cell which holds the other end of the spring
    pub neighbor: CellHandle,
    /// Wall node of the neighboring cell
    pub neighbor_node: WallNodeKey,
}

impl Cell {
    /// Whether any two wall nodes of this and the other cell are closer than
    /// [neighbor_threshold](crate::AdhesionParameters::neighbor_threshold).
    ///
    /// The relation is symmetric.
    pub fn is_neighbor_of(&self, other: &Cell, params: &Parameters) -> bool {
        let threshold = DistanceThreshold(params.adhesion.neighbor_threshold);
        let reach = self.bounding_radius() + other.bounding_radius() + threshold.0;
        if (self.cell_center - other.cell_center).norm() > reach {
            return false;
        }
        self.wall_nodes.values().any(|own| {
            other.wall_nodes.values().any(|ext| {
                threshold
                    .is_neighbor(&own.pos, &ext.pos)
                    .unwrap_or(false)
            })
        })
    }

    /// Determines all cells of the tissue other than this one which are neighbors.
    pub fn find_neighbor_cells<T: TissueView + ?Sized>(
        &self,
        tissue: &T,
        params: &Parameters,
    ) -> Vec<CellHandle> {
        tissue
            .cells()
            .filter(|other| other.rank != self.rank && self.is_neighbor_of(other, params))
            .map(|other| other.rank)
            .collect()
    }

    /// Replaces the set of neighbors.
    ///
    /// Adhesion springs to cells which are no longer neighbors are dropped.
    pub fn set_neighbor_cells(&mut self, mut neighbors: Vec<CellHandle>) {
        neighbors.sort();
        neighbors.dedup();
        self.neigh_cells = neighbors;
        let neigh_cells = &self.neigh_cells;
        self.adhesion_springs
            .retain(|spring| neigh_cells.contains(&spring.neighbor));
    }

    /// Recalculates the set of neighboring cells.
    pub fn update_neighbor_cells<T: TissueView + ?Sized>(&mut self, tissue: &T, params: &Parameters) {
        let neighbors = self.find_neighbor_cells(tissue, params);
        self.set_neighbor_cells(neighbors);
    }

    /// Removes all adhesion springs.
    pub fn clear_adhesion_vectors(&mut self) {
        self.adhesion_springs.clear();
    }

    /// Links every wall node of this cell to the closest wall node of any neighbor which is
    /// within [adhesion_threshold](crate::AdhesionParameters::adhesion_threshold).
    ///
    /// Neighbors which cannot be resolved through the tissue are skipped.
    pub fn find_adhesion_springs<T: TissueView + ?Sized>(
        &self,
        tissue: &T,
        params: &Parameters,
    ) -> Vec<AdhesionSpring> {
        let threshold = params.adhesion.adhesion_threshold;
        let neighbors: Vec<_> = self
            .neigh_cells
            .iter()
            .filter_map(|handle| tissue.get_cell(*handle))
            .collect();
        self.wall_nodes()
            .filter_map(|(own_node, own)| {
                neighbors
                    .iter()
                    .flat_map(|cell| {
                        cell.wall_nodes
                            .iter()
                            .map(move |(key, node)| (cell.rank, key, (node.pos - own.pos).norm()))
                    })
                    .filter(|(_, _, dist)| *dist < threshold)
                    .min_by(|a, b| a.2.total_cmp(&b.2))
                    .map(|(neighbor, neighbor_node, _)| AdhesionSpring {
                        own_node,
                        neighbor,
                        neighbor_node,
                    })
            })
            .collect()
    }

    /// Replaces all adhesion springs.
    ///
    /// Springs which are not attached to an own wall node or which target a cell that is not
    /// a neighbor are discarded.
    pub fn set_adhesion_springs(&mut self, springs: Vec<AdhesionSpring>) {
        self.adhesion_springs = springs
            .into_iter()
            .filter(|spring| {
                self.wall_nodes.contains_key(spring.own_node)
                    && self.neigh_cells.contains(&spring.neighbor)
            })
            .collect();
    }

    /// Recalculates all adhesion springs from the current neighbors.
    pub fn update_adhesion_springs<T: TissueView + ?Sized>(
        &mut self,
        tissue: &T,
        params: &Parameters,
    ) {
        self.clear_adhesion_vectors();
        let springs = self.find_adhesion_springs(tissue, params);
        self.set_adhesion_springs(springs);
    }

    /// Currently active adhesion springs
    pub fn get_adhesion_springs(&self) -> &[AdhesionSpring] {
        &self.adhesion_springs
    }

    /// Detaches this cell from one of its neighbors.
    ///
    /// All adhesion springs to the neighbor are removed and it is no longer part of the
    /// neighbor set.
    pub fn peel(&mut self, neighbor: CellHandle) {
        self.adhesion_springs
            .retain(|spring| spring.neighbor != neighbor);
        self.neigh_cells.retain(|handle| *handle != neighbor);
    }
}

#[cfg(test)]
mod test {
    use super::super::test_utils::*;
    use super::*;
    use nalgebra::Vector2;

    fn touching_pair(params: &Parameters) -> Vec<Cell> {
        vec![
            seed_cell(0, [0.0, 0.0], 1.0, params),
            seed_cell(1, [2.1, 0.0], 1.0, params),
            seed_cell(2, [10.0, 0.0], 1.0, params),
        ]
    }

    fn update_all(cells: &mut Vec<Cell>, params: &Parameters) {
        let neighbors: Vec<_> = cells
            .iter()
            .map(|cell| cell.find_neighbor_cells(&cells[..], params))
            .collect();
        for (cell, n) in cells.iter_mut().zip(neighbors) {
            cell.set_neighbor_cells(n);
        }
        let springs: Vec<_> = cells
            .iter()
            .map(|cell| cell.find_adhesion_springs(&cells[..], params))
            .collect();
        for (cell, s) in cells.iter_mut().zip(springs) {
            cell.set_adhesion_springs(s);
        }
    }

    #[test]
    fn neighbors_are_symmetric() {
        let params = Parameters::default();
        let mut cells = touching_pair(&params);
        update_all(&mut cells, &params);
        assert_eq!(cells[0].get_neighbor_cells(), &[CellHandle(1)]);
        assert_eq!(cells[1].get_neighbor_cells(), &[CellHandle(0)]);
        assert!(cells[2].get_neighbor_cells().is_empty());
        for cell in cells.iter() {
            cell.check_invariants().unwrap();
        }
    }

    #[test]
    fn adhesion_links_closest_nodes() {
        let params = Parameters::default();
        let mut cells = touching_pair(&params);
        update_all(&mut cells, &params);
        let springs = cells[0].get_adhesion_springs();
        assert!(!springs.is_empty());
        for spring in springs {
            assert_eq!(spring.neighbor, CellHandle(1));
            let own = cells[0].wall_node_position(spring.own_node).unwrap();
            let ext = cells[1].wall_node_position(spring.neighbor_node).unwrap();
            assert!((own - ext).norm() < params.adhesion.adhesion_threshold);
        }
        // The node facing the other cell is linked to one of the two opposing nodes
        let corner = cells[0].get_left_corner();
        let spring = springs.iter().find(|s| s.own_node == corner).unwrap();
        let ext = cells[1].wall_node_position(spring.neighbor_node).unwrap();
        assert!(ext.x > 1.1 && ext.x < 1.11);
        assert!(ext.y.abs() < 0.13);
    }

    #[test]
    fn adhesion_pulls_cells_together() {
        let params = Parameters::default();
        let mut cells = touching_pair(&params);
        update_all(&mut cells, &params);
        let forces = cells[0].compute_forces(&cells, &params).unwrap();
        let total = forces.wall.values().sum::<Vector2<f64>>()
            + forces.cyt.iter().sum::<Vector2<f64>>();
        assert!(total.x > 0.0);
    }

    #[test]
    fn peel_removes_neighbor_and_springs() {
        let params = Parameters::default();
        let mut cells = touching_pair(&params);
        update_all(&mut cells, &params);
        cells[0].peel(CellHandle(1));
        assert!(cells[0].get_neighbor_cells().is_empty());
        assert!(cells[0].get_adhesion_springs().is_empty());
        cells[0].check_invariants().unwrap();
    }

    #[test]
    fn deleted_target_node_is_ignored() {
        let params = Parameters::default();
        let mut cells = touching_pair(&params);
        update_all(&mut cells, &params);
        let before = cells[0].compute_forces(&cells, &params).unwrap();
        // Remove every node of cell 1 which is the target of a spring
        let targets: Vec<_> = cells[0]
            .get_adhesion_springs()
            .iter()
            .map(|s| s.neighbor_node)
            .collect();
        for key in targets {
            let _ = cells[1].delete_wall_node(key, &params);
        }
        cells[1].check_invariants().unwrap();
        let after = cells[0].compute_forces(&cells, &params).unwrap();
        let total = |f: &super::super::NodeForces| {
            f.wall.values().sum::<Vector2<f64>>() + f.cyt.iter().sum::<Vector2<f64>>()
        };
        approx::assert_abs_diff_eq!(total(&after), Vector2::zeros(), epsilon = 1e-8);
        assert!(total(&before).x > 0.0);
    }

    #[test]
    fn deleting_own_node_drops_its_spring() {
        let params = Parameters::default();
        let mut cells = touching_pair(&params);
        update_all(&mut cells, &params);
        let corner = cells[0].get_left_corner();
        let n = cells[0].get_adhesion_springs().len();
        cells[0].delete_wall_node(corner, &params).unwrap();
        assert_eq!(cells[0].get_adhesion_springs().len(), n - 1);
        assert!(cells[0]
            .get_adhesion_springs()
            .iter()
            .all(|s| s.own_node != corner));
    }
}
