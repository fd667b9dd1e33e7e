use super::Cell;
use crate::cell_building_blocks::{CytNode, WallNode, WallNodeKey};
use crate::parameters::Parameters;

use meristem_concepts::{InvariantError, TopologyError};

use nalgebra::Vector2;
use rand::Rng;
use rand_distr::{Distribution, UnitDisc};
use slotmap::SlotMap;

/// Iterates over the wall nodes of a cell in counter-clockwise ring order.
///
/// Obtained by [Cell::wall_nodes].
/// The iteration starts at the left corner and visits every node exactly once.
pub struct RingIter<'a> {
    nodes: &'a SlotMap<WallNodeKey, WallNode>,
    current: WallNodeKey,
    remaining: usize,
}

impl<'a> Iterator for RingIter<'a> {
    type Item = (WallNodeKey, &'a WallNode);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let key = self.current;
        let node = self.nodes.get(key)?;
        self.current = node.right;
        self.remaining -= 1;
        Some((key, node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl Cell {
    /// Wall nodes in ring order starting at the left corner.
    pub fn wall_nodes(&self) -> RingIter<'_> {
        self.ring_from(self.left_corner)
    }

    /// Wall nodes in ring order starting at the given node.
    pub(crate) fn ring_from(&self, start: WallNodeKey) -> RingIter<'_> {
        RingIter {
            nodes: &self.wall_nodes,
            current: start,
            remaining: self.num_wall_nodes,
        }
    }

    pub(crate) fn ring_keys(&self) -> Vec<WallNodeKey> {
        self.wall_nodes().map(|(key, _)| key).collect()
    }

    pub(crate) fn ring_positions(&self) -> Vec<Vector2<f64>> {
        self.wall_nodes().map(|(_, node)| node.pos).collect()
    }

    /// Checks that following the right links from the left corner returns to it after
    /// exactly [get_wall_count](Cell::get_wall_count) steps and that the left links mirror
    /// the right links.
    pub fn check_ring_closure(&self) -> Result<(), InvariantError> {
        if self.num_wall_nodes == 0 {
            return Err(InvariantError(format!(
                "cell {} has an empty wall ring",
                self.rank
            )));
        }
        if !self.wall_nodes.contains_key(self.left_corner) {
            return Err(InvariantError(format!(
                "left corner of cell {} is not part of its ring",
                self.rank
            )));
        }
        let mut current = self.left_corner;
        for i in 0..self.num_wall_nodes {
            let node = self.wall_nodes.get(current).ok_or_else(|| {
                InvariantError(format!(
                    "ring of cell {} links to a missing node after {i} steps",
                    self.rank
                ))
            })?;
            let right = self.wall_nodes.get(node.right).ok_or_else(|| {
                InvariantError(format!(
                    "ring of cell {} links to a missing node after {} steps",
                    self.rank,
                    i + 1
                ))
            })?;
            if right.left != current {
                return Err(InvariantError(format!(
                    "left and right links of cell {} disagree after {i} steps",
                    self.rank
                )));
            }
            current = node.right;
            if current == self.left_corner && i + 1 != self.num_wall_nodes {
                return Err(InvariantError(format!(
                    "ring of cell {} closes after {} instead of {} steps",
                    self.rank,
                    i + 1,
                    self.num_wall_nodes
                )));
            }
        }
        if current != self.left_corner {
            return Err(InvariantError(format!(
                "ring of cell {} does not close after {} steps",
                self.rank, self.num_wall_nodes
            )));
        }
        Ok(())
    }

    /// Inserts a new wall node at the midpoint between `left` and its right neighbor.
    ///
    /// The rest angle of the new node is that of a straight wall.
    /// The node belongs to the division wall if both of its neighbors do.
    pub fn add_wall_node(&mut self, left: WallNodeKey) -> Result<WallNodeKey, TopologyError> {
        let left_node = self.wall_nodes.get(left).ok_or_else(|| {
            TopologyError(format!(
                "cannot insert after node {left:?} which is not part of cell {}",
                self.rank
            ))
        })?;
        let right = left_node.right;
        let right_node = self.wall_nodes.get(right).ok_or_else(|| {
            TopologyError(format!("ring of cell {} is broken at {left:?}", self.rank))
        })?;
        let mut new_node = WallNode::new(
            0.5 * (left_node.pos + right_node.pos),
            std::f64::consts::PI,
        );
        new_node.on_division_wall = left_node.on_division_wall && right_node.on_division_wall;
        new_node.left = left;
        new_node.right = right;

        let key = self.wall_nodes.insert(new_node);
        if let Some(node) = self.wall_nodes.get_mut(left) {
            node.right = key;
        }
        if let Some(node) = self.wall_nodes.get_mut(right) {
            node.left = key;
        }
        self.num_wall_nodes += 1;
        self.update_wall_angles();
        Ok(key)
    }

    /// Removes a wall node from the ring and links its two neighbors.
    ///
    /// Refuses when the ring would drop below
    /// [min_wall_nodes](crate::GrowthParameters::min_wall_nodes).
    /// If the left corner is deleted, its right neighbor becomes the new left corner.
    /// Adhesion springs attached to the node are dropped.
    pub fn delete_wall_node(
        &mut self,
        node: WallNodeKey,
        params: &Parameters,
    ) -> Result<(), TopologyError> {
        let min_nodes = params.growth.min_wall_nodes.max(3);
        if self.num_wall_nodes <= min_nodes {
            return Err(TopologyError(format!(
                "cell {} holds {} wall nodes and cannot drop below {min_nodes}",
                self.rank, self.num_wall_nodes
            )));
        }
        let removed = self.wall_nodes.remove(node).ok_or_else(|| {
            TopologyError(format!(
                "cannot delete node {node:?} which is not part of cell {}",
                self.rank
            ))
        })?;
        if let Some(left) = self.wall_nodes.get_mut(removed.left) {
            left.right = removed.right;
        }
        if let Some(right) = self.wall_nodes.get_mut(removed.right) {
            right.left = removed.left;
        }
        if self.left_corner == node {
            self.left_corner = removed.right;
        }
        self.adhesion_springs
            .retain(|spring| spring.own_node != node);
        self.num_wall_nodes -= 1;
        self.update_wall_angles();
        Ok(())
    }

    /// Length of the edge between a node and its right neighbor.
    pub(crate) fn edge_length(&self, key: WallNodeKey) -> Option<f64> {
        let node = self.wall_nodes.get(key)?;
        let right = self.wall_nodes.get(node.right)?;
        Some((right.pos - node.pos).norm())
    }

    fn find_extremal_length(&self, pick_larger: impl Fn(f64, f64) -> bool) -> Option<(WallNodeKey, f64)> {
        self.wall_nodes()
            .filter_map(|(key, node)| {
                let right = self.wall_nodes.get(node.right)?;
                Some((key, (right.pos - node.pos).norm()))
            })
            .fold(None, |acc, (key, length)| match acc {
                Some((_, best)) if !pick_larger(length, best) => acc,
                _ => Some((key, length)),
            })
    }

    /// Shortest edge of the ring given by its left node and its length.
    pub fn find_smallest_length(&self) -> Option<(WallNodeKey, f64)> {
        self.find_extremal_length(|length, best| length < best)
    }

    /// Longest edge of the ring given by its left node and its length.
    pub fn find_largest_length(&self) -> Option<(WallNodeKey, f64)> {
        self.find_extremal_length(|length, best| length > best)
    }

    fn is_wall_check_step(step: usize, params: &Parameters) -> bool {
        let interval = params.growth.wall_check_interval;
        interval > 0 && step % interval == 0
    }

    /// Splits the longest edge if it exceeds its
    /// [insertion threshold](Cell::compute_membr_thresh).
    ///
    /// Only active every [wall_check_interval](crate::GrowthParameters::wall_check_interval)
    /// steps.
    /// Returns whether a node was inserted.
    pub fn add_wall_node_check(&mut self, step: usize, params: &Parameters) -> bool {
        if !Self::is_wall_check_step(step, params) {
            return false;
        }
        let Some((key, length)) = self.find_largest_length() else {
            return false;
        };
        if length <= self.compute_membr_thresh(key, params) {
            return false;
        }
        match self.add_wall_node(key) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(cell = %self.rank, step, "skipping wall node insertion: {e}");
                false
            }
        }
    }

    /// Deletes the right endpoint of the shortest edge if it is shorter than
    /// [min_edge_length](crate::GrowthParameters::min_edge_length).
    ///
    /// Only active every [wall_check_interval](crate::GrowthParameters::wall_check_interval)
    /// steps and never below [min_wall_nodes](crate::GrowthParameters::min_wall_nodes).
    /// Returns whether a node was deleted.
    pub fn delete_wall_node_check(&mut self, step: usize, params: &Parameters) -> bool {
        if !Self::is_wall_check_step(step, params) {
            return false;
        }
        let Some((key, length)) = self.find_smallest_length() else {
            return false;
        };
        if length >= params.growth.min_edge_length
            || self.num_wall_nodes <= params.growth.min_wall_nodes
        {
            return false;
        }
        let Some(right) = self.wall_nodes.get(key).map(|node| node.right) else {
            return false;
        };
        match self.delete_wall_node(right, params) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(cell = %self.rank, step, "skipping wall node deletion: {e}");
                false
            }
        }
    }

    /// Inserts a cytoplasm node uniformly distributed within
    /// [cyt_spawn_fraction](crate::GrowthParameters::cyt_spawn_fraction) of the radius
    /// around the center.
    pub fn add_cyt_node<R: Rng + ?Sized>(&mut self, rng: &mut R, params: &Parameters) {
        let r = params.growth.cyt_spawn_fraction * self.get_radius();
        let [ux, uy]: [f64; 2] = UnitDisc.sample(rng);
        self.cyt_nodes.push(CytNode::new(
            self.cell_center + r * Vector2::new(ux, uy),
        ));
        self.num_cyt_nodes = self.cyt_nodes.len();
    }
}

#[cfg(test)]
mod test {
    use super::super::test_utils::*;
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn ring_closes_after_all_nodes() {
        let params = Parameters::default();
        let cell = seed_cell(0, [0.0, 0.0], 1.0, &params);
        cell.check_ring_closure().unwrap();
        assert_eq!(cell.wall_nodes().count(), cell.get_wall_count());
        // Ring is oriented counter-clockwise
        let positions = cell.ring_positions();
        let p0 = positions[0];
        let p1 = positions[1];
        assert!(p0.x * p1.y - p0.y * p1.x > 0.0);
    }

    #[test]
    fn insert_then_delete_restores_ring() {
        let params = Parameters::default();
        let mut cell = seed_cell(0, [0.0, 0.0], 1.0, &params);
        let n = cell.get_wall_count();
        let corner = cell.get_left_corner();
        let new_key = cell.add_wall_node(corner).unwrap();
        assert_eq!(cell.get_wall_count(), n + 1);
        cell.check_ring_closure().unwrap();
        assert_eq!(cell.wall_node(corner).unwrap().right(), new_key);
        approx::assert_abs_diff_eq!(
            cell.wall_node(new_key).unwrap().angle(),
            std::f64::consts::PI,
            epsilon = 1e-12
        );

        cell.delete_wall_node(new_key, &params).unwrap();
        assert_eq!(cell.get_wall_count(), n);
        assert_eq!(cell.get_left_corner(), corner);
        cell.check_ring_closure().unwrap();
        // The stale key does not resolve anymore
        assert!(cell.wall_node(new_key).is_none());
        assert!(cell.delete_wall_node(new_key, &params).is_err());
    }

    #[test]
    fn deleting_left_corner_moves_it_right() {
        let params = Parameters::default();
        let mut cell = seed_cell(0, [0.0, 0.0], 1.0, &params);
        let corner = cell.get_left_corner();
        let right = cell.wall_node(corner).unwrap().right();
        cell.delete_wall_node(corner, &params).unwrap();
        assert_eq!(cell.get_left_corner(), right);
        cell.check_invariants().unwrap();
    }

    #[test]
    fn ring_never_drops_below_minimum() {
        let mut params = Parameters::default();
        params.mechanics.membrane_rest_length = 1.0;
        params.growth.min_wall_nodes = 6;
        let mut cell = seed_cell(0, [0.0, 0.0], 1.0, &params);
        assert_eq!(cell.get_wall_count(), 6);
        let corner = cell.get_left_corner();
        assert!(cell.delete_wall_node(corner, &params).is_err());
        assert_eq!(cell.get_wall_count(), 6);
        cell.check_invariants().unwrap();
    }

    #[test]
    fn extremal_edges() {
        let params = Parameters::default();
        let mut cell = seed_cell(0, [0.0, 0.0], 1.0, &params);
        let corner = cell.get_left_corner();
        cell.add_wall_node(corner).unwrap();
        let (smallest_key, smallest) = cell.find_smallest_length().unwrap();
        let (_, largest) = cell.find_largest_length().unwrap();
        assert!(smallest < largest);
        assert!(smallest_key == corner || cell.wall_node(corner).unwrap().right() == smallest_key);
    }

    #[test]
    fn stretched_edge_gets_split() {
        let params = Parameters::default();
        let mut cell = seed_cell(0, [0.0, 0.0], 1.0, &params);
        let n = cell.get_wall_count();
        // Not a check step
        let corner = cell.get_left_corner();
        let right = cell.wall_node(corner).unwrap().right();
        cell.wall_nodes[right].pos *= 1.8;
        assert!(!cell.add_wall_node_check(params.growth.wall_check_interval + 1, &params));
        assert!(cell.add_wall_node_check(0, &params));
        assert_eq!(cell.get_wall_count(), n + 1);
        cell.check_invariants().unwrap();
    }

    #[test]
    fn short_edge_gets_merged() {
        let params = Parameters::default();
        let mut cell = seed_cell(0, [0.0, 0.0], 1.0, &params);
        let n = cell.get_wall_count();
        assert!(!cell.delete_wall_node_check(0, &params));
        let corner = cell.get_left_corner();
        let right = cell.wall_node(corner).unwrap().right();
        let p = cell.wall_nodes[corner].pos;
        cell.wall_nodes[right].pos = p + Vector2::new(0.0, 0.01);
        assert!(cell.delete_wall_node_check(0, &params));
        assert_eq!(cell.get_wall_count(), n - 1);
        assert!(cell.wall_node(right).is_none());
        cell.check_invariants().unwrap();
    }

    #[test]
    fn cyt_nodes_spawn_near_center() {
        let params = Parameters::default();
        let mut cell = seed_cell(0, [1.0, -2.0], 1.0, &params);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
        let n = cell.get_cyt_count();
        for _ in 0..20 {
            cell.add_cyt_node(&mut rng, &params);
        }
        assert_eq!(cell.get_cyt_count(), n + 20);
        let r = params.growth.cyt_spawn_fraction * cell.get_radius();
        for node in cell.cyt_nodes() {
            assert!((node.pos - cell.get_cell_center()).norm() <= r + 1e-12);
        }
    }
}
