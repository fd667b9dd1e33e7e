use super::Cell;
use crate::cell_building_blocks::tensor::{principal_direction, second_moment, PrincipalAxis};
use crate::cell_building_blocks::{CytNode, WallNode, WallNodeKey};
use crate::parameters::Parameters;

use meristem_concepts::{Ancestry, CellHandle, DivisionError};

use itertools::Itertools;
use nalgebra::Vector2;

/// Maximum number of times a stray cytoplasm node is pulled halfway towards the center
/// before it is placed directly onto it.
const MAX_CYT_PULLS: usize = 16;

/// Upper bound on the number of halving rounds in [Cell::refine_division_wall].
const MAX_REFINEMENT_ROUNDS: usize = 32;

impl Cell {
    /// Fixes the orientation of the division plane instead of deriving it from the shape.
    ///
    /// A vanishing vector removes a previously set plane.
    pub fn set_div_plane(&mut self, x: f64, y: f64) {
        self.div_plane = Vector2::new(x, y).try_normalize(0.0);
    }

    /// Externally set orientation of the division plane
    pub fn get_div_plane(&self) -> Option<Vector2<f64>> {
        self.div_plane
    }

    /// Point on the line through the center of the cell with the given direction.
    pub fn compute_point_on_line(&self, direction: &Vector2<f64>, t: f64) -> Vector2<f64> {
        self.cell_center + t * direction
    }

    /// Whether a point lies inside the polygon spanned by the wall ring.
    pub fn contains_point(&self, point: &Vector2<f64>) -> bool {
        let mut inside = false;
        for (p, q) in self
            .ring_positions()
            .iter()
            .circular_tuple_windows::<(_, _)>()
        {
            if (p.y > point.y) != (q.y > point.y) {
                let x_cross = p.x + (point.y - p.y) / (q.y - p.y) * (q.x - p.x);
                if point.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }

    fn division_orientation(&self, params: &Parameters) -> Result<Vector2<f64>, DivisionError> {
        let orientation = match self.div_plane {
            Some(plane) => plane,
            None => principal_direction(
                &second_moment(self.ring_positions().iter()),
                PrincipalAxis::Smallest,
                params.division.isotropy_tolerance,
            ),
        };
        orientation.try_normalize(f64::EPSILON).ok_or_else(|| {
            DivisionError(format!(
                "division plane {orientation:?} of cell {} is degenerate",
                self.rank
            ))
        })
    }

    /// Finds the two wall nodes at which the line through the center with the given
    /// orientation crosses the ring.
    ///
    /// For each side of the center, the search starts at the node whose direction from the
    /// center is best aligned with the orientation.
    /// At most `search_amount` nodes in both directions along the ring (but never more than
    /// half of the ring) are checked for the node on this side which is closest to the line.
    /// The first returned node lies in direction of the orientation, the second opposite
    /// to it.
    pub fn find_nodes_for_div_plane(
        &self,
        orientation: &Vector2<f64>,
        search_amount: usize,
    ) -> Result<(WallNodeKey, WallNodeKey), DivisionError> {
        let d = orientation.try_normalize(f64::EPSILON).ok_or_else(|| {
            DivisionError(format!("cannot divide cell {} along a zero vector", self.rank))
        })?;
        let normal = Vector2::new(-d.y, d.x);
        let center = self.cell_center;
        let ring: Vec<_> = self.wall_nodes().map(|(key, node)| (key, node.pos)).collect();
        let n = ring.len();
        if n < 3 {
            return Err(DivisionError(format!(
                "cell {} has only {n} wall nodes",
                self.rank
            )));
        }
        let reach = search_amount.min(n / 2) as isize;

        let find_side = |sign: f64| -> Option<WallNodeKey> {
            let start = ring
                .iter()
                .enumerate()
                .filter_map(|(i, (_, p))| {
                    let r = p - center;
                    let norm = r.norm();
                    (norm > 0.0).then(|| (i, sign * r.dot(&d) / norm))
                })
                .max_by(|a, b| a.1.total_cmp(&b.1))?
                .0;
            (-reach..=reach)
                .map(|offset| (start as isize + offset).rem_euclid(n as isize) as usize)
                .filter(|&i| sign * (ring[i].1 - center).dot(&d) > 0.0)
                .map(|i| (i, (ring[i].1 - center).dot(&normal).abs()))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(i, _)| ring[i].0)
        };

        let (Some(first), Some(second)) = (find_side(1.0), find_side(-1.0)) else {
            return Err(DivisionError(format!(
                "division plane {d:?} does not cross the wall of cell {} twice",
                self.rank
            )));
        };
        if first == second {
            return Err(DivisionError(format!(
                "division plane {d:?} crosses the wall of cell {} only at a single node",
                self.rank
            )));
        }
        Ok((first, second))
    }

    /// Copies of the two given nodes projected onto the line through the center with the
    /// given orientation.
    ///
    /// Both copies are marked as part of the division wall.
    pub fn move_start_end_points(
        &self,
        first: WallNodeKey,
        second: WallNodeKey,
        orientation: &Vector2<f64>,
    ) -> Result<(WallNode, WallNode), DivisionError> {
        let d = orientation.try_normalize(f64::EPSILON).ok_or_else(|| {
            DivisionError(format!("cannot divide cell {} along a zero vector", self.rank))
        })?;
        let project = |key: WallNodeKey| -> Result<WallNode, DivisionError> {
            let node = self.wall_nodes.get(key).ok_or_else(|| {
                DivisionError(format!(
                    "node {key:?} is not part of the ring of cell {}",
                    self.rank
                ))
            })?;
            let mut copy = node.clone();
            copy.pos = self.compute_point_on_line(&d, (node.pos - self.cell_center).dot(&d));
            copy.force = Vector2::zeros();
            copy.on_division_wall = true;
            Ok(copy)
        };
        Ok((project(first)?, project(second)?))
    }

    /// Pulls every cytoplasm node which lies outside of the wall ring towards the given
    /// center until it is inside.
    pub fn move_cyt_nodes(&mut self, center: &Vector2<f64>) {
        let mut positions: Vec<_> = self.cyt_nodes.iter().map(|node| node.pos).collect();
        for pos in positions.iter_mut() {
            let mut pulls = 0;
            while !self.contains_point(pos) {
                if pulls == MAX_CYT_PULLS {
                    *pos = *center;
                    break;
                }
                *pos = center + 0.5 * (*pos - center);
                pulls += 1;
            }
        }
        for (node, pos) in self.cyt_nodes.iter_mut().zip(positions) {
            node.pos = pos;
        }
    }

    /// Wall nodes of the arc from `from` to `to` following the right links.
    /// The two end nodes are replaced by the given ones.
    ///
    /// Only the new end nodes belong to the division wall of the resulting cell.
    fn arc_with_ends(
        &self,
        from: WallNodeKey,
        to: WallNodeKey,
        start: WallNode,
        end: WallNode,
    ) -> Vec<WallNode> {
        let mut nodes = vec![start];
        nodes.extend(
            self.ring_from(from)
                .skip(1)
                .take_while(|(key, _)| *key != to)
                .map(|(_, node)| {
                    let mut node = node.clone();
                    node.force = Vector2::zeros();
                    node.on_division_wall = false;
                    node
                }),
        );
        nodes.push(end);
        nodes
    }

    /// Finishes one of the two cells which result from division.
    fn settle_after_division(
        &mut self,
        wall: Vec<WallNode>,
        cyt: Vec<CytNode>,
        params: &Parameters,
    ) {
        self.set_ring(wall);
        self.update_cell_center();
        self.cyt_nodes = cyt;
        if self.cyt_nodes.is_empty() {
            self.cyt_nodes.push(CytNode::new(self.cell_center));
        }
        self.num_cyt_nodes = self.cyt_nodes.len();
        let center = self.cell_center;
        self.move_cyt_nodes(&center);

        self.reset_cell_progress();
        self.reset_life_length();
        self.update_wall_equi_angles_div();
        self.update_wall_angles();
        self.set_growth_rate(true, params);
        self.clear_adhesion_vectors();
        self.div_plane = None;
        self.compute_stress_tensor(params);
    }

    /// Splits every wall edge which is longer than its
    /// [insertion threshold](Cell::compute_membr_thresh) until none is left.
    ///
    /// Right after [division](Cell::division) each cell is closed by a single edge across
    /// the former parent which is far longer than the rest length of the wall springs.
    /// Nodes inserted between two division wall nodes belong to the division wall as well.
    /// Rest angles are reset afterwards.
    ///
    /// Returns the number of inserted nodes.
    pub fn refine_division_wall(&mut self, params: &Parameters) -> Result<usize, DivisionError> {
        let mut inserted = 0;
        for _ in 0..MAX_REFINEMENT_ROUNDS {
            let long_edges: Vec<_> = self
                .ring_keys()
                .into_iter()
                .filter(|&key| {
                    self.edge_length(key)
                        .is_some_and(|length| length > self.compute_membr_thresh(key, params))
                })
                .collect();
            if long_edges.is_empty() {
                break;
            }
            for key in long_edges {
                self.add_wall_node(key)?;
                inserted += 1;
            }
        }
        if inserted > 0 {
            self.update_wall_equi_angles_div();
            self.update_wall_angles();
            self.compute_stress_tensor(params);
            tracing::debug!(cell = %self.rank, inserted, "refined division wall");
        }
        Ok(inserted)
    }

    /// Divides the cell into two along the division plane.
    ///
    /// The plane is the one set by [set_div_plane](Cell::set_div_plane) or otherwise the
    /// [direction of the smallest plane](Cell::compute_direction_of_smallest_plane) through
    /// the center of the cell.
    /// The cell itself is not modified.
    /// Instead the updated parent and the new daughter cell are returned.
    ///
    /// The parent keeps the wall nodes from the first to the second crossing node following
    /// the ring and the daughter obtains the remaining arc.
    /// Both crossing nodes are projected onto the plane and are present in both cells such
    /// that the ring sizes sum to the original size plus two.
    /// Both cells are closed by a single long edge which
    /// [refine_division_wall](Cell::refine_division_wall) subdivides before they take part in
    /// further mechanics steps, as done by [Cycle::divide](meristem_concepts::Cycle::divide).
    /// Cytoplasm nodes are distributed by the side of the plane they are on.
    ///
    /// # Errors
    /// - the cell has not yet reached the required progress
    /// - the plane is degenerate or does not cross the wall twice
    /// - one of the two arcs would contain fewer than
    ///   [min_wall_nodes](crate::GrowthParameters::min_wall_nodes)
    pub fn division(
        &self,
        params: &Parameters,
        daughter_rank: CellHandle,
    ) -> Result<(Cell, Cell), DivisionError> {
        if self.cell_progress < params.division.max_progress {
            return Err(DivisionError(format!(
                "cell {} is not ready to divide with progress {} below {}",
                self.rank, self.cell_progress, params.division.max_progress
            )));
        }
        let d = self.division_orientation(params)?;
        let (first, second) = self.find_nodes_for_div_plane(&d, params.division.search_amount)?;

        let parent_size = self
            .ring_from(first)
            .position(|(key, _)| key == second)
            .map(|steps| steps + 1)
            .ok_or_else(|| {
                DivisionError(format!(
                    "crossing nodes of cell {} are not on the same ring",
                    self.rank
                ))
            })?;
        let daughter_size = self.num_wall_nodes + 2 - parent_size;
        let min_nodes = params.growth.min_wall_nodes.max(3);
        if parent_size < min_nodes || daughter_size < min_nodes {
            return Err(DivisionError(format!(
                "dividing cell {} would produce rings of {parent_size} and {daughter_size} \
                wall nodes but at least {min_nodes} are required",
                self.rank
            )));
        }

        let (start, end) = self.move_start_end_points(first, second, &d)?;
        let parent_wall = self.arc_with_ends(first, second, start.clone(), end.clone());
        let daughter_wall = self.arc_with_ends(second, first, end, start);

        let normal = Vector2::new(-d.y, d.x);
        let (parent_cyt, daughter_cyt): (Vec<_>, Vec<_>) = self
            .cyt_nodes
            .iter()
            .cloned()
            .partition(|node| (node.pos - self.cell_center).dot(&normal) >= 0.0);

        let mut daughter = Cell::empty(
            daughter_rank,
            Ancestry::Division(self.rank),
            self.layer,
            self.boundary,
            self.stem,
            params,
        );
        daughter.damping = self.damping;
        daughter.wuschel = self.wuschel;
        daughter.cytokinin = self.cytokinin;
        daughter.growth_rate = self.growth_rate;
        daughter.growth_direction = self.growth_direction;
        daughter.settle_after_division(daughter_wall, daughter_cyt, params);

        let mut parent = self.clone();
        parent.settle_after_division(parent_wall, parent_cyt, params);

        tracing::debug!(
            parent = %parent.rank,
            daughter = %daughter.rank,
            parent_wall_nodes = parent.num_wall_nodes,
            daughter_wall_nodes = daughter.num_wall_nodes,
            "divided cell"
        );
        Ok((parent, daughter))
    }
}
