use super::{Cell, TissueView};
use crate::cell_building_blocks::{LinearSpring, WallNode, WallNodeKey};
use crate::parameters::Parameters;

use meristem_concepts::{CalcError, Interaction, Mechanics};

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;

/// Forces acting on every node of a single cell.
///
/// Calculated by [Cell::compute_forces] from a shared borrow of the tissue and
/// afterwards written to the nodes by [Cell::apply_forces].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NodeForces {
    /// Total force on every wall node
    pub wall: SecondaryMap<WallNodeKey, Vector2<f64>>,
    /// Total force on every cytoplasm node in the order of [Cell::cyt_nodes]
    pub cyt: Vec<Vector2<f64>>,
}

impl NodeForces {
    fn add_wall(&mut self, key: WallNodeKey, force: Vector2<f64>) {
        if let Some(f) = self.wall.get_mut(key) {
            *f += force;
        }
    }
}

fn perp(v: &Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-v.y, v.x)
}

/// Interior angle at `p` between the edges to `left` and `right` of a counter-clockwise ring.
///
/// The result lies in $[0, 2\pi)$ such that convex corners have angles below $\pi$.
pub(crate) fn interior_angle(
    left: &Vector2<f64>,
    p: &Vector2<f64>,
    right: &Vector2<f64>,
) -> f64 {
    let a = left - p;
    let b = right - p;
    let angle = (b.x * a.y - b.y * a.x).atan2(b.dot(&a));
    if angle < 0.0 {
        angle + 2.0 * std::f64::consts::PI
    } else {
        angle
    }
}

/// Interior angle of a regular polygon with `n` corners.
pub(crate) fn regular_polygon_angle(n: usize) -> f64 {
    (n as f64 - 2.0) * std::f64::consts::PI / n as f64
}

impl Cell {
    fn neighbors_of(&self, node: &WallNode) -> Option<(&WallNode, &WallNode)> {
        Some((self.wall_nodes.get(node.left)?, self.wall_nodes.get(node.right)?))
    }

    /// Whether the edge from the given node to its right neighbor is aligned with the
    /// growth direction within [alignment_angle](crate::MechanicalParameters::alignment_angle).
    pub fn is_edge_aligned(&self, node: WallNodeKey, params: &Parameters) -> bool {
        let gd = self.growth_direction;
        let Some(edge) = self.wall_nodes.get(node).and_then(|n| {
            self.wall_nodes.get(n.right).map(|right| right.pos - n.pos)
        }) else {
            return false;
        };
        let norms = edge.norm() * gd.norm();
        if norms == 0.0 {
            return false;
        }
        edge.dot(&gd).abs() / norms >= params.mechanics.alignment_angle.cos()
    }

    /// Stiffness of the linear spring between a node and its right neighbor.
    ///
    /// Edges aligned with the growth direction are softened by
    /// [growth_softening](crate::MechanicalParameters::growth_softening).
    pub fn compute_k_lin(&self, node: WallNodeKey, params: &Parameters) -> f64 {
        if self.is_edge_aligned(node, params) {
            params.mechanics.k_lin * params.mechanics.growth_softening
        } else {
            params.mechanics.k_lin
        }
    }

    /// Length above which the edge between a node and its right neighbor is split.
    pub fn compute_membr_thresh(&self, node: WallNodeKey, params: &Parameters) -> f64 {
        if self.is_edge_aligned(node, params) {
            params.growth.membrane_threshold * params.growth.aligned_threshold_factor
        } else {
            params.growth.membrane_threshold
        }
    }

    /// Bending stiffness of a regular wall node.
    pub fn compute_k_bend(&self, _node: WallNodeKey, params: &Parameters) -> f64 {
        params.mechanics.k_bend
    }

    /// Bending stiffness of a node on a freshly formed division wall.
    pub fn compute_k_bend_div(&self, _node: WallNodeKey, params: &Parameters) -> f64 {
        params.mechanics.k_bend_div
    }

    fn bending_stiffness(&self, key: WallNodeKey, node: &WallNode, params: &Parameters) -> f64 {
        if node.on_division_wall && self.life_length < params.mechanics.div_stiffening_steps {
            self.compute_k_bend_div(key, params)
        } else {
            self.compute_k_bend(key, params)
        }
    }

    /// Recalculates the current interior angle at every wall node.
    pub fn update_wall_angles(&mut self) {
        let angles: Vec<_> = self
            .wall_nodes()
            .filter_map(|(key, node)| {
                let (left, right) = self.neighbors_of(node)?;
                Some((key, interior_angle(&left.pos, &node.pos, &right.pos)))
            })
            .collect();
        for (key, angle) in angles {
            if let Some(node) = self.wall_nodes.get_mut(key) {
                node.angle = angle;
            }
        }
    }

    /// Relaxes every rest angle towards the angle of the regular polygon with the current
    /// number of wall nodes.
    pub fn update_wall_equi_angles(&mut self, params: &Parameters) {
        let target = regular_polygon_angle(self.num_wall_nodes);
        let rate = params.mechanics.equi_angle_remodel_rate.clamp(0.0, 1.0);
        for node in self.wall_nodes.values_mut() {
            node.equi_angle += rate * (target - node.equi_angle);
        }
    }

    /// Sets every rest angle to the angle of the regular polygon with the current number of
    /// wall nodes.
    pub fn update_wall_equi_angles_div(&mut self) {
        let target = regular_polygon_angle(self.num_wall_nodes);
        for node in self.wall_nodes.values_mut() {
            node.equi_angle = target;
        }
    }

    /// Calculates the forces acting on all nodes of this cell without modifying it.
    ///
    /// The total force on each node is the sum of
    /// 1. linear springs between neighboring wall nodes
    /// 2. bending springs at each wall node with energy
    ///    $\frac{1}{2}k_b(\theta-\theta_0)^2$ acting on the node and both of its neighbors
    /// 3. repulsion between cytoplasm nodes and between cytoplasm and wall nodes
    /// 4. adhesion springs to wall nodes of neighboring cells
    ///
    /// Adhesion springs whose target can no longer be resolved through the tissue are
    /// ignored.
    pub fn compute_forces<T: TissueView + ?Sized>(
        &self,
        tissue: &T,
        params: &Parameters,
    ) -> Result<NodeForces, CalcError> {
        let mut forces = NodeForces {
            wall: self
                .wall_nodes
                .keys()
                .map(|key| (key, Vector2::zeros()))
                .collect(),
            cyt: vec![Vector2::zeros(); self.cyt_nodes.len()],
        };

        for (key, node) in self.wall_nodes() {
            let Some((left, right)) = self.neighbors_of(node) else {
                return Err(CalcError(format!(
                    "wall ring of cell {} is broken at node {key:?}",
                    self.rank
                )));
            };

            // Linear spring to the right neighbor
            let spring = LinearSpring {
                stiffness: self.compute_k_lin(key, params),
                rest_length: params.mechanics.membrane_rest_length,
            };
            let (f_own, f_ext) = spring.calculate_force_between(&node.pos, &right.pos)?;
            forces.add_wall(key, f_own);
            forces.add_wall(node.right, f_ext);

            // Bending spring at this node
            let a = left.pos - node.pos;
            let b = right.pos - node.pos;
            let a2 = a.norm_squared();
            let b2 = b.norm_squared();
            if a2 == 0.0 || b2 == 0.0 {
                continue;
            }
            let theta = interior_angle(&left.pos, &node.pos, &right.pos);
            let torque = self.bending_stiffness(key, node, params) * (theta - node.equi_angle);
            let grad_left = perp(&a) / a2;
            let grad_right = -perp(&b) / b2;
            forces.add_wall(node.left, -torque * grad_left);
            forces.add_wall(node.right, -torque * grad_right);
            forces.add_wall(key, torque * (grad_left + grad_right));
        }

        for i in 0..self.cyt_nodes.len() {
            let pos_i = self.cyt_nodes[i].pos;
            for j in i + 1..self.cyt_nodes.len() {
                let (f_own, f_ext) = params
                    .mechanics
                    .cyt_cyt
                    .calculate_force_between(&pos_i, &self.cyt_nodes[j].pos)?;
                forces.cyt[i] += f_own;
                forces.cyt[j] += f_ext;
            }
            for (key, node) in self.wall_nodes.iter() {
                let (f_own, f_ext) = params
                    .mechanics
                    .cyt_wall
                    .calculate_force_between(&pos_i, &node.pos)?;
                forces.cyt[i] += f_own;
                forces.add_wall(key, f_ext);
            }
        }

        let adhesion = params.adhesion.spring();
        for spring in self.adhesion_springs.iter() {
            let (Some(own), Some(ext)) = (
                self.wall_nodes.get(spring.own_node),
                tissue
                    .get_cell(spring.neighbor)
                    .and_then(|cell| cell.wall_node_position(spring.neighbor_node)),
            ) else {
                continue;
            };
            let (f_own, _) = adhesion.calculate_force_between(&own.pos, &ext)?;
            forces.add_wall(spring.own_node, f_own);
        }

        Ok(forces)
    }

    /// Overwrites the force of every node by the calculated one.
    pub fn apply_forces(&mut self, forces: NodeForces) {
        for (key, node) in self.wall_nodes.iter_mut() {
            node.set_force(&forces.wall.get(key).copied().unwrap_or_else(Vector2::zeros));
        }
        for (node, force) in self.cyt_nodes.iter_mut().zip(forces.cyt) {
            node.set_force(&force);
        }
    }

    /// Calculates and stores the forces acting on all nodes of this cell.
    ///
    /// The tissue must not contain this cell mutably borrowed.
    /// When updating all cells of a tissue, use [Cell::compute_forces] for all cells first
    /// and [Cell::apply_forces] afterwards.
    pub fn calc_new_forces<T: TissueView + ?Sized>(
        &mut self,
        tissue: &T,
        params: &Parameters,
    ) -> Result<(), CalcError> {
        let forces = self.compute_forces(tissue, params)?;
        self.apply_forces(forces);
        Ok(())
    }

    /// Moves every node by $\Delta t\vec{F}/\gamma$ and refreshes center and angles.
    pub fn update_node_locations(&mut self, params: &Parameters) -> Result<(), CalcError> {
        let dt = params.mechanics.dt;
        let damping = self.damping;
        for node in self.wall_nodes.values_mut() {
            let dx = node.calculate_increment(dt, damping)?;
            node.pos += dx;
        }
        for node in self.cyt_nodes.iter_mut() {
            let dx = node.calculate_increment(dt, damping)?;
            node.pos += dx;
        }
        self.update_cell_center();
        self.update_wall_angles();
        Ok(())
    }
}
