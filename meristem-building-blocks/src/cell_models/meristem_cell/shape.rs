use super::Cell;
use crate::cell_building_blocks::tensor::{principal_direction, second_moment, PrincipalAxis};
use crate::parameters::Parameters;

use nalgebra::{Matrix2, Vector2};

impl Cell {
    /// Second moment of the wall node positions about their centroid.
    ///
    /// The result is also stored in the cell.
    pub fn compute_shape_tensor(&mut self) -> Matrix2<f64> {
        self.shape_tensor = second_moment(self.ring_positions().iter());
        self.shape_tensor
    }

    /// Corners of the polygon which the ring would form if every edge had its rest length.
    ///
    /// The ring is walked starting at the left corner and each edge is scaled to the rest
    /// length along its current direction.
    /// The resulting gap between the last and first corner is distributed linearly over all
    /// corners such that the polygon closes again.
    fn rest_length_polygon(&self, params: &Parameters) -> Vec<Vector2<f64>> {
        let positions = self.ring_positions();
        let n = positions.len();
        if n == 0 {
            return positions;
        }
        let rest_length = params.mechanics.membrane_rest_length;
        let mut corners = Vec::with_capacity(n + 1);
        corners.push(positions[0]);
        for i in 0..n {
            let edge = positions[(i + 1) % n] - positions[i];
            let length = edge.norm();
            let step = if length > 0.0 {
                edge * (rest_length / length)
            } else {
                Vector2::zeros()
            };
            corners.push(corners[i] + step);
        }
        let drift = corners[n] - corners[0];
        corners.truncate(n);
        corners
            .into_iter()
            .enumerate()
            .map(|(i, q)| q - drift * (i as f64 / n as f64))
            .collect()
    }

    /// Shape tensor of the cell if all of its wall edges were at rest length.
    ///
    /// The result is also stored in the cell.
    pub fn compute_equi_shape_tensor(&mut self, params: &Parameters) -> Matrix2<f64> {
        self.equi_shape_tensor = second_moment(self.rest_length_polygon(params).iter());
        self.equi_shape_tensor
    }

    /// Stress tensor $\sigma = k_\text{lin}(S - S_\text{eq})$ from the current shape tensor
    /// $S$ and the equilibrium shape tensor $S_\text{eq}$.
    ///
    /// Both shape tensors are recalculated and all three tensors are stored in the cell.
    pub fn compute_stress_tensor(&mut self, params: &Parameters) -> Matrix2<f64> {
        let shape = self.compute_shape_tensor();
        let equi = self.compute_equi_shape_tensor(params);
        self.stress_tensor = params.mechanics.k_lin * (shape - equi);
        self.stress_tensor
    }

    /// Eigenvector of the largest eigenvalue of the stress tensor.
    ///
    /// For isotropic stress the x-axis is returned.
    pub fn compute_direction_of_highest_tensile_stress(
        &mut self,
        params: &Parameters,
    ) -> Vector2<f64> {
        let stress = self.compute_stress_tensor(params);
        principal_direction(
            &stress,
            PrincipalAxis::Largest,
            params.division.isotropy_tolerance,
        )
    }

    /// Eigenvector of the smallest eigenvalue of the shape tensor.
    ///
    /// This is the direction in which the cell is narrowest.
    /// For isotropic cells the y-axis is returned.
    pub fn compute_direction_of_smallest_plane(&mut self, params: &Parameters) -> Vector2<f64> {
        let shape = self.compute_shape_tensor();
        principal_direction(
            &shape,
            PrincipalAxis::Smallest,
            params.division.isotropy_tolerance,
        )
    }

    /// Last calculated shape tensor
    pub fn get_shape_tensor(&self) -> Matrix2<f64> {
        self.shape_tensor
    }

    /// Last calculated equilibrium shape tensor
    pub fn get_equi_shape_tensor(&self) -> Matrix2<f64> {
        self.equi_shape_tensor
    }

    /// Last calculated stress tensor
    pub fn get_stress_tensor(&self) -> Matrix2<f64> {
        self.stress_tensor
    }
}
