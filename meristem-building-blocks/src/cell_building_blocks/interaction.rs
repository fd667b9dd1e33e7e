use meristem_concepts::*;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Calculates the interaction strength behind the [MorsePotential] struct.
pub fn calculate_morse_interaction(
    own_pos: &Vector2<f64>,
    ext_pos: &Vector2<f64>,
    radius: f64,
    cutoff: f64,
    strength: f64,
    potential_stiffness: f64,
) -> Result<(Vector2<f64>, Vector2<f64>), CalcError> {
    let z = own_pos - ext_pos;
    let dist = z.norm();

    // If the distance between the two objects is greater than the cutoff, we
    // immediately return zero.
    if dist > cutoff || dist == 0.0 {
        return Ok((Vector2::zeros(), Vector2::zeros()));
    }
    let dir = z / dist;
    let e = (-potential_stiffness * (dist - radius)).exp();
    let force = -2.0 * strength * potential_stiffness * e * (1.0 - e);
    Ok((dir * force, -dir * force))
}

/// Famous [Morse](https://doi.org/10.1103/PhysRev.34.57) potential for diatomic molecules.
///
/// Used between cytoplasm nodes and between cytoplasm and wall nodes of the same cell.
/// By choosing the `cutoff` equal to the `radius`, only the repulsive part of the potential
/// remains which then approximates the area-filling pressure of the cytoplasm.
///
/// # Parameters & Variables
/// | Symbol | Struct Field | Description |
/// |:---:| --- | --- |
/// | $R$ | `radius` | Equilibrium distance of two nodes |
/// | $\lambda$ | `potential_stiffness` | Can be interpreted as the inverse width of the potential |
/// | | `cutoff` | Cutoff after which the interaction strength is identically 0 |
/// | $V_0$ | `strength` | Interaction strength |
/// | | | |
/// | $r$ | | Distance between interacting nodes |
///
/// \\begin{equation}
///     V(r) = V_0\left(1 - e^{-\lambda(r-R)}\right)^2
/// \\end{equation}
///
/// # References
/// \[1\]
/// P. M. Morse,
/// “Diatomic Molecules According to the Wave Mechanics. II. Vibrational Levels,”
/// Physical Review, vol. 34, no. 1. American Physical Society (APS),
/// pp. 57–64, Jul. 01, 1929.
/// doi: [10.1103/physrev.34.57](https://doi.org/10.1103/PhysRev.34.57).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MorsePotential {
    /// Equilibrium distance of the potential
    pub radius: f64,
    /// Defines the length for the interaction range
    pub potential_stiffness: f64,
    /// Cutoff after which the interaction is exactly 0
    pub cutoff: f64,
    /// Strength of the interaction
    pub strength: f64,
}

impl MorsePotential {
    /// Constructs a purely repulsive potential by setting the cutoff to the radius.
    pub fn repulsive(radius: f64, potential_stiffness: f64, strength: f64) -> Self {
        Self {
            radius,
            potential_stiffness,
            cutoff: radius,
            strength,
        }
    }
}

impl Interaction<Vector2<f64>, Vector2<f64>> for MorsePotential {
    fn calculate_force_between(
        &self,
        own_pos: &Vector2<f64>,
        ext_pos: &Vector2<f64>,
    ) -> Result<(Vector2<f64>, Vector2<f64>), CalcError> {
        calculate_morse_interaction(
            own_pos,
            ext_pos,
            self.radius,
            self.cutoff,
            self.strength,
            self.potential_stiffness,
        )
    }
}

/// Hookean spring between two nodes.
///
/// \\begin{equation}
///     \vec{F} = k\left(|\vec{x}_e - \vec{x}_o| - l\right)\frac{\vec{x}_e - \vec{x}_o}{|\vec{x}_e - \vec{x}_o|}
/// \\end{equation}
///
/// The force returned first acts on the own node and pulls it towards the external node
/// when the spring is stretched.
/// Springs of zero length produce no force.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LinearSpring {
    /// Stiffness $k$ of the spring
    pub stiffness: f64,
    /// Rest length $l$ of the spring
    pub rest_length: f64,
}

impl Interaction<Vector2<f64>, Vector2<f64>> for LinearSpring {
    fn calculate_force_between(
        &self,
        own_pos: &Vector2<f64>,
        ext_pos: &Vector2<f64>,
    ) -> Result<(Vector2<f64>, Vector2<f64>), CalcError> {
        let z = ext_pos - own_pos;
        let dist = z.norm();
        if dist == 0.0 {
            return Ok((Vector2::zeros(), Vector2::zeros()));
        }
        let force = z / dist * self.stiffness * (dist - self.rest_length);
        Ok((force, -force))
    }
}

/// Two nodes count as neighbors when they are closer than the threshold.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DistanceThreshold(pub f64);

impl NeighborInteraction<Vector2<f64>> for DistanceThreshold {
    fn is_neighbor(&self, own_pos: &Vector2<f64>, ext_pos: &Vector2<f64>) -> Result<bool, CalcError> {
        Ok((own_pos - ext_pos).norm() < self.0)
    }
}
