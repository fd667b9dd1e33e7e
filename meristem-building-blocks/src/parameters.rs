use crate::cell_building_blocks::{LinearSpring, MorsePotential};

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Parameters of the spring network of a single cell.
///
/// # Parameters
/// | Parameter | Description |
/// | --- | --- |
/// | `k_lin` | Stiffness of the linear springs between neighboring wall nodes |
/// | `membrane_rest_length` | Rest length of the linear springs between wall nodes |
/// | `growth_softening` | Factor applied to `k_lin` for edges aligned with the growth direction |
/// | `alignment_angle` | Maximum angle between an edge and the growth direction to count as aligned |
/// | `k_bend` | Stiffness of the bending springs at each wall node |
/// | `k_bend_div` | Bending stiffness of the nodes on a freshly formed division wall |
/// | `div_stiffening_steps` | Number of steps after division during which `k_bend_div` is used |
/// | `equi_angle_remodel_rate` | Fraction by which rest angles relax towards the regular polygon per step |
/// | `cyt_cyt` | Repulsion between cytoplasm nodes |
/// | `cyt_wall` | Repulsion between cytoplasm and wall nodes |
/// | `damping` | Default damping constant of newly created cells |
/// | `dt` | Time increment of one simulation step |
///
/// Node positions are integrated explicitly.
/// The alternating bending mode of a wall with node spacing $h$ only decays when
/// $16 k_b \Delta t < 2 \gamma h^2$, which bounds `k_bend` and `k_bend_div` for a given
/// `membrane_rest_length`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MechanicalParameters {
    /// Stiffness of linear wall springs
    pub k_lin: f64,
    /// Rest length of linear wall springs
    pub membrane_rest_length: f64,
    /// Softening of springs aligned with the growth direction
    pub growth_softening: f64,
    /// Maximum angle to the growth direction of an aligned edge
    pub alignment_angle: f64,
    /// Bending stiffness
    pub k_bend: f64,
    /// Bending stiffness on a fresh division wall
    pub k_bend_div: f64,
    /// Duration of the division wall stiffening
    pub div_stiffening_steps: usize,
    /// Relaxation rate of rest angles
    pub equi_angle_remodel_rate: f64,
    /// Cytoplasm-cytoplasm repulsion
    pub cyt_cyt: MorsePotential,
    /// Cytoplasm-wall repulsion
    pub cyt_wall: MorsePotential,
    /// Default damping constant
    pub damping: f64,
    /// Time increment
    pub dt: f64,
}

impl Default for MechanicalParameters {
    fn default() -> Self {
        Self {
            k_lin: 10.0,
            membrane_rest_length: 0.25,
            growth_softening: 0.5,
            alignment_angle: std::f64::consts::FRAC_PI_4,
            k_bend: 0.05,
            k_bend_div: 0.2,
            div_stiffening_steps: 200,
            equi_angle_remodel_rate: 0.01,
            cyt_cyt: MorsePotential::repulsive(0.5, 2.0, 0.5),
            cyt_wall: MorsePotential::repulsive(0.6, 2.0, 0.5),
            damping: 1.0,
            dt: 0.01,
        }
    }
}

/// Parameters of the growth policy and the topology edits it triggers.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GrowthParameters {
    /// Growth rate of a cell which is saturated with WUS and sees no CK.
    pub max_growth_rate: f64,
    /// WUS concentration at which half of the maximal growth rate is reached.
    pub wus_half_saturation: f64,
    /// Hill coefficient of the WUS response.
    pub hill_coefficient: f64,
    /// Relative increase of the growth rate per unit CK concentration.
    pub ck_gain: f64,
    /// Wall edges longer than this are split by inserting a new node.
    pub membrane_threshold: f64,
    /// Factor applied to the insertion threshold of edges aligned with the growth direction.
    pub aligned_threshold_factor: f64,
    /// Wall edges shorter than this lose one of their nodes.
    pub min_edge_length: f64,
    /// Number of steps between two checks for inserting and deleting wall nodes.
    pub wall_check_interval: usize,
    /// A ring never holds fewer wall nodes than this.
    pub min_wall_nodes: usize,
    /// Number of cytoplasm nodes of a new cell.
    pub init_cyt_nodes: usize,
    /// Number of cytoplasm nodes added over one complete cell cycle.
    pub cyt_nodes_per_cycle: usize,
    /// New cytoplasm nodes are placed within this fraction of the radius around the center.
    pub cyt_spawn_fraction: f64,
    /// How the growth direction is updated.
    pub growth_direction_policy: GrowthDirectionPolicy,
}

impl Default for GrowthParameters {
    fn default() -> Self {
        Self {
            max_growth_rate: 0.1,
            wus_half_saturation: 1.0,
            hill_coefficient: 2.0,
            ck_gain: 0.5,
            membrane_threshold: 0.4,
            aligned_threshold_factor: 0.8,
            min_edge_length: 0.08,
            wall_check_interval: 10,
            min_wall_nodes: 4,
            init_cyt_nodes: 4,
            cyt_nodes_per_cycle: 4,
            cyt_spawn_fraction: 0.25,
            growth_direction_policy: GrowthDirectionPolicy::TensileStress,
        }
    }
}

/// Determines where the growth direction of a cell comes from.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum GrowthDirectionPolicy {
    /// Follow the direction of highest tensile stress every step.
    TensileStress,
    /// Keep the direction set by [set_growth_direction](crate::Cell::set_growth_direction).
    External,
}

/// Parameters of the division algorithm.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DivisionParameters {
    /// Value of the cell progress at which the cell attempts to divide.
    pub max_progress: f64,
    /// Maximum number of ring steps scanned in each direction when looking for the nodes
    /// closest to the division plane.
    pub search_amount: usize,
    /// Relative tolerance below which a tensor counts as isotropic.
    pub isotropy_tolerance: f64,
}

impl Default for DivisionParameters {
    fn default() -> Self {
        Self {
            max_progress: 1.0,
            search_amount: 6,
            isotropy_tolerance: 1e-6,
        }
    }
}

/// Parameters of adhesion between neighboring cells.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdhesionParameters {
    /// Stiffness of an adhesion spring.
    pub k_adh: f64,
    /// Rest length of an adhesion spring.
    pub adhesion_rest_length: f64,
    /// Wall nodes further apart than this are never linked.
    pub adhesion_threshold: f64,
    /// Cells count as neighbors when two of their wall nodes are closer than this.
    pub neighbor_threshold: f64,
}

impl Default for AdhesionParameters {
    fn default() -> Self {
        Self {
            k_adh: 5.0,
            adhesion_rest_length: 0.05,
            adhesion_threshold: 0.3,
            neighbor_threshold: 0.3,
        }
    }
}

impl AdhesionParameters {
    /// The adhesion spring between two wall nodes
    pub fn spring(&self) -> LinearSpring {
        LinearSpring {
            stiffness: self.k_adh,
            rest_length: self.adhesion_rest_length,
        }
    }
}

/// Collection of all global parameters which a cell consults but does not own.
///
/// The parameters are threaded explicitly through every operation which needs them.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Parameters {
    /// Spring network
    pub mechanics: MechanicalParameters,
    /// Growth policy
    pub growth: GrowthParameters,
    /// Division algorithm
    pub division: DivisionParameters,
    /// Adhesion between cells
    pub adhesion: AdhesionParameters,
}

/// Tissue-level morphogen input which is consulted by
/// [calc_wus](crate::Cell::calc_wus) and [calc_ck](crate::Cell::calc_ck).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum MorphogenSignal {
    /// Both concentrations decay exponentially with the distance from their organizing
    /// centers
    /// \\begin{equation}
    ///     c = c_0 \exp\left(-\frac{|\vec{x} - \vec{x}_c|}{\ell}\right).
    /// \\end{equation}
    Organizer {
        /// Organizing center of WUS
        wus_center: Vector2<f64>,
        /// Concentration of WUS at its organizing center
        wus_peak: f64,
        /// Decay length of WUS
        wus_decay_length: f64,
        /// Organizing center of CK
        ck_center: Vector2<f64>,
        /// Concentration of CK at its organizing center
        ck_peak: f64,
        /// Decay length of CK
        ck_decay_length: f64,
    },
    /// Concentrations calculated by the tissue, for example by solving a diffusion problem.
    Supplied {
        /// WUS concentration
        wus: f64,
        /// CK concentration
        ck: f64,
    },
}

impl Default for MorphogenSignal {
    fn default() -> Self {
        MorphogenSignal::Organizer {
            wus_center: Vector2::zeros(),
            wus_peak: 2.0,
            wus_decay_length: 5.0,
            ck_center: Vector2::zeros(),
            ck_peak: 1.0,
            ck_decay_length: 5.0,
        }
    }
}
