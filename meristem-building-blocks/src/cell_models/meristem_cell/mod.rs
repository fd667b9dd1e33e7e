//! A single plant cell represented by a ring of wall nodes filled with cytoplasm nodes.
//!
//! The functionality of [Cell] is split into multiple files.
//! | File | Content |
//! | --- | --- |
//! | [topology.rs](topology) | Ring traversal, insertion and deletion of nodes |
//! | [forces.rs](forces) | Linear and bending springs, cytoplasm repulsion, integration |
//! | [shape.rs](shape) | Shape, equilibrium shape and stress tensors |
//! | [growth.rs](growth) | Morphogens, growth rate and direction, cell progress |
//! | [division.rs](division) | Division plane selection and daughter construction |
//! | [adhesion.rs](adhesion) | Neighbor detection and adhesion springs |

mod adhesion;
mod division;
mod forces;
mod growth;
mod shape;
mod topology;

pub use adhesion::*;
pub use division::*;
pub use forces::*;
pub use growth::*;
pub use topology::*;

use crate::cell_building_blocks::{CytNode, WallNode, WallNodeKey};
use crate::parameters::Parameters;

use meristem_concepts::{Ancestry, CellHandle, Id, InvariantError, SetupError};

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// Read access to the cells of the tissue.
///
/// Cells only store [CellHandle]s of their neighbors.
/// Whenever information about another cell is needed, the handle is resolved through this
/// trait which is implemented by the tissue that owns all cells.
pub trait TissueView {
    /// Resolves the handle of a cell.
    fn get_cell(&self, handle: CellHandle) -> Option<&Cell>;

    /// Iterates over all cells of the tissue.
    fn cells<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Cell> + 'a>;
}

impl TissueView for [Cell] {
    fn get_cell(&self, handle: CellHandle) -> Option<&Cell> {
        self.get(handle.0).filter(|cell| cell.rank == handle)
    }

    fn cells<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Cell> + 'a> {
        Box::new(self.iter())
    }
}

impl TissueView for Vec<Cell> {
    fn get_cell(&self, handle: CellHandle) -> Option<&Cell> {
        self.as_slice().get_cell(handle)
    }

    fn cells<'a>(&'a self) -> Box<dyn Iterator<Item = &'a Cell> + 'a> {
        Box::new(self.iter())
    }
}

/// Mechanical and biochemical state of a single cell.
///
/// The cell exclusively owns its wall and cytoplasm nodes.
/// Wall nodes are stored in a generational arena and linked to a closed ring which is
/// oriented counter-clockwise.
/// The ring is traversed starting from the [left corner](Cell::get_left_corner).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cell {
    rank: CellHandle,
    ancestry: Ancestry,
    layer: usize,
    boundary: bool,
    stem: bool,
    damping: f64,
    life_length: usize,
    num_cyt_nodes: usize,
    cyt_nodes: Vec<CytNode>,
    num_wall_nodes: usize,
    wall_nodes: SlotMap<WallNodeKey, WallNode>,
    left_corner: WallNodeKey,
    cell_progress: f64,
    cell_center: Vector2<f64>,
    wuschel: f64,
    cytokinin: f64,
    div_plane: Option<Vector2<f64>>,
    shape_tensor: Matrix2<f64>,
    equi_shape_tensor: Matrix2<f64>,
    stress_tensor: Matrix2<f64>,
    growth_rate: f64,
    growth_direction: Vector2<f64>,
    neigh_cells: Vec<CellHandle>,
    adhesion_springs: Vec<AdhesionSpring>,
}

impl Cell {
    /// Creates a new initial cell of the tissue.
    ///
    /// The wall nodes are placed on a circle of the given radius such that neighboring
    /// nodes are approximately the
    /// [rest length](crate::MechanicalParameters::membrane_rest_length) apart.
    pub fn new(
        rank: CellHandle,
        center: Vector2<f64>,
        radius: f64,
        layer: usize,
        boundary: bool,
        stem: bool,
        params: &Parameters,
    ) -> Result<Self, SetupError> {
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(SetupError(format!(
                "cell radius must be positive and finite but was {radius}"
            )));
        }
        if !center.iter().all(|x| x.is_finite()) {
            return Err(SetupError(format!("cell center {center:?} is not finite")));
        }
        let mut cell = Self::empty(rank, Ancestry::Initial, layer, boundary, stem, params);
        cell.cell_center = center;
        cell.make_nodes(radius, params)?;
        Ok(cell)
    }

    /// Cell without any nodes which inherits all other properties from the arguments.
    fn empty(
        rank: CellHandle,
        ancestry: Ancestry,
        layer: usize,
        boundary: bool,
        stem: bool,
        params: &Parameters,
    ) -> Self {
        Self {
            rank,
            ancestry,
            layer,
            boundary,
            stem,
            damping: params.mechanics.damping,
            life_length: 0,
            num_cyt_nodes: 0,
            cyt_nodes: Vec::new(),
            num_wall_nodes: 0,
            wall_nodes: SlotMap::with_key(),
            left_corner: WallNodeKey::default(),
            cell_progress: 0.0,
            cell_center: Vector2::zeros(),
            wuschel: 0.0,
            cytokinin: 0.0,
            div_plane: None,
            shape_tensor: Matrix2::zeros(),
            equi_shape_tensor: Matrix2::zeros(),
            stress_tensor: Matrix2::zeros(),
            growth_rate: 0.0,
            growth_direction: Vector2::zeros(),
            neigh_cells: Vec::new(),
            adhesion_springs: Vec::new(),
        }
    }

    /// Creates the wall ring and the initial cytoplasm nodes around the current center.
    ///
    /// Any previously existing nodes are removed.
    pub fn make_nodes(&mut self, radius: f64, params: &Parameters) -> Result<(), SetupError> {
        let rest_length = params.mechanics.membrane_rest_length;
        if !(rest_length > 0.0) {
            return Err(SetupError(format!(
                "membrane rest length must be positive but was {rest_length}"
            )));
        }
        let n_wall = ((2.0 * std::f64::consts::PI * radius / rest_length).round() as usize)
            .max(params.growth.min_wall_nodes)
            .max(3);
        let center = self.cell_center;
        let positions = (0..n_wall).map(|i| {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / n_wall as f64;
            center + radius * Vector2::new(angle.cos(), angle.sin())
        });
        self.set_ring(positions.map(|p| WallNode::new(p, 0.0)).collect());
        self.update_wall_equi_angles_div();

        self.cyt_nodes.clear();
        let n_cyt = params.growth.init_cyt_nodes;
        if n_cyt > 0 {
            self.cyt_nodes.push(CytNode::new(center));
        }
        let cyt_radius = 0.5 * params.growth.cyt_spawn_fraction.max(0.0) * radius;
        for i in 1..n_cyt {
            let angle = 2.0 * std::f64::consts::PI * i as f64 / (n_cyt - 1) as f64;
            self.cyt_nodes.push(CytNode::new(
                center + cyt_radius * Vector2::new(angle.cos(), angle.sin()),
            ));
        }
        self.num_cyt_nodes = self.cyt_nodes.len();

        self.update_cell_center();
        self.update_wall_angles();
        Ok(())
    }

    /// Replaces all wall nodes by the given ones and links them in the given order.
    fn set_ring(&mut self, nodes: Vec<WallNode>) {
        self.wall_nodes.clear();
        let keys: Vec<_> = nodes
            .into_iter()
            .map(|node| self.wall_nodes.insert(node))
            .collect();
        let n = keys.len();
        for (i, key) in keys.iter().enumerate() {
            let node = &mut self.wall_nodes[*key];
            node.left = keys[(i + n - 1) % n];
            node.right = keys[(i + 1) % n];
        }
        self.left_corner = keys.first().copied().unwrap_or_default();
        self.num_wall_nodes = n;
    }

    /// Unique identifier of the cell within the tissue.
    pub fn get_rank(&self) -> CellHandle {
        self.rank
    }

    /// Changes the rank of the cell.
    pub fn set_rank(&mut self, rank: CellHandle) {
        self.rank = rank;
    }

    /// Lineage of the cell which is fixed at construction.
    pub fn get_ancestry(&self) -> Ancestry {
        self.ancestry
    }

    /// Layer of the tissue the cell belongs to.
    pub fn get_layer(&self) -> usize {
        self.layer
    }

    /// Moves the cell to another layer.
    pub fn set_layer(&mut self, layer: usize) {
        self.layer = layer;
    }

    /// Whether the cell sits on the boundary of the tissue.
    pub fn is_boundary(&self) -> bool {
        self.boundary
    }

    /// Whether the cell is a stem cell.
    pub fn is_stem(&self) -> bool {
        self.stem
    }

    /// Damping constant used when moving the nodes.
    pub fn get_damping(&self) -> f64 {
        self.damping
    }

    /// Changes the damping constant.
    pub fn set_damping(&mut self, new_damping: f64) {
        self.damping = new_damping;
    }

    /// Number of steps since the cell was created.
    pub fn get_life_length(&self) -> usize {
        self.life_length
    }

    /// Increments the life length by one step.
    pub fn update_life_length(&mut self) {
        self.life_length += 1;
    }

    /// Sets the life length back to zero.
    pub fn reset_life_length(&mut self) {
        self.life_length = 0;
    }

    /// Total number of wall and cytoplasm nodes.
    pub fn get_node_count(&self) -> usize {
        self.num_wall_nodes + self.num_cyt_nodes
    }

    /// Number of wall nodes
    pub fn get_wall_count(&self) -> usize {
        self.num_wall_nodes
    }

    /// Number of cytoplasm nodes
    pub fn get_cyt_count(&self) -> usize {
        self.num_cyt_nodes
    }

    /// Cytoplasm nodes of the cell in no particular order.
    pub fn cyt_nodes(&self) -> &[CytNode] {
        &self.cyt_nodes
    }

    /// Resolves the key of a wall node.
    pub fn wall_node(&self, key: WallNodeKey) -> Option<&WallNode> {
        self.wall_nodes.get(key)
    }

    /// Position of a wall node if the key is still valid.
    pub fn wall_node_position(&self, key: WallNodeKey) -> Option<Vector2<f64>> {
        self.wall_nodes.get(key).map(|node| node.pos)
    }

    /// Sets the progress towards division back to zero.
    pub fn reset_cell_progress(&mut self) {
        self.cell_progress = 0.0;
    }

    /// Progress towards division
    pub fn get_cell_progress(&self) -> f64 {
        self.cell_progress
    }

    /// Recalculates the center of the cell as the average of all wall node positions.
    pub fn update_cell_center(&mut self) {
        if self.num_wall_nodes > 0 {
            self.cell_center = self.wall_nodes.values().map(|node| node.pos).sum::<Vector2<f64>>()
                / self.num_wall_nodes as f64;
        }
    }

    /// Center of the cell as last calculated
    pub fn get_cell_center(&self) -> Vector2<f64> {
        self.cell_center
    }

    /// Concentration of WUS
    pub fn get_wus_concentration(&self) -> f64 {
        self.wuschel
    }

    /// Concentration of CK
    pub fn get_cyt_concentration(&self) -> f64 {
        self.cytokinin
    }

    /// Growth rate
    pub fn get_growth_rate(&self) -> f64 {
        self.growth_rate
    }

    /// Normalized growth direction or zero if none is set.
    pub fn get_growth_direction(&self) -> Vector2<f64> {
        self.growth_direction
    }

    /// Handles of the cells which are currently adjacent to this one.
    pub fn get_neighbor_cells(&self) -> &[CellHandle] {
        &self.neigh_cells
    }

    /// Node at which every traversal of the ring starts.
    pub fn get_left_corner(&self) -> WallNodeKey {
        self.left_corner
    }

    /// Moves the start of the ring traversal to another node of the ring.
    pub fn set_left_corner(&mut self, new_left_corner: WallNodeKey) -> Result<(), InvariantError> {
        if !self.wall_nodes.contains_key(new_left_corner) {
            return Err(InvariantError(format!(
                "node {new_left_corner:?} is not part of the ring of cell {}",
                self.rank
            )));
        }
        self.left_corner = new_left_corner;
        Ok(())
    }

    /// Average distance of the wall nodes from the center.
    pub fn get_radius(&self) -> f64 {
        if self.num_wall_nodes == 0 {
            return 0.0;
        }
        self.wall_nodes
            .values()
            .map(|node| (node.pos - self.cell_center).norm())
            .sum::<f64>()
            / self.num_wall_nodes as f64
    }

    /// Largest distance of a wall node from the center.
    pub(crate) fn bounding_radius(&self) -> f64 {
        self.wall_nodes
            .values()
            .map(|node| (node.pos - self.cell_center).norm())
            .fold(0.0, f64::max)
    }

    /// Average position of all wall and cytoplasm nodes.
    pub fn average_coordinates(&self) -> Vector2<f64> {
        let n = self.get_node_count();
        if n == 0 {
            return self.cell_center;
        }
        (self.wall_nodes.values().map(|node| node.pos).sum::<Vector2<f64>>()
            + self.cyt_nodes.iter().map(|node| node.pos).sum::<Vector2<f64>>())
            / n as f64
    }

    /// Checks the structural invariants of the cell.
    ///
    /// A failing check indicates a bug in the implementation and not a numerical problem.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.num_wall_nodes != self.wall_nodes.len() {
            return Err(InvariantError(format!(
                "cell {} counts {} wall nodes but stores {}",
                self.rank,
                self.num_wall_nodes,
                self.wall_nodes.len()
            )));
        }
        if self.num_cyt_nodes != self.cyt_nodes.len() {
            return Err(InvariantError(format!(
                "cell {} counts {} cytoplasm nodes but stores {}",
                self.rank,
                self.num_cyt_nodes,
                self.cyt_nodes.len()
            )));
        }
        self.check_ring_closure()?;
        for spring in self.adhesion_springs.iter() {
            if !self.neigh_cells.contains(&spring.neighbor) {
                return Err(InvariantError(format!(
                    "cell {} adheres to cell {} which is not a neighbor",
                    self.rank, spring.neighbor
                )));
            }
        }
        Ok(())
    }

    /// Summary of the scalar state of the cell for output collaborators.
    pub fn summary(&self) -> CellSummary {
        CellSummary {
            rank: self.rank,
            ancestry: self.ancestry,
            layer: self.layer,
            boundary: self.boundary,
            stem: self.stem,
            life_length: self.life_length,
            num_wall_nodes: self.num_wall_nodes,
            num_cyt_nodes: self.num_cyt_nodes,
            cell_progress: self.cell_progress,
            area: self.calc_area(),
            center: self.cell_center,
            wus: self.wuschel,
            ck: self.cytokinin,
            growth_rate: self.growth_rate,
            growth_direction: self.growth_direction,
            neighbors: self.neigh_cells.clone(),
        }
    }
}

impl Id for Cell {
    type Identifier = CellHandle;

    fn get_id(&self) -> CellHandle {
        self.rank
    }

    fn ref_id(&self) -> &CellHandle {
        &self.rank
    }
}

/// Scalar and geometric state of a cell at one point in time.
///
/// The fields mirror the getters of [Cell] with the same name.
#[allow(missing_docs)]
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CellSummary {
    pub rank: CellHandle,
    pub ancestry: Ancestry,
    pub layer: usize,
    pub boundary: bool,
    pub stem: bool,
    pub life_length: usize,
    pub num_wall_nodes: usize,
    pub num_cyt_nodes: usize,
    pub cell_progress: f64,
    pub area: f64,
    pub center: Vector2<f64>,
    pub wus: f64,
    pub ck: f64,
    pub growth_rate: f64,
    pub growth_direction: Vector2<f64>,
    pub neighbors: Vec<CellHandle>,
}

#[cfg(test)]
pub(crate) mod test_utils {
    use super::*;

    /// Parameters for which a regular hexagon of radius 1 is in mechanical equilibrium.
    pub fn hexagon_parameters() -> Parameters {
        let mut params = Parameters::default();
        params.mechanics.membrane_rest_length = 1.0;
        params.mechanics.k_bend = 1.0;
        params.growth.min_wall_nodes = 3;
        params.growth.init_cyt_nodes = 1;
        params
    }

    pub fn seed_cell(rank: usize, center: [f64; 2], radius: f64, params: &Parameters) -> Cell {
        Cell::new(
            CellHandle(rank),
            Vector2::from(center),
            radius,
            1,
            false,
            false,
            params,
        )
        .unwrap()
    }
}

#[cfg(test)]
mod test {
    use super::test_utils::*;
    use super::*;

    #[test]
    fn make_nodes_spacing_matches_rest_length() {
        let params = Parameters::default();
        let cell = seed_cell(0, [0.0, 0.0], 1.0, &params);
        assert_eq!(cell.get_wall_count(), 25);
        assert_eq!(cell.get_cyt_count(), params.growth.init_cyt_nodes);
        assert_eq!(cell.get_ancestry(), Ancestry::Initial);
        approx::assert_abs_diff_eq!(cell.get_cell_center(), Vector2::zeros(), epsilon = 1e-12);
        approx::assert_abs_diff_eq!(cell.get_radius(), 1.0, epsilon = 1e-12);
        cell.check_invariants().unwrap();
    }

    #[test]
    fn hexagon_from_rest_length() {
        let params = hexagon_parameters();
        let cell = seed_cell(0, [2.0, -1.0], 1.0, &params);
        assert_eq!(cell.get_wall_count(), 6);
        assert_eq!(cell.get_node_count(), 7);
        for (_, node) in cell.wall_nodes() {
            approx::assert_abs_diff_eq!(
                node.equi_angle(),
                2.0 * std::f64::consts::FRAC_PI_3,
                epsilon = 1e-12
            );
            approx::assert_abs_diff_eq!(node.angle(), node.equi_angle(), epsilon = 1e-12);
        }
    }

    #[test]
    fn invalid_radius_is_rejected() {
        let params = Parameters::default();
        let res = Cell::new(CellHandle(0), Vector2::zeros(), -1.0, 0, false, false, &params);
        assert!(res.is_err());
        let res = Cell::new(CellHandle(0), Vector2::zeros(), f64::NAN, 0, false, false, &params);
        assert!(res.is_err());
    }

    #[test]
    fn left_corner_must_be_in_ring() {
        let params = Parameters::default();
        let mut cell = seed_cell(0, [0.0, 0.0], 1.0, &params);
        let (key, _) = cell.wall_nodes().nth(3).unwrap();
        cell.set_left_corner(key).unwrap();
        assert_eq!(cell.get_left_corner(), key);

        // The key of a deleted node stays invalid even after its slot is reused
        let (stale, _) = cell.wall_nodes().nth(5).unwrap();
        cell.delete_wall_node(stale, &params).unwrap();
        let reused = cell.add_wall_node(key).unwrap();
        assert_ne!(reused, stale);
        let err = cell.set_left_corner(stale).unwrap_err();
        assert!(err.to_string().contains("not part of the ring"));
        assert_eq!(cell.get_left_corner(), key);
        cell.check_invariants().unwrap();
    }

    #[test]
    fn tissue_view_of_slice() {
        let params = Parameters::default();
        let cells = vec![
            seed_cell(0, [0.0, 0.0], 1.0, &params),
            seed_cell(1, [3.0, 0.0], 1.0, &params),
        ];
        assert!(cells.get_cell(CellHandle(1)).is_some());
        assert!(cells.get_cell(CellHandle(2)).is_none());
        assert_eq!(cells.cells().count(), 2);
    }

    #[test]
    fn summary_serializes() {
        let params = Parameters::default();
        let cell = seed_cell(4, [1.0, 1.0], 1.0, &params);
        let summary = cell.summary();
        assert_eq!(summary.rank, CellHandle(4));
        let json = serde_json::to_string(&summary).unwrap();
        let back: CellSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }
}
