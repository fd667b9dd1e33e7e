use meristem_concepts::Mechanics;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

slotmap::new_key_type! {
    /// Key of a [WallNode] inside the ring of its cell.
    ///
    /// Keys are generational.
    /// A key which refers to a node that has since been deleted will never resolve to a
    /// different node which later reused the same slot.
    pub struct WallNodeKey;
}

/// Point mass on the boundary of a cell.
///
/// Wall nodes form a closed ring which is traversed counter-clockwise by following the
/// [right](WallNode::right) links and clockwise by following the [left](WallNode::left) links.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WallNode {
    pub(crate) pos: Vector2<f64>,
    pub(crate) force: Vector2<f64>,
    pub(crate) left: WallNodeKey,
    pub(crate) right: WallNodeKey,
    pub(crate) angle: f64,
    pub(crate) equi_angle: f64,
    pub(crate) on_division_wall: bool,
}

impl WallNode {
    /// Creates a new unlinked wall node at the given position.
    ///
    /// The links need to be set by the owning cell before the node can be part of a ring.
    pub fn new(pos: Vector2<f64>, equi_angle: f64) -> Self {
        Self {
            pos,
            force: Vector2::zeros(),
            left: WallNodeKey::default(),
            right: WallNodeKey::default(),
            angle: equi_angle,
            equi_angle,
            on_division_wall: false,
        }
    }

    /// Clockwise neighbor on the ring.
    pub fn left(&self) -> WallNodeKey {
        self.left
    }

    /// Counter-clockwise neighbor on the ring.
    pub fn right(&self) -> WallNodeKey {
        self.right
    }

    /// Interior angle at this node as computed from the current geometry.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Rest angle of the bending spring at this node.
    pub fn equi_angle(&self) -> f64 {
        self.equi_angle
    }

    /// Whether this node was placed on a newly formed wall during division.
    pub fn is_on_division_wall(&self) -> bool {
        self.on_division_wall
    }
}

impl Mechanics<Vector2<f64>, Vector2<f64>> for WallNode {
    fn pos(&self) -> Vector2<f64> {
        self.pos
    }

    fn set_pos(&mut self, pos: &Vector2<f64>) {
        self.pos = *pos;
    }

    fn force(&self) -> Vector2<f64> {
        self.force
    }

    fn set_force(&mut self, force: &Vector2<f64>) {
        self.force = *force;
    }
}

/// Point mass inside of a cell which fills its area.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CytNode {
    pub(crate) pos: Vector2<f64>,
    pub(crate) force: Vector2<f64>,
}

impl CytNode {
    /// Creates a new cytoplasm node at the given position.
    pub fn new(pos: Vector2<f64>) -> Self {
        Self {
            pos,
            force: Vector2::zeros(),
        }
    }
}

impl Mechanics<Vector2<f64>, Vector2<f64>> for CytNode {
    fn pos(&self) -> Vector2<f64> {
        self.pos
    }

    fn set_pos(&mut self, pos: &Vector2<f64>) {
        self.pos = *pos;
    }

    fn force(&self) -> Vector2<f64> {
        self.force
    }

    fn set_force(&mut self, force: &Vector2<f64>) {
        self.force = *force;
    }
}
