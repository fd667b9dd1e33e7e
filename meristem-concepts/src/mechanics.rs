use crate::errors::CalcError;

use core::fmt::Debug;
use core::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use num::Zero;

// TODO use trait alias when available
/// Represents the current position of a point mass.
pub trait Position:
    Sized
    + Add<Self, Output = Self>
    + AddAssign
    + Sub<Output = Self>
    + SubAssign
    + Clone
    + Debug
    + Send
    + Sync
    + Mul<f64, Output = Self>
{
}
impl<T> Position for T where
    T: Sized
        + Add<Self, Output = Self>
        + AddAssign
        + Sub<Output = Self>
        + SubAssign
        + Clone
        + Debug
        + Send
        + Sync
        + Mul<f64, Output = Self>
{
}

// TODO use trait alias when available
/// Represents a force which can act on a point mass.
pub trait Force:
    Sized
    + Add<Self, Output = Self>
    + AddAssign
    + Sub<Output = Self>
    + SubAssign
    + Clone
    + Debug
    + Zero
    + Send
    + Sync
    + Mul<f64, Output = Self>
{
}
impl<T> Force for T where
    T: Sized
        + Add<Self, Output = Self>
        + AddAssign
        + Sub<Output = Self>
        + SubAssign
        + Clone
        + Debug
        + Zero
        + Send
        + Sync
        + Mul<f64, Output = Self>
{
}

/// Describes the position of a node and how it reacts to the forces acting on it.
///
/// All nodes are assumed to move in an overdamped regime.
/// There is no velocity and no inertia, the increment of the position is directly
/// proportional to the force.
pub trait Mechanics<Pos: Position, For: Force> {
    /// Gets the current position.
    fn pos(&self) -> Pos;
    /// Sets the current position.
    fn set_pos(&mut self, pos: &Pos);
    /// Gets the force which was last accumulated on this node.
    fn force(&self) -> For;
    /// Overwrites the accumulated force.
    fn set_force(&mut self, force: &For);

    /// Calculate the position increment for one time step given the accumulated force.
    ///
    /// The default implementation follows the overdamped equation of motion
    /// \\begin{equation}
    ///     \Delta\vec{x} = \frac{\Delta t}{\lambda}\vec{F}
    /// \\end{equation}
    /// where $\lambda$ is the damping constant.
    fn calculate_increment(&self, dt: f64, damping: f64) -> Result<Pos, CalcError>
    where
        For: Into<Pos>,
    {
        if !(damping > 0.0) {
            return Err(CalcError(format!(
                "damping constant must be positive but was {damping}"
            )));
        }
        Ok(self.force().into() * (dt / damping))
    }
}
