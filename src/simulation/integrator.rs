//! Explicit Runge-Kutta stage tables.
//!
//! Each integration order maps to a constant table: per-stage position
//! weights (where the stage is evaluated), per-stage velocity weights (how
//! much the stage contributes), and the constant the velocity weights are
//! normalized by.

use std::fmt;

use crate::error::LayoutError;

/// Constant weights of one integration scheme.
#[derive(Debug, PartialEq)]
pub struct StageTable {
    /// Position offset of each stage, in units of the time step.
    pub position: &'static [f64],
    /// Contribution of each stage before normalization.
    pub velocity: &'static [f64],
    /// Normalizing constant for `velocity`.
    pub norm: f64,
}

impl StageTable {
    /// Number of force evaluations per substep.
    #[inline]
    pub fn stages(&self) -> usize {
        self.position.len()
    }
}

const RK1: StageTable = StageTable {
    position: &[1.0],
    velocity: &[1.0],
    norm: 1.0,
};

const RK2: StageTable = StageTable {
    position: &[0.0, 1.0],
    velocity: &[1.0, 1.0],
    norm: 2.0,
};

const RK3: StageTable = StageTable {
    position: &[0.0, 0.5, 0.75],
    velocity: &[2.0, 3.0, 4.0],
    norm: 9.0,
};

const RK4: StageTable = StageTable {
    position: &[0.0, 0.5, 0.5, 1.0],
    velocity: &[1.0, 2.0, 2.0, 1.0],
    norm: 6.0,
};

/// Integration order ("stability") of the simulation.
///
/// Higher orders evaluate the force more often per substep and converge
/// with less jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stability {
    /// Single stage, semi-implicit Euler-like.
    #[default]
    Rk1,
    Rk2,
    Rk3,
    Rk4,
}

impl Stability {
    /// Numeric order, 1 through 4.
    pub const fn order(self) -> u8 {
        match self {
            Self::Rk1 => 1,
            Self::Rk2 => 2,
            Self::Rk3 => 3,
            Self::Rk4 => 4,
        }
    }

    /// Stage table for this order.
    pub fn table(self) -> &'static StageTable {
        match self {
            Self::Rk1 => &RK1,
            Self::Rk2 => &RK2,
            Self::Rk3 => &RK3,
            Self::Rk4 => &RK4,
        }
    }
}

impl TryFrom<u8> for Stability {
    type Error = LayoutError;

    fn try_from(order: u8) -> Result<Self, Self::Error> {
        match order {
            1 => Ok(Self::Rk1),
            2 => Ok(Self::Rk2),
            3 => Ok(Self::Rk3),
            4 => Ok(Self::Rk4),
            other => Err(LayoutError::InvalidStability(other)),
        }
    }
}

impl From<Stability> for u8 {
    fn from(stability: Stability) -> Self {
        stability.order()
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RK{}", self.order())
    }
}
