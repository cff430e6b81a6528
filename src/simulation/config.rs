//! Simulation configuration.

use serde::{Deserialize, Serialize};

/// Parameters of a [`Simulation`](super::Simulation).
///
/// Deserializes from camelCase host objects; missing fields take defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    /// Starting temperature (default: 0.25).
    pub alpha: f64,
    /// Alpha below which the layout counts as settled (default: 0.001).
    pub alpha_min: f64,
    /// Fraction of the distance to `alpha_target` covered per step.
    /// `None` picks the rate that reaches `alpha_min` in 300 steps.
    pub alpha_decay: Option<f64>,
    /// Equilibrium alpha (default: 0).
    pub alpha_target: f64,
    /// Friction in `[0, 1]` (default: 0.2).
    pub velocity_decay: f64,
    /// Substeps per step (default: 1).
    pub n: u32,
    /// Time scale of one substep (default: 1).
    pub t: f64,
    /// Integration order, 1 through 4 (default: 1).
    pub stability: u8,
}

impl SimulationConfig {
    /// Decay rate after resolving the default.
    pub fn resolved_alpha_decay(&self) -> f64 {
        self.alpha_decay
            .unwrap_or_else(|| 1.0 - self.alpha_min.powf(1.0 / 300.0))
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alpha: 0.25,
            alpha_min: 0.001,
            alpha_decay: None,
            alpha_target: 0.0,
            velocity_decay: 0.2,
            n: 1,
            t: 1.0,
            stability: 1,
        }
    }
}
