//! Session configuration and host defaults.

use serde::{Deserialize, Deserializer, Serialize};

use crate::force::ForceOptions;
use crate::simulation::SimulationConfig;

/// Rest length of a dangling edge's ghost endpoint.
pub const DEFAULT_EDGE_LEN: f64 = 48.0;

/// Alpha decay while no drag is in progress.
pub const SIM_ALPHA_DECAY_DEFAULT: f64 = 0.01;

/// Alpha applied whenever topology or pins change.
pub const RESTART_ALPHA: f64 = 0.25;

/// Default node diameter.
pub const NODE_DIAMETER: f64 = 16.0;

/// Default node radius.
pub const NODE_RADIUS: f64 = NODE_DIAMETER / 2.0;

/// Radius of the ring new nodes are seeded on.
pub const SEED_RADIUS: f64 = 24.0;

/// Configuration for a [`LayoutSession`](super::LayoutSession).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Fields missing from a host object keep the session defaults.
    #[serde(deserialize_with = "simulation_over_session_defaults")]
    pub simulation: SimulationConfig,
    pub force: ForceOptions,
    /// Ghost distance for normal dangling edges (scope edges use 2/3).
    pub default_edge_len: f64,
    /// Alpha decay restored when the last drag ends.
    pub alpha_decay: f64,
    /// Alpha set on every topology, pin, or drag change.
    pub restart_alpha: f64,
    /// Radius of the ring new nodes are seeded on.
    pub seed_radius: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig {
                alpha: RESTART_ALPHA,
                alpha_decay: Some(SIM_ALPHA_DECAY_DEFAULT),
                alpha_target: 0.0,
                n: 6,
                velocity_decay: 0.1,
                ..SimulationConfig::default()
            },
            force: ForceOptions {
                link_distance: 24.0,
                max_distance: 6.0 * 24.0,
                axis_lock_y: false,
                ..ForceOptions::default()
            },
            default_edge_len: DEFAULT_EDGE_LEN,
            alpha_decay: SIM_ALPHA_DECAY_DEFAULT,
            restart_alpha: RESTART_ALPHA,
            seed_radius: SEED_RADIUS,
        }
    }
}

/// Partial [`SimulationConfig`] as sent by a host.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulationOverrides {
    alpha: Option<f64>,
    alpha_min: Option<f64>,
    alpha_decay: Option<f64>,
    alpha_target: Option<f64>,
    velocity_decay: Option<f64>,
    n: Option<u32>,
    t: Option<f64>,
    stability: Option<u8>,
}

impl SimulationOverrides {
    fn apply(self, base: SimulationConfig) -> SimulationConfig {
        SimulationConfig {
            alpha: self.alpha.unwrap_or(base.alpha),
            alpha_min: self.alpha_min.unwrap_or(base.alpha_min),
            alpha_decay: self.alpha_decay.or(base.alpha_decay),
            alpha_target: self.alpha_target.unwrap_or(base.alpha_target),
            velocity_decay: self.velocity_decay.unwrap_or(base.velocity_decay),
            n: self.n.unwrap_or(base.n),
            t: self.t.unwrap_or(base.t),
            stability: self.stability.unwrap_or(base.stability),
        }
    }
}

fn simulation_over_session_defaults<'de, D>(deserializer: D) -> Result<SimulationConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = SimulationOverrides::deserialize(deserializer)?;
    Ok(overrides.apply(SessionConfig::default().simulation))
}
