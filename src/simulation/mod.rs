//! Alpha-annealed force simulation.
//!
//! The simulation owns no nodes: the host passes its node table and a force
//! to every [`Simulation::step`]. Each step
//!
//! 1. moves alpha toward `alpha_target` by `alpha_decay` and returns `true`
//!    without touching any node once alpha drops below `alpha_min`;
//! 2. otherwise runs `n` substeps, each evaluating the force once per
//!    Runge-Kutta stage and integrating every node (pinned axes snap to their
//!    pin with zero velocity);
//! 3. reheats alpha to [`REHEAT_ALPHA`] if total movement stayed below
//!    [`REHEAT_MOVEMENT_THRESHOLD`], then returns `false`.
//!
//! "Running" versus "ended" depends on alpha alone. The host re-energizes a
//! settled layout by resetting alpha (see [`Simulation::reheat`]).

mod config;
mod integrator;

use crate::error::Result;
use crate::force::Force;
use crate::graph::{NodeMap, SimNode};

pub use config::SimulationConfig;
pub use integrator::{Stability, StageTable};

/// Movement per step below which alpha is forced back up. Tuning policy.
pub const REHEAT_MOVEMENT_THRESHOLD: f64 = 1.0;

/// Alpha forced in when movement falls below the threshold. Tuning policy.
pub const REHEAT_ALPHA: f64 = 0.1;

/// Per-axis state captured at the first stage of a substep.
#[derive(Debug, Clone, Copy, Default)]
struct AxisStage {
    /// Position at the start of the substep.
    origin: f64,
    /// Velocity at the start of the substep.
    velocity: f64,
    /// Velocity estimate of the previous stage.
    stage_velocity: f64,
    /// Acceleration estimate of the previous stage.
    stage_accel: f64,
}

impl AxisStage {
    fn capture(position: f64, velocity: f64, accel: f64) -> Self {
        Self {
            origin: position,
            velocity,
            stage_velocity: velocity,
            stage_accel: accel,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct NodeStage {
    x: AxisStage,
    y: AxisStage,
}

impl NodeStage {
    fn capture(node: &SimNode) -> Self {
        Self {
            x: AxisStage::capture(node.x, node.vx, node.ax),
            y: AxisStage::capture(node.y, node.vy, node.ay),
        }
    }
}

/// Mutable view of one axis of a node.
struct AxisMut<'a> {
    position: &'a mut f64,
    velocity: &'a mut f64,
    accel: &'a mut f64,
    shadow: &'a mut f64,
    pin: Option<f64>,
}

/// Weights of the stage being integrated.
struct StageWeights {
    position: f64,
    velocity: f64,
    friction: f64,
    last: bool,
}

/// Integrate one axis for one stage and return how far it moved.
fn integrate_axis(axis: AxisMut<'_>, stage: &mut AxisStage, w: &StageWeights) -> f64 {
    let moved = match axis.pin {
        None => {
            let eval = stage.origin + stage.stage_velocity * w.position;
            let velocity = stage.velocity + stage.stage_accel * w.position;
            let accel = *axis.accel - w.friction * velocity;
            stage.stage_velocity = velocity;
            stage.stage_accel = accel;

            let delta = velocity * w.velocity;
            *axis.shadow = eval;
            *axis.position += delta;
            *axis.velocity += accel * w.velocity;
            delta.abs()
        }
        Some(pin) => {
            let moved = (pin - *axis.position).abs();
            *axis.position = pin;
            *axis.velocity = 0.0;
            moved
        }
    };

    if w.last {
        *axis.shadow = *axis.position;
    }
    *axis.accel = 0.0;
    moved
}

/// Force-directed simulation driven one step per host tick.
#[derive(Debug, Clone)]
pub struct Simulation {
    alpha: f64,
    alpha_min: f64,
    alpha_decay: f64,
    alpha_target: f64,
    velocity_decay: f64,
    stability: Stability,
    n: u32,
    t: f64,
    /// Scratch stage state, one entry per node slot.
    stages: Vec<NodeStage>,
}

impl Simulation {
    /// Create a simulation, validating the integration order.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        let stability = Stability::try_from(config.stability)?;
        let simulation = Self {
            alpha: config.alpha,
            alpha_min: config.alpha_min,
            alpha_decay: config.resolved_alpha_decay(),
            alpha_target: config.alpha_target,
            velocity_decay: config.velocity_decay,
            stability,
            n: config.n,
            t: config.t,
            stages: Vec::new(),
        };
        log::debug!(
            "simulation created: {} x{} substeps, alpha {} -> {} (decay {})",
            stability,
            simulation.n,
            simulation.alpha,
            simulation.alpha_target,
            simulation.alpha_decay
        );
        Ok(simulation)
    }

    /// Current parameters as a config.
    pub fn config(&self) -> SimulationConfig {
        SimulationConfig {
            alpha: self.alpha,
            alpha_min: self.alpha_min,
            alpha_decay: Some(self.alpha_decay),
            alpha_target: self.alpha_target,
            velocity_decay: self.velocity_decay,
            n: self.n,
            t: self.t,
            stability: self.stability.order(),
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }

    /// Re-energize the layout, e.g. after a topology change.
    pub fn reheat(&mut self, alpha: f64) {
        log::trace!("reheat: alpha {} -> {}", self.alpha, alpha);
        self.alpha = alpha;
    }

    pub fn alpha_min(&self) -> f64 {
        self.alpha_min
    }

    pub fn set_alpha_min(&mut self, alpha_min: f64) {
        self.alpha_min = alpha_min;
    }

    pub fn alpha_decay(&self) -> f64 {
        self.alpha_decay
    }

    /// Set the decay rate. `0` holds alpha steady, e.g. while dragging.
    pub fn set_alpha_decay(&mut self, alpha_decay: f64) {
        self.alpha_decay = alpha_decay;
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn set_alpha_target(&mut self, alpha_target: f64) {
        self.alpha_target = alpha_target;
    }

    pub fn velocity_decay(&self) -> f64 {
        self.velocity_decay
    }

    pub fn set_velocity_decay(&mut self, velocity_decay: f64) {
        self.velocity_decay = velocity_decay;
    }

    pub fn stability(&self) -> Stability {
        self.stability
    }

    /// Change the integration order. An invalid order leaves the current one.
    pub fn set_stability(&mut self, order: u8) -> Result<()> {
        self.stability = Stability::try_from(order)?;
        Ok(())
    }

    /// Substeps per step.
    pub fn substeps(&self) -> u32 {
        self.n
    }

    pub fn set_substeps(&mut self, n: u32) {
        self.n = n;
    }

    /// Time scale of one substep.
    pub fn time_step(&self) -> f64 {
        self.t
    }

    pub fn set_time_step(&mut self, t: f64) {
        self.t = t;
    }

    /// True once alpha has fallen below `alpha_min`.
    pub fn is_ended(&self) -> bool {
        self.alpha < self.alpha_min
    }

    /// Advance the layout by one tick.
    ///
    /// Returns `Ok(true)` when the layout has settled (no node was touched),
    /// `Ok(false)` otherwise. A force error aborts the step immediately and
    /// leaves nodes as the interrupted substep left them.
    ///
    /// The node set must not change while a step is running.
    pub fn step<F: Force + ?Sized>(
        &mut self,
        nodes: &mut NodeMap,
        force: &mut F,
    ) -> std::result::Result<bool, F::Error> {
        let was_running = !self.is_ended();
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

        if self.alpha < self.alpha_min {
            if was_running {
                log::debug!("simulation settled at alpha {}", self.alpha);
            }
            return Ok(true);
        }

        let table = self.stability.table();
        let last = table.stages() - 1;
        let friction = 1.0 - self.velocity_decay;

        let mut movement = 0.0;

        for _ in 0..self.n {
            for j in 0..=last {
                force.apply(nodes, self.alpha)?;

                let weights = StageWeights {
                    position: table.position[j] * self.t,
                    velocity: table.velocity[j] * self.t / table.norm,
                    friction,
                    last: j == last,
                };

                if j == 0 {
                    self.stages.clear();
                    self.stages.extend(nodes.values().map(NodeStage::capture));
                }

                for (slot, node) in nodes.values_mut().enumerate() {
                    if slot >= self.stages.len() {
                        self.stages.push(NodeStage::capture(node));
                    }
                    let stage = &mut self.stages[slot];

                    movement += integrate_axis(
                        AxisMut {
                            position: &mut node.x,
                            velocity: &mut node.vx,
                            accel: &mut node.ax,
                            shadow: &mut node.shadow_x,
                            pin: node.fx,
                        },
                        &mut stage.x,
                        &weights,
                    );
                    movement += integrate_axis(
                        AxisMut {
                            position: &mut node.y,
                            velocity: &mut node.vy,
                            accel: &mut node.ay,
                            shadow: &mut node.shadow_y,
                            pin: node.fy,
                        },
                        &mut stage.y,
                        &weights,
                    );
                }
            }
        }

        if movement < REHEAT_MOVEMENT_THRESHOLD {
            log::trace!(
                "movement {:.4} below threshold, alpha {} -> {}",
                movement,
                self.alpha,
                REHEAT_ALPHA
            );
            self.alpha = REHEAT_ALPHA;
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayoutError;
    use crate::force::{ForceOptions, MinigraphForce, NoopForce, force_fn};
    use crate::geometry::Shape;
    use crate::graph::NodeId;
    use proptest::prelude::*;
    use std::convert::Infallible;

    fn single(x: f64, y: f64) -> NodeMap {
        let mut nodes = NodeMap::new();
        nodes.insert(NodeId::from("a"), SimNode::new(x, y, Shape::circle(8.0)));
        nodes
    }

    fn sim(stability: u8) -> Simulation {
        Simulation::new(SimulationConfig {
            stability,
            ..SimulationConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_invalid_stability_fails_at_construction() {
        for order in [0u8, 5] {
            let err = Simulation::new(SimulationConfig {
                stability: order,
                ..SimulationConfig::default()
            })
            .unwrap_err();
            assert_eq!(err, LayoutError::InvalidStability(order));
        }
    }

    #[test]
    fn test_set_stability_keeps_previous_on_error() {
        let mut simulation = sim(2);
        assert!(simulation.set_stability(7).is_err());
        assert_eq!(simulation.stability(), Stability::Rk2);
        simulation.set_stability(4).unwrap();
        assert_eq!(simulation.stability(), Stability::Rk4);
    }

    #[test]
    fn test_resting_node_stays_put() {
        for order in 1..=4 {
            let mut simulation = sim(order);
            let mut nodes = single(3.0, -7.0);
            let ended = simulation.step(&mut nodes, &mut NoopForce).unwrap();
            assert!(!ended);
            assert_eq!(nodes["a"].position(), glam::DVec2::new(3.0, -7.0));
        }
    }

    #[test]
    fn test_pinned_node_ignores_force() {
        for order in 1..=4 {
            let mut simulation = sim(order);
            let mut nodes = single(0.0, 0.0);
            {
                let node = &mut nodes["a"];
                node.fx = Some(5.0);
                node.fy = Some(5.0);
                node.vx = 12.0;
            }
            let mut kick = force_fn(|nodes: &mut NodeMap, _alpha| {
                for node in nodes.values_mut() {
                    node.vx += 100.0;
                    node.ay += 50.0;
                }
                Ok::<(), Infallible>(())
            });
            simulation.step(&mut nodes, &mut kick).unwrap();

            let node = &nodes["a"];
            assert_eq!((node.x, node.y, node.vx, node.vy), (5.0, 5.0, 0.0, 0.0));
            assert_eq!((node.shadow_x, node.shadow_y), (5.0, 5.0));
            assert_eq!((node.ax, node.ay), (0.0, 0.0));
        }
    }

    #[test]
    fn test_single_axis_pin() {
        let mut simulation = sim(1);
        let mut nodes = single(0.0, 0.0);
        nodes["a"].fy = Some(2.0);
        nodes["a"].vx = 4.0;
        nodes["a"].vy = 4.0;
        simulation.step(&mut nodes, &mut NoopForce).unwrap();

        let node = &nodes["a"];
        assert_eq!(node.x, 4.0);
        assert_eq!((node.y, node.vy), (2.0, 0.0));
    }

    #[test]
    fn test_euler_update() {
        let mut simulation = Simulation::new(SimulationConfig {
            velocity_decay: 0.2,
            ..SimulationConfig::default()
        })
        .unwrap();
        let mut nodes = single(0.0, 0.0);
        nodes["a"].vx = 10.0;
        simulation.step(&mut nodes, &mut NoopForce).unwrap();

        // x += v; v += -(1 - decay) * v.
        let node = &nodes["a"];
        assert!((node.x - 10.0).abs() < 1e-12);
        assert!((node.vx - 2.0).abs() < 1e-12);
        assert_eq!(node.shadow_x, node.x);
    }

    #[test]
    fn test_alpha_decays_then_ends_and_freezes() {
        let mut simulation = Simulation::new(SimulationConfig {
            alpha: 0.25,
            alpha_min: 0.2,
            alpha_decay: Some(0.1),
            ..SimulationConfig::default()
        })
        .unwrap();
        let mut nodes = single(1.0, 1.0);

        let mut previous = simulation.alpha();
        let mut ended = false;
        for _ in 0..10 {
            ended = simulation.step(&mut nodes, &mut NoopForce).unwrap();
            assert!(simulation.alpha() < previous);
            previous = simulation.alpha();
            if ended {
                break;
            }
        }
        assert!(ended);
        assert!(simulation.is_ended());

        nodes["a"].vx = 50.0;
        for _ in 0..3 {
            assert!(simulation.step(&mut nodes, &mut NoopForce).unwrap());
        }
        assert_eq!(nodes["a"].position(), glam::DVec2::new(1.0, 1.0));
    }

    #[test]
    fn test_low_movement_reheats() {
        let mut simulation = sim(1);
        let mut nodes = single(0.0, 0.0);
        simulation.step(&mut nodes, &mut NoopForce).unwrap();
        assert_eq!(simulation.alpha(), REHEAT_ALPHA);
    }

    #[test]
    fn test_moving_pin_counts_as_movement() {
        let mut simulation = sim(1);
        let mut nodes = single(0.0, 0.0);
        nodes["a"].fx = Some(30.0);
        simulation.step(&mut nodes, &mut NoopForce).unwrap();
        assert!(simulation.alpha() > REHEAT_ALPHA);
    }

    #[test]
    fn test_fast_node_does_not_reheat() {
        let mut simulation = sim(1);
        let mut nodes = single(0.0, 0.0);
        nodes["a"].vx = 5.0;
        simulation.step(&mut nodes, &mut NoopForce).unwrap();
        let decayed = 0.25 - 0.25 * simulation.alpha_decay();
        assert!((simulation.alpha() - decayed).abs() < 1e-12);
    }

    #[test]
    fn test_force_called_once_per_stage_and_substep() {
        for order in 1..=4u8 {
            let mut simulation = Simulation::new(SimulationConfig {
                stability: order,
                n: 3,
                ..SimulationConfig::default()
            })
            .unwrap();
            let mut calls = 0;
            let mut counting = force_fn(|_: &mut NodeMap, _| {
                calls += 1;
                Ok::<(), Infallible>(())
            });
            simulation.step(&mut single(0.0, 0.0), &mut counting).unwrap();
            assert_eq!(calls, 3 * order as usize);
        }
    }

    #[test]
    fn test_force_error_propagates() {
        let mut simulation = sim(2);
        let mut failing = force_fn(|_: &mut NodeMap, _| Err("boom"));
        let result = simulation.step(&mut single(0.0, 0.0), &mut failing);
        assert_eq!(result, Err("boom"));
    }

    #[test]
    fn test_coincident_nodes_separate() {
        let mut simulation = Simulation::new(SimulationConfig {
            n: 1,
            velocity_decay: 0.1,
            alpha_decay: Some(0.0),
            ..SimulationConfig::default()
        })
        .unwrap();
        let mut nodes = NodeMap::new();
        nodes.insert("a".into(), SimNode::new(0.0, 0.0, Shape::circle(8.0)));
        nodes.insert("b".into(), SimNode::new(0.0, 0.0, Shape::circle(8.0)));

        let options = ForceOptions::default();
        let mut force = MinigraphForce::new(&[], options);

        let mut previous = 0.0;
        for _ in 0..20 {
            simulation.step(&mut nodes, &mut force).unwrap();
            let gap = nodes["a"].position().distance(nodes["b"].position()) - 16.0;
            assert!(gap > previous || gap >= options.max_distance);
            if gap >= options.max_distance {
                break;
            }
            previous = gap;
        }
    }

    #[test]
    fn test_higher_orders_settle_linked_pair() {
        for order in 1..=4u8 {
            let mut simulation = Simulation::new(SimulationConfig {
                stability: order,
                alpha: 0.25,
                alpha_decay: Some(0.0),
                velocity_decay: 0.2,
                ..SimulationConfig::default()
            })
            .unwrap();
            let mut nodes = NodeMap::new();
            nodes.insert("a".into(), SimNode::new(0.0, 0.0, Shape::circle(8.0)));
            nodes.insert("b".into(), SimNode::new(200.0, 0.0, Shape::circle(8.0)));
            nodes["a"].pin(0.0, 0.0);

            let links = [crate::graph::Link::new("a", "b")];
            let mut force = MinigraphForce::new(
                &links,
                ForceOptions {
                    max_distance: 1.0,
                    ..ForceOptions::default()
                },
            );
            for _ in 0..400 {
                simulation.step(&mut nodes, &mut force).unwrap();
            }
            let gap = nodes["a"].position().distance(nodes["b"].position()) - 16.0;
            assert!((gap - 24.0).abs() < 1.0, "RK{order} gap {gap}");
        }
    }

    proptest! {
        #[test]
        fn prop_pin_invariant(
            order in 1u8..=4,
            n in 1u32..4,
            px in -500.0f64..500.0,
            py in -500.0f64..500.0,
            vx in -50.0f64..50.0,
            kick in -100.0f64..100.0,
        ) {
            let mut simulation = Simulation::new(SimulationConfig {
                stability: order,
                n,
                ..SimulationConfig::default()
            }).unwrap();
            let mut nodes = single(0.0, 0.0);
            nodes["a"].fx = Some(px);
            nodes["a"].fy = Some(py);
            nodes["a"].vx = vx;
            let mut force = force_fn(|nodes: &mut NodeMap, _| {
                for node in nodes.values_mut() {
                    node.vx += kick;
                    node.vy -= kick;
                }
                Ok::<(), Infallible>(())
            });
            simulation.step(&mut nodes, &mut force).unwrap();
            let node = &nodes["a"];
            prop_assert_eq!((node.x, node.y, node.vx, node.vy), (px, py, 0.0, 0.0));
        }
    }
}
