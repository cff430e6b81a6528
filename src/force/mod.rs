//! Force evaluation.
//!
//! A [`Force`] is invoked by the simulation once per integration stage with
//! the current alpha and adds velocity (or acceleration) impulses to nodes.
//! [`MinigraphForce`] is the layout force: bounded-range repulsion between
//! all nodes plus spring links.

mod minigraph;

use std::convert::Infallible;

use crate::graph::NodeMap;

pub use minigraph::{
    ForceOptions, LINK_DISTANCE, MinigraphForce, SUBGRAPH_MAX_D, apply_minigraph_force,
};

/// A force callback bound to some link set and tuning options.
pub trait Force {
    /// Error raised by the callback. It propagates out of `Simulation::step`.
    type Error;

    /// Accumulate impulses into `nodes` at temperature `alpha`.
    fn apply(&mut self, nodes: &mut NodeMap, alpha: f64) -> Result<(), Self::Error>;
}

impl<F: Force + ?Sized> Force for &mut F {
    type Error = F::Error;

    fn apply(&mut self, nodes: &mut NodeMap, alpha: f64) -> Result<(), Self::Error> {
        (**self).apply(nodes, alpha)
    }
}

/// A force that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopForce;

impl Force for NoopForce {
    type Error = Infallible;

    fn apply(&mut self, _nodes: &mut NodeMap, _alpha: f64) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Adapter returned by [`force_fn`].
#[derive(Debug, Clone, Copy)]
pub struct ForceFn<F>(F);

/// Use a closure as a [`Force`].
///
/// The closure returns `Result<(), E>`; use `Infallible` for closures that
/// cannot fail.
pub fn force_fn<F, E>(f: F) -> ForceFn<F>
where
    F: FnMut(&mut NodeMap, f64) -> Result<(), E>,
{
    ForceFn(f)
}

impl<F, E> Force for ForceFn<F>
where
    F: FnMut(&mut NodeMap, f64) -> Result<(), E>,
{
    type Error = E;

    fn apply(&mut self, nodes: &mut NodeMap, alpha: f64) -> Result<(), Self::Error> {
        (self.0)(nodes, alpha)
    }
}
