use std::convert::Infallible;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Float, StepReport, Swarm};

/// Module containing the biogeography-based optimizer.
pub mod bbo;
pub use bbo::BBO;

/// Module containing the comprehensive-learning particle swarm optimizer.
pub mod clpso;
pub use clpso::CLPSO;

/// Module containing the standard particle swarm optimizer.
pub mod pso;
pub use pso::PSO;

pub(crate) const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// A linearly decaying inertia weight shared by [`PSO`] and [`CLPSO`].
///
/// ```math
/// \omega^t = \omega_0 - (\omega_0 - \omega_1)\frac{t}{t_{max}}
/// ```
///
/// High inertia early in a run favors exploration, low inertia late favors refinement.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct InertiaSchedule {
    /// The weight at the start of the run
    pub start: Float,
    /// The weight reached once the iteration budget is exhausted
    pub end: Float,
}

impl Default for InertiaSchedule {
    fn default() -> Self {
        Self {
            start: 0.9,
            end: 0.4,
        }
    }
}

impl InertiaSchedule {
    /// The weight at `iteration` out of a budget of `max_iterations`.
    ///
    /// Stepping past the budget is allowed; the weight keeps extrapolating linearly below
    /// [`end`](Self::end).
    pub fn at(&self, iteration: usize, max_iterations: usize) -> Float {
        self.start - (self.start - self.end) * iteration as Float / max_iterations as Float
    }
}

/// The incremental contract shared by the three optimizers.
///
/// Implementations hold their own population, fitness function, and random number generator;
/// the caller only ever drives them through [`step`](Optimizer::step), typically in small
/// batches from an outer loop (e.g. once per rendered frame). The optimizers are
/// interchangeable behind `dyn Optimizer` since they differ only in construction.
pub trait Optimizer<E = Infallible, A = ()> {
    /// The population driven by this optimizer.
    fn swarm(&self) -> &Swarm<A>;
    /// Mutable access to the population.
    fn swarm_mut(&mut self) -> &mut Swarm<A>;
    /// Sample and evaluate the initial population.
    ///
    /// Called automatically by the first [`step`](Optimizer::step); there is rarely a reason
    /// to call it directly.
    ///
    /// # Errors
    ///
    /// Returns an `Err(E)` if a fitness evaluation fails.
    fn initialize(&mut self) -> Result<(), E>;
    /// Perform one full update iteration over the population.
    ///
    /// # Errors
    ///
    /// Returns an `Err(E)` if a fitness evaluation fails.
    fn iterate(&mut self) -> Result<(), E>;
    /// Run `n` iterations and report the best solution found so far.
    ///
    /// The first call samples the initial population before iterating; later calls continue
    /// from the stored state, so an optimizer can be driven indefinitely in batches of any
    /// size. `step(0)` on a fresh optimizer just initializes and reports.
    ///
    /// # Errors
    ///
    /// Returns an `Err(E)` if a fitness evaluation fails. The error is propagated immediately,
    /// leaving the population as of the last completed update; there is no rollback of a
    /// partially applied iteration.
    fn step(&mut self, n: usize) -> Result<StepReport<A>, E>
    where
        A: Clone,
    {
        if !self.swarm().is_initialized() {
            self.initialize()?;
        }
        for _ in 0..n {
            self.swarm_mut().advance_iteration();
            self.iterate()?;
        }
        let report = self.swarm().report();
        debug!(
            "iteration {}: best fitness {:e}",
            report.iteration, report.fx
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_functions::Rosenbrock;
    use crate::Bounds;
    use approx::assert_relative_eq;
    use fastrand::Rng;

    #[test]
    fn test_inertia_schedule_endpoints() {
        let schedule = InertiaSchedule::default();
        assert_relative_eq!(schedule.at(0, 200), 0.9);
        assert_relative_eq!(schedule.at(100, 200), 0.65);
        assert_relative_eq!(schedule.at(200, 200), 0.4);
    }

    #[test]
    fn test_inertia_schedule_extrapolates_past_budget() {
        let schedule = InertiaSchedule::default();
        assert_relative_eq!(schedule.at(400, 200), -0.1);
        assert!(schedule.at(300, 200) < schedule.end);
    }

    #[test]
    fn test_inertia_schedule_is_monotone() {
        let schedule = InertiaSchedule { start: 0.8, end: 0.2 };
        let weights: Vec<Float> = (0..=10).map(|t| schedule.at(t, 10)).collect();
        assert!(weights.windows(2).all(|w| w[1] < w[0]));
        assert_relative_eq!(weights[0], 0.8);
        assert_relative_eq!(weights[10], 0.2);
    }

    #[test]
    fn test_optimizers_are_interchangeable_behind_dyn() {
        let bounds = Bounds::new(vec![-2.0, -2.0], vec![2.0, 2.0]).unwrap();
        let mut optimizers: Vec<Box<dyn Optimizer>> = vec![
            Box::new(PSO::new(bounds.clone(), Rosenbrock { n: 2 }, Rng::with_seed(0))),
            Box::new(BBO::new(bounds.clone(), Rosenbrock { n: 2 }, Rng::with_seed(0))),
            Box::new(CLPSO::new(bounds.clone(), Rosenbrock { n: 2 }, Rng::with_seed(0))),
        ];
        for optimizer in &mut optimizers {
            let report = optimizer.step(10).unwrap();
            assert_eq!(report.iteration, 10);
            assert!(report.fx.is_finite());
            assert!(bounds.contains(&report.x));
        }
    }
}
