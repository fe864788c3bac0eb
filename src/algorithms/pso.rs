use std::convert::Infallible;

use fastrand::Rng;

use super::{InertiaSchedule, Optimizer, DEFAULT_MAX_ITERATIONS};
use crate::{
    generate_random_vector, Bounds, FitnessFunction, Float, PositionInit, Swarm, VelocityInit,
};

/// Particle swarm optimizer.
///
/// Every particle carries a velocity that is nudged each iteration toward its own best known
/// position (the cognitive term) and the swarm's best known position (the social term):
///
/// ```math
/// v_i^{t+1} = \omega^t v_i^t + c\, r_{1,i}^{t+1}(p_i^t - x_i^t) + c\, r_{2,i}^{t+1}(g^t - x_i^t)
/// ```
///
/// where $`r_1`$ and $`r_2`$ are uniform random vectors in $`[0,1)`$ drawn fresh per particle,
/// per dimension, and per term, and the inertia weight $`\omega^t`$ decays linearly over the
/// configured iteration budget [^1]. Positions that leave the search region are folded back in
/// by [`Bounds::reflect`]. Personal and global best records only move on strict improvement,
/// so the reported best is non-increasing across steps.
///
/// [^1]: [Shi, Y., & Eberhart, R. (1998). A modified particle swarm optimizer. IEEE International Conference on Evolutionary Computation.](https://doi.org/10.1109/ICEC.1998.699146)
pub struct PSO<E = Infallible, A = ()> {
    swarm: Swarm<A>,
    func: Box<dyn FitnessFunction<E, A>>,
    rng: Rng,
    inertia: InertiaSchedule,
    c: Float,
    max_iterations: usize,
}

impl<E, A: Clone> PSO<E, A> {
    const DEFAULT_POPULATION: usize = 30;
    /// Construct a particle swarm optimizer over the given region, minimizing `func`.
    ///
    /// All randomness is drawn from `rng`, so a seeded generator gives reproducible runs. The
    /// population is sampled lazily by the first [`step`](Optimizer::step) call.
    pub fn new<F>(bounds: Bounds, func: F, rng: Rng) -> Self
    where
        F: FitnessFunction<E, A> + 'static,
    {
        Self {
            swarm: Swarm::new(bounds, Self::DEFAULT_POPULATION),
            func: Box::new(func),
            rng,
            inertia: InertiaSchedule::default(),
            c: 1.494,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
    /// Sets the number of particles (default = `30`).
    ///
    /// # Panics
    ///
    /// This method will panic if `value` is zero.
    pub fn with_population_size(mut self, value: usize) -> Self {
        assert!(value > 0);
        self.swarm.set_population_size(value);
        self
    }
    /// Sets the iteration budget the inertia weight decays over (default = `10000`).
    ///
    /// Stepping past the budget is allowed; the weight keeps decaying linearly below the
    /// scheduled end value.
    ///
    /// # Panics
    ///
    /// This method will panic if `value` is zero.
    pub fn with_max_iterations(mut self, value: usize) -> Self {
        assert!(value > 0);
        self.max_iterations = value;
        self
    }
    /// Sets the acceleration coefficient $`c`$ applied to both the cognitive and social terms
    /// (default = `1.494`).
    ///
    /// # Panics
    ///
    /// This method will panic if $`c < 0`$.
    pub fn with_c(mut self, value: Float) -> Self {
        assert!(value >= 0.0);
        self.c = value;
        self
    }
    /// Sets the inertia-weight schedule (default = `0.9` decaying to `0.4`).
    pub const fn with_inertia(mut self, value: InertiaSchedule) -> Self {
        self.inertia = value;
        self
    }
    /// Sets the method used to sample the initial particle positions
    /// (default = [`PositionInit::Uniform`]).
    pub fn with_position_init(mut self, value: PositionInit) -> Self {
        self.swarm.set_position_init(value);
        self
    }
    /// Sets the method used to initialize the particle velocities
    /// (default = [`VelocityInit::Zero`]).
    pub fn with_velocity_init(mut self, value: VelocityInit) -> Self {
        self.swarm.set_velocity_init(value);
        self
    }
}

impl<E, A: Clone> Optimizer<E, A> for PSO<E, A> {
    fn swarm(&self) -> &Swarm<A> {
        &self.swarm
    }
    fn swarm_mut(&mut self) -> &mut Swarm<A> {
        &mut self.swarm
    }
    fn initialize(&mut self) -> Result<(), E> {
        self.swarm.initialize(&*self.func, &mut self.rng)
    }
    fn iterate(&mut self) -> Result<(), E> {
        let w = self.inertia.at(self.swarm.iteration(), self.max_iterations);
        let bounds = self.swarm.bounds().clone();
        let dim = bounds.dimension();
        let gbest_x = self.swarm.gbest.x.clone();
        for particle in &mut self.swarm.individuals {
            let rv1 = generate_random_vector(dim, 0.0, 1.0, &mut self.rng);
            let rv2 = generate_random_vector(dim, 0.0, 1.0, &mut self.rng);
            particle.velocity = particle.velocity.scale(w)
                + rv1
                    .component_mul(&(&particle.best.x - &particle.position.x))
                    .scale(self.c)
                + rv2
                    .component_mul(&(&gbest_x - &particle.position.x))
                    .scale(self.c);
            particle.update_position(&*self.func, &bounds, &mut self.rng)?;
        }
        self.swarm.update_gbest_from_bests();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::test_functions::{Rastrigin, Sphere};
    use crate::Fitness;

    fn unit_box(dim: usize) -> Bounds {
        Bounds::new(vec![0.0; dim], vec![10.0; dim]).unwrap()
    }

    #[test]
    fn test_sphere_convergence() {
        let mut pso = PSO::new(unit_box(2), Sphere { n: 2 }, Rng::with_seed(0))
            .with_max_iterations(200);
        let report = pso.step(200).unwrap();
        assert_eq!(report.iteration, 200);
        assert!(report.fx < 0.1, "converged to {} instead", report.fx);
        assert!(report.x.iter().all(|&xi| xi.abs() < 0.5));
    }

    #[test]
    fn test_best_is_non_increasing_across_batches() {
        let mut pso = PSO::new(
            Bounds::new(vec![-5.12; 3], vec![5.12; 3]).unwrap(),
            Rastrigin { n: 3 },
            Rng::with_seed(7),
        )
        .with_max_iterations(100);
        let mut last = Float::INFINITY;
        for _ in 0..10 {
            let report = pso.step(10).unwrap();
            assert!(report.fx <= last);
            last = report.fx;
        }
    }

    #[test]
    fn test_population_stays_inside_bounds() {
        let bounds = Bounds::new(vec![-1.0, 100.0], vec![1.0, 200.0]).unwrap();
        let mut pso = PSO::new(bounds.clone(), Sphere { n: 2 }, Rng::with_seed(2))
            .with_max_iterations(50);
        pso.step(50).unwrap();
        for particle in &pso.swarm().individuals {
            assert!(bounds.contains(&particle.position.x));
            assert!(bounds.contains(&particle.best.x));
        }
    }

    #[test]
    fn test_velocities_start_at_zero_and_counter_advances() {
        let mut pso = PSO::new(unit_box(4), Sphere { n: 4 }, Rng::with_seed(0));
        pso.step(0).unwrap();
        assert_eq!(pso.swarm().iteration(), 0);
        assert!(pso
            .swarm()
            .individuals
            .iter()
            .all(|p| p.velocity.iter().all(|&v| v == 0.0)));
        pso.step(3).unwrap();
        assert_eq!(pso.swarm().iteration(), 3);
    }

    #[test]
    fn test_fitness_called_once_per_particle_per_iteration() {
        let calls = Rc::new(Cell::new(0usize));
        let counter = calls.clone();
        let func = move |x: &[Float]| -> Result<Fitness, Infallible> {
            counter.set(counter.get() + 1);
            Ok(x.iter().map(|xi| xi * xi).sum::<Float>().into())
        };
        let mut pso = PSO::new(unit_box(2), func, Rng::with_seed(0)).with_population_size(10);
        pso.step(3).unwrap();
        // 10 evaluations to initialize, then 10 per iteration
        assert_eq!(calls.get(), 40);
    }

    #[test]
    fn test_fitness_error_propagates() {
        #[derive(Debug, Clone, PartialEq)]
        struct SensorOffline;
        let calls = Rc::new(Cell::new(0usize));
        let counter = calls.clone();
        let func = move |x: &[Float]| -> Result<Fitness, SensorOffline> {
            counter.set(counter.get() + 1);
            if counter.get() > 35 {
                Err(SensorOffline)
            } else {
                Ok(x.iter().map(|xi| xi * xi).sum::<Float>().into())
            }
        };
        let mut pso = PSO::new(unit_box(2), func, Rng::with_seed(0));
        assert_eq!(pso.step(5).unwrap_err(), SensorOffline);
        // the failure landed mid-iteration; state reflects the updates already applied
        assert_eq!(pso.swarm().iteration(), 1);
        assert_eq!(pso.swarm().individuals.len(), 30);
    }

    #[test]
    #[should_panic]
    fn test_zero_population_panics() {
        let _ = PSO::new(unit_box(1), Sphere { n: 1 }, Rng::with_seed(0))
            .with_population_size(0);
    }
}
