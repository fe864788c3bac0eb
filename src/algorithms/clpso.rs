use std::cmp::Ordering;
use std::convert::Infallible;

use fastrand::Rng;
use log::trace;

use super::{InertiaSchedule, Optimizer, DEFAULT_MAX_ITERATIONS};
use crate::{
    generate_random_vector, Bounds, DVector, FitnessFunction, Float, PositionInit, SampleFloat,
    Swarm, VelocityInit,
};

/// Bookkeeping for one particle's comprehensive-learning exemplar.
#[derive(Clone, Debug)]
struct Learner {
    /// For each dimension, the index of the individual whose personal best this particle
    /// learns from (possibly its own).
    exemplar: Vec<usize>,
    learn_prob: Float,
    /// Iterations elapsed since the exemplar was last rebuilt.
    flag: usize,
}

/// The probability that a particle of the given rank learns a dimension from another
/// particle's personal best, rather than its own.
///
/// ```math
/// P_i = P_\text{min} + (P_\text{max} - P_\text{min})
///       \frac{e^{10 i / (N - 1)} - 1}{e^{10} - 1}
/// ```
///
/// The spread is exponential, so most of the population sits near $`P_\text{min}`$ and only
/// the last few ranks approach $`P_\text{max}`$. A population of one keeps every particle at
/// $`P_\text{min}`$.
fn learning_probability(rank: usize, population: usize, min_pc: Float, max_pc: Float) -> Float {
    if population < 2 {
        return min_pc;
    }
    let t = 10.0 * rank as Float / (population - 1) as Float;
    min_pc + (max_pc - min_pc) * (t.exp() - 1.0) / (Float::exp(10.0) - 1.0)
}

/// Comprehensive learning particle swarm optimizer.
///
/// Instead of pulling every particle toward a single global best, each particle learns every
/// dimension from an exemplar of its own:
///
/// ```math
/// v_{i,d}^{t+1} = \omega^t v_{i,d}^t
///     + c\, r_{i,d}^{t+1} \left( p_{e_{i,d},\,d}^t - x_{i,d}^t \right)
/// ```
///
/// where $`e_{i,d}`$ names the individual whose personal best particle $`i`$ follows in
/// dimension $`d`$ [^1]. There is no separate social term. Exemplars are rebuilt on a fixed
/// cadence, once every refreshing gap of iterations: each dimension then learns from the
/// better of two randomly drawn other particles with the rank-dependent probability of
/// [`learning_probability`], keeping the particle's own record otherwise. A rebuild that
/// picks the particle itself in every dimension is repaired by forcing one random dimension
/// to another randomly chosen individual, so every refresh learns from at least one other
/// particle.
///
/// Velocities start at uniform draws from `[0, 10)` rather than zero; pass
/// [`VelocityInit::Zero`](crate::VelocityInit::Zero) to
/// [`with_velocity_init`](Self::with_velocity_init) for quiet starts.
///
/// [^1]: [Liang, J. J., Qin, A. K., Suganthan, P. N., & Baskar, S. (2006). Comprehensive learning particle swarm optimizer for global optimization of multimodal functions. IEEE Transactions on Evolutionary Computation, 10(3), 281-295.](https://doi.org/10.1109/TEVC.2005.857610)
pub struct CLPSO<E = Infallible, A = ()> {
    swarm: Swarm<A>,
    func: Box<dyn FitnessFunction<E, A>>,
    rng: Rng,
    learners: Vec<Learner>,
    inertia: InertiaSchedule,
    c: Float,
    min_pc: Float,
    max_pc: Float,
    gap: usize,
    max_iterations: usize,
}

impl<E, A: Clone> CLPSO<E, A> {
    const DEFAULT_POPULATION: usize = 20;
    /// Construct a comprehensive learning particle swarm optimizer over the given region,
    /// minimizing `func`.
    ///
    /// All randomness is drawn from `rng`, so a seeded generator gives reproducible runs. The
    /// population is sampled lazily by the first [`step`](Optimizer::step) call.
    pub fn new<F>(bounds: Bounds, func: F, rng: Rng) -> Self
    where
        F: FitnessFunction<E, A> + 'static,
    {
        let mut swarm = Swarm::new(bounds, Self::DEFAULT_POPULATION);
        swarm.set_velocity_init(VelocityInit::Uniform(0.0, 10.0));
        Self {
            swarm,
            func: Box::new(func),
            rng,
            learners: Vec::new(),
            inertia: InertiaSchedule::default(),
            c: 1.49445,
            min_pc: 0.05,
            max_pc: 0.5,
            gap: 7,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
    /// Sets the number of particles (default = `20`).
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
    /// Sets the acceleration coefficient $`c`$ applied to the exemplar term
    /// (default = `1.49445`).
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
    /// Sets the refreshing gap: the number of iterations a particle keeps an exemplar before
    /// rebuilding it (default = `7`).
    ///
    /// # Panics
    ///
    /// This method will panic if `value` is zero.
    pub fn with_learning_gap(mut self, value: usize) -> Self {
        assert!(value > 0);
        self.gap = value;
        self
    }
    /// Sets the range of per-particle learning probabilities spread over the population by
    /// [`learning_probability`] (default = `0.05` to `0.5`).
    ///
    /// # Panics
    ///
    /// This method will panic unless $`0 \leq P_\text{min} \leq P_\text{max} \leq 1`$.
    pub fn with_learning_probabilities(mut self, min: Float, max: Float) -> Self {
        assert!(0.0 <= min && min <= max && max <= 1.0);
        self.min_pc = min;
        self.max_pc = max;
        self
    }
    /// Sets the method used to sample the initial particle positions
    /// (default = [`PositionInit::Uniform`]).
    pub fn with_position_init(mut self, value: PositionInit) -> Self {
        self.swarm.set_position_init(value);
        self
    }
    /// Sets the method used to initialize the particle velocities
    /// (default = [`VelocityInit::Uniform`]`(0.0, 10.0)`).
    pub fn with_velocity_init(mut self, value: VelocityInit) -> Self {
        self.swarm.set_velocity_init(value);
        self
    }
    fn random_other(&mut self, exclude: usize, n: usize) -> usize {
        if n < 2 {
            return 0;
        }
        loop {
            let candidate = self.rng.usize(0..n);
            if candidate != exclude {
                return candidate;
            }
        }
    }
    fn select_exemplar(&mut self, i: usize) -> Vec<usize> {
        let n = self.swarm.individuals.len();
        let dimension = self.swarm.bounds().dimension();
        let mut exemplar = vec![i; dimension];
        let mut any_social = false;
        for entry in &mut exemplar {
            if self.rng.float() < self.learners[i].learn_prob {
                let a = self.random_other(i, n);
                let b = self.random_other(i, n);
                // tournament between two personal bests; ties keep the first draw
                *entry = if self.swarm.individuals[b]
                    .best
                    .total_cmp(&self.swarm.individuals[a].best)
                    == Ordering::Less
                {
                    b
                } else {
                    a
                };
                any_social = true;
            }
        }
        if !any_social {
            let dim = self.rng.usize(0..dimension);
            exemplar[dim] = self.random_other(i, n);
        }
        exemplar
    }
}

impl<E, A: Clone> Optimizer<E, A> for CLPSO<E, A> {
    fn swarm(&self) -> &Swarm<A> {
        &self.swarm
    }
    fn swarm_mut(&mut self) -> &mut Swarm<A> {
        &mut self.swarm
    }
    fn initialize(&mut self) -> Result<(), E> {
        self.swarm.initialize(&*self.func, &mut self.rng)?;
        let n = self.swarm.individuals.len();
        let dimension = self.swarm.bounds().dimension();
        self.learners = (0..n)
            .map(|rank| Learner {
                exemplar: vec![rank; dimension],
                learn_prob: learning_probability(rank, n, self.min_pc, self.max_pc),
                flag: 0,
            })
            .collect();
        Ok(())
    }
    fn iterate(&mut self) -> Result<(), E> {
        let w = self.inertia.at(self.swarm.iteration(), self.max_iterations);
        let bounds = self.swarm.bounds().clone();
        let dimension = bounds.dimension();
        for i in 0..self.swarm.individuals.len() {
            self.learners[i].flag += 1;
            if self.learners[i].flag >= self.gap {
                let exemplar = self.select_exemplar(i);
                trace!("particle {i} refreshed its exemplar: {exemplar:?}");
                self.learners[i].exemplar = exemplar;
                self.learners[i].flag = 0;
            }
            let target = {
                let exemplar = &self.learners[i].exemplar;
                DVector::from_fn(dimension, |d, _| {
                    self.swarm.individuals[exemplar[d]].best.x[d]
                })
            };
            let rv = generate_random_vector(dimension, 0.0, 1.0, &mut self.rng);
            let particle = &mut self.swarm.individuals[i];
            particle.velocity = particle.velocity.scale(w)
                + rv.component_mul(&(target - &particle.position.x))
                    .scale(self.c);
            particle.update_position(&*self.func, &bounds, &mut self.rng)?;
        }
        self.swarm.update_gbest_from_bests();
        Ok(())
    }
}
