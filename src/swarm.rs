use std::cmp::Ordering;

use fastrand::Rng;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    generate_random_vector, generate_random_vector_in_limits, Bounds, DVector, FitnessFunction,
    Float, Point, SampleFloat,
};

/// A member of the population: its current position, velocity, and personal-best record.
///
/// PSO and CLPSO drive the velocity every iteration; BBO leaves it at zero and rewrites
/// coordinates directly. The personal-best record is a field of the individual, so it travels
/// with it through any re-sorting of the population.
#[derive(Clone, Serialize, Deserialize)]
pub struct Individual<A = ()> {
    /// The current position of the individual and its evaluation
    pub position: Point<A>,
    /// The current velocity of the individual
    pub velocity: DVector<Float>,
    /// The best position this individual has visited (as measured by the minimum `fx`)
    pub best: Point<A>,
}

impl<A: Clone> Individual<A> {
    fn new<E>(
        position: Point<A>,
        velocity: DVector<Float>,
        func: &dyn FitnessFunction<E, A>,
    ) -> Result<Self, E> {
        let mut position = position;
        position.evaluate(func)?;
        Ok(Self {
            position: position.clone(),
            velocity,
            best: position,
        })
    }
    /// Move by the current velocity, fold the result back into the region, re-evaluate, and
    /// update the personal-best record if strictly improved.
    pub(crate) fn update_position<E>(
        &mut self,
        func: &dyn FitnessFunction<E, A>,
        bounds: &Bounds,
        rng: &mut Rng,
    ) -> Result<(), E> {
        let new_position = &self.position.x + &self.velocity;
        self.position
            .set_position(bounds.reflect(new_position, rng));
        self.position.evaluate(func)?;
        self.update_best();
        Ok(())
    }
    /// Fold the current position into the personal-best record if strictly better.
    pub(crate) fn update_best(&mut self) {
        if self.position.total_cmp(&self.best) == Ordering::Less {
            self.best = self.position.clone();
        }
    }
}

/// Methods to sample the initial positions of the population inside the bounds.
#[derive(Clone, Default, Serialize, Deserialize)]
pub enum PositionInit {
    /// Independent uniform draws per dimension (default)
    #[default]
    Uniform,
    /// Uniform draws warped through one step of the logistic map $`u \to 4u(1-u)`$ before
    /// scaling into the bounds, a cheap chaotic spread that favors the region edges
    LogisticMap,
    /// Latin hypercube sampling: every dimension is split into one stratum per individual, and
    /// each individual lands in a distinct stratum of each dimension
    LatinHypercube,
    /// Explicit starting positions, e.g. to warm-start from a previous run. The number of
    /// positions overrides the configured population size, and each position is clamped into
    /// the bounds. Every position must match the bounds dimension.
    Custom(Vec<DVector<Float>>),
}

impl PositionInit {
    fn get_positions<A>(&self, bounds: &Bounds, n: usize, rng: &mut Rng) -> Vec<Point<A>> {
        let limits = bounds.limits();
        match self {
            Self::Uniform => (0..n)
                .map(|_| generate_random_vector_in_limits(&limits, rng).into())
                .collect(),
            Self::LogisticMap => (0..n)
                .map(|_| {
                    DVector::from_vec(
                        limits
                            .iter()
                            .map(|&(lower, upper)| {
                                let u = rng.float();
                                let u = 4.0 * u * (1.0 - u);
                                lower + u * (upper - lower)
                            })
                            .collect(),
                    )
                    .into()
                })
                .collect(),
            Self::LatinHypercube => {
                let dim = limits.len();
                let mut lhs_matrix = vec![vec![0.0; dim]; n];
                for (d, limit) in limits.iter().enumerate().take(dim) {
                    let mut bins: Vec<usize> = (0..n).collect();
                    rng.shuffle(&mut bins);
                    for (i, &bin) in bins.iter().enumerate() {
                        let (min, max) = limit;
                        let bin_size = (max - min) / n as Float;
                        let lower = min + bin as Float * bin_size;
                        let upper = lower + bin_size;
                        lhs_matrix[i][d] = rng.range(lower, upper);
                    }
                }
                lhs_matrix
                    .into_iter()
                    .map(|coords| DVector::from_vec(coords).into())
                    .collect()
            }
            Self::Custom(positions) => {
                assert!(
                    !positions.is_empty(),
                    "at least one custom initial position is required"
                );
                for position in positions {
                    assert_eq!(
                        position.len(),
                        bounds.dimension(),
                        "custom initial positions must match the bounds dimension"
                    );
                }
                positions
                    .iter()
                    .map(|p| {
                        let mut x = p.clone();
                        bounds.clamp(&mut x);
                        x.into()
                    })
                    .collect()
            }
        }
    }
}

/// Methods for setting the initial velocities of the population.
#[derive(Clone, Default, Serialize, Deserialize)]
pub enum VelocityInit {
    /// All velocities start at zero (default)
    #[default]
    Zero,
    /// Independent uniform draws in `[low, high)` for every component
    Uniform(Float, Float),
}

impl VelocityInit {
    fn get_velocities(&self, n: usize, dim: usize, rng: &mut Rng) -> Vec<DVector<Float>> {
        match self {
            Self::Zero => (0..n).map(|_| DVector::zeros(dim)).collect(),
            Self::Uniform(low, high) => (0..n)
                .map(|_| generate_random_vector(dim, *low, *high, rng))
                .collect(),
        }
    }
}

/// A snapshot of the best solution found so far, returned by
/// [`Optimizer::step`](crate::algorithms::Optimizer::step).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepReport<A = ()> {
    /// The total number of iterations performed since construction
    pub iteration: usize,
    /// The best position found so far
    pub x: DVector<Float>,
    /// The fitness value at that position
    pub fx: Float,
    /// The auxiliary data the fitness function reported at that position, if any
    pub aux: Option<A>,
}

/// The population of candidate solutions shared by the optimizers, together with the
/// global-best record and the iteration counter.
///
/// The population is sampled lazily: a fresh swarm is empty until the owning optimizer's
/// first [`step`](crate::algorithms::Optimizer::step) call.
#[derive(Clone, Serialize, Deserialize)]
pub struct Swarm<A = ()> {
    /// The members of the population
    pub individuals: Vec<Individual<A>>,
    /// The best position found by any individual so far (as measured by the minimum `fx`)
    pub gbest: Point<A>,
    bounds: Bounds,
    population_size: usize,
    iteration: usize,
    position_init: PositionInit,
    velocity_init: VelocityInit,
}

impl<A: Clone> Swarm<A> {
    /// Create an empty swarm over the given region.
    pub fn new(bounds: Bounds, population_size: usize) -> Self {
        let dimension = bounds.dimension();
        Self {
            individuals: Vec::default(),
            gbest: Point::from(DVector::zeros(dimension)),
            bounds,
            population_size,
            iteration: 0,
            position_init: PositionInit::default(),
            velocity_init: VelocityInit::default(),
        }
    }
    /// The search region the population lives in.
    pub const fn bounds(&self) -> &Bounds {
        &self.bounds
    }
    /// The configured population size. [`PositionInit::Custom`] overrides this with the number
    /// of supplied positions once the swarm is initialized.
    pub const fn population_size(&self) -> usize {
        self.population_size
    }
    /// The total number of iterations performed so far.
    pub const fn iteration(&self) -> usize {
        self.iteration
    }
    /// Whether the population has been sampled yet.
    pub fn is_initialized(&self) -> bool {
        !self.individuals.is_empty()
    }
    pub(crate) fn set_population_size(&mut self, n: usize) {
        self.population_size = n;
    }
    pub(crate) fn set_position_init(&mut self, init: PositionInit) {
        self.position_init = init;
    }
    pub(crate) fn set_velocity_init(&mut self, init: VelocityInit) {
        self.velocity_init = init;
    }
    pub(crate) fn advance_iteration(&mut self) {
        self.iteration += 1;
    }
    pub(crate) fn initialize<E>(
        &mut self,
        func: &dyn FitnessFunction<E, A>,
        rng: &mut Rng,
    ) -> Result<(), E> {
        let positions = self
            .position_init
            .get_positions(&self.bounds, self.population_size, rng);
        self.population_size = positions.len();
        let velocities =
            self.velocity_init
                .get_velocities(self.population_size, self.bounds.dimension(), rng);
        self.individuals = positions
            .into_iter()
            .zip(velocities)
            .map(|(position, velocity)| Individual::new(position, velocity, func))
            .collect::<Result<Vec<_>, E>>()?;
        self.gbest = self.individuals[0].best.clone();
        self.update_gbest_from_bests();
        debug!(
            "initialized a population of {} individuals in {} dimensions",
            self.population_size,
            self.bounds.dimension()
        );
        Ok(())
    }
    /// Pull the global best forward from the personal-best records (strict improvement only).
    pub(crate) fn update_gbest_from_bests(&mut self) {
        for individual in &self.individuals {
            if individual.best.total_cmp(&self.gbest) == Ordering::Less {
                self.gbest = individual.best.clone();
            }
        }
    }
    /// Pull the global best forward from the current positions (strict improvement only).
    pub(crate) fn update_gbest_from_positions(&mut self) {
        for individual in &self.individuals {
            if individual.position.total_cmp(&self.gbest) == Ordering::Less {
                self.gbest = individual.position.clone();
            }
        }
    }
    pub(crate) fn report(&self) -> StepReport<A> {
        StepReport {
            iteration: self.iteration,
            x: self.gbest.x.clone(),
            fx: self.gbest.fx.unwrap_or(Float::INFINITY),
            aux: self.gbest.aux.clone(),
        }
    }
}
