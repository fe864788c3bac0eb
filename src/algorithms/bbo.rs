use std::convert::Infallible;

use fastrand::Rng;
use log::debug;
use serde::{Deserialize, Serialize};

use super::Optimizer;
use crate::{Bounds, FitnessFunction, Float, PositionInit, SampleFloat, Swarm};

/// Per-habitat migration rates, together with the habitat's slice of the roulette wheel used
/// to pick emigration sources.
///
/// Produced by [`migration_rates`]. With the fitness range written
/// $`\Delta = f_\text{max} - f_\text{min}`$, habitat $`k`$ immigrates at rate
/// $`\lambda_k = (f_k - f_\text{min}) / \Delta`$ and emigrates at rate
/// $`\mu_k = (f_\text{max} - f_k) / \Delta`$, so the best habitat mostly exports features and
/// the worst mostly imports them.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MigrationRates {
    /// The probability that a coordinate of this habitat is replaced during migration
    pub immigration: Float,
    /// The relative rate at which this habitat is picked as a migration source
    pub emigration: Float,
    /// The inclusive lower edge of this habitat's roulette interval
    pub e_min: Float,
    /// The exclusive upper edge of this habitat's roulette interval
    pub e_max: Float,
}

/// Computes the migration rates for a population with the given fitness values, in order.
///
/// The roulette intervals `[e_min, e_max)` are the cumulative emigration rates normalized by
/// their total, so they partition `[0, 1)` contiguously in population order.
///
/// Returns [`None`] when the fitness range is flat or non-finite, in which case the rates are
/// undefined and migration should be skipped.
pub fn migration_rates(fitnesses: &[Float]) -> Option<Vec<MigrationRates>> {
    let fmin = fitnesses.iter().copied().fold(Float::INFINITY, Float::min);
    let fmax = fitnesses
        .iter()
        .copied()
        .fold(Float::NEG_INFINITY, Float::max);
    let range = fmax - fmin;
    if range == 0.0 || !range.is_finite() {
        return None;
    }
    let emigrations = fitnesses
        .iter()
        .map(|&f| (fmax - f) / range)
        .collect::<Vec<_>>();
    let total = emigrations.iter().sum::<Float>();
    let mut cursor = 0.0;
    Some(
        fitnesses
            .iter()
            .zip(emigrations)
            .map(|(&f, emigration)| {
                let e_min = cursor / total;
                cursor += emigration;
                MigrationRates {
                    immigration: (f - fmin) / range,
                    emigration,
                    e_min,
                    e_max: cursor / total,
                }
            })
            .collect(),
    )
}

fn roulette_pick(rates: &[MigrationRates], draw: Float) -> usize {
    rates
        .iter()
        .position(|rate| (rate.e_min..rate.e_max).contains(&draw))
        .unwrap_or(0)
}

/// Biogeography-based optimizer.
///
/// Candidate solutions are treated as habitats that exchange coordinates through migration:
/// every iteration the population is sorted by fitness and assigned the rates described in
/// [`MigrationRates`]. Each habitat is then considered for modification with probability
/// $`p_\text{mod}`$, and a modified habitat replaces each coordinate with probability equal to
/// its immigration rate, copying the value from a source habitat drawn by emigration-weighted
/// roulette [^1]. Migration reads the population as it is being rewritten, so a coordinate
/// imported early in the sweep can be exported again later in the same sweep.
///
/// After migration the worse half of the population is mutated by uniformly resampling single
/// coordinates inside the bounds. Unlike the particle-based optimizers there is no velocity,
/// and the global best tracks the current positions rather than the personal-best records, so
/// it reflects what actually survives in the population.
///
/// [^1]: [Simon, D. (2008). Biogeography-Based Optimization. IEEE Transactions on Evolutionary Computation, 12(6), 702-713.](https://doi.org/10.1109/TEVC.2008.919004)
pub struct BBO<E = Infallible, A = ()> {
    swarm: Swarm<A>,
    func: Box<dyn FitnessFunction<E, A>>,
    rng: Rng,
    p_mod: Float,
    mutation_rate: Float,
    loser_rate: Float,
}

impl<E, A: Clone> BBO<E, A> {
    const DEFAULT_POPULATION: usize = 30;
    /// Construct a biogeography-based optimizer over the given region, minimizing `func`.
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
            p_mod: 0.2,
            mutation_rate: 0.1,
            loser_rate: 0.5,
        }
    }
    /// Sets the number of habitats (default = `30`).
    ///
    /// # Panics
    ///
    /// This method will panic if `value` is zero.
    pub fn with_population_size(mut self, value: usize) -> Self {
        assert!(value > 0);
        self.swarm.set_population_size(value);
        self
    }
    /// Sets the probability that a habitat is considered for migration at all in a given
    /// iteration (default = `0.2`).
    ///
    /// # Panics
    ///
    /// This method will panic if `value` is outside `[0, 1]`.
    pub fn with_modification_probability(mut self, value: Float) -> Self {
        assert!((0.0..=1.0).contains(&value));
        self.p_mod = value;
        self
    }
    /// Sets the per-coordinate probability of uniform resampling applied to the worse part of
    /// the population (default = `0.1`).
    ///
    /// # Panics
    ///
    /// This method will panic if `value` is outside `[0, 1]`.
    pub fn with_mutation_probability(mut self, value: Float) -> Self {
        assert!((0.0..=1.0).contains(&value));
        self.mutation_rate = value;
        self
    }
    /// Sets the fraction of the population (rounded up, counted from the worst) that is
    /// subject to mutation (default = `0.5`).
    ///
    /// # Panics
    ///
    /// This method will panic if `value` is outside `[0, 1]`.
    pub fn with_loser_fraction(mut self, value: Float) -> Self {
        assert!((0.0..=1.0).contains(&value));
        self.loser_rate = value;
        self
    }
    /// Sets the method used to sample the initial habitats
    /// (default = [`PositionInit::Uniform`]).
    pub fn with_position_init(mut self, value: PositionInit) -> Self {
        self.swarm.set_position_init(value);
        self
    }
    fn migrate(&mut self, rates: &[MigrationRates]) {
        let dimension = self.swarm.bounds().dimension();
        for k in 0..self.swarm.individuals.len() {
            if self.rng.float() >= self.p_mod {
                continue;
            }
            let mut touched = false;
            for d in 0..dimension {
                if self.rng.float() < rates[k].immigration {
                    let draw = self.rng.float();
                    let source = roulette_pick(rates, draw);
                    let value = self.swarm.individuals[source].position.x[d];
                    self.swarm.individuals[k].position.x[d] = value;
                    touched = true;
                }
            }
            if touched {
                self.swarm.individuals[k].position.invalidate();
            }
        }
    }
    fn mutate(&mut self) {
        // worst-first, so the losers are the leading habitats
        self.swarm
            .individuals
            .sort_by(|a, b| b.position.total_cmp(&a.position));
        let n_losers =
            (self.swarm.individuals.len() as Float * self.loser_rate).ceil() as usize;
        let limits = self.swarm.bounds().limits();
        for habitat in self.swarm.individuals.iter_mut().take(n_losers) {
            let mut touched = false;
            for (d, &(lower, upper)) in limits.iter().enumerate() {
                if self.rng.float() < self.mutation_rate {
                    habitat.position.x[d] = self.rng.range(lower, upper);
                    touched = true;
                }
            }
            if touched {
                habitat.position.invalidate();
            }
        }
    }
    fn evaluate_population(&mut self) -> Result<(), E> {
        for habitat in &mut self.swarm.individuals {
            habitat.position.evaluate(&*self.func)?;
            habitat.update_best();
        }
        Ok(())
    }
}

impl<E, A: Clone> Optimizer<E, A> for BBO<E, A> {
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
        self.swarm
            .individuals
            .sort_by(|a, b| a.position.total_cmp(&b.position));
        let fitnesses = self
            .swarm
            .individuals
            .iter()
            .map(|habitat| habitat.position.fx.unwrap_or(Float::INFINITY))
            .collect::<Vec<_>>();
        if let Some(rates) = migration_rates(&fitnesses) {
            self.migrate(&rates);
        } else {
            debug!("fitness range is flat or non-finite, skipping migration");
        }
        self.evaluate_population()?;
        self.mutate();
        self.evaluate_population()?;
        self.swarm.update_gbest_from_positions();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::test_functions::Sphere;
    use crate::Fitness;

    #[test]
    fn test_migration_rates_partition() {
        let rates = migration_rates(&[1.0, 2.0, 4.0]).unwrap();
        assert_eq!(rates[0].immigration, 0.0);
        assert_eq!(rates[2].immigration, 1.0);
        assert_relative_eq!(rates[1].immigration, 1.0 / 3.0);
        assert_eq!(rates[0].emigration, 1.0);
        assert_eq!(rates[2].emigration, 0.0);
        assert_relative_eq!(rates[1].emigration, 2.0 / 3.0);
        // the roulette wheel covers [0, 1) contiguously in population order
        assert_eq!(rates[0].e_min, 0.0);
        assert_eq!(rates[0].e_max, rates[1].e_min);
        assert_eq!(rates[1].e_max, rates[2].e_min);
        assert_eq!(rates[2].e_max, 1.0);
        assert_relative_eq!(rates[0].e_max, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_migration_rates_degenerate_inputs() {
        assert!(migration_rates(&[]).is_none());
        assert!(migration_rates(&[3.0]).is_none());
        assert!(migration_rates(&[2.0; 4]).is_none());
        assert!(migration_rates(&[0.0, Float::INFINITY]).is_none());
    }

    #[test]
    fn test_roulette_pick_lands_in_interval() {
        let rates = migration_rates(&[1.0, 2.0, 4.0]).unwrap();
        assert_eq!(roulette_pick(&rates, 0.0), 0);
        assert_eq!(roulette_pick(&rates, 0.59), 0);
        assert_eq!(roulette_pick(&rates, 0.61), 1);
        assert_eq!(roulette_pick(&rates, 0.999), 1);
        // the last habitat emigrates at rate zero, so its interval is empty
        assert_eq!(rates[2].e_min, rates[2].e_max);
    }

    #[test]
    fn test_flat_fitness_leaves_population_untouched() {
        let func = |_x: &[Float]| -> Result<Fitness, Infallible> { Ok(1.0.into()) };
        let mut bbo = BBO::new(
            Bounds::new(vec![-5.0; 3], vec![5.0; 3]).unwrap(),
            func,
            Rng::with_seed(0),
        )
        .with_population_size(5)
        .with_mutation_probability(0.0);
        bbo.step(0).unwrap();
        let initial = bbo
            .swarm()
            .individuals
            .iter()
            .map(|habitat| habitat.position.x.clone())
            .collect::<Vec<_>>();
        let report = bbo.step(3).unwrap();
        assert_eq!(report.fx, 1.0);
        for (habitat, start) in bbo.swarm().individuals.iter().zip(&initial) {
            assert_eq!(&habitat.position.x, start);
        }
    }

    #[test]
    fn test_flat_fitness_still_mutates() {
        let func = |_x: &[Float]| -> Result<Fitness, Infallible> { Ok(1.0.into()) };
        let mut bbo = BBO::new(
            Bounds::new(vec![-5.0; 3], vec![5.0; 3]).unwrap(),
            func,
            Rng::with_seed(0),
        )
        .with_population_size(5)
        .with_mutation_probability(1.0);
        bbo.step(0).unwrap();
        let initial = bbo
            .swarm()
            .individuals
            .iter()
            .map(|habitat| habitat.position.x.clone())
            .collect::<Vec<_>>();
        let report = bbo.step(1).unwrap();
        // migration is skipped on a flat landscape, but the worst habitats still resample
        assert!(bbo
            .swarm()
            .individuals
            .iter()
            .zip(&initial)
            .any(|(habitat, start)| &habitat.position.x != start));
        assert_eq!(report.fx, 1.0);
    }

    #[test]
    fn test_best_is_non_increasing_and_improves() {
        let mut bbo = BBO::new(
            Bounds::new(vec![-5.12, -5.12], vec![5.12, 5.12]).unwrap(),
            Sphere { n: 2 },
            Rng::with_seed(5),
        );
        let initial = bbo.step(0).unwrap().fx;
        let mut last = initial;
        for _ in 0..20 {
            let report = bbo.step(10).unwrap();
            assert!(report.fx <= last);
            last = report.fx;
        }
        assert!(last <= initial);
        assert!(last < 5.0, "stalled at {last}");
    }

    #[test]
    fn test_population_stays_inside_bounds() {
        let bounds = Bounds::new(vec![-1.0, 100.0], vec![1.0, 200.0]).unwrap();
        let mut bbo = BBO::new(bounds.clone(), Sphere { n: 2 }, Rng::with_seed(2));
        bbo.step(30).unwrap();
        for habitat in &bbo.swarm().individuals {
            assert!(bounds.contains(&habitat.position.x));
        }
    }

    #[test]
    #[should_panic]
    fn test_modification_probability_out_of_range_panics() {
        let _ = BBO::new(
            Bounds::new(vec![0.0], vec![1.0]).unwrap(),
            Sphere { n: 1 },
            Rng::with_seed(0),
        )
        .with_modification_probability(1.5);
    }
}
