use fastrand::Rng;
use serde::{Deserialize, Serialize};

use crate::{ConfigurationError, DVector, Float, SampleFloat};

/// A rectangular search region: one `[lower, upper]` interval per dimension.
///
/// Construction through [`Bounds::new`] validates the region up front, so every value of this
/// type is well formed and the optimizers never re-check it. The dimension of the region fixes
/// the dimension of the whole optimization problem.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    lower: DVector<Float>,
    upper: DVector<Float>,
}

impl Bounds {
    /// Construct a validated search region from per-dimension lower and upper limits.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the two vectors differ in length, if they are
    /// empty, if any limit is not finite, or if any lower limit exceeds its upper limit.
    pub fn new(
        lower: impl Into<DVector<Float>>,
        upper: impl Into<DVector<Float>>,
    ) -> Result<Self, ConfigurationError> {
        let lower = lower.into();
        let upper = upper.into();
        if lower.len() != upper.len() {
            return Err(ConfigurationError::LengthMismatch {
                lower: lower.len(),
                upper: upper.len(),
            });
        }
        if lower.is_empty() {
            return Err(ConfigurationError::EmptyBounds);
        }
        if let Some(index) =
            (0..lower.len()).find(|&i| !lower[i].is_finite() || !upper[i].is_finite())
        {
            return Err(ConfigurationError::NonFiniteBound { index });
        }
        if let Some(index) = (0..lower.len()).find(|&i| lower[i] > upper[i]) {
            return Err(ConfigurationError::InvertedBound {
                index,
                lower: lower[index],
                upper: upper[index],
            });
        }
        Ok(Self { lower, upper })
    }
    /// The number of dimensions of the region.
    pub fn dimension(&self) -> usize {
        self.lower.len()
    }
    /// The per-dimension lower limits.
    pub const fn lower(&self) -> &DVector<Float> {
        &self.lower
    }
    /// The per-dimension upper limits.
    pub const fn upper(&self) -> &DVector<Float> {
        &self.upper
    }
    /// The region as `(lower, upper)` pairs, one per dimension.
    pub fn limits(&self) -> Vec<(Float, Float)> {
        self.lower
            .iter()
            .zip(self.upper.iter())
            .map(|(&lower, &upper)| (lower, upper))
            .collect()
    }
    /// Whether `x` lies inside the region (limits included).
    pub fn contains(&self, x: &DVector<Float>) -> bool {
        x.len() == self.dimension()
            && x.iter()
                .enumerate()
                .all(|(i, &xi)| xi >= self.lower[i] && xi <= self.upper[i])
    }
    /// Clamp every coordinate of `x` into its `[lower, upper]` interval.
    pub fn clamp(&self, x: &mut DVector<Float>) {
        for i in 0..x.len() {
            x[i] = x[i].clamp(self.lower[i], self.upper[i]);
        }
    }
    /// Fold a freshly moved position back into the region.
    ///
    /// Rather than pinning offending coordinates to the limit they crossed, each violation is
    /// replaced with a randomized pullback that keeps some spread near the limit:
    ///
    /// ```math
    /// x_i > u_i \implies x_i \leftarrow u_i (0.7 + 0.3 r), \qquad
    /// x_i < l_i \implies x_i \leftarrow l_i + 0.3 r (u_i - l_i),
    /// ```
    ///
    /// with `r` uniform in `[0, 1)` per violation. A final clamp guarantees the result lies in
    /// the region even where the pullback alone would overshoot a narrow interval.
    pub fn reflect(&self, mut x: DVector<Float>, rng: &mut Rng) -> DVector<Float> {
        for i in 0..x.len() {
            if x[i] > self.upper[i] {
                x[i] = self.upper[i] * (0.7 + 0.3 * rng.float());
            } else if x[i] < self.lower[i] {
                x[i] = self.lower[i] + 0.3 * rng.float() * (self.upper[i] - self.lower[i]);
            }
            x[i] = x[i].clamp(self.lower[i], self.upper[i]);
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dvector;

    #[test]
    fn test_validation() {
        assert!(Bounds::new(vec![0.0, 0.0], vec![10.0, 10.0]).is_ok());
        assert_eq!(
            Bounds::new(Vec::<Float>::new(), Vec::<Float>::new()).unwrap_err(),
            ConfigurationError::EmptyBounds
        );
        assert_eq!(
            Bounds::new(vec![0.0], vec![1.0, 2.0]).unwrap_err(),
            ConfigurationError::LengthMismatch { lower: 1, upper: 2 }
        );
        assert_eq!(
            Bounds::new(vec![0.0, 5.0], vec![10.0, 4.0]).unwrap_err(),
            ConfigurationError::InvertedBound {
                index: 1,
                lower: 5.0,
                upper: 4.0
            }
        );
        assert_eq!(
            Bounds::new(vec![0.0, Float::NAN], vec![1.0, 1.0]).unwrap_err(),
            ConfigurationError::NonFiniteBound { index: 1 }
        );
        assert_eq!(
            Bounds::new(vec![0.0], vec![Float::INFINITY]).unwrap_err(),
            ConfigurationError::NonFiniteBound { index: 0 }
        );
        // degenerate but legal: a dimension pinned to a single value
        assert!(Bounds::new(vec![3.0], vec![3.0]).is_ok());
    }

    #[test]
    fn test_contains_and_clamp() {
        let bounds = Bounds::new(vec![0.0, -1.0], vec![10.0, 1.0]).unwrap();
        assert!(bounds.contains(&dvector![0.0, -1.0]));
        assert!(bounds.contains(&dvector![10.0, 1.0]));
        assert!(!bounds.contains(&dvector![10.1, 0.0]));
        assert!(!bounds.contains(&dvector![5.0]));
        let mut x = dvector![-3.0, 2.0];
        bounds.clamp(&mut x);
        assert_eq!(x, dvector![0.0, 1.0]);
    }

    #[test]
    fn test_reflect_above_upper_limit() {
        let bounds = Bounds::new(vec![0.0], vec![10.0]).unwrap();
        let mut rng = Rng::with_seed(0);
        for _ in 0..100 {
            let reflected = bounds.reflect(dvector![15.0], &mut rng);
            assert!(reflected[0] >= 7.0 && reflected[0] <= 10.0);
        }
    }

    #[test]
    fn test_reflect_below_lower_limit() {
        let bounds = Bounds::new(vec![2.0], vec![10.0]).unwrap();
        let mut rng = Rng::with_seed(0);
        for _ in 0..100 {
            let reflected = bounds.reflect(dvector![-1.0], &mut rng);
            assert!(reflected[0] >= 2.0 && reflected[0] < 4.4 + Float::EPSILON);
        }
    }

    #[test]
    fn test_reflect_clamps_narrow_intervals() {
        // 0.7 * upper falls below the lower limit here, so the pullback alone could escape
        let bounds = Bounds::new(vec![8.0], vec![10.0]).unwrap();
        let mut rng = Rng::with_seed(0);
        for _ in 0..100 {
            let reflected = bounds.reflect(dvector![11.0], &mut rng);
            assert!(bounds.contains(&reflected));
        }
    }

    #[test]
    fn test_reflect_leaves_interior_unchanged() {
        let bounds = Bounds::new(vec![0.0, 0.0], vec![10.0, 10.0]).unwrap();
        let mut rng = Rng::with_seed(0);
        let reflected = bounds.reflect(dvector![3.0, 9.9], &mut rng);
        assert_eq!(reflected, dvector![3.0, 9.9]);
    }

    #[test]
    fn test_limits_round_trip() {
        let bounds = Bounds::new(vec![0.0, -5.0], vec![1.0, 5.0]).unwrap();
        assert_eq!(bounds.limits(), vec![(0.0, 1.0), (-5.0, 5.0)]);
        assert_eq!(bounds.dimension(), 2);
        assert_eq!(bounds.lower(), &dvector![0.0, -5.0]);
        assert_eq!(bounds.upper(), &dvector![1.0, 5.0]);
    }
}
