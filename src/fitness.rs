use std::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::Float;

/// The outcome of a single fitness evaluation: the scalar value being minimized plus any
/// auxiliary data the fitness function wants carried along with it.
///
/// The optimizers never interpret `aux`; whatever was reported at the best position found so
/// far is forwarded verbatim in [`StepReport`](crate::StepReport). Scalar-only problems can
/// use the [`From<Float>`](Self::from) conversion and leave `A` at its default of `()`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Fitness<A = ()> {
    /// The value being minimized.
    pub value: Float,
    /// Auxiliary data describing how `value` came about.
    pub aux: A,
}

impl<A> Fitness<A> {
    /// Bundle a fitness value with its auxiliary data.
    pub fn new(value: Float, aux: A) -> Self {
        Self { value, aux }
    }
}

impl From<Float> for Fitness {
    fn from(value: Float) -> Self {
        Self { value, aux: () }
    }
}

/// A function $`f(\mathbb{R}^n) \to \mathbb{R}`$ to be minimized over a bounded region.
///
/// The generic `E` is the error type a fallible evaluation may return (use the default
/// [`std::convert::Infallible`] if evaluation never fails), and `A` is the type of auxiliary
/// data attached to each evaluation. Any context the function needs should be captured in the
/// implementing struct or closure; the optimizers only ever supply a position slice.
///
/// A blanket implementation covers plain closures:
///
/// ```rust
/// use std::convert::Infallible;
/// use feint::{Fitness, FitnessFunction, Float};
///
/// let f = |x: &[Float]| -> Result<Fitness, Infallible> {
///     Ok(x.iter().map(|xi| xi * xi).sum::<Float>().into())
/// };
/// assert_eq!(f.evaluate(&[3.0, 4.0]).unwrap().value, 25.0);
/// ```
pub trait FitnessFunction<E = Infallible, A = ()> {
    /// The evaluation of the function at the position `x`.
    ///
    /// # Errors
    ///
    /// Returns an `Err(E)` if the evaluation fails. Implementors should use
    /// [`std::convert::Infallible`] if the function evaluation never fails.
    fn evaluate(&self, x: &[Float]) -> Result<Fitness<A>, E>;
}

impl<F, E, A> FitnessFunction<E, A> for F
where
    F: Fn(&[Float]) -> Result<Fitness<A>, E>,
{
    fn evaluate(&self, x: &[Float]) -> Result<Fitness<A>, E> {
        self(x)
    }
}
