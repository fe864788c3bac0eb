use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{DVector, FitnessFunction, Float};

/// A position in the search region together with its lazily computed fitness value and the
/// auxiliary data reported alongside it.
///
/// `fx == None` means the position has changed since the last evaluation; every mutation path
/// re-evaluates through [`Point::evaluate`] before the value is read again, so a stale value
/// is never observed.
#[derive(Clone, Default, Debug, Serialize, Deserialize)]
pub struct Point<A = ()> {
    /// the point's position
    pub x: DVector<Float>,
    /// the point's evaluation (`None` if the point has not yet been evaluated)
    pub fx: Option<Float>,
    /// auxiliary data reported by the fitness function at this position, if any
    pub aux: Option<A>,
}

impl<A> Point<A> {
    /// Compare two points by their `fx` value, treating unevaluated points as the worst
    /// possible value.
    pub fn total_cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (&self.fx, &other.fx) {
            (None, None) => std::cmp::Ordering::Equal,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (Some(_), None) => std::cmp::Ordering::Less,
            (Some(s), Some(o)) => s.total_cmp(o),
        }
    }
    /// Move the point to a new position, resetting the evaluation of the point.
    pub fn set_position(&mut self, x: DVector<Float>) {
        self.x = x;
        self.fx = None;
        self.aux = None;
    }
    /// Forget the evaluation after the coordinates were edited in place.
    pub(crate) fn invalidate(&mut self) {
        self.fx = None;
        self.aux = None;
    }
    /// Get the current evaluation of the point, if it has been evaluated.
    ///
    /// # Panics
    ///
    /// This method will panic if the point is unevaluated.
    pub fn fx_checked(&self) -> Float {
        #[allow(clippy::expect_used)]
        self.fx.expect("Point value requested before evaluation")
    }
    /// Evaluate the given fitness function at the point's position, recording the value and
    /// the auxiliary data. Does nothing if the point is already evaluated.
    ///
    /// # Errors
    ///
    /// Returns an `Err(E)` if the evaluation fails. Implementors should use
    /// [`std::convert::Infallible`] if the function evaluation never fails.
    pub fn evaluate<E>(&mut self, func: &dyn FitnessFunction<E, A>) -> Result<(), E> {
        if self.fx.is_none() {
            let fitness = func.evaluate(self.x.as_slice())?;
            self.fx = Some(fitness.value);
            self.aux = Some(fitness.aux);
        }
        Ok(())
    }
}

impl<A> Display for Point<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "x: {:?}, f(x): {:?}", self.x, self.fx)
    }
}

impl<A> From<&[Float]> for Point<A> {
    fn from(value: &[Float]) -> Self {
        Self {
            x: DVector::from_column_slice(value),
            fx: None,
            aux: None,
        }
    }
}
impl<A> From<Vec<Float>> for Point<A> {
    fn from(value: Vec<Float>) -> Self {
        Self {
            x: DVector::from_vec(value),
            fx: None,
            aux: None,
        }
    }
}
impl<A> From<DVector<Float>> for Point<A> {
    fn from(value: DVector<Float>) -> Self {
        Self {
            x: value,
            fx: None,
            aux: None,
        }
    }
}
impl<A> PartialEq for Point<A> {
    fn eq(&self, other: &Self) -> bool {
        self.fx == other.fx
    }
}
impl<A> PartialOrd for Point<A> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.fx.partial_cmp(&other.fx)
    }
}
