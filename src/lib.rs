//! `feint` provides a small family of population-based minimizers behind a single
//! incremental stepping interface: particle swarm optimization ([`PSO`](algorithms::PSO)),
//! biogeography-based optimization ([`BBO`](algorithms::BBO)), and comprehensive learning
//! particle swarm optimization ([`CLPSO`](algorithms::CLPSO)). The user
//! implements the [`FitnessFunction`] trait (any closure of the right shape already does)
//! mapping a position vector to a single-valued [`Result`] ($`f(\mathbb{R}^n) \to
//! \mathbb{R}`$), describes the search region with [`Bounds`], and drives the optimizer
//! through [`step`](algorithms::Optimizer::step) in batches of any size.
//!
//! <div class="warning">
//!
//! This crate is still in an early development phase, and the API is not stable. It can (and
//! likely will) be subject to breaking changes before the 1.0.0 version release.
//!
//! </div>
//!
//! # Table of Contents
//! - [Key Features](#key-features)
//! - [Quick Start](#quick-start)
//! - [Bounds](#bounds)
//! - [Stepping in Batches](#stepping-in-batches)
//!
//! # Key Features
//! * Three interchangeable optimizers behind one [`Optimizer`](algorithms::Optimizer) trait
//!   with sensible defaults for every tuning parameter.
//! * Fitness functions are plain closures or trait implementations returning a [`Result`],
//!   optionally carrying an auxiliary payload alongside every evaluation.
//! * Deterministic runs from seeded [`fastrand::Rng`] generators.
//! * Incremental `step(n)` driving, so a long optimization can share a thread with a UI or
//!   game loop.
//! * An `f32` feature to run the whole crate at single precision.
//!
//! # Quick Start
//!
//! This crate provides some common test functions in the [`test_functions`] module. To
//! minimize the spherical function over a three-dimensional box, we could use the standard
//! particle swarm optimizer:
//!
//! ```rust
//! use fastrand::Rng;
//! use feint::algorithms::{Optimizer, PSO};
//! use feint::test_functions::Sphere;
//! use feint::Bounds;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bounds = Bounds::new(vec![-5.12; 3], vec![5.12; 3])?;
//!     let mut pso = PSO::new(bounds, Sphere { n: 3 }, Rng::with_seed(0))
//!         .with_max_iterations(500);
//!     let best = pso.step(500)?;
//!     println!("f(x) = {:.3e} after {} iterations", best.fx, best.iteration);
//!     Ok(())
//! }
//! ```
//!
//! # Bounds
//! All optimizers in `feint` work on a finite box: [`Bounds::new`] validates the region once,
//! up front (matching lengths, finite limits, `lower <= upper`), so the stepping loop never
//! has to. A particle that leaves the box is not clamped to the edge but reflected back to a
//! random interior depth,
//!
//! ```math
//! x > u:\quad x \to u\,(0.7 + 0.3\,r) \qquad x < \ell:\quad x \to \ell + 0.3\,r\,(u - \ell)
//! ```
//!
//! which keeps the population from piling up on the boundary when the velocity updates
//! repeatedly push it outward.
//!
//! # Stepping in Batches
//! [`step(n)`](algorithms::Optimizer::step) runs `n` whole iterations synchronously and
//! returns a [`StepReport`] snapshot of the best solution found so far. The first call also
//! samples and evaluates the initial population, so construction itself never invokes the
//! fitness function. There is no internal scheduling: a caller that needs to stay responsive
//! (a render loop, a progress bar) simply calls `step` with a small batch size and interleaves
//! its own work between calls. The reported best never gets worse from one batch to the next.
#![warn(
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::doc_markdown,
    clippy::doc_link_with_quotes,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::perf,
    clippy::style,
    missing_docs
)]

/// Module containing the optimization algorithms and the stepping interface
pub mod algorithms;
/// Module containing standard functions for testing algorithms
pub mod test_functions;

mod bounds;
mod error;
mod fitness;
mod point;
mod swarm;
mod utils;

pub use bounds::Bounds;
pub use error::ConfigurationError;
pub use fitness::{Fitness, FitnessFunction};
pub use nalgebra::DVector;
pub use point::Point;
pub use swarm::{Individual, PositionInit, StepReport, Swarm, VelocityInit};
pub use utils::SampleFloat;
pub(crate) use utils::{generate_random_vector, generate_random_vector_in_limits};

/// A floating-point number type (defaults to [`f64`], see `f32` feature).
#[cfg(not(feature = "f32"))]
pub type Float = f64;

/// A floating-point number type (defaults to [`f64`], see `f32` feature).
#[cfg(feature = "f32")]
pub type Float = f32;

/// The mathematical constant $`\pi`$ at the precision of [`Float`].
#[cfg(not(feature = "f32"))]
pub const PI: Float = std::f64::consts::PI;

/// The mathematical constant $`\pi`$ at the precision of [`Float`].
#[cfg(feature = "f32")]
pub const PI: Float = std::f32::consts::PI;
