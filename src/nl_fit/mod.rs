//! Weighted least-squares fitting of correlation models to measured curves
//!
//! # Overview
//!
//! A fit is described by three pieces:
//!
//! - [FitData]: lag times, measured correlation values and weights `1 / σ`.
//! - [FitProblem]: the model, an initial full parameter vector and the selection of free
//!   parameters. Fixed parameters are never touched by the optimizer.
//! - [CurveFitAlgorithm]: the optimizer and its settings, configurable with serde.
//!
//! # Parameter spaces
//!
//! Models are evaluated on full parameter vectors in internal units. The optimizer sees only
//! the free parameters, divided by the magnitude of their initial values so that all of them are
//! of order unity:
//!
//! ```text
//! optimizer ←→ free values ←→ full vector
//!          × scale    expand + domain projection
//! ```
//!
//! The domain projection is the same as [crate::ModelDefinition::verify], so the model never
//! sees a parameter vector outside of its domains, whatever the optimizer proposes.
//!
//! # Curve fit algorithms
//!
//! - [CobylaCurveFit]: derivative-free COBYLA, domains are passed as bounds.

pub mod cobyla;
pub use cobyla::CobylaCurveFit;

pub mod curve_fit;
pub use curve_fit::{CurveFitAlgorithm, CurveFitResult, CurveFitTrait};

pub mod data;
pub use data::FitData;

pub mod problem;
pub use problem::FitProblem;
