use crate::error::FitError;
use crate::nl_fit::cobyla::CobylaCurveFit;
use crate::nl_fit::data::FitData;
use crate::nl_fit::problem::FitProblem;

use enum_dispatch::enum_dispatch;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

/// Outcome of a curve fit
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CurveFitResult {
    /// Full verified parameter vector, fixed parameters included
    pub params: Vec<f64>,
    pub chi2: f64,
    /// `chi2 / (N - n_free)`
    pub reduced_chi2: f64,
    pub success: bool,
}

#[enum_dispatch]
pub trait CurveFitTrait: Clone + Debug + Serialize + DeserializeOwned {
    fn curve_fit(
        &self,
        problem: &FitProblem,
        data: Arc<FitData>,
    ) -> Result<CurveFitResult, FitError>;
}

/// Optimization algorithm for [CurveFitTrait::curve_fit]
#[enum_dispatch(CurveFitTrait)]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CurveFitAlgorithm {
    Cobyla(CobylaCurveFit),
}

impl Default for CurveFitAlgorithm {
    fn default() -> Self {
        CobylaCurveFit::default().into()
    }
}
