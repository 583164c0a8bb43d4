use crate::error::FitError;
use crate::nl_fit::curve_fit::{CurveFitAlgorithm, CurveFitResult, CurveFitTrait};
use crate::nl_fit::data::FitData;
use crate::nl_fit::problem::FitProblem;

use cobyla::{Func, RhoBeg, StopTols, minimize};
use ordered_float::NotNan;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// COBYLA (Constrained Optimization BY Linear Approximations) weighted least-squares wrapper
///
/// COBYLA is derivative-free, so any registered model can be fitted without analytic
/// derivatives. Parameter domains are passed to the optimizer as bounds. The optimizer works on
/// free parameters divided by the magnitude of their initial values, so `rhobeg` is a relative
/// step for every parameter regardless of its unit.
///
/// Optionally, if `fine_tuning_algorithm` is `Some`, the best COBYLA guess is used as the initial
/// guess of the next optimization, whose result is returned.
///
/// The algorithm is described in M.J.D. Powell's 1994 paper "A direct search optimization method
/// that models the objective and constraint functions by linear interpolation".
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename = "Cobyla")]
pub struct CobylaCurveFit {
    pub niterations: u32,
    pub rhobeg: NotNan<f64>,
    pub ftol_rel: NotNan<f64>,
    pub fine_tuning_algorithm: Option<Box<CurveFitAlgorithm>>,
}

impl CobylaCurveFit {
    /// Create a new [CobylaCurveFit].
    ///
    /// # Arguments
    /// - `niterations`: maximum number of objective evaluations
    /// - `rhobeg`: initial relative change of the free parameters
    /// - `ftol_rel`: relative tolerance on chi² for convergence
    /// - `fine_tuning_algorithm`: optional algorithm to refine COBYLA's result
    pub fn new(
        niterations: u32,
        rhobeg: f64,
        ftol_rel: f64,
        fine_tuning_algorithm: Option<CurveFitAlgorithm>,
    ) -> Self {
        assert!(niterations > 0, "niterations must be positive");
        assert!(rhobeg > 0.0, "rhobeg must be positive");
        assert!(rhobeg.is_finite(), "rhobeg must be finite");
        assert!(ftol_rel >= 0.0, "ftol_rel must be non-negative");
        assert!(ftol_rel.is_finite(), "ftol_rel must be finite");
        Self {
            niterations,
            rhobeg: NotNan::new(rhobeg).expect("rhobeg must be finite and not NaN"),
            ftol_rel: NotNan::new(ftol_rel).expect("ftol_rel must be finite and not NaN"),
            fine_tuning_algorithm: fine_tuning_algorithm.map(|x| x.into()),
        }
    }

    #[inline]
    pub fn default_niterations() -> u32 {
        2000
    }

    #[inline]
    pub fn default_rhobeg() -> f64 {
        0.5
    }

    #[inline]
    pub fn default_ftol_rel() -> f64 {
        1e-8
    }

    #[inline]
    pub fn default_fine_tuning_algorithm() -> Option<CurveFitAlgorithm> {
        None
    }
}

impl Default for CobylaCurveFit {
    fn default() -> Self {
        Self::new(
            Self::default_niterations(),
            Self::default_rhobeg(),
            Self::default_ftol_rel(),
            Self::default_fine_tuning_algorithm(),
        )
    }
}

/// Reusable per-fit storage for the objective
#[derive(Clone, Default)]
struct Workspace {
    free: Vec<f64>,
    params: Vec<f64>,
}

fn scale_of(x: f64) -> f64 {
    if x.is_normal() { x.abs() } else { 1.0 }
}

impl CurveFitTrait for CobylaCurveFit {
    fn curve_fit(
        &self,
        problem: &FitProblem,
        data: Arc<FitData>,
    ) -> Result<CurveFitResult, FitError> {
        problem.check_data(&data)?;
        let nsamples = data.len();
        let nfree = problem.free_count();

        let scales: Vec<f64> = problem.initial_free().into_iter().map(scale_of).collect();
        let x0: Vec<f64> = problem
            .initial_free()
            .iter()
            .zip(&scales)
            .map(|(x, s)| x / s)
            .collect();
        let bounds: Vec<(f64, f64)> = problem
            .bounds()
            .into_iter()
            .zip(&scales)
            .map(|((lower, upper), s)| (lower / s, upper / s))
            .collect();

        let objective = {
            let problem = problem.clone();
            let data = data.clone();
            let scales = scales.clone();
            move |x: &[f64], workspace: &mut Workspace| -> f64 {
                workspace.free.clear();
                workspace
                    .free
                    .extend(x.iter().zip(&scales).map(|(x, s)| x * s));
                problem.chi2_with_buffer(&data, &workspace.free, &mut workspace.params)
            }
        };

        // Bounds are the only constraints
        let constraints: Vec<&dyn Func<Workspace>> = vec![];

        let stop_tol = StopTols {
            ftol_rel: self.ftol_rel.into(),
            ..StopTols::default()
        };

        let (x, chi2, success) = match minimize(
            objective,
            &x0,
            &bounds,
            &constraints,
            Workspace::default(),
            self.niterations as usize,
            RhoBeg::All(self.rhobeg.into()),
            Some(stop_tol),
        ) {
            Ok((status, x, chi2)) => {
                let success = matches!(
                    status,
                    cobyla::SuccessStatus::Success
                        | cobyla::SuccessStatus::FtolReached
                        | cobyla::SuccessStatus::XtolReached
                );
                if !success {
                    log::warn!(
                        "COBYLA fit of model {} stopped with {:?}",
                        problem.model().id(),
                        status
                    );
                }
                (x, chi2, success)
            }
            Err((status, x, chi2)) => {
                log::warn!(
                    "COBYLA fit of model {} failed with {:?}",
                    problem.model().id(),
                    status
                );
                (x, chi2, false)
            }
        };

        let free: Vec<f64> = x.iter().zip(&scales).map(|(x, s)| x * s).collect();
        let result = CurveFitResult {
            params: problem.expand(&free)?,
            chi2,
            reduced_chi2: chi2 / ((nsamples - nfree) as f64),
            success,
        };
        log::debug!(
            "COBYLA fit of model {}: reduced chi2 = {}, success = {}",
            problem.model().id(),
            result.reduced_chi2,
            result.success
        );

        match &self.fine_tuning_algorithm {
            Some(fine_tuning_algorithm) => {
                fine_tuning_algorithm.curve_fit(&problem.restart_from(&result.params)?, data)
            }
            None => Ok(result),
        }
    }
}
