use crate::error::FitError;
use crate::model::ModelDefinition;
use crate::nl_fit::data::FitData;

use itertools::Itertools;
use ndarray::Zip;

/// Model with an initial parameter vector and a selection of parameters to fit
///
/// The optimizer sees only the free parameters. Fixed parameters keep their initial values, and
/// every full vector built from optimizer output is projected onto the parameter domains, so the
/// model is never evaluated outside of them.
#[derive(Clone, Debug)]
pub struct FitProblem {
    model: ModelDefinition,
    initial: Vec<f64>,
    free_indices: Vec<usize>,
}

impl FitProblem {
    pub fn new(model: ModelDefinition, initial: &[f64], free: &[bool]) -> Result<Self, FitError> {
        let initial = model.verify(initial)?;
        if free.len() != initial.len() {
            return Err(FitError::LengthMismatch {
                what: "free parameter flags",
                expected: initial.len(),
                actual: free.len(),
            });
        }
        let free_indices: Vec<_> = free.iter().positions(|&is_free| is_free).collect();
        if free_indices.is_empty() {
            return Err(FitError::NoFreeParameters);
        }
        Ok(Self {
            model,
            initial,
            free_indices,
        })
    }

    /// Problem starting from the model defaults with the default free flags
    pub fn from_defaults(model: ModelDefinition) -> Result<Self, FitError> {
        Self::new(model, &model.default_values(), &model.free_flags())
    }

    /// Same selection of free parameters starting from another full parameter vector
    pub fn restart_from(&self, params: &[f64]) -> Result<Self, FitError> {
        Ok(Self {
            model: self.model,
            initial: self.model.verify(params)?,
            free_indices: self.free_indices.clone(),
        })
    }

    pub fn model(&self) -> &ModelDefinition {
        &self.model
    }

    /// Verified initial full parameter vector
    pub fn initial(&self) -> &[f64] {
        &self.initial
    }

    pub fn free_indices(&self) -> &[usize] {
        &self.free_indices
    }

    pub fn free_count(&self) -> usize {
        self.free_indices.len()
    }

    /// Initial values of the free parameters
    pub fn initial_free(&self) -> Vec<f64> {
        self.free_indices.iter().map(|&i| self.initial[i]).collect()
    }

    /// Full verified parameter vector with the free parameters replaced by `free_values`
    pub fn expand(&self, free_values: &[f64]) -> Result<Vec<f64>, FitError> {
        if free_values.len() != self.free_count() {
            return Err(FitError::LengthMismatch {
                what: "free parameter vector",
                expected: self.free_count(),
                actual: free_values.len(),
            });
        }
        let mut params = self.initial.clone();
        self.fill(free_values, &mut params);
        Ok(params)
    }

    fn fill(&self, free_values: &[f64], params: &mut [f64]) {
        let descriptors = self.model.parameters();
        for (&i, &x) in self.free_indices.iter().zip(free_values) {
            params[i] = descriptors[i].domain.project(x);
        }
    }

    /// Lower and upper bounds of the free parameters taken from their domains
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        let descriptors = self.model.parameters();
        self.free_indices
            .iter()
            .map(|&i| descriptors[i].domain.bounds())
            .collect()
    }

    /// Weighted sum of squared residuals
    pub fn chi2(&self, data: &FitData, free_values: &[f64]) -> Result<f64, FitError> {
        let params = self.expand(free_values)?;
        Ok(self.chi2_full(data, &params))
    }

    pub(super) fn chi2_with_buffer(
        &self,
        data: &FitData,
        free_values: &[f64],
        params: &mut Vec<f64>,
    ) -> f64 {
        params.clear();
        params.extend_from_slice(&self.initial);
        self.fill(free_values, params);
        self.chi2_full(data, params)
    }

    fn chi2_full(&self, data: &FitData, params: &[f64]) -> f64 {
        let mut chi2 = 0.0;
        Zip::from(data.tau.view())
            .and(&data.g)
            .and(&data.inv_err)
            .for_each(|&tau, &g, &inv_err| {
                let residual = (self.model.correlation_at(params, tau) - g) * inv_err;
                chi2 += residual * residual;
            });
        chi2
    }

    /// Fails if there are not more data points than free parameters
    pub(super) fn check_data(&self, data: &FitData) -> Result<(), FitError> {
        if data.len() <= self.free_count() {
            return Err(FitError::NotEnoughData {
                points: data.len(),
                free: self.free_count(),
            });
        }
        Ok(())
    }
}
