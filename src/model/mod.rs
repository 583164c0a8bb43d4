//! Model definition record and the evaluation contract shared by every correlation model
//!
//! A model is plain data: an identifier, labels, a parameter schema and function pointers.
//! [ModelDefinition] checks the length of the parameter vector once and then calls the
//! model's function for every lag time, so the model functions index parameters directly.

mod parameter;
pub use parameter::{POSITIVE_FLOOR, ParameterDescriptor, ParameterDomain, TRIPLET_CEILING};

use crate::error::ModelError;
use crate::lag_times::LagTimes;

use ndarray::Array1;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Correlation function of a single lag time, parameters are in internal units
pub type CorrelationFn = fn(&[f64], f64) -> f64;

/// Derived quantities from a parameter vector and an optional measured count rate
pub type SupplementsFn = fn(&[f64], Option<f64>) -> Vec<Supplement>;

/// Stable model identifier
///
/// Identifiers are stored in saved sessions together with parameter vectors, so an identifier
/// is never reassigned to a model with a different parameter schema.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ModelId(pub u32);

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ModelId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Display-only quantity derived from fit parameters
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct Supplement {
    pub label: &'static str,
    pub value: f64,
}

impl Supplement {
    pub const fn new(label: &'static str, value: f64) -> Self {
        Self { label, value }
    }
}

/// Counts per particle, present only when both the count rate and a positive particle number
/// are known
pub(crate) fn counts_per_particle(count_rate: Option<f64>, n: f64) -> Option<Supplement> {
    match count_rate {
        Some(rate) if n > 0.0 && n.is_finite() => Some(Supplement::new("cpp [kHz]", rate / n)),
        _ => None,
    }
}

/// Immutable correlation model definition
#[derive(Clone, Copy, Debug)]
pub struct ModelDefinition {
    id: ModelId,
    category: &'static str,
    name: &'static str,
    description: &'static str,
    parameters: &'static [ParameterDescriptor],
    correlation: CorrelationFn,
    supplements: Option<SupplementsFn>,
}

impl ModelDefinition {
    pub const fn new(
        id: u32,
        category: &'static str,
        name: &'static str,
        description: &'static str,
        parameters: &'static [ParameterDescriptor],
        correlation: CorrelationFn,
    ) -> Self {
        Self {
            id: ModelId(id),
            category,
            name,
            description,
            parameters,
            correlation,
            supplements: None,
        }
    }

    pub const fn with_supplements(mut self, supplements: SupplementsFn) -> Self {
        self.supplements = Some(supplements);
        self
    }

    #[inline]
    pub fn id(&self) -> ModelId {
        self.id
    }

    #[inline]
    pub fn category(&self) -> &'static str {
        self.category
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn description(&self) -> &'static str {
        self.description
    }

    #[inline]
    pub fn parameters(&self) -> &'static [ParameterDescriptor] {
        self.parameters
    }

    #[inline]
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.parameters.iter().map(|p| p.label).collect()
    }

    pub fn human_labels(&self) -> Vec<&'static str> {
        self.parameters.iter().map(|p| p.human_label).collect()
    }

    pub fn default_values(&self) -> Vec<f64> {
        self.parameters.iter().map(|p| p.default).collect()
    }

    pub fn free_flags(&self) -> Vec<bool> {
        self.parameters.iter().map(|p| p.free).collect()
    }

    pub fn has_supplements(&self) -> bool {
        self.supplements.is_some()
    }

    fn check_count(&self, actual: usize) -> Result<(), ModelError> {
        let expected = self.parameter_count();
        if actual == expected {
            Ok(())
        } else {
            Err(ModelError::InvalidParameterCount { expected, actual })
        }
    }

    /// Correlation curve on the lag-time axis
    ///
    /// The result has the same length as `tau` and is finite whenever `params` is a fixed
    /// point of [ModelDefinition::verify].
    pub fn evaluate(&self, params: &[f64], tau: &LagTimes) -> Result<Array1<f64>, ModelError> {
        self.check_count(params.len())?;
        Ok(tau.mapv(|t| (self.correlation)(params, t)))
    }

    /// Writes the correlation curve into `out`, avoiding an allocation in fitting loops
    ///
    /// # Errors
    /// [ModelError::OutputLengthMismatch] if `out` and `tau` have different lengths, `out` is
    /// left untouched then.
    pub fn evaluate_into(
        &self,
        params: &[f64],
        tau: &LagTimes,
        out: &mut [f64],
    ) -> Result<(), ModelError> {
        self.check_count(params.len())?;
        if out.len() != tau.len() {
            return Err(ModelError::OutputLengthMismatch {
                expected: tau.len(),
                actual: out.len(),
            });
        }
        for (y, &t) in out.iter_mut().zip(tau.iter()) {
            *y = (self.correlation)(params, t);
        }
        Ok(())
    }

    /// Derived quantities, count-rate dependent entries are omitted when `count_rate` is `None`
    pub fn supplements(
        &self,
        params: &[f64],
        count_rate: Option<f64>,
    ) -> Result<Vec<Supplement>, ModelError> {
        self.check_count(params.len())?;
        Ok(self
            .supplements
            .map(|f| f(params, count_rate))
            .unwrap_or_default())
    }

    /// Projects a trial parameter vector onto the model's valid domain
    ///
    /// The projection is applied per parameter, see [ParameterDomain::project], it never fails
    /// on numerical grounds and `verify(verify(p)) == verify(p)`.
    pub fn verify(&self, params: &[f64]) -> Result<Vec<f64>, ModelError> {
        let mut projected = params.to_vec();
        self.verify_in_place(&mut projected)?;
        Ok(projected)
    }

    pub fn verify_in_place(&self, params: &mut [f64]) -> Result<(), ModelError> {
        self.check_count(params.len())?;
        for (x, descriptor) in params.iter_mut().zip(self.parameters) {
            *x = descriptor.domain.project(*x);
        }
        Ok(())
    }

    /// Converts internal-unit parameters to display units
    pub fn to_human(&self, params: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.check_count(params.len())?;
        Ok(params
            .iter()
            .zip(self.parameters)
            .map(|(&x, descriptor)| descriptor.to_human(x))
            .collect())
    }

    /// Converts display-unit values back to internal units
    pub fn from_human(&self, values: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.check_count(values.len())?;
        Ok(values
            .iter()
            .zip(self.parameters)
            .map(|(&x, descriptor)| descriptor.from_human(x))
            .collect())
    }

    /// Single-point evaluation for supplements, the caller has checked the parameter count
    pub(crate) fn correlation_at(&self, params: &[f64], tau: f64) -> f64 {
        (self.correlation)(params, tau)
    }

    /// Checks the schema of the definition, called on registration
    pub(crate) fn validate(&self) -> Result<(), ModelError> {
        let invalid = |reason: String| ModelError::InvalidDefinition {
            id: self.id,
            reason,
        };
        if self.parameters.is_empty() {
            return Err(invalid("parameter schema is empty".into()));
        }
        for descriptor in self.parameters {
            if !descriptor.human_factor.is_normal() {
                return Err(invalid(format!(
                    "conversion factor of {} must be a non-zero normal number",
                    descriptor.label
                )));
            }
            if !descriptor.domain.contains(descriptor.default) {
                return Err(invalid(format!(
                    "default value {} of {} is outside of its domain",
                    descriptor.default, descriptor.label
                )));
            }
        }
        Ok(())
    }
}
