use crate::error::LagTimesError;

use ndarray::{Array1, ArrayView1};
use serde::Serialize;
use std::ops::Deref;

/// Lag-time axis of a correlation curve
///
/// Underlying array is guaranteed to be non-empty, contiguous, finite, non-negative and
/// non-decreasing. Zero lag is allowed.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LagTimes(Array1<f64>);

impl LagTimes {
    pub fn new(tau: impl Into<Array1<f64>>) -> Result<Self, LagTimesError> {
        let tau = tau.into();
        let slice = tau.as_slice().ok_or(LagTimesError::NonContiguous)?;
        if slice.is_empty() {
            return Err(LagTimesError::Empty);
        }
        if !slice.iter().all(|x| x.is_finite()) {
            return Err(LagTimesError::NonFinite);
        }
        if slice.iter().any(|&x| x < 0.0) {
            return Err(LagTimesError::Negative);
        }
        if !slice.is_sorted() {
            return Err(LagTimesError::Unsorted);
        }
        Ok(Self(tau))
    }

    /// Logarithmically spaced axis from `start` to `stop` inclusive
    ///
    /// This is the axis used to display a model curve when there is no measured data.
    pub fn logspace(start: f64, stop: f64, n: usize) -> Result<Self, LagTimesError> {
        if n == 0 {
            return Err(LagTimesError::Empty);
        }
        if !(start > 0.0 && stop > 0.0) {
            return Err(LagTimesError::Negative);
        }
        Self::new(Array1::logspace(10.0, start.log10(), stop.log10(), n))
    }

    pub fn as_slice(&self) -> &[f64] {
        // Contiguity is checked in the constructor
        self.0.as_slice().unwrap_or_default()
    }

    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.0.view()
    }

    pub fn minimum(&self) -> f64 {
        self.0[0]
    }

    pub fn maximum(&self) -> f64 {
        self.0[self.0.len() - 1]
    }

    pub fn into_inner(self) -> Array1<f64> {
        self.0
    }
}

impl Deref for LagTimes {
    type Target = Array1<f64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<Vec<f64>> for LagTimes {
    type Error = LagTimesError;

    fn try_from(v: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(v)
    }
}

impl TryFrom<&[f64]> for LagTimes {
    type Error = LagTimesError;

    fn try_from(v: &[f64]) -> Result<Self, Self::Error> {
        Self::new(Array1::from(v.to_vec()))
    }
}
