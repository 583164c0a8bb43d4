use crate::error::FitError;
use crate::lag_times::LagTimes;

use ndarray::Array1;

/// Measured correlation curve prepared for weighted least squares
///
/// `inv_err` holds the weights `1 / σ`, it is filled with ones for unweighted data.
#[derive(Clone, Debug)]
pub struct FitData {
    pub tau: LagTimes,
    pub g: Array1<f64>,
    pub inv_err: Array1<f64>,
}

impl FitData {
    pub fn new(
        tau: LagTimes,
        g: impl Into<Array1<f64>>,
        sigma: Option<Array1<f64>>,
    ) -> Result<Self, FitError> {
        let g = g.into();
        if g.len() != tau.len() {
            return Err(FitError::LengthMismatch {
                what: "correlation curve",
                expected: tau.len(),
                actual: g.len(),
            });
        }
        if !g.iter().all(|x| x.is_finite()) {
            return Err(FitError::NonFiniteData);
        }
        let inv_err = match sigma {
            Some(sigma) => {
                if sigma.len() != tau.len() {
                    return Err(FitError::LengthMismatch {
                        what: "uncertainty array",
                        expected: tau.len(),
                        actual: sigma.len(),
                    });
                }
                if !sigma.iter().all(|&s| s > 0.0 && s.is_finite()) {
                    return Err(FitError::InvalidSigma);
                }
                sigma.mapv_into(f64::recip)
            }
            None => Array1::ones(tau.len()),
        };
        Ok(Self { tau, g, inv_err })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tau.len()
    }

    /// Always false, [LagTimes] are never empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tau.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    fn tau() -> LagTimes {
        LagTimes::new(vec![0.0, 1.0, 2.0]).unwrap()
    }

    #[test]
    fn unweighted() {
        let data = FitData::new(tau(), vec![1.0, 0.5, 0.25], None).unwrap();
        assert_eq!(data.inv_err, array![1.0, 1.0, 1.0]);
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn weights_are_inverse_sigma() {
        let data = FitData::new(tau(), vec![1.0, 0.5, 0.25], Some(array![0.5, 0.25, 2.0])).unwrap();
        assert_eq!(data.inv_err, array![2.0, 4.0, 0.5]);
    }

    #[test]
    fn rejects_malformed_data() {
        assert_eq!(
            FitData::new(tau(), vec![1.0, 0.5], None).unwrap_err(),
            FitError::LengthMismatch {
                what: "correlation curve",
                expected: 3,
                actual: 2
            }
        );
        assert_eq!(
            FitData::new(tau(), vec![1.0, f64::NAN, 0.0], None).unwrap_err(),
            FitError::NonFiniteData
        );
        assert_eq!(
            FitData::new(tau(), vec![1.0, 0.5, 0.0], Some(array![1.0, 0.0, 1.0])).unwrap_err(),
            FitError::InvalidSigma
        );
        assert_eq!(
            FitData::new(tau(), vec![1.0, 0.5, 0.0], Some(array![1.0])).unwrap_err(),
            FitError::LengthMismatch {
                what: "uncertainty array",
                expected: 3,
                actual: 1
            }
        );
    }
}
