use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Smallest value a strictly positive parameter is projected to
///
/// Keeps diffusion times, particle numbers and lengths away from zero, where the correlation
/// functions divide by them.
pub const POSITIVE_FLOOR: f64 = 1e-12;

/// Largest triplet fraction, `T / (1 - T)` stays finite below it
pub const TRIPLET_CEILING: f64 = 1.0 - 1e-6;

/// Valid values of a single model parameter
///
/// [ParameterDomain::project] maps any finite value into the domain and is idempotent.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[non_exhaustive]
pub enum ParameterDomain {
    /// Strictly positive quantity, negative trial values are mirrored, small ones floored
    Positive { min: f64 },
    /// Fraction in `[0, max]`
    Fraction { max: f64 },
    /// Any finite value, e.g. a constant offset
    Unbounded,
}

impl ParameterDomain {
    pub const fn positive() -> Self {
        Self::Positive { min: POSITIVE_FLOOR }
    }

    pub const fn fraction() -> Self {
        Self::Fraction { max: 1.0 }
    }

    pub const fn triplet_fraction() -> Self {
        Self::Fraction {
            max: TRIPLET_CEILING,
        }
    }

    pub fn project(&self, x: f64) -> f64 {
        match *self {
            Self::Positive { min } => x.abs().max(min),
            Self::Fraction { max } => x.abs().min(max),
            Self::Unbounded => x,
        }
    }

    pub fn contains(&self, x: f64) -> bool {
        let (lower, upper) = self.bounds();
        x.is_finite() && (lower..=upper).contains(&x)
    }

    /// Closed interval of the domain, infinite ends are unbounded
    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            Self::Positive { min } => (min, f64::INFINITY),
            Self::Fraction { max } => (0.0, max),
            Self::Unbounded => (f64::NEG_INFINITY, f64::INFINITY),
        }
    }
}

/// Description of a single fit parameter
///
/// `label` names the parameter in the internal unit system the model functions work in,
/// `human_label` names it in display units: `human = internal * human_factor`.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct ParameterDescriptor {
    pub label: &'static str,
    pub default: f64,
    pub free: bool,
    pub human_label: &'static str,
    pub human_factor: f64,
    pub domain: ParameterDomain,
}

impl ParameterDescriptor {
    pub const fn new(
        label: &'static str,
        default: f64,
        free: bool,
        human_label: &'static str,
        human_factor: f64,
        domain: ParameterDomain,
    ) -> Self {
        Self {
            label,
            default,
            free,
            human_label,
            human_factor,
            domain,
        }
    }

    /// Dimensionless parameter shown the same way it is stored
    pub const fn plain(
        label: &'static str,
        default: f64,
        free: bool,
        domain: ParameterDomain,
    ) -> Self {
        Self::new(label, default, free, label, 1.0, domain)
    }

    #[inline]
    pub fn to_human(&self, internal: f64) -> f64 {
        internal * self.human_factor
    }

    #[inline]
    pub fn from_human(&self, human: f64) -> f64 {
        human / self.human_factor
    }
}
