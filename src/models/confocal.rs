//! Free diffusion through a Gaussian confocal detection volume
//!
//! Parameters use ms for all times. The particle number `n` is the effective number of
//! particles in the detection volume, `SP` is the structural parameter, the ratio of the axial
//! to the lateral extent of the volume.

use crate::model::{
    ModelDefinition, ParameterDescriptor, ParameterDomain, Supplement, counts_per_particle,
};
use crate::models::{lateral_gauss, triplet};

use macro_const::macro_const;

const CATEGORY: &str = "Confocal (Gaussian)";

/// Axial factor of the 3D Gaussian volume
#[inline]
fn axial_gauss(tau: f64, tau_diff: f64, sp: f64) -> f64 {
    (1.0 + tau / (sp * sp * tau_diff)).sqrt().recip()
}

#[inline]
fn gauss_3d(tau: f64, tau_diff: f64, sp: f64) -> f64 {
    lateral_gauss(tau, tau_diff) * axial_gauss(tau, tau_diff, sp)
}

/// Brightness-weighted mix of two species, `f` is the fraction of the first one and `alpha`
/// the brightness of the second relative to the first
///
/// Both weights are divided by `b = f + (1 - f) alpha` before they are multiplied, `f / b` and
/// `(1 - f) alpha / b` are at most one, so no intermediate overflows for any `alpha`.
#[inline]
fn two_component(g1: f64, g2: f64, n: f64, f: f64, alpha: f64) -> f64 {
    let b = f + (1.0 - f) * alpha;
    (f / b / b * g1 + (1.0 - f) * alpha / b * (alpha / b) * g2) / n
}

fn one_component_info(p: &[f64], count_rate: Option<f64>) -> Vec<Supplement> {
    counts_per_particle(count_rate, p[0]).into_iter().collect()
}

fn two_component_info(p: &[f64], count_rate: Option<f64>) -> Vec<Supplement> {
    let (n, f) = (p[0], p[3]);
    let mut info = vec![
        Supplement::new("n₁", n * f),
        Supplement::new("n₂", n * (1.0 - f)),
    ];
    info.extend(counts_per_particle(count_rate, n));
    info
}

const PARTICLES: ParameterDescriptor =
    ParameterDescriptor::plain("n", 4.0, true, ParameterDomain::positive());
const TAU_DIFF: ParameterDescriptor =
    ParameterDescriptor::plain("τ_diff [ms]", 0.4, true, ParameterDomain::positive());
const SP: ParameterDescriptor =
    ParameterDescriptor::plain("SP", 5.0, false, ParameterDomain::positive());
const TAU_TRIP: ParameterDescriptor =
    ParameterDescriptor::plain("τ_trip [ms]", 0.001, true, ParameterDomain::positive());
const TRIPLET_FRACTION: ParameterDescriptor =
    ParameterDescriptor::plain("T", 0.2, true, ParameterDomain::triplet_fraction());
const OFFSET: ParameterDescriptor =
    ParameterDescriptor::plain("offset", 0.0, false, ParameterDomain::Unbounded);

macro_const! {
    const DIFFUSION_2D_DOC: &str = r#"
Two-dimensional free diffusion, e.g. in a membrane, through a Gaussian spot

$$
G(\tau) = \frac{1}{n} \frac{1}{1 + \tau / \tau_\mathrm{diff}} + G_\infty.
$$
"#;
}

const DIFFUSION_2D_PARAMETERS: [ParameterDescriptor; 3] = [PARTICLES, TAU_DIFF, OFFSET];

fn diffusion_2d(p: &[f64], tau: f64) -> f64 {
    let (n, tau_diff, offset) = (p[0], p[1], p[2]);
    lateral_gauss(tau, tau_diff) / n + offset
}

#[doc = DIFFUSION_2D_DOC!()]
pub const DIFFUSION_2D: ModelDefinition = ModelDefinition::new(
    6000,
    CATEGORY,
    "2D",
    DIFFUSION_2D_DOC,
    &DIFFUSION_2D_PARAMETERS,
    diffusion_2d,
)
.with_supplements(one_component_info);

macro_const! {
    const DIFFUSION_3D_DOC: &str = r#"
Three-dimensional free diffusion through a Gaussian confocal volume

$$
G(\tau) = \frac{1}{n} \frac{1}{1 + \tau / \tau_\mathrm{diff}}
    \frac{1}{\sqrt{1 + \tau / (\mathrm{SP}^2 \tau_\mathrm{diff})}} + G_\infty.
$$
"#;
}

const DIFFUSION_3D_PARAMETERS: [ParameterDescriptor; 4] = [PARTICLES, TAU_DIFF, SP, OFFSET];

fn diffusion_3d(p: &[f64], tau: f64) -> f64 {
    let (n, tau_diff, sp, offset) = (p[0], p[1], p[2], p[3]);
    gauss_3d(tau, tau_diff, sp) / n + offset
}

#[doc = DIFFUSION_3D_DOC!()]
pub const DIFFUSION_3D: ModelDefinition = ModelDefinition::new(
    6001,
    CATEGORY,
    "3D",
    DIFFUSION_3D_DOC,
    &DIFFUSION_3D_PARAMETERS,
    diffusion_3d,
)
.with_supplements(one_component_info);

macro_const! {
    const TRIPLET_DIFFUSION_2D_DOC: &str = r#"
Two-dimensional free diffusion with triplet blinking

$$
G(\tau) = \frac{1}{n} \left(1 + \frac{T}{1 - T} e^{-\tau / \tau_\mathrm{trip}}\right)
    \frac{1}{1 + \tau / \tau_\mathrm{diff}} + G_\infty.
$$
"#;
}

const TRIPLET_DIFFUSION_2D_PARAMETERS: [ParameterDescriptor; 5] =
    [PARTICLES, TAU_DIFF, TAU_TRIP, TRIPLET_FRACTION, OFFSET];

fn triplet_diffusion_2d(p: &[f64], tau: f64) -> f64 {
    let (n, tau_diff, tau_trip, t, offset) = (p[0], p[1], p[2], p[3], p[4]);
    triplet(tau, tau_trip, t) * lateral_gauss(tau, tau_diff) / n + offset
}

#[doc = TRIPLET_DIFFUSION_2D_DOC!()]
pub const TRIPLET_DIFFUSION_2D: ModelDefinition = ModelDefinition::new(
    6002,
    CATEGORY,
    "T+2D",
    TRIPLET_DIFFUSION_2D_DOC,
    &TRIPLET_DIFFUSION_2D_PARAMETERS,
    triplet_diffusion_2d,
)
.with_supplements(one_component_info);

macro_const! {
    const TRIPLET_DIFFUSION_3D_DOC: &str = r#"
Three-dimensional free diffusion with triplet blinking

$$
G(\tau) = \frac{1}{n} \left(1 + \frac{T}{1 - T} e^{-\tau / \tau_\mathrm{trip}}\right)
    \frac{1}{1 + \tau / \tau_\mathrm{diff}}
    \frac{1}{\sqrt{1 + \tau / (\mathrm{SP}^2 \tau_\mathrm{diff})}} + G_\infty.
$$
"#;
}

const TRIPLET_DIFFUSION_3D_PARAMETERS: [ParameterDescriptor; 6] =
    [PARTICLES, TRIPLET_FRACTION, TAU_TRIP, TAU_DIFF, SP, OFFSET];

fn triplet_diffusion_3d(p: &[f64], tau: f64) -> f64 {
    let (n, t, tau_trip, tau_diff, sp, offset) = (p[0], p[1], p[2], p[3], p[4], p[5]);
    triplet(tau, tau_trip, t) * gauss_3d(tau, tau_diff, sp) / n + offset
}

#[doc = TRIPLET_DIFFUSION_3D_DOC!()]
pub const TRIPLET_DIFFUSION_3D: ModelDefinition = ModelDefinition::new(
    6011,
    CATEGORY,
    "T+3D",
    TRIPLET_DIFFUSION_3D_DOC,
    &TRIPLET_DIFFUSION_3D_PARAMETERS,
    triplet_diffusion_3d,
)
.with_supplements(one_component_info);

const TWO_COMPONENT_PARTICLES: ParameterDescriptor =
    ParameterDescriptor::plain("n", 25.0, true, ParameterDomain::positive());
const TAU_1: ParameterDescriptor =
    ParameterDescriptor::plain("τ₁ [ms]", 5.0, true, ParameterDomain::positive());
const FRACTION: ParameterDescriptor =
    ParameterDescriptor::plain("F", 0.45, true, ParameterDomain::fraction());
const ALPHA: ParameterDescriptor =
    ParameterDescriptor::plain("α", 1.0, false, ParameterDomain::positive());
const TWO_COMPONENT_TAU_TRIP: ParameterDescriptor =
    ParameterDescriptor::plain("τ_trip [ms]", 0.001, false, ParameterDomain::positive());
const TWO_COMPONENT_TRIPLET_FRACTION: ParameterDescriptor =
    ParameterDescriptor::plain("T", 0.01, false, ParameterDomain::triplet_fraction());

macro_const! {
    const TRIPLET_TWO_COMPONENT_2D_DOC: &str = r#"
Two species diffusing freely in two dimensions, with triplet blinking

$F$ is the fraction of the first species, $\alpha$ the molecular brightness of the second
species relative to the first one.

$$
G(\tau) = \frac{1 + \frac{T}{1 - T} e^{-\tau / \tau_\mathrm{trip}}}{n (F + \alpha (1 - F))^2}
    \left(\frac{F}{1 + \tau / \tau_1} + \frac{\alpha^2 (1 - F)}{1 + \tau / \tau_2}\right)
    + G_\infty.
$$
"#;
}

const TRIPLET_TWO_COMPONENT_2D_PARAMETERS: [ParameterDescriptor; 8] = [
    TWO_COMPONENT_PARTICLES,
    TAU_1,
    ParameterDescriptor::plain("τ₂ [ms]", 1000.0, true, ParameterDomain::positive()),
    FRACTION,
    ALPHA,
    TWO_COMPONENT_TAU_TRIP,
    TWO_COMPONENT_TRIPLET_FRACTION,
    OFFSET,
];

fn triplet_two_component_2d(p: &[f64], tau: f64) -> f64 {
    let (n, tau_1, tau_2, f, alpha, tau_trip, t, offset) =
        (p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7]);
    let g1 = lateral_gauss(tau, tau_1);
    let g2 = lateral_gauss(tau, tau_2);
    triplet(tau, tau_trip, t) * two_component(g1, g2, n, f, alpha) + offset
}

#[doc = TRIPLET_TWO_COMPONENT_2D_DOC!()]
pub const TRIPLET_TWO_COMPONENT_2D: ModelDefinition = ModelDefinition::new(
    6030,
    CATEGORY,
    "T+2D+2D",
    TRIPLET_TWO_COMPONENT_2D_DOC,
    &TRIPLET_TWO_COMPONENT_2D_PARAMETERS,
    triplet_two_component_2d,
)
.with_supplements(two_component_info);

macro_const! {
    const TRIPLET_TWO_COMPONENT_3D_DOC: &str = r#"
Two species diffusing freely in three dimensions, with triplet blinking

Same as the two-dimensional two-species model with the axial factor
$1 / \sqrt{1 + \tau / (\mathrm{SP}^2 \tau_i)}$ for every species.
"#;
}

const TRIPLET_TWO_COMPONENT_3D_PARAMETERS: [ParameterDescriptor; 9] = [
    TWO_COMPONENT_PARTICLES,
    ParameterDescriptor::plain("τ₁ [ms]", 0.25, true, ParameterDomain::positive()),
    ParameterDescriptor::plain("τ₂ [ms]", 5.0, true, ParameterDomain::positive()),
    FRACTION,
    SP,
    ALPHA,
    TWO_COMPONENT_TAU_TRIP,
    TWO_COMPONENT_TRIPLET_FRACTION,
    OFFSET,
];

fn triplet_two_component_3d(p: &[f64], tau: f64) -> f64 {
    let (n, tau_1, tau_2, f, sp, alpha, tau_trip, t, offset) =
        (p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7], p[8]);
    let g1 = gauss_3d(tau, tau_1, sp);
    let g2 = gauss_3d(tau, tau_2, sp);
    triplet(tau, tau_trip, t) * two_component(g1, g2, n, f, alpha) + offset
}

#[doc = TRIPLET_TWO_COMPONENT_3D_DOC!()]
pub const TRIPLET_TWO_COMPONENT_3D: ModelDefinition = ModelDefinition::new(
    6032,
    CATEGORY,
    "T+3D+3D",
    TRIPLET_TWO_COMPONENT_3D_DOC,
    &TRIPLET_TWO_COMPONENT_3D_PARAMETERS,
    triplet_two_component_3d,
)
.with_supplements(two_component_info);

#[cfg(test)]
#[allow(clippy::unreadable_literal)]
mod tests {
    use super::*;
    use crate::LagTimes;

    use approx::assert_relative_eq;

    check_model!(diffusion_2d_contract, DIFFUSION_2D);
    check_model!(diffusion_3d_contract, DIFFUSION_3D);
    check_model!(triplet_diffusion_2d_contract, TRIPLET_DIFFUSION_2D);
    check_model!(triplet_diffusion_3d_contract, TRIPLET_DIFFUSION_3D);
    check_model!(triplet_two_component_2d_contract, TRIPLET_TWO_COMPONENT_2D);
    check_model!(triplet_two_component_3d_contract, TRIPLET_TWO_COMPONENT_3D);

    #[test]
    fn diffusion_3d_amplitude_and_half_decay() {
        let params = [8.0, 0.25, 5.0, 0.01];
        let tau = LagTimes::new(vec![0.0, 0.25]).unwrap();
        let g = DIFFUSION_3D.evaluate(&params, &tau).unwrap();
        assert_relative_eq!(g[0], 0.125 + 0.01, max_relative = 1e-15);
        let axial = (1.0_f64 + 1.0 / 25.0).sqrt().recip();
        assert_relative_eq!(g[1], 0.125 * 0.5 * axial + 0.01, max_relative = 1e-15);
    }

    #[test]
    fn diffusion_3d_reduces_to_2d_for_elongated_volume() {
        let tau = LagTimes::logspace(1e-3, 1e2, 50).unwrap();
        let g2 = DIFFUSION_2D.evaluate(&[4.0, 0.4, 0.0], &tau).unwrap();
        let g3 = DIFFUSION_3D.evaluate(&[4.0, 0.4, 1e6, 0.0], &tau).unwrap();
        assert_relative_eq!(
            g2.as_slice().unwrap(),
            g3.as_slice().unwrap(),
            max_relative = 1e-6
        );
    }

    #[test]
    fn triplet_raises_zero_lag_amplitude() {
        let tau = LagTimes::new(vec![0.0]).unwrap();
        let g = TRIPLET_DIFFUSION_3D
            .evaluate(&[4.0, 0.2, 0.001, 0.4, 5.0, 0.0], &tau)
            .unwrap();
        assert_relative_eq!(g[0], 0.25 / 0.8, max_relative = 1e-15);
    }

    #[test]
    fn two_component_with_equal_species_is_one_component() {
        let tau = LagTimes::logspace(1e-4, 1e3, 40).unwrap();
        let single = TRIPLET_DIFFUSION_3D
            .evaluate(&[10.0, 0.1, 0.002, 0.3, 6.0, 0.0], &tau)
            .unwrap();
        for f in [0.0, 0.3, 1.0] {
            let double = TRIPLET_TWO_COMPONENT_3D
                .evaluate(&[10.0, 0.3, 0.3, f, 6.0, 1.0, 0.002, 0.1, 0.0], &tau)
                .unwrap();
            assert_relative_eq!(
                single.as_slice().unwrap(),
                double.as_slice().unwrap(),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn two_component_brightness_weighting() {
        // Second species twice as bright at equal particle fractions
        let tau = LagTimes::new(vec![0.0]).unwrap();
        let g = TRIPLET_TWO_COMPONENT_2D
            .evaluate(&[10.0, 1.0, 100.0, 0.5, 2.0, 0.001, 0.0, 0.0], &tau)
            .unwrap();
        assert_relative_eq!(g[0], 2.5 / (10.0 * 2.25), max_relative = 1e-15);
    }

    #[test]
    fn two_component_finite_for_extreme_brightness() {
        let tau = LagTimes::new(vec![0.0, 1.0, 1e300]).unwrap();
        let check = |model: &ModelDefinition, params: &[f64]| {
            assert_eq!(model.verify(params).unwrap(), params);
            let g = model.evaluate(params, &tau).unwrap();
            assert!(g.iter().all(|y| y.is_finite()), "{:?} -> {:?}", params, g);
        };
        check(
            &TRIPLET_TWO_COMPONENT_2D,
            &[25.0, 5.0, 1000.0, 0.0, 1e160, 0.001, 0.01, 0.0],
        );
        for f in [0.0, 1e-300, 0.5, 1.0 - f64::EPSILON, 1.0] {
            for alpha in [1e-12, 1.0, 1e160, 1e300, f64::MAX] {
                check(
                    &TRIPLET_TWO_COMPONENT_2D,
                    &[1e-12, 5.0, 1000.0, f, alpha, 0.001, 0.01, 0.0],
                );
                check(
                    &TRIPLET_TWO_COMPONENT_3D,
                    &[1e-12, 0.25, 5.0, f, 1e-12, alpha, 0.001, 0.01, 0.0],
                );
            }
        }
    }

    #[test]
    fn two_component_limits_are_single_species() {
        // Only the second species is seen for F = 0, whatever its brightness
        let tau = LagTimes::new(vec![0.0, 1000.0]).unwrap();
        let g = TRIPLET_TWO_COMPONENT_2D
            .evaluate(&[25.0, 5.0, 1000.0, 0.0, 1e160, 0.001, 0.0, 0.0], &tau)
            .unwrap();
        assert_relative_eq!(g[0], 1.0 / 25.0, max_relative = 1e-15);
        assert_relative_eq!(g[1], 0.5 / 25.0, max_relative = 1e-15);

        let g = TRIPLET_TWO_COMPONENT_2D
            .evaluate(&[25.0, 5.0, 1000.0, 1.0, 1e300, 0.001, 0.0, 0.0], &tau)
            .unwrap();
        assert_relative_eq!(g[1], 1.0 / (25.0 * 201.0), max_relative = 1e-15);
    }

    #[test]
    fn two_component_supplements() {
        let params = TRIPLET_TWO_COMPONENT_2D.default_values();
        let info = TRIPLET_TWO_COMPONENT_2D
            .supplements(&params, Some(50.0))
            .unwrap();
        let labels: Vec<_> = info.iter().map(|s| s.label).collect();
        assert_eq!(labels, ["n₁", "n₂", "cpp [kHz]"]);
        assert_relative_eq!(info[0].value + info[1].value, params[0]);
        assert_relative_eq!(info[2].value, 2.0);
    }

    #[test]
    fn verify_clamps_triplet_fraction_and_keeps_offset_sign() {
        let verified = TRIPLET_DIFFUSION_2D
            .verify(&[-4.0, 0.0, -0.001, 1.5, -0.02])
            .unwrap();
        assert_eq!(
            verified,
            vec![
                4.0,
                crate::model::POSITIVE_FLOOR,
                0.001,
                crate::model::TRIPLET_CEILING,
                -0.02
            ]
        );
    }
}
