//! Three-dimensional diffusion above a surface excited by total internal reflection
//!
//! The excitation decays exponentially with the distance from the surface (penetration depth
//! `d_eva`), the lateral detection profile is a Gaussian of radius `r₀`. The surface reflects
//! the diffusing particles.

use crate::faddeeva::{FRAC_1_SQRT_PI, w_imaginary};
use crate::model::{
    ModelDefinition, ParameterDescriptor, ParameterDomain, Supplement, counts_per_particle,
};
use crate::models::{C3D_TO_NANOMOLAR, D_TO_HUMAN, LENGTH_TO_HUMAN, triplet};

use macro_const::macro_const;
use std::f64::consts::PI;

const CATEGORY: &str = "TIR (Gaussian/Exp.)";

/// Above this argument the difference in [evanescent_axial] is taken from its asymptotic
/// series, the direct form loses `x²` ulps to cancellation
const ASYMPTOTIC_THRESHOLD: f64 = 30.0;

/// `sqrt(pi) x gz(x)` in powers of `1 / x²`, truncation error is below `1e-16` at the threshold
const ASYMPTOTIC_SERIES: [f64; 7] = [1.0, -1.0, 2.25, -7.5, 32.8125, -177.1875, 1136.953125];

/// Axial correlation of diffusion in an evanescent field above a reflecting wall
///
/// `x = sqrt(D τ) / d_eva`. The value at zero lag is 1/2, the effective thickness of the
/// evanescent layer is `2 d_eva`.
pub(crate) fn evanescent_axial(x: f64) -> f64 {
    if x > ASYMPTOTIC_THRESHOLD {
        let inv_x2 = (x * x).recip();
        let series = ASYMPTOTIC_SERIES
            .iter()
            .rev()
            .fold(0.0_f64, |acc, &c| acc.mul_add(inv_x2, c));
        FRAC_1_SQRT_PI / x * series
    } else {
        x * FRAC_1_SQRT_PI - (x * x - 0.5) * w_imaginary(x)
    }
}

/// Effective volume `π r₀² d_eva`
#[inline]
fn effective_volume(r0: f64, d_eva: f64) -> f64 {
    PI * r0 * r0 * d_eva
}

const PARAMETERS: [ParameterDescriptor; 4] = [
    ParameterDescriptor::new(
        "D [10 µm²/s]",
        0.5420,
        true,
        "D [µm²/s]",
        D_TO_HUMAN,
        ParameterDomain::positive(),
    ),
    ParameterDescriptor::new(
        "r₀ [100 nm]",
        9.44,
        false,
        "r₀ [nm]",
        LENGTH_TO_HUMAN,
        ParameterDomain::positive(),
    ),
    ParameterDescriptor::new(
        "d_eva [100 nm]",
        1.0,
        false,
        "d_eva [nm]",
        LENGTH_TO_HUMAN,
        ParameterDomain::positive(),
    ),
    ParameterDescriptor::new(
        "C_3D [1000 /µm³]",
        0.03011,
        true,
        "C_3D [nM]",
        C3D_TO_NANOMOLAR,
        ParameterDomain::positive(),
    ),
];

fn tir_3d(p: &[f64], tau: f64) -> f64 {
    let (d, r0, d_eva, conc) = (p[0], p[1], p[2], p[3]);
    let n_eff = conc * effective_volume(r0, d_eva);
    // τ / τ_diff without forming τ_diff, which underflows for large D and small r₀
    let lateral = (1.0 + 4.0 * (d * tau) / r0 / r0).recip();
    let x = (d * tau).sqrt() / d_eva;
    lateral * evanescent_axial(x) / n_eff
}

/// Quantities shared by the TIR Gaussian models, `g0` is the model's own zero-lag value
fn volume_info(p: &[f64], g0: f64, count_rate: Option<f64>) -> Vec<Supplement> {
    let (r0, d_eva, conc) = (p[1], p[2], p[3]);
    let v_eff = effective_volume(r0, d_eva);
    let n_eff = conc * v_eff;
    let mut info = vec![
        Supplement::new("G(0)", g0),
        Supplement::new("V_eff [al]", v_eff),
        Supplement::new("C_3D [nM]", conc * C3D_TO_NANOMOLAR),
        Supplement::new("N_eff", n_eff),
    ];
    info.extend(counts_per_particle(count_rate, n_eff));
    info
}

fn tir_3d_info(p: &[f64], count_rate: Option<f64>) -> Vec<Supplement> {
    volume_info(p, tir_3d(p, 0.0), count_rate)
}

macro_const! {
    const TIR_3D_DOC: &str = r#"
Three-dimensional free diffusion, Gaussian lateral profile, exponential excitation profile

With $\tau_\mathrm{diff} = r_0^2 / (4D)$, $\kappa = 1 / d_\mathrm{eva}$ and the Faddeeva
function on the imaginary axis $w(ix) = e^{x^2} \mathrm{erfc}(x)$:

$$
G(\tau) = \frac{1}{C_\mathrm{3D} \pi r_0^2 d_\mathrm{eva}} \frac{1}{1 + \tau / \tau_\mathrm{diff}}
    \kappa \left(\sqrt{\frac{D\tau}{\pi}}
    - \frac{2 D \tau \kappa^2 - 1}{2 \kappa} w\left(i \sqrt{D\tau} \kappa\right)\right).
$$

$N_\mathrm{eff} = C_\mathrm{3D} \pi r_0^2 d_\mathrm{eva}$ is reported for convenience, it is
not the particle number, which is twice as large.
"#;
}

#[doc = TIR_3D_DOC!()]
pub const TIR_3D: ModelDefinition =
    ModelDefinition::new(6013, CATEGORY, "3D", TIR_3D_DOC, &PARAMETERS, tir_3d)
        .with_supplements(tir_3d_info);

const TRIPLET_PARAMETERS: [ParameterDescriptor; 6] = [
    PARAMETERS[0],
    PARAMETERS[1],
    PARAMETERS[2],
    PARAMETERS[3],
    ParameterDescriptor::plain("τ_trip [ms]", 0.001, false, ParameterDomain::positive()),
    ParameterDescriptor::plain("T", 0.01, true, ParameterDomain::triplet_fraction()),
];

fn triplet_tir_3d(p: &[f64], tau: f64) -> f64 {
    let (tau_trip, t) = (p[4], p[5]);
    triplet(tau, tau_trip, t) * tir_3d(p, tau)
}

fn triplet_tir_3d_info(p: &[f64], count_rate: Option<f64>) -> Vec<Supplement> {
    volume_info(p, triplet_tir_3d(p, 0.0), count_rate)
}

macro_const! {
    const TRIPLET_TIR_3D_DOC: &str = r#"
Three-dimensional free diffusion with triplet blinking, Gaussian lateral profile, exponential
excitation profile

The TIR 3D correlation multiplied by $1 + \frac{T}{1 - T} e^{-\tau / \tau_\mathrm{trip}}$.
"#;
}

#[doc = TRIPLET_TIR_3D_DOC!()]
pub const TRIPLET_TIR_3D: ModelDefinition = ModelDefinition::new(
    6014,
    CATEGORY,
    "T+3D",
    TRIPLET_TIR_3D_DOC,
    &TRIPLET_PARAMETERS,
    triplet_tir_3d,
)
.with_supplements(triplet_tir_3d_info);
