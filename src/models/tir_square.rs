//! Diffusion with total internal reflection excitation, detected through a square pinhole
//!
//! The square pinhole of side `a` (in object space) is blurred by a Gaussian point spread
//! function of standard deviation `σ`. The lateral correlation factorizes in `x` and `y`.

use crate::faddeeva::FRAC_1_SQRT_PI;
use crate::model::{
    ModelDefinition, ParameterDescriptor, ParameterDomain, Supplement, counts_per_particle,
};
use crate::models::tir_gaussian::evanescent_axial;
use crate::models::{
    AREA_TO_SQUARE_MICROMETERS, C2D_TO_HUMAN, C3D_TO_NANOMOLAR, D_TO_HUMAN, LENGTH_TO_HUMAN,
};

use macro_const::macro_const;

const CATEGORY: &str = "TIR (□xσ/Exp.)";

/// Below this argument [square_lateral] uses its Taylor series, the direct form is `0 / 0` at
/// zero
const SERIES_THRESHOLD: f64 = 1e-3;

/// One-dimensional lateral correlation of a pinhole side `a` blurred by `var = σ² + D τ`
///
/// With `y = a / (2 sqrt(var))`: `(erf(y) + (exp(-y²) - 1) / (y sqrt(π))) / a`.
pub(crate) fn square_lateral(a: f64, var: f64) -> f64 {
    let y = a / (2.0 * var.sqrt());
    let g = if y < SERIES_THRESHOLD {
        let y2 = y * y;
        FRAC_1_SQRT_PI * y * (1.0 - y2 / 6.0 + y2 * y2 / 30.0)
    } else {
        libm::erf(y) + FRAC_1_SQRT_PI * libm::expm1(-y * y) / y
    };
    g / a
}

/// Effective area `1 / gx(0)²`
fn effective_area(sigma: f64, a: f64) -> f64 {
    square_lateral(a, sigma * sigma).powi(-2)
}

const D: ParameterDescriptor = ParameterDescriptor::new(
    "D [10 µm²/s]",
    0.054,
    true,
    "D [µm²/s]",
    D_TO_HUMAN,
    ParameterDomain::positive(),
);
const SIGMA: ParameterDescriptor = ParameterDescriptor::new(
    "σ [100 nm]",
    2.3,
    false,
    "σ [nm]",
    LENGTH_TO_HUMAN,
    ParameterDomain::positive(),
);
const SIDE: ParameterDescriptor = ParameterDescriptor::new(
    "a [100 nm]",
    7.5,
    false,
    "a [nm]",
    LENGTH_TO_HUMAN,
    ParameterDomain::positive(),
);

macro_const! {
    const TIR_SQUARE_2D_DOC: &str = r#"
Two-dimensional free diffusion on the surface, square pinhole blurred by a Gaussian

With $y(\tau) = a / (2 \sqrt{\sigma^2 + D\tau})$:

$$
G(\tau) = \frac{1}{C_\mathrm{2D} a^2} \left(\mathrm{erf}(y)
    + \frac{e^{-y^2} - 1}{y \sqrt{\pi}}\right)^2.
$$
"#;
}

const TIR_SQUARE_2D_PARAMETERS: [ParameterDescriptor; 4] = [
    D,
    SIGMA,
    SIDE,
    ParameterDescriptor::new(
        "C_2D [100 /µm²]",
        0.6,
        true,
        "C_2D [1/µm²]",
        C2D_TO_HUMAN,
        ParameterDomain::positive(),
    ),
];

fn tir_square_2d(p: &[f64], tau: f64) -> f64 {
    let (d, sigma, a, conc) = (p[0], p[1], p[2], p[3]);
    square_lateral(a, sigma * sigma + d * tau).powi(2) / conc
}

fn tir_square_2d_info(p: &[f64], count_rate: Option<f64>) -> Vec<Supplement> {
    let (sigma, a, conc) = (p[1], p[2], p[3]);
    let a_eff = effective_area(sigma, a);
    let n_eff = conc * a_eff;
    let mut info = vec![
        Supplement::new("G(0)", tir_square_2d(p, 0.0)),
        Supplement::new("A_eff [µm²]", a_eff * AREA_TO_SQUARE_MICROMETERS),
        Supplement::new("C_2D [1/µm²]", conc * C2D_TO_HUMAN),
        Supplement::new("N_eff", n_eff),
    ];
    info.extend(counts_per_particle(count_rate, n_eff));
    info
}

#[doc = TIR_SQUARE_2D_DOC!()]
pub const TIR_SQUARE_2D: ModelDefinition = ModelDefinition::new(
    6010,
    CATEGORY,
    "2D",
    TIR_SQUARE_2D_DOC,
    &TIR_SQUARE_2D_PARAMETERS,
    tir_square_2d,
)
.with_supplements(tir_square_2d_info);

macro_const! {
    const TIR_SQUARE_3D_DOC: &str = r#"
Three-dimensional free diffusion above the surface, square pinhole blurred by a Gaussian,
exponential excitation profile

The squared lateral factor of the 2D square model times the evanescent axial factor
$g_z(\sqrt{D\tau} / d_\mathrm{eva})$, normalized by $C_\mathrm{3D} d_\mathrm{eva}$. The effective
volume is $2 d_\mathrm{eva} A_\mathrm{eff}$.
"#;
}

const TIR_SQUARE_3D_PARAMETERS: [ParameterDescriptor; 5] = [
    ParameterDescriptor::new(
        "D [10 µm²/s]",
        0.25,
        true,
        "D [µm²/s]",
        D_TO_HUMAN,
        ParameterDomain::positive(),
    ),
    SIGMA,
    SIDE,
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

fn tir_square_3d(p: &[f64], tau: f64) -> f64 {
    let (d, sigma, a, d_eva, conc) = (p[0], p[1], p[2], p[3], p[4]);
    let lateral = square_lateral(a, sigma * sigma + d * tau).powi(2);
    let axial = evanescent_axial((d * tau).sqrt() / d_eva);
    lateral * axial / (d_eva * conc)
}

fn tir_square_3d_info(p: &[f64], count_rate: Option<f64>) -> Vec<Supplement> {
    let (sigma, a, d_eva, conc) = (p[1], p[2], p[3], p[4]);
    let v_eff = 2.0 * d_eva * effective_area(sigma, a);
    let n_eff = conc * v_eff;
    let mut info = vec![
        Supplement::new("G(0)", tir_square_3d(p, 0.0)),
        Supplement::new("V_eff [al]", v_eff),
        Supplement::new("C_3D [nM]", conc * C3D_TO_NANOMOLAR),
        Supplement::new("N_eff", n_eff),
    ];
    info.extend(counts_per_particle(count_rate, n_eff));
    info
}

#[doc = TIR_SQUARE_3D_DOC!()]
pub const TIR_SQUARE_3D: ModelDefinition = ModelDefinition::new(
    6012,
    CATEGORY,
    "3D",
    TIR_SQUARE_3D_DOC,
    &TIR_SQUARE_3D_PARAMETERS,
    tir_square_3d,
)
.with_supplements(tir_square_3d_info);
