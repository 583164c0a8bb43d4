//! Built-in correlation models
//!
//! All model functions work in a single internal unit system, chosen so that typical values are
//! of order unity:
//!
//! | quantity              | internal unit      | display unit | factor             |
//! |-----------------------|--------------------|--------------|--------------------|
//! | lag time, decay times | ms                 | ms           | 1                  |
//! | length                | 100 nm             | nm           | 100                |
//! | diffusion coefficient | 10 µm²/s           | µm²/s        | 10                 |
//! | 2D concentration      | 100 /µm²           | 1/µm²        | 100                |
//! | 3D concentration      | 1000 /µm³          | nM           | 10000 / 6.0221415  |
//!
//! With these units `D τ` is an area in (100 nm)² and a volume in (100 nm)³ is an attoliter.

use crate::model::ModelDefinition;

pub mod confocal;
pub mod tir_gaussian;
pub mod tir_square;

pub(crate) const D_TO_HUMAN: f64 = 10.0;
pub(crate) const LENGTH_TO_HUMAN: f64 = 100.0;
pub(crate) const C2D_TO_HUMAN: f64 = 100.0;
pub(crate) const C3D_TO_NANOMOLAR: f64 = 10000.0 / 6.0221415;
/// (100 nm)² in µm²
pub(crate) const AREA_TO_SQUARE_MICROMETERS: f64 = 0.01;

/// Models registered by [crate::ModelRegistry::builtin], in menu order
pub const BUILTIN_MODELS: [ModelDefinition; 10] = [
    confocal::DIFFUSION_2D,
    confocal::DIFFUSION_3D,
    confocal::TRIPLET_DIFFUSION_2D,
    confocal::TRIPLET_DIFFUSION_3D,
    confocal::TRIPLET_TWO_COMPONENT_2D,
    confocal::TRIPLET_TWO_COMPONENT_3D,
    tir_gaussian::TIR_3D,
    tir_gaussian::TRIPLET_TIR_3D,
    tir_square::TIR_SQUARE_2D,
    tir_square::TIR_SQUARE_3D,
];

/// Lateral correlation of free diffusion through a Gaussian profile
#[inline]
pub(crate) fn lateral_gauss(tau: f64, tau_diff: f64) -> f64 {
    (1.0 + tau / tau_diff).recip()
}

/// Blinking through the dark triplet state, `t` is the triplet fraction
#[inline]
pub(crate) fn triplet(tau: f64, tau_trip: f64, t: f64) -> f64 {
    1.0 + t / (1.0 - t) * f64::exp(-tau / tau_trip)
}
