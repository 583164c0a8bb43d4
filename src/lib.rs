#![doc = include_str!("../README.md")]


mod error;
pub use error::{FitError, LagTimesError, ModelError};

pub mod faddeeva;

mod lag_times;
pub use lag_times::LagTimes;

mod model;
pub use model::{
    CorrelationFn, ModelDefinition, ModelId, POSITIVE_FLOOR, ParameterDescriptor, ParameterDomain,
    Supplement, SupplementsFn, TRIPLET_CEILING,
};

pub mod models;
pub use models::BUILTIN_MODELS;

mod nl_fit;
pub use nl_fit::{
    CobylaCurveFit, CurveFitAlgorithm, CurveFitResult, CurveFitTrait, FitData, FitProblem,
};

mod registry;
pub use registry::{CategoryGroup, CategoryGroups, CategoryModels, ModelRegistry, registry};

pub use ndarray;
