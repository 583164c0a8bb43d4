use crate::model::ModelId;

/// Error returned from [crate::ModelRegistry] and [crate::ModelDefinition]
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("model {id} is not registered")]
    UnknownModel { id: ModelId },

    #[error("model identifier {id} is already registered")]
    DuplicateIdentifier { id: ModelId },

    #[error("model expects {expected} parameters, {actual} given")]
    InvalidParameterCount { expected: usize, actual: usize },

    #[error("model {id} has an invalid definition: {reason}")]
    InvalidDefinition { id: ModelId, reason: String },

    #[error("output buffer has length {actual}, lag-time axis has {expected}")]
    OutputLengthMismatch { expected: usize, actual: usize },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LagTimesError {
    #[error("lag-time axis must not be empty")]
    Empty,

    #[error("lag-time axis accepts finite values only")]
    NonFinite,

    #[error("lag-time axis accepts non-negative values only")]
    Negative,

    #[error("lag-time axis must be sorted")]
    Unsorted,

    #[error("lag-time axis accepts contiguous arrays only")]
    NonContiguous,
}

/// Error returned from curve fitting
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FitError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    LagTimes(#[from] LagTimesError),

    #[error("{what} has length {actual}, {expected} expected")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("correlation values must be finite")]
    NonFiniteData,

    #[error("uncertainties must be positive and finite")]
    InvalidSigma,

    #[error("no parameter is free to fit")]
    NoFreeParameters,

    #[error("{points} data points are not enough to fit {free} free parameters")]
    NotEnoughData { points: usize, free: usize },
}
