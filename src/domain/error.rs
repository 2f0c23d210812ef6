//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Configuration errors are violations of the generator's input constraints.
/// They are detected before any node is created.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("{param} is negative: {value}")]
    Negative { param: &'static str, value: f64 },

    #[error("{param} is not a finite number: {value}")]
    NotFinite { param: &'static str, value: f64 },

    #[error("{param} is more than {limit}: {value}")]
    AboveLimit {
        param: &'static str,
        value: f64,
        limit: f64,
    },

    #[error("max probability < min probability: {maxprob} < {minprob}")]
    ProbabilityRange { minprob: f64, maxprob: f64 },

    #[error("ptop > # of total primary events: {ptop} > {nprimary}")]
    PtopExceedsPrimary { ptop: i64, nprimary: i64 },

    #[error("ptop > # of children for top: {ptop} > {ctop}")]
    PtopExceedsCtop { ptop: i64, ctop: i64 },

    #[error("nchildren must be at least 2 to give a non-empty child range: {0}")]
    BranchingTooSmall(i64),

    #[error("nprimary must be at least 2 so every gate can hold two events: {0}")]
    TooFewPrimary(i64),

    #[error("ratio must be positive, a zero ratio never creates primary events")]
    ZeroRatio,

    #[error("ctop of 1 leaves the root gate with a single child")]
    SingleChildRoot,
}

/// Result type for validation.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;
