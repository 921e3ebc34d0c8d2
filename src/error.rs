/// Errors produced by the search, the booster and the data pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the lower bound is greater than the upper bound.
    #[error("invalid bounds: low ({low}) must be less than or equal to high ({high})")]
    InvalidBounds {
        /// The lower bound value.
        low: f64,
        /// The upper bound value.
        high: f64,
    },

    /// Returned when log scale is used with non-positive bounds.
    #[error("invalid log bounds: low must be positive for log scale")]
    InvalidLogBounds,

    /// Returned when step size is not positive.
    #[error("invalid step: step must be positive")]
    InvalidStep,

    /// Returned when a parameter is suggested with a different configuration.
    #[error("parameter conflict for '{name}': {reason}")]
    ParameterConflict {
        /// The name of the conflicting parameter.
        name: String,
        /// The reason for the conflict.
        reason: String,
    },

    /// Returned when a search space declares the same name twice.
    #[error("duplicate search-space entry '{0}'")]
    DuplicateParameter(String),

    /// Returned when requesting the best trial but no trials have completed.
    #[error("no completed trials available")]
    NoCompletedTrials,

    /// Returned when gamma is not in the valid range (0.0, 1.0).
    #[error("invalid gamma: {0} must be in (0.0, 1.0)")]
    InvalidGamma(f64),

    /// Returned when bandwidth is not positive.
    #[error("invalid bandwidth: {0} must be positive")]
    InvalidBandwidth(f64),

    /// Returned when KDE is created with empty samples.
    #[error("KDE requires at least one sample")]
    EmptySamples,

    /// Returned when a trial is pruned (stopped early by the objective function).
    #[error("trial was pruned")]
    TrialPruned,

    /// Returned by `Study::optimize` when an objective fails for a reason other
    /// than pruning. The search is aborted.
    #[error("trial {trial_id} failed: {message}")]
    TrialFailed {
        /// The id of the failed trial.
        trial_id: u64,
        /// The error message produced by the objective.
        message: String,
    },

    /// Returned when a dataset is malformed or a generator is misconfigured.
    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    /// Returned when a train/validation split cannot be produced.
    #[error("invalid split: {0}")]
    InvalidSplit(String),

    /// Returned when booster parameters fail validation.
    #[error("invalid booster parameter '{name}': {reason}")]
    InvalidBoosterParam {
        /// The offending parameter.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Returned when training produces a non-finite loss.
    #[error("training failed at round {round}: {reason}")]
    Training {
        /// The boosting round (0-based) at which training failed.
        round: usize,
        /// Description of the failure.
        reason: String,
    },

    /// Returned when fixed overrides collide with searched parameters under
    /// [`MergePolicy::RejectOverlap`](crate::config::MergePolicy::RejectOverlap).
    #[error("fixed override '{0}' is also part of the search space")]
    ConfigConflict(String),

    /// Returned when a hyperparameter name is not recognised by the booster.
    #[error("unknown hyperparameter '{0}'")]
    UnknownHyperparameter(String),

    /// Returned when an internal invariant is violated.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Convenience type for signalling a pruned trial from an objective function.
///
/// Implements `Into<Error>` so it can be used with `?` in objectives that
/// return `Result<V, Error>`.
///
/// # Examples
///
/// ```
/// use boost_tuner::{Error, TrialPruned};
///
/// fn objective_that_prunes() -> Result<f64, Error> {
///     // ... some computation ...
///     Err(TrialPruned)?
/// }
/// ```
#[derive(Debug)]
pub struct TrialPruned;

impl core::fmt::Display for TrialPruned {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "trial was pruned")
    }
}

impl From<TrialPruned> for Error {
    fn from(_: TrialPruned) -> Self {
        Error::TrialPruned
    }
}
