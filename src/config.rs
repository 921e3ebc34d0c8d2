//! Run configuration for the tuning experiment.
//!
//! [`RunConfig`] is built once, with `with_*` setters, and then only read.
//! [`FixedParams`] carries booster settings that are not searched, and
//! [`MergePolicy`] decides what happens when such an override names a
//! searched hyperparameter.

use std::collections::BTreeMap;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::pruner::{MedianPruner, NopPruner, Pruner};
use crate::types::Direction;

/// Shape of the synthetic classification dataset.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DatasetConfig {
    /// Total number of samples.
    pub n_samples: usize,
    /// Total number of features.
    pub n_features: usize,
    /// Features that carry class signal.
    pub n_informative: usize,
    /// Features built as random linear combinations of the informative ones.
    pub n_redundant: usize,
    /// Gaussian clusters per class.
    pub n_clusters_per_class: usize,
    /// Class proportions `[negative, positive]`.
    pub weights: [f64; 2],
    /// Half the side of the hypercube the cluster centroids sit on.
    pub class_sep: f64,
    /// Fraction of labels flipped at random.
    pub flip_y: f64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            n_samples: 60,
            n_features: 6,
            n_informative: 4,
            n_redundant: 1,
            n_clusters_per_class: 2,
            weights: [0.667, 0.333],
            class_sep: 1.0,
            flip_y: 0.01,
        }
    }
}

/// Which pruner the search uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PrunerKind {
    /// Median-stopping rule.
    #[default]
    Median,
    /// Never prune.
    None,
}

/// Pruner settings.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PrunerConfig {
    /// The pruning strategy.
    pub kind: PrunerKind,
    /// Completed trials required before pruning starts.
    pub n_startup_trials: usize,
    /// Steps (boosting rounds) before pruning starts within a trial.
    pub n_warmup_steps: u64,
    /// Only prune at multiples of this step.
    pub interval_steps: u64,
    /// Completed trials that must have reported at a step.
    pub n_min_trials: usize,
}

impl Default for PrunerConfig {
    fn default() -> Self {
        Self {
            kind: PrunerKind::Median,
            n_startup_trials: 5,
            n_warmup_steps: 0,
            interval_steps: 1,
            n_min_trials: 1,
        }
    }
}

impl PrunerConfig {
    /// Builds the configured pruner for a study with `direction`.
    #[must_use]
    pub fn build(&self, direction: Direction) -> Box<dyn Pruner> {
        match self.kind {
            PrunerKind::Median => Box::new(
                MedianPruner::new(direction)
                    .n_startup_trials(self.n_startup_trials)
                    .n_warmup_steps(self.n_warmup_steps)
                    .interval_steps(self.interval_steps)
                    .n_min_trials(self.n_min_trials),
            ),
            PrunerKind::None => Box::new(NopPruner),
        }
    }
}

/// Booster settings merged into every trial and into the final model.
///
/// Defaults to `seed = 42`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FixedParams(BTreeMap<String, ParamValue>);

impl FixedParams {
    /// An empty set of overrides.
    #[must_use]
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Adds or replaces an override.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    /// Returns the override for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        self.0.get(name).copied()
    }

    /// Iterates over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl Default for FixedParams {
    fn default() -> Self {
        Self::empty().with("seed", ParamValue::Int(42))
    }
}

/// How fixed overrides combine with searched values of the same name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MergePolicy {
    /// The override replaces the searched value.
    #[default]
    FixedWins,
    /// The searched value is kept.
    SearchedWins,
    /// Any overlap is a configuration error, reported before the search.
    RejectOverlap,
}

impl MergePolicy {
    /// Fails if this policy forbids an override that names a searched entry.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigConflict` naming the first overlapping entry
    /// under [`MergePolicy::RejectOverlap`].
    pub fn check<'a>(
        self,
        searched: impl IntoIterator<Item = &'a str>,
        fixed: &FixedParams,
    ) -> Result<()> {
        if self != Self::RejectOverlap {
            return Ok(());
        }
        match searched.into_iter().find(|name| fixed.get(name).is_some()) {
            Some(name) => Err(Error::ConfigConflict(name.to_owned())),
            None => Ok(()),
        }
    }

    /// Combines searched values with the fixed overrides.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigConflict` under [`MergePolicy::RejectOverlap`]
    /// when the two share a name.
    pub fn merge(
        self,
        searched: &BTreeMap<String, ParamValue>,
        fixed: &FixedParams,
    ) -> Result<BTreeMap<String, ParamValue>> {
        self.check(searched.keys().map(String::as_str), fixed)?;

        let mut merged = searched.clone();
        for (name, value) in fixed.iter() {
            match self {
                Self::FixedWins | Self::RejectOverlap => {
                    merged.insert(name.to_owned(), value);
                }
                Self::SearchedWins => {
                    merged.entry(name.to_owned()).or_insert(value);
                }
            }
        }
        Ok(merged)
    }
}

/// Everything the experiment needs, fixed for the whole run.
///
/// # Examples
///
/// ```
/// use boost_tuner::config::{MergePolicy, RunConfig};
///
/// let config = RunConfig::default()
///     .with_n_trials(20)
///     .with_merge_policy(MergePolicy::RejectOverlap);
/// assert_eq!(config.n_trials, 20);
/// assert_eq!(config.test_size, 10);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunConfig {
    /// Number of search trials.
    pub n_trials: usize,
    /// Seed of the search sampler.
    pub sampler_seed: u64,
    /// Seed of the dataset generator.
    pub data_seed: u64,
    /// Seed of the stratified split.
    pub split_seed: u64,
    /// Dataset shape.
    pub dataset: DatasetConfig,
    /// Number of validation samples.
    pub test_size: usize,
    /// Rounds without validation improvement before training stops.
    pub early_stopping_rounds: usize,
    /// Rounds between evaluation log lines of the final model.
    pub log_period: usize,
    /// Pruner settings.
    pub pruner: PrunerConfig,
    /// Non-searched booster settings.
    pub fixed_params: FixedParams,
    /// How `fixed_params` combine with searched values.
    pub merge_policy: MergePolicy,
    /// Directory the HTML reports are written to.
    pub output_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            n_trials: 100,
            sampler_seed: 42,
            data_seed: 42,
            split_seed: 42,
            dataset: DatasetConfig::default(),
            test_size: 10,
            early_stopping_rounds: 100,
            log_period: 100,
            pruner: PrunerConfig::default(),
            fixed_params: FixedParams::default(),
            merge_policy: MergePolicy::default(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl RunConfig {
    /// Sets the trial budget.
    #[must_use]
    pub fn with_n_trials(mut self, n_trials: usize) -> Self {
        self.n_trials = n_trials;
        self
    }

    /// Sets the sampler seed.
    #[must_use]
    pub fn with_sampler_seed(mut self, seed: u64) -> Self {
        self.sampler_seed = seed;
        self
    }

    /// Sets the dataset generator seed.
    #[must_use]
    pub fn with_data_seed(mut self, seed: u64) -> Self {
        self.data_seed = seed;
        self
    }

    /// Sets the split seed.
    #[must_use]
    pub fn with_split_seed(mut self, seed: u64) -> Self {
        self.split_seed = seed;
        self
    }

    /// Sets the dataset shape.
    #[must_use]
    pub fn with_dataset(mut self, dataset: DatasetConfig) -> Self {
        self.dataset = dataset;
        self
    }

    /// Sets the number of validation samples.
    #[must_use]
    pub fn with_test_size(mut self, test_size: usize) -> Self {
        self.test_size = test_size;
        self
    }

    /// Sets the early-stopping patience.
    #[must_use]
    pub fn with_early_stopping_rounds(mut self, rounds: usize) -> Self {
        self.early_stopping_rounds = rounds;
        self
    }

    /// Sets the evaluation log period of the final model.
    #[must_use]
    pub fn with_log_period(mut self, period: usize) -> Self {
        self.log_period = period;
        self
    }

    /// Sets the pruner settings.
    #[must_use]
    pub fn with_pruner(mut self, pruner: PrunerConfig) -> Self {
        self.pruner = pruner;
        self
    }

    /// Sets the fixed overrides.
    #[must_use]
    pub fn with_fixed_params(mut self, fixed: FixedParams) -> Self {
        self.fixed_params = fixed;
        self
    }

    /// Sets the merge policy.
    #[must_use]
    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// Sets the report directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn searched() -> BTreeMap<String, ParamValue> {
        BTreeMap::from([
            ("max_depth".to_owned(), ParamValue::Int(3)),
            ("learning_rate".to_owned(), ParamValue::Float(0.1)),
        ])
    }

    #[test]
    fn fixed_wins_overrides() {
        let fixed = FixedParams::default().with("max_depth", ParamValue::Int(7));
        let merged = MergePolicy::FixedWins.merge(&searched(), &fixed).unwrap();
        assert_eq!(merged["max_depth"], ParamValue::Int(7));
        assert_eq!(merged["seed"], ParamValue::Int(42));
    }

    #[test]
    fn searched_wins_keeps_searched() {
        let fixed = FixedParams::default().with("max_depth", ParamValue::Int(7));
        let merged = MergePolicy::SearchedWins.merge(&searched(), &fixed).unwrap();
        assert_eq!(merged["max_depth"], ParamValue::Int(3));
        assert_eq!(merged["seed"], ParamValue::Int(42));
    }

    #[test]
    fn reject_overlap_names_the_entry() {
        let fixed = FixedParams::default().with("max_depth", ParamValue::Int(7));
        let err = MergePolicy::RejectOverlap
            .merge(&searched(), &fixed)
            .unwrap_err();
        assert!(matches!(err, Error::ConfigConflict(name) if name == "max_depth"));

        // no overlap, no error
        assert!(
            MergePolicy::RejectOverlap
                .merge(&searched(), &FixedParams::default())
                .is_ok()
        );
    }

    #[test]
    fn defaults_match_the_experiment() {
        let config = RunConfig::default();
        assert_eq!(config.n_trials, 100);
        assert_eq!(config.early_stopping_rounds, 100);
        assert_eq!(config.dataset.n_samples, 60);
        assert_eq!(config.fixed_params.get("seed"), Some(ParamValue::Int(42)));
        assert_eq!(config.merge_policy, MergePolicy::FixedWins);
    }
}
