//! The end-to-end booster tuning experiment.
//!
//! [`prepare_data`] builds the stratified train/valid split,
//! [`run_search`] tunes the booster with TPE sampling and median pruning,
//! [`train_final`] refits on the best configuration and [`evaluate`]
//! scores the refit model on the validation set.
//!
//! ```no_run
//! use boost_tuner::config::RunConfig;
//! use boost_tuner::experiment;
//! use boost_tuner::search_space::SearchSpace;
//!
//! let config = RunConfig::default().with_n_trials(20);
//! let (train, valid) = experiment::prepare_data(&config)?;
//! let study = experiment::run_search(&config, &SearchSpace::booster_default(), &train, &valid)?;
//! let booster = experiment::train_final(&config, &study.best_params()?, &train, &valid)?;
//! let evaluation = experiment::evaluate(&booster, &valid);
//! println!("{}", evaluation.report);
//! # Ok::<(), boost_tuner::Error>(())
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::booster::{self, Booster, BoosterParams, LogEvaluation, PruningCallback, TrainingCallback};
use crate::config::RunConfig;
use crate::data::{self, Dataset};
use crate::error::Result;
use crate::metrics::{ClassificationReport, ConfusionMatrix};
use crate::objective::Objective;
use crate::param::ParamValue;
use crate::sampler::TpeSampler;
use crate::search_space::SearchSpace;
use crate::study::Study;
use crate::trial::Trial;
use crate::types::Direction;
use crate::visualization;

/// Generates the synthetic dataset and splits it into `(train, valid)`.
///
/// # Errors
///
/// Propagates `Error::InvalidDataset` and `Error::InvalidSplit`.
pub fn prepare_data(config: &RunConfig) -> Result<(Dataset, Dataset)> {
    let full = data::make_classification(&config.dataset, config.data_seed)?;
    data::train_test_split_stratified(&full, config.test_size, config.split_seed)
}

/// Booster parameters for one set of named values.
///
/// `early_stopping_rounds` comes from `config` unless `values` names it.
fn booster_params(config: &RunConfig, values: &BTreeMap<String, ParamValue>) -> Result<BoosterParams> {
    let mut params = BoosterParams::from_params(values)?;
    if !values.contains_key("early_stopping_rounds") {
        params.early_stopping_rounds = config.early_stopping_rounds;
    }
    Ok(params)
}

/// Trains one booster per trial and scores it by its best validation loss.
///
/// Each round's validation loss is reported to the trial, so the study's
/// pruner can stop unpromising trials mid-training.
pub struct BoosterObjective<'a> {
    config: &'a RunConfig,
    space: &'a SearchSpace,
    train: &'a Dataset,
    valid: &'a Dataset,
}

impl<'a> BoosterObjective<'a> {
    /// Borrows the run settings, search space and both data splits.
    #[must_use]
    pub fn new(
        config: &'a RunConfig,
        space: &'a SearchSpace,
        train: &'a Dataset,
        valid: &'a Dataset,
    ) -> Self {
        Self {
            config,
            space,
            train,
            valid,
        }
    }
}

impl Objective for BoosterObjective<'_> {
    type Error = crate::Error;

    fn evaluate(&self, trial: &mut Trial) -> Result<f64> {
        let searched = self.space.suggest(trial)?;
        let merged = self
            .config
            .merge_policy
            .merge(&searched, &self.config.fixed_params)?;
        let params = booster_params(self.config, &merged)?;

        let booster = {
            let mut pruning = PruningCallback::new(trial);
            let mut callbacks: [&mut dyn TrainingCallback; 1] = [&mut pruning];
            booster::train(&params, self.train, self.valid, &mut callbacks)?
        };
        trial.set_user_attr("best_iteration", booster.best_iteration());
        Ok(booster.best_score())
    }
}

/// Runs the hyperparameter search and returns the finished study.
///
/// The space and the merge policy are checked before the first trial.
///
/// # Errors
///
/// - Search-space errors from [`SearchSpace::validate`].
/// - `Error::ConfigConflict` under `MergePolicy::RejectOverlap`.
/// - `Error::TrialFailed` if a trial fails for a reason other than pruning.
/// - `Error::NoCompletedTrials` if every trial was pruned.
pub fn run_search(
    config: &RunConfig,
    space: &SearchSpace,
    train: &Dataset,
    valid: &Dataset,
) -> Result<Study> {
    space.validate()?;
    config
        .merge_policy
        .check(space.names(), &config.fixed_params)?;

    let sampler = TpeSampler::builder()
        .direction(Direction::Minimize)
        .seed(config.sampler_seed)
        .build()?;
    let study = Study::builder()
        .minimize()
        .sampler(sampler)
        .boxed_pruner(config.pruner.build(Direction::Minimize))
        .build();

    study.optimize(config.n_trials, BoosterObjective::new(config, space, train, valid))?;
    trace_info!(
        n_trials = study.n_trials(),
        n_pruned = study.n_pruned_trials(),
        "search finished"
    );
    Ok(study)
}

/// Refits a booster on `best` merged with the fixed overrides, logging the
/// validation loss every `log_period` rounds. No pruning takes place.
///
/// # Errors
///
/// Propagates merge, parameter and training errors.
pub fn train_final(
    config: &RunConfig,
    best: &BTreeMap<String, ParamValue>,
    train: &Dataset,
    valid: &Dataset,
) -> Result<Booster> {
    let merged = config.merge_policy.merge(best, &config.fixed_params)?;
    let params = booster_params(config, &merged)?;
    let mut log = LogEvaluation::new(config.log_period);
    let mut callbacks: [&mut dyn TrainingCallback; 1] = [&mut log];
    let booster = booster::train(&params, train, valid, &mut callbacks)?;
    trace_info!(
        best_iteration = booster.best_iteration(),
        best_score = booster.best_score(),
        "final model trained"
    );
    Ok(booster)
}

/// Validation-set scores of a trained booster.
#[derive(Clone, Debug)]
pub struct Evaluation {
    /// Predicted labels, one per validation row.
    pub predictions: Vec<u8>,
    /// Share of rows predicted correctly.
    pub accuracy: f64,
    /// Counts of predicted against true labels.
    pub confusion: ConfusionMatrix,
    /// Per-class precision, recall and F1.
    pub report: ClassificationReport,
}

/// Scores `booster` on `valid`.
#[must_use]
pub fn evaluate(booster: &Booster, valid: &Dataset) -> Evaluation {
    let predictions = booster.predict(valid);
    let confusion = ConfusionMatrix::from_predictions(&predictions, valid.labels());
    let report = ClassificationReport::from_confusion(&confusion);
    Evaluation {
        accuracy: confusion.accuracy(),
        predictions,
        confusion,
        report,
    }
}

/// Writes both HTML reports into `dir`, returning their paths.
///
/// # Errors
///
/// Returns the first I/O error.
pub fn write_reports(study: &Study, dir: impl AsRef<Path>) -> std::io::Result<(PathBuf, PathBuf)> {
    let dir = dir.as_ref();
    let history = visualization::write_history_html(study, dir)?;
    let slice = visualization::write_slice_html(study, dir)?;
    Ok((history, slice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FixedParams, MergePolicy};

    #[test]
    fn config_supplies_early_stopping() {
        let config = RunConfig::default().with_early_stopping_rounds(7);
        let params = booster_params(&config, &BTreeMap::new()).unwrap();
        assert_eq!(params.early_stopping_rounds, 7);

        let mut values = BTreeMap::new();
        values.insert("early_stopping_rounds".to_string(), ParamValue::Int(3));
        assert_eq!(booster_params(&config, &values).unwrap().early_stopping_rounds, 3);
    }

    #[test]
    fn overlap_is_rejected_before_any_trial() {
        let config = RunConfig::default()
            .with_n_trials(3)
            .with_fixed_params(FixedParams::empty().with("max_depth", ParamValue::Int(3)))
            .with_merge_policy(MergePolicy::RejectOverlap);
        let (train, valid) = prepare_data(&config).unwrap();
        let result = run_search(&config, &SearchSpace::booster_default(), &train, &valid);
        assert!(matches!(result, Err(crate::Error::ConfigConflict(name)) if name == "max_depth"));
    }
}
