//! A compact gradient-boosted tree classifier for binary labels.
//!
//! Trees grow leaf-wise on the gradients of the binary log loss, starting
//! from the log-odds of the positive-label fraction. Training watches the
//! validation loss after every round: it stops early once the loss has not
//! improved for `early_stopping_rounds` rounds, and predictions only use the
//! trees up to the best round.
//!
//! ```
//! use boost_tuner::booster::{BoosterParams, train};
//! use boost_tuner::config::DatasetConfig;
//! use boost_tuner::data::{make_classification, train_test_split_stratified};
//!
//! let data = make_classification(&DatasetConfig::default(), 42).unwrap();
//! let (train_set, valid_set) = train_test_split_stratified(&data, 10, 42).unwrap();
//!
//! let params = BoosterParams {
//!     n_estimators: 50,
//!     min_child_samples: 5,
//!     ..BoosterParams::default()
//! };
//! let booster = train(&params, &train_set, &valid_set, &mut []).unwrap();
//! assert!(booster.best_iteration() <= 50);
//! assert_eq!(booster.predict(&valid_set).len(), 10);
//! ```

mod callback;
mod loss;
mod tree;

use std::collections::BTreeMap;

pub use callback::{LogEvaluation, PruningCallback, TrainingCallback};

use self::tree::Tree;
use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::param::ParamValue;

/// Booster hyperparameters.
///
/// Field names match the keys accepted by
/// [`from_params`](BoosterParams::from_params).
#[derive(Clone, Debug, PartialEq)]
pub struct BoosterParams {
    /// Maximum number of boosting rounds.
    pub n_estimators: usize,
    /// Shrinkage applied to every leaf output.
    pub learning_rate: f64,
    /// Maximum number of leaves per tree. At least 2.
    pub num_leaves: usize,
    /// Maximum tree depth. Zero or negative means unlimited.
    pub max_depth: i64,
    /// Minimum number of samples in each child of a split.
    pub min_child_samples: usize,
    /// Minimum hessian sum in each child of a split.
    pub min_child_weight: f64,
    /// L1 regularization on leaf outputs.
    pub reg_alpha: f64,
    /// L2 regularization on leaf outputs.
    pub reg_lambda: f64,
    /// Weight multiplier for positive samples.
    pub scale_pos_weight: f64,
    /// Fraction of features each tree may split on, in (0, 1].
    pub colsample_bytree: f64,
    /// Seed for the per-tree feature subsets.
    pub seed: u64,
    /// Stop after this many rounds without improvement. 0 disables.
    pub early_stopping_rounds: usize,
}

impl Default for BoosterParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            num_leaves: 31,
            max_depth: -1,
            min_child_samples: 20,
            min_child_weight: 1e-3,
            reg_alpha: 0.0,
            reg_lambda: 0.0,
            scale_pos_weight: 1.0,
            colsample_bytree: 1.0,
            seed: 0,
            early_stopping_rounds: 0,
        }
    }
}

fn as_count(name: &str, value: ParamValue) -> Result<usize> {
    match value {
        ParamValue::Int(v) => usize::try_from(v).map_err(|_| Error::ParameterConflict {
            name: name.to_owned(),
            reason: format!("expected a non-negative integer, got {v}"),
        }),
        ParamValue::Float(v) => Err(Error::ParameterConflict {
            name: name.to_owned(),
            reason: format!("expected an integer, got {v}"),
        }),
    }
}

impl BoosterParams {
    /// Builds parameters from named values, starting from the defaults.
    ///
    /// Integer values are accepted for float fields.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownHyperparameter` for a name that is not a field.
    /// - `Error::ParameterConflict` when a count field gets a float or a
    ///   negative integer.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    ///
    /// use boost_tuner::booster::BoosterParams;
    /// use boost_tuner::ParamValue;
    ///
    /// let mut values = BTreeMap::new();
    /// values.insert("num_leaves".to_string(), ParamValue::Int(15));
    /// values.insert("learning_rate".to_string(), ParamValue::Float(0.05));
    ///
    /// let params = BoosterParams::from_params(&values).unwrap();
    /// assert_eq!(params.num_leaves, 15);
    /// assert_eq!(params.n_estimators, 100);
    /// ```
    pub fn from_params(values: &BTreeMap<String, ParamValue>) -> Result<Self> {
        let mut params = Self::default();
        for (name, &value) in values {
            match name.as_str() {
                "n_estimators" => params.n_estimators = as_count(name, value)?,
                "learning_rate" => params.learning_rate = value.as_f64(),
                "num_leaves" => params.num_leaves = as_count(name, value)?,
                "max_depth" => {
                    params.max_depth = match value {
                        ParamValue::Int(v) => v,
                        ParamValue::Float(_) => {
                            return Err(Error::ParameterConflict {
                                name: name.clone(),
                                reason: format!("expected an integer, got {value}"),
                            });
                        }
                    }
                }
                "min_child_samples" => params.min_child_samples = as_count(name, value)?,
                "min_child_weight" => params.min_child_weight = value.as_f64(),
                "reg_alpha" => params.reg_alpha = value.as_f64(),
                "reg_lambda" => params.reg_lambda = value.as_f64(),
                "scale_pos_weight" => params.scale_pos_weight = value.as_f64(),
                "colsample_bytree" => params.colsample_bytree = value.as_f64(),
                "seed" => {
                    params.seed = u64::try_from(as_count(name, value)?)
                        .map_err(|_| Error::Internal("seed does not fit in u64"))?;
                }
                "early_stopping_rounds" => params.early_stopping_rounds = as_count(name, value)?,
                _ => return Err(Error::UnknownHyperparameter(name.clone())),
            }
        }
        Ok(params)
    }

    /// Checks every field.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidBoosterParam` naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        let bad = |name: &'static str, reason: String| Err(Error::InvalidBoosterParam { name, reason });

        if self.n_estimators == 0 {
            return bad("n_estimators", "must be at least 1".into());
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return bad("learning_rate", format!("must be positive, got {}", self.learning_rate));
        }
        if self.num_leaves < 2 {
            return bad("num_leaves", format!("must be at least 2, got {}", self.num_leaves));
        }
        if !(self.min_child_weight.is_finite() && self.min_child_weight >= 0.0) {
            return bad(
                "min_child_weight",
                format!("must be non-negative, got {}", self.min_child_weight),
            );
        }
        if !(self.reg_alpha.is_finite() && self.reg_alpha >= 0.0) {
            return bad("reg_alpha", format!("must be non-negative, got {}", self.reg_alpha));
        }
        if !(self.reg_lambda.is_finite() && self.reg_lambda >= 0.0) {
            return bad("reg_lambda", format!("must be non-negative, got {}", self.reg_lambda));
        }
        if !(self.scale_pos_weight.is_finite() && self.scale_pos_weight > 0.0) {
            return bad(
                "scale_pos_weight",
                format!("must be positive, got {}", self.scale_pos_weight),
            );
        }
        if !(self.colsample_bytree > 0.0 && self.colsample_bytree <= 1.0) {
            return bad(
                "colsample_bytree",
                format!("must be in (0, 1], got {}", self.colsample_bytree),
            );
        }
        Ok(())
    }

    /// Features available to the tree of `round`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn features_for_round(&self, n_features: usize, round: usize) -> Vec<usize> {
        let mut features: Vec<usize> = (0..n_features).collect();
        if self.colsample_bytree >= 1.0 {
            return features;
        }
        let keep = ((n_features as f64 * self.colsample_bytree).round() as usize).max(1);
        let mut rng = fastrand::Rng::with_seed(self.seed.wrapping_add(round as u64));
        rng.shuffle(&mut features);
        features.truncate(keep);
        features.sort_unstable();
        features
    }
}

/// A trained model.
#[derive(Clone, Debug)]
pub struct Booster {
    init_score: f64,
    trees: Vec<Tree>,
    best_iteration: usize,
    best_score: f64,
    valid_history: Vec<f64>,
}

impl Booster {
    fn raw_score(&self, row: &[f64]) -> f64 {
        self.trees[..self.best_iteration]
            .iter()
            .fold(self.init_score, |acc, tree| acc + tree.predict(row))
    }

    /// Probability of the positive class for every row of `data`.
    #[must_use]
    pub fn predict_proba(&self, data: &Dataset) -> Vec<f64> {
        data.features()
            .iter()
            .map(|row| loss::sigmoid(self.raw_score(row)))
            .collect()
    }

    /// Predicted labels: 1 where the probability exceeds 0.5.
    #[must_use]
    pub fn predict(&self, data: &Dataset) -> Vec<u8> {
        self.predict_proba(data)
            .into_iter()
            .map(|p| u8::from(p > 0.5))
            .collect()
    }

    /// Number of trees used for prediction. 0 means the constant model.
    #[must_use]
    pub fn best_iteration(&self) -> usize {
        self.best_iteration
    }

    /// Validation loss at [`best_iteration`](Self::best_iteration).
    #[must_use]
    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    /// Number of trees trained, including those past the best round.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Leaf count of every trained tree.
    #[must_use]
    pub fn tree_leaf_counts(&self) -> Vec<usize> {
        self.trees.iter().map(Tree::n_leaves).collect()
    }

    /// Validation loss after each round, starting with the constant model.
    #[must_use]
    pub fn valid_history(&self) -> &[f64] {
        &self.valid_history
    }
}

/// Trains a booster on `train_set`, evaluating on `valid_set` after every
/// round.
///
/// Every callback runs after each round, in order, before the early
/// stopping check. Training ends when:
///
/// - `n_estimators` rounds have run,
/// - no tree in a round can make a split,
/// - a callback returns `ControlFlow::Break`, or
/// - the validation loss has not improved for `early_stopping_rounds`
///   rounds.
///
/// # Errors
///
/// - `Error::InvalidBoosterParam` if `params` fails validation.
/// - `Error::InvalidDataset` if the two sets disagree on feature count or
///   either is empty.
/// - `Error::Training` if a loss becomes non-finite.
/// - Any error returned by a callback, unchanged.
pub fn train(
    params: &BoosterParams,
    train_set: &Dataset,
    valid_set: &Dataset,
    callbacks: &mut [&mut dyn TrainingCallback],
) -> Result<Booster> {
    params.validate()?;
    if train_set.n_samples() == 0 || valid_set.n_samples() == 0 {
        return Err(Error::InvalidDataset("train and valid sets must not be empty".into()));
    }
    if train_set.n_features() != valid_set.n_features() {
        return Err(Error::InvalidDataset(format!(
            "train has {} features but valid has {}",
            train_set.n_features(),
            valid_set.n_features()
        )));
    }

    let x = train_set.features();
    let y = train_set.labels();
    let init_score = loss::init_score(y);

    let mut train_scores = vec![init_score; y.len()];
    let mut valid_scores = vec![init_score; valid_set.n_samples()];
    let mut grad = vec![0.0; y.len()];
    let mut hess = vec![0.0; y.len()];

    let baseline = loss::binary_logloss(&valid_scores, valid_set.labels());
    let mut booster = Booster {
        init_score,
        trees: Vec::new(),
        best_iteration: 0,
        best_score: baseline,
        valid_history: vec![baseline],
    };

    for round in 0..params.n_estimators {
        loss::gradients(&train_scores, y, params.scale_pos_weight, &mut grad, &mut hess);

        let features = params.features_for_round(train_set.n_features(), round);
        let Some(tree) = Tree::grow(x, &grad, &hess, &features, params) else {
            trace_debug!(round, "no valid split; stopping");
            break;
        };

        for (score, row) in train_scores.iter_mut().zip(x) {
            *score += tree.predict(row);
        }
        for (score, row) in valid_scores.iter_mut().zip(valid_set.features()) {
            *score += tree.predict(row);
        }
        booster.trees.push(tree);

        let train_loss = loss::binary_logloss(&train_scores, y);
        let valid_loss = loss::binary_logloss(&valid_scores, valid_set.labels());
        if !train_loss.is_finite() || !valid_loss.is_finite() {
            return Err(Error::Training {
                round,
                reason: format!("non-finite loss (train {train_loss}, valid {valid_loss})"),
            });
        }
        booster.valid_history.push(valid_loss);

        if valid_loss < booster.best_score {
            booster.best_score = valid_loss;
            booster.best_iteration = round + 1;
        }

        let mut stop = false;
        for callback in callbacks.iter_mut() {
            if callback.after_round(round, valid_loss)?.is_break() {
                stop = true;
            }
        }
        if stop {
            break;
        }

        if params.early_stopping_rounds > 0
            && round + 1 - booster.best_iteration >= params.early_stopping_rounds
        {
            trace_info!(
                round,
                best_iteration = booster.best_iteration,
                best_score = booster.best_score,
                "early stopping"
            );
            break;
        }
    }

    Ok(booster)
}
