//! Named, ordered search spaces.
//!
//! A [`SearchSpace`] maps hyperparameter names to sampling rules. Entries
//! are sampled in declaration order, and each entry keeps the same
//! [`ParamId`](crate::parameter::ParamId) for the whole run, so a sampler can
//! line up a parameter's past values across trials.

use std::collections::{BTreeMap, HashSet};

use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::parameter::{FloatParam, IntParam, Parameter};
use crate::trial::Trial;

/// One entry of a [`SearchSpace`].
#[derive(Clone, Debug)]
pub enum SpaceEntry {
    /// An integer range.
    Int(IntParam),
    /// A float range, optionally log-scaled.
    Float(FloatParam),
}

impl SpaceEntry {
    fn validate(&self) -> Result<()> {
        match self {
            Self::Int(p) => p.validate(),
            Self::Float(p) => p.validate(),
        }
    }

    fn suggest(&self, trial: &mut Trial) -> Result<ParamValue> {
        match self {
            Self::Int(p) => p.suggest(trial).map(ParamValue::Int),
            Self::Float(p) => p.suggest(trial).map(ParamValue::Float),
        }
    }
}

/// An ordered map from hyperparameter name to sampling rule.
///
/// # Examples
///
/// ```
/// use boost_tuner::search_space::SearchSpace;
/// use boost_tuner::Trial;
///
/// let space = SearchSpace::new()
///     .int("n_estimators", 10, 1000)
///     .float_log("learning_rate", 0.001, 0.5);
/// space.validate().unwrap();
///
/// let mut trial = Trial::new(0);
/// let config = space.suggest(&mut trial).unwrap();
/// assert_eq!(config.len(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct SearchSpace {
    entries: Vec<(String, SpaceEntry)>,
}

impl SearchSpace {
    /// Creates an empty search space.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The hyperparameter ranges tuned by the booster experiment.
    ///
    /// | name | rule |
    /// |------|------|
    /// | `n_estimators` | int \[10, 1000\] |
    /// | `learning_rate` | log-uniform \[0.001, 0.5\] |
    /// | `num_leaves` | int \[10, 100\] |
    /// | `min_child_samples` | int \[10, 100\] |
    /// | `reg_alpha` | log-uniform \[0.001, 2.0\] |
    /// | `reg_lambda` | log-uniform \[0.001, 2.0\] |
    /// | `max_depth` | int \[1, 10\] |
    /// | `scale_pos_weight` | uniform \[1.0, 5.0\] |
    #[must_use]
    pub fn booster_default() -> Self {
        Self::new()
            .int("n_estimators", 10, 1000)
            .float_log("learning_rate", 0.001, 0.5)
            .int("num_leaves", 10, 100)
            .int("min_child_samples", 10, 100)
            .float_log("reg_alpha", 0.001, 2.0)
            .float_log("reg_lambda", 0.001, 2.0)
            .int("max_depth", 1, 10)
            .float("scale_pos_weight", 1.0, 5.0)
    }

    /// Adds a uniform integer range.
    #[must_use]
    pub fn int(self, name: impl Into<String>, low: i64, high: i64) -> Self {
        let name = name.into();
        let param = IntParam::new(low, high).name(name.clone());
        self.entry(name, SpaceEntry::Int(param))
    }

    /// Adds a uniform float range.
    #[must_use]
    pub fn float(self, name: impl Into<String>, low: f64, high: f64) -> Self {
        let name = name.into();
        let param = FloatParam::new(low, high).name(name.clone());
        self.entry(name, SpaceEntry::Float(param))
    }

    /// Adds a log-uniform float range.
    #[must_use]
    pub fn float_log(self, name: impl Into<String>, low: f64, high: f64) -> Self {
        let name = name.into();
        let param = FloatParam::new(low, high).log_scale().name(name.clone());
        self.entry(name, SpaceEntry::Float(param))
    }

    /// Adds a pre-built entry, such as a stepped or log-scaled integer.
    #[must_use]
    pub fn entry(mut self, name: impl Into<String>, entry: SpaceEntry) -> Self {
        self.entries.push((name.into(), entry));
        self
    }

    /// Returns the entry names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the space has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks every entry's bounds and rejects duplicate names.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateParameter`, `Error::InvalidBounds`,
    /// `Error::InvalidLogBounds` or `Error::InvalidStep`.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (name, entry) in &self.entries {
            if !seen.insert(name.as_str()) {
                return Err(Error::DuplicateParameter(name.clone()));
            }
            entry.validate()?;
        }
        Ok(())
    }

    /// Samples every entry through `trial`, in declaration order.
    ///
    /// # Errors
    ///
    /// Propagates validation and sampling errors from the trial.
    pub fn suggest(&self, trial: &mut Trial) -> Result<BTreeMap<String, ParamValue>> {
        self.entries
            .iter()
            .map(|(name, entry)| Ok((name.clone(), entry.suggest(trial)?)))
            .collect()
    }
}
