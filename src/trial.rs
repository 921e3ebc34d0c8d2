//! Trial implementation for tracking sampled parameters and trial state.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::distribution::Distribution;
use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::parameter::{ParamId, Parameter};
use crate::pruner::Pruner;
use crate::sampler::{CompletedTrial, Sampler};
use crate::types::TrialState;

/// A user attribute value attached to a trial.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AttrValue {
    /// A floating-point attribute.
    Float(f64),
    /// An integer attribute.
    Int(i64),
    /// A string attribute.
    String(String),
}

impl core::fmt::Display for AttrValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<usize> for AttrValue {
    fn from(v: usize) -> Self {
        Self::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// A trial represents a single evaluation of the objective function.
///
/// Each trial has a unique ID and stores the sampled parameters along with
/// their distributions. The trial progresses through states:
/// Running -> Complete/Pruned/Failed.
///
/// Trials created through [`Study::create_trial`](crate::Study::create_trial)
/// carry the study's sampler, pruner and a shared view of the trial history.
/// A bare [`Trial::new`] samples uniformly at random and never prunes.
#[derive(Clone)]
pub struct Trial {
    id: u64,
    state: TrialState,
    params: HashMap<ParamId, ParamValue>,
    distributions: HashMap<ParamId, Distribution>,
    param_labels: HashMap<ParamId, String>,
    /// `(step, value)` pairs in the order they were reported.
    intermediate_values: Vec<(u64, f64)>,
    user_attrs: BTreeMap<String, AttrValue>,
    sampler: Option<Arc<dyn Sampler>>,
    /// Shared with the owning study.
    history: Option<Arc<RwLock<Vec<CompletedTrial>>>>,
    pruner: Option<Arc<dyn Pruner>>,
}

impl core::fmt::Debug for Trial {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Trial")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("params", &self.params)
            .field("param_labels", &self.param_labels)
            .field("intermediate_values", &self.intermediate_values)
            .field("has_sampler", &self.sampler.is_some())
            .field("has_pruner", &self.pruner.is_some())
            .finish_non_exhaustive()
    }
}

impl Trial {
    /// Creates a new trial with the given ID.
    ///
    /// The trial starts in the `Running` state with no parameters sampled.
    /// It has no sampler, so suggestions are drawn uniformly at random, and
    /// no pruner, so [`should_prune`](Self::should_prune) is always `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use boost_tuner::Trial;
    ///
    /// let trial = Trial::new(0);
    /// assert_eq!(trial.id(), 0);
    /// ```
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            state: TrialState::Running,
            params: HashMap::new(),
            distributions: HashMap::new(),
            param_labels: HashMap::new(),
            intermediate_values: Vec::new(),
            user_attrs: BTreeMap::new(),
            sampler: None,
            history: None,
            pruner: None,
        }
    }

    /// Creates a trial wired to a study's sampler, history and pruner.
    pub(crate) fn with_sampler(
        id: u64,
        sampler: Arc<dyn Sampler>,
        history: Arc<RwLock<Vec<CompletedTrial>>>,
        pruner: Arc<dyn Pruner>,
    ) -> Self {
        Self {
            sampler: Some(sampler),
            history: Some(history),
            pruner: Some(pruner),
            ..Self::new(id)
        }
    }

    fn sample_value(&self, param_id: ParamId, distribution: &Distribution) -> ParamValue {
        if let (Some(sampler), Some(history)) = (&self.sampler, &self.history) {
            let history_guard = history.read();
            sampler.sample(param_id, distribution, self.id, &history_guard)
        } else {
            let mut rng = fastrand::Rng::new();
            crate::sampler::random::sample_uniform(distribution, &mut rng)
        }
    }

    /// Returns the unique ID of this trial.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the current state of this trial.
    #[must_use]
    pub fn state(&self) -> TrialState {
        self.state
    }

    /// Returns a reference to the sampled parameters.
    #[must_use]
    pub fn params(&self) -> &HashMap<ParamId, ParamValue> {
        &self.params
    }

    /// Returns a reference to the parameter labels.
    #[must_use]
    pub fn param_labels(&self) -> &HashMap<ParamId, String> {
        &self.param_labels
    }

    /// Returns the `(step, value)` pairs reported so far.
    #[must_use]
    pub fn intermediate_values(&self) -> &[(u64, f64)] {
        &self.intermediate_values
    }

    /// Returns the most recently reported intermediate value.
    #[must_use]
    pub fn last_reported_value(&self) -> Option<f64> {
        self.intermediate_values.last().map(|&(_, v)| v)
    }

    /// Suggests a parameter value using a [`Parameter`] definition.
    ///
    /// Suggesting the same parameter twice returns the cached value.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parameter fails validation
    /// - The parameter conflicts with a previously suggested parameter of the same id
    /// - Sampling or conversion fails
    ///
    /// # Examples
    ///
    /// ```
    /// use boost_tuner::Trial;
    /// use boost_tuner::parameter::{FloatParam, IntParam};
    ///
    /// let x_param = FloatParam::new(0.0, 1.0);
    /// let n_param = IntParam::new(1, 10);
    ///
    /// let mut trial = Trial::new(0);
    ///
    /// let x = trial.suggest_param(&x_param).unwrap();
    /// let n = trial.suggest_param(&n_param).unwrap();
    /// assert_eq!(trial.suggest_param(&n_param).unwrap(), n);
    /// ```
    pub fn suggest_param<P: Parameter>(&mut self, param: &P) -> Result<P::Value> {
        param.validate()?;

        let param_id = param.id();
        let distribution = param.distribution();

        if let Some(existing_dist) = self.distributions.get(&param_id) {
            if *existing_dist == distribution
                && let Some(value) = self.params.get(&param_id)
            {
                return param.cast_param_value(value);
            }
            return Err(Error::ParameterConflict {
                name: param.label(),
                reason: "parameter was previously sampled with a different configuration"
                    .to_string(),
            });
        }

        let value = self.sample_value(param_id, &distribution);
        let result = param.cast_param_value(&value)?;

        self.distributions.insert(param_id, distribution);
        self.params.insert(param_id, value);
        self.param_labels.insert(param_id, param.label());

        Ok(result)
    }

    /// Records an intermediate objective value at `step`.
    ///
    /// Reporting the same step twice overwrites the earlier value.
    pub fn report(&mut self, step: u64, value: f64) {
        if let Some(entry) = self.intermediate_values.iter_mut().find(|(s, _)| *s == step) {
            entry.1 = value;
        } else {
            self.intermediate_values.push((step, value));
        }
    }

    /// Asks the study's pruner whether this trial should stop now.
    ///
    /// Returns `false` before anything has been reported, or when the trial
    /// has no pruner.
    #[must_use]
    pub fn should_prune(&self) -> bool {
        let (Some(pruner), Some(history)) = (&self.pruner, &self.history) else {
            return false;
        };
        let Some(&(step, _)) = self.intermediate_values.last() else {
            return false;
        };
        let history_guard = history.read();
        pruner.should_prune(self.id, step, &self.intermediate_values, &history_guard)
    }

    /// Attaches a user attribute to this trial.
    pub fn set_user_attr(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.user_attrs.insert(key.into(), value.into());
    }

    /// Returns a user attribute by key.
    #[must_use]
    pub fn user_attr(&self, key: &str) -> Option<&AttrValue> {
        self.user_attrs.get(key)
    }

    /// Freezes this trial into a [`CompletedTrial`] with the given final state.
    pub(crate) fn into_completed(mut self, value: f64, state: TrialState) -> CompletedTrial {
        self.state = state;
        CompletedTrial {
            id: self.id,
            params: self.params,
            distributions: self.distributions,
            param_labels: self.param_labels,
            value,
            intermediate_values: self.intermediate_values,
            state,
            user_attrs: self.user_attrs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{FloatParam, IntParam};

    #[test]
    fn report_overwrites_same_step() {
        let mut trial = Trial::new(0);
        trial.report(0, 1.0);
        trial.report(1, 0.5);
        trial.report(1, 0.4);
        assert_eq!(trial.intermediate_values(), &[(0, 1.0), (1, 0.4)]);
        assert_eq!(trial.last_reported_value(), Some(0.4));
    }

    #[test]
    fn bare_trial_never_prunes() {
        let mut trial = Trial::new(3);
        trial.report(0, f64::NAN);
        assert!(!trial.should_prune());
    }

    #[derive(Debug)]
    struct FixedIdParam {
        id: ParamId,
        high: i64,
    }

    impl Parameter for FixedIdParam {
        type Value = i64;

        fn id(&self) -> ParamId {
            self.id
        }

        fn distribution(&self) -> Distribution {
            IntParam::new(1, self.high).distribution()
        }

        fn cast_param_value(&self, param_value: &ParamValue) -> Result<i64> {
            match param_value {
                ParamValue::Int(v) => Ok(*v),
                ParamValue::Float(_) => Err(Error::Internal("expected Int")),
            }
        }
    }

    #[test]
    fn conflicting_redefinition_is_rejected() {
        let mut trial = Trial::new(0);
        let id = ParamId::new();
        let first = trial.suggest_param(&FixedIdParam { id, high: 10 }).unwrap();

        assert_eq!(
            trial.suggest_param(&FixedIdParam { id, high: 10 }).unwrap(),
            first
        );
        assert!(matches!(
            trial.suggest_param(&FixedIdParam { id, high: 20 }),
            Err(Error::ParameterConflict { .. })
        ));
    }

    #[test]
    fn into_completed_keeps_everything() {
        let mut trial = Trial::new(7);
        let x = FloatParam::new(0.0, 1.0).name("x");
        let v = trial.suggest_param(&x).unwrap();
        trial.report(0, 0.9);
        trial.set_user_attr("note", "hello");

        let done = trial.into_completed(0.9, TrialState::Pruned);
        assert_eq!(done.id, 7);
        assert_eq!(done.state, TrialState::Pruned);
        assert_eq!(done.get(&x), Some(v));
        assert_eq!(done.last_intermediate_value(), Some(0.9));
        assert_eq!(
            done.user_attr("note"),
            Some(&AttrValue::String("hello".into()))
        );
    }
}
