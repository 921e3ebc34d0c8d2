//! Sampler trait and implementations for parameter sampling.

pub mod random;
pub mod tpe;

use std::collections::{BTreeMap, HashMap};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use random::RandomSampler;
pub use tpe::{TpeSampler, TpeSamplerBuilder};

use crate::distribution::Distribution;
use crate::param::ParamValue;
use crate::parameter::{ParamId, Parameter};
use crate::trial::AttrValue;
use crate::types::TrialState;

/// A finished trial with its parameters, distributions, and objective value.
///
/// Pruned trials are stored as well. Their `value` is the last intermediate
/// value reported before the pruner stopped them.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompletedTrial {
    /// The unique identifier for this trial.
    pub id: u64,
    /// The sampled parameter values, keyed by parameter id.
    pub params: HashMap<ParamId, ParamValue>,
    /// The parameter distributions used, keyed by parameter id.
    pub distributions: HashMap<ParamId, Distribution>,
    /// Human-readable labels for parameters, keyed by parameter id.
    pub param_labels: HashMap<ParamId, String>,
    /// The objective value.
    pub value: f64,
    /// Intermediate objective values reported during the trial.
    pub intermediate_values: Vec<(u64, f64)>,
    /// The state of the trial (Complete, Pruned, or Failed).
    pub state: TrialState,
    /// User-defined attributes stored during the trial.
    #[cfg_attr(feature = "serde", serde(default))]
    pub user_attrs: BTreeMap<String, AttrValue>,
}

impl CompletedTrial {
    /// Creates a new completed trial.
    #[must_use]
    pub fn new(
        id: u64,
        params: HashMap<ParamId, ParamValue>,
        distributions: HashMap<ParamId, Distribution>,
        param_labels: HashMap<ParamId, String>,
        value: f64,
    ) -> Self {
        Self {
            id,
            params,
            distributions,
            param_labels,
            value,
            intermediate_values: Vec::new(),
            state: TrialState::Complete,
            user_attrs: BTreeMap::new(),
        }
    }

    /// Creates a new completed trial with intermediate values.
    #[must_use]
    pub fn with_intermediate_values(
        id: u64,
        params: HashMap<ParamId, ParamValue>,
        distributions: HashMap<ParamId, Distribution>,
        param_labels: HashMap<ParamId, String>,
        value: f64,
        intermediate_values: Vec<(u64, f64)>,
    ) -> Self {
        Self {
            intermediate_values,
            ..Self::new(id, params, distributions, param_labels, value)
        }
    }

    /// Returns the typed value for the given parameter.
    ///
    /// Returns `None` if the parameter was not used in this trial or the
    /// stored value does not match the parameter type.
    ///
    /// # Examples
    ///
    /// ```
    /// use boost_tuner::parameter::{FloatParam, Parameter};
    /// use boost_tuner::{Direction, Study};
    ///
    /// let study = Study::new(Direction::Minimize);
    /// let x = FloatParam::new(-10.0, 10.0);
    ///
    /// study
    ///     .optimize(5, |trial: &mut boost_tuner::Trial| {
    ///         let val = x.suggest(trial)?;
    ///         Ok::<_, boost_tuner::Error>(val * val)
    ///     })
    ///     .unwrap();
    ///
    /// let best = study.best_trial().unwrap();
    /// let x_val: f64 = best.get(&x).unwrap();
    /// assert!((-10.0..=10.0).contains(&x_val));
    /// ```
    pub fn get<P: Parameter>(&self, param: &P) -> Option<P::Value> {
        self.params
            .get(&param.id())
            .and_then(|v| param.cast_param_value(v).ok())
    }

    /// Return the sampled parameters keyed by their labels, in label order.
    #[must_use]
    pub fn named_params(&self) -> BTreeMap<String, ParamValue> {
        self.params
            .iter()
            .map(|(id, value)| {
                let label = self
                    .param_labels
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| id.to_string());
                (label, *value)
            })
            .collect()
    }

    /// Return the last reported intermediate value, if any.
    #[must_use]
    pub fn last_intermediate_value(&self) -> Option<f64> {
        self.intermediate_values.last().map(|&(_, v)| v)
    }

    /// Return the intermediate value reported at `step`, if any.
    #[must_use]
    pub fn intermediate_value_at(&self, step: u64) -> Option<f64> {
        self.intermediate_values
            .iter()
            .find(|(s, _)| *s == step)
            .map(|&(_, v)| v)
    }

    /// Gets a user attribute by key.
    #[must_use]
    pub fn user_attr(&self, key: &str) -> Option<&AttrValue> {
        self.user_attrs.get(key)
    }
}

/// Trait for pluggable parameter sampling strategies.
///
/// Samplers are responsible for generating parameter values based on
/// the distribution and historical trial data. The trait requires
/// `Send + Sync` so a study can be shared behind an `Arc`.
pub trait Sampler: Send + Sync {
    /// Samples a parameter value from the given distribution.
    ///
    /// # Arguments
    ///
    /// * `param_id` - The parameter being sampled; used to look up its past values.
    /// * `distribution` - The parameter distribution to sample from.
    /// * `trial_id` - The unique ID of the trial being sampled for.
    /// * `history` - Finished trials (complete and pruned) for informed sampling.
    fn sample(
        &self,
        param_id: ParamId,
        distribution: &Distribution,
        trial_id: u64,
        history: &[CompletedTrial],
    ) -> ParamValue;
}
