use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::sampler::CompletedTrial;
use crate::types::TrialState;

use super::Study;

impl Study {
    /// Return the trial with the best objective value.
    ///
    /// Only Complete trials take part. When several trials share the best
    /// value, the one recorded first wins.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCompletedTrials` if no trials have been completed.
    ///
    /// # Examples
    ///
    /// ```
    /// use boost_tuner::parameter::{FloatParam, Parameter};
    /// use boost_tuner::{Direction, Study};
    ///
    /// let study = Study::new(Direction::Minimize);
    ///
    /// // Error when no trials completed
    /// assert!(study.best_trial().is_err());
    ///
    /// let x_param = FloatParam::new(0.0, 1.0);
    ///
    /// let mut trial1 = study.create_trial();
    /// let _ = x_param.suggest(&mut trial1);
    /// study.complete_trial(trial1, 0.8);
    ///
    /// let mut trial2 = study.create_trial();
    /// let _ = x_param.suggest(&mut trial2);
    /// study.complete_trial(trial2, 0.3);
    ///
    /// let best = study.best_trial().unwrap();
    /// assert_eq!(best.value, 0.3);
    /// ```
    pub fn best_trial(&self) -> Result<CompletedTrial> {
        let trials = self.trials.read();
        let direction = self.direction;

        // min_by keeps the first of several equal minima
        trials
            .iter()
            .filter(|t| t.state == TrialState::Complete)
            .min_by(|a, b| Self::rank_trials(a, b, direction))
            .cloned()
            .ok_or(Error::NoCompletedTrials)
    }

    /// Return the best objective value found so far.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCompletedTrials` if no trials have been completed.
    pub fn best_value(&self) -> Result<f64> {
        self.best_trial().map(|trial| trial.value)
    }

    /// Return the best trial's parameters keyed by their labels.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCompletedTrials` if no trials have been completed.
    pub fn best_params(&self) -> Result<BTreeMap<String, ParamValue>> {
        self.best_trial().map(|trial| trial.named_params())
    }

    /// Return the top `n` completed trials, best first.
    ///
    /// Ties keep their recording order. If fewer than `n` completed trials
    /// exist, returns all of them.
    ///
    /// # Examples
    ///
    /// ```
    /// use boost_tuner::parameter::{FloatParam, Parameter};
    /// use boost_tuner::{Direction, Study};
    ///
    /// let study = Study::new(Direction::Minimize);
    /// let x = FloatParam::new(0.0, 10.0);
    ///
    /// for val in [5.0, 1.0, 3.0] {
    ///     let mut t = study.create_trial();
    ///     let _ = x.suggest(&mut t);
    ///     study.complete_trial(t, val);
    /// }
    ///
    /// let top2 = study.top_trials(2);
    /// assert_eq!(top2.len(), 2);
    /// assert!(top2[0].value <= top2[1].value);
    /// ```
    #[must_use]
    pub fn top_trials(&self, n: usize) -> Vec<CompletedTrial> {
        let trials = self.trials.read();
        let direction = self.direction;
        let mut complete: Vec<&CompletedTrial> = trials
            .iter()
            .filter(|t| t.state == TrialState::Complete)
            .collect();
        complete.sort_by(|a, b| Self::rank_trials(a, b, direction));
        complete.into_iter().take(n).cloned().collect()
    }

    /// Return `(trial_id, value, best_so_far)` for every Complete trial in
    /// recording order.
    #[must_use]
    pub fn history(&self) -> Vec<(u64, f64, f64)> {
        let trials = self.trials.read();
        let mut best: Option<f64> = None;
        trials
            .iter()
            .filter(|t| t.state == TrialState::Complete)
            .map(|t| {
                let current = match best {
                    Some(b) if !self.direction.is_better(t.value, b) => b,
                    _ => t.value,
                };
                best = Some(current);
                (t.id, t.value, current)
            })
            .collect()
    }
}
