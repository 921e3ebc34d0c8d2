use core::ops::ControlFlow;

use crate::error::{Error, Result};
use crate::objective::Objective;
use crate::types::TrialState;

use super::{Study, is_trial_pruned};

impl Study {
    /// Run optimization with an objective.
    ///
    /// Accepts any [`Objective`] implementation, including plain closures
    /// (`Fn(&mut Trial) -> Result<f64, E>`) thanks to the blanket impl.
    ///
    /// Runs up to `n_trials` evaluations sequentially. A trial that returns
    /// a pruning error is recorded as pruned and the loop goes on.
    ///
    /// # Errors
    ///
    /// - `Error::TrialFailed` as soon as the objective returns any other
    ///   error. The trial is recorded as failed and no retry happens.
    /// - `Error::NoCompletedTrials` if no trial completed successfully.
    ///
    /// # Examples
    ///
    /// ```
    /// use boost_tuner::parameter::{FloatParam, Parameter};
    /// use boost_tuner::sampler::RandomSampler;
    /// use boost_tuner::{Direction, Study};
    ///
    /// let sampler = RandomSampler::with_seed(42);
    /// let study = Study::with_sampler(Direction::Minimize, sampler);
    /// let x_param = FloatParam::new(-10.0, 10.0);
    ///
    /// study
    ///     .optimize(10, |trial: &mut boost_tuner::Trial| {
    ///         let x = x_param.suggest(trial)?;
    ///         Ok::<_, boost_tuner::Error>(x * x)
    ///     })
    ///     .unwrap();
    ///
    /// assert_eq!(study.n_trials(), 10);
    /// assert!(study.best_value().unwrap() >= 0.0);
    /// ```
    #[allow(clippy::needless_pass_by_value)]
    pub fn optimize(&self, n_trials: usize, objective: impl Objective) -> Result<()> {
        #[cfg(feature = "tracing")]
        let _span =
            tracing::info_span!("optimize", n_trials, direction = ?self.direction).entered();

        for _ in 0..n_trials {
            if let ControlFlow::Break(()) = objective.before_trial(self) {
                break;
            }

            let mut trial = self.create_trial();
            let trial_id = trial.id();
            match objective.evaluate(&mut trial) {
                Ok(value) => {
                    let completed = trial.into_completed(value, TrialState::Complete);

                    // after_trial sees the trial before it joins the history
                    let flow = objective.after_trial(self, &completed);
                    self.push(completed);

                    #[cfg(feature = "tracing")]
                    {
                        tracing::info!(trial_id, value, "trial completed");
                        let trials = self.trials.read();
                        if trials.last().map(|t| t.id) == self.best_id(&trials) {
                            tracing::info!(trial_id, value, "new best value found");
                        }
                    }

                    if let ControlFlow::Break(()) = flow {
                        return Ok(());
                    }
                }
                Err(e) if is_trial_pruned(&e) => {
                    trace_info!(trial_id, last = ?trial.last_reported_value(), "trial pruned");
                    self.prune_trial(trial);
                }
                Err(e) => {
                    let message = e.to_string();
                    self.fail_trial(trial, &message);
                    trace_debug!(trial_id, %message, "trial failed");
                    return Err(Error::TrialFailed { trial_id, message });
                }
            }
        }

        if self.n_trials() == 0 {
            return Err(Error::NoCompletedTrials);
        }

        Ok(())
    }
}
