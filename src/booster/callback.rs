//! Hooks run by [`train`](super::train) after every boosting round.

use core::ops::ControlFlow;

use crate::error::{Error, Result};
use crate::trial::Trial;

/// Observes the validation loss after each boosting round.
///
/// Return `Ok(ControlFlow::Break(()))` to stop training at this round, or
/// an error to abort it. The error is passed through `train` unchanged.
pub trait TrainingCallback {
    /// Called once per round. `round` is 0-based.
    ///
    /// # Errors
    ///
    /// Implementations decide. [`PruningCallback`] returns
    /// `Error::TrialPruned`.
    fn after_round(&mut self, round: usize, valid_loss: f64) -> Result<ControlFlow<()>>;
}

/// Reports each round's validation loss to a trial and aborts training once
/// the study's pruner asks for it.
///
/// The loss is reported at step `round`. When
/// [`Trial::should_prune`] becomes true the callback returns
/// `Error::TrialPruned`, which the study records as a pruned trial.
pub struct PruningCallback<'a> {
    trial: &'a mut Trial,
}

impl<'a> PruningCallback<'a> {
    /// Wraps `trial` for the duration of one training run.
    pub fn new(trial: &'a mut Trial) -> Self {
        Self { trial }
    }
}

impl TrainingCallback for PruningCallback<'_> {
    fn after_round(&mut self, round: usize, valid_loss: f64) -> Result<ControlFlow<()>> {
        self.trial.report(round as u64, valid_loss);
        if self.trial.should_prune() {
            trace_debug!(trial_id = self.trial.id(), round, valid_loss, "pruning trial");
            return Err(Error::TrialPruned);
        }
        Ok(ControlFlow::Continue(()))
    }
}

/// Logs the validation loss every `period` rounds.
///
/// Lines look like `[100]\tvalid_0's binary_logloss: 0.4512`. A period of 0
/// logs nothing. Lines go to `tracing` at info level when the `tracing`
/// feature is on and to stderr otherwise.
#[derive(Clone, Copy, Debug)]
pub struct LogEvaluation {
    period: usize,
    emitted: usize,
}

impl LogEvaluation {
    /// Logs every `period` rounds.
    #[must_use]
    pub fn new(period: usize) -> Self {
        Self { period, emitted: 0 }
    }

    /// Number of lines written so far.
    #[must_use]
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// The line logged after `round`, if this round is due.
    #[must_use]
    pub fn line(&self, round: usize, valid_loss: f64) -> Option<String> {
        if self.period == 0 || (round + 1) % self.period != 0 {
            return None;
        }
        Some(format!(
            "[{}]\tvalid_0's binary_logloss: {valid_loss}",
            round + 1
        ))
    }
}

impl TrainingCallback for LogEvaluation {
    fn after_round(&mut self, round: usize, valid_loss: f64) -> Result<ControlFlow<()>> {
        if let Some(line) = self.line(round, valid_loss) {
            #[cfg(feature = "tracing")]
            trace_info!("{line}");
            #[cfg(not(feature = "tracing"))]
            eprintln!("{line}");
            self.emitted += 1;
        }
        Ok(ControlFlow::Continue(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pruner::MedianPruner;
    use crate::sampler::RandomSampler;
    use crate::study::Study;
    use crate::types::Direction;

    #[test]
    fn log_lines_follow_period() {
        let log = LogEvaluation::new(100);
        assert_eq!(log.line(0, 0.5), None);
        assert_eq!(
            log.line(99, 0.25).as_deref(),
            Some("[100]\tvalid_0's binary_logloss: 0.25")
        );
        assert_eq!(LogEvaluation::new(0).line(99, 0.25), None);
    }

    #[test]
    fn log_evaluation_writes_due_rounds() {
        let mut log = LogEvaluation::new(100);
        for round in 0..250 {
            assert!(log.after_round(round, 0.5).unwrap().is_continue());
        }
        assert_eq!(log.emitted(), 2);

        let mut silent = LogEvaluation::new(0);
        silent.after_round(99, 0.5).unwrap();
        assert_eq!(silent.emitted(), 0);
    }

    #[test]
    fn pruning_callback_reports_every_round() {
        let mut trial = Trial::new(0);
        let mut cb = PruningCallback::new(&mut trial);
        assert!(cb.after_round(0, 0.7).unwrap().is_continue());
        assert!(cb.after_round(1, 0.6).unwrap().is_continue());
        assert_eq!(trial.intermediate_values(), &[(0, 0.7), (1, 0.6)]);
    }

    #[test]
    fn pruning_callback_aborts_bad_trials() {
        let study = Study::with_sampler_and_pruner(
            Direction::Minimize,
            RandomSampler::with_seed(0),
            MedianPruner::new(Direction::Minimize).n_startup_trials(0),
        );
        for _ in 0..3 {
            let mut trial = study.ask();
            trial.report(0, 0.1);
            study.tell(trial, Ok::<_, Error>(0.1));
        }

        let mut trial = study.ask();
        let mut cb = PruningCallback::new(&mut trial);
        assert!(matches!(cb.after_round(0, 0.9), Err(Error::TrialPruned)));
    }
}
