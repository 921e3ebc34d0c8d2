//! Study implementation for managing optimization trials.

use core::any::Any;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::pruner::{NopPruner, Pruner};
use crate::sampler::random::RandomSampler;
use crate::sampler::{CompletedTrial, Sampler};
use crate::trial::Trial;
use crate::types::{Direction, TrialState};

mod analysis;
mod builder;
mod export;
mod optimize;

pub use builder::StudyBuilder;

/// A study manages the optimization process, tracking trials and their results.
///
/// Objective values are `f64`. Complete and pruned trials are kept in
/// recording order behind a shared lock, so trials created by the study can
/// read the history while they sample parameters or ask the pruner.
///
/// # Examples
///
/// ```
/// use boost_tuner::{Direction, Study};
///
/// let study = Study::new(Direction::Minimize);
/// assert_eq!(study.direction(), Direction::Minimize);
/// ```
pub struct Study {
    pub(crate) direction: Direction,
    pub(crate) sampler: Arc<dyn Sampler>,
    pub(crate) pruner: Arc<dyn Pruner>,
    /// Finished trials in the order they were recorded.
    pub(crate) trials: Arc<RwLock<Vec<CompletedTrial>>>,
    next_trial_id: AtomicU64,
}

impl Study {
    /// Create a new study with the given optimization direction.
    ///
    /// Uses an unseeded [`RandomSampler`] and no pruning.
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self::with_sampler(direction, RandomSampler::new())
    }

    /// Return a [`StudyBuilder`] for constructing a study with a fluent API.
    ///
    /// # Examples
    ///
    /// ```
    /// use boost_tuner::prelude::*;
    ///
    /// let study = Study::builder()
    ///     .minimize()
    ///     .sampler(TpeSampler::new())
    ///     .pruner(NopPruner)
    ///     .build();
    /// ```
    #[must_use]
    pub fn builder() -> StudyBuilder {
        StudyBuilder::new()
    }

    /// Create a new study with a custom sampler.
    ///
    /// # Examples
    ///
    /// ```
    /// use boost_tuner::sampler::RandomSampler;
    /// use boost_tuner::{Direction, Study};
    ///
    /// let sampler = RandomSampler::with_seed(42);
    /// let study = Study::with_sampler(Direction::Maximize, sampler);
    /// assert_eq!(study.direction(), Direction::Maximize);
    /// ```
    pub fn with_sampler(direction: Direction, sampler: impl Sampler + 'static) -> Self {
        Self::with_sampler_and_pruner(direction, sampler, NopPruner)
    }

    /// Creates a study with a custom sampler and pruner.
    ///
    /// # Examples
    ///
    /// ```
    /// use boost_tuner::pruner::MedianPruner;
    /// use boost_tuner::sampler::TpeSampler;
    /// use boost_tuner::{Direction, Study};
    ///
    /// let study = Study::with_sampler_and_pruner(
    ///     Direction::Minimize,
    ///     TpeSampler::new(),
    ///     MedianPruner::new(Direction::Minimize),
    /// );
    /// ```
    pub fn with_sampler_and_pruner(
        direction: Direction,
        sampler: impl Sampler + 'static,
        pruner: impl Pruner + 'static,
    ) -> Self {
        Self::from_parts(direction, Arc::new(sampler), Arc::new(pruner))
    }

    pub(crate) fn from_parts(
        direction: Direction,
        sampler: Arc<dyn Sampler>,
        pruner: Arc<dyn Pruner>,
    ) -> Self {
        Self {
            direction,
            sampler,
            pruner,
            trials: Arc::new(RwLock::new(Vec::new())),
            next_trial_id: AtomicU64::new(0),
        }
    }

    /// Return the optimization direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Return a reference to the study's pruner.
    #[must_use]
    pub fn pruner(&self) -> &dyn Pruner {
        &*self.pruner
    }

    /// Create a new trial with a unique ID.
    ///
    /// The trial samples through the study's sampler, sees the study's
    /// history, and consults the study's pruner from
    /// [`Trial::should_prune`].
    ///
    /// # Examples
    ///
    /// ```
    /// use boost_tuner::{Direction, Study};
    ///
    /// let study = Study::new(Direction::Minimize);
    /// let trial = study.create_trial();
    /// assert_eq!(trial.id(), 0);
    ///
    /// let trial2 = study.create_trial();
    /// assert_eq!(trial2.id(), 1);
    /// ```
    #[must_use]
    pub fn create_trial(&self) -> Trial {
        let id = self.next_trial_id.fetch_add(1, Ordering::Relaxed);
        Trial::with_sampler(
            id,
            Arc::clone(&self.sampler),
            Arc::clone(&self.trials),
            Arc::clone(&self.pruner),
        )
    }

    /// Request a new trial. Alias of [`create_trial`](Self::create_trial)
    /// for the ask-and-tell interface.
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
    /// let mut trial = study.ask();
    /// let x_val = x.suggest(&mut trial).unwrap();
    /// study.tell(trial, Ok::<_, &str>(x_val * x_val));
    /// assert_eq!(study.n_trials(), 1);
    /// ```
    #[must_use]
    pub fn ask(&self) -> Trial {
        self.create_trial()
    }

    /// Report the result of a trial obtained from [`ask()`](Self::ask).
    ///
    /// `Ok(value)` completes the trial. An error that is a pruning signal
    /// records the trial as pruned; any other error records it as failed.
    pub fn tell<E: ToString + 'static>(&self, trial: Trial, value: core::result::Result<f64, E>) {
        match value {
            Ok(v) => self.complete_trial(trial, v),
            Err(e) if is_trial_pruned(&e) => self.prune_trial(trial),
            Err(e) => self.fail_trial(trial, e),
        }
    }

    /// Record a completed trial with its objective value.
    ///
    /// # Examples
    ///
    /// ```
    /// use boost_tuner::parameter::{FloatParam, Parameter};
    /// use boost_tuner::{Direction, Study};
    ///
    /// let study = Study::new(Direction::Minimize);
    /// let x_param = FloatParam::new(0.0, 1.0);
    /// let mut trial = study.create_trial();
    /// let x = x_param.suggest(&mut trial).unwrap();
    /// study.complete_trial(trial, x * x);
    ///
    /// assert_eq!(study.n_trials(), 1);
    /// ```
    pub fn complete_trial(&self, trial: Trial, value: f64) {
        self.push(trial.into_completed(value, TrialState::Complete));
    }

    /// Record a pruned trial.
    ///
    /// Its score is the last intermediate value it reported, or NaN when it
    /// reported nothing. Pruned trials are visible to samplers and pruners
    /// but never compete for the best trial.
    pub fn prune_trial(&self, trial: Trial) {
        let value = trial.last_reported_value().unwrap_or(f64::NAN);
        self.push(trial.into_completed(value, TrialState::Pruned));
    }

    /// Record a failed trial.
    ///
    /// The trial is kept in the history with a NaN value so that exports show
    /// it. Samplers and the best-trial lookup ignore it.
    pub fn fail_trial(&self, mut trial: Trial, error: impl ToString) {
        trial.set_user_attr("fail_reason", error.to_string());
        self.push(trial.into_completed(f64::NAN, TrialState::Failed));
    }

    fn push(&self, trial: CompletedTrial) {
        self.trials.write().push(trial);
    }

    /// Return all recorded trials (complete, pruned and failed) as a `Vec`.
    #[must_use]
    pub fn trials(&self) -> Vec<CompletedTrial> {
        self.trials.read().clone()
    }

    /// Return the number of completed trials.
    ///
    /// Pruned and failed trials are not counted.
    #[must_use]
    pub fn n_trials(&self) -> usize {
        self.count_state(TrialState::Complete)
    }

    /// Return the number of pruned trials.
    #[must_use]
    pub fn n_pruned_trials(&self) -> usize {
        self.count_state(TrialState::Pruned)
    }

    fn count_state(&self, state: TrialState) -> usize {
        self.trials.read().iter().filter(|t| t.state == state).count()
    }

    /// Rank two trials so that the better one compares as `Less`.
    ///
    /// NaN values rank after every number.
    pub(crate) fn rank_trials(
        a: &CompletedTrial,
        b: &CompletedTrial,
        direction: Direction,
    ) -> core::cmp::Ordering {
        use core::cmp::Ordering;

        match (a.value.is_nan(), b.value.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ord = a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal);
                match direction {
                    Direction::Minimize => ord,
                    Direction::Maximize => ord.reverse(),
                }
            }
        }
    }

    /// Return the trial ID of the current best trial from the given slice.
    #[cfg(feature = "tracing")]
    pub(crate) fn best_id(&self, trials: &[CompletedTrial]) -> Option<u64> {
        let direction = self.direction;
        trials
            .iter()
            .filter(|t| t.state == TrialState::Complete)
            .min_by(|a, b| Self::rank_trials(a, b, direction))
            .map(|t| t.id)
    }
}

/// Returns `true` if the error represents a pruned trial.
///
/// Checks via `Any` downcasting whether `e` is `Error::TrialPruned` or
/// the standalone `TrialPruned` struct.
pub(super) fn is_trial_pruned<E: 'static>(e: &E) -> bool {
    let any: &dyn Any = e;
    if let Some(err) = any.downcast_ref::<crate::Error>() {
        matches!(err, crate::Error::TrialPruned)
    } else {
        any.downcast_ref::<crate::error::TrialPruned>().is_some()
    }
}
