use super::Pruner;
use crate::sampler::CompletedTrial;
use crate::types::{Direction, TrialState};

/// Prune trials that are performing worse than the median of completed trials
/// at the same step.
///
/// The trial's latest intermediate value is compared with the median of the
/// values that Complete trials reported at that same step. Pruned trials
/// never contribute to the median.
///
/// Pruning is skipped while any of these gates hold:
///
/// - fewer than `n_startup_trials` trials have completed
/// - the step is below `n_warmup_steps`
/// - the step is not a multiple of `interval_steps`
/// - fewer than `n_min_trials` completed trials reported a value at the step
///
/// Once the gates pass, a NaN intermediate value is always pruned.
///
/// # Examples
///
/// ```
/// use boost_tuner::Direction;
/// use boost_tuner::pruner::MedianPruner;
///
/// // Prune losses worse than the median after 5 completed trials and 10 rounds
/// let pruner = MedianPruner::new(Direction::Minimize)
///     .n_startup_trials(5)
///     .n_warmup_steps(10)
///     .n_min_trials(3);
/// ```
#[derive(Clone, Debug)]
pub struct MedianPruner {
    direction: Direction,
    n_startup_trials: usize,
    n_warmup_steps: u64,
    interval_steps: u64,
    n_min_trials: usize,
}

impl MedianPruner {
    /// Create a new `MedianPruner` for the given optimization direction.
    ///
    /// Defaults: `n_startup_trials` 5, `n_warmup_steps` 0, `interval_steps` 1,
    /// `n_min_trials` 1.
    #[must_use]
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            n_startup_trials: 5,
            n_warmup_steps: 0,
            interval_steps: 1,
            n_min_trials: 1,
        }
    }

    /// Set the number of trials that must complete before pruning starts.
    #[must_use]
    pub fn n_startup_trials(mut self, n: usize) -> Self {
        self.n_startup_trials = n;
        self
    }

    /// Set the number of warmup steps. No pruning occurs before this step.
    #[must_use]
    pub fn n_warmup_steps(mut self, n: u64) -> Self {
        self.n_warmup_steps = n;
        self
    }

    /// Only consider pruning at steps that are multiples of `n`.
    ///
    /// A value of 0 is treated as 1.
    #[must_use]
    pub fn interval_steps(mut self, n: u64) -> Self {
        self.interval_steps = n.max(1);
        self
    }

    /// Set the minimum number of completed trials that must have reported
    /// at a step before that step can prune.
    #[must_use]
    pub fn n_min_trials(mut self, n: usize) -> Self {
        self.n_min_trials = n;
        self
    }
}

impl Default for MedianPruner {
    fn default() -> Self {
        Self::new(Direction::Minimize)
    }
}

impl Pruner for MedianPruner {
    fn should_prune(
        &self,
        _trial_id: u64,
        step: u64,
        intermediate_values: &[(u64, f64)],
        completed_trials: &[CompletedTrial],
    ) -> bool {
        let n_complete = completed_trials
            .iter()
            .filter(|t| t.state == TrialState::Complete)
            .count();
        if n_complete < self.n_startup_trials {
            return false;
        }

        if step < self.n_warmup_steps || step % self.interval_steps != 0 {
            return false;
        }

        let Some(&(_, current_value)) = intermediate_values.last() else {
            return false;
        };

        let mut values_at_step: Vec<f64> = completed_trials
            .iter()
            .filter(|t| t.state == TrialState::Complete)
            .filter_map(|t| t.intermediate_value_at(step))
            .filter(|v| !v.is_nan())
            .collect();

        if values_at_step.is_empty() || values_at_step.len() < self.n_min_trials {
            return false;
        }

        if current_value.is_nan() {
            return true;
        }

        let median = compute_median(&mut values_at_step);

        match self.direction {
            Direction::Minimize => current_value > median,
            Direction::Maximize => current_value < median,
        }
    }
}

/// Compute the median of a non-empty slice. Sorts the slice in place.
fn compute_median(values: &mut [f64]) -> f64 {
    values.sort_unstable_by(f64::total_cmp);
    let len = values.len();
    if len % 2 == 1 {
        values[len / 2]
    } else {
        f64::midpoint(values[len / 2 - 1], values[len / 2])
    }
}
