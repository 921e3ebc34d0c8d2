//! Tree-Parzen Estimator (TPE) sampler implementation.
//!
//! TPE models P(x|y) instead of P(y|x). It splits finished trials into a
//! "good" group (best `gamma` fraction) and a "bad" group, fits a Parzen
//! estimator to the values each group used for the parameter being sampled,
//! and proposes the candidate that maximizes l(x)/g(x). Both estimators carry
//! a prior kernel over the whole range, so the search never locks onto the
//! first cluster of good values.

use parking_lot::Mutex;

use crate::distribution::Distribution;
use crate::error::{Error, Result};
use crate::kde::ParzenEstimator;
use crate::param::ParamValue;
use crate::parameter::ParamId;
use crate::sampler::random::sample_uniform;
use crate::sampler::{CompletedTrial, Sampler};
use crate::types::{Direction, TrialState};

/// A Tree-Parzen Estimator sampler for Bayesian optimization.
///
/// During the startup phase (fewer than `n_startup_trials` complete trials
/// that used the parameter), TPE falls back to uniform random sampling.
///
/// Past values are matched by [`ParamId`] and distribution, so two
/// parameters with identical ranges never contaminate each other.
///
/// # Examples
///
/// ```
/// use boost_tuner::sampler::TpeSampler;
///
/// // Create with default settings
/// let sampler = TpeSampler::new();
///
/// // Create with custom settings using the builder
/// let sampler = TpeSampler::builder()
///     .gamma(0.15)
///     .n_startup_trials(20)
///     .n_ei_candidates(32)
///     .seed(42)
///     .build()
///     .unwrap();
/// ```
pub struct TpeSampler {
    /// Fraction of trials to consider as "good" (gamma quantile).
    gamma: f64,
    /// Number of trials before TPE kicks in (uses random sampling before this).
    n_startup_trials: usize,
    /// Number of candidate samples to evaluate when selecting the next point.
    n_ei_candidates: usize,
    /// Optional fixed kernel width. If None, widths come from neighbour gaps.
    kde_bandwidth: Option<f64>,
    /// Which end of the value range counts as "good".
    direction: Direction,
    rng: Mutex<fastrand::Rng>,
}

impl TpeSampler {
    /// Creates a new TPE sampler with default settings.
    ///
    /// - gamma: 0.25
    /// - `n_startup_trials`: 10
    /// - `n_ei_candidates`: 24
    /// - `kde_bandwidth`: neighbour-gap widths
    /// - direction: minimize
    #[must_use]
    pub fn new() -> Self {
        Self {
            gamma: 0.25,
            n_startup_trials: 10,
            n_ei_candidates: 24,
            kde_bandwidth: None,
            direction: Direction::Minimize,
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Creates a builder for configuring a TPE sampler.
    #[must_use]
    pub fn builder() -> TpeSamplerBuilder {
        TpeSamplerBuilder::new()
    }

    /// Split the usable history into (good, bad) groups by objective value.
    ///
    /// The sort is stable, so ties keep their trial order.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn split_trials<'a>(
        &self,
        usable: &[&'a CompletedTrial],
    ) -> (Vec<&'a CompletedTrial>, Vec<&'a CompletedTrial>) {
        let mut sorted = usable.to_vec();
        sorted.sort_by(|a, b| {
            let ord = a
                .value
                .partial_cmp(&b.value)
                .unwrap_or(core::cmp::Ordering::Equal);
            match self.direction {
                Direction::Minimize => ord,
                Direction::Maximize => ord.reverse(),
            }
        });

        let n_good = ((sorted.len() as f64 * self.gamma).ceil() as usize)
            .max(1)
            .min(sorted.len() - 1);
        let bad = sorted.split_off(n_good);
        (sorted, bad)
    }

    /// Pick the candidate drawn from l(x) with the best l(x)/g(x) ratio, in
    /// internal (possibly log) space.
    fn best_candidate(
        &self,
        internal_low: f64,
        internal_high: f64,
        good: &[f64],
        bad: &[f64],
        rng: &mut fastrand::Rng,
    ) -> Option<f64> {
        let l_pe =
            ParzenEstimator::fit(good, internal_low, internal_high, self.kde_bandwidth).ok()?;
        let g_pe =
            ParzenEstimator::fit(bad, internal_low, internal_high, self.kde_bandwidth).ok()?;

        let mut best_candidate = None;
        let mut best_ratio = f64::NEG_INFINITY;

        for _ in 0..self.n_ei_candidates {
            let candidate = l_pe.sample(rng);

            let l_density = l_pe.pdf(candidate);
            let g_density = g_pe.pdf(candidate);

            let ratio = if g_density < f64::EPSILON {
                if l_density > f64::EPSILON {
                    f64::INFINITY
                } else {
                    0.0
                }
            } else {
                l_density / g_density
            };

            if ratio > best_ratio {
                best_ratio = ratio;
                best_candidate = Some(candidate);
            }
        }

        best_candidate
    }

    fn sample_tpe_float(
        &self,
        d: &crate::distribution::FloatDistribution,
        good: Vec<f64>,
        bad: Vec<f64>,
        rng: &mut fastrand::Rng,
    ) -> Option<f64> {
        let to_internal = |v: f64| if d.log_scale { v.ln() } else { v };
        let good: Vec<f64> = good.into_iter().map(to_internal).collect();
        let bad: Vec<f64> = bad.into_iter().map(to_internal).collect();

        let internal =
            self.best_candidate(to_internal(d.low), to_internal(d.high), &good, &bad, rng)?;
        let mut value = if d.log_scale { internal.exp() } else { internal };

        if let Some(step) = d.step {
            let k = ((value - d.low) / step).round();
            value = d.low + k * step;
        }

        Some(value.clamp(d.low, d.high))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn sample_tpe_int(
        &self,
        d: &crate::distribution::IntDistribution,
        good: Vec<f64>,
        bad: Vec<f64>,
        rng: &mut fastrand::Rng,
    ) -> Option<i64> {
        let float = crate::distribution::FloatDistribution {
            low: d.low as f64,
            high: d.high as f64,
            log_scale: d.log_scale,
            step: None,
        };
        let raw = self.sample_tpe_float(&float, good, bad, rng)?.round() as i64;

        let value = if let Some(step) = d.step {
            let k = ((raw - d.low) as f64 / step as f64).round() as i64;
            d.low + k * step
        } else {
            raw
        };

        Some(value.clamp(d.low, d.high))
    }
}

impl Default for TpeSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for TpeSampler {
    fn sample(
        &self,
        param_id: ParamId,
        distribution: &Distribution,
        _trial_id: u64,
        history: &[CompletedTrial],
    ) -> ParamValue {
        let mut rng = self.rng.lock();

        let usable: Vec<&CompletedTrial> = history
            .iter()
            .filter(|t| t.state == TrialState::Complete && t.value.is_finite())
            .filter(|t| t.distributions.get(&param_id) == Some(distribution))
            .filter(|t| t.params.contains_key(&param_id))
            .collect();

        if usable.len() < self.n_startup_trials.max(2) {
            return sample_uniform(distribution, &mut rng);
        }

        let (good_trials, bad_trials) = self.split_trials(&usable);
        let values = |group: &[&CompletedTrial]| -> Vec<f64> {
            group
                .iter()
                .filter_map(|t| t.params.get(&param_id))
                .map(ParamValue::as_f64)
                .collect()
        };
        let good = values(&good_trials);
        let bad = values(&bad_trials);

        let sampled = match distribution {
            Distribution::Float(d) => self
                .sample_tpe_float(d, good, bad, &mut rng)
                .map(ParamValue::Float),
            Distribution::Int(d) => self
                .sample_tpe_int(d, good, bad, &mut rng)
                .map(ParamValue::Int),
        };

        sampled.unwrap_or_else(|| sample_uniform(distribution, &mut rng))
    }
}

/// Builder for configuring a [`TpeSampler`].
///
/// # Examples
///
/// ```
/// use boost_tuner::Direction;
/// use boost_tuner::sampler::TpeSamplerBuilder;
///
/// let sampler = TpeSamplerBuilder::new()
///     .gamma(0.2)
///     .direction(Direction::Maximize)
///     .seed(7)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct TpeSamplerBuilder {
    gamma: f64,
    n_startup_trials: usize,
    n_ei_candidates: usize,
    kde_bandwidth: Option<f64>,
    direction: Direction,
    seed: Option<u64>,
}

impl TpeSamplerBuilder {
    /// Creates a builder with the same defaults as [`TpeSampler::new`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            gamma: 0.25,
            n_startup_trials: 10,
            n_ei_candidates: 24,
            kde_bandwidth: None,
            direction: Direction::Minimize,
            seed: None,
        }
    }

    /// Sets the fraction of trials considered "good". Must be in (0.0, 1.0).
    #[must_use]
    pub fn gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Sets the number of random trials before TPE sampling starts.
    #[must_use]
    pub fn n_startup_trials(mut self, n: usize) -> Self {
        self.n_startup_trials = n;
        self
    }

    /// Sets the number of candidates drawn from l(x) per sample.
    #[must_use]
    pub fn n_ei_candidates(mut self, n: usize) -> Self {
        self.n_ei_candidates = n;
        self
    }

    /// Uses a fixed kernel width instead of neighbour gaps. Widths are still
    /// clipped to the parameter range.
    #[must_use]
    pub fn kde_bandwidth(mut self, bandwidth: f64) -> Self {
        self.kde_bandwidth = Some(bandwidth);
        self
    }

    /// Sets the optimization direction the sampler assumes.
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Seeds the sampler's RNG for reproducible runs.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builds the sampler.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidGamma` if gamma is not in (0.0, 1.0), and
    /// `Error::InvalidBandwidth` if a fixed bandwidth is not positive.
    pub fn build(self) -> Result<TpeSampler> {
        if !(self.gamma > 0.0 && self.gamma < 1.0) {
            return Err(Error::InvalidGamma(self.gamma));
        }
        if let Some(bw) = self.kde_bandwidth
            && !(bw > 0.0 && bw.is_finite())
        {
            return Err(Error::InvalidBandwidth(bw));
        }

        let rng = match self.seed {
            Some(s) => fastrand::Rng::with_seed(s),
            None => fastrand::Rng::new(),
        };

        Ok(TpeSampler {
            gamma: self.gamma,
            n_startup_trials: self.n_startup_trials,
            n_ei_candidates: self.n_ei_candidates.max(1),
            kde_bandwidth: self.kde_bandwidth,
            direction: self.direction,
            rng: Mutex::new(rng),
        })
    }
}

impl Default for TpeSamplerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
