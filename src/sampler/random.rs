//! Random sampler implementation.

use parking_lot::Mutex;

use crate::distribution::Distribution;
use crate::param::ParamValue;
use crate::parameter::ParamId;
use crate::rng_util;
use crate::sampler::{CompletedTrial, Sampler};

/// A simple random sampler that samples uniformly from distributions.
///
/// This sampler ignores the trial history and samples uniformly at random,
/// respecting log scale and step size constraints. It serves as a baseline
/// sampler and drives the startup phase of [`TpeSampler`](super::TpeSampler).
///
/// # Examples
///
/// ```
/// use boost_tuner::sampler::RandomSampler;
///
/// // Create with default RNG
/// let sampler = RandomSampler::new();
///
/// // Create with a fixed seed for reproducibility
/// let sampler = RandomSampler::with_seed(42);
/// ```
pub struct RandomSampler {
    rng: Mutex<fastrand::Rng>,
}

impl RandomSampler {
    /// Creates a new random sampler with a default random seed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Creates a new random sampler with a fixed seed for reproducibility.
    ///
    /// Using the same seed will produce the same sequence of sampled values.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for RandomSampler {
    fn sample(
        &self,
        _param_id: ParamId,
        distribution: &Distribution,
        _trial_id: u64,
        _history: &[CompletedTrial],
    ) -> ParamValue {
        let mut rng = self.rng.lock();
        sample_uniform(distribution, &mut rng)
    }
}

/// Draw one value from `distribution` without looking at history.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub(crate) fn sample_uniform(distribution: &Distribution, rng: &mut fastrand::Rng) -> ParamValue {
    match distribution {
        Distribution::Float(d) => {
            let value = if d.log_scale {
                let log_low = d.low.ln();
                let log_high = d.high.ln();
                rng_util::f64_range(rng, log_low, log_high)
                    .exp()
                    .clamp(d.low, d.high)
            } else if let Some(step) = d.step {
                let n_steps = ((d.high - d.low) / step).floor() as i64;
                let k = rng.i64(0..=n_steps);
                d.low + (k as f64) * step
            } else {
                rng_util::f64_range(rng, d.low, d.high)
            };
            ParamValue::Float(value)
        }
        Distribution::Int(d) => {
            let value = if d.log_scale {
                // sample in log space over [low - 0.5, high + 0.5] so the
                // endpoints are as likely as their neighbours
                let log_low = (d.low as f64 - 0.5).max(0.5).ln();
                let log_high = (d.high as f64 + 0.5).ln();
                let raw = rng_util::f64_range(rng, log_low, log_high).exp().round() as i64;
                raw.clamp(d.low, d.high)
            } else if let Some(step) = d.step {
                let n_steps = (d.high - d.low) / step;
                let k = rng.i64(0..=n_steps);
                d.low + k * step
            } else {
                rng.i64(d.low..=d.high)
            };
            ParamValue::Int(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{FloatDistribution, IntDistribution};

    fn float_dist(low: f64, high: f64, log_scale: bool, step: Option<f64>) -> Distribution {
        Distribution::Float(FloatDistribution {
            low,
            high,
            log_scale,
            step,
        })
    }

    fn int_dist(low: i64, high: i64, log_scale: bool, step: Option<i64>) -> Distribution {
        Distribution::Int(IntDistribution {
            low,
            high,
            log_scale,
            step,
        })
    }

    #[test]
    fn float_values_stay_in_range() {
        let sampler = RandomSampler::with_seed(42);
        let dist = float_dist(1.0, 5.0, false, None);
        let id = ParamId::new();

        for _ in 0..100 {
            let ParamValue::Float(v) = sampler.sample(id, &dist, 0, &[]) else {
                panic!("Expected Float value");
            };
            assert!((1.0..=5.0).contains(&v));
        }
    }

    #[test]
    fn log_float_values_stay_in_range() {
        let sampler = RandomSampler::with_seed(42);
        let dist = float_dist(0.001, 0.5, true, None);
        let id = ParamId::new();

        for _ in 0..100 {
            let ParamValue::Float(v) = sampler.sample(id, &dist, 0, &[]) else {
                panic!("Expected Float value");
            };
            assert!((0.001..=0.5).contains(&v));
        }
    }

    #[test]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn stepped_float_lands_on_grid() {
        let sampler = RandomSampler::with_seed(42);
        let dist = float_dist(0.0, 1.0, false, Some(0.25));
        let id = ParamId::new();

        for _ in 0..100 {
            let ParamValue::Float(v) = sampler.sample(id, &dist, 0, &[]) else {
                panic!("Expected Float value");
            };
            let k = (v / 0.25).round() as i64;
            assert!((v - k as f64 * 0.25).abs() < 1e-10);
        }
    }

    #[test]
    fn int_values_cover_both_endpoints() {
        let sampler = RandomSampler::with_seed(42);
        let dist = int_dist(1, 3, false, None);
        let id = ParamId::new();

        let mut seen = [false; 3];
        for _ in 0..200 {
            let ParamValue::Int(v) = sampler.sample(id, &dist, 0, &[]) else {
                panic!("Expected Int value");
            };
            assert!((1..=3).contains(&v));
            seen[usize::try_from(v - 1).unwrap()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn log_int_values_stay_in_range() {
        let sampler = RandomSampler::with_seed(42);
        let dist = int_dist(1, 1000, true, None);
        let id = ParamId::new();

        for _ in 0..100 {
            let ParamValue::Int(v) = sampler.sample(id, &dist, 0, &[]) else {
                panic!("Expected Int value");
            };
            assert!((1..=1000).contains(&v));
        }
    }

    #[test]
    fn stepped_int_lands_on_grid() {
        let sampler = RandomSampler::with_seed(42);
        let dist = int_dist(0, 10, false, Some(2));
        let id = ParamId::new();

        for _ in 0..100 {
            let ParamValue::Int(v) = sampler.sample(id, &dist, 0, &[]) else {
                panic!("Expected Int value");
            };
            assert!((0..=10).contains(&v));
            assert_eq!(v % 2, 0);
        }
    }

    #[test]
    fn same_seed_same_sequence() {
        let sampler1 = RandomSampler::with_seed(42);
        let sampler2 = RandomSampler::with_seed(42);
        let dist = float_dist(0.0, 1.0, false, None);
        let id = ParamId::new();

        for _ in 0..10 {
            assert_eq!(
                sampler1.sample(id, &dist, 0, &[]),
                sampler2.sample(id, &dist, 0, &[])
            );
        }
    }
}
