//! Parzen estimators for the TPE sampler.
//!
//! Each estimator is a mixture of Gaussian kernels, one per observed value
//! plus one wide prior kernel centred on the range. The prior keeps every
//! region of the range reachable however tightly the observations cluster.

use crate::error::{Error, Result};
use crate::rng_util;

/// Draws outside `[low, high]` are retried this many times before clamping.
const MAX_REJECTIONS: usize = 64;

/// A one-dimensional Gaussian mixture over `[low, high]`.
#[derive(Clone, Debug)]
pub(crate) struct ParzenEstimator {
    mus: Vec<f64>,
    sigmas: Vec<f64>,
    low: f64,
    high: f64,
}

impl ParzenEstimator {
    /// Fits the estimator to `observations` inside `[low, high]`.
    ///
    /// Kernel widths follow the neighbour-gap rule: each observation gets
    /// the larger distance to its sorted neighbours, with the bounds acting
    /// as outer neighbours. Widths are clipped to
    /// `[(high - low) / min(100, 1 + n_kernels), high - low]`. A fixed
    /// `bandwidth` replaces the rule for the observation kernels.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptySamples` if `observations` is empty and
    /// `Error::InvalidBandwidth` for a non-positive fixed bandwidth or an
    /// empty range.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn fit(
        observations: &[f64],
        low: f64,
        high: f64,
        bandwidth: Option<f64>,
    ) -> Result<Self> {
        if observations.is_empty() {
            return Err(Error::EmptySamples);
        }
        let range = high - low;
        if !(range > 0.0 && range.is_finite()) {
            return Err(Error::InvalidBandwidth(range));
        }
        if let Some(bw) = bandwidth
            && !(bw > 0.0 && bw.is_finite())
        {
            return Err(Error::InvalidBandwidth(bw));
        }

        let n_kernels = observations.len() + 1;
        let min_sigma = range / (1.0 + n_kernels as f64).min(100.0);
        let sigmas = match bandwidth {
            Some(bw) => vec![bw; observations.len()],
            None => neighbour_gaps(observations, low, high),
        };

        let mut mus = observations.to_vec();
        let mut sigmas: Vec<f64> = sigmas
            .into_iter()
            .map(|s| s.clamp(min_sigma, range))
            .collect();
        mus.push(0.5 * (low + high));
        sigmas.push(range);

        Ok(Self {
            mus,
            sigmas,
            low,
            high,
        })
    }

    /// Mixture density at `x`. Every kernel, the prior included, has equal
    /// weight.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn pdf(&self, x: f64) -> f64 {
        let norm = 1.0 / (2.0 * core::f64::consts::PI).sqrt();
        let total: f64 = self
            .mus
            .iter()
            .zip(&self.sigmas)
            .map(|(&mu, &sigma)| {
                let z = (x - mu) / sigma;
                norm / sigma * (-0.5 * z * z).exp()
            })
            .sum();
        total / self.mus.len() as f64
    }

    /// Picks a kernel uniformly and draws from it, truncated to the range.
    pub(crate) fn sample(&self, rng: &mut fastrand::Rng) -> f64 {
        let k = rng.usize(0..self.mus.len());
        let (mu, sigma) = (self.mus[k], self.sigmas[k]);
        let mut draw = mu;
        for _ in 0..MAX_REJECTIONS {
            draw = mu + rng_util::standard_normal(rng) * sigma;
            if (self.low..=self.high).contains(&draw) {
                return draw;
            }
        }
        draw.clamp(self.low, self.high)
    }

    #[cfg(test)]
    pub(crate) fn sigmas(&self) -> &[f64] {
        &self.sigmas
    }
}

/// Larger gap to either sorted neighbour, in the input order. With at least
/// two observations the outermost kernels measure inward only, so a point
/// near a bound does not get a narrow kernel from the bound itself.
fn neighbour_gaps(observations: &[f64], low: f64, high: f64) -> Vec<f64> {
    let mut order: Vec<usize> = (0..observations.len()).collect();
    order.sort_by(|&a, &b| observations[a].total_cmp(&observations[b]));

    let mut padded = Vec::with_capacity(order.len() + 2);
    padded.push(low);
    padded.extend(order.iter().map(|&i| observations[i]));
    padded.push(high);

    let mut sorted_sigmas: Vec<f64> = padded
        .windows(3)
        .map(|w| (w[1] - w[0]).max(w[2] - w[1]))
        .collect();
    let n = sorted_sigmas.len();
    if n >= 2 {
        sorted_sigmas[0] = padded[2] - padded[1];
        sorted_sigmas[n - 1] = padded[n] - padded[n - 1];
    }

    let mut sigmas = vec![0.0; n];
    for (rank, &i) in order.iter().enumerate() {
        sigmas[i] = sorted_sigmas[rank];
    }
    sigmas
}
