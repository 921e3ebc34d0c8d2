use crate::config::DatasetConfig;
use crate::error::{Error, Result};
use crate::rng_util;

use super::Dataset;

/// Generates a random binary classification problem.
///
/// The construction follows scikit-learn's `make_classification`:
///
/// 1. Each class gets `n_clusters_per_class` Gaussian clusters. Cluster
///    centroids sit on distinct vertices of a hypercube with side
///    `2 * class_sep` in the informative subspace.
/// 2. Each cluster gets its own random covariance, applied as a linear map
///    with entries in \[-1, 1\].
/// 3. Redundant features are random linear combinations of the informative
///    features. The remaining features are standard normal noise.
/// 4. A fraction `flip_y` of labels is reassigned at random.
/// 5. Rows and feature columns are shuffled.
///
/// The same `config` and `seed` always produce the same dataset.
///
/// # Errors
///
/// Returns `Error::InvalidDataset` when the shape is inconsistent: too few
/// samples, more informative and redundant features than features, too many
/// clusters for the informative subspace, or bad weights, `class_sep` or
/// `flip_y`.
///
/// # Examples
///
/// ```
/// use boost_tuner::config::DatasetConfig;
/// use boost_tuner::data::make_classification;
///
/// let data = make_classification(&DatasetConfig::default(), 42).unwrap();
/// assert_eq!(data.n_samples(), 60);
/// assert_eq!(data.n_features(), 6);
/// ```
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::needless_range_loop
)]
pub fn make_classification(config: &DatasetConfig, seed: u64) -> Result<Dataset> {
    validate(config)?;

    let mut rng = fastrand::Rng::with_seed(seed);
    let n_samples = config.n_samples;
    let n_features = config.n_features;
    let n_inf = config.n_informative;
    let n_red = config.n_redundant;
    let n_clusters = 2 * config.n_clusters_per_class;

    let weight_sum: f64 = config.weights.iter().sum();
    let weights = config.weights.map(|w| w / weight_sum);

    let mut per_cluster: Vec<usize> = (0..n_clusters)
        .map(|k| {
            (n_samples as f64 * weights[k % 2] / config.n_clusters_per_class as f64) as usize
        })
        .collect();
    let assigned: usize = per_cluster.iter().sum();
    for i in 0..n_samples.saturating_sub(assigned) {
        per_cluster[i % n_clusters] += 1;
    }

    let centroids: Vec<Vec<f64>> = hypercube_vertices(n_clusters, n_inf, &mut rng)
        .into_iter()
        .map(|v| {
            v.into_iter()
                .map(|bit| bit * 2.0 * config.class_sep - config.class_sep)
                .collect()
        })
        .collect();

    let mut rows = vec![vec![0.0; n_features]; n_samples];
    let mut labels = vec![0_u8; n_samples];

    for row in &mut rows {
        for value in &mut row[..n_inf] {
            *value = rng_util::standard_normal(&mut rng);
        }
    }

    let mut start = 0;
    for (k, &size) in per_cluster.iter().enumerate() {
        let stop = start + size;
        let covariance = uniform_matrix(n_inf, n_inf, &mut rng);
        for i in start..stop {
            labels[i] = (k % 2) as u8;
            let x = rows[i][..n_inf].to_vec();
            for j in 0..n_inf {
                let projected: f64 = (0..n_inf).map(|m| x[m] * covariance[m][j]).sum();
                rows[i][j] = projected + centroids[k][j];
            }
        }
        start = stop;
    }

    if n_red > 0 {
        let mixing = uniform_matrix(n_inf, n_red, &mut rng);
        for row in &mut rows {
            for r in 0..n_red {
                let combined: f64 = (0..n_inf).map(|m| row[m] * mixing[m][r]).sum();
                row[n_inf + r] = combined;
            }
        }
    }

    for row in &mut rows {
        for value in &mut row[n_inf + n_red..] {
            *value = rng_util::standard_normal(&mut rng);
        }
    }

    if config.flip_y > 0.0 {
        for label in &mut labels {
            if rng.f64() < config.flip_y {
                *label = rng.u8(0..2);
            }
        }
    }

    let mut order: Vec<usize> = (0..n_samples).collect();
    rng.shuffle(&mut order);
    let mut columns: Vec<usize> = (0..n_features).collect();
    rng.shuffle(&mut columns);

    let features = order
        .iter()
        .map(|&i| columns.iter().map(|&c| rows[i][c]).collect())
        .collect();
    let labels = order.iter().map(|&i| labels[i]).collect();

    trace_debug!(n_samples, n_features, seed, "generated synthetic dataset");
    Dataset::new(features, labels)
}

fn validate(config: &DatasetConfig) -> Result<()> {
    let invalid = |msg: String| Err(Error::InvalidDataset(msg));

    if config.n_samples < 2 {
        return invalid(format!("n_samples must be at least 2, got {}", config.n_samples));
    }
    if config.n_informative == 0 {
        return invalid("n_informative must be at least 1".into());
    }
    if config.n_informative + config.n_redundant > config.n_features {
        return invalid(format!(
            "n_informative ({}) + n_redundant ({}) exceeds n_features ({})",
            config.n_informative, config.n_redundant, config.n_features
        ));
    }
    if config.n_clusters_per_class == 0 {
        return invalid("n_clusters_per_class must be at least 1".into());
    }
    let n_clusters = 2 * config.n_clusters_per_class;
    let fits = u32::try_from(config.n_informative)
        .ok()
        .and_then(|d| 1_usize.checked_shl(d))
        .is_none_or(|vertices| vertices >= n_clusters);
    if !fits {
        return invalid(format!(
            "2 classes x {} clusters need more than {} informative features",
            config.n_clusters_per_class, config.n_informative
        ));
    }
    if config.weights.iter().any(|w| !w.is_finite() || *w < 0.0)
        || config.weights.iter().sum::<f64>() <= 0.0
    {
        return invalid(format!("bad class weights {:?}", config.weights));
    }
    if !config.class_sep.is_finite() {
        return invalid("class_sep must be finite".into());
    }
    if !(0.0..=1.0).contains(&config.flip_y) {
        return invalid(format!("flip_y must be in [0, 1], got {}", config.flip_y));
    }
    Ok(())
}

/// Draws `count` distinct vertices of the unit hypercube in `dims`
/// dimensions, as 0/1 coordinates.
fn hypercube_vertices(count: usize, dims: usize, rng: &mut fastrand::Rng) -> Vec<Vec<f64>> {
    let mut vertices: Vec<Vec<f64>> = Vec::with_capacity(count);
    while vertices.len() < count {
        let candidate: Vec<f64> = (0..dims).map(|_| f64::from(u8::from(rng.bool()))).collect();
        if !vertices.contains(&candidate) {
            vertices.push(candidate);
        }
    }
    vertices
}

fn uniform_matrix(rows: usize, cols: usize, rng: &mut fastrand::Rng) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|_| (0..cols).map(|_| 2.0 * rng.f64() - 1.0).collect())
        .collect()
}
