//! In-memory binary classification datasets.
//!
//! - [`make_classification`] generates the synthetic dataset.
//! - [`train_test_split_stratified`] splits it into train and validation sets
//!   with matching class ratios.

mod split;
mod synthetic;

pub use split::train_test_split_stratified;
pub use synthetic::make_classification;

use crate::error::{Error, Result};

/// A dense, row-major binary classification dataset.
///
/// Labels are `0` (negative) or `1` (positive).
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    features: Vec<Vec<f64>>,
    labels: Vec<u8>,
    feature_names: Vec<String>,
}

impl Dataset {
    /// Builds a dataset from rows and labels.
    ///
    /// Features are named `feature_0`, `feature_1`, ...
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDataset` when the dataset is empty, rows have
    /// different lengths, the row and label counts differ, a label is not
    /// 0 or 1, or a feature value is not finite.
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<u8>) -> Result<Self> {
        if features.is_empty() {
            return Err(Error::InvalidDataset("dataset has no samples".into()));
        }
        if features.len() != labels.len() {
            return Err(Error::InvalidDataset(format!(
                "{} rows but {} labels",
                features.len(),
                labels.len()
            )));
        }
        let n_features = features[0].len();
        if n_features == 0 {
            return Err(Error::InvalidDataset("dataset has no features".into()));
        }
        if let Some(i) = features.iter().position(|row| row.len() != n_features) {
            return Err(Error::InvalidDataset(format!(
                "row {i} has {} features, expected {n_features}",
                features[i].len()
            )));
        }
        if let Some(&label) = labels.iter().find(|&&l| l > 1) {
            return Err(Error::InvalidDataset(format!(
                "label {label} is not binary"
            )));
        }
        if features.iter().flatten().any(|v| !v.is_finite()) {
            return Err(Error::InvalidDataset("non-finite feature value".into()));
        }

        let feature_names = (0..n_features).map(|i| format!("feature_{i}")).collect();
        Ok(Self {
            features,
            labels,
            feature_names,
        })
    }

    /// Number of samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    /// Number of features per sample.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// The feature rows.
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// The labels, one per row.
    #[must_use]
    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    /// The feature column names.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of samples per class, `[negatives, positives]`.
    #[must_use]
    pub fn class_counts(&self) -> [usize; 2] {
        let positives = self.labels.iter().filter(|&&l| l == 1).count();
        [self.labels.len() - positives, positives]
    }

    /// Returns the rows at `indices`, in that order.
    pub(crate) fn select(&self, indices: &[usize]) -> Self {
        Self {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            feature_names: self.feature_names.clone(),
        }
    }
}
