use crate::error::{Error, Result};

use super::Dataset;

/// Splits `data` into `(train, valid)` with `test_size` validation samples,
/// keeping the class ratio in both parts.
///
/// Each class gets a validation quota proportional to its size. Quotas are
/// rounded down and the leftover slots go to the classes with the largest
/// fractional remainders (ties to the larger class). Every class is then
/// guaranteed at least one validation and one training sample. Samples are
/// drawn from a per-class shuffle seeded by `seed`, and both outputs are
/// shuffled again so the classes are interleaved.
///
/// # Errors
///
/// Returns `Error::InvalidSplit` if `test_size` is 0 or not smaller than the
/// sample count, if a class has fewer than 2 members, or if `test_size`
/// cannot fit one sample of each class on both sides.
///
/// # Examples
///
/// ```
/// use boost_tuner::config::DatasetConfig;
/// use boost_tuner::data::{make_classification, train_test_split_stratified};
///
/// let data = make_classification(&DatasetConfig::default(), 42).unwrap();
/// let (train, valid) = train_test_split_stratified(&data, 10, 42).unwrap();
/// assert_eq!(train.n_samples(), 50);
/// assert_eq!(valid.n_samples(), 10);
/// ```
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn train_test_split_stratified(
    data: &Dataset,
    test_size: usize,
    seed: u64,
) -> Result<(Dataset, Dataset)> {
    let n = data.n_samples();
    if test_size == 0 || test_size >= n {
        return Err(Error::InvalidSplit(format!(
            "test_size must be in [1, {n}), got {test_size}"
        )));
    }

    let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
    for (i, &label) in data.labels().iter().enumerate() {
        by_class[usize::from(label)].push(i);
    }

    let present: Vec<usize> = (0..2).filter(|&c| !by_class[c].is_empty()).collect();
    if let Some(&c) = present.iter().find(|&&c| by_class[c].len() < 2) {
        return Err(Error::InvalidSplit(format!(
            "class {c} has only {} member(s); stratification needs at least 2",
            by_class[c].len()
        )));
    }
    if test_size < present.len() || n - test_size < present.len() {
        return Err(Error::InvalidSplit(format!(
            "test_size {test_size} cannot hold every class on both sides"
        )));
    }

    // largest-remainder allocation
    let exact: Vec<f64> = (0..2)
        .map(|c| test_size as f64 * by_class[c].len() as f64 / n as f64)
        .collect();
    let mut quota: [usize; 2] = [exact[0].floor() as usize, exact[1].floor() as usize];
    let mut leftover = test_size - quota[0] - quota[1];
    let mut order = present.clone();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.partial_cmp(&fa)
            .unwrap_or(core::cmp::Ordering::Equal)
            .then(by_class[b].len().cmp(&by_class[a].len()))
    });
    while leftover > 0 {
        let before = leftover;
        for &c in &order {
            if leftover > 0 && quota[c] + 1 < by_class[c].len() {
                quota[c] += 1;
                leftover -= 1;
            }
        }
        if leftover == before {
            return Err(Error::InvalidSplit(format!(
                "cannot place {test_size} validation samples and keep every class in training"
            )));
        }
    }

    // every present class on both sides: move one slot from the other class
    for &c in &present {
        let other = 1 - c;
        if quota[c] == 0 && quota[other] > 1 {
            quota[c] += 1;
            quota[other] -= 1;
        }
        if quota[c] == by_class[c].len() && quota[other] + 1 < by_class[other].len() {
            quota[c] -= 1;
            quota[other] += 1;
        }
    }

    let mut rng = fastrand::Rng::with_seed(seed);
    let mut train_idx = Vec::with_capacity(n - test_size);
    let mut valid_idx = Vec::with_capacity(test_size);
    for c in 0..2 {
        let mut members = by_class[c].clone();
        rng.shuffle(&mut members);
        let (valid_part, train_part) = members.split_at(quota[c]);
        valid_idx.extend_from_slice(valid_part);
        train_idx.extend_from_slice(train_part);
    }
    rng.shuffle(&mut train_idx);
    rng.shuffle(&mut valid_idx);

    trace_debug!(
        train = train_idx.len(),
        valid = valid_idx.len(),
        valid_negatives = quota[0],
        valid_positives = quota[1],
        "stratified split"
    );

    Ok((data.select(&train_idx), data.select(&valid_idx)))
}
