//! Binary log loss: link function, gradients and the evaluation metric.

/// Probabilities are clipped to `[EPS, 1 - EPS]` before taking logs.
const EPS: f64 = 1e-15;

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Raw score whose sigmoid is the positive-label fraction of `labels`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn init_score(labels: &[u8]) -> f64 {
    let positives = labels.iter().filter(|&&l| l == 1).count() as f64;
    let p = (positives / labels.len() as f64).clamp(EPS, 1.0 - EPS);
    (p / (1.0 - p)).ln()
}

/// Fills `grad` and `hess` for raw `scores`, with positives weighted by
/// `scale_pos_weight`.
pub(crate) fn gradients(
    scores: &[f64],
    labels: &[u8],
    scale_pos_weight: f64,
    grad: &mut [f64],
    hess: &mut [f64],
) {
    for (i, (&score, &label)) in scores.iter().zip(labels).enumerate() {
        let p = sigmoid(score);
        let (y, w) = if label == 1 {
            (1.0, scale_pos_weight)
        } else {
            (0.0, 1.0)
        };
        grad[i] = (p - y) * w;
        hess[i] = (p * (1.0 - p)).max(EPS) * w;
    }
}

/// Mean binary log loss of raw `scores` against `labels`.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn binary_logloss(scores: &[f64], labels: &[u8]) -> f64 {
    let total: f64 = scores
        .iter()
        .zip(labels)
        .map(|(&score, &label)| {
            let p = sigmoid(score).clamp(EPS, 1.0 - EPS);
            if label == 1 { -p.ln() } else { -(1.0 - p).ln() }
        })
        .sum();
    total / labels.len() as f64
}
