//! Binary classification metrics: accuracy, confusion matrix and a
//! scikit-learn style classification report.

use core::fmt;

/// Class names used in the report, indexed by label.
pub const TARGET_NAMES: [&str; 2] = ["False (0)", "True (1)"];

/// 2x2 confusion matrix. `counts[true_label][predicted_label]`, so the
/// layout is `[[TN, FP], [FN, TP]]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    /// Counts predictions against ground truth.
    ///
    /// Labels other than 0 and 1 are ignored, as are trailing entries of the
    /// longer slice.
    ///
    /// # Examples
    ///
    /// ```
    /// use boost_tuner::metrics::ConfusionMatrix;
    ///
    /// let cm = ConfusionMatrix::from_predictions(&[0, 1, 1, 0], &[0, 1, 0, 1]);
    /// assert_eq!(cm.counts(), [[1, 1], [1, 1]]);
    /// ```
    #[must_use]
    pub fn from_predictions(y_pred: &[u8], y_true: &[u8]) -> Self {
        let mut counts = [[0; 2]; 2];
        for (&pred, &truth) in y_pred.iter().zip(y_true) {
            if pred < 2 && truth < 2 {
                counts[usize::from(truth)][usize::from(pred)] += 1;
            }
        }
        Self { counts }
    }

    /// The raw counts.
    #[must_use]
    pub fn counts(&self) -> [[usize; 2]; 2] {
        self.counts
    }

    /// Negatives predicted as negative.
    #[must_use]
    pub fn true_negatives(&self) -> usize {
        self.counts[0][0]
    }

    /// Negatives predicted as positive.
    #[must_use]
    pub fn false_positives(&self) -> usize {
        self.counts[0][1]
    }

    /// Positives predicted as negative.
    #[must_use]
    pub fn false_negatives(&self) -> usize {
        self.counts[1][0]
    }

    /// Positives predicted as positive.
    #[must_use]
    pub fn true_positives(&self) -> usize {
        self.counts[1][1]
    }

    /// Number of samples whose true label is `class`.
    #[must_use]
    pub fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    /// Number of samples counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// `(TN + TP) / total`, or 0 for an empty matrix.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.true_negatives() + self.true_positives()) as f64 / total as f64
    }

    /// Precision, recall and F1 for `class`, treating it as the positive
    /// class. Undefined ratios are 0.
    #[allow(clippy::cast_precision_loss)]
    fn class_scores(&self, class: usize) -> [f64; 3] {
        let other = 1 - class;
        let tp = self.counts[class][class] as f64;
        let fp = self.counts[other][class] as f64;
        let fn_ = self.counts[class][other] as f64;

        let precision = if tp + fp > 0.0 { tp / (tp + fp) } else { 0.0 };
        let recall = if tp + fn_ > 0.0 { tp / (tp + fn_) } else { 0.0 };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        [precision, recall, f1]
    }
}

/// Prints like a numpy array: `[[7 0]\n [1 2]]`, with columns padded to the
/// widest count.
impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .counts
            .iter()
            .flatten()
            .map(|c| c.to_string().len())
            .max()
            .unwrap_or(1);
        let [[a, b], [c, d]] = self.counts;
        write!(f, "[[{a:>width$} {b:>width$}]\n [{c:>width$} {d:>width$}]]")
    }
}

/// Fraction of positions where `y_pred` equals `y_true`.
///
/// Returns 0 for empty input. Only the common prefix is compared.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn accuracy(y_pred: &[u8], y_true: &[u8]) -> f64 {
    let n = y_pred.len().min(y_true.len());
    if n == 0 {
        return 0.0;
    }
    let correct = y_pred.iter().zip(y_true).filter(|(p, t)| p == t).count();
    correct as f64 / n as f64
}

/// One row of a [`ClassificationReport`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReportRow {
    /// Share of predicted members that truly belong to the class.
    pub precision: f64,
    /// Share of true members that were predicted as the class.
    pub recall: f64,
    /// Harmonic mean of precision and recall.
    pub f1: f64,
    /// Number of samples whose true label is the class.
    pub support: usize,
}

/// Per-class and averaged precision, recall and F1.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationReport {
    /// One row per class, indexed by label.
    pub classes: [ReportRow; 2],
    /// Overall accuracy.
    pub accuracy: f64,
    /// Unweighted mean over classes.
    pub macro_avg: ReportRow,
    /// Averages weighted by class support.
    pub weighted_avg: ReportRow,
}

impl ClassificationReport {
    /// Builds the report from a confusion matrix.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let classes = [0, 1].map(|class| {
            let [precision, recall, f1] = cm.class_scores(class);
            ReportRow {
                precision,
                recall,
                f1,
                support: cm.support(class),
            }
        });
        let total = cm.total();

        let average = |weight: &dyn Fn(&ReportRow) -> f64| {
            let norm: f64 = classes.iter().map(weight).sum();
            let avg = |field: fn(&ReportRow) -> f64| {
                if norm > 0.0 {
                    classes.iter().map(|r| field(r) * weight(r)).sum::<f64>() / norm
                } else {
                    0.0
                }
            };
            ReportRow {
                precision: avg(|r| r.precision),
                recall: avg(|r| r.recall),
                f1: avg(|r| r.f1),
                support: total,
            }
        };

        Self {
            classes,
            accuracy: cm.accuracy(),
            macro_avg: average(&|_: &ReportRow| 1.0),
            weighted_avg: average(&|r: &ReportRow| r.support as f64),
        }
    }
}

/// Laid out like scikit-learn's `classification_report` with two digits.
impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = 12;
        let row = |f: &mut fmt::Formatter<'_>, name: &str, r: &ReportRow| {
            writeln!(
                f,
                "{name:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                r.precision, r.recall, r.f1, r.support
            )
        };

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (name, r) in TARGET_NAMES.iter().zip(&self.classes) {
            row(f, name, r)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}
