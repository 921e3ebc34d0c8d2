use core::fmt;
use std::collections::BTreeMap;

use crate::parameter::ParamId;
use crate::trial::AttrValue;
use crate::types::TrialState;

use super::Study;

impl Study {
    /// Write all recorded trials to a writer in CSV format.
    ///
    /// Columns: `trial_id`, `value`, `state`, then one column per unique
    /// parameter label, then one column per unique user-attribute key.
    ///
    /// Parameters without labels use a generated name (`param_<id>`).
    /// Failed trials have an empty `value` cell; pruned trials show the last
    /// value they reported.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use boost_tuner::parameter::{FloatParam, Parameter};
    /// use boost_tuner::{Direction, Study};
    ///
    /// let study = Study::new(Direction::Minimize);
    /// let x = FloatParam::new(0.0, 10.0).name("x");
    ///
    /// let mut trial = study.create_trial();
    /// let _ = x.suggest(&mut trial);
    /// study.complete_trial(trial, 0.42);
    ///
    /// let mut buf = Vec::new();
    /// study.to_csv(&mut buf).unwrap();
    /// let csv = String::from_utf8(buf).unwrap();
    /// assert!(csv.starts_with("trial_id,value,state,x"));
    /// ```
    pub fn to_csv(&self, mut writer: impl std::io::Write) -> std::io::Result<()> {
        let trials = self.trials.read();

        let mut param_columns: BTreeMap<ParamId, String> = BTreeMap::new();
        for trial in trials.iter() {
            for &id in trial.params.keys() {
                param_columns.entry(id).or_insert_with(|| {
                    trial
                        .param_labels
                        .get(&id)
                        .cloned()
                        .unwrap_or_else(|| id.to_string())
                });
            }
        }

        let mut attr_keys: Vec<&String> = trials.iter().flat_map(|t| t.user_attrs.keys()).collect();
        attr_keys.sort();
        attr_keys.dedup();

        write!(writer, "trial_id,value,state")?;
        for label in param_columns.values() {
            write!(writer, ",{}", csv_escape(label))?;
        }
        for key in &attr_keys {
            write!(writer, ",{}", csv_escape(key))?;
        }
        writeln!(writer)?;

        for trial in trials.iter() {
            write!(writer, "{}", trial.id)?;

            if trial.state == TrialState::Failed || trial.value.is_nan() {
                write!(writer, ",")?;
            } else {
                write!(writer, ",{}", trial.value)?;
            }

            write!(writer, ",{}", trial.state)?;

            for id in param_columns.keys() {
                match trial.params.get(id) {
                    Some(pv) => write!(writer, ",{pv}")?,
                    None => write!(writer, ",")?,
                }
            }

            for key in &attr_keys {
                match trial.user_attrs.get(key.as_str()) {
                    Some(attr) => write!(writer, ",{}", csv_escape(&format_attr(attr)))?,
                    None => write!(writer, ",")?,
                }
            }

            writeln!(writer)?;
        }

        Ok(())
    }

    /// Export all trials to a CSV file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created or written.
    pub fn export_csv(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        self.to_csv(std::io::BufWriter::new(file))
    }

    /// Return a human-readable summary of the study.
    ///
    /// The summary includes:
    /// - Optimization direction and total trial count
    /// - Breakdown by state when some trials were pruned or failed
    /// - Best trial value and parameters (if any completed trials exist)
    #[must_use]
    pub fn summary(&self) -> String {
        use fmt::Write;

        let trials = self.trials.read();
        let total = trials.len();
        let n_complete = trials
            .iter()
            .filter(|t| t.state == TrialState::Complete)
            .count();
        drop(trials);
        let n_other = total - n_complete;

        let mut s = format!("Study: {} | {total} trials", self.direction);
        if n_other > 0 {
            let n_pruned = self.n_pruned_trials();
            let _ = write!(
                s,
                " ({n_complete} complete, {n_pruned} pruned, {} failed)",
                n_other - n_pruned
            );
        }

        if let Ok(best) = self.best_trial() {
            let _ = write!(s, "\nBest value: {} (trial #{})", best.value, best.id);
            for (label, value) in best.named_params() {
                let _ = write!(s, "\n  {label} = {value}");
            }
        }

        s
    }
}

impl fmt::Display for Study {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(feature = "serde")]
impl Study {
    /// Write all trials as a pretty-printed JSON array.
    ///
    /// Each element is a serialized [`CompletedTrial`](crate::sampler::CompletedTrial).
    /// Requires the `serde` feature.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if serialization or writing fails.
    pub fn to_json(&self, writer: impl std::io::Write) -> std::io::Result<()> {
        let trials = self.trials.read();
        serde_json::to_writer_pretty(writer, &*trials).map_err(std::io::Error::other)
    }
}

/// Escape a string for CSV output. If the value contains a comma, quote, or
/// newline, wrap it in double-quotes and double any embedded quotes.
fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn format_attr(attr: &AttrValue) -> String {
    attr.to_string()
}
