//! Self-contained HTML charts of a finished search.
//!
//! Each file embeds its data and loads [Plotly.js](https://plotly.com/javascript/)
//! from a CDN, so it opens in any browser with a network connection.
//!
//! | File | Chart |
//! |---|---|
//! | `optimization_history.html` | Objective value per trial with a best-so-far line |
//! | `slice_plot.html` | Objective value against each parameter, one subplot per parameter |
//!
//! Only Complete trials are drawn. Pruned and failed trials do not carry a
//! final objective value.

use core::fmt::Write as _;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::distribution::Distribution;
use crate::study::Study;
use crate::types::{Direction, TrialState};

/// File name written by [`write_history_html`].
pub const HISTORY_FILE: &str = "optimization_history.html";
/// File name written by [`write_slice_html`].
pub const SLICE_FILE: &str = "slice_plot.html";

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Writes the optimization history chart into `dir` and returns its path.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be written.
pub fn write_history_html(study: &Study, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
    let path = dir.as_ref().join(HISTORY_FILE);
    std::fs::write(&path, history_html(study))?;
    Ok(path)
}

/// Writes the slice plot into `dir` and returns its path.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be written.
pub fn write_slice_html(study: &Study, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
    let path = dir.as_ref().join(SLICE_FILE);
    std::fs::write(&path, slice_html(study))?;
    Ok(path)
}

/// The optimization history page as a string.
#[must_use]
pub fn history_html(study: &Study) -> String {
    let history = study.history();
    let ids: Vec<u64> = history.iter().map(|&(id, _, _)| id).collect();
    let values = js_array(history.iter().map(|&(_, v, _)| v));
    let best = js_array(history.iter().map(|&(_, _, b)| b));

    let mut html = page_header("Optimization History", study.direction(), history.len());
    let _ = write!(
        html,
        r##"<div class="chart" id="history"></div>
<script>
Plotly.newPlot("history", [
  {{ x: {ids:?}, y: {values}, mode: "markers", name: "Objective Value", type: "scatter",
     marker: {{ color: "#3498db", size: 6 }} }},
  {{ x: {ids:?}, y: {best}, mode: "lines", name: "Best Value", type: "scatter",
     line: {{ color: "#e74c3c", width: 2 }} }}
], {{ xaxis: {{ title: "Trial" }}, yaxis: {{ title: "Objective Value" }},
     margin: {{ t: 10 }}, legend: {{ x: 1, xanchor: "right", y: 1 }} }},
   {{ responsive: true }});
</script>
"##,
    );
    html.push_str("</body>\n</html>\n");
    html
}

struct Slice {
    x: Vec<f64>,
    y: Vec<f64>,
    log: bool,
}

/// The slice plot page as a string. Parameters are ordered by name.
#[must_use]
pub fn slice_html(study: &Study) -> String {
    let trials = study.trials();
    let mut slices: BTreeMap<String, Slice> = BTreeMap::new();
    for t in trials.iter().filter(|t| t.state == TrialState::Complete) {
        for (id, value) in &t.params {
            let label = t
                .param_labels
                .get(id)
                .cloned()
                .unwrap_or_else(|| id.to_string());
            let log = match t.distributions.get(id) {
                Some(Distribution::Float(d)) => d.log_scale,
                Some(Distribution::Int(d)) => d.log_scale,
                None => false,
            };
            let slice = slices.entry(label).or_insert_with(|| Slice {
                x: Vec::new(),
                y: Vec::new(),
                log,
            });
            slice.x.push(value.as_f64());
            slice.y.push(t.value);
        }
    }

    let n_complete = study.history().len();
    let mut html = page_header("Slice Plot", study.direction(), n_complete);

    let cols = slices.len().max(1);
    let mut traces = String::new();
    let mut axes = String::new();
    for (i, (name, slice)) in slices.iter().enumerate() {
        let suffix = if i == 0 { String::new() } else { (i + 1).to_string() };
        let _ = write!(
            traces,
            r##"{{ x: {x}, y: {y}, mode: "markers", type: "scatter", name: "{name}",
   xaxis: "x{suffix}", yaxis: "y{suffix}", marker: {{ color: "#3498db", size: 5 }} }},
"##,
            x = js_array(slice.x.iter().copied()),
            y = js_array(slice.y.iter().copied()),
            name = escape_js(name),
        );
        let axis_type = if slice.log { "log" } else { "linear" };
        let _ = write!(
            axes,
            r#"xaxis{suffix}: {{ title: "{name}", type: "{axis_type}" }}, "#,
            name = escape_js(name),
        );
    }

    let _ = write!(
        html,
        r#"<div class="chart" id="slices"></div>
<script>
Plotly.newPlot("slices", [
{traces}], {{ grid: {{ rows: 1, columns: {cols}, pattern: "independent" }},
     {axes}yaxis: {{ title: "Objective Value" }},
     margin: {{ t: 10 }}, showlegend: false }},
   {{ responsive: true }});
</script>
"#,
    );
    html.push_str("</body>\n</html>\n");
    html
}

fn page_header(title: &str, direction: Direction, n_trials: usize) -> String {
    let direction = match direction {
        Direction::Minimize => "Minimize",
        Direction::Maximize => "Maximize",
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{PLOTLY_CDN}"></script>
<style>
  body {{ font-family: -apple-system, "Segoe UI", Roboto, sans-serif; background: #f5f6fa;
         color: #2c3e50; padding: 24px; }}
  h1 {{ text-align: center; font-size: 1.6em; }}
  .subtitle {{ text-align: center; color: #7f8c8d; margin-bottom: 16px; }}
  .chart {{ background: #fff; border-radius: 8px; min-height: 480px; }}
</style>
</head>
<body>
<h1>{title}</h1>
<p class="subtitle">{direction} &middot; {n_trials} complete trials</p>
"#
    )
}

/// A JavaScript array literal. JavaScript has no literal for NaN or the
/// infinities, so Plotly gets `null` for them and leaves a gap.
fn js_array(values: impl IntoIterator<Item = f64>) -> String {
    let mut out = String::from("[");
    for (i, v) in values.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        if v.is_finite() {
            let _ = write!(out, "{v:?}");
        } else {
            out.push_str("null");
        }
    }
    out.push(']');
    out
}

fn escape_js(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
