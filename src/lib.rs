#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]
#![warn(missing_docs)]

//! Hyperparameter search with median pruning for a gradient-boosted tree
//! binary classifier.
//!
//! The crate has two halves. The search half is a small Optuna-style
//! optimizer: a [`Study`] runs trials one after another, each [`Trial`]
//! draws its configuration from a [`Sampler`](sampler::Sampler) (random or
//! TPE) and may be stopped early by a [`Pruner`](pruner::Pruner). The model
//! half is a LightGBM-style [`booster`] trained on a synthetic dataset from
//! [`data`], whose per-round validation loss feeds the pruner.
//! [`experiment`] wires the two together.
//!
//! # Getting Started
//!
//! Any closure returning `Result<f64, E>` is an objective:
//!
//! ```
//! use boost_tuner::prelude::*;
//!
//! let study = Study::new(Direction::Minimize);
//! let x = FloatParam::new(-10.0, 10.0).name("x");
//!
//! study
//!     .optimize(50, |trial: &mut Trial| {
//!         let v = x.suggest(trial)?;
//!         Ok::<_, Error>((v - 3.0).powi(2))
//!     })
//!     .unwrap();
//!
//! let best = study.best_trial().unwrap();
//! println!("x = {:.4}, f(x) = {:.4}", best.get(&x).unwrap(), best.value);
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Study`] | Drive the search: create trials, record results, track the best. |
//! | [`Trial`] | One evaluation, carrying its sampled values and intermediate losses. |
//! | [`SearchSpace`](search_space::SearchSpace) | Named [`IntParam`](parameter::IntParam) / [`FloatParam`](parameter::FloatParam) ranges. |
//! | [`TpeSampler`](sampler::TpeSampler) | Tree-Parzen Estimator; random for the first trials. |
//! | [`MedianPruner`](pruner::MedianPruner) | Stops trials worse than the median of completed trials at the same step. |
//! | [`Booster`](booster::Booster) | Leaf-wise gradient-boosted trees on binary log loss. |
//! | [`RunConfig`](config::RunConfig) | Every setting of the experiment, fixed for the run. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) | on |
//! | `serde` | `Serialize`/`Deserialize` on public types, `Study::to_json` | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

pub mod booster;
pub mod config;
pub mod data;
mod distribution;
mod error;
pub mod experiment;
mod kde;
pub mod metrics;
pub mod objective;
mod param;
pub mod parameter;
pub mod pruner;
mod rng_util;
pub mod sampler;
pub mod search_space;
mod study;
mod trial;
mod types;
pub mod visualization;

pub use error::{Error, Result, TrialPruned};
pub use objective::Objective;
pub use param::ParamValue;
pub use study::{Study, StudyBuilder};
pub use trial::{AttrValue, Trial};
pub use types::{Direction, TrialState};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use boost_tuner::prelude::*;
/// ```
pub mod prelude {
    pub use crate::booster::{Booster, BoosterParams};
    pub use crate::config::RunConfig;
    pub use crate::error::{Error, Result, TrialPruned};
    pub use crate::objective::Objective;
    pub use crate::param::ParamValue;
    pub use crate::parameter::{FloatParam, IntParam, Parameter};
    pub use crate::pruner::{MedianPruner, NopPruner, Pruner};
    pub use crate::sampler::{CompletedTrial, RandomSampler, TpeSampler};
    pub use crate::search_space::SearchSpace;
    pub use crate::study::{Study, StudyBuilder};
    pub use crate::trial::{AttrValue, Trial};
    pub use crate::types::{Direction, TrialState};
}
