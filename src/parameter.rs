//! Parameter definitions.
//!
//! A [`Parameter`] knows its identity and distribution and turns a raw
//! [`ParamValue`] back into a typed value. The built-in [`FloatParam`] and
//! [`IntParam`] are both a [`RangeParam`] over a numeric bound type.
//!
//! # Example
//!
//! ```
//! use boost_tuner::Trial;
//! use boost_tuner::parameter::{FloatParam, IntParam, Parameter};
//!
//! let mut trial = Trial::new(0);
//!
//! let lr = FloatParam::new(1e-3, 0.5)
//!     .log_scale()
//!     .name("learning_rate")
//!     .suggest(&mut trial)
//!     .unwrap();
//! let depth = IntParam::new(1, 10).name("max_depth").suggest(&mut trial).unwrap();
//! assert!((1e-3..=0.5).contains(&lr));
//! assert!((1..=10).contains(&depth));
//! ```

use core::fmt::{self, Debug};
use core::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::distribution::{Distribution, FloatDistribution, IntDistribution};
use crate::error::{Error, Result};
use crate::param::ParamValue;
use crate::trial::Trial;

static NEXT_PARAM_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique handle of a parameter. Clones of a parameter share it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParamId(u64);

impl ParamId {
    /// Allocates a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self(NEXT_PARAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ParamId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "param_{}", self.0)
    }
}

/// Something a [`Trial`] can sample.
pub trait Parameter: Debug {
    /// The typed value handed back to the objective.
    type Value;

    /// Identity used to match this parameter across trials.
    fn id(&self) -> ParamId;

    /// Where values are drawn from.
    fn distribution(&self) -> Distribution;

    /// Converts a sampled value to [`Self::Value`].
    ///
    /// # Errors
    ///
    /// Returns an error if the value has the wrong variant.
    fn cast_param_value(&self, param_value: &ParamValue) -> Result<Self::Value>;

    /// Checks the configuration before anything is sampled.
    ///
    /// # Errors
    ///
    /// Returns an error describing the invalid setting.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Name shown in reports. Defaults to the id.
    fn label(&self) -> String {
        self.id().to_string()
    }

    /// Shorthand for [`Trial::suggest_param`].
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration or a conflicting earlier
    /// definition of the same id.
    fn suggest(&self, trial: &mut Trial) -> Result<Self::Value>
    where
        Self: Sized,
    {
        trial.suggest_param(self)
    }
}

/// Numeric types a [`RangeParam`] can range over.
pub trait RangeBound: Copy + Debug + PartialOrd {
    /// The distribution for a range with these settings.
    fn distribution(low: Self, high: Self, log_scale: bool, step: Option<Self>) -> Distribution;

    /// Extracts a value of this type from a sample.
    ///
    /// # Errors
    ///
    /// Returns `Error::Internal` if the variant does not match.
    fn from_param_value(value: &ParamValue) -> Result<Self>;

    /// Checks bounds, log-scale lower bound and step.
    ///
    /// # Errors
    ///
    /// `InvalidBounds`, `InvalidLogBounds` or `InvalidStep`.
    fn check(low: Self, high: Self, log_scale: bool, step: Option<Self>) -> Result<()>;
}

impl RangeBound for f64 {
    fn distribution(low: f64, high: f64, log_scale: bool, step: Option<f64>) -> Distribution {
        Distribution::Float(FloatDistribution {
            low,
            high,
            log_scale,
            step,
        })
    }

    fn from_param_value(value: &ParamValue) -> Result<f64> {
        match value {
            ParamValue::Float(v) => Ok(*v),
            ParamValue::Int(_) => Err(Error::Internal("float range sampled an integer")),
        }
    }

    fn check(low: f64, high: f64, log_scale: bool, step: Option<f64>) -> Result<()> {
        if !(low.is_finite() && high.is_finite()) || low > high {
            return Err(Error::InvalidBounds { low, high });
        }
        if log_scale && low <= 0.0 {
            return Err(Error::InvalidLogBounds);
        }
        match step {
            Some(s) if s.is_nan() || s <= 0.0 => Err(Error::InvalidStep),
            _ => Ok(()),
        }
    }
}

impl RangeBound for i64 {
    fn distribution(low: i64, high: i64, log_scale: bool, step: Option<i64>) -> Distribution {
        Distribution::Int(IntDistribution {
            low,
            high,
            log_scale,
            step,
        })
    }

    fn from_param_value(value: &ParamValue) -> Result<i64> {
        match value {
            ParamValue::Int(v) => Ok(*v),
            ParamValue::Float(_) => Err(Error::Internal("integer range sampled a float")),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn check(low: i64, high: i64, log_scale: bool, step: Option<i64>) -> Result<()> {
        if low > high {
            return Err(Error::InvalidBounds {
                low: low as f64,
                high: high as f64,
            });
        }
        if log_scale && low < 1 {
            return Err(Error::InvalidLogBounds);
        }
        match step {
            Some(s) if s <= 0 => Err(Error::InvalidStep),
            _ => Ok(()),
        }
    }
}

/// A closed range `[low, high]` with optional log scale, step and name.
///
/// ```
/// use boost_tuner::Trial;
/// use boost_tuner::parameter::{FloatParam, IntParam, Parameter};
///
/// let mut trial = Trial::new(0);
/// let alpha = FloatParam::new(1e-3, 2.0).log_scale().suggest(&mut trial).unwrap();
/// let frac = FloatParam::new(0.0, 1.0).step(0.25).suggest(&mut trial).unwrap();
/// let rounds = IntParam::new(50, 500).step(50).suggest(&mut trial).unwrap();
/// assert_eq!(rounds % 50, 0);
/// assert!([0.0, 0.25, 0.5, 0.75, 1.0].contains(&frac));
/// assert!((1e-3..=2.0).contains(&alpha));
/// ```
#[derive(Clone, Debug)]
pub struct RangeParam<T> {
    id: ParamId,
    low: T,
    high: T,
    log_scale: bool,
    step: Option<T>,
    name: Option<String>,
}

/// A float range.
pub type FloatParam = RangeParam<f64>;

/// An integer range.
pub type IntParam = RangeParam<i64>;

impl<T: RangeBound> RangeParam<T> {
    /// A new range with a fresh id.
    #[must_use]
    pub fn new(low: T, high: T) -> Self {
        Self {
            id: ParamId::new(),
            low,
            high,
            log_scale: false,
            step: None,
            name: None,
        }
    }

    /// Samples uniformly in log space.
    #[must_use]
    pub fn log_scale(mut self) -> Self {
        self.log_scale = true;
        self
    }

    /// Restricts values to `low + k * step`.
    #[must_use]
    pub fn step(mut self, step: T) -> Self {
        self.step = Some(step);
        self
    }

    /// Sets the label used in reports and `best_params`.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<T: RangeBound> Parameter for RangeParam<T> {
    type Value = T;

    fn id(&self) -> ParamId {
        self.id
    }

    fn distribution(&self) -> Distribution {
        T::distribution(self.low, self.high, self.log_scale, self.step)
    }

    fn cast_param_value(&self, param_value: &ParamValue) -> Result<T> {
        T::from_param_value(param_value)
    }

    fn validate(&self) -> Result<()> {
        T::check(self.low, self.high, self.log_scale, self.step)
    }

    fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.to_string())
    }
}
