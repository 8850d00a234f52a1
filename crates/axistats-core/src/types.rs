use std::fmt;
use std::str::FromStr;

use crate::errors::StatsError;

/// Axis along which a statistic is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSpec {
    /// A specific axis; negative values count from the last dimension
    Index(isize),
    /// Ravel every sample to 1-D and compute along axis 0
    Flatten,
}

impl Default for AxisSpec {
    fn default() -> Self {
        AxisSpec::Index(0)
    }
}

impl From<isize> for AxisSpec {
    fn from(axis: isize) -> Self {
        AxisSpec::Index(axis)
    }
}

/// Policy for handling NaN values in the input samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NanPolicy {
    /// Any NaN in an axis-slice makes every output field of that slice NaN (default)
    #[default]
    Propagate,
    /// Drop NaN observations before calling the kernel
    Omit,
    /// Error if any NaN is present
    Raise,
}

impl NanPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NanPolicy::Propagate => "propagate",
            NanPolicy::Omit => "omit",
            NanPolicy::Raise => "raise",
        }
    }
}

impl FromStr for NanPolicy {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "propagate" => Ok(NanPolicy::Propagate),
            "omit" => Ok(NanPolicy::Omit),
            "raise" => Ok(NanPolicy::Raise),
            other => Err(StatsError::InvalidValue {
                name: "nan_policy".into(),
                reason: format!("'{other}' is not one of 'propagate', 'omit', 'raise'"),
            }),
        }
    }
}

impl fmt::Display for NanPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alternative hypothesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alternative {
    #[default]
    TwoSided,
    Less,
    Greater,
}

impl Alternative {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alternative::TwoSided => "two-sided",
            Alternative::Less => "less",
            Alternative::Greater => "greater",
        }
    }
}

impl FromStr for Alternative {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "two-sided" | "two_sided" => Ok(Alternative::TwoSided),
            "less" => Ok(Alternative::Less),
            "greater" => Ok(Alternative::Greater),
            other => Err(StatsError::InvalidValue {
                name: "alternative".into(),
                reason: format!("'{other}' is not one of 'two-sided', 'less', 'greater'"),
            }),
        }
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of samples a kernel accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCount {
    /// Exactly `n` samples, bound to the first `n` declared parameters
    Fixed(usize),
    /// Every positional argument is a sample
    Unbounded,
}

/// Options for the vectorized entry point
#[derive(Debug, Clone, Default)]
pub struct VectorizeOptions {
    /// Axis to compute along (`None` uses the kernel's default axis)
    pub axis: Option<AxisSpec>,
    /// Missing-value policy
    pub nan_policy: NanPolicy,
    /// Evaluate axis-slices on the rayon thread pool
    pub parallel: bool,
}

impl VectorizeOptions {
    pub fn with_axis(mut self, axis: impl Into<AxisSpec>) -> Self {
        self.axis = Some(axis.into());
        self
    }

    pub fn with_nan_policy(mut self, nan_policy: NanPolicy) -> Self {
        self.nan_policy = nan_policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_policy_parse() {
        assert_eq!("omit".parse::<NanPolicy>().unwrap(), NanPolicy::Omit);
        assert_eq!("raise".parse::<NanPolicy>().unwrap(), NanPolicy::Raise);
        assert!(matches!(
            "ignore".parse::<NanPolicy>(),
            Err(StatsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_alternative_parse() {
        assert_eq!(
            "two-sided".parse::<Alternative>().unwrap(),
            Alternative::TwoSided
        );
        assert_eq!("greater".parse::<Alternative>().unwrap(), Alternative::Greater);
        assert!("both".parse::<Alternative>().is_err());
    }

    #[test]
    fn test_vectorize_options_default() {
        let opts = VectorizeOptions::default();
        assert_eq!(opts.axis, None);
        assert_eq!(opts.nan_policy, NanPolicy::Propagate);
        assert!(!opts.parallel);

        let opts = opts
            .with_axis(AxisSpec::Index(-1))
            .with_nan_policy(NanPolicy::Omit);
        assert_eq!(opts.axis, Some(AxisSpec::Index(-1)));
        assert_eq!(opts.nan_policy, NanPolicy::Omit);
    }
}
