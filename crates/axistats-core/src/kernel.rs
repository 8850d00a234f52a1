//! Kernel contract
//!
//! A kernel is a hypothesis test over one or more 1-D samples. The dispatch
//! layer in [`crate::dispatch`] turns any kernel into an axis-aware,
//! NaN-policy-aware vectorized operation using only what is declared here.

use ndarray::{ArrayD, ArrayViewD};

use crate::dispatch::ParamMap;
use crate::errors::{StatsError, StatsResult};
use crate::types::{AxisSpec, SampleCount};

/// Static description of a kernel, declared once per kernel type
#[derive(Debug, Clone, Copy)]
pub struct KernelDescriptor {
    /// Function name used in argument errors
    pub name: &'static str,
    /// Declared parameter names in positional order; samples come first.
    /// For [`SampleCount::Unbounded`] the first entry names the variadic samples.
    pub params: &'static [&'static str],
    /// Number of samples accepted
    pub samples: SampleCount,
    /// Whether position `i` of every sample belongs to the same observation
    pub paired: bool,
    /// Largest unacceptably small sample size after NaN removal
    pub too_small: usize,
    /// Axis used when the caller does not give one
    pub default_axis: AxisSpec,
    /// Whether [`Kernel::compute_along_axis`] is implemented
    pub supports_native_axis: bool,
}

impl KernelDescriptor {
    /// True if any sample is at or below the kernel's minimum acceptable size
    pub fn is_too_small<S: AsRef<[f64]>>(&self, samples: &[S]) -> bool {
        samples.iter().any(|s| s.as_ref().len() <= self.too_small)
    }
}

/// Fixed-arity result record of a kernel
///
/// The first two fields are always the statistic and the p-value.
pub trait ResultRecord: Sized + Send {
    /// Array-valued form of the record, one array per field
    type Batch;

    /// Field names in unpacking order
    const FIELDS: &'static [&'static str];

    /// Build a record from scalar fields given in `FIELDS` order
    fn from_fields(fields: &[f64]) -> Self;

    /// Unpack the record into scalar fields in `FIELDS` order
    fn unpack(&self) -> Vec<f64>;

    /// Build the array-valued record from per-field arrays in `FIELDS` order
    ///
    /// Fails if `fields` does not hold exactly one array per field.
    fn assemble(fields: Vec<ArrayD<f64>>) -> StatsResult<Self::Batch>;

    /// Record with every field set to NaN
    fn nan() -> Self {
        Self::from_fields(&vec![f64::NAN; Self::FIELDS.len()])
    }

    fn arity() -> usize {
        Self::FIELDS.len()
    }
}

/// Plain (statistic, p-value) result
#[derive(Debug, Clone, PartialEq)]
pub struct StatPair<T = f64> {
    /// Test statistic
    pub statistic: T,
    /// p-value
    pub pvalue: T,
}

impl ResultRecord for StatPair<f64> {
    type Batch = StatPair<ArrayD<f64>>;

    const FIELDS: &'static [&'static str] = &["statistic", "pvalue"];

    fn from_fields(fields: &[f64]) -> Self {
        Self {
            statistic: fields[0],
            pvalue: fields[1],
        }
    }

    fn unpack(&self) -> Vec<f64> {
        vec![self.statistic, self.pvalue]
    }

    fn assemble(fields: Vec<ArrayD<f64>>) -> StatsResult<Self::Batch> {
        let [statistic, pvalue] = exact_fields::<2>(fields)?;
        Ok(StatPair { statistic, pvalue })
    }
}

/// Take exactly `N` per-field arrays, for use in [`ResultRecord::assemble`]
pub fn exact_fields<const N: usize>(fields: Vec<ArrayD<f64>>) -> StatsResult<[ArrayD<f64>; N]> {
    fields.try_into().map_err(|fields: Vec<ArrayD<f64>>| {
        StatsError::InvalidInput(format!(
            "expected {N} result fields, got {}",
            fields.len()
        ))
    })
}

/// A pluggable hypothesis test
///
/// Kernels receive NaN-free (or NaN-propagating, see [`crate::NanPolicy`])
/// 1-D samples and must fail with a descriptive error on undersized input or
/// out-of-domain options. Numerically marginal results are reported with
/// `log::warn!` and never fail the call.
pub trait Kernel: Send + Sync {
    /// Typed kernel-specific options
    type Options: Clone + Send + Sync;
    /// Native result record
    type Output: ResultRecord;

    fn descriptor(&self) -> &KernelDescriptor;

    /// Build typed options from the keyword parameters left after normalization
    fn configure(&self, params: ParamMap) -> StatsResult<Self::Options>;

    /// Evaluate the test on 1-D samples
    fn compute(&self, samples: &[&[f64]], options: &Self::Options) -> StatsResult<Self::Output>;

    /// Evaluate the test along `axis` of NaN-free N-D samples that share the
    /// same dimensionality and broadcastable non-axis dimensions
    fn compute_along_axis(
        &self,
        samples: &[ArrayViewD<'_, f64>],
        axis: usize,
        options: &Self::Options,
    ) -> StatsResult<<Self::Output as ResultRecord>::Batch> {
        let _ = (samples, axis, options);
        Err(StatsError::NativeAxisUnsupported {
            kernel: self.descriptor().name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_pair_fields() {
        let pair = StatPair::<f64>::from_fields(&[1.5, 0.25]);
        assert_eq!(pair.statistic, 1.5);
        assert_eq!(pair.pvalue, 0.25);
        assert_eq!(pair.unpack(), vec![1.5, 0.25]);
        assert_eq!(StatPair::<f64>::arity(), 2);
    }

    #[test]
    fn test_nan_record() {
        let pair = StatPair::<f64>::nan();
        assert!(pair.statistic.is_nan());
        assert!(pair.pvalue.is_nan());
    }

    #[test]
    fn test_assemble_requires_every_field() {
        let field = || ArrayD::from_elem(ndarray::IxDyn(&[3]), 1.0);

        let pair = StatPair::<f64>::assemble(vec![field(), field()]).unwrap();
        assert_eq!(pair.pvalue.shape(), &[3]);

        assert!(matches!(
            StatPair::<f64>::assemble(vec![field()]),
            Err(StatsError::InvalidInput(_))
        ));
        assert!(StatPair::<f64>::assemble(vec![field(), field(), field()]).is_err());
    }

    #[test]
    fn test_too_small() {
        let desc = KernelDescriptor {
            name: "probe",
            params: &["x", "y"],
            samples: SampleCount::Fixed(2),
            paired: false,
            too_small: 2,
            default_axis: AxisSpec::Index(0),
            supports_native_axis: false,
        };
        assert!(desc.is_too_small(&[vec![1.0, 2.0, 3.0], vec![1.0, 2.0]]));
        assert!(!desc.is_too_small(&[vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]]));
    }
}
