//! Vectorized dispatch of hypothesis-test kernels
//!
//! Turns any [`Kernel`] that works on 1-D samples into an operation that
//! accepts N-D arrays, an `axis` option, and a `nan_policy` option.
//!
//! 1-D inputs take the fast path: the NaN policy is applied once and the
//! kernel is called directly, so undersized samples raise. N-D inputs are
//! concatenated along the axis and evaluated slice by slice, and undersized
//! slices after NaN removal yield NaN instead of failing the whole call.

mod args;
mod assemble;
pub mod broadcast;
mod guard;
mod nan;

pub use args::{normalize, CallArgs, NormalizedCall, ParamMap, Value};
pub use assemble::{assemble_batch, unpack_trailing, Vectorized};
pub use guard::check_empty_inputs;
pub use nan::{contains_nan, remove_nans, SliceStrategy};

use ndarray::{Array1, ArrayD, ArrayViewD, Axis, IxDyn};

use self::broadcast::{
    apply_along_last_axis, broadcast_concatenate, move_axis_to_end, pad_to_ndim, resolve_axis,
    split_points, split_slice,
};
use crate::errors::{StatsError, StatsResult};
use crate::kernel::{Kernel, ResultRecord};
use crate::types::{AxisSpec, NanPolicy, SampleCount, VectorizeOptions};

type Batch<K> = <<K as Kernel>::Output as ResultRecord>::Batch;

/// Normalize a dynamic call, configure the kernel, and evaluate it
///
/// `axis` and `nan_policy` are accepted as keywords by every kernel in
/// addition to its declared parameters.
pub fn call<K: Kernel>(kernel: &K, args: CallArgs) -> StatsResult<Vectorized<K::Output>> {
    let NormalizedCall {
        samples,
        axis,
        nan_policy,
        params,
    } = normalize(kernel.descriptor(), args)?;
    let kernel_options = kernel.configure(params)?;

    let options = VectorizeOptions {
        axis: Some(axis),
        nan_policy,
        parallel: false,
    };
    vectorize(kernel, samples, &options, &kernel_options)
}

/// Evaluate `kernel` on `samples` along an axis under a NaN policy
///
/// # Arguments
/// * `kernel` - The hypothesis test
/// * `samples` - Sample arrays in the kernel's declared order
/// * `options` - Axis, NaN policy, and parallelism
/// * `kernel_options` - Kernel-specific options
///
/// # Returns
/// [`Vectorized::Scalar`] when every sample is at most 1-D (or the axis is
/// [`AxisSpec::Flatten`]), otherwise [`Vectorized::Batch`] with one entry per
/// axis-slice of the broadcast samples.
pub fn vectorize<K: Kernel>(
    kernel: &K,
    samples: Vec<ArrayD<f64>>,
    options: &VectorizeOptions,
    kernel_options: &K::Options,
) -> StatsResult<Vectorized<K::Output>> {
    let desc = kernel.descriptor();
    if let SampleCount::Fixed(n) = desc.samples {
        if samples.len() != n {
            return Err(StatsError::InvalidInput(format!(
                "{} expects {} samples, got {}",
                desc.name,
                n,
                samples.len()
            )));
        }
    }

    let mut samples = samples
        .into_iter()
        .map(at_least_1d)
        .collect::<StatsResult<Vec<_>>>()?;
    let axis = match options.axis.unwrap_or(desc.default_axis) {
        AxisSpec::Index(axis) => axis,
        AxisSpec::Flatten => {
            samples = samples.into_iter().map(ravel).collect();
            0
        }
    };

    if samples.iter().all(|s| s.ndim() <= 1) {
        log::debug!("{}: 1-D fast path", desc.name);
        return fast_path(kernel, &samples, options.nan_policy, kernel_options)
            .map(Vectorized::Scalar);
    }

    broadcast_path(kernel, samples, axis, options, kernel_options).map(Vectorized::Batch)
}

fn at_least_1d(sample: ArrayD<f64>) -> StatsResult<ArrayD<f64>> {
    if sample.ndim() == 0 {
        return Ok(sample.into_shape_with_order(IxDyn(&[1]))?);
    }
    Ok(sample)
}

fn ravel(sample: ArrayD<f64>) -> ArrayD<f64> {
    Array1::from_iter(sample.iter().copied()).into_dyn()
}

fn fast_path<K: Kernel>(
    kernel: &K,
    samples: &[ArrayD<f64>],
    policy: NanPolicy,
    kernel_options: &K::Options,
) -> StatsResult<K::Output> {
    let desc = kernel.descriptor();
    let data: Vec<Vec<f64>> = samples.iter().map(|s| s.iter().copied().collect()).collect();

    let found = contains_nan(data.iter().flatten(), policy)?;
    let data = match SliceStrategy::select(found, policy, desc.paired) {
        SliceStrategy::Direct => data,
        SliceStrategy::Propagate => return Ok(K::Output::nan()),
        SliceStrategy::Omit { paired } => remove_nans(&data, paired)?,
    };

    let views: Vec<&[f64]> = data.iter().map(Vec::as_slice).collect();
    kernel.compute(&views, kernel_options)
}

fn broadcast_path<K: Kernel>(
    kernel: &K,
    samples: Vec<ArrayD<f64>>,
    axis: isize,
    options: &VectorizeOptions,
    kernel_options: &K::Options,
) -> StatsResult<Batch<K>> {
    let desc = kernel.descriptor();
    let ndim = samples.iter().map(|s| s.ndim()).max().unwrap_or(1);
    let samples: Vec<ArrayD<f64>> = samples.into_iter().map(|s| pad_to_ndim(s, ndim)).collect();
    let axis = resolve_axis(axis, ndim)?;

    if let Some(empty) = check_empty_inputs::<K::Output>(&samples, axis)? {
        return Ok(empty);
    }

    let lengths: Vec<usize> = samples.iter().map(|s| s.len_of(Axis(axis))).collect();
    let points = split_points(&lengths);
    let x = broadcast_concatenate(&samples, axis)?;
    let found = contains_nan(x.iter(), options.nan_policy)?;

    if desc.supports_native_axis && !found {
        log::debug!("{}: native evaluation along axis {}", desc.name, axis);
        let views: Vec<ArrayViewD<'_, f64>> = samples.iter().map(|s| s.view()).collect();
        return kernel.compute_along_axis(&views, axis, kernel_options);
    }

    let plan = SlicePlan {
        kernel,
        options: kernel_options,
        points: &points,
        strategy: SliceStrategy::select(found, options.nan_policy, desc.paired),
    };
    log::debug!(
        "{}: per-slice evaluation along axis {} ({:?})",
        desc.name,
        axis,
        plan.strategy
    );

    let x = move_axis_to_end(x, axis);
    let res = apply_along_last_axis(&x, K::Output::arity(), options.parallel, |slice| {
        plan.run(slice)
    })?;
    assemble_batch::<K::Output>(&res)
}

/// Per-slice evaluation, chosen once per call
struct SlicePlan<'a, K: Kernel> {
    kernel: &'a K,
    options: &'a K::Options,
    points: &'a [usize],
    strategy: SliceStrategy,
}

impl<K: Kernel> SlicePlan<'_, K> {
    fn run(&self, slice: &[f64]) -> StatsResult<Vec<f64>> {
        let pieces = split_slice(slice, self.points);
        let output = match self.strategy {
            SliceStrategy::Direct => self.kernel.compute(&pieces, self.options)?,
            SliceStrategy::Propagate => {
                if pieces.iter().any(|p| p.iter().any(|v| v.is_nan())) {
                    K::Output::nan()
                } else {
                    self.kernel.compute(&pieces, self.options)?
                }
            }
            SliceStrategy::Omit { paired } => {
                let filtered = remove_nans(&pieces, paired)?;
                if self.kernel.descriptor().is_too_small(&filtered) {
                    K::Output::nan()
                } else {
                    let views: Vec<&[f64]> = filtered.iter().map(Vec::as_slice).collect();
                    self.kernel.compute(&views, self.options)?
                }
            }
        };
        Ok(output.unpack())
    }
}
