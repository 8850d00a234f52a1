//! NaN policy handling
//!
//! Detection, paired and unpaired removal, and the per-slice strategy used by
//! the broadcast path.

use crate::errors::{StatsError, StatsResult};
use crate::types::NanPolicy;

/// Check for NaN, failing immediately under [`NanPolicy::Raise`]
pub fn contains_nan<'a, I>(values: I, policy: NanPolicy) -> StatsResult<bool>
where
    I: IntoIterator<Item = &'a f64>,
{
    let found = values.into_iter().any(|v| v.is_nan());
    if found && policy == NanPolicy::Raise {
        return Err(StatsError::InvalidInput(
            "The input contains nan values".into(),
        ));
    }
    Ok(found)
}

/// Remove NaN observations from each sample
///
/// Unpaired samples are filtered independently. Paired samples drop position
/// `i` from every sample when any of them is NaN at `i`, so they must all have
/// the same length.
pub fn remove_nans<S: AsRef<[f64]>>(samples: &[S], paired: bool) -> StatsResult<Vec<Vec<f64>>> {
    if !paired {
        return Ok(samples
            .iter()
            .map(|s| s.as_ref().iter().copied().filter(|v| !v.is_nan()).collect())
            .collect());
    }

    let Some(first) = samples.first() else {
        return Ok(Vec::new());
    };
    let n = first.as_ref().len();
    if let Some(bad) = samples.iter().find(|s| s.as_ref().len() != n) {
        return Err(StatsError::DimensionMismatchMsg(format!(
            "paired samples must have equal length ({} != {})",
            n,
            bad.as_ref().len()
        )));
    }

    let mut nans = vec![false; n];
    for sample in samples {
        for (mask, v) in nans.iter_mut().zip(sample.as_ref()) {
            *mask |= v.is_nan();
        }
    }

    Ok(samples
        .iter()
        .map(|s| {
            s.as_ref()
                .iter()
                .zip(&nans)
                .filter(|(_, nan)| !**nan)
                .map(|(&v, _)| v)
                .collect()
        })
        .collect())
}

/// How each axis-slice is prepared before the kernel sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceStrategy {
    /// No NaN anywhere: split and call the kernel
    Direct,
    /// A slice with any NaN yields an all-NaN result
    Propagate,
    /// Drop NaN, then yield all-NaN if any sample is too small
    Omit { paired: bool },
}

impl SliceStrategy {
    /// Select the strategy once per call.
    ///
    /// `Raise` never reaches here with NaN present since [`contains_nan`] has
    /// already failed.
    pub fn select(found_nan: bool, policy: NanPolicy, paired: bool) -> Self {
        match (found_nan, policy) {
            (false, _) | (true, NanPolicy::Raise) => SliceStrategy::Direct,
            (true, NanPolicy::Propagate) => SliceStrategy::Propagate,
            (true, NanPolicy::Omit) => SliceStrategy::Omit { paired },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_nan() {
        let clean = [1.0, 2.0, 3.0];
        let dirty = [1.0, f64::NAN, 3.0];

        assert!(!contains_nan(&clean, NanPolicy::Raise).unwrap());
        assert!(contains_nan(&dirty, NanPolicy::Propagate).unwrap());
        assert!(contains_nan(&dirty, NanPolicy::Omit).unwrap());
        assert!(matches!(
            contains_nan(&dirty, NanPolicy::Raise),
            Err(StatsError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_remove_nans_unpaired() {
        let x = vec![1.0, f64::NAN, 3.0, 4.0];
        let y = vec![f64::NAN, 2.0];
        let out = remove_nans(&[x.clone(), y], false).unwrap();

        assert_eq!(out[0], vec![1.0, 3.0, 4.0]);
        assert_eq!(out[1], vec![2.0]);
        // the input is untouched
        assert!(x[1].is_nan());
    }

    #[test]
    fn test_remove_nans_paired() {
        let x = vec![1.0, f64::NAN, 3.0, 4.0, 5.0];
        let y = vec![1.0, 2.0, 3.0, f64::NAN, 5.0];
        let out = remove_nans(&[x, y], true).unwrap();

        assert_eq!(out[0], vec![1.0, 3.0, 5.0]);
        assert_eq!(out[1], vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_remove_nans_paired_length_mismatch() {
        let x = vec![1.0, 2.0, 3.0];
        let y = vec![1.0, 2.0];
        assert!(matches!(
            remove_nans(&[x, y], true),
            Err(StatsError::DimensionMismatchMsg(_))
        ));
    }

    #[test]
    fn test_strategy_select() {
        assert_eq!(
            SliceStrategy::select(false, NanPolicy::Omit, true),
            SliceStrategy::Direct
        );
        assert_eq!(
            SliceStrategy::select(true, NanPolicy::Propagate, false),
            SliceStrategy::Propagate
        );
        assert_eq!(
            SliceStrategy::select(true, NanPolicy::Omit, true),
            SliceStrategy::Omit { paired: true }
        );
    }
}
