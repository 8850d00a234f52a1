//! Axis broadcasting helpers
//!
//! Shape reconciliation, concatenation with offset tracking, axis movement,
//! and application of a slice function along the last axis.

use ndarray::{concatenate, ArrayD, ArrayView1, ArrayViewD, Axis, IxDyn};
use rayon::prelude::*;

use crate::errors::{StatsError, StatsResult};

/// Left-pad `sample` with unit axes up to `ndim` dimensions
pub fn pad_to_ndim(mut sample: ArrayD<f64>, ndim: usize) -> ArrayD<f64> {
    while sample.ndim() < ndim {
        sample.insert_axis_inplace(Axis(0));
    }
    sample
}

/// Resolve a possibly negative axis against `ndim` dimensions
pub fn resolve_axis(axis: isize, ndim: usize) -> StatsResult<usize> {
    let resolved = if axis < 0 { axis + ndim as isize } else { axis };
    if resolved < 0 || resolved >= ndim as isize {
        return Err(StatsError::AxisOutOfBounds { axis, ndim });
    }
    Ok(resolved as usize)
}

/// Broadcast shapes of equal dimensionality, excluding `axis` when given
///
/// A column holding a 0 and otherwise only 1s broadcasts to 0; any other
/// disagreement is an error.
pub fn broadcast_shapes(shapes: &[&[usize]], axis: Option<usize>) -> StatsResult<Vec<usize>> {
    let ndim = shapes.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut out = Vec::with_capacity(ndim);

    for d in 0..ndim {
        if Some(d) == axis {
            continue;
        }
        let column: Vec<usize> = shapes
            .iter()
            .map(|s| {
                let offset = ndim - s.len();
                if d < offset {
                    1
                } else {
                    s[d - offset]
                }
            })
            .collect();
        let max = column.iter().copied().max().unwrap_or(1);
        let target = if column.contains(&0) { 0 } else { max };
        if column.iter().any(|&n| n != 1 && n != target) {
            return Err(StatsError::IncompatibleShapes(format!("{shapes:?}")));
        }
        out.push(target);
    }
    Ok(out)
}

/// Cumulative split points for samples of the given lengths
pub fn split_points(lengths: &[usize]) -> Vec<usize> {
    lengths
        .iter()
        .scan(0, |acc, &n| {
            *acc += n;
            Some(*acc)
        })
        .collect()
}

/// Split a concatenated slice back into its samples
pub fn split_slice<'a>(values: &'a [f64], points: &[usize]) -> Vec<&'a [f64]> {
    let mut start = 0;
    points
        .iter()
        .map(|&end| {
            let piece = &values[start..end];
            start = end;
            piece
        })
        .collect()
}

/// Broadcast non-axis dimensions of every sample and concatenate along `axis`
///
/// Samples must already share the same dimensionality.
pub fn broadcast_concatenate(samples: &[ArrayD<f64>], axis: usize) -> StatsResult<ArrayD<f64>> {
    let shapes: Vec<&[usize]> = samples.iter().map(|s| s.shape()).collect();
    let common = broadcast_shapes(&shapes, Some(axis))?;

    let views = samples
        .iter()
        .map(|sample| {
            let mut target = common.clone();
            target.insert(axis, sample.len_of(Axis(axis)));
            sample
                .broadcast(IxDyn(&target))
                .ok_or_else(|| StatsError::IncompatibleShapes(format!("{shapes:?}")))
        })
        .collect::<StatsResult<Vec<ArrayViewD<'_, f64>>>>()?;

    Ok(concatenate(Axis(axis), &views)?)
}

/// Move `axis` to the last position
pub fn move_axis_to_end(x: ArrayD<f64>, axis: usize) -> ArrayD<f64> {
    let ndim = x.ndim();
    let order: Vec<usize> = (0..ndim).filter(|&d| d != axis).chain([axis]).collect();
    x.permuted_axes(IxDyn(&order))
}

/// Apply `f` to every lane along the last axis
///
/// `f` returns `arity` values per lane; the output has the leading shape of
/// `x` followed by a trailing dimension of length `arity`.
pub fn apply_along_last_axis<F>(
    x: &ArrayD<f64>,
    arity: usize,
    parallel: bool,
    f: F,
) -> StatsResult<ArrayD<f64>>
where
    F: Fn(&[f64]) -> StatsResult<Vec<f64>> + Sync,
{
    let last = x.ndim() - 1;
    let lanes: Vec<ArrayView1<'_, f64>> = x.lanes(Axis(last)).into_iter().collect();

    let run = |lane: &ArrayView1<'_, f64>| -> StatsResult<Vec<f64>> {
        let fields = f(&lane.to_vec())?;
        if fields.len() != arity {
            return Err(StatsError::InvalidInput(format!(
                "kernel produced {} result fields, expected {}",
                fields.len(),
                arity
            )));
        }
        Ok(fields)
    };

    let rows: Vec<Vec<f64>> = if parallel {
        lanes.par_iter().map(run).collect::<StatsResult<_>>()?
    } else {
        lanes.iter().map(run).collect::<StatsResult<_>>()?
    };

    let mut shape = x.shape()[..last].to_vec();
    shape.push(arity);
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Ok(ArrayD::from_shape_vec(IxDyn(&shape), flat)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array};

    #[test]
    fn test_resolve_axis() {
        assert_eq!(resolve_axis(1, 2).unwrap(), 1);
        assert_eq!(resolve_axis(-1, 3).unwrap(), 2);
        assert!(matches!(
            resolve_axis(2, 2),
            Err(StatsError::AxisOutOfBounds { axis: 2, ndim: 2 })
        ));
        assert!(resolve_axis(-3, 2).is_err());
    }

    #[test]
    fn test_broadcast_shapes() {
        let a: &[usize] = &[3, 1, 10];
        let b: &[usize] = &[1, 4, 7];
        assert_eq!(broadcast_shapes(&[a, b], Some(2)).unwrap(), vec![3, 4]);
        assert!(broadcast_shapes(&[a, b], None).is_err());

        let c: &[usize] = &[5];
        assert!(broadcast_shapes(&[a, c], Some(0)).is_err());
        let mixed: [&[usize]; 2] = [&[2, 5], &[5]];
        assert_eq!(broadcast_shapes(&mixed, Some(1)).unwrap(), vec![2]);
    }

    #[test]
    fn test_broadcast_shapes_zero_length() {
        let empty: [&[usize]; 1] = [&[0, 5]];
        assert_eq!(broadcast_shapes(&empty, Some(1)).unwrap(), vec![0]);
        assert_eq!(broadcast_shapes(&empty, Some(0)).unwrap(), vec![5]);

        let unit: [&[usize]; 2] = [&[0, 5], &[1, 3]];
        assert_eq!(broadcast_shapes(&unit, Some(1)).unwrap(), vec![0]);

        let clash: [&[usize]; 2] = [&[0, 5], &[2, 3]];
        assert!(broadcast_shapes(&clash, Some(1)).is_err());
    }

    #[test]
    fn test_split_points_and_slices() {
        let points = split_points(&[2, 3, 1]);
        assert_eq!(points, vec![2, 5, 6]);

        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let pieces = split_slice(&values, &points);
        assert_eq!(pieces[0], &[1.0, 2.0]);
        assert_eq!(pieces[1], &[3.0, 4.0, 5.0]);
        assert_eq!(pieces[2], &[6.0]);
    }

    #[test]
    fn test_broadcast_concatenate() {
        let x = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]].into_dyn();
        let y = pad_to_ndim(array![7.0, 8.0].into_dyn(), 2);
        assert_eq!(y.shape(), &[1, 2]);

        let joined = broadcast_concatenate(&[x, y], 1).unwrap();
        assert_eq!(joined.shape(), &[2, 5]);
        assert_eq!(
            joined,
            array![[1.0, 2.0, 3.0, 7.0, 8.0], [4.0, 5.0, 6.0, 7.0, 8.0]].into_dyn()
        );
    }

    #[test]
    fn test_move_axis_to_end() {
        let x = Array::from_shape_fn((2, 3, 4), |(i, j, k)| (i * 100 + j * 10 + k) as f64)
            .into_dyn();
        let moved = move_axis_to_end(x, 1);
        assert_eq!(moved.shape(), &[2, 4, 3]);
        assert_eq!(moved[[1, 2, 0]], 102.0);
    }

    #[test]
    fn test_apply_along_last_axis() {
        let x = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]].into_dyn();
        let sums = |lane: &[f64]| -> StatsResult<Vec<f64>> {
            Ok(vec![lane.iter().sum(), lane.len() as f64])
        };

        let seq = apply_along_last_axis(&x, 2, false, sums).unwrap();
        assert_eq!(seq, array![[6.0, 3.0], [15.0, 3.0]].into_dyn());

        let par = apply_along_last_axis(&x, 2, true, sums).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_apply_along_last_axis_propagates_errors() {
        let x = array![[1.0, 2.0], [3.0, 4.0]].into_dyn();
        let failing = |lane: &[f64]| -> StatsResult<Vec<f64>> {
            if lane[0] > 2.0 {
                Err(StatsError::InsufficientDataMsg("too few".into()))
            } else {
                Ok(vec![0.0])
            }
        };
        assert!(matches!(
            apply_along_last_axis(&x, 1, false, failing),
            Err(StatsError::InsufficientDataMsg(_))
        ));
    }
}
