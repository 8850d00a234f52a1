//! Degenerate-input guard for the broadcast path

use ndarray::{ArrayD, IxDyn};

use super::broadcast::broadcast_shapes;
use crate::errors::StatsResult;
use crate::kernel::ResultRecord;

/// Short-circuit when any sample is empty
///
/// Returns `None` if every sample has data. Otherwise returns a record whose
/// fields are independent NaN arrays shaped like the broadcast of every
/// sample's non-axis dimensions. Samples must share the same dimensionality.
pub fn check_empty_inputs<R: ResultRecord>(
    samples: &[ArrayD<f64>],
    axis: usize,
) -> StatsResult<Option<R::Batch>> {
    if samples.iter().all(|s| !s.is_empty()) {
        return Ok(None);
    }

    let shapes: Vec<&[usize]> = samples.iter().map(|s| s.shape()).collect();
    let output_shape = broadcast_shapes(&shapes, Some(axis))?;
    log::debug!("empty sample; returning NaN output of shape {output_shape:?}");

    let fields = (0..R::arity())
        .map(|_| ArrayD::from_elem(IxDyn(&output_shape), f64::NAN))
        .collect();
    Ok(Some(R::assemble(fields)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::StatPair;
    use ndarray::Array;

    #[test]
    fn test_no_shortcut_when_all_populated() {
        let x = Array::from_elem((2, 3), 1.0).into_dyn();
        let y = Array::from_elem((2, 4), 1.0).into_dyn();
        let out = check_empty_inputs::<StatPair>(&[x, y], 1).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_empty_rows() {
        let x = Array::<f64, _>::zeros((0, 5)).into_dyn();

        let out = check_empty_inputs::<StatPair>(&[x.clone()], 1).unwrap().unwrap();
        assert_eq!(out.statistic.shape(), &[0]);
        assert_eq!(out.pvalue.shape(), &[0]);

        let out = check_empty_inputs::<StatPair>(&[x], 0).unwrap().unwrap();
        assert_eq!(out.statistic.shape(), &[5]);
        assert!(out.statistic.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_empty_along_axis_broadcasts_other_samples() {
        let x = Array::<f64, _>::zeros((3, 0)).into_dyn();
        let y = Array::from_elem((1, 7), 2.0).into_dyn();
        let mut out = check_empty_inputs::<StatPair>(&[x, y], 1).unwrap().unwrap();
        assert_eq!(out.statistic.shape(), &[3]);

        // fields do not alias
        out.statistic[[0]] = 1.0;
        assert!(out.pvalue[[0]].is_nan());
    }
}
