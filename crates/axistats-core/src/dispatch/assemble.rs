//! Result assembly

use ndarray::{ArrayD, Axis};

use crate::errors::StatsResult;
use crate::kernel::ResultRecord;

/// Result of a vectorized call
#[derive(Debug, Clone, PartialEq)]
pub enum Vectorized<R: ResultRecord> {
    /// The kernel ran once on 1-D samples
    Scalar(R),
    /// One result per axis-slice, one array per field
    Batch(R::Batch),
}

impl<R: ResultRecord> Vectorized<R> {
    pub fn is_batch(&self) -> bool {
        matches!(self, Vectorized::Batch(_))
    }

    pub fn into_scalar(self) -> Option<R> {
        match self {
            Vectorized::Scalar(r) => Some(r),
            Vectorized::Batch(_) => None,
        }
    }

    pub fn into_batch(self) -> Option<R::Batch> {
        match self {
            Vectorized::Scalar(_) => None,
            Vectorized::Batch(b) => Some(b),
        }
    }
}

/// Split the trailing result-field dimension into one array per field
pub fn unpack_trailing(res: &ArrayD<f64>) -> Vec<ArrayD<f64>> {
    let last = Axis(res.ndim() - 1);
    (0..res.len_of(last))
        .map(|k| res.index_axis(last, k).to_owned())
        .collect()
}

/// Build the array-valued record from per-slice results stacked on the last axis
pub fn assemble_batch<R: ResultRecord>(res: &ArrayD<f64>) -> StatsResult<R::Batch> {
    R::assemble(unpack_trailing(res))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::StatPair;
    use ndarray::array;

    #[test]
    fn test_unpack_trailing() {
        let res = array![[[1.0, 0.1], [2.0, 0.2]], [[3.0, 0.3], [4.0, 0.4]]].into_dyn();
        let fields = unpack_trailing(&res);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], array![[1.0, 2.0], [3.0, 4.0]].into_dyn());
        assert_eq!(fields[1], array![[0.1, 0.2], [0.3, 0.4]].into_dyn());
    }

    #[test]
    fn test_assemble_batch() {
        let res = array![[5.0, 0.5], [6.0, 0.6], [7.0, 0.7]].into_dyn();
        let batch = assemble_batch::<StatPair>(&res).unwrap();
        assert_eq!(batch.statistic, array![5.0, 6.0, 7.0].into_dyn());
        assert_eq!(batch.pvalue, array![0.5, 0.6, 0.7].into_dyn());
    }

    #[test]
    fn test_vectorized_accessors() {
        let v: Vectorized<StatPair> = Vectorized::Scalar(StatPair {
            statistic: 1.0,
            pvalue: 0.5,
        });
        assert!(!v.is_batch());
        assert_eq!(v.clone().into_scalar().unwrap().pvalue, 0.5);
        assert!(v.into_batch().is_none());
    }
}
