//! Reference hypothesis-test kernels
//!
//! Each kernel implements [`crate::Kernel`] and can be vectorized with
//! [`crate::dispatch::vectorize`] or called dynamically with
//! [`crate::dispatch::call`]. Kernels never filter NaN themselves; the
//! dispatch layer owns missing-data handling.

pub mod distributional;
pub mod parametric;

pub use distributional::{JarqueBera, JarqueBeraResult};
pub use parametric::{
    AnovaResult, OneWayAnova, PairedTTest, PairedTTestResult, TTestOptions, TwoSampleTTest,
};

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::types::Alternative;

/// Arithmetic mean (no NaN handling)
pub(crate) fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample variance with ddof = 1
pub(crate) fn variance(data: &[f64], mean: f64) -> f64 {
    let n = data.len();
    if n < 2 {
        return f64::NAN;
    }
    let ss: f64 = data.iter().map(|&x| (x - mean) * (x - mean)).sum();
    ss / (n - 1) as f64
}

/// p-value of a t statistic under the given alternative
///
/// NaN statistics or invalid degrees of freedom give a NaN p-value.
pub(crate) fn t_pvalue(t: f64, df: f64, alternative: Alternative) -> f64 {
    if t.is_nan() || df.is_nan() || df <= 0.0 {
        return f64::NAN;
    }
    let dist = match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => dist,
        Err(_) => return f64::NAN,
    };
    match alternative {
        Alternative::TwoSided => (2.0 * dist.sf(t.abs())).min(1.0),
        Alternative::Less => dist.cdf(t),
        Alternative::Greater => dist.sf(t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_variance() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        let m = mean(&data);
        assert_relative_eq!(m, 3.0);
        assert_relative_eq!(variance(&data, m), 2.5);
        assert!(variance(&[1.0], 1.0).is_nan());
    }

    #[test]
    fn test_t_pvalue() {
        // t = 0 splits the distribution in half
        assert_relative_eq!(t_pvalue(0.0, 10.0, Alternative::TwoSided), 1.0, epsilon = 1e-12);
        assert_relative_eq!(t_pvalue(0.0, 10.0, Alternative::Less), 0.5, epsilon = 1e-12);

        let less = t_pvalue(-2.0, 8.0, Alternative::Less);
        let greater = t_pvalue(-2.0, 8.0, Alternative::Greater);
        assert_relative_eq!(less + greater, 1.0, epsilon = 1e-12);
        let two_sided = t_pvalue(-2.0, 8.0, Alternative::TwoSided);
        assert_relative_eq!(two_sided, 2.0 * less, epsilon = 1e-12);

        assert!(t_pvalue(f64::NAN, 8.0, Alternative::TwoSided).is_nan());
        assert!(t_pvalue(1.0, f64::NAN, Alternative::TwoSided).is_nan());
    }
}
