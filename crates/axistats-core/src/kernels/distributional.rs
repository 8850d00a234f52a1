//! Jarque-Bera test for normality
//!
//! Checks whether a sample's skewness and excess kurtosis match those of a
//! normal distribution.

use ndarray::ArrayD;
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::dispatch::ParamMap;
use crate::errors::{StatsError, StatsResult};
use crate::kernel::{exact_fields, Kernel, KernelDescriptor, ResultRecord};
use crate::types::{AxisSpec, SampleCount};

/// Result of Jarque-Bera test
#[derive(Debug, Clone, PartialEq)]
pub struct JarqueBeraResult<T = f64> {
    /// JB test statistic
    pub statistic: T,
    /// p-value for the test
    pub pvalue: T,
    /// Sample skewness
    pub skewness: T,
    /// Sample kurtosis (excess)
    pub kurtosis: T,
}

impl ResultRecord for JarqueBeraResult<f64> {
    type Batch = JarqueBeraResult<ArrayD<f64>>;

    const FIELDS: &'static [&'static str] = &["statistic", "pvalue", "skewness", "kurtosis"];

    fn from_fields(fields: &[f64]) -> Self {
        Self {
            statistic: fields[0],
            pvalue: fields[1],
            skewness: fields[2],
            kurtosis: fields[3],
        }
    }

    fn unpack(&self) -> Vec<f64> {
        vec![self.statistic, self.pvalue, self.skewness, self.kurtosis]
    }

    fn assemble(fields: Vec<ArrayD<f64>>) -> StatsResult<Self::Batch> {
        let [statistic, pvalue, skewness, kurtosis] = exact_fields::<4>(fields)?;
        Ok(JarqueBeraResult {
            statistic,
            pvalue,
            skewness,
            kurtosis,
        })
    }
}

/// Jarque-Bera normality test on a single sample
#[derive(Debug, Clone, Copy, Default)]
pub struct JarqueBera;

impl JarqueBera {
    const DESCRIPTOR: KernelDescriptor = KernelDescriptor {
        name: "jarque_bera",
        params: &["x"],
        samples: SampleCount::Fixed(1),
        paired: false,
        too_small: 2,
        default_axis: AxisSpec::Index(0),
        supports_native_axis: false,
    };
}

impl Kernel for JarqueBera {
    type Options = ();
    type Output = JarqueBeraResult;

    fn descriptor(&self) -> &KernelDescriptor {
        &Self::DESCRIPTOR
    }

    fn configure(&self, params: ParamMap) -> StatsResult<()> {
        params.finish()
    }

    /// # Arguments
    /// * `samples` - A single sample (typically residuals)
    ///
    /// # Returns
    /// JarqueBeraResult with test statistic, p-value, skewness, and kurtosis
    fn compute(&self, samples: &[&[f64]], _options: &()) -> StatsResult<JarqueBeraResult> {
        let data = match samples {
            [data] => *data,
            _ => {
                return Err(StatsError::InvalidInput(format!(
                    "jarque_bera expects 1 sample, got {}",
                    samples.len()
                )))
            }
        };
        let n = data.len();

        if n < 3 {
            return Err(StatsError::InsufficientDataMsg(
                "Jarque-Bera test requires at least 3 observations".into(),
            ));
        }

        let mean: f64 = data.iter().sum::<f64>() / n as f64;

        // Central moments
        let mut m2 = 0.0;
        let mut m3 = 0.0;
        let mut m4 = 0.0;

        for &x in data {
            let d = x - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }

        m2 /= n as f64;
        m3 /= n as f64;
        m4 /= n as f64;

        if m2 <= 0.0 {
            return Err(StatsError::InvalidInput("Data has zero variance".into()));
        }

        let std_dev = m2.sqrt();
        let skewness = m3 / (std_dev * std_dev * std_dev);
        let kurtosis = m4 / (m2 * m2) - 3.0;

        // JB = n/6 * (S^2 + K^2/4)
        let statistic = (n as f64 / 6.0) * (skewness * skewness + kurtosis * kurtosis / 4.0);

        let pvalue = if statistic.is_nan() {
            f64::NAN
        } else {
            ChiSquared::new(2.0)
                .map_err(|e| StatsError::Distribution(e.to_string()))?
                .sf(statistic)
        };

        Ok(JarqueBeraResult {
            statistic,
            pvalue,
            skewness,
            kurtosis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn jarque_bera(data: &[f64]) -> StatsResult<JarqueBeraResult> {
        JarqueBera.compute(&[data], &())
    }

    #[test]
    fn test_jarque_bera_normal() {
        let data: Vec<f64> = vec![
            -1.0, -0.5, 0.0, 0.5, 1.0, -0.8, -0.3, 0.2, 0.7, 1.2, -1.2, -0.7, -0.2, 0.3, 0.8, -0.9,
            -0.4, 0.1, 0.6, 1.1,
        ];

        let result = jarque_bera(&data).unwrap();
        assert!(result.statistic >= 0.0);
        assert!(result.pvalue > 0.05 && result.pvalue <= 1.0);
    }

    #[test]
    fn test_jarque_bera_skewed() {
        let data: Vec<f64> = vec![
            1.0, 1.1, 1.2, 1.3, 1.4, 1.5, 1.6, 1.7, 1.8, 1.9, 2.0, 2.5, 3.0, 4.0, 5.0, 10.0, 20.0,
            50.0,
        ];

        let result = jarque_bera(&data).unwrap();
        assert!(result.skewness > 1.0);
        assert!(result.pvalue < 0.01);
    }

    #[test]
    fn test_jarque_bera_chi_squared_tail() {
        // chi-squared(2) survival is exp(-x/2)
        let data = [1.0, 2.0, 3.0, 10.0];
        let result = jarque_bera(&data).unwrap();
        assert_relative_eq!(result.pvalue, (-result.statistic / 2.0).exp(), epsilon = 1e-10);
    }

    #[test]
    fn test_jarque_bera_insufficient_data() {
        assert!(matches!(
            jarque_bera(&[1.0, 2.0]),
            Err(StatsError::InsufficientDataMsg(_))
        ));
    }

    #[test]
    fn test_jarque_bera_zero_variance() {
        assert!(matches!(
            jarque_bera(&[4.0, 4.0, 4.0, 4.0]),
            Err(StatsError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_jarque_bera_nan_propagates() {
        let result = jarque_bera(&[1.0, f64::NAN, 2.0, 3.0]).unwrap();
        assert!(result.statistic.is_nan());
        assert!(result.pvalue.is_nan());
    }
}
