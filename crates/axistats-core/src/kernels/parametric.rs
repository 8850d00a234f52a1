//! Parametric tests
//!
//! - Two-sample t-test (Welch, Student)
//! - Paired t-test
//! - One-way ANOVA

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Zip};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use super::{mean, t_pvalue, variance};
use crate::dispatch::broadcast::broadcast_shapes;
use crate::dispatch::ParamMap;
use crate::errors::{StatsError, StatsResult};
use crate::kernel::{exact_fields, Kernel, KernelDescriptor, ResultRecord, StatPair};
use crate::types::{Alternative, AxisSpec, SampleCount};

/// Options for the t-tests
#[derive(Debug, Clone)]
pub struct TTestOptions {
    /// Assume equal population variances (Student) instead of Welch
    pub equal_var: bool,
    /// Alternative hypothesis
    pub alternative: Alternative,
}

impl Default for TTestOptions {
    fn default() -> Self {
        Self {
            equal_var: false,
            alternative: Alternative::TwoSided,
        }
    }
}

fn two_samples<'a, T>(name: &str, samples: &'a [T]) -> StatsResult<(&'a T, &'a T)> {
    match samples {
        [a, b] => Ok((a, b)),
        _ => Err(StatsError::InvalidInput(format!(
            "{name} expects 2 samples, got {}",
            samples.len()
        ))),
    }
}

/// t statistic and degrees of freedom from summary statistics
fn t_statistic(
    m1: f64,
    v1: f64,
    n1: usize,
    m2: f64,
    v2: f64,
    n2: usize,
    equal_var: bool,
) -> (f64, f64) {
    let (n1, n2) = (n1 as f64, n2 as f64);
    if equal_var {
        let df = n1 + n2 - 2.0;
        let pooled = ((n1 - 1.0) * v1 + (n2 - 1.0) * v2) / df;
        let se = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
        ((m1 - m2) / se, df)
    } else {
        let a = v1 / n1;
        let b = v2 / n2;
        let df = (a + b).powi(2) / (a * a / (n1 - 1.0) + b * b / (n2 - 1.0));
        // 0/0 when both variances vanish; the p-value then follows the sign of t
        let df = if df.is_nan() { 1.0 } else { df };
        ((m1 - m2) / (a + b).sqrt(), df)
    }
}

/// Two-sample t-test for independent samples
///
/// Welch's test by default; Student's test when `equal_var` is set.
/// Supports native evaluation along an axis of N-D input.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoSampleTTest;

impl TwoSampleTTest {
    const DESCRIPTOR: KernelDescriptor = KernelDescriptor {
        name: "ttest_ind",
        params: &["a", "b", "equal_var", "alternative"],
        samples: SampleCount::Fixed(2),
        paired: false,
        too_small: 1,
        default_axis: AxisSpec::Index(0),
        supports_native_axis: true,
    };

    fn check_sizes(n1: usize, n2: usize) -> StatsResult<()> {
        if n1 < 2 || n2 < 2 {
            return Err(StatsError::InsufficientDataMsg(format!(
                "t-test requires at least 2 observations per sample (got {n1} and {n2})"
            )));
        }
        Ok(())
    }
}

impl Kernel for TwoSampleTTest {
    type Options = TTestOptions;
    type Output = StatPair;

    fn descriptor(&self) -> &KernelDescriptor {
        &Self::DESCRIPTOR
    }

    fn configure(&self, mut params: ParamMap) -> StatsResult<TTestOptions> {
        let defaults = TTestOptions::default();
        let options = TTestOptions {
            equal_var: params.take_bool("equal_var")?.unwrap_or(defaults.equal_var),
            alternative: params
                .take_parsed("alternative")?
                .unwrap_or(defaults.alternative),
        };
        params.finish()?;
        Ok(options)
    }

    fn compute(&self, samples: &[&[f64]], options: &TTestOptions) -> StatsResult<StatPair> {
        let (a, b) = two_samples(Self::DESCRIPTOR.name, samples)?;
        Self::check_sizes(a.len(), b.len())?;

        let (m1, m2) = (mean(a), mean(b));
        let (v1, v2) = (variance(a, m1), variance(b, m2));
        if v1 == 0.0 && v2 == 0.0 {
            log::warn!("ttest_ind: both samples have zero variance; statistic is not finite");
        }

        let (t, df) = t_statistic(m1, v1, a.len(), m2, v2, b.len(), options.equal_var);
        Ok(StatPair {
            statistic: t,
            pvalue: t_pvalue(t, df, options.alternative),
        })
    }

    fn compute_along_axis(
        &self,
        samples: &[ArrayViewD<'_, f64>],
        axis: usize,
        options: &TTestOptions,
    ) -> StatsResult<StatPair<ArrayD<f64>>> {
        let (a, b) = two_samples(Self::DESCRIPTOR.name, samples)?;
        let (n1, n2) = (a.len_of(Axis(axis)), b.len_of(Axis(axis)));
        Self::check_sizes(n1, n2)?;

        let empty = || StatsError::InsufficientDataMsg("t-test requires non-empty samples".into());
        let m1 = a.mean_axis(Axis(axis)).ok_or_else(empty)?;
        let m2 = b.mean_axis(Axis(axis)).ok_or_else(empty)?;
        let v1 = a.var_axis(Axis(axis), 1.0);
        let v2 = b.var_axis(Axis(axis), 1.0);

        let shape = broadcast_shapes(&[m1.shape(), m2.shape()], None)?;
        let incompatible =
            || StatsError::IncompatibleShapes(format!("{:?}", [a.shape(), b.shape()]));
        let m1 = m1.broadcast(IxDyn(&shape)).ok_or_else(incompatible)?;
        let v1 = v1.broadcast(IxDyn(&shape)).ok_or_else(incompatible)?;
        let m2 = m2.broadcast(IxDyn(&shape)).ok_or_else(incompatible)?;
        let v2 = v2.broadcast(IxDyn(&shape)).ok_or_else(incompatible)?;

        if v1.iter().zip(v2.iter()).any(|(&v1, &v2)| v1 == 0.0 && v2 == 0.0) {
            log::warn!("ttest_ind: some slices have zero variance in both samples");
        }

        let stats = Zip::from(&m1)
            .and(&v1)
            .and(&m2)
            .and(&v2)
            .map_collect(|&m1, &v1, &m2, &v2| {
                t_statistic(m1, v1, n1, m2, v2, n2, options.equal_var)
            });

        Ok(StatPair {
            statistic: stats.mapv(|(t, _)| t),
            pvalue: stats.mapv(|(t, df)| t_pvalue(t, df, options.alternative)),
        })
    }
}

/// Result of the paired t-test
#[derive(Debug, Clone, PartialEq)]
pub struct PairedTTestResult<T = f64> {
    /// t statistic
    pub statistic: T,
    /// p-value
    pub pvalue: T,
    /// Mean of the paired differences `a - b`
    pub mean_difference: T,
}

impl ResultRecord for PairedTTestResult<f64> {
    type Batch = PairedTTestResult<ArrayD<f64>>;

    const FIELDS: &'static [&'static str] = &["statistic", "pvalue", "mean_difference"];

    fn from_fields(fields: &[f64]) -> Self {
        Self {
            statistic: fields[0],
            pvalue: fields[1],
            mean_difference: fields[2],
        }
    }

    fn unpack(&self) -> Vec<f64> {
        vec![self.statistic, self.pvalue, self.mean_difference]
    }

    fn assemble(fields: Vec<ArrayD<f64>>) -> StatsResult<Self::Batch> {
        let [statistic, pvalue, mean_difference] = exact_fields::<3>(fields)?;
        Ok(PairedTTestResult {
            statistic,
            pvalue,
            mean_difference,
        })
    }
}

/// Paired t-test on the differences of two related samples
#[derive(Debug, Clone, Copy, Default)]
pub struct PairedTTest;

impl PairedTTest {
    const DESCRIPTOR: KernelDescriptor = KernelDescriptor {
        name: "ttest_rel",
        params: &["a", "b", "alternative"],
        samples: SampleCount::Fixed(2),
        paired: true,
        too_small: 1,
        default_axis: AxisSpec::Index(0),
        supports_native_axis: false,
    };
}

impl Kernel for PairedTTest {
    type Options = Alternative;
    type Output = PairedTTestResult;

    fn descriptor(&self) -> &KernelDescriptor {
        &Self::DESCRIPTOR
    }

    fn configure(&self, mut params: ParamMap) -> StatsResult<Alternative> {
        let alternative = params.take_parsed("alternative")?.unwrap_or_default();
        params.finish()?;
        Ok(alternative)
    }

    fn compute(
        &self,
        samples: &[&[f64]],
        alternative: &Alternative,
    ) -> StatsResult<PairedTTestResult> {
        let (a, b) = two_samples(Self::DESCRIPTOR.name, samples)?;
        if a.len() != b.len() {
            return Err(StatsError::DimensionMismatchMsg(format!(
                "paired t-test requires equal length samples ({} != {})",
                a.len(),
                b.len()
            )));
        }
        if a.len() < 2 {
            return Err(StatsError::InsufficientDataMsg(
                "paired t-test requires at least 2 pairs".into(),
            ));
        }

        let diffs: Vec<f64> = a.iter().zip(b.iter()).map(|(x, y)| x - y).collect();
        let n = diffs.len() as f64;
        let d_mean = mean(&diffs);
        let d_var = variance(&diffs, d_mean);
        if d_var == 0.0 {
            log::warn!("ttest_rel: differences have zero variance; statistic is not finite");
        }

        let t = d_mean / (d_var / n).sqrt();
        Ok(PairedTTestResult {
            statistic: t,
            pvalue: t_pvalue(t, n - 1.0, *alternative),
            mean_difference: d_mean,
        })
    }
}

/// Result of one-way ANOVA
#[derive(Debug, Clone, PartialEq)]
pub struct AnovaResult<T = f64> {
    /// F statistic
    pub statistic: T,
    /// p-value
    pub pvalue: T,
    /// Between-groups degrees of freedom
    pub df_between: T,
    /// Within-groups degrees of freedom
    pub df_within: T,
}

impl ResultRecord for AnovaResult<f64> {
    type Batch = AnovaResult<ArrayD<f64>>;

    const FIELDS: &'static [&'static str] = &["statistic", "pvalue", "df_between", "df_within"];

    fn from_fields(fields: &[f64]) -> Self {
        Self {
            statistic: fields[0],
            pvalue: fields[1],
            df_between: fields[2],
            df_within: fields[3],
        }
    }

    fn unpack(&self) -> Vec<f64> {
        vec![self.statistic, self.pvalue, self.df_between, self.df_within]
    }

    fn assemble(fields: Vec<ArrayD<f64>>) -> StatsResult<Self::Batch> {
        let [statistic, pvalue, df_between, df_within] = exact_fields::<4>(fields)?;
        Ok(AnovaResult {
            statistic,
            pvalue,
            df_between,
            df_within,
        })
    }
}

/// One-way ANOVA over any number of groups
#[derive(Debug, Clone, Copy, Default)]
pub struct OneWayAnova;

impl OneWayAnova {
    const DESCRIPTOR: KernelDescriptor = KernelDescriptor {
        name: "f_oneway",
        params: &["samples"],
        samples: SampleCount::Unbounded,
        paired: false,
        too_small: 0,
        default_axis: AxisSpec::Index(0),
        supports_native_axis: false,
    };
}

impl Kernel for OneWayAnova {
    type Options = ();
    type Output = AnovaResult;

    fn descriptor(&self) -> &KernelDescriptor {
        &Self::DESCRIPTOR
    }

    fn configure(&self, params: ParamMap) -> StatsResult<()> {
        params.finish()
    }

    fn compute(&self, groups: &[&[f64]], _options: &()) -> StatsResult<AnovaResult> {
        if groups.len() < 2 {
            return Err(StatsError::InsufficientDataMsg(
                "ANOVA requires at least 2 groups".into(),
            ));
        }
        if let Some(i) = groups.iter().position(|g| g.is_empty()) {
            return Err(StatsError::InsufficientDataMsg(format!(
                "ANOVA requires at least 1 observation per group (group {i} is empty)"
            )));
        }

        let k = groups.len();
        let n: usize = groups.iter().map(|g| g.len()).sum();
        if n <= k {
            return Err(StatsError::InsufficientDataMsg(format!(
                "ANOVA requires more observations than groups ({n} <= {k})"
            )));
        }

        let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n as f64;
        let mut ss_between = 0.0;
        let mut ss_within = 0.0;
        for g in groups {
            let m = mean(g);
            ss_between += g.len() as f64 * (m - grand_mean).powi(2);
            ss_within += g.iter().map(|&x| (x - m).powi(2)).sum::<f64>();
        }

        let df_between = (k - 1) as f64;
        let df_within = (n - k) as f64;
        if ss_within == 0.0 {
            log::warn!("f_oneway: all groups are constant; F statistic is not finite");
        }

        let f = (ss_between / df_between) / (ss_within / df_within);
        let pvalue = if f.is_nan() {
            f64::NAN
        } else if f.is_infinite() {
            0.0
        } else {
            FisherSnedecor::new(df_between, df_within)
                .map_err(|e| StatsError::Distribution(e.to_string()))?
                .sf(f)
        };

        Ok(AnovaResult {
            statistic: f,
            pvalue,
            df_between,
            df_within,
        })
    }
}
