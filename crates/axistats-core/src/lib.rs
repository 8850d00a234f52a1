//! axistats-core: Axis-aware, NaN-aware vectorization of hypothesis tests
//!
//! This crate turns statistical test kernels written for 1-D samples into
//! operations over N-D arrays, with a uniform `axis` option and a
//! `nan_policy` option (`propagate`, `omit`, `raise`).
//!
//! ```
//! use axistats_core::{call, CallArgs, TwoSampleTTest};
//! use ndarray::array;
//!
//! let a = array![[1.0, 2.0, 3.0, 4.0], [2.0, 2.5, 1.0, 7.0]];
//! let b = array![2.0, 4.0, 6.0, 8.0, 9.0];
//! let args = CallArgs::new().arg(a).arg(b).kwarg("axis", 1);
//! let result = call(&TwoSampleTTest, args).unwrap().into_batch().unwrap();
//! assert_eq!(result.pvalue.shape(), &[2]);
//! ```

pub mod dispatch;
pub mod errors;
pub mod kernel;
pub mod kernels;
pub mod types;

pub use dispatch::{call, vectorize, CallArgs, ParamMap, Value, Vectorized};
pub use errors::{StatsError, StatsResult};
pub use kernel::{Kernel, KernelDescriptor, ResultRecord, StatPair};
pub use kernels::{
    AnovaResult, JarqueBera, JarqueBeraResult, OneWayAnova, PairedTTest, PairedTTestResult,
    TTestOptions, TwoSampleTTest,
};
pub use types::*;
