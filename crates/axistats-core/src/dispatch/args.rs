//! Argument normalization
//!
//! Merges positional and keyword arguments against a kernel's declared
//! parameter list, extracting the samples, `axis`, and `nan_policy`.

use std::collections::BTreeMap;
use std::str::FromStr;

use ndarray::{Array1, Array2, ArrayD, IxDyn};

use crate::errors::{StatsError, StatsResult};
use crate::kernel::KernelDescriptor;
use crate::types::{Alternative, AxisSpec, NanPolicy, SampleCount};

/// A dynamically-typed call argument
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Array(ArrayD<f64>),
    Float(f64),
    Int(i64),
    Bool(bool),
    Text(String),
    None,
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Array(_) => "array",
            Value::Float(_) => "float",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Text(_) => "str",
            Value::None => "None",
        }
    }

    /// Promote to an array with at least one dimension
    pub fn into_sample(self, name: &str) -> StatsResult<ArrayD<f64>> {
        match self {
            Value::Array(a) if a.ndim() == 0 => Ok(a.into_shape_with_order(IxDyn(&[1]))?),
            Value::Array(a) => Ok(a),
            Value::Float(v) => Ok(ArrayD::from_elem(IxDyn(&[1]), v)),
            Value::Int(v) => Ok(ArrayD::from_elem(IxDyn(&[1]), v as f64)),
            other => Err(StatsError::InvalidValue {
                name: name.to_string(),
                reason: format!("expected numeric sample, got {}", other.kind()),
            }),
        }
    }
}

impl From<ArrayD<f64>> for Value {
    fn from(a: ArrayD<f64>) -> Self {
        Value::Array(a)
    }
}

impl From<Array1<f64>> for Value {
    fn from(a: Array1<f64>) -> Self {
        Value::Array(a.into_dyn())
    }
}

impl From<Array2<f64>> for Value {
    fn from(a: Array2<f64>) -> Self {
        Value::Array(a.into_dyn())
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Array(Array1::from(v).into_dyn())
    }
}

impl From<&[f64]> for Value {
    fn from(v: &[f64]) -> Self {
        Value::Array(Array1::from(v.to_vec()).into_dyn())
    }
}

impl From<Vec<i64>> for Value {
    fn from(v: Vec<i64>) -> Self {
        Value::Array(Array1::from_iter(v.into_iter().map(|x| x as f64)).into_dyn())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<AxisSpec> for Value {
    fn from(axis: AxisSpec) -> Self {
        match axis {
            AxisSpec::Index(i) => Value::Int(i as i64),
            AxisSpec::Flatten => Value::None,
        }
    }
}

impl From<NanPolicy> for Value {
    fn from(policy: NanPolicy) -> Self {
        Value::Text(policy.as_str().to_string())
    }
}

impl From<Alternative> for Value {
    fn from(alternative: Alternative) -> Self {
        Value::Text(alternative.as_str().to_string())
    }
}

/// Positional and keyword arguments of one call
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub keywords: Vec<(String, Value)>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.keywords.push((name.to_string(), value.into()));
        self
    }
}

/// Kernel-specific keyword parameters left after normalization
#[derive(Debug, Clone, Default)]
pub struct ParamMap {
    function: &'static str,
    values: BTreeMap<String, Value>,
}

impl ParamMap {
    pub fn new(function: &'static str) -> Self {
        Self {
            function,
            values: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn take_bool(&mut self, name: &str) -> StatsResult<Option<bool>> {
        match self.take(name) {
            None | Some(Value::None) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(b)),
            Some(other) => Err(type_error(name, "bool", &other)),
        }
    }

    pub fn take_f64(&mut self, name: &str) -> StatsResult<Option<f64>> {
        match self.take(name) {
            None | Some(Value::None) => Ok(None),
            Some(Value::Float(v)) => Ok(Some(v)),
            Some(Value::Int(v)) => Ok(Some(v as f64)),
            Some(other) => Err(type_error(name, "float", &other)),
        }
    }

    /// Take a string parameter and parse it
    pub fn take_parsed<T>(&mut self, name: &str) -> StatsResult<Option<T>>
    where
        T: FromStr<Err = StatsError>,
    {
        match self.take(name) {
            None | Some(Value::None) => Ok(None),
            Some(Value::Text(s)) => s.parse().map(Some),
            Some(other) => Err(type_error(name, "str", &other)),
        }
    }

    /// Reject any parameter the kernel did not consume
    pub fn finish(self) -> StatsResult<()> {
        match self.values.into_keys().next() {
            None => Ok(()),
            Some(argument) => Err(StatsError::UnexpectedArgument {
                function: self.function,
                argument,
            }),
        }
    }
}

fn type_error(name: &str, expected: &str, got: &Value) -> StatsError {
    StatsError::InvalidValue {
        name: name.to_string(),
        reason: format!("expected {expected}, got {}", got.kind()),
    }
}

/// Output of [`normalize`]
#[derive(Debug, Clone)]
pub struct NormalizedCall {
    /// Samples in declared order, each at least 1-D
    pub samples: Vec<ArrayD<f64>>,
    pub axis: AxisSpec,
    pub nan_policy: NanPolicy,
    /// Remaining kernel-specific keyword parameters
    pub params: ParamMap,
}

/// Declared parameter names for a call with `n_positional` positional arguments
fn parameter_names(desc: &KernelDescriptor, n_positional: usize) -> Vec<String> {
    match desc.samples {
        SampleCount::Fixed(_) => desc.params.iter().map(|p| p.to_string()).collect(),
        SampleCount::Unbounded => (0..n_positional)
            .map(|i| format!("arg{i}"))
            .chain(desc.params.iter().skip(1).map(|p| p.to_string()))
            .collect(),
    }
}

fn parse_axis(value: Value) -> StatsResult<AxisSpec> {
    match value {
        Value::None => Ok(AxisSpec::Flatten),
        Value::Int(i) => Ok(AxisSpec::Index(i as isize)),
        Value::Float(f) if f.fract() == 0.0 => Ok(AxisSpec::Index(f as isize)),
        Value::Text(s) if s == "none" => Ok(AxisSpec::Flatten),
        other => Err(type_error("axis", "int or None", &other)),
    }
}

fn parse_nan_policy(value: Value) -> StatsResult<NanPolicy> {
    match value {
        Value::Text(s) => s.parse(),
        other => Err(type_error("nan_policy", "str", &other)),
    }
}

/// Bind a call's arguments to a kernel's declared parameters
pub fn normalize(desc: &KernelDescriptor, args: CallArgs) -> StatsResult<NormalizedCall> {
    let CallArgs {
        positional,
        keywords,
    } = args;

    if let SampleCount::Fixed(n) = desc.samples {
        if desc.params.len() < n {
            return Err(StatsError::InvalidInput(format!(
                "{} declares {} samples but only {} parameter names",
                desc.name,
                n,
                desc.params.len()
            )));
        }
    }

    let params = parameter_names(desc, positional.len());
    if positional.len() > params.len() {
        return Err(StatsError::TooManyPositional {
            function: desc.name,
            expected: params.len(),
            given: positional.len(),
        });
    }
    let n_samples = match desc.samples {
        SampleCount::Fixed(n) => n,
        SampleCount::Unbounded => positional.len(),
    };

    let mut merged: BTreeMap<String, Value> = BTreeMap::new();
    for (name, value) in keywords {
        if merged.contains_key(&name) {
            return Err(StatsError::ArgumentConflict {
                function: desc.name,
                argument: name,
            });
        }
        merged.insert(name, value);
    }
    for (name, value) in params.iter().zip(positional) {
        if merged.contains_key(name) {
            return Err(StatsError::ArgumentConflict {
                function: desc.name,
                argument: name.clone(),
            });
        }
        merged.insert(name.clone(), value);
    }

    let mut samples = Vec::with_capacity(n_samples);
    for name in &params[..n_samples] {
        let value = merged
            .remove(name)
            .ok_or_else(|| StatsError::MissingArgument {
                function: desc.name,
                argument: name.clone(),
            })?;
        samples.push(value.into_sample(name)?);
    }

    let axis = match merged.remove("axis") {
        Some(value) => parse_axis(value)?,
        None => desc.default_axis,
    };
    let nan_policy = match merged.remove("nan_policy") {
        Some(value) => parse_nan_policy(value)?,
        None => NanPolicy::default(),
    };

    let mut rest = ParamMap::new(desc.name);
    for (name, value) in merged {
        if !params[n_samples..].contains(&name) {
            return Err(StatsError::UnexpectedArgument {
                function: desc.name,
                argument: name,
            });
        }
        rest.values.insert(name, value);
    }

    Ok(NormalizedCall {
        samples,
        axis,
        nan_policy,
        params: rest,
    })
}
