//! Core types for in-memory datasets.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{DatasetError, Result};

/// Name of the time dimension and coordinate.
pub const TIME_DIM: &str = "time";

/// Name of the depth dimension and coordinate.
pub const DEPTH_DIM: &str = "depth";

/// Attribute keys whose values mark missing data.
const MISSING_VALUE_ATTRS: &[&str] = &["_FillValue", "missing_value"];

/// Description of an array in a store, before any data is read.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    /// Variable name (array path without the leading slash).
    pub name: String,
    /// Dimension names, one per axis.
    pub dims: Vec<String>,
    /// Array shape.
    pub shape: Vec<u64>,
    /// User attributes (`units`, `_FillValue`, ...).
    pub attributes: Map<String, Value>,
    /// Store-level fill value, when the format defines one.
    pub fill_value: Option<f64>,
}

impl VariableInfo {
    /// Axis index of a named dimension.
    pub fn axis_of(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    /// Total number of elements.
    pub fn num_elements(&self) -> u64 {
        self.shape.iter().product()
    }

    /// String attribute lookup.
    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.as_str())
    }

    /// Sentinel values that should be read as missing.
    ///
    /// NaN sentinels are skipped since NaN already means missing.
    pub fn missing_values(&self) -> Vec<f64> {
        let mut values: Vec<f64> = MISSING_VALUE_ATTRS
            .iter()
            .filter_map(|key| self.attributes.get(*key))
            .flat_map(|v| match v {
                Value::Array(items) => items.iter().filter_map(Value::as_f64).collect(),
                other => other.as_f64().into_iter().collect::<Vec<_>>(),
            })
            .collect();
        values.extend(self.fill_value);
        values.retain(|v| !v.is_nan());
        values
    }
}

/// A narrowed variable held in memory.
///
/// Values are row-major over `shape`, with missing data as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub dims: Vec<String>,
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
    pub attributes: Map<String, Value>,
}

impl Variable {
    /// Create a variable, checking that the values fill the shape.
    pub fn new(dims: Vec<String>, shape: Vec<usize>, values: Vec<f64>) -> Result<Self> {
        if dims.len() != shape.len() {
            return Err(DatasetError::invalid_metadata(format!(
                "{} dimension names for {} axes",
                dims.len(),
                shape.len()
            )));
        }
        let expected: usize = shape.iter().product();
        if values.len() != expected {
            return Err(DatasetError::invalid_metadata(format!(
                "shape {:?} needs {} values, got {}",
                shape,
                expected,
                values.len()
            )));
        }
        Ok(Self {
            dims,
            shape,
            values,
            attributes: Map::new(),
        })
    }

    /// A zero-dimensional variable.
    pub fn scalar(value: f64) -> Self {
        Self {
            dims: Vec::new(),
            shape: Vec::new(),
            values: vec![value],
            attributes: Map::new(),
        }
    }

    /// A one-dimensional variable along `dim`.
    pub fn along(dim: &str, values: Vec<f64>) -> Self {
        Self {
            dims: vec![dim.to_string()],
            shape: vec![values.len()],
            values,
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: &str, value: Value) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }

    /// Length of a named dimension, if the variable has it.
    pub fn dim_len(&self, dim: &str) -> Option<usize> {
        self.dims
            .iter()
            .position(|d| d == dim)
            .map(|axis| self.shape[axis])
    }

    /// Value at a (time, depth) position, broadcasting missing axes.
    ///
    /// Axes other than `time` and `depth` must have length 1. Returns NaN
    /// when the position cannot be resolved.
    pub fn at(&self, time_idx: usize, depth_idx: usize) -> f64 {
        let mut flat = 0usize;
        for (dim, &len) in self.dims.iter().zip(&self.shape) {
            let i = match dim.as_str() {
                TIME_DIM => time_idx,
                DEPTH_DIM => depth_idx,
                _ if len == 1 => 0,
                _ => return f64::NAN,
            };
            if i >= len {
                return f64::NAN;
            }
            flat = flat * len + i;
        }
        self.values.get(flat).copied().unwrap_or(f64::NAN)
    }
}

/// A dataset narrowed to a time window and a variable subset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    /// Decoded time coordinate, ascending.
    pub times: Vec<DateTime<Utc>>,
    /// Variables by name.
    pub variables: BTreeMap<String, Variable>,
}

impl Dataset {
    pub fn new(times: Vec<DateTime<Utc>>) -> Self {
        Self {
            times,
            variables: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, variable: Variable) {
        self.variables.insert(name.into(), variable);
    }

    pub fn with_variable(mut self, name: impl Into<String>, variable: Variable) -> Self {
        self.insert(name, variable);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// Length of a dimension across the dataset.
    pub fn dim_len(&self, dim: &str) -> Option<usize> {
        if dim == TIME_DIM {
            return Some(self.times.len());
        }
        self.variables.values().find_map(|v| v.dim_len(dim))
    }
}
