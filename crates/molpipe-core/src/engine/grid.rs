use itertools::Itertools;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("Missing hyperparameter '{0}'")]
    Missing(String),
    #[error("Hyperparameter '{name}' has the wrong type, expected {expected}")]
    WrongType {
        name: String,
        expected: &'static str,
    },
}

/// A single hyperparameter value drawn from a grid.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Str(v) => write!(f, "{}", v),
        }
    }
}

/// One hyperparameter configuration: parameter name to value.
pub type ParamPoint = BTreeMap<String, ParamValue>;

/// Typed accessors for the values of a [`ParamPoint`].
pub trait ParamPointExt {
    fn float_param(&self, name: &str) -> Result<f64, ParamError>;
    fn usize_param(&self, name: &str) -> Result<usize, ParamError>;
    fn str_param(&self, name: &str) -> Result<&str, ParamError>;
}

impl ParamPointExt for ParamPoint {
    fn float_param(&self, name: &str) -> Result<f64, ParamError> {
        match self.get(name) {
            Some(ParamValue::Float(v)) => Ok(*v),
            Some(ParamValue::Int(v)) => Ok(*v as f64),
            Some(_) => Err(ParamError::WrongType {
                name: name.to_string(),
                expected: "float",
            }),
            None => Err(ParamError::Missing(name.to_string())),
        }
    }

    fn usize_param(&self, name: &str) -> Result<usize, ParamError> {
        match self.get(name) {
            Some(ParamValue::Int(v)) if *v >= 0 => Ok(*v as usize),
            Some(_) => Err(ParamError::WrongType {
                name: name.to_string(),
                expected: "non-negative integer",
            }),
            None => Err(ParamError::Missing(name.to_string())),
        }
    }

    fn str_param(&self, name: &str) -> Result<&str, ParamError> {
        match self.get(name) {
            Some(ParamValue::Str(v)) => Ok(v),
            Some(_) => Err(ParamError::WrongType {
                name: name.to_string(),
                expected: "string",
            }),
            None => Err(ParamError::Missing(name.to_string())),
        }
    }
}

/// Formats a point as a stable, human-readable `name=value` list.
pub fn format_point(point: &ParamPoint) -> String {
    point
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .join(" ")
}

/// A hyperparameter grid: per-parameter candidate lists whose Cartesian
/// product defines the configurations to try.
///
/// Enumeration order is deterministic: parameter names in lexicographic
/// order, candidate values in the order they were added, last parameter
/// varying fastest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamGrid {
    params: BTreeMap<String, Vec<ParamValue>>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, name: impl Into<String>, values: Vec<ParamValue>) -> Self {
        self.params.insert(name.into(), values);
        self
    }

    /// The number of configurations this grid enumerates.
    pub fn len(&self) -> usize {
        if self.params.is_empty() {
            return 0;
        }
        self.params.values().map(Vec::len).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enumerates every configuration in the grid's deterministic order.
    pub fn points(&self) -> Vec<ParamPoint> {
        if self.params.is_empty() {
            return Vec::new();
        }
        let axes: Vec<Vec<(String, ParamValue)>> = self
            .params
            .iter()
            .map(|(name, values)| {
                values
                    .iter()
                    .map(|v| (name.clone(), v.clone()))
                    .collect()
            })
            .collect();

        axes.into_iter()
            .map(Vec::into_iter)
            .multi_cartesian_product()
            .map(|assignment| assignment.into_iter().collect())
            .collect()
    }
}
