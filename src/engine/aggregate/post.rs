use std::collections::HashSet;

use indexmap::IndexMap;

use crate::engine::errors::{TopNError, TopNResult};
use crate::engine::types::MetricValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Plus,
    Minus,
    Multiply,
    /// Division that yields 0 when the divisor is 0
    Divide,
    /// Plain IEEE division
    Quotient,
}

impl ArithmeticOp {
    pub fn parse(symbol: &str) -> TopNResult<Self> {
        match symbol {
            "+" => Ok(ArithmeticOp::Plus),
            "-" => Ok(ArithmeticOp::Minus),
            "*" => Ok(ArithmeticOp::Multiply),
            "/" => Ok(ArithmeticOp::Divide),
            "quotient" => Ok(ArithmeticOp::Quotient),
            other => Err(TopNError::Configuration(format!(
                "unknown arithmetic operator '{}'",
                other
            ))),
        }
    }

    fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        match self {
            ArithmeticOp::Plus => lhs + rhs,
            ArithmeticOp::Minus => lhs - rhs,
            ArithmeticOp::Multiply => lhs * rhs,
            ArithmeticOp::Divide => {
                if rhs == 0.0 {
                    0.0
                } else {
                    lhs / rhs
                }
            }
            ArithmeticOp::Quotient => lhs / rhs,
        }
    }
}

/// Derived metric computed from finalized aggregate values of one row.
#[derive(Debug, Clone, PartialEq)]
pub enum PostAggregator {
    /// Reads a finalized value by name
    FieldAccess { name: String, field: String },
    Constant { name: String, value: f64 },
    /// Left fold of `op` over the evaluated `fields`; always yields a double
    Arithmetic {
        name: String,
        op: ArithmeticOp,
        fields: Vec<PostAggregator>,
    },
}

impl PostAggregator {
    pub fn field_access(name: impl Into<String>, field: impl Into<String>) -> Self {
        PostAggregator::FieldAccess {
            name: name.into(),
            field: field.into(),
        }
    }

    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        PostAggregator::Constant {
            name: name.into(),
            value,
        }
    }

    pub fn arithmetic(
        name: impl Into<String>,
        op: ArithmeticOp,
        fields: Vec<PostAggregator>,
    ) -> Self {
        PostAggregator::Arithmetic {
            name: name.into(),
            op,
            fields,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PostAggregator::FieldAccess { name, .. }
            | PostAggregator::Constant { name, .. }
            | PostAggregator::Arithmetic { name, .. } => name,
        }
    }

    /// Names of the finalized values this expression reads.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_dependencies(&mut out);
        out
    }

    fn collect_dependencies<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            PostAggregator::FieldAccess { field, .. } => out.push(field),
            PostAggregator::Constant { .. } => {}
            PostAggregator::Arithmetic { fields, .. } => {
                for f in fields {
                    f.collect_dependencies(out);
                }
            }
        }
    }

    /// Rejects references to names outside `known` and malformed arithmetic.
    pub fn validate(&self, known: &HashSet<&str>) -> TopNResult<()> {
        self.validate_node(self.name())?;
        for dep in self.dependencies() {
            if !known.contains(dep) {
                return Err(TopNError::Configuration(format!(
                    "post-aggregator '{}' references undefined field '{}'",
                    self.name(),
                    dep
                )));
            }
        }
        Ok(())
    }

    /// Arity check for every arithmetic node of the tree rooted at `self`.
    fn validate_node(&self, root: &str) -> TopNResult<()> {
        if let PostAggregator::Arithmetic { name, fields, .. } = self {
            if fields.len() < 2 {
                return Err(TopNError::Configuration(format!(
                    "arithmetic post-aggregator '{}' (in '{}') needs at least two fields, got {}",
                    name,
                    root,
                    fields.len()
                )));
            }
            for field in fields {
                field.validate_node(root)?;
            }
        }
        Ok(())
    }

    /// Evaluates against the finalized values of a single row.
    pub fn compute(&self, values: &IndexMap<String, MetricValue>) -> TopNResult<MetricValue> {
        match self {
            PostAggregator::FieldAccess { field, .. } => values.get(field).copied().ok_or_else(|| {
                TopNError::Configuration(format!(
                    "post-aggregator '{}' references undefined field '{}'",
                    self.name(),
                    field
                ))
            }),
            PostAggregator::Constant { value, .. } => Ok(MetricValue::Double(*value)),
            PostAggregator::Arithmetic { op, fields, .. } => {
                let mut acc: Option<f64> = None;
                for field in fields {
                    let Some(v) = field.compute(values)?.as_f64() else {
                        return Ok(MetricValue::Null);
                    };
                    acc = Some(match acc {
                        None => v,
                        Some(lhs) => op.apply(lhs, v),
                    });
                }
                Ok(acc.map(MetricValue::Double).unwrap_or(MetricValue::Null))
            }
        }
    }
}
