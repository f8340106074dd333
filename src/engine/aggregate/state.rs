use std::collections::HashSet;

use crate::engine::errors::{TopNError, TopNResult};
use crate::engine::types::MetricValue;

/// Mergeable partial state of one named aggregate.
///
/// `combine` must be associative and commutative for every variant: partition
/// results arrive in no particular order and are folded one at a time.
#[derive(Clone, Debug, PartialEq)]
pub enum AggState {
    LongSum { sum: i64 },
    DoubleSum { sum: f64 },
    Count { count: i64 },
    Avg { sum: f64, count: i64 },
    CountUnique { values: HashSet<String> },
    LongMin { min: Option<i64> },
    LongMax { max: Option<i64> },
    DoubleMin { min: Option<f64> },
    DoubleMax { max: Option<f64> },
}

impl AggState {
    pub fn long_sum(sum: i64) -> Self {
        AggState::LongSum { sum }
    }

    pub fn double_sum(sum: f64) -> Self {
        AggState::DoubleSum { sum }
    }

    pub fn count(count: i64) -> Self {
        AggState::Count { count }
    }

    pub fn avg(sum: f64, count: i64) -> Self {
        AggState::Avg { sum, count }
    }

    pub fn count_unique<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AggState::CountUnique {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AggState::LongSum { .. } => "longSum",
            AggState::DoubleSum { .. } => "doubleSum",
            AggState::Count { .. } => "count",
            AggState::Avg { .. } => "avg",
            AggState::CountUnique { .. } => "countUnique",
            AggState::LongMin { .. } => "longMin",
            AggState::LongMax { .. } => "longMax",
            AggState::DoubleMin { .. } => "doubleMin",
            AggState::DoubleMax { .. } => "doubleMax",
        }
    }

    /// Folds `other` into `self`. States of different kinds never combine.
    pub fn combine(&mut self, other: &AggState) -> TopNResult<()> {
        match (&mut *self, other) {
            // wrapping keeps combine associative under overflow
            (AggState::LongSum { sum: a }, AggState::LongSum { sum: b }) => *a = a.wrapping_add(*b),
            (AggState::DoubleSum { sum: a }, AggState::DoubleSum { sum: b }) => *a += *b,
            (AggState::Count { count: a }, AggState::Count { count: b }) => {
                *a = a.wrapping_add(*b)
            }
            (AggState::Avg { sum: s1, count: c1 }, AggState::Avg { sum: s2, count: c2 }) => {
                *s1 += *s2;
                *c1 = c1.wrapping_add(*c2);
            }
            (AggState::CountUnique { values: a }, AggState::CountUnique { values: b }) => {
                a.extend(b.iter().cloned());
            }
            (AggState::LongMin { min: a }, AggState::LongMin { min: b }) => {
                *a = pick(*a, *b, |x, y| y < x);
            }
            (AggState::LongMax { max: a }, AggState::LongMax { max: b }) => {
                *a = pick(*a, *b, |x, y| y > x);
            }
            (AggState::DoubleMin { min: a }, AggState::DoubleMin { min: b }) => {
                *a = pick(*a, *b, |x, y| y.total_cmp(&x).is_lt());
            }
            (AggState::DoubleMax { max: a }, AggState::DoubleMax { max: b }) => {
                *a = pick(*a, *b, |x, y| y.total_cmp(&x).is_gt());
            }
            (a, b) => {
                return Err(TopNError::aggregation_type(format!(
                    "cannot combine {} state with {} state",
                    a.kind(),
                    b.kind()
                )));
            }
        }
        Ok(())
    }

    pub fn finalize(&self) -> MetricValue {
        match self {
            AggState::LongSum { sum } => MetricValue::Long(*sum),
            AggState::DoubleSum { sum } => MetricValue::Double(*sum),
            AggState::Count { count } => MetricValue::Long(*count),
            AggState::Avg { sum, count } => {
                if *count == 0 {
                    MetricValue::Double(0.0)
                } else {
                    MetricValue::Double(*sum / (*count as f64))
                }
            }
            AggState::CountUnique { values } => MetricValue::Long(values.len() as i64),
            AggState::LongMin { min } => min.map(MetricValue::Long).unwrap_or(MetricValue::Null),
            AggState::LongMax { max } => max.map(MetricValue::Long).unwrap_or(MetricValue::Null),
            AggState::DoubleMin { min } => {
                min.map(MetricValue::Double).unwrap_or(MetricValue::Null)
            }
            AggState::DoubleMax { max } => {
                max.map(MetricValue::Double).unwrap_or(MetricValue::Null)
            }
        }
    }
}

fn pick<T: Copy>(
    current: Option<T>,
    incoming: Option<T>,
    better: impl Fn(T, T) -> bool,
) -> Option<T> {
    match (current, incoming) {
        (Some(x), Some(y)) if better(x, y) => Some(y),
        (None, y) => y,
        (x, _) => x,
    }
}
