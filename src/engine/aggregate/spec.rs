use crate::engine::aggregate::state::AggState;
use crate::engine::errors::{TopNError, TopNResult};
use crate::engine::types::MetricValue;

/// Describes a single aggregate operation requested by the query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateOpSpec {
    /// SUM over an integer field
    LongSum { field: String },
    /// SUM over a floating point field
    DoubleSum { field: String },
    /// COUNT of all scanned rows
    Count,
    /// AVG over a numeric field
    Avg { field: String },
    /// COUNT UNIQUE over a specific field
    CountUnique { field: String },
    LongMin { field: String },
    LongMax { field: String },
    DoubleMin { field: String },
    DoubleMax { field: String },
}

impl AggregateOpSpec {
    pub fn field(&self) -> Option<&str> {
        match self {
            AggregateOpSpec::Count => None,
            AggregateOpSpec::LongSum { field }
            | AggregateOpSpec::DoubleSum { field }
            | AggregateOpSpec::Avg { field }
            | AggregateOpSpec::CountUnique { field }
            | AggregateOpSpec::LongMin { field }
            | AggregateOpSpec::LongMax { field }
            | AggregateOpSpec::DoubleMin { field }
            | AggregateOpSpec::DoubleMax { field } => Some(field),
        }
    }
}

/// A named aggregate: the output name plus the operation producing it.
///
/// A query resolves its aggregators into a `Vec<AggregatorSpec>` once; partial
/// rows carry their states in the same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorSpec {
    pub name: String,
    pub op: AggregateOpSpec,
}

impl AggregatorSpec {
    pub fn new(name: impl Into<String>, op: AggregateOpSpec) -> Self {
        Self {
            name: name.into(),
            op,
        }
    }

    pub fn long_sum(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, AggregateOpSpec::LongSum { field: field.into() })
    }

    pub fn double_sum(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, AggregateOpSpec::DoubleSum { field: field.into() })
    }

    pub fn count(name: impl Into<String>) -> Self {
        Self::new(name, AggregateOpSpec::Count)
    }

    pub fn avg(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, AggregateOpSpec::Avg { field: field.into() })
    }

    pub fn count_unique(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, AggregateOpSpec::CountUnique { field: field.into() })
    }

    pub fn long_min(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, AggregateOpSpec::LongMin { field: field.into() })
    }

    pub fn long_max(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, AggregateOpSpec::LongMax { field: field.into() })
    }

    pub fn double_min(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, AggregateOpSpec::DoubleMin { field: field.into() })
    }

    pub fn double_max(name: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(name, AggregateOpSpec::DoubleMax { field: field.into() })
    }

    /// Neutral state under `combine`, or `None` when the operation has no
    /// value that finalizes to a meaningful zero (min/max).
    pub fn identity(&self) -> Option<AggState> {
        match &self.op {
            AggregateOpSpec::LongSum { .. } => Some(AggState::long_sum(0)),
            AggregateOpSpec::DoubleSum { .. } => Some(AggState::double_sum(0.0)),
            AggregateOpSpec::Count => Some(AggState::count(0)),
            AggregateOpSpec::Avg { .. } => Some(AggState::avg(0.0, 0)),
            AggregateOpSpec::CountUnique { .. } => {
                Some(AggState::count_unique(Vec::<String>::new()))
            }
            AggregateOpSpec::LongMin { .. }
            | AggregateOpSpec::LongMax { .. }
            | AggregateOpSpec::DoubleMin { .. }
            | AggregateOpSpec::DoubleMax { .. } => None,
        }
    }

    /// Partial state reported for a group whose pre-aggregated input is
    /// `value`: the sum itself for sums, the row count for `count`, one
    /// observation for avg/min/max, and the value as a distinct key for
    /// count-unique.
    pub fn partial(&self, value: i64) -> AggState {
        match &self.op {
            AggregateOpSpec::LongSum { .. } => AggState::long_sum(value),
            AggregateOpSpec::DoubleSum { .. } => AggState::double_sum(value as f64),
            AggregateOpSpec::Count => AggState::count(value),
            AggregateOpSpec::Avg { .. } => AggState::avg(value as f64, 1),
            AggregateOpSpec::CountUnique { .. } => AggState::count_unique([value.to_string()]),
            AggregateOpSpec::LongMin { .. } => AggState::LongMin { min: Some(value) },
            AggregateOpSpec::LongMax { .. } => AggState::LongMax { max: Some(value) },
            AggregateOpSpec::DoubleMin { .. } => AggState::DoubleMin {
                min: Some(value as f64),
            },
            AggregateOpSpec::DoubleMax { .. } => AggState::DoubleMax {
                max: Some(value as f64),
            },
        }
    }

    /// Same as [`identity`](Self::identity) but as a zero-fill precondition.
    pub fn require_identity(&self) -> TopNResult<AggState> {
        self.identity().ok_or_else(|| {
            TopNError::Configuration(format!(
                "aggregator '{}' ({}) has no identity state and cannot be zero-filled",
                self.name,
                self.kind()
            ))
        })
    }

    pub fn kind(&self) -> &'static str {
        match &self.op {
            AggregateOpSpec::LongSum { .. } => "longSum",
            AggregateOpSpec::DoubleSum { .. } => "doubleSum",
            AggregateOpSpec::Count => "count",
            AggregateOpSpec::Avg { .. } => "avg",
            AggregateOpSpec::CountUnique { .. } => "countUnique",
            AggregateOpSpec::LongMin { .. } => "longMin",
            AggregateOpSpec::LongMax { .. } => "longMax",
            AggregateOpSpec::DoubleMin { .. } => "doubleMin",
            AggregateOpSpec::DoubleMax { .. } => "doubleMax",
        }
    }

    /// Checks that a partial state was produced by this aggregator.
    pub fn check_state(&self, state: &AggState) -> TopNResult<()> {
        if state.kind() == self.kind() {
            Ok(())
        } else {
            Err(TopNError::aggregation_type(format!(
                "aggregator '{}' expects {} state, got {}",
                self.name,
                self.kind(),
                state.kind()
            )))
        }
    }

    pub fn finalize(&self, state: &AggState) -> TopNResult<MetricValue> {
        self.check_state(state)?;
        Ok(state.finalize())
    }
}
