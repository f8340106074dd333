use std::sync::Arc;

use ahash::RandomState;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::engine::aggregate::state::AggState;
use crate::engine::types::{DimensionValue, MetricValue};
use crate::shared::time::Interval;

/// One group as reported by the scan layer; `states` align with the query's
/// aggregator list.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialRow {
    pub dimension: DimensionValue,
    pub states: Vec<AggState>,
}

impl PartialRow {
    pub fn new(dimension: impl Into<DimensionValue>, states: Vec<AggState>) -> Self {
        Self {
            dimension: dimension.into(),
            states,
        }
    }
}

/// Unordered partial result of one segment for one bucket.
#[derive(Debug, Clone)]
pub struct SegmentResult {
    pub segment_id: String,
    pub interval: Interval,
    pub rows: Vec<PartialRow>,
}

impl SegmentResult {
    pub fn new(segment_id: impl Into<String>, interval: Interval, rows: Vec<PartialRow>) -> Self {
        Self {
            segment_id: segment_id.into(),
            interval,
            rows,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrigin {
    /// Came out of scanned data
    Real,
    /// Materialized by zero-fill
    Synthetic,
}

/// Pre-finalization row owned by a single bucket's processing.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub dimension: DimensionValue,
    pub states: Vec<AggState>,
    pub origin: RowOrigin,
}

impl Row {
    pub fn real(dimension: DimensionValue, states: Vec<AggState>) -> Self {
        Self {
            dimension,
            states,
            origin: RowOrigin::Real,
        }
    }

    pub fn synthetic(dimension: DimensionValue, states: Vec<AggState>) -> Self {
        Self {
            dimension,
            states,
            origin: RowOrigin::Synthetic,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.origin == RowOrigin::Synthetic
    }
}

pub type MergedRows = IndexMap<DimensionValue, Row, RandomState>;

/// Row whose aggregates are finalized and post-aggregations applied.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedRow {
    pub dimension: DimensionValue,
    pub values: IndexMap<String, MetricValue>,
    pub origin: RowOrigin,
}

impl FinalizedRow {
    pub fn value(&self, name: &str) -> Option<MetricValue> {
        self.values.get(name).copied()
    }
}

pub type FinalizedRows = IndexMap<DimensionValue, FinalizedRow, RandomState>;

/// Emitted row: the dimension under its output name plus every metric.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    dimension_key: Arc<str>,
    dimension: DimensionValue,
    metrics: IndexMap<String, MetricValue>,
}

impl ResultRow {
    pub fn new(dimension_key: Arc<str>, row: FinalizedRow) -> Self {
        Self {
            dimension_key,
            dimension: row.dimension,
            metrics: row.values,
        }
    }

    pub fn dimension_key(&self) -> &str {
        &self.dimension_key
    }

    pub fn dimension(&self) -> &DimensionValue {
        &self.dimension
    }

    pub fn metric(&self, name: &str) -> Option<MetricValue> {
        self.metrics.get(name).copied()
    }

    pub fn metrics(&self) -> &IndexMap<String, MetricValue> {
        &self.metrics
    }
}

impl Serialize for ResultRow {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.metrics.len() + 1))?;
        map.serialize_entry(&*self.dimension_key, &self.dimension)?;
        for (name, value) in &self.metrics {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Ranked answer for one interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultBucket {
    #[serde(skip)]
    pub interval: Interval,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "result")]
    pub rows: Vec<ResultRow>,
}

impl ResultBucket {
    pub fn new(interval: Interval, rows: Vec<ResultRow>) -> Self {
        Self {
            interval,
            timestamp: interval.start(),
            rows,
        }
    }

    pub fn dimension_values(&self) -> Vec<&DimensionValue> {
        self.rows.iter().map(|r| r.dimension()).collect()
    }
}
