use crate::engine::aggregate::spec::AggregatorSpec;
use crate::engine::aggregate::state::AggState;
use crate::engine::topn::row::{PartialRow, SegmentResult};
use crate::engine::types::DimensionValue;
use crate::shared::time::Interval;

use super::query_factory::FIXTURE_INTERVAL;

/// `(dim1, impressions, clicks)` of the reference segment.
pub const FIXTURE_ROWS: &[(&str, i64, i64)] = &[
    ("8", 91, 9),
    ("10", 61, 6),
    ("7", 41, 4),
    ("1", 1, 0),
    ("2", 2, 0),
    ("3", 3, 0),
    ("4", 10, 1),
    ("5", 20, 2),
    ("6", 30, 3),
    ("9", 35, 3),
];

pub struct SegmentFactory {
    id: String,
    interval: String,
    aggregators: Vec<AggregatorSpec>,
    rows: Vec<PartialRow>,
}

impl SegmentFactory {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            interval: FIXTURE_INTERVAL.to_string(),
            aggregators: vec![AggregatorSpec::long_sum("impressions", "impressions")],
            rows: Vec::new(),
        }
    }

    pub fn with_interval(mut self, interval: &str) -> Self {
        self.interval = interval.to_string();
        self
    }

    /// Aggregators used to shape states for rows added after this call.
    pub fn with_aggregators(mut self, aggregators: Vec<AggregatorSpec>) -> Self {
        self.aggregators = aggregators;
        self
    }

    /// Adds a row with one input value per aggregator.
    pub fn add_row(mut self, dimension: impl Into<DimensionValue>, values: &[i64]) -> Self {
        assert_eq!(
            values.len(),
            self.aggregators.len(),
            "one value per aggregator"
        );
        let states = self
            .aggregators
            .iter()
            .zip(values.iter())
            .map(|(spec, v)| spec.partial(*v))
            .collect();
        self.rows.push(PartialRow::new(dimension, states));
        self
    }

    pub fn add_row_states(
        mut self,
        dimension: impl Into<DimensionValue>,
        states: Vec<AggState>,
    ) -> Self {
        self.rows.push(PartialRow::new(dimension, states));
        self
    }

    /// Loads [`FIXTURE_ROWS`], reading `impressions`/`clicks` by aggregator
    /// name and 1 for any other aggregator.
    pub fn with_fixture_rows(mut self) -> Self {
        for (dim, impressions, clicks) in FIXTURE_ROWS {
            let values: Vec<i64> = self
                .aggregators
                .iter()
                .map(|spec| match spec.name.as_str() {
                    "impressions" => *impressions,
                    "clicks" => *clicks,
                    _ => 1,
                })
                .collect();
            self = self.add_row(*dim, &values);
        }
        self
    }

    pub fn create(self) -> SegmentResult {
        SegmentResult::new(
            self.id,
            Interval::parse(&self.interval).expect("valid fixture interval"),
            self.rows,
        )
    }
}
