use ahash::RandomState;
use indexmap::IndexMap;

use crate::engine::aggregate::post::PostAggregator;
use crate::engine::aggregate::spec::AggregatorSpec;
use crate::engine::errors::{TopNError, TopNResult};
use crate::engine::topn::row::{FinalizedRow, FinalizedRows, MergedRows, Row};

/// Turns merged aggregate states into plain values and appends derived
/// metrics. Zero-filled rows go through exactly the same evaluation.
#[derive(Debug, Clone, Copy)]
pub struct PostAggregationApplier<'a> {
    aggregators: &'a [AggregatorSpec],
    post_aggregators: &'a [PostAggregator],
}

impl<'a> PostAggregationApplier<'a> {
    pub fn new(aggregators: &'a [AggregatorSpec], post_aggregators: &'a [PostAggregator]) -> Self {
        Self {
            aggregators,
            post_aggregators,
        }
    }

    pub fn apply(&self, rows: MergedRows) -> TopNResult<FinalizedRows> {
        let mut out = FinalizedRows::with_capacity_and_hasher(rows.len(), RandomState::new());
        for (dimension, row) in rows {
            let finalized = self.finalize_row(row)?;
            out.insert(dimension, finalized);
        }
        Ok(out)
    }

    pub fn finalize_row(&self, row: Row) -> TopNResult<FinalizedRow> {
        if row.states.len() != self.aggregators.len() {
            return Err(TopNError::aggregation_type(format!(
                "row '{}' carries {} aggregate states, query defines {}",
                row.dimension,
                row.states.len(),
                self.aggregators.len()
            )));
        }

        let width = self.aggregators.len() + self.post_aggregators.len();
        let mut values = IndexMap::with_capacity(width);
        for (spec, state) in self.aggregators.iter().zip(row.states.iter()) {
            values.insert(spec.name.clone(), spec.finalize(state)?);
        }
        // later post-aggregators may read earlier ones
        for post in self.post_aggregators {
            let value = post.compute(&values)?;
            values.insert(post.name().to_string(), value);
        }

        Ok(FinalizedRow {
            dimension: row.dimension,
            values,
            origin: row.origin,
        })
    }
}

/// One-shot form of [`PostAggregationApplier::apply`].
pub fn finalize(
    rows: MergedRows,
    aggregators: &[AggregatorSpec],
    post_aggregators: &[PostAggregator],
) -> TopNResult<FinalizedRows> {
    PostAggregationApplier::new(aggregators, post_aggregators).apply(rows)
}
