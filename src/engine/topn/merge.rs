use ahash::RandomState;
use indexmap::map::Entry;
use tracing::debug;

use crate::engine::errors::{TopNError, TopNResult};
use crate::engine::topn::cancel::CancellationToken;
use crate::engine::topn::row::{MergedRows, Row, RowOrigin};

/// Folds expanded segment results of one bucket into one row per dimension
/// value.
///
/// Sequential fold, one merger per bucket. Requires every `AggState::combine`
/// to be associative and commutative: finalized values must not depend on the
/// order segments are accumulated. Insertion order (the `FirstSeen` tie-break)
/// does.
#[derive(Debug)]
pub struct BucketMerger {
    groups: MergedRows,
    segments: usize,
    cancellation: Option<CancellationToken>,
}

impl Default for BucketMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl BucketMerger {
    pub fn new() -> Self {
        Self {
            groups: MergedRows::with_hasher(RandomState::new()),
            segments: 0,
            cancellation: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Merges one segment's expanded rows.
    pub fn accumulate(&mut self, rows: Vec<Row>) -> TopNResult<()> {
        if let Some(token) = &self.cancellation {
            token.check("bucket merge abandoned")?;
        }

        for row in rows {
            match self.groups.entry(row.dimension.clone()) {
                Entry::Vacant(e) => {
                    e.insert(row);
                }
                Entry::Occupied(mut e) => {
                    let existing = e.get_mut();
                    if existing.states.len() != row.states.len() {
                        return Err(TopNError::aggregation_type(format!(
                            "row '{}' has {} states in one segment and {} in another",
                            row.dimension,
                            existing.states.len(),
                            row.states.len()
                        )));
                    }
                    for (existing_state, new_state) in
                        existing.states.iter_mut().zip(row.states.iter())
                    {
                        existing_state.combine(new_state)?;
                    }
                    if row.origin == RowOrigin::Real {
                        existing.origin = RowOrigin::Real;
                    }
                }
            }
        }

        self.segments += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn finish(self) -> MergedRows {
        debug!(
            target: "zftopn::merge",
            segments = self.segments,
            groups = self.groups.len(),
            synthetic = self.groups.values().filter(|r| r.is_synthetic()).count(),
            "Merged bucket"
        );
        self.groups
    }
}

/// Merges every segment's expanded rows in the given order.
pub fn merge(expanded: Vec<Vec<Row>>) -> TopNResult<MergedRows> {
    let mut merger = BucketMerger::new();
    for rows in expanded {
        merger.accumulate(rows)?;
    }
    Ok(merger.finish())
}
