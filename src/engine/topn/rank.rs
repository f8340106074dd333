use std::cmp::Ordering;

use tracing::trace;

use crate::engine::errors::{TopNError, TopNResult};
use crate::engine::topn::query::{MetricSpec, TieBreak};
use crate::engine::topn::row::{FinalizedRow, FinalizedRows};
use crate::engine::types::MetricValue;

/// Orders finalized rows by `spec.metric` and keeps the first `k`.
///
/// The sort is stable: under `TieBreak::FirstSeen` equal values keep the
/// iteration order of `rows`. Fewer than `k` rows is not an error.
pub fn rank(
    rows: FinalizedRows,
    spec: &MetricSpec,
    tie_break: TieBreak,
    k: usize,
) -> TopNResult<Vec<FinalizedRow>> {
    if k == 0 {
        return Err(TopNError::configuration("threshold must be at least 1"));
    }

    let mut keyed: Vec<(MetricValue, FinalizedRow)> = Vec::with_capacity(rows.len());
    for (_, row) in rows {
        let value = row.value(&spec.metric).ok_or_else(|| {
            TopNError::Configuration(format!(
                "ranking metric '{}' missing from row '{}'",
                spec.metric, row.dimension
            ))
        })?;
        keyed.push((value, row));
    }

    let total = keyed.len();
    keyed.sort_by(|(va, ra), (vb, rb)| {
        let ord = if spec.inverted {
            va.compare(vb)
        } else {
            vb.compare(va)
        };
        match (ord, tie_break) {
            (Ordering::Equal, TieBreak::DimensionAscending) => ra.dimension.cmp(&rb.dimension),
            (ord, _) => ord,
        }
    });
    keyed.truncate(k);

    trace!(
        target: "zftopn::rank",
        metric = %spec.metric,
        inverted = spec.inverted,
        total,
        kept = keyed.len(),
        "Ranked bucket"
    );

    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}
