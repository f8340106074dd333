pub mod engine;
pub mod logging;
pub mod shared;

pub use engine::errors::{TopNError, TopNResult};
pub use engine::topn::{
    CancellationToken, DimensionSpec, MandatorySet, MetricSpec, PartialRow, ResultBucket,
    ResultRow, SegmentResult, TieBreak, TopNEngine, TopNQuery, TopNQueryBuilder,
};

#[cfg(test)]
#[path = "../tests/helpers/mod.rs"]
pub mod test_helpers;
