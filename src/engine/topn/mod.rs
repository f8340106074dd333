pub mod cancel;
pub mod engine;
pub mod expand;
pub mod finalize;
pub mod mandatory;
pub mod merge;
pub mod query;
pub mod rank;
pub mod row;

pub use cancel::CancellationToken;
pub use engine::TopNEngine;
pub use mandatory::MandatorySet;
pub use query::{DimensionSpec, MetricSpec, TieBreak, TopNQuery, TopNQueryBuilder};
pub use row::{PartialRow, ResultBucket, ResultRow, SegmentResult};
