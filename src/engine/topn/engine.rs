use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info};

use crate::engine::errors::{TopNError, TopNResult};
use crate::engine::topn::cancel::CancellationToken;
use crate::engine::topn::expand::ZeroFillExpander;
use crate::engine::topn::finalize::PostAggregationApplier;
use crate::engine::topn::merge::BucketMerger;
use crate::engine::topn::query::{TieBreak, TopNQuery};
use crate::engine::topn::rank::rank;
use crate::engine::topn::row::{ResultBucket, ResultRow, Row, SegmentResult};
use crate::shared::config::CONFIG;
use crate::shared::config::model::EngineConfig;
use crate::shared::time::Interval;

/// Drives expand → merge → finalize → rank for every bucket of a query.
///
/// Owns its worker pool. Segment expansion and whole buckets fan out onto the
/// pool; each bucket's merge is a sequential fold over its own accumulator.
pub struct TopNEngine {
    pool: ThreadPool,
    config: EngineConfig,
}

impl TopNEngine {
    pub fn new(config: EngineConfig) -> TopNResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|i| format!("zftopn-worker-{}", i))
            .build()?;
        debug!(
            target: "zftopn::engine",
            threads = pool.current_num_threads(),
            parallel_buckets = config.parallel_buckets,
            "Top-N engine ready"
        );
        Ok(Self { pool, config })
    }

    /// Builds an engine from the process-wide settings.
    pub fn from_settings() -> TopNResult<Self> {
        Self::new(CONFIG.engine.clone())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn run(
        &self,
        query: &TopNQuery,
        segments: Vec<SegmentResult>,
    ) -> TopNResult<Vec<ResultBucket>> {
        self.run_with_cancellation(query, segments, &CancellationToken::new())
    }

    /// Produces one ranked bucket per query interval, in interval order.
    /// Intervals without any segment result are answered from the mandatory
    /// set alone. Cancelling `cancellation` fails the whole query.
    pub fn run_with_cancellation(
        &self,
        query: &TopNQuery,
        segments: Vec<SegmentResult>,
        cancellation: &CancellationToken,
    ) -> TopNResult<Vec<ResultBucket>> {
        let started = Instant::now();
        let buckets = group_by_interval(query, segments)?;
        let bucket_count = buckets.len();

        let result = self
            .dispatch(buckets, |(interval, segs)| {
                self.process_bucket(query, interval, segs, cancellation)
            })
            .into_iter()
            .collect::<TopNResult<Vec<_>>>();

        match &result {
            Ok(out) => info!(
                target: "zftopn::engine",
                buckets = bucket_count,
                rows = out.iter().map(|b| b.rows.len()).sum::<usize>(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Top-N query completed"
            ),
            Err(e) => e.log_error(),
        }
        result
    }

    /// Like [`run_with_cancellation`](Self::run_with_cancellation) but each
    /// bucket has its own outcome. A bucket is cancelled through the token
    /// registered for its interval; buckets without a token run to completion.
    ///
    /// The outer error covers query-wide failures such as a segment reporting
    /// an interval the query does not cover.
    pub fn run_each(
        &self,
        query: &TopNQuery,
        segments: Vec<SegmentResult>,
        tokens: &HashMap<Interval, CancellationToken>,
    ) -> TopNResult<Vec<(Interval, TopNResult<ResultBucket>)>> {
        let started = Instant::now();
        let buckets = group_by_interval(query, segments)?;
        let uncancellable = CancellationToken::new();

        let outcomes = self.dispatch(buckets, |(interval, segs)| {
            let token = tokens.get(&interval).unwrap_or(&uncancellable);
            (interval, self.process_bucket(query, interval, segs, token))
        });

        let mut failed = 0usize;
        for (_, outcome) in &outcomes {
            if let Err(e) = outcome {
                e.log_error();
                failed += 1;
            }
        }
        info!(
            target: "zftopn::engine",
            buckets = outcomes.len(),
            failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Top-N query completed per bucket"
        );
        Ok(outcomes)
    }

    /// Runs `f` once per bucket on the pool, keeping bucket order.
    fn dispatch<R, F>(&self, buckets: Vec<(Interval, Vec<SegmentResult>)>, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn((Interval, Vec<SegmentResult>)) -> R + Sync + Send,
    {
        self.pool.install(|| {
            if self.config.parallel_buckets {
                buckets.into_par_iter().map(&f).collect()
            } else {
                buckets.into_iter().map(&f).collect()
            }
        })
    }

    /// Processes a single bucket. Holds no state beyond its own accumulator,
    /// so cancelling it leaves other buckets untouched.
    pub fn process_bucket(
        &self,
        query: &TopNQuery,
        interval: Interval,
        segments: Vec<SegmentResult>,
        cancellation: &CancellationToken,
    ) -> TopNResult<ResultBucket> {
        let expander = ZeroFillExpander::for_query(query)?;

        let expanded: Vec<Vec<Row>> = if segments.is_empty() {
            debug!(
                target: "zftopn::engine",
                bucket = %interval,
                "No segment data for bucket, zero-filling mandatory set"
            );
            vec![expander.expand(&[])?]
        } else {
            // indexed collect keeps segment order for the FirstSeen tie-break
            self.pool.install(|| {
                segments
                    .par_iter()
                    .map(|segment| expander.expand(&segment.rows))
                    .collect::<TopNResult<Vec<_>>>()
            })?
        };

        let mut merger = BucketMerger::new().with_cancellation(cancellation.clone());
        for rows in expanded {
            merger.accumulate(rows)?;
        }
        let merged = merger.finish();

        cancellation.check("bucket finalize abandoned")?;
        let applier = PostAggregationApplier::new(query.aggregators(), query.post_aggregators());
        let finalized = applier.apply(merged)?;

        cancellation.check("bucket ranking abandoned")?;
        let tie_break = self.tie_break_for(query);
        let ranked = rank(finalized, query.metric(), tie_break, query.threshold())?;

        let key: Arc<str> = Arc::from(query.dimension().output_name.as_str());
        let rows = ranked
            .into_iter()
            .map(|row| ResultRow::new(Arc::clone(&key), row))
            .collect::<Vec<_>>();

        debug!(
            target: "zftopn::engine",
            bucket = %interval,
            segments = segments.len(),
            rows = rows.len(),
            "Bucket ranked"
        );

        Ok(ResultBucket::new(interval, rows))
    }

    fn tie_break_for(&self, query: &TopNQuery) -> TieBreak {
        query.metric().tie_break.unwrap_or(self.config.tie_break)
    }
}

/// Routes segment results to the query's intervals, keeping interval order
/// and, within an interval, the order segments were supplied in.
fn group_by_interval(
    query: &TopNQuery,
    segments: Vec<SegmentResult>,
) -> TopNResult<Vec<(Interval, Vec<SegmentResult>)>> {
    let mut buckets: IndexMap<Interval, Vec<SegmentResult>> = query
        .intervals()
        .iter()
        .map(|interval| (*interval, Vec::new()))
        .collect();

    for segment in segments {
        match buckets.get_mut(&segment.interval) {
            Some(slot) => slot.push(segment),
            None => {
                return Err(TopNError::Configuration(format!(
                    "segment '{}' reported interval {} which the query does not cover",
                    segment.segment_id, segment.interval
                )));
            }
        }
    }

    Ok(buckets.into_iter().collect())
}
