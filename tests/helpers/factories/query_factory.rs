use crate::engine::aggregate::post::PostAggregator;
use crate::engine::aggregate::spec::AggregatorSpec;
use crate::engine::errors::TopNResult;
use crate::engine::topn::query::{DimensionSpec, MetricSpec, TopNQuery, TopNQueryBuilder};
use crate::engine::types::DimensionType;
use crate::shared::time::Interval;

pub const FIXTURE_INTERVAL: &str = "2019-02-01T00:00:00Z/2019-02-02T00:00:00Z";
pub const EMPTY_INTERVAL: &str = "2019-12-01T00:00:00Z/2019-12-01T01:00:00Z";

pub struct QueryFactory {
    dimension: DimensionSpec,
    metric: MetricSpec,
    threshold: i64,
    aggregators: Vec<AggregatorSpec>,
    post_aggregators: Vec<PostAggregator>,
    mandatory: Option<Vec<String>>,
    restrict: bool,
    intervals: Vec<String>,
}

impl QueryFactory {
    pub fn new() -> Self {
        Self {
            dimension: DimensionSpec::new("dim1", DimensionType::String),
            metric: MetricSpec::numeric("impressions"),
            threshold: 5,
            aggregators: vec![AggregatorSpec::long_sum("impressions", "impressions")],
            post_aggregators: Vec::new(),
            mandatory: None,
            restrict: false,
            intervals: vec![FIXTURE_INTERVAL.to_string()],
        }
    }

    pub fn with_dimension(mut self, dimension: DimensionSpec) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_metric(mut self, metric: MetricSpec) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_threshold(mut self, threshold: i64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_aggregators(mut self, aggregators: Vec<AggregatorSpec>) -> Self {
        self.aggregators = aggregators;
        self
    }

    pub fn with_post_aggregator(mut self, post: PostAggregator) -> Self {
        self.post_aggregators.push(post);
        self
    }

    pub fn with_mandatory(mut self, values: &[&str]) -> Self {
        self.mandatory = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn restricted(mut self) -> Self {
        self.restrict = true;
        self
    }

    pub fn with_intervals(mut self, intervals: &[&str]) -> Self {
        self.intervals = intervals.iter().map(|i| i.to_string()).collect();
        self
    }

    pub fn builder(self) -> TopNQueryBuilder {
        let mut builder = TopNQuery::builder()
            .dimension(self.dimension)
            .metric(self.metric)
            .threshold(self.threshold)
            .aggregators(self.aggregators)
            .post_aggregators(self.post_aggregators)
            .restrict_to_mandatory(self.restrict)
            .intervals(
                self.intervals
                    .iter()
                    .map(|i| Interval::parse(i).expect("valid fixture interval"))
                    .collect(),
            );
        if let Some(values) = self.mandatory {
            builder = builder.mandatory_strings(values);
        }
        builder
    }

    pub fn try_create(self) -> TopNResult<TopNQuery> {
        self.builder().build()
    }

    pub fn create(self) -> TopNQuery {
        self.try_create().expect("valid fixture query")
    }
}
