use std::collections::HashSet;

use serde::Deserialize;

use crate::engine::aggregate::post::PostAggregator;
use crate::engine::aggregate::spec::AggregatorSpec;
use crate::engine::errors::{TopNError, TopNResult};
use crate::engine::topn::mandatory::MandatorySet;
use crate::engine::types::{DimensionType, DimensionValue};
use crate::shared::time::Interval;

/// How rows with equal ranking values are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep merge insertion order: segment order, then row order within a
    /// segment, real rows before zero-filled rows in mandatory-set order.
    #[default]
    FirstSeen,
    /// Ascending dimension value, regardless of ranking direction.
    DimensionAscending,
}

/// Grouping dimension and the key it is emitted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSpec {
    pub dimension: String,
    pub output_name: String,
    pub dimension_type: DimensionType,
}

impl DimensionSpec {
    pub fn new(dimension: impl Into<String>, dimension_type: DimensionType) -> Self {
        let dimension = dimension.into();
        Self {
            output_name: dimension.clone(),
            dimension,
            dimension_type,
        }
    }

    pub fn with_output_name(mut self, output_name: impl Into<String>) -> Self {
        self.output_name = output_name.into();
        self
    }
}

/// Ranking metric and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSpec {
    pub metric: String,
    /// `false` ranks descending, `true` ascending
    pub inverted: bool,
    /// Falls back to the engine default when unset
    pub tie_break: Option<TieBreak>,
}

impl MetricSpec {
    pub fn numeric(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            inverted: false,
            tie_break: None,
        }
    }

    pub fn inverted(metric: impl Into<String>) -> Self {
        Self {
            inverted: true,
            ..Self::numeric(metric)
        }
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = Some(tie_break);
        self
    }
}

/// A validated zero-filled top-N query.
#[derive(Debug, Clone)]
pub struct TopNQuery {
    dimension: DimensionSpec,
    metric: MetricSpec,
    threshold: usize,
    aggregators: Vec<AggregatorSpec>,
    post_aggregators: Vec<PostAggregator>,
    mandatory: Option<MandatorySet>,
    restrict_to_mandatory: bool,
    intervals: Vec<Interval>,
}

impl TopNQuery {
    pub fn builder() -> TopNQueryBuilder {
        TopNQueryBuilder::default()
    }

    pub fn dimension(&self) -> &DimensionSpec {
        &self.dimension
    }

    pub fn metric(&self) -> &MetricSpec {
        &self.metric
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn aggregators(&self) -> &[AggregatorSpec] {
        &self.aggregators
    }

    pub fn post_aggregators(&self) -> &[PostAggregator] {
        &self.post_aggregators
    }

    pub fn mandatory(&self) -> Option<&MandatorySet> {
        self.mandatory.as_ref()
    }

    pub fn restrict_to_mandatory(&self) -> bool {
        self.restrict_to_mandatory
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn is_zero_filled(&self) -> bool {
        self.mandatory.is_some()
    }
}

#[derive(Debug, Clone)]
enum MandatoryInput {
    Values(Vec<DimensionValue>),
    Raw(Vec<String>),
}

#[derive(Debug, Clone, Default)]
pub struct TopNQueryBuilder {
    dimension: Option<DimensionSpec>,
    metric: Option<MetricSpec>,
    threshold: i64,
    aggregators: Vec<AggregatorSpec>,
    post_aggregators: Vec<PostAggregator>,
    mandatory: Option<MandatoryInput>,
    restrict_to_mandatory: bool,
    intervals: Vec<Interval>,
}

impl TopNQueryBuilder {
    pub fn dimension(mut self, dimension: DimensionSpec) -> Self {
        self.dimension = Some(dimension);
        self
    }

    pub fn metric(mut self, metric: MetricSpec) -> Self {
        self.metric = Some(metric);
        self
    }

    pub fn threshold(mut self, threshold: i64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn aggregator(mut self, aggregator: AggregatorSpec) -> Self {
        self.aggregators.push(aggregator);
        self
    }

    pub fn aggregators(mut self, aggregators: Vec<AggregatorSpec>) -> Self {
        self.aggregators = aggregators;
        self
    }

    pub fn post_aggregator(mut self, post: PostAggregator) -> Self {
        self.post_aggregators.push(post);
        self
    }

    pub fn post_aggregators(mut self, posts: Vec<PostAggregator>) -> Self {
        self.post_aggregators = posts;
        self
    }

    /// Values guaranteed to appear in every bucket, already typed.
    pub fn mandatory_values<I>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = DimensionValue>,
    {
        self.mandatory = Some(MandatoryInput::Values(values.into_iter().collect()));
        self
    }

    /// Values guaranteed to appear in every bucket, parsed with the
    /// dimension's type when the query is built.
    pub fn mandatory_strings<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mandatory = Some(MandatoryInput::Raw(
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn restrict_to_mandatory(mut self, restrict: bool) -> Self {
        self.restrict_to_mandatory = restrict;
        self
    }

    pub fn interval(mut self, interval: Interval) -> Self {
        self.intervals.push(interval);
        self
    }

    pub fn intervals(mut self, intervals: Vec<Interval>) -> Self {
        self.intervals = intervals;
        self
    }

    pub fn build(self) -> TopNResult<TopNQuery> {
        let dimension = self
            .dimension
            .ok_or_else(|| TopNError::configuration("top-N query needs a dimension"))?;
        if dimension.dimension.is_empty() || dimension.output_name.is_empty() {
            return Err(TopNError::configuration("dimension name must not be empty"));
        }

        let metric = self
            .metric
            .ok_or_else(|| TopNError::configuration("top-N query needs a ranking metric"))?;

        if self.threshold <= 0 {
            return Err(TopNError::Configuration(format!(
                "threshold must be at least 1, got {}",
                self.threshold
            )));
        }
        let threshold = usize::try_from(self.threshold).map_err(|_| {
            TopNError::Configuration(format!("threshold {} is out of range", self.threshold))
        })?;

        if self.aggregators.is_empty() {
            return Err(TopNError::configuration(
                "top-N query needs at least one aggregator",
            ));
        }

        let mut known: HashSet<&str> = HashSet::new();
        for agg in &self.aggregators {
            register_name(&mut known, &agg.name, &dimension)?;
        }
        for post in &self.post_aggregators {
            post.validate(&known)?;
            register_name(&mut known, post.name(), &dimension)?;
        }

        if !known.contains(metric.metric.as_str()) {
            return Err(TopNError::Configuration(format!(
                "ranking metric '{}' is neither an aggregator nor a post-aggregator",
                metric.metric
            )));
        }

        if self.intervals.is_empty() {
            return Err(TopNError::configuration(
                "top-N query needs at least one interval",
            ));
        }
        let mut seen_intervals = HashSet::with_capacity(self.intervals.len());
        for interval in &self.intervals {
            if !seen_intervals.insert(interval) {
                return Err(TopNError::Configuration(format!(
                    "interval {} is listed more than once",
                    interval
                )));
            }
        }

        let mandatory = match self.mandatory {
            None => None,
            Some(MandatoryInput::Values(values)) => {
                let set = MandatorySet::new(values)?;
                set.check_type(dimension.dimension_type)?;
                Some(set)
            }
            Some(MandatoryInput::Raw(raw)) => {
                Some(MandatorySet::parse(raw, dimension.dimension_type)?)
            }
        };

        if mandatory.is_some() {
            for agg in &self.aggregators {
                agg.require_identity()?;
            }
        } else if self.restrict_to_mandatory {
            return Err(TopNError::configuration(
                "restrict_to_mandatory requires a mandatory value set",
            ));
        }

        Ok(TopNQuery {
            dimension,
            metric,
            threshold,
            aggregators: self.aggregators,
            post_aggregators: self.post_aggregators,
            mandatory,
            restrict_to_mandatory: self.restrict_to_mandatory,
            intervals: self.intervals,
        })
    }
}

fn register_name<'a>(
    known: &mut HashSet<&'a str>,
    name: &'a str,
    dimension: &DimensionSpec,
) -> TopNResult<()> {
    if name.is_empty() {
        return Err(TopNError::configuration("output names must not be empty"));
    }
    if name == dimension.output_name {
        return Err(TopNError::Configuration(format!(
            "output name '{}' collides with the dimension output name",
            name
        )));
    }
    if !known.insert(name) {
        return Err(TopNError::Configuration(format!(
            "output name '{}' is defined more than once",
            name
        )));
    }
    Ok(())
}
