use crate::integration::scenarios::{
    AggregatorDef, PostAggregatorDef, QueryDef, SegmentDef, TestScenario,
};
use tracing::{debug, info};
use zero_filled_topn::engine::aggregate::post::{ArithmeticOp, PostAggregator};
use zero_filled_topn::engine::aggregate::spec::AggregatorSpec;
use zero_filled_topn::engine::types::DimensionType;
use zero_filled_topn::shared::config::model::EngineConfig;
use zero_filled_topn::shared::time::Interval;
use zero_filled_topn::{
    DimensionSpec, MetricSpec, PartialRow, SegmentResult, TopNEngine, TopNError, TopNQuery,
    TopNResult,
};

pub fn run_scenario(scenario: &TestScenario) {
    info!("▶ Running scenario: {}", scenario.name);

    let outcome = build_query(&scenario.query).and_then(|query| {
        let segments = scenario
            .segments
            .iter()
            .map(|segment| build_segment(segment, &query))
            .collect::<Vec<_>>();
        let engine = TopNEngine::new(EngineConfig {
            worker_threads: 2,
            ..EngineConfig::default()
        })?;
        engine.run(&query, segments)
    });

    match (&scenario.expect_error, outcome) {
        (Some(kind), Err(err)) => {
            debug!("Scenario '{}' failed as expected: {}", scenario.name, err);
            assert_eq!(error_kind(&err), kind, "scenario '{}': {}", scenario.name, err);
        }
        (Some(kind), Ok(_)) => {
            panic!("scenario '{}': expected {} error, query succeeded", scenario.name, kind)
        }
        (None, Err(err)) => panic!("scenario '{}': unexpected error: {}", scenario.name, err),
        (None, Ok(buckets)) => {
            let expected = scenario
                .expect
                .as_ref()
                .unwrap_or_else(|| panic!("scenario '{}' has no expectation", scenario.name));
            assert_eq!(buckets.len(), expected.len(), "scenario '{}': bucket count", scenario.name);
            for (i, (bucket, want)) in buckets.iter().zip(expected).enumerate() {
                let got = serde_json::to_value(&bucket.rows).expect("serializable bucket");
                debug!("Scenario '{}' bucket {}: {}", scenario.name, i, got);
                assert_eq!(&got, want, "scenario '{}': bucket {}", scenario.name, i);
            }
        }
    }
}

fn error_kind(err: &TopNError) -> &'static str {
    match err {
        TopNError::Configuration(_) => "configuration",
        TopNError::AggregationType(_) => "aggregation_type",
        TopNError::Cancelled(_) => "cancelled",
        TopNError::WorkerPool(_) => "worker_pool",
    }
}

fn build_query(def: &QueryDef) -> TopNResult<TopNQuery> {
    let dimension_type: DimensionType = def.dimension_type.parse()?;
    let mut dimension = DimensionSpec::new(def.dimension.clone(), dimension_type);
    if let Some(output_name) = &def.output_name {
        dimension = dimension.with_output_name(output_name.clone());
    }

    let mut metric = if def.inverted {
        MetricSpec::inverted(def.metric.clone())
    } else {
        MetricSpec::numeric(def.metric.clone())
    };
    if let Some(tie_break) = def.tie_break {
        metric = metric.with_tie_break(tie_break);
    }

    let intervals = def
        .intervals
        .iter()
        .map(|i| Interval::parse(i))
        .collect::<TopNResult<Vec<_>>>()?;
    let post_aggregators = def
        .post_aggregators
        .iter()
        .map(build_post_aggregator)
        .collect::<TopNResult<Vec<_>>>()?;

    let mut builder = TopNQuery::builder()
        .dimension(dimension)
        .metric(metric)
        .threshold(def.threshold)
        .aggregators(def.aggregators.iter().map(build_aggregator).collect())
        .post_aggregators(post_aggregators)
        .restrict_to_mandatory(def.restrict_to_mandatory)
        .intervals(intervals);
    if let Some(values) = &def.mandatory {
        builder = builder.mandatory_strings(values.clone());
    }
    builder.build()
}

fn build_aggregator(def: &AggregatorDef) -> AggregatorSpec {
    let field = def.field.clone().unwrap_or_default();
    match def.kind.as_str() {
        "longSum" => AggregatorSpec::long_sum(def.name.clone(), field),
        "doubleSum" => AggregatorSpec::double_sum(def.name.clone(), field),
        "count" => AggregatorSpec::count(def.name.clone()),
        "avg" => AggregatorSpec::avg(def.name.clone(), field),
        "countUnique" => AggregatorSpec::count_unique(def.name.clone(), field),
        "longMin" => AggregatorSpec::long_min(def.name.clone(), field),
        "longMax" => AggregatorSpec::long_max(def.name.clone(), field),
        "doubleMin" => AggregatorSpec::double_min(def.name.clone(), field),
        "doubleMax" => AggregatorSpec::double_max(def.name.clone(), field),
        other => panic!("unknown aggregator type '{}'", other),
    }
}

fn build_post_aggregator(def: &PostAggregatorDef) -> TopNResult<PostAggregator> {
    Ok(match def {
        PostAggregatorDef::Arithmetic { name, op, fields } => PostAggregator::arithmetic(
            name.clone(),
            ArithmeticOp::parse(op)?,
            fields
                .iter()
                .map(build_post_aggregator)
                .collect::<TopNResult<Vec<_>>>()?,
        ),
        PostAggregatorDef::FieldAccess { name, field_name } => {
            PostAggregator::field_access(name.clone(), field_name.clone())
        }
        PostAggregatorDef::Constant { name, value } => {
            PostAggregator::constant(name.clone(), *value)
        }
    })
}

fn build_segment(def: &SegmentDef, query: &TopNQuery) -> SegmentResult {
    let interval = match &def.interval {
        Some(raw) => Interval::parse(raw).expect("valid segment interval"),
        None => query.intervals()[0],
    };
    let rows = def
        .rows
        .iter()
        .map(|(dimension, values)| {
            assert_eq!(
                values.len(),
                query.aggregators().len(),
                "segment '{}': one value per aggregator",
                def.id
            );
            let dimension = query
                .dimension()
                .dimension_type
                .parse_value(dimension)
                .expect("dimension value matches dimension type");
            let states = query
                .aggregators()
                .iter()
                .zip(values)
                .map(|(spec, v)| spec.partial(*v))
                .collect();
            PartialRow::new(dimension, states)
        })
        .collect();
    SegmentResult::new(def.id.clone(), interval, rows)
}
