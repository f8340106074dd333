use crate::engine::aggregate::spec::AggregatorSpec;
use crate::engine::aggregate::state::AggState;
use crate::engine::types::DimensionValue;
use crate::test_helpers::factories::SegmentFactory;
use crate::test_helpers::factories::segment_factory::FIXTURE_ROWS;

#[test]
fn builds_fixture_rows_for_each_aggregator() {
    let segment = SegmentFactory::new("seg-a")
        .with_aggregators(vec![
            AggregatorSpec::long_sum("impressions", "impressions"),
            AggregatorSpec::double_sum("clicks", "clicks"),
        ])
        .with_fixture_rows()
        .create();

    assert_eq!(segment.segment_id, "seg-a");
    assert_eq!(segment.rows.len(), FIXTURE_ROWS.len());
    let first = &segment.rows[0];
    assert_eq!(first.dimension, DimensionValue::from("8"));
    assert_eq!(
        first.states,
        vec![AggState::long_sum(91), AggState::double_sum(9.0)]
    );
}

#[test]
#[should_panic(expected = "one value per aggregator")]
fn add_row_requires_one_value_per_aggregator() {
    let _ = SegmentFactory::new("seg-b").add_row("1", &[1, 2]);
}
