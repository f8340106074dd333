use serde::Deserialize;
use std::fs;
use zero_filled_topn::TieBreak;

#[derive(Debug, Deserialize)]
pub struct TestScenario {
    pub name: String,
    pub query: QueryDef,
    #[serde(default)]
    pub segments: Vec<SegmentDef>,
    /// Expected `result` array of every bucket, in interval order
    pub expect: Option<Vec<serde_json::Value>>,
    /// `configuration` or `aggregation_type`
    pub expect_error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueryDef {
    pub dimension: String,
    pub output_name: Option<String>,
    #[serde(default = "default_dimension_type")]
    pub dimension_type: String,
    pub metric: String,
    #[serde(default)]
    pub inverted: bool,
    pub tie_break: Option<TieBreak>,
    pub threshold: i64,
    pub aggregators: Vec<AggregatorDef>,
    #[serde(default)]
    pub post_aggregators: Vec<PostAggregatorDef>,
    pub mandatory: Option<Vec<String>>,
    #[serde(default)]
    pub restrict_to_mandatory: bool,
    pub intervals: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AggregatorDef {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub field: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PostAggregatorDef {
    Arithmetic {
        name: String,
        #[serde(rename = "fn")]
        op: String,
        fields: Vec<PostAggregatorDef>,
    },
    FieldAccess {
        name: String,
        #[serde(rename = "fieldName")]
        field_name: String,
    },
    Constant {
        name: String,
        value: f64,
    },
}

#[derive(Debug, Deserialize)]
pub struct SegmentDef {
    pub id: String,
    /// Defaults to the first query interval
    pub interval: Option<String>,
    /// `[dimension, [one value per aggregator]]`
    pub rows: Vec<(String, Vec<i64>)>,
}

fn default_dimension_type() -> String {
    "string".to_string()
}

pub fn load_scenarios_from_json(path: &str) -> Vec<TestScenario> {
    let content = fs::read_to_string(path).expect("Failed to read scenario file");
    serde_json::from_str(&content).expect("Invalid JSON format")
}
