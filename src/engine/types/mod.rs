use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::engine::errors::TopNError;

/// Natural representation of a grouping dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionType {
    Long,
    String,
}

impl DimensionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionType::Long => "Long",
            DimensionType::String => "String",
        }
    }

    /// Parses a textual value into this dimension's representation.
    pub fn parse_value(&self, raw: &str) -> Option<DimensionValue> {
        match self {
            DimensionType::Long => raw.trim().parse::<i64>().ok().map(DimensionValue::Long),
            DimensionType::String => Some(DimensionValue::Utf8(raw.to_string())),
        }
    }
}

impl fmt::Display for DimensionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DimensionType {
    type Err = TopNError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "long" | "integer" => Ok(DimensionType::Long),
            "string" | "utf8" => Ok(DimensionType::String),
            other => Err(TopNError::Configuration(format!(
                "unknown dimension type '{}'",
                other
            ))),
        }
    }
}

/// Identifies one group of a top-N query.
///
/// Ordering is total: `Null` sorts first, then longs, then strings, so it can
/// serve as a deterministic tie-break.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DimensionValue {
    Null,
    Long(i64),
    Utf8(String),
}

impl DimensionValue {
    pub fn dimension_type(&self) -> Option<DimensionType> {
        match self {
            DimensionValue::Null => None,
            DimensionValue::Long(_) => Some(DimensionType::Long),
            DimensionValue::Utf8(_) => Some(DimensionType::String),
        }
    }
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionValue::Null => f.write_str("null"),
            DimensionValue::Long(i) => write!(f, "{}", i),
            DimensionValue::Utf8(s) => f.write_str(s),
        }
    }
}

impl From<&str> for DimensionValue {
    fn from(value: &str) -> Self {
        DimensionValue::Utf8(value.to_string())
    }
}

impl From<String> for DimensionValue {
    fn from(value: String) -> Self {
        DimensionValue::Utf8(value)
    }
}

impl From<i64> for DimensionValue {
    fn from(value: i64) -> Self {
        DimensionValue::Long(value)
    }
}

impl Serialize for DimensionValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            DimensionValue::Null => serializer.serialize_unit(),
            DimensionValue::Long(i) => serializer.serialize_i64(*i),
            DimensionValue::Utf8(s) => serializer.serialize_str(s),
        }
    }
}

/// Finalized output of an aggregator or post-aggregator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Null,
    Long(i64),
    Double(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Null => None,
            MetricValue::Long(i) => Some(*i as f64),
            MetricValue::Double(f) => Some(*f),
        }
    }

    /// Total order used for ranking. `Null` sorts below every number and
    /// doubles use IEEE total ordering so NaN cannot poison a sort.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (MetricValue::Long(a), MetricValue::Long(b)) => a.cmp(b),
            (MetricValue::Null, MetricValue::Null) => Ordering::Equal,
            (MetricValue::Null, _) => Ordering::Less,
            (_, MetricValue::Null) => Ordering::Greater,
            (a, b) => {
                let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) else {
                    return Ordering::Equal;
                };
                x.total_cmp(&y)
            }
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Null => f.write_str("null"),
            MetricValue::Long(i) => write!(f, "{}", i),
            MetricValue::Double(d) => write!(f, "{:?}", d),
        }
    }
}

impl Serialize for MetricValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            MetricValue::Null => serializer.serialize_unit(),
            MetricValue::Long(i) => serializer.serialize_i64(*i),
            MetricValue::Double(f) => serializer.serialize_f64(*f),
        }
    }
}
