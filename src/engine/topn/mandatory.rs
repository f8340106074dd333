use ahash::RandomState;
use indexmap::IndexSet;

use crate::engine::errors::{TopNError, TopNResult};
use crate::engine::types::{DimensionType, DimensionValue};

/// Dimension values that must appear in every result bucket.
///
/// Never empty. Iteration follows first insertion, which is also the order in
/// which missing values are zero-filled.
#[derive(Debug, Clone)]
pub struct MandatorySet {
    values: IndexSet<DimensionValue, RandomState>,
}

impl MandatorySet {
    pub fn new<I>(values: I) -> TopNResult<Self>
    where
        I: IntoIterator<Item = DimensionValue>,
    {
        let values: IndexSet<DimensionValue, RandomState> = values.into_iter().collect();
        if values.is_empty() {
            return Err(TopNError::configuration(
                "zero-fill requested with an empty mandatory value set",
            ));
        }
        Ok(Self { values })
    }

    /// Builds the set from textual values, converting each one to the
    /// dimension's natural representation.
    pub fn parse<I, S>(raw: I, dimension_type: DimensionType) -> TopNResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = Vec::new();
        for item in raw {
            let item = item.as_ref();
            let value = dimension_type.parse_value(item).ok_or_else(|| {
                TopNError::Configuration(format!(
                    "mandatory value '{}' is not a valid {} dimension value",
                    item, dimension_type
                ))
            })?;
            values.push(value);
        }
        Self::new(values)
    }

    /// Rejects values whose representation differs from the dimension's.
    pub fn check_type(&self, dimension_type: DimensionType) -> TopNResult<()> {
        for value in &self.values {
            if let Some(t) = value.dimension_type() {
                if t != dimension_type {
                    return Err(TopNError::Configuration(format!(
                        "mandatory value '{}' is {} but the dimension is {}",
                        value, t, dimension_type
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn contains(&self, value: &DimensionValue) -> bool {
        self.values.contains(value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DimensionValue> {
        self.values.iter()
    }
}
