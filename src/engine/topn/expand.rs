use std::collections::HashSet;

use tracing::trace;

use crate::engine::aggregate::spec::AggregatorSpec;
use crate::engine::aggregate::state::AggState;
use crate::engine::errors::{TopNError, TopNResult};
use crate::engine::topn::mandatory::MandatorySet;
use crate::engine::topn::query::TopNQuery;
use crate::engine::topn::row::{PartialRow, Row};
use crate::engine::types::DimensionValue;

/// Completes one segment's partial result with the mandatory values it lacks.
///
/// Identity states are resolved once when the expander is built, so expanding
/// is a pure function of the segment rows and safe to run from many workers.
#[derive(Debug)]
pub struct ZeroFillExpander<'a> {
    aggregators: &'a [AggregatorSpec],
    mandatory: Option<&'a MandatorySet>,
    restrict: bool,
    identity: Vec<AggState>,
}

impl<'a> ZeroFillExpander<'a> {
    pub fn new(
        aggregators: &'a [AggregatorSpec],
        mandatory: Option<&'a MandatorySet>,
        restrict: bool,
    ) -> TopNResult<Self> {
        let identity = match mandatory {
            Some(set) => {
                if set.is_empty() {
                    return Err(TopNError::configuration(
                        "zero-fill requested with an empty mandatory value set",
                    ));
                }
                aggregators
                    .iter()
                    .map(AggregatorSpec::require_identity)
                    .collect::<TopNResult<Vec<_>>>()?
            }
            None => Vec::new(),
        };

        Ok(Self {
            aggregators,
            mandatory,
            restrict: restrict && mandatory.is_some(),
            identity,
        })
    }

    pub fn for_query(query: &'a TopNQuery) -> TopNResult<Self> {
        Self::new(
            query.aggregators(),
            query.mandatory(),
            query.restrict_to_mandatory(),
        )
    }

    /// Real rows first in their original order, then one synthetic row per
    /// missing mandatory value in mandatory-set order. Input is not mutated.
    pub fn expand(&self, rows: &[PartialRow]) -> TopNResult<Vec<Row>> {
        let mut present: HashSet<&DimensionValue> = HashSet::with_capacity(rows.len());
        let mut out = Vec::with_capacity(rows.len() + self.mandatory.map_or(0, |m| m.len()));

        for row in rows {
            self.check_row(row)?;
            if self.restrict && !self.is_mandatory(&row.dimension) {
                continue;
            }
            present.insert(&row.dimension);
            out.push(Row::real(row.dimension.clone(), row.states.clone()));
        }

        if let Some(mandatory) = self.mandatory {
            let mut filled = 0usize;
            for value in mandatory.iter() {
                if !present.contains(value) {
                    out.push(Row::synthetic(value.clone(), self.identity.clone()));
                    filled += 1;
                }
            }
            trace!(
                target: "zftopn::expand",
                real = out.len() - filled,
                filled,
                "Expanded segment rows"
            );
        }

        Ok(out)
    }

    fn is_mandatory(&self, value: &DimensionValue) -> bool {
        self.mandatory.is_some_and(|m| m.contains(value))
    }

    fn check_row(&self, row: &PartialRow) -> TopNResult<()> {
        if row.states.len() != self.aggregators.len() {
            return Err(TopNError::aggregation_type(format!(
                "row '{}' carries {} aggregate states, query defines {}",
                row.dimension,
                row.states.len(),
                self.aggregators.len()
            )));
        }
        for (spec, state) in self.aggregators.iter().zip(row.states.iter()) {
            spec.check_state(state)?;
        }
        Ok(())
    }
}

/// One-shot form of [`ZeroFillExpander::expand`].
pub fn expand(
    rows: &[PartialRow],
    mandatory: &MandatorySet,
    aggregators: &[AggregatorSpec],
) -> TopNResult<Vec<Row>> {
    ZeroFillExpander::new(aggregators, Some(mandatory), false)?.expand(rows)
}
