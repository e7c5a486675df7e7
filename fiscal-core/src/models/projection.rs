use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a projected series moves from one year to the next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Growth {
    /// The same annual percentage every year.
    Compound(Decimal),

    /// Explicit annual percentages, one per projected year. Years past the
    /// end of the sequence reuse the last rate; an empty sequence is 0 %.
    Schedule(Vec<Decimal>),

    /// A fixed amount added every year.
    Linear(Decimal),
}

impl Growth {
    /// The percentage applied when stepping into `year_index` (1-based).
    /// `None` for linear growth.
    pub fn rate_pct_for(
        &self,
        year_index: u32,
    ) -> Option<Decimal> {
        match self {
            Self::Compound(pct) => Some(*pct),
            Self::Schedule(rates) => {
                let position = (year_index as usize).saturating_sub(1);
                Some(
                    rates
                        .get(position)
                        .or_else(|| rates.last())
                        .copied()
                        .unwrap_or_default(),
                )
            }
            Self::Linear(_) => None,
        }
    }
}

/// Starting value and growth of one named series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub start: Decimal,
    pub growth: Growth,
}

impl SeriesSpec {
    pub fn compound(
        start: Decimal,
        rate_pct: Decimal,
    ) -> Self {
        Self {
            start,
            growth: Growth::Compound(rate_pct),
        }
    }
}

/// One year of a single-series projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub year_index: u32,
    pub year_label: i32,
    pub value: Decimal,
}

/// One year of a multi-series projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub year_index: u32,
    pub year_label: i32,
    pub values: BTreeMap<String, Decimal>,
}

impl SeriesPoint {
    /// Value of `series` for this year, 0 if the series is unknown.
    pub fn value(
        &self,
        series: &str,
    ) -> Decimal {
        self.values.get(series).copied().unwrap_or_default()
    }
}
