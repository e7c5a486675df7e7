//! Multi-year projection of one or more growing quantities.
//!
//! Year 0 is the unprojected starting value. Each later year is derived from
//! the previous one, either by compounding a percentage or by adding a fixed
//! delta. Multi-series projections step every series independently; callers
//! derive combined figures (deficits, ratios) from the base series afterwards.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use fiscal_core::Projector;
//!
//! let points = Projector::new(2025).project(dec!(1000), dec!(10), 2);
//!
//! assert_eq!(points.len(), 3);
//! assert_eq!(points[2].year_label, 2027);
//! assert_eq!(points[2].value, dec!(1210));
//! ```

use std::collections::BTreeMap;

use chrono::{Datelike, Local};
use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{pct_to_rate, saturating_add, saturating_mul};
use crate::models::{Growth, ProjectionPoint, SeriesPoint, SeriesSpec};

/// Produces year-by-year projections labelled from a base calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projector {
    base_year: i32,
}

impl Projector {
    pub fn new(base_year: i32) -> Self {
        Self { base_year }
    }

    /// A projector whose year 0 is the current local calendar year.
    pub fn current() -> Self {
        Self::new(Local::now().year())
    }

    pub fn base_year(&self) -> i32 {
        self.base_year
    }

    /// Compounds `start` by `rate_pct` percent per year for `years` years.
    pub fn project(
        &self,
        start: Decimal,
        rate_pct: Decimal,
        years: u32,
    ) -> Vec<ProjectionPoint> {
        self.project_with(start, &Growth::Compound(rate_pct), years)
    }

    /// Projects a single series under any [`Growth`] rule.
    pub fn project_with(
        &self,
        start: Decimal,
        growth: &Growth,
        years: u32,
    ) -> Vec<ProjectionPoint> {
        let mut points = Vec::with_capacity(years as usize + 1);
        let mut value = start;

        for year_index in 0..=years {
            if year_index > 0 {
                value = step(value, growth, year_index);
            }
            points.push(ProjectionPoint {
                year_index,
                year_label: self.year_label(year_index),
                value,
            });
        }

        debug!(%start, years, final_value = %value, "projected series");
        points
    }

    /// Projects several named series side by side.
    ///
    /// Every series evolves under its own growth rule; no series is derived
    /// from another.
    pub fn project_multi(
        &self,
        series: &BTreeMap<String, SeriesSpec>,
        years: u32,
    ) -> Vec<SeriesPoint> {
        let mut points = Vec::with_capacity(years as usize + 1);
        let mut values: BTreeMap<String, Decimal> = series
            .iter()
            .map(|(name, spec)| (name.clone(), spec.start))
            .collect();

        for year_index in 0..=years {
            if year_index > 0 {
                for (name, spec) in series {
                    if let Some(value) = values.get_mut(name) {
                        *value = step(*value, &spec.growth, year_index);
                    }
                }
            }
            points.push(SeriesPoint {
                year_index,
                year_label: self.year_label(year_index),
                values: values.clone(),
            });
        }

        debug!(series = series.len(), years, "projected multiple series");
        points
    }

    fn year_label(
        &self,
        year_index: u32,
    ) -> i32 {
        self.base_year
            .saturating_add(i32::try_from(year_index).unwrap_or(i32::MAX))
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::current()
    }
}

/// Advances `previous` by one year.
///
/// Results that do not fit in a [`Decimal`] saturate at the representable
/// extreme with the sign of the true result.
fn step(
    previous: Decimal,
    growth: &Growth,
    year_index: u32,
) -> Decimal {
    match growth.rate_pct_for(year_index) {
        Some(pct) => saturating_mul(previous, Decimal::ONE + pct_to_rate(pct)),
        None => match growth {
            Growth::Linear(delta) => saturating_add(previous, *delta),
            _ => previous,
        },
    }
}
