//! Public-finance projections built on [`Projector::project_multi`].
//!
//! Only the base series (revenue, spending, GDP, debt) are compounded. The
//! deficit and the GDP ratios are recomputed from those series every year.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Projector;
use crate::calculations::common::{ratio_pct, round_half_up, saturating_sub, saturating_sum};
use crate::models::{SeriesPoint, SeriesSpec};

const REVENUE: &str = "revenue";
const SPENDING: &str = "spending";
const GDP: &str = "gdp";
const DEBT: &str = "debt";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeficitProjectionInput {
    pub revenue: SeriesSpec,
    pub spending: SeriesSpec,

    /// When present, each year also reports the deficit as a share of GDP.
    pub gdp: Option<SeriesSpec>,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeficitYear {
    pub year_index: u32,
    pub year_label: i32,
    pub revenue: Decimal,
    pub spending: Decimal,

    /// Spending minus revenue; negative values are surpluses. Saturates at
    /// the `Decimal` extremes.
    pub deficit: Decimal,
    pub gdp: Option<Decimal>,

    /// Deficit / GDP × 100, or 0 when GDP is zero.
    pub deficit_to_gdp_pct: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeficitProjection {
    pub years: Vec<DeficitYear>,

    /// Sum of the deficits of the projected years (year 0 excluded).
    pub cumulative_deficit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtProjectionInput {
    pub debt: SeriesSpec,
    pub gdp: SeriesSpec,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtYear {
    pub year_index: u32,
    pub year_label: i32,
    pub debt: Decimal,
    pub gdp: Decimal,
    pub debt_to_gdp_pct: Decimal,
}

/// Projects revenue and spending (and optionally GDP) and derives the
/// deficit for every year.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use fiscal_core::calculations::tools::{DeficitProjectionInput, project_deficit};
/// use fiscal_core::{Projector, SeriesSpec};
///
/// let input = DeficitProjectionInput {
///     revenue: SeriesSpec::compound(dec!(100), dec!(0)),
///     spending: SeriesSpec::compound(dec!(110), dec!(0)),
///     gdp: Some(SeriesSpec::compound(dec!(0), dec!(2))),
///     years: 2,
/// };
///
/// let projection = project_deficit(&Projector::new(2025), &input);
///
/// assert_eq!(projection.cumulative_deficit, dec!(20));
/// assert_eq!(projection.years[1].deficit_to_gdp_pct, Some(dec!(0)));
/// ```
pub fn project_deficit(
    projector: &Projector,
    input: &DeficitProjectionInput,
) -> DeficitProjection {
    let mut series = BTreeMap::from([
        (REVENUE.to_string(), input.revenue.clone()),
        (SPENDING.to_string(), input.spending.clone()),
    ]);
    if let Some(gdp) = &input.gdp {
        series.insert(GDP.to_string(), gdp.clone());
    }

    let years: Vec<DeficitYear> = projector
        .project_multi(&series, input.years)
        .iter()
        .map(|point| deficit_year(point, input.gdp.is_some()))
        .collect();
    let cumulative_deficit = saturating_sum(years.iter().skip(1).map(|year| year.deficit));

    DeficitProjection {
        years,
        cumulative_deficit,
    }
}

fn deficit_year(
    point: &SeriesPoint,
    with_gdp: bool,
) -> DeficitYear {
    let revenue = point.value(REVENUE);
    let spending = point.value(SPENDING);
    let deficit = saturating_sub(spending, revenue);
    let gdp = with_gdp.then(|| point.value(GDP));

    DeficitYear {
        year_index: point.year_index,
        year_label: point.year_label,
        revenue,
        spending,
        deficit,
        gdp,
        deficit_to_gdp_pct: gdp.map(|gdp| round_half_up(ratio_pct(deficit, gdp))),
    }
}

/// Projects debt and GDP side by side and derives the debt-to-GDP ratio.
pub fn project_debt(
    projector: &Projector,
    input: &DebtProjectionInput,
) -> Vec<DebtYear> {
    let series = BTreeMap::from([
        (DEBT.to_string(), input.debt.clone()),
        (GDP.to_string(), input.gdp.clone()),
    ]);

    projector
        .project_multi(&series, input.years)
        .iter()
        .map(|point| {
            let debt = point.value(DEBT);
            let gdp = point.value(GDP);
            DebtYear {
                year_index: point.year_index,
                year_label: point.year_label,
                debt,
                gdp,
                debt_to_gdp_pct: round_half_up(ratio_pct(debt, gdp)),
            }
        })
        .collect()
}
