//! Capital gains tax on a single disposal.
//!
//! Gain = sale price − purchase price − expenses, each clamped at zero
//! first. A loss is never taxed.
//!
//! Schedule selection:
//!
//! * A jurisdiction with `basic` / `higher` schedules picks by the
//!   taxpayer's band.
//! * Otherwise the asset class picks the sub-key (`standard`,
//!   `government_bonds`, `real_estate`), falling back to `standard` when the
//!   jurisdiction has no dedicated schedule for that class.
//! * A schedule with `exemption_years` switches to the `exempt` sub-key once
//!   the asset was held at least that long.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{
    non_negative, ratio_pct, round_half_up, saturating_mul, saturating_sub,
};
use crate::config::{ScheduleError, ScheduleRegistry};
use crate::models::{Jurisdiction, ScheduleKey, TaxResult, TaxSchedule, TaxType};

const EXEMPTION_YEARS: &str = "exemption_years";

const STANDARD: &str = "standard";
const EXEMPT: &str = "exempt";
const BASIC_BAND: &str = "basic";
const HIGHER_BAND: &str = "higher";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    #[default]
    Securities,
    GovernmentBonds,
    RealEstate,
}

impl AssetClass {
    /// Sub-key of the schedule dedicated to this class.
    pub fn sub_key(&self) -> &'static str {
        match self {
            Self::Securities => STANDARD,
            Self::GovernmentBonds => "government_bonds",
            Self::RealEstate => "real_estate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "securities" | "shares" | "standard" => Some(Self::Securities),
            "government_bonds" | "bonds" => Some(Self::GovernmentBonds),
            "real_estate" | "property" => Some(Self::RealEstate),
            _ => None,
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.sub_key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainsInput {
    pub jurisdiction: Jurisdiction,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub expenses: Decimal,
    pub asset_class: AssetClass,
    pub holding_years: Decimal,
    pub higher_rate_taxpayer: bool,
}

impl CapitalGainsInput {
    pub fn new(
        jurisdiction: Jurisdiction,
        purchase_price: Decimal,
        sale_price: Decimal,
        expenses: Decimal,
    ) -> Self {
        Self {
            jurisdiction,
            purchase_price,
            sale_price,
            expenses,
            asset_class: AssetClass::default(),
            holding_years: Decimal::ZERO,
            higher_rate_taxpayer: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalGainsResult {
    pub jurisdiction: Jurisdiction,
    /// Sub-key of the schedule that was applied.
    pub regime: String,
    pub capital_gain: Decimal,
    pub allowance_applied: Decimal,
    pub taxable_gain: Decimal,
    pub brackets: TaxResult,
    pub surcharge: Decimal,
    pub total_tax: Decimal,
    pub net_gain: Decimal,
    pub effective_rate_pct: Decimal,
}

#[derive(Debug, Clone)]
pub struct CapitalGainsCalculator<'a> {
    registry: &'a ScheduleRegistry,
}

impl<'a> CapitalGainsCalculator<'a> {
    pub fn new(registry: &'a ScheduleRegistry) -> Self {
        Self { registry }
    }

    /// # Errors
    ///
    /// Returns [`ScheduleError::NotFound`] when no schedule matches the
    /// jurisdiction and asset class, including the `standard` fallback.
    pub fn calculate(
        &self,
        input: &CapitalGainsInput,
    ) -> Result<CapitalGainsResult, ScheduleError> {
        let schedule = self.select_schedule(input)?;

        let capital_gain = saturating_sub(
            non_negative(input.sale_price) - non_negative(input.purchase_price),
            non_negative(input.expenses),
        );
        let allowance_applied = schedule.allowance().min(non_negative(capital_gain));
        let taxable_gain = non_negative(capital_gain - allowance_applied);

        let brackets = schedule.evaluate(taxable_gain);
        let surcharge = saturating_mul(brackets.total_tax, schedule.surcharge_rate());
        let total_tax = round_half_up(brackets.total_tax + surcharge);

        Ok(CapitalGainsResult {
            jurisdiction: input.jurisdiction,
            regime: schedule.key.sub_key.clone().unwrap_or_default(),
            capital_gain,
            allowance_applied,
            taxable_gain,
            brackets,
            surcharge: round_half_up(surcharge),
            total_tax,
            net_gain: capital_gain - total_tax,
            effective_rate_pct: round_half_up(ratio_pct(total_tax, non_negative(capital_gain))),
        })
    }

    fn select_schedule(
        &self,
        input: &CapitalGainsInput,
    ) -> Result<&'a TaxSchedule, ScheduleError> {
        let key = |sub_key: &str| {
            ScheduleKey::with_sub_key(input.jurisdiction, TaxType::CapitalGains, sub_key)
        };

        let banded = key(BASIC_BAND);
        if self.registry.contains(&banded) {
            let band = if input.higher_rate_taxpayer {
                HIGHER_BAND
            } else {
                BASIC_BAND
            };
            return self.registry.get(&key(band));
        }

        let dedicated = key(input.asset_class.sub_key());
        let schedule = if self.registry.contains(&dedicated) {
            self.registry.get(&dedicated)?
        } else {
            self.registry.get(&key(STANDARD))?
        };

        match schedule.parameter(EXEMPTION_YEARS) {
            Some(years) if input.holding_years >= years => self.registry.get(&key(EXEMPT)),
            _ => Ok(schedule),
        }
    }
}
