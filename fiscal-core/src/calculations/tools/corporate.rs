//! Corporate income tax.
//!
//! # Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Select the regime (sub-key) from turnover, profit and company age |
//! | 2    | Bracket tax on taxable profit |
//! | 3    | Marginal relief between `lower_limit` and `upper_limit` |
//! | 4    | Surcharge: tax after relief × `surcharge` |
//! | 5    | Regional tax: profit × `regional_tax` (overridable) |
//! | 6    | Trade tax: profit × `trade_tax_base_rate` × municipal multiplier |
//! | 7    | Total tax and profit after tax |
//!
//! Regime selection, in order:
//!
//! 1. `startup` when the company is newly formed and the schedule exists.
//! 2. `small` when profit is at or below the `main` schedule's `lower_limit`.
//! 3. `main` when a `main` schedule exists.
//! 4. `sme` when turnover is at or below its `sme_turnover_limit`.
//! 5. `standard`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{
    non_negative, ratio_pct, round_half_up, saturating_mul, saturating_sub, saturating_sum,
};
use crate::config::{ScheduleError, ScheduleRegistry};
use crate::models::{Jurisdiction, ScheduleKey, TaxResult, TaxSchedule, TaxType};

const SME_TURNOVER_LIMIT: &str = "sme_turnover_limit";
const LOWER_LIMIT: &str = "lower_limit";
const UPPER_LIMIT: &str = "upper_limit";
const MARGINAL_RELIEF_FRACTION: &str = "marginal_relief_fraction";
const REGIONAL_TAX: &str = "regional_tax";
const TRADE_TAX_BASE_RATE: &str = "trade_tax_base_rate";
const MUNICIPAL_MULTIPLIER: &str = "municipal_multiplier";

const STARTUP: &str = "startup";
const SMALL: &str = "small";
const MAIN: &str = "main";
const SME: &str = "sme";
const STANDARD: &str = "standard";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporateTaxInput {
    pub jurisdiction: Jurisdiction,
    pub taxable_profit: Decimal,
    pub turnover: Decimal,
    pub newly_formed: bool,

    /// Overrides the schedule's `municipal_multiplier` (e.g. `4.00` for 400 %).
    pub municipal_multiplier: Option<Decimal>,

    /// Overrides the schedule's `regional_tax` fraction.
    pub regional_tax_rate: Option<Decimal>,
}

impl CorporateTaxInput {
    pub fn new(
        jurisdiction: Jurisdiction,
        taxable_profit: Decimal,
    ) -> Self {
        Self {
            jurisdiction,
            taxable_profit,
            turnover: Decimal::ZERO,
            newly_formed: false,
            municipal_multiplier: None,
            regional_tax_rate: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorporateTaxResult {
    pub jurisdiction: Jurisdiction,
    pub regime: String,
    pub taxable_profit: Decimal,
    pub brackets: TaxResult,
    pub marginal_relief: Decimal,
    pub surcharge: Decimal,
    pub regional_tax: Decimal,
    pub trade_tax: Decimal,
    pub total_tax: Decimal,
    pub profit_after_tax: Decimal,
    pub effective_rate_pct: Decimal,
}

#[derive(Debug, Clone)]
pub struct CorporateTaxCalculator<'a> {
    registry: &'a ScheduleRegistry,
}

impl<'a> CorporateTaxCalculator<'a> {
    pub fn new(registry: &'a ScheduleRegistry) -> Self {
        Self { registry }
    }

    /// # Errors
    ///
    /// Returns [`ScheduleError::NotFound`] when the jurisdiction has no
    /// matching corporate schedule, or [`ScheduleError::MissingParameter`]
    /// when a `main` schedule lacks its relief limits.
    pub fn calculate(
        &self,
        input: &CorporateTaxInput,
    ) -> Result<CorporateTaxResult, ScheduleError> {
        let taxable_profit = non_negative(input.taxable_profit);
        let schedule = self.select_schedule(input, taxable_profit)?;
        debug!(key = %schedule.key, %taxable_profit, "selected corporate regime");

        let brackets = schedule.evaluate(taxable_profit);
        let marginal_relief = self.marginal_relief(schedule, taxable_profit, brackets.total_tax)?;
        let tax_after_relief = brackets.total_tax - marginal_relief;
        let surcharge = saturating_mul(tax_after_relief, schedule.surcharge_rate());
        let regional_tax = self.regional_tax(schedule, taxable_profit, input.regional_tax_rate);
        let trade_tax = self.trade_tax(schedule, taxable_profit, input.municipal_multiplier);

        let total_tax =
            round_half_up(saturating_sum([tax_after_relief, surcharge, regional_tax, trade_tax]));

        Ok(CorporateTaxResult {
            jurisdiction: input.jurisdiction,
            regime: schedule.key.sub_key.clone().unwrap_or_default(),
            taxable_profit,
            brackets,
            marginal_relief: round_half_up(marginal_relief),
            surcharge: round_half_up(surcharge),
            regional_tax: round_half_up(regional_tax),
            trade_tax: round_half_up(trade_tax),
            total_tax,
            profit_after_tax: saturating_sub(taxable_profit, total_tax),
            effective_rate_pct: round_half_up(ratio_pct(total_tax, taxable_profit)),
        })
    }

    fn select_schedule(
        &self,
        input: &CorporateTaxInput,
        taxable_profit: Decimal,
    ) -> Result<&'a TaxSchedule, ScheduleError> {
        let find = |sub_key: &str| {
            self.registry
                .get(&ScheduleKey::with_sub_key(
                    input.jurisdiction,
                    TaxType::Corporate,
                    sub_key,
                ))
                .ok()
        };

        if input.newly_formed {
            if let Some(startup) = find(STARTUP) {
                return Ok(startup);
            }
        }

        if let Some(main) = find(MAIN) {
            let lower_limit = main.require(LOWER_LIMIT)?;
            if taxable_profit <= lower_limit {
                if let Some(small) = find(SMALL) {
                    return Ok(small);
                }
            }
            return Ok(main);
        }

        if let Some(sme) = find(SME) {
            let within_limit = sme
                .parameter(SME_TURNOVER_LIMIT)
                .is_none_or(|limit| non_negative(input.turnover) <= limit);
            if within_limit {
                return Ok(sme);
            }
        }

        self.registry.lookup(
            input.jurisdiction,
            TaxType::Corporate,
            Some(STANDARD),
        )
    }

    /// Relief = fraction × (upper limit − profit) for profits strictly
    /// between the limits, capped at the tax itself.
    fn marginal_relief(
        &self,
        schedule: &TaxSchedule,
        taxable_profit: Decimal,
        tax: Decimal,
    ) -> Result<Decimal, ScheduleError> {
        let Some(fraction) = schedule.parameter(MARGINAL_RELIEF_FRACTION) else {
            return Ok(Decimal::ZERO);
        };
        let lower_limit = schedule.require(LOWER_LIMIT)?;
        let upper_limit = schedule.require(UPPER_LIMIT)?;

        if taxable_profit <= lower_limit || taxable_profit >= upper_limit {
            return Ok(Decimal::ZERO);
        }
        Ok((fraction * (upper_limit - taxable_profit)).min(tax))
    }

    fn regional_tax(
        &self,
        schedule: &TaxSchedule,
        taxable_profit: Decimal,
        override_rate: Option<Decimal>,
    ) -> Decimal {
        override_rate
            .or_else(|| schedule.parameter(REGIONAL_TAX))
            .map(|rate| saturating_mul(taxable_profit, non_negative(rate)))
            .unwrap_or_default()
    }

    fn trade_tax(
        &self,
        schedule: &TaxSchedule,
        taxable_profit: Decimal,
        override_multiplier: Option<Decimal>,
    ) -> Decimal {
        let Some(base_rate) = schedule.parameter(TRADE_TAX_BASE_RATE) else {
            return Decimal::ZERO;
        };
        let multiplier = override_multiplier
            .or_else(|| schedule.parameter(MUNICIPAL_MULTIPLIER))
            .map(non_negative)
            .unwrap_or(Decimal::ONE);
        saturating_mul(saturating_mul(taxable_profit, base_rate), multiplier)
    }
}
