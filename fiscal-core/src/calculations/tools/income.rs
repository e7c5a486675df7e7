//! Personal income tax.
//!
//! # Steps
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Gross income, clamped at 0 |
//! | 2    | Taxable income: gross minus the schedule allowance |
//! | 3    | Household parts (only when the schedule sets `family_quotient`) |
//! | 4    | Bracket tax on taxable income / parts, multiplied back by parts |
//! | 5    | Regional surcharge: taxable income × `regional_surcharge` |
//! | 6    | Schedule surcharge: bracket tax × `surcharge` |
//! | 7    | Total tax, net income, effective and marginal rates |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use fiscal_core::calculations::tools::{IncomeTaxCalculator, IncomeTaxInput};
//! use fiscal_core::{BracketTable, Jurisdiction, ScheduleKey, ScheduleRegistry, TaxSchedule, TaxType};
//!
//! let mut registry = ScheduleRegistry::new();
//! registry.register(TaxSchedule::new(
//!     ScheduleKey::new(Jurisdiction::Italy, TaxType::Income),
//!     BracketTable::flat(dec!(0.23)).unwrap(),
//! ));
//!
//! let input = IncomeTaxInput::new(Jurisdiction::Italy, dec!(20000));
//! let result = IncomeTaxCalculator::new(&registry).calculate(&input).unwrap();
//!
//! assert_eq!(result.total_tax, dec!(4600.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{
    non_negative, ratio_pct, round_half_up, saturating_mul, saturating_sub, saturating_sum,
};
use crate::config::{ScheduleError, ScheduleRegistry};
use crate::models::{Jurisdiction, TaxResult, TaxSchedule, TaxType};

const FAMILY_QUOTIENT: &str = "family_quotient";
const REGIONAL_SURCHARGE: &str = "regional_surcharge";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxInput {
    pub jurisdiction: Jurisdiction,

    /// Annual income subject to tax, after any deductions the caller applies.
    pub gross_income: Decimal,

    /// Number of household parts for family-quotient schedules. `None` or a
    /// value below one counts as one part.
    pub household_parts: Option<Decimal>,

    /// Overrides the schedule's `regional_surcharge` fraction.
    pub regional_surcharge_rate: Option<Decimal>,
}

impl IncomeTaxInput {
    pub fn new(
        jurisdiction: Jurisdiction,
        gross_income: Decimal,
    ) -> Self {
        Self {
            jurisdiction,
            gross_income,
            household_parts: None,
            regional_surcharge_rate: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxResult {
    pub jurisdiction: Jurisdiction,
    pub gross_income: Decimal,
    pub taxable_income: Decimal,
    pub household_parts: Decimal,
    pub brackets: TaxResult,
    pub regional_surcharge: Decimal,
    pub surcharge: Decimal,
    pub total_tax: Decimal,
    pub net_income: Decimal,
    pub effective_rate_pct: Decimal,
    pub marginal_rate: Decimal,
}

#[derive(Debug, Clone)]
pub struct IncomeTaxCalculator<'a> {
    registry: &'a ScheduleRegistry,
}

impl<'a> IncomeTaxCalculator<'a> {
    pub fn new(registry: &'a ScheduleRegistry) -> Self {
        Self { registry }
    }

    /// # Errors
    ///
    /// Returns [`ScheduleError::NotFound`] when the jurisdiction has no
    /// income tax schedule.
    pub fn calculate(
        &self,
        input: &IncomeTaxInput,
    ) -> Result<IncomeTaxResult, ScheduleError> {
        let schedule = self
            .registry
            .lookup(input.jurisdiction, TaxType::Income, None)?;

        let gross_income = non_negative(input.gross_income);
        let taxable_income = non_negative(gross_income - schedule.allowance());
        let parts = self.household_parts(schedule, input.household_parts);

        let brackets = schedule.evaluate(taxable_income / parts).scaled(parts);
        let regional_surcharge =
            self.regional_surcharge(schedule, taxable_income, input.regional_surcharge_rate);
        let surcharge = saturating_mul(brackets.total_tax, schedule.surcharge_rate());

        let total_tax =
            round_half_up(saturating_sum([brackets.total_tax, regional_surcharge, surcharge]));

        Ok(IncomeTaxResult {
            jurisdiction: input.jurisdiction,
            gross_income,
            taxable_income,
            household_parts: parts,
            regional_surcharge: round_half_up(regional_surcharge),
            surcharge: round_half_up(surcharge),
            total_tax,
            net_income: saturating_sub(gross_income, total_tax),
            effective_rate_pct: round_half_up(ratio_pct(total_tax, gross_income)),
            marginal_rate: brackets.marginal_rate(),
            brackets,
        })
    }

    /// Parts only apply when the schedule opts into the family quotient.
    fn household_parts(
        &self,
        schedule: &TaxSchedule,
        requested: Option<Decimal>,
    ) -> Decimal {
        let enabled = schedule
            .parameter(FAMILY_QUOTIENT)
            .is_some_and(|flag| !flag.is_zero());
        match requested {
            Some(parts) if enabled && parts >= Decimal::ONE => parts,
            _ => Decimal::ONE,
        }
    }

    fn regional_surcharge(
        &self,
        schedule: &TaxSchedule,
        taxable_income: Decimal,
        override_rate: Option<Decimal>,
    ) -> Decimal {
        let rate = override_rate
            .or_else(|| schedule.parameter(REGIONAL_SURCHARGE))
            .map(non_negative)
            .unwrap_or_default();
        saturating_mul(taxable_income, rate)
    }
}
