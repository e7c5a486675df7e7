//! Municipal property tax.
//!
//! Base = cadastral value × `revaluation` × `multiplier` (both default to 1).
//! Rate = the caller's municipal rate when given, otherwise the schedule
//! table, which normally holds a single flat `default_rate`. A main residence
//! uses the `main_residence` sub-key when the jurisdiction defines one; a
//! rate-0 table there makes it exempt.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{
    non_negative, pct_to_rate, ratio_pct, round_half_up, saturating_mul,
};
use crate::config::{ScheduleError, ScheduleRegistry};
use crate::models::{Jurisdiction, TaxSchedule, TaxType};

const REVALUATION: &str = "revaluation";
const MULTIPLIER: &str = "multiplier";
const MAIN_RESIDENCE: &str = "main_residence";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalTaxInput {
    pub jurisdiction: Jurisdiction,
    pub cadastral_value: Decimal,

    /// Municipal rate in percent; replaces the schedule's default rate.
    pub rate_pct: Option<Decimal>,
    pub main_residence: bool,
}

impl MunicipalTaxInput {
    pub fn new(
        jurisdiction: Jurisdiction,
        cadastral_value: Decimal,
    ) -> Self {
        Self {
            jurisdiction,
            cadastral_value,
            rate_pct: None,
            main_residence: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalTaxResult {
    pub jurisdiction: Jurisdiction,
    pub cadastral_value: Decimal,
    pub taxable_base: Decimal,
    pub main_residence_exempt: bool,
    pub total_tax: Decimal,
    pub effective_rate_pct: Decimal,
}

#[derive(Debug, Clone)]
pub struct MunicipalTaxCalculator<'a> {
    registry: &'a ScheduleRegistry,
}

impl<'a> MunicipalTaxCalculator<'a> {
    pub fn new(registry: &'a ScheduleRegistry) -> Self {
        Self { registry }
    }

    /// # Errors
    ///
    /// Returns [`ScheduleError::NotFound`] when the jurisdiction has no
    /// municipal schedule.
    pub fn calculate(
        &self,
        input: &MunicipalTaxInput,
    ) -> Result<MunicipalTaxResult, ScheduleError> {
        let base_schedule = self
            .registry
            .lookup(input.jurisdiction, TaxType::Municipal, None)?;
        let residence_schedule = input
            .main_residence
            .then(|| {
                self.registry
                    .lookup(input.jurisdiction, TaxType::Municipal, Some(MAIN_RESIDENCE))
                    .ok()
            })
            .flatten();
        let main_residence_exempt =
            residence_schedule.is_some_and(|schedule| schedule.table.flat_rate() == Some(Decimal::ZERO));

        let cadastral_value = non_negative(input.cadastral_value);
        let taxable_base = round_half_up(
            saturating_mul(
                saturating_mul(cadastral_value, factor(base_schedule, REVALUATION)),
                factor(base_schedule, MULTIPLIER),
            ),
        );

        let total_tax = match (residence_schedule, input.rate_pct) {
            (Some(schedule), _) => schedule.evaluate(taxable_base).total_tax,
            (None, Some(pct)) => saturating_mul(taxable_base, pct_to_rate(non_negative(pct))),
            (None, None) => base_schedule.evaluate(taxable_base).total_tax,
        };
        let total_tax = round_half_up(total_tax);

        Ok(MunicipalTaxResult {
            jurisdiction: input.jurisdiction,
            cadastral_value,
            taxable_base,
            main_residence_exempt,
            total_tax,
            effective_rate_pct: round_half_up(ratio_pct(total_tax, cadastral_value)),
        })
    }
}

fn factor(
    schedule: &TaxSchedule,
    name: &str,
) -> Decimal {
    schedule.parameter(name).unwrap_or(Decimal::ONE)
}
