//! Landed cost of imported goods.
//!
//! Customs value is CIF (cost + insurance + freight). Duty is charged on the
//! CIF value at the caller's tariff rate unless the goods' cost is within the
//! jurisdiction's `duty_exemption_threshold` (an `import_duty` parameter).
//! Import VAT is charged on CIF + duty at the chosen VAT category's rate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{
    non_negative, pct_to_rate, round_half_up, saturating_add, saturating_mul, saturating_sum,
};
use crate::calculations::tools::vat::{VatCalculator, VatCategory};
use crate::config::{ScheduleError, ScheduleRegistry};
use crate::models::{Jurisdiction, TaxType};

const DUTY_EXEMPTION_THRESHOLD: &str = "duty_exemption_threshold";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDutyInput {
    pub jurisdiction: Jurisdiction,
    pub goods_cost: Decimal,
    pub insurance: Decimal,
    pub freight: Decimal,

    /// Tariff rate in percent, e.g. `12` for 12 %.
    pub duty_rate_pct: Decimal,
    pub vat_category: VatCategory,
}

impl ImportDutyInput {
    pub fn new(
        jurisdiction: Jurisdiction,
        goods_cost: Decimal,
        duty_rate_pct: Decimal,
    ) -> Self {
        Self {
            jurisdiction,
            goods_cost,
            insurance: Decimal::ZERO,
            freight: Decimal::ZERO,
            duty_rate_pct,
            vat_category: VatCategory::Standard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDutyResult {
    pub jurisdiction: Jurisdiction,
    pub cif_value: Decimal,
    pub duty_waived: bool,
    pub customs_duty: Decimal,
    pub vat_rate: Decimal,
    pub import_vat: Decimal,
    pub total_taxes: Decimal,
    pub landed_cost: Decimal,
}

#[derive(Debug, Clone)]
pub struct ImportDutyCalculator<'a> {
    registry: &'a ScheduleRegistry,
}

impl<'a> ImportDutyCalculator<'a> {
    pub fn new(registry: &'a ScheduleRegistry) -> Self {
        Self { registry }
    }

    /// # Errors
    ///
    /// Propagates VAT rate lookup failures from
    /// [`VatCalculator::rate`](crate::calculations::tools::VatCalculator::rate).
    pub fn calculate(
        &self,
        input: &ImportDutyInput,
    ) -> Result<ImportDutyResult, ScheduleError> {
        let goods_cost = non_negative(input.goods_cost);
        let cif_value = saturating_sum([
            goods_cost,
            non_negative(input.insurance),
            non_negative(input.freight),
        ]);

        let duty_waived = self
            .exemption_threshold(input.jurisdiction)
            .is_some_and(|threshold| goods_cost <= threshold);
        let customs_duty = if duty_waived {
            Decimal::ZERO
        } else {
            round_half_up(saturating_mul(
                cif_value,
                pct_to_rate(non_negative(input.duty_rate_pct)),
            ))
        };

        let vat_rate = VatCalculator::new(self.registry).rate(input.jurisdiction, input.vat_category)?;
        let import_vat = round_half_up(saturating_mul(saturating_add(cif_value, customs_duty), vat_rate));
        let total_taxes = saturating_add(customs_duty, import_vat);
        debug!(jurisdiction = %input.jurisdiction, %cif_value, duty_waived, "computed landed cost");

        Ok(ImportDutyResult {
            jurisdiction: input.jurisdiction,
            cif_value,
            duty_waived,
            customs_duty,
            vat_rate,
            import_vat,
            total_taxes,
            landed_cost: saturating_add(cif_value, total_taxes),
        })
    }

    fn exemption_threshold(
        &self,
        jurisdiction: Jurisdiction,
    ) -> Option<Decimal> {
        self.registry
            .lookup(jurisdiction, TaxType::ImportDuty, None)
            .ok()
            .and_then(|schedule| schedule.parameter(DUTY_EXEMPTION_THRESHOLD))
    }
}
