//! Social security contributions on a gross annual salary.
//!
//! Employee and employer contributions are separate bracket tables under the
//! `employee` and `employer` sub-keys. Thresholds (UK National Insurance) and
//! contribution ceilings (German caps) are both expressed as brackets, so the
//! calculator itself only evaluates the two tables.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{non_negative, ratio_pct, round_half_up, saturating_add};
use crate::config::{ScheduleError, ScheduleRegistry};
use crate::models::{Jurisdiction, TaxResult, TaxType};

const EMPLOYEE: &str = "employee";
const EMPLOYER: &str = "employer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollInput {
    pub jurisdiction: Jurisdiction,
    pub gross_salary: Decimal,
}

impl PayrollInput {
    pub fn new(
        jurisdiction: Jurisdiction,
        gross_salary: Decimal,
    ) -> Self {
        Self {
            jurisdiction,
            gross_salary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollResult {
    pub jurisdiction: Jurisdiction,
    pub gross_salary: Decimal,
    pub employee: TaxResult,
    pub employer: TaxResult,
    pub employee_contributions: Decimal,
    pub employer_contributions: Decimal,
    pub net_salary: Decimal,
    pub total_employer_cost: Decimal,
    pub employee_rate_pct: Decimal,
}

#[derive(Debug, Clone)]
pub struct PayrollCalculator<'a> {
    registry: &'a ScheduleRegistry,
}

impl<'a> PayrollCalculator<'a> {
    pub fn new(registry: &'a ScheduleRegistry) -> Self {
        Self { registry }
    }

    /// # Errors
    ///
    /// Returns [`ScheduleError::NotFound`] when either contribution table is
    /// missing for the jurisdiction.
    pub fn calculate(
        &self,
        input: &PayrollInput,
    ) -> Result<PayrollResult, ScheduleError> {
        let employee_schedule =
            self.registry
                .lookup(input.jurisdiction, TaxType::Payroll, Some(EMPLOYEE))?;
        let employer_schedule =
            self.registry
                .lookup(input.jurisdiction, TaxType::Payroll, Some(EMPLOYER))?;

        let gross_salary = non_negative(input.gross_salary);
        let employee = employee_schedule.evaluate(gross_salary);
        let employer = employer_schedule.evaluate(gross_salary);

        let employee_contributions = round_half_up(employee.total_tax);
        let employer_contributions = round_half_up(employer.total_tax);

        Ok(PayrollResult {
            jurisdiction: input.jurisdiction,
            gross_salary,
            employee,
            employer,
            employee_contributions,
            employer_contributions,
            net_salary: gross_salary - employee_contributions,
            total_employer_cost: saturating_add(gross_salary, employer_contributions),
            employee_rate_pct: round_half_up(ratio_pct(employee_contributions, gross_salary)),
        })
    }
}
