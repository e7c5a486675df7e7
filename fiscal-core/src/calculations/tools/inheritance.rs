//! Inheritance tax owed by a single heir.
//!
//! The relationship between the deceased and the heir selects the schedule
//! (sub-key). Spouses are typically configured with a zero-rate table, so the
//! calculator never special-cases them.
//!
//! Allowance rules, all driven by schedule parameters:
//!
//! * `allowance`: tax-free amount for the relationship.
//! * `disability_allowance`: added to the allowance for a disabled heir.
//! * `disabled_heir_allowance`: floor for a disabled heir's allowance.
//! * `residence_allowance`: added when a main residence passes to the heir.
//! * Prior gifts from the same donor use up the allowance, never below 0.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{max, non_negative, ratio_pct, round_half_up};
use crate::config::{ScheduleError, ScheduleRegistry};
use crate::models::{Jurisdiction, TaxResult, TaxSchedule, TaxType};

const DISABILITY_ALLOWANCE: &str = "disability_allowance";
const DISABLED_HEIR_ALLOWANCE: &str = "disabled_heir_allowance";
const RESIDENCE_ALLOWANCE: &str = "residence_allowance";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Spouse,
    Child,
    Sibling,
    Nephew,
    Relative,
    Other,
}

impl Relationship {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spouse => "spouse",
            Self::Child => "child",
            Self::Sibling => "sibling",
            Self::Nephew => "nephew",
            Self::Relative => "relative",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spouse" | "partner" => Some(Self::Spouse),
            "child" | "parent" => Some(Self::Child),
            "sibling" => Some(Self::Sibling),
            "nephew" | "niece" => Some(Self::Nephew),
            "relative" => Some(Self::Relative),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritanceInput {
    pub jurisdiction: Jurisdiction,
    pub relationship: Relationship,
    pub inheritance_value: Decimal,
    pub prior_gifts: Decimal,
    pub heir_disabled: bool,
    pub includes_main_residence: bool,
}

impl InheritanceInput {
    pub fn new(
        jurisdiction: Jurisdiction,
        relationship: Relationship,
        inheritance_value: Decimal,
    ) -> Self {
        Self {
            jurisdiction,
            relationship,
            inheritance_value,
            prior_gifts: Decimal::ZERO,
            heir_disabled: false,
            includes_main_residence: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritanceResult {
    pub jurisdiction: Jurisdiction,
    pub relationship: Relationship,
    pub inheritance_value: Decimal,
    pub allowance_applied: Decimal,
    pub taxable_amount: Decimal,
    pub brackets: TaxResult,
    pub surcharge: Decimal,
    pub total_tax: Decimal,
    pub net_inheritance: Decimal,
    pub effective_rate_pct: Decimal,
}

#[derive(Debug, Clone)]
pub struct InheritanceTaxCalculator<'a> {
    registry: &'a ScheduleRegistry,
}

impl<'a> InheritanceTaxCalculator<'a> {
    pub fn new(registry: &'a ScheduleRegistry) -> Self {
        Self { registry }
    }

    /// # Errors
    ///
    /// Returns [`ScheduleError::NotFound`] when the jurisdiction has no
    /// schedule for the relationship.
    pub fn calculate(
        &self,
        input: &InheritanceInput,
    ) -> Result<InheritanceResult, ScheduleError> {
        let schedule = self.registry.lookup(
            input.jurisdiction,
            TaxType::Inheritance,
            Some(input.relationship.as_str()),
        )?;

        let inheritance_value = non_negative(input.inheritance_value);
        let allowance = self.allowance(schedule, input);
        let allowance_applied = non_negative(allowance - non_negative(input.prior_gifts));
        let taxable_amount = non_negative(inheritance_value - allowance_applied);

        let brackets = schedule.evaluate(taxable_amount);
        let surcharge = brackets.total_tax * schedule.surcharge_rate();
        let total_tax = round_half_up(brackets.total_tax + surcharge);

        Ok(InheritanceResult {
            jurisdiction: input.jurisdiction,
            relationship: input.relationship,
            inheritance_value,
            allowance_applied,
            taxable_amount,
            brackets,
            surcharge: round_half_up(surcharge),
            total_tax,
            net_inheritance: inheritance_value - total_tax,
            effective_rate_pct: round_half_up(ratio_pct(total_tax, inheritance_value)),
        })
    }

    /// Allowance before prior gifts are deducted.
    fn allowance(
        &self,
        schedule: &TaxSchedule,
        input: &InheritanceInput,
    ) -> Decimal {
        let mut allowance = schedule.allowance();

        if input.heir_disabled {
            allowance += schedule
                .parameter(DISABILITY_ALLOWANCE)
                .unwrap_or_default();
            if let Some(floor) = schedule.parameter(DISABLED_HEIR_ALLOWANCE) {
                allowance = max(allowance, floor);
            }
        }

        if input.includes_main_residence {
            allowance += schedule
                .parameter(RESIDENCE_ALLOWANCE)
                .unwrap_or_default();
        }

        allowance
    }
}
