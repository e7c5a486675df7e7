use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BracketTable, Jurisdiction, TaxResult, TaxType};
use crate::config::ScheduleError;

/// Identifies one configured schedule: jurisdiction, tax type and an
/// optional sub-key (relationship, VAT category, company size, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScheduleKey {
    pub jurisdiction: Jurisdiction,
    pub tax_type: TaxType,
    pub sub_key: Option<String>,
}

impl ScheduleKey {
    pub fn new(
        jurisdiction: Jurisdiction,
        tax_type: TaxType,
    ) -> Self {
        Self {
            jurisdiction,
            tax_type,
            sub_key: None,
        }
    }

    pub fn with_sub_key(
        jurisdiction: Jurisdiction,
        tax_type: TaxType,
        sub_key: impl Into<String>,
    ) -> Self {
        Self {
            jurisdiction,
            tax_type,
            sub_key: Some(sub_key.into()),
        }
    }
}

impl fmt::Display for ScheduleKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}/{}", self.jurisdiction, self.tax_type)?;
        if let Some(sub_key) = &self.sub_key {
            write!(f, "/{sub_key}")?;
        }
        Ok(())
    }
}

pub const ALLOWANCE: &str = "allowance";
pub const SURCHARGE: &str = "surcharge";

/// A bracket table plus the named constants that go with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSchedule {
    pub key: ScheduleKey,
    pub table: BracketTable,
    pub parameters: BTreeMap<String, Decimal>,
}

impl TaxSchedule {
    pub fn new(
        key: ScheduleKey,
        table: BracketTable,
    ) -> Self {
        Self {
            key,
            table,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        value: Decimal,
    ) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    pub fn parameter(
        &self,
        name: &str,
    ) -> Option<Decimal> {
        self.parameters.get(name).copied()
    }

    /// Like [`Self::parameter`], but a missing value is a configuration error.
    pub fn require(
        &self,
        name: &str,
    ) -> Result<Decimal, ScheduleError> {
        self.parameter(name)
            .ok_or_else(|| ScheduleError::MissingParameter {
                key: self.key.clone(),
                name: name.to_string(),
            })
    }

    /// Tax-free amount deducted before the table applies.
    pub fn allowance(&self) -> Decimal {
        self.parameter(ALLOWANCE).unwrap_or_default()
    }

    /// Extra tax levied as a fraction of the computed tax.
    pub fn surcharge_rate(&self) -> Decimal {
        self.parameter(SURCHARGE).unwrap_or_default()
    }

    pub fn evaluate(
        &self,
        taxable_amount: Decimal,
    ) -> TaxResult {
        self.table.evaluate(taxable_amount)
    }
}
