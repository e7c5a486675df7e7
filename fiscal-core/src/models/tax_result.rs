use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Bracket;
use crate::calculations::common::ratio_pct;

/// The slice of the taxable amount that fell inside one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSlice {
    pub bracket: Bracket,
    pub taxed_amount: Decimal,
    pub tax: Decimal,
}

/// Outcome of a single bracket evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxResult {
    pub taxable_amount: Decimal,
    pub total_tax: Decimal,
    pub breakdown: Vec<BracketSlice>,
}

impl TaxResult {
    /// Total tax as a percentage of the taxable amount; 0 when nothing is taxable.
    pub fn effective_rate_pct(&self) -> Decimal {
        ratio_pct(self.total_tax, self.taxable_amount)
    }

    /// Rate of the highest bracket the amount reached; 0 when nothing was taxed.
    pub fn marginal_rate(&self) -> Decimal {
        self.breakdown
            .last()
            .map(|slice| slice.bracket.rate)
            .unwrap_or_default()
    }

    /// Multiplies every money figure by `factor`.
    ///
    /// Used by family-quotient style schedules where the table is applied to
    /// a per-share amount and the result scaled back up.
    pub fn scaled(
        self,
        factor: Decimal,
    ) -> Self {
        Self {
            taxable_amount: self.taxable_amount * factor,
            total_tax: self.total_tax * factor,
            breakdown: self
                .breakdown
                .into_iter()
                .map(|slice| BracketSlice {
                    taxed_amount: slice.taxed_amount * factor,
                    tax: slice.tax * factor,
                    bracket: slice.bracket,
                })
                .collect(),
        }
    }
}
